//! Terminal rendering of analysis results.

use crate::pipeline::FileOutcome;
use pitch_core::{Extraction, InvalidResponse, ResultTable};

/// Widest a table cell is allowed to print before it is cut.
const MAX_CELL_WIDTH: usize = 28;

pub fn print_processing(filename: &str) {
    println!("Extracting, please wait... ({})", filename);
}

pub fn print_outcome(outcome: &FileOutcome, verbose: bool) {
    match outcome {
        FileOutcome::Analyzed(record) => {
            println!("Analysis Complete!");
            println!("{}", record.to_pretty_json());
        }
        FileOutcome::Unsupported => {
            eprintln!("{}", Extraction::UNSUPPORTED_MESSAGE);
        }
        FileOutcome::InvalidJson(invalid) => {
            eprintln!("{}", InvalidResponse::MESSAGE);
            if verbose {
                eprintln!("  reason: {}", invalid.reason);
                eprintln!("  response: {}", invalid.raw);
            }
        }
    }
}

/// Print the session's records as a fixed-width table, one row per deck.
pub fn print_table(table: &ResultTable) {
    println!("Analysis Complete! Displaying Results:\n");
    for line in render_table(table) {
        println!("{}", line);
    }
}

fn render_table(table: &ResultTable) -> Vec<String> {
    let columns = table.columns();
    let rows: Vec<Vec<String>> = table
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|c| clip(c)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(clip(name).chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let header: Vec<String> = columns.iter().map(|c| clip(c)).collect();
    lines.push(format_row(&header, &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &rows {
        lines.push(format_row(row, &widths));
    }
    lines
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

/// Single-line, width-capped version of a cell.
fn clip(text: &str) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if flat.chars().count() <= MAX_CELL_WIDTH {
        flat
    } else {
        let mut cut: String = flat.chars().take(MAX_CELL_WIDTH - 3).collect();
        cut.push_str("...");
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitch_core::AnalysisRecord;

    #[test]
    fn test_clip() {
        assert_eq!(clip("short"), "short");
        assert_eq!(clip("two\nlines"), "two lines");
        let long = "x".repeat(40);
        let clipped = clip(&long);
        assert_eq!(clipped.chars().count(), MAX_CELL_WIDTH);
        assert!(clipped.ends_with("..."));
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let mut table = ResultTable::new();
        table.push(AnalysisRecord::parse(r#"{"Name": "Acme Robotics", "Stage": "Seed"}"#).unwrap());
        table.push(AnalysisRecord::parse(r#"{"Name": "Beta", "Stage": "Not mentioned"}"#).unwrap());

        let lines = render_table(&table);
        assert_eq!(
            lines,
            vec![
                "Name          | Stage",
                "--------------+--------------",
                "Acme Robotics | Seed",
                "Beta          | Not mentioned",
            ]
        );
    }
}
