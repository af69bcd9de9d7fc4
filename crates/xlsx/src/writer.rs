//! SpreadsheetML package writer.

use pitch_core::{Error, Result, ResultTable};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Filename offered for the combined report.
pub const DEFAULT_REPORT_FILENAME: &str = "pitch_deck_analysis.xlsx";

/// MIME type of the generated workbook.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Longest text Excel accepts in a single cell.
const MAX_CELL_CHARS: usize = 32_767;

const CONTENT_TYPES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"</Types>"#
);

const ROOT_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#
);

const WORKBOOK_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"</Relationships>"#
);

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Writes a [`ResultTable`] as a single-sheet XLSX workbook.
///
/// Row 1 holds the column names; each following row is one record. Every
/// value is written as an inline string.
#[derive(Debug, Clone)]
pub struct XlsxWriter {
    sheet_name: String,
}

impl Default for XlsxWriter {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
        }
    }
}

impl XlsxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Serialize the table to XLSX bytes.
    ///
    /// An empty table is an error: there is nothing to offer for download.
    pub fn write(&self, table: &ResultTable) -> Result<Vec<u8>> {
        if table.is_empty() {
            return Err(Error::Export("no records to export".to_string()));
        }
        validate_sheet_name(&self.sheet_name)?;

        let sheet = sheet_xml(table)?;
        let workbook = workbook_xml(&self.sheet_name)?;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts: [(&str, &[u8]); 5] = [
            ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
            ("_rels/.rels", ROOT_RELS_XML.as_bytes()),
            ("xl/workbook.xml", &workbook),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.as_bytes()),
            ("xl/worksheets/sheet1.xml", &sheet),
        ];
        for (path, content) in parts {
            zip.start_file(path, options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", path, e)))?;
            zip.write_all(content)?;
        }

        let bytes = zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish workbook: {}", e)))?
            .into_inner();

        log::debug!(
            "Wrote workbook: {} rows x {} columns, {} bytes",
            table.len(),
            table.columns().len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Serialize the table and write it to `path`.
    pub fn write_to_path(&self, table: &ResultTable, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.write(table)?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }
}

fn workbook_xml(sheet_name: &str) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    write_decl(&mut writer)?;

    let mut workbook = BytesStart::new("workbook");
    workbook.push_attribute(("xmlns", SPREADSHEET_NS));
    workbook.push_attribute(("xmlns:r", RELATIONSHIPS_NS));
    emit(&mut writer, Event::Start(workbook))?;
    emit(&mut writer, Event::Start(BytesStart::new("sheets")))?;

    let mut sheet = BytesStart::new("sheet");
    sheet.push_attribute(("name", sheet_name));
    sheet.push_attribute(("sheetId", "1"));
    sheet.push_attribute(("r:id", "rId1"));
    emit(&mut writer, Event::Empty(sheet))?;

    emit(&mut writer, Event::End(BytesEnd::new("sheets")))?;
    emit(&mut writer, Event::End(BytesEnd::new("workbook")))?;
    Ok(writer.into_inner())
}

fn sheet_xml(table: &ResultTable) -> Result<Vec<u8>> {
    let columns = table.columns();
    let rows = table.rows();

    let mut writer = Writer::new(Vec::new());
    write_decl(&mut writer)?;

    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute(("xmlns", SPREADSHEET_NS));
    emit(&mut writer, Event::Start(worksheet))?;

    if !columns.is_empty() {
        let last = format!("{}{}", column_name(columns.len() - 1), rows.len() + 1);
        let mut dimension = BytesStart::new("dimension");
        dimension.push_attribute(("ref", format!("A1:{}", last).as_str()));
        emit(&mut writer, Event::Empty(dimension))?;
    }

    emit(&mut writer, Event::Start(BytesStart::new("sheetData")))?;

    let header: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    write_row(&mut writer, 1, &header)?;
    for (idx, row) in rows.iter().enumerate() {
        write_row(&mut writer, idx + 2, row)?;
    }

    emit(&mut writer, Event::End(BytesEnd::new("sheetData")))?;
    emit(&mut writer, Event::End(BytesEnd::new("worksheet")))?;
    Ok(writer.into_inner())
}

fn write_row(writer: &mut Writer<Vec<u8>>, row_number: usize, cells: &[String]) -> Result<()> {
    let row_ref = row_number.to_string();
    let mut row = BytesStart::new("row");
    row.push_attribute(("r", row_ref.as_str()));
    emit(writer, Event::Start(row))?;

    for (col, value) in cells.iter().enumerate() {
        let text = cell_text(value);
        if text.is_empty() {
            continue;
        }
        let cell_ref = format!("{}{}", column_name(col), row_number);
        let mut cell = BytesStart::new("c");
        cell.push_attribute(("r", cell_ref.as_str()));
        cell.push_attribute(("t", "inlineStr"));
        emit(writer, Event::Start(cell))?;
        emit(writer, Event::Start(BytesStart::new("is")))?;

        let mut t = BytesStart::new("t");
        t.push_attribute(("xml:space", "preserve"));
        emit(writer, Event::Start(t))?;
        emit(writer, Event::Text(BytesText::new(&text)))?;
        emit(writer, Event::End(BytesEnd::new("t")))?;

        emit(writer, Event::End(BytesEnd::new("is")))?;
        emit(writer, Event::End(BytesEnd::new("c")))?;
    }

    emit(writer, Event::End(BytesEnd::new("row")))?;
    Ok(())
}

fn write_decl(writer: &mut Writer<Vec<u8>>) -> Result<()> {
    emit(
        writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
    )
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::XmlError(format!("Failed to write sheet XML: {}", e)))
}

/// Cell text with XML-illegal characters removed, capped at Excel's limit.
fn cell_text(value: &str) -> String {
    let cleaned: String = value.chars().filter(|&c| is_xml_char(c)).collect();
    if cleaned.chars().count() > MAX_CELL_CHARS {
        log::warn!("Truncating cell text to {} characters", MAX_CELL_CHARS);
        return cleaned.chars().take(MAX_CELL_CHARS).collect();
    }
    cleaned
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Spreadsheet column letters for a zero-based index: 0 → A, 26 → AA.
fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).to_string()
}

fn validate_sheet_name(name: &str) -> Result<()> {
    const FORBIDDEN: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];
    if name.is_empty() || name.chars().count() > 31 || name.contains(FORBIDDEN) {
        return Err(Error::Export(format!("invalid sheet name '{}'", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_from_rs, Reader, Xlsx};
    use pitch_core::AnalysisRecord;

    fn table(raws: &[&str]) -> ResultTable {
        let mut table = ResultTable::new();
        for raw in raws {
            table.push(AnalysisRecord::parse(raw).unwrap());
        }
        table
    }

    fn read_back(bytes: Vec<u8>) -> Vec<Vec<String>> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Sheet1".to_string()]);
        let range = workbook.worksheet_range("Sheet1").unwrap();
        range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_column_name() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn test_cell_text_strips_control_characters() {
        assert_eq!(cell_text("a\u{0}b\u{1b}c\nd"), "abc\nd");
    }

    #[test]
    fn test_empty_table_is_not_exported() {
        let err = XlsxWriter::new().write(&ResultTable::new()).unwrap_err();
        assert!(matches!(err, Error::Export(_)));
    }

    #[test]
    fn test_invalid_sheet_name() {
        let t = table(&[r#"{"Name": "Acme"}"#]);
        assert!(XlsxWriter::new().with_sheet_name("a/b").write(&t).is_err());
        assert!(XlsxWriter::new().with_sheet_name("").write(&t).is_err());
    }

    #[test]
    fn test_header_and_rows_round_trip_through_calamine() {
        let t = table(&[
            r#"{"Name of the Startup": "Acme Robotics", "Industry": "Food & Logistics"}"#,
            r#"{"Name of the Startup": "Beta <Labs>", "Website": "https://beta.io"}"#,
        ]);
        let rows = read_back(XlsxWriter::new().write(&t).unwrap());

        assert_eq!(
            rows,
            vec![
                vec!["Name of the Startup", "Industry", "Website"],
                vec!["Acme Robotics", "Food & Logistics", ""],
                vec!["Beta <Labs>", "", "https://beta.io"],
            ]
        );
    }

    #[test]
    fn test_nested_values_are_written_as_json_text() {
        let t = table(&[r#"{"Team profile": ["Jane: CEO", "Raj: CTO"], "Founded year": 2019}"#]);
        let rows = read_back(XlsxWriter::new().write(&t).unwrap());
        assert_eq!(rows[1], vec![r#"["Jane: CEO","Raj: CTO"]"#, "2019"]);
    }

    #[test]
    fn test_write_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_REPORT_FILENAME);

        XlsxWriter::new()
            .write_to_path(&table(&[r#"{"Name": "Acme"}"#]), &path)
            .unwrap();
        let rows = read_back(std::fs::read(&path).unwrap());
        assert_eq!(rows, vec![vec!["Name"], vec!["Acme"]]);
    }
}
