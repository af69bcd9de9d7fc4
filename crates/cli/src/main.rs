//! CLI tool for analyzing startup pitch decks with a hosted LLM.

mod output;
mod pipeline;

use anyhow::{Context, Result};
use clap::Parser;
use pitch_core::{Extraction, PitchDeckFile, ResultTable};
use pitch_llm::{ChatCompletionsClient, LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use pitch_pptx::PptxExtractor;
use pipeline::{Analyzer, SessionEvent};
use std::path::PathBuf;
use std::time::Duration;

/// Extract startup insights from pitch decks and export them to a spreadsheet.
#[derive(Parser, Debug)]
#[command(name = "pitch-analyze")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pitch deck file(s) (.pptx)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Spreadsheet to write the combined results to
    #[arg(short, long, default_value = pitch_xlsx::DEFAULT_REPORT_FILENAME)]
    output: PathBuf,

    /// API key for the chat-completions endpoint
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model identifier
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Sampling temperature (provider default when omitted)
    #[arg(long)]
    temperature: Option<f32>,

    /// Give up on a model request after this many seconds (no limit when omitted)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the extracted text of each deck and exit without calling the model
    #[arg(long)]
    print_text: bool,

    /// Print the collected records as a JSON array instead of a table
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Load .env before parsing so API_KEY can come from it.
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }
    match dotenv {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) => log::debug!("No .env loaded: {}", e),
    }

    let outcome = run(&args)?;
    log::debug!("Finished: {:?}", outcome);
    Ok(())
}

/// How a run ended.
#[derive(Debug, PartialEq)]
enum RunOutcome {
    /// `--print-text`: text was dumped and the model never called.
    TextPrinted,
    /// No deck produced a record, so nothing was exported.
    NoRecords,
    /// The spreadsheet was written here.
    Exported(PathBuf),
}

fn run(args: &Args) -> Result<RunOutcome> {
    let files = load_files(&args.input)?;

    if args.print_text {
        print_text(&files)?;
        return Ok(RunOutcome::TextPrinted);
    }

    let analyzer = Analyzer::new(build_client(args)?);

    let table = analyzer
        .run_session(&files, |event| match event {
            SessionEvent::Processing(file) => output::print_processing(&file.filename),
            SessionEvent::Finished(_, outcome) => output::print_outcome(outcome, args.verbose),
        })
        .context("Analysis aborted")?;

    if table.is_empty() {
        println!("No decks were analyzed successfully; no spreadsheet written.");
        return Ok(RunOutcome::NoRecords);
    }

    if args.json {
        println!("{}", records_json(&table)?);
    } else {
        output::print_table(&table);
    }

    match pipeline::export_report(&table, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?
    {
        Some(path) => {
            println!("\nExcel report written to: {}", path.display());
            Ok(RunOutcome::Exported(path))
        }
        None => Ok(RunOutcome::NoRecords),
    }
}

/// Load every input; unsupported paths are carried through unread.
fn load_files(paths: &[PathBuf]) -> Result<Vec<PitchDeckFile>> {
    paths
        .iter()
        .map(|path| {
            PitchDeckFile::open(path).with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect()
}

fn build_client(args: &Args) -> Result<ChatCompletionsClient> {
    let api_key = args.api_key.clone().ok_or(pitch_core::Error::Config(
        "no API key: pass --api-key or set API_KEY".to_string(),
    ))?;
    let config = LlmConfig::new(api_key)
        .with_model(&args.model)
        .with_base_url(&args.base_url)
        .with_temperature(args.temperature)
        .with_timeout(args.timeout_secs.map(Duration::from_secs));
    ChatCompletionsClient::new(config).context("Invalid model configuration")
}

fn records_json(table: &ResultTable) -> Result<String> {
    Ok(serde_json::to_string_pretty(table.records())?)
}

/// Dump each deck's extracted text, one shape per line.
fn print_text(files: &[PitchDeckFile]) -> Result<()> {
    let extractor = PptxExtractor::new();
    for file in files {
        match extractor
            .extract(file)
            .with_context(|| format!("Failed to extract {}", file.filename))?
        {
            Extraction::Text(text) => {
                if files.len() > 1 {
                    println!("==> {} <==", file.filename);
                }
                print!("{}", text);
            }
            Extraction::Unsupported => {
                eprintln!("{}: {}", file.filename, Extraction::UNSUPPORTED_MESSAGE);
            }
        }
    }
    Ok(())
}
