#![warn(clippy::unwrap_used)]

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use color_eyre::eyre::Context;
use color_eyre::{Result, Section};
use rust_decimal::Decimal;
use statement_ledger::{
    BankTransaction, CategoryRules, ExtractorConfig, ProcessedStatement, StatementExtractor,
};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

const PDF_MAGIC: &[u8] = b"%PDF";
const PAGE_BREAK: char = '\x0c';

/// Extracts a categorized transaction ledger from a bank statement
#[derive(Debug, Parser)]
struct Args {
    /// A PDF statement, or a text file with pages separated by form feeds
    input: PathBuf,
    /// Destination file, stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
    /// JSON category table replacing the built-in one
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Closing balance printed on the statement, replaces the computed one
    #[arg(long)]
    balance: Option<Decimal>,
    /// Extract pages on separate threads
    #[arg(long)]
    parallel: bool,
    /// Prints the raw lines found in the input
    #[arg(long)]
    print_lines: bool,
    /// More logging, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// The whole statement
    Json,
    /// Transactions only
    Csv,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();
}

fn read_pages(input: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(input).with_context(|| format!("Could not read input file {input:?}"))?;
    if bytes.starts_with(PDF_MAGIC) {
        return pdf_extract::extract_text_from_mem_by_pages(&bytes)
            .with_context(|| format!("Could not extract PDF content from file {input:?}"));
    }
    let text = String::from_utf8(bytes)
        .with_context(|| format!("Input file {input:?} is neither a PDF nor UTF-8 text"))?;
    Ok(text.split(PAGE_BREAK).map(str::to_owned).collect())
}

fn config(rules: Option<&Path>, parallel_pages: bool) -> Result<ExtractorConfig> {
    let category_rules = match rules {
        Some(path) => CategoryRules::from_path(path)
            .with_context(|| format!("Could not load category rules from {path:?}"))?,
        None => CategoryRules::default(),
    };
    Ok(ExtractorConfig {
        category_rules,
        parallel_pages,
        ..ExtractorConfig::default()
    })
}

fn output_writer(output: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(
            fs::File::create(path)
                .with_context(|| format!("Could not create output file {path:?}"))?,
        ),
        None => Box::new(io::stdout().lock()),
    })
}

fn write_json(statement: &ProcessedStatement, mut writer: impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, statement)?;
    writeln!(writer)?;
    Ok(())
}

fn write_to_csv<'a>(
    transactions: impl IntoIterator<Item = &'a BankTransaction>,
    writer: impl Write,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for transaction in transactions {
        writer.serialize(transaction)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let Args {
        input,
        output,
        format,
        rules,
        balance,
        parallel,
        print_lines,
        verbose,
    } = Args::parse();
    init_tracing(verbose);

    let pages = read_pages(&input)?;
    if print_lines {
        for (index, page) in pages.iter().enumerate() {
            for line in page.lines() {
                eprintln!("{:>3}| {line}", index + 1);
            }
        }
    }

    let extractor = StatementExtractor::new(config(rules.as_deref(), parallel)?);
    let statement = extractor
        .process(&pages)
        .require_transactions()
        .with_context(|| format!("Could not extract a ledger from {input:?}"))
        .suggestion(
            "check the page text with --print-lines, scanned PDFs without a text layer yield no lines",
        )?;
    let statement = match balance {
        Some(balance) => statement.with_statement_balance(balance),
        None => statement,
    };
    info!(
        transactions = statement.transactions().len(),
        "writing {format:?} output"
    );

    let writer = output_writer(output.as_deref())?;
    match format {
        Format::Json => write_json(&statement, writer),
        Format::Csv => write_to_csv(statement.transactions(), writer),
    }
}
