use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use nutricare::report::{
    batch_process, extract_file, output::extracted_name, write_extraction, BatchSummary,
    OutputFormat, ReportExtraction,
};

/// Extract test results from lab report PDFs.
#[derive(Debug, Parser)]
#[command(name = "extract-report", version)]
struct Cli {
    /// PDF file, or a directory of PDFs
    input: PathBuf,

    /// Output file (single report) or directory (batch)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Treat `input` as a directory even if it is not one yet
    #[arg(short, long)]
    directory: bool,

    #[arg(long)]
    debug: bool,

    /// Print the extracted rows
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "nutricare=debug"
    } else {
        "nutricare=info"
    };
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    anyhow::ensure!(
        cli.input.exists(),
        "input path does not exist: {}",
        cli.input.display()
    );

    if cli.directory || cli.input.is_dir() {
        anyhow::ensure!(cli.input.is_dir(), "{} is not a directory", cli.input.display());
        let output_dir = cli
            .output
            .clone()
            .unwrap_or_else(|| cli.input.join("extracted_results"));
        let summary = batch_process(&cli.input, &output_dir, cli.format)?;
        print_summary(&summary, &output_dir, cli.pretty);
        return Ok(());
    }

    let extraction = extract_file(&cli.input);
    if !extraction.success {
        anyhow::bail!(
            "failed to process {}: {}",
            cli.input.display(),
            extraction.error.as_deref().unwrap_or("unknown error")
        );
    }

    let output = cli.output.clone().unwrap_or_else(|| {
        cli.input
            .with_file_name(extracted_name(&cli.input, cli.format))
    });
    write_extraction(&extraction, &output, cli.format)
        .with_context(|| format!("save {}", output.display()))?;

    println!(
        "Extracted {} test results from {} into {}",
        extraction.total_tests,
        extraction.file,
        output.display()
    );
    if cli.pretty {
        print_results(&extraction);
    }
    Ok(())
}

fn print_results(extraction: &ReportExtraction) {
    if let Some(meta) = &extraction.metadata {
        if !meta.title.is_empty() {
            println!("Report: {}", meta.title);
        }
        println!("Pages: {}", meta.pages);
    }
    for (n, row) in extraction.results.iter().enumerate() {
        println!("{:3}. {:<50} {:>10}", n + 1, row.test, row.result);
    }
}

fn print_summary(summary: &BatchSummary, output_dir: &Path, pretty: bool) {
    println!("Files processed:       {}", summary.processed);
    println!("Successful:            {}", summary.successful);
    println!("Failed:                {}", summary.failed);
    println!("Total tests extracted: {}", summary.total_tests_extracted);
    println!("Results saved to:      {}", output_dir.display());

    if pretty {
        for file in &summary.files {
            let status = if file.success { "ok  " } else { "FAIL" };
            println!("{status} {:<40} ({} tests)", file.file, file.total_tests);
        }
    }
}
