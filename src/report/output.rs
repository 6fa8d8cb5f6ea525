use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{error, info};

use crate::report::extract::{extract_file, ReportExtraction};

pub const SUMMARY_FILE: &str = "extraction_summary.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => anyhow::bail!("unsupported output format {other:?}"),
        }
    }
}

/// Writes one extraction. JSON keeps the whole envelope; CSV holds only the
/// `test,result` rows and stays empty when nothing was found.
pub fn write_extraction(
    extraction: &ReportExtraction,
    path: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }

    match format {
        OutputFormat::Json => {
            let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
            serde_json::to_writer_pretty(BufWriter::new(file), extraction)
                .context("write extraction json")?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_path(path)
                .with_context(|| format!("create {}", path.display()))?;
            for row in &extraction.results {
                writer.serialize(row).context("write csv row")?;
            }
            writer.flush().context("flush csv")?;
        }
    }

    info!(path = %path.display(), format = format.extension(), "extraction saved");
    Ok(())
}

/// Totals for one directory run, plus every per-file envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_tests_extracted: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub files: Vec<ReportExtraction>,
}

impl BatchSummary {
    pub fn new(files: Vec<ReportExtraction>) -> Self {
        let successful = files.iter().filter(|f| f.success).count();
        Self {
            processed: files.len(),
            successful,
            failed: files.len() - successful,
            total_tests_extracted: files.iter().map(|f| f.total_tests).sum(),
            timestamp: OffsetDateTime::now_utc(),
            files,
        }
    }
}

/// `*.pdf` files directly inside `dir`, sorted by name.
pub fn pdf_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read directory {}", dir.display()))? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Extracts every PDF in `input_dir`, writes `<stem>_extracted.<ext>` for
/// each successful one and `extraction_summary.json` into `output_dir`.
/// A file that cannot be written is logged and skipped.
pub fn batch_process(
    input_dir: &Path,
    output_dir: &Path,
    format: OutputFormat,
) -> anyhow::Result<BatchSummary> {
    let files = pdf_files(input_dir)?;
    info!(count = files.len(), dir = %input_dir.display(), "pdf files found");
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create directory {}", output_dir.display()))?;

    let mut extractions = Vec::with_capacity(files.len());
    for path in &files {
        let extraction = extract_file(path);
        if extraction.success {
            let target = output_dir.join(extracted_name(path, format));
            if let Err(e) = write_extraction(&extraction, &target, format) {
                error!(path = %target.display(), error = %format!("{e:#}"), "saving extraction failed");
            }
        }
        extractions.push(extraction);
    }

    let summary = BatchSummary::new(extractions);
    let summary_path = output_dir.join(SUMMARY_FILE);
    let file = File::create(&summary_path)
        .with_context(|| format!("create {}", summary_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &summary).context("write summary")?;

    info!(
        processed = summary.processed,
        successful = summary.successful,
        path = %summary_path.display(),
        "batch complete"
    );
    Ok(summary)
}

/// `reports/cbc.pdf` -> `cbc_extracted.csv`.
pub fn extracted_name(path: &Path, format: OutputFormat) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".into());
    format!("{stem}_extracted.{}", format.extension())
}
