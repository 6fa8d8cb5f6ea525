use std::path::Path;

use anyhow::Context;
use lopdf::{Dictionary, Document};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, error, info};

use crate::report::parser::{dedup, parse_page, LabResult};

/// Document info of a parsed PDF. Missing entries are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub creator: String,
    pub pages: usize,
}

/// Outcome of reading one report. A failed read still carries the file name
/// and an `error`, with no results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportExtraction {
    pub success: bool,
    pub file: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub total_tests: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ReportMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub results: Vec<LabResult>,
}

impl ReportExtraction {
    /// Parses every page, then drops repeats across pages.
    pub fn from_pages<I, S>(file: impl Into<String>, pages: I, metadata: ReportMetadata) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut all = Vec::new();
        for (n, page) in pages.into_iter().enumerate() {
            let found = parse_page(page.as_ref());
            debug!(page = n + 1, found = found.len(), "page parsed");
            all.extend(found);
        }
        let results = dedup(all);

        Self {
            success: true,
            file: file.into(),
            timestamp: OffsetDateTime::now_utc(),
            total_tests: results.len(),
            metadata: Some(metadata),
            error: None,
            results,
        }
    }

    pub fn failed(file: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            file: file.into(),
            timestamp: OffsetDateTime::now_utc(),
            total_tests: 0,
            metadata: None,
            error: Some(error.into()),
            results: Vec::new(),
        }
    }
}

/// Extracts lab results from an in-memory PDF. Never fails; unreadable
/// input comes back as an unsuccessful extraction.
pub fn extract_pdf(file: &str, bytes: &[u8]) -> ReportExtraction {
    match read_pdf(bytes) {
        Ok((pages, metadata)) => {
            let extraction = ReportExtraction::from_pages(file, pages, metadata);
            info!(file, total_tests = extraction.total_tests, "report extracted");
            extraction
        }
        Err(e) => {
            error!(file, error = %format!("{e:#}"), "report extraction failed");
            ReportExtraction::failed(file, format!("{e:#}"))
        }
    }
}

/// Same as [`extract_pdf`] for a file on disk.
pub fn extract_file(path: &Path) -> ReportExtraction {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if !path.exists() {
        error!(path = %path.display(), "report not found");
        return ReportExtraction::failed(path.display().to_string(), "File not found");
    }

    match std::fs::read(path) {
        Ok(bytes) => extract_pdf(&file, &bytes),
        Err(e) => {
            error!(path = %path.display(), error = %e, "report unreadable");
            ReportExtraction::failed(file, e.to_string())
        }
    }
}

fn read_pdf(bytes: &[u8]) -> anyhow::Result<(Vec<String>, ReportMetadata)> {
    let doc = Document::load_mem(bytes).context("not a readable PDF")?;
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();

    let mut pages = Vec::with_capacity(page_numbers.len());
    for n in &page_numbers {
        let text = doc
            .extract_text(&[*n])
            .with_context(|| format!("read text of page {n}"))?;
        pages.push(text);
    }

    Ok((pages, metadata(&doc, page_numbers.len())))
}

fn metadata(doc: &Document, pages: usize) -> ReportMetadata {
    let info = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| doc.dereference(obj).ok())
        .and_then(|(_, obj)| obj.as_dict().ok());

    let field = |key: &[u8]| info.map(|d| info_text(d, key)).unwrap_or_default();
    ReportMetadata {
        title: field(b"Title"),
        author: field(b"Author"),
        subject: field(b"Subject"),
        creator: field(b"Creator"),
        pages,
    }
}

fn info_text(info: &Dictionary, key: &[u8]) -> String {
    info.get(key)
        .ok()
        .and_then(|obj| obj.as_str().ok())
        .map(decode_pdf_string)
        .unwrap_or_default()
}

/// Text strings are UTF-16BE with a BOM or single-byte otherwise.
fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes {
        [0xfe, 0xff, rest @ ..] => {
            let units = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
            char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        }
        _ => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}
