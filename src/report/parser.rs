use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lines containing any of these (case-insensitive) are report furniture,
/// never a test name.
const SKIP_KEYWORDS: &[&str] = &[
    "TEST PARAMETER",
    "REFERENCE RANGE",
    "RESULT",
    "UNIT",
    "SAMPLE TYPE",
    "Page",
    "Report Status",
    "Collected On",
    "Reported On",
    "Final",
    "Method:",
    "Automated",
    "Patient Location",
    "Flowcytometry",
    "Lab ID",
    "UH ID",
    "Registered On",
    "Age/Gender",
    "Electrical Impedence",
    "LABORATORY TEST REPORT",
    "HAEMATOLOGY",
    "Ref. By",
    "Calculated",
    "Processed By",
    "End Of Report",
    "EDTA",
    "Pathologist",
    "whole blood",
    "TERMS & CONDITIONS",
    "Dr ",
    "KMC-",
    "Meda Salomi",
    "COMPLETE BLOOD COUNT",
    "Male",
    "Female",
    "Years",
    "Name",
    "Mr.",
    "Mrs.",
    "Ms.",
    "Differential Leucocyte Count",
    "IP/OP No",
    "AKSHAYA NEURO",
];

/// Method lines sit between a test name and its value.
const METHOD_MARKERS: &[&str] = &["Method:", "Automated", "Calculated"];

/// How many lines after a test name may hold its value.
const RESULT_LOOKAHEAD: usize = 6;

/// One test name with its numeric result, as printed on the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabResult {
    pub test: String,
    pub result: String,
}

impl LabResult {
    pub fn new(test: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            test: test.into(),
            result: result.into(),
        }
    }
}

/// Reads one page of text laid out one cell per line: test name, then unit,
/// range and (maybe) a method line, then the value.
pub fn parse_page(text: &str) -> Vec<LabResult> {
    let lines: Vec<&str> = text.split('\n').map(str::trim).collect();
    let mut results = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.is_empty() || should_skip(line) || !is_test_name(line) {
            i += 1;
            continue;
        }

        let end = (i + 1 + RESULT_LOOKAHEAD).min(lines.len());
        let found = (i + 1..end).find(|&j| {
            let next = lines[j];
            !next.is_empty()
                && !METHOD_MARKERS.iter().any(|m| next.contains(m))
                && is_result_value(next)
        });

        if let Some(j) = found {
            let test = clean_test_name(line);
            debug!(test = %test, result = lines[j], "lab value");
            results.push(LabResult::new(test, lines[j]));
            i = j;
        }
        i += 1;
    }

    results
}

/// Keeps the first of each (case-insensitive name, value) pair.
pub fn dedup(results: Vec<LabResult>) -> Vec<LabResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|r| seen.insert((r.test.to_lowercase(), r.result.clone())))
        .collect()
}

fn should_skip(line: &str) -> bool {
    let lower = line.to_lowercase();
    if SKIP_KEYWORDS
        .iter()
        .any(|k| lower.contains(&k.to_lowercase()))
    {
        return true;
    }
    line.chars().count() <= 1 || line.chars().all(|c| matches!(c, '-' | ':' | '/'))
}

/// At least three characters, starts uppercase, and at least half of its
/// letters are uppercase.
fn is_test_name(line: &str) -> bool {
    if line.chars().count() < 3 {
        return false;
    }
    if !line.chars().next().is_some_and(char::is_uppercase) {
        return false;
    }
    if should_skip(line) {
        return false;
    }

    let (letters, upper) = line
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(n, up), c| {
            (n + 1, up + usize::from(c.is_uppercase()))
        });
    letters > 0 && upper * 2 >= letters
}

/// Digits and dots only: "13.2", "49", "03".
fn is_result_value(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn clean_test_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(':')
        .trim()
        .to_string()
}
