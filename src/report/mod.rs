//! Lab-report extraction: finds test names and their numeric results in
//! PDF laboratory reports, one cell per line.

pub mod extract;
pub mod handlers;
pub mod output;
pub mod parser;

pub use extract::{extract_file, extract_pdf, ReportExtraction, ReportMetadata};
pub use output::{batch_process, write_extraction, BatchSummary, OutputFormat};
pub use parser::{parse_page, LabResult};

use crate::state::AppState;
use axum::Router;

pub fn router(max_bytes: usize) -> Router<AppState> {
    Router::new().merge(handlers::report_routes(max_bytes))
}
