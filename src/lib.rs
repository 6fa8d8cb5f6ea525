pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod llm;
pub mod report;
pub mod state;
pub mod storage;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_support;
