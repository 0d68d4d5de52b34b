// src/report/mod.rs
pub mod aggregator;

use crate::utils::error::EdgarError;
use async_trait::async_trait;

pub use aggregator::{parse, ParseResult};

/// Source of raw filing text keyed by (CIK, accession number).
/// Transport, caching and retries belong to the implementor; the aggregator
/// treats any error as "no content".
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch_content(&self, cik: &str, accession_number: &str) -> Result<String, EdgarError>;
}
