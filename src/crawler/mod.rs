//! Crawler module for fetching pages and growing the link graph
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with manual redirect handling
//! - HTML parsing and link extraction
//! - FIFO scheduling with one admission per URL
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{Coordinator, FetchOutcome, RunSummary};
pub use fetcher::{
    build_http_client, is_html, request_target, resolve_location, FetchResponse, Fetcher,
    ResponseKind,
};
pub use parser::{parse_document, record_document, Anchor, ParsedDocument};
pub use scheduler::{CrawlItem, RunState, Scheduler};

use crate::config::Config;
use crate::WeaverError;

/// Runs a complete crawl from `seed`
///
/// Opens the store named by `config.output.database_path`, drains the crawl
/// and hands the populated store back for reporting.
///
/// # Returns
///
/// * `Ok((store, summary))` - The queue drained
/// * `Err(WeaverError)` - A fatal error aborted the run
pub async fn crawl(
    config: Config,
    seed: &str,
    config_hash: &str,
) -> Result<(crate::storage::SqliteStorage, RunSummary), WeaverError> {
    let mut coordinator = Coordinator::new(config)?.with_config_hash(config_hash);
    let summary = coordinator.run(seed).await?;
    Ok((coordinator.into_storage(), summary))
}
