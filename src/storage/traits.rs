//! Storage traits and error types
//!
//! This module defines the link graph store interface and its error type.

use crate::storage::{LinkRecord, PageRecord, RunRecord, RunStatus, UrlRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("URL not found: {0}")]
    UrlNotFound(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Link graph store
///
/// Every write is idempotent under repeated identical calls, and no write is
/// transactional relative to another: a Link may exist without its titles if
/// the process stops between the two calls.
pub trait GraphStore {
    // ===== Run Management =====

    /// Creates a new crawl run and returns its ID
    fn create_run(&mut self, seed: &str, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as finished with the given status
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== URLs =====

    /// Returns the URL with this exact canonical string, creating it without
    /// a status if it does not exist yet
    fn find_or_create_url(&mut self, url: &str) -> StorageResult<UrlRecord>;

    /// Looks up a URL by its exact canonical string
    fn find_url(&self, url: &str) -> StorageResult<Option<UrlRecord>>;

    /// Gets a URL by ID
    fn get_url(&self, url_id: i64) -> StorageResult<UrlRecord>;

    /// Records the last HTTP status observed for a URL
    fn set_url_status(&mut self, url_id: i64, status: u16) -> StorageResult<()>;

    // ===== Pages =====

    /// Returns the page owned by `url`, creating it if needed, and sets its
    /// contents. Every URL in `redirections` is appended as a redirection
    /// into the page; duplicates are kept.
    fn find_or_create_page(
        &mut self,
        url: &UrlRecord,
        contents: &str,
        redirections: &[UrlRecord],
    ) -> StorageResult<PageRecord>;

    /// Gets the page owned by a URL, if any
    fn get_page_by_url(&self, url_id: i64) -> StorageResult<Option<PageRecord>>;

    /// Lists every page in creation order
    fn list_pages(&self) -> StorageResult<Vec<PageRecord>>;

    /// Lists the URLs that redirected into a page
    fn page_redirections(&self, page_id: i64) -> StorageResult<Vec<UrlRecord>>;

    // ===== Links =====

    /// Increments the occurrence count of the (origin, destination) link, or
    /// creates it with a count of 1
    fn increment_or_create_link(
        &mut self,
        origin_url_id: i64,
        destination_url_id: i64,
    ) -> StorageResult<LinkRecord>;

    /// Appends a title to a link
    fn add_link_title(&mut self, link_id: i64, title: &str) -> StorageResult<()>;

    /// Lists all links whose origin is the given URL
    fn links_from(&self, origin_url_id: i64) -> StorageResult<Vec<LinkRecord>>;

    /// Lists the titles recorded on a link, in insertion order
    fn link_titles(&self, link_id: i64) -> StorageResult<Vec<String>>;

    // ===== Images =====

    /// Records a URL as an image reference, returning the image ID
    fn find_or_create_image(&mut self, url_id: i64) -> StorageResult<i64>;

    // ===== Statistics =====

    fn count_urls(&self) -> StorageResult<u64>;
    fn count_pages(&self) -> StorageResult<u64>;
    fn count_links(&self) -> StorageResult<u64>;
    fn count_link_titles(&self) -> StorageResult<u64>;
    fn count_images(&self) -> StorageResult<u64>;
    fn count_redirections(&self) -> StorageResult<u64>;
}
