//! Storage module for persisting the link graph
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Canonical URL identity and last-seen status
//! - Pages, redirections, links and link titles
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{GraphStore, StorageError, StorageResult};

use crate::WeaverError;

/// Database path that selects an in-memory store
pub const IN_MEMORY: &str = ":memory:";

/// Opens the store named by a configured database path
///
/// `:memory:` opens a fresh in-memory database; anything else is treated as
/// a file path and created if missing.
pub fn open_storage(database_path: &str) -> Result<SqliteStorage, WeaverError> {
    if database_path == IN_MEMORY {
        SqliteStorage::new_in_memory()
    } else {
        SqliteStorage::new(std::path::Path::new(database_path))
    }
}

/// A canonical URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub id: i64,
    pub url: String,
    /// Last HTTP status observed for this URL, if it was ever fetched
    pub status: Option<u16>,
}

/// The fetched HTML representation of one URL
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    /// Reserved, never set by the crawler
    pub title: Option<String>,
    pub url_id: i64,
    /// Reserved, never set by the crawler
    pub parent_id: Option<i64>,
    pub contents: String,
}

/// A directed edge between two URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub id: i64,
    pub origin_url_id: i64,
    pub destination_url_id: i64,
    pub occurances: u32,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub seed: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
