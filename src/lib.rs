//! Link-Weaver: a same-domain link graph crawler
//!
//! This crate crawls a website from a seed address, follows redirect chains,
//! and records every discovered page, URL, link, link title and redirection
//! in a relational link graph.

pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Link-Weaver operations
#[derive(Debug, Error)]
pub enum WeaverError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP redirect too deep at {url} (limit {limit})")]
    RedirectDepthExceeded { url: String, limit: u32 },

    #[error("Unsupported content type for {url}: {content_type}")]
    UnsupportedContentType { url: String, content_type: String },

    #[error("Transport error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Link-Weaver operations
pub type Result<T> = std::result::Result<T, WeaverError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Coordinator;
pub use storage::{GraphStore, SqliteStorage};
pub use url::canonicalize;
