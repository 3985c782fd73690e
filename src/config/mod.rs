//! Configuration module for Link-Weaver
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a crawl can also run without any file at all.
//!
//! # Example
//!
//! ```no_run
//! use link_weaver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("weaver.toml")).unwrap();
//! println!("Redirect limit: {}", config.crawler.redirect_limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
