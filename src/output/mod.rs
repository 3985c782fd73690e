//! Output module for presenting the crawled link graph
//!
//! This module handles:
//! - The per-page link report printed after a crawl
//! - Row counts for an existing database

pub mod report;
pub mod stats;

pub use report::{build_report, print_report, GraphReport, LinkEntry, PageEntry};
pub use stats::{load_statistics, load_statistics_from, print_statistics, CrawlStatistics};
