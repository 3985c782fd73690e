//! Statistics generation from the graph database

use crate::storage::{open_storage, GraphStore, IN_MEMORY};
use crate::{ConfigError, WeaverError};

/// Row counts of a crawled graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Total number of canonical URLs, fetched or not
    pub total_urls: u64,

    /// Number of fetched HTML pages
    pub total_pages: u64,

    /// Distinct (origin, destination) links
    pub total_links: u64,

    /// Title rows recorded across all links
    pub total_link_titles: u64,

    pub total_images: u64,

    pub total_redirections: u64,

    /// Status of the most recent run, if any
    pub last_run_status: Option<String>,
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn GraphStore) -> Result<CrawlStatistics, WeaverError> {
    let last_run_status = storage
        .get_latest_run()?
        .map(|run| run.status.to_db_string().to_string());

    Ok(CrawlStatistics {
        total_urls: storage.count_urls()?,
        total_pages: storage.count_pages()?,
        total_links: storage.count_links()?,
        total_link_titles: storage.count_link_titles()?,
        total_images: storage.count_images()?,
        total_redirections: storage.count_redirections()?,
        last_run_status,
    })
}

/// Opens an existing database file and loads its statistics
///
/// An in-memory path is rejected: it would always be a fresh, empty graph.
pub fn load_statistics_from(database_path: &str) -> Result<CrawlStatistics, WeaverError> {
    if database_path == IN_MEMORY {
        return Err(ConfigError::Validation(
            "statistics need a database file; pass --database PATH or set database-path".to_string(),
        )
        .into());
    }

    let storage = open_storage(database_path)?;
    load_statistics(&storage)
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    if let Some(status) = &stats.last_run_status {
        println!("Last run: {}", status);
        println!();
    }

    println!("Overview:");
    println!("  URLs: {}", stats.total_urls);
    println!("  Pages: {}", stats.total_pages);
    println!("  Links: {}", stats.total_links);
    println!("  Link titles: {}", stats.total_link_titles);
    println!("  Images: {}", stats.total_images);
    println!("  Redirections: {}", stats.total_redirections);
    println!();

    let coverage = if stats.total_urls > 0 {
        (stats.total_pages as f64 / stats.total_urls as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Coverage: {:.1}% ({} / {} URLs fetched as pages)",
        coverage, stats.total_pages, stats.total_urls
    );
}
