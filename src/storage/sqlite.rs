//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the GraphStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{GraphStore, StorageError, StorageResult};
use crate::storage::{LinkRecord, PageRecord, RunRecord, RunStatus, UrlRecord};
use crate::WeaverError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) a database file
    pub fn new(path: &Path) -> Result<Self, WeaverError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, WeaverError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn count(&self, table: &str) -> StorageResult<u64> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
        Ok(count as u64)
    }

    fn page_for_url(&self, url_id: i64) -> StorageResult<Option<PageRecord>> {
        let page = self
            .conn
            .query_row(
                "SELECT id, title, url_id, parent_id, contents FROM pages WHERE url_id = ?1",
                params![url_id],
                page_from_row,
            )
            .optional()?;
        Ok(page)
    }
}

fn url_from_row(row: &Row<'_>) -> rusqlite::Result<UrlRecord> {
    Ok(UrlRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        status: row.get(2)?,
    })
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        url_id: row.get(2)?,
        parent_id: row.get(3)?,
        contents: row.get(4)?,
    })
}

fn link_from_row(row: &Row<'_>) -> rusqlite::Result<LinkRecord> {
    Ok(LinkRecord {
        id: row.get(0)?,
        origin_url_id: row.get(1)?,
        destination_url_id: row.get(2)?,
        occurances: row.get(3)?,
    })
}

impl GraphStore for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, seed: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_runs (seed, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![seed, now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE crawl_runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, seed, started_at, finished_at, config_hash, status
                 FROM crawl_runs ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(RunRecord {
                        id: row.get(0)?,
                        seed: row.get(1)?,
                        started_at: row.get(2)?,
                        finished_at: row.get(3)?,
                        config_hash: row.get(4)?,
                        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
                            .unwrap_or(RunStatus::Failed),
                    })
                },
            )
            .optional()?;

        Ok(run)
    }

    // ===== URLs =====

    fn find_or_create_url(&mut self, url: &str) -> StorageResult<UrlRecord> {
        if let Some(existing) = self.find_url(url)? {
            return Ok(existing);
        }

        self.conn
            .execute("INSERT INTO urls (url) VALUES (?1)", params![url])?;

        Ok(UrlRecord {
            id: self.conn.last_insert_rowid(),
            url: url.to_string(),
            status: None,
        })
    }

    fn find_url(&self, url: &str) -> StorageResult<Option<UrlRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, url, status FROM urls WHERE url = ?1",
                params![url],
                url_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn get_url(&self, url_id: i64) -> StorageResult<UrlRecord> {
        self.conn
            .query_row(
                "SELECT id, url, status FROM urls WHERE id = ?1",
                params![url_id],
                url_from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::UrlNotFound(format!("URL ID {}", url_id)))
    }

    fn set_url_status(&mut self, url_id: i64, status: u16) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE urls SET status = ?1 WHERE id = ?2",
            params![status, url_id],
        )?;
        if updated == 0 {
            return Err(StorageError::UrlNotFound(format!("URL ID {}", url_id)));
        }
        Ok(())
    }

    // ===== Pages =====

    fn find_or_create_page(
        &mut self,
        url: &UrlRecord,
        contents: &str,
        redirections: &[UrlRecord],
    ) -> StorageResult<PageRecord> {
        let page_id = match self.page_for_url(url.id)? {
            Some(page) => {
                self.conn.execute(
                    "UPDATE pages SET contents = ?1 WHERE id = ?2",
                    params![contents, page.id],
                )?;
                page.id
            }
            None => {
                self.conn.execute(
                    "INSERT INTO pages (url_id, contents) VALUES (?1, ?2)",
                    params![url.id, contents],
                )?;
                self.conn.last_insert_rowid()
            }
        };

        for redirected in redirections {
            self.conn.execute(
                "INSERT INTO redirections (url_id, page_id) VALUES (?1, ?2)",
                params![redirected.id, page_id],
            )?;
        }

        self.page_for_url(url.id)?
            .ok_or_else(|| StorageError::PageNotFound(format!("Page for URL {}", url.url)))
    }

    fn get_page_by_url(&self, url_id: i64) -> StorageResult<Option<PageRecord>> {
        self.page_for_url(url_id)
    }

    fn list_pages(&self) -> StorageResult<Vec<PageRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, url_id, parent_id, contents FROM pages ORDER BY id")?;

        let pages = stmt
            .query_map([], page_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    fn page_redirections(&self, page_id: i64) -> StorageResult<Vec<UrlRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT u.id, u.url, u.status FROM redirections r
             JOIN urls u ON u.id = r.url_id
             WHERE r.page_id = ?1 ORDER BY r.rowid",
        )?;

        let urls = stmt
            .query_map(params![page_id], url_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(urls)
    }

    // ===== Links =====

    fn increment_or_create_link(
        &mut self,
        origin_url_id: i64,
        destination_url_id: i64,
    ) -> StorageResult<LinkRecord> {
        // Single statement so the read-modify-write of the counter cannot interleave
        self.conn.execute(
            "INSERT INTO links (origin_url_id, destination_url_id, occurances) VALUES (?1, ?2, 1)
             ON CONFLICT(origin_url_id, destination_url_id)
             DO UPDATE SET occurances = occurances + 1",
            params![origin_url_id, destination_url_id],
        )?;

        let link = self.conn.query_row(
            "SELECT id, origin_url_id, destination_url_id, occurances FROM links
             WHERE origin_url_id = ?1 AND destination_url_id = ?2",
            params![origin_url_id, destination_url_id],
            link_from_row,
        )?;

        Ok(link)
    }

    fn add_link_title(&mut self, link_id: i64, title: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO link_titles (link_id, title) VALUES (?1, ?2)",
            params![link_id, title],
        )?;
        Ok(())
    }

    fn links_from(&self, origin_url_id: i64) -> StorageResult<Vec<LinkRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, origin_url_id, destination_url_id, occurances FROM links
             WHERE origin_url_id = ?1 ORDER BY id",
        )?;

        let links = stmt
            .query_map(params![origin_url_id], link_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn link_titles(&self, link_id: i64) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT title FROM link_titles WHERE link_id = ?1 ORDER BY id")?;

        let titles = stmt
            .query_map(params![link_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(titles)
    }

    // ===== Images =====

    fn find_or_create_image(&mut self, url_id: i64) -> StorageResult<i64> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM images WHERE url_id = ?1",
                params![url_id],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        self.conn
            .execute("INSERT INTO images (url_id) VALUES (?1)", params![url_id])?;
        Ok(self.conn.last_insert_rowid())
    }

    // ===== Statistics =====

    fn count_urls(&self) -> StorageResult<u64> {
        self.count("urls")
    }

    fn count_pages(&self) -> StorageResult<u64> {
        self.count("pages")
    }

    fn count_links(&self) -> StorageResult<u64> {
        self.count("links")
    }

    fn count_link_titles(&self) -> StorageResult<u64> {
        self.count("link_titles")
    }

    fn count_images(&self) -> StorageResult<u64> {
        self.count("images")
    }

    fn count_redirections(&self) -> StorageResult<u64> {
        self.count("redirections")
    }
}
