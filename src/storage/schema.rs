//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Link-Weaver link graph.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS crawl_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seed TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Every canonical URL ever discovered or visited
CREATE TABLE IF NOT EXISTS urls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    status INTEGER
);

-- Fetched HTML representation of a URL (at most one per URL)
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    url_id INTEGER NOT NULL UNIQUE REFERENCES urls(id),
    parent_id INTEGER,
    contents TEXT NOT NULL
);

-- URLs that redirected into a page
CREATE TABLE IF NOT EXISTS redirections (
    url_id INTEGER NOT NULL REFERENCES urls(id),
    page_id INTEGER NOT NULL REFERENCES pages(id)
);

CREATE INDEX IF NOT EXISTS idx_redirections_page ON redirections(page_id);

-- Directed edges between URLs
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    origin_url_id INTEGER NOT NULL REFERENCES urls(id),
    destination_url_id INTEGER NOT NULL REFERENCES urls(id),
    occurances INTEGER NOT NULL DEFAULT 1 CHECK (occurances >= 1),
    UNIQUE(origin_url_id, destination_url_id)
);

CREATE INDEX IF NOT EXISTS idx_links_origin ON links(origin_url_id);

-- Anchor titles and inner texts seen for a link
CREATE TABLE IF NOT EXISTS link_titles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    link_id INTEGER NOT NULL REFERENCES links(id),
    title TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_link_titles_link ON link_titles(link_id);

-- Image references
CREATE TABLE IF NOT EXISTS images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url_id INTEGER NOT NULL UNIQUE REFERENCES urls(id)
);

CREATE TABLE IF NOT EXISTS images_titles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    image_id INTEGER NOT NULL REFERENCES images(id),
    title TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pages_images (
    image_id INTEGER NOT NULL REFERENCES images(id),
    page_id INTEGER NOT NULL REFERENCES pages(id)
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
