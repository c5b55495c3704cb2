use super::{record_id, Indexer};
use crate::error::CrawlResult;
use crate::types::FileEntry;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS files (
        id          TEXT PRIMARY KEY,
        filename    TEXT NOT NULL,
        size        INTEGER NOT NULL,
        indexed_at  TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS locations (
        file_id  TEXT NOT NULL REFERENCES files(id) ON DELETE CASCADE,
        url      TEXT NOT NULL,
        path     TEXT NOT NULL,
        PRIMARY KEY (file_id, url, path)
    );
    CREATE INDEX IF NOT EXISTS idx_files_filename ON files(filename);
";

/// Local SQLite store. Re-indexing the same `url|path` overwrites the row.
pub struct SqliteIndex {
    conn: Mutex<Connection>,
}

impl SqliteIndex {
    pub fn open(path: impl AsRef<Path>) -> CrawlResult<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> CrawlResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> CrawlResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of distinct files stored.
    pub fn count(&self) -> CrawlResult<usize> {
        let n: i64 = self
            .lock()
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Filename and size stored under `id`.
    pub fn lookup(&self, id: &str) -> CrawlResult<Option<(String, u64)>> {
        let row = self
            .lock()
            .query_row(
                "SELECT filename, size FROM files WHERE id = ?1",
                params![id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;
        Ok(row.map(|(name, size)| (name, size.max(0) as u64)))
    }

    /// `(url, path)` pairs recorded for `id`.
    pub fn locations(&self, id: &str) -> CrawlResult<Vec<(String, String)>> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT url, path FROM locations WHERE file_id = ?1 ORDER BY url, path")?;
        let rows = stmt.query_map(params![id], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Indexer for SqliteIndex {
    fn add_file_entry(&self, entry: FileEntry) -> CrawlResult<String> {
        let id = record_id(&entry);
        let size = i64::try_from(entry.size()).unwrap_or(i64::MAX);
        let now = Utc::now().to_rfc3339();

        let mut conn = self.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO files (id, filename, size, indexed_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                filename = excluded.filename,
                size = excluded.size,
                indexed_at = excluded.indexed_at",
            params![id, entry.filename(), size, now],
        )?;
        for loc in entry.servers() {
            tx.execute(
                "INSERT OR IGNORE INTO locations (file_id, url, path) VALUES (?1, ?2, ?3)",
                params![id, loc.url(), loc.path()],
            )?;
        }
        tx.commit()?;
        Ok(id)
    }
}
