//! Output seams: a message queue and a keyed item table.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::PipelineError;
use crate::storage::is_plain_name;

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

pub trait MessageQueue {
    /// Enqueue one message body. Returns the message id.
    fn send_message(&self, queue: &str, body: &str) -> Result<String, PipelineError>;
}

/// Spool-directory queue: each message is `<dir>/<queue>/<seq>-<id>.json`.
/// `seq` is zero-padded so a directory listing replays send order.
#[derive(Debug, Clone)]
pub struct SpoolQueue {
    dir: PathBuf,
}

impl SpoolQueue {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Message bodies of `queue` in send order.
    pub fn drain_order(&self, queue: &str) -> Result<Vec<String>, PipelineError> {
        let dir = self.dir.join(queue);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)
            .map_err(|e| PipelineError::Queue(format!("cannot list {}: {e}", dir.display())))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        paths
            .iter()
            .map(|p| {
                std::fs::read_to_string(p)
                    .map_err(|e| PipelineError::Queue(format!("cannot read {}: {e}", p.display())))
            })
            .collect()
    }
}

impl MessageQueue for SpoolQueue {
    fn send_message(&self, queue: &str, body: &str) -> Result<String, PipelineError> {
        if !is_plain_name(queue) {
            return Err(PipelineError::Queue(format!("invalid queue name '{queue}'")));
        }
        let dir = self.dir.join(queue);
        std::fs::create_dir_all(&dir)
            .map_err(|e| PipelineError::Queue(format!("cannot create {}: {e}", dir.display())))?;

        let seq = last_seq(&dir)? + 1;
        let id = uuid::Uuid::new_v4().to_string();
        let path = dir.join(format!("{seq:08}-{id}.json"));

        std::fs::write(&path, body)
            .map_err(|e| PipelineError::Queue(format!("cannot write {}: {e}", path.display())))?;
        Ok(id)
    }
}

/// Highest `seq` prefix among spooled messages, 0 when empty. A new message
/// always sorts after every message still in the spool.
fn last_seq(dir: &Path) -> Result<u64, PipelineError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| PipelineError::Queue(format!("cannot list {}: {e}", dir.display())))?;

    let mut last = 0;
    for entry in entries {
        let entry = entry.map_err(|e| PipelineError::Queue(e.to_string()))?;
        let name = entry.file_name();
        let seq = name
            .to_str()
            .and_then(|n| n.split_once('-'))
            .and_then(|(prefix, _)| prefix.parse::<u64>().ok());
        if let Some(seq) = seq {
            last = last.max(seq);
        }
    }
    Ok(last)
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

pub trait ItemTable {
    /// Insert or replace the item stored under `key`.
    fn put_item(&self, table: &str, key: &str, item: &serde_json::Value) -> Result<(), PipelineError>;
}

/// SQLite-backed table. Each logical table is created on first write as
/// `(pk TEXT PRIMARY KEY, item TEXT, written_at TEXT)`.
///
/// The database file is opened on first use, so a run that never writes
/// leaves no file behind.
pub struct SqliteTable {
    path: PathBuf,
    conn: OnceCell<Connection>,
}

impl SqliteTable {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), conn: OnceCell::new() }
    }

    pub fn in_memory() -> Result<Self, PipelineError> {
        let conn = Connection::open_in_memory().map_err(|e| PipelineError::Table(e.to_string()))?;
        Ok(Self { path: PathBuf::from(":memory:"), conn: OnceCell::from(conn) })
    }

    fn conn(&self) -> Result<&Connection, PipelineError> {
        if let Some(conn) = self.conn.get() {
            return Ok(conn);
        }
        let conn = Connection::open(&self.path)
            .map_err(|e| PipelineError::Table(format!("cannot open {}: {e}", self.path.display())))?;
        Ok(self.conn.get_or_init(|| conn))
    }

    fn ensure_table(&self, table: &str) -> Result<(), PipelineError> {
        if !partner_recon::config::is_sql_identifier(table) {
            return Err(PipelineError::Table(format!("invalid table name '{table}'")));
        }
        self.conn()?
            .execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    pk TEXT PRIMARY KEY,
                    item TEXT NOT NULL,
                    written_at TEXT NOT NULL
                );"
            ))
            .map_err(|e| PipelineError::Table(e.to_string()))
    }

    /// Stored item JSON for `key`, if any.
    pub fn get_item(&self, table: &str, key: &str) -> Result<Option<serde_json::Value>, PipelineError> {
        self.ensure_table(table)?;
        let raw: Option<String> = self
            .conn()?
            .query_row(&format!("SELECT item FROM {table} WHERE pk = ?1"), params![key], |row| row.get(0))
            .optional()
            .map_err(|e| PipelineError::Table(e.to_string()))?;

        raw.map(|s| serde_json::from_str(&s).map_err(|e| PipelineError::Table(e.to_string())))
            .transpose()
    }

    pub fn count(&self, table: &str) -> Result<usize, PipelineError> {
        self.ensure_table(table)?;
        let n: i64 = self
            .conn()?
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .map_err(|e| PipelineError::Table(e.to_string()))?;
        Ok(n as usize)
    }
}

impl ItemTable for SqliteTable {
    fn put_item(&self, table: &str, key: &str, item: &serde_json::Value) -> Result<(), PipelineError> {
        self.ensure_table(table)?;
        let body = serde_json::to_string(item).map_err(|e| PipelineError::Table(e.to_string()))?;
        self.conn()?
            .execute(
                &format!(
                    "INSERT INTO {table} (pk, item, written_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(pk) DO UPDATE SET item = excluded.item, written_at = excluded.written_at"
                ),
                params![key, body, chrono::Utc::now().to_rfc3339()],
            )
            .map_err(|e| PipelineError::Table(e.to_string()))?;
        Ok(())
    }
}
