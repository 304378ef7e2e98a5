//! Durable offline store backed by SQLite.
//!
//! Two kinds of state survive restarts: whole-namespace content snapshots
//! (replaced wholesale on refresh, never merged) and bookmarks created while
//! the server was unreachable.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::warn;

use crate::content::{Bookmark, ContentRecord, ContentType};

/// Errors from the offline store. Callers treat every variant as
/// "no cached data" rather than a hard fault.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("offline store unavailable: {0}")]
  Unavailable(String),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("failed to serialize snapshot: {0}")]
  Serialize(#[from] serde_json::Error),
}

/// Schema for the offline store.
const SCHEMA: &str = r#"
-- One row per namespace, holding the last full snapshot as JSON
CREATE TABLE IF NOT EXISTS snapshots (
    content_type TEXT PRIMARY KEY,
    data BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Bookmarks created while offline, pending nothing: they are merged into
-- reads and removed on toggle-off, never pushed to the server
CREATE TABLE IF NOT EXISTS local_bookmarks (
    id INTEGER PRIMARY KEY,
    content_type TEXT NOT NULL,
    content_id INTEGER NOT NULL,
    user_id TEXT NOT NULL DEFAULT 'default',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (content_type, content_id, user_id)
);
"#;

/// SQLite-backed offline store.
pub struct OfflineStore {
  conn: Mutex<Connection>,
}

impl OfflineStore {
  /// Open or create the store at the default location.
  pub fn open() -> Result<Self, StoreError> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open or create the store at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self, StoreError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| StoreError::Unavailable(format!("cannot create {}: {}", parent.display(), e)))?;
    }

    let conn = Connection::open(path).map_err(|e| {
      StoreError::Unavailable(format!("cannot open {}: {}", path.display(), e))
    })?;

    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;

    Ok(store)
  }

  /// Default database path under the platform data directory.
  fn default_path() -> Result<PathBuf, StoreError> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| StoreError::Unavailable("could not determine data directory".to_string()))?;

    Ok(data_dir.join("catechist").join("cache.db"))
  }

  fn run_migrations(&self) -> Result<(), StoreError> {
    let conn = self.lock()?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
    self
      .conn
      .lock()
      .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
  }

  /// Replace the snapshot for a namespace. All-or-nothing: readers see
  /// either the previous snapshot or the new one, never a mix.
  pub fn put_snapshot(
    &self,
    content_type: ContentType,
    records: &[ContentRecord],
  ) -> Result<(), StoreError> {
    let data = serde_json::to_vec(records)?;
    let conn = self.lock()?;
    conn.execute(
      "INSERT OR REPLACE INTO snapshots (content_type, data, cached_at)
       VALUES (?, ?, datetime('now'))",
      params![content_type.as_str(), data],
    )?;
    Ok(())
  }

  /// The last-written snapshot for a namespace, or an empty list if the
  /// namespace was never primed. A snapshot that no longer decodes is
  /// logged and served as empty.
  pub fn get_snapshot(&self, content_type: ContentType) -> Result<Vec<ContentRecord>, StoreError> {
    let conn = self.lock()?;
    let data: Option<Vec<u8>> = conn
      .query_row(
        "SELECT data FROM snapshots WHERE content_type = ?",
        params![content_type.as_str()],
        |row| row.get(0),
      )
      .optional()?;

    let Some(data) = data else {
      return Ok(Vec::new());
    };

    match serde_json::from_slice(&data) {
      Ok(records) => Ok(records),
      Err(err) => {
        warn!(content_type = %content_type, %err, "discarding undecodable snapshot");
        Ok(Vec::new())
      }
    }
  }

  /// Insert a locally created bookmark. Upserts by triple, so retrying an
  /// offline toggle cannot produce duplicate rows.
  pub fn add_local_bookmark(&self, bookmark: &Bookmark) -> Result<(), StoreError> {
    let conn = self.lock()?;
    conn.execute(
      "INSERT OR REPLACE INTO local_bookmarks (id, content_type, content_id, user_id, created_at)
       VALUES (?, ?, ?, ?, ?)",
      params![
        bookmark.id,
        bookmark.content_type.as_str(),
        bookmark.content_id,
        bookmark.user_id,
        bookmark
          .created_at
          .unwrap_or_else(Utc::now)
          .to_rfc3339(),
      ],
    )?;
    Ok(())
  }

  /// Remove a locally created bookmark by triple. Returns whether a row
  /// existed.
  pub fn remove_local_bookmark(
    &self,
    content_type: ContentType,
    content_id: i64,
    user_id: &str,
  ) -> Result<bool, StoreError> {
    let conn = self.lock()?;
    let deleted = conn.execute(
      "DELETE FROM local_bookmarks WHERE content_type = ? AND content_id = ? AND user_id = ?",
      params![content_type.as_str(), content_id, user_id],
    )?;
    Ok(deleted > 0)
  }

  /// All locally created bookmarks for a user.
  pub fn local_bookmarks(&self, user_id: &str) -> Result<Vec<Bookmark>, StoreError> {
    let conn = self.lock()?;
    let mut stmt = conn.prepare(
      "SELECT id, content_type, content_id, user_id, created_at
       FROM local_bookmarks WHERE user_id = ? ORDER BY created_at",
    )?;

    let rows = stmt.query_map(params![user_id], |row| {
      let content_type: String = row.get(1)?;
      let created_at: String = row.get(4)?;
      Ok((
        row.get::<_, i64>(0)?,
        content_type,
        row.get::<_, i64>(2)?,
        row.get::<_, String>(3)?,
        created_at,
      ))
    })?;

    let mut bookmarks = Vec::new();
    for row in rows {
      let (id, content_type, content_id, user_id, created_at) = row?;
      let Ok(content_type) = content_type.parse::<ContentType>() else {
        warn!(content_type = %content_type, "skipping local bookmark with unknown namespace");
        continue;
      };
      bookmarks.push(Bookmark {
        id,
        content_type,
        content_id,
        user_id,
        created_at: DateTime::parse_from_rfc3339(&created_at)
          .ok()
          .map(|dt| dt.with_timezone(&Utc)),
      });
    }
    Ok(bookmarks)
  }
}
