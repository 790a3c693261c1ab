//! Persistent storage using SQLite (rusqlite)
//!
//! This module provides:
//! - OS-standard data directory location (via `directories` crate)
//! - SQLite database with schema versioning
//! - Best time per mode
//! - Append-only history of finished sessions

use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;

/// Current schema version. Bump this when making schema changes.
/// Version history:
/// - v1: meta and records tables
/// - v2: Added runs table
const SCHEMA_VERSION: u32 = 2;

/// File name of the database inside the data directory
const DB_FILE: &str = "wordfall.db";

/// Errors that can occur during storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// Database error from SQLite
    Database(rusqlite::Error),
    /// Could not determine data directory
    NoDataDirectory,
    /// Schema version mismatch (future version)
    FutureSchemaVersion { found: u32, supported: u32 },
    /// Failed to create data directory
    CreateDirFailed(std::io::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Database(e) => write!(f, "database error: {}", e),
            StorageError::NoDataDirectory => write!(f, "could not determine data directory"),
            StorageError::FutureSchemaVersion { found, supported } => {
                write!(
                    f,
                    "database schema version {} is newer than supported version {}",
                    found, supported
                )
            }
            StorageError::CreateDirFailed(e) => write!(f, "failed to create data directory: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Database(e)
    }
}

/// One finished session, as kept in the run history.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    /// Mode key (see `GameMode::key`)
    pub mode: String,
    pub aborted: bool,
    /// Active play time in seconds
    pub elapsed: f64,
    pub words: u32,
    pub letters: u32,
    pub accuracy: f64,
    /// Mode-specific score (rhythm dance points, otherwise words)
    pub score: i64,
    /// Unix timestamp (milliseconds)
    pub finished_at: i64,
}

/// The main storage handle for wordfall data.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open or create the storage database.
    ///
    /// Uses OS-standard directories:
    /// - Linux: `$XDG_DATA_HOME/wordfall/` or `~/.local/share/wordfall/`
    /// - macOS: `~/Library/Application Support/wordfall/`
    pub fn open() -> Result<Self, StorageError> {
        let data_dir = Self::data_dir()?;

        // Ensure directory exists
        std::fs::create_dir_all(&data_dir).map_err(StorageError::CreateDirFailed)?;

        let conn = Connection::open(data_dir.join(DB_FILE))?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        let storage = Storage { conn };
        storage.initialize_schema()?;
        Ok(storage)
    }

    /// Get the OS-standard data directory for wordfall
    pub fn data_dir() -> Result<PathBuf, StorageError> {
        ProjectDirs::from("", "", "wordfall")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(StorageError::NoDataDirectory)
    }

    /// Best time in seconds for a mode, if one was recorded
    pub fn best_time(&self, mode: &str) -> Result<Option<f64>, StorageError> {
        let best = self
            .conn
            .query_row(
                "SELECT best_time FROM records WHERE mode = ?1",
                params![mode],
                |row| row.get(0),
            )
            .optional()?;
        Ok(best)
    }

    /// Store `secs` as the best time if it beats the current record.
    ///
    /// Returns true if the record was written.
    pub fn record_best_time(&self, mode: &str, secs: f64) -> Result<bool, StorageError> {
        if let Some(best) = self.best_time(mode)? {
            if secs >= best {
                return Ok(false);
            }
        }

        self.conn.execute(
            "INSERT INTO records (mode, best_time, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(mode) DO UPDATE SET best_time = excluded.best_time, updated_at = excluded.updated_at",
            params![mode, secs, now_millis()],
        )?;
        Ok(true)
    }

    /// Append a finished session to the history.
    pub fn append_run(&self, run: &RunRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO runs (mode, aborted, elapsed, words, letters, accuracy, score, finished_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                run.mode,
                run.aborted,
                run.elapsed,
                run.words,
                run.letters,
                run.accuracy,
                run.score,
                run.finished_at
            ],
        )?;
        Ok(())
    }

    /// Most recent sessions, newest first.
    pub fn recent_runs(&self, limit: usize) -> Result<Vec<RunRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT mode, aborted, elapsed, words, letters, accuracy, score, finished_at
             FROM runs ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(RunRecord {
                mode: row.get(0)?,
                aborted: row.get(1)?,
                elapsed: row.get(2)?,
                words: row.get(3)?,
                letters: row.get(4)?,
                accuracy: row.get(5)?,
                score: row.get(6)?,
                finished_at: row.get(7)?,
            })
        })?;

        let mut runs = Vec::new();
        for row in rows {
            runs.push(row?);
        }
        Ok(runs)
    }

    // Private helper methods

    fn initialize_schema(&self) -> Result<(), StorageError> {
        let current_version = self.get_schema_version()?;

        if current_version == 0 {
            // Fresh database, create the full schema
            self.create_schema_v1()?;
            self.migrate_schema(1)?;
        } else if current_version < SCHEMA_VERSION {
            self.migrate_schema(current_version)?;
        } else if current_version > SCHEMA_VERSION {
            // Database is from a newer version of wordfall
            return Err(StorageError::FutureSchemaVersion {
                found: current_version,
                supported: SCHEMA_VERSION,
            });
        }

        Ok(())
    }

    fn get_schema_version(&self) -> Result<u32, StorageError> {
        let table_exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='meta'",
            [],
            |row| row.get(0),
        )?;

        if !table_exists {
            return Ok(0);
        }

        let version: Option<u32> = self
            .conn
            .query_row("SELECT schema_version FROM meta LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(version.unwrap_or(0))
    }

    fn create_schema_v1(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            -- Meta table: stores schema version
            CREATE TABLE meta (
                schema_version INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            -- Best time per mode, in seconds
            CREATE TABLE records (
                mode TEXT PRIMARY KEY,
                best_time REAL NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        self.conn.execute(
            "INSERT INTO meta (schema_version, created_at) VALUES (?1, ?2)",
            params![1, now_millis()],
        )?;

        Ok(())
    }

    fn migrate_schema(&self, from_version: u32) -> Result<(), StorageError> {
        let mut current_version = from_version;

        while current_version < SCHEMA_VERSION {
            if current_version == 1 {
                self.migrate_v1_to_v2()?;
            }
            current_version += 1;
        }

        self.conn.execute(
            "UPDATE meta SET schema_version = ?1",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Migrate from schema v1 to v2: Add run history
    fn migrate_v1_to_v2(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                mode TEXT NOT NULL,
                aborted INTEGER NOT NULL,
                elapsed REAL NOT NULL,
                words INTEGER NOT NULL,
                letters INTEGER NOT NULL,
                accuracy REAL NOT NULL,
                score INTEGER NOT NULL,
                finished_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_runs_mode ON runs (mode);
            "#,
        )?;

        Ok(())
    }
}

/// Current Unix time in milliseconds
pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(mode: &str, score: i64) -> RunRecord {
        RunRecord {
            mode: mode.to_string(),
            aborted: false,
            elapsed: 12.5,
            words: 10,
            letters: 52,
            accuracy: 97.5,
            score,
            finished_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_storage_creation() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.best_time("speed_run").unwrap(), None);
        assert!(storage.recent_runs(5).unwrap().is_empty());
    }

    #[test]
    fn test_best_time_written_when_none() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(storage.record_best_time("speed_run", 12.3).unwrap());
        assert_eq!(storage.best_time("speed_run").unwrap(), Some(12.3));
    }

    #[test]
    fn test_best_time_only_improves() {
        let storage = Storage::open_in_memory().unwrap();
        storage.record_best_time("speed_run", 10.0).unwrap();

        assert!(!storage.record_best_time("speed_run", 11.0).unwrap());
        assert!(!storage.record_best_time("speed_run", 10.0).unwrap());
        assert_eq!(storage.best_time("speed_run").unwrap(), Some(10.0));

        assert!(storage.record_best_time("speed_run", 9.5).unwrap());
        assert_eq!(storage.best_time("speed_run").unwrap(), Some(9.5));
    }

    #[test]
    fn test_best_time_is_per_mode() {
        let storage = Storage::open_in_memory().unwrap();
        storage.record_best_time("speed_run", 10.0).unwrap();
        assert_eq!(storage.best_time("classic").unwrap(), None);
    }

    #[test]
    fn test_recent_runs_newest_first() {
        let storage = Storage::open_in_memory().unwrap();
        storage.append_run(&run("classic", 1)).unwrap();
        storage.append_run(&run("countdown", 2)).unwrap();
        storage.append_run(&run("rhythm_dance", -3)).unwrap();

        let runs = storage.recent_runs(2).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], run("rhythm_dance", -3));
        assert_eq!(runs[1].mode, "countdown");
    }

    #[test]
    fn test_data_dir() {
        // This might fail in weird environments, but should work on Linux/macOS
        if let Ok(path) = Storage::data_dir() {
            assert!(path.to_string_lossy().contains("wordfall"));
        }
    }

    // === Schema Migration Tests ===

    #[test]
    fn test_schema_version_is_current() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.get_schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_migrates_v1_database() {
        let conn = Connection::open_in_memory().unwrap();
        let v1 = Storage { conn };
        v1.create_schema_v1().unwrap();
        v1.record_best_time("speed_run", 8.0).unwrap();
        assert_eq!(v1.get_schema_version().unwrap(), 1);

        let storage = Storage::with_connection(v1.conn).unwrap();
        assert_eq!(storage.get_schema_version().unwrap(), SCHEMA_VERSION);
        assert_eq!(storage.best_time("speed_run").unwrap(), Some(8.0));
        storage.append_run(&run("classic", 4)).unwrap();
        assert_eq!(storage.recent_runs(10).unwrap().len(), 1);
    }

    #[test]
    fn test_future_schema_rejected() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .conn
            .execute("UPDATE meta SET schema_version = 99", [])
            .unwrap();

        match Storage::with_connection(storage.conn) {
            Err(StorageError::FutureSchemaVersion { found, supported }) => {
                assert_eq!(found, 99);
                assert_eq!(supported, SCHEMA_VERSION);
            }
            other => panic!("expected future schema error, got {:?}", other.err()),
        }
    }
}
