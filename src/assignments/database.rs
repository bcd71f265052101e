/// Assignments Database Module
///
/// SQLite persistence for character assignments and the settings table.
/// One connection behind a mutex; `close()` releases it explicitly.
use crate::errors::{ConfigurationError, HolderWorldError, HolderWorldResult};
use crate::logger::{self, LogTag};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Busy timeout for concurrent writers on the same file
const BUSY_TIMEOUT_MS: u64 = 30_000;

/// Persisted character assignment, keyed by wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub owner: String,
    pub mint: String,
    pub char_id: u32,
    pub balance: f64,
    pub updated_at: DateTime<Utc>,
}

pub struct AssignmentsDatabase {
    conn: Mutex<Option<Connection>>,
    location: String,
}

impl AssignmentsDatabase {
    /// Open (or create) a database file
    pub fn open(path: &Path) -> HolderWorldResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ConfigurationError::Generic(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let conn = Connection::open(path)?;
        // Switching to WAL takes a lock another process may hold
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::with_connection(conn, path.display().to_string())
    }

    /// In-process database, gone when dropped
    pub fn open_in_memory() -> HolderWorldResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, ":memory:".to_string())
    }

    fn with_connection(conn: Connection, location: String) -> HolderWorldResult<Self> {
        initialize_schema(&conn)?;

        logger::info(
            LogTag::Store,
            &format!("Assignments database initialized at {}", location),
        );

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            location,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> HolderWorldResult<T> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or_else(|| {
            HolderWorldError::from(ConfigurationError::Generic(
                "Assignments database is closed".to_string(),
            ))
        })?;
        Ok(f(conn)?)
    }

    /// Insert a new assignment unless the wallet already has one
    ///
    /// Returns true when the row was inserted. The primary key makes this
    /// atomic per wallet: a concurrent duplicate insert is ignored.
    pub fn insert_if_absent(&self, assignment: &Assignment) -> HolderWorldResult<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO assignments (owner, mint, char_id, balance, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(owner) DO NOTHING",
                params![
                    assignment.owner,
                    assignment.mint,
                    assignment.char_id,
                    assignment.balance,
                    assignment.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(inserted == 1)
        })
    }

    /// Refresh balance and timestamp of an existing wallet; returns rows changed
    pub fn update_balance(
        &self,
        owner: &str,
        balance: f64,
        updated_at: DateTime<Utc>,
    ) -> HolderWorldResult<usize> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE assignments SET balance = ?1, updated_at = ?2 WHERE owner = ?3",
                params![balance, updated_at.to_rfc3339(), owner],
            )
        })
    }

    pub fn get_assignment(&self, owner: &str) -> HolderWorldResult<Option<Assignment>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT owner, mint, char_id, balance, updated_at FROM assignments WHERE owner = ?1",
                params![owner],
                row_to_assignment,
            )
            .optional()
        })
    }

    /// Assignments of `mint` with balance >= `min`, largest balance first
    pub fn list_for_mint(&self, mint: &str, min: f64) -> HolderWorldResult<Vec<Assignment>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT owner, mint, char_id, balance, updated_at FROM assignments
                 WHERE mint = ?1 AND balance >= ?2
                 ORDER BY balance DESC, owner ASC",
            )?;
            let rows = stmt.query_map(params![mint, min], row_to_assignment)?;
            rows.collect()
        })
    }

    pub fn count(&self) -> HolderWorldResult<usize> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM assignments", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as usize)
        })
    }

    /// Delete every assignment; returns the number removed
    pub fn delete_all(&self) -> HolderWorldResult<usize> {
        self.with_conn(|conn| conn.execute("DELETE FROM assignments", []))
    }

    pub fn get_setting(&self, key: &str) -> HolderWorldResult<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
        })
    }

    pub fn set_setting(&self, key: &str, value: &str) -> HolderWorldResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })
    }

    /// Close the connection; later calls fail with a configuration error
    pub fn close(&self) -> HolderWorldResult<()> {
        let conn = self.conn.lock().take();
        if let Some(conn) = conn {
            conn.close().map_err(|(_, e)| HolderWorldError::Store(e))?;
            logger::info(
                LogTag::Store,
                &format!("Assignments database closed ({})", self.location),
            );
        }
        Ok(())
    }
}

fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS assignments (
            owner TEXT PRIMARY KEY,
            mint TEXT NOT NULL,
            char_id INTEGER NOT NULL,
            balance REAL NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_assignments_mint_balance
            ON assignments(mint, balance DESC);
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
}

fn row_to_assignment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Assignment> {
    let updated_at: String = row.get(4)?;
    let updated_at = DateTime::parse_from_rfc3339(&updated_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Assignment {
        owner: row.get(0)?,
        mint: row.get(1)?,
        char_id: row.get(2)?,
        balance: row.get(3)?,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(owner: &str, char_id: u32, balance: f64) -> Assignment {
        Assignment {
            owner: owner.to_string(),
            mint: "MintA".to_string(),
            char_id,
            balance,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_only_once() {
        let db = AssignmentsDatabase::open_in_memory().unwrap();
        assert!(db.insert_if_absent(&assignment("W1", 1, 100.0)).unwrap());
        assert!(!db.insert_if_absent(&assignment("W1", 2, 999.0)).unwrap());

        let stored = db.get_assignment("W1").unwrap().unwrap();
        assert_eq!(stored.char_id, 1);
        assert_eq!(stored.balance, 100.0);
    }

    #[test]
    fn test_update_balance() {
        let db = AssignmentsDatabase::open_in_memory().unwrap();
        db.insert_if_absent(&assignment("W1", 2, 100.0)).unwrap();

        assert_eq!(db.update_balance("W1", 250.0, Utc::now()).unwrap(), 1);
        assert_eq!(db.update_balance("missing", 1.0, Utc::now()).unwrap(), 0);

        let stored = db.get_assignment("W1").unwrap().unwrap();
        assert_eq!(stored.balance, 250.0);
        assert_eq!(stored.char_id, 2);
    }

    #[test]
    fn test_list_filters_and_orders() {
        let db = AssignmentsDatabase::open_in_memory().unwrap();
        db.insert_if_absent(&assignment("B", 1, 500.0)).unwrap();
        db.insert_if_absent(&assignment("A", 1, 500.0)).unwrap();
        db.insert_if_absent(&assignment("C", 2, 50.0)).unwrap();
        db.insert_if_absent(&assignment("D", 2, 900.0)).unwrap();
        let mut other = assignment("E", 1, 10_000.0);
        other.mint = "MintB".to_string();
        db.insert_if_absent(&other).unwrap();

        let owners: Vec<String> = db
            .list_for_mint("MintA", 100.0)
            .unwrap()
            .into_iter()
            .map(|a| a.owner)
            .collect();
        assert_eq!(owners, vec!["D", "A", "B"]);
    }

    #[test]
    fn test_delete_all_and_count() {
        let db = AssignmentsDatabase::open_in_memory().unwrap();
        for owner in ["A", "B", "C"] {
            db.insert_if_absent(&assignment(owner, 1, 1.0)).unwrap();
        }
        assert_eq!(db.count().unwrap(), 3);
        assert_eq!(db.delete_all().unwrap(), 3);
        assert_eq!(db.count().unwrap(), 0);
        assert_eq!(db.delete_all().unwrap(), 0);
    }

    #[test]
    fn test_settings_roundtrip() {
        let db = AssignmentsDatabase::open_in_memory().unwrap();
        assert_eq!(db.get_setting("tokenMint").unwrap(), None);
        db.set_setting("tokenMint", "MintA").unwrap();
        db.set_setting("tokenMint", "MintB").unwrap();
        assert_eq!(db.get_setting("tokenMint").unwrap(), Some("MintB".to_string()));
    }

    #[test]
    fn test_file_database_persists_and_closes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("world.db");

        let db = AssignmentsDatabase::open(&path).unwrap();
        db.insert_if_absent(&assignment("W1", 2, 10.0)).unwrap();
        db.close().unwrap();
        assert!(db.count().is_err());

        let reopened = AssignmentsDatabase::open(&path).unwrap();
        assert_eq!(reopened.get_assignment("W1").unwrap().unwrap().char_id, 2);
    }

    #[test]
    fn test_open_waits_for_locked_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.db");

        let holder = Connection::open(&path).unwrap();
        holder
            .execute_batch("BEGIN EXCLUSIVE; CREATE TABLE other_writer (id INTEGER);")
            .unwrap();
        let release = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(300));
            holder.execute_batch("COMMIT;").unwrap();
        });

        let db = AssignmentsDatabase::open(&path).unwrap();
        release.join().unwrap();

        let timeout: i64 = db
            .with_conn(|conn| conn.query_row("PRAGMA busy_timeout", [], |row| row.get(0)))
            .unwrap();
        assert_eq!(timeout, BUSY_TIMEOUT_MS as i64);
        let journal: String = db
            .with_conn(|conn| conn.query_row("PRAGMA journal_mode", [], |row| row.get(0)))
            .unwrap();
        assert_eq!(journal, "wal");
    }
}
