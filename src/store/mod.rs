//! Append-only SQLite log of telemetry records.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::telemetry::{NewRecord, TelemetryRecord};

mod error;
mod schema;

pub use error::StorageError;
pub use schema::is_valid_identifier;

const COLUMNS: &str =
    "id, timestamp_unix, ts_utc, latitude, longitude, altitude, velocity, extra";

/// Idle read connections kept around for reuse.
const MAX_IDLE_READERS: usize = 4;
const READER_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_path")]
    pub path: PathBuf,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_path() -> PathBuf {
    PathBuf::from("iss_data.db")
}

fn default_table() -> String {
    "telemetry".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            table: default_table(),
        }
    }
}

/// Single writer connection plus, for file-backed stores, a pool of
/// read-only connections. Under WAL a scan on a reader never holds up an
/// insert on the writer. In-memory stores cannot be shared between
/// connections, so they read through the writer.
pub struct Store {
    writer: Mutex<Connection>,
    readers: Mutex<Vec<Connection>>,
    db_path: Option<PathBuf>,
    table: String,
}

impl Store {
    /// Open (or create) a file-backed store and apply the schema.
    pub fn open(config: &StoreConfig) -> Result<Self, StorageError> {
        check_table(&config.table)?;

        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&config.path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::with_connection(conn, &config.table, Some(config.path.clone()))
    }

    pub fn open_in_memory(table: &str) -> Result<Self, StorageError> {
        check_table(table)?;
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, table, None)
    }

    fn with_connection(
        conn: Connection,
        table: &str,
        db_path: Option<PathBuf>,
    ) -> Result<Self, StorageError> {
        conn.execute_batch(&schema::schema(table))?;
        Ok(Self {
            writer: Mutex::new(conn),
            readers: Mutex::new(Vec::new()),
            db_path,
            table: table.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn writer(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.writer.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Run a read on a pooled reader; the pool lock is only held for checkout
    /// and return, never during the query.
    fn read<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let Some(path) = self.db_path.as_deref() else {
            let conn = self.writer()?;
            return f(&conn);
        };

        let pooled = self
            .readers
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?
            .pop();
        let conn = match pooled {
            Some(conn) => conn,
            None => open_reader(path)?,
        };

        let result = f(&conn);

        let mut idle = self.readers.lock().map_err(|_| StorageError::LockPoisoned)?;
        if idle.len() < MAX_IDLE_READERS {
            idle.push(conn);
        }
        result
    }

    /// Append one record, returning its sequence id.
    pub fn insert(&self, record: &NewRecord) -> Result<i64, StorageError> {
        if let Some(field) = record.missing_field() {
            return Err(StorageError::MissingField(field));
        }

        let extra = record
            .extra
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.writer()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (timestamp_unix, ts_utc, latitude, longitude, altitude, velocity, extra)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                self.table
            ),
            params![
                record.observed_at.timestamp(),
                crate::telemetry::format_ts_utc(record.observed_at),
                record.latitude,
                record.longitude,
                record.altitude,
                record.velocity,
                extra,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Record with the greatest sequence id.
    pub fn latest(&self) -> Result<Option<TelemetryRecord>, StorageError> {
        self.read(|conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {COLUMNS} FROM {} ORDER BY id DESC LIMIT 1",
                self.table
            ))?;
            Ok(stmt.query_row([], map_row).optional()?)
        })
    }

    /// Every record, ascending by sequence id.
    pub fn scan_all(&self) -> Result<Vec<TelemetryRecord>, StorageError> {
        self.read(|conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {COLUMNS} FROM {} ORDER BY id ASC",
                self.table
            ))?;
            let rows = stmt.query_map([], map_row)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    /// Records observed at or after `cutoff`, ascending by sequence id.
    pub fn scan_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<TelemetryRecord>, StorageError> {
        self.read(|conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {COLUMNS} FROM {} WHERE timestamp_unix >= ?1 ORDER BY id ASC",
                self.table
            ))?;
            let rows = stmt.query_map(params![cutoff.timestamp()], map_row)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    pub fn count(&self) -> Result<u64, StorageError> {
        self.read(|conn| {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", self.table),
                [],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
    }

    /// Remove every record. Administrative only.
    pub fn clear(&self) -> Result<usize, StorageError> {
        let conn = self.writer()?;
        let removed = conn.execute(&format!("DELETE FROM {}", self.table), [])?;
        Ok(removed)
    }
}

fn open_reader(path: &Path) -> Result<Connection, StorageError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(READER_BUSY_TIMEOUT)?;
    Ok(conn)
}

fn check_table(table: &str) -> Result<(), StorageError> {
    if schema::is_valid_identifier(table) {
        Ok(())
    } else {
        Err(StorageError::InvalidTable(table.to_string()))
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<TelemetryRecord> {
    let extra = row
        .get::<_, Option<String>>(7)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

    Ok(TelemetryRecord {
        sequence_id: row.get(0)?,
        timestamp_unix: row.get(1)?,
        ts_utc: row.get(2)?,
        latitude: row.get(3)?,
        longitude: row.get(4)?,
        altitude: row.get(5)?,
        velocity: row.get(6)?,
        extra,
    })
}
