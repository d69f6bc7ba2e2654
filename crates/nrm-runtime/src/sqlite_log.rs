//! SQLite-backed event log.
//!
//! Every run appends into one `events` table, keyed by run id, so many runs
//! can share a database file without touching each other's rows.

#![cfg(feature = "sqlite")]

use crate::event_log::{EventLog, EventRecord};
use crate::events::TimedEvent;
use crate::summary::RunId;
use nrm_core::error::{NrmError, Result};
use rusqlite::{params, Connection};
use std::path::Path;

pub struct SqliteEventLog {
    conn: Connection,
}

impl SqliteEventLog {
    /// Create a new in-memory event database.
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(sql_error)?;
        Self::init_with_connection(conn)
    }

    /// Create or open a file-backed event database.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path).map_err(sql_error)?;
        Self::init_with_connection(conn)
    }

    fn init_with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id TEXT NOT NULL,
                tick INTEGER NOT NULL,
                kind TEXT NOT NULL,
                payload TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_events_run ON events(run_id, tick);
            "#,
        )
        .map_err(sql_error)?;
        Ok(Self { conn })
    }

    /// Number of events stored for `run`.
    pub fn count(&self, run: RunId) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM events WHERE run_id = ?1",
                params![run.to_string()],
                |row| row.get(0),
            )
            .map_err(sql_error)?;
        Ok(count as usize)
    }

    /// All events of `run`, in append order.
    pub fn records(&self, run: RunId) -> Result<Vec<EventRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT tick, payload FROM events WHERE run_id = ?1 ORDER BY id")
            .map_err(sql_error)?;
        let rows = stmt
            .query_map(params![run.to_string()], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(sql_error)?;

        let mut records = Vec::new();
        for row in rows {
            let (tick, payload) = row.map_err(sql_error)?;
            records.push(EventRecord {
                run_id: run,
                tick: tick as u64,
                event: serde_json::from_str(&payload)?,
            });
        }
        Ok(records)
    }
}

impl EventLog for SqliteEventLog {
    fn append(&mut self, run: RunId, events: &[TimedEvent]) -> Result<()> {
        let run = run.to_string();
        let tx = self.conn.transaction().map_err(sql_error)?;
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO events (run_id, tick, kind, payload) VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(sql_error)?;
            for (tick, event) in events {
                let payload = serde_json::to_string(event)?;
                stmt.execute(params![run, *tick as i64, event.kind(), payload])
                    .map_err(sql_error)?;
            }
        }
        tx.commit().map_err(sql_error)
    }
}

fn sql_error(e: rusqlite::Error) -> NrmError {
    NrmError::persistence(e.to_string())
}
