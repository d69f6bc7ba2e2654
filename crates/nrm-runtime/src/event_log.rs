//! Append-only event logs.
//!
//! The experiment driver drains the swarm's captured events after each step
//! and hands them to an [`EventLog`]. Logs are keyed by run id so concurrent
//! runs never share a destination. The swarm never reads a log back.

use crate::events::{SwarmEvent, TimedEvent};
use crate::summary::RunId;
use nrm_core::error::Result;
use nrm_core::types::Tick;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// One persisted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub run_id: RunId,
    pub tick: Tick,
    pub event: SwarmEvent,
}

/// Sink for swarm events.
pub trait EventLog {
    /// Append a batch of events for `run`.
    fn append(&mut self, run: RunId, events: &[TimedEvent]) -> Result<()>;

    /// Make everything appended so far durable.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// In-memory log, mostly for tests and short interactive runs.
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    records: Vec<EventRecord>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl EventLog for MemoryEventLog {
    fn append(&mut self, run: RunId, events: &[TimedEvent]) -> Result<()> {
        self.records.extend(events.iter().map(|(tick, event)| EventRecord {
            run_id: run,
            tick: *tick,
            event: event.clone(),
        }));
        Ok(())
    }
}

/// Writes one JSON object per line to `<dir>/<run_id>.events.jsonl`.
pub struct JsonlEventLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonlEventLog {
    /// Create the log file for `run` inside `dir`, creating `dir` if needed.
    pub fn create(dir: &Path, run: RunId) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{run}.events.jsonl"));
        let file = File::create(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventLog for JsonlEventLog {
    fn append(&mut self, run: RunId, events: &[TimedEvent]) -> Result<()> {
        for (tick, event) in events {
            let record = EventRecord {
                run_id: run,
                tick: *tick,
                event: event.clone(),
            };
            serde_json::to_writer(&mut self.writer, &record)?;
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for JsonlEventLog {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            warn!(path = %self.path.display(), error = %e, "failed to flush event log");
        }
    }
}

/// Read back a JSONL event log, skipping blank lines.
pub fn read_jsonl(path: &Path) -> Result<Vec<EventRecord>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nrm_core::types::{AgentId, PopulationId};

    fn batch() -> Vec<TimedEvent> {
        vec![
            (
                1,
                SwarmEvent::Migrated {
                    agent: AgentId(4),
                    from: PopulationId(0),
                    to: PopulationId(1),
                },
            ),
            (
                2,
                SwarmEvent::Burst {
                    parent: AgentId(5),
                    children: [AgentId(6), AgentId(7)],
                    from: PopulationId(1),
                    to: PopulationId(1),
                    parent_energy: 90.0,
                    child_energy: [40.5, 40.5],
                },
            ),
        ]
    }

    #[test]
    fn memory_log_keeps_order() {
        let mut log = MemoryEventLog::new();
        let run = RunId::new();
        log.append(run, &batch()).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.records()[1].tick, 2);
        assert_eq!(log.records()[0].event.kind(), "migrated");
    }

    #[test]
    fn jsonl_log_is_namespaced_by_run() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = (RunId::new(), RunId::new());
        let mut first = JsonlEventLog::create(dir.path(), a).unwrap();
        let mut second = JsonlEventLog::create(dir.path(), b).unwrap();
        assert_ne!(first.path(), second.path());

        first.append(a, &batch()).unwrap();
        second.append(b, &batch()[..1]).unwrap();
        first.flush().unwrap();
        second.flush().unwrap();

        let read_a = read_jsonl(first.path()).unwrap();
        let read_b = read_jsonl(second.path()).unwrap();
        assert_eq!(read_a.len(), 2);
        assert_eq!(read_b.len(), 1);
        assert!(read_a.iter().all(|r| r.run_id == a));
        assert_eq!(read_a[1].event, batch()[1].1);
    }

    #[test]
    fn drop_flushes_pending_lines() {
        let dir = tempfile::tempdir().unwrap();
        let run = RunId::new();
        let path = {
            let mut log = JsonlEventLog::create(dir.path(), run).unwrap();
            log.append(run, &batch()).unwrap();
            log.path().to_path_buf()
        };
        assert_eq!(read_jsonl(&path).unwrap().len(), 2);
    }
}
