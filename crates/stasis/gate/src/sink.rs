//! Audit sinks for persisting stasis records.
//!
//! Persistence is a best-effort side channel: the gate hands records to its
//! sink after releasing its lock and only logs failures.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use stasis_types::StasisRecord;

use crate::error::SinkError;

/// Append-only destination for audit records.
pub trait AuditSink: Send + Sync {
    fn persist(&self, record: &StasisRecord) -> Result<(), SinkError>;
}

/// In-memory audit sink
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: RwLock<Vec<StasisRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all records
    pub fn records(&self) -> Vec<StasisRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn persist(&self, record: &StasisRecord) -> Result<(), SinkError> {
        self.records.write().push(record.clone());
        Ok(())
    }
}

/// File-based sink writing one JSON record per line.
pub struct JsonlAuditSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlAuditSink {
    /// Open (or create) the log at `path` for appending.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record written so far.
    pub fn read_all(&self) -> Result<Vec<StasisRecord>, SinkError> {
        let reader = BufReader::new(File::open(&self.path)?);
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
}

impl AuditSink for JsonlAuditSink {
    fn persist(&self, record: &StasisRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = self.file.lock();
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}
