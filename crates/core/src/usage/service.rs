//! Usage recorders.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::config::types::ResolvedConfig;

use super::types::UsageRecord;

/// Error type for usage recording.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("Failed to write usage log: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to serialize usage record: {0}")]
    SerializeError(#[from] serde_json::Error),

    #[error("Usage recorder is unavailable")]
    Unavailable,
}

type Result<T> = std::result::Result<T, UsageError>;

/// Destination for finished renders.
///
/// Implementations must be shareable across threads; the engine holds one
/// behind an `Arc` and calls it after every non-fatal render.
pub trait UsageRecorder: Send + Sync {
    fn record(&self, record: &UsageRecord) -> Result<()>;
}

/// Appends usage records to a JSONL file.
#[derive(Debug, Clone)]
pub struct UsageLogService {
    log_path: PathBuf,
}

impl UsageLogService {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self { log_path: log_path.into() }
    }

    /// Create from ResolvedConfig.
    /// Returns None if usage recording is disabled.
    pub fn try_from_config(config: &ResolvedConfig) -> Option<Self> {
        config.usage.enabled.then(|| Self::new(&config.usage_log))
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Read the most recent `limit` records, oldest first.
    ///
    /// Lines that do not parse are skipped. A missing log reads as empty.
    pub fn read_entries(&self, limit: Option<usize>) -> Result<Vec<UsageRecord>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.log_path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(entry) = serde_json::from_str::<UsageRecord>(&line) {
                entries.push(entry);
            }
        }

        if let Some(limit) = limit
            && entries.len() > limit
        {
            entries.drain(..entries.len() - limit);
        }
        Ok(entries)
    }
}

impl UsageRecorder for UsageLogService {
    fn record(&self, record: &UsageRecord) -> Result<()> {
        if let Some(parent) = self.log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(record)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.log_path)?;
        writeln!(file, "{json}")?;
        Ok(())
    }
}

/// Keeps records in memory. Useful for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryUsageRecorder {
    records: Mutex<Vec<UsageRecord>>,
}

impl MemoryUsageRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<UsageRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl UsageRecorder for MemoryUsageRecorder {
    fn record(&self, record: &UsageRecord) -> Result<()> {
        let mut records = self.records.lock().map_err(|_| UsageError::Unavailable)?;
        records.push(record.clone());
        Ok(())
    }
}
