//! Finalize reports and their delivery.
//!
//! When a session completes, the runtime hands exactly one `FinalizeReport` to
//! a `FinalizeSink`. Delivery is fire-and-forget: failures are logged by the
//! caller and never retried.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use phonics_common::{SchemaVersion, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::Score;

/// Scores of one completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeReport {
    /// Report format version.
    pub schema: SchemaVersion,
    /// User the session ran for, if the shell set one.
    pub owner: Option<UserId>,
    /// Blending bucket.
    pub blending: Score,
    /// Segmenting bucket.
    pub segmenting: Score,
    /// Tutorial problems advanced by the escape valve.
    #[serde(default)]
    pub forced_advances: u32,
}

/// Finalize delivery error.
#[derive(Debug, Error)]
pub enum FinalizeError {
    /// Writing the report failed.
    #[error("finalize I/O error: {0}")]
    Io(#[from] io::Error),

    /// The report could not be serialized.
    #[error("finalize serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The collaborator refused the report.
    #[error("finalize rejected: {0}")]
    Rejected(String),
}

/// Result type for finalize delivery.
pub type FinalizeResult<T> = Result<T, FinalizeError>;

/// Receives finalize reports.
pub trait FinalizeSink {
    /// Deliver one report.
    fn deliver(&mut self, report: &FinalizeReport) -> FinalizeResult<()>;
}

#[derive(Debug, Default)]
struct MemoryState {
    reports: Vec<FinalizeReport>,
    reject: Option<String>,
}

/// Keeps reports in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every report with `reason`.
    #[must_use]
    pub fn rejecting(reason: impl Into<String>) -> Self {
        let sink = Self::default();
        sink.inner.lock().reject = Some(reason.into());
        sink
    }

    /// Reports delivered so far.
    #[must_use]
    pub fn reports(&self) -> Vec<FinalizeReport> {
        self.inner.lock().reports.clone()
    }
}

impl FinalizeSink for MemorySink {
    fn deliver(&mut self, report: &FinalizeReport) -> FinalizeResult<()> {
        let mut state = self.inner.lock();
        if let Some(reason) = &state.reject {
            return Err(FinalizeError::Rejected(reason.clone()));
        }
        state.reports.push(report.clone());
        Ok(())
    }
}

/// Writes one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesSink<BufWriter<File>> {
    /// Append to the file at `path`, creating it if needed.
    pub fn append<P: AsRef<Path>>(path: P) -> FinalizeResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> FinalizeSink for JsonLinesSink<W> {
    fn deliver(&mut self, report: &FinalizeReport) -> FinalizeResult<()> {
        serde_json::to_writer(&mut self.writer, report)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
