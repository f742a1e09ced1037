use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::persist::PersistError;

pub type RunId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Converting,
    Completed,
    Error,
}

/// Wire shape of a `conversion-progress` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionProgress {
    pub run_id: RunId,
    pub seq: u64,
    pub file_path: String,
    pub output_path: Option<String>,
    pub progress: u8,
    pub status: FileStatus,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub run_id: RunId,
    pub files: Vec<PathBuf>,
    /// `None` writes each PDF next to its source.
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub converted: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress(ConversionProgress),
    BatchCompleted {
        run_id: RunId,
        result: Result<BatchSummary, DispatchError>,
    },
    ConverterChecked {
        binary: Option<PathBuf>,
    },
    UpdateChecked {
        newer_version: Option<String>,
    },
}

/// Failure of one file's conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertError {
    pub kind: FailureKind,
    pub message: String,
}

impl ConvertError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for ConvertError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    ConverterMissing,
    SourceMissing,
    Spawn,
    ExitStatus(Option<i32>),
    Timeout(Duration),
    OutputMissing,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::ConverterMissing => write!(f, "LibreOffice not found"),
            FailureKind::SourceMissing => write!(f, "source file not found"),
            FailureKind::Spawn => write!(f, "failed to start LibreOffice"),
            FailureKind::ExitStatus(Some(code)) => {
                write!(f, "LibreOffice exited with status {code}")
            }
            FailureKind::ExitStatus(None) => write!(f, "LibreOffice terminated by signal"),
            FailureKind::Timeout(limit) => write!(f, "conversion timed out after {limit:?}"),
            FailureKind::OutputMissing => write!(f, "LibreOffice produced no PDF"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

/// Failure of a whole batch before or outside per-file conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("LibreOffice is not installed or could not be found")]
    ConverterMissing,
    #[error("output directory unusable: {0}")]
    OutputDir(String),
    #[error("conversion runtime unavailable: {0}")]
    Runtime(String),
}

impl From<PersistError> for DispatchError {
    fn from(err: PersistError) -> Self {
        DispatchError::OutputDir(err.to_string())
    }
}
