use crate::{FileStatus, RunId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Shell finished wiring and wants the startup checks.
    AppStarted,
    /// Result of looking up the converter binary.
    AvailabilityChecked(bool),
    /// User asked to look for the converter again.
    RetryAvailabilityClicked,
    /// User added files (picker, drop or command line).
    FilesAdded(Vec<String>),
    /// User removed the entry at a queue position.
    RemoveClicked { index: usize },
    /// User cleared every completed entry.
    ClearCompletedClicked,
    /// Default output directory resolved at startup.
    OutputDirResolved(String),
    /// User picked an output directory.
    OutputDirSelected(String),
    /// User chose to write each PDF next to its source.
    OutputDirCleared,
    /// User started a batch conversion.
    ConvertClicked,
    /// Converter progress for one file.
    Progress(ProgressEvent),
    /// Converter finished the whole batch.
    BatchFinished { run_id: RunId },
    /// The batch dispatch itself failed.
    BatchFailed { run_id: RunId, message: String },
    /// User wants to open the produced PDF of an entry.
    OpenOutputClicked { index: usize },
    /// Update check result; `Some` carries the newer version tag.
    UpdateChecked(Option<String>),
    /// Render tick.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

/// One file's conversion status at a point in time.
///
/// `seq` increases per file within a run; the state ignores events whose
/// `seq` is not newer than the last one applied to the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub run_id: RunId,
    pub seq: u64,
    pub file_path: String,
    pub output_path: Option<String>,
    pub progress: u8,
    pub status: FileStatus,
    pub error: Option<String>,
}
