use crate::{ConverterAvailability, FileStatus};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub availability: ConverterAvailability,
    pub entries: Vec<EntryRowView>,
    pub output_dir: Option<String>,
    pub is_converting: bool,
    /// Unrounded mean of per-entry progress.
    pub overall_progress: f64,
    pub completed_count: usize,
    pub error_count: usize,
    pub available_update: Option<String>,
    pub dispatch_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRowView {
    pub index: usize,
    pub path: String,
    pub name: String,
    pub output_path: Option<String>,
    pub status: FileStatus,
    pub progress: u8,
    pub error: Option<String>,
}
