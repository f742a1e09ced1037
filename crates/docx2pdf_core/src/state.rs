use crate::view_model::{AppViewModel, EntryRowView};
use crate::ProgressEvent;

pub type RunId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileStatus {
    #[default]
    Pending,
    Converting,
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConverterAvailability {
    #[default]
    Unknown,
    Available,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub path: String,
    pub name: String,
    pub output_path: Option<String>,
    pub status: FileStatus,
    pub progress: u8,
    pub error: Option<String>,
    last_seq: Option<u64>,
}

impl QueueEntry {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: display_name(&path),
            path,
            output_path: None,
            status: FileStatus::Pending,
            progress: 0,
            error: None,
            last_seq: None,
        }
    }

    fn reset(&mut self) {
        self.output_path = None;
        self.status = FileStatus::Pending;
        self.progress = 0;
        self.error = None;
        self.last_seq = None;
    }

    /// Applies an event unless an equal or newer one was already applied.
    fn apply(&mut self, event: &ProgressEvent) -> bool {
        if self.last_seq.is_some_and(|seen| seen >= event.seq) {
            return false;
        }
        self.last_seq = Some(event.seq);
        self.output_path = event.output_path.clone();
        self.progress = event.progress.min(100);
        self.status = event.status;
        self.error = event.error.clone();
        true
    }
}

/// Last segment of a path, accepting both `/` and `\` separators.
pub fn display_name(path: &str) -> String {
    match path.rsplit(['/', '\\']).next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => path.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    entries: Vec<QueueEntry>,
    output_dir: Option<String>,
    availability: ConverterAvailability,
    active_run: Option<RunId>,
    latest_run: Option<RunId>,
    next_run_id: RunId,
    available_update: Option<String>,
    dispatch_error: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            next_run_id: 1,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        let count = |status: FileStatus| self.entries.iter().filter(|e| e.status == status).count();
        AppViewModel {
            availability: self.availability,
            entries: self
                .entries
                .iter()
                .enumerate()
                .map(|(index, entry)| EntryRowView {
                    index,
                    path: entry.path.clone(),
                    name: entry.name.clone(),
                    output_path: entry.output_path.clone(),
                    status: entry.status,
                    progress: entry.progress,
                    error: entry.error.clone(),
                })
                .collect(),
            output_dir: self.output_dir.clone(),
            is_converting: self.is_converting(),
            overall_progress: self.overall_progress(),
            completed_count: count(FileStatus::Completed),
            error_count: count(FileStatus::Error),
            available_update: self.available_update.clone(),
            dispatch_error: self.dispatch_error.clone(),
        }
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn output_dir(&self) -> Option<&str> {
        self.output_dir.as_deref()
    }

    pub fn availability(&self) -> ConverterAvailability {
        self.availability
    }

    pub fn is_converting(&self) -> bool {
        self.active_run.is_some()
    }

    pub fn active_run(&self) -> Option<RunId> {
        self.active_run
    }

    /// Mean of every entry's progress; 0 for an empty queue.
    pub fn overall_progress(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let total: u64 = self.entries.iter().map(|e| u64::from(e.progress)).sum();
        total as f64 / self.entries.len() as f64
    }

    /// Returns whether the state changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_availability(&mut self, availability: ConverterAvailability) {
        if self.availability != availability {
            self.availability = availability;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_output_dir(&mut self, dir: Option<String>) {
        if self.output_dir != dir {
            self.output_dir = dir;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_available_update(&mut self, version: Option<String>) {
        if self.available_update != version {
            self.available_update = version;
            self.mark_dirty();
        }
    }

    pub(crate) fn add_files(&mut self, paths: Vec<String>) -> usize {
        let before = self.entries.len();
        self.entries.extend(
            paths
                .into_iter()
                .filter(|path| !path.trim().is_empty())
                .map(QueueEntry::new),
        );
        let added = self.entries.len() - before;
        if added > 0 {
            self.mark_dirty();
        }
        added
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> bool {
        if self.is_converting() {
            return false;
        }
        match self.entries.get(index) {
            Some(entry) if entry.status != FileStatus::Converting => {
                self.entries.remove(index);
                self.mark_dirty();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn clear_completed(&mut self) -> usize {
        if self.is_converting() {
            return 0;
        }
        let before = self.entries.len();
        self.entries.retain(|e| e.status != FileStatus::Completed);
        let removed = before - self.entries.len();
        if removed > 0 {
            self.mark_dirty();
        }
        removed
    }

    /// Resets every entry and opens a new run; returns its id and the file list.
    pub(crate) fn begin_run(&mut self) -> (RunId, Vec<String>) {
        let run_id = self.next_run_id;
        self.next_run_id += 1;
        self.active_run = Some(run_id);
        self.latest_run = Some(run_id);
        self.dispatch_error = None;
        for entry in &mut self.entries {
            entry.reset();
        }
        self.mark_dirty();
        (run_id, self.entries.iter().map(|e| e.path.clone()).collect())
    }

    pub(crate) fn apply_progress(&mut self, event: &ProgressEvent) -> usize {
        if self.latest_run != Some(event.run_id) {
            return 0;
        }
        let mut applied = 0;
        for entry in self.entries.iter_mut().filter(|e| e.path == event.file_path) {
            if entry.apply(event) {
                applied += 1;
            }
        }
        if applied > 0 {
            self.mark_dirty();
        }
        applied
    }

    pub(crate) fn finish_run(&mut self, run_id: RunId) -> bool {
        if self.active_run != Some(run_id) {
            return false;
        }
        self.active_run = None;
        self.mark_dirty();
        true
    }

    /// Ends the run and marks every unfinished entry as failed with `message`.
    pub(crate) fn fail_run(&mut self, run_id: RunId, message: String) -> bool {
        if self.active_run != Some(run_id) {
            return false;
        }
        self.active_run = None;
        for entry in &mut self.entries {
            if matches!(entry.status, FileStatus::Pending | FileStatus::Converting) {
                entry.status = FileStatus::Error;
                entry.error = Some(message.clone());
            }
        }
        self.dispatch_error = Some(message);
        self.mark_dirty();
        true
    }

    pub(crate) fn completed_output(&self, index: usize) -> Option<&str> {
        self.entries
            .get(index)
            .filter(|e| e.status == FileStatus::Completed)
            .and_then(|e| e.output_path.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_handles_both_separators() {
        assert_eq!(display_name("/a/report.docx"), "report.docx");
        assert_eq!(display_name(r"C:\docs\notes.docx"), "notes.docx");
        assert_eq!(display_name("plain.docx"), "plain.docx");
        assert_eq!(display_name("/a/dir/"), "/a/dir/");
    }

    #[test]
    fn entry_ignores_stale_sequence() {
        let mut entry = QueueEntry::new("/a/x.docx");
        let newer = ProgressEvent {
            run_id: 1,
            seq: 2,
            file_path: "/a/x.docx".into(),
            output_path: Some("/a/x.pdf".into()),
            progress: 100,
            status: FileStatus::Completed,
            error: None,
        };
        let older = ProgressEvent {
            seq: 1,
            output_path: None,
            progress: 0,
            status: FileStatus::Converting,
            ..newer.clone()
        };
        assert!(entry.apply(&newer));
        assert!(!entry.apply(&older));
        assert_eq!(entry.status, FileStatus::Completed);
        assert_eq!(entry.progress, 100);
    }

    #[test]
    fn progress_is_clamped() {
        let mut entry = QueueEntry::new("/a/x.docx");
        entry.apply(&ProgressEvent {
            run_id: 1,
            seq: 1,
            file_path: "/a/x.docx".into(),
            output_path: None,
            progress: 250,
            status: FileStatus::Converting,
            error: None,
        });
        assert_eq!(entry.progress, 100);
    }
}
