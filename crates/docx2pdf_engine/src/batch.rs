use std::collections::HashMap;
use std::path::{Path, PathBuf};

use docx2pdf_logging::{app_info, app_warn};

use crate::convert::Converter;
use crate::paths::{resolve_output_path, source_dir};
use crate::persist::ensure_output_dir;
use crate::{
    BatchRequest, BatchSummary, ConversionProgress, DispatchError, EngineEvent, FileStatus, RunId,
};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Hands out per-file sequence numbers; repeated paths keep counting.
#[derive(Default)]
struct SeqCounter {
    next: HashMap<String, u64>,
}

impl SeqCounter {
    fn bump(&mut self, file_path: &str) -> u64 {
        let seq = self.next.entry(file_path.to_string()).or_insert(0);
        *seq += 1;
        *seq
    }
}

/// Converts every file of `request` in order, emitting progress through `sink`.
///
/// Per-file failures are reported as `error` events and counted in the
/// summary; only problems that stop the whole batch return `Err`.
pub async fn run_batch(
    converter: &dyn Converter,
    request: &BatchRequest,
    sink: &dyn ProgressSink,
) -> Result<BatchSummary, DispatchError> {
    if let Some(dir) = request.output_dir.as_deref() {
        ensure_output_dir(dir)?;
    }
    let binary = converter.binary().ok_or(DispatchError::ConverterMissing)?;
    app_info!(
        "Run {}: converting {} file(s) with {:?}",
        request.run_id,
        request.files.len(),
        binary
    );

    for output in colliding_outputs(request) {
        app_warn!(
            "Run {}: several inputs write {:?}; the last one wins",
            request.run_id,
            output
        );
    }

    let mut seqs = SeqCounter::default();
    let mut summary = BatchSummary::default();
    for input in &request.files {
        let file_path = input.to_string_lossy().into_owned();
        let start = ProgressReport::new(request.run_id, &file_path);
        sink.emit(start.converting(seqs.bump(&file_path)));

        let output_dir = request
            .output_dir
            .clone()
            .unwrap_or_else(|| source_dir(input));
        match converter.convert(input, &output_dir).await {
            Ok(pdf) => {
                summary.converted += 1;
                sink.emit(start.completed(seqs.bump(&file_path), &pdf));
            }
            Err(err) => {
                summary.failed += 1;
                app_warn!("Run {}: {:?} failed: {}", request.run_id, input, err);
                sink.emit(start.failed(seqs.bump(&file_path), err.to_string()));
            }
        }
    }

    app_info!(
        "Run {} finished: {} converted, {} failed",
        request.run_id,
        summary.converted,
        summary.failed
    );
    Ok(summary)
}

/// Output paths that more than one distinct input resolves to, in first-seen order.
///
/// Repeating the same input is not a collision; it simply converts again.
fn colliding_outputs(request: &BatchRequest) -> Vec<PathBuf> {
    let mut owners: HashMap<PathBuf, &Path> = HashMap::new();
    let mut collisions = Vec::new();
    for input in &request.files {
        let output = resolve_output_path(input, request.output_dir.as_deref());
        match owners.get(&output) {
            Some(owner) if *owner != input.as_path() => {
                if !collisions.contains(&output) {
                    collisions.push(output);
                }
            }
            Some(_) => {}
            None => {
                owners.insert(output, input);
            }
        }
    }
    collisions
}

struct ProgressReport<'a> {
    run_id: RunId,
    file_path: &'a str,
}

impl<'a> ProgressReport<'a> {
    fn new(run_id: RunId, file_path: &'a str) -> Self {
        Self { run_id, file_path }
    }

    fn event(
        &self,
        seq: u64,
        status: FileStatus,
        progress: u8,
        output_path: Option<String>,
        error: Option<String>,
    ) -> EngineEvent {
        EngineEvent::Progress(ConversionProgress {
            run_id: self.run_id,
            seq,
            file_path: self.file_path.to_string(),
            output_path,
            progress,
            status,
            error,
        })
    }

    fn converting(&self, seq: u64) -> EngineEvent {
        self.event(seq, FileStatus::Converting, 0, None, None)
    }

    fn completed(&self, seq: u64, pdf: &Path) -> EngineEvent {
        let output = pdf.to_string_lossy().into_owned();
        self.event(seq, FileStatus::Completed, 100, Some(output), None)
    }

    fn failed(&self, seq: u64, error: String) -> EngineEvent {
        self.event(seq, FileStatus::Error, 0, None, Some(error))
    }
}
