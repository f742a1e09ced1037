use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use docx2pdf_core::{Effect, FileStatus, Msg, ProgressEvent};
use docx2pdf_engine::{BatchRequest, ConversionProgress, EngineEvent, EngineHandle};
use docx2pdf_logging::{app_debug, app_error, app_info, app_warn};

use super::config::{AppConfig, DefaultOutput};

pub struct EffectRunner {
    engine: Arc<EngineHandle>,
    msg_tx: mpsc::Sender<Msg>,
    default_output: DefaultOutput,
    check_updates: bool,
}

impl EffectRunner {
    pub fn new(config: &AppConfig, check_updates: bool, json: bool, msg_tx: mpsc::Sender<Msg>) -> Self {
        let engine = Arc::new(EngineHandle::new(config.engine_settings()));
        let runner = Self {
            engine,
            msg_tx,
            default_output: config.default_output,
            check_updates,
        };
        runner.spawn_event_loop(json);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ResolveDefaultOutputDir => self.resolve_default_output_dir(),
                Effect::CheckConverter => self.engine.check_converter(),
                Effect::CheckForUpdates => {
                    if self.check_updates {
                        self.engine.check_for_updates();
                    }
                }
                Effect::ConvertBatch {
                    run_id,
                    files,
                    output_dir,
                } => {
                    app_info!(
                        "ConvertBatch run_id={} files={} output_dir={:?}",
                        run_id,
                        files.len(),
                        output_dir
                    );
                    self.engine.convert_batch(BatchRequest {
                        run_id,
                        files: files.into_iter().map(PathBuf::from).collect(),
                        output_dir: output_dir.map(PathBuf::from),
                    });
                }
                Effect::OpenPdf { path } => {
                    if let Err(err) = opener::open(&path) {
                        app_warn!("Failed to open {}: {}", path, err);
                    }
                }
            }
        }
    }

    fn resolve_default_output_dir(&self) {
        match self.default_output {
            DefaultOutput::SameAsInput => {}
            DefaultOutput::Downloads => match dirs::download_dir() {
                Some(dir) => {
                    let _ = self
                        .msg_tx
                        .send(Msg::OutputDirResolved(dir.to_string_lossy().into_owned()));
                }
                None => app_warn!("No Downloads folder found; writing next to sources"),
            },
        }
    }

    fn spawn_event_loop(&self, json: bool) {
        let engine = self.engine.clone();
        let msg_tx = self.msg_tx.clone();
        thread::spawn(move || {
            forward_events(|| engine.recv_timeout(Duration::from_millis(50)), &msg_tx, json);
        });
    }
}

/// Turns engine events into messages until either side goes away.
fn forward_events<F>(mut next: F, msg_tx: &mpsc::Sender<Msg>, json: bool)
where
    F: FnMut() -> Result<EngineEvent, mpsc::RecvTimeoutError>,
{
    loop {
        let event = match next() {
            Ok(event) => event,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                app_debug!("Engine event channel closed");
                return;
            }
        };
        if let EngineEvent::Progress(progress) = &event {
            if json {
                print_json(progress);
            }
        }
        if msg_tx.send(map_event(event)).is_err() {
            return;
        }
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress(progress) => Msg::Progress(ProgressEvent {
            run_id: progress.run_id,
            seq: progress.seq,
            file_path: progress.file_path,
            output_path: progress.output_path,
            progress: progress.progress,
            status: map_status(progress.status),
            error: progress.error,
        }),
        EngineEvent::BatchCompleted { run_id, result } => match result {
            Ok(summary) => {
                app_debug!("Run {} summary: {:?}", run_id, summary);
                Msg::BatchFinished { run_id }
            }
            Err(err) => {
                app_error!("Run {} failed to dispatch: {}", run_id, err);
                Msg::BatchFailed {
                    run_id,
                    message: err.to_string(),
                }
            }
        },
        EngineEvent::ConverterChecked { binary } => {
            match &binary {
                Some(path) => app_info!("Using LibreOffice at {:?}", path),
                None => app_warn!("LibreOffice not found"),
            }
            Msg::AvailabilityChecked(binary.is_some())
        }
        EngineEvent::UpdateChecked { newer_version } => Msg::UpdateChecked(newer_version),
    }
}

fn map_status(status: docx2pdf_engine::FileStatus) -> FileStatus {
    match status {
        docx2pdf_engine::FileStatus::Pending => FileStatus::Pending,
        docx2pdf_engine::FileStatus::Converting => FileStatus::Converting,
        docx2pdf_engine::FileStatus::Completed => FileStatus::Completed,
        docx2pdf_engine::FileStatus::Error => FileStatus::Error,
    }
}

fn print_json(progress: &ConversionProgress) {
    match serde_json::to_string(progress) {
        Ok(line) => println!("{line}"),
        Err(err) => app_warn!("Failed to encode progress event: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx2pdf_engine::{BatchSummary, DispatchError};
    use pretty_assertions::assert_eq;

    #[test]
    fn progress_events_map_field_for_field() {
        let msg = map_event(EngineEvent::Progress(ConversionProgress {
            run_id: 3,
            seq: 2,
            file_path: "/a/report.docx".into(),
            output_path: Some("/out/report.pdf".into()),
            progress: 100,
            status: docx2pdf_engine::FileStatus::Completed,
            error: None,
        }));
        assert_eq!(
            msg,
            Msg::Progress(ProgressEvent {
                run_id: 3,
                seq: 2,
                file_path: "/a/report.docx".into(),
                output_path: Some("/out/report.pdf".into()),
                progress: 100,
                status: FileStatus::Completed,
                error: None,
            })
        );
    }

    #[test]
    fn batch_results_map_to_finish_or_failure() {
        let ok = map_event(EngineEvent::BatchCompleted {
            run_id: 1,
            result: Ok(BatchSummary::default()),
        });
        assert_eq!(ok, Msg::BatchFinished { run_id: 1 });

        let failed = map_event(EngineEvent::BatchCompleted {
            run_id: 2,
            result: Err(DispatchError::ConverterMissing),
        });
        assert_eq!(
            failed,
            Msg::BatchFailed {
                run_id: 2,
                message: DispatchError::ConverterMissing.to_string(),
            }
        );
    }

    #[test]
    fn converter_lookup_maps_to_availability() {
        let found = map_event(EngineEvent::ConverterChecked {
            binary: Some(PathBuf::from("/usr/bin/soffice")),
        });
        assert_eq!(found, Msg::AvailabilityChecked(true));
        let missing = map_event(EngineEvent::ConverterChecked { binary: None });
        assert_eq!(missing, Msg::AvailabilityChecked(false));
    }

    #[test]
    fn json_line_uses_lowercase_status() {
        let line = serde_json::to_string(&ConversionProgress {
            run_id: 1,
            seq: 1,
            file_path: "/a/x.docx".into(),
            output_path: None,
            progress: 0,
            status: docx2pdf_engine::FileStatus::Converting,
            error: None,
        })
        .unwrap();
        assert!(line.contains("\"status\":\"converting\""));
        assert!(line.contains("\"output_path\":null"));
    }

    #[test]
    fn forwarding_stops_when_engine_disconnects() {
        let (tx, rx) = mpsc::channel();
        let mut script = vec![
            Err(mpsc::RecvTimeoutError::Disconnected),
            Ok(EngineEvent::UpdateChecked {
                newer_version: None,
            }),
            Err(mpsc::RecvTimeoutError::Timeout),
        ];

        forward_events(|| script.pop().unwrap(), &tx, false);

        assert!(script.is_empty());
        assert_eq!(rx.try_recv(), Ok(Msg::UpdateChecked(None)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn forwarding_stops_when_shell_hangs_up() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut calls = 0;

        forward_events(
            || {
                calls += 1;
                Ok(EngineEvent::ConverterChecked { binary: None })
            },
            &tx,
            false,
        );

        assert_eq!(calls, 1);
    }
}
