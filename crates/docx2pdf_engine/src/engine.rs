use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use docx2pdf_logging::{app_debug, app_error};

use crate::batch::{run_batch, ChannelProgressSink};
use crate::convert::{Converter, ConverterSettings, LibreOfficeConverter};
use crate::release::{ReleaseChecker, ReleaseSettings};
use crate::{BatchRequest, DispatchError, EngineEvent};

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub converter: ConverterSettings,
    pub release: ReleaseSettings,
}

enum EngineCommand {
    CheckConverter,
    ConvertBatch(BatchRequest),
    CheckForUpdates,
}

/// Owns the background conversion thread; commands go in, events come out.
///
/// The handle is `Sync`, so one thread can issue commands while another
/// drains events through a shared `Arc`.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Mutex<mpsc::Receiver<EngineEvent>>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Self {
        let converter = Arc::new(LibreOfficeConverter::new(settings.converter));
        Self::with_converter(converter, ReleaseChecker::new(settings.release))
    }

    pub fn with_converter(converter: Arc<dyn Converter>, releases: ReleaseChecker) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let releases = Arc::new(releases);

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    app_error!("Failed to start conversion runtime: {}", err);
                    reject_all(cmd_rx, event_tx, err.to_string());
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let converter = converter.clone();
                let releases = releases.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(converter.as_ref(), releases.as_ref(), command, event_tx)
                        .await;
                });
            }
        });

        Self {
            cmd_tx,
            event_rx: Mutex::new(event_rx),
        }
    }

    pub fn check_converter(&self) {
        let _ = self.cmd_tx.send(EngineCommand::CheckConverter);
    }

    pub fn convert_batch(&self, request: BatchRequest) {
        let _ = self.cmd_tx.send(EngineCommand::ConvertBatch(request));
    }

    pub fn check_for_updates(&self) {
        let _ = self.cmd_tx.send(EngineCommand::CheckForUpdates);
    }

    /// Waits up to `timeout` for the next event.
    ///
    /// `Disconnected` means no further events can arrive, also when the
    /// receiver lock was poisoned.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, mpsc::RecvTimeoutError> {
        let rx = self
            .event_rx
            .lock()
            .map_err(|_| mpsc::RecvTimeoutError::Disconnected)?;
        rx.recv_timeout(timeout)
    }
}

async fn handle_command(
    converter: &dyn Converter,
    releases: &ReleaseChecker,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::CheckConverter => {
            let binary = converter.binary();
            app_debug!("Converter lookup: {:?}", binary);
            let _ = event_tx.send(EngineEvent::ConverterChecked { binary });
        }
        EngineCommand::ConvertBatch(request) => {
            let sink = ChannelProgressSink::new(event_tx.clone());
            let result = run_batch(converter, &request, &sink).await;
            let _ = event_tx.send(EngineEvent::BatchCompleted {
                run_id: request.run_id,
                result,
            });
        }
        EngineCommand::CheckForUpdates => {
            let newer_version = match releases.newer_version().await {
                Ok(version) => version,
                Err(err) => {
                    app_debug!("Update check failed: {}", err);
                    None
                }
            };
            let _ = event_tx.send(EngineEvent::UpdateChecked { newer_version });
        }
    }
}

/// Answers every command with a failure when no runtime could be built.
fn reject_all(
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    reason: String,
) {
    while let Ok(command) = cmd_rx.recv() {
        let event = match command {
            EngineCommand::CheckConverter => EngineEvent::ConverterChecked { binary: None },
            EngineCommand::ConvertBatch(request) => EngineEvent::BatchCompleted {
                run_id: request.run_id,
                result: Err(DispatchError::Runtime(reason.clone())),
            },
            EngineCommand::CheckForUpdates => EngineEvent::UpdateChecked {
                newer_version: None,
            },
        };
        let _ = event_tx.send(event);
    }
}
