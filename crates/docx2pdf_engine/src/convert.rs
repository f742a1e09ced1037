use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, SystemTime};

use docx2pdf_logging::{app_debug, app_info, app_warn};
use tokio::process::Command;

use crate::locate::locate_soffice;
use crate::paths::resolve_output_path;
use crate::{ConvertError, FailureKind};

#[derive(Debug, Clone)]
pub struct ConverterSettings {
    /// Explicit `soffice` location; searched for when `None` or missing.
    pub soffice_path: Option<PathBuf>,
    /// Per-file limit; the child is killed when exceeded.
    pub timeout: Option<Duration>,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            soffice_path: None,
            timeout: Some(Duration::from_secs(300)),
        }
    }
}

/// Converts one document to PDF inside `output_dir`.
#[async_trait::async_trait]
pub trait Converter: Send + Sync {
    /// Resolved converter binary, or `None` when it is not installed.
    fn binary(&self) -> Option<PathBuf>;

    async fn convert(&self, input: &Path, output_dir: &Path) -> Result<PathBuf, ConvertError>;
}

#[derive(Debug, Clone, Default)]
pub struct LibreOfficeConverter {
    settings: ConverterSettings,
}

impl LibreOfficeConverter {
    pub fn new(settings: ConverterSettings) -> Self {
        Self { settings }
    }

    fn command(binary: &Path, input: &Path, output_dir: &Path) -> Command {
        let mut cmd = Command::new(binary);
        cmd.arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(output_dir)
            .arg(input)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait::async_trait]
impl Converter for LibreOfficeConverter {
    fn binary(&self) -> Option<PathBuf> {
        locate_soffice(self.settings.soffice_path.as_deref())
    }

    async fn convert(&self, input: &Path, output_dir: &Path) -> Result<PathBuf, ConvertError> {
        let binary = self
            .binary()
            .ok_or_else(|| ConvertError::new(FailureKind::ConverterMissing, ""))?;
        if !input.is_file() {
            return Err(ConvertError::new(
                FailureKind::SourceMissing,
                input.display().to_string(),
            ));
        }

        let expected = resolve_output_path(input, Some(output_dir));
        let previous = modified(&expected);
        app_info!("Converting {:?} with {:?}", input, binary);
        let mut cmd = Self::command(&binary, input, output_dir);
        let output = cmd.output();

        let output = match self.settings.timeout {
            Some(limit) => tokio::time::timeout(limit, output)
                .await
                .map_err(|_| ConvertError::new(FailureKind::Timeout(limit), ""))?,
            None => output.await,
        }
        .map_err(|err| ConvertError::new(FailureKind::Spawn, err.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            app_warn!(
                "LibreOffice failed for {:?}: stdout={} stderr={}",
                input,
                stdout.trim(),
                stderr.trim()
            );
            return Err(ConvertError::new(
                FailureKind::ExitStatus(output.status.code()),
                stderr.trim().to_string(),
            ));
        }

        // A running desktop instance can swallow the request and still exit 0,
        // leaving either nothing or a PDF from an earlier run behind.
        let written = modified(&expected);
        if written.is_none() || written == previous {
            app_debug!(
                "soffice exited 0 without writing {:?} (previous mtime {:?}): {}",
                expected,
                previous,
                String::from_utf8_lossy(&output.stdout).trim()
            );
            return Err(ConvertError::new(
                FailureKind::OutputMissing,
                expected.display().to_string(),
            ));
        }

        app_info!("Conversion completed: {:?}", expected);
        Ok(expected)
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path)
        .ok()
        .filter(|meta| meta.is_file())
        .and_then(|meta| meta.modified().ok())
}
