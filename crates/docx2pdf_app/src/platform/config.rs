use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use docx2pdf_engine::{AtomicFileWriter, ConverterSettings, EngineSettings, ReleaseSettings};
use docx2pdf_logging::{LogDestination, LOG_FILENAME};
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "docx2pdf";
const CONFIG_FILENAME: &str = "config.ron";

/// Where PDFs go when no directory is given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DefaultOutput {
    Downloads,
    #[default]
    SameAsInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogTarget {
    #[default]
    Terminal,
    File,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub soffice_path: Option<PathBuf>,
    pub default_output: DefaultOutput,
    pub conversion_timeout_secs: Option<u64>,
    pub check_for_updates: bool,
    pub releases_url: Option<String>,
    pub log_destination: LogTarget,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            soffice_path: None,
            default_output: DefaultOutput::SameAsInput,
            conversion_timeout_secs: Some(300),
            check_for_updates: true,
            releases_url: None,
            log_destination: LogTarget::Terminal,
            log_level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            converter: ConverterSettings {
                soffice_path: self.soffice_path.clone(),
                timeout: self
                    .conversion_timeout_secs
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs),
            },
            release: ReleaseSettings {
                releases_url: self.releases_url.clone(),
                ..ReleaseSettings::default()
            },
        }
    }

    pub fn log_destination(&self) -> LogDestination {
        let file = dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(LOG_FILENAME);
        match self.log_destination {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File(file),
            LogTarget::Both => LogDestination::Both(file),
        }
    }
}

/// Outcome of reading the config; `note` explains a fallback worth logging.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub note: Option<String>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}

/// Reads `path`, or writes the defaults there when it does not exist yet.
pub fn load_or_init(path: &Path) -> anyhow::Result<LoadedConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let config = AppConfig::default();
            let note = match save(path, &config) {
                Ok(()) => format!("Wrote default config to {:?}", path),
                Err(err) => format!("Could not write default config to {:?}: {:#}", path, err),
            };
            return Ok(LoadedConfig {
                config,
                note: Some(note),
            });
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {:?}", path));
        }
    };

    let config = ron::from_str(&content).with_context(|| format!("invalid config {:?}", path))?;
    Ok(LoadedConfig { config, note: None })
}

pub fn save(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .context("config path has no file name")?;

    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(config, pretty).context("serialize config")?;
    AtomicFileWriter::new(dir).write(filename, &content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_config_is_created_with_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join(CONFIG_FILENAME);

        let loaded = load_or_init(&path).unwrap();
        assert_eq!(loaded.config, AppConfig::default());
        assert!(loaded.note.is_some());
        assert!(path.is_file());

        let reloaded = load_or_init(&path).unwrap();
        assert_eq!(reloaded.config, AppConfig::default());
        assert!(reloaded.note.is_none());
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            "(default_output: Downloads, soffice_path: Some(\"/opt/lo/soffice\"))",
        )
        .unwrap();

        let config = load_or_init(&path).unwrap().config;
        assert_eq!(config.default_output, DefaultOutput::Downloads);
        assert_eq!(config.soffice_path, Some(PathBuf::from("/opt/lo/soffice")));
        assert_eq!(config.conversion_timeout_secs, Some(300));
        assert!(config.check_for_updates);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(default_output: Sideways)").unwrap();

        assert!(load_or_init(&path).is_err());
    }

    #[test]
    fn zero_timeout_disables_the_limit() {
        let config = AppConfig {
            conversion_timeout_secs: Some(0),
            ..AppConfig::default()
        };
        assert_eq!(config.engine_settings().converter.timeout, None);
        assert_eq!(
            AppConfig::default().engine_settings().converter.timeout,
            Some(Duration::from_secs(300))
        );
    }
}
