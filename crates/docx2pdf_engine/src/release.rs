use std::time::Duration;

use reqwest::header::ACCEPT;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ReleaseSettings {
    /// GitHub "latest release" endpoint; the check is skipped when `None`.
    pub releases_url: Option<String>,
    pub current_version: String,
    pub timeout: Duration,
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        Self {
            releases_url: None,
            current_version: env!("CARGO_PKG_VERSION").to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("unexpected release payload: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: String,
}

#[derive(Debug, Clone)]
pub struct ReleaseChecker {
    settings: ReleaseSettings,
}

impl ReleaseChecker {
    pub fn new(settings: ReleaseSettings) -> Self {
        Self { settings }
    }

    /// Returns the latest release tag when it differs from the running version.
    pub async fn newer_version(&self) -> Result<Option<String>, UpdateError> {
        let Some(url) = self.settings.releases_url.as_deref() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(self.settings.timeout)
            .user_agent(concat!("docx2pdf/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let response = client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        let release: LatestRelease = serde_json::from_slice(&body)?;
        if is_same_version(&release.tag_name, &self.settings.current_version) {
            Ok(None)
        } else {
            Ok(Some(release.tag_name))
        }
    }
}

fn is_same_version(tag: &str, current: &str) -> bool {
    let strip = |v: &str| v.trim().trim_start_matches(['v', 'V']).to_string();
    strip(tag) == strip(current)
}
