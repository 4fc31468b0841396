use std::fmt;
use std::path::Path;

use foundation::math::StableF64;
use foundation::time::TimeOffset;
use scene::MountNames;
use serde::{Deserialize, Serialize};
use streaming::{LineType, QueryParams};
use tracing::{info, warn};

/// Contents of `settings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub sim_start: String,
    pub dist_threshold: u32,
    pub required_ratio: f64,
    pub line_type: LineType,
    /// t0 shown after startup.
    pub start_offset: TimeOffset,
    pub mounts: MountNames,
}

impl Default for Settings {
    fn default() -> Self {
        let params = QueryParams::default();
        Self {
            sim_start: params.sim_start,
            dist_threshold: params.dist_threshold,
            required_ratio: params.required_ratio.0,
            line_type: params.line_type,
            start_offset: TimeOffset::START,
            mounts: MountNames::default(),
        }
    }
}

impl Settings {
    pub fn query_params(&self) -> QueryParams {
        QueryParams {
            sim_start: self.sim_start.clone(),
            dist_threshold: self.dist_threshold,
            required_ratio: StableF64(self.required_ratio),
            line_type: self.line_type,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read(std::io::Error),
    Parse(serde_json::Error),
    /// `startOffset` beyond the last step that has a successor.
    StartOffset(TimeOffset),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(e) => write!(f, "failed to read settings: {e}"),
            ConfigError::Parse(e) => write!(f, "invalid settings: {e}"),
            ConfigError::StartOffset(t) => write!(
                f,
                "invalid settings: startOffset {t} is past {}",
                TimeOffset::LAST
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::StartOffset(_) => None,
        }
    }
}

/// Reads settings from `path`; a missing file yields the defaults.
pub async fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            let settings = parse_settings(&text)?;
            info!(path = %path.display(), "settings loaded");
            Ok(settings)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "settings file not found; using defaults");
            Ok(Settings::default())
        }
        Err(e) => Err(ConfigError::Read(e)),
    }
}

pub fn parse_settings(text: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = serde_json::from_str(text).map_err(ConfigError::Parse)?;
    if settings.start_offset > TimeOffset::LAST {
        return Err(ConfigError::StartOffset(settings.start_offset));
    }
    Ok(settings)
}
