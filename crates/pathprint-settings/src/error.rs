use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML config: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("invalid JSON config: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("config serialization failed: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("config file must be .toml or .json: {0}")]
    UnknownFormat(PathBuf),

    #[error("invalid setting: {0}")]
    Invalid(String),

    #[error("no platform config directory available")]
    NoConfigDir,
}
