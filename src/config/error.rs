use std::path::PathBuf;
use thiserror::Error;

use super::Format;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported format for file: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("unknown format name: {0}")]
    UnknownFormatName(String),

    #[error("failed to parse {format} file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        format: Format,
        source: ParseFailure,
    },

    #[error("failed to serialize {format} file '{path}': {source}")]
    SerializeError {
        path: PathBuf,
        format: Format,
        source: SerializeFailure,
    },

    #[error("required key not found: {0}")]
    MissingKey(String),

    #[error("required keys missing: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] serde_json::Error),
}

/// Underlying cause of a [`ConfigError::ParseError`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseFailure {
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("top-level value is not a mapping")]
    NotAMapping,
}

/// Underlying cause of a [`ConfigError::SerializeError`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerializeFailure {
    #[error(transparent)]
    Toml(#[from] toml::ser::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_message_lists_every_path() {
        let err = ConfigError::MissingKeys(vec!["a.b".into(), "c.d".into()]);
        let message = err.to_string();
        assert!(message.contains("a.b"));
        assert!(message.contains("c.d"));
    }
}
