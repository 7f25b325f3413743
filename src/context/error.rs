use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid CDK manifest '{path}': {reason}")]
    InvalidManifest { path: PathBuf, reason: String },
}
