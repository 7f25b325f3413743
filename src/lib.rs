pub mod config;
pub mod context;

pub use config::{
    AwsConfig, ConfigCache, ConfigError, ConfigLoader, ConfigSection, Document, Format,
    ResolvedConfig,
};
pub use context::{ContextBridge, ContextError};
