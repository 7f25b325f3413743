//! Layered configuration loading over TOML, JSON and YAML documents.

mod cache;
mod error;
mod format;
mod loader;
mod merge;
mod resolved;
mod section;

pub use cache::{CacheKey, ConfigCache};
pub use error::{ConfigError, ParseFailure, SerializeFailure};
pub use format::{find_sibling, load_document, load_document_as, save_document, Format};
pub use loader::{ConfigLoader, DEFAULT_CONFIG_DIR};
pub use merge::{deep_merge, merge_layers};
pub use resolved::{AwsConfig, ResolvedConfig};
pub use section::ConfigSection;

/// A configuration document: string keys mapped to scalars, lists, or nested documents.
pub type Document = serde_json::Map<String, serde_json::Value>;
