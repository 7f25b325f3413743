//! Bridge between config documents and the `context` block of a CDK manifest.
//!
//! The manifest (usually `cdk.json`) is always read and written as JSON. Only
//! its `context` key is touched; every other top-level key is written back
//! unchanged and in its original position.

mod error;

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::config::{deep_merge, load_document, load_document_as, save_document};
use crate::config::{ConfigError, Document, Format};

pub use error::ContextError;

/// Manifest key holding the CDK context block.
pub const CONTEXT_KEY: &str = "context";

/// Config key holding per-environment override blocks.
pub const ENVIRONMENTS_KEY: &str = "environments";

/// File stem used when importing a context block without an explicit output path.
pub const IMPORTED_CONTEXT_STEM: &str = "cdk-context";

/// Converts config files between formats and moves them in and out of a CDK
/// manifest's context block.
///
/// ## Example
///
/// ```no_run
/// use cdk_config::{ContextBridge, Format};
///
/// let bridge = ContextBridge::new("config")?;
///
/// // cdk.json context -> config/cdk-context.toml
/// bridge.import_context("cdk.json", Format::Toml, None)?;
///
/// // config/app.toml (with its `environments.prod` block applied) -> cdk.json context
/// bridge.export_context("config/app.toml", "cdk.json", Some("prod"))?;
/// # Ok::<(), cdk_config::ContextError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ContextBridge {
    config_dir: PathBuf,
}

impl ContextBridge {
    /// Creates a bridge writing default outputs into `config_dir`, creating
    /// the directory if it does not exist.
    pub fn new(config_dir: impl AsRef<Path>) -> Result<Self, ContextError> {
        let config_dir = config_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&config_dir).map_err(|source| ConfigError::WriteError {
            path: config_dir.clone(),
            source,
        })?;
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Rewrites a config file in another format.
    ///
    /// Without `output_file` the result goes to `<config_dir>/<input stem><ext>`.
    pub fn convert_file(
        &self,
        input_file: impl AsRef<Path>,
        output_format: Format,
        output_file: Option<&Path>,
    ) -> Result<PathBuf, ContextError> {
        let input = input_file.as_ref();
        let doc = load_document(input)?;

        let output = match output_file {
            Some(path) => path.to_path_buf(),
            None => {
                let stem = input
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .ok_or_else(|| ConfigError::UnsupportedFormat(input.to_path_buf()))?;
                self.default_output(stem, output_format)
            }
        };

        save_document(&doc, &output, output_format)?;
        info!(input = %input.display(), output = %output.display(), format = %output_format, "converted config");
        Ok(output)
    }

    /// Writes the manifest's context block as a standalone document.
    ///
    /// A manifest without a context block yields an empty document. Without
    /// `output_file` the result goes to `<config_dir>/cdk-context<ext>`.
    pub fn import_context(
        &self,
        manifest_path: impl AsRef<Path>,
        output_format: Format,
        output_file: Option<&Path>,
    ) -> Result<PathBuf, ContextError> {
        let manifest_path = manifest_path.as_ref();
        let manifest = load_document_as(manifest_path, Format::Json)?;

        let context = match manifest.get(CONTEXT_KEY) {
            None => Document::new(),
            Some(Value::Object(context)) => context.clone(),
            Some(_) => return Err(not_a_mapping(manifest_path)),
        };

        let output = output_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_output(IMPORTED_CONTEXT_STEM, output_format));

        save_document(&context, &output, output_format)?;
        info!(manifest = %manifest_path.display(), output = %output.display(), keys = context.len(), "imported CDK context");
        Ok(output)
    }

    /// Deep-merges a config file into the manifest's context block.
    ///
    /// With an `environment`, a matching `environments.<environment>` block is
    /// merged over the document's other top-level keys first. A missing
    /// manifest is created; existing non-context keys are preserved.
    pub fn export_context(
        &self,
        config_file: impl AsRef<Path>,
        manifest_path: impl AsRef<Path>,
        environment: Option<&str>,
    ) -> Result<PathBuf, ContextError> {
        let config_file = config_file.as_ref();
        let manifest_path = manifest_path.as_ref();

        let mut config = load_document(config_file)?;
        if let Some(environment) = environment {
            config = apply_environment(config, environment);
        }

        let mut manifest = if manifest_path.exists() {
            load_document_as(manifest_path, Format::Json)?
        } else {
            Document::new()
        };

        let context = manifest
            .entry(CONTEXT_KEY)
            .or_insert_with(|| Value::Object(Document::new()));
        match context {
            Value::Object(context) => deep_merge(context, config),
            _ => return Err(not_a_mapping(manifest_path)),
        }

        save_document(&manifest, manifest_path, Format::Json)?;
        info!(config = %config_file.display(), manifest = %manifest_path.display(), "exported CDK context");
        Ok(manifest_path.to_path_buf())
    }

    fn default_output(&self, stem: &str, format: Format) -> PathBuf {
        self.config_dir
            .join(format!("{stem}{}", format.default_extension()))
    }
}

/// Merges `environments.<environment>` over the rest of the document.
///
/// Documents without a non-empty block for the environment are returned as is.
fn apply_environment(mut config: Document, environment: &str) -> Document {
    let block = match config
        .get(ENVIRONMENTS_KEY)
        .and_then(|envs| envs.get(environment))
    {
        Some(Value::Object(block)) if !block.is_empty() => block.clone(),
        _ => return config,
    };

    config.retain(|key, _| key != ENVIRONMENTS_KEY);
    deep_merge(&mut config, block);
    config
}

fn not_a_mapping(path: &Path) -> ContextError {
    ContextError::InvalidManifest {
        path: path.to_path_buf(),
        reason: format!("`{CONTEXT_KEY}` is not a mapping"),
    }
}
