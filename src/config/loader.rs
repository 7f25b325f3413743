use std::path::{Path, PathBuf};

use tracing::debug;

use super::format::{find_sibling, load_document, load_document_as};
use super::merge::merge_layers;
use super::{CacheKey, ConfigCache, ConfigError, Format, ResolvedConfig};

/// Directory searched for config files when none is given.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Loader for layered configuration files.
///
/// A named config file is merged with up to two sibling files found in the
/// config directory:
///
/// 1. `base.<ext>` (lowest precedence)
/// 2. the named file
/// 3. `env.<environment>.<ext>` (highest precedence, only with an environment)
///
/// Nested mappings are merged recursively; other values (including lists)
/// are replaced entirely. Sibling files may use any supported format and are
/// probed as toml, json, yaml, yml.
///
/// ## Example
///
/// ```no_run
/// use cdk_config::{ConfigCache, ConfigLoader};
///
/// let mut cache = ConfigCache::new();
/// let config = ConfigLoader::new("config")
///     .with_environment("prod")
///     .resolve("my-app.toml", &mut cache)?;
///
/// let nat_gateways = config.get("network.nat_gateways");
/// println!("NAT gateways: {nat_gateways:?}");
/// # Ok::<(), cdk_config::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
#[must_use = "loaders do nothing until .load() or .resolve() is called"]
pub struct ConfigLoader {
    config_dir: PathBuf,
    environment: Option<String>,
    format: Option<Format>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_DIR)
    }
}

impl ConfigLoader {
    /// Creates a loader that looks for config files in `config_dir`.
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
            environment: None,
            format: None,
        }
    }

    /// Adds the `env.<environment>.<ext>` overlay. The name is lower-cased.
    pub fn with_environment(mut self, environment: impl AsRef<str>) -> Self {
        self.environment = Some(environment.as_ref().to_lowercase());
        self
    }

    /// Parses the named file as `format` regardless of its extension.
    ///
    /// Sibling base and environment files are still detected by extension.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// Resolves `config_file` to an absolute path.
    ///
    /// Relative paths are taken relative to the config directory.
    pub fn config_path(&self, config_file: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
        let config_file = config_file.as_ref();
        let joined = if config_file.is_absolute() {
            config_file.to_path_buf()
        } else {
            self.config_dir.join(config_file)
        };
        std::path::absolute(&joined).map_err(|source| ConfigError::ReadError {
            path: joined,
            source,
        })
    }

    /// Resolves through `cache`: a cached result for the same absolute path,
    /// config directory, environment and format is returned without touching
    /// the filesystem.
    pub fn resolve(
        &self,
        config_file: impl AsRef<Path>,
        cache: &mut ConfigCache,
    ) -> Result<ResolvedConfig, ConfigError> {
        let key = self.cache_key(config_file)?;

        if let Some(cached) = cache.get(&key) {
            debug!(path = %key.path.display(), environment = ?self.environment, "config cache hit");
            return Ok(cached.clone());
        }

        let resolved = self.load_layers(key.path.clone())?;
        cache.insert(key, resolved.clone());
        Ok(resolved)
    }

    fn cache_key(&self, config_file: impl AsRef<Path>) -> Result<CacheKey, ConfigError> {
        let config_dir =
            std::path::absolute(&self.config_dir).map_err(|source| ConfigError::ReadError {
                path: self.config_dir.clone(),
                source,
            })?;

        Ok(CacheKey {
            path: self.config_path(config_file)?,
            config_dir,
            environment: self.environment.clone(),
            format: self.format,
        })
    }

    /// Loads and merges all layers from disk, bypassing any cache.
    pub fn load(&self, config_file: impl AsRef<Path>) -> Result<ResolvedConfig, ConfigError> {
        let path = self.config_path(config_file)?;
        self.load_layers(path)
    }

    fn load_layers(&self, path: PathBuf) -> Result<ResolvedConfig, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::FileNotFound(path));
        }

        let named = match self.format {
            Some(format) => load_document_as(&path, format)?,
            None => load_document(&path)?,
        };

        let mut layers = Vec::with_capacity(3);

        if let Some(base_path) = find_sibling(&self.config_dir, "base") {
            debug!(path = %base_path.display(), "merging base config");
            layers.push(load_document(&base_path)?);
        }

        layers.push(named);

        if let Some(env) = &self.environment {
            match find_sibling(&self.config_dir, &format!("env.{env}")) {
                Some(env_path) => {
                    debug!(path = %env_path.display(), environment = %env, "merging environment config");
                    layers.push(load_document(&env_path)?);
                }
                None => debug!(environment = %env, "no environment config found"),
            }
        }

        debug!(path = %path.display(), layers = layers.len(), "resolved config");
        Ok(ResolvedConfig::new(
            path,
            self.environment.clone(),
            merge_layers(layers),
        ))
    }
}
