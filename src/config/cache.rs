use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{Format, ResolvedConfig};

/// Everything a resolved config depends on besides file contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Absolute path of the named config file.
    pub path: PathBuf,
    /// Absolute directory searched for `base.*` and `env.*` siblings.
    pub config_dir: PathBuf,
    pub environment: Option<String>,
    pub format: Option<Format>,
}

/// Resolved configurations keyed by [`CacheKey`].
///
/// Entries live until they are invalidated or the cache is dropped; a cached
/// entry is never refreshed from disk on its own.
#[derive(Debug, Default)]
pub struct ConfigCache {
    entries: HashMap<CacheKey, ResolvedConfig>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&ResolvedConfig> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: CacheKey, config: ResolvedConfig) {
        self.entries.insert(key, config);
    }

    /// Drops every entry for the named file `path`, whatever its directory,
    /// environment or format. Returns the number of entries removed.
    pub fn invalidate(&mut self, path: &Path) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.path != path);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Document;

    fn key(path: &str, dir: &str, env: Option<&str>) -> CacheKey {
        CacheKey {
            path: PathBuf::from(path),
            config_dir: PathBuf::from(dir),
            environment: env.map(str::to_string),
            format: None,
        }
    }

    fn resolved(path: &str, env: Option<&str>) -> ResolvedConfig {
        ResolvedConfig::new(
            PathBuf::from(path),
            env.map(str::to_string),
            Document::new(),
        )
    }

    #[test]
    fn test_entries_are_keyed_by_every_input() {
        let mut cache = ConfigCache::new();
        cache.insert(key("/cfg/app.toml", "/cfg", Some("dev")), resolved("/cfg/app.toml", Some("dev")));
        cache.insert(key("/cfg/app.toml", "/cfg", Some("prod")), resolved("/cfg/app.toml", Some("prod")));
        cache.insert(key("/cfg/app.toml", "/cfg", None), resolved("/cfg/app.toml", None));
        cache.insert(key("/cfg/app.toml", "/other", None), resolved("/cfg/app.toml", None));

        assert_eq!(cache.len(), 4);
        assert!(cache.get(&key("/cfg/app.toml", "/cfg", Some("dev"))).is_some());
        assert!(cache.get(&key("/cfg/app.toml", "/cfg", Some("stage"))).is_none());
        assert!(cache.get(&key("/cfg/other.toml", "/cfg", None)).is_none());

        let mut forced = key("/cfg/app.toml", "/cfg", None);
        forced.format = Some(Format::Toml);
        assert!(cache.get(&forced).is_none());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let mut cache = ConfigCache::new();
        cache.insert(key("/cfg/app.toml", "/cfg", Some("dev")), resolved("/cfg/app.toml", Some("dev")));
        cache.insert(key("/cfg/app.toml", "/b", None), resolved("/cfg/app.toml", None));
        cache.insert(key("/cfg/other.toml", "/cfg", None), resolved("/cfg/other.toml", None));

        assert_eq!(cache.invalidate(Path::new("/cfg/app.toml")), 2);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
