//! Read-only view over a configuration mapping.

use std::sync::LazyLock;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{ConfigError, Document};

/// A read-only view over a (possibly nested) configuration mapping.
///
/// Lookups never fail: a missing key yields `None`, a default, or an empty
/// section. Only [`get_required`](Self::get_required) and
/// [`validate_required_keys`](Self::validate_required_keys) report errors.
///
/// ```
/// use cdk_config::ConfigSection;
/// use serde_json::json;
///
/// let doc = json!({"network": {"vpc_cidr": "10.0.0.0/16"}});
/// let config = ConfigSection::new(doc.as_object().unwrap());
///
/// assert_eq!(config.section("network").get_str("vpc_cidr"), Some("10.0.0.0/16"));
/// assert!(config.section("nonexistent").section("path").is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfigSection<'a> {
    data: &'a Document,
}

static EMPTY: LazyLock<Document> = LazyLock::new(Document::new);

impl<'a> ConfigSection<'a> {
    pub fn new(data: &'a Document) -> Self {
        Self { data }
    }

    /// A section with no keys.
    pub fn empty() -> ConfigSection<'static> {
        ConfigSection { data: &EMPTY }
    }

    /// Returns the nested section under `key`, or an empty section if the key
    /// is absent or does not hold a mapping.
    ///
    /// The child borrows the underlying document, not `self`, so chained
    /// lookups can be bound and kept.
    pub fn section(&self, key: &str) -> ConfigSection<'a> {
        match self.data.get(key) {
            Some(Value::Object(map)) => ConfigSection::new(map),
            _ => ConfigSection::empty(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.data.get(key)
    }

    pub fn get_or(&self, key: &str, default: &'a Value) -> &'a Value {
        self.get(key).unwrap_or(default)
    }

    pub fn get_str(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Walks a dotted path (`"network.vpc_cidr"`) through nested mappings.
    ///
    /// Returns `None` when any segment is missing or a non-mapping value is
    /// reached before the path ends.
    pub fn get_path(&self, path: &str) -> Option<&'a Value> {
        lookup_path(self.data, path)
    }

    pub fn get_path_or(&self, path: &str, default: &'a Value) -> &'a Value {
        self.get_path(path).unwrap_or(default)
    }

    /// Looks up a dotted path that must be present and non-null.
    pub fn get_required(&self, path: &str) -> Result<&'a Value, ConfigError> {
        self.get_path(path)
            .filter(|value| !value.is_null())
            .ok_or_else(|| ConfigError::MissingKey(path.to_string()))
    }

    /// Checks every path and reports all missing ones in a single error.
    pub fn validate_required_keys<S: AsRef<str>>(&self, paths: &[S]) -> Result<(), ConfigError> {
        let missing: Vec<String> = paths
            .iter()
            .map(|path| path.as_ref())
            .filter(|path| self.get_required(path).is_err())
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingKeys(missing))
        }
    }

    /// Deserializes this section into a typed struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let value = Value::Object(self.data.clone());
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_dict(&self) -> &'a Document {
        self.data
    }
}

pub(super) fn lookup_path<'a>(data: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = data.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}
