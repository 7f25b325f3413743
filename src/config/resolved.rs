use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::section::lookup_path;
use super::{ConfigError, ConfigSection, Document};

/// The merged result of all configuration layers.
///
/// Immutable once built. Cloning shares the underlying document.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    source: PathBuf,
    environment: Option<String>,
    data: Arc<Document>,
}

/// AWS deployment settings read from the conventional `aws` and `project` sections.
#[derive(Debug, Clone, PartialEq)]
pub struct AwsConfig {
    pub account_id: Option<String>,
    pub region: Option<String>,
    pub tags: Document,
}

impl ResolvedConfig {
    pub fn new(source: PathBuf, environment: Option<String>, data: Document) -> Self {
        Self {
            source,
            environment,
            data: Arc::new(data),
        }
    }

    /// Absolute path of the named config file this was resolved from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// A view over the whole document.
    pub fn view(&self) -> ConfigSection<'_> {
        ConfigSection::new(&self.data)
    }

    pub fn get_section(&self, name: &str) -> ConfigSection<'_> {
        match self.data.get(name) {
            Some(Value::Object(map)) => ConfigSection::new(map),
            _ => ConfigSection::empty(),
        }
    }

    /// Dotted-path lookup over the whole document.
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.data, path)
    }

    pub fn get_or<'a>(&'a self, path: &str, default: &'a Value) -> &'a Value {
        lookup_path(&self.data, path).unwrap_or(default)
    }

    pub fn get_required(&self, path: &str) -> Result<&Value, ConfigError> {
        lookup_path(&self.data, path)
            .filter(|value| !value.is_null())
            .ok_or_else(|| ConfigError::MissingKey(path.to_string()))
    }

    pub fn validate_required_keys<S: AsRef<str>>(&self, paths: &[S]) -> Result<(), ConfigError> {
        self.view().validate_required_keys(paths)
    }

    pub fn aws_config(&self) -> AwsConfig {
        let string_at = |path: &str| {
            lookup_path(&self.data, path)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        AwsConfig {
            account_id: string_at("aws.account_id"),
            region: string_at("aws.region"),
            tags: lookup_path(&self.data, "project.tags")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Deserializes the whole document into a typed struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        self.view().deserialize()
    }

    pub fn to_dict(&self) -> &Document {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> ResolvedConfig {
        let data = json!({
            "project": {
                "name": "proyecto-test",
                "tags": {"Owner": "DevOps", "Environment": "Development"}
            },
            "aws": {"region": "us-east-1", "account_id": "123456789012"}
        });
        ResolvedConfig::new(
            PathBuf::from("/cfg/proyecto-test.toml"),
            None,
            data.as_object().cloned().unwrap(),
        )
    }

    #[test]
    fn test_dotted_get() {
        let config = config();
        assert_eq!(config.get("project.name"), Some(&json!("proyecto-test")));
        assert_eq!(config.get("database.host"), None);

        let fallback = json!("localhost");
        assert_eq!(config.get_or("database.host", &fallback), &fallback);
    }

    #[test]
    fn test_get_section() {
        let config = config();
        let aws = config.get_section("aws");
        assert_eq!(aws.get_str("region"), Some("us-east-1"));
        assert_eq!(aws.get_str("account_id"), Some("123456789012"));
        assert!(config.get_section("database").is_empty());
    }

    #[test]
    fn test_required_lookups() {
        let config = config();
        assert_eq!(config.get_required("project.name").unwrap(), &json!("proyecto-test"));
        assert!(matches!(
            config.get_required("database.host"),
            Err(ConfigError::MissingKey(_))
        ));
        config.validate_required_keys(&["project.name", "aws.region"]).unwrap();
        assert!(matches!(
            config.validate_required_keys(&["database.host", "database.port"]),
            Err(ConfigError::MissingKeys(keys)) if keys.len() == 2
        ));
    }

    #[test]
    fn test_aws_config() {
        let aws = config().aws_config();
        assert_eq!(aws.account_id.as_deref(), Some("123456789012"));
        assert_eq!(aws.region.as_deref(), Some("us-east-1"));
        assert_eq!(aws.tags.get("Owner"), Some(&json!("DevOps")));
    }

    #[test]
    fn test_aws_config_defaults_when_absent() {
        let config = ResolvedConfig::new(PathBuf::from("/cfg/empty.toml"), None, Document::new());
        let aws = config.aws_config();
        assert_eq!(aws.account_id, None);
        assert!(aws.tags.is_empty());
    }

    #[test]
    fn test_clones_share_document() {
        let config = config();
        let clone = config.clone();
        assert!(std::ptr::eq(config.to_dict(), clone.to_dict()));
    }
}
