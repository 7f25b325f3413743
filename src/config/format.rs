//! Reading and writing documents in the supported serialization formats.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use super::error::{ParseFailure, SerializeFailure};
use super::{ConfigError, Document};

/// A serialization format, detected from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Toml,
    Json,
    Yaml,
}

impl Format {
    /// All formats in probe order.
    pub const ALL: [Format; 3] = [Format::Toml, Format::Json, Format::Yaml];

    /// Extensions (without the dot) recognised for this format.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Format::Toml => &["toml"],
            Format::Json => &["json"],
            Format::Yaml => &["yaml", "yml"],
        }
    }

    /// Extension used when writing a new file, including the dot.
    pub fn default_extension(self) -> &'static str {
        match self {
            Format::Toml => ".toml",
            Format::Json => ".json",
            Format::Yaml => ".yaml",
        }
    }

    /// Detects the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;

        Self::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&ext.as_str()))
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))
    }

    /// Parses document content in this format.
    ///
    /// Blank content loads as an empty document.
    pub fn parse(self, contents: &str) -> Result<Document, ParseFailure> {
        let value: Value = match self {
            Format::Toml => return Ok(toml::from_str(contents)?),
            Format::Json => serde_json::from_str(contents)?,
            Format::Yaml if contents.trim().is_empty() => Value::Null,
            Format::Yaml => {
                let mut yaml: serde_yaml::Value = serde_yaml::from_str(contents)?;
                yaml.apply_merge()?;
                serde_json::to_value(yaml)?
            }
        };

        match value {
            Value::Object(map) => Ok(map),
            Value::Null if self == Format::Yaml => Ok(Document::new()),
            _ => Err(ParseFailure::NotAMapping),
        }
    }

    /// Renders a document in this format.
    pub fn render(self, doc: &Document) -> Result<String, SerializeFailure> {
        match self {
            Format::Toml => Ok(toml::to_string(doc)?),
            Format::Json => {
                let mut out = serde_json::to_string_pretty(doc)?;
                out.push('\n');
                Ok(out)
            }
            Format::Yaml => Ok(serde_yaml::to_string(doc)?),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Toml => "toml",
            Format::Json => "json",
            Format::Yaml => "yaml",
        })
    }
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "toml" => Ok(Format::Toml),
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            _ => Err(ConfigError::UnknownFormatName(s.to_string())),
        }
    }
}

/// Loads a document, detecting its format from the extension.
pub fn load_document(path: &Path) -> Result<Document, ConfigError> {
    load_document_as(path, Format::from_path(path)?)
}

/// Loads a document in an explicit format, ignoring the extension.
pub fn load_document_as(path: &Path, format: Format) -> Result<Document, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(path.to_path_buf())
        } else {
            ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    format.parse(&contents).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        format,
        source,
    })
}

/// Writes a document in the given format, creating parent directories.
pub fn save_document(doc: &Document, path: &Path, format: Format) -> Result<(), ConfigError> {
    let rendered = format
        .render(doc)
        .map_err(|source| ConfigError::SerializeError {
            path: path.to_path_buf(),
            format,
            source,
        })?;

    let write_error = |source| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, rendered).map_err(write_error)?;

    debug!(path = %path.display(), %format, "wrote document");
    Ok(())
}

/// Finds `<stem>.<ext>` in `dir`, trying each format's extensions in probe order.
pub fn find_sibling(dir: &Path, stem: &str) -> Option<PathBuf> {
    Format::ALL
        .into_iter()
        .flat_map(|format| format.extensions().iter())
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|candidate| candidate.is_file())
}
