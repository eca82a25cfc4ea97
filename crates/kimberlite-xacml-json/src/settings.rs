//! Codec configuration.
//!
//! Only output formatting is configurable; every parsing rule is always on.
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. An optional TOML file
//! 3. Environment variables (`XACML_JSON_*`, `__` between nested keys, e.g.
//!    `XACML_JSON_OUTPUT__CONTENT_ENCODING=base64`)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level codec configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub output: OutputConfig,
}

/// How `Content` documents are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentEncoding {
    /// Serialized XML text inside the JSON string.
    #[default]
    Inline,
    /// Base64 of the serialized XML.
    Base64,
}

/// Output formatting options shared by the request and response codecs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print emitted JSON.
    pub pretty: bool,
    /// Emit well-known categories under their shorthand key instead of in
    /// the `Category` array.
    pub shorthand_categories: bool,
    pub content_encoding: ContentEncoding,
}

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: "XACML_JSON".to_string(),
        }
    }

    /// Read this TOML file if it exists.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix (default: "XACML_JSON")
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources with proper precedence
    pub fn load(self) -> Result<CodecConfig, ConfigError> {
        let mut builder = ::config::Config::builder();

        builder = builder.add_source(::config::Config::try_from(&CodecConfig::default())?);

        if let Some(file) = self.file {
            builder = builder.add_source(
                ::config::File::from(file)
                    .required(false)
                    .format(::config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load configuration or return defaults if any source is invalid
    pub fn load_or_default(self) -> CodecConfig {
        self.load().unwrap_or_default()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
