//! Linker configuration
//!
//! Loaded from TOML or built in code:
//!
//! ```toml
//! classification_keys = ["asil"]
//! result_file_names = ["test.xml"]
//! need_id_prefix = "TESTLINK_"
//!
//! [property_keys]
//! partially_verifies = "PartiallyVerifies"
//! fully_verifies = "FullyVerifies"
//! test_type = "TestType"
//! derivation_technique = "DerivationTechnique"
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use testlink_reader::{ResultLogReader, DEFAULT_MAX_FILE_SIZE, DEFAULT_RESULT_FILE_NAME};

/// Names of the four required annotation properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertyKeys {
    /// Key of the partially-verified requirement list
    pub partially_verifies: String,
    /// Key of the fully-verified requirement list
    pub fully_verifies: String,
    /// Key of the test type classifier
    pub test_type: String,
    /// Key of the derivation technique classifier
    pub derivation_technique: String,
}

impl Default for PropertyKeys {
    fn default() -> Self {
        Self {
            partially_verifies: "partially_verifies".to_string(),
            fully_verifies: "fully_verifies".to_string(),
            test_type: "test_type".to_string(),
            derivation_technique: "derivation_technique".to_string(),
        }
    }
}

impl PropertyKeys {
    /// Key set written by the Python annotation decorator
    #[must_use]
    pub fn pascal_case() -> Self {
        Self {
            partially_verifies: "PartiallyVerifies".to_string(),
            fully_verifies: "FullyVerifies".to_string(),
            test_type: "TestType".to_string(),
            derivation_technique: "DerivationTechnique".to_string(),
        }
    }

    /// Required keys in validation order
    #[must_use]
    pub fn required(&self) -> [&str; 4] {
        [
            self.partially_verifies.as_str(),
            self.fully_verifies.as_str(),
            self.test_type.as_str(),
            self.derivation_technique.as_str(),
        ]
    }
}

/// Linker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkerConfig {
    /// Required annotation property names
    pub property_keys: PropertyKeys,
    /// Optional classification properties copied into specs when present
    pub classification_keys: Vec<String>,
    /// File names collected when scanning directories
    pub result_file_names: Vec<String>,
    /// Maximum result log size in bytes
    pub max_file_size: u64,
    /// Prefix of synthetic need ids
    pub need_id_prefix: String,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            property_keys: PropertyKeys::default(),
            classification_keys: Vec::new(),
            result_file_names: vec![DEFAULT_RESULT_FILE_NAME.to_string()],
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            need_id_prefix: "TESTLINK_".to_string(),
        }
    }
}

impl LinkerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With property key names
    #[inline]
    #[must_use]
    pub fn with_property_keys(mut self, keys: PropertyKeys) -> Self {
        self.property_keys = keys;
        self
    }

    /// With extra classification keys
    #[inline]
    #[must_use]
    pub fn with_classification_keys(mut self, keys: Vec<String>) -> Self {
        self.classification_keys = keys;
        self
    }

    /// With result file names for directory scans
    #[inline]
    #[must_use]
    pub fn with_result_file_names(mut self, names: Vec<String>) -> Self {
        self.result_file_names = names;
        self
    }

    /// With maximum result log size
    #[inline]
    #[must_use]
    pub fn with_max_file_size(mut self, max: u64) -> Self {
        self.max_file_size = max;
        self
    }

    /// With need id prefix
    #[inline]
    #[must_use]
    pub fn with_need_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.need_id_prefix = prefix.into();
        self
    }

    /// Parse and validate TOML configuration
    ///
    /// # Errors
    /// - `ConfigError::Toml` on syntax or schema errors
    /// - `ConfigError::Invalid` if validation fails
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - see [`from_toml_str`](Self::from_toml_str)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded linker config from {}", path.display());
        Ok(config)
    }

    /// Check internal consistency
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` describing the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = self.property_keys.required();
        if required.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::Invalid("property key names must not be empty".to_string()));
        }
        let distinct: BTreeSet<&str> = required.iter().copied().collect();
        if distinct.len() != required.len() {
            return Err(ConfigError::Invalid("property key names must be distinct".to_string()));
        }
        if let Some(key) = self
            .classification_keys
            .iter()
            .find(|k| k.trim().is_empty() || distinct.contains(k.as_str()))
        {
            return Err(ConfigError::Invalid(format!(
                "classification key '{key}' is empty or shadows a required key"
            )));
        }
        if self.need_id_prefix.is_empty()
            || !self
                .need_id_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::Invalid(format!(
                "need id prefix '{}' must be non-empty [A-Za-z0-9_]",
                self.need_id_prefix
            )));
        }
        if self.max_file_size == 0 {
            return Err(ConfigError::Invalid("max_file_size must be positive".to_string()));
        }
        Ok(())
    }

    /// Result log reader over `inputs` honouring this configuration
    #[must_use]
    pub fn reader<I, P>(&self, inputs: I) -> ResultLogReader
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        ResultLogReader::new(inputs)
            .with_result_file_names(self.result_file_names.clone())
            .with_max_file_size(self.max_file_size)
    }
}
