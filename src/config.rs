//! Configuration for metadata dialect selection.
//!
//! Settings are read from TOML. Every key is optional; an empty document
//! yields [`MetaDataConfig::default`], which selects the PostgreSQL dialect
//! with its native identifier folding.
//!
//! ```toml
//! dialect = "postgres"
//! identifier_case = "lower"
//! trace_rows = false
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::dialect::{DialectKind, IdentifierCase, MetaDataDialect};
use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetaDataConfig {
    /// Which catalog dialect answers metadata queries.
    pub dialect: DialectKind,

    /// Overrides the dialect's own identifier folding when set.
    pub identifier_case: Option<IdentifierCase>,

    /// Emit a `trace` event with the raw values of every fetched row.
    pub trace_rows: bool,
}

impl Default for MetaDataConfig {
    fn default() -> Self {
        Self {
            dialect: DialectKind::Postgres,
            identifier_case: None,
            trace_rows: true,
        }
    }
}

impl MetaDataConfig {
    /// Parse a configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), dialect = %config.dialect, "loaded metadata config");
        Ok(config)
    }

    /// The identifier folding in effect: the override, or the dialect default.
    pub fn effective_identifier_case(&self) -> IdentifierCase {
        self.identifier_case
            .unwrap_or_else(|| self.dialect.default_identifier_case())
    }

    /// Instantiate the configured dialect.
    pub fn build_dialect(&self) -> Box<dyn MetaDataDialect> {
        crate::dialect::dialect_for(self)
    }
}
