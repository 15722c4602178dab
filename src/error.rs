//! Error types for pg_reveng.
//!
//! Every failure on the catalog query path is represented by a single
//! [`MetaDataAccessError`]. Driver failures are translated into it by a
//! [`SqlExceptionConverter`], both when the statement is prepared/executed
//! (statement text known) and while the result cursor is iterated (statement
//! text may be unavailable).
//!
//! Configuration problems are reported separately through [`ConfigError`];
//! they never occur on the query path.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Boxed cause carried by [`MetaDataAccessError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Fixed message used when listing suggested primary-key strategies fails.
pub const SUGGESTED_STRATEGY_FAILURE: &str =
    "Could not get list of suggested identity strategies from database. Probably a driver problem.";

/// A catalog query failed to prepare, execute, fetch or decode.
#[derive(Debug, thiserror::Error)]
pub struct MetaDataAccessError {
    message: String,
    sql: Option<String>,
    sql_state: Option<String>,
    #[source]
    source: BoxError,
}

impl MetaDataAccessError {
    pub fn new(
        message: impl Into<String>,
        sql: Option<String>,
        sql_state: Option<String>,
        source: BoxError,
    ) -> Self {
        Self {
            message: message.into(),
            sql,
            sql_state,
            source,
        }
    }

    /// Human-readable description of the failed operation.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The failing statement, when it was known at the point of failure.
    pub fn sql(&self) -> Option<&str> {
        self.sql.as_deref()
    }

    /// Five-character SQLSTATE reported by the server, if any.
    pub fn sql_state(&self) -> Option<&str> {
        self.sql_state.as_deref()
    }

    /// Whether the underlying cause came from the PostgreSQL driver.
    pub fn is_driver_error(&self) -> bool {
        self.source.is::<postgres::Error>()
    }
}

impl fmt::Display for MetaDataAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(state) = &self.sql_state {
            write!(f, " [{state}]")?;
        }
        if let Some(sql) = &self.sql {
            write!(f, " [{sql}]")?;
        }
        write!(f, ": {}", self.source)
    }
}

// ── Error conversion ──────────────────────────────────────────────────────

/// Turns a low-level data-access failure into a [`MetaDataAccessError`].
///
/// Dialects hand one of these to every query they run so callers can plug
/// in their own message decoration or classification.
pub trait SqlExceptionConverter: Send + Sync {
    fn convert(&self, cause: BoxError, message: &str, sql: Option<&str>) -> MetaDataAccessError;
}

/// Converter that keeps the message verbatim and lifts the SQLSTATE out of
/// PostgreSQL driver errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSqlExceptionConverter;

impl SqlExceptionConverter for DefaultSqlExceptionConverter {
    fn convert(&self, cause: BoxError, message: &str, sql: Option<&str>) -> MetaDataAccessError {
        let sql_state = cause
            .downcast_ref::<postgres::Error>()
            .and_then(|e| e.code())
            .map(|code| code.code().to_string());

        MetaDataAccessError::new(message, sql.map(str::to_string), sql_state, cause)
    }
}

/// Shared handle to a converter, as held by dialects and result iterators.
pub type SharedSqlExceptionConverter = Arc<dyn SqlExceptionConverter>;

// ── Configuration errors ──────────────────────────────────────────────────

/// Errors raised while loading or validating [`crate::config::MetaDataConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for the expected shape.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
