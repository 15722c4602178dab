//! Catalog dialects.
//!
//! A [`MetaDataDialect`] knows how one database family stores identifiers
//! and how to ask its system catalog which primary-key strategy a table
//! should use. The dialect in use is picked from
//! [`MetaDataConfig`](crate::config::MetaDataConfig) via [`dialect_for`].

pub mod postgres;

use std::fmt;

use serde::Deserialize;

use crate::config::MetaDataConfig;
use crate::cursor::ResultSetIterator;
use crate::error::{MetaDataAccessError, SharedSqlExceptionConverter};
use crate::strategy::StrategyDecision;

pub use self::postgres::PostgresMetaDataDialect;

/// Lazily converted strategy decisions for one catalog query.
///
/// Borrows the connection until it is dropped.
pub type SuggestedPrimaryKeyStrategies<'c> =
    ResultSetIterator<'c, ::postgres::RowIter<'c>, StrategyDecision>;

// ── Dialect selection ─────────────────────────────────────────────────────

/// Supported catalog dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[serde(alias = "postgresql")]
    Postgres,
}

impl DialectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialectKind::Postgres => "postgres",
        }
    }

    /// How the dialect's catalog stores unquoted identifiers.
    pub fn default_identifier_case(&self) -> IdentifierCase {
        match self {
            DialectKind::Postgres => IdentifierCase::Lower,
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Build the dialect described by `config`.
pub fn dialect_for(config: &MetaDataConfig) -> Box<dyn MetaDataDialect> {
    match config.dialect {
        DialectKind::Postgres => Box::new(
            PostgresMetaDataDialect::new()
                .with_identifier_case(config.effective_identifier_case())
                .with_row_tracing(config.trace_rows),
        ),
    }
}

// ── Identifier folding ────────────────────────────────────────────────────

/// Case folding applied to identifiers before they are used as filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierCase {
    Lower,
    Upper,
    Preserve,
}

impl IdentifierCase {
    /// Fold one identifier. ASCII-only, matching how PostgreSQL folds
    /// unquoted names.
    pub fn apply(&self, identifier: &str) -> String {
        match self {
            IdentifierCase::Lower => identifier.to_ascii_lowercase(),
            IdentifierCase::Upper => identifier.to_ascii_uppercase(),
            IdentifierCase::Preserve => identifier.to_string(),
        }
    }

    /// Fold an optional identifier; absent stays absent.
    pub fn normalize(&self, identifier: Option<&str>) -> Option<String> {
        identifier.map(|id| self.apply(id))
    }
}

// ── Query inputs and outputs ──────────────────────────────────────────────

/// Scope of a metadata lookup. `None` components are unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TableLocator {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub table: Option<String>,
}

impl TableLocator {
    pub fn new(catalog: Option<&str>, schema: Option<&str>, table: Option<&str>) -> Self {
        Self {
            catalog: catalog.map(str::to_string),
            schema: schema.map(str::to_string),
            table: table.map(str::to_string),
        }
    }

    /// Locator for `schema.table` in the current catalog.
    pub fn table(schema: &str, table: &str) -> Self {
        Self::new(None, Some(schema), Some(table))
    }
}

impl fmt::Display for TableLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |p: &Option<String>| p.clone().unwrap_or_else(|| "null".to_string());
        write!(
            f,
            "{}.{}.{}",
            part(&self.catalog),
            part(&self.schema),
            part(&self.table)
        )
    }
}

/// A rendered catalog statement and its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub sql: String,
    /// Values for `$1`, `$2`, … in order.
    pub params: Vec<String>,
}

// ── Capabilities ──────────────────────────────────────────────────────────

/// Hands out the live connection a dialect runs its queries on.
pub trait ConnectionProvider {
    fn connection(&mut self) -> &mut ::postgres::Client;
}

impl ConnectionProvider for ::postgres::Client {
    fn connection(&mut self) -> &mut ::postgres::Client {
        self
    }
}

/// Catalog-specific metadata access.
pub trait MetaDataDialect: Send + Sync {
    /// Short dialect name, as used in configuration.
    fn name(&self) -> &'static str;

    /// Fold an identifier the way this catalog stores it.
    fn case_for_search(&self, identifier: Option<&str>) -> Option<String>;

    /// Render the primary-key strategy query for an already-normalized locator.
    fn suggested_primary_key_strategy_query(&self, locator: &TableLocator) -> CatalogQuery;

    /// Converter used to translate driver failures.
    fn sql_exception_converter(&self) -> SharedSqlExceptionConverter;

    /// Suggest a primary-key strategy for every primary-key column in scope.
    ///
    /// Identifiers are normalized with [`Self::case_for_search`] first. The
    /// returned iterator fetches and converts rows on demand.
    fn get_suggested_primary_key_strategy<'c>(
        &self,
        connection: &'c mut dyn ConnectionProvider,
        locator: &TableLocator,
    ) -> Result<SuggestedPrimaryKeyStrategies<'c>, MetaDataAccessError>;
}
