//! Primary-key strategy decisions and the row → decision conversion.
//!
//! A [`RawCatalogRow`] is decoded from one fetched catalog row and consumed
//! immediately by [`convert_row`], which produces one [`StrategyDecision`]
//! per primary-key column.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Key under which the table name is published in [`StrategyDecision::to_map`].
pub const TABLE_NAME: &str = "TABLE_NAME";
/// Key under which the schema name is published.
pub const TABLE_SCHEM: &str = "TABLE_SCHEM";
/// Key under which the catalog name is published.
pub const TABLE_CAT: &str = "TABLE_CAT";
/// Key under which the strategy token is published.
pub const STRATEGY: &str = "STRATEGY";

/// How an ORM populates a primary-key value on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryKeyStrategy {
    /// The database assigns the value on insert.
    Identity,
    /// The ORM pre-fetches the value from a sequence object.
    Sequence,
}

impl PrimaryKeyStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimaryKeyStrategy::Identity => "identity",
            PrimaryKeyStrategy::Sequence => "sequence",
        }
    }

    /// Parse a strategy token. Returns `None` for unknown tokens.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "identity" => Some(PrimaryKeyStrategy::Identity),
            "sequence" => Some(PrimaryKeyStrategy::Sequence),
            _ => None,
        }
    }
}

impl fmt::Display for PrimaryKeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value of `pg_attribute.attidentity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityGeneration {
    /// Not an identity column (empty flag).
    None,
    /// `GENERATED ALWAYS AS IDENTITY` (`a`).
    Always,
    /// `GENERATED BY DEFAULT AS IDENTITY` (`d`).
    ByDefault,
}

impl IdentityGeneration {
    /// Decode the catalog flag. Unknown values are treated as `None`.
    pub fn from_flag(flag: &str) -> Self {
        match flag {
            "a" => IdentityGeneration::Always,
            "d" => IdentityGeneration::ByDefault,
            _ => IdentityGeneration::None,
        }
    }

    pub fn as_flag(&self) -> &'static str {
        match self {
            IdentityGeneration::None => "",
            IdentityGeneration::Always => "a",
            IdentityGeneration::ByDefault => "d",
        }
    }
}

/// One primary-key column as reported by the catalog query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCatalogRow {
    pub namespace: String,
    pub relation: String,
    pub attribute: String,
    pub identity: IdentityGeneration,
    pub constraint_name: String,
    /// Sequence feeding the column, as resolved by `pg_get_serial_sequence`.
    pub sequence_name: Option<String>,
}

impl RawCatalogRow {
    /// Decode a row produced by the primary-key strategy query.
    pub fn from_row(row: &postgres::Row) -> Result<Self, postgres::Error> {
        let identity: Option<String> = row.try_get("attidentity")?;
        Ok(Self {
            namespace: row.try_get("nspname")?,
            relation: row.try_get("relname")?,
            attribute: row.try_get("attname")?,
            identity: IdentityGeneration::from_flag(identity.as_deref().unwrap_or("")),
            constraint_name: row.try_get("conname")?,
            sequence_name: row.try_get("seqname")?,
        })
    }
}

impl fmt::Display for RawCatalogRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "1: {}, 2: {}, 3: {}, 4: {}, 5: {}, 6: {}",
            self.namespace,
            self.relation,
            self.attribute,
            self.identity.as_flag(),
            self.constraint_name,
            self.sequence_name.as_deref().unwrap_or("null"),
        )
    }
}

/// Suggested key generation for one primary-key column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDecision {
    #[serde(rename = "TABLE_NAME")]
    pub table_name: String,
    #[serde(rename = "TABLE_SCHEM")]
    pub table_schema: String,
    #[serde(rename = "TABLE_CAT")]
    pub table_catalog: Option<String>,
    /// `None` means no suggestion; the caller falls back to its default.
    #[serde(rename = "STRATEGY")]
    pub strategy: Option<PrimaryKeyStrategy>,
}

impl StrategyDecision {
    /// The decision as a fixed-key string mapping.
    pub fn to_map(&self) -> BTreeMap<&'static str, Option<String>> {
        BTreeMap::from([
            (TABLE_NAME, Some(self.table_name.clone())),
            (TABLE_SCHEM, Some(self.table_schema.clone())),
            (TABLE_CAT, self.table_catalog.clone()),
            (STRATEGY, self.strategy.map(|s| s.as_str().to_string())),
        ])
    }
}

/// Decide the strategy for one catalog row.
///
/// Any resolved sequence yields [`PrimaryKeyStrategy::Identity`], whatever
/// the identity flag says. `Sequence` is never produced: the sequence's
/// increment is not surfaced to the generator yet.
pub fn convert_row(row: RawCatalogRow) -> StrategyDecision {
    let strategy = match row.sequence_name.as_deref() {
        Some(seq) if !seq.is_empty() => Some(PrimaryKeyStrategy::Identity),
        _ => None,
    };

    StrategyDecision {
        table_name: row.relation,
        table_schema: row.namespace,
        table_catalog: None,
        strategy,
    }
}
