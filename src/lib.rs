//! pg_reveng — primary-key strategy introspection for PostgreSQL.
//!
//! Given a table locator, the crate asks the live system catalog which
//! primary-key columns the table has and whether a sequence feeds them, and
//! turns each column into a [`StrategyDecision`] an ORM code generator can
//! act on.
//!
//! ```no_run
//! use pg_reveng::{MetaDataConfig, TableLocator};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = postgres::Client::connect("host=localhost user=postgres", postgres::NoTls)?;
//! let dialect = MetaDataConfig::default().build_dialect();
//!
//! let locator = TableLocator::table("public", "orders");
//! for decision in dialect.get_suggested_primary_key_strategy(&mut client, &locator)? {
//!     let decision = decision?;
//!     println!("{}.{} -> {:?}", decision.table_schema, decision.table_name, decision.strategy);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Known limitation
//! A column fed by any sequence is reported as `identity`, never
//! `sequence`, because the sequence's increment is not surfaced to the
//! generator configuration.

pub mod config;
pub mod cursor;
pub mod dialect;
pub mod error;
pub mod strategy;

pub use config::MetaDataConfig;
pub use cursor::ResultSetIterator;
pub use dialect::{
    CatalogQuery, ConnectionProvider, DialectKind, IdentifierCase, MetaDataDialect,
    PostgresMetaDataDialect, SuggestedPrimaryKeyStrategies, TableLocator,
};
pub use error::{
    ConfigError, DefaultSqlExceptionConverter, MetaDataAccessError, SqlExceptionConverter,
};
pub use strategy::{IdentityGeneration, PrimaryKeyStrategy, RawCatalogRow, StrategyDecision};
