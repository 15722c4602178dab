//! PostgreSQL catalog dialect.
//!
//! Primary-key columns are found by joining `pg_namespace`, `pg_class`,
//! `pg_constraint` and `pg_attribute`; the sequence feeding each column is
//! resolved with `pg_get_serial_sequence`, which covers both `serial`
//! columns and identity columns.

use std::sync::Arc;

use crate::cursor::ResultSetIterator;
use crate::dialect::{
    CatalogQuery, ConnectionProvider, IdentifierCase, MetaDataDialect,
    SuggestedPrimaryKeyStrategies, TableLocator,
};
use crate::error::{
    DefaultSqlExceptionConverter, MetaDataAccessError, SUGGESTED_STRATEGY_FAILURE,
    SharedSqlExceptionConverter,
};
use crate::strategy::{RawCatalogRow, convert_row};

const PRIMARY_KEY_STRATEGY_SQL: &str = "SELECT nsp.nspname, \
     cls.relname, \
     att.attname, \
     att.attidentity::text AS attidentity, \
     con.conname, \
     pg_catalog.pg_get_serial_sequence(\
pg_catalog.quote_ident(nsp.nspname) || '.' || pg_catalog.quote_ident(cls.relname), \
att.attname) AS seqname \
     FROM pg_catalog.pg_namespace nsp, \
     pg_catalog.pg_class cls, \
     pg_catalog.pg_constraint con, \
     pg_catalog.pg_attribute att \
     WHERE cls.relnamespace = nsp.oid \
     AND con.conrelid = cls.oid \
     AND att.attrelid = cls.oid \
     AND att.attnum = ANY(con.conkey) \
     AND con.contype = 'p'";

/// Metadata dialect for PostgreSQL catalogs.
#[derive(Clone)]
pub struct PostgresMetaDataDialect {
    identifier_case: IdentifierCase,
    converter: SharedSqlExceptionConverter,
    trace_rows: bool,
}

impl Default for PostgresMetaDataDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PostgresMetaDataDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresMetaDataDialect")
            .field("identifier_case", &self.identifier_case)
            .field("trace_rows", &self.trace_rows)
            .finish_non_exhaustive()
    }
}

impl PostgresMetaDataDialect {
    pub fn new() -> Self {
        Self {
            identifier_case: IdentifierCase::Lower,
            converter: Arc::new(DefaultSqlExceptionConverter),
            trace_rows: true,
        }
    }

    pub fn with_identifier_case(mut self, identifier_case: IdentifierCase) -> Self {
        self.identifier_case = identifier_case;
        self
    }

    pub fn with_sql_exception_converter(mut self, converter: SharedSqlExceptionConverter) -> Self {
        self.converter = converter;
        self
    }

    pub fn with_row_tracing(mut self, trace_rows: bool) -> Self {
        self.trace_rows = trace_rows;
        self
    }

    /// Normalize every component of `locator` with this dialect's folding.
    pub fn normalize_locator(&self, locator: &TableLocator) -> TableLocator {
        TableLocator {
            catalog: self.case_for_search(locator.catalog.as_deref()),
            schema: self.case_for_search(locator.schema.as_deref()),
            table: self.case_for_search(locator.table.as_deref()),
        }
    }
}

/// Render the primary-key strategy query for `locator`.
///
/// Schema and table become `$n` parameters; the catalog is not a filter in
/// this dialect.
pub fn primary_key_strategy_query(locator: &TableLocator) -> CatalogQuery {
    let mut sql = String::from(PRIMARY_KEY_STRATEGY_SQL);
    let mut params = Vec::new();

    if let Some(schema) = &locator.schema {
        params.push(schema.clone());
        sql.push_str(&format!(" AND nsp.nspname = ${}", params.len()));
    }
    if let Some(table) = &locator.table {
        params.push(table.clone());
        sql.push_str(&format!(" AND cls.relname = ${}", params.len()));
    }

    CatalogQuery { sql, params }
}

impl MetaDataDialect for PostgresMetaDataDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn case_for_search(&self, identifier: Option<&str>) -> Option<String> {
        self.identifier_case.normalize(identifier)
    }

    fn suggested_primary_key_strategy_query(&self, locator: &TableLocator) -> CatalogQuery {
        primary_key_strategy_query(locator)
    }

    fn sql_exception_converter(&self) -> SharedSqlExceptionConverter {
        Arc::clone(&self.converter)
    }

    fn get_suggested_primary_key_strategy<'c>(
        &self,
        connection: &'c mut dyn ConnectionProvider,
        locator: &TableLocator,
    ) -> Result<SuggestedPrimaryKeyStrategies<'c>, MetaDataAccessError> {
        let locator = self.normalize_locator(locator);
        tracing::debug!(%locator, "get_suggested_primary_key_strategy");

        let query = self.suggested_primary_key_strategy_query(&locator);
        tracing::debug!(
            sql = %query.sql,
            params = ?query.params,
            "querying for primary-key sequences"
        );

        let converter = self.sql_exception_converter();
        let rows = connection
            .connection()
            .query_raw(query.sql.as_str(), query.params.iter())
            .map_err(|e| {
                tracing::warn!(error = %e, "primary-key strategy query failed");
                converter.convert(
                    Box::new(e),
                    SUGGESTED_STRATEGY_FAILURE,
                    Some(query.sql.as_str()),
                )
            })?;

        let trace_rows = self.trace_rows;
        Ok(ResultSetIterator::new(
            rows,
            move |row: &::postgres::Row| {
                let raw = RawCatalogRow::from_row(row)?;
                if trace_rows {
                    tracing::trace!(row = %raw, "primary-key strategy row");
                }
                Ok(convert_row(raw))
            },
            move |e: ::postgres::Error| {
                tracing::warn!(error = %e, "fetching primary-key strategy rows failed");
                converter.convert(Box::new(e), SUGGESTED_STRATEGY_FAILURE, None)
            },
        ))
    }
}
