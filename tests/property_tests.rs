//! Property-based tests using proptest.
//!
//! Tests the key invariants of the system:
//! - Identifier normalization is total and idempotent
//! - Filter clauses follow the locator exactly, with bound parameters only
//! - Any resolved sequence yields `identity`, never `sequence`
//! - Rows without a sequence yield no strategy

use pg_reveng::dialect::postgres::primary_key_strategy_query;
use pg_reveng::strategy::convert_row;
use pg_reveng::{
    IdentifierCase, IdentityGeneration, MetaDataDialect, PostgresMetaDataDialect,
    PrimaryKeyStrategy, RawCatalogRow, TableLocator,
};
use proptest::prelude::*;

const FILTER_START: &str = "con.contype = 'p'";

fn arb_case() -> impl Strategy<Value = IdentifierCase> {
    prop_oneof![
        Just(IdentifierCase::Lower),
        Just(IdentifierCase::Upper),
        Just(IdentifierCase::Preserve),
    ]
}

fn arb_identity() -> impl Strategy<Value = IdentityGeneration> {
    prop_oneof![
        Just(IdentityGeneration::None),
        Just(IdentityGeneration::Always),
        Just(IdentityGeneration::ByDefault),
    ]
}

fn arb_row(seq: impl Strategy<Value = Option<String>>) -> impl Strategy<Value = RawCatalogRow> {
    (
        "[a-z_][a-z0-9_]{0,20}",
        "[a-zA-Z_][a-zA-Z0-9_ ]{0,20}",
        "[a-z_][a-z0-9_]{0,10}",
        arb_identity(),
        seq,
    )
        .prop_map(|(namespace, relation, attribute, identity, sequence_name)| RawCatalogRow {
            constraint_name: format!("{relation}_pkey"),
            namespace,
            relation,
            attribute,
            identity,
            sequence_name,
        })
}

fn filter_clause(sql: &str) -> &str {
    let idx = sql.find(FILTER_START).unwrap() + FILTER_START.len();
    &sql[idx..]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // ── Normalization ──────────────────────────────────────────────

    #[test]
    fn prop_normalize_idempotent(case in arb_case(), id in proptest::option::of(".*")) {
        let once = case.normalize(id.as_deref());
        let twice = case.normalize(once.as_deref());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_normalize_preserves_absence(case in arb_case(), id in proptest::option::of(".*")) {
        prop_assert_eq!(case.normalize(id.as_deref()).is_some(), id.is_some());
    }

    #[test]
    fn prop_postgres_folds_to_lower(id in "[A-Za-z0-9_]{1,40}") {
        let dialect = PostgresMetaDataDialect::new();
        prop_assert_eq!(dialect.case_for_search(Some(id.as_str())), Some(id.to_ascii_lowercase()));
    }

    // ── Query filters ──────────────────────────────────────────────

    #[test]
    fn prop_filter_follows_locator(
        catalog in proptest::option::of(".*"),
        schema in proptest::option::of(".*"),
        table in proptest::option::of(".*"),
    ) {
        let locator = TableLocator {
            catalog,
            schema: schema.clone(),
            table: table.clone(),
        };
        let query = primary_key_strategy_query(&locator);
        let filter = filter_clause(&query.sql);

        let expected = match (&schema, &table) {
            (Some(_), Some(_)) => " AND nsp.nspname = $1 AND cls.relname = $2",
            (Some(_), None) => " AND nsp.nspname = $1",
            (None, Some(_)) => " AND cls.relname = $1",
            (None, None) => "",
        };
        prop_assert_eq!(filter, expected);

        let expected_params: Vec<String> = schema.into_iter().chain(table).collect();
        prop_assert_eq!(&query.params, &expected_params);

        // The catalog never takes part in the statement.
        let without_catalog = TableLocator { catalog: None, ..locator };
        prop_assert_eq!(query, primary_key_strategy_query(&without_catalog));
    }

    // ── Row conversion ─────────────────────────────────────────────

    #[test]
    fn prop_sequence_always_identity(row in arb_row("[a-z_.]{1,30}".prop_map(Some))) {
        let relation = row.relation.clone();
        let namespace = row.namespace.clone();
        let decision = convert_row(row);

        prop_assert_eq!(decision.strategy, Some(PrimaryKeyStrategy::Identity));
        prop_assert_ne!(decision.strategy, Some(PrimaryKeyStrategy::Sequence));
        prop_assert_eq!(decision.table_name, relation);
        prop_assert_eq!(decision.table_schema, namespace);
        prop_assert_eq!(decision.table_catalog, None);
    }

    #[test]
    fn prop_no_sequence_no_strategy(
        row in arb_row(prop_oneof![Just(None), Just(Some(String::new()))])
    ) {
        let decision = convert_row(row);
        prop_assert_eq!(decision.strategy, None);
        prop_assert_eq!(decision.table_catalog, None);
    }
}
