//! Shared test helpers for live-database tests using Testcontainers.

use postgres::{Client, NoTls};
use testcontainers::{Container, ImageExt, runners::SyncRunner};
use testcontainers_modules::postgres::Postgres;

/// Tables covering the primary-key shapes the strategy query must handle.
#[allow(dead_code)]
pub const FIXTURE_DDL: &str = r#"
CREATE SCHEMA IF NOT EXISTS sales;

CREATE TABLE public.orders (
    id     SERIAL PRIMARY KEY,
    amount NUMERIC NOT NULL
);

CREATE TABLE public.customers (
    code TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE public.invoices (
    id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
    total NUMERIC
);

CREATE TABLE public.payments (
    id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
    paid_at TIMESTAMPTZ
);

CREATE TABLE public.order_lines (
    order_id INT NOT NULL,
    line_no  INT NOT NULL,
    sku      TEXT,
    PRIMARY KEY (order_id, line_no)
);

CREATE TABLE public.audit_log (
    message TEXT
);

CREATE TABLE sales.orders (
    id BIGSERIAL PRIMARY KEY
);

CREATE TABLE public."MixedCase" (
    id SERIAL PRIMARY KEY
);
"#;

/// A test database backed by a Testcontainers PostgreSQL 18.1 instance.
///
/// The container is automatically cleaned up when `TestDb` is dropped.
pub struct TestDb {
    pub client: Client,
    _container: Container<Postgres>,
}

#[allow(dead_code)]
impl TestDb {
    /// Start a fresh PostgreSQL 18.1 container and connect to it.
    pub fn new() -> Self {
        init_tracing();

        let container = Postgres::default()
            .with_tag("18.1-alpine")
            .start()
            .expect("Failed to start PostgreSQL 18.1 container");

        let port = container
            .get_host_port_ipv4(5432)
            .expect("Failed to get mapped port");

        let connection_string = format!(
            "host=127.0.0.1 port={} user=postgres password=postgres dbname=postgres",
            port
        );

        let client =
            Client::connect(&connection_string, NoTls).expect("Failed to connect to test database");

        TestDb {
            client,
            _container: container,
        }
    }

    /// Start a fresh container with the fixture tables pre-created.
    pub fn with_fixtures() -> Self {
        let mut db = Self::new();
        db.client
            .batch_execute(FIXTURE_DDL)
            .expect("Failed to create fixture tables");
        db
    }

    /// Execute a SQL statement.
    pub fn execute(&mut self, sql: &str) {
        self.client
            .batch_execute(sql)
            .unwrap_or_else(|e| panic!("SQL execution failed: {}\nSQL: {}", e, sql));
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
