//! Embedded PostgreSQL for the Diesel adapter suites.
//!
//! Each context gets a fresh temporary database on the process-wide shared
//! cluster, migrated with the same embedded migrations the server runs at
//! startup. Seeding and row counting go through a plain `postgres` client so
//! they never share a transaction with the adapter under test.
//!
//! Set `SKIP_TEST_CLUSTER=1` where the cluster cannot start; setup failures
//! then skip the test instead of failing it.

use pg_embedded_setup_unpriv::TemporaryDatabase;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use postgres::types::ToSql;
use postgres::{Client, NoTls};
use recipe_backend::domain::UserId;
use recipe_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use tokio::runtime::Runtime;

/// True when `SKIP_TEST_CLUSTER` is "1", "true" or "yes" (any case).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when skipping is allowed, otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// `postgres::Error`'s `Display` hides the server message, so prefer it.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    match error.as_db_error() {
        Some(db_error) => format!(
            "postgres error {:?}: {}",
            db_error.code(),
            db_error.message()
        ),
        None => error.to_string(),
    }
}

/// A migrated temporary database with a pool and a runtime to drive it.
pub struct Database {
    pub runtime: Runtime,
    pub pool: DbPool,
    pub url: String,
    _database: TemporaryDatabase,
}

pub fn provision() -> Result<Database, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster_handle().map_err(|err| err.to_string())?;
    let name = format!("test_{}", uuid::Uuid::new_v4().simple());
    let database = cluster
        .temporary_database(name.as_str())
        .map_err(|err| format!("create temporary database: {err:?}"))?;
    let url = database.url().to_owned();

    runtime
        .block_on(run_migrations(&url))
        .map_err(|err| err.to_string())?;
    let config = PoolConfig::new(url.as_str())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(Database {
        runtime,
        pool,
        url,
        _database: database,
    })
}

impl Database {
    fn client(&self) -> Client {
        match Client::connect(&self.url, NoTls) {
            Ok(client) => client,
            Err(err) => panic!("connect seeding client: {}", format_postgres_error(&err)),
        }
    }

    /// Insert a login account and return its id.
    pub fn seed_user(&self, email: &str, password_hash: &str) -> UserId {
        let id = UserId::random();
        self.client()
            .execute(
                "INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3)",
                &[id.as_uuid(), &email, &password_hash],
            )
            .map_err(|err| format_postgres_error(&err))
            .expect("seed user");
        id
    }

    pub fn batch_execute(&self, sql: &str) {
        self.client()
            .batch_execute(sql)
            .map_err(|err| format_postgres_error(&err))
            .expect("execute statement");
    }

    /// First column of a single-row `COUNT(*)` query.
    pub fn count(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> i64 {
        self.client()
            .query_one(sql, params)
            .map_err(|err| format_postgres_error(&err))
            .expect("count rows")
            .get(0)
    }
}
