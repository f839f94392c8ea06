//! Shared PostgreSQL connections for the Diesel repositories.
//!
//! Every repository holds a clone of [`DbPool`]; a clone is a reference to
//! the same bb8 pool, so one pool serves the whole process.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

const DEFAULT_MAX_SIZE: u32 = 10;
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);

/// Raised while opening the pool or borrowing a connection from it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("no database connection available: {message}")]
    Checkout { message: String },
    #[error("database pool could not be opened: {message}")]
    Build { message: String },
}

impl PoolError {
    pub fn checkout(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Checkout { message }
    }

    pub fn build(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Build { message }
    }

    /// Underlying driver message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Checkout { message } | Self::Build { message } => message,
        }
    }
}

/// Connection string and sizing for [`DbPool::new`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    url: String,
    max_size: u32,
    min_idle: Option<u32>,
    checkout_timeout: Duration,
}

impl PoolConfig {
    /// Ten connections, one kept warm, thirty seconds to wait for a checkout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_size: DEFAULT_MAX_SIZE,
            min_idle: Some(1),
            checkout_timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    pub fn with_max_size(self, max_size: u32) -> Self {
        Self { max_size, ..self }
    }

    pub fn with_min_idle(self, min_idle: Option<u32>) -> Self {
        Self { min_idle, ..self }
    }

    pub fn with_checkout_timeout(self, checkout_timeout: Duration) -> Self {
        Self {
            checkout_timeout,
            ..self
        }
    }

    pub fn database_url(&self) -> &str {
        &self.url
    }
}

#[derive(Clone)]
pub struct DbPool {
    pool: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Open the pool. Warm connections are established before this returns,
    /// so a bad URL fails here rather than on the first request.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let PoolConfig {
            url,
            max_size,
            min_idle,
            checkout_timeout,
        } = config;
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(url);
        let pool = Pool::builder()
            .max_size(max_size)
            .min_idle(min_idle)
            .connection_timeout(checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        Ok(Self { pool })
    }

    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        match self.pool.get().await {
            Ok(conn) => Ok(conn),
            Err(err) => Err(PoolError::checkout(err.to_string())),
        }
    }
}
