//! Server settings loaded via OrthoConfig and the resolved server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use recipe_backend::domain::DEFAULT_MAX_IMAGE_BYTES;
use recipe_backend::inbound::http::session_config::SessionSettings;
use recipe_backend::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 8080);
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MEDIA_ROOT: &str = "./media";
const DEFAULT_MEDIA_URL: &str = "/media";

/// Settings layered from CLI flags, `RECIPES_*` environment variables, and
/// configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECIPES")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection string. Without it the process keeps data in memory.
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    /// Directory holding uploaded images.
    pub media_root: Option<PathBuf>,
    /// Public URL prefix under which `media_root` is served.
    pub media_url: Option<String>,
    pub max_image_bytes: Option<usize>,
    /// Account registered in the in-memory store at startup.
    pub demo_user_email: Option<String>,
    pub demo_user_password: Option<String>,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn media_root(&self) -> PathBuf {
        self.media_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT))
    }

    pub fn media_url(&self) -> &str {
        self.media_url.as_deref().unwrap_or(DEFAULT_MEDIA_URL)
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes.unwrap_or(DEFAULT_MAX_IMAGE_BYTES)
    }

    /// Return the demo credentials when both halves are configured.
    pub fn demo_user(&self) -> Option<(&str, &str)> {
        self.demo_user_email
            .as_deref()
            .zip(self.demo_user_password.as_deref())
    }
}

/// Where recipe data lives.
pub enum Storage {
    Postgres(DbPool),
    /// Process-local store, optionally seeded with one account.
    Memory { demo_user: Option<(String, String)> },
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) storage: Storage,
    pub(crate) media_root: PathBuf,
    pub(crate) media_url: String,
    pub(crate) max_image_bytes: usize,
}

impl ServerConfig {
    /// Construct a configuration backed by the in-memory store.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, media_root: PathBuf) -> Self {
        Self {
            session,
            bind_addr,
            storage: Storage::Memory { demo_user: None },
            media_root,
            media_url: DEFAULT_MEDIA_URL.to_owned(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// Use PostgreSQL repositories backed by `pool`.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.storage = Storage::Postgres(pool);
        self
    }

    /// Seed the in-memory store with one account. Ignored with a database.
    #[must_use]
    pub fn with_demo_user(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        if let Storage::Memory { demo_user } = &mut self.storage {
            *demo_user = Some((email.into(), password.into()));
        }
        self
    }

    #[must_use]
    pub fn with_media_url(mut self, media_url: impl Into<String>) -> Self {
        self.media_url = media_url.into();
        self
    }

    #[must_use]
    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }
}
