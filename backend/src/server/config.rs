//! HTTP server configuration object and helpers.

use actix_web::cookie::{Key, SameSite};
use std::net::SocketAddr;

use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) admin_username: String,
    pub(crate) gemini_keys: Vec<String>,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            admin_username: "admin".to_owned(),
            gemini_keys: Vec::new(),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When absent, the server falls back to the in-memory adapters and
    /// state is lost on restart.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Username granted the admin session flag at login.
    #[must_use]
    pub fn with_admin_username(mut self, username: impl Into<String>) -> Self {
        self.admin_username = username.into();
        self
    }

    /// Gemini API keys for the itinerary generator, rotated on quota
    /// exhaustion. An empty list leaves the planner unconfigured.
    #[must_use]
    pub fn with_gemini_keys(mut self, keys: Vec<String>) -> Self {
        self.gemini_keys = keys;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
