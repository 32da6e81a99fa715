//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use survey_backend::outbound::persistence::DbPool;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) app_name: String,
    pub(crate) jwt_secret: String,
    pub(crate) jwt_audience: String,
    pub(crate) debug: bool,
    pub(crate) request_timeout: Duration,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration with the in-memory store.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        app_name: impl Into<String>,
        jwt_secret: impl Into<String>,
        jwt_audience: impl Into<String>,
    ) -> Self {
        Self {
            bind_addr,
            app_name: app_name.into(),
            jwt_secret: jwt_secret.into(),
            jwt_audience: jwt_audience.into(),
            debug: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            db_pool: None,
        }
    }

    /// Attach a database connection pool.
    ///
    /// When provided, every repository is backed by PostgreSQL instead of the
    /// in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Bound every request by `timeout`.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Serve Swagger UI and advertise it from `/info`.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
