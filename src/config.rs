//! Configuration types for student-report

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    net::{IpAddr, SocketAddr},
    time::Duration,
};
use url::Url;

/// Main configuration for the report service
///
/// Every field has a default, so an empty environment yields a runnable
/// configuration pointing at a local upstream.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP surface settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Upstream school management API settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Administrative login used for every upstream session
    #[serde(default)]
    pub admin: AdminPrincipal,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 0.0.0.0:5008)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Upstream API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API, without trailing slash
    /// (default: "http://localhost:5007/api/v1")
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Timeout applied to every login and fetch request (default: 10s)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Age after which a session is renewed before use (default: 14 minutes)
    ///
    /// Upstream access tokens live for 15 minutes; renewing one minute early
    /// keeps requests from racing the expiry.
    #[serde(default = "default_session_ttl", with = "duration_serde")]
    pub session_ttl: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout: default_request_timeout(),
            session_ttl: default_session_ttl(),
        }
    }
}

impl UpstreamConfig {
    /// Login endpoint: `{backend_url}/auth/login`
    pub fn login_url(&self) -> String {
        format!("{}/auth/login", self.base())
    }

    /// Record endpoint: `{backend_url}/students/{id}`
    pub fn student_url(&self, id: u64) -> String {
        format!("{}/students/{}", self.base(), id)
    }

    fn base(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }
}

/// Administrative credentials presented to the upstream login endpoint
#[derive(Clone, Serialize, Deserialize)]
pub struct AdminPrincipal {
    /// Login email (sent as `username`)
    #[serde(default = "default_admin_email")]
    pub email: String,

    /// Login password
    #[serde(default = "default_admin_password")]
    pub password: String,
}

impl Default for AdminPrincipal {
    fn default() -> Self {
        Self {
            email: default_admin_email(),
            password: default_admin_password(),
        }
    }
}

impl fmt::Debug for AdminPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminPrincipal")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory is loaded first when present.
    /// Unset or empty variables fall back to their defaults.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `BIND_HOST` | `0.0.0.0` |
    /// | `PORT` | `5008` |
    /// | `BACKEND_URL` | `http://localhost:5007/api/v1` |
    /// | `ADMIN_EMAIL` | `admin@school-admin.com` |
    /// | `ADMIN_PASSWORD` | built-in development password |
    /// | `UPSTREAM_TIMEOUT_SECS` | `10` |
    /// | `SESSION_TTL_SECS` | `840` |
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let defaults = Config::default();

        let host: IpAddr = match get("BIND_HOST") {
            Some(raw) => parse_var("BIND_HOST", &raw)?,
            None => defaults.api.bind_address.ip(),
        };
        let port: u16 = match get("PORT") {
            Some(raw) => parse_var("PORT", &raw)?,
            None => defaults.api.bind_address.port(),
        };
        let request_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_var("UPSTREAM_TIMEOUT_SECS", &raw)?),
            None => defaults.upstream.request_timeout,
        };
        let session_ttl = match get("SESSION_TTL_SECS") {
            Some(raw) => Duration::from_secs(parse_var("SESSION_TTL_SECS", &raw)?),
            None => defaults.upstream.session_ttl,
        };

        let config = Config {
            api: ApiConfig {
                bind_address: SocketAddr::new(host, port),
            },
            upstream: UpstreamConfig {
                backend_url: get("BACKEND_URL").unwrap_or(defaults.upstream.backend_url),
                request_timeout,
                session_ttl,
            },
            admin: AdminPrincipal {
                email: get("ADMIN_EMAIL").unwrap_or(defaults.admin.email),
                password: get("ADMIN_PASSWORD").unwrap_or(defaults.admin.password),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot work
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.upstream.backend_url).map_err(|e| Error::Config {
            message: format!("invalid backend URL '{}': {}", self.upstream.backend_url, e),
            key: Some("BACKEND_URL".into()),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("backend URL must be http or https, got '{}'", url.scheme()),
                key: Some("BACKEND_URL".into()),
            });
        }
        if self.upstream.request_timeout.is_zero() {
            return Err(Error::Config {
                message: "upstream timeout must be greater than zero".into(),
                key: Some("UPSTREAM_TIMEOUT_SECS".into()),
            });
        }
        Ok(())
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.parse().map_err(|e| Error::Config {
        message: format!("invalid value '{raw}': {e}"),
        key: Some(key.to_string()),
    })
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5008))
}

fn default_backend_url() -> String {
    "http://localhost:5007/api/v1".into()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_session_ttl() -> Duration {
    Duration::from_secs(14 * 60)
}

fn default_admin_email() -> String {
    "admin@school-admin.com".into()
}

fn default_admin_password() -> String {
    "3OU4zn3q6Zh9".into()
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
