//! Upstream session custody
//!
//! The [`SessionStore`] is the only shared mutable state in the service. It
//! holds at most one [`Session`], replaced as a whole by the authenticator and
//! read as a cloned snapshot by every fetch.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::RwLock;

/// Name of the access token cookie
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
/// Name of the refresh token cookie
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";
/// Name of the anti-forgery token cookie
pub const CSRF_TOKEN_COOKIE: &str = "csrfToken";
/// Header carrying the anti-forgery token on upstream reads
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Tokens proving the service's identity to upstream
///
/// All three tokens are required fields, so a value of this type is always a
/// complete session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Access token cookie value
    pub access_token: String,
    /// Refresh token cookie value
    pub refresh_token: String,
    /// Anti-forgery token, sent both as cookie and as `X-CSRF-Token`
    pub csrf_token: String,
    /// When the login that produced these tokens completed
    pub acquired_at: DateTime<Utc>,
}

impl Session {
    /// Create a session stamped with the current time
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        csrf_token: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            csrf_token: csrf_token.into(),
            acquired_at: Utc::now(),
        }
    }

    /// Time elapsed since the session was acquired
    ///
    /// A timestamp in the future (clock adjustment) counts as zero age.
    pub fn age(&self) -> Duration {
        (Utc::now() - self.acquired_at).to_std().unwrap_or_default()
    }

    /// Whether the session is older than `ttl` and must be renewed before use
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }

    /// Value for the `Cookie` request header
    pub fn cookie_header(&self) -> String {
        format!(
            "{}={}; {}={}; {}={}",
            ACCESS_TOKEN_COOKIE,
            self.access_token,
            REFRESH_TOKEN_COOKIE,
            self.refresh_token,
            CSRF_TOKEN_COOKIE,
            self.csrf_token
        )
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("csrf_token", &"<redacted>")
            .field("acquired_at", &self.acquired_at)
            .finish()
    }
}

/// Guarded holder of the current upstream session
///
/// Many readers, one atomic writer. Writes replace the whole session, so a
/// reader sees either the previous session or the new one, never a mix.
#[derive(Debug, Default)]
pub struct SessionStore {
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current session, if any
    pub async fn read(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    /// Replace the current session
    pub async fn write(&self, session: Session) {
        let mut guard = self.current.write().await;
        *guard = Some(session);
    }

    /// Current session if one exists and is younger than `ttl`
    pub async fn fresh(&self, ttl: Duration) -> Option<Session> {
        self.read().await.filter(|session| !session.is_stale(ttl))
    }
}
