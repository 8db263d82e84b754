//! Upstream login exchange
//!
//! The [`Authenticator`] relays the administrative credentials to the upstream
//! login endpoint and stores the session cookies it hands back. It holds no
//! token verification logic of its own; authorization is decided upstream.
//!
//! The same [`Authenticator::authenticate`] call is used at startup, where the
//! caller treats failure as fatal, and mid-request, where failure only fails
//! the request being served.

use crate::config::{AdminPrincipal, UpstreamConfig};
use crate::error::{AuthError, Error, Result};
use crate::session::{
    ACCESS_TOKEN_COOKIE, CSRF_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, Session, SessionStore,
};
use crate::types::{LoginRequest, LoginResponse};
use reqwest::StatusCode;
use std::sync::Arc;

/// Performs the upstream login and custodies the resulting session
pub struct Authenticator {
    client: reqwest::Client,
    login_url: String,
    principal: AdminPrincipal,
    store: Arc<SessionStore>,
}

impl Authenticator {
    /// Create an authenticator writing into `store`
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(
        upstream: &UpstreamConfig,
        principal: AdminPrincipal,
        store: Arc<SessionStore>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(upstream.request_timeout)
            .user_agent(concat!("student-report/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to create HTTP client: {e}"),
                key: None,
            })?;

        Ok(Self {
            client,
            login_url: upstream.login_url(),
            principal,
            store,
        })
    }

    /// The store this authenticator writes to
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Log in to upstream and replace the stored session
    ///
    /// The store is only written after every token has been extracted, so a
    /// failed login leaves the previous session in place.
    ///
    /// # Errors
    /// - [`AuthError::Rejected`] if upstream answers with anything but 200
    /// - [`AuthError::MissingToken`] if a session cookie is absent
    /// - [`AuthError::Timeout`] / [`AuthError::Unreachable`] on transport failure
    pub async fn authenticate(&self) -> std::result::Result<Session, AuthError> {
        tracing::debug!(url = %self.login_url, email = %self.principal.email, "logging in to upstream");

        let response = self
            .client
            .post(&self.login_url)
            .json(&LoginRequest {
                username: &self.principal.email,
                password: &self.principal.password,
            })
            .send()
            .await
            .map_err(AuthError::from_transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "upstream rejected login");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let mut access_token = None;
        let mut refresh_token = None;
        let mut csrf_token = None;
        for cookie in response.cookies() {
            match cookie.name() {
                ACCESS_TOKEN_COOKIE => access_token = Some(cookie.value().to_string()),
                REFRESH_TOKEN_COOKIE => refresh_token = Some(cookie.value().to_string()),
                CSRF_TOKEN_COOKIE => csrf_token = Some(cookie.value().to_string()),
                _ => {}
            }
        }

        let body = response.bytes().await.map_err(AuthError::from_transport)?;
        let login: Option<LoginResponse> = match serde_json::from_slice(&body) {
            Ok(login) => Some(login),
            Err(e) => {
                tracing::warn!(error = %e, "could not decode login response body");
                None
            }
        };

        let session = Session::new(
            access_token.ok_or(AuthError::MissingToken {
                name: ACCESS_TOKEN_COOKIE,
            })?,
            refresh_token.ok_or(AuthError::MissingToken {
                name: REFRESH_TOKEN_COOKIE,
            })?,
            csrf_token.ok_or(AuthError::MissingToken {
                name: CSRF_TOKEN_COOKIE,
            })?,
        );

        self.store.write(session.clone()).await;

        match login {
            Some(login) => tracing::info!(
                user = %login.user.name,
                role = %login.user.role,
                "authenticated with upstream"
            ),
            None => tracing::info!("authenticated with upstream"),
        }

        Ok(session)
    }
}
