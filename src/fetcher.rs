//! Authenticated record fetch with a single re-authentication retry
//!
//! Each call to [`StudentFetcher::fetch`] walks a bounded state machine:
//!
//! ```text
//! FirstAttempt --401--> (authenticate) --> Reauthenticated --any--> Terminal
//!      |
//!      +--------------any other status------------------------> Terminal
//! ```
//!
//! At most one re-authentication and one retried request happen per fetch, so
//! a persistently broken upstream cannot cause a retry storm. Concurrent
//! fetches that all see a stale session each log in independently.

use crate::auth::Authenticator;
use crate::config::UpstreamConfig;
use crate::error::{Error, FetchError, Result};
use crate::session::{CSRF_HEADER, Session};
use crate::types::{StudentDetail, StudentId};
use reqwest::{StatusCode, header};
use std::sync::Arc;

/// Position of a fetch in the retry state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Attempt {
    /// First request, made with the stored (or proactively renewed) session
    First,
    /// Second and final request, made after a 401 forced a new login
    Reauthenticated,
}

/// Fetches student records from upstream on behalf of the request handler
pub struct StudentFetcher {
    client: reqwest::Client,
    upstream: UpstreamConfig,
    authenticator: Arc<Authenticator>,
}

impl StudentFetcher {
    /// Create a fetcher sharing `authenticator` (and its session store)
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(upstream: UpstreamConfig, authenticator: Arc<Authenticator>) -> Result<Self> {
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
            upstream,
            authenticator,
        })
    }

    /// Fetch one student record
    ///
    /// # Errors
    /// - [`Error::Auth`] if a required login fails
    /// - [`Error::Fetch`] with [`FetchError::NotFound`] on 404 (never retried)
    /// - [`Error::Fetch`] with [`FetchError::Upstream`] on any other non-2xx,
    ///   including a second 401 after re-authentication
    /// - [`Error::Fetch`] with [`FetchError::Decode`], [`FetchError::Timeout`]
    ///   or [`FetchError::Unreachable`]
    pub async fn fetch(&self, id: StudentId) -> Result<StudentDetail> {
        let mut session = self.session_for_request().await?;
        let mut attempt = Attempt::First;

        loop {
            let response = self.send(id, &session).await?;
            let status = response.status();

            match (status, attempt) {
                (StatusCode::UNAUTHORIZED, Attempt::First) => {
                    tracing::warn!(student_id = %id, "upstream returned 401, re-authenticating and retrying once");
                    session = self.authenticator.authenticate().await?;
                    attempt = Attempt::Reauthenticated;
                }
                _ => return classify(id, attempt, response).await,
            }
        }
    }

    /// Stored session, renewed first when absent or older than the TTL
    async fn session_for_request(&self) -> Result<Session> {
        let ttl = self.upstream.session_ttl;
        match self.authenticator.store().read().await {
            Some(session) if !session.is_stale(ttl) => Ok(session),
            Some(session) => {
                tracing::info!(
                    age_secs = session.age().as_secs(),
                    ttl_secs = ttl.as_secs(),
                    "session might be expired, refreshing"
                );
                Ok(self.authenticator.authenticate().await?)
            }
            None => {
                tracing::info!("no upstream session, authenticating");
                Ok(self.authenticator.authenticate().await?)
            }
        }
    }

    async fn send(&self, id: StudentId, session: &Session) -> Result<reqwest::Response> {
        let url = self.upstream.student_url(id.get());
        tracing::debug!(url = %url, "fetching student record");

        self.client
            .get(&url)
            .header(header::COOKIE, session.cookie_header())
            .header(CSRF_HEADER, session.csrf_token.as_str())
            .send()
            .await
            .map_err(|e| {
                let error = FetchError::from_transport(e);
                tracing::error!(student_id = %id, error = %error, "upstream request failed");
                Error::Fetch(error)
            })
    }
}

/// Turn a final upstream response into a record or a terminal error
async fn classify(
    id: StudentId,
    attempt: Attempt,
    response: reqwest::Response,
) -> Result<StudentDetail> {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        tracing::info!(student_id = %id, "student not found upstream");
        return Err(FetchError::NotFound { id: id.get() }.into());
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(
            student_id = %id,
            status = status.as_u16(),
            body = %body,
            after_reauth = attempt == Attempt::Reauthenticated,
            "upstream returned non-success status"
        );
        return Err(FetchError::Upstream {
            status: status.as_u16(),
            body,
        }
        .into());
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::Fetch(FetchError::from_transport(e)))?;

    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::error!(student_id = %id, error = %e, "failed to decode student record");
        FetchError::Decode(e.to_string()).into()
    })
}
