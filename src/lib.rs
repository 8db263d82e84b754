//! # student-report
//!
//! HTTP service that turns student records held by a school management API
//! into downloadable PDF reports.
//!
//! The service logs in to the upstream API with a fixed administrative
//! identity, keeps the resulting session fresh, and on each request fetches
//! one record, renders it, and streams the document back.
//!
//! ## Quick Start
//!
//! ```no_run
//! use student_report::{Config, ReportService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let service = ReportService::new(config)?;
//!
//!     // Startup login; failure here should stop the process
//!     service.authenticate().await?;
//!
//!     // Serve until SIGINT/SIGTERM
//!     service.serve().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Upstream login exchange
pub mod auth;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Authenticated record fetch
pub mod fetcher;
/// PDF report rendering
pub mod report;
/// Upstream session custody
pub mod session;
/// Core types
pub mod types;

pub use api::AppState;
pub use auth::Authenticator;
pub use config::Config;
pub use error::{AuthError, Error, FetchError, Result, ToHttpStatus};
pub use fetcher::StudentFetcher;
pub use report::{PdfReportRenderer, ReportRenderer};
pub use session::{Session, SessionStore};
pub use types::{StudentDetail, StudentId};

use std::sync::Arc;

/// Wired-up service: configuration, session custody, fetcher and renderer
pub struct ReportService {
    config: Arc<Config>,
    authenticator: Arc<Authenticator>,
    fetcher: Arc<StudentFetcher>,
    renderer: Arc<dyn ReportRenderer>,
}

impl ReportService {
    /// Build the service with the PDF renderer
    ///
    /// No network traffic happens until [`authenticate`](Self::authenticate)
    /// or the first request.
    ///
    /// # Errors
    /// Returns error if an HTTP client cannot be created
    pub fn new(config: Config) -> Result<Self> {
        Self::with_renderer(config, Arc::new(PdfReportRenderer))
    }

    /// Build the service with a custom renderer
    ///
    /// # Errors
    /// Returns error if an HTTP client cannot be created
    pub fn with_renderer(config: Config, renderer: Arc<dyn ReportRenderer>) -> Result<Self> {
        let store = Arc::new(SessionStore::new());
        let authenticator = Arc::new(Authenticator::new(
            &config.upstream,
            config.admin.clone(),
            store,
        )?);
        let fetcher = Arc::new(StudentFetcher::new(
            config.upstream.clone(),
            authenticator.clone(),
        )?);

        Ok(Self {
            config: Arc::new(config),
            authenticator,
            fetcher,
            renderer,
        })
    }

    /// Perform the startup login
    ///
    /// # Errors
    /// Returns [`Error::Auth`] if upstream rejects the login or cannot be
    /// reached. Callers treat this as fatal.
    pub async fn authenticate(&self) -> Result<()> {
        self.authenticator.authenticate().await?;
        Ok(())
    }

    /// The configuration this service was built with
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Session store shared by the authenticator and fetcher
    pub fn session_store(&self) -> &Arc<SessionStore> {
        self.authenticator.store()
    }

    /// Handler state for [`api::create_router`]
    pub fn state(&self) -> AppState {
        AppState::new(
            self.fetcher.clone(),
            self.renderer.clone(),
            self.config.clone(),
        )
    }

    /// Bind the configured address and serve until SIGINT or SIGTERM
    ///
    /// # Errors
    /// Returns error if binding fails or the server stops abnormally
    pub async fn serve(&self) -> Result<()> {
        api::start_api_server(self.state(), shutdown_signal()).await
    }
}

/// Resolves on the first SIGINT or SIGTERM
///
/// A signal that cannot be registered is logged and never fires; the other
/// one still stops the server.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "could not listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => tracing::info!("received SIGINT, draining in-flight report requests"),
        () = terminate => tracing::info!("received SIGTERM, draining in-flight report requests"),
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_signal_waits_for_a_signal() {
        let result = tokio::time::timeout(Duration::from_millis(100), shutdown_signal()).await;
        assert!(result.is_err(), "shutdown fired without a signal");
    }

    #[tokio::test]
    async fn test_service_builds_without_network_traffic() {
        let service = ReportService::new(Config::default()).unwrap();
        assert!(service.session_store().read().await.is_none());
        assert_eq!(service.config().api.bind_address.port(), 5008);
    }
}
