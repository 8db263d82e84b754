//! Application state for the API server

use crate::Config;
use crate::fetcher::StudentFetcher;
use crate::report::ReportRenderer;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned per request; every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Authenticated upstream record fetcher
    pub fetcher: Arc<StudentFetcher>,

    /// Document renderer
    pub renderer: Arc<dyn ReportRenderer>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(
        fetcher: Arc<StudentFetcher>,
        renderer: Arc<dyn ReportRenderer>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            fetcher,
            renderer,
            config,
        }
    }
}
