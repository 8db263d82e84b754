//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`reports`] - Student report download
//! - [`system`] - Health and OpenAPI

mod reports;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use reports::*;
pub use system::*;
