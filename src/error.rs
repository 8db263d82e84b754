//! Error types for student-report
//!
//! This module provides the error taxonomy for the service:
//! - Startup errors (configuration, initial authentication)
//! - Upstream errors split into authentication and record-fetch failures
//! - Input validation errors raised before any network call
//! - HTTP status code mapping for the request handler

use thiserror::Error;

/// Result type alias for student-report operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for student-report
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The environment variable that caused the error (e.g., "BACKEND_URL")
        key: Option<String>,
    },

    /// Upstream login failed
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Upstream record fetch failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Malformed client input, rejected before any upstream call
    #[error("validation error: {0}")]
    Validation(String),

    /// Document rendering failed
    #[error("render error: {0}")]
    Render(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// Errors from the upstream login exchange
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login endpoint answered with something other than 200 OK
    #[error("login rejected with status {status}")]
    Rejected {
        /// HTTP status returned by the login endpoint
        status: u16,
        /// Raw response body, kept for logging only
        body: String,
    },

    /// Login succeeded but one of the session cookies was not set
    #[error("login response is missing the {name} cookie")]
    MissingToken {
        /// Name of the missing cookie
        name: &'static str,
    },

    /// Login request exceeded the configured timeout
    #[error("login timed out")]
    Timeout,

    /// Login endpoint could not be reached
    #[error("login endpoint unreachable: {0}")]
    Unreachable(String),
}

/// Errors from fetching a single student record
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream has no record for this id
    #[error("student {id} not found")]
    NotFound {
        /// The requested student id
        id: u64,
    },

    /// Upstream answered with an unexpected status
    #[error("upstream returned status {status}")]
    Upstream {
        /// HTTP status returned by upstream
        status: u16,
        /// Raw response body, kept for logging only
        body: String,
    },

    /// Response body was not a valid student record
    #[error("failed to decode student record: {0}")]
    Decode(String),

    /// Request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Upstream could not be reached
    #[error("upstream unreachable: {0}")]
    Unreachable(String),
}

impl AuthError {
    pub(crate) fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            AuthError::Timeout
        } else {
            AuthError::Unreachable(error.to_string())
        }
    }
}

impl FetchError {
    pub(crate) fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Unreachable(error.to_string())
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;

    /// Short message that is safe to show to clients
    ///
    /// Never includes upstream response bodies or internal details.
    fn public_message(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::Validation(_) => 400,

            // 404 Not Found
            Error::Fetch(FetchError::NotFound { .. }) => 404,

            // 500 Internal Server Error - everything upstream or server-side
            Error::Fetch(_) => 500,
            Error::Auth(_) => 500,
            Error::Render(_) => 500,
            Error::Config { .. } => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Auth(e) => match e {
                AuthError::Rejected { .. } => "auth_rejected",
                AuthError::MissingToken { .. } => "auth_missing_token",
                AuthError::Timeout => "auth_timeout",
                AuthError::Unreachable(_) => "auth_unreachable",
            },
            Error::Fetch(e) => match e {
                FetchError::NotFound { .. } => "student_not_found",
                FetchError::Upstream { .. } => "upstream_error",
                FetchError::Decode(_) => "decode_error",
                FetchError::Timeout => "upstream_timeout",
                FetchError::Unreachable(_) => "upstream_unreachable",
            },
            Error::Validation(_) => "validation_error",
            Error::Render(_) => "render_error",
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }

    fn public_message(&self) -> &str {
        match self {
            Error::Validation(_) => "Invalid student ID",
            Error::Fetch(FetchError::NotFound { .. }) => "Student not found",
            Error::Fetch(_) | Error::Auth(_) => "Error fetching student data",
            Error::Render(_) => "Error generating PDF",
            Error::Config { .. } | Error::Io(_) | Error::ApiServerError(_) => {
                "Internal server error"
            }
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Returns (Error, expected_status_code, expected_error_code) for every
    /// reachable match arm in ToHttpStatus.
    fn all_error_variants() -> Vec<(Error, u16, &'static str)> {
        vec![
            (
                Error::Config {
                    message: "bad url".into(),
                    key: Some("BACKEND_URL".into()),
                },
                500,
                "config_error",
            ),
            (Error::Validation("abc".into()), 400, "validation_error"),
            (Error::Render("layout".into()), 500, "render_error"),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                500,
                "io_error",
            ),
            (
                Error::ApiServerError("bind failed".into()),
                500,
                "api_server_error",
            ),
            (
                Error::Auth(AuthError::Rejected {
                    status: 401,
                    body: "bad credentials".into(),
                }),
                500,
                "auth_rejected",
            ),
            (
                Error::Auth(AuthError::MissingToken { name: "csrfToken" }),
                500,
                "auth_missing_token",
            ),
            (Error::Auth(AuthError::Timeout), 500, "auth_timeout"),
            (
                Error::Auth(AuthError::Unreachable("refused".into())),
                500,
                "auth_unreachable",
            ),
            (
                Error::Fetch(FetchError::NotFound { id: 9999 }),
                404,
                "student_not_found",
            ),
            (
                Error::Fetch(FetchError::Upstream {
                    status: 503,
                    body: "maintenance".into(),
                }),
                500,
                "upstream_error",
            ),
            (
                Error::Fetch(FetchError::Decode("expected object".into())),
                500,
                "decode_error",
            ),
            (Error::Fetch(FetchError::Timeout), 500, "upstream_timeout"),
            (
                Error::Fetch(FetchError::Unreachable("dns".into())),
                500,
                "upstream_unreachable",
            ),
        ]
    }

    #[test]
    fn test_every_variant_maps_to_expected_status_code() {
        for (error, expected_status, expected_code) in all_error_variants() {
            let actual_status = error.status_code();
            assert_eq!(
                actual_status, expected_status,
                "Error variant with error_code={expected_code} returned status {actual_status}, expected {expected_status}"
            );
        }
    }

    #[test]
    fn test_every_variant_maps_to_expected_error_code() {
        for (error, expected_status, expected_code) in all_error_variants() {
            let actual_code = error.error_code();
            assert_eq!(
                actual_code, expected_code,
                "Error variant with expected status={expected_status} returned error_code={actual_code}, expected {expected_code}"
            );
        }
    }

    #[test]
    fn test_public_message_never_contains_upstream_body() {
        let secret = "stack trace at db.query()";
        let errors = [
            Error::Fetch(FetchError::Upstream {
                status: 500,
                body: secret.into(),
            }),
            Error::Auth(AuthError::Rejected {
                status: 403,
                body: secret.into(),
            }),
        ];
        for error in errors {
            assert!(!error.public_message().contains(secret));
        }
    }

    #[test]
    fn test_display_omits_upstream_body() {
        let error = Error::Fetch(FetchError::Upstream {
            status: 502,
            body: "<html>gateway</html>".into(),
        });
        let message = error.to_string();
        assert!(message.contains("502"));
        assert!(!message.contains("gateway"));
    }

    #[test]
    fn test_not_found_is_404_not_500() {
        let err = Error::Fetch(FetchError::NotFound { id: 1 });
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.public_message(), "Student not found");
    }

    #[test]
    fn test_validation_is_400() {
        let err = Error::Validation("-3".into());
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.public_message(), "Invalid student ID");
    }
}
