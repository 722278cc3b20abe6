//! Error types for the client
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Usage Errors (detected before any request is made)
    // ============================================================================
    /// More than one cursor parameter was supplied to a list call
    #[error("Ambiguous cursor mode: {supplied} supplied simultaneously")]
    AmbiguousCursor {
        /// The conflicting parameter names
        supplied: String,
    },

    /// A filter key carried an operator suffix this crate does not know
    #[error("Invalid filter operator: __{op}")]
    InvalidOperator {
        /// The unrecognized suffix
        op: String,
    },

    /// A message was posted with neither text nor attachments
    #[error("A message needs text or at least one attachment")]
    EmptyMessage,

    /// A bulk-add item carried no identifying field
    #[error("Member '{nickname}' has no user_id, email, or phone_number")]
    MissingIdentifier {
        /// Display name of the offending item
        nickname: String,
    },

    // ============================================================================
    // Find Errors
    // ============================================================================
    /// A filter expected exactly one match and found none
    #[error("No matches using {tests}")]
    NoMatches {
        /// The tests that were applied
        tests: String,
    },

    /// A filter expected exactly one match and found several
    #[error("Found {count} matches using {tests}")]
    MultipleMatches {
        /// The tests that were applied
        tests: String,
        /// How many items matched
        count: usize,
    },

    // ============================================================================
    // Asynchronous Membership Results
    // ============================================================================
    /// The server is still processing a bulk-add request
    #[error("Results {results_id} are not ready yet")]
    ResultsNotReady {
        /// The in-flight request
        results_id: String,
    },

    /// Bulk-add results existed once but are gone for good
    #[error("Results {results_id} have expired")]
    ResultsExpired {
        /// The expired request
        results_id: String,
    },

    // ============================================================================
    // Transport / API Errors
    // ============================================================================
    /// The request never produced a usable response
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API refused the request
    #[error("HTTP {status}: {message}")]
    Api {
        /// HTTP status (or the envelope's meta code when present)
        status: u16,
        /// What the API said went wrong
        message: String,
    },

    /// The response body could not be parsed as JSON
    #[error("Response body was not valid JSON (HTTP {status})")]
    InvalidJson {
        /// The response status
        status: u16,
    },

    /// The envelope carried no data where some was required
    #[error("The response contained no response data")]
    MissingData,

    /// A JSON value did not fit the expected shape
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A configured base URL is not a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Create an API error from a status code and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an ambiguous-cursor error from the supplied parameter names
    pub fn ambiguous_cursor(supplied: &[&str]) -> Self {
        Self::AmbiguousCursor {
            supplied: supplied.join(", "),
        }
    }

    /// Create an invalid-operator error
    pub fn invalid_operator(op: impl Into<String>) -> Self {
        Self::InvalidOperator { op: op.into() }
    }

    /// Check if this error means a membership request is still processing
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::ResultsNotReady { .. })
    }

    /// Check if this error means membership results are gone for good
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::ResultsExpired { .. })
    }
}

/// Result type alias for the client
pub type Result<T> = std::result::Result<T, Error>;
