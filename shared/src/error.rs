//! Errors raised by the CMS accessors.

use thiserror::Error;

/// Failure of a CMS read.
///
/// Callers never get structured CMS error codes: a non-success response is
/// reported with its status text only.
#[derive(Error, Debug)]
pub enum CmsError {
    /// The CMS answered with a non-success status.
    #[error("An error occurred while fetching the data: {status_text}")]
    Fetch {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase of the status.
        status_text: String,
    },

    /// The request never produced a response.
    #[error("CMS request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body was not the JSON shape we expect.
    #[error("failed to decode CMS response for {path}: {source}")]
    Decode {
        /// API path that was requested.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// No record carries the requested slug.
    #[error("{kind} with slug \"{slug}\" not found")]
    NotFound {
        /// Content type, e.g. `Article`.
        kind: &'static str,
        /// Slug that was looked up, after URL decoding.
        slug: String,
    },

    /// The client was configured with an unusable value.
    #[error("invalid CMS configuration: {0}")]
    Config(String),
}

impl CmsError {
    /// Create a not found error.
    pub fn not_found(kind: &'static str, slug: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            slug: slug.into(),
        }
    }

    /// Whether this error means "no such record" rather than a failed call.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for CMS reads.
pub type CmsResult<T> = std::result::Result<T, CmsError>;
