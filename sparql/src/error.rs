//! Errors raised while talking to a SPARQL endpoint.

/// Failure of a single query round trip.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Connection, timeout, or body transfer failure.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body, for diagnostics.
        body: String,
    },

    /// The response body is not a SPARQL JSON result set.
    #[error("malformed SPARQL results: {0}")]
    Malformed(String),
}
