//! Query execution against a remote SPARQL endpoint.
//!
//! [`QueryClient`] is the seam the taxonomy code depends on: one blocking
//! round trip per call, and `None` instead of an error on any failure.
//! [`SparqlEndpoint`] is the HTTP implementation; it keeps one pooled
//! `reqwest` client for its whole lifetime, so consecutive queries reuse
//! connections.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;

use crate::error::QueryError;
use crate::results::ResultSet;

/// Public DBpedia endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://dbpedia.org/sparql";

/// Media type requested from the endpoint.
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Longest response body excerpt kept in a [`QueryError::Status`].
const BODY_EXCERPT: usize = 512;

/// Executes SPARQL query strings.
///
/// Failures never surface to callers: implementations log them and return
/// `None`, which every caller treats exactly like an empty result set.
pub trait QueryClient {
    /// Runs `query` and returns its solutions, or `None` on failure.
    fn execute(&self, query: &str) -> Option<ResultSet>;
}

impl<C: QueryClient + ?Sized> QueryClient for &C {
    fn execute(&self, query: &str) -> Option<ResultSet> {
        (**self).execute(query)
    }
}

/// Blocking HTTP client bound to one SPARQL endpoint.
#[derive(Clone)]
pub struct SparqlEndpoint {
    client: Client,
    url: String,
}

impl fmt::Debug for SparqlEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparqlEndpoint")
            .field("url", &self.url)
            .finish()
    }
}

impl SparqlEndpoint {
    /// Creates a client for `url` with the HTTP library's default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Client`] if the HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialise).
    pub fn new(url: impl Into<String>) -> Result<Self, QueryError> {
        let client = Client::builder().build().map_err(QueryError::Client)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Creates a client for `url` whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Client`] if the HTTP client cannot be built.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, QueryError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(QueryError::Client)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Runs `query` and returns the typed failure instead of logging it.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Transport`] on connection or body failures,
    /// [`QueryError::Status`] on a non-2xx answer, and
    /// [`QueryError::Malformed`] if the body is not a SPARQL JSON result set.
    pub fn try_execute(&self, query: &str) -> Result<ResultSet, QueryError> {
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .query(&[("query", query), ("format", SPARQL_RESULTS_JSON)])
            .send()
            .map_err(QueryError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(QueryError::Status {
                status: status.as_u16(),
                body: body.chars().take(BODY_EXCERPT).collect(),
            });
        }

        let value: serde_json::Value = response
            .json()
            .map_err(|e| QueryError::Malformed(e.to_string()))?;
        ResultSet::from_json(&value)
    }
}

impl QueryClient for SparqlEndpoint {
    fn execute(&self, query: &str) -> Option<ResultSet> {
        match self.try_execute(query) {
            Ok(results) => {
                tracing::debug!(rows = results.len(), "query answered");
                Some(results)
            }
            Err(e) => {
                tracing::error!("{e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_endpoint_yields_none() {
        // Port 9 (discard) on localhost is closed on test machines.
        let endpoint =
            SparqlEndpoint::with_timeout("http://127.0.0.1:9/sparql", Duration::from_secs(2))
                .expect("client builds");
        assert!(endpoint.execute("SELECT * WHERE { ?s ?p ?o }").is_none());
        assert!(matches!(
            endpoint.try_execute("SELECT * WHERE { ?s ?p ?o }"),
            Err(QueryError::Transport(_))
        ));
    }

    #[test]
    fn debug_hides_client_internals() {
        let endpoint = SparqlEndpoint::new(DEFAULT_ENDPOINT).expect("client builds");
        assert_eq!(
            format!("{endpoint:?}"),
            "SparqlEndpoint { url: \"http://dbpedia.org/sparql\" }"
        );
        assert_eq!(endpoint.url(), DEFAULT_ENDPOINT);
    }
}
