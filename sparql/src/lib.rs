//! SPARQL plumbing for walking the DBpedia ontology.
//!
//! The `dbp-sparql` crate provides the three query templates the taxonomy
//! fetcher needs, a format-independent [`ResultSet`] parsed from the W3C
//! SPARQL 1.1 Query Results JSON format, and the [`QueryClient`] seam with a
//! blocking HTTP implementation, [`SparqlEndpoint`].
//!
//! # Entry Point
//!
//! ```no_run
//! use dbp_sparql::{query, QueryClient, SparqlEndpoint};
//!
//! let endpoint = SparqlEndpoint::new(dbp_sparql::DEFAULT_ENDPOINT)?;
//! if let Some(results) = endpoint.execute(&query::subclasses_of("Species")) {
//!     for class in results.values(query::SUBCLASS_VAR) {
//!         println!("{class}");
//!     }
//! }
//! # Ok::<(), dbp_sparql::QueryError>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod client;
pub mod error;
pub mod query;
pub mod results;

pub use client::{QueryClient, SparqlEndpoint, DEFAULT_ENDPOINT};
pub use error::QueryError;
pub use results::ResultSet;
