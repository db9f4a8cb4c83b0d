//! DBpedia class taxonomy with instances and abstracts.
//!
//! The `dbp-taxonomy` crate walks the ontology below a root class
//! breadth-first ([`builder`]), attaches the members of every class and
//! one abstract per member ([`collector`]), and stores the result as a
//! versioned JSON document ([`persist`]), as text files ([`export`]), or as
//! Turtle ([`serializer::turtle`]).
//!
//! # Entry Point
//!
//! ```no_run
//! use dbp_sparql::SparqlEndpoint;
//! use dbp_taxonomy::{builder, collector, persist};
//!
//! let endpoint = SparqlEndpoint::new(dbp_sparql::DEFAULT_ENDPOINT)?;
//! let mut taxonomy = builder::build(&endpoint, "<http://dbpedia.org/ontology/Species>");
//! collector::populate_instances(&mut taxonomy, &endpoint);
//! collector::populate_abstracts(
//!     &mut taxonomy,
//!     &endpoint,
//!     &collector::CollectorOptions::default(),
//!     &collector::LogObserver,
//! );
//! persist::save(&taxonomy, std::path::Path::new("species.json"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod builder;
pub mod collector;
pub mod export;
pub mod model;
pub mod persist;
pub mod report;
pub mod serializer;
pub mod validate;

pub use model::{ClassId, Instance, Link, NodeId, Registration, Taxonomy, TaxonomyClass};
pub use persist::PersistError;
