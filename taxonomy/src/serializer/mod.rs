//! Serializers for a fetched taxonomy.
//!
//! The versioned JSON document in [`crate::persist`] is the round-trip
//! format. [`turtle`] is an export-only view for RDF tooling.

pub mod turtle;
