//! Query templates against the DBpedia ontology.
//!
//! Every template starts with [`PREFIXES`] so that short names such as
//! `dbpedia-owl:Species` resolve on the endpoint. Bare names are qualified
//! with the matching namespace token; bracketed absolute IRIs and names that
//! already carry the token are passed through verbatim.

/// PREFIX block shared by all queries.
pub const PREFIXES: &str = "\
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX dbpedia: <http://dbpedia.org/resource/>
PREFIX dbpedia-owl: <http://dbpedia.org/ontology/>
PREFIX foaf: <http://xmlns.com/foaf/0.1/page/>
";

/// Namespace token for ontology classes.
pub const ONTOLOGY_PREFIX: &str = "dbpedia-owl:";

/// Namespace token for resources (instances).
pub const RESOURCE_PREFIX: &str = "dbpedia:";

/// Full IRI of the DBpedia ontology namespace.
pub const ONTOLOGY_NS: &str = "http://dbpedia.org/ontology/";

/// Output variable of [`subclasses_of`].
pub const SUBCLASS_VAR: &str = "subClass";

/// Output variable of [`instances_of`].
pub const INSTANCE_VAR: &str = "Concept";

/// Output variable of [`abstract_of`].
pub const ABSTRACT_VAR: &str = "abstract";

/// Default abstract language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Returns true if `name` is written as a bracketed absolute IRI.
#[must_use]
pub fn is_bracketed_iri(name: &str) -> bool {
    name.len() > 2 && name.starts_with('<') && name.ends_with('>')
}

/// Qualifies `name` with `prefix` unless it is already qualified.
#[must_use]
pub fn qualify(name: &str, prefix: &str) -> String {
    if name.starts_with(prefix) || is_bracketed_iri(name) {
        name.to_owned()
    } else {
        format!("{prefix}{name}")
    }
}

/// Lists the direct subclasses of `class`.
///
/// ```
/// let q = dbp_sparql::query::subclasses_of("Species");
/// assert!(q.contains("?subClass rdfs:subClassOf dbpedia-owl:Species ."));
/// ```
#[must_use]
pub fn subclasses_of(class: &str) -> String {
    format!(
        "{PREFIXES}SELECT DISTINCT ?{SUBCLASS_VAR}\n        WHERE {{ ?{SUBCLASS_VAR} rdfs:subClassOf {} . }}",
        qualify(class, ONTOLOGY_PREFIX)
    )
}

/// Lists the resources typed with `class`.
#[must_use]
pub fn instances_of(class: &str) -> String {
    format!(
        "{PREFIXES}SELECT DISTINCT ?{INSTANCE_VAR}\n        WHERE {{ ?{INSTANCE_VAR} rdf:type {} . }}",
        qualify(class, ONTOLOGY_PREFIX)
    )
}

/// Fetches the abstract of `instance` in `language`.
#[must_use]
pub fn abstract_of(instance: &str, language: &str) -> String {
    format!(
        "{PREFIXES}SELECT DISTINCT ?{ABSTRACT_VAR} WHERE {{{} dbpedia-owl:abstract ?{ABSTRACT_VAR} . \
         FILTER ( langMatches( lang(?{ABSTRACT_VAR}), \"{language}\" ) ) }} ",
        qualify(instance, RESOURCE_PREFIX)
    )
}
