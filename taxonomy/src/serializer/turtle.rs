//! Turtle 1.1 serializer for a fetched taxonomy.
//!
//! Registered classes become `owl:Class` resources linked by
//! `rdfs:subClassOf`, members are typed with their class, and non-empty
//! abstracts are attached as language-tagged `dbpedia-owl:abstract`
//! literals.

use dbp_sparql::query::{self, ONTOLOGY_PREFIX, RESOURCE_PREFIX};

use crate::model::Taxonomy;

/// Serializes `taxonomy` to a Turtle string, tagging abstracts with `language`.
#[must_use]
pub fn to_turtle(taxonomy: &Taxonomy, language: &str) -> String {
    let mut out = String::with_capacity(64 * 1024);

    out.push_str("@prefix owl:  <http://www.w3.org/2002/07/owl#> .\n");
    out.push_str("@prefix rdf:  <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .\n");
    out.push_str("@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n");
    out.push_str("@prefix dbpedia: <http://dbpedia.org/resource/> .\n");
    out.push_str("@prefix dbpedia-owl: <http://dbpedia.org/ontology/> .\n");
    out.push('\n');

    for (_, class) in taxonomy.classes() {
        let parent = class
            .parent()
            .map(|p| {
                format!(
                    " ;\n  rdfs:subClassOf {}",
                    class_term(taxonomy.class(p).id().as_str())
                )
            })
            .unwrap_or_default();
        out.push_str(&format!(
            "{}\n  a owl:Class{} .\n\n",
            class_term(class.id().as_str()),
            parent
        ));
    }

    for (_, class) in taxonomy.classes() {
        if class.instance_count() == 0 {
            continue;
        }
        out.push_str(&format!("# Instances of {}\n", class.id().local_name()));
        for instance in class.instances() {
            out.push_str(&format!(
                "{}\n  a {}",
                term(&instance.uri, RESOURCE_PREFIX),
                class_term(class.id().as_str())
            ));
            if let Some(text) = instance.abstract_text.as_deref().filter(|t| !t.is_empty()) {
                out.push_str(&format!(
                    " ;\n  dbpedia-owl:abstract {}@{}",
                    turtle_string(text),
                    language
                ));
            }
            out.push_str(" .\n\n");
        }
    }

    out
}

/// Writes an identifier as a Turtle term. Bare absolute IRIs are bracketed,
/// bare local names are qualified with `prefix`.
fn term(id: &str, prefix: &str) -> String {
    if id.contains("://") && !query::is_bracketed_iri(id) {
        format!("<{id}>")
    } else {
        query::qualify(id, prefix)
    }
}

fn class_term(id: &str) -> String {
    term(id, ONTOLOGY_PREFIX)
}

fn turtle_string(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r");
    format!("\"{}\"", escaped)
}
