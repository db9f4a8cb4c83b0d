//! Breadth-first construction of a class hierarchy.
//!
//! Starting from the root, every class on the current frontier is asked
//! for its direct subclasses, one query per class. Each answer becomes a new
//! node one level below the class that reported it, and every such node forms
//! the next frontier. The walk ends at the first level that creates nothing.
//!
//! A class reported by a second parent keeps its registry entry from the
//! first one, but the copy linked under the second parent is expanded like
//! any other node, so the tree can hold same-named subtrees that the registry
//! does not know about. A node whose identifier already appears among its own
//! ancestors is linked but not expanded; cyclic `rdfs:subClassOf` answers end
//! there.

use dbp_sparql::query::{self, ONTOLOGY_NS};
use dbp_sparql::QueryClient;

use crate::model::{ClassId, NodeId, Registration, Taxonomy};

/// Counters collected while building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Subclass queries issued.
    pub queries: usize,
    /// Queries that failed (counted as "no subclasses").
    pub failed_queries: usize,
    /// Classes added to the registry, root excluded.
    pub registered: usize,
    /// Subclass answers rejected by the registry but linked into the tree.
    pub duplicates: usize,
    /// Answers naming one of their own ancestors, left unexpanded.
    pub cycles: usize,
}

/// Builds the taxonomy below `root`.
///
/// `root` is stored as given, e.g. `<http://dbpedia.org/ontology/Species>`;
/// a bare name is qualified by the query templates only.
pub fn build<C: QueryClient + ?Sized>(client: &C, root: impl Into<ClassId>) -> Taxonomy {
    build_with_summary(client, root).0
}

/// Like [`build`], also returning the counters.
pub fn build_with_summary<C: QueryClient + ?Sized>(
    client: &C,
    root: impl Into<ClassId>,
) -> (Taxonomy, BuildSummary) {
    let root = root.into();
    tracing::info!("generating taxonomy for subtree of \"{root}\"");

    let mut taxonomy = Taxonomy::new(root);
    let mut summary = BuildSummary::default();
    let mut frontier = vec![taxonomy.root()];
    let mut level = 1;

    while !frontier.is_empty() {
        tracing::debug!(level, frontier = frontier.len(), "expanding level");
        let mut next = Vec::new();
        for &class in &frontier {
            expand(client, &mut taxonomy, class, &mut next, &mut summary);
        }
        frontier = next;
        level += 1;
    }

    tracing::info!(
        classes = taxonomy.len(),
        depth = taxonomy.depth(),
        "taxonomy generated"
    );
    (taxonomy, summary)
}

fn expand<C: QueryClient + ?Sized>(
    client: &C,
    taxonomy: &mut Taxonomy,
    class: NodeId,
    next: &mut Vec<NodeId>,
    summary: &mut BuildSummary,
) {
    let q = query::subclasses_of(taxonomy.class(class).id().as_str());
    summary.queries += 1;
    let Some(results) = client.execute(&q) else {
        summary.failed_queries += 1;
        return;
    };
    tracing::debug!(?results, "subclasses of {}", taxonomy.class(class).id());

    for var in &results.vars {
        for value in results.values(var) {
            let child = taxonomy.create_class(subclass_id(value), class);
            let registration = taxonomy.register(child);
            taxonomy.link_child(class, child);
            tracing::debug!(
                "Added \"{}\" (level={}) to taxonomy at {}",
                taxonomy.class(child).id(),
                taxonomy.class(child).level(),
                taxonomy.class(class).id()
            );
            match registration {
                Registration::Inserted => summary.registered += 1,
                Registration::Duplicate { .. } => summary.duplicates += 1,
            }
            if repeats_ancestor(taxonomy, child) {
                tracing::warn!(
                    "\"{}\" is its own ancestor below {}, not expanding",
                    taxonomy.class(child).id(),
                    taxonomy.class(class).id()
                );
                summary.cycles += 1;
            } else {
                next.push(child);
            }
        }
    }
}

/// Whether `node`'s identifier appears on its parent chain.
fn repeats_ancestor(taxonomy: &Taxonomy, node: NodeId) -> bool {
    let id = taxonomy.class(node).id();
    let mut current = taxonomy.class(node).parent();
    while let Some(ancestor) = current {
        let class = taxonomy.class(ancestor);
        if class.id() == id {
            return true;
        }
        current = class.parent();
    }
    false
}

/// Turns a subclass binding into a class identifier.
///
/// Endpoints answer with bare IRIs; those are bracketed. Anything already
/// bracketed or prefixed with `dbpedia-owl:` is kept.
fn subclass_id(value: &str) -> ClassId {
    if query::is_bracketed_iri(value) || value.starts_with(query::ONTOLOGY_PREFIX) {
        ClassId::new(value)
    } else if value.contains("://") {
        ClassId::from_iri(value)
    } else {
        ClassId::from_iri(&format!("{ONTOLOGY_NS}{value}"))
    }
}
