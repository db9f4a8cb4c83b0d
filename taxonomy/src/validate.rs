//! Structural checks over a taxonomy.
//!
//! Taxonomies built in-process satisfy these by construction; the checks are
//! meant for taxonomies loaded from disk and for spotting how far the tree
//! and the registry have drifted apart.

use crate::model::Taxonomy;
use crate::report::{Finding, Severity, ValidationReport};

/// Runs every check against `taxonomy`.
#[must_use]
pub fn validate(taxonomy: &Taxonomy) -> ValidationReport {
    [
        check_levels(taxonomy),
        check_depth(taxonomy),
        check_registry(taxonomy),
        check_divergence(taxonomy),
    ]
    .into_iter()
    .collect()
}

/// Pass when `issues` is empty, otherwise `severity` with the issues as details.
fn outcome(
    check: &'static str,
    issues: Vec<String>,
    severity: Severity,
    pass: impl FnOnce() -> String,
    fail: impl FnOnce(usize) -> String,
) -> Finding {
    if issues.is_empty() {
        Finding::new(check, Severity::Pass, pass())
    } else {
        Finding::new(check, severity, fail(issues.len())).with_details(issues)
    }
}

/// Root at level 0; every other node one level below its parent.
fn check_levels(taxonomy: &Taxonomy) -> Finding {
    let mut issues = Vec::new();
    let root = taxonomy.class(taxonomy.root());
    if root.level() != 0 || root.parent().is_some() {
        issues.push(format!(
            "root {} has level {} and parent {:?}",
            root.id(),
            root.level(),
            root.parent()
        ));
    }
    for (node, class) in taxonomy.nodes() {
        if let Some(parent) = class.parent() {
            let parent_level = taxonomy.class(parent).level();
            if class.level() != parent_level + 1 {
                issues.push(format!(
                    "node {} ({}) at level {} under parent at level {}",
                    node.index(),
                    class.id(),
                    class.level(),
                    parent_level
                ));
            }
        }
    }
    outcome(
        "taxonomy/levels",
        issues,
        Severity::Failure,
        || format!("{} nodes sit one level below their parent", taxonomy.node_count()),
        |n| format!("level invariant broken at {n} nodes"),
    )
}

/// Stored depth equals the deepest registered level.
fn check_depth(taxonomy: &Taxonomy) -> Finding {
    let max_level = taxonomy
        .classes()
        .map(|(_, c)| c.level())
        .max()
        .unwrap_or(0);
    let mut issues = Vec::new();
    if max_level != taxonomy.depth() {
        issues.push(format!("stored {}, deepest {}", taxonomy.depth(), max_level));
    }
    outcome(
        "taxonomy/depth",
        issues,
        Severity::Failure,
        || format!("depth {} matches deepest registered class", taxonomy.depth()),
        |_| "stored depth differs from deepest registered class".to_owned(),
    )
}

/// Every registered node is the registry's entry for its identifier.
fn check_registry(taxonomy: &Taxonomy) -> Finding {
    let stale: Vec<String> = taxonomy
        .classes()
        .filter(|(node, _)| !taxonomy.is_registered(*node))
        .map(|(node, class)| format!("node {} ({})", node.index(), class.id()))
        .collect();
    outcome(
        "taxonomy/registry",
        stale,
        Severity::Failure,
        || format!("{} registered classes, identifiers unique", taxonomy.len()),
        |n| format!("registry order lists {n} nodes the registry does not map"),
    )
}

/// Tree nodes whose identifier is registered on another node.
fn check_divergence(taxonomy: &Taxonomy) -> Finding {
    let unregistered: Vec<String> = taxonomy
        .nodes()
        .filter(|(node, _)| !taxonomy.is_registered(*node))
        .map(|(node, class)| {
            let parent = class
                .parent()
                .map(|p| taxonomy.class(p).id().to_string())
                .unwrap_or_default();
            format!("{} linked under {} (node {})", class.id(), parent, node.index())
        })
        .collect();
    outcome(
        "taxonomy/divergence",
        unregistered,
        Severity::Warning,
        || "tree and registry agree".to_owned(),
        |n| format!("{n} tree nodes are not the registry's entry for their class"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Taxonomy;

    #[test]
    fn clean_taxonomy_passes() {
        let mut tax = Taxonomy::new("<http://dbpedia.org/ontology/Species>");
        let root = tax.root();
        let mammal = tax.create_class("<http://dbpedia.org/ontology/Mammal>", root);
        tax.register(mammal);
        tax.link_child(root, mammal);
        let report = validate(&tax);
        assert!(report.all_passed());
        assert_eq!(report.worst(), Severity::Pass);
        assert_eq!(report.findings.len(), 4);
    }

    #[test]
    fn wrong_depth_fails() {
        let mut tax = Taxonomy::new("<http://dbpedia.org/ontology/Species>");
        tax.depth = 3;
        let report = validate(&tax);
        assert!(!report.all_passed());
        let depth = report.get("taxonomy/depth").expect("depth check");
        assert_eq!(depth.severity, Severity::Failure);
        assert_eq!(depth.details, vec!["stored 3, deepest 0".to_owned()]);
    }

    #[test]
    fn second_parent_link_is_a_warning() {
        let mut tax = Taxonomy::new("<http://dbpedia.org/ontology/Agent>");
        let root = tax.root();
        let person = tax.create_class("<http://dbpedia.org/ontology/Person>", root);
        tax.register(person);
        tax.link_child(root, person);
        let org = tax.create_class("<http://dbpedia.org/ontology/Organisation>", root);
        tax.register(org);
        tax.link_child(root, org);
        let again = tax.create_class("<http://dbpedia.org/ontology/Person>", org);
        tax.register(again);
        tax.link_child(org, again);

        let report = validate(&tax);
        assert!(report.all_passed());
        assert_eq!(report.warning_count(), 1);
        let warning = report.get("taxonomy/divergence").expect("divergence check");
        assert_eq!(warning.severity, Severity::Warning);
        assert_eq!(warning.details.len(), 1);
        assert!(warning.details[0].contains("Organisation"));
    }
}
