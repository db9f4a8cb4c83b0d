//! Core taxonomy types.
//!
//! A [`Taxonomy`] owns every [`TaxonomyClass`] in an arena addressed by
//! [`NodeId`]. Parent/child links are arena indices, so the tree needs no
//! reference counting. Next to the tree sits the registry, which maps each
//! [`ClassId`] to the first node registered under it.
//!
//! The two are deliberately allowed to diverge: a class discovered under a
//! second parent is rejected by the registry but still linked into the tree.
//! [`Registration`] and [`Link`] report both anomalies to the caller.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an ontology class, usually a bracketed IRI such as
/// `<http://dbpedia.org/ontology/Species>`.
///
/// Equality and hashing use the identifier string alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(String);

impl ClassId {
    /// Wraps an identifier string as given.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Wraps a bare IRI from a query result in angle brackets.
    #[must_use]
    pub fn from_iri(iri: &str) -> Self {
        Self(format!("<{iri}>"))
    }

    /// The identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path segment, e.g. `Species`.
    #[must_use]
    pub fn local_name(&self) -> &str {
        local_name(&self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ClassId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClassId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ClassId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Returns the last `/`-separated segment of `id` without angle brackets.
///
/// ```
/// use dbp_taxonomy::model::local_name;
///
/// assert_eq!(local_name("<http://dbpedia.org/resource/Apple>"), "Apple");
/// assert_eq!(local_name("Apple"), "Apple");
/// ```
#[must_use]
pub fn local_name(id: &str) -> &str {
    let trimmed = id.trim_start_matches('<').trim_end_matches('>');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Arena index of a class node inside one [`Taxonomy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in [`Taxonomy::nodes`].
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A concrete resource classified under a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Resource identifier, e.g. `<http://dbpedia.org/resource/Apple>`.
    pub uri: String,
    /// Abstract text; `None` until fetched, possibly empty afterwards.
    pub abstract_text: Option<String>,
}

impl Instance {
    /// An instance whose abstract has not been fetched yet.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            abstract_text: None,
        }
    }

    /// An instance with a known abstract.
    pub fn with_abstract(uri: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            abstract_text: Some(text.into()),
        }
    }

    /// File-name stem for this instance.
    #[must_use]
    pub fn local_name(&self) -> &str {
        local_name(&self.uri)
    }
}

/// A node of the hierarchy.
#[derive(Debug, Clone)]
pub struct TaxonomyClass {
    pub(crate) id: ClassId,
    pub(crate) level: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) instances: BTreeMap<String, Instance>,
}

impl TaxonomyClass {
    pub(crate) fn new(id: ClassId, level: usize, parent: Option<NodeId>) -> Self {
        Self {
            id,
            level,
            parent,
            children: Vec::new(),
            instances: BTreeMap::new(),
        }
    }

    /// Class identifier.
    #[must_use]
    pub fn id(&self) -> &ClassId {
        &self.id
    }

    /// Depth in the hierarchy; the root is 0.
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in discovery order. May contain same-named siblings.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Member instances ordered by URI.
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    /// Looks up a member instance by URI.
    #[must_use]
    pub fn instance(&self, uri: &str) -> Option<&Instance> {
        self.instances.get(uri)
    }

    /// Number of member instances.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

/// Outcome of [`Taxonomy::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The class is now in the registry.
    Inserted,
    /// The identifier was taken; the registry still points at `existing`.
    Duplicate {
        /// Node that owns the identifier.
        existing: NodeId,
    },
}

/// Outcome of [`Taxonomy::link_child`]. The child is appended either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// No sibling shared the child's identifier.
    Appended,
    /// A sibling with the same identifier was already present.
    AppendedDuplicate,
}

/// The complete hierarchy of classes plus their instances and abstracts.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    pub(crate) nodes: Vec<TaxonomyClass>,
    pub(crate) registry: HashMap<ClassId, NodeId>,
    pub(crate) order: Vec<NodeId>,
    pub(crate) root: NodeId,
    pub(crate) depth: usize,
}

impl Taxonomy {
    /// Creates a taxonomy holding only `root` at level 0.
    pub fn new(root: impl Into<ClassId>) -> Self {
        let root_id = root.into();
        let root = NodeId(0);
        Self {
            nodes: vec![TaxonomyClass::new(root_id.clone(), 0, None)],
            registry: HashMap::from([(root_id, root)]),
            order: vec![root],
            root,
            depth: 0,
        }
    }

    /// Allocates a class one level below `parent`.
    ///
    /// The node is neither registered nor linked; see [`Self::register`]
    /// and [`Self::link_child`].
    pub fn create_class(&mut self, id: impl Into<ClassId>, parent: NodeId) -> NodeId {
        let level = self.nodes[parent.0].level + 1;
        let node = NodeId(self.nodes.len());
        self.nodes
            .push(TaxonomyClass::new(id.into(), level, Some(parent)));
        node
    }

    /// Adds `node` to the registry under its identifier.
    ///
    /// If the identifier is already registered, logs a warning and leaves
    /// the registry and `depth` untouched: the first registration wins.
    pub fn register(&mut self, node: NodeId) -> Registration {
        let class = &self.nodes[node.0];
        if let Some(&existing) = self.registry.get(&class.id) {
            if existing != node {
                tracing::warn!("class {} already present", class.id);
            }
            return Registration::Duplicate { existing };
        }
        if class.level > self.depth {
            self.depth = class.level;
        }
        self.registry.insert(class.id.clone(), node);
        self.order.push(node);
        Registration::Inserted
    }

    /// Appends `child` to `parent`'s children.
    ///
    /// A sibling with the same identifier triggers a warning but does not
    /// prevent the append.
    pub fn link_child(&mut self, parent: NodeId, child: NodeId) -> Link {
        let child_id = &self.nodes[child.0].id;
        let duplicate = self.nodes[parent.0]
            .children
            .iter()
            .any(|c| self.nodes[c.0].id == *child_id);
        if duplicate {
            tracing::warn!(
                "child \"{}\" already present at \"{}\"",
                child_id,
                self.nodes[parent.0].id
            );
        }
        self.nodes[parent.0].children.push(child);
        if duplicate {
            Link::AppendedDuplicate
        } else {
            Link::Appended
        }
    }

    /// Root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Greatest level among registered classes.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The class stored at `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` belongs to another taxonomy and is out of range.
    #[must_use]
    pub fn class(&self, node: NodeId) -> &TaxonomyClass {
        &self.nodes[node.0]
    }

    /// Every node in allocation order, registered or not.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &TaxonomyClass)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, class)| (NodeId(i), class))
    }

    /// Registered classes in registration order.
    pub fn classes(&self) -> impl Iterator<Item = (NodeId, &TaxonomyClass)> {
        self.order.iter().map(|&n| (n, &self.nodes[n.0]))
    }

    /// Registered node ids in registration order.
    #[must_use]
    pub fn registered_nodes(&self) -> Vec<NodeId> {
        self.order.clone()
    }

    /// Registry lookup by identifier.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.registry.get(id).copied()
    }

    /// Registered class with identifier `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TaxonomyClass> {
        self.lookup(id).map(|n| &self.nodes[n.0])
    }

    /// Returns true if `node` is the registry's entry for its identifier.
    #[must_use]
    pub fn is_registered(&self, node: NodeId) -> bool {
        self.registry.get(&self.nodes[node.0].id) == Some(&node)
    }

    /// Number of registered classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always false: the root is registered on construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of allocated nodes, including rejected duplicates.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Adds `instance` to the class at `node`.
    ///
    /// Returns false, leaving the existing entry as is, if an instance with
    /// the same URI is already a member.
    pub fn add_instance(&mut self, node: NodeId, instance: Instance) -> bool {
        let instances = &mut self.nodes[node.0].instances;
        if instances.contains_key(&instance.uri) {
            return false;
        }
        instances.insert(instance.uri.clone(), instance);
        true
    }

    /// Sets the abstract of member `uri` of the class at `node`.
    ///
    /// Returns false if `uri` is not a member.
    pub fn set_abstract(&mut self, node: NodeId, uri: &str, text: impl Into<String>) -> bool {
        match self.nodes[node.0].instances.get_mut(uri) {
            Some(instance) => {
                instance.abstract_text = Some(text.into());
                true
            }
            None => false,
        }
    }

    /// Instances across registered classes, counted once per owning class.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.classes().map(|(_, c)| c.instance_count()).sum()
    }

    /// Instances across registered classes whose abstract has been fetched.
    #[must_use]
    pub fn abstract_count(&self) -> usize {
        self.classes()
            .flat_map(|(_, c)| c.instances())
            .filter(|i| i.abstract_text.is_some())
            .count()
    }

    fn write_subtree(&self, f: &mut fmt::Formatter<'_>, node: NodeId) -> fmt::Result {
        let class = &self.nodes[node.0];
        writeln!(
            f,
            "{:indent$}{} ({})",
            "",
            class.id.local_name(),
            class.level,
            indent = class.level * 2
        )?;
        for &child in &class.children {
            self.write_subtree(f, child)?;
        }
        Ok(())
    }
}

/// Indented tree, two spaces per level, in discovery order.
impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_subtree(f, self.root)
    }
}
