//! Durable storage of a whole [`Taxonomy`].
//!
//! Taxonomies are stored as a versioned JSON document (see
//! [`TaxonomyDocument`]). Nodes are addressed by arena index rather than by
//! class identifier, because a class linked under a second parent exists
//! twice in the tree under the same identifier.
//!
//! [`save`] writes to a sibling `.part` file and renames it over the target,
//! so an interrupted write never leaves a truncated taxonomy behind. [`load`]
//! rejects anything that would not rebuild a structurally sound taxonomy.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{ClassId, Instance, NodeId, Taxonomy, TaxonomyClass};

/// Value of the `format` tag.
pub const FORMAT_TAG: &str = "dbp-taxonomy";

/// Current document version.
pub const FORMAT_VERSION: u32 = 1;

/// Failure to save or load a taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Reading, writing, or renaming the file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON or does not match the document shape.
    #[error("corrupt or unreadable taxonomy file {}: {source}", .path.display())]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The `format` tag is not [`FORMAT_TAG`].
    #[error("not a taxonomy document (format tag {0:?})")]
    UnknownFormat(String),

    /// The document was written by an incompatible version.
    #[error("unsupported taxonomy format version {found} (expected {})", FORMAT_VERSION)]
    UnsupportedVersion {
        /// Version found in the document.
        found: u32,
    },

    /// The document parsed but describes an inconsistent taxonomy.
    #[error("corrupt or unreadable taxonomy file: {0}")]
    Corrupt(String),
}

/// Serialized form of one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Resource identifier.
    pub uri: String,
    /// Abstract text, `null` until fetched.
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
}

/// Serialized form of one class node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Class identifier.
    pub id: ClassId,
    /// Hierarchy depth.
    pub level: usize,
    /// Index of the parent node, `null` for the root.
    pub parent: Option<usize>,
    /// Indices of the child nodes, in order.
    pub children: Vec<usize>,
    /// Member instances.
    pub instances: Vec<InstanceRecord>,
}

/// Versioned on-disk representation of a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyDocument {
    /// Always [`FORMAT_TAG`].
    pub format: String,
    /// Document version.
    pub version: u32,
    /// Index of the root node.
    pub root: usize,
    /// Greatest level among registered classes.
    pub depth: usize,
    /// Every node, in arena order.
    pub nodes: Vec<NodeRecord>,
    /// Registered node indices, in registration order.
    pub registry: Vec<usize>,
}

impl TaxonomyDocument {
    /// Captures `taxonomy` as a document.
    #[must_use]
    pub fn from_taxonomy(taxonomy: &Taxonomy) -> Self {
        let nodes = taxonomy
            .nodes
            .iter()
            .map(|class| NodeRecord {
                id: class.id.clone(),
                level: class.level,
                parent: class.parent.map(NodeId::index),
                children: class.children.iter().map(|c| c.index()).collect(),
                instances: class
                    .instances
                    .values()
                    .map(|i| InstanceRecord {
                        uri: i.uri.clone(),
                        abstract_text: i.abstract_text.clone(),
                    })
                    .collect(),
            })
            .collect();
        Self {
            format: FORMAT_TAG.to_owned(),
            version: FORMAT_VERSION,
            root: taxonomy.root.index(),
            depth: taxonomy.depth,
            nodes,
            registry: taxonomy.order.iter().map(|n| n.index()).collect(),
        }
    }

    /// Rebuilds the taxonomy, checking every structural invariant.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnknownFormat`] or
    /// [`PersistError::UnsupportedVersion`] for foreign documents and
    /// [`PersistError::Corrupt`] for inconsistent ones.
    pub fn into_taxonomy(self) -> Result<Taxonomy, PersistError> {
        if self.format != FORMAT_TAG {
            return Err(PersistError::UnknownFormat(self.format));
        }
        if self.version != FORMAT_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: self.version,
            });
        }

        let count = self.nodes.len();
        let in_range = |i: usize, what: &str| {
            if i < count {
                Ok(NodeId(i))
            } else {
                Err(PersistError::Corrupt(format!(
                    "{what} index {i} out of range ({count} nodes)"
                )))
            }
        };

        let root = in_range(self.root, "root")?;
        let root_record = &self.nodes[root.0];
        if root_record.parent.is_some() || root_record.level != 0 {
            return Err(PersistError::Corrupt(
                "root must have level 0 and no parent".to_owned(),
            ));
        }

        let mut nodes = Vec::with_capacity(count);
        for (index, record) in self.nodes.iter().enumerate() {
            let parent = match record.parent {
                Some(p) => {
                    let p = in_range(p, "parent")?;
                    if self.nodes[p.0].level + 1 != record.level {
                        return Err(PersistError::Corrupt(format!(
                            "node {index} ({}) has level {} under a parent at level {}",
                            record.id, record.level, self.nodes[p.0].level
                        )));
                    }
                    Some(p)
                }
                None if index == root.0 => None,
                None => {
                    return Err(PersistError::Corrupt(format!(
                        "node {index} ({}) has no parent but is not the root",
                        record.id
                    )))
                }
            };
            let mut children = Vec::with_capacity(record.children.len());
            for &c in &record.children {
                let child = in_range(c, "child")?;
                if self.nodes[child.0].parent != Some(index) {
                    return Err(PersistError::Corrupt(format!(
                        "node {c} is listed as a child of node {index} but names another parent"
                    )));
                }
                children.push(child);
            }
            let instances: BTreeMap<String, Instance> = record
                .instances
                .iter()
                .map(|i| {
                    (
                        i.uri.clone(),
                        Instance {
                            uri: i.uri.clone(),
                            abstract_text: i.abstract_text.clone(),
                        },
                    )
                })
                .collect();
            nodes.push(TaxonomyClass {
                id: record.id.clone(),
                level: record.level,
                parent,
                children,
                instances,
            });
        }

        let mut registry = HashMap::with_capacity(self.registry.len());
        let mut order = Vec::with_capacity(self.registry.len());
        let mut max_level = 0;
        for &r in &self.registry {
            let node = in_range(r, "registry")?;
            let class = &nodes[node.0];
            if registry.insert(class.id.clone(), node).is_some() {
                return Err(PersistError::Corrupt(format!(
                    "class {} registered twice",
                    class.id
                )));
            }
            max_level = max_level.max(class.level);
            order.push(node);
        }
        if registry.get(&nodes[root.0].id) != Some(&root) {
            return Err(PersistError::Corrupt("root is not registered".to_owned()));
        }
        if max_level != self.depth {
            return Err(PersistError::Corrupt(format!(
                "stored depth {} differs from deepest registered level {max_level}",
                self.depth
            )));
        }

        Ok(Taxonomy {
            nodes,
            registry,
            order,
            root,
            depth: self.depth,
        })
    }
}

/// Serializes `taxonomy` to pretty-printed JSON.
///
/// # Errors
///
/// Returns the serializer error; not expected for well-formed taxonomies.
pub fn to_json_string(taxonomy: &Taxonomy) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&TaxonomyDocument::from_taxonomy(taxonomy))
}

/// Writes `taxonomy` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`PersistError::Io`] if the temporary file cannot be written or
/// renamed into place, and [`PersistError::Json`] if serialization fails.
pub fn save(taxonomy: &Taxonomy, path: &Path) -> Result<(), PersistError> {
    tracing::info!("writing file \"{}\"", path.display());
    let json = to_json_string(taxonomy).map_err(|source| PersistError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);
    fs::write(&part, json).map_err(|source| PersistError::Io {
        path: part.clone(),
        source,
    })?;
    fs::rename(&part, path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("file written");
    Ok(())
}

/// Reads a taxonomy previously written by [`save`].
///
/// # Errors
///
/// Returns [`PersistError::Io`] if the file cannot be read,
/// [`PersistError::Json`] if it is not a taxonomy document, and the
/// validation errors of [`TaxonomyDocument::into_taxonomy`].
pub fn load(path: &Path) -> Result<Taxonomy, PersistError> {
    tracing::info!("loading file \"{}\"", path.display());
    let bytes = fs::read(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document: TaxonomyDocument =
        serde_json::from_slice(&bytes).map_err(|source| PersistError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    let taxonomy = document.into_taxonomy()?;
    tracing::info!("loaded");
    Ok(taxonomy)
}
