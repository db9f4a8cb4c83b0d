//! Instance and abstract collection.
//!
//! Two passes over the registered classes, both in registration order:
//!
//! 1. [`populate_instances`] asks for the members of every class.
//! 2. [`populate_abstracts`] fetches one abstract per member that does not
//!    have one yet. This pass issues one round trip per instance and can run
//!    for hours, so the whole taxonomy is written to a checkpoint file every
//!    [`CollectorOptions::checkpoint_every`] fetched abstracts.
//!
//! Every instance the abstract pass touches ends up with `Some` text, empty
//! if the endpoint failed or had nothing, so rerunning the pass on a loaded
//! checkpoint only fetches what is still missing.

use std::path::{Path, PathBuf};

use dbp_sparql::query::{self, ABSTRACT_VAR, DEFAULT_LANGUAGE, INSTANCE_VAR};
use dbp_sparql::QueryClient;

use crate::model::{Instance, NodeId, Taxonomy};
use crate::persist::{self, PersistError};

/// Default number of fetched abstracts between checkpoints.
pub const DEFAULT_CHECKPOINT_EVERY: usize = 1000;

/// Fetched abstracts between two info-level progress lines.
const PROGRESS_EVERY: usize = 100;

/// Tuning for [`populate_abstracts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorOptions {
    /// Fetched abstracts between checkpoints; 0 disables checkpoints.
    pub checkpoint_every: usize,
    /// Directory that receives the checkpoint file.
    pub checkpoint_dir: PathBuf,
    /// Language tag requested for abstracts.
    pub language: String,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
            checkpoint_dir: PathBuf::from("."),
            language: DEFAULT_LANGUAGE.to_owned(),
        }
    }
}

/// Receives progress events from [`populate_abstracts`].
pub trait Observer {
    /// An abstract was fetched; `count` is the running total for this pass.
    fn abstract_fetched(&self, count: usize) {
        let _ = count;
    }

    /// The taxonomy was written to `path` after `count` fetched abstracts.
    fn checkpoint_written(&self, path: &Path, count: usize) {
        let _ = (path, count);
    }

    /// Writing the checkpoint failed; the pass continues without it.
    fn checkpoint_failed(&self, path: &Path, count: usize, error: &PersistError) {
        let _ = (path, count, error);
    }
}

/// Reports progress through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn abstract_fetched(&self, count: usize) {
        if count % PROGRESS_EVERY == 0 {
            tracing::info!("adding abstract #{count}");
        } else {
            tracing::trace!("adding abstract #{count}");
        }
    }

    fn checkpoint_written(&self, path: &Path, count: usize) {
        tracing::info!("checkpoint after {count} abstracts: {}", path.display());
    }

    fn checkpoint_failed(&self, path: &Path, count: usize, error: &PersistError) {
        tracing::error!(
            "checkpoint after {count} abstracts to {} failed: {error}",
            path.display()
        );
    }
}

/// Counters from [`populate_instances`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstanceSummary {
    /// Classes whose members were requested.
    pub classes_queried: usize,
    /// Queries that failed (counted as "no members").
    pub failed_queries: usize,
    /// Instances newly added across all classes.
    pub instances_added: usize,
}

/// Counters from [`populate_abstracts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbstractSummary {
    /// Abstract queries issued.
    pub fetched: usize,
    /// Instances skipped because they already had an abstract.
    pub skipped: usize,
    /// Fetches that produced empty text.
    pub empty: usize,
    /// Checkpoints successfully written.
    pub checkpoints: usize,
}

/// Adds the members of every registered class to that class.
///
/// Members already present are left untouched.
pub fn populate_instances<C: QueryClient + ?Sized>(
    taxonomy: &mut Taxonomy,
    client: &C,
) -> InstanceSummary {
    tracing::info!("adding instances to taxonomy");
    let mut summary = InstanceSummary::default();
    for node in taxonomy.registered_nodes() {
        summary.classes_queried += 1;
        let q = query::instances_of(taxonomy.class(node).id().as_str());
        let Some(results) = client.execute(&q) else {
            summary.failed_queries += 1;
            continue;
        };
        for value in results.values(INSTANCE_VAR) {
            if taxonomy.add_instance(node, Instance::new(resource_id(value))) {
                summary.instances_added += 1;
            }
        }
    }
    tracing::info!(
        instances = summary.instances_added,
        classes = summary.classes_queried,
        "done"
    );
    summary
}

/// Fetches the abstract of `uri`: the first result's text, or empty text if
/// the query failed or returned nothing.
pub fn fetch_abstract<C: QueryClient + ?Sized>(client: &C, uri: &str, language: &str) -> String {
    client
        .execute(&query::abstract_of(uri, language))
        .and_then(|results| results.first(ABSTRACT_VAR).map(str::to_owned))
        .unwrap_or_default()
}

/// Path of the checkpoint file for a pass started now.
#[must_use]
pub fn checkpoint_path(dir: &Path) -> PathBuf {
    let stamp = chrono::Utc::now().timestamp_millis();
    dir.join(format!("{stamp}_taxonomy.tmp"))
}

/// Fetches abstracts for every member that has none yet.
///
/// After each fetch whose running count is a multiple of
/// `options.checkpoint_every`, the whole taxonomy is saved to one
/// time-stamped file in `options.checkpoint_dir`, overwritten by each later
/// checkpoint of the same pass. A failed checkpoint is reported to
/// `observer` and otherwise ignored.
pub fn populate_abstracts<C, O>(
    taxonomy: &mut Taxonomy,
    client: &C,
    options: &CollectorOptions,
    observer: &O,
) -> AbstractSummary
where
    C: QueryClient + ?Sized,
    O: Observer + ?Sized,
{
    tracing::info!("adding abstracts to instances");
    let mut summary = AbstractSummary::default();
    let checkpoint = checkpoint_path(&options.checkpoint_dir);

    let pending: Vec<(NodeId, String)> = taxonomy
        .classes()
        .flat_map(|(node, class)| {
            class.instances().filter_map(move |instance| {
                if instance.abstract_text.is_some() {
                    None
                } else {
                    Some((node, instance.uri.clone()))
                }
            })
        })
        .collect();
    summary.skipped = taxonomy.abstract_count();

    for (node, uri) in pending {
        let text = fetch_abstract(client, &uri, &options.language);
        if text.is_empty() {
            summary.empty += 1;
        }
        taxonomy.set_abstract(node, &uri, text);
        summary.fetched += 1;
        observer.abstract_fetched(summary.fetched);

        if options.checkpoint_every > 0 && summary.fetched % options.checkpoint_every == 0 {
            match persist::save(taxonomy, &checkpoint) {
                Ok(()) => {
                    summary.checkpoints += 1;
                    observer.checkpoint_written(&checkpoint, summary.fetched);
                }
                Err(e) => observer.checkpoint_failed(&checkpoint, summary.fetched, &e),
            }
        }
    }

    tracing::info!(
        fetched = summary.fetched,
        empty = summary.empty,
        skipped = summary.skipped,
        "done"
    );
    summary
}

/// Brackets a bare resource IRI from a query result.
fn resource_id(value: &str) -> String {
    if query::is_bracketed_iri(value) {
        value.to_owned()
    } else {
        format!("<{value}>")
    }
}
