//! Writes fetched abstracts as one text file per instance.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::Taxonomy;

/// Counters from [`export_abstracts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Files written.
    pub written: usize,
    /// Instances without an abstract.
    pub skipped: usize,
    /// Files that could not be written.
    pub failed: usize,
}

/// Writes `<local name>.txt` into `dir` for every instance of every
/// registered class that has an abstract, creating `dir` if needed.
///
/// Instances are visited in registry order, so when two classes share an
/// instance the last class wins, with identical text in practice. A file that
/// cannot be written is logged and counted; the export goes on.
///
/// # Errors
///
/// Returns an error if `dir` cannot be created.
pub fn export_abstracts(taxonomy: &Taxonomy, dir: &Path) -> Result<ExportSummary> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;
    tracing::info!("exporting abstracts to {}", dir.display());

    let mut summary = ExportSummary::default();
    for (_, class) in taxonomy.classes() {
        for instance in class.instances() {
            let Some(text) = instance.abstract_text.as_deref() else {
                summary.skipped += 1;
                continue;
            };
            let name = instance.local_name();
            if name.is_empty() {
                tracing::warn!("no file name for instance {}", instance.uri);
                summary.failed += 1;
                continue;
            }
            let path = dir.join(format!("{name}.txt"));
            match fs::write(&path, text) {
                Ok(()) => summary.written += 1,
                Err(e) => {
                    tracing::error!("failed to write {}: {e}", path.display());
                    summary.failed += 1;
                }
            }
        }
    }
    tracing::info!(
        written = summary.written,
        failed = summary.failed,
        "abstracts exported"
    );
    Ok(summary)
}
