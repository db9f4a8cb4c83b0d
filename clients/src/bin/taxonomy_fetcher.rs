//! `dbp-taxonomy-fetcher` — Walks the DBpedia class hierarchy below a root
//! class, attaches every class's instances and their abstracts, and writes
//! the result out.
//!
//! **Outputs** (each optional):
//! - `--save_taxonomy <file>` — the collected taxonomy, reloadable with `--load_taxonomy`
//! - `--save_abstracts <dir>` — one `<resource>.txt` per instance abstract
//! - `--save_turtle <file>` — classes and instances as RDF Turtle
//!
//! **Usage:**
//! ```
//! dbp-taxonomy-fetcher [OPTIONS] [TAXONOMY_ROOT]
//! dbp-taxonomy-fetcher --load_taxonomy taxonomy.json --save_abstracts abstracts/
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use dbp_clients::logging::{self, LogLevel, LogSettings};
use dbp_sparql::query::DEFAULT_LANGUAGE;
use dbp_sparql::{SparqlEndpoint, DEFAULT_ENDPOINT};
use dbp_taxonomy::collector::{
    self, CollectorOptions, LogObserver, DEFAULT_CHECKPOINT_EVERY,
};
use dbp_taxonomy::serializer::turtle;
use dbp_taxonomy::{builder, export, persist, validate, Taxonomy};

/// Fetch a DBpedia class taxonomy with instances and abstracts.
#[derive(Parser, Debug)]
#[command(
    name = "dbp-taxonomy-fetcher",
    about = "Fetch a DBpedia class taxonomy with instances and abstracts"
)]
struct Args {
    /// Root class, e.g. `Species` or `<http://dbpedia.org/ontology/Species>`.
    /// Required unless `--load_taxonomy` is given.
    #[arg(value_name = "TAXONOMY_ROOT")]
    root: Option<String>,

    /// Only log errors to the console.
    #[arg(short, long)]
    quiet: bool,

    /// Log debug output to the console.
    #[arg(short, long)]
    debug: bool,

    /// Load a previously saved taxonomy instead of querying the endpoint.
    #[arg(long = "load_taxonomy", value_name = "FILE")]
    load_taxonomy: Option<PathBuf>,

    /// Save the taxonomy to this file.
    #[arg(long = "save_taxonomy", value_name = "FILE")]
    save_taxonomy: Option<PathBuf>,

    /// Write one text file per instance abstract into this directory.
    #[arg(long = "save_abstracts", value_name = "DIR")]
    save_abstracts: Option<PathBuf>,

    /// Write the taxonomy as Turtle to this file.
    #[arg(long = "save_turtle", value_name = "FILE")]
    save_turtle: Option<PathBuf>,

    /// SPARQL endpoint URL.
    #[arg(long, env = "DBP_SPARQL_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Language of the abstracts.
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    lang: String,

    /// Fetched abstracts between checkpoints (0 disables checkpoints).
    #[arg(long, default_value_t = DEFAULT_CHECKPOINT_EVERY)]
    checkpoint_every: usize,

    /// Directory for checkpoint files.
    #[arg(long, default_value = ".")]
    checkpoint_dir: PathBuf,

    /// Also log to this file.
    #[arg(long = "log-file", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Level for the log file.
    #[arg(long = "log-file-level", value_enum, ignore_case = true, default_value = "INFO")]
    log_file_level: LogLevel,
}

impl Args {
    fn log_settings(&self) -> LogSettings {
        LogSettings {
            quiet: self.quiet,
            debug: self.debug,
            log_file: self.log_file.clone(),
            log_file_level: self.log_file_level,
        }
    }

    fn collector_options(&self) -> CollectorOptions {
        CollectorOptions {
            checkpoint_every: self.checkpoint_every,
            checkpoint_dir: self.checkpoint_dir.clone(),
            language: self.lang.clone(),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Held until exit so the file writer flushes.
    let _guard = match logging::init(&args.log_settings()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("[ERROR]: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    let taxonomy = match (&args.load_taxonomy, &args.root) {
        (Some(path), _) => persist::load(path)?,
        (None, Some(root)) => fetch(args, root)?,
        (None, None) => {
            tracing::error!("wrong number of arguments");
            tracing::info!("{}", Args::command().render_usage());
            return Ok(ExitCode::FAILURE);
        }
    };

    tracing::info!(
        "taxonomy has {} classes, depth {}, {} instances, {} abstracts",
        taxonomy.len(),
        taxonomy.depth(),
        taxonomy.instance_count(),
        taxonomy.abstract_count()
    );
    validate::validate(&taxonomy).log();
    tracing::debug!("taxonomy tree:\n{taxonomy}");

    write_outputs(args, &taxonomy);
    Ok(ExitCode::SUCCESS)
}

/// Builds the taxonomy from the endpoint and fills in instances and abstracts.
fn fetch(args: &Args, root: &str) -> Result<Taxonomy> {
    let endpoint = SparqlEndpoint::new(args.endpoint.as_str())
        .with_context(|| format!("Failed to set up SPARQL client for {}", args.endpoint))?;
    tracing::info!("querying {}", endpoint.url());

    let mut taxonomy = builder::build(&endpoint, root);
    collector::populate_instances(&mut taxonomy, &endpoint);
    collector::populate_abstracts(
        &mut taxonomy,
        &endpoint,
        &args.collector_options(),
        &LogObserver,
    );
    Ok(taxonomy)
}

/// Output failures are logged; they do not change the exit status.
fn write_outputs(args: &Args, taxonomy: &Taxonomy) {
    if let Some(dir) = &args.save_abstracts {
        match export::export_abstracts(taxonomy, dir) {
            Ok(summary) => tracing::info!(
                "wrote {} abstracts to {} ({} without abstract, {} failed)",
                summary.written,
                dir.display(),
                summary.skipped,
                summary.failed
            ),
            Err(e) => tracing::error!("{e:#}"),
        }
    }
    if let Some(path) = &args.save_turtle {
        if let Err(e) = write_turtle(taxonomy, path, &args.lang) {
            tracing::error!("{e:#}");
        }
    }
    if let Some(path) = &args.save_taxonomy {
        if let Err(e) = persist::save(taxonomy, path) {
            tracing::error!("{e}");
        }
    }
}

fn write_turtle(taxonomy: &Taxonomy, path: &Path, language: &str) -> Result<()> {
    fs::write(path, turtle::to_turtle(taxonomy, language))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("wrote Turtle to {}", path.display());
    Ok(())
}
