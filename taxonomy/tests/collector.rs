//! Instance and abstract collection, checkpoints, and export.

mod common;

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use common::{ont, res, ScriptedClient};
use dbp_taxonomy::builder::build;
use dbp_taxonomy::collector::{
    populate_abstracts, populate_instances, CollectorOptions, LogObserver, Observer,
};
use dbp_taxonomy::export::export_abstracts;
use dbp_taxonomy::{persist, PersistError};

fn options(dir: &Path) -> CollectorOptions {
    CollectorOptions {
        checkpoint_dir: dir.to_path_buf(),
        ..CollectorOptions::default()
    }
}

/// Records events and re-reads every checkpoint the moment it is written.
#[derive(Default)]
struct Recorder {
    fetched: RefCell<Vec<usize>>,
    checkpoints: RefCell<Vec<(PathBuf, usize, usize)>>,
    failures: RefCell<Vec<usize>>,
}

impl Observer for Recorder {
    fn abstract_fetched(&self, count: usize) {
        self.fetched.borrow_mut().push(count);
    }

    fn checkpoint_written(&self, path: &Path, count: usize) {
        let snapshot = persist::load(path).expect("checkpoint loads");
        self.checkpoints
            .borrow_mut()
            .push((path.to_path_buf(), count, snapshot.abstract_count()));
    }

    fn checkpoint_failed(&self, _path: &Path, count: usize, _error: &PersistError) {
        self.failures.borrow_mut().push(count);
    }
}

#[test]
fn apple_abstract_reaches_fruit_and_disk() {
    let client = ScriptedClient::new()
        .instances("Fruit", &["Apple"])
        .abstract_text("Apple", "a red fruit");
    let dir = tempfile::tempdir().expect("tempdir");

    let mut tax = build(&client, ont("Fruit"));
    populate_instances(&mut tax, &client);
    populate_abstracts(&mut tax, &client, &options(dir.path()), &LogObserver);

    let fruit = tax.get(&ont("Fruit")).expect("root registered");
    assert_eq!(fruit.instance_count(), 1);
    let apple = fruit.instance(&res("Apple")).expect("member");
    assert_eq!(apple.abstract_text.as_deref(), Some("a red fruit"));

    let out = dir.path().join("abstracts");
    export_abstracts(&tax, &out).expect("export");
    assert_eq!(
        fs::read_to_string(out.join("Apple.txt")).expect("file"),
        "a red fruit"
    );
}

#[test]
fn instance_query_runs_once_per_registered_class() {
    let client = ScriptedClient::new()
        .subclasses("Food", &["Fruit", "Vegetable"])
        .instances("Food", &["Apple"])
        .instances("Fruit", &["Apple", "Pear", "Apple"])
        .instances("Vegetable", &["Leek"]);

    let mut tax = build(&client, ont("Food"));
    let summary = populate_instances(&mut tax, &client);

    assert_eq!(summary.classes_queried, 3);
    assert_eq!(summary.instances_added, 4);
    assert_eq!(tax.get(&ont("Fruit")).map(|c| c.instance_count()), Some(2));
    // Same resource in two classes: stored once per class.
    assert_eq!(tax.instance_count(), 4);
}

#[test]
fn repeated_instance_pass_adds_nothing() {
    let client = ScriptedClient::new().instances("Fruit", &["Apple", "Pear"]);
    let mut tax = build(&client, ont("Fruit"));

    populate_instances(&mut tax, &client);
    let again = populate_instances(&mut tax, &client);

    assert_eq!(again.instances_added, 0);
    assert_eq!(tax.instance_count(), 2);
}

#[test]
fn missing_or_failed_abstract_is_recorded_empty() {
    let client = ScriptedClient::new()
        .instances("Fruit", &["Apple", "Durian"])
        .failing_abstract("Apple");
    let dir = tempfile::tempdir().expect("tempdir");

    let mut tax = build(&client, ont("Fruit"));
    populate_instances(&mut tax, &client);
    let summary = populate_abstracts(&mut tax, &client, &options(dir.path()), &LogObserver);

    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.empty, 2);
    let fruit = tax.get(&ont("Fruit")).expect("root");
    for instance in fruit.instances() {
        assert_eq!(instance.abstract_text.as_deref(), Some(""));
    }
}

#[test]
fn abstract_pass_is_idempotent() {
    let client = ScriptedClient::new()
        .instances("Fruit", &["Apple", "Pear"])
        .abstract_text("Apple", "a red fruit")
        .abstract_text("Pear", "a green fruit");
    let dir = tempfile::tempdir().expect("tempdir");

    let mut tax = build(&client, ont("Fruit"));
    populate_instances(&mut tax, &client);
    populate_abstracts(&mut tax, &client, &options(dir.path()), &LogObserver);
    let after_first = client.calls_containing("dbpedia-owl:abstract");

    let second = populate_abstracts(&mut tax, &client, &options(dir.path()), &LogObserver);

    assert_eq!(after_first, 2);
    assert_eq!(client.calls_containing("dbpedia-owl:abstract"), 2);
    assert_eq!(second.fetched, 0);
    assert_eq!(second.skipped, 2);
}

#[test]
fn resumed_pass_fetches_only_missing_abstracts() {
    let client = ScriptedClient::new()
        .instances("Fruit", &["Apple", "Pear"])
        .abstract_text("Pear", "a green fruit");
    let dir = tempfile::tempdir().expect("tempdir");

    let mut tax = build(&client, ont("Fruit"));
    populate_instances(&mut tax, &client);
    let root = tax.root();
    tax.set_abstract(root, &res("Apple"), "already known");

    let path = dir.path().join("partial.json");
    persist::save(&tax, &path).expect("save");
    let mut resumed = persist::load(&path).expect("load");
    let summary = populate_abstracts(&mut resumed, &client, &options(dir.path()), &LogObserver);

    assert_eq!(summary.fetched, 1);
    assert_eq!(client.calls_containing(&res("Apple")), 0);
    let fruit = resumed.get(&ont("Fruit")).expect("root");
    assert_eq!(
        fruit.instance(&res("Apple")).and_then(|i| i.abstract_text.as_deref()),
        Some("already known")
    );
    assert_eq!(
        fruit.instance(&res("Pear")).and_then(|i| i.abstract_text.as_deref()),
        Some("a green fruit")
    );
}

#[test]
fn checkpoints_every_thousand_fetches() {
    let members: Vec<String> = (0..2500).map(|i| format!("Item_{i:04}")).collect();
    let client = ScriptedClient::new().instances_owned("Thing", &members);
    let dir = tempfile::tempdir().expect("tempdir");

    let mut tax = build(&client, ont("Thing"));
    populate_instances(&mut tax, &client);
    let recorder = Recorder::default();
    let summary = populate_abstracts(&mut tax, &client, &options(dir.path()), &recorder);

    assert_eq!(summary.fetched, 2500);
    assert_eq!(summary.checkpoints, 2);
    assert_eq!(recorder.fetched.borrow().len(), 2500);
    let checkpoints = recorder.checkpoints.borrow();
    let counts: Vec<(usize, usize)> = checkpoints.iter().map(|(_, c, a)| (*c, *a)).collect();
    assert_eq!(counts, vec![(1000, 1000), (2000, 2000)]);
    assert_eq!(checkpoints[0].0, checkpoints[1].0, "one file per pass");
    assert!(checkpoints[0].0.starts_with(dir.path()));
    assert!(recorder.failures.borrow().is_empty());
}

#[test]
fn checkpoint_failure_does_not_stop_the_pass() {
    let members: Vec<String> = (0..5).map(|i| format!("Item_{i}")).collect();
    let client = ScriptedClient::new().instances_owned("Thing", &members);
    let dir = tempfile::tempdir().expect("tempdir");
    let options = CollectorOptions {
        checkpoint_every: 2,
        checkpoint_dir: dir.path().join("does-not-exist"),
        ..CollectorOptions::default()
    };

    let mut tax = build(&client, ont("Thing"));
    populate_instances(&mut tax, &client);
    let recorder = Recorder::default();
    let summary = populate_abstracts(&mut tax, &client, &options, &recorder);

    assert_eq!(summary.fetched, 5);
    assert_eq!(summary.checkpoints, 0);
    assert_eq!(*recorder.failures.borrow(), vec![2, 4]);
    assert_eq!(tax.abstract_count(), 5);
}

#[test]
fn zero_interval_disables_checkpoints() {
    let client = ScriptedClient::new().instances("Fruit", &["Apple"]);
    let dir = tempfile::tempdir().expect("tempdir");
    let options = CollectorOptions {
        checkpoint_every: 0,
        checkpoint_dir: dir.path().to_path_buf(),
        ..CollectorOptions::default()
    };

    let mut tax = build(&client, ont("Fruit"));
    populate_instances(&mut tax, &client);
    let summary = populate_abstracts(&mut tax, &client, &options, &LogObserver);

    assert_eq!(summary.checkpoints, 0);
    assert_eq!(fs::read_dir(dir.path()).expect("dir").count(), 0);
}
