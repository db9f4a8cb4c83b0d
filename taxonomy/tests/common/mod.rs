//! Scripted in-memory SPARQL endpoint shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use dbp_sparql::query::{self, ABSTRACT_VAR, DEFAULT_LANGUAGE, INSTANCE_VAR, SUBCLASS_VAR};
use dbp_sparql::{QueryClient, ResultSet};

/// `<http://dbpedia.org/ontology/{name}>`
pub fn ont(name: &str) -> String {
    format!("<http://dbpedia.org/ontology/{name}>")
}

/// `<http://dbpedia.org/resource/{name}>`
pub fn res(name: &str) -> String {
    format!("<http://dbpedia.org/resource/{name}>")
}

fn bare(bracketed: &str) -> String {
    bracketed
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_owned()
}

/// Answers queries from a fixed script. Unscripted queries get an empty
/// result set; scripted failures get `None`. Every call is recorded.
#[derive(Default)]
pub struct ScriptedClient {
    answers: HashMap<String, ResultSet>,
    failing: HashSet<String>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct subclasses of ontology class `class`.
    pub fn subclasses(mut self, class: &str, subclasses: &[&str]) -> Self {
        let values: Vec<String> = subclasses.iter().map(|s| bare(&ont(s))).collect();
        self.answers.insert(
            query::subclasses_of(&ont(class)),
            ResultSet::single_column(SUBCLASS_VAR, values),
        );
        self
    }

    /// The subclass query for `class` fails.
    pub fn failing_subclasses(mut self, class: &str) -> Self {
        self.failing.insert(query::subclasses_of(&ont(class)));
        self
    }

    /// Members of ontology class `class`.
    pub fn instances(mut self, class: &str, members: &[&str]) -> Self {
        let values: Vec<String> = members.iter().map(|m| bare(&res(m))).collect();
        self.answers.insert(
            query::instances_of(&ont(class)),
            ResultSet::single_column(INSTANCE_VAR, values),
        );
        self
    }

    /// Members of `class` given as a generated list.
    pub fn instances_owned(mut self, class: &str, members: &[String]) -> Self {
        let values: Vec<String> = members.iter().map(|m| bare(&res(m))).collect();
        self.answers.insert(
            query::instances_of(&ont(class)),
            ResultSet::single_column(INSTANCE_VAR, values),
        );
        self
    }

    /// English abstract of resource `name`.
    pub fn abstract_text(mut self, name: &str, text: &str) -> Self {
        self.answers.insert(
            query::abstract_of(&res(name), DEFAULT_LANGUAGE),
            ResultSet::single_column(ABSTRACT_VAR, [text]),
        );
        self
    }

    /// The abstract query for resource `name` fails.
    pub fn failing_abstract(mut self, name: &str) -> Self {
        self.failing
            .insert(query::abstract_of(&res(name), DEFAULT_LANGUAGE));
        self
    }

    /// Total number of queries executed.
    pub fn calls(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Number of executed queries containing `needle`.
    pub fn calls_containing(&self, needle: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|q| q.contains(needle))
            .count()
    }
}

impl QueryClient for ScriptedClient {
    fn execute(&self, query: &str) -> Option<ResultSet> {
        self.calls.borrow_mut().push(query.to_owned());
        if self.failing.contains(query) {
            return None;
        }
        Some(self.answers.get(query).cloned().unwrap_or_default())
    }
}
