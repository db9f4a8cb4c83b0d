//! SPARQL SELECT result sets.
//!
//! Parses the W3C SPARQL 1.1 Query Results JSON format into a flat
//! variable → value-string representation. Term types, datatypes and
//! language tags are dropped; the taxonomy only ever needs the lexical value.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::QueryError;

/// The solutions of a SELECT query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    /// Projected variable names, in `head.vars` order.
    pub vars: Vec<String>,
    /// One row per solution; unbound variables are absent from the row.
    pub bindings: Vec<HashMap<String, String>>,
}

impl ResultSet {
    /// Parses a SPARQL JSON results document.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Malformed`] if `head.vars` or `results.bindings`
    /// is missing or not an array.
    pub fn from_json(value: &Value) -> Result<Self, QueryError> {
        let vars = value
            .get("head")
            .and_then(|h| h.get("vars"))
            .and_then(Value::as_array)
            .ok_or_else(|| QueryError::Malformed("missing 'head.vars'".to_owned()))?
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect();

        let bindings = value
            .get("results")
            .and_then(|r| r.get("bindings"))
            .and_then(Value::as_array)
            .ok_or_else(|| QueryError::Malformed("missing 'results.bindings'".to_owned()))?
            .iter()
            .map(|binding| {
                let mut row = HashMap::new();
                if let Some(obj) = binding.as_object() {
                    for (var, term) in obj {
                        if let Some(val) = term.get("value").and_then(Value::as_str) {
                            row.insert(var.clone(), val.to_owned());
                        }
                    }
                }
                row
            })
            .collect();

        Ok(Self { vars, bindings })
    }

    /// Parses a SPARQL JSON results document from text.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Malformed`] if `text` is not JSON or not a
    /// result set.
    pub fn from_json_str(text: &str) -> Result<Self, QueryError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| QueryError::Malformed(e.to_string()))?;
        Self::from_json(&value)
    }

    /// Builds a single-variable result set, one row per value.
    pub fn single_column<I, S>(var: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vars: vec![var.to_owned()],
            bindings: values
                .into_iter()
                .map(|v| HashMap::from([(var.to_owned(), v.into())]))
                .collect(),
        }
    }

    /// Values bound to `var`, in row order. Rows without a binding are skipped.
    pub fn values<'a>(&'a self, var: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.bindings
            .iter()
            .filter_map(move |row| row.get(var).map(String::as_str))
    }

    /// Value bound to `var` in the first row, if any.
    #[must_use]
    pub fn first(&self, var: &str) -> Option<&str> {
        self.bindings
            .first()
            .and_then(|row| row.get(var))
            .map(String::as_str)
    }

    /// Returns true if there are no solutions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Number of solutions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBCLASSES: &str = r#"{
        "head": { "link": [], "vars": ["subClass"] },
        "results": { "distinct": false, "ordered": true, "bindings": [
            { "subClass": { "type": "uri", "value": "http://dbpedia.org/ontology/Mammal" } },
            { "subClass": { "type": "uri", "value": "http://dbpedia.org/ontology/Bird" } }
        ] }
    }"#;

    #[test]
    fn parses_select_results() {
        let rs = ResultSet::from_json_str(SUBCLASSES).expect("parses");
        assert_eq!(rs.vars, vec!["subClass"]);
        assert_eq!(rs.len(), 2);
        let values: Vec<_> = rs.values("subClass").collect();
        assert_eq!(
            values,
            vec![
                "http://dbpedia.org/ontology/Mammal",
                "http://dbpedia.org/ontology/Bird"
            ]
        );
    }

    #[test]
    fn first_reads_literal_value() {
        let rs = ResultSet::from_json_str(
            r#"{"head":{"vars":["abstract"]},"results":{"bindings":[
                {"abstract":{"type":"literal","xml:lang":"en","value":"a red fruit"}},
                {"abstract":{"type":"literal","xml:lang":"en","value":"ignored"}}
            ]}}"#,
        )
        .expect("parses");
        assert_eq!(rs.first("abstract"), Some("a red fruit"));
    }

    #[test]
    fn empty_bindings_are_not_an_error() {
        let rs =
            ResultSet::from_json_str(r#"{"head":{"vars":["x"]},"results":{"bindings":[]}}"#)
                .expect("parses");
        assert!(rs.is_empty());
        assert_eq!(rs.first("x"), None);
    }

    #[test]
    fn missing_head_is_malformed() {
        let err = ResultSet::from_json_str(r#"{"results":{"bindings":[]}}"#).unwrap_err();
        assert!(matches!(err, QueryError::Malformed(_)));
    }

    #[test]
    fn ask_result_is_malformed() {
        let err = ResultSet::from_json_str(r#"{"head":{},"boolean":true}"#).unwrap_err();
        assert!(matches!(err, QueryError::Malformed(_)));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(
            ResultSet::from_json_str("<html>").unwrap_err(),
            QueryError::Malformed(_)
        ));
    }

    #[test]
    fn single_column_builds_rows() {
        let rs = ResultSet::single_column("Concept", ["a", "b"]);
        assert_eq!(rs.values("Concept").collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(rs.values("other").count(), 0);
    }
}
