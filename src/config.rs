//! Resolved configuration
//!
//! [`ResolvedConfiguration`] maps field names to concrete values. It only
//! holds fields whose activation predicate was true when the resolver
//! reached them, so "absent" always means "not activated", never "unset".
//! The resolver builds it one field at a time; everything downstream gets a
//! shared reference and cannot change it.

use crate::types::{Source, Value};
use std::collections::BTreeMap;

/// Field values resolved for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    values: BTreeMap<String, Value>,
    order: Vec<String>,
    sources: BTreeMap<String, Source>,
}

impl ResolvedConfiguration {
    /// Empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration directly from values, e.g. in tests or when
    /// values come from somewhere other than the resolver.
    pub fn from_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut config = Self::new();
        for (name, value) in values {
            config.insert(name.into(), value.into(), Source::Default);
        }
        config
    }

    pub(crate) fn insert(&mut self, name: String, value: Value, source: Source) {
        if !self.values.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.sources.insert(name.clone(), source);
        self.values.insert(name, value);
    }

    /// Whether `name` was activated and resolved
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Boolean value of `name`; `false` when absent or not a boolean.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Text value of `name`, if present and textual.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Text value of `name` when present and not blank.
    pub fn non_empty_text(&self, name: &str) -> Option<&str> {
        self.text(name).filter(|s| !s.trim().is_empty())
    }

    /// Which source supplied `name`
    pub fn source(&self, name: &str) -> Option<Source> {
        self.sources.get(name).copied()
    }

    /// Field names in the order they were resolved
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let config = ResolvedConfiguration::from_values([
            ("hostname", Value::from("nodeA")),
            ("use_static", Value::from(true)),
            ("user_password", Value::from("")),
        ]);

        assert_eq!(config.text("hostname"), Some("nodeA"));
        assert!(config.flag("use_static"));
        assert!(!config.flag("use_wireless"));
        assert!(!config.flag("hostname"));
        assert_eq!(config.text("use_static"), None);
        assert_eq!(config.non_empty_text("user_password"), None);
        assert!(config.contains("user_password"));
        assert!(!config.contains("ssid"));
        assert_eq!(config.len(), 3);
    }

    #[test]
    fn test_names_keep_insertion_order() {
        let mut config = ResolvedConfiguration::new();
        config.insert("b".into(), Value::from(true), Source::Flag);
        config.insert("a".into(), Value::from("x"), Source::Prompt);
        config.insert("b".into(), Value::from(false), Source::Default);

        let names: Vec<&str> = config.names().collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(config.source("b"), Some(Source::Default));
        assert_eq!(config.source("a"), Some(Source::Prompt));
    }
}
