//! Shared properties: values merged into every page rendered for a request.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A zero-argument producer evaluated when the prop is rendered.
pub type LazyProp = Arc<dyn Fn() -> Value + Send + Sync>;

/// A shared prop is either a plain value or a deferred producer.
#[derive(Clone)]
pub enum PropValue {
    Value(Value),
    Lazy(LazyProp),
}

impl PropValue {
    /// Wrap a closure as a lazy prop.
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        PropValue::Lazy(Arc::new(f))
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, PropValue::Lazy(_))
    }

    /// Produce the concrete value. Lazy producers run on every call.
    pub fn resolve(&self) -> Value {
        match self {
            PropValue::Value(v) => v.clone(),
            PropValue::Lazy(f) => f(),
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
            PropValue::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl From<Value> for PropValue {
    fn from(value: Value) -> Self {
        PropValue::Value(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Value(Value::String(value.to_string()))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Value(Value::String(value))
    }
}

/// Insertion-ordered bag of shared props. Inserting an existing key
/// replaces its value in place.
#[derive(Clone, Debug, Default)]
pub struct SharedProps {
    entries: Vec<(String, PropValue)>,
}

impl SharedProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a prop.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Insert or replace a prop with a lazy producer.
    pub fn insert_lazy<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.insert(key, PropValue::lazy(f));
    }

    /// Builder form of [`SharedProps::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Merge `other` into `self`; entries from `other` win.
    pub fn merge(&mut self, other: SharedProps) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Evaluate every prop, lazy ones included.
    pub fn resolve(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.resolve()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_insert_replaces_in_place() {
        let mut props = SharedProps::new()
            .with("a", json!(1))
            .with("b", json!(2));
        props.insert("a", json!(3));

        let keys: Vec<_> = props.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(props.get("a").unwrap().resolve(), json!(3));
    }

    #[test]
    fn test_merge_prefers_incoming() {
        let mut base = SharedProps::new();
        base.insert_lazy("errors", || json!({}));

        base.merge(SharedProps::new().with("errors", "foo"));

        let errors = base.get("errors").unwrap();
        assert!(!errors.is_lazy());
        assert_eq!(errors.resolve(), json!("foo"));
    }

    #[test]
    fn test_lazy_runs_only_when_resolved() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let mut props = SharedProps::new();
        props.insert_lazy("now", move || {
            c.fetch_add(1, Ordering::SeqCst);
            json!("tick")
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let resolved = props.resolve();
        assert_eq!(resolved["now"], json!("tick"));
        props.resolve();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
