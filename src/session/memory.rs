//! In-memory session with flash data.

use serde_json::{Map, Value};
use std::sync::{Mutex, MutexGuard};

use crate::session::Session;

#[derive(Debug, Default)]
struct State {
    data: Map<String, Value>,
    /// Flashed during this request; readable on the next one.
    flash_new: Vec<String>,
    /// Flashed during the previous request; dropped when this one ends.
    flash_old: Vec<String>,
}

/// A session held in process memory.
///
/// Flash keys live for the request that set them and the one after.
/// [`MemorySession::age_flash`] is called once per request, after the
/// response is produced.
#[derive(Debug)]
pub struct MemorySession {
    id: String,
    state: Mutex<State>,
}

impl MemorySession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store a value until it is removed.
    pub fn put(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let mut state = self.state();
        state.flash_new.retain(|k| *k != key);
        state.flash_old.retain(|k| *k != key);
        state.data.insert(key, value);
    }

    /// Store a value for this request and the next.
    pub fn flash(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let mut state = self.state();
        state.data.insert(key.clone(), value);
        state.flash_old.retain(|k| *k != key);
        if !state.flash_new.contains(&key) {
            state.flash_new.push(key);
        }
    }

    pub fn forget(&self, key: &str) -> Option<Value> {
        let mut state = self.state();
        state.flash_new.retain(|k| k != key);
        state.flash_old.retain(|k| k != key);
        state.data.remove(key)
    }

    /// End-of-request bookkeeping: drop last request's flash data and
    /// mark this request's flash data as old.
    pub fn age_flash(&self) {
        let mut state = self.state();
        let old = std::mem::take(&mut state.flash_old);
        for key in &old {
            state.data.remove(key);
        }
        state.flash_old = std::mem::take(&mut state.flash_new);
    }

    pub fn all(&self) -> Map<String, Value> {
        self.state().data.clone()
    }
}

impl Session for MemorySession {
    fn has(&self, key: &str) -> bool {
        self.state()
            .data
            .get(key)
            .map(|v| !v.is_null())
            .unwrap_or(false)
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.state().data.get(key).cloned()
    }

    fn reflash(&self) {
        let mut state = self.state();
        let old = std::mem::take(&mut state.flash_old);
        for key in old {
            if !state.flash_new.contains(&key) {
                state.flash_new.push(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_and_get() {
        let session = MemorySession::new("s1");
        assert!(!session.has("user"));

        session.put("user", json!({"name": "Jonathan"}));
        assert!(session.has("user"));
        assert_eq!(session.get("user").unwrap()["name"], "Jonathan");
        assert_eq!(session.id(), "s1");
    }

    #[test]
    fn test_null_counts_as_missing() {
        let session = MemorySession::new("s1");
        session.put("errors", Value::Null);
        assert!(!session.has("errors"));
    }

    #[test]
    fn test_flash_survives_one_request() {
        let session = MemorySession::new("s1");
        session.flash("status", json!("saved"));

        // end of the request that flashed
        session.age_flash();
        assert!(session.has("status"));

        // end of the next request
        session.age_flash();
        assert!(!session.has("status"));
    }

    #[test]
    fn test_reflash_keeps_flash_for_another_request() {
        let session = MemorySession::new("s1");
        session.flash("status", json!("saved"));
        session.age_flash();

        session.reflash();
        session.age_flash();
        assert!(session.has("status"));

        session.age_flash();
        assert!(!session.has("status"));
    }

    #[test]
    fn test_put_is_permanent() {
        let session = MemorySession::new("s1");
        session.flash("k", json!(1));
        session.put("k", json!(2));
        session.age_flash();
        session.age_flash();
        assert_eq!(session.get("k"), Some(json!(2)));

        assert_eq!(session.forget("k"), Some(json!(2)));
        assert!(session.all().is_empty());
    }
}
