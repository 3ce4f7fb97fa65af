//! Validation error bags and their client-facing shape.
//!
//! Session layout of the `errors` entry:
//!
//! ```json
//! { "default": { "name": ["The name field is required."] },
//!   "login":   { "email": "Not a valid email address." } }
//! ```
//!
//! Each field holds one message or a list. The client receives one
//! message per field, and a lone `default` bag is unwrapped:
//!
//! ```json
//! { "name": "The name field is required." }
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::session::SessionHandle;

/// Session key holding the error bags.
pub const ERRORS_KEY: &str = "errors";

/// Bag used by forms that do not name one.
pub const DEFAULT_BAG: &str = "default";

#[derive(Debug, Error)]
pub enum ErrorBagError {
    #[error("error bags must be an object, got {0}")]
    NotAnObject(&'static str),

    #[error("bag '{bag}' must be an object of field messages")]
    BagNotAnObject { bag: String },

    #[error("bag '{bag}' field '{field}': {source}")]
    Messages {
        bag: String,
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Messages {
    One(String),
    Many(Vec<String>),
}

impl Messages {
    fn into_vec(self) -> Vec<String> {
        match self {
            Messages::One(s) => vec![s],
            Messages::Many(v) => v,
        }
    }
}

/// Messages for the fields of one form, in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessageBag {
    messages: Vec<(String, Vec<String>)>,
}

impl MessageBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message for `field`.
    pub fn add(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = field.into();
        let message = message.into();
        match self.messages.iter_mut().find(|(f, _)| *f == field) {
            Some((_, list)) => list.push(message),
            None => self.messages.push((field, vec![message])),
        }
        self
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.messages
            .iter()
            .find(|(f, _)| f == field)
            .and_then(|(_, list)| list.first())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Field → first message. Fields without messages are left out.
    pub fn firsts(&self) -> Map<String, Value> {
        self.messages
            .iter()
            .filter_map(|(field, list)| {
                list.first()
                    .map(|m| (field.clone(), Value::String(m.clone())))
            })
            .collect()
    }

    fn from_value(bag: &str, value: &Value) -> Result<Self, ErrorBagError> {
        let fields = value.as_object().ok_or_else(|| ErrorBagError::BagNotAnObject {
            bag: bag.to_string(),
        })?;

        let mut messages = Vec::with_capacity(fields.len());
        for (field, raw) in fields {
            let parsed: Messages =
                serde_json::from_value(raw.clone()).map_err(|source| ErrorBagError::Messages {
                    bag: bag.to_string(),
                    field: field.clone(),
                    source,
                })?;
            messages.push((field.clone(), parsed.into_vec()));
        }

        Ok(Self { messages })
    }

    fn to_value(&self) -> Value {
        Value::Object(
            self.messages
                .iter()
                .map(|(field, list)| (field.clone(), Value::from(list.clone())))
                .collect(),
        )
    }
}

/// All error bags flashed for the current view, keyed by bag name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewErrorBag {
    bags: Vec<(String, MessageBag)>,
}

impl ViewErrorBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the bag called `name`.
    pub fn put(mut self, name: impl Into<String>, bag: MessageBag) -> Self {
        let name = name.into();
        match self.bags.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = bag,
            None => self.bags.push((name, bag)),
        }
        self
    }

    pub fn bag(&self, name: &str) -> Option<&MessageBag> {
        self.bags.iter().find(|(n, _)| n == name).map(|(_, b)| b)
    }

    pub fn is_empty(&self) -> bool {
        self.bags.is_empty()
    }

    /// Decode the session representation.
    pub fn from_value(value: &Value) -> Result<Self, ErrorBagError> {
        let bags = value
            .as_object()
            .ok_or_else(|| ErrorBagError::NotAnObject(json_kind(value)))?;

        let mut out = Vec::with_capacity(bags.len());
        for (name, bag) in bags {
            out.push((name.clone(), MessageBag::from_value(name, bag)?));
        }
        Ok(Self { bags: out })
    }

    /// Session representation, suitable for flashing.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.bags
                .iter()
                .map(|(name, bag)| (name.clone(), bag.to_value()))
                .collect(),
        )
    }

    /// One message per field; a `default` bag standing alone is unwrapped.
    /// A `default` bag next to other bags stays nested under its name.
    pub fn to_client_shape(&self) -> Value {
        if let [(name, bag)] = self.bags.as_slice() {
            if name == DEFAULT_BAG {
                return Value::Object(bag.firsts());
            }
        }

        Value::Object(
            self.bags
                .iter()
                .map(|(name, bag)| (name.clone(), Value::Object(bag.firsts())))
                .collect(),
        )
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read the session's validation errors in client shape.
///
/// Without a session, or without errors in it, the result is `{}`.
/// Malformed error data is logged and also yields `{}`.
pub fn resolve_validation_errors(session: Option<&SessionHandle>) -> Value {
    let empty = || Value::Object(Map::new());

    let Some(session) = session else {
        return empty();
    };
    if !session.has(ERRORS_KEY) {
        return empty();
    }

    let raw = session.get(ERRORS_KEY).unwrap_or(Value::Null);
    match ViewErrorBag::from_value(&raw) {
        Ok(bags) => bags.to_client_shape(),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed validation errors in session");
            empty()
        }
    }
}
