//! Caller-supplied side data for tag functions.
//!
//! A [`Context`] is a string-keyed map of JSON values handed to every tag
//! invocation, at every nesting level. The engine never writes to it; which
//! keys mean what is a contract between the caller and individual tags. The
//! built-in `args` tag, for instance, reads `args` and `joiner`.
//!
//! Tags read values through typed getters that report *why* a value is
//! unusable instead of panicking:
//!
//! ```rust
//! use curlytag::{Context, ContextError};
//!
//! let ctx = Context::new()
//!     .with("args", vec!["a", "b"])
//!     .with("joiner", 42);
//!
//! assert_eq!(ctx.get_str_list("args").unwrap(), vec!["a", "b"]);
//! assert!(matches!(ctx.get_str("joiner"), Err(ContextError::WrongType { .. })));
//! assert!(matches!(ctx.get_str("missing"), Err(ContextError::Missing { .. })));
//! assert_eq!(ctx.get_opt_str("missing").unwrap(), None);
//! ```

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::ContextError;

/// String-keyed, dynamically typed values available to tag functions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: HashMap<String, Value>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from any value that serializes to a map.
    ///
    /// Top-level fields become context keys.
    pub fn from_serialize<T: Serialize + ?Sized>(data: &T) -> Result<Self, ContextError> {
        let value = serde_json::to_value(data).map_err(|e| ContextError::Serialize {
            message: e.to_string(),
        })?;
        match value {
            Value::Object(map) => Ok(Self {
                values: map.into_iter().collect(),
            }),
            other => Err(ContextError::NotAMap {
                actual: kind_of(&other),
            }),
        }
    }

    /// Adds a value, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Returns the raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns true if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the context has no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    /// Reads a string value.
    pub fn get_str(&self, key: &str) -> Result<&str, ContextError> {
        self.required(key, Self::get_opt_str)
    }

    /// Reads a string value, treating a missing key as `None`.
    pub fn get_opt_str(&self, key: &str) -> Result<Option<&str>, ContextError> {
        self.typed(key, "a string", Value::as_str)
    }

    /// Reads a list of strings.
    pub fn get_str_list(&self, key: &str) -> Result<Vec<&str>, ContextError> {
        self.required(key, Self::get_opt_str_list)
    }

    /// Reads a list of strings, treating a missing key as `None`.
    pub fn get_opt_str_list(&self, key: &str) -> Result<Option<Vec<&str>>, ContextError> {
        self.typed(key, "a list of strings", |value| {
            value
                .as_array()?
                .iter()
                .map(Value::as_str)
                .collect::<Option<Vec<_>>>()
        })
    }

    /// Reads an integer value.
    pub fn get_i64(&self, key: &str) -> Result<i64, ContextError> {
        self.required(key, Self::get_opt_i64)
    }

    /// Reads an integer value, treating a missing key as `None`.
    pub fn get_opt_i64(&self, key: &str) -> Result<Option<i64>, ContextError> {
        self.typed(key, "an integer", Value::as_i64)
    }

    /// Reads a boolean value.
    pub fn get_bool(&self, key: &str) -> Result<bool, ContextError> {
        self.required(key, Self::get_opt_bool)
    }

    /// Reads a boolean value, treating a missing key as `None`.
    pub fn get_opt_bool(&self, key: &str) -> Result<Option<bool>, ContextError> {
        self.typed(key, "a boolean", Value::as_bool)
    }

    fn typed<'a, T>(
        &'a self,
        key: &str,
        expected: &'static str,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<Option<T>, ContextError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(value) => match extract(value) {
                Some(v) => Ok(Some(v)),
                None => Err(ContextError::WrongType {
                    key: key.to_string(),
                    expected,
                    actual: kind_of(value),
                }),
            },
        }
    }

    fn required<'a, T>(
        &'a self,
        key: &str,
        getter: impl FnOnce(&'a Self, &str) -> Result<Option<T>, ContextError>,
    ) -> Result<T, ContextError> {
        getter(self, key)?.ok_or_else(|| ContextError::Missing {
            key: key.to_string(),
        })
    }
}

impl From<HashMap<String, Value>> for Context {
    fn from(values: HashMap<String, Value>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Describes a JSON value's kind for error messages.
fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}
