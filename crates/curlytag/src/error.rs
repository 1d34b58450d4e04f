//! Error types for tag evaluation and rendering.
//!
//! Rendering itself is forgiving: unknown tags and malformed braces are never
//! errors. The types here cover the failures that do exist:
//!
//! - [`ContextError`]: a tag asked the [`Context`](crate::Context) for a value
//!   that is missing or has the wrong shape
//! - [`TagError`]: a tag function could not produce output
//! - [`RegistryError`]: a definition could not be registered
//! - [`RenderError`]: a render was aborted

use thiserror::Error;

/// Failure to read a typed value out of a [`Context`](crate::Context).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The key is not present.
    #[error("context key '{key}' is missing")]
    Missing { key: String },

    /// The key is present but holds a different kind of value.
    #[error("context key '{key}' should be {expected}, found {actual}")]
    WrongType {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A value passed to [`Context::from_serialize`](crate::Context::from_serialize)
    /// did not serialize to a map.
    #[error("context data must serialize to a map, found {actual}")]
    NotAMap { actual: &'static str },

    /// Serialization of context data failed.
    #[error("context serialization failed: {message}")]
    Serialize { message: String },
}

/// Failure raised by a tag function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// Required context data was unavailable.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// The argument text could not be interpreted.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Any other failure.
    #[error("{0}")]
    Failed(String),
}

impl TagError {
    /// Creates an [`InvalidArgument`](TagError::InvalidArgument) error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        TagError::InvalidArgument {
            message: message.into(),
        }
    }
}

/// Failure to add a tag definition to a [`TagRegistry`](crate::TagRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The name or alias is already bound under the strict policy.
    #[error("tag '{name}' is already registered (bound to '{existing}')")]
    Conflict { name: String, existing: String },

    /// The name or alias could never be written inside a template.
    #[error("invalid tag name '{name}': names must be non-empty and contain no '{{', '}}' or ':'")]
    InvalidName { name: String },
}

/// Failure that aborted a render.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A tag function failed while errors are set to propagate.
    #[error("tag '{name}' failed: {source}")]
    Tag {
        name: String,
        #[source]
        source: TagError,
    },

    /// No template was added under this name.
    #[error("template not found: {0}")]
    TemplateNotFound(String),
}
