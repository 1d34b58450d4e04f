//! Tag definitions and the name lookup table.
//!
//! A [`TagDefinition`] pairs a name (plus optional aliases) with a
//! [`TagFunction`]. A [`TagRegistry`] maps every name and alias to its
//! definition; lookups are exact and case-sensitive.
//!
//! # Conflicts
//!
//! What happens when a name is registered twice depends on the registry's
//! [`ConflictPolicy`], fixed when the registry is created:
//!
//! | Policy | Behavior |
//! |--------|----------|
//! | [`Strict`](ConflictPolicy::Strict) (default) | Reject the whole definition if its name or any alias is bound; nothing changes |
//! | [`Overwrite`](ConflictPolicy::Overwrite) | Rebind every name and alias to the new definition |
//!
//! # Example
//!
//! ```rust
//! use curlytag::{Context, RegistryError, TagDefinition, TagRegistry};
//!
//! let mut registry = TagRegistry::new();
//! registry
//!     .register(
//!         TagDefinition::new("shout", |arg: &str, _ctx: &Context| Ok(format!("{}!", arg)))
//!             .with_alias("yell"),
//!     )
//!     .unwrap();
//!
//! let tag = registry.lookup("yell").unwrap();
//! assert_eq!(tag.name(), "shout");
//! assert_eq!(tag.evaluate("hey", &Context::new()).unwrap(), "hey!");
//!
//! let dup = TagDefinition::new("yell", |arg: &str, _ctx: &Context| Ok(arg.to_string()));
//! assert!(matches!(registry.register(dup), Err(RegistryError::Conflict { .. })));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::{RegistryError, TagError};

/// The transformation behind a tag.
///
/// Implemented for any `Fn(&str, &Context) -> Result<String, TagError>`
/// closure that is `Send + Sync`.
pub trait TagFunction: Send + Sync {
    /// Produces the tag's output from its evaluated argument.
    fn evaluate(&self, argument: &str, context: &Context) -> Result<String, TagError>;
}

impl<F> TagFunction for F
where
    F: Fn(&str, &Context) -> Result<String, TagError> + Send + Sync,
{
    fn evaluate(&self, argument: &str, context: &Context) -> Result<String, TagError> {
        (self)(argument, context)
    }
}

/// A named tag with optional aliases.
#[derive(Clone)]
pub struct TagDefinition {
    name: String,
    aliases: Vec<String>,
    function: Arc<dyn TagFunction>,
}

impl TagDefinition {
    /// Creates a definition from a closure, with no aliases.
    pub fn new<F>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&str, &Context) -> Result<String, TagError> + Send + Sync + 'static,
    {
        Self::from_function(name, function)
    }

    /// Creates a definition from any [`TagFunction`] implementation.
    pub fn from_function<F: TagFunction + 'static>(name: impl Into<String>, function: F) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            function: Arc::new(function),
        }
    }

    /// Adds an alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Adds several aliases.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// The primary name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The aliases, in registration order.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The name followed by every alias, without duplicates.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::with_capacity(self.aliases.len() + 1);
        for key in std::iter::once(&self.name).chain(&self.aliases) {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
        keys
    }

    /// Runs the tag function.
    pub fn evaluate(&self, argument: &str, context: &Context) -> Result<String, TagError> {
        self.function.evaluate(argument, context)
    }
}

impl fmt::Debug for TagDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagDefinition")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

/// How [`TagRegistry::register`] treats names that are already bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Reject the registration and keep existing bindings.
    #[default]
    Strict,
    /// Replace existing bindings silently.
    Overwrite,
}

/// Checks that a tag name can appear inside a `{...}` expression.
///
/// Names must be non-empty and free of `{`, `}` and `:`. Anything else,
/// including whitespace and upper-case letters, is allowed.
pub fn is_valid_tag_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['{', '}', ':'])
}

/// Maps tag names and aliases to their definitions.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: HashMap<String, Arc<TagDefinition>>,
    policy: ConflictPolicy,
}

impl TagRegistry {
    /// Creates an empty registry with the strict conflict policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given conflict policy.
    pub fn with_policy(policy: ConflictPolicy) -> Self {
        Self {
            tags: HashMap::new(),
            policy,
        }
    }

    /// The conflict policy in effect.
    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Binds the definition's name and aliases.
    ///
    /// Every key is validated before anything is inserted, so a rejected
    /// definition leaves the registry untouched.
    pub fn register(&mut self, definition: TagDefinition) -> Result<(), RegistryError> {
        let keys: Vec<String> = definition.keys().into_iter().map(String::from).collect();

        for key in &keys {
            if !is_valid_tag_name(key) {
                tracing::warn!(tag = %key, "rejected tag with invalid name");
                return Err(RegistryError::InvalidName { name: key.clone() });
            }
            if self.policy == ConflictPolicy::Strict {
                if let Some(existing) = self.tags.get(key) {
                    tracing::warn!(tag = %key, existing = %existing.name(), "rejected duplicate tag");
                    return Err(RegistryError::Conflict {
                        name: key.clone(),
                        existing: existing.name().to_string(),
                    });
                }
            }
        }

        tracing::debug!(tag = %definition.name(), aliases = ?definition.aliases(), "registered tag");
        self.insert(definition);
        Ok(())
    }

    /// Binds a definition without validation or conflict checks. Only for
    /// definitions known to be valid and disjoint, such as the built-ins on a
    /// fresh registry.
    pub(crate) fn insert(&mut self, definition: TagDefinition) {
        let keys: Vec<String> = definition.keys().into_iter().map(String::from).collect();
        let definition = Arc::new(definition);
        for key in keys {
            self.tags.insert(key, Arc::clone(&definition));
        }
    }

    /// Registers definitions in order, stopping at the first failure.
    ///
    /// Definitions before the failing one stay registered.
    pub fn register_all<I>(&mut self, definitions: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = TagDefinition>,
    {
        definitions
            .into_iter()
            .try_for_each(|definition| self.register(definition))
    }

    /// Finds the definition bound to a name or alias.
    pub fn lookup(&self, name: &str) -> Option<&TagDefinition> {
        self.tags.get(name).map(|definition| definition.as_ref())
    }

    /// Returns true if a name or alias is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Removes the definition bound to `name` together with all of its
    /// other names and aliases.
    pub fn unregister(&mut self, name: &str) -> Option<TagDefinition> {
        let definition = self.tags.remove(name)?;
        self.tags
            .retain(|_, other| !Arc::ptr_eq(other, &definition));
        tracing::debug!(tag = %definition.name(), "unregistered tag");
        Some(Arc::unwrap_or_clone(definition))
    }

    /// Every bound name and alias, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tags.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Number of bound names and aliases.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
