//! # curlytag - Curly-Brace Tag Templating
//!
//! `curlytag` renders text containing `{name}` and `{name:argument}` tag
//! expressions. Each tag name maps to a function that receives the
//! (already rendered) argument plus a caller-supplied [`Context`] and returns
//! replacement text. Expressions nest, so `{upper:{args}}` first renders
//! `{args}` and then upper-cases the result.
//!
//! ## Core Concepts
//!
//! - [`Engine`]: Tag registry, configuration and named templates
//! - [`TagDefinition`]: A tag function with a name and aliases
//! - [`TagRegistry`]: Name and alias lookup, with a [`ConflictPolicy`]
//! - [`Context`]: String-keyed JSON values visible to every tag
//! - [`EngineConfig`]: Error handling, nesting limit, conflict policy
//! - [`lex`]: The tokenizer, re-exported from `curlytag-lexer`
//!
//! ## Quick Start
//!
//! ```rust
//! use curlytag::{render, Context};
//!
//! let ctx = Context::new().with("args", vec!["hello", "world"]);
//!
//! assert_eq!(render("Hi, {uppercase:User}", &ctx).unwrap(), "Hi, USER");
//! assert_eq!(render("{capitalize:{args}}!", &ctx).unwrap(), "Hello world!");
//!
//! // Unknown tags pass through in their bracketed form.
//! assert_eq!(render("{unknownTag:x}", &ctx).unwrap(), "{unknownTag:x}");
//! ```
//!
//! ## Custom Tags
//!
//! ```rust
//! use curlytag::{Context, Engine, TagDefinition};
//!
//! let mut engine = Engine::new();
//! engine
//!     .register(
//!         TagDefinition::new("reverse", |arg: &str, _ctx: &Context| {
//!             Ok(arg.chars().rev().collect())
//!         })
//!         .with_alias("rev"),
//!     )
//!     .unwrap();
//!
//! assert_eq!(engine.render("{rev:{upper:abc}}", &Context::new()).unwrap(), "CBA");
//! ```
//!
//! ## Errors
//!
//! Malformed templates never fail: stray `}` is literal text and unterminated
//! expressions are still evaluated. A tag function that returns an error is,
//! by default, replaced by `(!?) {name:argument}`; set
//! [`TagErrorPolicy::Propagate`] to abort the render with [`RenderError`]
//! instead.

pub mod builtins;
pub mod config;
mod context;
mod engine;
mod error;
pub mod eval;
pub mod random;
pub mod registry;

use once_cell::sync::Lazy;

pub use config::{ConfigError, EngineConfig, TagErrorPolicy};
pub use context::Context;
pub use curlytag_lexer::{lex, TagToken, Token, MAX_NESTING};
pub use engine::Engine;
pub use error::{ContextError, RegistryError, RenderError, TagError};
pub use registry::{ConflictPolicy, TagDefinition, TagFunction, TagRegistry};

static DEFAULT_ENGINE: Lazy<Engine> = Lazy::new(Engine::new);

/// Renders a template with the built-in tags and default configuration.
///
/// Uses a shared engine built on first use. Create an [`Engine`] to add
/// tags or change settings.
pub fn render(input: &str, context: &Context) -> Result<String, RenderError> {
    DEFAULT_ENGINE.render(input, context)
}
