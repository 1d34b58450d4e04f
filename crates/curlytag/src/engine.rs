//! The rendering facade.
//!
//! An [`Engine`] owns a tag registry, a configuration and a set of named,
//! pre-lexed templates. It is the usual entry point:
//!
//! ```rust
//! use curlytag::{Context, Engine, TagDefinition};
//!
//! let mut engine = Engine::new();
//! engine
//!     .register(TagDefinition::new("emptystring", |_: &str, _: &curlytag::Context| {
//!         Ok(String::new())
//!     }).with_alias("emptystr"))
//!     .unwrap();
//!
//! let ctx = Context::new().with("args", vec!["one", "two"]);
//! assert_eq!(engine.render("[{emptystr}] {upper:{args}}", &ctx).unwrap(), "[] ONE TWO");
//!
//! engine.add_template("greeting", "Hi, {capitalize:{args}}");
//! assert_eq!(engine.render_named("greeting", &ctx).unwrap(), "Hi, One two");
//! ```
//!
//! Rendering only borrows the engine, so a fully configured engine can be
//! shared across threads behind an `Arc` or a `static`.

use std::collections::HashMap;
use std::sync::Arc;

use curlytag_lexer::{lex, TagToken, Token};

use crate::builtins::builtin_tags;
use crate::config::EngineConfig;
use crate::context::Context;
use crate::error::{RegistryError, RenderError};
use crate::eval::Evaluator;
use crate::random::{RandomSource, ThreadRandom};
use crate::registry::{TagDefinition, TagRegistry};

/// Tag registry, configuration and named templates.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: TagRegistry,
    config: EngineConfig,
    templates: HashMap<String, Vec<Token>>,
}

impl Engine {
    /// Creates an engine with the built-in tags and default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with the built-in tags.
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_random(config, Arc::new(ThreadRandom))
    }

    /// Creates an engine whose random tags draw from `source`.
    ///
    /// Pass a [`SeededRandom`](crate::random::SeededRandom) for reproducible
    /// output.
    pub fn with_random(config: EngineConfig, source: Arc<dyn RandomSource>) -> Self {
        let mut engine = Self::empty_with_config(config);
        for definition in builtin_tags(source) {
            engine.registry.insert(definition);
        }
        engine
    }

    /// Creates an engine with no tags and default configuration.
    pub fn empty() -> Self {
        Self::empty_with_config(EngineConfig::default())
    }

    /// Creates an engine with no tags.
    pub fn empty_with_config(config: EngineConfig) -> Self {
        Self {
            registry: TagRegistry::with_policy(config.conflict_policy),
            config,
            templates: HashMap::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The tag registry.
    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// Adds a tag under the registry's conflict policy.
    pub fn register(&mut self, definition: TagDefinition) -> Result<(), RegistryError> {
        self.registry.register(definition)
    }

    /// Adds several tags, stopping at the first rejected one.
    pub fn register_all<I>(&mut self, definitions: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = TagDefinition>,
    {
        self.registry.register_all(definitions)
    }

    /// Lexes and renders a template string.
    pub fn render(&self, input: &str, context: &Context) -> Result<String, RenderError> {
        let tokens = lex(input);
        tracing::debug!(tokens = tokens.len(), "lexed template");
        self.render_tokens(&tokens, context)
    }

    /// Renders tokens produced by [`lex`].
    pub fn render_tokens(&self, tokens: &[Token], context: &Context) -> Result<String, RenderError> {
        self.evaluator().render(tokens, context)
    }

    /// Evaluates a single tag expression.
    pub fn evaluate(&self, tag: &TagToken, context: &Context) -> Result<String, RenderError> {
        self.evaluator().evaluate(tag, context)
    }

    /// Lexes `source` and stores it under `name`, replacing any previous
    /// template of that name.
    pub fn add_template(&mut self, name: impl Into<String>, source: &str) {
        let name = name.into();
        tracing::debug!(template = %name, "added template");
        self.templates.insert(name, lex(source));
    }

    /// Renders a template stored with [`add_template`](Self::add_template).
    pub fn render_named(&self, name: &str, context: &Context) -> Result<String, RenderError> {
        let tokens = self
            .templates
            .get(name)
            .ok_or_else(|| RenderError::TemplateNotFound(name.to_string()))?;
        self.render_tokens(tokens, context)
    }

    /// Returns `true` if a template is stored under `name`.
    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.registry, &self.config)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
