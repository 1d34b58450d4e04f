//! Recursive evaluation of tag tokens.
//!
//! An [`Evaluator`] resolves a [`TagToken`] against a [`TagRegistry`]:
//!
//! 1. The argument sequence is rendered first, innermost tags before outer
//!    ones, literals copied verbatim.
//! 2. The tag name is looked up. A known tag receives the rendered argument;
//!    an unknown tag is written back as a placeholder in its original
//!    bracketed form (`{name}` or `{name:argument}`).
//! 3. A failing tag function either aborts the render or is replaced by an
//!    indicator plus placeholder, depending on [`TagErrorPolicy`].
//!
//! Tags nested deeper than [`EngineConfig::max_depth`] are not evaluated;
//! their source text is emitted unchanged. The limit never exceeds
//! [`MAX_NESTING`], which keeps recursion bounded for any token tree.

use curlytag_lexer::{TagToken, Token, MAX_NESTING};

use crate::config::{EngineConfig, TagErrorPolicy};
use crate::context::Context;
use crate::error::RenderError;
use crate::registry::TagRegistry;

/// Evaluates tokens against a registry with a fixed configuration.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    registry: &'a TagRegistry,
    config: &'a EngineConfig,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator.
    pub fn new(registry: &'a TagRegistry, config: &'a EngineConfig) -> Self {
        Self { registry, config }
    }

    /// Renders a token sequence, concatenating results in order.
    pub fn render(&self, tokens: &[Token], context: &Context) -> Result<String, RenderError> {
        let mut output = String::new();
        self.render_into(&mut output, tokens, context, 1)?;
        Ok(output)
    }

    /// Evaluates a single top-level tag.
    pub fn evaluate(&self, tag: &TagToken, context: &Context) -> Result<String, RenderError> {
        self.evaluate_at(tag, context, 1)
    }

    fn depth_limit(&self) -> usize {
        self.config.max_depth.min(MAX_NESTING)
    }

    fn render_into(
        &self,
        output: &mut String,
        tokens: &[Token],
        context: &Context,
        depth: usize,
    ) -> Result<(), RenderError> {
        for token in tokens {
            match token {
                Token::Literal(text) => output.push_str(text),
                Token::Tag(tag) => output.push_str(&self.evaluate_at(tag, context, depth)?),
            }
        }
        Ok(())
    }

    fn evaluate_at(
        &self,
        tag: &TagToken,
        context: &Context,
        depth: usize,
    ) -> Result<String, RenderError> {
        if depth > self.depth_limit() {
            tracing::debug!(tag = %tag.name, depth, "nesting limit reached, emitting source");
            return Ok(tag.to_string());
        }

        let mut argument = String::new();
        self.render_into(&mut argument, tag.argument_tokens(), context, depth + 1)?;

        let Some(definition) = self.registry.lookup(&tag.name) else {
            tracing::debug!(tag = %tag.name, "unknown tag, passing through");
            return Ok(placeholder(tag, &argument));
        };

        match definition.evaluate(&argument, context) {
            Ok(output) => Ok(output),
            Err(source) => match self.config.tag_errors {
                TagErrorPolicy::Propagate => Err(RenderError::Tag {
                    name: tag.name.clone(),
                    source,
                }),
                TagErrorPolicy::Placeholder => {
                    tracing::warn!(tag = %tag.name, error = %source, "tag failed, substituting placeholder");
                    let placeholder = placeholder(tag, &argument);
                    if self.config.error_indicator.is_empty() {
                        Ok(placeholder)
                    } else {
                        Ok(format!("{} {}", self.config.error_indicator, placeholder))
                    }
                }
            },
        }
    }
}

/// Rebuilds the bracketed form of a tag around its evaluated argument.
fn placeholder(tag: &TagToken, argument: &str) -> String {
    let mut text = String::with_capacity(tag.name.len() + argument.len() + 3);
    text.push('{');
    text.push_str(&tag.name);
    if tag.has_argument() {
        text.push(':');
        text.push_str(argument);
    }
    if tag.closed {
        text.push('}');
    }
    text
}
