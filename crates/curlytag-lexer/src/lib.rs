//! Lexer for curly-brace tag templates.
//!
//! This crate turns template text such as `Hi, {upper:{args}}!` into an
//! ordered sequence of [`Token`]s. Literal text is kept verbatim and every
//! `{...}` expression becomes a [`TagToken`] whose argument is itself a full
//! token sequence, so expressions can nest to any depth and sit side by side
//! inside a single argument.
//!
//! # Example
//!
//! ```rust
//! use curlytag_lexer::{lex, Token, TagToken};
//!
//! let tokens = lex("Hi, {upper:{name}}!");
//!
//! assert_eq!(
//!     tokens,
//!     vec![
//!         Token::literal("Hi, "),
//!         Token::Tag(TagToken::new("upper").with_argument(vec![
//!             Token::Tag(TagToken::new("name")),
//!         ])),
//!         Token::literal("!"),
//!     ]
//! );
//!
//! // Tokens print back to the exact source text.
//! let source: String = tokens.iter().map(|t| t.to_string()).collect();
//! assert_eq!(source, "Hi, {upper:{name}}!");
//! ```
//!
//! # Syntax
//!
//! - `{name}` - a tag without an argument
//! - `{name:argument}` - everything after the first `:` is the argument,
//!   later colons included
//! - `{name:{inner}}` - the argument may contain further tag expressions
//! - `{name{inner}}` - a nested expression directly after the name also
//!   starts the argument
//!
//! There is no escaping. Malformed input never fails to lex:
//!
//! - A `}` outside any expression is ordinary literal text.
//! - Expressions still open at the end of input are emitted with
//!   [`TagToken::closed`] set to `false`.
//! - Braces nested deeper than [`MAX_NESTING`] are argument text of the
//!   innermost expression.

use std::fmt;

/// A top-level or nested piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Text copied verbatim to the output.
    Literal(String),
    /// A `{name}` or `{name:argument}` expression.
    Tag(TagToken),
}

impl Token {
    /// Creates a literal token.
    pub fn literal(text: impl Into<String>) -> Self {
        Token::Literal(text.into())
    }

    /// Returns `true` if this is a literal token.
    pub fn is_literal(&self) -> bool {
        matches!(self, Token::Literal(_))
    }

    /// Returns `true` if this is a tag expression.
    pub fn is_tag(&self) -> bool {
        matches!(self, Token::Tag(_))
    }

    /// Returns the literal text, if this is a literal token.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Token::Literal(text) => Some(text),
            Token::Tag(_) => None,
        }
    }

    /// Returns the tag expression, if this is a tag token.
    pub fn as_tag(&self) -> Option<&TagToken> {
        match self {
            Token::Tag(tag) => Some(tag),
            Token::Literal(_) => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(text) => f.write_str(text),
            Token::Tag(tag) => tag.fmt(f),
        }
    }
}

/// A single tag expression.
///
/// The argument is an ordered token sequence rather than plain text, so
/// `{join:{a}, {b}}` keeps both nested expressions and the literal between
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken {
    /// Text typed before the first `:` or nested `{`.
    pub name: String,
    /// Whether the name was followed by a `:` separator.
    pub colon: bool,
    /// The argument sequence. `None` when the expression had neither a
    /// separator nor a nested expression.
    pub argument: Option<Vec<Token>>,
    /// Whether a matching `}` was found before the end of input.
    pub closed: bool,
}

impl TagToken {
    /// Creates a closed tag with no argument.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            colon: false,
            argument: None,
            closed: true,
        }
    }

    /// Sets a `:`-separated argument.
    pub fn with_argument(mut self, argument: Vec<Token>) -> Self {
        self.colon = true;
        self.argument = Some(argument);
        self
    }

    /// Marks the tag as unterminated.
    pub fn unclosed(mut self) -> Self {
        self.closed = false;
        self
    }

    /// Returns `true` if the expression carries an argument.
    pub fn has_argument(&self) -> bool {
        self.argument.is_some()
    }

    /// The argument tokens, empty when there is no argument.
    pub fn argument_tokens(&self) -> &[Token] {
        self.argument.as_deref().unwrap_or(&[])
    }
}

impl fmt::Display for TagToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Step<'a> {
            Open(&'a TagToken),
            Text(&'a str),
            Close,
        }

        // Walked with an explicit stack; hand-built trees may nest arbitrarily.
        let mut steps = vec![Step::Open(self)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Text(text) => f.write_str(text)?,
                Step::Close => f.write_str("}")?,
                Step::Open(tag) => {
                    f.write_str("{")?;
                    f.write_str(&tag.name)?;
                    if tag.colon {
                        f.write_str(":")?;
                    }
                    if tag.closed {
                        steps.push(Step::Close);
                    }
                    steps.extend(tag.argument_tokens().iter().rev().map(|token| match token {
                        Token::Literal(text) => Step::Text(text),
                        Token::Tag(child) => Step::Open(child),
                    }));
                }
            }
        }
        Ok(())
    }
}

impl Drop for TagToken {
    fn drop(&mut self) {
        let Some(mut pending) = self.argument.take() else {
            return;
        };
        // Detach nested arguments before each child drops so dropping never
        // recurses more than one level.
        while let Some(token) = pending.pop() {
            if let Token::Tag(mut child) = token {
                if let Some(argument) = child.argument.take() {
                    pending.extend(argument);
                }
            }
        }
    }
}

/// Deepest expression nesting the lexer builds.
///
/// A `{` opened deeper than this is not treated as an expression: it and
/// its matching `}` become argument text of the innermost expression, so
/// the token tree stays shallow enough to walk recursively.
pub const MAX_NESTING: usize = 256;

/// Splits `input` into top-level tokens.
///
/// Adjacent literal characters are merged into one [`Token::Literal`];
/// nested expressions are only reachable through their parent's argument.
/// An empty input produces an empty sequence.
pub fn lex(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::default();
    for c in input.chars() {
        lexer.push(c);
    }
    lexer.finish()
}

/// An expression that has been opened but not yet closed.
#[derive(Debug, Default)]
struct Frame {
    name: String,
    colon: bool,
    argument: Option<Vec<Token>>,
    /// Argument text not yet flushed into `argument`.
    text: String,
}

impl Frame {
    fn in_argument(&self) -> bool {
        self.argument.is_some()
    }

    fn push_char(&mut self, c: char) {
        if self.in_argument() {
            self.text.push(c);
        } else {
            self.name.push(c);
        }
    }

    /// Appends argument text, switching to argument mode if needed.
    fn push_text(&mut self, c: char) {
        self.argument.get_or_insert_with(Vec::new);
        self.text.push(c);
    }

    fn flush_text(&mut self) -> &mut Vec<Token> {
        let argument = self.argument.get_or_insert_with(Vec::new);
        if !self.text.is_empty() {
            argument.push(Token::Literal(std::mem::take(&mut self.text)));
        }
        argument
    }

    fn push_child(&mut self, child: TagToken) {
        self.flush_text().push(Token::Tag(child));
    }

    fn finish(mut self, closed: bool) -> TagToken {
        if self.in_argument() {
            self.flush_text();
        }
        TagToken {
            name: self.name,
            colon: self.colon,
            argument: self.argument,
            closed,
        }
    }
}

/// Single-pass scanner state. Open expressions live on `stack`; the last
/// frame is the one currently accumulating characters.
#[derive(Debug, Default)]
struct Lexer {
    tokens: Vec<Token>,
    literal: String,
    stack: Vec<Frame>,
    /// Braces opened past [`MAX_NESTING`] and not yet closed. They are kept
    /// as argument text of the innermost frame.
    overflow: usize,
}

impl Lexer {
    fn push(&mut self, c: char) {
        match c {
            '{' => self.open(),
            '}' => self.close(),
            ':' => match self.stack.last_mut() {
                Some(frame) if !frame.in_argument() => {
                    frame.colon = true;
                    frame.argument = Some(Vec::new());
                }
                Some(frame) => frame.push_char(c),
                None => self.literal.push(c),
            },
            _ => match self.stack.last_mut() {
                Some(frame) => frame.push_char(c),
                None => self.literal.push(c),
            },
        }
    }

    fn open(&mut self) {
        if self.stack.len() >= MAX_NESTING {
            if let Some(frame) = self.stack.last_mut() {
                frame.push_text('{');
            }
            self.overflow += 1;
            return;
        }
        match self.stack.last_mut() {
            // Descend: the parent stops collecting its name and keeps the
            // child in its argument once the child closes.
            Some(parent) => {
                parent.flush_text();
            }
            None => self.flush_literal(),
        }
        self.stack.push(Frame::default());
    }

    fn close(&mut self) {
        if self.overflow > 0 {
            self.overflow -= 1;
            if let Some(frame) = self.stack.last_mut() {
                frame.push_text('}');
            }
            return;
        }
        match self.stack.pop() {
            Some(frame) => self.attach(frame.finish(true)),
            None => self.literal.push('}'),
        }
    }

    fn attach(&mut self, tag: TagToken) {
        match self.stack.last_mut() {
            Some(parent) => parent.push_child(tag),
            None => self.tokens.push(Token::Tag(tag)),
        }
    }

    fn flush_literal(&mut self) {
        if !self.literal.is_empty() {
            self.tokens
                .push(Token::Literal(std::mem::take(&mut self.literal)));
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush_literal();
        while let Some(frame) = self.stack.pop() {
            let tag = frame.finish(false);
            self.attach(tag);
        }
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> Token {
        Token::Tag(TagToken::new(name))
    }

    fn tag_with(name: &str, argument: Vec<Token>) -> Token {
        Token::Tag(TagToken::new(name).with_argument(argument))
    }

    fn source(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    // ==================== Flat Input ====================

    mod flat {
        use super::*;

        #[test]
        fn empty_input() {
            assert_eq!(lex(""), vec![]);
        }

        #[test]
        fn plain_text() {
            assert_eq!(lex("hello world"), vec![Token::literal("hello world")]);
        }

        #[test]
        fn single_tag() {
            assert_eq!(lex("{args}"), vec![tag("args")]);
        }

        #[test]
        fn tag_with_argument() {
            assert_eq!(
                lex("{capitalize:abc}"),
                vec![tag_with("capitalize", vec![Token::literal("abc")])]
            );
        }

        #[test]
        fn empty_argument() {
            assert_eq!(lex("{upper:}"), vec![tag_with("upper", vec![])]);
        }

        #[test]
        fn text_around_tags() {
            assert_eq!(
                lex("Hi, {upper:User}!"),
                vec![
                    Token::literal("Hi, "),
                    tag_with("upper", vec![Token::literal("User")]),
                    Token::literal("!"),
                ]
            );
        }

        #[test]
        fn adjacent_tags() {
            assert_eq!(lex("{a}{b}"), vec![tag("a"), tag("b")]);
        }

        #[test]
        fn later_colons_stay_in_argument() {
            assert_eq!(
                lex("{range:1:10}"),
                vec![tag_with("range", vec![Token::literal("1:10")])]
            );
        }

        #[test]
        fn colon_outside_tag_is_literal() {
            assert_eq!(lex("a:b"), vec![Token::literal("a:b")]);
        }

        #[test]
        fn multibyte_text() {
            assert_eq!(
                lex("ünï {upper:çødé} ✓"),
                vec![
                    Token::literal("ünï "),
                    tag_with("upper", vec![Token::literal("çødé")]),
                    Token::literal(" ✓"),
                ]
            );
        }
    }

    // ==================== Nesting ====================

    mod nesting {
        use super::*;

        #[test]
        fn nested_argument() {
            assert_eq!(
                lex("{outer:{inner}}"),
                vec![tag_with("outer", vec![tag("inner")])]
            );
        }

        #[test]
        fn nested_without_colon_starts_argument() {
            let tokens = lex("{outer{inner}}");
            let outer = tokens[0].as_tag().unwrap();
            assert_eq!(outer.name, "outer");
            assert!(!outer.colon);
            assert_eq!(outer.argument_tokens(), &[tag("inner")]);
        }

        #[test]
        fn sibling_nested_tags() {
            assert_eq!(
                lex("{upper:{a}-{b}}"),
                vec![tag_with(
                    "upper",
                    vec![tag("a"), Token::literal("-"), tag("b")]
                )]
            );
        }

        #[test]
        fn text_before_and_after_child() {
            assert_eq!(
                lex("{upper:x{a}y}"),
                vec![tag_with(
                    "upper",
                    vec![Token::literal("x"), tag("a"), Token::literal("y")]
                )]
            );
        }

        #[test]
        fn deeply_nested() {
            assert_eq!(
                lex("{a:{b:{c:deep}}}"),
                vec![tag_with(
                    "a",
                    vec![tag_with("b", vec![tag_with("c", vec![Token::literal("deep")])])]
                )]
            );
        }

        #[test]
        fn nested_tags_are_not_top_level() {
            let tokens = lex("x{a:{b}}y");
            assert_eq!(tokens.len(), 3);
            assert!(tokens[0].is_literal());
            assert!(tokens[1].is_tag());
            assert!(tokens[2].is_literal());
        }
    }

    // ==================== Malformed Input ====================

    mod malformed {
        use super::*;

        fn depth(tokens: &[Token]) -> usize {
            let mut deepest = 0;
            let mut level: Vec<(&[Token], usize)> = vec![(tokens, 1)];
            while let Some((tokens, d)) = level.pop() {
                for tag in tokens.iter().filter_map(Token::as_tag) {
                    deepest = deepest.max(d);
                    level.push((tag.argument_tokens(), d + 1));
                }
            }
            deepest
        }

        #[test]
        fn nesting_is_capped() {
            let input = format!("{}{}", "{a:".repeat(MAX_NESTING + 3), "}".repeat(MAX_NESTING + 3));
            let tokens = lex(&input);
            assert_eq!(depth(&tokens), MAX_NESTING);
            let rebuilt: String = tokens.iter().map(|t| t.to_string()).collect();
            assert_eq!(rebuilt, input);
        }

        #[test]
        fn braces_past_cap_are_innermost_text() {
            let input = format!("{}{{b:x}}{}", "{a:".repeat(MAX_NESTING), "}".repeat(MAX_NESTING));
            let tokens = lex(&input);

            let mut innermost = tokens[0].as_tag().unwrap();
            while let Some(child) = innermost.argument_tokens().iter().find_map(Token::as_tag) {
                innermost = child;
            }
            assert_eq!(innermost.argument_tokens(), &[Token::literal("{b:x}")]);
            assert!(innermost.closed);
        }

        #[test]
        fn brace_past_cap_in_name_starts_argument() {
            let input = format!("{}b{{c}}", "{a:".repeat(MAX_NESTING - 1) + "{");
            let tokens = lex(&input);
            let rebuilt: String = tokens.iter().map(|t| t.to_string()).collect();
            assert_eq!(rebuilt, input);
        }

        #[test]
        fn stray_close_brace_is_literal() {
            assert_eq!(lex("a}b"), vec![Token::literal("a}b")]);
        }

        #[test]
        fn stray_close_after_tag() {
            assert_eq!(lex("{a}}"), vec![tag("a"), Token::literal("}")]);
        }

        #[test]
        fn unterminated_tag_is_emitted() {
            assert_eq!(
                lex("Hello {name"),
                vec![
                    Token::literal("Hello "),
                    Token::Tag(TagToken::new("name").unclosed()),
                ]
            );
        }

        #[test]
        fn unterminated_nested_tags() {
            let tokens = lex("{a:{b:x");
            assert_eq!(
                tokens,
                vec![Token::Tag(
                    TagToken::new("a")
                        .with_argument(vec![Token::Tag(
                            TagToken::new("b")
                                .with_argument(vec![Token::literal("x")])
                                .unclosed()
                        )])
                        .unclosed()
                )]
            );
        }

        #[test]
        fn lone_open_brace() {
            assert_eq!(lex("{"), vec![Token::Tag(TagToken::new("").unclosed())]);
        }

        #[test]
        fn empty_tag() {
            assert_eq!(lex("{}"), vec![tag("")]);
        }

        #[test]
        fn close_brace_last_character() {
            assert_eq!(lex("x{a}"), vec![Token::literal("x"), tag("a")]);
        }
    }

    // ==================== Display ====================

    mod display {
        use super::*;

        #[test]
        fn reproduces_source() {
            for input in [
                "plain",
                "{a}",
                "{a:}",
                "x {a:b:c} y",
                "{outer{inner}}",
                "{a:{b}-{c}}",
                "} {open",
                "{a:{b:",
            ] {
                assert_eq!(source(&lex(input)), input);
            }
        }

        #[test]
        fn hand_built_deep_tree_displays_and_drops() {
            let mut tag = TagToken::new("leaf");
            for _ in 0..200_000 {
                tag = TagToken::new("n").with_argument(vec![Token::Tag(tag)]);
            }
            let text = tag.to_string();
            assert_eq!(text.len(), 200_000 * 4 + "{leaf}".len());
            assert!(text.starts_with("{n:{n:"));
            assert!(text.ends_with("{leaf}}}"));
            drop(tag);
        }

        #[test]
        fn unclosed_tag_omits_brace() {
            assert_eq!(TagToken::new("x").unclosed().to_string(), "{x");
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    // Plain text without braces
    fn plain_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 .,!?:;'\"]{0,50}"
    }

    // Mostly-brace soup to exercise nesting and malformed input
    fn template_soup() -> impl Strategy<Value = String> {
        "[ab:{}; ]{0,40}"
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn plain_text_is_one_literal(content in plain_text()) {
            let tokens = lex(&content);
            if content.is_empty() {
                prop_assert!(tokens.is_empty());
            } else {
                prop_assert_eq!(tokens, vec![Token::Literal(content)]);
            }
        }

        #[test]
        fn display_reproduces_any_input(input in any::<String>()) {
            let rebuilt: String = lex(&input).iter().map(|t| t.to_string()).collect();
            prop_assert_eq!(rebuilt, input);
        }

        #[test]
        fn display_reproduces_brace_soup(input in template_soup()) {
            let rebuilt: String = lex(&input).iter().map(|t| t.to_string()).collect();
            prop_assert_eq!(rebuilt, input);
        }

        #[test]
        fn no_adjacent_literals(input in template_soup()) {
            let tokens = lex(&input);
            for pair in tokens.windows(2) {
                prop_assert!(!(pair[0].is_literal() && pair[1].is_literal()));
            }
        }

        #[test]
        fn simple_tag_structure(name in "[a-z_][a-z0-9_-]{0,10}", arg in plain_text()) {
            let arg = arg.replace(':', "");
            let input = format!("{{{}:{}}}", name, arg);
            let tokens = lex(&input);
            prop_assert_eq!(tokens.len(), 1);
            let tag = tokens[0].as_tag().unwrap();
            prop_assert_eq!(&tag.name, &name);
            prop_assert!(tag.closed);
            let rebuilt: String = tag.argument_tokens().iter().map(|t| t.to_string()).collect();
            prop_assert_eq!(rebuilt, arg);
        }
    }
}
