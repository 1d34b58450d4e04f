//! The built-in tag set.
//!
//! | Tag | Aliases | Output |
//! |-----|---------|--------|
//! | `args` | `allargs` | Context `args` joined by context `joiner` (default `" "`) |
//! | `capitalize` | `titlecase` | Argument with its first character upper-cased |
//! | `choose` | `choice` | One of the `;`-separated choices in the argument |
//! | `range` | | Random integer in `min;max` (inclusive), or `0..=n` for a single `n` |
//! | `uppercase` | `upper` | Argument upper-cased |
//!
//! Random tags draw from the [`RandomSource`] they were built with.

use std::sync::Arc;

use serde_json::Value;

use crate::context::Context;
use crate::error::TagError;
use crate::random::{self, RandomSource};
use crate::registry::TagDefinition;

/// Output of `args` when the context carries no `args` entry.
pub const NO_ARGUMENTS: &str = "No arguments passed.";

/// Separator between choices and range bounds.
pub const LIST_SEPARATOR: char = ';';

/// Every built-in tag, with random tags drawing from `source`.
pub fn builtin_tags(source: Arc<dyn RandomSource>) -> Vec<TagDefinition> {
    vec![
        args(),
        capitalize(),
        choose(Arc::clone(&source)),
        range(source),
        uppercase(),
    ]
}

/// `{args}`: joins the context's `args` list.
pub fn args() -> TagDefinition {
    TagDefinition::new("args", |_argument: &str, context: &Context| {
        if is_unset(context, "args") {
            return Ok(NO_ARGUMENTS.to_string());
        }
        let args = context.get_str_list("args")?;
        let joiner = if is_unset(context, "joiner") {
            " "
        } else {
            context.get_str("joiner")?
        };
        Ok(args.join(joiner))
    })
    .with_alias("allargs")
}

/// `{capitalize:text}`: upper-cases the first character.
pub fn capitalize() -> TagDefinition {
    TagDefinition::new("capitalize", |argument: &str, _context: &Context| {
        let mut chars = argument.chars();
        Ok(match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        })
    })
    .with_alias("titlecase")
}

/// `{choose:a;b;c}`: picks one choice at random.
pub fn choose(source: Arc<dyn RandomSource>) -> TagDefinition {
    TagDefinition::new("choose", move |argument: &str, _context: &Context| {
        let choices: Vec<&str> = argument.split(LIST_SEPARATOR).collect();
        let choice = random::pick(source.as_ref(), &choices).copied().unwrap_or_default();
        Ok(choice.to_string())
    })
    .with_alias("choice")
}

/// `{range:min;max}` or `{range:max}`: a random integer, bounds inclusive.
pub fn range(source: Arc<dyn RandomSource>) -> TagDefinition {
    TagDefinition::new("range", move |argument: &str, _context: &Context| {
        let (low, high) = parse_bounds(argument)?;
        Ok(random::between(source.as_ref(), low, high).to_string())
    })
}

/// `{uppercase:text}`: upper-cases the whole argument.
pub fn uppercase() -> TagDefinition {
    TagDefinition::new("uppercase", |argument: &str, _context: &Context| {
        Ok(argument.to_uppercase())
    })
    .with_alias("upper")
}

fn is_unset(context: &Context, key: &str) -> bool {
    matches!(context.get(key), None | Some(Value::Null))
}

fn parse_bounds(argument: &str) -> Result<(i64, i64), TagError> {
    let parts: Vec<&str> = argument.split(LIST_SEPARATOR).map(str::trim).collect();
    match parts.as_slice() {
        [single] => Ok((0, parse_bound(single)?)),
        [low, high] => Ok((parse_bound(low)?, parse_bound(high)?)),
        _ => Err(TagError::invalid_argument(format!(
            "expected 'max' or 'min{}max', got '{}'",
            LIST_SEPARATOR, argument
        ))),
    }
}

fn parse_bound(text: &str) -> Result<i64, TagError> {
    text.parse()
        .map_err(|_| TagError::invalid_argument(format!("'{}' is not an integer", text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContextError;
    use serde_json::json;

    fn call(definition: &TagDefinition, argument: &str, context: &Context) -> Result<String, TagError> {
        definition.evaluate(argument, context)
    }

    fn first() -> Arc<dyn RandomSource> {
        Arc::new(|_upper: u64| 0u64)
    }

    fn last() -> Arc<dyn RandomSource> {
        Arc::new(|upper: u64| upper - 1)
    }

    // ==================== args ====================

    #[test]
    fn args_joined_with_space() {
        let ctx = Context::new().with("args", vec!["a", "b", "c"]);
        assert_eq!(call(&args(), "", &ctx).unwrap(), "a b c");
    }

    #[test]
    fn args_custom_joiner() {
        let ctx = Context::new()
            .with("args", vec!["a", "b", "c"])
            .with("joiner", ";");
        assert_eq!(call(&args(), "", &ctx).unwrap(), "a;b;c");
    }

    #[test]
    fn args_missing() {
        assert_eq!(call(&args(), "", &Context::new()).unwrap(), NO_ARGUMENTS);
        let ctx = Context::new().with("args", json!(null));
        assert_eq!(call(&args(), "", &ctx).unwrap(), NO_ARGUMENTS);
    }

    #[test]
    fn args_empty_list() {
        let ctx = Context::new().with("args", Vec::<String>::new());
        assert_eq!(call(&args(), "", &ctx).unwrap(), "");
    }

    #[test]
    fn args_wrong_type() {
        let ctx = Context::new().with("args", "a b c");
        let err = call(&args(), "", &ctx).unwrap_err();
        assert!(matches!(
            err,
            TagError::Context(ContextError::WrongType { actual: "a string", .. })
        ));
    }

    #[test]
    fn args_wrong_joiner_type() {
        let ctx = Context::new().with("args", vec!["a"]).with("joiner", 5);
        assert!(call(&args(), "", &ctx).is_err());
    }

    #[test]
    fn args_alias() {
        assert_eq!(args().aliases(), &["allargs".to_string()]);
    }

    // ==================== capitalize / uppercase ====================

    #[test]
    fn capitalize_first_letter() {
        let ctx = Context::new();
        assert_eq!(call(&capitalize(), "abc", &ctx).unwrap(), "Abc");
        assert_eq!(call(&capitalize(), "Abc", &ctx).unwrap(), "Abc");
        assert_eq!(call(&capitalize(), "a", &ctx).unwrap(), "A");
        assert_eq!(call(&capitalize(), "éa", &ctx).unwrap(), "Éa");
    }

    #[test]
    fn capitalize_empty() {
        assert_eq!(call(&capitalize(), "", &Context::new()).unwrap(), "");
    }

    #[test]
    fn uppercase_whole_argument() {
        let ctx = Context::new();
        assert_eq!(call(&uppercase(), "HI", &ctx).unwrap(), "HI");
        assert_eq!(call(&uppercase(), "mixed Case 1", &ctx).unwrap(), "MIXED CASE 1");
    }

    // ==================== choose ====================

    #[test]
    fn choose_uses_random_source() {
        let ctx = Context::new();
        assert_eq!(call(&choose(first()), "red;green;blue", &ctx).unwrap(), "red");
        assert_eq!(call(&choose(last()), "red;green;blue", &ctx).unwrap(), "blue");
    }

    #[test]
    fn choose_single_and_empty() {
        let ctx = Context::new();
        assert_eq!(call(&choose(last()), "only", &ctx).unwrap(), "only");
        assert_eq!(call(&choose(last()), "", &ctx).unwrap(), "");
    }

    #[test]
    fn choose_seeded_is_member() {
        let tag = choose(Arc::new(random::SeededRandom::new(9)));
        for _ in 0..20 {
            let picked = call(&tag, "x;y;z", &Context::new()).unwrap();
            assert!(["x", "y", "z"].contains(&picked.as_str()));
        }
    }

    // ==================== range ====================

    #[test]
    fn range_two_bounds() {
        let ctx = Context::new();
        assert_eq!(call(&range(first()), "1;10", &ctx).unwrap(), "1");
        assert_eq!(call(&range(last()), "1;10", &ctx).unwrap(), "10");
    }

    #[test]
    fn range_single_bound() {
        let ctx = Context::new();
        assert_eq!(call(&range(first()), "5", &ctx).unwrap(), "0");
        assert_eq!(call(&range(last()), "5", &ctx).unwrap(), "5");
    }

    #[test]
    fn range_reversed_and_negative() {
        let ctx = Context::new();
        assert_eq!(call(&range(first()), "3;-3", &ctx).unwrap(), "-3");
        assert_eq!(call(&range(last()), " -10 ; -2 ", &ctx).unwrap(), "-2");
    }

    #[test]
    fn range_invalid_arguments() {
        let ctx = Context::new();
        for bad in ["", "abc", "1;x", "1;2;3", "1.5;2"] {
            let err = call(&range(first()), bad, &ctx).unwrap_err();
            assert!(matches!(err, TagError::InvalidArgument { .. }), "{}", bad);
        }
    }

    #[test]
    fn range_seeded_within_bounds() {
        let tag = range(Arc::new(random::SeededRandom::new(1)));
        for _ in 0..50 {
            let value: i64 = call(&tag, "-2;2", &Context::new()).unwrap().parse().unwrap();
            assert!((-2..=2).contains(&value));
        }
    }

    // ==================== set ====================

    #[test]
    fn builtin_names() {
        let tags = builtin_tags(first());
        let names: Vec<&str> = tags.iter().map(TagDefinition::name).collect();
        assert_eq!(names, vec!["args", "capitalize", "choose", "range", "uppercase"]);
    }
}
