// crates/contract-gate-core/src/parse.rs
// ============================================================================
// Module: Contract Gate Text Parsing
// Description: Pattern-guided conversion of wire and example text into values.
// Purpose: Read query/header/path strings, example cells, and XML text as typed values.
// Dependencies: serde_json, crate::{error, matcher, pattern, resolver, value}
// ============================================================================

//! ## Overview
//! Wire text has no type of its own; the pattern it is destined for decides
//! how it is read. Numbers are parsed with arbitrary precision, objects and
//! lists are read as JSON, and unions try their members in declaration order,
//! preferring the first member whose parsed value also matches.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::error::ParseError;
use crate::matcher::match_value;
use crate::pattern::Pattern;
use crate::pattern::PrimitivePattern;
use crate::resolver::Resolver;
use crate::value::Value;

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses text into a value shaped by `pattern`.
///
/// # Errors
///
/// Returns [`ParseError`] when the text cannot be read as the pattern's shape.
pub fn parse_text(text: &str, pattern: &Pattern, resolver: &mut Resolver) -> Result<Value, ParseError> {
    match pattern {
        Pattern::Primitive(primitive) => parse_primitive(text, primitive),
        Pattern::Exact(expected) => Ok(parse_like(text, expected)),
        Pattern::Enum(values) => Ok(values
            .iter()
            .find(|value| value.display_text() == text)
            .cloned()
            .unwrap_or_else(|| Value::string(text))),
        Pattern::Null => match text.trim() {
            "" | "null" => Ok(Value::Null),
            _ => Err(ParseError::new(text, "null")),
        },
        Pattern::NoBody => {
            if text.trim().is_empty() {
                Ok(Value::NoBody)
            } else {
                Err(ParseError::new(text, "no body"))
            }
        }
        Pattern::ListOf(list) => parse_list(text, &list.item, resolver),
        Pattern::Object(_) => match parse_json(text)? {
            object @ Value::Object(_) => Ok(object),
            _ => Err(ParseError::new(text, "object")),
        },
        Pattern::AnyOf(union) => {
            let mut first_parsed = None;
            for member in &union.members {
                let Ok(parsed) = parse_text(text, member, resolver) else {
                    continue;
                };
                if match_value(&parsed, member, resolver).is_success() {
                    return Ok(parsed);
                }
                if first_parsed.is_none() {
                    first_parsed = Some(parsed);
                }
            }
            first_parsed.ok_or_else(|| ParseError::new(text, pattern.describe()))
        }
        Pattern::Ref(name) => {
            if !resolver.enter_parse(name, text) {
                return Err(ParseError::new(text, format!("({name})")));
            }
            let parsed = match resolver.resolve_deep(pattern) {
                Some(resolved) => parse_text(text, &resolved, resolver),
                None => Err(ParseError::new(text, format!("({name})"))),
            };
            resolver.exit_parse();
            parsed
        }
        Pattern::Xml(element) => Err(ParseError::new(text, format!("<{}> element", element.name))),
    }
}

/// Parses text for a primitive.
fn parse_primitive(text: &str, primitive: &PrimitivePattern) -> Result<Value, ParseError> {
    match primitive {
        PrimitivePattern::String(_) => Ok(Value::string(text)),
        PrimitivePattern::Number(_) => {
            Value::decimal(text).ok_or_else(|| ParseError::new(text, primitive.describe()))
        }
        PrimitivePattern::Boolean => match text.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(ParseError::new(text, "boolean")),
        },
    }
}

/// Parses text with the same type as an expected literal, falling back to a string.
fn parse_like(text: &str, expected: &Value) -> Value {
    match expected {
        Value::Number(_) => Value::decimal(text).unwrap_or_else(|| Value::string(text)),
        Value::Bool(_) => match text.trim() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::string(text),
        },
        Value::Null if text.trim() == "null" => Value::Null,
        Value::List(_) | Value::Object(_) => parse_json(text).unwrap_or_else(|_| Value::string(text)),
        _ => Value::string(text),
    }
}

/// Parses a list from JSON array text or comma-separated items.
fn parse_list(text: &str, item: &Pattern, resolver: &mut Resolver) -> Result<Value, ParseError> {
    let trimmed = text.trim();
    if trimmed.starts_with('[') {
        return match parse_json(trimmed)? {
            list @ Value::List(_) => Ok(list),
            _ => Err(ParseError::new(text, "list")),
        };
    }
    if trimmed.is_empty() {
        return Ok(Value::List(Vec::new()));
    }
    let items = trimmed
        .split(',')
        .map(|part| parse_text(part.trim(), item, resolver))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::List(items))
}

/// Parses JSON text.
fn parse_json(text: &str) -> Result<Value, ParseError> {
    serde_json::from_str::<serde_json::Value>(text)
        .map(Value::from)
        .map_err(|err| ParseError::new(text, format!("JSON ({err})")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use std::sync::Arc;

    use super::*;
    use crate::registry::PatternRegistry;

    fn resolver() -> Resolver {
        Resolver::with_defaults(Arc::new(PatternRegistry::new()))
    }

    #[test]
    fn numbers_keep_precision() {
        let parsed = parse_text("0.1000000000000000000001", &Pattern::number(), &mut resolver());
        assert_eq!(parsed.ok(), Value::decimal("0.1000000000000000000001"));
    }

    #[test]
    fn nullable_reads_null_before_member() {
        let pattern = Pattern::nullable(Pattern::integer());
        assert_eq!(parse_text("null", &pattern, &mut resolver()).ok(), Some(Value::Null));
        assert_eq!(parse_text("7", &pattern, &mut resolver()).ok(), Some(Value::integer(7)));
    }

    #[test]
    fn comma_separated_lists_parse_each_item() {
        let pattern = Pattern::list_of(Pattern::integer());
        let parsed = parse_text("1, 2,3", &pattern, &mut resolver());
        assert_eq!(
            parsed.ok(),
            Some(Value::List(vec![Value::integer(1), Value::integer(2), Value::integer(3)]))
        );
    }

    #[test]
    fn recursive_union_text_fails_instead_of_looping() {
        let mut registry = PatternRegistry::new();
        registry
            .insert("Expr", Pattern::any_of(vec![Pattern::integer(), Pattern::list_of(Pattern::reference("Expr"))]))
            .unwrap();
        let mut resolver = Resolver::with_defaults(Arc::new(registry));
        let expr = Pattern::reference("Expr");
        assert!(parse_text("abc", &expr, &mut resolver).is_err());
        assert_eq!(parse_text("7", &expr, &mut resolver).ok(), Some(Value::integer(7)));
        assert_eq!(
            parse_text("1,2", &expr, &mut resolver).ok(),
            Some(Value::List(vec![Value::integer(1), Value::integer(2)]))
        );
    }

    #[test]
    fn malformed_boolean_is_rejected() {
        assert!(parse_text("yes", &Pattern::boolean(), &mut resolver()).is_err());
    }
}
