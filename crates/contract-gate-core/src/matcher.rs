// crates/contract-gate-core/src/matcher.rs
// ============================================================================
// Module: Contract Gate Matcher
// Description: Structural comparison of values against patterns.
// Purpose: Produce breadcrumb-tracked results for every mismatch in one pass.
// Dependencies: tracing, crate::{parse, pattern, resolver, result, value}
// ============================================================================

//! ## Overview
//! Matching never short-circuits across independent positions: every list
//! element and every object key is checked and their failures are combined.
//! Unions stop at the first matching member in declaration order and, when
//! none match, keep each member's failure as a cause. References are resolved
//! lazily node by node through the [`Resolver`], so self-referential patterns
//! only ever go as deep as the value does.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing::debug;

use crate::parse::parse_text;
use crate::pattern::AdditionalProperties;
use crate::pattern::AnyOfPattern;
use crate::pattern::ListPattern;
use crate::pattern::ObjectPattern;
use crate::pattern::Occurs;
use crate::pattern::Pattern;
use crate::pattern::PrimitivePattern;
use crate::pattern::XmlChild;
use crate::pattern::XmlElementPattern;
use crate::resolver::Resolver;
use crate::result::Failure;
use crate::result::MatchResult;
use crate::value::Value;
use crate::value::XmlNode;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Matches a value against a pattern.
///
/// Match frames pushed on the resolver are popped before returning, so the
/// resolver's match stack is left as it was found.
#[must_use]
pub fn match_value(value: &Value, pattern: &Pattern, resolver: &mut Resolver) -> MatchResult {
    match_node(value, pattern, resolver)
}

/// Matches one value node.
fn match_node(value: &Value, pattern: &Pattern, resolver: &mut Resolver) -> MatchResult {
    match pattern {
        Pattern::Exact(expected) => {
            if value == expected {
                MatchResult::Success
            } else {
                mismatch(&expected.to_string(), value)
            }
        }
        Pattern::Primitive(primitive) => match_primitive(value, primitive),
        Pattern::ListOf(list) => match_list(value, list, resolver),
        Pattern::Object(object) => match_object(value, object, resolver),
        Pattern::AnyOf(union) => match_union(value, pattern, union, resolver),
        Pattern::Ref(name) => match_reference(value, name, resolver),
        Pattern::Enum(values) => {
            if values.contains(value) {
                MatchResult::Success
            } else {
                mismatch(&pattern.describe(), value)
            }
        }
        Pattern::Xml(element) => match value {
            Value::Xml(node) => match_element(node, element, resolver),
            other => mismatch(&pattern.describe(), other),
        },
        Pattern::NoBody => match value {
            Value::NoBody => MatchResult::Success,
            other => mismatch("no body", other),
        },
        Pattern::Null => match value {
            Value::Null => MatchResult::Success,
            other => mismatch("null", other),
        },
    }
}

/// Builds the standard type/value mismatch failure.
fn mismatch(expected: &str, actual: &Value) -> MatchResult {
    MatchResult::failure(format!("Expected {expected}, actual was {actual} ({})", actual.type_name()))
}

// ============================================================================
// SECTION: Primitives
// ============================================================================

/// Matches a primitive, applying its constraints.
fn match_primitive(value: &Value, primitive: &PrimitivePattern) -> MatchResult {
    let outcome = match (primitive, value) {
        (PrimitivePattern::String(constraints), Value::Str(text)) => constraints.check(text),
        (PrimitivePattern::Number(constraints), Value::Number(number)) => constraints.check(number),
        (PrimitivePattern::Boolean, Value::Bool(_)) => Ok(()),
        (_, other) => return mismatch(&primitive.describe(), other),
    };
    match outcome {
        Ok(()) => MatchResult::Success,
        Err(message) => MatchResult::failure(message),
    }
}

// ============================================================================
// SECTION: Lists
// ============================================================================

/// Matches every element; failures from all indices are kept.
fn match_list(value: &Value, list: &ListPattern, resolver: &mut Resolver) -> MatchResult {
    let Value::List(items) = value else {
        return mismatch(&format!("list of {}", list.item.describe()), value);
    };
    if let Some(min) = list.min_items
        && items.len() < min
    {
        return MatchResult::failure(format!(
            "Expected at least {min} items, actual was {}",
            items.len()
        ));
    }
    if let Some(max) = list.max_items
        && items.len() > max
    {
        return MatchResult::failure(format!("Expected at most {max} items, actual was {}", items.len()));
    }
    let results: Vec<MatchResult> = items
        .iter()
        .enumerate()
        .map(|(index, item)| match_node(item, &list.item, resolver).breadcrumb(format!("[{index}]")))
        .collect();
    MatchResult::combine(results)
}

// ============================================================================
// SECTION: Objects
// ============================================================================

/// Matches declared keys, required keys, and undeclared keys.
fn match_object(value: &Value, object: &ObjectPattern, resolver: &mut Resolver) -> MatchResult {
    let Value::Object(map) = value else {
        return mismatch("object", value);
    };
    let mut results = Vec::new();
    for key in object.required_keys() {
        if !map.contains_key(key) {
            results.push(
                MatchResult::failure(format!("Expected key named \"{key}\" was missing")).breadcrumb(key),
            );
        }
    }
    for (key, entry) in map {
        let result = match object.properties().get(key) {
            Some(pattern) => match_node(entry, pattern, resolver),
            None => match object.additional() {
                AdditionalProperties::Closed => {
                    MatchResult::failure(format!("Key named \"{key}\" was unexpected"))
                }
                AdditionalProperties::FreeForm => MatchResult::Success,
                AdditionalProperties::PatternConstrained(pattern) => match_node(entry, pattern, resolver),
            },
        };
        results.push(result.breadcrumb(key.as_str()));
    }
    MatchResult::combine(results)
}

// ============================================================================
// SECTION: Unions
// ============================================================================

/// Matches a union, narrowing by discriminator first.
fn match_union(value: &Value, pattern: &Pattern, union: &AnyOfPattern, resolver: &mut Resolver) -> MatchResult {
    let candidates: Vec<&Pattern> = match &union.discriminator {
        None => union.members.iter().collect(),
        Some(discriminator) => {
            let property = discriminator.property_name.as_str();
            let Value::Object(map) = value else {
                return mismatch("object", value);
            };
            let Some(selector) = map.get(property) else {
                return MatchResult::failure(format!("Expected key named \"{property}\" was missing"))
                    .breadcrumb(property);
            };
            let selector = selector.display_text();
            let selected = union.members_for_discriminator(&selector);
            if selected.is_empty() {
                return MatchResult::failure(format!(
                    "Discriminator value \"{selector}\" does not select any of {}",
                    pattern.describe()
                ))
                .breadcrumb(property);
            }
            selected
        }
    };
    let mut causes = Vec::new();
    for candidate in &candidates {
        match match_node(value, candidate, resolver) {
            MatchResult::Success => return MatchResult::Success,
            MatchResult::Failure(failure) => {
                debug!(member = %candidate.describe(), "union member rejected");
                causes.push(failure);
            }
        }
    }
    if union.discriminator.is_some() && causes.len() == 1 {
        return causes.pop().map_or(MatchResult::Success, MatchResult::Failure);
    }
    MatchResult::Failure(Failure::with_causes(
        format!("Expected {}, actual matched none of them", pattern.describe()),
        causes,
    ))
}

// ============================================================================
// SECTION: References
// ============================================================================

/// Resolves a name and matches the same value node against it.
fn match_reference(value: &Value, name: &str, resolver: &mut Resolver) -> MatchResult {
    let Some(resolved) = resolver.resolve(name) else {
        return MatchResult::failure(format!("Pattern ({name}) is not defined"));
    };
    if !resolver.enter_match(name, value) {
        return MatchResult::failure(format!("Pattern ({name}) refers to itself without consuming the value"));
    }
    let result = match_node(value, &resolved, resolver);
    resolver.exit_match();
    result
}

// ============================================================================
// SECTION: XML
// ============================================================================

/// Matches an XML node: identity, attributes, then children in sequence.
fn match_element(node: &XmlNode, element: &XmlElementPattern, resolver: &mut Resolver) -> MatchResult {
    if node.name != element.name {
        return MatchResult::failure(format!(
            "Expected element <{}>, actual was <{}>",
            element.name,
            node.qualified_name()
        ));
    }
    if element.namespace.is_some() && node.namespace != element.namespace {
        return MatchResult::failure(format!(
            "Expected namespace {} on <{}>, actual was {}",
            element.namespace.as_deref().unwrap_or_default(),
            element.name,
            node.namespace.as_deref().unwrap_or("none")
        ));
    }
    if element.prefix.is_some() && node.prefix != element.prefix {
        return MatchResult::failure(format!(
            "Expected prefix {} on <{}>, actual was {}",
            element.prefix.as_deref().unwrap_or_default(),
            element.name,
            node.prefix.as_deref().unwrap_or("none")
        ));
    }
    let mut results = Vec::new();
    for (name, attribute) in &element.attributes {
        let crumb = format!("@{name}");
        let result = match node.attributes.get(name) {
            None if attribute.optional => MatchResult::Success,
            None => MatchResult::failure(format!("Expected attribute named \"{name}\" was missing")),
            Some(text) => match_text(text, &attribute.pattern, resolver),
        };
        results.push(result.breadcrumb(crumb));
    }
    for name in node.attributes.keys() {
        if !element.attributes.contains_key(name) {
            results.push(
                MatchResult::failure(format!("Attribute named \"{name}\" was unexpected"))
                    .breadcrumb(format!("@{name}")),
            );
        }
    }
    results.push(match_children(node, element, resolver));
    MatchResult::combine(results)
}

/// Parses text against a pattern and matches the parsed value.
fn match_text(text: &str, pattern: &Pattern, resolver: &mut Resolver) -> MatchResult {
    match parse_text(text, pattern, resolver) {
        Ok(parsed) => match_node(&parsed, pattern, resolver),
        Err(err) => MatchResult::failure(format!("Expected {}, actual was \"{text}\" ({err})", pattern.describe())),
    }
}

/// Matches actual children positionally against declared children.
fn match_children(node: &XmlNode, element: &XmlElementPattern, resolver: &mut Resolver) -> MatchResult {
    let actual: Vec<&Value> = node
        .children
        .iter()
        .filter(|child| !matches!(child, Value::Str(text) if text.trim().is_empty()))
        .collect();
    let declared = flatten_children(&element.children, resolver);
    let mut results = Vec::new();
    let mut cursor = 0;
    for (index, child) in declared.iter().enumerate() {
        let target = child_name(&child.pattern, resolver);
        let limit = match child.occurs {
            Occurs::One => 1,
            Occurs::Optional | Occurs::Multiple => {
                let run = actual.iter().skip(cursor).take_while(|next| starts_child(next, target.as_deref())).count();
                let reserved = reserved_for_later(declared.iter().skip(index + 1), target.as_deref(), resolver);
                let available = run.saturating_sub(reserved);
                if child.occurs == Occurs::Optional { available.min(1) } else { available }
            }
        };
        let mut seen = 0_usize;
        while seen < limit {
            let Some(next) = actual.get(cursor).filter(|next| starts_child(next, target.as_deref())) else {
                break;
            };
            let crumb = child_crumb(next, target.as_deref(), child.occurs, seen);
            results.push(match_child(next, &child.pattern, resolver).breadcrumb(crumb));
            cursor += 1;
            seen += 1;
        }
        if child.occurs == Occurs::One && seen == 0 {
            let label = target.unwrap_or_else(|| "text".to_string());
            results.push(
                MatchResult::failure(format!("Expected child <{label}> was missing")).breadcrumb(label),
            );
        }
    }
    for extra in actual.iter().skip(cursor) {
        let label = match extra {
            Value::Xml(child) => child.qualified_name(),
            _ => "text".to_string(),
        };
        results.push(MatchResult::failure(format!("Child <{label}> was unexpected")).breadcrumb(label));
    }
    MatchResult::combine(results)
}

/// Counts later mandatory children that need nodes named like `target`.
///
/// Stops at the first mandatory child with another name, since it must sit
/// between this run and anything after it.
fn reserved_for_later<'a>(
    later: impl Iterator<Item = &'a XmlChild>,
    target: Option<&str>,
    resolver: &Resolver,
) -> usize {
    let mut reserved = 0;
    for child in later {
        let same = child_name(&child.pattern, resolver).as_deref() == target;
        match (same, child.occurs) {
            (true, Occurs::One) => reserved += 1,
            (false, Occurs::One) => break,
            _ => {}
        }
    }
    reserved
}

/// Matches one actual child against a declared child pattern.
fn match_child(actual: &Value, pattern: &Pattern, resolver: &mut Resolver) -> MatchResult {
    match actual {
        Value::Str(text) => match_text(text.trim(), pattern, resolver),
        other => match_node(other, pattern, resolver),
    }
}

/// Splices the children of unwrapped holders into the declaring element.
fn flatten_children(children: &[XmlChild], resolver: &Resolver) -> Vec<XmlChild> {
    let mut flat = Vec::new();
    for child in children {
        match resolver.resolve_deep(&child.pattern).as_deref() {
            Some(Pattern::Xml(holder)) if !holder.wrapped => {
                flat.extend(flatten_children(&holder.children, resolver));
            }
            _ => flat.push(child.clone()),
        }
    }
    flat
}

/// Returns the element name a declared child expects, or `None` for text content.
fn child_name(pattern: &Pattern, resolver: &Resolver) -> Option<String> {
    match resolver.resolve_deep(pattern).as_deref() {
        Some(Pattern::Xml(element)) => Some(element.name.clone()),
        _ => None,
    }
}

/// Returns true when an actual child can start the declared child.
fn starts_child(actual: &Value, expected_name: Option<&str>) -> bool {
    match (actual, expected_name) {
        (Value::Xml(node), Some(name)) => node.name == name,
        (Value::Xml(_), None) | (_, Some(_)) => false,
        (_, None) => true,
    }
}

/// Builds the breadcrumb for a matched child.
fn child_crumb(actual: &Value, expected_name: Option<&str>, occurs: Occurs, seen: usize) -> String {
    let base = match (actual, expected_name) {
        (Value::Xml(node), _) => node.qualified_name(),
        (_, Some(name)) => name.to_string(),
        (_, None) => "text".to_string(),
    };
    if occurs == Occurs::Multiple {
        format!("{base}[{seen}]")
    } else {
        base
    }
}
