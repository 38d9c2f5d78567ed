// crates/contract-gate-core/src/generator.rs
// ============================================================================
// Module: Contract Gate Generator
// Description: Structural synthesis of values from patterns.
// Purpose: Produce conforming values, honoring example rows and recursion caps.
// Dependencies: bigdecimal, rand, tracing, crate::{boundary, error, matcher, parse, pattern, regex_gen, resolver, row, value}
// ============================================================================

//! ## Overview
//! Generation is the dual of matching: every value produced here matches the
//! pattern it was generated from. Self-referential schemas terminate through
//! the resolver's generation guard. When a named pattern may not be entered
//! again, an internal cycle signal unwinds to the nearest position that has an
//! absent case:
//! - an optional object key is omitted;
//! - a list with no minimum becomes empty;
//! - a union moves on to its next member (a nullable union ends in `null`).
//!
//! A cycle that reaches the top of a call without meeting such a position is
//! reported as [`GenerationError::UnboundedRecursion`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use bigdecimal::BigDecimal;
use bigdecimal::ToPrimitive;
use indexmap::IndexMap;
use rand::Rng;
use tracing::debug;

use crate::boundary::ceil;
use crate::boundary::floor;
use crate::error::GenerationError;
use crate::matcher::match_value;
use crate::parse::parse_text;
use crate::pattern::AdditionalProperties;
use crate::pattern::AnyOfPattern;
use crate::pattern::ListPattern;
use crate::pattern::NumberConstraints;
use crate::pattern::NumberKind;
use crate::pattern::ObjectPattern;
use crate::pattern::Occurs;
use crate::pattern::Pattern;
use crate::pattern::PrimitivePattern;
use crate::pattern::StringConstraints;
use crate::pattern::StringFormat;
use crate::pattern::XmlElementPattern;
use crate::regex_gen::generate_matching;
use crate::resolver::Resolver;
use crate::result::MatchResult;
use crate::row::ExampleRow;
use crate::row::REQUEST_BODY_COLUMN;
use crate::value::Value;
use crate::value::XmlNode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Attempts made to find a string satisfying every constraint.
const STRING_ATTEMPTS: usize = 16;

/// Default span used when a number has only one bound, or none.
const DEFAULT_NUMBER_SPAN: i64 = 100;

/// Upper limit on the random step count inside a numeric range.
const MAX_NUMBER_STEPS: u64 = 1000;

/// Characters used for unconstrained strings.
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Generates a value conforming to `pattern`.
///
/// # Errors
///
/// Returns [`GenerationError`] when the pattern cannot be satisfied.
pub fn generate(pattern: &Pattern, resolver: &mut Resolver) -> Result<Value, GenerationError> {
    Generator::new(resolver).generate(pattern)
}

/// Generates a value conforming to `pattern`, taking cells from `row` where present.
///
/// # Errors
///
/// Returns [`GenerationError`] when the pattern cannot be satisfied or a cell
/// does not fit the pattern it overrides.
pub fn generate_with_row(
    pattern: &Pattern,
    resolver: &mut Resolver,
    row: &ExampleRow,
) -> Result<Value, GenerationError> {
    Generator::new(resolver).generate_with_row(pattern, row)
}

// ============================================================================
// SECTION: Generator
// ============================================================================

/// Internal unwinding signal.
enum Fault {
    /// A named pattern hit the recursion cap.
    Cycle(String),
    /// Unrecoverable generation error.
    Fatal(GenerationError),
}

impl From<GenerationError> for Fault {
    fn from(err: GenerationError) -> Self {
        Self::Fatal(err)
    }
}

/// Value generator bound to a resolver.
pub struct Generator<'r> {
    /// Resolution context and random source.
    resolver: &'r mut Resolver,
}

impl<'r> Generator<'r> {
    /// Creates a generator.
    #[must_use]
    pub const fn new(resolver: &'r mut Resolver) -> Self {
        Self {
            resolver,
        }
    }

    /// Generates a value conforming to `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] when the pattern cannot be satisfied.
    pub fn generate(&mut self, pattern: &Pattern) -> Result<Value, GenerationError> {
        self.top(pattern, None)
    }

    /// Generates a value, substituting row cells by key at any depth.
    ///
    /// A `(REQUEST-BODY)` cell replaces the whole value.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] when the pattern cannot be satisfied or a
    /// cell does not fit its pattern.
    pub fn generate_with_row(&mut self, pattern: &Pattern, row: &ExampleRow) -> Result<Value, GenerationError> {
        if let Some(body) = row.request_body() {
            return self.from_cell(REQUEST_BODY_COLUMN, body, pattern);
        }
        self.top(pattern, Some(row))
    }

    /// Runs one top-level generation and converts an escaped cycle into an error.
    fn top(&mut self, pattern: &Pattern, row: Option<&ExampleRow>) -> Result<Value, GenerationError> {
        match self.node(pattern, row) {
            Ok(value) => Ok(value),
            Err(Fault::Cycle(name)) => Err(GenerationError::UnboundedRecursion {
                name,
            }),
            Err(Fault::Fatal(err)) => Err(err),
        }
    }

    /// Parses a cell against its pattern and checks that it matches.
    fn from_cell(&mut self, key: &str, text: &str, pattern: &Pattern) -> Result<Value, GenerationError> {
        let parsed = parse_text(text, pattern, self.resolver).map_err(|err| {
            GenerationError::InvalidExampleValue {
                key: key.to_string(),
                reason: err.to_string(),
            }
        })?;
        match match_value(&parsed, pattern, self.resolver) {
            MatchResult::Success => Ok(parsed),
            MatchResult::Failure(failure) => Err(GenerationError::InvalidExampleValue {
                key: key.to_string(),
                reason: failure.report_string(),
            }),
        }
    }

    /// Generates one node.
    fn node(&mut self, pattern: &Pattern, row: Option<&ExampleRow>) -> Result<Value, Fault> {
        match pattern {
            Pattern::Exact(value) => Ok(value.clone()),
            Pattern::Primitive(primitive) => Ok(self.primitive(primitive)?),
            Pattern::ListOf(list) => self.list(list, row),
            Pattern::Object(object) => self.object(object, row),
            Pattern::AnyOf(union) => self.union(union, row),
            Pattern::Ref(name) => self.reference(name, row),
            Pattern::Enum(values) => {
                if values.is_empty() {
                    return Err(unsatisfiable(pattern, "enum has no values").into());
                }
                let index = self.resolver.rng().gen_range(0..values.len());
                Ok(values[index].clone())
            }
            Pattern::Xml(element) => Ok(Value::Xml(self.element(element, row)?)),
            Pattern::NoBody => Ok(Value::NoBody),
            Pattern::Null => Ok(Value::Null),
        }
    }

    /// Resolves and generates a named pattern under the recursion guard.
    fn reference(&mut self, name: &str, row: Option<&ExampleRow>) -> Result<Value, Fault> {
        let Some(resolved) = self.resolver.resolve(name) else {
            return Err(GenerationError::UnresolvedReference {
                name: name.to_string(),
            }
            .into());
        };
        if !self.resolver.enter_generation(name) {
            return Err(Fault::Cycle(name.to_string()));
        }
        let result = self.node(&resolved, row);
        self.resolver.exit_generation();
        result
    }

    // ------------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------------

    /// Generates an in-range primitive.
    fn primitive(&mut self, primitive: &PrimitivePattern) -> Result<Value, GenerationError> {
        match primitive {
            PrimitivePattern::String(constraints) => self.string(constraints).map(Value::Str),
            PrimitivePattern::Number(constraints) => self.number(constraints).map(Value::Number),
            PrimitivePattern::Boolean => Ok(Value::Bool(self.resolver.rng().gen_bool(0.5))),
        }
    }

    /// Generates a string satisfying length, regex, and format constraints.
    fn string(&mut self, constraints: &StringConstraints) -> Result<String, GenerationError> {
        let describe = || PrimitivePattern::String(constraints.clone()).describe();
        for _ in 0..STRING_ATTEMPTS {
            let candidate = if let Some(regex) = &constraints.regex {
                generate_matching(regex.source(), self.resolver.rng()).map_err(|reason| {
                    GenerationError::Unsatisfiable {
                        pattern: describe(),
                        reason,
                    }
                })?
            } else if let Some(format) = constraints.format {
                self.format_sample(format)
            } else {
                self.plain_string(constraints)?
            };
            if constraints.check(&candidate).is_ok() {
                return Ok(candidate);
            }
        }
        Err(GenerationError::Unsatisfiable {
            pattern: describe(),
            reason: "no candidate satisfied every string constraint".to_string(),
        })
    }

    /// Generates a random alphanumeric string within the length bounds.
    fn plain_string(&mut self, constraints: &StringConstraints) -> Result<String, GenerationError> {
        let default_max = self.resolver.settings().max_string_length;
        let hi = constraints
            .max_length
            .unwrap_or_else(|| constraints.min_length.unwrap_or(0).max(default_max));
        let lo = constraints.min_length.unwrap_or_else(|| hi.min(1));
        if lo > hi {
            return Err(GenerationError::Unsatisfiable {
                pattern: "string".to_string(),
                reason: format!("minLength {lo} exceeds maxLength {hi}"),
            });
        }
        let upper = hi.min(lo.saturating_add(default_max));
        let rng = self.resolver.rng();
        let length = rng.gen_range(lo..=upper);
        Ok((0..length)
            .map(|_| char::from(ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())]))
            .collect())
    }

    /// Generates a sample for a well-known format.
    fn format_sample(&mut self, format: StringFormat) -> String {
        let rng = self.resolver.rng();
        match format {
            StringFormat::Email => format!("user{}@example.com", rng.gen_range(0..10_000)),
            StringFormat::Uuid => {
                let mut hex = |count: usize| -> String {
                    (0..count)
                        .filter_map(|_| char::from_digit(rng.gen_range(0..16), 16))
                        .collect()
                };
                format!("{}-{}-{}-{}-{}", hex(8), hex(4), hex(4), hex(4), hex(12))
            }
            StringFormat::Date => format!(
                "{}-{:02}-{:02}",
                rng.gen_range(2000..=2030),
                rng.gen_range(1..=12),
                rng.gen_range(1..=28)
            ),
            StringFormat::DateTime => format!(
                "{}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
                rng.gen_range(2000..=2030),
                rng.gen_range(1..=12),
                rng.gen_range(1..=28),
                rng.gen_range(0..24),
                rng.gen_range(0..60),
                rng.gen_range(0..60)
            ),
            StringFormat::Uri => format!("https://example.com/items/{}", rng.gen_range(0..10_000)),
        }
    }

    /// Generates a number inside the bounds, stepping by the kind's increment.
    fn number(&mut self, constraints: &NumberConstraints) -> Result<BigDecimal, GenerationError> {
        let step = match constraints.kind {
            NumberKind::Integer => BigDecimal::from(1),
            NumberKind::Decimal => self.resolver.settings().decimal_epsilon.clone(),
        };
        let integer = constraints.kind == NumberKind::Integer;
        let lower = constraints.minimum.as_ref().map(|bound| match (integer, bound.exclusive) {
            (true, true) => floor(&bound.value) + BigDecimal::from(1),
            (true, false) => ceil(&bound.value),
            (false, true) => &bound.value + &step,
            (false, false) => bound.value.clone(),
        });
        let upper = constraints.maximum.as_ref().map(|bound| match (integer, bound.exclusive) {
            (true, true) => ceil(&bound.value) - BigDecimal::from(1),
            (true, false) => floor(&bound.value),
            (false, true) => &bound.value - &step,
            (false, false) => bound.value.clone(),
        });
        let span = BigDecimal::from(DEFAULT_NUMBER_SPAN);
        let (lower, upper) = match (lower, upper) {
            (Some(lower), Some(upper)) => (lower, upper),
            (Some(lower), None) => {
                let upper = &lower + &span;
                (lower, upper)
            }
            (None, Some(upper)) => (&upper - &span, upper),
            (None, None) => (BigDecimal::from(1), &BigDecimal::from(1) + &span),
        };
        let fail = |reason: String| GenerationError::Unsatisfiable {
            pattern: PrimitivePattern::Number(constraints.clone()).describe(),
            reason,
        };
        if lower > upper {
            if !integer
                && let (Some(minimum), Some(maximum)) = (&constraints.minimum, &constraints.maximum)
            {
                let midpoint = ((&minimum.value + &maximum.value) / BigDecimal::from(2)).normalized();
                if constraints.check(&midpoint).is_ok() {
                    return Ok(midpoint);
                }
            }
            return Err(fail(format!("no value between {lower} and {upper}")));
        }
        let steps = floor(&(&(&upper - &lower) / &step)).to_u64().unwrap_or(0).min(MAX_NUMBER_STEPS);
        let chosen = self.resolver.rng().gen_range(0..=steps);
        let offset = &step * &BigDecimal::from(chosen);
        let candidate = (&lower + &offset).normalized();
        if constraints.check(&candidate).is_ok() {
            return Ok(candidate);
        }
        constraints
            .check(&lower)
            .map(|()| lower.normalized())
            .map_err(fail)
    }

    // ------------------------------------------------------------------------
    // Composites
    // ------------------------------------------------------------------------

    /// Generates a list whose length respects the settings and the pattern's bounds.
    fn list(&mut self, list: &ListPattern, row: Option<&ExampleRow>) -> Result<Value, Fault> {
        let min_items = list.min_items.unwrap_or(0);
        let count = self.list_count(min_items, list.max_items);
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            match self.node(&list.item, row) {
                Ok(item) => items.push(item),
                Err(Fault::Cycle(name)) if min_items == 0 => {
                    debug!(pattern = %name, "list generated empty to end recursion");
                    return Ok(Value::List(Vec::new()));
                }
                Err(fault) => return Err(fault),
            }
        }
        Ok(Value::List(items))
    }

    /// Picks a list length.
    fn list_count(&mut self, min_items: usize, max_items: Option<usize>) -> usize {
        let settings = self.resolver.settings();
        let lo = settings.min_list_items.max(min_items);
        let mut hi = settings.max_list_items.max(lo);
        let mut lo = lo;
        if let Some(max) = max_items {
            hi = hi.min(max);
            lo = lo.min(hi);
        }
        self.resolver.rng().gen_range(lo..=hi)
    }

    /// Generates every declared key; optional keys are omitted only to end recursion.
    fn object(&mut self, object: &ObjectPattern, row: Option<&ExampleRow>) -> Result<Value, Fault> {
        let mut map = IndexMap::new();
        for (key, pattern) in object.properties() {
            if let Some(cell) = row.and_then(|row| row.get(key)) {
                map.insert(key.clone(), self.from_cell(key, cell, pattern)?);
                continue;
            }
            match self.node(pattern, row) {
                Ok(value) => {
                    map.insert(key.clone(), value);
                }
                Err(Fault::Cycle(name)) if !object.is_required(key) => {
                    debug!(pattern = %name, key = %key, "optional key omitted to end recursion");
                }
                Err(fault) => return Err(fault),
            }
        }
        for key in object.required_keys() {
            if map.contains_key(key) {
                continue;
            }
            let value = match object.additional() {
                AdditionalProperties::PatternConstrained(pattern) => self.node(pattern, row)?,
                AdditionalProperties::FreeForm | AdditionalProperties::Closed => Value::string(key),
            };
            map.insert(key.to_string(), value);
        }
        Ok(Value::Object(map))
    }

    /// Generates the first member that terminates, setting the discriminator value.
    fn union(&mut self, union: &AnyOfPattern, row: Option<&ExampleRow>) -> Result<Value, Fault> {
        let preferred: Vec<&Pattern> = match (&union.discriminator, row) {
            (Some(discriminator), Some(row)) => row
                .get(&discriminator.property_name)
                .map(|selector| union.members_for_discriminator(selector))
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        let rest = union.members.iter().filter(|member| !preferred.contains(member));
        let mut last_cycle = None;
        for member in preferred.iter().copied().chain(rest) {
            match self.node(member, row) {
                Ok(mut value) => {
                    if let (Some(discriminator), Pattern::Ref(name), Value::Object(map)) =
                        (&union.discriminator, member, &mut value)
                        && let Some(slot) = map.get_mut(&discriminator.property_name)
                    {
                        *slot = Value::string(discriminator.value_for(name));
                    }
                    return Ok(value);
                }
                Err(Fault::Cycle(name)) => {
                    debug!(pattern = %name, "union member skipped to end recursion");
                    last_cycle = Some(name);
                }
                Err(fault) => return Err(fault),
            }
        }
        match last_cycle {
            Some(name) => Err(Fault::Cycle(name)),
            None => Err(GenerationError::Unsatisfiable {
                pattern: "union".to_string(),
                reason: "union has no members".to_string(),
            }
            .into()),
        }
    }

    // ------------------------------------------------------------------------
    // XML
    // ------------------------------------------------------------------------

    /// Generates an element: attributes, then children in declared order.
    fn element(&mut self, element: &XmlElementPattern, row: Option<&ExampleRow>) -> Result<XmlNode, Fault> {
        let mut node = XmlNode::new(element.name.clone());
        node.namespace.clone_from(&element.namespace);
        node.prefix.clone_from(&element.prefix);
        for (name, attribute) in &element.attributes {
            if let Some(cell) = row.and_then(|row| row.get(name)) {
                let value = self.from_cell(name, cell, &attribute.pattern)?;
                node.attributes.insert(name.clone(), value.display_text());
                continue;
            }
            match self.node(&attribute.pattern, row) {
                Ok(value) => {
                    node.attributes.insert(name.clone(), value.display_text());
                }
                Err(Fault::Cycle(_)) if attribute.optional => {}
                Err(fault) => return Err(fault),
            }
        }
        for child in &element.children {
            let count = match child.occurs {
                Occurs::One | Occurs::Optional => 1,
                Occurs::Multiple => self.list_count(0, None),
            };
            for _ in 0..count {
                match self.child(&child.pattern, row) {
                    Ok(values) => node.children.extend(values),
                    Err(Fault::Cycle(_)) if child.occurs != Occurs::One => break,
                    Err(fault) => return Err(fault),
                }
            }
        }
        Ok(node)
    }

    /// Generates one declared child; unwrapped holders contribute their children.
    fn child(&mut self, pattern: &Pattern, row: Option<&ExampleRow>) -> Result<Vec<Value>, Fault> {
        let unwrapped = matches!(
            self.resolver.resolve_deep(pattern).as_deref(),
            Some(Pattern::Xml(element)) if !element.wrapped
        );
        Ok(match self.node(pattern, row)? {
            Value::Xml(node) if unwrapped => node.children,
            Value::Xml(node) => vec![Value::Xml(node)],
            other => vec![Value::Str(other.display_text())],
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds an unsatisfiable-pattern error.
fn unsatisfiable(pattern: &Pattern, reason: &str) -> GenerationError {
    GenerationError::Unsatisfiable {
        pattern: pattern.describe(),
        reason: reason.to_string(),
    }
}
