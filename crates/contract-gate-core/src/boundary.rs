// crates/contract-gate-core/src/boundary.rs
// ============================================================================
// Module: Contract Gate Boundary Values
// Description: Edge and out-of-range values derived from primitive constraints.
// Purpose: Exercise acceptance at each bound and rejection just outside it.
// Dependencies: bigdecimal, crate::{pattern, value}
// ============================================================================

//! ## Overview
//! Boundary synthesis works from the declared constraints only. For a numeric
//! bound `B` the candidates are `B`, `B - 1`, `B + 1`, and `B ± step`, where
//! the step is `1` for integers and the configured epsilon for decimals. Each
//! candidate is then classified by the same constraint check the matcher
//! uses, so "valid" here always agrees with a match outcome. String length
//! bounds yield strings at and just past each bound.

// ============================================================================
// SECTION: Imports
// ============================================================================

use bigdecimal::BigDecimal;

use crate::pattern::Bound;
use crate::pattern::NumberConstraints;
use crate::pattern::NumberKind;
use crate::pattern::Pattern;
use crate::pattern::PrimitivePattern;
use crate::pattern::StringConstraints;
use crate::value::Value;

// ============================================================================
// SECTION: Boundary Value
// ============================================================================

/// Value near a declared constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryValue {
    /// Candidate value.
    pub value: Value,
    /// True when the value satisfies every constraint.
    pub valid: bool,
    /// Constraint the value sits on, such as `exclusiveMinimum 18`.
    pub label: String,
}

/// Computes boundary values for a primitive.
///
/// Values are deduplicated; the first label recorded for a value wins.
#[must_use]
pub fn boundary_values(primitive: &PrimitivePattern, epsilon: &BigDecimal) -> Vec<BoundaryValue> {
    match primitive {
        PrimitivePattern::Number(constraints) => number_boundaries(constraints, epsilon),
        PrimitivePattern::String(constraints) => string_boundaries(constraints),
        PrimitivePattern::Boolean => Vec::new(),
    }
}

/// Returns values of the wrong type for a pattern.
///
/// Strings get no mismatches here because every scalar has a textual form.
#[must_use]
pub fn type_mismatches(pattern: &Pattern) -> Vec<Value> {
    match pattern {
        Pattern::Primitive(PrimitivePattern::Number(_)) => {
            vec![Value::string("not-a-number"), Value::Bool(true)]
        }
        Pattern::Primitive(PrimitivePattern::Boolean) => {
            vec![Value::string("not-a-boolean"), Value::integer(2)]
        }
        Pattern::Object(_) => vec![Value::string("not-an-object")],
        Pattern::ListOf(_) => vec![Value::string("not-a-list")],
        Pattern::Exact(Value::Number(_)) => vec![Value::string("not-a-number")],
        _ => Vec::new(),
    }
}

// ============================================================================
// SECTION: Numeric Boundaries
// ============================================================================

/// Computes candidates around both numeric bounds.
fn number_boundaries(constraints: &NumberConstraints, epsilon: &BigDecimal) -> Vec<BoundaryValue> {
    let step = match constraints.kind {
        NumberKind::Integer => BigDecimal::from(1),
        NumberKind::Decimal => epsilon.clone(),
    };
    let one = BigDecimal::from(1);
    let mut out: Vec<BoundaryValue> = Vec::new();
    let bounds = [
        constraints.minimum.as_ref().map(|bound| (bound, "minimum")),
        constraints.maximum.as_ref().map(|bound| (bound, "maximum")),
    ];
    for (bound, side) in bounds.into_iter().flatten() {
        let label = bound_label(bound, side);
        let anchor = match (constraints.kind, side) {
            (NumberKind::Integer, "minimum") => ceil(&bound.value),
            (NumberKind::Integer, _) => floor(&bound.value),
            (NumberKind::Decimal, _) => bound.value.clone(),
        };
        let candidates = [anchor.clone(), &anchor - &one, &anchor + &one, &anchor - &step, &anchor + &step];
        for candidate in candidates {
            let candidate = candidate.normalized();
            if out.iter().any(|existing| existing.value == Value::Number(candidate.clone())) {
                continue;
            }
            let valid = constraints.check(&candidate).is_ok();
            out.push(BoundaryValue {
                value: Value::Number(candidate),
                valid,
                label: label.clone(),
            });
        }
    }
    out
}

/// Renders a bound as its contract keyword and value.
fn bound_label(bound: &Bound, side: &str) -> String {
    if bound.exclusive {
        let keyword = if side == "minimum" { "exclusiveMinimum" } else { "exclusiveMaximum" };
        format!("{keyword} {}", bound.value)
    } else {
        format!("{side} {}", bound.value)
    }
}

// ============================================================================
// SECTION: String Boundaries
// ============================================================================

/// Computes strings at and just past each length bound.
fn string_boundaries(constraints: &StringConstraints) -> Vec<BoundaryValue> {
    let mut lengths: Vec<(usize, String)> = Vec::new();
    if let Some(min) = constraints.min_length {
        let label = format!("minLength {min}");
        lengths.push((min, label.clone()));
        if let Some(below) = min.checked_sub(1) {
            lengths.push((below, label));
        }
    }
    if let Some(max) = constraints.max_length {
        let label = format!("maxLength {max}");
        lengths.push((max, label.clone()));
        lengths.push((max.saturating_add(1), label));
    }
    let mut out: Vec<BoundaryValue> = Vec::new();
    for (length, label) in lengths {
        let text = "a".repeat(length);
        if out.iter().any(|existing| existing.value.as_str() == Some(text.as_str())) {
            continue;
        }
        let valid = constraints.check(&text).is_ok();
        out.push(BoundaryValue {
            value: Value::Str(text),
            valid,
            label,
        });
    }
    out
}

// ============================================================================
// SECTION: Rounding
// ============================================================================

/// Rounds toward negative infinity.
pub(crate) fn floor(value: &BigDecimal) -> BigDecimal {
    let truncated = value.with_scale(0);
    if &truncated > value { truncated - BigDecimal::from(1) } else { truncated }
}

/// Rounds toward positive infinity.
pub(crate) fn ceil(value: &BigDecimal) -> BigDecimal {
    let truncated = value.with_scale(0);
    if &truncated < value { truncated + BigDecimal::from(1) } else { truncated }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn decimal_exclusive_bound_steps_by_epsilon() {
        let constraints = NumberConstraints {
            kind: NumberKind::Decimal,
            minimum: Some(Bound::exclusive(0)),
            maximum: None,
        };
        let epsilon = BigDecimal::new(1.into(), 2);
        let values = boundary_values(&PrimitivePattern::Number(constraints), &epsilon);
        let smallest_valid = values
            .iter()
            .find(|candidate| candidate.value == Value::Number(epsilon.clone()));
        assert!(smallest_valid.is_some_and(|candidate| candidate.valid));
        assert!(values.iter().any(|candidate| candidate.value == Value::integer(0) && !candidate.valid));
    }

    #[test]
    fn string_lengths_straddle_bounds() {
        let constraints = StringConstraints {
            min_length: Some(2),
            max_length: Some(4),
            ..StringConstraints::default()
        };
        let values = boundary_values(&PrimitivePattern::String(constraints), &BigDecimal::from(1));
        let summary: Vec<(usize, bool)> = values
            .iter()
            .filter_map(|candidate| candidate.value.as_str().map(|text| (text.len(), candidate.valid)))
            .collect();
        assert_eq!(summary, vec![(2, true), (1, false), (4, true), (5, false)]);
    }

    #[test]
    fn floor_and_ceil_handle_negative_fractions() {
        let value = BigDecimal::from_str("-2.5").unwrap_or_default();
        assert_eq!(floor(&value), BigDecimal::from(-3));
        assert_eq!(ceil(&value), BigDecimal::from(-2));
        assert_eq!(floor(&BigDecimal::from(4)), BigDecimal::from(4));
    }
}
