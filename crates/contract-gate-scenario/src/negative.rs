// crates/contract-gate-scenario/src/negative.rs
// ============================================================================
// Module: Contract Gate Negative Variants
// Description: Enumerate deliberately invalid mutations of a scenario's request.
// Purpose: Produce labelled requests the contract must reject.
// Dependencies: contract-gate-core, crate::{contract, http}
// ============================================================================

//! ## Overview
//! Variants are planned as small mutation descriptors and materialized one at
//! a time, each from a fresh copy of the immutable base request pattern, so
//! the sequence is finite and can be restarted at any point. Mutations cover:
//! - each mandatory path, query, or header parameter omitted on its own;
//! - each mandatory top-level body key omitted on its own;
//! - in generative mode, each out-of-range boundary value and each
//!   wrong-typed value for scalar parameters and top-level body keys.
//!
//! When the scenario has named examples, the whole plan repeats per example
//! and labels carry an `| EX:<name>` suffix. The mutated target's example cell
//! is dropped so the example can never mask the mutation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use contract_gate_core::ExampleRow;
use contract_gate_core::ObjectPattern;
use contract_gate_core::Pattern;
use contract_gate_core::REQUEST_BODY_COLUMN;
use contract_gate_core::Resolver;
use contract_gate_core::Value;

use crate::contract::Scenario;
use crate::http::HttpRequestPattern;
use crate::http::ParameterLocation;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Invalid request pattern with a human label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegativeVariant {
    /// Mutated request pattern.
    pub request: HttpRequestPattern,
    /// Label such as `REQUEST.QUERY.id mandatory query param not sent`.
    pub label: String,
    /// Name of the example the variant is based on.
    pub example: Option<String>,
    /// Example cells to generate the rest of the request from.
    pub row: Option<ExampleRow>,
}

/// Planned mutation of the base request.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Mutation {
    /// Leave out a mandatory parameter.
    OmitParam {
        /// Parameter location.
        location: ParameterLocation,
        /// Parameter name.
        name: String,
    },
    /// Leave out a mandatory body key.
    OmitBodyKey {
        /// Body key.
        key: String,
    },
    /// Send an invalid parameter value.
    ParamValue {
        /// Parameter location.
        location: ParameterLocation,
        /// Parameter name.
        name: String,
        /// Invalid value.
        value: Value,
        /// Violated constraint.
        constraint: String,
    },
    /// Send an invalid body key value.
    BodyKeyValue {
        /// Body key.
        key: String,
        /// Invalid value.
        value: Value,
        /// Violated constraint.
        constraint: String,
    },
}

impl Mutation {
    /// Label without the example suffix.
    fn label(&self) -> String {
        match self {
            Self::OmitParam {
                location,
                name,
            } => format!("REQUEST.{}.{name} mandatory {} not sent", location.category(), location.kind()),
            Self::OmitBodyKey {
                key,
            } => format!("REQUEST.BODY.{key} mandatory key not sent"),
            Self::ParamValue {
                location,
                name,
                value,
                constraint,
            } => format!("REQUEST.{}.{name} {value} violates {constraint}", location.category()),
            Self::BodyKeyValue {
                key,
                value,
                constraint,
            } => format!("REQUEST.BODY.{key} {value} violates {constraint}"),
        }
    }

    /// Example columns the mutation must not be overridden by.
    fn masked_columns(&self) -> [&str; 2] {
        match self {
            Self::OmitParam {
                name, ..
            }
            | Self::ParamValue {
                name, ..
            } => [name.as_str(), name.as_str()],
            Self::OmitBodyKey {
                key,
            }
            | Self::BodyKeyValue {
                key, ..
            } => [key.as_str(), REQUEST_BODY_COLUMN],
        }
    }

    /// Applies the mutation to a copy of the base request.
    fn apply(&self, base: &HttpRequestPattern, body: Option<&ObjectPattern>) -> HttpRequestPattern {
        match self {
            Self::OmitParam {
                location,
                name,
            } => base.without_param(*location, name),
            Self::ParamValue {
                location,
                name,
                value,
                ..
            } => base.with_param_pattern(*location, name, Pattern::exact(value.clone())),
            Self::OmitBodyKey {
                key,
            } => {
                let mut next = base.clone();
                if let Some(object) = body {
                    next.body = Pattern::Object(object.without_key(key));
                }
                next
            }
            Self::BodyKeyValue {
                key,
                value,
                ..
            } => {
                let mut next = base.clone();
                if let Some(object) = body {
                    next.body = Pattern::Object(object.with_property(key, Pattern::exact(value.clone())));
                }
                next
            }
        }
    }
}

// ============================================================================
// SECTION: Enumeration
// ============================================================================

/// Restartable sequence of negative variants for one scenario.
#[derive(Debug, Clone)]
pub struct NegativeVariants<'s> {
    /// Scenario being mutated.
    scenario: &'s Scenario,
    /// Body object pattern with references resolved, when the body is an object.
    body: Option<ObjectPattern>,
    /// Planned mutations.
    mutations: Vec<Mutation>,
    /// Example index per pass; `None` is the single pass without examples.
    passes: Vec<Option<usize>>,
    /// Position of the next variant.
    cursor: usize,
}

/// Plans the negative variants of a scenario.
///
/// Boundary and wrong-typed values are planned only when the resolver is in
/// generative mode.
#[must_use]
pub fn negative_variants<'s>(scenario: &'s Scenario, resolver: &Resolver) -> NegativeVariants<'s> {
    let body = match resolver.resolve_deep(&scenario.request.body).as_deref() {
        Some(Pattern::Object(object)) => Some(object.clone()),
        _ => None,
    };
    let mut mutations = Vec::new();
    let locations = [ParameterLocation::Path, ParameterLocation::Query, ParameterLocation::Header];
    for location in locations {
        for param in scenario.request.params(location) {
            if param.required {
                mutations.push(Mutation::OmitParam {
                    location,
                    name: param.name.clone(),
                });
            }
        }
    }
    if let Some(object) = &body {
        for key in object.required_keys() {
            if object.properties().contains_key(key) {
                mutations.push(Mutation::OmitBodyKey {
                    key: key.to_string(),
                });
            }
        }
    }
    for location in locations {
        for param in scenario.request.params(location) {
            for (value, constraint) in invalid_values(&param.pattern, resolver) {
                mutations.push(Mutation::ParamValue {
                    location,
                    name: param.name.clone(),
                    value,
                    constraint,
                });
            }
        }
    }
    if let Some(object) = &body {
        for (key, pattern) in object.properties() {
            for (value, constraint) in invalid_values(pattern, resolver) {
                mutations.push(Mutation::BodyKeyValue {
                    key: key.clone(),
                    value,
                    constraint,
                });
            }
        }
    }
    let passes = if scenario.examples.is_empty() { vec![None] } else { (0..scenario.examples.len()).map(Some).collect() };
    NegativeVariants {
        scenario,
        body,
        mutations,
        passes,
        cursor: 0,
    }
}

/// Out-of-range and wrong-typed values with the constraint each violates.
fn invalid_values(pattern: &Pattern, resolver: &Resolver) -> Vec<(Value, String)> {
    let Some(resolved) = resolver.resolve_deep(pattern) else {
        return Vec::new();
    };
    let mut values = Vec::new();
    if let Pattern::Primitive(primitive) = resolved.as_ref() {
        for boundary in resolver.boundary_values(primitive) {
            if !boundary.valid {
                values.push((boundary.value, boundary.label));
            }
        }
    }
    for value in resolver.negative_values(&resolved) {
        values.push((value, format!("type {}", resolved.describe())));
    }
    values
}

impl NegativeVariants<'_> {
    /// Rewinds to the first variant.
    pub const fn restart(&mut self) {
        self.cursor = 0;
    }

    /// Returns the total number of variants.
    #[must_use]
    pub fn total(&self) -> usize {
        self.mutations.len() * self.passes.len()
    }

    /// Builds the variant at a position.
    fn variant_at(&self, position: usize) -> Option<NegativeVariant> {
        let width = self.mutations.len();
        if width == 0 {
            return None;
        }
        let pass = *self.passes.get(position / width)?;
        let mutation = self.mutations.get(position % width)?;
        let request = mutation.apply(&self.scenario.request, self.body.as_ref());
        let example = pass.and_then(|index| self.scenario.examples.get(index));
        let row = example.map(|example| {
            let mut row = example.request.clone();
            for column in mutation.masked_columns() {
                row.columns.shift_remove(column);
            }
            row
        });
        let label = match example {
            Some(example) => format!("{} | EX:{}", mutation.label(), example.name),
            None => mutation.label(),
        };
        Some(NegativeVariant {
            request,
            label,
            example: example.map(|example| example.name.clone()),
            row,
        })
    }
}

impl Iterator for NegativeVariants<'_> {
    type Item = NegativeVariant;

    fn next(&mut self) -> Option<Self::Item> {
        let variant = self.variant_at(self.cursor)?;
        self.cursor += 1;
        Some(variant)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.cursor);
        (remaining, Some(remaining))
    }
}
