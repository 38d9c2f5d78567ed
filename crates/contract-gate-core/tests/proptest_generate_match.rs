//! Generate-then-match property tests for Contract Gate core.
//!
//! ## Purpose
//! Every value generated from a valid pattern must match that pattern. These
//! tests build random pattern trees (primitives with constraints, lists,
//! objects with optional keys, unions) and check the round trip for many seeds.
//!
//! ## What is covered
//! - Randomly nested lists, objects, and unions.
//! - Numeric bounds, inclusive and exclusive, for integers and decimals.
//! - Arbitrary-precision bound checks near the boundary.
// crates/contract-gate-core/tests/proptest_generate_match.rs
// ============================================================================
// Module: Generate-Then-Match Property Tests
// Description: Randomized idempotence checks for generation and matching.
// Purpose: Prove generated values conform for arbitrary pattern shapes.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;

use bigdecimal::BigDecimal;
use contract_gate_core::Bound;
use contract_gate_core::NumberConstraints;
use contract_gate_core::NumberKind;
use contract_gate_core::ObjectPattern;
use contract_gate_core::Pattern;
use contract_gate_core::PatternRegistry;
use contract_gate_core::RegexConstraint;
use contract_gate_core::Resolver;
use contract_gate_core::ResolverSettings;
use contract_gate_core::StringConstraints;
use contract_gate_core::Value;
use contract_gate_core::generate;
use contract_gate_core::match_value;
use proptest::prelude::*;

// ============================================================================
// SECTION: Strategies
// ============================================================================

fn number_pattern() -> impl Strategy<Value = Pattern> {
    (-1000_i64..1000, 2_i64..500, any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(low, span, integer, exclusive_low, exclusive_high, has_high)| {
            let kind = if integer { NumberKind::Integer } else { NumberKind::Decimal };
            let minimum = Some(Bound {
                value: BigDecimal::from(low),
                exclusive: exclusive_low,
            });
            let maximum = has_high.then(|| Bound {
                value: BigDecimal::from(low + span),
                exclusive: exclusive_high,
            });
            Pattern::number_with(NumberConstraints {
                kind,
                minimum,
                maximum,
            })
        },
    )
}

fn string_pattern() -> impl Strategy<Value = Pattern> {
    prop_oneof![
        Just(Pattern::string()),
        (0_usize..5, 0_usize..10).prop_map(|(min, extra)| {
            Pattern::string_with(StringConstraints {
                min_length: Some(min),
                max_length: Some(min + extra),
                ..StringConstraints::default()
            })
        }),
        prop::sample::select(vec!["[a-z]{3,6}", "(GET|POST|PUT)", "[0-9]{4}-[A-F]{2}", "x*y+z?"]).prop_map(
            |regex| {
                Pattern::string_with(StringConstraints {
                    regex: Some(RegexConstraint::new(regex).unwrap()),
                    ..StringConstraints::default()
                })
            }
        ),
    ]
}

fn leaf_pattern() -> impl Strategy<Value = Pattern> {
    prop_oneof![
        string_pattern(),
        number_pattern(),
        Just(Pattern::boolean()),
        Just(Pattern::Null),
        "[a-z]{1,8}".prop_map(|text| Pattern::exact(Value::string(text))),
        prop::collection::vec(-50_i64..50, 1..4)
            .prop_map(|values| Pattern::enum_of(values.into_iter().map(Value::integer).collect())),
    ]
}

fn pattern_tree() -> impl Strategy<Value = Pattern> {
    leaf_pattern().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(Pattern::list_of),
            inner.clone().prop_map(Pattern::nullable),
            prop::collection::vec(inner.clone(), 1..4).prop_map(Pattern::any_of),
            prop::collection::btree_map("[a-z]{1,6}", (inner, any::<bool>()), 0..5).prop_map(|fields| {
                let required: Vec<String> =
                    fields.iter().filter(|(_, (_, required))| *required).map(|(key, _)| key.clone()).collect();
                let properties = fields.into_iter().map(|(key, (pattern, _))| (key, pattern));
                Pattern::Object(ObjectPattern::new(properties, required))
            }),
        ]
    })
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #[test]
    fn generated_values_match_their_pattern(pattern in pattern_tree(), seed in any::<u64>()) {
        let mut resolver = Resolver::new(
            Arc::new(PatternRegistry::new()),
            ResolverSettings {
                seed,
                ..ResolverSettings::default()
            },
        );
        let value = generate(&pattern, &mut resolver).unwrap();
        let result = match_value(&value, &pattern, &mut resolver);
        prop_assert!(result.is_success(), "{} failed:\n{}", value, result.report_string());
    }

    #[test]
    fn exclusive_minimum_is_exact(bound in -1_000_000_i64..1_000_000, digits in 1_u32..40) {
        let pattern = Pattern::bounded(NumberKind::Decimal, Some(Bound::exclusive(bound)), None);
        let mut resolver = Resolver::with_defaults(Arc::new(PatternRegistry::new()));
        let epsilon = BigDecimal::new(1.into(), i64::from(digits));
        let just_above = Value::Number(BigDecimal::from(bound) + epsilon);
        let at_bound = Value::integer(bound);
        prop_assert!(match_value(&just_above, &pattern, &mut resolver).is_success());
        prop_assert!(!match_value(&at_bound, &pattern, &mut resolver).is_success());
    }
}
