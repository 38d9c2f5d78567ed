// crates/contract-gate-core/tests/generation.rs
// ============================================================================
// Module: Generator Tests
// Description: Value synthesis, recursion termination, and example rows.
// Purpose: Ensure generated values always match their patterns.
// ============================================================================

//! ## Overview
//! Covers generation of constrained primitives, self-referential schemas,
//! discriminated unions, and example-row substitution.

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
use contract_gate_core::AnyOfPattern;
use contract_gate_core::Bound;
use contract_gate_core::Discriminator;
use contract_gate_core::ExampleRow;
use contract_gate_core::GenerationError;
use contract_gate_core::ListPattern;
use contract_gate_core::NumberKind;
use contract_gate_core::Pattern;
use contract_gate_core::PatternRegistry;
use contract_gate_core::REQUEST_BODY_COLUMN;
use contract_gate_core::RegexConstraint;
use contract_gate_core::Resolver;
use contract_gate_core::ResolverSettings;
use contract_gate_core::StringConstraints;
use contract_gate_core::StringFormat;
use contract_gate_core::Value;
use contract_gate_core::generate;
use contract_gate_core::generate_with_row;
use contract_gate_core::match_value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn resolver(registry: PatternRegistry) -> Resolver {
    registry.validate().unwrap();
    Resolver::with_defaults(Arc::new(registry))
}

fn assert_round_trip(pattern: &Pattern, resolver: &mut Resolver) -> Value {
    let value = generate(pattern, resolver).unwrap();
    let result = match_value(&value, pattern, resolver);
    assert!(result.is_success(), "{value} failed:\n{}", result.report_string());
    value
}

// ============================================================================
// SECTION: Primitives
// ============================================================================

#[test]
fn constrained_strings_round_trip() {
    let mut resolver = resolver(PatternRegistry::new());
    let patterns = [
        Pattern::string_with(StringConstraints {
            min_length: Some(5),
            max_length: Some(8),
            ..StringConstraints::default()
        }),
        Pattern::string_with(StringConstraints {
            regex: Some(RegexConstraint::new("[A-Z]{2}-[0-9]{3,5}").unwrap()),
            ..StringConstraints::default()
        }),
        Pattern::string_with(StringConstraints {
            max_length: Some(0),
            ..StringConstraints::default()
        }),
    ];
    for pattern in &patterns {
        for _ in 0..10 {
            assert_round_trip(pattern, &mut resolver);
        }
    }
}

#[test]
fn formats_round_trip() {
    let mut resolver = resolver(PatternRegistry::new());
    for format in [
        StringFormat::Email,
        StringFormat::Uuid,
        StringFormat::Date,
        StringFormat::DateTime,
        StringFormat::Uri,
    ] {
        let pattern = Pattern::string_with(StringConstraints {
            format: Some(format),
            ..StringConstraints::default()
        });
        assert_round_trip(&pattern, &mut resolver);
    }
}

#[test]
fn numbers_stay_inside_bounds() {
    let mut resolver = resolver(PatternRegistry::new());
    let patterns = [
        Pattern::bounded(NumberKind::Integer, Some(Bound::exclusive(18)), Some(Bound::exclusive(20))),
        Pattern::bounded(NumberKind::Decimal, Some(Bound::exclusive(0)), Some(Bound::inclusive(1))),
        Pattern::bounded(NumberKind::Integer, None, Some(Bound::inclusive(-500))),
        Pattern::bounded(NumberKind::Integer, Some(Bound::inclusive(1_000_000)), None),
    ];
    for pattern in &patterns {
        for _ in 0..20 {
            assert_round_trip(pattern, &mut resolver);
        }
    }
    let only = generate(&patterns[0], &mut resolver).unwrap();
    assert_eq!(only, Value::integer(19));
}

#[test]
fn empty_numeric_range_is_unsatisfiable() {
    let mut resolver = resolver(PatternRegistry::new());
    let pattern = Pattern::bounded(NumberKind::Integer, Some(Bound::exclusive(5)), Some(Bound::exclusive(6)));
    assert!(matches!(
        generate(&pattern, &mut resolver),
        Err(GenerationError::Unsatisfiable { .. })
    ));
}

#[test]
fn narrow_exclusive_decimal_range_uses_its_midpoint() {
    let mut resolver = resolver(PatternRegistry::new());
    let pattern = Pattern::bounded(
        NumberKind::Decimal,
        Some(Bound::exclusive(0)),
        Some(Bound::exclusive(BigDecimal::new(5.into(), 3))),
    );
    assert!(match_value(&Value::decimal("0.001").unwrap(), &pattern, &mut resolver).is_success());
    let value = assert_round_trip(&pattern, &mut resolver);
    assert_eq!(value, Value::decimal("0.0025").unwrap());
}

#[test]
fn list_bounds_are_respected() {
    let mut resolver = resolver(PatternRegistry::new());
    let pattern = Pattern::ListOf(ListPattern {
        item: Box::new(Pattern::boolean()),
        min_items: Some(4),
        max_items: Some(4),
    });
    let value = assert_round_trip(&pattern, &mut resolver);
    assert!(matches!(value, Value::List(items) if items.len() == 4));
}

// ============================================================================
// SECTION: Recursion
// ============================================================================

#[test]
fn self_referential_list_terminates() {
    let registry = PatternRegistry::new()
        .with(
            "Data",
            Pattern::object([
                ("id", Pattern::number()),
                ("data?", Pattern::list_of(Pattern::reference("Data"))),
            ]),
        )
        .unwrap();
    let mut shallow = resolver(registry.clone());
    assert_round_trip(&Pattern::reference("Data"), &mut shallow);

    let mut deeper = Resolver::new(
        Arc::new(registry),
        ResolverSettings {
            max_recursion_depth: 3,
            ..ResolverSettings::default()
        },
    );
    assert_round_trip(&Pattern::reference("Data"), &mut deeper);
}

#[test]
fn nullable_self_reference_ends_in_null() {
    let registry = PatternRegistry::new()
        .with("Node", Pattern::object([("next", Pattern::nullable(Pattern::reference("Node")))]))
        .unwrap();
    let mut resolver = resolver(registry);
    let value = assert_round_trip(&Pattern::reference("Node"), &mut resolver);
    assert_eq!(value, Value::from(json!({"next": null})));
}

#[test]
fn required_self_reference_is_unbounded() {
    let registry = PatternRegistry::new()
        .with("Node", Pattern::object([("next", Pattern::reference("Node"))]))
        .unwrap();
    let mut resolver = resolver(registry);
    assert_eq!(
        generate(&Pattern::reference("Node"), &mut resolver),
        Err(GenerationError::UnboundedRecursion {
            name: "Node".to_string(),
        })
    );
}

// ============================================================================
// SECTION: Unions
// ============================================================================

#[test]
fn discriminated_union_sets_the_discriminator_value() {
    let registry = PatternRegistry::new()
        .with("Cat", Pattern::object([("pet_type", Pattern::string()), ("age", Pattern::integer())]))
        .unwrap()
        .with("Dog", Pattern::object([("pet_type", Pattern::string()), ("bark", Pattern::boolean())]))
        .unwrap();
    let pattern = Pattern::AnyOf(
        AnyOfPattern::new(vec![Pattern::reference("Cat"), Pattern::reference("Dog")])
            .with_discriminator(Discriminator::new("pet_type").with_mapping("kitty", "Cat")),
    );
    let mut resolver = resolver(registry);
    let value = assert_round_trip(&pattern, &mut resolver);
    assert_eq!(value.as_object().and_then(|map| map.get("pet_type")), Some(&Value::string("kitty")));

    let row = ExampleRow::new("dog").with_cell("pet_type", "Dog");
    let dog = generate_with_row(&pattern, &mut resolver, &row).unwrap();
    assert!(dog.as_object().is_some_and(|map| map.contains_key("bark")));
}

#[test]
fn first_declared_member_is_generated() {
    let mut resolver = resolver(PatternRegistry::new());
    let pattern = Pattern::any_of(vec![Pattern::exact(Value::string("first")), Pattern::integer()]);
    assert_eq!(generate(&pattern, &mut resolver).unwrap(), Value::string("first"));
}

// ============================================================================
// SECTION: Example Rows
// ============================================================================

fn person() -> Pattern {
    Pattern::object([
        ("name", Pattern::string()),
        ("age", Pattern::integer()),
        ("address?", Pattern::object([("city", Pattern::string())])),
    ])
}

#[test]
fn row_cells_override_keys_at_any_depth() {
    let mut resolver = resolver(PatternRegistry::new());
    let row = ExampleRow::new("adult").with_cell("age", "42").with_cell("city", "Pune");
    let value = generate_with_row(&person(), &mut resolver, &row).unwrap();
    let map = value.as_object().unwrap();
    assert_eq!(map.get("age"), Some(&Value::integer(42)));
    let city = map.get("address").and_then(Value::as_object).and_then(|address| address.get("city"));
    assert_eq!(city, Some(&Value::string("Pune")));
}

#[test]
fn row_cell_of_wrong_shape_is_rejected() {
    let mut resolver = resolver(PatternRegistry::new());
    let row = ExampleRow::new("bad").with_cell("age", "forty");
    assert!(matches!(
        generate_with_row(&person(), &mut resolver, &row),
        Err(GenerationError::InvalidExampleValue { key, .. }) if key == "age"
    ));
}

#[test]
fn request_body_cell_replaces_the_whole_value() {
    let mut resolver = resolver(PatternRegistry::new());
    let row = ExampleRow::new("jill").with_cell(REQUEST_BODY_COLUMN, r#"{"name": "Jill", "age": 30}"#);
    let value = generate_with_row(&person(), &mut resolver, &row).unwrap();
    assert_eq!(value, Value::from(json!({"name": "Jill", "age": 30})));
}

#[test]
fn same_seed_generates_same_values() {
    let registry = Arc::new(PatternRegistry::new());
    let pattern = person();
    let mut first = Resolver::with_defaults(Arc::clone(&registry));
    let mut second = Resolver::with_defaults(registry);
    assert_eq!(generate(&pattern, &mut first).unwrap(), generate(&pattern, &mut second).unwrap());
}
