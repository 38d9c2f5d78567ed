// crates/contract-gate-core/tests/matching.rs
// ============================================================================
// Module: Matcher Tests
// Description: Structural matching across objects, lists, unions, and references.
// Purpose: Pin breadcrumb paths, messages, and union semantics.
// ============================================================================

//! ## Overview
//! Exercises the matcher against the canonical contract shapes: closed and
//! free-form objects, discriminated unions, aggregated list failures,
//! self-referential schemas, and allOf merges.

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

use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use contract_gate_core::AdditionalProperties;
use contract_gate_core::AnyOfPattern;
use contract_gate_core::Bound;
use contract_gate_core::Discriminator;
use contract_gate_core::MatchResult;
use contract_gate_core::NumberKind;
use contract_gate_core::ObjectPattern;
use contract_gate_core::Pattern;
use contract_gate_core::PatternRegistry;
use contract_gate_core::Resolver;
use contract_gate_core::Value;
use contract_gate_core::match_value;
use contract_gate_core::report_string;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn resolver(registry: PatternRegistry) -> Resolver {
    registry.validate().unwrap();
    Resolver::with_defaults(Arc::new(registry))
}

fn leaf_paths(result: &MatchResult) -> Vec<String> {
    result.as_failure().map(|failure| failure.leaf_paths()).unwrap_or_default()
}

fn pets() -> PatternRegistry {
    PatternRegistry::new()
        .with("Cat", Pattern::object([("pet_type", Pattern::string()), ("age?", Pattern::integer())]))
        .unwrap()
        .with("Dog", Pattern::object([("pet_type", Pattern::string()), ("bark?", Pattern::boolean())]))
        .unwrap()
}

fn pet_union(discriminator: Discriminator) -> Pattern {
    Pattern::AnyOf(
        AnyOfPattern::new(vec![Pattern::reference("Cat"), Pattern::reference("Dog")])
            .with_discriminator(discriminator),
    )
}

// ============================================================================
// SECTION: Objects
// ============================================================================

#[test]
fn closed_object_rejects_undeclared_key_by_name() {
    let pattern = Pattern::object([("id", Pattern::integer())]);
    let mut resolver = resolver(PatternRegistry::new());

    let ok = Value::from(json!({"id": 10}));
    assert!(match_value(&ok, &pattern, &mut resolver).is_success());

    let extra = Value::from(json!({"id": 10, "name": "Jill"}));
    let result = match_value(&extra, &pattern, &mut resolver);
    assert_eq!(leaf_paths(&result), vec!["name".to_string()]);
    assert!(report_string(&result).contains("Key named \"name\" was unexpected"));
}

#[test]
fn free_form_object_accepts_null_but_not_scalars() {
    let pattern = Pattern::Object(
        ObjectPattern::from_keys([("id", Pattern::integer())]).with_additional(AdditionalProperties::FreeForm),
    );
    let mut resolver = resolver(PatternRegistry::new());

    let with_null = Value::from(json!({"id": 10, "address": null}));
    assert!(match_value(&with_null, &pattern, &mut resolver).is_success());

    let bare = Value::string("just text");
    let result = match_value(&bare, &pattern, &mut resolver);
    assert!(report_string(&result).contains("Expected object, actual was \"just text\" (string)"));
}

#[test]
fn pattern_constrained_extra_keys_must_match() {
    let pattern = Pattern::Object(
        ObjectPattern::from_keys([("id", Pattern::integer())])
            .with_additional(AdditionalProperties::PatternConstrained(Box::new(Pattern::integer()))),
    );
    let mut resolver = resolver(PatternRegistry::new());
    assert!(match_value(&Value::from(json!({"id": 1, "n": 2})), &pattern, &mut resolver).is_success());
    let result = match_value(&Value::from(json!({"id": 1, "n": "x"})), &pattern, &mut resolver);
    assert_eq!(leaf_paths(&result), vec!["n".to_string()]);
}

#[test]
fn all_of_required_keys_stay_local() {
    let registry = PatternRegistry::new()
        .with("Address", Pattern::object([("street", Pattern::string()), ("zip?", Pattern::string())]))
        .unwrap()
        .with("Base", Pattern::object([("id", Pattern::integer())]))
        .unwrap();
    let extra = Pattern::object([("address", Pattern::reference("Address"))]);
    let merged = ObjectPattern::merge_all_of(&[Pattern::reference("Base"), extra], &registry).unwrap();
    assert!(merged.is_required("id"));
    assert!(merged.is_required("address"));
    assert!(!merged.is_required("street"));

    let mut resolver = resolver(registry);
    let value = Value::from(json!({"id": 1, "address": {"street": "Main"}}));
    assert!(match_value(&value, &Pattern::Object(merged.clone()), &mut resolver).is_success());

    let missing_street = Value::from(json!({"id": 1, "address": {"zip": "12345"}}));
    let result = match_value(&missing_street, &Pattern::Object(merged), &mut resolver);
    assert_eq!(leaf_paths(&result), vec!["address.street".to_string()]);
}

#[test]
fn all_of_rejects_non_object_parts() {
    let registry = PatternRegistry::new().with("Name", Pattern::string()).unwrap();
    assert!(ObjectPattern::merge_all_of(&[Pattern::reference("Name")], &registry).is_err());
    assert!(ObjectPattern::merge_all_of(&[Pattern::reference("Missing")], &registry).is_err());
}

// ============================================================================
// SECTION: Lists
// ============================================================================

#[test]
fn list_failures_are_aggregated_per_index() {
    let pattern = Pattern::list_of(Pattern::object([("id", Pattern::string()), ("name", Pattern::string())]));
    let mut resolver = resolver(PatternRegistry::new());
    let value = Value::from(json!([{"id": "123", "name": "Jack"}, {"id": "456"}]));

    let result = match_value(&value, &pattern, &mut resolver);
    assert_eq!(leaf_paths(&result), vec!["[1].name".to_string()]);

    let report = result.breadcrumb("BODY").breadcrumb("REQUEST").report_string();
    assert_eq!(report, ">> REQUEST.BODY[1].name\n   Expected key named \"name\" was missing");
}

#[test]
fn every_bad_element_is_reported() {
    let pattern = Pattern::list_of(Pattern::integer());
    let mut resolver = resolver(PatternRegistry::new());
    let value = Value::from(json!([1, "two", 3, false]));
    let result = match_value(&value, &pattern, &mut resolver);
    assert_eq!(leaf_paths(&result), vec!["[1]".to_string(), "[3]".to_string()]);
}

// ============================================================================
// SECTION: Unions
// ============================================================================

#[test]
fn discriminator_selects_the_named_member() {
    let mut resolver = resolver(pets());
    let pattern = pet_union(Discriminator::new("pet_type"));

    let cat = Value::from(json!({"pet_type": "Cat", "age": 3}));
    assert!(match_value(&cat, &pattern, &mut resolver).is_success());

    let barking_cat = Value::from(json!({"pet_type": "Cat", "bark": true}));
    let result = match_value(&barking_cat, &pattern, &mut resolver);
    assert_eq!(leaf_paths(&result), vec!["bark".to_string()]);

    let anonymous = Value::from(json!({"age": 3}));
    let result = match_value(&anonymous, &pattern, &mut resolver);
    assert!(report_string(&result).contains("Expected key named \"pet_type\" was missing"));
}

#[test]
fn user_mapping_wins_over_implied_names() {
    let mut resolver = resolver(pets());
    let pattern = pet_union(Discriminator::new("pet_type").with_mapping("kitty", "Cat"));
    let kitty = Value::from(json!({"pet_type": "kitty", "age": 2}));
    assert!(match_value(&kitty, &pattern, &mut resolver).is_success());
    let kitty_bark = Value::from(json!({"pet_type": "kitty", "bark": true}));
    assert!(!match_value(&kitty_bark, &pattern, &mut resolver).is_success());
}

#[test]
fn unknown_discriminator_value_fails() {
    let mut resolver = resolver(pets());
    let pattern = pet_union(Discriminator::new("pet_type"));
    let value = Value::from(json!({"pet_type": "Parrot"}));
    let result = match_value(&value, &pattern, &mut resolver);
    assert_eq!(leaf_paths(&result), vec!["pet_type".to_string()]);
}

#[test]
fn failed_union_lists_every_alternative() {
    let pattern = Pattern::any_of(vec![Pattern::integer(), Pattern::boolean()]);
    let mut resolver = resolver(PatternRegistry::new());
    let result = match_value(&Value::string("x"), &pattern, &mut resolver);
    let failure = result.as_failure().unwrap();
    assert_eq!(failure.causes.len(), 2);
    let report = result.report_string();
    assert!(report.contains("Alternative 1:"));
    assert!(report.contains("Alternative 2:"));
    assert!(report.contains("Expected boolean"));
}

#[test]
fn nullable_accepts_null_and_member() {
    let pattern = Pattern::nullable(Pattern::string());
    let mut resolver = resolver(PatternRegistry::new());
    assert!(match_value(&Value::Null, &pattern, &mut resolver).is_success());
    assert!(match_value(&Value::string("a"), &pattern, &mut resolver).is_success());
    assert!(!match_value(&Value::integer(1), &pattern, &mut resolver).is_success());
}

// ============================================================================
// SECTION: References
// ============================================================================

fn data_registry() -> PatternRegistry {
    PatternRegistry::new()
        .with(
            "Data",
            Pattern::object([
                ("id", Pattern::number()),
                ("data?", Pattern::list_of(Pattern::reference("Data"))),
            ]),
        )
        .unwrap()
}

fn nested_data(depth: usize) -> serde_json::Value {
    let mut value = json!({"id": depth});
    for level in (0..depth).rev() {
        value = json!({"id": level, "data": [value]});
    }
    value
}

#[test]
fn self_referential_list_matches_at_any_depth() {
    let mut resolver = resolver(data_registry());
    let pattern = Pattern::reference("Data");
    for depth in [0, 1, 25] {
        let value = Value::from(nested_data(depth));
        assert!(match_value(&value, &pattern, &mut resolver).is_success(), "depth {depth}");
    }
}

#[test]
fn nested_reference_failure_has_full_path() {
    let mut resolver = resolver(data_registry());
    let value = Value::from(json!({"id": 1, "data": [{"id": 2, "data": [{"id": "three"}]}]}));
    let result = match_value(&value, &Pattern::reference("Data"), &mut resolver);
    assert_eq!(leaf_paths(&result), vec!["data[0].data[0].id".to_string()]);
}

#[test]
fn reference_only_cycle_terminates() {
    let registry = PatternRegistry::new().with("Loop", Pattern::reference("Loop")).unwrap();
    let mut resolver = resolver(registry);
    let result = match_value(&Value::integer(1), &Pattern::reference("Loop"), &mut resolver);
    assert!(report_string(&result).contains("refers to itself"));
}

// ============================================================================
// SECTION: Numbers
// ============================================================================

#[test]
fn decimal_bounds_do_not_round() {
    let limit = BigDecimal::from_str("0.1").unwrap();
    let pattern = Pattern::bounded(NumberKind::Decimal, None, Some(Bound::exclusive(limit)));
    let mut resolver = resolver(PatternRegistry::new());
    let above = Value::decimal("0.1000000000000000000001").unwrap();
    let below = Value::decimal("0.0999999999999999999999").unwrap();
    assert!(!match_value(&above, &pattern, &mut resolver).is_success());
    assert!(match_value(&below, &pattern, &mut resolver).is_success());
    assert!(match_value(&Value::integer(0), &pattern, &mut resolver).is_success());
}

#[test]
fn integer_kind_rejects_fractions() {
    let mut resolver = resolver(PatternRegistry::new());
    let result = match_value(&Value::decimal("1.5").unwrap(), &Pattern::integer(), &mut resolver);
    assert!(report_string(&result).contains("Expected integer"));
    assert!(match_value(&Value::decimal("2.0").unwrap(), &Pattern::integer(), &mut resolver).is_success());
}
