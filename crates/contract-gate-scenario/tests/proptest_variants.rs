// crates/contract-gate-scenario/tests/proptest_variants.rs
// ============================================================================
// Module: Request Variant Property Tests
// Description: Randomized checks that positives match and negatives do not.
// Purpose: Hold the positive/negative split for any seed and any bounds.
// ============================================================================

//! ## Overview
//! For arbitrary seeds and numeric bounds, a generated request must match its
//! scenario, and a request generated from any negative variant must not.

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

use contract_gate_core::Bound;
use contract_gate_core::NumberKind;
use contract_gate_core::Pattern;
use contract_gate_core::PatternRegistry;
use contract_gate_core::ResolverSettings;
use contract_gate_scenario::Contract;
use contract_gate_scenario::HttpRequestPattern;
use contract_gate_scenario::Parameter;
use contract_gate_scenario::PathPattern;
use contract_gate_scenario::Scenario;
use contract_gate_scenario::generate_request;
use contract_gate_scenario::match_request;
use contract_gate_scenario::negative_variants;
use proptest::prelude::*;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn contract(low: i64, span: i64) -> Contract {
    let quantity = Pattern::bounded(NumberKind::Integer, Some(Bound::inclusive(low)), Some(Bound::inclusive(low + span)));
    let path = PathPattern::new("/carts/{cartId}", [("cartId", Pattern::integer())]).unwrap();
    let request = HttpRequestPattern::new("PUT", path)
        .with_query(Parameter::required("quantity", quantity.clone()))
        .with_query(Parameter::optional("note", Pattern::string()))
        .with_header(Parameter::required("X-Dry-Run", Pattern::boolean()))
        .with_body(
            Pattern::object([("sku", Pattern::string()), ("count", quantity), ("gift?", Pattern::boolean())]),
            Some("application/json"),
        );
    Contract::new(PatternRegistry::new(), vec![Scenario::new("update cart", request)]).unwrap()
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #[test]
    fn positives_match_and_negatives_do_not(seed in any::<u64>(), low in -500_i64..500, span in 1_i64..200) {
        let contract = contract(low, span);
        let scenario = &contract.scenarios()[0];
        let mut resolver = contract.resolver(ResolverSettings {
            generative: true,
            seed,
            ..ResolverSettings::default()
        });

        let request = generate_request(&scenario.request, &mut resolver, None, &[]).unwrap();
        let result = match_request(&request, &scenario.request, &mut resolver);
        prop_assert!(result.is_success(), "{}", result.report_string());

        let variants: Vec<_> = negative_variants(scenario, &resolver).collect();
        prop_assert!(variants.len() >= 5);
        for variant in variants {
            let request = generate_request(&variant.request, &mut resolver, None, &[]).unwrap();
            prop_assert!(!match_request(&request, &scenario.request, &mut resolver).is_success(), "{}", variant.label);
        }
    }
}
