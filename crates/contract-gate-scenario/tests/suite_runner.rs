// crates/contract-gate-scenario/tests/suite_runner.rs
// ============================================================================
// Module: Suite Runner Tests
// Description: Case enumeration, workflow chaining, and cancellation.
// Purpose: Run whole suites against in-process fake services.
// ============================================================================

//! ## Overview
//! The fake orders service hands out id 4242 on create and only knows that
//! order afterwards, so the lookup passes only when the captured id is
//! injected into its path.

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

use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use contract_gate_config::ContractGateConfig;
use contract_gate_config::SuiteConfig;
use contract_gate_core::Pattern;
use contract_gate_core::PatternRegistry;
use contract_gate_core::ResolverSettings;
use contract_gate_core::Value;
use contract_gate_scenario::CaseKind;
use contract_gate_scenario::Contract;
use contract_gate_scenario::ExecutionError;
use contract_gate_scenario::ExpectedResponse;
use contract_gate_scenario::HttpRequest;
use contract_gate_scenario::HttpRequestPattern;
use contract_gate_scenario::HttpResponse;
use contract_gate_scenario::HttpResponsePattern;
use contract_gate_scenario::NamedExample;
use contract_gate_scenario::OutcomeStatus;
use contract_gate_scenario::PathPattern;
use contract_gate_scenario::Scenario;
use contract_gate_scenario::StatusCode;
use contract_gate_scenario::SuiteRunner;
use contract_gate_scenario::TestExecutor;
use contract_gate_scenario::TestSuite;
use contract_gate_scenario::Workflow;
use contract_gate_scenario::workflow::value_at;
use serde_json::json;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const WORKFLOW: &str = r#"
[suite]
include_negative = false

[workflow.ids."POST /orders -> 201"]
extract = "BODY.id"

[workflow.ids."GET /orders/{orderId} -> 200"]
use = "PATH.orderId"
"#;

fn orders() -> Contract {
    let create = HttpRequestPattern::new("POST", PathPattern::literal("/orders"))
        .with_body(Pattern::object([("item", Pattern::string())]), Some("application/json"));
    let created = HttpResponsePattern::new(StatusCode::parse("201").unwrap())
        .with_body(Pattern::object([("id", Pattern::integer())]), Some("application/json"));
    let path = PathPattern::new("/orders/{orderId}", [("orderId", Pattern::integer())]).unwrap();
    let found = HttpResponsePattern::new(StatusCode::parse("200").unwrap())
        .with_body(Pattern::object([("id", Pattern::integer())]), Some("application/json"));
    Contract::new(PatternRegistry::new(), vec![
        Scenario::new("create order", create).with_response(created),
        Scenario::new("get order", HttpRequestPattern::new("GET", path)).with_response(found),
    ])
    .unwrap()
}

/// In-process orders service that knows a single order, id 4242.
#[derive(Default)]
struct OrdersService {
    seen: Mutex<Vec<HttpRequest>>,
}

impl TestExecutor for OrdersService {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ExecutionError> {
        self.seen.lock().unwrap().push(request.clone());
        let response = match (request.method.as_str(), request.path.as_str()) {
            ("POST", "/orders") => match value_at(&request.body, &["item".to_string()]) {
                Some(Value::Str(_)) => HttpResponse::new(201).with_body(Value::from(json!({"id": 4242}))),
                _ => HttpResponse::new(400),
            },
            ("GET", "/orders/4242") => HttpResponse::new(200).with_body(Value::from(json!({"id": 4242}))),
            _ => HttpResponse::new(404),
        };
        Ok(response)
    }
}

/// Service that always answers 500 and counts calls.
#[derive(Default)]
struct BrokenService {
    calls: AtomicUsize,
}

impl TestExecutor for BrokenService {
    fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, ExecutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(HttpResponse::new(500))
    }
}

/// Service whose transport always fails.
struct UnreachableService;

impl TestExecutor for UnreachableService {
    fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, ExecutionError> {
        Err(ExecutionError::new("connection refused"))
    }
}

fn runner(config: SuiteConfig) -> SuiteRunner {
    SuiteRunner::new(ResolverSettings::default(), Workflow::default(), config)
}

// ============================================================================
// SECTION: Enumeration
// ============================================================================

#[test]
fn positives_come_first_then_negatives_expecting_client_errors() {
    let contract = orders();
    let suite = TestSuite::new(&contract, SuiteConfig::default(), ResolverSettings::default());
    let cases: Vec<_> = suite.cases().collect();
    let labels: Vec<&str> = cases.iter().map(|case| case.label.as_str()).collect();
    assert_eq!(labels, vec![
        "create order",
        "get order",
        "REQUEST.BODY.item mandatory key not sent",
        "REQUEST.PATH.orderId mandatory path param not sent",
    ]);
    assert!(cases[..2].iter().all(|case| case.kind == CaseKind::Positive && case.bindings));
    assert!(cases[2..].iter().all(|case| {
        case.kind == CaseKind::Negative && !case.bindings && case.expected == ExpectedResponse::AnyClientError
    }));
    assert_eq!(suite.cases().count(), cases.len());
}

#[test]
fn examples_multiply_positive_cases() {
    let request = HttpRequestPattern::new("POST", PathPattern::literal("/orders"))
        .with_body(Pattern::object([("item", Pattern::string())]), Some("application/json"));
    let scenario = Scenario::new("create order", request)
        .with_response(HttpResponsePattern::new(StatusCode::parse("201").unwrap()))
        .with_response(HttpResponsePattern::new(StatusCode::parse("400").unwrap()))
        .with_example(NamedExample::new("book").with_cell("item", "book"))
        .with_example(NamedExample::new("lamp").with_cell("item", "lamp"));
    let contract = Contract::new(PatternRegistry::new(), vec![scenario]).unwrap();
    let suite = TestSuite::new(&contract, SuiteConfig::default(), ResolverSettings::default());
    let cases: Vec<_> = suite.cases().collect();
    let labels: Vec<&str> = cases.iter().map(|case| case.label.as_str()).collect();
    assert_eq!(labels, vec![
        "create order | EX:book",
        "create order | EX:lamp",
        "REQUEST.BODY.item mandatory key not sent | EX:book",
        "REQUEST.BODY.item mandatory key not sent | EX:lamp",
    ]);
    assert_eq!(cases[2].expected.status(), Some(400));
}

// ============================================================================
// SECTION: Workflow
// ============================================================================

#[test]
fn captured_id_reaches_the_next_step() {
    let config = ContractGateConfig::from_toml_str(WORKFLOW).unwrap();
    let runner = SuiteRunner::from_config(&config).unwrap();
    let service = OrdersService::default();
    let report = runner.run(&orders(), &service);
    assert!(report.all_passed(), "{}", report.report_string());
    assert_eq!(report.passed(), 2);
    let seen = service.seen.lock().unwrap();
    assert_eq!(seen[1].path, "/orders/4242");
}

#[test]
fn without_workflow_the_lookup_misses() {
    let config = SuiteConfig {
        include_negative: false,
        fail_fast: false,
    };
    let report = runner(config).run(&orders(), &OrdersService::default());
    assert_eq!(report.passed(), 1);
    assert_eq!(report.failed(), 1);
    let OutcomeStatus::Failed(reason) = &report.outcomes[1].status else {
        panic!("lookup should fail");
    };
    assert!(reason.contains("RESPONSE.STATUS"));
}

#[test]
fn negatives_pass_against_a_validating_service() {
    let toml = WORKFLOW.replace("include_negative = false", "include_negative = true");
    let config = ContractGateConfig::from_toml_str(&toml).unwrap();
    let report = SuiteRunner::from_config(&config).unwrap().run(&orders(), &OrdersService::default());
    assert_eq!(report.outcomes.len(), 4);
    assert!(report.all_passed(), "{}", report.report_string());
    assert!(report.outcomes[2..].iter().all(|outcome| outcome.kind == CaseKind::Negative));
}

// ============================================================================
// SECTION: Cancellation
// ============================================================================

#[test]
fn fail_fast_abandons_the_rest_of_the_chain() {
    let config = SuiteConfig {
        include_negative: true,
        fail_fast: true,
    };
    let report = runner(config).run(&orders(), &BrokenService::default());
    assert!(!report.all_passed());
    assert_eq!(report.outcomes.len(), 4);
    assert!(report.failed() >= 1);
    assert_eq!(report.outcomes[1].status, OutcomeStatus::Cancelled);
}

#[test]
fn cancelled_runner_starts_nothing() {
    let runner = runner(SuiteConfig::default());
    runner.cancel();
    let service = BrokenService::default();
    let report = runner.run(&orders(), &service);
    assert_eq!(report.cancelled(), report.outcomes.len());
    assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    assert!(runner.cancellation_flag().load(Ordering::SeqCst));
}

#[test]
fn executor_errors_are_reported_not_raised() {
    let report = runner(SuiteConfig::default()).run(&orders(), &UnreachableService);
    assert_eq!(report.failed(), report.outcomes.len());
    assert!(report.outcomes.iter().all(|outcome| matches!(outcome.status, OutcomeStatus::Errored(_))));
    assert!(report.report_string().contains("connection refused"));
}
