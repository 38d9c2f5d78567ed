// crates/contract-gate-scenario/src/suite.rs
// ============================================================================
// Module: Contract Gate Test Suite
// Description: Enumerate positive and negative test cases for a contract.
// Purpose: Hand the runner a finite, restartable sequence of test cases.
// Dependencies: contract-gate-config, contract-gate-core, crate::{contract, http, negative}
// ============================================================================

//! ## Overview
//! Positive cases come first: one per scenario, or one per named example
//! labelled `<scenario> | EX:<name>`. Negative cases follow scenario by
//! scenario when the suite includes them. A negative case expects the
//! scenario's declared rejection response, or any 4xx status when none is
//! declared. Negative cases never take workflow bindings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use contract_gate_config::SuiteConfig;
use contract_gate_core::ExampleRow;
use contract_gate_core::MatchResult;
use contract_gate_core::Resolver;
use contract_gate_core::ResolverSettings;

use crate::contract::Contract;
use crate::contract::Scenario;
use crate::http::HttpRequestPattern;
use crate::http::HttpResponse;
use crate::http::HttpResponsePattern;
use crate::http_match::match_response;
use crate::negative::NegativeVariants;
use crate::negative::negative_variants;

// ============================================================================
// SECTION: Test Cases
// ============================================================================

/// Whether a case expects acceptance or rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseKind {
    /// Valid request expecting a success response.
    Positive,
    /// Mutated request expecting a client error.
    Negative,
}

/// Response a case expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedResponse {
    /// A declared response pattern.
    Declared(HttpResponsePattern),
    /// Any 2xx status; used when no success response is declared.
    AnySuccess,
    /// Any 4xx status; used when no rejection response is declared.
    AnyClientError,
}

impl ExpectedResponse {
    /// Returns the declared status, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Declared(pattern) => Some(pattern.status.as_u16()),
            Self::AnySuccess | Self::AnyClientError => None,
        }
    }

    /// Checks an actual response.
    #[must_use]
    pub fn check(&self, response: &HttpResponse, resolver: &mut Resolver) -> MatchResult {
        let (accepted, class) = match self {
            Self::Declared(pattern) => return match_response(response, pattern, resolver),
            Self::AnySuccess => ((200..300).contains(&response.status), "2xx"),
            Self::AnyClientError => ((400..500).contains(&response.status), "4xx"),
        };
        if accepted {
            MatchResult::Success
        } else {
            MatchResult::failure(format!("Expected a {class} status, actual was {}", response.status))
                .breadcrumb("STATUS")
                .breadcrumb("RESPONSE")
        }
    }
}

/// One executable test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Index of the scenario in the contract.
    pub scenario: usize,
    /// Human label.
    pub label: String,
    /// Positive or negative.
    pub kind: CaseKind,
    /// Request pattern to generate from.
    pub request: HttpRequestPattern,
    /// Example cells that override generation.
    pub row: Option<ExampleRow>,
    /// Expected response.
    pub expected: ExpectedResponse,
    /// True when workflow bindings may be captured and injected.
    pub bindings: bool,
}

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Test-case source over a validated contract.
#[derive(Debug, Clone)]
pub struct TestSuite<'c> {
    /// Contract under test.
    contract: &'c Contract,
    /// Suite settings.
    config: SuiteConfig,
    /// Resolver settings used to plan negative variants.
    settings: ResolverSettings,
}

impl<'c> TestSuite<'c> {
    /// Creates a suite.
    #[must_use]
    pub const fn new(contract: &'c Contract, config: SuiteConfig, settings: ResolverSettings) -> Self {
        Self {
            contract,
            config,
            settings,
        }
    }

    /// Returns a fresh sequence of every case.
    #[must_use]
    pub fn cases(&self) -> TestCases<'c> {
        TestCases {
            contract: self.contract,
            resolver: self.contract.resolver(self.settings.clone()),
            include_negative: self.config.include_negative,
            positives: positive_cases(self.contract).into_iter(),
            scenario: 0,
            negatives: None,
        }
    }
}

/// Builds every positive case in scenario order.
fn positive_cases(contract: &Contract) -> Vec<TestCase> {
    let mut cases = Vec::new();
    for (index, scenario) in contract.scenarios().iter().enumerate() {
        let expected = scenario.success_response().cloned().map_or(ExpectedResponse::AnySuccess, ExpectedResponse::Declared);
        if scenario.examples.is_empty() {
            cases.push(TestCase {
                scenario: index,
                label: scenario.name.clone(),
                kind: CaseKind::Positive,
                request: scenario.request.clone(),
                row: None,
                expected: expected.clone(),
                bindings: true,
            });
        }
        for example in &scenario.examples {
            cases.push(TestCase {
                scenario: index,
                label: format!("{} | EX:{}", scenario.name, example.name),
                kind: CaseKind::Positive,
                request: scenario.request.clone(),
                row: Some(example.request.clone()),
                expected: expected.clone(),
                bindings: true,
            });
        }
    }
    cases
}

/// Expected response for a negative case of a scenario.
fn rejection(scenario: &Scenario) -> ExpectedResponse {
    scenario.rejection_response().cloned().map_or(ExpectedResponse::AnyClientError, ExpectedResponse::Declared)
}

// ============================================================================
// SECTION: Case Sequence
// ============================================================================

/// Lazy sequence of test cases; negative cases are built on demand.
#[derive(Debug)]
pub struct TestCases<'c> {
    /// Contract under test.
    contract: &'c Contract,
    /// Resolver used only to plan negative variants.
    resolver: Resolver,
    /// Whether negative cases follow the positive ones.
    include_negative: bool,
    /// Remaining positive cases.
    positives: std::vec::IntoIter<TestCase>,
    /// Index of the next scenario to plan negatives for.
    scenario: usize,
    /// Negative variants of the scenario before `scenario`.
    negatives: Option<(usize, NegativeVariants<'c>)>,
}

impl Iterator for TestCases<'_> {
    type Item = TestCase;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(case) = self.positives.next() {
            return Some(case);
        }
        if !self.include_negative {
            return None;
        }
        loop {
            if let Some((index, variants)) = &mut self.negatives
                && let Some(variant) = variants.next()
            {
                let scenario = self.contract.scenarios().get(*index)?;
                return Some(TestCase {
                    scenario: *index,
                    label: variant.label,
                    kind: CaseKind::Negative,
                    request: variant.request,
                    row: variant.row,
                    expected: rejection(scenario),
                    bindings: false,
                });
            }
            let index = self.scenario;
            let scenario = self.contract.scenarios().get(index)?;
            self.negatives = Some((index, negative_variants(scenario, &self.resolver)));
            self.scenario += 1;
        }
    }
}
