// crates/contract-gate-scenario/src/runner.rs
// ============================================================================
// Module: Contract Gate Suite Runner
// Description: Execute test cases in parallel chains against an external executor.
// Purpose: Produce a deterministic suite report from concurrent chains.
// Dependencies: contract-gate-config, contract-gate-core, rayon, tracing, crate::*
// ============================================================================

//! ## Overview
//! Positive cases form one ordered chain so workflow bindings captured by an
//! earlier step reach later steps. Every negative case is its own chain.
//! Chains run on the rayon pool; each owns a forked resolver and a fresh
//! [`BindingStore`], so no state is shared between chains. Outcomes are
//! appended to one mutex-guarded collection and sorted by chain and position
//! before reporting.
//!
//! Cancellation abandons chains and steps that have not started yet. It is
//! triggered through [`SuiteRunner::cancel`] or by the first failure when the
//! suite runs fail-fast.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use contract_gate_config::ConfigError;
use contract_gate_config::ContractGateConfig;
use contract_gate_config::SuiteConfig;
use contract_gate_core::MatchResult;
use contract_gate_core::ResolverSettings;
use rayon::prelude::*;
use tracing::info;
use tracing::warn;

use crate::contract::Contract;
use crate::error::ExecutionError;
use crate::http::HttpRequest;
use crate::http::HttpResponse;
use crate::http_generate::generate_request;
use crate::suite::CaseKind;
use crate::suite::TestCase;
use crate::suite::TestSuite;
use crate::workflow::BindingStore;
use crate::workflow::Workflow;

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Sends a generated request to the system under test.
pub trait TestExecutor: Sync {
    /// Executes one request.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] when no response could be obtained.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ExecutionError>;
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Result of one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// The response matched.
    Passed,
    /// The response did not match; holds the breadcrumb report.
    Failed(String),
    /// The request could not be generated or executed.
    Errored(String),
    /// The case was abandoned before it started.
    Cancelled,
}

/// Outcome of one executed or abandoned case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    /// Case label.
    pub label: String,
    /// Scenario name.
    pub scenario: String,
    /// Positive or negative.
    pub kind: CaseKind,
    /// Request sent, when one was generated.
    pub request: Option<HttpRequest>,
    /// Response received, when the executor returned one.
    pub response: Option<HttpResponse>,
    /// Outcome status.
    pub status: OutcomeStatus,
}

/// Ordered outcomes of a suite run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteReport {
    /// Outcomes ordered by chain, then by position within the chain.
    pub outcomes: Vec<TestOutcome>,
}

impl SuiteReport {
    /// Counts passed cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::Passed))
    }

    /// Counts failed and errored cases.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::Failed(_) | OutcomeStatus::Errored(_)))
    }

    /// Counts cancelled cases.
    #[must_use]
    pub fn cancelled(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::Cancelled))
    }

    /// Returns true when every case ran and passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.status == OutcomeStatus::Passed)
    }

    /// Renders a summary line followed by every unsuccessful case.
    #[must_use]
    pub fn report_string(&self) -> String {
        let mut lines = vec![format!(
            "Passed: {}, Failed: {}, Cancelled: {}",
            self.passed(),
            self.failed(),
            self.cancelled()
        )];
        for outcome in &self.outcomes {
            match &outcome.status {
                OutcomeStatus::Passed => {}
                OutcomeStatus::Failed(report) => lines.push(format!("FAILED {}\n{report}", outcome.label)),
                OutcomeStatus::Errored(reason) => lines.push(format!("ERROR {}\n   {reason}", outcome.label)),
                OutcomeStatus::Cancelled => lines.push(format!("CANCELLED {}", outcome.label)),
            }
        }
        lines.join("\n\n")
    }

    /// Counts outcomes whose status satisfies `predicate`.
    fn count(&self, predicate: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|outcome| predicate(&outcome.status)).count()
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report_string())
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Parallel suite runner.
#[derive(Debug, Clone)]
pub struct SuiteRunner {
    /// Resolver settings; each chain forks its own seed from these.
    settings: ResolverSettings,
    /// Workflow rules.
    workflow: Workflow,
    /// Suite settings.
    config: SuiteConfig,
    /// Caller-controlled cancellation flag.
    cancelled: Arc<AtomicBool>,
}

impl SuiteRunner {
    /// Creates a runner.
    #[must_use]
    pub fn new(settings: ResolverSettings, workflow: Workflow, config: SuiteConfig) -> Self {
        Self {
            settings,
            workflow,
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a runner from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the engine settings or a workflow
    /// rule are invalid.
    pub fn from_config(config: &ContractGateConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.engine.resolver_settings()?, Workflow::from_config(&config.workflow)?, config.suite))
    }

    /// Returns the shared cancellation flag.
    #[must_use]
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Abandons every chain and step that has not started.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Runs every case of the contract.
    pub fn run<E: TestExecutor>(&self, contract: &Contract, executor: &E) -> SuiteReport {
        let suite = TestSuite::new(contract, self.config, self.settings.clone());
        let (positives, negatives): (Vec<TestCase>, Vec<TestCase>) =
            suite.cases().partition(|case| case.kind == CaseKind::Positive);
        let mut chains = Vec::with_capacity(negatives.len() + 1);
        if !positives.is_empty() {
            chains.push(positives);
        }
        chains.extend(negatives.into_iter().map(|case| vec![case]));
        info!(scenarios = contract.scenarios().len(), chains = chains.len(), "starting contract test suite");

        let halted = AtomicBool::new(false);
        let collected = Mutex::new(Vec::new());
        chains.par_iter().enumerate().for_each(|(index, chain)| {
            let outcomes = self.run_chain(contract, executor, index, chain, &halted);
            let mut guard = collected.lock().unwrap_or_else(PoisonError::into_inner);
            guard.extend(outcomes.into_iter().enumerate().map(|(position, outcome)| (index, position, outcome)));
        });

        let mut entries = collected.into_inner().unwrap_or_else(PoisonError::into_inner);
        entries.sort_by_key(|(chain, position, _)| (*chain, *position));
        let report = SuiteReport {
            outcomes: entries.into_iter().map(|(_, _, outcome)| outcome).collect(),
        };
        info!(
            passed = report.passed(),
            failed = report.failed(),
            cancelled = report.cancelled(),
            "finished contract test suite"
        );
        report
    }

    /// Returns true when remaining work must be abandoned.
    fn is_cancelled(&self, halted: &AtomicBool) -> bool {
        self.cancelled.load(Ordering::SeqCst) || halted.load(Ordering::SeqCst)
    }

    /// Runs one chain in order with its own resolver and bindings.
    fn run_chain<E: TestExecutor>(
        &self,
        contract: &Contract,
        executor: &E,
        index: usize,
        chain: &[TestCase],
        halted: &AtomicBool,
    ) -> Vec<TestOutcome> {
        let mut resolver = contract.resolver(self.settings.clone()).fork(u64::try_from(index).unwrap_or(u64::MAX));
        let mut store = BindingStore::new();
        let mut outcomes = Vec::with_capacity(chain.len());
        for case in chain {
            let scenario = contract.scenarios().get(case.scenario);
            let mut outcome = TestOutcome {
                label: case.label.clone(),
                scenario: scenario.map(|scenario| scenario.name.clone()).unwrap_or_default(),
                kind: case.kind,
                request: None,
                response: None,
                status: OutcomeStatus::Cancelled,
            };
            if self.is_cancelled(halted) {
                warn!(label = %case.label, "test case cancelled before it started");
                outcomes.push(outcome);
                continue;
            }
            let Some(scenario) = scenario else {
                outcome.status = OutcomeStatus::Errored(format!("unknown scenario index {}", case.scenario));
                outcomes.push(outcome);
                continue;
            };
            let overrides = match (case.bindings, case.expected.status()) {
                (true, Some(status)) => self.workflow.overrides(scenario, status, &store),
                _ => Vec::new(),
            };
            outcome.status = match generate_request(&case.request, &mut resolver, case.row.as_ref(), &overrides) {
                Err(err) => OutcomeStatus::Errored(format!("request generation failed: {err}")),
                Ok(request) => {
                    let executed = executor.execute(&request);
                    outcome.request = Some(request);
                    match executed {
                        Err(err) => {
                            warn!(label = %case.label, error = %err, "test executor failed");
                            OutcomeStatus::Errored(err.to_string())
                        }
                        Ok(response) => {
                            let result = case.expected.check(&response, &mut resolver);
                            if case.bindings {
                                self.workflow.capture(scenario, &response, &mut store);
                            }
                            outcome.response = Some(response);
                            match result {
                                MatchResult::Success => OutcomeStatus::Passed,
                                MatchResult::Failure(failure) => OutcomeStatus::Failed(failure.report_string()),
                            }
                        }
                    }
                }
            };
            if self.config.fail_fast && outcome.status != OutcomeStatus::Passed {
                halted.store(true, Ordering::SeqCst);
            }
            outcomes.push(outcome);
        }
        outcomes
    }
}
