// crates/contract-gate-scenario/src/error.rs
// ============================================================================
// Module: Contract Gate Scenario Errors
// Description: Scenario selection and test execution errors.
// Purpose: Carry every rejected candidate's explanation to the caller.
// Dependencies: contract-gate-core, thiserror
// ============================================================================

//! ## Overview
//! [`NoMatchingScenario`] is raised only after every scenario was tried; it
//! keeps one failure per candidate so the caller can show why each was
//! rejected. [`StubError`] adds the generation failures a stub response can
//! hit. [`ExecutionError`] is the error type of the external test executor.

// ============================================================================
// SECTION: Imports
// ============================================================================

use contract_gate_core::Failure;
use contract_gate_core::GenerationError;
use thiserror::Error;

// ============================================================================
// SECTION: No Matching Scenario
// ============================================================================

/// No scenario accepted a request or request/response pair.
///
/// # Invariants
/// - `rejections` holds one entry per candidate, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no scenario matched the request:\n{}", render_rejections(.rejections))]
pub struct NoMatchingScenario {
    /// Scenario label and the failure that rejected it.
    pub rejections: Vec<(String, Failure)>,
}

impl NoMatchingScenario {
    /// Renders every rejection with its breadcrumb report.
    #[must_use]
    pub fn report_string(&self) -> String {
        render_rejections(&self.rejections)
    }
}

/// Renders rejections, one labelled report per scenario.
fn render_rejections(rejections: &[(String, Failure)]) -> String {
    if rejections.is_empty() {
        return "the contract declares no scenarios".to_string();
    }
    rejections
        .iter()
        .map(|(label, failure)| format!("In scenario \"{label}\"\n{}", failure.report_string()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ============================================================================
// SECTION: Stub Errors
// ============================================================================

/// Stub response selection errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StubError {
    /// No scenario accepted the request.
    #[error(transparent)]
    NoMatch(#[from] NoMatchingScenario),
    /// The selected scenario declares no 2xx response.
    #[error("scenario {scenario} declares no success response")]
    NoSuccessResponse {
        /// Selected scenario name.
        scenario: String,
    },
    /// The response body could not be generated.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

// ============================================================================
// SECTION: Execution Errors
// ============================================================================

/// Failure reported by a test executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("test execution failed: {message}")]
pub struct ExecutionError {
    /// Executor diagnostic.
    pub message: String,
}

impl ExecutionError {
    /// Creates an execution error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
