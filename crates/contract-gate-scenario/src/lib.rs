// crates/contract-gate-scenario/src/lib.rs
// ============================================================================
// Module: Contract Gate Scenario Library
// Description: HTTP scenarios, negative variants, stubs, and the suite runner.
// Purpose: Turn a validated contract into stub answers and contract tests.
// Dependencies: contract-gate-config, contract-gate-core, rayon, tracing
// ============================================================================

//! ## Overview
//! `contract-gate-scenario` lifts the core pattern engine to HTTP. A
//! [`Contract`] bundles a frozen pattern registry with [`Scenario`]s, each a
//! request pattern plus response patterns per status and named examples.
//! On top of that the crate provides:
//! - request/response matching with `REQUEST.`/`RESPONSE.` breadcrumbs;
//! - request and response generation, honoring examples and workflow
//!   bindings;
//! - negative variant enumeration and the restartable [`TestSuite`];
//! - [`StubSelector`] for serving requests from the contract;
//! - [`SuiteRunner`], which executes chains in parallel through a caller
//!   supplied [`TestExecutor`].
//!
//! Transport, contract loading, and report output belong to the embedding
//! application.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod contract;
pub mod error;
pub mod http;
pub mod http_generate;
pub mod http_match;
pub mod negative;
pub mod runner;
pub mod stub;
pub mod suite;
pub mod workflow;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use contract::Contract;
pub use contract::NamedExample;
pub use contract::Scenario;
pub use error::ExecutionError;
pub use error::NoMatchingScenario;
pub use error::StubError;
pub use http::HttpRequest;
pub use http::HttpRequestPattern;
pub use http::HttpResponse;
pub use http::HttpResponsePattern;
pub use http::Parameter;
pub use http::ParameterLocation;
pub use http::PathPattern;
pub use http::PathSegment;
pub use http::SecurityScheme;
pub use http::StatusCode;
pub use http_generate::generate_request;
pub use http_generate::generate_response;
pub use http_match::match_request;
pub use http_match::match_response;
pub use negative::NegativeVariant;
pub use negative::NegativeVariants;
pub use negative::negative_variants;
pub use runner::OutcomeStatus;
pub use runner::SuiteReport;
pub use runner::SuiteRunner;
pub use runner::TestExecutor;
pub use runner::TestOutcome;
pub use stub::StubMatch;
pub use stub::StubSelector;
pub use suite::CaseKind;
pub use suite::ExpectedResponse;
pub use suite::TestCase;
pub use suite::TestCases;
pub use suite::TestSuite;
pub use workflow::BindingStore;
pub use workflow::Workflow;
