// crates/contract-gate-scenario/src/contract.rs
// ============================================================================
// Module: Contract Gate Contracts
// Description: Scenarios, named examples, and validated contracts.
// Purpose: Freeze a checked registry and its scenarios for matching and generation.
// Dependencies: contract-gate-core, crate::http
// ============================================================================

//! ## Overview
//! A [`Contract`] is the unit handed over by the contract-loading
//! collaborator: a registry of named patterns plus the scenarios that use
//! them. Construction validates the registry and every pattern a scenario
//! carries, then freezes the registry behind an [`Arc`] so resolvers on any
//! thread can share it without locks.
//!
//! Security posture: contracts are untrusted input; construction fails closed
//! on the first structural defect.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use contract_gate_core::ExampleRow;
use contract_gate_core::PatternRegistry;
use contract_gate_core::Resolver;
use contract_gate_core::ResolverSettings;
use contract_gate_core::SchemaError;
use contract_gate_core::Value;

use crate::http::HttpRequestPattern;
use crate::http::HttpResponsePattern;
use crate::http::ParameterLocation;
use crate::http::StatusCode;

// ============================================================================
// SECTION: Named Examples
// ============================================================================

/// Named example attached to a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedExample {
    /// Example name, used in `| EX:<name>` labels.
    pub name: String,
    /// Request cells keyed by parameter name, body key, or `(REQUEST-BODY)`.
    pub request: ExampleRow,
    /// Literal response body served when a stub request matches this example.
    pub response_body: Option<Value>,
}

impl NamedExample {
    /// Creates an example with no cells.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            request: ExampleRow::new(name.clone()),
            name,
            response_body: None,
        }
    }

    /// Adds a request cell.
    #[must_use]
    pub fn with_cell(mut self, column: impl Into<String>, text: impl Into<String>) -> Self {
        self.request = self.request.with_cell(column, text);
        self
    }

    /// Sets the literal response body.
    #[must_use]
    pub fn with_response_body(mut self, body: Value) -> Self {
        self.response_body = Some(body);
        self
    }
}

// ============================================================================
// SECTION: Scenarios
// ============================================================================

/// One operation with its responses and examples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Scenario name used in labels and reports.
    pub name: String,
    /// Request pattern.
    pub request: HttpRequestPattern,
    /// Response patterns by status.
    pub responses: BTreeMap<StatusCode, HttpResponsePattern>,
    /// Named examples in declaration order.
    pub examples: Vec<NamedExample>,
}

impl Scenario {
    /// Creates a scenario with no responses and no examples.
    #[must_use]
    pub fn new(name: impl Into<String>, request: HttpRequestPattern) -> Self {
        Self {
            name: name.into(),
            request,
            responses: BTreeMap::new(),
            examples: Vec::new(),
        }
    }

    /// Adds a response pattern, replacing any with the same status.
    #[must_use]
    pub fn with_response(mut self, response: HttpResponsePattern) -> Self {
        self.responses.insert(response.status, response);
        self
    }

    /// Adds a named example.
    #[must_use]
    pub fn with_example(mut self, example: NamedExample) -> Self {
        self.examples.push(example);
        self
    }

    /// Returns the lowest declared 2xx response.
    #[must_use]
    pub fn success_response(&self) -> Option<&HttpResponsePattern> {
        self.responses.values().find(|response| response.status.is_success())
    }

    /// Returns the declared 400 response, or else the lowest 4xx response.
    #[must_use]
    pub fn rejection_response(&self) -> Option<&HttpResponsePattern> {
        StatusCode::new(400)
            .and_then(|bad_request| self.responses.get(&bad_request))
            .or_else(|| self.responses.values().find(|response| response.status.is_client_error()))
    }

    /// Returns the workflow key `"METHOD PATH -> STATUS"` for a status.
    #[must_use]
    pub fn workflow_key(&self, status: u16) -> String {
        format!("{} {} -> {status}", self.request.method, self.request.path.template())
    }

    /// Validates every pattern the scenario carries.
    fn validate(&self, registry: &PatternRegistry) -> Result<(), SchemaError> {
        for location in [ParameterLocation::Path, ParameterLocation::Query, ParameterLocation::Header] {
            for param in self.request.params(location) {
                let schema = format!("{} REQUEST.{}.{}", self.name, location.category(), param.name);
                registry.validate_pattern(&schema, &param.pattern)?;
            }
        }
        registry.validate_pattern(&format!("{} REQUEST.BODY", self.name), &self.request.body)?;
        for response in self.responses.values() {
            for header in &response.headers {
                let schema = format!("{} RESPONSE {} HEADERS.{}", self.name, response.status, header.name);
                registry.validate_pattern(&schema, &header.pattern)?;
            }
            let schema = format!("{} RESPONSE {} BODY", self.name, response.status);
            registry.validate_pattern(&schema, &response.body)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Contracts
// ============================================================================

/// Validated, immutable contract.
///
/// # Invariants
/// - Every reference in every scenario resolves in the registry.
/// - The registry is never mutated after construction.
#[derive(Debug, Clone)]
pub struct Contract {
    /// Frozen registry shared by all resolvers.
    registry: Arc<PatternRegistry>,
    /// Scenarios in declaration order.
    scenarios: Vec<Scenario>,
}

impl Contract {
    /// Validates and freezes a contract.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] for the first structural defect found.
    pub fn new(registry: PatternRegistry, scenarios: Vec<Scenario>) -> Result<Self, SchemaError> {
        registry.validate()?;
        for scenario in &scenarios {
            scenario.validate(&registry)?;
        }
        Ok(Self {
            registry: Arc::new(registry),
            scenarios,
        })
    }

    /// Returns the shared registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<PatternRegistry> {
        &self.registry
    }

    /// Returns the scenarios in declaration order.
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Returns a scenario by name.
    #[must_use]
    pub fn scenario(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|scenario| scenario.name == name)
    }

    /// Creates a resolver over this contract's registry.
    #[must_use]
    pub fn resolver(&self, settings: ResolverSettings) -> Resolver {
        Resolver::new(Arc::clone(&self.registry), settings)
    }
}
