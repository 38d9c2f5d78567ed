// crates/contract-gate-scenario/src/stub.rs
// ============================================================================
// Module: Contract Gate Stub Selection
// Description: Pick the scenario that serves an incoming request.
// Purpose: Answer stub requests from the contract with matching responses.
// Dependencies: contract-gate-core, tracing, crate::{contract, error, http, http_generate, http_match}
// ============================================================================

//! ## Overview
//! Every scenario is matched against the request. Among the scenarios that
//! accept it, an exact content-type match beats a scenario without a declared
//! content type, and a scenario with a matching named example beats one
//! without; remaining ties go to the first declared scenario. When nothing
//! matches, [`NoMatchingScenario`] carries each candidate's failure.
//!
//! A matched example with a literal response body is served verbatim;
//! otherwise the scenario's success response is generated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use contract_gate_core::MatchResult;
use contract_gate_core::REQUEST_BODY_COLUMN;
use contract_gate_core::Resolver;
use contract_gate_core::ResolverSettings;
use contract_gate_core::Value;
use contract_gate_core::parse_text;
use tracing::debug;

use crate::contract::Contract;
use crate::contract::NamedExample;
use crate::contract::Scenario;
use crate::error::NoMatchingScenario;
use crate::error::StubError;
use crate::http::HttpRequest;
use crate::http::HttpResponse;
use crate::http::StatusCode;
use crate::http::find_header;
use crate::http::media_type;
use crate::http_generate::generate_response;
use crate::http_match::bind_path;
use crate::http_match::match_request;
use crate::http_match::match_response;

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Scenario chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StubMatch<'c> {
    /// Selected scenario.
    pub scenario: &'c Scenario,
    /// Named example the request matched, if any.
    pub example: Option<&'c NamedExample>,
}

/// Selects scenarios and builds stub responses.
#[derive(Debug, Clone)]
pub struct StubSelector<'c> {
    /// Contract being served.
    contract: &'c Contract,
    /// Resolver settings for matching and generation.
    settings: ResolverSettings,
}

impl<'c> StubSelector<'c> {
    /// Creates a selector.
    #[must_use]
    pub const fn new(contract: &'c Contract, settings: ResolverSettings) -> Self {
        Self {
            contract,
            settings,
        }
    }

    /// Selects the scenario that best accepts `request`.
    ///
    /// # Errors
    ///
    /// Returns [`NoMatchingScenario`] when no scenario accepts the request.
    pub fn select(&self, request: &HttpRequest) -> Result<StubMatch<'c>, NoMatchingScenario> {
        self.best_match(request, None)
    }

    /// Selects the scenario that accepts `request` and declares `response`.
    ///
    /// # Errors
    ///
    /// Returns [`NoMatchingScenario`] when no scenario accepts both.
    pub fn select_for_expectation(
        &self,
        request: &HttpRequest,
        response: &HttpResponse,
    ) -> Result<StubMatch<'c>, NoMatchingScenario> {
        self.best_match(request, Some(response))
    }

    /// Builds the stub response for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`StubError`] when no scenario matches, the selected scenario
    /// has no success response, or the body cannot be generated.
    pub fn respond(&self, request: &HttpRequest) -> Result<HttpResponse, StubError> {
        let selected = self.select(request)?;
        let pattern = selected.scenario.success_response().ok_or_else(|| StubError::NoSuccessResponse {
            scenario: selected.scenario.name.clone(),
        })?;
        let literal = selected.example.and_then(|example| example.response_body.as_ref());
        let mut resolver = self.contract.resolver(self.settings.clone());
        generate_response(pattern, &mut resolver, literal).map_err(StubError::from)
    }

    /// Ranks accepting scenarios and returns the best one.
    fn best_match(
        &self,
        request: &HttpRequest,
        response: Option<&HttpResponse>,
    ) -> Result<StubMatch<'c>, NoMatchingScenario> {
        let mut resolver = self.contract.resolver(self.settings.clone());
        let mut rejections = Vec::new();
        let mut best: Option<((bool, bool), StubMatch<'c>)> = None;
        for scenario in self.contract.scenarios() {
            let mut result = match_request(request, &scenario.request, &mut resolver);
            if let Some(response) = response {
                result = MatchResult::combine(vec![result, match_declared_response(scenario, response, &mut resolver)]);
            }
            if let MatchResult::Failure(failure) = result {
                debug!(scenario = %scenario.name, "stub candidate rejected");
                rejections.push((scenario.name.clone(), failure));
                continue;
            }
            let example = scenario.examples.iter().find(|example| example_matches(example, scenario, request, &mut resolver));
            let rank = (exact_content_type(scenario, request), example.is_some());
            if best.as_ref().is_none_or(|(current, _)| rank > *current) {
                best = Some((
                    rank,
                    StubMatch {
                        scenario,
                        example,
                    },
                ));
            }
        }
        match best {
            Some((_, selected)) => {
                debug!(
                    scenario = %selected.scenario.name,
                    example = selected.example.map(|example| example.name.as_str()),
                    "stub scenario selected"
                );
                Ok(selected)
            }
            None => Err(NoMatchingScenario {
                rejections,
            }),
        }
    }
}

/// Matches a response against the scenario's pattern for its status.
fn match_declared_response(scenario: &Scenario, response: &HttpResponse, resolver: &mut Resolver) -> MatchResult {
    let declared = StatusCode::new(response.status).and_then(|status| scenario.responses.get(&status));
    match declared {
        Some(pattern) => match_response(response, pattern, resolver),
        None => MatchResult::failure(format!("Status {} is not declared", response.status))
            .breadcrumb("STATUS")
            .breadcrumb("RESPONSE"),
    }
}

/// Returns true when the request's media type equals the declared one.
fn exact_content_type(scenario: &Scenario, request: &HttpRequest) -> bool {
    match (request.header("Content-Type"), scenario.request.content_type.as_deref()) {
        (Some(sent), Some(declared)) => media_type(sent) == media_type(declared),
        _ => false,
    }
}

// ============================================================================
// SECTION: Example Matching
// ============================================================================

/// Returns true when every example cell equals the request's value for it.
fn example_matches(example: &NamedExample, scenario: &Scenario, request: &HttpRequest, resolver: &mut Resolver) -> bool {
    let bound = bind_path(&request.path, &scenario.request).unwrap_or_default();
    example.request.columns.iter().all(|(column, cell)| {
        if column == REQUEST_BODY_COLUMN {
            return parse_text(cell, &scenario.request.body, resolver).is_ok_and(|body| body == request.body);
        }
        if let Some((_, text)) = bound.iter().find(|(param, _)| &param.name == column) {
            return *text == cell.as_str();
        }
        if let Some(text) = request.query.get(column) {
            return text == cell;
        }
        if let Some(text) = find_header(&request.headers, column) {
            return text == cell.as_str();
        }
        find_key(&request.body, column).is_some_and(|value| value.display_text() == *cell)
    })
}

/// Finds the first value stored under `key` at any depth.
fn find_key<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(key).or_else(|| map.values().find_map(|child| find_key(child, key))),
        Value::List(items) => items.iter().find_map(|child| find_key(child, key)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn keys_are_found_at_any_depth() {
        let body = Value::from(json!({"order": {"lines": [{"sku": "A-1"}]}}));
        assert_eq!(find_key(&body, "sku"), Some(&Value::string("A-1")));
        assert_eq!(find_key(&body, "price"), None);
    }
}
