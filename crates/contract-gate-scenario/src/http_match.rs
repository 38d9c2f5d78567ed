// crates/contract-gate-scenario/src/http_match.rs
// ============================================================================
// Module: Contract Gate HTTP Matching
// Description: Match concrete requests and responses against HTTP patterns.
// Purpose: Report every mismatch under REQUEST./RESPONSE. breadcrumbs.
// Dependencies: contract-gate-core, crate::http
// ============================================================================

//! ## Overview
//! A method or path mismatch ends request matching at once, since nothing
//! else about the operation applies. Otherwise query parameters, headers,
//! security schemes, content type, and body are all checked and their
//! failures combined. Parameter text is parsed against each parameter's
//! pattern before matching, so `?age=42` matches an integer pattern.
//!
//! Header names compare case-insensitively. Mock mode relaxes a missing
//! API key in the query string.

// ============================================================================
// SECTION: Imports
// ============================================================================

use contract_gate_core::MatchResult;
use contract_gate_core::Pattern;
use contract_gate_core::Resolver;
use contract_gate_core::match_value;
use contract_gate_core::parse_text;
use indexmap::IndexMap;

use crate::http::HttpRequest;
use crate::http::HttpRequestPattern;
use crate::http::HttpResponse;
use crate::http::HttpResponsePattern;
use crate::http::Parameter;
use crate::http::PathSegment;
use crate::http::SecurityScheme;
use crate::http::find_header;
use crate::http::media_type;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Matches a request against a request pattern.
#[must_use]
pub fn match_request(request: &HttpRequest, pattern: &HttpRequestPattern, resolver: &mut Resolver) -> MatchResult {
    if !request.method.eq_ignore_ascii_case(&pattern.method) {
        return MatchResult::failure(format!(
            "Expected method {}, actual was {}",
            pattern.method, request.method
        ))
        .breadcrumb("METHOD")
        .breadcrumb("REQUEST");
    }
    let Some(bound) = bind_path(&request.path, pattern) else {
        return MatchResult::failure(format!(
            "Expected path {}, actual was {}",
            pattern.path.template(),
            request.path
        ))
        .breadcrumb("PATH")
        .breadcrumb("REQUEST");
    };
    let path = MatchResult::combine(
        bound
            .into_iter()
            .map(|(param, text)| match_text(text, &param.pattern, resolver).breadcrumb(param.name.clone()))
            .collect::<Vec<_>>(),
    );
    let results = vec![
        path.breadcrumb("PATH"),
        match_query(&request.query, pattern, resolver).breadcrumb("QUERY"),
        match_parameters(&request.headers, &pattern.headers, "header", resolver, true).breadcrumb("HEADERS"),
        match_security(request, pattern, resolver),
        match_content_type(request.header("Content-Type"), pattern),
        match_value(&request.body, &pattern.body, resolver).breadcrumb("BODY"),
    ];
    MatchResult::combine(results).breadcrumb("REQUEST")
}

/// Pairs path parameters with their sent segments.
///
/// Returns `None` when the segment count or a literal segment differs.
pub(crate) fn bind_path<'p, 't>(path: &'t str, pattern: &'p HttpRequestPattern) -> Option<Vec<(&'p Parameter, &'t str)>> {
    let actual: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();
    let expected = pattern.path.segments();
    if actual.len() != expected.len() {
        return None;
    }
    let mut bound = Vec::new();
    for (segment, text) in expected.iter().zip(actual) {
        match segment {
            PathSegment::Literal(literal) if literal != text => return None,
            PathSegment::Literal(_) => {}
            PathSegment::Param(param) => bound.push((param, text)),
        }
    }
    Some(bound)
}

/// Matches declared and undeclared query parameters.
fn match_query(query: &IndexMap<String, String>, pattern: &HttpRequestPattern, resolver: &mut Resolver) -> MatchResult {
    let api_keys: Vec<&str> = pattern.query_api_keys().collect();
    let mut results = vec![match_parameters(query, &pattern.query, "query param", resolver, false)];
    for name in query.keys() {
        let declared = pattern.query.iter().any(|param| &param.name == name);
        if !declared && !api_keys.contains(&name.as_str()) {
            results.push(
                MatchResult::failure(format!("Query param named \"{name}\" was unexpected")).breadcrumb(name.clone()),
            );
        }
    }
    MatchResult::combine(results)
}

/// Matches declared parameters against sent text values.
fn match_parameters(
    sent: &IndexMap<String, String>,
    declared: &[Parameter],
    kind: &str,
    resolver: &mut Resolver,
    case_insensitive: bool,
) -> MatchResult {
    let mut results = Vec::new();
    for param in declared {
        let value = if case_insensitive { find_header(sent, &param.name) } else { sent.get(&param.name).map(String::as_str) };
        let result = match value {
            Some(text) => match_text(text, &param.pattern, resolver),
            None if param.required => {
                MatchResult::failure(format!("Expected {kind} named \"{}\" was missing", param.name))
            }
            None => MatchResult::Success,
        };
        results.push(result.breadcrumb(param.name.clone()));
    }
    MatchResult::combine(results)
}

/// Checks every security scheme of the operation.
fn match_security(request: &HttpRequest, pattern: &HttpRequestPattern, resolver: &Resolver) -> MatchResult {
    let mut results = Vec::new();
    for scheme in &pattern.security {
        let result = match scheme {
            SecurityScheme::Bearer => authorization(request, "Bearer"),
            SecurityScheme::Basic => authorization(request, "Basic"),
            SecurityScheme::ApiKeyHeader(name) => match request.header(name) {
                Some(_) => MatchResult::Success,
                None => MatchResult::failure(format!("Expected header named \"{name}\" was missing"))
                    .breadcrumb(name.clone())
                    .breadcrumb("HEADERS"),
            },
            SecurityScheme::ApiKeyQuery(name) => {
                if request.query.contains_key(name) || resolver.mock_mode() {
                    MatchResult::Success
                } else {
                    MatchResult::failure(format!("Expected query param named \"{name}\" was missing"))
                        .breadcrumb(name.clone())
                        .breadcrumb("QUERY")
                }
            }
        };
        results.push(result);
    }
    MatchResult::combine(results)
}

/// Checks an `Authorization` header for the given scheme.
fn authorization(request: &HttpRequest, scheme: &str) -> MatchResult {
    let accepted = request.header("Authorization").is_some_and(|value| {
        value
            .split_once(' ')
            .is_some_and(|(prefix, credentials)| prefix.eq_ignore_ascii_case(scheme) && !credentials.trim().is_empty())
    });
    if accepted {
        MatchResult::Success
    } else {
        MatchResult::failure(format!("Expected {scheme} credentials in the Authorization header"))
            .breadcrumb("Authorization")
            .breadcrumb("HEADERS")
    }
}

/// Compares the sent media type with the declared one when both are present.
fn match_content_type(sent: Option<&str>, pattern: &HttpRequestPattern) -> MatchResult {
    match (sent, pattern.content_type.as_deref()) {
        (Some(sent), Some(expected)) if matches!(pattern.body, Pattern::NoBody) || media_type(sent) == media_type(expected) => {
            MatchResult::Success
        }
        (Some(sent), Some(expected)) => {
            MatchResult::failure(format!("Expected content type {expected}, actual was {sent}"))
                .breadcrumb("Content-Type")
                .breadcrumb("HEADERS")
        }
        _ => MatchResult::Success,
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Matches a response against a response pattern.
#[must_use]
pub fn match_response(response: &HttpResponse, pattern: &HttpResponsePattern, resolver: &mut Resolver) -> MatchResult {
    if response.status != pattern.status.as_u16() {
        return MatchResult::failure(format!(
            "Expected status {}, actual was {}",
            pattern.status, response.status
        ))
        .breadcrumb("STATUS")
        .breadcrumb("RESPONSE");
    }
    let results = vec![
        match_parameters(&response.headers, &pattern.headers, "header", resolver, true).breadcrumb("HEADERS"),
        match_value(&response.body, &pattern.body, resolver).breadcrumb("BODY"),
    ];
    MatchResult::combine(results).breadcrumb("RESPONSE")
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses wire text against a pattern and matches the parsed value.
pub(crate) fn match_text(text: &str, pattern: &Pattern, resolver: &mut Resolver) -> MatchResult {
    match parse_text(text, pattern, resolver) {
        Ok(value) => match_value(&value, pattern, resolver),
        Err(_) => MatchResult::failure(format!("Expected {}, actual was \"{text}\"", pattern.describe())),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use contract_gate_core::PatternRegistry;

    use super::*;

    #[test]
    fn authorization_scheme_is_case_insensitive() {
        let request = HttpRequest::new("GET", "/").with_header("authorization", "bearer abc");
        assert!(authorization(&request, "Bearer").is_success());
        assert!(!authorization(&request, "Basic").is_success());
    }

    #[test]
    fn wire_text_is_parsed_before_matching() {
        let mut resolver = Resolver::with_defaults(Arc::new(PatternRegistry::new()));
        assert!(match_text("42", &Pattern::integer(), &mut resolver).is_success());
        assert!(!match_text("forty", &Pattern::integer(), &mut resolver).is_success());
    }
}
