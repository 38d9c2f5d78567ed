// crates/contract-gate-scenario/src/http_generate.rs
// ============================================================================
// Module: Contract Gate HTTP Generation
// Description: Synthesize concrete requests and responses from HTTP patterns.
// Purpose: Build test requests and stub responses that match their patterns.
// Dependencies: contract-gate-config, contract-gate-core, crate::{http, workflow}
// ============================================================================

//! ## Overview
//! Every declared parameter is sent. A parameter takes its value from, in
//! order: a workflow override, an example cell with the parameter's name, or
//! generation. Example cells are parsed against the parameter's pattern and
//! must match it. Body generation delegates to the core generator, honoring
//! example cells at any depth; workflow overrides are applied to the
//! generated body afterwards and only at paths that already exist.

// ============================================================================
// SECTION: Imports
// ============================================================================

use contract_gate_config::BindingLocation;
use contract_gate_core::ExampleRow;
use contract_gate_core::GenerationError;
use contract_gate_core::MatchResult;
use contract_gate_core::Pattern;
use contract_gate_core::Resolver;
use contract_gate_core::StringConstraints;
use contract_gate_core::Value;
use contract_gate_core::generate;
use contract_gate_core::generate_with_row;
use contract_gate_core::match_value;
use contract_gate_core::parse_text;

use crate::http::HttpRequest;
use crate::http::HttpRequestPattern;
use crate::http::HttpResponse;
use crate::http::HttpResponsePattern;
use crate::http::Parameter;
use crate::http::ParameterLocation;
use crate::http::PathSegment;
use crate::http::SecurityScheme;
use crate::workflow::set_at;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Length of generated credentials.
const CREDENTIAL_LENGTH: usize = 16;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Generates a request matching `pattern`.
///
/// # Errors
///
/// Returns [`GenerationError`] when a pattern cannot be satisfied or an
/// example cell does not fit its parameter.
pub fn generate_request(
    pattern: &HttpRequestPattern,
    resolver: &mut Resolver,
    row: Option<&ExampleRow>,
    overrides: &[(BindingLocation, Value)],
) -> Result<HttpRequest, GenerationError> {
    let mut segments = Vec::new();
    for segment in pattern.path.segments() {
        match segment {
            PathSegment::Literal(literal) => segments.push(literal.clone()),
            PathSegment::Param(param) => {
                let value = param_value(param, ParameterLocation::Path, resolver, row, overrides)?;
                segments.push(value.display_text());
            }
        }
    }
    let mut request = HttpRequest::new(&pattern.method, &format!("/{}", segments.join("/")));
    for param in &pattern.query {
        let value = param_value(param, ParameterLocation::Query, resolver, row, overrides)?;
        request.query.insert(param.name.clone(), value.display_text());
    }
    for param in &pattern.headers {
        let value = param_value(param, ParameterLocation::Header, resolver, row, overrides)?;
        request.headers.insert(param.name.clone(), value.display_text());
    }
    for scheme in &pattern.security {
        add_credentials(&mut request, scheme, resolver, row)?;
    }
    request.body = match (&pattern.body, row) {
        (Pattern::NoBody, _) => Value::NoBody,
        (body, Some(row)) => generate_with_row(body, resolver, row)?,
        (body, None) => generate(body, resolver)?,
    };
    for (location, value) in overrides {
        if let BindingLocation::Body(path) = location
            && !matches!(pattern.body, Pattern::NoBody)
        {
            set_at(&mut request.body, path, value.clone());
        }
    }
    if let Some(content_type) = &pattern.content_type
        && !matches!(pattern.body, Pattern::NoBody)
        && request.header("Content-Type").is_none()
    {
        request.headers.insert("Content-Type".to_string(), content_type.clone());
    }
    Ok(request)
}

/// Picks a parameter value from overrides, example cells, or generation.
fn param_value(
    param: &Parameter,
    location: ParameterLocation,
    resolver: &mut Resolver,
    row: Option<&ExampleRow>,
    overrides: &[(BindingLocation, Value)],
) -> Result<Value, GenerationError> {
    let overridden = overrides.iter().find_map(|(target, value)| {
        let name = match (target, location) {
            (BindingLocation::Path(name), ParameterLocation::Path)
            | (BindingLocation::Query(name), ParameterLocation::Query)
            | (BindingLocation::Header(name), ParameterLocation::Header) => name,
            _ => return None,
        };
        location.same_name(name, &param.name).then_some(value)
    });
    if let Some(value) = overridden {
        return Ok(value.clone());
    }
    if let Some(cell) = row.and_then(|row| row.get(&param.name)) {
        return cell_value(&param.name, cell, &param.pattern, resolver);
    }
    generate(&param.pattern, resolver)
}

/// Parses an example cell and checks it against its pattern.
fn cell_value(key: &str, cell: &str, pattern: &Pattern, resolver: &mut Resolver) -> Result<Value, GenerationError> {
    let invalid = |reason: String| GenerationError::InvalidExampleValue {
        key: key.to_string(),
        reason,
    };
    let value = parse_text(cell, pattern, resolver).map_err(|err| invalid(err.to_string()))?;
    match match_value(&value, pattern, resolver) {
        MatchResult::Success => Ok(value),
        MatchResult::Failure(failure) => Err(invalid(failure.report_string())),
    }
}

/// Adds credentials for one security scheme.
fn add_credentials(
    request: &mut HttpRequest,
    scheme: &SecurityScheme,
    resolver: &mut Resolver,
    row: Option<&ExampleRow>,
) -> Result<(), GenerationError> {
    match scheme {
        SecurityScheme::Bearer | SecurityScheme::Basic => {
            if request.header("Authorization").is_none() {
                let prefix = if matches!(scheme, SecurityScheme::Bearer) { "Bearer" } else { "Basic" };
                let token = credential(row.and_then(|row| row.get("Authorization")), resolver)?;
                let value = if token.contains(' ') { token } else { format!("{prefix} {token}") };
                request.headers.insert("Authorization".to_string(), value);
            }
        }
        SecurityScheme::ApiKeyHeader(name) => {
            if request.header(name).is_none() {
                let token = credential(row.and_then(|row| row.get(name)), resolver)?;
                request.headers.insert(name.clone(), token);
            }
        }
        SecurityScheme::ApiKeyQuery(name) => {
            if !request.query.contains_key(name) {
                let token = credential(row.and_then(|row| row.get(name)), resolver)?;
                request.query.insert(name.clone(), token);
            }
        }
    }
    Ok(())
}

/// Returns an example credential or a generated one.
fn credential(cell: Option<&str>, resolver: &mut Resolver) -> Result<String, GenerationError> {
    if let Some(cell) = cell {
        return Ok(cell.to_string());
    }
    let token = Pattern::string_with(StringConstraints {
        min_length: Some(CREDENTIAL_LENGTH),
        max_length: Some(CREDENTIAL_LENGTH),
        ..StringConstraints::default()
    });
    generate(&token, resolver).map(|value| value.display_text())
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Generates a response matching `pattern`, optionally with a literal body.
///
/// # Errors
///
/// Returns [`GenerationError`] when a pattern cannot be satisfied.
pub fn generate_response(
    pattern: &HttpResponsePattern,
    resolver: &mut Resolver,
    body: Option<&Value>,
) -> Result<HttpResponse, GenerationError> {
    let mut response = HttpResponse::new(pattern.status.as_u16());
    for header in &pattern.headers {
        let value = generate(&header.pattern, resolver)?;
        response.headers.insert(header.name.clone(), value.display_text());
    }
    response.body = match (body, &pattern.body) {
        (Some(body), _) => body.clone(),
        (None, Pattern::NoBody) => Value::NoBody,
        (None, pattern_body) => generate(pattern_body, resolver)?,
    };
    if let Some(content_type) = &pattern.content_type
        && !matches!(response.body, Value::NoBody)
        && response.header("Content-Type").is_none()
    {
        response.headers.insert("Content-Type".to_string(), content_type.clone());
    }
    Ok(response)
}
