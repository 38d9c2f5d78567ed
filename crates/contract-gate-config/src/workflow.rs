// crates/contract-gate-config/src/workflow.rs
// ============================================================================
// Module: Contract Gate Workflow Rules
// Description: Typed workflow keys and binding locations.
// Purpose: Parse workflow rule text once, at config load.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! A workflow key selects the steps a rule applies to: `"*"` for every step or
//! `"METHOD PATH -> STATUS"` for one operation and response status. A
//! binding location names where a value is captured from or injected into:
//! `BODY`, `BODY.<key>.<key>` (numeric segments index lists),
//! `PATH.<name>`, `QUERY.<name>`, or `HEADERS.<name>`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use crate::config::ConfigError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// HTTP methods accepted in workflow keys.
const METHODS: [&str; 8] = ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS", "TRACE"];

// ============================================================================
// SECTION: Workflow Key
// ============================================================================

/// Steps a workflow rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowKey {
    /// Every step.
    Any,
    /// One operation and response status.
    Operation {
        /// Upper-case HTTP method.
        method: String,
        /// Path template as declared in the contract.
        path: String,
        /// Response status code.
        status: u16,
    },
}

impl WorkflowKey {
    /// Parses `"*"` or `"METHOD PATH -> STATUS"`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the key is malformed.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let text = text.trim();
        if text == "*" {
            return Ok(Self::Any);
        }
        let invalid = || ConfigError::Invalid(format!("workflow key {text:?} must read \"METHOD PATH -> STATUS\""));
        let (operation, status) = text.split_once("->").ok_or_else(invalid)?;
        let (method, path) = operation.trim().split_once(' ').ok_or_else(invalid)?;
        let method = method.trim();
        let path = path.trim();
        if !METHODS.contains(&method) || !path.starts_with('/') || path.contains(char::is_whitespace) {
            return Err(invalid());
        }
        let status = status.trim();
        let code = status.parse::<u16>().map_err(|_| invalid())?;
        if status.len() != 3 || !(100..=599).contains(&code) {
            return Err(invalid());
        }
        Ok(Self::Operation {
            method: method.to_string(),
            path: path.to_string(),
            status: code,
        })
    }

    /// Returns true when the key selects the given step.
    #[must_use]
    pub fn matches(&self, method: &str, path: &str, status: u16) -> bool {
        match self {
            Self::Any => true,
            Self::Operation {
                method: expected_method,
                path: expected_path,
                status: expected_status,
            } => expected_method.eq_ignore_ascii_case(method) && expected_path == path && *expected_status == status,
        }
    }
}

impl fmt::Display for WorkflowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Operation {
                method,
                path,
                status,
            } => write!(f, "{method} {path} -> {status}"),
        }
    }
}

// ============================================================================
// SECTION: Binding Location
// ============================================================================

/// Place a bound value is read from or written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingLocation {
    /// Body, or a key path inside it; empty means the whole body.
    Body(Vec<String>),
    /// Path parameter.
    Path(String),
    /// Query parameter.
    Query(String),
    /// Header.
    Header(String),
}

impl BindingLocation {
    /// Parses a location such as `BODY.id` or `PATH.orderId`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the location is malformed.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let text = text.trim();
        let invalid = || {
            ConfigError::Invalid(format!("binding location {text:?} must start with BODY, PATH., QUERY., or HEADERS."))
        };
        let (category, rest) = match text.split_once('.') {
            Some((category, rest)) => (category, Some(rest)),
            None => (text, None),
        };
        match (category, rest) {
            ("BODY", None) => Ok(Self::Body(Vec::new())),
            ("BODY", Some(rest)) => {
                let segments: Vec<String> = rest.split('.').map(str::to_string).collect();
                if segments.iter().any(String::is_empty) {
                    return Err(invalid());
                }
                Ok(Self::Body(segments))
            }
            ("PATH", Some(name)) if !name.is_empty() => Ok(Self::Path(name.to_string())),
            ("QUERY", Some(name)) if !name.is_empty() => Ok(Self::Query(name.to_string())),
            ("HEADERS", Some(name)) if !name.is_empty() => Ok(Self::Header(name.to_string())),
            _ => Err(invalid()),
        }
    }

    /// Returns true when a response carries this location.
    #[must_use]
    pub const fn is_response_location(&self) -> bool {
        matches!(self, Self::Body(_) | Self::Header(_))
    }
}

impl fmt::Display for BindingLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body(segments) if segments.is_empty() => f.write_str("BODY"),
            Self::Body(segments) => write!(f, "BODY.{}", segments.join(".")),
            Self::Path(name) => write!(f, "PATH.{name}"),
            Self::Query(name) => write!(f, "QUERY.{name}"),
            Self::Header(name) => write!(f, "HEADERS.{name}"),
        }
    }
}

// ============================================================================
// SECTION: Workflow Rule
// ============================================================================

/// Parsed workflow rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRule {
    /// Steps the rule applies to.
    pub key: WorkflowKey,
    /// Response location captured after a matching step.
    pub extract: Option<BindingLocation>,
    /// Request location filled before a matching step.
    pub use_at: Option<BindingLocation>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    #[test]
    fn operation_key_parses_and_matches() {
        let key = WorkflowKey::parse("POST /orders -> 201").unwrap();
        assert!(key.matches("post", "/orders", 201));
        assert!(!key.matches("POST", "/orders", 200));
        assert_eq!(key.to_string(), "POST /orders -> 201");
    }

    #[test]
    fn malformed_keys_are_rejected() {
        for text in ["POST /orders", "FETCH /orders -> 200", "GET orders -> 200", "GET /orders -> 2XX", "GET /a -> 99"] {
            assert!(WorkflowKey::parse(text).is_err(), "{text}");
        }
    }

    #[test]
    fn locations_round_trip_through_display() {
        for text in ["BODY", "BODY.order.id", "PATH.orderId", "QUERY.page", "HEADERS.X-Trace"] {
            assert_eq!(BindingLocation::parse(text).unwrap().to_string(), text);
        }
        assert!(BindingLocation::parse("BODY..id").is_err());
        assert!(BindingLocation::parse("COOKIE.id").is_err());
        assert!(BindingLocation::parse("PATH").is_err());
    }
}
