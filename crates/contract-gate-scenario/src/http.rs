// crates/contract-gate-scenario/src/http.rs
// ============================================================================
// Module: Contract Gate HTTP Patterns
// Description: Request/response patterns and concrete HTTP messages.
// Purpose: Describe an operation's wire shape in terms of core patterns.
// Dependencies: contract-gate-core, indexmap, serde
// ============================================================================

//! ## Overview
//! An [`HttpRequestPattern`] combines a method, a path template with typed
//! path parameters, query and header parameters, a body pattern, and the
//! operation's security schemes. Concrete [`HttpRequest`] and
//! [`HttpResponse`] values are what the transport collaborator exchanges;
//! parameters travel as text and are parsed against their patterns when
//! matched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use contract_gate_core::Pattern;
use contract_gate_core::SchemaError;
use contract_gate_core::Value;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Status Codes
// ============================================================================

/// Single numeric HTTP status code.
///
/// # Invariants
/// - Always within `100..=599`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StatusCode(u16);

impl StatusCode {
    /// Parses a declared status code.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidStatusCode`] for ranges such as `2XX`,
    /// `default`, and anything that is not a three digit code.
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        let trimmed = text.trim();
        let invalid = || SchemaError::InvalidStatusCode {
            value: text.to_string(),
        };
        if trimmed.len() != 3 || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }
        let code = trimmed.parse::<u16>().map_err(|_| invalid())?;
        Self::new(code).ok_or_else(invalid)
    }

    /// Wraps a numeric code, returning `None` outside `100..=599`.
    #[must_use]
    pub fn new(code: u16) -> Option<Self> {
        (100..=599).contains(&code).then_some(Self(code))
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns true for 2xx codes.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Returns true for 4xx codes.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Where a parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    /// Path segment.
    Path,
    /// Query string.
    Query,
    /// Header.
    Header,
}

impl ParameterLocation {
    /// Breadcrumb category, such as `QUERY`.
    #[must_use]
    pub const fn category(self) -> &'static str {
        match self {
            Self::Path => "PATH",
            Self::Query => "QUERY",
            Self::Header => "HEADERS",
        }
    }

    /// Human name of the parameter kind, such as `query param`.
    #[must_use]
    pub const fn kind(self) -> &'static str {
        match self {
            Self::Path => "path param",
            Self::Query => "query param",
            Self::Header => "header",
        }
    }

    /// Compares parameter names; header names are case-insensitive.
    #[must_use]
    pub fn same_name(self, left: &str, right: &str) -> bool {
        match self {
            Self::Header => left.eq_ignore_ascii_case(right),
            Self::Path | Self::Query => left == right,
        }
    }
}

/// Named, typed parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Value pattern.
    pub pattern: Pattern,
    /// True when the parameter must be sent.
    pub required: bool,
}

impl Parameter {
    /// Required parameter.
    #[must_use]
    pub fn required(name: impl Into<String>, pattern: Pattern) -> Self {
        Self {
            name: name.into(),
            pattern,
            required: true,
        }
    }

    /// Optional parameter.
    #[must_use]
    pub fn optional(name: impl Into<String>, pattern: Pattern) -> Self {
        Self {
            name: name.into(),
            pattern,
            required: false,
        }
    }

    /// Builds a parameter from a contract declaration whose parts may be missing.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingParameterName`] or
    /// [`SchemaError::MissingParameterSchema`] for incomplete declarations.
    pub fn declared(name: Option<&str>, pattern: Option<Pattern>, required: bool) -> Result<Self, SchemaError> {
        let name = name.map(str::trim).filter(|name| !name.is_empty()).ok_or(SchemaError::MissingParameterName)?;
        let pattern = pattern.ok_or_else(|| SchemaError::MissingParameterSchema {
            parameter: name.to_string(),
        })?;
        Ok(Self {
            name: name.to_string(),
            pattern,
            required,
        })
    }
}

// ============================================================================
// SECTION: Path Templates
// ============================================================================

/// One path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Fixed text.
    Literal(String),
    /// Typed parameter.
    Param(Parameter),
}

/// Path template such as `/orders/{orderId}`.
///
/// # Invariants
/// - Every `{name}` placeholder has exactly one typed parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    /// Template text as declared.
    template: String,
    /// Parsed segments.
    segments: Vec<PathSegment>,
}

impl PathPattern {
    /// Parses a template and attaches parameter patterns by name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingParameterSchema`] when a placeholder has
    /// no pattern, and [`SchemaError::MissingParameterName`] for an empty
    /// placeholder.
    pub fn new<K, I>(template: &str, params: I) -> Result<Self, SchemaError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Pattern)>,
    {
        let mut patterns: IndexMap<String, Pattern> =
            params.into_iter().map(|(name, pattern)| (name.into(), pattern)).collect();
        let mut segments = Vec::new();
        for raw in template.split('/').filter(|segment| !segment.is_empty()) {
            let placeholder = raw.strip_prefix('{').and_then(|rest| rest.strip_suffix('}'));
            match placeholder {
                Some("") => return Err(SchemaError::MissingParameterName),
                Some(name) => {
                    let pattern = patterns.shift_remove(name).ok_or_else(|| SchemaError::MissingParameterSchema {
                        parameter: name.to_string(),
                    })?;
                    segments.push(PathSegment::Param(Parameter::required(name, pattern)));
                }
                None => segments.push(PathSegment::Literal(raw.to_string())),
            }
        }
        if let Some(extra) = patterns.keys().next() {
            return Err(SchemaError::ConflictingConstraints {
                schema: template.to_string(),
                reason: format!("path parameter {extra} does not appear in the template"),
            });
        }
        Ok(Self {
            template: template.to_string(),
            segments,
        })
    }

    /// Literal path with no parameters.
    #[must_use]
    pub fn literal(path: &str) -> Self {
        Self {
            template: path.to_string(),
            segments: path
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(|segment| PathSegment::Literal(segment.to_string()))
                .collect(),
        }
    }

    /// Returns the template text.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the path parameters in template order.
    pub fn params(&self) -> impl Iterator<Item = &Parameter> {
        self.segments.iter().filter_map(|segment| match segment {
            PathSegment::Param(param) => Some(param),
            PathSegment::Literal(_) => None,
        })
    }

    /// Returns a copy with one parameter's pattern replaced.
    #[must_use]
    pub fn with_param_pattern(&self, name: &str, pattern: Pattern) -> Self {
        let mut next = self.clone();
        for segment in &mut next.segments {
            if let PathSegment::Param(param) = segment
                && param.name == name
            {
                param.pattern = pattern.clone();
            }
        }
        next
    }
}

// ============================================================================
// SECTION: Security
// ============================================================================

/// Security scheme required by an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityScheme {
    /// `Authorization: Bearer <token>`.
    Bearer,
    /// `Authorization: Basic <credentials>`.
    Basic,
    /// API key in the named header.
    ApiKeyHeader(String),
    /// API key in the named query parameter.
    ApiKeyQuery(String),
}

// ============================================================================
// SECTION: Request and Response Patterns
// ============================================================================

/// Request side of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequestPattern {
    /// Upper-case HTTP method.
    pub method: String,
    /// Path template and parameters.
    pub path: PathPattern,
    /// Query parameters.
    pub query: Vec<Parameter>,
    /// Header parameters.
    pub headers: Vec<Parameter>,
    /// Body pattern; `NoBody` when the operation sends none.
    pub body: Pattern,
    /// Declared media type; `None` accepts any.
    pub content_type: Option<String>,
    /// Security schemes, all of which must be satisfied.
    pub security: Vec<SecurityScheme>,
}

impl HttpRequestPattern {
    /// Creates a request pattern with no parameters and no body.
    #[must_use]
    pub fn new(method: &str, path: PathPattern) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            path,
            query: Vec::new(),
            headers: Vec::new(),
            body: Pattern::NoBody,
            content_type: None,
            security: Vec::new(),
        }
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, param: Parameter) -> Self {
        self.query.push(param);
        self
    }

    /// Adds a header parameter.
    #[must_use]
    pub fn with_header(mut self, param: Parameter) -> Self {
        self.headers.push(param);
        self
    }

    /// Sets the body pattern and media type.
    #[must_use]
    pub fn with_body(mut self, body: Pattern, content_type: Option<&str>) -> Self {
        self.body = body;
        self.content_type = content_type.map(str::to_string);
        self
    }

    /// Adds a security scheme.
    #[must_use]
    pub fn with_security(mut self, scheme: SecurityScheme) -> Self {
        self.security.push(scheme);
        self
    }

    /// Returns the parameters declared at a location.
    #[must_use]
    pub fn params(&self, location: ParameterLocation) -> Vec<&Parameter> {
        match location {
            ParameterLocation::Path => self.path.params().collect(),
            ParameterLocation::Query => self.query.iter().collect(),
            ParameterLocation::Header => self.headers.iter().collect(),
        }
    }

    /// Returns a copy without the named parameter at a location.
    ///
    /// A removed path parameter is replaced by an empty segment value.
    #[must_use]
    pub fn without_param(&self, location: ParameterLocation, name: &str) -> Self {
        let mut next = self.clone();
        match location {
            ParameterLocation::Path => {
                next.path = self.path.with_param_pattern(name, Pattern::exact(Value::string("")));
            }
            ParameterLocation::Query => next.query.retain(|param| param.name != name),
            ParameterLocation::Header => next.headers.retain(|param| !location.same_name(&param.name, name)),
        }
        next
    }

    /// Returns a copy with the named parameter's pattern replaced.
    #[must_use]
    pub fn with_param_pattern(&self, location: ParameterLocation, name: &str, pattern: Pattern) -> Self {
        let mut next = self.clone();
        match location {
            ParameterLocation::Path => next.path = self.path.with_param_pattern(name, pattern),
            ParameterLocation::Query | ParameterLocation::Header => {
                let params = if location == ParameterLocation::Query { &mut next.query } else { &mut next.headers };
                for param in params.iter_mut().filter(|param| location.same_name(&param.name, name)) {
                    param.pattern = pattern.clone();
                }
            }
        }
        next
    }

    /// Returns the query parameter names that carry API keys.
    pub fn query_api_keys(&self) -> impl Iterator<Item = &str> {
        self.security.iter().filter_map(|scheme| match scheme {
            SecurityScheme::ApiKeyQuery(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Response side of an operation for one status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponsePattern {
    /// Status code.
    pub status: StatusCode,
    /// Header parameters.
    pub headers: Vec<Parameter>,
    /// Body pattern.
    pub body: Pattern,
    /// Declared media type.
    pub content_type: Option<String>,
}

impl HttpResponsePattern {
    /// Creates a response pattern with no headers and no body.
    #[must_use]
    pub const fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Pattern::NoBody,
            content_type: None,
        }
    }

    /// Adds a header parameter.
    #[must_use]
    pub fn with_header(mut self, param: Parameter) -> Self {
        self.headers.push(param);
        self
    }

    /// Sets the body pattern and media type.
    #[must_use]
    pub fn with_body(mut self, body: Pattern, content_type: Option<&str>) -> Self {
        self.body = body;
        self.content_type = content_type.map(str::to_string);
        self
    }
}

// ============================================================================
// SECTION: Concrete Messages
// ============================================================================

/// Concrete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: String,
    /// Path without query string.
    pub path: String,
    /// Query parameters.
    pub query: IndexMap<String, String>,
    /// Headers.
    pub headers: IndexMap<String, String>,
    /// Body.
    pub body: Value,
}

impl HttpRequest {
    /// Creates a request with no parameters and no body.
    #[must_use]
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            query: IndexMap::new(),
            headers: IndexMap::new(),
            body: Value::NoBody,
        }
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Returns a header by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Concrete response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Headers.
    pub headers: IndexMap<String, String>,
    /// Body.
    pub body: Value,
}

impl HttpResponse {
    /// Creates a response with no headers and no body.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: IndexMap::new(),
            body: Value::NoBody,
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Returns a header by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Case-insensitive header lookup.
pub(crate) fn find_header<'a>(headers: &'a IndexMap<String, String>, name: &str) -> Option<&'a str> {
    headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
}

/// Returns the media type without parameters, lower-cased.
pub(crate) fn media_type(content_type: &str) -> String {
    content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}
