// crates/contract-gate-core/src/value.rs
// ============================================================================
// Module: Contract Gate Value Model
// Description: Runtime values matched against and generated from patterns.
// Purpose: Provide an immutable, closed value vocabulary with JSON and XML forms.
// Dependencies: bigdecimal, indexmap, serde, serde_json
// ============================================================================

//! ## Overview
//! Values are the concrete side of every match and generate call. Numbers are
//! held as [`BigDecimal`] so bound checks never lose precision, objects keep
//! insertion order, and XML nodes carry their children as nested values
//! (text children are [`Value::Str`]). Values are never mutated after
//! construction; transformations build new values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

// ============================================================================
// SECTION: Value
// ============================================================================

/// Concrete runtime value.
///
/// # Invariants
/// - Immutable once constructed.
/// - `Number` equality is numeric (`1.0 == 1`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// JSON `null`.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Arbitrary-precision number.
    Number(BigDecimal),
    /// String literal.
    Str(String),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Insertion-ordered object.
    Object(IndexMap<String, Value>),
    /// XML element node.
    Xml(XmlNode),
    /// Absence of a body (distinct from `Null`).
    NoBody,
}

/// XML element node.
///
/// # Invariants
/// - `children` hold either [`Value::Xml`] elements or [`Value::Str`] text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    /// Local element name.
    pub name: String,
    /// Optional namespace URI.
    pub namespace: Option<String>,
    /// Optional namespace prefix.
    pub prefix: Option<String>,
    /// Attributes in document order.
    pub attributes: IndexMap<String, String>,
    /// Child elements and text nodes.
    pub children: Vec<Value>,
}

impl XmlNode {
    /// Creates an element with no attributes or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            prefix: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Adds a child value.
    #[must_use]
    pub fn with_child(mut self, child: Value) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the qualified tag (`prefix:name` when a prefix is present).
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Returns the concatenated text content of direct text children.
    #[must_use]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                Value::Str(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Renders the node as XML text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    /// Appends the XML rendering of this node.
    fn render_into(&self, out: &mut String) {
        let tag = self.qualified_name();
        out.push('<');
        out.push_str(&tag);
        if let Some(namespace) = &self.namespace {
            match &self.prefix {
                Some(prefix) => out.push_str(&format!(" xmlns:{prefix}=\"{}\"", escape_xml(namespace))),
                None => out.push_str(&format!(" xmlns=\"{}\"", escape_xml(namespace))),
            }
        }
        for (name, value) in &self.attributes {
            out.push_str(&format!(" {name}=\"{}\"", escape_xml(value)));
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Value::Xml(node) => node.render_into(out),
                other => out.push_str(&escape_xml(&other.display_text())),
            }
        }
        out.push_str("</");
        out.push_str(&tag);
        out.push('>');
    }
}

impl Value {
    /// Builds a string value.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    /// Builds a number value from an integer.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::Number(BigDecimal::from(value))
    }

    /// Builds a number value from decimal text, returning `None` when the text is not numeric.
    #[must_use]
    pub fn decimal(text: &str) -> Option<Self> {
        BigDecimal::from_str(text.trim()).ok().map(Self::Number)
    }

    /// Builds an object value from key/value pairs, preserving order.
    #[must_use]
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Object(entries.into_iter().map(|(key, value)| (key.into(), value)).collect())
    }

    /// Returns a stable, human-readable name for the value's variant.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Object(_) => "object",
            Self::Xml(_) => "xml",
            Self::NoBody => "no body",
        }
    }

    /// Returns the object map when the value is an object.
    #[must_use]
    pub const fn as_object(&self) -> Option<&IndexMap<String, Self>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the string slice when the value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            _ => None,
        }
    }

    /// Renders the value as wire text.
    ///
    /// Scalars render without quotes; composite values render as JSON or XML.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(flag) => flag.to_string(),
            Self::Number(number) => number.to_string(),
            Self::Str(text) => text.clone(),
            Self::List(_) | Self::Object(_) => self.to_json().to_string(),
            Self::Xml(node) => node.render(),
            Self::NoBody => String::new(),
        }
    }

    /// Converts the value into a `serde_json` value.
    ///
    /// XML nodes become their rendered text and `NoBody` becomes `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null | Self::NoBody => serde_json::Value::Null,
            Self::Bool(flag) => serde_json::Value::Bool(*flag),
            Self::Number(number) => json_number(number),
            Self::Str(text) => serde_json::Value::String(text.clone()),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(map) => serde_json::Value::Object(
                map.iter().map(|(key, value)| (key.clone(), value.to_json())).collect(),
            ),
            Self::Xml(node) => serde_json::Value::String(node.render()),
        }
    }

    /// Converts a `serde_json` value into a value.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(flag) => Self::Bool(*flag),
            serde_json::Value::Number(number) => BigDecimal::from_str(&number.to_string())
                .map_or_else(|_| Self::Str(number.to_string()), Self::Number),
            serde_json::Value::String(text) => Self::Str(text.clone()),
            serde_json::Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            serde_json::Value::Object(map) => Self::Object(
                map.iter().map(|(key, value)| (key.clone(), Self::from_json(value))).collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Self::from_json(&json)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Str(text.to_string())
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Self::integer(number)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(text) => write!(f, "\"{text}\""),
            Self::Xml(node) => f.write_str(&node.render()),
            Self::NoBody => f.write_str("(no body)"),
            other => f.write_str(&other.to_json().to_string()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_json(&json))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts a decimal into a JSON number, falling back to a string when the
/// rendering is not representable.
fn json_number(number: &BigDecimal) -> serde_json::Value {
    let rendered = number.to_string();
    match serde_json::from_str::<serde_json::Value>(&rendered) {
        Ok(json @ serde_json::Value::Number(_)) => json,
        _ => serde_json::Value::String(rendered),
    }
}

/// Escapes XML special characters.
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
