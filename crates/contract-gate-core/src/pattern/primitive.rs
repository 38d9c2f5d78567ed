// crates/contract-gate-core/src/pattern/primitive.rs
// ============================================================================
// Module: Contract Gate Primitive Patterns
// Description: String, number, and boolean patterns with their constraints.
// Purpose: Own constraint checks so matching and boundary synthesis agree.
// Dependencies: bigdecimal, regex, time
// ============================================================================

//! ## Overview
//! Primitive patterns carry their own constraint sets. Numeric bounds are held
//! as [`BigDecimal`] and compared exactly; exclusive bounds are strict
//! inequalities. Regex constraints are compiled at construction and always
//! match the whole value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use bigdecimal::BigDecimal;
use regex::Regex;
use time::Date;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::SchemaError;

// ============================================================================
// SECTION: Primitive Pattern
// ============================================================================

/// Primitive pattern kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitivePattern {
    /// String with optional length, regex, and format constraints.
    String(StringConstraints),
    /// Number with optional bounds.
    Number(NumberConstraints),
    /// Boolean.
    Boolean,
}

impl PrimitivePattern {
    /// Returns a short description used in failure messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::String(constraints) => match constraints.format {
                Some(format) => format!("string ({format})"),
                None => "string".to_string(),
            },
            Self::Number(constraints) => match constraints.kind {
                NumberKind::Integer => "integer".to_string(),
                NumberKind::Decimal => "number".to_string(),
            },
            Self::Boolean => "boolean".to_string(),
        }
    }

    /// Validates that the constraints admit at least one value.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ConflictingConstraints`] when bounds contradict each other.
    pub fn validate(&self, schema: &str) -> Result<(), SchemaError> {
        match self {
            Self::String(constraints) => constraints.validate(schema),
            Self::Number(constraints) => constraints.validate(schema),
            Self::Boolean => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: String Constraints
// ============================================================================

/// Well-known string formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// `local@domain` address.
    Email,
    /// RFC 4122 textual UUID.
    Uuid,
    /// RFC 3339 full date.
    Date,
    /// RFC 3339 date-time.
    DateTime,
    /// Absolute URI with a scheme.
    Uri,
}

impl StringFormat {
    /// Parses an OpenAPI format name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "email" => Some(Self::Email),
            "uuid" => Some(Self::Uuid),
            "date" => Some(Self::Date),
            "date-time" => Some(Self::DateTime),
            "uri" | "url" => Some(Self::Uri),
            _ => None,
        }
    }

    /// Returns true when the text conforms to the format.
    #[must_use]
    pub fn accepts(self, text: &str) -> bool {
        match self {
            Self::Email => is_email(text),
            Self::Uuid => is_uuid(text),
            Self::Date => parse_rfc3339_date(text).is_some(),
            Self::DateTime => OffsetDateTime::parse(text, &Rfc3339).is_ok(),
            Self::Uri => is_uri(text),
        }
    }
}

impl fmt::Display for StringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Email => "email",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::DateTime => "date-time",
            Self::Uri => "uri",
        })
    }
}

/// Compiled regex constraint.
///
/// # Invariants
/// - `compiled` is the anchored full-match form of `source`.
#[derive(Debug, Clone)]
pub struct RegexConstraint {
    /// Regex text as declared.
    source: String,
    /// Anchored compiled regex.
    compiled: Regex,
}

impl RegexConstraint {
    /// Compiles a regex constraint.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidRegex`] when the regex does not compile.
    pub fn new(source: impl Into<String>) -> Result<Self, SchemaError> {
        let source = source.into();
        let compiled = Regex::new(&format!("^(?:{source})$")).map_err(|err| {
            SchemaError::InvalidRegex {
                regex: source.clone(),
                reason: err.to_string(),
            }
        })?;
        Ok(Self {
            source,
            compiled,
        })
    }

    /// Returns the declared regex text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns true when the whole text matches.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.compiled.is_match(text)
    }
}

impl PartialEq for RegexConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for RegexConstraint {}

/// String constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringConstraints {
    /// Minimum length in characters.
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    pub max_length: Option<usize>,
    /// Full-match regex.
    pub regex: Option<RegexConstraint>,
    /// Well-known format.
    pub format: Option<StringFormat>,
}

impl StringConstraints {
    /// Checks a string against the constraints, returning a failure message on violation.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message naming the violated constraint.
    pub fn check(&self, text: &str) -> Result<(), String> {
        let length = text.chars().count();
        if let Some(min) = self.min_length
            && length < min
        {
            return Err(format!(
                "Expected string with minLength {min}, actual was \"{text}\" (length {length})"
            ));
        }
        if let Some(max) = self.max_length
            && length > max
        {
            return Err(format!(
                "Expected string with maxLength {max}, actual was \"{text}\" (length {length})"
            ));
        }
        if let Some(regex) = &self.regex
            && !regex.is_match(text)
        {
            return Err(format!(
                "Expected string matching regex {}, actual was \"{text}\"",
                regex.source()
            ));
        }
        if let Some(format) = self.format
            && !format.accepts(text)
        {
            return Err(format!("Expected {format} string, actual was \"{text}\""));
        }
        Ok(())
    }

    /// Validates the length bounds.
    fn validate(&self, schema: &str) -> Result<(), SchemaError> {
        if let (Some(min), Some(max)) = (self.min_length, self.max_length)
            && min > max
        {
            return Err(SchemaError::ConflictingConstraints {
                schema: schema.to_string(),
                reason: format!("minLength {min} exceeds maxLength {max}"),
            });
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Number Constraints
// ============================================================================

/// Declared numeric type; selects the boundary increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    /// Whole numbers only; boundary increment is 1.
    Integer,
    /// Any decimal; boundary increment is the configured epsilon.
    Decimal,
}

/// Numeric bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    /// Bound value.
    pub value: BigDecimal,
    /// Strict inequality when true.
    pub exclusive: bool,
}

impl Bound {
    /// Creates an inclusive bound.
    #[must_use]
    pub fn inclusive(value: impl Into<BigDecimal>) -> Self {
        Self {
            value: value.into(),
            exclusive: false,
        }
    }

    /// Creates an exclusive bound.
    #[must_use]
    pub fn exclusive(value: impl Into<BigDecimal>) -> Self {
        Self {
            value: value.into(),
            exclusive: true,
        }
    }
}

/// Number constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberConstraints {
    /// Declared numeric type.
    pub kind: NumberKind,
    /// Lower bound.
    pub minimum: Option<Bound>,
    /// Upper bound.
    pub maximum: Option<Bound>,
}

impl NumberConstraints {
    /// Creates unbounded constraints of the given kind.
    #[must_use]
    pub const fn new(kind: NumberKind) -> Self {
        Self {
            kind,
            minimum: None,
            maximum: None,
        }
    }

    /// Checks a number against the constraints, returning a failure message on violation.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message naming the violated constraint.
    pub fn check(&self, number: &BigDecimal) -> Result<(), String> {
        if self.kind == NumberKind::Integer && !number.is_integer() {
            return Err(format!("Expected integer, actual was {number}"));
        }
        if let Some(min) = &self.minimum {
            let ok = if min.exclusive { number > &min.value } else { number >= &min.value };
            if !ok {
                let op = if min.exclusive { ">" } else { ">=" };
                return Err(format!("Expected number {op} {}, actual was {number}", min.value));
            }
        }
        if let Some(max) = &self.maximum {
            let ok = if max.exclusive { number < &max.value } else { number <= &max.value };
            if !ok {
                let op = if max.exclusive { "<" } else { "<=" };
                return Err(format!("Expected number {op} {}, actual was {number}", max.value));
            }
        }
        Ok(())
    }

    /// Validates that the bounds leave room for a value.
    fn validate(&self, schema: &str) -> Result<(), SchemaError> {
        let (Some(min), Some(max)) = (&self.minimum, &self.maximum) else {
            return Ok(());
        };
        let empty = if min.exclusive || max.exclusive {
            min.value >= max.value
        } else {
            min.value > max.value
        };
        if empty {
            return Err(SchemaError::ConflictingConstraints {
                schema: schema.to_string(),
                reason: format!("minimum {} is not below maximum {}", min.value, max.value),
            });
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Format Helpers
// ============================================================================

/// Parses an RFC3339 date-only value (YYYY-MM-DD).
fn parse_rfc3339_date(value: &str) -> Option<Date> {
    let mut parts = value.split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let month = time::Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

/// Checks for a single `@` with non-empty local and dotted domain parts.
fn is_email(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !text.chars().any(char::is_whitespace)
}

/// Checks the 8-4-4-4-12 hex layout.
fn is_uuid(text: &str) -> bool {
    let groups: Vec<&str> = text.split('-').collect();
    let lengths = [8, 4, 4, 4, 12];
    groups.len() == lengths.len()
        && groups
            .iter()
            .zip(lengths)
            .all(|(group, len)| group.len() == len && group.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Checks for `scheme:rest` with an alphabetic-led scheme.
fn is_uri(text: &str) -> bool {
    let Some((scheme, rest)) = text.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.is_empty()
        && !text.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use std::str::FromStr;

    use super::*;

    #[test]
    fn exclusive_bounds_are_strict() {
        let constraints = NumberConstraints {
            kind: NumberKind::Decimal,
            minimum: Some(Bound::exclusive(18)),
            maximum: Some(Bound::exclusive(120)),
        };
        assert!(constraints.check(&BigDecimal::from(18)).is_err());
        assert!(constraints.check(&BigDecimal::from_str("18.000000000000000001").unwrap()).is_ok());
        assert!(constraints.check(&BigDecimal::from(120)).is_err());
    }

    #[test]
    fn formats_accept_canonical_examples() {
        assert!(StringFormat::Uuid.accepts("123e4567-e89b-12d3-a456-426614174000"));
        assert!(!StringFormat::Uuid.accepts("123e4567"));
        assert!(StringFormat::Date.accepts("2024-02-29"));
        assert!(!StringFormat::Date.accepts("2023-02-29"));
        assert!(StringFormat::DateTime.accepts("2024-01-31T10:15:30Z"));
        assert!(StringFormat::Email.accepts("jill@example.com"));
        assert!(!StringFormat::Email.accepts("jill@"));
    }

    #[test]
    fn regex_is_anchored() {
        let regex = RegexConstraint::new("[a-z]+").unwrap();
        assert!(regex.is_match("abc"));
        assert!(!regex.is_match("abc1"));
    }
}
