// crates/contract-gate-core/src/error.rs
// ============================================================================
// Module: Contract Gate Errors
// Description: Load-time, generation, and parse error taxonomy.
// Purpose: Keep fatal contract defects separate from ordinary match failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Matching never raises errors: mismatches are reported through
//! [`crate::MatchResult`]. The errors here cover malformed contracts
//! ([`SchemaError`]), patterns that cannot be satisfied ([`GenerationError`]),
//! and text that cannot be read as a pattern's shape ([`ParseError`]).

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Schema Errors
// ============================================================================

/// Malformed contract detected while assembling patterns or scenarios.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages name the offending schema, parameter, or value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A parameter was declared without a name.
    #[error("parameter is missing a name")]
    MissingParameterName,
    /// A parameter was declared without a schema.
    #[error("parameter {parameter} is missing a schema")]
    MissingParameterSchema {
        /// Parameter name.
        parameter: String,
    },
    /// An array schema was declared without `items`.
    #[error("array schema {schema} has no items")]
    ArrayWithoutItems {
        /// Schema path or name.
        schema: String,
    },
    /// A status code was not a single numeric code.
    #[error("invalid status code {value:?}: expected a three digit number")]
    InvalidStatusCode {
        /// Raw status text.
        value: String,
    },
    /// A named reference does not resolve in the registry.
    #[error("reference to unknown pattern {name}")]
    UnresolvedReference {
        /// Referenced pattern name.
        name: String,
    },
    /// A pattern name was registered twice.
    #[error("pattern {name} is registered more than once")]
    DuplicatePattern {
        /// Pattern name.
        name: String,
    },
    /// A regex constraint failed to compile.
    #[error("invalid regex {regex:?}: {reason}")]
    InvalidRegex {
        /// Regex source text.
        regex: String,
        /// Compiler diagnostic.
        reason: String,
    },
    /// Constraints cannot be satisfied together.
    #[error("conflicting constraints in {schema}: {reason}")]
    ConflictingConstraints {
        /// Schema path or name.
        schema: String,
        /// Description of the conflict.
        reason: String,
    },
    /// A discriminator mapping targets a pattern that is not registered.
    #[error("discriminator {property}={value} maps to unknown pattern {target}")]
    UnknownDiscriminatorTarget {
        /// Discriminator property name.
        property: String,
        /// Discriminator value.
        value: String,
        /// Mapped pattern name.
        target: String,
    },
    /// An allOf part could not be merged into an object.
    #[error("allOf part {part} is not an object schema")]
    NonObjectMergePart {
        /// Description of the offending part.
        part: String,
    },
}

// ============================================================================
// SECTION: Generation Errors
// ============================================================================

/// Pattern that cannot produce a value.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Constraints leave no admissible value.
    #[error("cannot generate a value for {pattern}: {reason}")]
    Unsatisfiable {
        /// Pattern description.
        pattern: String,
        /// Why no value exists.
        reason: String,
    },
    /// A named pattern requires itself with no absent case to fall back on.
    #[error("pattern {name} requires itself and has no terminal case")]
    UnboundedRecursion {
        /// Pattern name.
        name: String,
    },
    /// A named reference does not resolve.
    #[error("cannot generate unknown pattern {name}")]
    UnresolvedReference {
        /// Referenced pattern name.
        name: String,
    },
    /// An example cell does not fit the pattern it overrides.
    #[error("example value for {key} does not fit its pattern: {reason}")]
    InvalidExampleValue {
        /// Example column/key.
        key: String,
        /// Parse or match diagnostic.
        reason: String,
    },
}

// ============================================================================
// SECTION: Parse Errors
// ============================================================================

/// Text that cannot be read as a pattern's expected shape.
///
/// # Invariants
/// - `text` holds the raw input for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse \"{text}\" as {expected}")]
pub struct ParseError {
    /// Raw input text.
    pub text: String,
    /// Expected shape description.
    pub expected: String,
}

impl ParseError {
    /// Creates a parse error.
    #[must_use]
    pub fn new(text: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expected: expected.into(),
        }
    }
}

// ============================================================================
// SECTION: Umbrella Error
// ============================================================================

/// Any fatal contract-engine error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// Malformed contract.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// Unsatisfiable pattern.
    #[error(transparent)]
    Generation(#[from] GenerationError),
    /// Unparseable text.
    #[error(transparent)]
    Parse(#[from] ParseError),
}
