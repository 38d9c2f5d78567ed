// crates/contract-gate-core/src/lib.rs
// ============================================================================
// Module: Contract Gate Core Library
// Description: Public API surface for the Contract Gate pattern engine.
// Purpose: Expose values, patterns, resolution, matching, and generation.
// Dependencies: crate::{boundary, error, generator, matcher, parse, pattern, registry, resolver, result, row, value}
// ============================================================================

//! ## Overview
//! Contract Gate core represents every contract schema as a structural
//! [`Pattern`] and provides the two dual operations over it:
//! [`match_value`] (value to explained pass/fail) and [`generate`] (pattern to
//! conforming value). Both terminate on self-referential schemas through the
//! per-call [`Resolver`]. The engine is pure: it performs no I/O and holds no
//! state beyond the immutable [`PatternRegistry`] and each resolver's own
//! stacks.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod boundary;
pub mod error;
pub mod generator;
pub mod matcher;
pub mod parse;
pub mod pattern;
pub mod regex_gen;
pub mod registry;
pub mod resolver;
pub mod result;
pub mod row;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use boundary::BoundaryValue;
pub use error::ContractError;
pub use error::GenerationError;
pub use error::ParseError;
pub use error::SchemaError;
pub use generator::Generator;
pub use generator::generate;
pub use generator::generate_with_row;
pub use matcher::match_value;
pub use parse::parse_text;
pub use pattern::AdditionalProperties;
pub use pattern::AnyOfPattern;
pub use pattern::Bound;
pub use pattern::Discriminator;
pub use pattern::ListPattern;
pub use pattern::NumberConstraints;
pub use pattern::NumberKind;
pub use pattern::ObjectPattern;
pub use pattern::Occurs;
pub use pattern::Pattern;
pub use pattern::PrimitivePattern;
pub use pattern::RegexConstraint;
pub use pattern::StringConstraints;
pub use pattern::StringFormat;
pub use pattern::XmlElementPattern;
pub use registry::PatternRegistry;
pub use resolver::Resolver;
pub use resolver::ResolverSettings;
pub use result::Failure;
pub use result::MatchResult;
pub use row::ExampleRow;
pub use row::REQUEST_BODY_COLUMN;
pub use value::Value;
pub use value::XmlNode;

// ============================================================================
// SECTION: Reporting
// ============================================================================

/// Renders a match result as an indented breadcrumb report.
///
/// Success renders as an empty string.
#[must_use]
pub fn report_string(result: &MatchResult) -> String {
    result.report_string()
}
