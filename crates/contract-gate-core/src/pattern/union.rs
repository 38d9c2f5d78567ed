// crates/contract-gate-core/src/pattern/union.rs
// ============================================================================
// Module: Contract Gate Union Patterns
// Description: oneOf/anyOf/nullable unions with optional discriminators.
// Purpose: Select union members by declared order or discriminator value.
// Dependencies: indexmap, crate::pattern
// ============================================================================

//! ## Overview
//! A union keeps its members in declaration order; that order is the
//! tie-break when several members match. A discriminator narrows the
//! candidates to the members whose discriminator value equals the value's
//! discriminator property. User-supplied mapping entries always win; a value
//! with no mapping entry falls back to a member whose schema name is exactly
//! that value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use indexmap::IndexMap;

use crate::pattern::Pattern;

// ============================================================================
// SECTION: Discriminator
// ============================================================================

/// Discriminator declaration for a union.
///
/// # Invariants
/// - `mapping` holds only user-supplied entries; implied entries are never written into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminator {
    /// Property whose value selects the member.
    pub property_name: String,
    /// Discriminator value to pattern name.
    pub mapping: IndexMap<String, String>,
}

impl Discriminator {
    /// Creates a discriminator with an implied (name-based) mapping.
    #[must_use]
    pub fn new(property_name: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            mapping: IndexMap::new(),
        }
    }

    /// Adds a user-supplied mapping entry.
    #[must_use]
    pub fn with_mapping(mut self, value: impl Into<String>, pattern_name: impl Into<String>) -> Self {
        self.mapping.insert(value.into(), pattern_name.into());
        self
    }

    /// Returns the pattern name selected by a discriminator value.
    #[must_use]
    pub fn target_for<'a>(&'a self, value: &'a str) -> &'a str {
        self.mapping.get(value).map_or(value, String::as_str)
    }

    /// Returns the discriminator value that selects a named member.
    #[must_use]
    pub fn value_for<'a>(&'a self, pattern_name: &'a str) -> &'a str {
        self.mapping
            .iter()
            .find(|(_, target)| target.as_str() == pattern_name)
            .map_or(pattern_name, |(value, _)| value.as_str())
    }
}

// ============================================================================
// SECTION: Union Pattern
// ============================================================================

/// Ordered union of patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyOfPattern {
    /// Members in declaration order.
    pub members: Vec<Pattern>,
    /// Optional discriminator.
    pub discriminator: Option<Discriminator>,
}

impl AnyOfPattern {
    /// Creates an undiscriminated union.
    #[must_use]
    pub const fn new(members: Vec<Pattern>) -> Self {
        Self {
            members,
            discriminator: None,
        }
    }

    /// Attaches a discriminator.
    #[must_use]
    pub fn with_discriminator(mut self, discriminator: Discriminator) -> Self {
        self.discriminator = Some(discriminator);
        self
    }

    /// Returns true when one member is the null pattern.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.members.iter().any(|member| matches!(member, Pattern::Null))
    }

    /// Returns the members selected by a discriminator value, in declaration order.
    #[must_use]
    pub fn members_for_discriminator(&self, value: &str) -> Vec<&Pattern> {
        let Some(discriminator) = &self.discriminator else {
            return self.members.iter().collect();
        };
        let target = discriminator.target_for(value);
        self.members
            .iter()
            .filter(|member| matches!(member, Pattern::Ref(name) if name == target))
            .collect()
    }
}
