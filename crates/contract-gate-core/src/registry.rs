// crates/contract-gate-core/src/registry.rs
// ============================================================================
// Module: Contract Gate Pattern Registry
// Description: Name to pattern registry shared by resolvers.
// Purpose: Hold named schemas immutably and validate references at load time.
// Dependencies: indexmap, crate::{error, pattern}
// ============================================================================

//! ## Overview
//! The registry is filled while a contract is loaded, validated once, and then
//! shared read-only behind an `Arc` by every resolver. Validation fails closed
//! on unresolved references, contradictory bounds, and discriminator mappings
//! that point at unknown schemas.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::pattern::AdditionalProperties;
use crate::pattern::Pattern;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Registry of named patterns.
///
/// # Invariants
/// - Names are unique.
/// - Read-only once shared with resolvers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternRegistry {
    /// Patterns keyed by schema name, in registration order.
    patterns: IndexMap<String, Arc<Pattern>>,
}

impl PatternRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named pattern.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicatePattern`] when the name is already registered.
    pub fn insert(&mut self, name: impl Into<String>, pattern: Pattern) -> Result<(), SchemaError> {
        let name = name.into();
        if self.patterns.contains_key(&name) {
            return Err(SchemaError::DuplicatePattern {
                name,
            });
        }
        self.patterns.insert(name, Arc::new(pattern));
        Ok(())
    }

    /// Builder-style registration.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicatePattern`] when the name is already registered.
    pub fn with(mut self, name: impl Into<String>, pattern: Pattern) -> Result<Self, SchemaError> {
        self.insert(name, pattern)?;
        Ok(self)
    }

    /// Returns the pattern registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Pattern> {
        self.patterns.get(name).map(AsRef::as_ref)
    }

    /// Returns a shared handle to the pattern registered under `name`.
    #[must_use]
    pub fn get_shared(&self, name: &str) -> Option<Arc<Pattern>> {
        self.patterns.get(name).cloned()
    }

    /// Returns true when `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    /// Iterates over registered names and patterns.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Pattern)> {
        self.patterns.iter().map(|(name, pattern)| (name.as_str(), pattern.as_ref()))
    }

    /// Returns the number of registered patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Validates every registered pattern.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (name, pattern) in &self.patterns {
            self.validate_pattern(name, pattern)?;
        }
        Ok(())
    }

    /// Validates a pattern that is not itself registered (for example a request body).
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found.
    pub fn validate_pattern(&self, schema: &str, pattern: &Pattern) -> Result<(), SchemaError> {
        let mut outcome = Ok(());
        pattern.walk(&mut |node| {
            if outcome.is_err() {
                return;
            }
            outcome = self.validate_node(schema, node);
        });
        outcome
    }

    /// Validates a single node without descending.
    fn validate_node(&self, schema: &str, node: &Pattern) -> Result<(), SchemaError> {
        match node {
            Pattern::Ref(target) if !self.contains(target) => Err(SchemaError::UnresolvedReference {
                name: target.clone(),
            }),
            Pattern::Primitive(primitive) => primitive.validate(schema),
            Pattern::ListOf(list) => match (list.min_items, list.max_items) {
                (Some(min), Some(max)) if min > max => Err(SchemaError::ConflictingConstraints {
                    schema: schema.to_string(),
                    reason: format!("minItems {min} exceeds maxItems {max}"),
                }),
                _ => Ok(()),
            },
            Pattern::Object(object) => {
                if *object.additional() != AdditionalProperties::Closed {
                    return Ok(());
                }
                match object.required_keys().into_iter().find(|key| !object.properties().contains_key(*key)) {
                    Some(key) => Err(SchemaError::ConflictingConstraints {
                        schema: schema.to_string(),
                        reason: format!("required key {key} is not declared and extra keys are closed"),
                    }),
                    None => Ok(()),
                }
            }
            Pattern::AnyOf(union) => {
                let Some(discriminator) = &union.discriminator else {
                    return Ok(());
                };
                for (value, target) in &discriminator.mapping {
                    if !self.contains(target) {
                        return Err(SchemaError::UnknownDiscriminatorTarget {
                            property: discriminator.property_name.clone(),
                            value: value.clone(),
                            target: target.clone(),
                        });
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
