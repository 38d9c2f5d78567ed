// crates/contract-gate-core/src/pattern/object.rs
// ============================================================================
// Module: Contract Gate Object Patterns
// Description: Keyed object patterns, optional keys, and allOf merging.
// Purpose: Fix each object's required-key set at construction time.
// Dependencies: indexmap, crate::{pattern, registry}
// ============================================================================

//! ## Overview
//! Object patterns map keys to patterns. A key written as `name?` is optional;
//! every other key is required. The required set is computed once when the
//! pattern is built and only from that level: merging allOf parts unions the
//! parts' own required sets and never reaches into nested named schemas.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::pattern::Pattern;
use crate::registry::PatternRegistry;

// ============================================================================
// SECTION: Additional Properties
// ============================================================================

/// Policy for keys not declared in an object pattern.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AdditionalProperties {
    /// Undeclared keys fail.
    #[default]
    Closed,
    /// Undeclared keys pass with any value, including `null`.
    FreeForm,
    /// Undeclared keys must match the pattern.
    PatternConstrained(Box<Pattern>),
}

// ============================================================================
// SECTION: Object Pattern
// ============================================================================

/// Object pattern with a construction-time required-key set.
///
/// # Invariants
/// - `required` is computed from this level only.
/// - Property order is declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectPattern {
    /// Declared properties.
    properties: IndexMap<String, Pattern>,
    /// Required key names.
    required: BTreeSet<String>,
    /// Policy for undeclared keys.
    additional: AdditionalProperties,
}

impl ObjectPattern {
    /// Builds an object from `key` / `key?` notation; keys without the `?`
    /// suffix are required.
    #[must_use]
    pub fn from_keys<K, I>(entries: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Pattern)>,
    {
        let mut properties = IndexMap::new();
        let mut required = BTreeSet::new();
        for (key, pattern) in entries {
            let key = key.as_ref();
            match key.strip_suffix('?') {
                Some(optional) => {
                    properties.insert(optional.to_string(), pattern);
                }
                None => {
                    required.insert(key.to_string());
                    properties.insert(key.to_string(), pattern);
                }
            }
        }
        Self {
            properties,
            required,
            additional: AdditionalProperties::Closed,
        }
    }

    /// Builds an object from properties and an explicit required list.
    #[must_use]
    pub fn new<K, I, R>(properties: I, required: R) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Pattern)>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            properties: properties.into_iter().map(|(key, pattern)| (key.into(), pattern)).collect(),
            required: required.into_iter().map(Into::into).collect(),
            additional: AdditionalProperties::Closed,
        }
    }

    /// Sets the policy for undeclared keys.
    #[must_use]
    pub fn with_additional(mut self, additional: AdditionalProperties) -> Self {
        self.additional = additional;
        self
    }

    /// Returns the declared properties in order.
    #[must_use]
    pub const fn properties(&self) -> &IndexMap<String, Pattern> {
        &self.properties
    }

    /// Returns the policy for undeclared keys.
    #[must_use]
    pub const fn additional(&self) -> &AdditionalProperties {
        &self.additional
    }

    /// Returns true when the key must be present.
    #[must_use]
    pub fn is_required(&self, key: &str) -> bool {
        self.required.contains(key)
    }

    /// Returns required keys: declared ones in declaration order, then any
    /// required keys without a declared pattern.
    #[must_use]
    pub fn required_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .properties
            .keys()
            .filter(|key| self.required.contains(key.as_str()))
            .map(String::as_str)
            .collect();
        for key in &self.required {
            if !self.properties.contains_key(key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Returns a copy with the key removed from both properties and the required set.
    #[must_use]
    pub fn without_key(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.properties.shift_remove(key);
        next.required.remove(key);
        next
    }

    /// Returns a copy with the key's pattern replaced, keeping its required flag.
    #[must_use]
    pub fn with_property(&self, key: &str, pattern: Pattern) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.properties.get_mut(key) {
            *slot = pattern;
        } else {
            next.properties.insert(key.to_string(), pattern);
        }
        next
    }

    /// Merges allOf parts into one object.
    ///
    /// Named parts are resolved one level through the registry. The merged
    /// required set is the union of each part's own required set; nested
    /// property patterns are carried over untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnresolvedReference`] when a named part is missing
    /// and [`SchemaError::NonObjectMergePart`] when a part is not an object.
    pub fn merge_all_of(parts: &[Pattern], registry: &PatternRegistry) -> Result<Self, SchemaError> {
        let mut merged = Self::default();
        let mut additional: Option<AdditionalProperties> = None;
        for part in parts {
            let object = match part {
                Pattern::Object(object) => object.clone(),
                Pattern::Ref(name) => match registry.get(name) {
                    Some(Pattern::Object(object)) => object.clone(),
                    Some(_) => {
                        return Err(SchemaError::NonObjectMergePart {
                            part: name.clone(),
                        });
                    }
                    None => {
                        return Err(SchemaError::UnresolvedReference {
                            name: name.clone(),
                        });
                    }
                },
                other => {
                    return Err(SchemaError::NonObjectMergePart {
                        part: other.describe(),
                    });
                }
            };
            for (key, pattern) in object.properties {
                merged.properties.insert(key, pattern);
            }
            merged.required.extend(object.required);
            additional = Some(match (additional, object.additional) {
                (Some(AdditionalProperties::FreeForm), _) | (_, AdditionalProperties::FreeForm) => {
                    AdditionalProperties::FreeForm
                }
                (Some(AdditionalProperties::PatternConstrained(pattern)), _)
                | (_, AdditionalProperties::PatternConstrained(pattern)) => {
                    AdditionalProperties::PatternConstrained(pattern)
                }
                _ => AdditionalProperties::Closed,
            });
        }
        merged.additional = additional.unwrap_or_default();
        Ok(merged)
    }
}
