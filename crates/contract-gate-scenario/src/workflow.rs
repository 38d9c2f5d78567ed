// crates/contract-gate-scenario/src/workflow.rs
// ============================================================================
// Module: Contract Gate Workflow Bindings
// Description: Capture values from responses and inject them into later requests.
// Purpose: Chain test steps without sharing state across chains.
// Dependencies: contract-gate-config, contract-gate-core, tracing, crate::{contract, http}
// ============================================================================

//! ## Overview
//! A [`Workflow`] holds the parsed rules from configuration. After a step
//! runs, rules whose key selects the step's operation and actual status
//! capture a value into the chain's [`BindingStore`]. Before a later step
//! runs, rules whose key selects that step and its expected status turn
//! stored values into request overrides. Each chain owns its own store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;

use contract_gate_config::BindingLocation;
use contract_gate_config::ConfigError;
use contract_gate_config::WorkflowConfig;
use contract_gate_config::WorkflowRule;
use contract_gate_core::Value;
use tracing::debug;

use crate::contract::Scenario;
use crate::http::HttpResponse;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Binding name used by `workflow.ids` rules.
pub const ID_BINDING: &str = "id";

// ============================================================================
// SECTION: Binding Store
// ============================================================================

/// Values captured during one chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingStore {
    /// Captured values by binding name.
    values: HashMap<String, Value>,
}

impl BindingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a bound value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Binds a value, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Returns the number of bound values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// SECTION: Workflow
// ============================================================================

/// Parsed workflow rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workflow {
    /// Rules in declaration order.
    rules: Vec<WorkflowRule>,
}

impl Workflow {
    /// Creates a workflow from parsed rules.
    #[must_use]
    pub const fn new(rules: Vec<WorkflowRule>) -> Self {
        Self {
            rules,
        }
    }

    /// Builds a workflow from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a rule is malformed.
    pub fn from_config(config: &WorkflowConfig) -> Result<Self, ConfigError> {
        config.rules().map(Self::new)
    }

    /// Returns the rules.
    #[must_use]
    pub fn rules(&self) -> &[WorkflowRule] {
        &self.rules
    }

    /// Returns request overrides for a step expecting `status`.
    #[must_use]
    pub fn overrides(&self, scenario: &Scenario, status: u16, store: &BindingStore) -> Vec<(BindingLocation, Value)> {
        let Some(value) = store.get(ID_BINDING) else {
            return Vec::new();
        };
        let mut overrides = Vec::new();
        for rule in &self.rules {
            let Some(location) = &rule.use_at else {
                continue;
            };
            if rule.key.matches(&scenario.request.method, scenario.request.path.template(), status) {
                debug!(scenario = %scenario.name, location = %location, "injecting workflow binding");
                overrides.push((location.clone(), value.clone()));
            }
        }
        overrides
    }

    /// Captures values from a response into the store.
    ///
    /// Returns true when a value was captured.
    pub fn capture(&self, scenario: &Scenario, response: &HttpResponse, store: &mut BindingStore) -> bool {
        let mut captured = false;
        for rule in &self.rules {
            let Some(location) = &rule.extract else {
                continue;
            };
            if !rule.key.matches(&scenario.request.method, scenario.request.path.template(), response.status) {
                continue;
            }
            if let Some(value) = read_response(location, response) {
                debug!(scenario = %scenario.name, location = %location, "captured workflow binding");
                store.insert(ID_BINDING, value);
                captured = true;
            }
        }
        captured
    }
}

// ============================================================================
// SECTION: Value Paths
// ============================================================================

/// Reads a captured value from a response.
fn read_response(location: &BindingLocation, response: &HttpResponse) -> Option<Value> {
    match location {
        BindingLocation::Body(segments) => value_at(&response.body, segments).cloned(),
        BindingLocation::Header(name) => response.header(name).map(Value::string),
        BindingLocation::Path(_) | BindingLocation::Query(_) => None,
    }
}

/// Returns the value at a key path; numeric segments index lists.
#[must_use]
pub fn value_at<'v>(value: &'v Value, segments: &[String]) -> Option<&'v Value> {
    let mut current = value;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::List(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Replaces the value at an existing key path.
///
/// Returns false when the path does not exist; an empty path replaces the root.
pub fn set_at(value: &mut Value, segments: &[String], replacement: Value) -> bool {
    let Some((last, parents)) = segments.split_last() else {
        *value = replacement;
        return true;
    };
    let mut current = value;
    for segment in parents {
        current = match current {
            Value::Object(map) => match map.get_mut(segment) {
                Some(next) => next,
                None => return false,
            },
            Value::List(items) => match segment.parse::<usize>().ok().and_then(|index| items.get_mut(index)) {
                Some(next) => next,
                None => return false,
            },
            _ => return false,
        };
    }
    let slot = match current {
        Value::Object(map) => map.get_mut(last),
        Value::List(items) => last.parse::<usize>().ok().and_then(|index| items.get_mut(index)),
        _ => None,
    };
    match slot {
        Some(slot) => {
            *slot = replacement;
            true
        }
        None => false,
    }
}
