// crates/contract-gate-config/src/config.rs
// ============================================================================
// Module: Contract Gate Configuration
// Description: Configuration loading and validation for Contract Gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: bigdecimal, contract-gate-core, indexmap, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is read from TOML with a size cap and UTF-8 check, then
//! validated section by section. Every field has a default, so an empty file
//! is a valid configuration. Mode flags live here and are handed to resolvers
//! explicitly; nothing is read from the process environment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use contract_gate_core::ResolverSettings;
use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::workflow::BindingLocation;
use crate::workflow::WorkflowKey;
use crate::workflow::WorkflowRule;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum allowed generation recursion depth.
pub(crate) const MAX_RECURSION_DEPTH: usize = 16;
/// Maximum allowed generated list length.
pub(crate) const MAX_LIST_ITEMS: usize = 1000;
/// Maximum allowed default string length.
pub(crate) const MAX_STRING_LENGTH: usize = 64 * 1024;
/// Maximum number of workflow rules.
pub(crate) const MAX_WORKFLOW_RULES: usize = 256;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Contract Gate configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractGateConfig {
    /// Matching and generation settings.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Test suite settings.
    #[serde(default)]
    pub suite: SuiteConfig,
    /// Workflow binding rules.
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

impl ContractGateConfig {
    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.workflow.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Matching and generation settings.
///
/// # Invariants
/// - `1 <= max_recursion_depth <= 16`.
/// - `min_list_items <= max_list_items <= 1000`.
/// - `decimal_epsilon` parses as a positive decimal.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Relax API-key-in-query requirements while matching.
    #[serde(default)]
    pub mock_mode: bool,
    /// Enable boundary and negative value synthesis.
    #[serde(default)]
    pub generative: bool,
    /// Seed for arbitrary value generation.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Times a named schema may be re-entered while generating.
    #[serde(default = "default_max_recursion_depth")]
    pub max_recursion_depth: usize,
    /// Boundary increment for decimal-typed numbers, as decimal text.
    #[serde(default = "default_decimal_epsilon")]
    pub decimal_epsilon: String,
    /// Elements generated for positive list values, lower bound.
    #[serde(default = "default_min_list_items")]
    pub min_list_items: usize,
    /// Elements generated for positive list values, upper bound.
    #[serde(default = "default_max_list_items")]
    pub max_list_items: usize,
    /// Default upper length for unconstrained strings.
    #[serde(default = "default_max_string_length")]
    pub max_string_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mock_mode: false,
            generative: false,
            seed: default_seed(),
            max_recursion_depth: default_max_recursion_depth(),
            decimal_epsilon: default_decimal_epsilon(),
            min_list_items: default_min_list_items(),
            max_list_items: default_max_list_items(),
            max_string_length: default_max_string_length(),
        }
    }
}

impl EngineConfig {
    /// Validates engine limits.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_recursion_depth == 0 || self.max_recursion_depth > MAX_RECURSION_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "engine.max_recursion_depth must be between 1 and {MAX_RECURSION_DEPTH}"
            )));
        }
        if self.min_list_items > self.max_list_items {
            return Err(ConfigError::Invalid(
                "engine.min_list_items must not exceed engine.max_list_items".to_string(),
            ));
        }
        if self.max_list_items > MAX_LIST_ITEMS {
            return Err(ConfigError::Invalid(format!("engine.max_list_items must be at most {MAX_LIST_ITEMS}")));
        }
        if self.max_string_length == 0 || self.max_string_length > MAX_STRING_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "engine.max_string_length must be between 1 and {MAX_STRING_LENGTH}"
            )));
        }
        parse_epsilon(&self.decimal_epsilon)?;
        Ok(())
    }

    /// Builds resolver settings from the engine section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the decimal epsilon is malformed.
    pub fn resolver_settings(&self) -> Result<ResolverSettings, ConfigError> {
        Ok(ResolverSettings {
            mock_mode: self.mock_mode,
            generative: self.generative,
            seed: self.seed,
            max_recursion_depth: self.max_recursion_depth,
            decimal_epsilon: parse_epsilon(&self.decimal_epsilon)?,
            min_list_items: self.min_list_items,
            max_list_items: self.max_list_items,
            max_string_length: self.max_string_length,
        })
    }
}

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Test suite settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteConfig {
    /// Enumerate negative and boundary cases after the positive ones.
    #[serde(default = "default_include_negative")]
    pub include_negative: bool,
    /// Cancel not-yet-started chains after the first failed case.
    #[serde(default)]
    pub fail_fast: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            include_negative: default_include_negative(),
            fail_fast: false,
        }
    }
}

// ============================================================================
// SECTION: Workflow
// ============================================================================

/// Workflow binding rules keyed by `"METHOD PATH -> STATUS"` or `"*"`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Rules for the shared `id` binding, in declaration order.
    #[serde(default)]
    pub ids: IndexMap<String, WorkflowRuleConfig>,
}

/// Raw workflow rule as written in TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowRuleConfig {
    /// Response location to capture after the step runs.
    #[serde(default)]
    pub extract: Option<String>,
    /// Request location to fill before the step runs.
    #[serde(default, rename = "use")]
    pub use_at: Option<String>,
}

impl WorkflowConfig {
    /// Validates every rule.
    fn validate(&self) -> Result<(), ConfigError> {
        self.rules().map(|_| ())
    }

    /// Parses the configured rules into typed rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a key or location is malformed.
    pub fn rules(&self) -> Result<Vec<WorkflowRule>, ConfigError> {
        if self.ids.len() > MAX_WORKFLOW_RULES {
            return Err(ConfigError::Invalid(format!(
                "workflow.ids must have at most {MAX_WORKFLOW_RULES} entries"
            )));
        }
        self.ids.iter().map(|(key, rule)| parse_rule(key, rule)).collect()
    }
}

/// Parses one raw workflow rule.
fn parse_rule(key: &str, rule: &WorkflowRuleConfig) -> Result<WorkflowRule, ConfigError> {
    let parsed_key = WorkflowKey::parse(key)?;
    if rule.extract.is_none() && rule.use_at.is_none() {
        return Err(ConfigError::Invalid(format!("workflow rule {key} must set extract or use")));
    }
    let extract = rule.extract.as_deref().map(BindingLocation::parse).transpose()?;
    if let Some(location) = &extract {
        if parsed_key == WorkflowKey::Any {
            return Err(ConfigError::Invalid("workflow rule * cannot extract".to_string()));
        }
        if !location.is_response_location() {
            return Err(ConfigError::Invalid(format!(
                "workflow rule {key} extracts from {location}, which is not part of a response"
            )));
        }
    }
    let use_at = rule.use_at.as_deref().map(BindingLocation::parse).transpose()?;
    Ok(WorkflowRule {
        key: parsed_key,
        extract,
        use_at,
    })
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates a config path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Parses the decimal epsilon, requiring a positive value.
fn parse_epsilon(text: &str) -> Result<BigDecimal, ConfigError> {
    let epsilon = BigDecimal::from_str(text.trim())
        .map_err(|_| ConfigError::Invalid(format!("engine.decimal_epsilon {text:?} is not a decimal")))?;
    if epsilon <= BigDecimal::from(0) {
        return Err(ConfigError::Invalid("engine.decimal_epsilon must be positive".to_string()));
    }
    Ok(epsilon)
}

/// Default generation seed.
const fn default_seed() -> u64 {
    42
}

/// Default generation recursion depth.
const fn default_max_recursion_depth() -> usize {
    1
}

/// Default decimal boundary increment.
fn default_decimal_epsilon() -> String {
    "0.01".to_string()
}

/// Default lower list length.
const fn default_min_list_items() -> usize {
    1
}

/// Default upper list length.
const fn default_max_list_items() -> usize {
    3
}

/// Default upper length for unconstrained strings.
const fn default_max_string_length() -> usize {
    32
}

/// Negative cases are enumerated by default.
const fn default_include_negative() -> bool {
    true
}
