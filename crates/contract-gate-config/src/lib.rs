// crates/contract-gate-config/src/lib.rs
// ============================================================================
// Module: Contract Gate Config Library
// Description: Canonical config model and validation for Contract Gate.
// Purpose: Single source of truth for contract-gate.toml semantics.
// Dependencies: contract-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! `contract-gate-config` defines the configuration model for the Contract
//! Gate engine and suite runner: engine mode flags and generation limits,
//! suite settings, and workflow binding rules. Validation is strict and
//! fail-closed; engine settings convert into the core crate's
//! [`contract_gate_core::ResolverSettings`].
//!
//! Security posture: config inputs are untrusted and size-capped.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod workflow;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use workflow::BindingLocation;
pub use workflow::WorkflowKey;
pub use workflow::WorkflowRule;
