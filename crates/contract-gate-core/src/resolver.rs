// crates/contract-gate-core/src/resolver.rs
// ============================================================================
// Module: Contract Gate Resolver
// Description: Per-call context for name resolution, recursion guards, and mode flags.
// Purpose: Make termination on self-referential schemas explicit and testable.
// Dependencies: bigdecimal, rand, tracing, crate::{boundary, pattern, registry, value}
// ============================================================================

//! ## Overview
//! A [`Resolver`] is created per scenario or request. It shares the
//! read-only [`PatternRegistry`] and owns everything mutable: the active
//! generation stack, the active match and parse stacks, and a seeded random
//! source.
//! Mode flags are plain fields of [`ResolverSettings`]; nothing is read from
//! process-global state.
//!
//! Security posture: registries are frozen before resolvers are created;
//! resolvers never mutate shared state, so parallel resolvers need no locks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use bigdecimal::BigDecimal;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::boundary::BoundaryValue;
use crate::boundary::boundary_values;
use crate::boundary::type_mismatches;
use crate::pattern::Pattern;
use crate::pattern::PrimitivePattern;
use crate::registry::PatternRegistry;
use crate::value::Value;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Mode flags and generation limits carried by a resolver.
///
/// # Invariants
/// - `min_list_items <= max_list_items`.
/// - `max_recursion_depth >= 1`.
/// - `decimal_epsilon > 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Relax API-key-in-query requirements while matching.
    pub mock_mode: bool,
    /// Enable boundary and negative value synthesis.
    pub generative: bool,
    /// Seed for arbitrary value generation.
    pub seed: u64,
    /// Times a named schema may already be on the generation stack before it is cut.
    pub max_recursion_depth: usize,
    /// Boundary increment for decimal numbers.
    pub decimal_epsilon: BigDecimal,
    /// Lower element count for generated lists.
    pub min_list_items: usize,
    /// Upper element count for generated lists.
    pub max_list_items: usize,
    /// Default upper length for unconstrained strings.
    pub max_string_length: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            mock_mode: false,
            generative: false,
            seed: 42,
            max_recursion_depth: 1,
            decimal_epsilon: BigDecimal::new(1.into(), 2),
            min_list_items: 1,
            max_list_items: 3,
            max_string_length: 32,
        }
    }
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Per-call resolution context.
///
/// # Invariants
/// - The registry is never mutated through a resolver.
/// - Stacks are balanced by the matcher and generator; `reset_stacks` restores a clean state.
#[derive(Debug, Clone)]
pub struct Resolver {
    /// Shared registry.
    registry: Arc<PatternRegistry>,
    /// Mode flags and limits.
    settings: ResolverSettings,
    /// Names currently being generated, innermost last.
    generation_stack: Vec<String>,
    /// `(name, value node address)` pairs currently being matched.
    match_stack: Vec<(String, usize)>,
    /// `(name, text)` pairs currently being parsed.
    parse_stack: Vec<(String, String)>,
    /// Seeded random source.
    rng: StdRng,
}

impl Resolver {
    /// Creates a resolver over a shared registry.
    #[must_use]
    pub fn new(registry: Arc<PatternRegistry>, settings: ResolverSettings) -> Self {
        let rng = StdRng::seed_from_u64(settings.seed);
        Self {
            registry,
            settings,
            generation_stack: Vec::new(),
            match_stack: Vec::new(),
            parse_stack: Vec::new(),
            rng,
        }
    }

    /// Creates a resolver with default settings.
    #[must_use]
    pub fn with_defaults(registry: Arc<PatternRegistry>) -> Self {
        Self::new(registry, ResolverSettings::default())
    }

    /// Creates an independent resolver on the same registry with a derived seed.
    #[must_use]
    pub fn fork(&self, stream: u64) -> Self {
        let mut settings = self.settings.clone();
        settings.seed = settings.seed.wrapping_add(stream);
        Self::new(Arc::clone(&self.registry), settings)
    }

    /// Returns the shared registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<PatternRegistry> {
        &self.registry
    }

    /// Returns the settings.
    #[must_use]
    pub const fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Returns true in mock mode.
    #[must_use]
    pub const fn mock_mode(&self) -> bool {
        self.settings.mock_mode
    }

    /// Returns true in generative mode.
    #[must_use]
    pub const fn generative(&self) -> bool {
        self.settings.generative
    }

    /// Returns the random source.
    pub const fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Resolves a name against the registry.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Arc<Pattern>> {
        self.registry.get_shared(name)
    }

    /// Follows references until a non-reference pattern is reached.
    ///
    /// Returns `None` for unknown names and for reference-only cycles.
    #[must_use]
    pub fn resolve_deep(&self, pattern: &Pattern) -> Option<Arc<Pattern>> {
        let Pattern::Ref(name) = pattern else {
            return Some(Arc::new(pattern.clone()));
        };
        let mut current = self.resolve(name)?;
        for _ in 0..=self.registry.len() {
            let next = match current.as_ref() {
                Pattern::Ref(next) => self.resolve(next)?,
                _ => return Some(current),
            };
            current = next;
        }
        None
    }

    // ------------------------------------------------------------------------
    // Recursion guards
    // ------------------------------------------------------------------------

    /// Enters a named pattern for a value node while matching.
    ///
    /// Returns false when the same name is already active for the same node.
    pub fn enter_match(&mut self, name: &str, node: &Value) -> bool {
        let address = std::ptr::from_ref(node).addr();
        if self.match_stack.iter().any(|(active, at)| active == name && *at == address) {
            debug!(pattern = name, "cyclic reference on the same value node");
            return false;
        }
        self.match_stack.push((name.to_string(), address));
        true
    }

    /// Leaves the innermost match frame.
    pub fn exit_match(&mut self) {
        self.match_stack.pop();
    }

    /// Enters a named pattern for a piece of text while parsing.
    ///
    /// Returns false when the same name is already active for the same text.
    pub fn enter_parse(&mut self, name: &str, text: &str) -> bool {
        if self.parse_stack.iter().any(|(active, at)| active == name && at == text) {
            debug!(pattern = name, "cyclic reference on the same text");
            return false;
        }
        self.parse_stack.push((name.to_string(), text.to_string()));
        true
    }

    /// Leaves the innermost parse frame.
    pub fn exit_parse(&mut self) {
        self.parse_stack.pop();
    }

    /// Enters a named pattern while generating.
    ///
    /// Returns false when the name is already on the stack
    /// `max_recursion_depth` times; the caller must then emit the absent case.
    pub fn enter_generation(&mut self, name: &str) -> bool {
        let depth = self.generation_stack.iter().filter(|active| active.as_str() == name).count();
        if depth >= self.settings.max_recursion_depth {
            debug!(pattern = name, depth, "recursion cap reached while generating");
            return false;
        }
        self.generation_stack.push(name.to_string());
        true
    }

    /// Leaves the innermost generation frame.
    pub fn exit_generation(&mut self) {
        self.generation_stack.pop();
    }

    /// Clears every stack before a new top-level call.
    pub fn reset_stacks(&mut self) {
        self.generation_stack.clear();
        self.match_stack.clear();
        self.parse_stack.clear();
    }

    // ------------------------------------------------------------------------
    // Value strategies
    // ------------------------------------------------------------------------

    /// Returns boundary values for a primitive; empty unless generative.
    #[must_use]
    pub fn boundary_values(&self, primitive: &PrimitivePattern) -> Vec<BoundaryValue> {
        if !self.settings.generative {
            return Vec::new();
        }
        boundary_values(primitive, &self.settings.decimal_epsilon)
    }

    /// Returns wrong-typed values for a pattern; empty unless generative.
    #[must_use]
    pub fn negative_values(&self, pattern: &Pattern) -> Vec<Value> {
        if !self.settings.generative {
            return Vec::new();
        }
        match self.resolve_deep(pattern) {
            Some(resolved) => type_mismatches(&resolved),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_guard_counts_active_frames() {
        let mut resolver = Resolver::with_defaults(Arc::new(PatternRegistry::new()));
        assert!(resolver.enter_generation("Data"));
        assert!(!resolver.enter_generation("Data"));
        assert!(resolver.enter_generation("Other"));
        resolver.exit_generation();
        resolver.exit_generation();
        assert!(resolver.enter_generation("Data"));
    }

    #[test]
    fn match_guard_is_per_value_node() {
        let mut resolver = Resolver::with_defaults(Arc::new(PatternRegistry::new()));
        let outer = Value::integer(1);
        let inner = Value::integer(1);
        assert!(resolver.enter_match("Data", &outer));
        assert!(resolver.enter_match("Data", &inner));
        assert!(!resolver.enter_match("Data", &outer));
    }

    #[test]
    fn strategies_are_gated_on_generative_mode() {
        let registry = Arc::new(PatternRegistry::new());
        let quiet = Resolver::with_defaults(Arc::clone(&registry));
        assert!(quiet.negative_values(&Pattern::integer()).is_empty());
        let generative = Resolver::new(
            registry,
            ResolverSettings {
                generative: true,
                ..ResolverSettings::default()
            },
        );
        assert!(!generative.negative_values(&Pattern::integer()).is_empty());
    }
}
