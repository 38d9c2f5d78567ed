// crates/contract-gate-core/src/result.rs
// ============================================================================
// Module: Contract Gate Match Results
// Description: Breadcrumb-tracked success/failure trees and report rendering.
// Purpose: Localize every mismatch and keep each rejected union branch visible.
// Dependencies: none
// ============================================================================

//! ## Overview
//! A match returns [`MatchResult`]. Failures carry the breadcrumb path from
//! the point where they were attached down to the mismatch, a message, and
//! nested causes. Two shapes of cause exist:
//! - an aggregate (empty message) groups independent failures, such as
//!   several bad list elements;
//! - a union failure keeps one cause per rejected alternative.
//!
//! Breadcrumbs are prepended while the matcher unwinds, so the innermost
//! segment is attached first and the outermost last.

// ============================================================================
// SECTION: Match Result
// ============================================================================

/// Outcome of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// Value conforms to the pattern.
    Success,
    /// Value does not conform.
    Failure(Failure),
}

impl MatchResult {
    /// Builds a failure result with a message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(Failure::new(message))
    }

    /// Returns true on success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the failure, if any.
    #[must_use]
    pub const fn as_failure(&self) -> Option<&Failure> {
        match self {
            Self::Success => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// Prepends a breadcrumb segment to a failure; success passes through.
    #[must_use]
    pub fn breadcrumb(self, segment: impl Into<String>) -> Self {
        match self {
            Self::Success => Self::Success,
            Self::Failure(failure) => Self::Failure(failure.breadcrumb(segment)),
        }
    }

    /// Combines independent results.
    ///
    /// No failures yield success, a single failure is returned as is, and
    /// several failures are grouped under an aggregate.
    #[must_use]
    pub fn combine(results: impl IntoIterator<Item = Self>) -> Self {
        let mut failures: Vec<Failure> = results
            .into_iter()
            .filter_map(|result| match result {
                Self::Success => None,
                Self::Failure(failure) => Some(failure),
            })
            .collect();
        match failures.len() {
            0 => Self::Success,
            1 => failures.pop().map_or(Self::Success, Self::Failure),
            _ => Self::Failure(Failure::aggregate(failures)),
        }
    }

    /// Renders the result as an indented breadcrumb report.
    #[must_use]
    pub fn report_string(&self) -> String {
        match self {
            Self::Success => String::new(),
            Self::Failure(failure) => failure.report_string(),
        }
    }
}

// ============================================================================
// SECTION: Failure
// ============================================================================

/// Failure node.
///
/// # Invariants
/// - An empty `message` marks an aggregate whose causes are independent failures.
/// - A non-empty `message` with causes marks a union whose causes are the rejected alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Path segments from the attachment point down to the mismatch.
    pub breadcrumbs: Vec<String>,
    /// Human-readable mismatch description.
    pub message: String,
    /// Nested failures.
    pub causes: Vec<Failure>,
}

impl Failure {
    /// Creates a leaf failure.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            breadcrumbs: Vec::new(),
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Creates a failure explained by the rejected alternatives.
    #[must_use]
    pub fn with_causes(message: impl Into<String>, causes: Vec<Self>) -> Self {
        Self {
            breadcrumbs: Vec::new(),
            message: message.into(),
            causes,
        }
    }

    /// Groups independent failures.
    #[must_use]
    pub const fn aggregate(causes: Vec<Self>) -> Self {
        Self {
            breadcrumbs: Vec::new(),
            message: String::new(),
            causes,
        }
    }

    /// Returns true when this node only groups independent failures.
    #[must_use]
    pub const fn is_aggregate(&self) -> bool {
        self.message.is_empty()
    }

    /// Prepends a breadcrumb segment.
    #[must_use]
    pub fn breadcrumb(mut self, segment: impl Into<String>) -> Self {
        self.breadcrumbs.insert(0, segment.into());
        self
    }

    /// Renders this node's own breadcrumbs as a path.
    #[must_use]
    pub fn path(&self) -> String {
        join_path(&self.breadcrumbs)
    }

    /// Returns the full path of every reported mismatch, descending through aggregates.
    #[must_use]
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_leaf_paths(&[], &mut paths);
        paths
    }

    /// Appends leaf paths under `prefix`.
    fn collect_leaf_paths(&self, prefix: &[String], paths: &mut Vec<String>) {
        let full = concat(prefix, &self.breadcrumbs);
        if self.is_aggregate() {
            for cause in &self.causes {
                cause.collect_leaf_paths(&full, paths);
            }
        } else {
            paths.push(join_path(&full));
        }
    }

    /// Renders the failure as an indented breadcrumb report.
    #[must_use]
    pub fn report_string(&self) -> String {
        let mut lines = Vec::new();
        self.render(&[], "", &mut lines);
        lines.join("\n")
    }

    /// Appends report lines under `prefix`, indented by `indent`.
    fn render(&self, prefix: &[String], indent: &str, lines: &mut Vec<String>) {
        let full = concat(prefix, &self.breadcrumbs);
        if self.is_aggregate() {
            for (index, cause) in self.causes.iter().enumerate() {
                if index > 0 {
                    lines.push(String::new());
                }
                cause.render(&full, indent, lines);
            }
            return;
        }
        let path = join_path(&full);
        if !path.is_empty() {
            lines.push(format!("{indent}>> {path}"));
        }
        lines.push(format!("{indent}   {}", self.message));
        let nested = format!("{indent}      ");
        for (index, cause) in self.causes.iter().enumerate() {
            lines.push(String::new());
            lines.push(format!("{indent}   Alternative {}:", index + 1));
            cause.render(&full, &nested, lines);
        }
    }
}

// ============================================================================
// SECTION: Path Helpers
// ============================================================================

/// Joins segments with `.`, attaching index segments (`[i]`) directly.
fn join_path(segments: &[String]) -> String {
    let mut path = String::new();
    for segment in segments {
        if !path.is_empty() && !segment.starts_with('[') {
            path.push('.');
        }
        path.push_str(segment);
    }
    path
}

/// Concatenates two segment lists.
fn concat(prefix: &[String], segments: &[String]) -> Vec<String> {
    prefix.iter().chain(segments).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_segments_attach_without_dot() {
        let result = MatchResult::failure("Expected key named \"name\" was missing")
            .breadcrumb("name")
            .breadcrumb("[1]")
            .breadcrumb("BODY")
            .breadcrumb("REQUEST");
        assert_eq!(
            result.report_string(),
            ">> REQUEST.BODY[1].name\n   Expected key named \"name\" was missing"
        );
    }

    #[test]
    fn combine_single_failure_is_not_wrapped() {
        let combined = MatchResult::combine([
            MatchResult::Success,
            MatchResult::failure("bad").breadcrumb("[1]"),
        ]);
        let failure = combined.as_failure().map(Failure::path);
        assert_eq!(failure.as_deref(), Some("[1]"));
    }

    #[test]
    fn aggregate_leaf_paths_carry_prefix() {
        let combined = MatchResult::combine([
            MatchResult::failure("a").breadcrumb("x"),
            MatchResult::failure("b").breadcrumb("y"),
        ])
        .breadcrumb("BODY");
        let paths = combined.as_failure().map(Failure::leaf_paths).unwrap_or_default();
        assert_eq!(paths, vec!["BODY.x".to_string(), "BODY.y".to_string()]);
    }
}
