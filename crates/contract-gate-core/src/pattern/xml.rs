// crates/contract-gate-core/src/pattern/xml.rs
// ============================================================================
// Module: Contract Gate XML Patterns
// Description: XML element patterns with attributes, occurrences, and wrapping.
// Purpose: Describe XML bodies in the same algebra as JSON bodies.
// Dependencies: indexmap, crate::pattern
// ============================================================================

//! ## Overview
//! An XML element pattern names its tag and optional namespace/prefix,
//! declares attribute patterns, and lists child patterns with an occurrence.
//! A wrapped element renders with its own tag. An unwrapped element is a
//! transparent array holder: its children are spliced into the parent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use indexmap::IndexMap;

use crate::pattern::Pattern;

// ============================================================================
// SECTION: XML Pattern Types
// ============================================================================

/// How often a child may occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurs {
    /// Exactly once.
    One,
    /// Zero or one time.
    Optional,
    /// Zero or more times.
    Multiple,
}

/// Attribute declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Pattern the attribute text must parse and match as.
    pub pattern: Pattern,
    /// Absent attributes pass when true.
    pub optional: bool,
}

/// Child declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlChild {
    /// Child pattern (element, reference, or primitive text content).
    pub pattern: Pattern,
    /// Occurrence.
    pub occurs: Occurs,
}

/// XML element pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElementPattern {
    /// Local tag name.
    pub name: String,
    /// Optional namespace URI.
    pub namespace: Option<String>,
    /// Optional namespace prefix.
    pub prefix: Option<String>,
    /// Attribute declarations.
    pub attributes: IndexMap<String, XmlAttribute>,
    /// Child declarations in order.
    pub children: Vec<XmlChild>,
    /// Own tag when true; spliced into the parent when false.
    pub wrapped: bool,
}

impl XmlElementPattern {
    /// Creates a wrapped element with no attributes or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            prefix: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
            wrapped: true,
        }
    }

    /// Sets namespace and prefix.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>, prefix: Option<&str>) -> Self {
        self.namespace = Some(namespace.into());
        self.prefix = prefix.map(str::to_string);
        self
    }

    /// Declares an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, pattern: Pattern, optional: bool) -> Self {
        self.attributes.insert(
            name.into(),
            XmlAttribute {
                pattern,
                optional,
            },
        );
        self
    }

    /// Declares a child.
    #[must_use]
    pub fn with_child(mut self, pattern: Pattern, occurs: Occurs) -> Self {
        self.children.push(XmlChild {
            pattern,
            occurs,
        });
        self
    }

    /// Marks the element as a transparent (unwrapped) array holder.
    #[must_use]
    pub fn unwrapped(mut self) -> Self {
        self.wrapped = false;
        self
    }
}
