// crates/contract-gate-core/src/pattern/mod.rs
// ============================================================================
// Module: Contract Gate Pattern Algebra
// Description: Closed set of structural schema variants.
// Purpose: Represent every contract schema as an immutable pattern tree.
// Dependencies: crate::{error, value}
// ============================================================================

//! ## Overview
//! [`Pattern`] is a closed sum type; matching and generation handle every
//! variant exhaustively. Named schemas and self-referential schemas are
//! expressed through [`Pattern::Ref`], which is only ever followed through a
//! [`crate::Resolver`]. Pattern trees are built once per contract load and
//! are never mutated afterwards; variant builders return new trees.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod object;
pub mod primitive;
pub mod union;
pub mod xml;

// ============================================================================
// SECTION: Imports
// ============================================================================

pub use object::AdditionalProperties;
pub use object::ObjectPattern;
pub use primitive::Bound;
pub use primitive::NumberConstraints;
pub use primitive::NumberKind;
pub use primitive::PrimitivePattern;
pub use primitive::RegexConstraint;
pub use primitive::StringConstraints;
pub use primitive::StringFormat;
pub use union::AnyOfPattern;
pub use union::Discriminator;
pub use xml::Occurs;
pub use xml::XmlAttribute;
pub use xml::XmlChild;
pub use xml::XmlElementPattern;

use crate::error::SchemaError;
use crate::value::Value;

// ============================================================================
// SECTION: Pattern
// ============================================================================

/// Structural schema node.
///
/// # Invariants
/// - Immutable after contract load.
/// - `Ref` names must resolve in the registry they are used with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Matches exactly one literal value.
    Exact(Value),
    /// String, number, or boolean with constraints.
    Primitive(PrimitivePattern),
    /// Homogeneous list.
    ListOf(ListPattern),
    /// Keyed object.
    Object(ObjectPattern),
    /// Ordered union (oneOf/anyOf/nullable).
    AnyOf(AnyOfPattern),
    /// Deferred reference to a registered pattern.
    Ref(String),
    /// One of a fixed set of literals.
    Enum(Vec<Value>),
    /// XML element.
    Xml(XmlElementPattern),
    /// Absent body.
    NoBody,
    /// `null` only.
    Null,
}

/// List pattern with optional item-count bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPattern {
    /// Element pattern.
    pub item: Box<Pattern>,
    /// Minimum number of elements.
    pub min_items: Option<usize>,
    /// Maximum number of elements.
    pub max_items: Option<usize>,
}

impl Pattern {
    /// Unconstrained string.
    #[must_use]
    pub fn string() -> Self {
        Self::Primitive(PrimitivePattern::String(StringConstraints::default()))
    }

    /// String with constraints.
    #[must_use]
    pub const fn string_with(constraints: StringConstraints) -> Self {
        Self::Primitive(PrimitivePattern::String(constraints))
    }

    /// Unconstrained integer.
    #[must_use]
    pub const fn integer() -> Self {
        Self::Primitive(PrimitivePattern::Number(NumberConstraints::new(NumberKind::Integer)))
    }

    /// Unconstrained decimal number.
    #[must_use]
    pub const fn number() -> Self {
        Self::Primitive(PrimitivePattern::Number(NumberConstraints::new(NumberKind::Decimal)))
    }

    /// Number with constraints.
    #[must_use]
    pub const fn number_with(constraints: NumberConstraints) -> Self {
        Self::Primitive(PrimitivePattern::Number(constraints))
    }

    /// Number of the given kind bounded by optional minimum and maximum.
    #[must_use]
    pub fn bounded(kind: NumberKind, minimum: Option<Bound>, maximum: Option<Bound>) -> Self {
        Self::number_with(NumberConstraints {
            kind,
            minimum,
            maximum,
        })
    }

    /// Boolean.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::Primitive(PrimitivePattern::Boolean)
    }

    /// Exact literal.
    #[must_use]
    pub const fn exact(value: Value) -> Self {
        Self::Exact(value)
    }

    /// Reference to a registered pattern.
    #[must_use]
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Ref(name.into())
    }

    /// Unbounded list of `item`.
    #[must_use]
    pub fn list_of(item: Self) -> Self {
        Self::ListOf(ListPattern {
            item: Box::new(item),
            min_items: None,
            max_items: None,
        })
    }

    /// List built from an optional `items` schema, as declared in a contract.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ArrayWithoutItems`] when `items` is absent.
    pub fn array(schema: &str, items: Option<Self>) -> Result<Self, SchemaError> {
        items.map(Self::list_of).ok_or_else(|| SchemaError::ArrayWithoutItems {
            schema: schema.to_string(),
        })
    }

    /// Object from `key` / `key?` notation.
    #[must_use]
    pub fn object<K, I>(entries: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Object(ObjectPattern::from_keys(entries))
    }

    /// Undiscriminated union.
    #[must_use]
    pub const fn any_of(members: Vec<Self>) -> Self {
        Self::AnyOf(AnyOfPattern::new(members))
    }

    /// `pattern` or `null`.
    #[must_use]
    pub fn nullable(pattern: Self) -> Self {
        Self::any_of(vec![pattern, Self::Null])
    }

    /// One of the given literals.
    #[must_use]
    pub const fn enum_of(values: Vec<Value>) -> Self {
        Self::Enum(values)
    }

    /// Returns a short description used in failure messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Exact(value) => value.to_string(),
            Self::Primitive(primitive) => primitive.describe(),
            Self::ListOf(list) => format!("list of {}", list.item.describe()),
            Self::Object(_) => "object".to_string(),
            Self::AnyOf(union) => {
                let members: Vec<String> = union.members.iter().map(Self::describe).collect();
                format!("one of ({})", members.join(", "))
            }
            Self::Ref(name) => format!("({name})"),
            Self::Enum(values) => {
                let values: Vec<String> = values.iter().map(ToString::to_string).collect();
                format!("one of [{}]", values.join(", "))
            }
            Self::Xml(element) => format!("<{}>", element.name),
            Self::NoBody => "no body".to_string(),
            Self::Null => "null".to_string(),
        }
    }

    /// Returns true when the pattern accepts `null` without resolving references.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Null => true,
            Self::AnyOf(union) => union.is_nullable(),
            Self::Enum(values) => values.contains(&Value::Null),
            Self::Exact(value) => *value == Value::Null,
            _ => false,
        }
    }

    /// Returns the numeric constraints when this is a number primitive.
    #[must_use]
    pub const fn number_constraints(&self) -> Option<&NumberConstraints> {
        match self {
            Self::Primitive(PrimitivePattern::Number(constraints)) => Some(constraints),
            _ => None,
        }
    }

    /// Visits this pattern and every nested pattern (references are not followed).
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Self)) {
        visit(self);
        match self {
            Self::ListOf(list) => list.item.walk(visit),
            Self::Object(object) => {
                for pattern in object.properties().values() {
                    pattern.walk(visit);
                }
                if let AdditionalProperties::PatternConstrained(pattern) = object.additional() {
                    pattern.walk(visit);
                }
            }
            Self::AnyOf(union) => {
                for member in &union.members {
                    member.walk(visit);
                }
            }
            Self::Xml(element) => {
                for attribute in element.attributes.values() {
                    attribute.pattern.walk(visit);
                }
                for child in &element.children {
                    child.pattern.walk(visit);
                }
            }
            Self::Exact(_)
            | Self::Primitive(_)
            | Self::Ref(_)
            | Self::Enum(_)
            | Self::NoBody
            | Self::Null => {}
        }
    }
}

impl From<PrimitivePattern> for Pattern {
    fn from(primitive: PrimitivePattern) -> Self {
        Self::Primitive(primitive)
    }
}

impl From<ObjectPattern> for Pattern {
    fn from(object: ObjectPattern) -> Self {
        Self::Object(object)
    }
}

impl From<XmlElementPattern> for Pattern {
    fn from(element: XmlElementPattern) -> Self {
        Self::Xml(element)
    }
}
