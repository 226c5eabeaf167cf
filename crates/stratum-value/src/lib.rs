//! # stratum-value
//!
//! The universal in-memory representation of parsed configuration data:
//! nested insertion-ordered maps, sequences, scalars, and null.
//!
//! Every configuration source (YAML file, environment scan, command-line
//! namespace, programmatic overlay) is adapted into a [`ValueNode`] tree
//! before it enters the source stack. The tree is treated as read-only
//! after construction: overrides are expressed by pushing new trees, never
//! by mutating one in place.
//!
//! Mapping keys are unique within a node and preserve insertion order,
//! which matters both for round-tripping and for single-key-mapping-list
//! idioms (`- key: value` pair lists).

use indexmap::IndexMap;

/// A node in a configuration value tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    /// An explicit null value. Distinct from absence: a source can
    /// contribute `null` for a path, which templates treat differently
    /// from the path not resolving at all.
    Null,

    /// A boolean scalar.
    Bool(bool),

    /// An integer scalar.
    Int(i64),

    /// A floating-point scalar.
    Float(f64),

    /// A string scalar.
    Str(String),

    /// An ordered sequence.
    Seq(Vec<ValueNode>),

    /// A mapping with string keys, insertion order preserved.
    Map(IndexMap<String, ValueNode>),
}

impl ValueNode {
    /// Create an empty mapping node.
    pub fn empty_map() -> Self {
        ValueNode::Map(IndexMap::new())
    }

    /// Create an empty sequence node.
    pub fn empty_seq() -> Self {
        ValueNode::Seq(Vec::new())
    }

    /// A short human-readable name for this node's type, used in error
    /// messages ("must be a number, not string").
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueNode::Null => "null",
            ValueNode::Bool(_) => "bool",
            ValueNode::Int(_) => "int",
            ValueNode::Float(_) => "float",
            ValueNode::Str(_) => "str",
            ValueNode::Seq(_) => "list",
            ValueNode::Map(_) => "dict",
        }
    }

    /// Check if this is the null node.
    pub fn is_null(&self) -> bool {
        matches!(self, ValueNode::Null)
    }

    /// Check if this is a mapping node.
    pub fn is_map(&self) -> bool {
        matches!(self, ValueNode::Map(_))
    }

    /// Check if this is a sequence node.
    pub fn is_seq(&self) -> bool {
        matches!(self, ValueNode::Seq(_))
    }

    /// Check if this is a scalar (including null).
    pub fn is_scalar(&self) -> bool {
        !self.is_map() && !self.is_seq()
    }

    /// Get as a bool if this is a boolean scalar.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ValueNode::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as an i64 if this is an integer scalar.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ValueNode::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as an f64 if this is an integer or float scalar.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ValueNode::Int(i) => Some(*i as f64),
            ValueNode::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as a string slice if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ValueNode::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the sequence items if this is a sequence.
    pub fn as_seq(&self) -> Option<&[ValueNode]> {
        match self {
            ValueNode::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Get the map entries if this is a mapping.
    pub fn as_map(&self) -> Option<&IndexMap<String, ValueNode>> {
        match self {
            ValueNode::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Render a scalar the way it would appear in an error message.
    /// Strings are quoted; collections fall back to their type name.
    pub fn display_for_error(&self) -> String {
        match self {
            ValueNode::Null => "null".to_string(),
            ValueNode::Bool(b) => b.to_string(),
            ValueNode::Int(i) => i.to_string(),
            ValueNode::Float(f) => f.to_string(),
            ValueNode::Str(s) => format!("'{}'", s),
            ValueNode::Seq(_) => "a list".to_string(),
            ValueNode::Map(_) => "a dict".to_string(),
        }
    }
}

impl From<bool> for ValueNode {
    fn from(v: bool) -> Self {
        ValueNode::Bool(v)
    }
}

impl From<i64> for ValueNode {
    fn from(v: i64) -> Self {
        ValueNode::Int(v)
    }
}

impl From<i32> for ValueNode {
    fn from(v: i32) -> Self {
        ValueNode::Int(v as i64)
    }
}

impl From<f64> for ValueNode {
    fn from(v: f64) -> Self {
        ValueNode::Float(v)
    }
}

impl From<&str> for ValueNode {
    fn from(v: &str) -> Self {
        ValueNode::Str(v.to_string())
    }
}

impl From<String> for ValueNode {
    fn from(v: String) -> Self {
        ValueNode::Str(v)
    }
}

impl From<Vec<ValueNode>> for ValueNode {
    fn from(v: Vec<ValueNode>) -> Self {
        ValueNode::Seq(v)
    }
}

impl From<IndexMap<String, ValueNode>> for ValueNode {
    fn from(v: IndexMap<String, ValueNode>) -> Self {
        ValueNode::Map(v)
    }
}

impl<V: Into<ValueNode>> FromIterator<(String, V)> for ValueNode {
    fn from_iter<T: IntoIterator<Item = (String, V)>>(iter: T) -> Self {
        ValueNode::Map(
            iter.into_iter()
                .map(|(k, v)| (k, v.into()))
                .collect(),
        )
    }
}
