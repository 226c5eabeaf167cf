//! Lazy views over the source stack.
//!
//! A [`View`] is a pure path descriptor: building one never touches
//! data. Resolution happens on demand, walking every source in priority
//! order and collecting the values whose trees contain the path. All
//! read accessors live here; mutation goes through
//! [`RootConfig`](crate::RootConfig) directly.

use std::collections::HashSet;
use std::path::PathBuf;

use stratum_value::ValueNode;

use crate::error::{ConfigError, Result};
use crate::path::{Step, ViewPath};
use crate::root::RootConfig;
use crate::source::Source;
use crate::template::{self, Template};

/// One source's value for a resolved path.
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    value: &'a ValueNode,
    source: &'a Source,
}

impl<'a> Match<'a> {
    pub(crate) fn new(value: &'a ValueNode, source: &'a Source) -> Self {
        Match { value, source }
    }

    /// The value found in this source.
    pub fn value(&self) -> &'a ValueNode {
        self.value
    }

    /// The source the value came from.
    pub fn source(&self) -> &'a Source {
        self.source
    }
}

/// All per-source values for one path, best match first.
///
/// Produced transiently by [`View::resolve`]; an empty stack means no
/// source defines the path.
#[derive(Debug, Clone, Default)]
pub struct MatchStack<'a> {
    matches: Vec<Match<'a>>,
}

impl<'a> MatchStack<'a> {
    pub(crate) fn new(matches: Vec<Match<'a>>) -> Self {
        MatchStack { matches }
    }

    /// The highest-priority match, if any source defines the path.
    pub fn first(&self) -> Option<Match<'a>> {
        self.matches.first().copied()
    }

    /// Whether no source defines the path.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Number of sources that define the path.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Matches in priority order, best first.
    pub fn iter(&self) -> impl Iterator<Item = Match<'a>> + '_ {
        self.matches.iter().copied()
    }
}

impl<'a> IntoIterator for MatchStack<'a> {
    type Item = Match<'a>;
    type IntoIter = std::vec::IntoIter<Match<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

/// Walk a path through one source tree. Returns `None` as soon as a
/// step does not apply; walking never fails.
pub(crate) fn walk<'a>(tree: &'a ValueNode, steps: &[Step]) -> Option<&'a ValueNode> {
    let mut current = tree;
    for step in steps {
        current = match (current, step) {
            (ValueNode::Map(entries), Step::Key(key)) => entries.get(key)?,
            (ValueNode::Seq(items), Step::Index(index)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// A lazy pointer into the layered configuration.
///
/// Views are cheap to create and hold no data; `config.view().key("a")`
/// is valid even when no source defines `a`. Errors surface when a
/// value is actually requested, naming the full dotted path.
#[derive(Debug, Clone)]
pub struct View<'a> {
    root: &'a RootConfig,
    path: ViewPath,
}

impl<'a> View<'a> {
    pub(crate) fn new(root: &'a RootConfig, path: ViewPath) -> Self {
        View { root, path }
    }

    /// The configuration this view reads from.
    pub fn root(&self) -> &'a RootConfig {
        self.root
    }

    /// This view's location in the hierarchy.
    pub fn path(&self) -> &ViewPath {
        &self.path
    }

    /// The dotted rendering of the path (`servers#0.port`, or `root`).
    pub fn name(&self) -> String {
        self.path.to_string()
    }

    /// The subview under the mapping key `key`.
    pub fn key(&self, key: impl Into<String>) -> View<'a> {
        View::new(self.root, self.path.child(key.into()))
    }

    /// The subview at sequence position `index`.
    pub fn index(&self, index: usize) -> View<'a> {
        View::new(self.root, self.path.child(index))
    }

    /// The subview reached by following a dotted key string.
    pub fn at(&self, dotted: &str) -> View<'a> {
        let mut path = self.path.clone();
        for step in ViewPath::from_dotted(dotted).steps() {
            path = path.child(step.clone());
        }
        View::new(self.root, path)
    }

    /// Find this path in every source, best match first.
    pub fn resolve(&self) -> MatchStack<'a> {
        self.root.resolve(&self.path)
    }

    /// The highest-priority match for this path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] when no source defines the
    /// path.
    pub fn first(&self) -> Result<Match<'a>> {
        self.resolve()
            .into_iter()
            .next()
            .ok_or_else(|| ConfigError::not_found(self.name()))
    }

    /// Whether any source defines this path.
    pub fn exists(&self) -> bool {
        !self.resolve().is_empty()
    }

    /// The raw highest-priority value, unvalidated.
    pub fn get_raw(&self) -> Result<&'a ValueNode> {
        Ok(self.first()?.value())
    }

    /// Validate and convert this view's value against a template.
    pub fn get(&self, template: &Template) -> Result<ValueNode> {
        template::validate(template, self, None)
    }

    /// Whether dumps replace this view's value with a tombstone.
    pub fn is_redacted(&self) -> bool {
        self.root.is_redacted(&self.path)
    }

    /// All distinct mapping keys across every source defining this
    /// path, in first-seen priority order.
    ///
    /// # Errors
    ///
    /// Returns a type error if any source holds a non-mapping,
    /// non-null value here.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut seen = HashSet::new();
        for m in self.resolve().iter() {
            match m.value() {
                ValueNode::Map(entries) => {
                    for key in entries.keys() {
                        if seen.insert(key.clone()) {
                            keys.push(key.clone());
                        }
                    }
                }
                // An explicit null reads as an empty mapping.
                ValueNode::Null => {}
                other => {
                    return Err(ConfigError::type_error(
                        self.name(),
                        "a dict",
                        other.type_name(),
                    ));
                }
            }
        }
        Ok(keys)
    }

    /// Subviews for the elements of the highest-priority sequence at
    /// this path. Sequences are never merged across sources; an absent
    /// path yields an empty list.
    pub fn sequence(&self) -> Result<Vec<View<'a>>> {
        let Some(m) = self.resolve().first() else {
            return Ok(Vec::new());
        };
        match m.value() {
            ValueNode::Seq(items) => Ok((0..items.len()).map(|i| self.index(i)).collect()),
            other => Err(ConfigError::type_error(
                self.name(),
                "a list",
                other.type_name(),
            )),
        }
    }

    /// `(key, subview)` pairs for every key visible at this path.
    pub fn items(&self) -> Result<Vec<(String, View<'a>)>> {
        Ok(self
            .keys()?
            .into_iter()
            .map(|key| (key.clone(), self.key(key)))
            .collect())
    }

    /// Child views of whatever collection resolves here: keyed children
    /// for a mapping, indexed children for a sequence, empty when the
    /// path is absent.
    pub fn children(&self) -> Result<Vec<View<'a>>> {
        let Some(m) = self.resolve().first() else {
            return Ok(Vec::new());
        };
        match m.value() {
            ValueNode::Map(_) | ValueNode::Null => {
                Ok(self.keys()?.into_iter().map(|key| self.key(key)).collect())
            }
            ValueNode::Seq(_) => self.sequence(),
            other => Err(ConfigError::type_error(
                self.name(),
                "a dictionary or a list",
                other.type_name(),
            )),
        }
    }

    // Typed shortcuts. Each is sugar for `get` with the matching
    // template.

    /// The value as a string.
    pub fn as_str(&self) -> Result<String> {
        template::coerce_str(self.first()?.value(), &self.name())
    }

    /// The value as an integer. Numeric strings parse; floats truncate.
    pub fn as_i64(&self) -> Result<i64> {
        template::coerce_int(self.first()?.value(), &self.name())
    }

    /// The value as a float. Integers widen; numeric strings parse.
    pub fn as_f64(&self) -> Result<f64> {
        template::coerce_float(self.first()?.value(), &self.name())
    }

    /// The value as a boolean. No coercion from other types.
    pub fn as_bool(&self) -> Result<bool> {
        match self.first()?.value() {
            ValueNode::Bool(b) => Ok(*b),
            other => Err(ConfigError::type_error(
                self.name(),
                "a boolean",
                other.type_name(),
            )),
        }
    }

    /// The value as an absolute path, resolved against the bases the
    /// default [`Template::filename`] would use.
    pub fn as_filename(&self) -> Result<PathBuf> {
        self.get(&Template::filename())
            .map(|node| PathBuf::from(node.as_str().unwrap_or_default()))
    }

    /// Alias for [`View::as_filename`] for callers thinking in paths.
    pub fn as_path(&self) -> Result<PathBuf> {
        self.as_filename()
    }

    /// The value as one of a fixed set of choices.
    pub fn as_choice(&self, choices: &[&str]) -> Result<String> {
        let template = Template::choice(choices.iter().map(|c| c.to_string()));
        template::coerce_str(&self.get(&template)?, &self.name())
    }

    /// The value as a list of strings: either a sequence of strings or
    /// a single whitespace-delimited string.
    pub fn as_str_seq(&self) -> Result<Vec<String>> {
        match self.get(&Template::str_seq())? {
            ValueNode::Seq(items) => items
                .into_iter()
                .map(|item| match item {
                    ValueNode::Str(s) => Ok(s),
                    other => Err(ConfigError::type_error(
                        self.name(),
                        "a list of strings",
                        other.type_name(),
                    )),
                })
                .collect(),
            other => Err(ConfigError::type_error(
                self.name(),
                "a list of strings",
                other.type_name(),
            )),
        }
    }

    /// The value as an ordered list of `(key, value)` string pairs,
    /// accepting both two-element lists and single-key mappings as
    /// elements.
    pub fn as_pairs(&self) -> Result<Vec<(String, String)>> {
        template::pairs(self, None)
    }
}

impl PartialEq for View<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.root, other.root) && self.path == other.path
    }
}
