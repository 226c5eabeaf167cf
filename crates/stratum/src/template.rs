//! Declarative templates: validation and conversion of resolved values.
//!
//! A [`Template`] is an explicit tagged variant describing what a view's
//! value must look like and how to convert it. Validation receives the
//! view (not just the top value), so structural templates can resolve
//! per-key across sources and filename templates can consult the source
//! that provided the value.
//!
//! Failures are precise: every error names the fully-qualified dotted
//! path of the leaf that failed, even when validation started from a
//! whole-schema `get` at the root.

use std::collections::HashSet;
use std::path::PathBuf;

use indexmap::IndexMap;
use regex::Regex;
use stratum_value::ValueNode;

use crate::error::{ConfigError, Result};
use crate::paths;
use crate::root::RootConfig;
use crate::source::Source;
use crate::view::View;

/// Options for string validation.
#[derive(Debug, Clone, Default)]
pub struct StrOptions {
    /// Value to use when the view is absent.
    pub default: Option<String>,
    /// Pattern the value must match (unanchored search).
    pub pattern: Option<Regex>,
}

/// Options for filename resolution.
#[derive(Debug, Clone, Default)]
pub struct FilenameOptions {
    /// Path to use when the view is absent, resolved like a found
    /// value would be.
    pub default: Option<String>,
    /// Resolve relative values against this directory, overriding
    /// every other base.
    pub cwd: Option<PathBuf>,
    /// Resolve relative values against the application's configuration
    /// directory.
    pub in_app_dir: bool,
    /// Resolve relative values against another field of the same
    /// schema, which must itself validate as a filename.
    pub relative_to: Option<String>,
    /// Resolve relative values against the directory of the source
    /// file that provided the value.
    pub in_source_dir: bool,
}

/// What a configuration value must be.
///
/// Built through the constructor functions; validated against a view
/// with [`View::get`](crate::View::get).
#[derive(Debug, Clone)]
pub enum Template {
    /// Any value at all; absence is still an error.
    Any,
    /// A string, optionally defaulted and pattern-checked.
    Str(StrOptions),
    /// An integer. Floats truncate and numeric strings parse; booleans
    /// never coerce.
    Int {
        /// Value to use when the view is absent.
        default: Option<i64>,
    },
    /// A float. Integers widen and numeric strings parse.
    Float {
        /// Value to use when the view is absent.
        default: Option<f64>,
    },
    /// A boolean, exactly; no coercion from other types.
    Bool {
        /// Value to use when the view is absent.
        default: Option<bool>,
    },
    /// Any numeric value, kept as whichever of int/float it already is.
    Number,
    /// A value of the same kind as the literal, with the literal as
    /// the default when the view is absent.
    Literal(ValueNode),
    /// One of an enumerated set of literal values.
    Choice(Vec<ValueNode>),
    /// A key of an enumerated mapping; validates to the mapped value.
    ChoiceMap(IndexMap<String, ValueNode>),
    /// A list of strings. With `split`, a single string is broken on
    /// whitespace; without, it becomes a one-element list.
    StrSeq {
        /// Whether bare strings split on whitespace.
        split: bool,
    },
    /// A list of `(key, value)` string pairs written as two-element
    /// lists or single-key mappings. With a default value, a bare
    /// string element reads as `(string, default)`.
    Pairs {
        /// Value paired with bare string elements.
        default_value: Option<String>,
    },
    /// A fixed set of named fields, each with its own template. Fields
    /// resolve independently as child views, so sibling keys may come
    /// from different sources.
    Schema(IndexMap<String, Template>),
    /// A uniform sequence. Only the highest-priority sequence value is
    /// used; sequences are never merged across sources.
    Sequence(Box<Template>),
    /// A uniform mapping over unknown keys, merged per key across all
    /// sources.
    MappingValues(Box<Template>),
    /// An optionally-present value.
    Optional {
        /// Template for the value when present and non-null.
        inner: Box<Template>,
        /// Value for absent or null views; falls back to `inner`'s own
        /// default, then to null.
        default: Option<ValueNode>,
        /// When false, a fully absent view is an error (an explicit
        /// null is still accepted).
        allow_missing: bool,
    },
    /// A string resolved to an absolute filesystem path.
    Filename(FilenameOptions),
}

impl Template {
    /// Accept any present value.
    pub fn any() -> Self {
        Template::Any
    }

    /// Require a string.
    pub fn string() -> Self {
        Template::Str(StrOptions::default())
    }

    /// Require a string, defaulting when absent.
    pub fn string_default(default: impl Into<String>) -> Self {
        Template::Str(StrOptions {
            default: Some(default.into()),
            pattern: None,
        })
    }

    /// Require a string matching `pattern` (unanchored).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TemplateMisuse`] if the pattern is not a
    /// valid regular expression.
    pub fn string_matching(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|err| {
            ConfigError::template_misuse(format!("invalid pattern: {err}"))
        })?;
        Ok(Template::Str(StrOptions {
            default: None,
            pattern: Some(pattern),
        }))
    }

    /// Require an integer.
    pub fn integer() -> Self {
        Template::Int { default: None }
    }

    /// Require an integer, defaulting when absent.
    pub fn integer_default(default: i64) -> Self {
        Template::Int {
            default: Some(default),
        }
    }

    /// Require a float.
    pub fn float() -> Self {
        Template::Float { default: None }
    }

    /// Require a float, defaulting when absent.
    pub fn float_default(default: f64) -> Self {
        Template::Float {
            default: Some(default),
        }
    }

    /// Require a boolean.
    pub fn boolean() -> Self {
        Template::Bool { default: None }
    }

    /// Require a boolean, defaulting when absent.
    pub fn boolean_default(default: bool) -> Self {
        Template::Bool {
            default: Some(default),
        }
    }

    /// Require any numeric value without forcing int or float.
    pub fn number() -> Self {
        Template::Number
    }

    /// Require a value of the literal's kind, with the literal as the
    /// default.
    pub fn literal(value: impl Into<ValueNode>) -> Self {
        Template::Literal(value.into())
    }

    /// Require one of a fixed set of literal values.
    pub fn choice<V, I>(choices: I) -> Self
    where
        V: Into<ValueNode>,
        I: IntoIterator<Item = V>,
    {
        Template::Choice(choices.into_iter().map(Into::into).collect())
    }

    /// Require a key of `mapping`; validate to the mapped value.
    pub fn choice_map(mapping: IndexMap<String, ValueNode>) -> Self {
        Template::ChoiceMap(mapping)
    }

    /// Require a list of strings or a whitespace-delimited string.
    pub fn str_seq() -> Self {
        Template::StrSeq { split: true }
    }

    /// Require a list of strings; a bare string stays whole.
    pub fn str_seq_unsplit() -> Self {
        Template::StrSeq { split: false }
    }

    /// Require a list of `(key, value)` pairs.
    pub fn pairs() -> Self {
        Template::Pairs {
            default_value: None,
        }
    }

    /// Require a list of `(key, value)` pairs, reading a bare string
    /// element as the key with `default_value` as its value.
    pub fn pairs_with_default(default_value: impl Into<String>) -> Self {
        Template::Pairs {
            default_value: Some(default_value.into()),
        }
    }

    /// A schema of named fields.
    pub fn schema<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Template)>,
    {
        Template::Schema(
            fields
                .into_iter()
                .map(|(name, template)| (name.into(), template))
                .collect(),
        )
    }

    /// A uniform sequence of `element` values.
    pub fn sequence(element: Template) -> Self {
        Template::Sequence(Box::new(element))
    }

    /// A uniform mapping of `value` values over unknown keys.
    pub fn mapping_values(value: Template) -> Self {
        Template::MappingValues(Box::new(value))
    }

    /// Accept absence or null, yielding `inner`'s default or null.
    pub fn optional(inner: Template) -> Self {
        Template::Optional {
            inner: Box::new(inner),
            default: None,
            allow_missing: true,
        }
    }

    /// Accept absence or null, yielding `default`.
    pub fn optional_or(inner: Template, default: impl Into<ValueNode>) -> Self {
        Template::Optional {
            inner: Box::new(inner),
            default: Some(default.into()),
            allow_missing: true,
        }
    }

    /// Accept an explicit null but treat full absence as an error.
    pub fn optional_strict(inner: Template) -> Self {
        Template::Optional {
            inner: Box::new(inner),
            default: None,
            allow_missing: false,
        }
    }

    /// Require a string, resolved to an absolute path with default
    /// base-directory rules.
    pub fn filename() -> Self {
        Template::Filename(FilenameOptions::default())
    }

    /// Require a string, resolved to an absolute path with explicit
    /// options.
    pub fn filename_with(options: FilenameOptions) -> Self {
        Template::Filename(options)
    }

    /// Alias for [`Template::filename`] for callers thinking in paths.
    pub fn path() -> Self {
        Template::filename()
    }
}

/// The schema surrounding the field currently being validated, needed
/// by `relative_to` filename resolution.
pub(crate) struct SchemaScope<'s, 'a> {
    fields: &'s IndexMap<String, Template>,
    parent: &'s View<'a>,
    current_field: &'s str,
}

/// Validate `view`'s value against `template`, producing the converted
/// value.
pub(crate) fn validate(
    template: &Template,
    view: &View<'_>,
    scope: Option<&SchemaScope<'_, '_>>,
) -> Result<ValueNode> {
    match template {
        Template::Any => Ok(view.first()?.value().clone()),

        Template::Str(opts) => match view.resolve().first() {
            Some(m) => {
                let value = coerce_str(m.value(), &view.name())?;
                if let Some(pattern) = &opts.pattern {
                    if !pattern.is_match(&value) {
                        return Err(ConfigError::value_error(
                            view.name(),
                            format!("must match the pattern {}", pattern.as_str()),
                        ));
                    }
                }
                Ok(ValueNode::Str(value))
            }
            None => match &opts.default {
                Some(default) => Ok(ValueNode::Str(default.clone())),
                None => Err(ConfigError::not_found(view.name())),
            },
        },

        Template::Int { default } => match view.resolve().first() {
            Some(m) => coerce_int(m.value(), &view.name()).map(ValueNode::Int),
            None => default
                .map(ValueNode::Int)
                .ok_or_else(|| ConfigError::not_found(view.name())),
        },

        Template::Float { default } => match view.resolve().first() {
            Some(m) => coerce_float(m.value(), &view.name()).map(ValueNode::Float),
            None => default
                .map(ValueNode::Float)
                .ok_or_else(|| ConfigError::not_found(view.name())),
        },

        Template::Bool { default } => match view.resolve().first() {
            Some(m) => match m.value() {
                ValueNode::Bool(b) => Ok(ValueNode::Bool(*b)),
                other => Err(ConfigError::type_error(
                    view.name(),
                    "a boolean",
                    other.type_name(),
                )),
            },
            None => default
                .map(ValueNode::Bool)
                .ok_or_else(|| ConfigError::not_found(view.name())),
        },

        Template::Number => match view.first()?.value() {
            value @ (ValueNode::Int(_) | ValueNode::Float(_)) => Ok(value.clone()),
            other => Err(ConfigError::type_error(
                view.name(),
                "a number",
                other.type_name(),
            )),
        },

        Template::Literal(literal) => match view.resolve().first() {
            Some(m) => validate_like_literal(literal, m.value(), &view.name()),
            None => Ok(literal.clone()),
        },

        Template::Choice(choices) => {
            let value = view.first()?.value();
            if choices.iter().any(|choice| choice == value) {
                return Ok(value.clone());
            }
            let listed = choices.iter().map(ValueNode::display_for_error).collect();
            Err(choice_error(&view.name(), listed, value))
        }

        Template::ChoiceMap(mapping) => {
            let value = view.first()?.value();
            if let Some(mapped) = value.as_str().and_then(|s| mapping.get(s)) {
                return Ok(mapped.clone());
            }
            let listed = mapping.keys().map(|key| format!("'{key}'")).collect();
            Err(choice_error(&view.name(), listed, value))
        }

        Template::StrSeq { split } => str_seq(view, *split),

        Template::Pairs { default_value } => Ok(ValueNode::Seq(
            pairs(view, default_value.as_deref())?
                .into_iter()
                .map(|(k, v)| ValueNode::Seq(vec![ValueNode::Str(k), ValueNode::Str(v)]))
                .collect(),
        )),

        Template::Schema(fields) => {
            let mut out = IndexMap::with_capacity(fields.len());
            for (name, sub) in fields {
                let child = view.key(name.as_str());
                let field_scope = SchemaScope {
                    fields,
                    parent: view,
                    current_field: name,
                };
                out.insert(name.clone(), validate(sub, &child, Some(&field_scope))?);
            }
            Ok(ValueNode::Map(out))
        }

        Template::Sequence(element) => {
            let stack = view.resolve();
            if stack.is_empty() {
                return Ok(ValueNode::empty_seq());
            }
            // Use the best match that actually is a sequence; lower
            // sequences are discarded whole, never merged.
            let length = stack
                .iter()
                .find_map(|m| m.value().as_seq().map(<[ValueNode]>::len));
            let Some(length) = length else {
                let first = stack
                    .first()
                    .map_or("null", |m| m.value().type_name());
                return Err(ConfigError::type_error(view.name(), "a list", first));
            };
            let mut out = Vec::with_capacity(length);
            for index in 0..length {
                out.push(validate(element, &view.index(index), None)?);
            }
            Ok(ValueNode::Seq(out))
        }

        Template::MappingValues(value_template) => {
            let stack = view.resolve();
            let mut keys = Vec::new();
            let mut seen = HashSet::new();
            let matches: Vec<_> = stack.iter().collect();
            // Union key order follows lowest to highest priority;
            // per-key values resolve normally, so the highest source
            // still wins each key.
            for m in matches.iter().rev() {
                if let ValueNode::Map(entries) = m.value() {
                    for key in entries.keys() {
                        if seen.insert(key.clone()) {
                            keys.push(key.clone());
                        }
                    }
                }
            }
            let mut out = IndexMap::with_capacity(keys.len());
            for key in keys {
                let value = validate(value_template, &view.key(key.as_str()), None)?;
                out.insert(key, value);
            }
            Ok(ValueNode::Map(out))
        }

        Template::Optional {
            inner,
            default,
            allow_missing,
        } => {
            let present = view.resolve().first();
            match present {
                None if !allow_missing => Err(ConfigError::not_found(view.name())),
                None => Ok(optional_fallback(inner, default)),
                Some(m) if m.value().is_null() => Ok(optional_fallback(inner, default)),
                Some(_) => validate(inner, view, scope),
            }
        }

        Template::Filename(opts) => filename(opts, view, scope),
    }
}

fn optional_fallback(inner: &Template, default: &Option<ValueNode>) -> ValueNode {
    default
        .clone()
        .or_else(|| intrinsic_default(inner))
        .unwrap_or(ValueNode::Null)
}

/// The default a template would produce on its own for an absent view,
/// if it has one.
fn intrinsic_default(template: &Template) -> Option<ValueNode> {
    match template {
        Template::Str(opts) => opts.default.clone().map(ValueNode::Str),
        Template::Int { default } => default.map(ValueNode::Int),
        Template::Float { default } => default.map(ValueNode::Float),
        Template::Bool { default } => default.map(ValueNode::Bool),
        Template::Literal(value) => Some(value.clone()),
        Template::Filename(opts) => opts.default.clone().map(ValueNode::Str),
        _ => None,
    }
}

fn validate_like_literal(
    literal: &ValueNode,
    value: &ValueNode,
    path: &str,
) -> Result<ValueNode> {
    match literal {
        ValueNode::Null => Ok(value.clone()),
        ValueNode::Str(_) => coerce_str(value, path).map(ValueNode::Str),
        ValueNode::Int(_) => coerce_int(value, path).map(ValueNode::Int),
        ValueNode::Float(_) => coerce_float(value, path).map(ValueNode::Float),
        ValueNode::Bool(_) => match value {
            ValueNode::Bool(b) => Ok(ValueNode::Bool(*b)),
            other => Err(ConfigError::type_error(path, "a boolean", other.type_name())),
        },
        ValueNode::Seq(_) => match value {
            ValueNode::Seq(_) => Ok(value.clone()),
            other => Err(ConfigError::type_error(path, "a list", other.type_name())),
        },
        ValueNode::Map(_) => match value {
            ValueNode::Map(_) => Ok(value.clone()),
            other => Err(ConfigError::type_error(path, "a dict", other.type_name())),
        },
    }
}

fn choice_error(path: &str, listed: Vec<String>, value: &ValueNode) -> ConfigError {
    ConfigError::value_error(
        path,
        format!(
            "must be one of [{}], not {}",
            listed.join(", "),
            value.display_for_error()
        ),
    )
}

fn str_seq(view: &View<'_>, split: bool) -> Result<ValueNode> {
    match view.first()?.value() {
        ValueNode::Str(s) if split => Ok(ValueNode::Seq(
            s.split_whitespace()
                .map(|word| ValueNode::Str(word.to_string()))
                .collect(),
        )),
        ValueNode::Str(s) => Ok(ValueNode::Seq(vec![ValueNode::Str(s.clone())])),
        ValueNode::Seq(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match item {
                    ValueNode::Str(s) => out.push(ValueNode::Str(s.clone())),
                    other => {
                        return Err(ConfigError::type_error(
                            view.index(index).name(),
                            "a string",
                            other.type_name(),
                        ));
                    }
                }
            }
            Ok(ValueNode::Seq(out))
        }
        other => Err(ConfigError::type_error(
            view.name(),
            "a whitespace-separated string or a list",
            other.type_name(),
        )),
    }
}

/// Convert a list of two-element lists or single-key mappings into
/// `(key, value)` string pairs, preserving order. With `default_value`,
/// bare string elements read as `(string, default_value)`.
pub(crate) fn pairs(
    view: &View<'_>,
    default_value: Option<&str>,
) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    for child in view.sequence()? {
        let value = child.first()?.value();
        match value {
            ValueNode::Str(s) => match default_value {
                Some(default) => out.push((s.clone(), default.to_string())),
                None => {
                    return Err(ConfigError::type_error(child.name(), "a pair", "str"));
                }
            },
            ValueNode::Seq(items) if items.len() == 2 => {
                let key = coerce_str(&items[0], &child.index(0).name())?;
                let val = coerce_str(&items[1], &child.index(1).name())?;
                out.push((key, val));
            }
            ValueNode::Map(entries) if entries.len() == 1 => {
                // Single-key mapping spelling: `- name: value`.
                if let Some((key, val)) = entries.iter().next() {
                    out.push((key.clone(), coerce_str(val, &child.key(key.as_str()).name())?));
                }
            }
            other => {
                return Err(ConfigError::type_error(
                    child.name(),
                    "a pair",
                    other.type_name(),
                ));
            }
        }
    }
    Ok(out)
}

// Scalar coercions, shared with the view's typed accessors.

pub(crate) fn coerce_str(value: &ValueNode, path: &str) -> Result<String> {
    match value {
        ValueNode::Str(s) => Ok(s.clone()),
        other => Err(ConfigError::type_error(path, "a string", other.type_name())),
    }
}

pub(crate) fn coerce_int(value: &ValueNode, path: &str) -> Result<i64> {
    match value {
        ValueNode::Int(i) => Ok(*i),
        // Floats truncate toward zero.
        ValueNode::Float(f) => Ok(*f as i64),
        ValueNode::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::type_error(path, "a number", "str")),
        other => Err(ConfigError::type_error(path, "a number", other.type_name())),
    }
}

pub(crate) fn coerce_float(value: &ValueNode, path: &str) -> Result<f64> {
    match value {
        ValueNode::Int(i) => Ok(*i as f64),
        ValueNode::Float(f) => Ok(*f),
        ValueNode::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::type_error(path, "a number", "str")),
        other => Err(ConfigError::type_error(path, "a number", other.type_name())),
    }
}

// Filename resolution.

fn filename(
    opts: &FilenameOptions,
    view: &View<'_>,
    scope: Option<&SchemaScope<'_, '_>>,
) -> Result<ValueNode> {
    let stack = view.resolve();
    let (raw, source): (String, Option<&Source>) = match stack.first() {
        Some(m) => match m.value() {
            ValueNode::Str(s) => (s.clone(), Some(m.source())),
            other => {
                return Err(ConfigError::type_error(
                    view.name(),
                    "a filename",
                    other.type_name(),
                ));
            }
        },
        None => match &opts.default {
            Some(default) => (default.clone(), None),
            None => return Err(ConfigError::not_found(view.name())),
        },
    };

    let mut path = paths::expand_tilde(&raw);
    if path.is_relative() {
        path = base_dir(opts, source, view, scope)?.join(path);
    }
    Ok(ValueNode::Str(
        paths::normalize(&path).to_string_lossy().into_owned(),
    ))
}

/// Pick the directory a relative filename resolves against, in strict
/// precedence order.
fn base_dir(
    opts: &FilenameOptions,
    source: Option<&Source>,
    view: &View<'_>,
    scope: Option<&SchemaScope<'_, '_>>,
) -> Result<PathBuf> {
    if let Some(cwd) = &opts.cwd {
        return Ok(cwd.clone());
    }
    if opts.in_app_dir {
        return Ok(app_config_dir(view.root()));
    }
    if let Some(field) = &opts.relative_to {
        let scope = scope.ok_or_else(|| {
            ConfigError::template_misuse(format!(
                "relative_to requires {} to be part of a schema",
                view.name()
            ))
        })?;
        return sibling_base(scope, field);
    }
    if opts.in_source_dir {
        if let Some(dir) = source.and_then(Source::file_dir) {
            return Ok(dir.to_path_buf());
        }
    }
    if let Some(base) = source.and_then(Source::base_for_paths) {
        return Ok(base.to_path_buf());
    }
    // Source-kind default: file sources resolve against the app config
    // directory, everything else against the working directory.
    match source {
        Some(s) if s.file_path().is_some() => Ok(app_config_dir(view.root())),
        _ => Ok(paths::working_dir()),
    }
}

fn app_config_dir(root: &RootConfig) -> PathBuf {
    root.directories()
        .map(|dirs| dirs.config_dir.clone())
        .unwrap_or_else(paths::working_dir)
}

/// Resolve the base directory contributed by a `relative_to` sibling
/// field, validating that sibling as a filename first.
fn sibling_base(scope: &SchemaScope<'_, '_>, field: &str) -> Result<PathBuf> {
    if field == scope.current_field {
        return Err(ConfigError::template_misuse(format!(
            "{} is relative to itself",
            scope.parent.key(field).name()
        )));
    }

    // Walk the relative_to chain up front to reject cycles.
    let mut visited: HashSet<String> = HashSet::from([scope.current_field.to_string()]);
    let mut cursor = field.to_string();
    loop {
        if !visited.insert(cursor.clone()) {
            return Err(ConfigError::template_misuse(format!(
                "{} is recursively relative",
                scope.parent.key(cursor.as_str()).name()
            )));
        }
        let Some(next) = scope.fields.get(&cursor) else {
            return Err(ConfigError::template_misuse(format!(
                "no template for {}, needed by relative_to",
                scope.parent.key(cursor.as_str()).name()
            )));
        };
        match next {
            Template::Filename(o) => match &o.relative_to {
                Some(next_field) => cursor = next_field.clone(),
                None => break,
            },
            _ => break,
        }
    }

    let sibling_template = scope.fields.get(field).ok_or_else(|| {
        ConfigError::template_misuse(format!(
            "no template for {}, needed by relative_to",
            scope.parent.key(field).name()
        ))
    })?;
    let sibling_view = scope.parent.key(field);
    let sibling_scope = SchemaScope {
        fields: scope.fields,
        parent: scope.parent,
        current_field: field,
    };
    let value = validate(sibling_template, &sibling_view, Some(&sibling_scope))?;
    match value {
        ValueNode::Str(s) => Ok(PathBuf::from(s)),
        other => Err(ConfigError::type_error(
            sibling_view.name(),
            "a filename",
            other.type_name(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::root::RootConfig;
    use crate::source::Origin;
    use stratum_yaml::parse_str;

    fn config(layers: &[&str]) -> RootConfig {
        let mut config = RootConfig::new();
        for text in layers {
            config.set(parse_str(text).unwrap(), Origin::Overlay);
        }
        config
    }

    #[test]
    fn test_scalar_templates() {
        let config = config(&["name: app\nport: 8080\nratio: 1.5\non: true\n"]);
        let root = config.view();
        assert_eq!(
            root.key("name").get(&Template::string()).unwrap(),
            ValueNode::from("app")
        );
        assert_eq!(
            root.key("port").get(&Template::integer()).unwrap(),
            ValueNode::Int(8080)
        );
        assert_eq!(
            root.key("ratio").get(&Template::float()).unwrap(),
            ValueNode::Float(1.5)
        );
        assert_eq!(
            root.key("on").get(&Template::boolean()).unwrap(),
            ValueNode::Bool(true)
        );
    }

    #[test]
    fn test_int_coercion_rules() {
        let config = config(&["a: '42'\nb: 2.9\nc: true\nd: nope\n"]);
        let root = config.view();
        assert_eq!(root.key("a").get(&Template::integer()).unwrap(), ValueNode::Int(42));
        assert_eq!(root.key("b").get(&Template::integer()).unwrap(), ValueNode::Int(2));
        assert_eq!(
            root.key("c").get(&Template::integer()).unwrap_err().to_string(),
            "c: must be a number, not bool"
        );
        assert_eq!(
            root.key("d").get(&Template::integer()).unwrap_err().to_string(),
            "d: must be a number, not str"
        );
    }

    #[test]
    fn test_number_keeps_kind() {
        let config = config(&["i: 3\nf: 3.5\ns: '3'\n"]);
        let root = config.view();
        assert_eq!(root.key("i").get(&Template::number()).unwrap(), ValueNode::Int(3));
        assert_eq!(
            root.key("f").get(&Template::number()).unwrap(),
            ValueNode::Float(3.5)
        );
        assert!(root.key("s").get(&Template::number()).is_err());
    }

    #[test]
    fn test_defaults_apply_on_absence_only() {
        let config = config(&["present: 1\n"]);
        let root = config.view();
        assert_eq!(
            root.key("present").get(&Template::integer_default(9)).unwrap(),
            ValueNode::Int(1)
        );
        assert_eq!(
            root.key("absent").get(&Template::integer_default(9)).unwrap(),
            ValueNode::Int(9)
        );
        assert_eq!(
            root.key("absent").get(&Template::string_default("x")).unwrap(),
            ValueNode::from("x")
        );
    }

    #[test]
    fn test_literal_acts_as_typed_default() {
        let config = config(&["present: 7\nwrong: seven\n"]);
        let root = config.view();
        assert_eq!(
            root.key("absent").get(&Template::literal(80)).unwrap(),
            ValueNode::Int(80)
        );
        assert_eq!(
            root.key("present").get(&Template::literal(80)).unwrap(),
            ValueNode::Int(7)
        );
        assert_eq!(
            root.key("wrong").get(&Template::literal(80)).unwrap_err().to_string(),
            "wrong: must be a number, not str"
        );
    }

    #[test]
    fn test_string_pattern() {
        let config = config(&["id: abc-123\nbad: '!!'\n"]);
        let template = Template::string_matching("^[a-z]+-[0-9]+$").unwrap();
        assert_eq!(
            config.view().key("id").get(&template).unwrap(),
            ValueNode::from("abc-123")
        );
        assert_eq!(
            config.view().key("bad").get(&template).unwrap_err().to_string(),
            "bad: must match the pattern ^[a-z]+-[0-9]+$"
        );
    }

    #[test]
    fn test_invalid_pattern_is_template_misuse() {
        let err = Template::string_matching("(unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::TemplateMisuse { .. }));
    }

    #[test]
    fn test_choice() {
        let config = config(&["mode: up\nbad: left\n"]);
        let template = Template::choice(["up".to_string(), "down".to_string()]);
        assert_eq!(
            config.view().key("mode").get(&template).unwrap(),
            ValueNode::from("up")
        );
        assert_eq!(
            config.view().key("bad").get(&template).unwrap_err().to_string(),
            "bad: must be one of ['up', 'down'], not 'left'"
        );
    }

    #[test]
    fn test_choice_map_returns_mapped_value() {
        let config = config(&["level: warn\n"]);
        let mapping: IndexMap<String, ValueNode> = [
            ("info".to_string(), ValueNode::Int(20)),
            ("warn".to_string(), ValueNode::Int(30)),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            config.view().key("level").get(&Template::choice_map(mapping)).unwrap(),
            ValueNode::Int(30)
        );
    }

    #[test]
    fn test_schema_merges_fields_across_sources() {
        let config = config(&[
            "server:\n  host: fallback\n  port: 80\n",
            "server:\n  host: example.org\n",
        ]);
        let template = Template::schema([
            ("host", Template::string()),
            ("port", Template::integer()),
        ]);
        let result = config.view().key("server").get(&template).unwrap();
        let map = result.as_map().unwrap();
        assert_eq!(map["host"].as_str(), Some("example.org"));
        assert_eq!(map["port"], ValueNode::Int(80));
    }

    #[test]
    fn test_schema_error_names_full_path() {
        let config = config(&["server:\n  port: eighty\n"]);
        let template = Template::schema([("port", Template::integer())]);
        assert_eq!(
            config.view().key("server").get(&template).unwrap_err().to_string(),
            "server.port: must be a number, not str"
        );
    }

    #[test]
    fn test_schema_missing_required_field() {
        let config = config(&["server: {}\n"]);
        let template = Template::schema([("port", Template::integer())]);
        assert_eq!(
            config.view().key("server").get(&template).unwrap_err().to_string(),
            "server.port not found"
        );
    }

    #[test]
    fn test_sequence_replaces_never_merges() {
        let config = config(&["nums: [1, 2, 3]\n", "nums: [9]\n"]);
        let result = config
            .view()
            .key("nums")
            .get(&Template::sequence(Template::integer()))
            .unwrap();
        assert_eq!(result, ValueNode::Seq(vec![ValueNode::Int(9)]));
    }

    #[test]
    fn test_sequence_missing_is_empty() {
        let config = config(&["a: 1\n"]);
        let result = config
            .view()
            .key("nums")
            .get(&Template::sequence(Template::integer()))
            .unwrap();
        assert_eq!(result, ValueNode::empty_seq());
    }

    #[test]
    fn test_sequence_element_error_path() {
        let config = config(&["nums: [1, x, 3]\n"]);
        let err = config
            .view()
            .key("nums")
            .get(&Template::sequence(Template::integer()))
            .unwrap_err();
        assert_eq!(err.to_string(), "nums#1: must be a number, not str");
    }

    #[test]
    fn test_sequence_skips_non_sequence_match() {
        // The higher source holds a scalar here; the sequence below is
        // still found and used whole.
        let config = config(&["nums: [1, 2]\n", "nums: solo\n"]);
        let result = config
            .view()
            .key("nums")
            .get(&Template::sequence(Template::integer()))
            .unwrap();
        assert_eq!(result.as_seq().unwrap().len(), 2);
    }

    #[test]
    fn test_mapping_values_merges_per_key() {
        let config = config(&["m:\n  a: 1\n  b: 2\n", "m:\n  b: 20\n  c: 3\n"]);
        let result = config
            .view()
            .key("m")
            .get(&Template::mapping_values(Template::integer()))
            .unwrap();
        let map = result.as_map().unwrap();
        let entries: Vec<(&str, i64)> = map
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_i64().unwrap()))
            .collect();
        assert_eq!(entries, [("a", 1), ("b", 20), ("c", 3)]);
    }

    #[test]
    fn test_mapping_values_missing_is_empty() {
        let config = config(&["a: 1\n"]);
        let result = config
            .view()
            .key("m")
            .get(&Template::mapping_values(Template::integer()))
            .unwrap();
        assert_eq!(result, ValueNode::empty_map());
    }

    #[test]
    fn test_optional_absent_yields_null() {
        let config = config(&["a: 1\n"]);
        let result = config
            .view()
            .key("missing")
            .get(&Template::optional(Template::string()))
            .unwrap();
        assert!(result.is_null());
    }

    #[test]
    fn test_optional_uses_explicit_then_intrinsic_default() {
        let config = config(&["explicit_null: null\n"]);
        let root = config.view();
        assert_eq!(
            root.key("missing")
                .get(&Template::optional_or(Template::string(), "fallback"))
                .unwrap(),
            ValueNode::from("fallback")
        );
        assert_eq!(
            root.key("explicit_null")
                .get(&Template::optional(Template::integer_default(5)))
                .unwrap(),
            ValueNode::Int(5)
        );
    }

    #[test]
    fn test_optional_strict_rejects_absence_but_accepts_null() {
        let config = config(&["present_null: null\n"]);
        let template = Template::optional_strict(Template::integer_default(5));
        assert_eq!(
            config.view().key("missing").get(&template).unwrap_err().to_string(),
            "missing not found"
        );
        assert_eq!(
            config.view().key("present_null").get(&template).unwrap(),
            ValueNode::Int(5)
        );
    }

    #[test]
    fn test_optional_present_delegates() {
        let config = config(&["v: 3\n"]);
        assert_eq!(
            config
                .view()
                .key("v")
                .get(&Template::optional(Template::integer()))
                .unwrap(),
            ValueNode::Int(3)
        );
    }

    #[test]
    fn test_pairs_both_spellings() {
        let config = config(&["opts:\n  - [a, '1']\n  - b: '2'\n"]);
        let result = pairs(&config.view().key("opts"), None).unwrap();
        assert_eq!(
            result,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_relative_to_outside_schema_is_misuse() {
        let config = config(&["f: sub/file.txt\n"]);
        let template = Template::filename_with(FilenameOptions {
            relative_to: Some("other".into()),
            ..FilenameOptions::default()
        });
        let err = config.view().key("f").get(&template).unwrap_err();
        assert!(matches!(err, ConfigError::TemplateMisuse { .. }));
    }

    #[test]
    fn test_relative_to_self_is_misuse() {
        let config = config(&["f: x\n"]);
        let template = Template::schema([(
            "f",
            Template::filename_with(FilenameOptions {
                relative_to: Some("f".into()),
                ..FilenameOptions::default()
            }),
        )]);
        let err = config.view().get(&template).unwrap_err();
        assert_eq!(err.to_string(), "invalid template: f is relative to itself");
    }

    #[test]
    fn test_relative_to_cycle_is_misuse() {
        let config = config(&["a: x\nb: y\n"]);
        let template = Template::schema([
            (
                "a",
                Template::filename_with(FilenameOptions {
                    relative_to: Some("b".into()),
                    ..FilenameOptions::default()
                }),
            ),
            (
                "b",
                Template::filename_with(FilenameOptions {
                    relative_to: Some("a".into()),
                    ..FilenameOptions::default()
                }),
            ),
        ]);
        let err = config.view().get(&template).unwrap_err();
        assert!(matches!(err, ConfigError::TemplateMisuse { .. }));
    }

    #[test]
    fn test_filename_rejects_non_string() {
        let config = config(&["f: 7\n"]);
        let err = config.view().key("f").get(&Template::filename()).unwrap_err();
        assert_eq!(err.to_string(), "f: must be a filename, not int");
    }
}
