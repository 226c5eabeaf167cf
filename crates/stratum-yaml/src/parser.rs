//! YAML text to [`ValueNode`] tree conversion.

use crate::error::{Error, Result};
use stratum_value::ValueNode;
use yaml_rust2::{Yaml, YamlLoader};

/// Parse a YAML document into a value tree.
///
/// Only the first document of a multi-document stream is used. An empty
/// document (or one containing only comments) yields [`ValueNode::Null`];
/// the caller decides whether that means "empty mapping".
///
/// As a convenience for strftime-style values, bare scalars beginning
/// with `%` are accepted without quoting (`fmt: %Y-%m-%d` parses as the
/// string `"%Y-%m-%d"`), even though plain YAML reserves `%`.
///
/// # Errors
///
/// Returns an error if the text is not valid YAML or if a mapping key is
/// not a scalar.
pub fn parse_str(content: &str) -> Result<ValueNode> {
    let content = quote_percent_scalars(content);
    let docs = YamlLoader::load_from_str(&content).map_err(Error::from)?;
    match docs.first() {
        Some(doc) => from_yaml(doc),
        None => Ok(ValueNode::Null),
    }
}

/// Parse a single string as a YAML scalar, for type coercion consistent
/// with file sources.
///
/// Environment variables only carry strings; running their values through
/// this keeps `PORT=8080` an integer and `VERBOSE=true` a boolean, the
/// same way they would read from a YAML file.
pub fn parse_scalar(value: &str) -> ValueNode {
    if let Ok(i) = value.parse::<i64>() {
        return ValueNode::Int(i);
    }

    // Rust's float parser also accepts "nan", "inf", and "infinity",
    // which YAML reads as plain strings. Only input carrying a digit
    // goes to the float parse.
    if value.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(f) = value.parse::<f64>() {
            return ValueNode::Float(f);
        }
    }

    match value {
        "true" | "True" | "TRUE" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" => {
            return ValueNode::Bool(true);
        }
        "false" | "False" | "FALSE" | "no" | "No" | "NO" | "off" | "Off" | "OFF" => {
            return ValueNode::Bool(false);
        }
        "null" | "Null" | "NULL" | "~" | "" => {
            return ValueNode::Null;
        }
        _ => {}
    }

    ValueNode::Str(value.to_string())
}

fn from_yaml(yaml: &Yaml) -> Result<ValueNode> {
    Ok(match yaml {
        Yaml::Null | Yaml::BadValue => ValueNode::Null,
        Yaml::Boolean(b) => ValueNode::Bool(*b),
        Yaml::Integer(i) => ValueNode::Int(*i),
        Yaml::Real(s) => match s.parse::<f64>() {
            Ok(f) => ValueNode::Float(f),
            Err(_) => ValueNode::Str(s.clone()),
        },
        Yaml::String(s) => ValueNode::Str(s.clone()),
        // Anchors/aliases are not resolved; an alias reads as null.
        Yaml::Alias(_) => ValueNode::Null,
        Yaml::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(from_yaml(item)?);
            }
            ValueNode::Seq(out)
        }
        Yaml::Hash(entries) => {
            let mut out = indexmap::IndexMap::with_capacity(entries.len());
            for (key, value) in entries {
                out.insert(key_string(key)?, from_yaml(value)?);
            }
            ValueNode::Map(out)
        }
    })
}

/// Mapping keys must be scalars; they are stringified so the tree always
/// has string keys.
fn key_string(key: &Yaml) -> Result<String> {
    match key {
        Yaml::String(s) => Ok(s.clone()),
        Yaml::Integer(i) => Ok(i.to_string()),
        Yaml::Boolean(b) => Ok(b.to_string()),
        Yaml::Real(s) => Ok(s.clone()),
        Yaml::Null => Ok("null".to_string()),
        _ => Err(Error::InvalidStructure {
            message: "mapping key is not a scalar".to_string(),
        }),
    }
}

/// Double-quote bare values that begin with `%` so the scanner accepts
/// them. Only plain scalars in value position (`key: %x`) or sequence
/// items (`- %x`) are touched.
fn quote_percent_scalars(content: &str) -> String {
    if !content.contains('%') {
        return content.to_string();
    }

    let mut out = String::with_capacity(content.len() + 8);
    for (i, line) in content.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&quote_percent_line(line));
    }
    if content.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn quote_percent_line(line: &str) -> String {
    // Find where a plain value could start: after "key: " or after "- ".
    let value_start = line
        .find(": ")
        .map(|idx| idx + 2)
        .or_else(|| {
            let trimmed = line.trim_start();
            trimmed
                .strip_prefix("- ")
                .map(|rest| line.len() - rest.len())
        });

    if let Some(start) = value_start {
        let value = &line[start..];
        if value.starts_with('%') {
            let escaped = value.trim_end().replace('"', "\\\"");
            return format!("{}\"{}\"", &line[..start], escaped);
        }
    }
    line.to_string()
}
