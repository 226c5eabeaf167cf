//! [`ValueNode`] tree to YAML text conversion, for the dump contract.

use stratum_value::ValueNode;
use yaml_rust2::{Yaml, YamlEmitter};

/// Serialize a value tree as a YAML document.
///
/// Mapping order is preserved, so emitting a flattened configuration and
/// re-parsing the output round-trips to an identical tree.
pub fn emit(node: &ValueNode) -> String {
    let yaml = to_yaml(node);
    let mut out = String::new();
    // The emitter only fails on a failing fmt::Write target; a String
    // cannot fail.
    let _ = YamlEmitter::new(&mut out).dump(&yaml);

    // Drop the document marker so the output reads like a config file.
    let body = out
        .strip_prefix("---\n")
        .or_else(|| out.strip_prefix("--- "))
        .unwrap_or(&out);
    let mut body = body.to_string();
    if !body.ends_with('\n') {
        body.push('\n');
    }
    body
}

fn to_yaml(node: &ValueNode) -> Yaml {
    match node {
        ValueNode::Null => Yaml::Null,
        ValueNode::Bool(b) => Yaml::Boolean(*b),
        ValueNode::Int(i) => Yaml::Integer(*i),
        ValueNode::Float(f) => Yaml::Real(float_repr(*f)),
        ValueNode::Str(s) => Yaml::String(s.clone()),
        ValueNode::Seq(items) => Yaml::Array(items.iter().map(to_yaml).collect()),
        ValueNode::Map(entries) => Yaml::Hash(
            entries
                .iter()
                .map(|(k, v)| (Yaml::String(k.clone()), to_yaml(v)))
                .collect(),
        ),
    }
}

/// Format a float so it re-parses as a float (a bare `2` would read back
/// as an integer).
fn float_repr(f: f64) -> String {
    let s = f.to_string();
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{}.0", s)
    }
}
