//! Environment-variable source building.
//!
//! Variables carrying a required prefix become a nested tree: the
//! prefix is stripped, the rest lowercased and split on a separator
//! (`APP_REDIS__HOST=x` with prefix `APP_` and separator `__` yields
//! `{redis: {host: "x"}}`). Values are coerced the way YAML scalars
//! read, so `PORT=8080` arrives as an integer.

use indexmap::IndexMap;
use stratum_value::ValueNode;
use stratum_yaml::parse_scalar;

/// Build a value tree from environment-style `(name, value)` pairs.
pub(crate) fn tree_from_vars<I>(vars: I, prefix: &str, sep: &str) -> ValueNode
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut out: IndexMap<String, ValueNode> = IndexMap::new();
    for (name, value) in vars {
        let Some(rest) = name.strip_prefix(prefix) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        let key = rest.to_lowercase();
        let parts: Vec<&str> = if sep.is_empty() {
            vec![key.as_str()]
        } else {
            key.split(sep).filter(|part| !part.is_empty()).collect()
        };
        if parts.is_empty() {
            continue;
        }
        insert_nested(&mut out, &parts, parse_scalar(&value));
    }
    listify(ValueNode::Map(out))
}

fn insert_nested(map: &mut IndexMap<String, ValueNode>, parts: &[&str], value: ValueNode) {
    let (head, rest) = (parts[0], &parts[1..]);
    if rest.is_empty() {
        map.insert(head.to_string(), value);
        return;
    }
    let slot = map
        .entry(head.to_string())
        .or_insert_with(ValueNode::empty_map);
    if !slot.is_map() {
        // A deeper variable displaces an earlier scalar at the same key.
        *slot = ValueNode::empty_map();
    }
    if let ValueNode::Map(inner) = slot {
        insert_nested(inner, rest, value);
    }
}

/// Convert mappings whose keys are the contiguous integers `0..n` into
/// sequences, recursively, so `APP_STEPS__0`/`APP_STEPS__1` read back
/// as a list.
fn listify(node: ValueNode) -> ValueNode {
    match node {
        ValueNode::Map(entries) => {
            let entries: IndexMap<String, ValueNode> = entries
                .into_iter()
                .map(|(k, v)| (k, listify(v)))
                .collect();
            match as_contiguous_list(&entries) {
                Some(seq) => seq,
                None => ValueNode::Map(entries),
            }
        }
        ValueNode::Seq(items) => ValueNode::Seq(items.into_iter().map(listify).collect()),
        other => other,
    }
}

fn as_contiguous_list(entries: &IndexMap<String, ValueNode>) -> Option<ValueNode> {
    if entries.is_empty() {
        return None;
    }
    let mut indexed = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        indexed.push((key.parse::<usize>().ok()?, value));
    }
    indexed.sort_by_key(|(index, _)| *index);
    if indexed.iter().enumerate().any(|(want, (got, _))| *got != want) {
        return None;
    }
    Some(ValueNode::Seq(
        indexed.into_iter().map(|(_, v)| v.clone()).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_prefix_stripped_and_lowercased() {
        let tree = tree_from_vars(vars(&[("APP_VERBOSE", "true"), ("HOME", "/root")]), "APP_", "__");
        let map = tree.as_map().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["verbose"], ValueNode::Bool(true));
    }

    #[test]
    fn test_separator_nests() {
        let tree = tree_from_vars(
            vars(&[("APP_REDIS__HOST", "localhost"), ("APP_REDIS__PORT", "6379")]),
            "APP_",
            "__",
        );
        let redis = tree.as_map().unwrap()["redis"].as_map().unwrap();
        assert_eq!(redis["host"].as_str(), Some("localhost"));
        assert_eq!(redis["port"], ValueNode::Int(6379));
    }

    #[test]
    fn test_values_read_as_yaml_scalars() {
        let tree = tree_from_vars(
            vars(&[("APP_PORT", "8080"), ("APP_RATIO", "1.5"), ("APP_NAME", "app")]),
            "APP_",
            "__",
        );
        let map = tree.as_map().unwrap();
        assert_eq!(map["port"], ValueNode::Int(8080));
        assert_eq!(map["ratio"], ValueNode::Float(1.5));
        assert_eq!(map["name"].as_str(), Some("app"));
    }

    #[test]
    fn test_integer_keys_become_list() {
        let tree = tree_from_vars(
            vars(&[("APP_STEPS__0", "fetch"), ("APP_STEPS__1", "build")]),
            "APP_",
            "__",
        );
        let steps = tree.as_map().unwrap()["steps"].as_seq().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].as_str(), Some("fetch"));
        assert_eq!(steps[1].as_str(), Some("build"));
    }

    #[test]
    fn test_non_contiguous_integer_keys_stay_mapping() {
        let tree = tree_from_vars(
            vars(&[("APP_STEPS__0", "fetch"), ("APP_STEPS__2", "build")]),
            "APP_",
            "__",
        );
        assert!(tree.as_map().unwrap()["steps"].is_map());
    }

    #[test]
    fn test_no_matching_vars_yields_empty_mapping() {
        let tree = tree_from_vars(vars(&[("OTHER", "1")]), "APP_", "__");
        assert!(tree.as_map().unwrap().is_empty());
    }
}
