//! Command-line argument source building.
//!
//! Callers parse their arguments with whatever library they use and
//! hand over a flat namespace of `(option, value)` pairs. Null values
//! are dropped: an option the user never passed must not shadow a
//! value from a lower-priority source.

use indexmap::IndexMap;
use stratum_value::ValueNode;

/// A parsed-argument namespace: option names to values, in option
/// order.
pub type Namespace = IndexMap<String, ValueNode>;

/// Build a value tree from a namespace. With `dots`, option names
/// containing `.` expand into nested mappings (`--redis.host` sets
/// `{redis: {host: ...}}`).
pub(crate) fn tree_from_namespace(namespace: &Namespace, dots: bool) -> ValueNode {
    let mut out: IndexMap<String, ValueNode> = IndexMap::new();
    for (name, value) in namespace {
        if value.is_null() {
            continue;
        }
        if dots && name.contains('.') {
            let parts: Vec<&str> = name.split('.').collect();
            insert_nested(&mut out, &parts, value.clone());
        } else {
            out.insert(name.clone(), value.clone());
        }
    }
    ValueNode::Map(out)
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
        *slot = ValueNode::empty_map();
    }
    if let ValueNode::Map(inner) = slot {
        insert_nested(inner, rest, value);
    }
}
