//! Merging the source stack into one tree for dumping.

use stratum_value::ValueNode;

use crate::path::Step;
use crate::root::RootConfig;

/// A fixed placeholder standing in for redacted values in dumps.
pub const REDACTED_TOMBSTONE: &str = "REDACTED";

/// Merge every source into a single tree. Mappings merge per key with
/// the highest-priority source winning; sequences and scalars are
/// replaced whole. Key order follows first appearance from the lowest
/// layer up, so re-parsing the dump as a new lowest-priority source
/// reproduces the same tree.
pub(crate) fn flatten(root: &RootConfig, full: bool, redact: bool) -> ValueNode {
    let mut merged = ValueNode::empty_map();
    for source in root.sources().iter().rev() {
        if !full && source.is_default() {
            continue;
        }
        merge_into(&mut merged, source.tree());
    }
    if redact {
        for path in root.redactions() {
            if let Some(slot) = walk_mut(&mut merged, path.steps()) {
                *slot = ValueNode::Str(REDACTED_TOMBSTONE.to_string());
            }
        }
    }
    merged
}

fn merge_into(target: &mut ValueNode, layer: &ValueNode) {
    if let (ValueNode::Map(target_map), ValueNode::Map(layer_map)) = (&mut *target, layer) {
        for (key, value) in layer_map {
            match target_map.get_mut(key) {
                Some(slot) if slot.is_map() && value.is_map() => merge_into(slot, value),
                Some(slot) => *slot = value.clone(),
                None => {
                    target_map.insert(key.clone(), value.clone());
                }
            }
        }
    } else {
        *target = layer.clone();
    }
}

fn walk_mut<'a>(tree: &'a mut ValueNode, steps: &[Step]) -> Option<&'a mut ValueNode> {
    let mut current = tree;
    for step in steps {
        current = match (current, step) {
            (ValueNode::Map(entries), Step::Key(key)) => entries.get_mut(key)?,
            (ValueNode::Seq(items), Step::Index(index)) => items.get_mut(*index)?,
            _ => return None,
        };
    }
    Some(current)
}
