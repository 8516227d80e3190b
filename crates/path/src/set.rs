use serde_json::{Map, Value};

use crate::get::{get, get_mut};
use crate::util::{ancestors, parse_index, segments, SEPARATOR};

/// Assign `value` at a dotted path, creating intermediate mappings as needed.
///
/// An intermediate that is missing, or is neither a mapping nor a sequence
/// addressed by a valid index, is replaced by an empty mapping. A sequence
/// grows by at most one element: an index equal to its length appends, a
/// larger one is not writable. Returns `false`, leaving `root` untouched,
/// when the path is not writable.
///
/// # Examples
///
/// ```
/// use serde_json::{json, Map, Value};
/// use deep_model_path::{get, set};
///
/// let mut root = Map::new();
/// assert!(set(&mut root, "network.vlan.id", json!(101)));
/// assert_eq!(Value::Object(root), json!({"network": {"vlan": {"id": 101}}}));
/// ```
pub fn set(root: &mut Map<String, Value>, path: &str, value: Value) -> bool {
    let steps: Vec<&str> = segments(path).collect();
    let Some((first, rest)) = steps.split_first() else {
        return false;
    };
    if !writable(root.get(*first), rest) {
        return false;
    }
    let slot = root.entry(*first).or_insert(Value::Null);
    set_in(slot, rest, value);
    true
}

/// Whether `set_in` can reach the end of `steps` from `slot`.
fn writable(mut slot: Option<&Value>, steps: &[&str]) -> bool {
    for step in steps {
        slot = match slot {
            Some(Value::Array(arr)) => match parse_index(step) {
                Some(idx) if idx < arr.len() => arr.get(idx),
                Some(idx) if idx == arr.len() => None,
                Some(_) => return false,
                None => None,
            },
            Some(Value::Object(map)) => map.get(*step),
            _ => None,
        };
    }
    true
}

fn set_in(slot: &mut Value, steps: &[&str], value: Value) {
    let Some((step, rest)) = steps.split_first() else {
        *slot = value;
        return;
    };
    let index = match slot {
        Value::Array(arr) => parse_index(step).filter(|idx| *idx <= arr.len()),
        _ => None,
    };
    match (slot, index) {
        (Value::Array(arr), Some(idx)) => {
            if idx == arr.len() {
                arr.push(Value::Null);
            }
            set_in(&mut arr[idx], rest, value);
        }
        (Value::Object(map), _) => {
            set_in(map.entry(*step).or_insert(Value::Null), rest, value);
        }
        (slot, _) => {
            let mut child = Value::Null;
            set_in(&mut child, rest, value);
            let mut map = Map::new();
            map.insert((*step).to_owned(), child);
            *slot = Value::Object(map);
        }
    }
}

/// Remove the value at a dotted path and return it.
///
/// Mapping entries are removed, keeping the order of their siblings. Sequence
/// elements are replaced by `null` so the positions of later elements do not
/// shift. Missing paths are a no-op.
pub fn unset(root: &mut Map<String, Value>, path: &str) -> Option<Value> {
    let Some((parent, key)) = path.rsplit_once(SEPARATOR) else {
        return root.shift_remove(path);
    };
    match get_mut(root, parent)? {
        Value::Object(map) => map.shift_remove(key),
        Value::Array(arr) => {
            let slot = arr.get_mut(parse_index(key)?)?;
            Some(std::mem::take(slot))
        }
        _ => None,
    }
}

/// Like [`unset`], then also removes the mappings the removal left empty.
///
/// Pruning walks up from the removed path and stops at the first ancestor
/// that is not an empty mapping or that sits inside a sequence. Nothing is
/// pruned when nothing was removed.
pub fn unset_pruned(root: &mut Map<String, Value>, path: &str) -> Option<Value> {
    let removed = unset(root, path)?;
    for ancestor in ancestors(path) {
        let empty = matches!(get(root, ancestor), Some(Value::Object(map)) if map.is_empty());
        if !empty || !held_by_mapping(root, ancestor) {
            break;
        }
        unset(root, ancestor);
    }
    Some(removed)
}

fn held_by_mapping(root: &Map<String, Value>, path: &str) -> bool {
    match path.rsplit_once(SEPARATOR) {
        None => true,
        Some((parent, _)) => matches!(get(root, parent), Some(Value::Object(_))),
    }
}
