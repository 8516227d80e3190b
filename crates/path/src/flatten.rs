//! Conversion between nested mappings and flat `path -> leaf` mappings.

use serde_json::{Map, Value};

use crate::set::set;
use crate::util::join;

/// Flatten a nested mapping into a mapping keyed by full dotted paths.
///
/// Non-empty mappings are recursed into. Empty mappings, sequences and
/// scalars are leaves. Output order follows a depth-first walk of the input.
///
/// # Examples
///
/// ```
/// use serde_json::{json, Value};
/// use deep_model_path::flatten;
///
/// let nested = json!({"net": {"vlan": {"id": 7}, "ips": ["10.0.0.2"]}, "tags": {}});
/// let flat = flatten(nested.as_object().unwrap());
/// assert_eq!(
///     Value::Object(flat),
///     json!({"net.vlan.id": 7, "net.ips": ["10.0.0.2"], "tags": {}})
/// );
/// ```
pub fn flatten(map: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(map, None, &mut out);
    out
}

fn flatten_into(map: &Map<String, Value>, prefix: Option<&str>, out: &mut Map<String, Value>) {
    for (key, value) in map {
        let path = match prefix {
            Some(prefix) => join(prefix, key),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(inner, Some(&path), out),
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}

/// Flatten and return only the leaf paths.
pub fn leaf_paths(map: &Map<String, Value>) -> Vec<String> {
    flatten(map).into_iter().map(|(path, _)| path).collect()
}

/// Rebuild a nested mapping from a flat `path -> value` mapping.
pub fn unflatten(flat: &Map<String, Value>) -> Map<String, Value> {
    let mut root = Map::new();
    for (path, value) in flat {
        set(&mut root, path, value.clone());
    }
    root
}
