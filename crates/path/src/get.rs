use serde_json::{Map, Value};

use crate::util::{parse_index, segments};

/// Get a value from a nested mapping by dotted path.
///
/// Object segments address keys; when the current value is a sequence the
/// segment must be an index. Returns `None` if any segment is absent.
pub fn get<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut steps = segments(path);
    let current = root.get(steps.next()?)?;
    descend(current, steps)
}

/// Like [`get`], but starting from any value rather than a mapping.
pub fn get_in<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    descend(value, segments(path))
}

fn descend<'a, 'p>(
    mut current: &'a Value,
    steps: impl Iterator<Item = &'p str>,
) -> Option<&'a Value> {
    for step in steps {
        current = match current {
            Value::Object(map) => map.get(step)?,
            Value::Array(arr) => arr.get(parse_index(step)?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Get a mutable reference to a value by dotted path.
///
/// Returns `None` if the path doesn't exist.
pub fn get_mut<'a>(root: &'a mut Map<String, Value>, path: &str) -> Option<&'a mut Value> {
    let mut steps = segments(path);
    let mut current = root.get_mut(steps.next()?)?;
    for step in steps {
        current = match current {
            Value::Object(map) => map.get_mut(step)?,
            Value::Array(arr) => arr.get_mut(parse_index(step)?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Check if a non-null value exists at `path`.
pub fn has(root: &Map<String, Value>, path: &str) -> bool {
    get(root, path).is_some_and(|v| !v.is_null())
}
