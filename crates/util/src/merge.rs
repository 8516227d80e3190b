//! Recursive merge with array-union semantics.
//!
//! Used to layer model defaults under construction-time attributes: plain
//! mappings present on both sides merge key by key, sequences present on both
//! sides are unioned by value, everything else is overwritten by the
//! right-hand side.

use serde_json::{Map, Value};

use crate::json_equal::deep_equal;

/// Recursion depth used when no explicit limit is configured.
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// Order-preserving union of two sequences.
///
/// Elements of `first` come before elements of `second`; an element is kept
/// only if no deep-equal element was kept before it, so duplicates inside
/// either input collapse as well.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use deep_model_util::merge::union;
///
/// let out = union(&[json!(1), json!(2)], &[json!(2), json!(3)]);
/// assert_eq!(out, vec![json!(1), json!(2), json!(3)]);
/// ```
pub fn union(first: &[Value], second: &[Value]) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(first.len() + second.len());
    for value in first.iter().chain(second) {
        if !out.iter().any(|kept| deep_equal(kept, value)) {
            out.push(value.clone());
        }
    }
    out
}

/// Merges `source` into `destination` and returns the result.
///
/// Once `max_depth` reaches zero the remaining levels are assigned shallowly,
/// i.e. source values replace destination values wholesale.
pub fn deep_extend_couple(
    mut destination: Map<String, Value>,
    source: Map<String, Value>,
    max_depth: usize,
) -> Map<String, Value> {
    if max_depth == 0 {
        tracing::trace!(keys = source.len(), "merge depth exhausted, assigning shallowly");
        destination.extend(source);
        return destination;
    }

    for (key, incoming) in source {
        let merged = match (destination.get_mut(&key), incoming) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => Value::Object(
                deep_extend_couple(std::mem::take(existing), incoming, max_depth - 1),
            ),
            (Some(Value::Array(existing)), Value::Array(incoming)) => {
                Value::Array(union(existing, &incoming))
            }
            (_, incoming) => incoming,
        };
        destination.insert(key, merged);
    }
    destination
}

/// Merges a sequence of mappings left to right; the rightmost value wins.
///
/// # Examples
///
/// ```
/// use serde_json::{json, Map, Value};
/// use deep_model_util::merge::{deep_extend, DEFAULT_MAX_DEPTH};
///
/// let as_map = |v: Value| v.as_object().cloned().unwrap();
/// let defaults = as_map(json!({"net": {"vlan": [1, 2], "cidr": "10.0.0.0/24"}}));
/// let attrs = as_map(json!({"net": {"vlan": [2, 3]}}));
///
/// let merged = deep_extend([Map::new(), defaults, attrs], DEFAULT_MAX_DEPTH);
/// assert_eq!(
///     Value::Object(merged),
///     json!({"net": {"vlan": [1, 2, 3], "cidr": "10.0.0.0/24"}})
/// );
/// ```
pub fn deep_extend<I>(objects: I, max_depth: usize) -> Map<String, Value>
where
    I: IntoIterator<Item = Map<String, Value>>,
{
    let mut objects = objects.into_iter();
    let Some(first) = objects.next() else {
        return Map::new();
    };
    objects.fold(first, |acc, next| deep_extend_couple(acc, next, max_depth))
}
