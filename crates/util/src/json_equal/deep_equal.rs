use serde_json::{Number, Value};

/// Performs a deep equality check between two JSON values.
///
/// This function compares values recursively, checking equality for:
/// - Primitives (null, bool, number, string)
/// - Arrays (element-by-element comparison)
/// - Objects (key-by-key comparison, key order is ignored)
///
/// Numbers compare by numeric value, so `1` and `1.0` are equal.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use deep_model_util::json_equal::deep_equal;
///
/// let a = json!({"vlan": [100, 101]});
/// let b = json!({"vlan": [100, 101]});
/// let c = json!({"vlan": [100, 102]});
///
/// assert!(deep_equal(&a, &b));
/// assert!(!deep_equal(&a, &c));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => number_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,

        (Value::Array(arr_a), Value::Array(arr_b)) => {
            arr_a.len() == arr_b.len()
                && arr_a.iter().zip(arr_b).all(|(x, y)| deep_equal(x, y))
        }

        (Value::Object(obj_a), Value::Object(obj_b)) => {
            if obj_a.len() != obj_b.len() {
                return false;
            }
            obj_a.iter().all(|(key, val_a)| match obj_b.get(key) {
                Some(val_b) => deep_equal(val_a, val_b),
                None => false,
            })
        }

        // Different types are never equal
        _ => false,
    }
}

/// Deep equality over possibly-absent values.
///
/// Two absent values are equal; an absent value never equals a present one,
/// not even `null`.
pub fn deep_equal_opt(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => deep_equal(a, b),
        _ => false,
    }
}

fn number_equal(a: &Number, b: &Number) -> bool {
    if a == b {
        return true;
    }
    if a.is_f64() || b.is_f64() {
        return matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y);
    }
    false
}
