use deep_model_path::{get_in, is_child};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Paths that differ from the last snapshot, with their new values.
///
/// Entries are keyed by full dotted path. `None` marks a path that was
/// removed. The key set is prefix-free: no entry is an ancestor of another,
/// so recording a path drops anything recorded above or below it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changes {
    entries: IndexMap<String, Option<Value>>,
}

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the changes hold a value at `path`.
    ///
    /// That is the case when `path` was recorded with a value, when anything
    /// below it was recorded (removals included), or when `path` resolves
    /// inside a value recorded for one of its ancestors. A removal recorded at
    /// exactly `path` holds no value.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|(key, value)| {
            if key == path {
                value.is_some()
            } else if is_child(path, key) {
                true
            } else if is_child(key, path) {
                let rest = &path[key.len() + 1..];
                value.as_ref().and_then(|v| get_in(v, rest)).is_some()
            } else {
                false
            }
        })
    }

    /// The recorded entry at exactly `path`: `Some(None)` for a removal.
    pub fn entry(&self, path: &str) -> Option<Option<&Value>> {
        self.entries.get(path).map(Option::as_ref)
    }

    pub fn record(&mut self, path: &str, value: Option<Value>) {
        if let Some(slot) = self.entries.get_mut(path) {
            *slot = value;
            return;
        }
        self.entries
            .retain(|key, _| !is_child(path, key) && !is_child(key, path));
        self.entries.insert(path.to_owned(), value);
    }

    /// Forget `path` and everything below it.
    pub fn revert(&mut self, path: &str) {
        self.entries
            .retain(|key, _| key != path && !is_child(path, key));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.entries
            .iter()
            .map(|(path, value)| (path.as_str(), value.as_ref()))
    }

    /// Flat copy of the entries.
    pub fn to_flat(&self) -> IndexMap<String, Option<Value>> {
        self.entries.clone()
    }

    /// The entries rebuilt into a nested mapping, removals rendered as `null`.
    pub fn to_nested(&self) -> Value {
        let mut root = Map::new();
        for (path, value) in &self.entries {
            deep_model_path::set(&mut root, path, value.clone().unwrap_or(Value::Null));
        }
        Value::Object(root)
    }
}
