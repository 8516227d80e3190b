//! Dotted-path utilities for nested JSON mappings.
//!
//! A path such as `"network.vlan.id"` addresses a value at any depth of a
//! `serde_json::Map`. Segments address mapping keys; a segment that is a
//! canonical decimal index addresses an element when the current value is a
//! sequence.
//!
//! # Example
//!
//! ```
//! use deep_model_path::{flatten, get, set, unset};
//! use serde_json::{json, Map, Value};
//!
//! let mut attrs = Map::new();
//! set(&mut attrs, "network.vlan.id", json!(101));
//! set(&mut attrs, "network.name", json!("storage"));
//! assert_eq!(get(&attrs, "network.vlan.id"), Some(&json!(101)));
//!
//! let flat = flatten(&attrs);
//! assert_eq!(
//!     Value::Object(flat),
//!     json!({"network.vlan.id": 101, "network.name": "storage"})
//! );
//!
//! unset(&mut attrs, "network.vlan");
//! assert_eq!(Value::Object(attrs), json!({"network": {"name": "storage"}}));
//! ```

pub mod flatten;
pub mod get;
pub mod set;
pub mod util;

pub use flatten::{flatten, leaf_paths, unflatten};
pub use get::{get, get_in, get_mut, has};
pub use set::{set, unset, unset_pruned};
pub use util::{
    ancestors, format_path, is_child, is_valid_index, join, parse_index, parse_path, segments,
    SEPARATOR,
};
