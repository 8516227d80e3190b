//! deep-model - observable model over nested attributes.
//!
//! A [`DeepModel`] stores configuration such as node interfaces, network
//! groups or cluster settings as nested JSON, addressed with dotted paths.
//! It records which paths changed since the last outermost mutation, keeps a
//! snapshot to diff against, and notifies handlers with `change:<path>`,
//! `change:<ancestor>.*` and `change` events.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use deep_model::{DeepModel, SetOptions};
//! use serde_json::json;
//!
//! let mut network = DeepModel::new(json!({"name": "storage", "vlan": {"id": 102}})).unwrap();
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! for name in ["change:vlan.id", "change:vlan.*", "change"] {
//!     let seen = Rc::clone(&seen);
//!     network.on(name, move |_, _| seen.borrow_mut().push(name));
//! }
//!
//! network.set_path("vlan.id", json!(103), SetOptions::default()).unwrap();
//! assert_eq!(*seen.borrow(), ["change:vlan.id", "change:vlan.*", "change"]);
//! assert!(network.has_changed_path("vlan"));
//! assert_eq!(network.previous("vlan.id"), Some(&json!(102)));
//! ```

pub mod changes;
pub mod config;
pub mod error;
pub mod events;
pub mod hooks;
pub mod model;
pub mod options;

pub use changes::Changes;
pub use config::ModelConfig;
pub use error::{ConfigError, ModelError, ValidationError};
pub use events::{
    attribute_event, wildcard_event, EventBus, Handler, ListenerId, ModelEvent, CHANGE,
};
pub use hooks::{ModelHooks, PlainModel};
pub use model::{DeepModel, ModelEvents};
pub use options::{ModelOptions, SetOptions};
