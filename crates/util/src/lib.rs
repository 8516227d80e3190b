//! deep-model-util - JSON value helpers used by the deep-path model.
//!
//! Everything here operates on plain `serde_json::Value` trees and has no
//! notion of paths or events.

pub mod json_equal;
pub mod merge;
pub mod predicates;

// Re-exports for convenience
pub use json_equal::{deep_equal, deep_equal_opt};
pub use merge::{deep_extend, deep_extend_couple, union, DEFAULT_MAX_DEPTH};
pub use predicates::{is_truthy, kind_of};
