//! Extension points a concrete model kind plugs into.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::model::DeepModel;
use crate::options::{ModelOptions, SetOptions};

/// Behaviour of a model kind (a node, a network group, cluster settings, ...).
///
/// Every method has a default, so a kind only overrides what it needs.
pub trait ModelHooks {
    /// Attributes every new model starts from. Called once per construction.
    fn defaults(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Top-level attribute mirrored into [`DeepModel::id`].
    fn id_attribute(&self) -> &str {
        "id"
    }

    /// Converts raw input into attributes when constructed with
    /// [`ModelOptions::parse`]. `None` means "no attributes".
    fn parse(&self, attributes: Value, _options: &ModelOptions) -> Option<Value> {
        Some(attributes)
    }

    /// Checks the attributes a validated `set` would produce.
    fn validate(
        &self,
        _candidate: &Map<String, Value>,
        _options: &SetOptions,
    ) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Runs last during construction, with the arguments the model was built from.
    fn initialize(&self, _model: &mut DeepModel, _attributes: &Value, _options: &ModelOptions) {}
}

/// Hooks with no behaviour of their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainModel;

impl ModelHooks for PlainModel {}
