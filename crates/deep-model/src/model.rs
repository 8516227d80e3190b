//! The deep-path observable model.
//!
//! # Overview
//!
//! [`DeepModel`] keeps nested attributes in a `serde_json::Map` and addresses
//! them with dotted paths. Every mutation goes through one routine that
//!
//! 1. flattens the update into leaf paths,
//! 2. compares each leaf with the current value (to decide which events to
//!    emit) and, separately, with the snapshot taken when the outermost call
//!    started (to maintain [`Changes`]),
//! 3. applies the update,
//! 4. emits `change:<path>` plus `change:<ancestor>.*` for every changed leaf,
//! 5. emits a single coalesced `change` once the outermost call is done,
//!    repeating while handlers keep changing the model.
//!
//! Handlers receive the model mutably and may call back into it; such
//! reentrant calls share the outer call's snapshot and coalesced `change`.

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use deep_model_path::{ancestors, flatten, leaf_paths};
use deep_model_util::{deep_equal_opt, deep_extend, is_truthy, kind_of};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::changes::Changes;
use crate::config::ModelConfig;
use crate::error::{ModelError, ValidationError};
use crate::events::{attribute_event, wildcard_event, EventBus, ListenerId, ModelEvent, CHANGE};
use crate::hooks::{ModelHooks, PlainModel};
use crate::options::{ModelOptions, SetOptions};

static NEXT_CID: AtomicU64 = AtomicU64::new(1);

fn next_cid(prefix: &str) -> String {
    format!("{prefix}{}", NEXT_CID.fetch_add(1, Ordering::Relaxed))
}

/// Event bus specialised for models.
pub type ModelEvents = EventBus<DeepModel, ModelEvent>;

/// A flattened update: leaf path and incoming value, `None` when removing.
type Leaves = Vec<(String, Option<Value>)>;

/// Observable store of nested attributes addressed by dotted paths.
pub struct DeepModel {
    cid: String,
    id: Option<Value>,
    attributes: Map<String, Value>,
    changed: Changes,
    previous_attributes: Option<Map<String, Value>>,
    changing: bool,
    pending: bool,
    collection: Option<Weak<dyn Any>>,
    hooks: Rc<dyn ModelHooks>,
    config: ModelConfig,
    events: ModelEvents,
    validation_error: Option<ValidationError>,
}

impl DeepModel {
    /// Builds a model with [`PlainModel`] hooks and default options.
    pub fn new(attributes: Value) -> Result<Self, ModelError> {
        Self::with_options(attributes, ModelOptions::default())
    }

    /// Builds a model: merges the hook defaults under `attributes`, sets the
    /// result, forgets the resulting change set and runs
    /// [`ModelHooks::initialize`].
    pub fn with_options(attributes: Value, options: ModelOptions) -> Result<Self, ModelError> {
        let hooks: Rc<dyn ModelHooks> = match &options.hooks {
            Some(hooks) => Rc::clone(hooks),
            None => Rc::new(PlainModel),
        };

        let mut input = match &attributes {
            Value::Null => Value::Object(Map::new()),
            other => other.clone(),
        };
        if options.parse {
            input = hooks.parse(input, &options).unwrap_or(Value::Null);
        }
        let input = into_mapping(input)?;

        let mut model = DeepModel {
            cid: next_cid(&options.config.cid_prefix),
            id: None,
            attributes: Map::new(),
            changed: Changes::new(),
            previous_attributes: None,
            changing: false,
            pending: false,
            collection: options.collection.clone(),
            hooks: Rc::clone(&hooks),
            config: options.config.clone(),
            events: ModelEvents::new(),
            validation_error: None,
        };

        let merged = deep_extend(
            [Map::new(), hooks.defaults(), input],
            model.config.max_merge_depth,
        );
        tracing::debug!(cid = %model.cid, keys = merged.len(), "constructing model");
        if let Err(err) = model.set_mapping(merged, &SetOptions::default()) {
            tracing::debug!(cid = %model.cid, error = %err, "initial attributes rejected");
        }
        model.changed.clear();

        hooks.initialize(&mut model, &attributes, &options);
        Ok(model)
    }

    /// Client id, unique per model for the life of the process.
    pub fn cid(&self) -> &str {
        &self.cid
    }

    /// Last truthy value set for the id attribute.
    pub fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// The owning collection, if it is still alive.
    pub fn collection(&self) -> Option<Rc<dyn Any>> {
        self.collection.as_ref().and_then(Weak::upgrade)
    }

    /// Rejection recorded by the last validated `set`.
    pub fn validation_error(&self) -> Option<&ValidationError> {
        self.validation_error.as_ref()
    }

    /// True while a `set` is running (i.e. inside event handlers).
    pub fn is_changing(&self) -> bool {
        self.changing
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        deep_model_path::get(&self.attributes, path)
    }

    /// True if a non-null value exists at `path`.
    pub fn has(&self, path: &str) -> bool {
        deep_model_path::has(&self.attributes, path)
    }

    /// Sets one path. A non-empty mapping value is flattened below `path`,
    /// so its siblings at the destination are kept.
    pub fn set_path(
        &mut self,
        path: &str,
        value: Value,
        options: SetOptions,
    ) -> Result<(), ModelError> {
        let mut attrs = Map::new();
        attrs.insert(path.to_owned(), value);
        self.set_mapping(attrs, &options)
    }

    /// Sets every path of a nested mapping. `null` is a no-op.
    pub fn set_all(&mut self, attributes: Value, options: SetOptions) -> Result<(), ModelError> {
        match attributes {
            Value::Null => Ok(()),
            Value::Object(attrs) => self.set_mapping(attrs, &options),
            other => Err(ModelError::NotAMapping(kind_of(&other))),
        }
    }

    /// Removes the value at `path`. The mapping that held it stays, even
    /// when it is left empty.
    pub fn unset(&mut self, path: &str, options: SetOptions) -> Result<(), ModelError> {
        let options = options.with_unset();
        self.mutate(vec![(path.to_owned(), None)], None, Removal::Keep, &options)
    }

    /// Removes every attribute, reporting each leaf path as changed. Leaves
    /// the attributes empty.
    pub fn clear(&mut self, options: SetOptions) -> Result<(), ModelError> {
        let options = options.with_unset();
        let leaves = leaf_paths(&self.attributes)
            .into_iter()
            .map(|path| (path, None))
            .collect();
        self.mutate(leaves, None, Removal::Prune, &options)
    }

    fn set_mapping(
        &mut self,
        attrs: Map<String, Value>,
        options: &SetOptions,
    ) -> Result<(), ModelError> {
        let id = attrs
            .get(self.hooks.id_attribute())
            .filter(|value| is_truthy(value))
            .cloned();
        let leaves = flatten(&attrs)
            .into_iter()
            .map(|(path, value)| (path, Some(value)))
            .collect();
        self.mutate(leaves, id, Removal::Keep, options)
    }

    fn mutate(
        &mut self,
        leaves: Leaves,
        id: Option<Value>,
        removal: Removal,
        options: &SetOptions,
    ) -> Result<(), ModelError> {
        if options.validate {
            self.validate(&leaves, removal, options)?;
        }

        let changing = self.changing;
        self.changing = true;
        if !changing {
            self.previous_attributes = Some(self.attributes.clone());
            self.changed.clear();
        }
        tracing::trace!(cid = %self.cid, leaves = leaves.len(), reentrant = changing, "set");

        if let Some(id) = id {
            self.id = Some(id);
        }

        let mut changes: Vec<String> = Vec::new();
        for (path, value) in leaves {
            let current = deep_model_path::get(&self.attributes, &path);
            let differs = !deep_equal_opt(current, value.as_ref());
            let previous = self
                .previous_attributes
                .as_ref()
                .and_then(|prev| deep_model_path::get(prev, &path));
            let reverted = deep_equal_opt(previous, value.as_ref());

            if !apply(&mut self.attributes, &path, value.as_ref(), removal, options) {
                tracing::debug!(cid = %self.cid, path = %path, "path not writable, leaf skipped");
                continue;
            }
            if differs {
                changes.push(path.clone());
            }
            if reverted {
                self.changed.revert(&path);
            } else {
                self.changed.record(&path, value);
            }
        }

        if !options.silent {
            if !changes.is_empty() {
                self.pending = true;
            }
            for path in &changes {
                self.emit_attribute(path, options);
                for ancestor in ancestors(path) {
                    self.emit_descendant(ancestor, options);
                }
            }
        }

        if changing {
            return Ok(());
        }
        if !options.silent {
            while self.pending {
                self.pending = false;
                tracing::trace!(cid = %self.cid, "change");
                let event = ModelEvent::Change {
                    options: options.clone(),
                };
                self.trigger(CHANGE, &event);
            }
        }
        self.pending = false;
        self.changing = false;
        Ok(())
    }

    fn validate(
        &mut self,
        leaves: &Leaves,
        removal: Removal,
        options: &SetOptions,
    ) -> Result<(), ValidationError> {
        let mut candidate = self.attributes.clone();
        for (path, value) in leaves {
            apply(&mut candidate, path, value.as_ref(), removal, options);
        }
        match self.hooks.validate(&candidate, options) {
            Ok(()) => {
                self.validation_error = None;
                Ok(())
            }
            Err(err) => {
                tracing::debug!(cid = %self.cid, error = %err, "set rejected by validation");
                self.validation_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn emit_attribute(&mut self, path: &str, options: &SetOptions) {
        let name = attribute_event(path);
        if !self.events.has_listeners(&name) {
            return;
        }
        let event = ModelEvent::Attribute {
            path: path.to_owned(),
            value: self.get(path).cloned(),
            options: options.clone(),
        };
        self.trigger(&name, &event);
    }

    fn emit_descendant(&mut self, ancestor: &str, options: &SetOptions) {
        let name = wildcard_event(ancestor);
        if !self.events.has_listeners(&name) {
            return;
        }
        let event = ModelEvent::Descendant {
            path: ancestor.to_owned(),
            value: self.get(ancestor).cloned(),
            options: options.clone(),
        };
        self.trigger(&name, &event);
    }

    /// True if anything changed in the last round.
    pub fn has_changed(&self) -> bool {
        !self.changed.is_empty()
    }

    /// True if the last round left a value at `path` in [`Changes`]: `path`
    /// was set, something below it changed, or it lies inside a value set for
    /// an ancestor. A removed path itself reports `false`; its ancestors
    /// report `true`.
    pub fn has_changed_path(&self, path: &str) -> bool {
        self.changed.contains(path)
    }

    pub fn changed(&self) -> &Changes {
        &self.changed
    }

    /// Without `diff`: the flat change set of the last round, `None` if empty.
    ///
    /// With a mapping `diff`: the leaf paths of `diff` whose values differ
    /// from the model (from the snapshot while a `set` is running), `None` if
    /// none do. Useful to tell whether a `set` would change anything.
    pub fn changed_attributes(
        &self,
        diff: Option<&Value>,
    ) -> Option<IndexMap<String, Option<Value>>> {
        let diff = match diff {
            None | Some(Value::Null) => {
                return (!self.changed.is_empty()).then(|| self.changed.to_flat());
            }
            Some(Value::Object(diff)) => diff,
            Some(_) => return None,
        };

        let base = if self.changing {
            self.previous_attributes.as_ref().unwrap_or(&self.attributes)
        } else {
            &self.attributes
        };
        let old = flatten(base);

        let changed: IndexMap<String, Option<Value>> = flatten(diff)
            .into_iter()
            .filter(|(path, value)| !deep_equal_opt(old.get(path), Some(value)))
            .map(|(path, value)| (path, Some(value)))
            .collect();
        (!changed.is_empty()).then_some(changed)
    }

    /// Value at `path` in the snapshot taken by the last outermost `set`.
    pub fn previous(&self, path: &str) -> Option<&Value> {
        self.previous_attributes
            .as_ref()
            .and_then(|prev| deep_model_path::get(prev, path))
    }

    /// Copy of the snapshot taken by the last outermost `set`.
    pub fn previous_attributes(&self) -> Option<Map<String, Value>> {
        self.previous_attributes.clone()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.attributes.clone())
    }

    pub fn on<F>(&mut self, name: impl Into<String>, handler: F) -> ListenerId
    where
        F: Fn(&mut DeepModel, &ModelEvent) + 'static,
    {
        self.events.on(name, Rc::new(handler))
    }

    pub fn once<F>(&mut self, name: impl Into<String>, handler: F) -> ListenerId
    where
        F: Fn(&mut DeepModel, &ModelEvent) + 'static,
    {
        self.events.once(name, Rc::new(handler))
    }

    pub fn off(&mut self, name: &str, id: ListenerId) -> bool {
        self.events.off(name, id)
    }

    pub fn off_all(&mut self, name: &str) -> usize {
        self.events.off_all(name)
    }

    pub fn events(&self) -> &ModelEvents {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut ModelEvents {
        &mut self.events
    }

    /// Dispatches `event` to the handlers registered under `name`.
    pub fn trigger(&mut self, name: &str, event: &ModelEvent) {
        for handler in self.events.dispatch_list(name) {
            handler(self, event);
        }
    }
}

/// What a removal does with the mappings it leaves empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Removal {
    Keep,
    Prune,
}

/// Writes or removes one leaf. Returns `false` if the path is not writable.
fn apply(
    attributes: &mut Map<String, Value>,
    path: &str,
    value: Option<&Value>,
    removal: Removal,
    options: &SetOptions,
) -> bool {
    match value {
        Some(value) if !options.unset => deep_model_path::set(attributes, path, value.clone()),
        _ => {
            match removal {
                Removal::Keep => deep_model_path::unset(attributes, path),
                Removal::Prune => deep_model_path::unset_pruned(attributes, path),
            };
            true
        }
    }
}

fn into_mapping(value: Value) -> Result<Map<String, Value>, ModelError> {
    match value {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        other => Err(ModelError::NotAMapping(kind_of(&other))),
    }
}

impl Serialize for DeepModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}

impl fmt::Debug for DeepModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepModel")
            .field("cid", &self.cid)
            .field("id", &self.id)
            .field("attributes", &self.attributes)
            .field("changed", &self.changed)
            .field("changing", &self.changing)
            .finish_non_exhaustive()
    }
}
