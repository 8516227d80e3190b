use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::hooks::ModelHooks;

/// Flags accepted by every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetOptions {
    /// Remove each targeted path instead of assigning it.
    pub unset: bool,
    /// Suppress every event for this call.
    pub silent: bool,
    /// Run [`ModelHooks::validate`] against the candidate attributes first.
    pub validate: bool,
}

impl SetOptions {
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::default()
        }
    }

    pub fn validated() -> Self {
        Self {
            validate: true,
            ..Self::default()
        }
    }

    /// Copy of these options with `unset` forced on.
    pub fn with_unset(&self) -> Self {
        Self {
            unset: true,
            ..self.clone()
        }
    }
}

/// Construction-time options.
#[derive(Clone, Default)]
pub struct ModelOptions {
    /// Owning collection. Held weakly; the model never keeps it alive.
    pub collection: Option<Weak<dyn Any>>,
    /// Pass the attributes through [`ModelHooks::parse`] first.
    pub parse: bool,
    /// Model behaviour; [`PlainModel`](crate::PlainModel) when absent.
    pub hooks: Option<Rc<dyn ModelHooks>>,
    pub config: ModelConfig,
}

impl ModelOptions {
    pub fn with_hooks(mut self, hooks: impl ModelHooks + 'static) -> Self {
        self.hooks = Some(Rc::new(hooks));
        self
    }

    pub fn with_collection(mut self, collection: &Rc<dyn Any>) -> Self {
        self.collection = Some(Rc::downgrade(collection));
        self
    }

    pub fn with_config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn parsed(mut self) -> Self {
        self.parse = true;
        self
    }
}

impl fmt::Debug for ModelOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelOptions")
            .field("collection", &self.collection.is_some())
            .field("parse", &self.parse)
            .field("hooks", &self.hooks.is_some())
            .field("config", &self.config)
            .finish()
    }
}
