//! Named-event registry owned by a model.
//!
//! Event names used by [`DeepModel`](crate::DeepModel):
//!
//! - `change` after a round of mutations,
//! - `change:<path>` for every leaf path whose value changed,
//! - `change:<ancestor>.*` for every strict ancestor of such a path.

use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::options::SetOptions;

/// Name of the coalesced per-round event.
pub const CHANGE: &str = "change";

/// `change:<path>`
pub fn attribute_event(path: &str) -> String {
    format!("{CHANGE}:{path}")
}

/// `change:<path>.*`
pub fn wildcard_event(path: &str) -> String {
    format!("{CHANGE}:{path}.*")
}

/// Payload delivered to handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// The value at `path` changed; `value` is the value at emission time.
    Attribute {
        path: String,
        value: Option<Value>,
        options: SetOptions,
    },
    /// Something below `path` changed; `value` is the whole subtree.
    Descendant {
        path: String,
        value: Option<Value>,
        options: SetOptions,
    },
    /// One or more attributes changed during the round.
    Change { options: SetOptions },
}

impl ModelEvent {
    /// The name this event is dispatched under.
    pub fn name(&self) -> String {
        match self {
            ModelEvent::Attribute { path, .. } => attribute_event(path),
            ModelEvent::Descendant { path, .. } => wildcard_event(path),
            ModelEvent::Change { .. } => CHANGE.to_string(),
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            ModelEvent::Attribute { path, .. } | ModelEvent::Descendant { path, .. } => {
                Some(path.as_str())
            }
            ModelEvent::Change { .. } => None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            ModelEvent::Attribute { value, .. } | ModelEvent::Descendant { value, .. } => {
                value.as_ref()
            }
            ModelEvent::Change { .. } => None,
        }
    }

    pub fn options(&self) -> &SetOptions {
        match self {
            ModelEvent::Attribute { options, .. }
            | ModelEvent::Descendant { options, .. }
            | ModelEvent::Change { options } => options,
        }
    }
}

/// An event handler. It receives the emitter mutably, so it may mutate it
/// again while the event is being dispatched.
pub type Handler<M, E> = Rc<dyn Fn(&mut M, &E)>;

/// Token returned by [`EventBus::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener<M, E> {
    id: ListenerId,
    handler: Handler<M, E>,
    once: bool,
}

/// Handlers keyed by event name, called in registration order.
pub struct EventBus<M, E> {
    listeners: IndexMap<String, Vec<Listener<M, E>>>,
    next_id: u64,
}

impl<M, E> Default for EventBus<M, E> {
    fn default() -> Self {
        Self {
            listeners: IndexMap::new(),
            next_id: 1,
        }
    }
}

impl<M, E> EventBus<M, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, name: impl Into<String>, handler: Handler<M, E>) -> ListenerId {
        self.register(name.into(), handler, false)
    }

    /// Like [`EventBus::on`], but the handler is removed before its first call.
    pub fn once(&mut self, name: impl Into<String>, handler: Handler<M, E>) -> ListenerId {
        self.register(name.into(), handler, true)
    }

    fn register(&mut self, name: String, handler: Handler<M, E>, once: bool) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(name)
            .or_default()
            .push(Listener { id, handler, once });
        id
    }

    /// Removes one handler. Returns whether it was registered under `name`.
    pub fn off(&mut self, name: &str, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(name) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| l.id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.listeners.shift_remove(name);
        }
        removed
    }

    /// Removes every handler for `name` and returns how many there were.
    pub fn off_all(&mut self, name: &str) -> usize {
        self.listeners.shift_remove(name).map_or(0, |list| list.len())
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn has_listeners(&self, name: &str) -> bool {
        self.listeners.get(name).is_some_and(|list| !list.is_empty())
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map_or(0, Vec::len)
    }

    /// Handlers to call for one dispatch of `name`.
    ///
    /// The list is a snapshot: handlers added or removed while it is being
    /// walked take effect from the next dispatch. One-shot handlers are
    /// unregistered here.
    pub fn dispatch_list(&mut self, name: &str) -> Vec<Handler<M, E>> {
        let Some(list) = self.listeners.get_mut(name) else {
            return Vec::new();
        };
        let handlers = list.iter().map(|l| Rc::clone(&l.handler)).collect();
        list.retain(|l| !l.once);
        if list.is_empty() {
            self.listeners.shift_remove(name);
        }
        handlers
    }

    /// Calls every handler for `name` with `target` and `event`.
    pub fn emit(&mut self, target: &mut M, name: &str, event: &E) {
        for handler in self.dispatch_list(name) {
            handler(target, event);
        }
    }
}
