#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use deep_model::{DeepModel, ModelEvent};
use serde_json::Value;

/// Events seen by a [`record`]ed model: dispatch name and carried value.
pub type EventLog = Rc<RefCell<Vec<(String, Option<Value>)>>>;

/// Routes library logs to the test output; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn model(attributes: Value) -> DeepModel {
    init_tracing();
    DeepModel::new(attributes).expect("attributes are a mapping")
}

/// Subscribes a recorder to every name in `names`, sharing one log.
pub fn record(model: &mut DeepModel, names: &[&str]) -> EventLog {
    let log: EventLog = Rc::default();
    for name in names {
        let log = Rc::clone(&log);
        let dispatched = name.to_string();
        model.on(*name, move |_: &mut DeepModel, event: &ModelEvent| {
            log.borrow_mut()
                .push((dispatched.clone(), event.value().cloned()));
        });
    }
    log
}

/// Names only, in dispatch order.
pub fn names(log: &EventLog) -> Vec<String> {
    log.borrow().iter().map(|(name, _)| name.clone()).collect()
}
