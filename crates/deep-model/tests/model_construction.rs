mod common;

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use common::init_tracing;
use deep_model::{
    DeepModel, ModelConfig, ModelError, ModelHooks, ModelOptions, SetOptions, ValidationError,
};
use serde_json::{json, Map, Value};

fn mapping(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected mapping, got {other}"),
    }
}

struct NetworkGroup;

impl ModelHooks for NetworkGroup {
    fn defaults(&self) -> Map<String, Value> {
        mapping(json!({"net": {"vlan": [1, 2], "mtu": 1500}, "name": "default"}))
    }

    fn validate(
        &self,
        candidate: &Map<String, Value>,
        _options: &SetOptions,
    ) -> Result<(), ValidationError> {
        let Some(vlan) = candidate.get("vlan_id") else {
            return Ok(());
        };
        match vlan.as_u64() {
            Some(1..=4094) => Ok(()),
            _ => Err(ValidationError::at("vlan_id", "vlan id out of range")),
        }
    }
}

fn network(attributes: Value) -> DeepModel {
    init_tracing();
    DeepModel::with_options(attributes, ModelOptions::default().with_hooks(NetworkGroup))
        .expect("attributes are a mapping")
}

#[test]
fn defaults_merge_under_attributes() {
    let m = network(json!({"net": {"vlan": [2, 3]}, "name": "storage"}));
    assert_eq!(
        m.to_json(),
        json!({"net": {"vlan": [1, 2, 3], "mtu": 1500}, "name": "storage"})
    );
}

#[test]
fn defaults_are_not_shared_between_models() {
    let mut a = network(Value::Null);
    let b = network(Value::Null);
    a.set_path("net.mtu", json!(9000), SetOptions::default())
        .expect("set");
    assert_eq!(b.get("net.mtu"), Some(&json!(1500)));
}

#[test]
fn construction_starts_with_a_clean_change_set() {
    let m = network(json!({"name": "public"}));
    assert!(!m.has_changed());
    assert_eq!(m.previous_attributes(), Some(Map::new()));
    assert!(!m.is_changing());
}

#[test]
fn merge_depth_comes_from_config() {
    init_tracing();
    let build = |depth: usize| {
        let config = ModelConfig {
            max_merge_depth: depth,
            ..ModelConfig::default()
        };
        let options = ModelOptions::default()
            .with_hooks(NetworkGroup)
            .with_config(config);
        DeepModel::with_options(json!({"net": {"vlan": [2, 3]}}), options)
            .expect("model")
            .to_json()
    };

    assert_eq!(build(0), json!({"net": {"vlan": [2, 3]}, "name": "default"}));
    assert_eq!(
        build(1),
        json!({"net": {"vlan": [2, 3], "mtu": 1500}, "name": "default"})
    );
    assert_eq!(
        build(2),
        json!({"net": {"vlan": [1, 2, 3], "mtu": 1500}, "name": "default"})
    );
}

#[test]
fn cid_prefix_comes_from_config() {
    init_tracing();
    let config = ModelConfig::from_toml_str("cid_prefix = \"node\"").expect("config");
    let m = DeepModel::with_options(Value::Null, ModelOptions::default().with_config(config))
        .expect("model");
    assert!(m.cid().starts_with("node"));
    assert_eq!(m.config().max_merge_depth, 20);
}

struct Envelope;

impl ModelHooks for Envelope {
    fn parse(&self, attributes: Value, _options: &ModelOptions) -> Option<Value> {
        attributes.get("data").cloned()
    }
}

#[test]
fn parse_runs_only_when_requested() {
    init_tracing();
    let raw = json!({"data": {"status": "ready"}, "meta": {"total": 1}});

    let parsed = DeepModel::with_options(
        raw.clone(),
        ModelOptions::default().with_hooks(Envelope).parsed(),
    )
    .expect("model");
    assert_eq!(parsed.to_json(), json!({"status": "ready"}));

    let verbatim =
        DeepModel::with_options(raw.clone(), ModelOptions::default().with_hooks(Envelope))
            .expect("model");
    assert_eq!(verbatim.to_json(), raw);
}

#[test]
fn parse_returning_nothing_yields_empty_model() {
    init_tracing();
    let m = DeepModel::with_options(
        json!({"meta": {}}),
        ModelOptions::default().with_hooks(Envelope).parsed(),
    )
    .expect("model");
    assert_eq!(m.to_json(), json!({}));
}

#[test]
fn parse_output_must_be_a_mapping() {
    init_tracing();
    let err = DeepModel::with_options(
        json!({"data": [1, 2]}),
        ModelOptions::default().with_hooks(Envelope).parsed(),
    )
    .unwrap_err();
    assert_eq!(err, ModelError::NotAMapping("array"));
}

#[derive(Default)]
struct Recorder {
    seen: Rc<RefCell<Option<(Value, bool)>>>,
}

impl ModelHooks for Recorder {
    fn parse(&self, attributes: Value, _options: &ModelOptions) -> Option<Value> {
        attributes.get("data").cloned()
    }

    fn initialize(&self, model: &mut DeepModel, attributes: &Value, options: &ModelOptions) {
        *self.seen.borrow_mut() = Some((attributes.clone(), options.parse));
        model
            .set_path("ready", json!(true), SetOptions::silent())
            .expect("initial flag");
    }
}

#[test]
fn initialize_sees_the_original_arguments() {
    init_tracing();
    let hooks = Recorder::default();
    let seen = Rc::clone(&hooks.seen);
    let raw = json!({"data": {"a": 1}});

    let options = ModelOptions::default().with_hooks(hooks).parsed();
    let m = DeepModel::with_options(raw.clone(), options).expect("model");

    assert_eq!(*seen.borrow(), Some((raw, true)));
    assert_eq!(m.to_json(), json!({"a": 1, "ready": true}));
}

#[test]
fn collection_is_held_weakly() {
    init_tracing();
    let collection: Rc<dyn Any> = Rc::new(RefCell::new(vec!["node-1".to_string()]));
    let m = DeepModel::with_options(
        Value::Null,
        ModelOptions::default().with_collection(&collection),
    )
    .expect("model");

    let owner = m
        .collection()
        .and_then(|c| c.downcast::<RefCell<Vec<String>>>().ok())
        .expect("collection alive");
    assert_eq!(owner.borrow().len(), 1);
    drop(owner);

    drop(collection);
    assert!(m.collection().is_none());
}

#[test]
fn construction_does_not_validate() {
    let m = network(json!({"vlan_id": 5000}));
    assert_eq!(m.get("vlan_id"), Some(&json!(5000)));
    assert_eq!(m.validation_error(), None);
}

#[test]
fn rejected_validated_set_changes_nothing() {
    let mut m = network(json!({"vlan_id": 100}));
    let log = common::record(&mut m, &["change", "change:vlan_id"]);

    let err = m
        .set_path("vlan_id", json!(5000), SetOptions::validated())
        .unwrap_err();

    let expected = ValidationError::at("vlan_id", "vlan id out of range");
    assert_eq!(err, ModelError::Invalid(expected.clone()));
    assert_eq!(err.to_string(), "validation failed: vlan id out of range");
    assert_eq!(m.validation_error(), Some(&expected));
    assert_eq!(m.get("vlan_id"), Some(&json!(100)));
    assert!(!m.has_changed());
    assert!(common::names(&log).is_empty());
}

#[test]
fn accepted_validated_set_clears_previous_rejection() {
    let mut m = network(json!({"vlan_id": 100}));
    assert!(m
        .set_path("vlan_id", json!(0), SetOptions::validated())
        .is_err());
    assert!(m.validation_error().is_some());

    m.set_path("vlan_id", json!(200), SetOptions::validated())
        .expect("valid");
    assert_eq!(m.validation_error(), None);
    assert_eq!(m.get("vlan_id"), Some(&json!(200)));
}

#[test]
fn unvalidated_set_skips_the_hook() {
    let mut m = network(Value::Null);
    m.set_path("vlan_id", json!(5000), SetOptions::default())
        .expect("unchecked");
    assert_eq!(m.get("vlan_id"), Some(&json!(5000)));
}

struct RequiresName;

impl ModelHooks for RequiresName {
    fn validate(
        &self,
        candidate: &Map<String, Value>,
        _options: &SetOptions,
    ) -> Result<(), ValidationError> {
        if candidate.contains_key("name") {
            Ok(())
        } else {
            Err(ValidationError::new("name is required"))
        }
    }
}

#[test]
fn validated_unset_checks_the_result_of_removal() {
    init_tracing();
    let mut m = DeepModel::with_options(
        json!({"name": "node-1", "roles": ["compute"]}),
        ModelOptions::default().with_hooks(RequiresName),
    )
    .expect("model");

    assert!(m.unset("name", SetOptions::validated()).is_err());
    assert_eq!(m.get("name"), Some(&json!("node-1")));

    m.unset("roles", SetOptions::validated()).expect("name kept");
    assert!(!m.has("roles"));
}
