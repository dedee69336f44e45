use std::sync::Arc;

use mocksmith_core::{
    Instance, MockConfig, PropertyDescriptor, ScalarKind, StructDef, TypeDef, TypeRef,
    TypeRegistry,
};
use mocksmith_introspect::{
    Analyzer, ContainerAdapter, ContainerAnalysis, ContainerBehavior, ContainerStrategy, Mapper,
    Mocker,
};
use serde_json::{Value, json};

fn lazy_registry() -> TypeRegistry {
    TypeRegistry::new().with(TypeDef::Struct(
        StructDef::new("Holder").property(PropertyDescriptor::new(
            "cell",
            TypeRef::generic("Deferred", vec![TypeRef::scalar(ScalarKind::I32)]),
        )),
    ))
}

#[test]
fn builtin_prefixes_are_registered() {
    let adapter = ContainerAdapter::with_builtins();
    for prefix in ["Option", "Future", "Supplier", "Stream", "Either"] {
        assert!(adapter.registered_prefixes().contains(prefix), "{prefix}");
    }
    assert_eq!(
        adapter.get_container_behavior("Option"),
        Some(ContainerBehavior::SingleValue)
    );
    assert_eq!(
        adapter.get_container_behavior("Stream"),
        Some(ContainerBehavior::StreamValues)
    );
    assert_eq!(
        adapter.get_container_behavior("Either"),
        Some(ContainerBehavior::RightType)
    );
    assert_eq!(adapter.get_container_behavior("Option.Some"), None);
    assert!(ContainerAdapter::empty().registered_prefixes().is_empty());
}

#[test]
fn registration_replaces_and_unregister_removes() {
    let adapter = ContainerAdapter::with_builtins();
    adapter.register("Option", ContainerBehavior::StreamValues, None, None);
    assert_eq!(
        adapter.get_container_behavior("Option"),
        Some(ContainerBehavior::StreamValues)
    );

    assert!(adapter.unregister("Option"));
    assert!(!adapter.unregister("Option"));
    assert!(!adapter.is_container_type("Option"));
    assert!(!adapter.is_container_type("Option::Some"));
}

#[test]
fn registered_containers_unwrap_during_mocking() {
    let mocker = Mocker::new().scoped();
    mocker
        .containers()
        .register("Deferred", ContainerBehavior::SingleValue, None, None);

    let instance = mocker
        .mock_type(
            &lazy_registry(),
            &TypeRef::named("Holder"),
            &MockConfig::default().with_seed(3),
        )
        .expect("mock");
    let Some(Instance::Wrapped { container, value }) = instance.field("cell") else {
        panic!("cell should be wrapped: {instance:?}");
    };
    assert_eq!(container, "Deferred");
    assert!(matches!(value.as_ref(), Instance::Int(n) if (1..=100).contains(n)));
}

#[test]
fn analyzer_hooks_supply_the_template() {
    let mocker = Mocker::new().scoped();
    let analyzer: Analyzer = Arc::new(|analysis: &ContainerAnalysis<'_>| -> mocksmith_core::Result<Value> {
        assert_eq!(analysis.container, "Deferred");
        assert_eq!(analysis.inner, &TypeRef::scalar(ScalarKind::I32));
        Ok(json!("@natural(40,40)"))
    });
    mocker.containers().register(
        "Deferred",
        ContainerBehavior::SingleValue,
        Some(analyzer),
        None,
    );

    let template = mocker
        .template_for(&lazy_registry(), &TypeRef::named("Holder"), &MockConfig::default())
        .expect("template");
    assert_eq!(template, json!({"cell": "@natural(40,40)"}));

    let instance = mocker
        .mock_type(&lazy_registry(), &TypeRef::named("Holder"), &MockConfig::default())
        .expect("mock");
    let Some(Instance::Wrapped { value, .. }) = instance.field("cell") else {
        panic!("cell should be wrapped");
    };
    assert_eq!(value.as_ref(), &Instance::Int(40));
}

#[test]
fn mapper_hooks_build_the_instance() {
    let mocker = Mocker::new().scoped();
    let mapper: Mapper = Arc::new(
        |value: &Value, target: &TypeRef, _config: &MockConfig| -> mocksmith_core::Result<Instance> {
            Ok(Instance::Json(json!({"deferred": value, "type": target.to_string()})))
        },
    );
    mocker.containers().register(
        "Deferred",
        ContainerBehavior::SingleValue,
        None,
        Some(mapper),
    );

    let instance = mocker
        .mock_type(
            &lazy_registry(),
            &TypeRef::named("Holder"),
            &MockConfig::default().with_seed(9),
        )
        .expect("mock");
    let Some(Instance::Json(mapped)) = instance.field("cell") else {
        panic!("cell should come from the mapper");
    };
    assert_eq!(mapped["type"], json!("Deferred<i32>"));
    assert!(mapped["deferred"].is_i64());
}

struct Pair;

impl ContainerStrategy for Pair {
    fn behavior(&self) -> ContainerBehavior {
        ContainerBehavior::RightType
    }

    fn analyze(&self, _analysis: &ContainerAnalysis<'_>) -> Option<mocksmith_core::Result<Value>> {
        Some(Ok(json!(["left", "right"])))
    }
}

#[test]
fn custom_strategies_can_be_registered_directly() {
    let adapter = ContainerAdapter::empty();
    adapter.register_strategy("Pair", Arc::new(Pair));
    assert!(adapter.is_container_type("Pair$Inner"));

    let registry = TypeRegistry::new().with(TypeDef::Struct(StructDef::new("Duo").property(
        PropertyDescriptor::new(
            "pair",
            TypeRef::generic("Pair", vec![TypeRef::string(), TypeRef::string()]),
        ),
    )));
    let template = mocksmith_introspect::TypeIntrospector::new(&registry, &adapter)
        .analyze(&TypeRef::named("Duo"), &MockConfig::default())
        .expect("template");
    assert_eq!(template, json!({"pair": ["left", "right"]}));
}

#[test]
fn scoped_registrations_stay_local() {
    let parent = Mocker::new();
    let child = parent.scoped();
    child
        .containers()
        .register("Deferred", ContainerBehavior::SingleValue, None, None);

    assert!(child.containers().is_container_type("Deferred"));
    assert!(!parent.containers().is_container_type("Deferred"));
    assert!(child.containers().is_container_type("Option"));
}
