use mocksmith_core::{
    BeanOverrides, EnumDef, Error, FieldConfig, MockConfig, OpaqueDef, PropertyDescriptor,
    RuleSpec, ScalarKind, StructDef, TypeDef, TypeRef, TypeRegistry,
};
use mocksmith_introspect::{ContainerAdapter, ROOT_KEY, TypeIntrospector};
use serde_json::{Value, json};

fn scalar(name: &str, kind: ScalarKind) -> PropertyDescriptor {
    PropertyDescriptor::new(name, TypeRef::scalar(kind))
}

fn analyze(registry: &TypeRegistry, ty: &TypeRef, config: &MockConfig) -> Value {
    let containers = ContainerAdapter::with_builtins();
    TypeIntrospector::new(registry, &containers)
        .analyze(ty, config)
        .expect("analyze")
}

fn keys(template: &Value) -> Vec<String> {
    template
        .as_object()
        .expect("object template")
        .keys()
        .cloned()
        .collect()
}

#[test]
fn scalar_properties_use_type_templates() {
    let registry = TypeRegistry::new().with(TypeDef::Struct(
        StructDef::new("User")
            .property(scalar("id", ScalarKind::I64))
            .property(scalar("name", ScalarKind::String))
            .property(scalar("active", ScalarKind::Bool))
            .property(scalar("born", ScalarKind::Date))
            .property(scalar("key", ScalarKind::Uuid)),
    ));
    let template = analyze(&registry, &TypeRef::named("User"), &MockConfig::default());
    assert_eq!(
        template,
        json!({
            "id": "@natural(1,1000)",
            "name": "@word",
            "active": "@boolean",
            "born": "@date",
            "key": "@guid"
        })
    );
}

#[test]
fn hidden_properties_are_filtered_by_config() {
    let registry = TypeRegistry::new().with(TypeDef::Struct(
        StructDef::new("Account")
            .property(scalar("login", ScalarKind::String))
            .property(scalar("password", ScalarKind::String).private())
            .property(scalar("instances", ScalarKind::I32).static_())
            .property(scalar("cache", ScalarKind::String).transient())
            .property(scalar("skipped", ScalarKind::String).with_config(FieldConfig::disabled())),
    ));
    let ty = TypeRef::named("Account");

    assert_eq!(keys(&analyze(&registry, &ty, &MockConfig::default())), vec!["login"]);

    let config = MockConfig {
        include_private: true,
        include_static: true,
        include_transient: true,
        ..MockConfig::default()
    };
    assert_eq!(
        keys(&analyze(&registry, &ty, &config)),
        vec!["login", "password", "instances", "cache"]
    );
}

#[test]
fn configured_rules_are_encoded_into_keys() {
    let rule = |spec: RuleSpec| FieldConfig::with_rule(spec);
    let registry = TypeRegistry::new().with(TypeDef::Struct(
        StructDef::new("Order")
            .property(scalar("id", ScalarKind::I64).with_config(rule(RuleSpec {
                step: Some(1),
                count: Some(9),
                ..RuleSpec::default()
            })))
            .property(scalar("qty", ScalarKind::I32).with_config(rule(RuleSpec {
                min: Some(1),
                max: Some(10),
                ..RuleSpec::default()
            })))
            .property(scalar("price", ScalarKind::F64).with_config(rule(RuleSpec {
                min: Some(1),
                max: Some(100),
                dmin: Some(1),
                dmax: Some(2),
                ..RuleSpec::default()
            })))
            .property(scalar("code", ScalarKind::String).with_config(rule(RuleSpec {
                count: Some(3),
                ..RuleSpec::default()
            }))),
    ));
    let template = analyze(&registry, &TypeRef::named("Order"), &MockConfig::default());
    assert_eq!(
        template,
        json!({
            "id|+1": 1,
            "qty|1-10": 0,
            "price|1-100.1-2": 0.0,
            "code|3": "@word"
        })
    );
}

#[test]
fn placeholder_and_regex_metadata_replace_type_templates() {
    let registry = TypeRegistry::new().with(TypeDef::Struct(
        StructDef::new("Company")
            .property(
                scalar("name", ScalarKind::String)
                    .with_config(FieldConfig::with_placeholder("cname")),
            )
            .property(scalar("code", ScalarKind::String).with_config(FieldConfig {
                regex: Some("[A-Z]{3}".to_string()),
                ..FieldConfig::default()
            }))
            .property(
                scalar("founded", ScalarKind::Date)
                    .with_config(FieldConfig::with_placeholder("@name")),
            ),
    ));
    let template = analyze(&registry, &TypeRef::named("Company"), &MockConfig::default());
    assert_eq!(
        template,
        json!({"name": "@CNAME", "code": "/[A-Z]{3}/", "founded": "@date"})
    );
}

#[test]
fn collections_get_a_bounded_count_range() {
    let registry = TypeRegistry::new().with(TypeDef::Struct(
        StructDef::new("Bag")
            .property(PropertyDescriptor::new("tags", TypeRef::list(TypeRef::string())))
            .property(PropertyDescriptor::new("ids", TypeRef::set(TypeRef::scalar(ScalarKind::U32))))
            .property(
                PropertyDescriptor::new("one", TypeRef::list(TypeRef::string())).with_config(
                    FieldConfig::with_rule(RuleSpec {
                        count: Some(1),
                        ..RuleSpec::default()
                    }),
                ),
            ),
    ));
    let config = MockConfig {
        max_collection_size: 4,
        ..MockConfig::default()
    };
    let template = analyze(&registry, &TypeRef::named("Bag"), &config);
    assert_eq!(
        template,
        json!({
            "tags|1-4": ["@word"],
            "ids|1-4": ["@natural(1,100)"],
            "one|1-1": ["@word"]
        })
    );
}

#[test]
fn maps_become_entry_sequences() {
    let registry = TypeRegistry::new().with(TypeDef::Struct(StructDef::new("Index").property(
        PropertyDescriptor::new(
            "scores",
            TypeRef::map(TypeRef::string(), TypeRef::scalar(ScalarKind::I32)),
        ),
    )));
    let template = analyze(&registry, &TypeRef::named("Index"), &MockConfig::default());
    assert_eq!(
        template,
        json!({"scores|1-5": [{"key": "@word", "value": "@natural(1,100)"}]})
    );
}

#[test]
fn enums_pick_one_variant() {
    let registry = TypeRegistry::new()
        .with(TypeDef::Enum(EnumDef {
            name: "Role".to_string(),
            variants: vec!["Admin".to_string(), "Guest".to_string()],
        }))
        .with(TypeDef::Struct(
            StructDef::new("Member")
                .property(PropertyDescriptor::new("role", TypeRef::named("Role")))
                .property(PropertyDescriptor::new(
                    "history",
                    TypeRef::list(TypeRef::named("Role")),
                )),
        ));
    let template = analyze(&registry, &TypeRef::named("Member"), &MockConfig::default());
    assert_eq!(
        template,
        json!({
            "role|1": ["Admin", "Guest"],
            "history|1-5": ["@pick('Admin', 'Guest')"]
        })
    );
}

#[test]
fn recursive_types_stop_at_max_depth() {
    let registry = TypeRegistry::new()
        .with(TypeDef::Struct(
            StructDef::new("A")
                .property(scalar("name", ScalarKind::String))
                .property(PropertyDescriptor::new("b", TypeRef::named("B"))),
        ))
        .with(TypeDef::Struct(
            StructDef::new("B")
                .property(scalar("code", ScalarKind::I32))
                .property(PropertyDescriptor::new("a", TypeRef::named("A"))),
        ));
    let ty = TypeRef::named("A");

    let shallow = analyze(&registry, &ty, &MockConfig::default().with_max_depth(2));
    assert_eq!(
        shallow,
        json!({"name": "@word", "b": {"code": "@natural(1,100)", "a": null}})
    );

    let deeper = analyze(&registry, &ty, &MockConfig::default().with_max_depth(3));
    assert!(deeper["b"]["a"].is_object());
    assert_eq!(deeper["b"]["a"]["b"], Value::Null);

    let flat = analyze(&registry, &ty, &MockConfig::default().with_max_depth(1));
    assert_eq!(flat, json!({"name": "@word", "b": null}));
}

#[test]
fn bean_overrides_change_nested_visibility() {
    let registry = TypeRegistry::new()
        .with(TypeDef::Struct(
            StructDef::new("Secret")
                .property(scalar("label", ScalarKind::String))
                .property(scalar("token", ScalarKind::String).private()),
        ))
        .with(TypeDef::Struct(
            StructDef::new("Vault")
                .property(PropertyDescriptor::new("plain", TypeRef::named("Secret")))
                .property(
                    PropertyDescriptor::new("open", TypeRef::named("Secret")).with_bean(
                        BeanOverrides {
                            include_private: Some(true),
                            ..BeanOverrides::default()
                        },
                    ),
                ),
        ));
    let template = analyze(&registry, &TypeRef::named("Vault"), &MockConfig::default());
    assert_eq!(keys(&template["plain"]), vec!["label"]);
    assert_eq!(keys(&template["open"]), vec!["label", "token"]);
}

#[test]
fn type_level_overrides_apply_to_the_struct() {
    let registry = TypeRegistry::new().with(TypeDef::Struct(
        StructDef::new("Config")
            .property(scalar("host", ScalarKind::String))
            .property(scalar("port", ScalarKind::U16).static_())
            .with_bean(BeanOverrides {
                include_static: Some(true),
                ..BeanOverrides::default()
            }),
    ));
    let template = analyze(&registry, &TypeRef::named("Config"), &MockConfig::default());
    assert_eq!(keys(&template), vec!["host", "port"]);
}

#[test]
fn generic_arguments_are_substituted() {
    let registry = TypeRegistry::new()
        .with(TypeDef::Struct(
            StructDef::new("Page")
                .type_param("T")
                .property(scalar("total", ScalarKind::I64))
                .property(PropertyDescriptor::new("items", TypeRef::list(TypeRef::param("T")))),
        ))
        .with(TypeDef::Struct(
            StructDef::new("User").property(scalar("email", ScalarKind::String)),
        ));
    let ty = TypeRef::generic("Page", vec![TypeRef::named("User")]);
    let template = analyze(&registry, &ty, &MockConfig::default());
    assert_eq!(template["items|1-5"], json!([{"email": "@word"}]));

    let unbound = analyze(&registry, &TypeRef::named("Page"), &MockConfig::default());
    assert_eq!(unbound["items|1-5"], json!(["@word"]));
}

#[test]
fn containers_unwrap_to_their_inner_type() {
    let registry = TypeRegistry::new().with(TypeDef::Struct(
        StructDef::new("Profile")
            .property(PropertyDescriptor::new(
                "nickname",
                TypeRef::generic("Option", vec![TypeRef::string()]),
            ))
            .property(PropertyDescriptor::new(
                "events",
                TypeRef::generic("Stream", vec![TypeRef::scalar(ScalarKind::I32)]),
            ))
            .property(PropertyDescriptor::new(
                "outcome",
                TypeRef::generic(
                    "Either",
                    vec![TypeRef::string(), TypeRef::scalar(ScalarKind::Bool)],
                ),
            )),
    ));
    let template = analyze(&registry, &TypeRef::named("Profile"), &MockConfig::default());
    assert_eq!(
        template,
        json!({
            "nickname": "@word",
            "events|1-5": ["@natural(1,100)"],
            "outcome": "@boolean"
        })
    );
}

#[test]
fn non_struct_roots_are_wrapped() {
    let registry = TypeRegistry::new();
    let template = analyze(
        &registry,
        &TypeRef::list(TypeRef::string()),
        &MockConfig::default(),
    );
    assert_eq!(template, json!({"value|1-5": ["@word"]}));

    let scalar = analyze(&registry, &TypeRef::string(), &MockConfig::default());
    assert_eq!(scalar[ROOT_KEY], json!("@word"));
    assert_eq!(keys(&scalar), vec![ROOT_KEY]);
}

#[test]
fn opaque_types_use_their_fixed_template() {
    let registry = TypeRegistry::new()
        .with(TypeDef::Opaque(OpaqueDef {
            name: "Money".to_string(),
            template: json!({"amount|1-100": 1, "currency": "USD"}),
        }))
        .with(TypeDef::Struct(
            StructDef::new("Invoice").property(PropertyDescriptor::new("total", TypeRef::named("Money"))),
        ));
    let template = analyze(&registry, &TypeRef::named("Invoice"), &MockConfig::default());
    assert_eq!(template["total"], json!({"amount|1-100": 1, "currency": "USD"}));
}

#[test]
fn abstract_and_unknown_types_are_rejected() {
    let registry = TypeRegistry::new()
        .with(TypeDef::Abstract {
            name: "Shape".to_string(),
        })
        .with(TypeDef::Struct(
            StructDef::new("Canvas").property(PropertyDescriptor::new("shape", TypeRef::named("Shape"))),
        ))
        .with(TypeDef::Struct(
            StructDef::new("Broken").property(PropertyDescriptor::new("ghost", TypeRef::named("Ghost"))),
        ));
    let containers = ContainerAdapter::with_builtins();
    let introspector = TypeIntrospector::new(&registry, &containers);
    let config = MockConfig::default();

    assert!(matches!(
        introspector.analyze(&TypeRef::named("Canvas"), &config),
        Err(Error::UnsupportedType(name)) if name == "Shape"
    ));
    assert!(matches!(
        introspector.analyze(&TypeRef::named("Broken"), &config),
        Err(Error::UnknownType(name)) if name == "Ghost"
    ));
    assert!(matches!(
        introspector.analyze(&TypeRef::named("Shape"), &config),
        Err(Error::UnsupportedType(_))
    ));
}
