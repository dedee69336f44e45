use mocksmith_core::{
    BeanOverrides, FieldConfig, MockConfig, PropertyDescriptor, ScalarKind, StructDef, TypeCatalog,
    TypeDef, TypeRef, TypeRegistry,
};
use serde_json::json;

#[test]
fn catalog_reads_from_json() {
    let registry: TypeRegistry = serde_json::from_value(json!([
        {"struct": {
            "name": "User",
            "properties": [
                {"name": "id", "type": {"scalar": "i64"}},
                {"name": "tags", "type": {"list": {"scalar": "string"}}, "nullable": true},
                {"name": "secret", "type": {"scalar": "string"}, "visibility": "private"},
                {"name": "role", "type": {"named": {"name": "Role"}}}
            ],
            "constructor": ["id"]
        }},
        {"enum": {"name": "Role", "variants": ["Admin", "Guest"]}},
        {"abstract": {"name": "Shape"}}
    ]))
    .expect("parse catalog");

    assert_eq!(registry.len(), 3);
    let Some(TypeDef::Struct(user)) = registry.lookup("User") else {
        panic!("User should be a struct");
    };
    assert_eq!(user.constructor, vec!["id"]);
    let tags = user.find_property("tags").expect("tags");
    assert!(tags.nullable);
    assert_eq!(tags.ty, TypeRef::list(TypeRef::string()));
    assert!(matches!(registry.lookup("Shape"), Some(TypeDef::Abstract { .. })));
    assert!(registry.lookup("Missing").is_none());
}

#[test]
fn catalog_serializes_in_name_order() {
    let registry = TypeRegistry::new()
        .with(TypeDef::Enum(mocksmith_core::EnumDef {
            name: "Zeta".to_string(),
            variants: vec!["A".to_string()],
        }))
        .with(TypeDef::Abstract {
            name: "Alpha".to_string(),
        });
    let value = serde_json::to_value(&registry).expect("serialize");
    assert_eq!(
        value,
        json!([
            {"abstract": {"name": "Alpha"}},
            {"enum": {"name": "Zeta", "variants": ["A"]}}
        ])
    );
}

#[test]
fn generic_parameters_substitute_from_use_site() {
    let page = StructDef::new("Page")
        .type_param("T")
        .property(PropertyDescriptor::new("items", TypeRef::list(TypeRef::param("T"))))
        .property(PropertyDescriptor::new("extra", TypeRef::param("U")));
    let bindings = page.bindings(&[TypeRef::named("User")]);

    let items = page.find_property("items").expect("items");
    assert_eq!(
        items.ty.substitute(&bindings),
        TypeRef::list(TypeRef::named("User"))
    );
    let extra = page.find_property("extra").expect("extra");
    assert_eq!(extra.ty.substitute(&bindings), TypeRef::Any);
    assert_eq!(
        TypeRef::generic("Page", vec![TypeRef::scalar(ScalarKind::U8)]).to_string(),
        "Page<u8>"
    );
}

#[test]
fn bean_overrides_only_touch_set_fields() {
    let base = MockConfig::default().with_seed(3);
    let overridden = base.overridden(&BeanOverrides {
        include_private: Some(true),
        max_depth: Some(1),
        ..BeanOverrides::default()
    });
    assert!(overridden.include_private);
    assert!(!overridden.include_transient);
    assert_eq!(overridden.max_depth, 1);
    assert_eq!(overridden.seed, Some(3));
}

#[test]
fn placeholder_names_are_normalised() {
    assert_eq!(
        FieldConfig::with_placeholder("cname").placeholder_expression(),
        Some("@CNAME".to_string())
    );
    assert_eq!(
        FieldConfig::with_placeholder("@natural(1,5)").placeholder_expression(),
        Some("@natural(1,5)".to_string())
    );
    assert_eq!(FieldConfig::with_placeholder("  ").placeholder_expression(), None);
    assert!(!PropertyDescriptor::new("x", TypeRef::Any)
        .with_config(FieldConfig::disabled())
        .is_enabled());
}

#[test]
fn type_expressions_parse_back_from_display() {
    let ty: TypeRef = "Page<Map<string, List<i32>>>".parse().expect("parse");
    assert_eq!(
        ty,
        TypeRef::generic(
            "Page",
            vec![TypeRef::map(
                TypeRef::string(),
                TypeRef::list(TypeRef::scalar(ScalarKind::I32))
            )]
        )
    );
    assert_eq!(ty.to_string().parse::<TypeRef>().expect("round trip"), ty);

    assert_eq!("[uuid]".parse::<TypeRef>().expect("array").to_string(), "[uuid]");
    assert_eq!("any".parse::<TypeRef>().expect("any"), TypeRef::Any);
    assert_eq!(
        "Either::Right<string>".parse::<TypeRef>().expect("nested name"),
        TypeRef::generic("Either::Right", vec![TypeRef::string()])
    );
    assert!("Page<".parse::<TypeRef>().is_err());
    assert!("User>".parse::<TypeRef>().is_err());
    assert!("".parse::<TypeRef>().is_err());
}
