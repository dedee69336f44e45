//! Synthesizes rule templates from type descriptions.
//!
//! Structured types become mappings whose keys carry the same `name|rule`
//! grammar a hand-written template would use. Collections get a count range
//! bounded by `max_collection_size`; nested structs stop expanding once the
//! configured depth is reached and are replaced by `null`.

use std::sync::Arc;

use mocksmith_core::{
    Error, FieldConfig, MockConfig, PropertyDescriptor, Result, Rule, RuleParser, RuleSpec,
    ScalarKind, StructDef, Template, TypeCatalog, TypeDef, TypeRef, Visibility,
};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::container::{ContainerAdapter, ContainerAnalysis, ContainerBehavior, ContainerStrategy};

/// Key that carries the value when the analyzed type is not a struct.
pub const ROOT_KEY: &str = "value";

const ANY_TEMPLATE: &str = "@word";

/// Walks type definitions and produces equivalent templates.
pub struct TypeIntrospector<'a> {
    catalog: &'a dyn TypeCatalog,
    containers: &'a ContainerAdapter,
}

enum Resolved<'c> {
    Container(Arc<dyn ContainerStrategy>),
    Def(&'c TypeDef),
}

impl<'a> TypeIntrospector<'a> {
    pub fn new(catalog: &'a dyn TypeCatalog, containers: &'a ContainerAdapter) -> Self {
        Self {
            catalog,
            containers,
        }
    }

    /// Template for `ty`; structs become a mapping, anything else is wrapped under [`ROOT_KEY`].
    pub fn analyze(&self, ty: &TypeRef, config: &MockConfig) -> Result<Template> {
        if let Some(def) = struct_root(self.catalog, self.containers, ty) {
            return self.analyze_struct(def, type_args(ty), config, 0);
        }
        let (key, value) = self.entry(ROOT_KEY, ty, None, config, 0)?;
        let mut root = Map::new();
        root.insert(key, value);
        Ok(Value::Object(root))
    }

    /// Mapping template for one struct at `depth`; the root is depth 0.
    pub fn analyze_struct(
        &self,
        def: &StructDef,
        args: &[TypeRef],
        config: &MockConfig,
        depth: usize,
    ) -> Result<Template> {
        let config = match &def.bean {
            Some(overrides) => config.overridden(overrides),
            None => config.clone(),
        };
        let bindings = def.bindings(args);
        let mut template = Map::new();
        for property in def
            .properties
            .iter()
            .filter(|property| is_included(property, &config))
        {
            let ty = property.ty.substitute(&bindings);
            let (key, value) = self.entry(&property.name, &ty, Some(property), &config, depth + 1)?;
            template.insert(key, value);
        }
        Ok(Value::Object(template))
    }

    /// Key and value template for one property.
    ///
    /// `depth` is the level a struct value produced here would occupy.
    fn entry(
        &self,
        name: &str,
        ty: &TypeRef,
        property: Option<&PropertyDescriptor>,
        config: &MockConfig,
        depth: usize,
    ) -> Result<(String, Template)> {
        let field = property.and_then(|property| property.config.as_ref());
        let rule = field
            .and_then(|field| field.rule.as_ref())
            .and_then(RuleSpec::to_rule);

        match ty {
            TypeRef::Scalar(kind) => Ok(scalar_entry(name, *kind, field, rule)),
            TypeRef::List(inner) | TypeRef::Set(inner) | TypeRef::Array(inner) => {
                let element = self.value(inner, property, config, depth)?;
                Ok(collection_entry(name, element, rule, config))
            }
            TypeRef::Map(key, value) => {
                let entry = self.map_entry_template(key, value, config, depth)?;
                Ok(collection_entry(name, entry, rule, config))
            }
            TypeRef::Named {
                name: type_name,
                args,
            } => match self.resolve(type_name)? {
                Resolved::Container(strategy) => {
                    let behavior = strategy.behavior();
                    let inner = behavior.inner_type(args);
                    let analysis = ContainerAnalysis {
                        container: type_name,
                        inner: &inner,
                        property,
                        config,
                        depth,
                    };
                    if let Some(template) = strategy.analyze(&analysis) {
                        return Ok((name.to_string(), template?));
                    }
                    match behavior {
                        ContainerBehavior::SingleValue | ContainerBehavior::RightType => {
                            self.entry(name, &inner, property, config, depth)
                        }
                        ContainerBehavior::StreamValues => {
                            let element = self.value(&inner, property, config, depth)?;
                            Ok(collection_entry(name, element, rule, config))
                        }
                    }
                }
                Resolved::Def(TypeDef::Enum(def)) if !def.variants.is_empty() => {
                    let variants = def.variants.iter().cloned().map(Value::String).collect();
                    Ok((
                        RuleParser::encode(name, &Rule::Count(1)),
                        Value::Array(variants),
                    ))
                }
                Resolved::Def(_) => Ok((
                    name.to_string(),
                    self.value(ty, property, config, depth)?,
                )),
            },
            TypeRef::Param(_) | TypeRef::Any => {
                Ok((name.to_string(), Value::String(ANY_TEMPLATE.to_string())))
            }
        }
    }

    /// Keyless template, used for collection elements where no rule can be attached.
    fn value(
        &self,
        ty: &TypeRef,
        property: Option<&PropertyDescriptor>,
        config: &MockConfig,
        depth: usize,
    ) -> Result<Template> {
        let field = property.and_then(|property| property.config.as_ref());
        match ty {
            TypeRef::Scalar(kind) => Ok(scalar_value(*kind, field)),
            TypeRef::List(inner) | TypeRef::Set(inner) | TypeRef::Array(inner) => {
                Ok(Value::Array(vec![self.value(inner, property, config, depth)?]))
            }
            TypeRef::Map(key, value) => Ok(Value::Array(vec![
                self.map_entry_template(key, value, config, depth)?,
            ])),
            TypeRef::Named {
                name: type_name,
                args,
            } => match self.resolve(type_name)? {
                Resolved::Container(strategy) => {
                    let behavior = strategy.behavior();
                    let inner = behavior.inner_type(args);
                    let analysis = ContainerAnalysis {
                        container: type_name,
                        inner: &inner,
                        property,
                        config,
                        depth,
                    };
                    if let Some(template) = strategy.analyze(&analysis) {
                        return template;
                    }
                    let inner_value = self.value(&inner, property, config, depth)?;
                    Ok(match behavior {
                        ContainerBehavior::StreamValues => Value::Array(vec![inner_value]),
                        _ => inner_value,
                    })
                }
                Resolved::Def(TypeDef::Struct(def)) => {
                    self.nested_struct(def, args, property, config, depth)
                }
                Resolved::Def(TypeDef::Enum(def)) => Ok(enum_pick(&def.variants)),
                Resolved::Def(TypeDef::Opaque(def)) => Ok(def.template.clone()),
                Resolved::Def(TypeDef::Abstract { name }) => Err(Error::UnsupportedType(name.clone())),
            },
            TypeRef::Param(_) | TypeRef::Any => Ok(Value::String(ANY_TEMPLATE.to_string())),
        }
    }

    fn nested_struct(
        &self,
        def: &StructDef,
        args: &[TypeRef],
        property: Option<&PropertyDescriptor>,
        config: &MockConfig,
        depth: usize,
    ) -> Result<Template> {
        let config = match property.and_then(|property| property.bean.as_ref()) {
            Some(overrides) => config.overridden(overrides),
            None => config.clone(),
        };
        if depth > 0 && depth >= config.max_depth {
            debug!(type_name = %def.name, depth, "depth limit reached, nested struct left empty");
            return Ok(Value::Null);
        }
        self.analyze_struct(def, args, &config, depth)
    }

    fn map_entry_template(
        &self,
        key: &TypeRef,
        value: &TypeRef,
        config: &MockConfig,
        depth: usize,
    ) -> Result<Template> {
        Ok(json!({
            "key": self.value(key, None, config, depth)?,
            "value": self.value(value, None, config, depth)?,
        }))
    }

    fn resolve(&self, type_name: &str) -> Result<Resolved<'a>> {
        if let Some(strategy) = self.containers.lookup(type_name) {
            return Ok(Resolved::Container(strategy));
        }
        match self.catalog.lookup(type_name) {
            Some(TypeDef::Abstract { name }) => Err(Error::UnsupportedType(name.clone())),
            Some(def) => Ok(Resolved::Def(def)),
            None => Err(Error::UnknownType(type_name.to_string())),
        }
    }
}

/// Whether `property` takes part in generation under `config`.
pub fn is_included(property: &PropertyDescriptor, config: &MockConfig) -> bool {
    property.is_enabled()
        && (property.visibility == Visibility::Public || config.include_private)
        && (!property.is_static || config.include_static)
        && (!property.is_transient || config.include_transient)
}

/// Struct definition when `ty` names a catalog struct directly rather than through a container.
pub fn struct_root<'c>(
    catalog: &'c dyn TypeCatalog,
    containers: &ContainerAdapter,
    ty: &TypeRef,
) -> Option<&'c StructDef> {
    let TypeRef::Named { name, .. } = ty else {
        return None;
    };
    if containers.is_container_type(name) {
        return None;
    }
    match catalog.lookup(name) {
        Some(TypeDef::Struct(def)) => Some(def),
        _ => None,
    }
}

pub(crate) fn type_args(ty: &TypeRef) -> &[TypeRef] {
    match ty {
        TypeRef::Named { args, .. } => args,
        _ => &[],
    }
}

fn scalar_value(kind: ScalarKind, field: Option<&FieldConfig>) -> Template {
    if let Some(field) = field
        && kind.supports_placeholder()
    {
        if let Some(expression) = field.placeholder_expression() {
            return Value::String(expression);
        }
        if let Some(pattern) = field.regex.as_deref().filter(|pattern| !pattern.is_empty()) {
            return Value::String(format!("/{pattern}/"));
        }
    }
    Value::String(kind.default_template().to_string())
}

fn scalar_entry(
    name: &str,
    kind: ScalarKind,
    field: Option<&FieldConfig>,
    rule: Option<Rule>,
) -> (String, Template) {
    let value = scalar_value(kind, field);
    let Some(rule) = rule else {
        return (name.to_string(), value);
    };
    let configured = field.is_some_and(|field| {
        field.placeholder_expression().is_some() || field.regex.is_some()
    });
    let literal = if configured || matches!(kind, ScalarKind::String | ScalarKind::Char) {
        value
    } else if kind.is_integer() {
        Value::from(if rule.is_increment() { 1 } else { 0 })
    } else if kind.is_float() {
        json!(if rule.is_increment() { 1.0 } else { 0.0 })
    } else if kind == ScalarKind::Bool {
        Value::Bool(true)
    } else {
        debug!(property = name, %kind, %rule, "rule ignored for temporal property");
        return (name.to_string(), value);
    };
    (RuleParser::encode(name, &rule), literal)
}

fn collection_entry(
    name: &str,
    element: Template,
    rule: Option<Rule>,
    config: &MockConfig,
) -> (String, Template) {
    let max = i64::try_from(config.max_collection_size).unwrap_or(i64::MAX);
    let rule = match rule {
        // a count of one would collapse the sequence into a single pick
        Some(Rule::Count(count)) => {
            let count = i64::try_from(count).unwrap_or(i64::MAX);
            Rule::Range(count, count)
        }
        Some(rule @ Rule::Range(..)) => rule,
        Some(other) => {
            debug!(property = name, rule = %other, "rule not applicable to a collection");
            Rule::Range(max.min(1), max)
        }
        None => Rule::Range(max.min(1), max),
    };
    (RuleParser::encode(name, &rule), Value::Array(vec![element]))
}

fn enum_pick(variants: &[String]) -> Template {
    if variants.is_empty() {
        return Value::Null;
    }
    let quoted: Vec<String> = variants.iter().map(|variant| format!("'{variant}'")).collect();
    Value::String(format!("@pick({})", quoted.join(", ")))
}
