//! Maps generated trees onto declared types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use mocksmith_core::{
    EnumDef, Error, FillStrategy, GeneratedTree, Instance, LengthSpec, MockConfig,
    PropertyDescriptor, Result, ScalarKind, StructDef, TypeCatalog, TypeDef, TypeRef,
};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::coercion::CoercionRegistry;
use crate::container::{ContainerAdapter, ContainerBehavior};
use crate::introspector::{ROOT_KEY, is_included, struct_root};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M:%S%.f", "%H:%M"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

/// Builds typed instances from generated trees.
pub struct BeanMapper<'a> {
    catalog: &'a dyn TypeCatalog,
    containers: &'a ContainerAdapter,
    coercions: &'a CoercionRegistry,
}

impl<'a> BeanMapper<'a> {
    pub fn new(
        catalog: &'a dyn TypeCatalog,
        containers: &'a ContainerAdapter,
        coercions: &'a CoercionRegistry,
    ) -> Self {
        Self {
            catalog,
            containers,
            coercions,
        }
    }

    /// Instance of `ty` from a tree produced for the template of the same type.
    pub fn map(&self, tree: &GeneratedTree, ty: &TypeRef, config: &MockConfig) -> Result<Instance> {
        if struct_root(self.catalog, self.containers, ty).is_some() {
            return self.map_value(Some(tree), ty, None, config, "");
        }
        self.map_value(tree.get(ROOT_KEY), ty, None, config, ROOT_KEY)
    }

    fn map_value(
        &self,
        value: Option<&Value>,
        ty: &TypeRef,
        property: Option<&PropertyDescriptor>,
        config: &MockConfig,
        path: &str,
    ) -> Result<Instance> {
        let default = property.and_then(|property| property.default.as_ref());
        let value = match value {
            Some(value) if value.is_null() && !self.accepts_null(ty, property) => match default {
                Some(default) if !default.is_null() => default,
                _ if self.templated_as_null(ty) => return self.zero_value(ty),
                _ => return Err(Error::coercion(path, ty.to_string(), value)),
            },
            Some(value) => value,
            None => match default {
                Some(default) => default,
                None => return self.zero_value(ty),
            },
        };

        if let Some(coercion) = self.coercions.get(&type_key(ty)) {
            return coercion(value).ok_or_else(|| Error::coercion(path, ty.to_string(), value));
        }
        if value.is_null() {
            return Ok(Instance::Null);
        }

        let length = property
            .and_then(|property| property.config.as_ref())
            .and_then(|field| field.length);

        match ty {
            TypeRef::Scalar(kind) => {
                let instance = coerce_scalar(value, *kind, path)?;
                Ok(match instance {
                    Instance::Text(text) => Instance::Text(fit_text(text, length, config)),
                    other => other,
                })
            }
            TypeRef::List(inner) | TypeRef::Array(inner) => {
                let items = self.map_items(value, inner, config, path)?;
                Ok(Instance::List(fit_items(items, length)))
            }
            TypeRef::Set(inner) => {
                let mut items: Vec<Instance> = Vec::new();
                for item in self.map_items(value, inner, config, path)? {
                    if !items.contains(&item) {
                        items.push(item);
                    }
                }
                Ok(Instance::Set(fit_items(items, length.map(truncating))))
            }
            TypeRef::Map(key, inner) => self.map_map(value, key, inner, config, path),
            TypeRef::Named { name, args } => {
                self.map_named(value, ty, name, args, property, config, path)
            }
            TypeRef::Param(_) | TypeRef::Any => Ok(Instance::Json(value.clone())),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn map_named(
        &self,
        value: &Value,
        ty: &TypeRef,
        name: &str,
        args: &[TypeRef],
        property: Option<&PropertyDescriptor>,
        config: &MockConfig,
        path: &str,
    ) -> Result<Instance> {
        if let Some(strategy) = self.containers.lookup(name) {
            if let Some(mapped) = strategy.map(value, ty, config) {
                return mapped;
            }
            let behavior = strategy.behavior();
            let inner = behavior.inner_type(args);
            return Ok(match behavior {
                ContainerBehavior::StreamValues => Instance::Stream {
                    container: name.to_string(),
                    items: self.map_items(value, &inner, config, path)?,
                },
                ContainerBehavior::SingleValue | ContainerBehavior::RightType => Instance::Wrapped {
                    container: name.to_string(),
                    value: Box::new(self.map_value(Some(value), &inner, property, config, path)?),
                },
            });
        }

        match self.catalog.lookup(name) {
            Some(TypeDef::Struct(def)) => self.map_struct(value, def, args, config, path),
            Some(TypeDef::Enum(def)) => coerce_enum(value, def, path),
            Some(TypeDef::Opaque(_)) => Ok(Instance::Json(value.clone())),
            Some(TypeDef::Abstract { name }) => Err(Error::UnsupportedType(name.clone())),
            None => Err(Error::UnknownType(name.to_string())),
        }
    }

    fn map_struct(
        &self,
        value: &Value,
        def: &StructDef,
        args: &[TypeRef],
        config: &MockConfig,
        path: &str,
    ) -> Result<Instance> {
        let Value::Object(tree) = value else {
            return Err(Error::coercion(path, &def.name, value));
        };
        let config = match &def.bean {
            Some(overrides) => config.overridden(overrides),
            None => config.clone(),
        };
        for param in &def.constructor {
            if def.find_property(param).is_none() {
                return Err(Error::InvalidConfig(format!(
                    "constructor parameter '{param}' of {} has no matching property",
                    def.name
                )));
            }
        }

        let bindings = def.bindings(args);
        let mut fields = Vec::with_capacity(def.properties.len());
        for property in &def.properties {
            let required = def.constructor.iter().any(|param| *param == property.name);
            if !required && !is_included(property, &config) {
                continue;
            }
            let ty = property.ty.substitute(&bindings);
            let child_path = join_path(path, &property.name);
            let field_value = lookup_key(tree, &property.name);
            let config = match &property.bean {
                Some(overrides) => config.overridden(overrides),
                None => config.clone(),
            };
            let instance = self.map_value(field_value, &ty, Some(property), &config, &child_path)?;
            fields.push((property.name.clone(), instance));
        }
        Ok(Instance::Struct {
            type_name: def.name.clone(),
            fields,
        })
    }

    fn map_items(
        &self,
        value: &Value,
        inner: &TypeRef,
        config: &MockConfig,
        path: &str,
    ) -> Result<Vec<Instance>> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    self.map_value(Some(item), inner, None, config, &format!("{path}[{index}]"))
                })
                .collect(),
            single => Ok(vec![self.map_value(Some(single), inner, None, config, path)?]),
        }
    }

    fn map_map(
        &self,
        value: &Value,
        key: &TypeRef,
        inner: &TypeRef,
        config: &MockConfig,
        path: &str,
    ) -> Result<Instance> {
        let pairs: Vec<(Value, Option<&Value>)> = match value {
            Value::Array(entries) => entries
                .iter()
                .filter_map(|entry| {
                    let entry = entry.as_object()?;
                    Some((entry.get("key")?.clone(), entry.get("value")))
                })
                .collect(),
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| (Value::String(key.clone()), Some(value)))
                .collect(),
            other => return Err(Error::coercion(path, "map", other)),
        };

        let mut entries: Vec<(Instance, Instance)> = Vec::with_capacity(pairs.len());
        for (raw_key, raw_value) in pairs {
            let child_path = format!("{path}[{}]", render(&raw_key));
            let key = self.map_value(Some(&raw_key), key, None, config, &child_path)?;
            let value = self.map_value(raw_value, inner, None, config, &child_path)?;
            match entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
        Ok(Instance::Map(entries))
    }

    /// Value for a property the tree does not mention and that has no default.
    /// Whether a literal null may be kept for this slot. Collection elements and roots carry no
    /// property and keep nulls; wrappers and custom coercions decide for themselves.
    fn accepts_null(&self, ty: &TypeRef, property: Option<&PropertyDescriptor>) -> bool {
        if property.is_none_or(|property| property.nullable) {
            return true;
        }
        if self.coercions.contains(&type_key(ty)) {
            return true;
        }
        match ty {
            TypeRef::Param(_) | TypeRef::Any => true,
            TypeRef::Named { name, .. } => self.containers.lookup(name).is_some(),
            _ => false,
        }
    }

    /// Depth-truncated structs and variant-less enums are templated as null.
    fn templated_as_null(&self, ty: &TypeRef) -> bool {
        let TypeRef::Named { name, .. } = ty else {
            return false;
        };
        match self.catalog.lookup(name) {
            Some(TypeDef::Struct(_)) => true,
            Some(TypeDef::Enum(def)) => def.variants.is_empty(),
            _ => false,
        }
    }

    fn zero_value(&self, ty: &TypeRef) -> Result<Instance> {
        Ok(match ty {
            TypeRef::Scalar(kind) => zero_scalar(*kind),
            TypeRef::List(_) | TypeRef::Array(_) => Instance::List(Vec::new()),
            TypeRef::Set(_) => Instance::Set(Vec::new()),
            TypeRef::Map(..) => Instance::Map(Vec::new()),
            TypeRef::Named { name, .. } => {
                if let Some(strategy) = self.containers.lookup(name) {
                    return Ok(match strategy.behavior() {
                        ContainerBehavior::StreamValues => Instance::Stream {
                            container: name.clone(),
                            items: Vec::new(),
                        },
                        _ => Instance::Null,
                    });
                }
                match self.catalog.lookup(name) {
                    Some(TypeDef::Enum(def)) => match def.variants.first() {
                        Some(variant) => Instance::Enum {
                            type_name: def.name.clone(),
                            variant: variant.clone(),
                        },
                        None => Instance::Null,
                    },
                    Some(TypeDef::Abstract { name }) => {
                        return Err(Error::UnsupportedType(name.clone()));
                    }
                    Some(_) => Instance::Null,
                    None => return Err(Error::UnknownType(name.clone())),
                }
            }
            TypeRef::Param(_) | TypeRef::Any => Instance::Null,
        })
    }
}

/// Tree entry for `name`, also accepting keys that still carry a `|rule` suffix.
fn lookup_key<'t>(tree: &'t Map<String, Value>, name: &str) -> Option<&'t Value> {
    tree.get(name).or_else(|| {
        tree.iter()
            .find(|(key, _)| {
                key.split_once('|')
                    .is_some_and(|(prefix, _)| prefix == name)
            })
            .map(|(_, value)| value)
    })
}

fn type_key(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Scalar(kind) => kind.as_str().to_string(),
        TypeRef::Named { name, .. } => name.clone(),
        other => other.to_string(),
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn zero_scalar(kind: ScalarKind) -> Instance {
    match kind {
        ScalarKind::String => Instance::Text(String::new()),
        ScalarKind::Char => Instance::Char('\0'),
        ScalarKind::Bool => Instance::Bool(false),
        ScalarKind::U8 | ScalarKind::U16 | ScalarKind::U32 | ScalarKind::U64 => Instance::UInt(0),
        ScalarKind::F32 | ScalarKind::F64 => Instance::Float(0.0),
        ScalarKind::BigInt => Instance::BigInt("0".to_string()),
        ScalarKind::BigDecimal => Instance::Decimal("0".to_string()),
        ScalarKind::Date => Instance::Date(NaiveDate::default()),
        ScalarKind::Time => Instance::Time(NaiveTime::default()),
        ScalarKind::DateTime | ScalarKind::Instant => Instance::Timestamp(NaiveDateTime::default()),
        ScalarKind::Uuid => Instance::Uuid(Uuid::nil()),
        ScalarKind::I8
        | ScalarKind::I16
        | ScalarKind::I32
        | ScalarKind::I64
        | ScalarKind::Duration
        | ScalarKind::Period
        | ScalarKind::Year => Instance::Int(0),
    }
}

/// Converts one generated scalar into `kind`.
pub fn coerce_scalar(value: &Value, kind: ScalarKind, path: &str) -> Result<Instance> {
    let fail = || Error::coercion(path, kind.as_str(), value);
    match kind {
        ScalarKind::String => Ok(Instance::Text(render(value))),
        ScalarKind::Char => render(value).chars().next().map(Instance::Char).ok_or_else(fail),
        ScalarKind::Bool => coerce_bool(value).map(Instance::Bool).ok_or_else(fail),
        ScalarKind::I8 => signed(value, i8::MIN.into(), i8::MAX.into()).ok_or_else(fail),
        ScalarKind::I16 => signed(value, i16::MIN.into(), i16::MAX.into()).ok_or_else(fail),
        ScalarKind::I32 => signed(value, i32::MIN.into(), i32::MAX.into()).ok_or_else(fail),
        ScalarKind::I64 | ScalarKind::Duration | ScalarKind::Period | ScalarKind::Year => {
            signed(value, i64::MIN, i64::MAX).ok_or_else(fail)
        }
        ScalarKind::U8 => unsigned(value, u8::MAX.into()).ok_or_else(fail),
        ScalarKind::U16 => unsigned(value, u16::MAX.into()).ok_or_else(fail),
        ScalarKind::U32 => unsigned(value, u32::MAX.into()).ok_or_else(fail),
        ScalarKind::U64 => unsigned(value, u64::MAX).ok_or_else(fail),
        ScalarKind::F32 | ScalarKind::F64 => as_float(value).map(Instance::Float).ok_or_else(fail),
        ScalarKind::BigInt => as_integer(value)
            .map(|number| Instance::BigInt(number.to_string()))
            .or_else(|| {
                let text = render(value);
                let digits = text.strip_prefix('-').unwrap_or(&text);
                (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
                    .then(|| Instance::BigInt(text.clone()))
            })
            .ok_or_else(fail),
        ScalarKind::BigDecimal => decimal_text(value).map(Instance::Decimal).ok_or_else(fail),
        ScalarKind::Date => parse_date(value).map(Instance::Date).ok_or_else(fail),
        ScalarKind::Time => parse_time(value).map(Instance::Time).ok_or_else(fail),
        ScalarKind::DateTime | ScalarKind::Instant => {
            parse_datetime(value).map(Instance::Timestamp).ok_or_else(fail)
        }
        ScalarKind::Uuid => Uuid::parse_str(render(value).trim())
            .map(Instance::Uuid)
            .map_err(|_| fail()),
    }
}

/// Keeps the textual form of plain decimals, otherwise renders the parsed number.
fn decimal_text(value: &Value) -> Option<String> {
    let number = as_float(value)?;
    let text = render(value);
    let text = text.trim();
    if text.contains(['e', 'E', 'i', 'n', 'I', 'N']) {
        return Some(number.to_string());
    }
    Some(text.to_string())
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_f64().map(|n| n != 0.0),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "on" => Some(true),
            "false" | "no" | "n" | "0" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Integer part of a number or numeric string; fractions are truncated.
fn as_integer(value: &Value) -> Option<i128> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Some(int.into());
            }
            if let Some(int) = number.as_u64() {
                return Some(int.into());
            }
            number
                .as_f64()
                .filter(|float| float.is_finite())
                .map(|float| float.trunc() as i128)
        }
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i128>().ok().or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .filter(|float| float.is_finite())
                    .map(|float| float.trunc() as i128)
            })
        }
        Value::Bool(flag) => Some(i128::from(*flag)),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn signed(value: &Value, min: i64, max: i64) -> Option<Instance> {
    let number = as_integer(value)?;
    (i128::from(min)..=i128::from(max))
        .contains(&number)
        .then(|| Instance::Int(number as i64))
}

fn unsigned(value: &Value, max: u64) -> Option<Instance> {
    let number = as_integer(value)?;
    (0..=i128::from(max))
        .contains(&number)
        .then(|| Instance::UInt(number as u64))
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = render(value);
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| parse_datetime(value).map(|timestamp| timestamp.date()))
}

fn parse_time(value: &Value) -> Option<NaiveTime> {
    let text = render(value);
    let text = text.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
}

fn parse_datetime(value: &Value) -> Option<NaiveDateTime> {
    if let Value::Number(number) = value {
        return number
            .as_i64()
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
            .map(|timestamp| timestamp.naive_utc());
    }
    let text = render(value);
    let text = text.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn coerce_enum(value: &Value, def: &EnumDef, path: &str) -> Result<Instance> {
    let variant = match value {
        Value::String(text) => def
            .variants
            .iter()
            .find(|variant| *variant == text)
            .or_else(|| {
                def.variants
                    .iter()
                    .find(|variant| variant.eq_ignore_ascii_case(text))
            }),
        Value::Number(number) => number
            .as_u64()
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| def.variants.get(index)),
        _ => None,
    };
    variant
        .map(|variant| Instance::Enum {
            type_name: def.name.clone(),
            variant: variant.clone(),
        })
        .ok_or_else(|| Error::coercion(path, &def.name, value))
}

fn truncating(spec: LengthSpec) -> LengthSpec {
    LengthSpec {
        fill: FillStrategy::Truncate,
        ..spec
    }
}

fn fit_text(text: String, length: Option<LengthSpec>, config: &MockConfig) -> String {
    let chars: Vec<char> = text.chars().collect();
    let fitted: Vec<char> = match length {
        Some(spec) => fit(chars, spec),
        None => chars,
    };
    if fitted.len() > config.max_string_length {
        debug!(
            limit = config.max_string_length,
            "generated string truncated to max_string_length"
        );
        return fitted.into_iter().take(config.max_string_length).collect();
    }
    fitted.into_iter().collect()
}

fn fit_items(items: Vec<Instance>, length: Option<LengthSpec>) -> Vec<Instance> {
    match length {
        Some(spec) => fit(items, spec),
        None => items,
    }
}

/// Applies a length spec: `Repeat` cycles up to the exact length, both truncate.
fn fit<T: Clone>(items: Vec<T>, spec: LengthSpec) -> Vec<T> {
    if items.len() >= spec.value {
        return items.into_iter().take(spec.value).collect();
    }
    match spec.fill {
        FillStrategy::Truncate => items,
        FillStrategy::Repeat if items.is_empty() => items,
        FillStrategy::Repeat => items.iter().cycle().take(spec.value).cloned().collect(),
    }
}
