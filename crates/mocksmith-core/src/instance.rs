use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Number, Value};
use uuid::Uuid;

/// Typed value produced by mapping a generated tree onto a declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Instance {
    Null,
    Bool(bool),
    Char(char),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Arbitrary-precision integer in canonical decimal form.
    BigInt(String),
    /// Arbitrary-precision decimal in canonical decimal form.
    Decimal(String),
    Text(String),
    Uuid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Enum {
        type_name: String,
        variant: String,
    },
    List(Vec<Instance>),
    Set(Vec<Instance>),
    Map(Vec<(Instance, Instance)>),
    Struct {
        type_name: String,
        fields: Vec<(String, Instance)>,
    },
    /// Single-value container such as `Option<T>` or `Future<T>`.
    Wrapped {
        container: String,
        value: Box<Instance>,
    },
    /// Multi-value container such as `Stream<T>`.
    Stream {
        container: String,
        items: Vec<Instance>,
    },
    /// Value produced by a custom coercion or container mapper.
    Json(Value),
}

impl Instance {
    pub fn is_null(&self) -> bool {
        matches!(self, Instance::Null)
    }

    pub fn field(&self, name: &str) -> Option<&Instance> {
        match self {
            Instance::Struct { fields, .. } => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            Instance::Wrapped { value, .. } => value.field(name),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Instance::Int(value) => Some(*value),
            Instance::UInt(value) => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Instance::Int(value) => Some(*value as f64),
            Instance::UInt(value) => Some(*value as f64),
            Instance::Float(value) => Some(*value),
            Instance::Decimal(value) | Instance::BigInt(value) => value.parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Instance::Text(value) => Some(value.as_str()),
            Instance::Enum { variant, .. } => Some(variant.as_str()),
            _ => None,
        }
    }

    /// Items of a list, set, array or stream.
    pub fn items(&self) -> Option<&[Instance]> {
        match self {
            Instance::List(items) | Instance::Set(items) => Some(items),
            Instance::Stream { items, .. } => Some(items),
            _ => None,
        }
    }

    /// JSON form suitable for `serde_json::from_value` into host types.
    pub fn to_json(&self) -> Value {
        match self {
            Instance::Null => Value::Null,
            Instance::Bool(value) => Value::Bool(*value),
            Instance::Char(value) => Value::String(value.to_string()),
            Instance::Int(value) => Value::from(*value),
            Instance::UInt(value) => Value::from(*value),
            Instance::Float(value) => Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Instance::BigInt(value) => value
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(value.clone())),
            Instance::Decimal(value) => value
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(value.clone())),
            Instance::Text(value) => Value::String(value.clone()),
            Instance::Uuid(value) => Value::String(value.to_string()),
            Instance::Date(value) => Value::String(value.format("%Y-%m-%d").to_string()),
            Instance::Time(value) => Value::String(value.format("%H:%M:%S").to_string()),
            Instance::Timestamp(value) => {
                Value::String(value.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
            Instance::Enum { variant, .. } => Value::String(variant.clone()),
            Instance::List(items) | Instance::Set(items) => {
                Value::Array(items.iter().map(Instance::to_json).collect())
            }
            Instance::Stream { items, .. } => {
                Value::Array(items.iter().map(Instance::to_json).collect())
            }
            Instance::Map(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    let key = match key.to_json() {
                        Value::String(text) => text,
                        other => other.to_string(),
                    };
                    map.insert(key, value.to_json());
                }
                Value::Object(map)
            }
            Instance::Struct { fields, .. } => Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
            Instance::Wrapped { value, .. } => value.to_json(),
            Instance::Json(value) => value.clone(),
        }
    }
}
