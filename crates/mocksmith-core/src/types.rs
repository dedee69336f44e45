//! Abstract view of host types used by introspection and mapping.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{BeanOverrides, FieldConfig};
use crate::error::Error;

/// Built-in scalar types with a dedicated template and coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    String,
    Char,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    BigInt,
    BigDecimal,
    Date,
    Time,
    DateTime,
    Instant,
    Duration,
    Period,
    Year,
    Uuid,
}

impl ScalarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Char => "char",
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::BigInt => "big_int",
            Self::BigDecimal => "big_decimal",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date_time",
            Self::Instant => "instant",
            Self::Duration => "duration",
            Self::Period => "period",
            Self::Year => "year",
            Self::Uuid => "uuid",
        }
    }

    pub const ALL: [ScalarKind; 23] = [
        Self::String,
        Self::Char,
        Self::Bool,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::BigInt,
        Self::BigDecimal,
        Self::Date,
        Self::Time,
        Self::DateTime,
        Self::Instant,
        Self::Duration,
        Self::Period,
        Self::Year,
        Self::Uuid,
    ];

    /// Inverse of [`ScalarKind::as_str`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Placeholder template inferred for a property of this type.
    pub fn default_template(self) -> &'static str {
        match self {
            Self::String => "@word",
            Self::Char => "@character",
            Self::Bool => "@boolean",
            Self::I8 | Self::I16 | Self::I32 | Self::U8 | Self::U16 | Self::U32 => {
                "@natural(1,100)"
            }
            Self::I64 | Self::U64 => "@natural(1,1000)",
            Self::F32 | Self::F64 => "@float(1.0,100.0)",
            Self::BigInt => "@natural(1,10000)",
            Self::BigDecimal => "@float(1.0,1000.0)",
            Self::Date => "@date",
            Self::Time => "@time",
            Self::DateTime | Self::Instant => "@datetime",
            Self::Duration => "@natural(1,86400)",
            Self::Period => "@natural(1,365)",
            Self::Year => "@natural(1970,2030)",
            Self::Uuid => "@guid",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::BigInt
                | Self::Duration
                | Self::Period
                | Self::Year
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64 | Self::BigDecimal)
    }

    /// Types whose properties accept a configured placeholder expression.
    pub fn supports_placeholder(self) -> bool {
        matches!(
            self,
            Self::String
                | Self::Char
                | Self::Bool
                | Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::F32
                | Self::F64
                | Self::Uuid
        )
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    Scalar(ScalarKind),
    List(Box<TypeRef>),
    Set(Box<TypeRef>),
    Array(Box<TypeRef>),
    Map(Box<TypeRef>, Box<TypeRef>),
    /// A catalog type or a container wrapper, with generic arguments.
    Named {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<TypeRef>,
    },
    /// Generic parameter of the enclosing type, substituted from its arguments.
    Param(String),
    Any,
}

impl TypeRef {
    pub fn scalar(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }

    pub fn string() -> Self {
        Self::Scalar(ScalarKind::String)
    }

    pub fn list(inner: TypeRef) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn set(inner: TypeRef) -> Self {
        Self::Set(Box::new(inner))
    }

    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self::Named {
            name: name.into(),
            args,
        }
    }

    pub fn param(name: impl Into<String>) -> Self {
        Self::Param(name.into())
    }

    /// Replaces generic parameters using `bindings`; unbound parameters become `Any`.
    pub fn substitute(&self, bindings: &BTreeMap<String, TypeRef>) -> TypeRef {
        match self {
            Self::Param(name) => bindings.get(name).cloned().unwrap_or(Self::Any),
            Self::List(inner) => Self::List(Box::new(inner.substitute(bindings))),
            Self::Set(inner) => Self::Set(Box::new(inner.substitute(bindings))),
            Self::Array(inner) => Self::Array(Box::new(inner.substitute(bindings))),
            Self::Map(key, value) => Self::Map(
                Box::new(key.substitute(bindings)),
                Box::new(value.substitute(bindings)),
            ),
            Self::Named { name, args } => Self::Named {
                name: name.clone(),
                args: args.iter().map(|arg| arg.substitute(bindings)).collect(),
            },
            other => other.clone(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::List(inner) => write!(f, "List<{inner}>"),
            Self::Set(inner) => write!(f, "Set<{inner}>"),
            Self::Array(inner) => write!(f, "[{inner}]"),
            Self::Map(key, value) => write!(f, "Map<{key}, {value}>"),
            Self::Named { name, args } if args.is_empty() => f.write_str(name),
            Self::Named { name, args } => {
                write!(f, "{name}<")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
            Self::Param(name) => f.write_str(name),
            Self::Any => f.write_str("any"),
        }
    }
}

/// Parses the notation produced by `Display`, e.g. `Page<User>` or `Map<string, List<i32>>`.
///
/// Scalar names and `any` are recognised; every other identifier is a named type.
impl FromStr for TypeRef {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let mut parser = TypeParser {
            source,
            rest: source,
        };
        let ty = parser.parse()?;
        if !parser.rest.trim().is_empty() {
            return Err(parser.error("trailing input"));
        }
        Ok(ty)
    }
}

struct TypeParser<'s> {
    source: &'s str,
    rest: &'s str,
}

impl<'s> TypeParser<'s> {
    fn parse(&mut self) -> Result<TypeRef, Error> {
        if self.eat('[') {
            let inner = self.parse()?;
            self.expect(']')?;
            return Ok(TypeRef::Array(Box::new(inner)));
        }
        let name = self.ident()?;
        let args = if self.eat('<') {
            let mut args = vec![self.parse()?];
            while self.eat(',') {
                args.push(self.parse()?);
            }
            self.expect('>')?;
            args
        } else {
            Vec::new()
        };

        let mut args = args.into_iter();
        let ty = match (name, args.len()) {
            ("List", 1) => TypeRef::List(Box::new(args.next().unwrap_or(TypeRef::Any))),
            ("Set", 1) => TypeRef::Set(Box::new(args.next().unwrap_or(TypeRef::Any))),
            ("Map", 2) => {
                let key = args.next().unwrap_or(TypeRef::Any);
                let value = args.next().unwrap_or(TypeRef::Any);
                TypeRef::map(key, value)
            }
            ("any", 0) => TypeRef::Any,
            (name, 0) => match ScalarKind::from_name(name) {
                Some(kind) => TypeRef::Scalar(kind),
                None => TypeRef::named(name),
            },
            (name, _) => TypeRef::generic(name, args.collect()),
        };
        Ok(ty)
    }

    fn ident(&mut self) -> Result<&'s str, Error> {
        let trimmed = self.rest.trim_start();
        let end = trimmed
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '.' | ':' | '$')))
            .unwrap_or(trimmed.len());
        if end == 0 {
            self.rest = trimmed;
            return Err(self.error("expected a type name"));
        }
        let (ident, rest) = trimmed.split_at(end);
        self.rest = rest;
        Ok(ident)
    }

    fn eat(&mut self, token: char) -> bool {
        match self.rest.trim_start().strip_prefix(token) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn expect(&mut self, token: char) -> Result<(), Error> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{token}'")))
        }
    }

    fn error(&self, message: &str) -> Error {
        let offset = self.source.len() - self.rest.len();
        Error::InvalidConfig(format!(
            "invalid type '{}': {message} at offset {offset}",
            self.source
        ))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// One property of a structured type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "transient")]
    pub is_transient: bool,
    /// Declared default used when the generated tree has no value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<FieldConfig>,
    /// Overrides applied when descending into this property's type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bean: Option<BeanOverrides>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
            visibility: Visibility::Public,
            is_static: false,
            is_transient: false,
            default: None,
            config: None,
            bean: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn transient(mut self) -> Self {
        self.is_transient = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_bean(mut self, overrides: BeanOverrides) -> Self {
        self.bean = Some(overrides);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.config.as_ref().is_none_or(|config| config.enabled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StructDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    /// Primary constructor parameter names; every one is filled when mapping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructor: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bean: Option<BeanOverrides>,
}

impl StructDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            properties: Vec::new(),
            constructor: Vec::new(),
            bean: None,
        }
    }

    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn constructor<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constructor = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bean(mut self, overrides: BeanOverrides) -> Self {
        self.bean = Some(overrides);
        self
    }

    pub fn find_property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|property| property.name == name)
    }

    /// Generic bindings for a use site such as `Page<User>`.
    pub fn bindings(&self, args: &[TypeRef]) -> BTreeMap<String, TypeRef> {
        self.type_params
            .iter()
            .enumerate()
            .map(|(index, param)| (param.clone(), args.get(index).cloned().unwrap_or(TypeRef::Any)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<String>,
}

/// Host type with a fixed template and no visible structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OpaqueDef {
    pub name: String,
    pub template: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TypeDef {
    Struct(StructDef),
    Enum(EnumDef),
    /// Abstract class or interface; only usable behind a container behavior.
    Abstract { name: String },
    Opaque(OpaqueDef),
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            Self::Struct(def) => &def.name,
            Self::Enum(def) => &def.name,
            Self::Abstract { name } => name,
            Self::Opaque(def) => &def.name,
        }
    }
}

/// Source of type definitions supplied by the host environment.
pub trait TypeCatalog: Send + Sync {
    fn lookup(&self, name: &str) -> Option<&TypeDef>;
}

/// In-memory catalog, also the JSON form read by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TypeDef>", into = "Vec<TypeDef>")]
pub struct TypeRegistry {
    types: BTreeMap<String, TypeDef>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: TypeDef) -> &mut Self {
        self.types.insert(def.name().to_string(), def);
        self
    }

    pub fn with(mut self, def: TypeDef) -> Self {
        self.register(def);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeCatalog for TypeRegistry {
    fn lookup(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }
}

impl From<Vec<TypeDef>> for TypeRegistry {
    fn from(defs: Vec<TypeDef>) -> Self {
        let mut registry = TypeRegistry::new();
        for def in defs {
            registry.register(def);
        }
        registry
    }
}

impl From<TypeRegistry> for Vec<TypeDef> {
    fn from(registry: TypeRegistry) -> Self {
        registry.types.into_values().collect()
    }
}
