//! Placeholder resolution: `@token`, `@token(args)` and property references.
//!
//! A token is looked up as a reference to an already generated property
//! first, then in the extended registry, then among the builtins. Tokens that
//! match nothing are left in the output verbatim.

pub mod address;
pub mod basic;
pub mod business;
pub mod date;
pub mod parser;
pub mod person;
pub mod text;
pub mod visual;
pub mod web;

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde_json::Value;
use tracing::debug;

use crate::context::ResolutionContext;
use crate::errors::GenerationError;
use crate::extended::{ExtendedOutcome, ExtendedRegistry};
use crate::params::{Args, value_text};

pub use parser::{Segment, Token, parse_segments};

/// A builtin placeholder.
pub trait Placeholder: Send + Sync {
    /// Canonical lowercase name, without the `@`.
    fn name(&self) -> &'static str;

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError>;
}

/// Builtin placeholders by lowercase name.
#[derive(Default)]
pub struct PlaceholderRegistry {
    handlers: BTreeMap<String, Box<dyn Placeholder>>,
}

impl PlaceholderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every builtin placeholder.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        basic::register(&mut registry);
        text::register(&mut registry);
        date::register(&mut registry);
        person::register(&mut registry);
        web::register(&mut registry);
        address::register(&mut registry);
        business::register(&mut registry);
        visual::register(&mut registry);
        registry
    }

    pub fn register_placeholder(&mut self, placeholder: Box<dyn Placeholder>) {
        self.handlers
            .insert(placeholder.name().to_lowercase(), placeholder);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Placeholder> {
        self.handlers
            .get(&name.to_lowercase())
            .map(|placeholder| placeholder.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(&name.to_lowercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

pub fn builtin_registry() -> &'static PlaceholderRegistry {
    static REGISTRY: OnceLock<PlaceholderRegistry> = OnceLock::new();
    REGISTRY.get_or_init(PlaceholderRegistry::builtin)
}

/// Resolves placeholder-bearing strings against a context.
pub struct PlaceholderResolver<'r> {
    builtins: &'r PlaceholderRegistry,
    extended: &'r ExtendedRegistry,
}

impl<'r> PlaceholderResolver<'r> {
    pub fn new(builtins: &'r PlaceholderRegistry, extended: &'r ExtendedRegistry) -> Self {
        Self { builtins, extended }
    }

    /// Resolves every token in `text`.
    ///
    /// A string made of exactly one token yields the handler's native value;
    /// anything else yields a string.
    pub fn resolve(&self, text: &str, ctx: &mut ResolutionContext<'_>) -> Value {
        let segments = parse_segments(text);
        if let [Segment::Token(token)] = segments.as_slice() {
            return self
                .resolve_token(token, ctx)
                .unwrap_or_else(|| Value::String(token.raw.to_string()));
        }

        let mut out = String::with_capacity(text.len());
        for segment in &segments {
            match segment {
                Segment::Literal(literal) => out.push_str(literal),
                Segment::Token(token) => match self.resolve_token(token, ctx) {
                    Some(value) => out.push_str(&value_text(&value)),
                    None => out.push_str(token.raw),
                },
            }
        }
        Value::String(out)
    }

    pub fn resolve_text(&self, text: &str, ctx: &mut ResolutionContext<'_>) -> String {
        value_text(&self.resolve(text, ctx))
    }

    fn resolve_token(&self, token: &Token<'_>, ctx: &mut ResolutionContext<'_>) -> Option<Value> {
        if token.args.is_none()
            && let Some(value) = ctx.lookup_reference(token.name)
        {
            return Some(value.clone());
        }

        let args: Option<Vec<Value>> = token
            .args
            .as_ref()
            .map(|raw| raw.iter().map(|arg| self.resolve_arg(arg, ctx)).collect());

        match self.extended.invoke(token.name, args.as_deref()) {
            ExtendedOutcome::Resolved(value) => return Some(value),
            ExtendedOutcome::Failed => return None,
            ExtendedOutcome::NotFound => {}
        }

        let Some(placeholder) = self.builtins.get(token.name) else {
            debug!(token = token.raw, "unresolved placeholder left verbatim");
            return None;
        };
        let values = args.unwrap_or_default();
        match placeholder.resolve(ctx, &Args::new(&values)) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(token = token.raw, error = %err, "placeholder failed, left verbatim");
                None
            }
        }
    }

    /// Types one raw argument: quoted text, nested expression, number, boolean or bare text.
    fn resolve_arg(&self, raw: &str, ctx: &mut ResolutionContext<'_>) -> Value {
        let raw = raw.trim();
        if let Some(inner) = parser::unquote(raw) {
            return Value::String(inner.to_string());
        }
        if raw.contains('@') {
            return self.resolve(raw, ctx);
        }
        if let Ok(value) = raw.parse::<i64>() {
            return Value::from(value);
        }
        if let Ok(value) = raw.parse::<f64>()
            && let Some(number) = serde_json::Number::from_f64(value)
        {
            return Value::Number(number);
        }
        match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => Value::String(raw.to_string()),
        }
    }
}

/// Placeholder that draws one corpus entry.
pub(crate) struct VocabularyPlaceholder {
    pub name: &'static str,
    pub category: &'static str,
    pub fallback: &'static [&'static str],
}

impl Placeholder for VocabularyPlaceholder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        _args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        Ok(Value::String(ctx.pick_vocabulary(self.category, self.fallback)))
    }
}

pub(crate) const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
pub(crate) const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub(crate) const DIGITS: &str = "0123456789";
pub(crate) const SYMBOLS: &str = "!@#$%^&*()[]";

/// `len` characters drawn uniformly from `pool`.
pub(crate) fn random_chars(ctx: &mut ResolutionContext<'_>, pool: &str, len: usize) -> String {
    use rand::Rng;

    let chars: Vec<char> = pool.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    (0..len)
        .map(|_| chars[ctx.rng().random_range(0..chars.len())])
        .collect()
}

/// Uniform integer in the unordered bound `[a, b]`.
pub(crate) fn random_between(ctx: &mut ResolutionContext<'_>, a: i64, b: i64) -> i64 {
    use rand::Rng;

    let (min, max) = mocksmith_core::rule::ordered(a, b);
    ctx.rng().random_range(min..=max)
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
