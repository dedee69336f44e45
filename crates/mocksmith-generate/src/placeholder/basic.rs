use rand::Rng;
use serde_json::Value;

use crate::context::ResolutionContext;
use crate::errors::GenerationError;
use crate::numeric::{float_in_range, float_value};
use crate::params::{Args, value_text};
use crate::placeholder::{
    DIGITS, LOWER, Placeholder, PlaceholderRegistry, SYMBOLS, UPPER, capitalize, random_between,
    random_chars,
};

/// Largest integer that round-trips through an IEEE double.
const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;
const DEFAULT_FLOAT_DIGITS: (u32, u32) = (1, 4);
const DEFAULT_STRING_LEN: (i64, i64) = (3, 7);
const ID_LEN: usize = 24;

pub fn register(registry: &mut PlaceholderRegistry) {
    registry.register_placeholder(Box::new(BooleanPlaceholder));
    registry.register_placeholder(Box::new(IntegerPlaceholder {
        name: "natural",
        default_min: 0,
    }));
    registry.register_placeholder(Box::new(IntegerPlaceholder {
        name: "integer",
        default_min: -MAX_SAFE_INTEGER,
    }));
    registry.register_placeholder(Box::new(FloatPlaceholder));
    registry.register_placeholder(Box::new(CharacterPlaceholder));
    registry.register_placeholder(Box::new(StringPlaceholder));
    registry.register_placeholder(Box::new(RangePlaceholder));
    registry.register_placeholder(Box::new(PickPlaceholder));
    registry.register_placeholder(Box::new(CasePlaceholder {
        name: "capitalize",
        apply: capitalize,
    }));
    registry.register_placeholder(Box::new(CasePlaceholder {
        name: "upper",
        apply: str::to_uppercase,
    }));
    registry.register_placeholder(Box::new(CasePlaceholder {
        name: "lower",
        apply: str::to_lowercase,
    }));
    registry.register_placeholder(Box::new(GuidPlaceholder { name: "guid" }));
    registry.register_placeholder(Box::new(GuidPlaceholder { name: "uuid" }));
    registry.register_placeholder(Box::new(IdPlaceholder));
}

struct BooleanPlaceholder;

impl Placeholder for BooleanPlaceholder {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        // `boolean(min, max)` uses the same odds ratio as the `|min-max` rule.
        let probability = match (args.get_f64(0), args.get_f64(1)) {
            (Some(a), Some(b)) if a >= 0.0 && b >= 0.0 && a + b > 0.0 => a / (a + b),
            _ => 0.5,
        };
        Ok(Value::Bool(ctx.rng().random_bool(probability)))
    }
}

struct IntegerPlaceholder {
    name: &'static str,
    default_min: i64,
}

impl Placeholder for IntegerPlaceholder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let min = args.get_i64(0).unwrap_or(self.default_min);
        let max = args.get_i64(1).unwrap_or(MAX_SAFE_INTEGER);
        Ok(Value::from(random_between(ctx, min, max)))
    }
}

struct FloatPlaceholder;

impl Placeholder for FloatPlaceholder {
    fn name(&self) -> &'static str {
        "float"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let min = args.get_f64(0).unwrap_or(0.0);
        let max = args.get_f64(1).unwrap_or(MAX_SAFE_INTEGER as f64);
        let dmin = args.get_u32(2).unwrap_or(DEFAULT_FLOAT_DIGITS.0).min(10);
        let dmax = args
            .get_u32(3)
            .unwrap_or(dmin.max(DEFAULT_FLOAT_DIGITS.1))
            .min(10);
        let digits = random_between(ctx, i64::from(dmin), i64::from(dmax)) as u32;
        Ok(float_value(float_in_range(ctx.rng(), min, max, digits)))
    }
}

struct CharacterPlaceholder;

impl Placeholder for CharacterPlaceholder {
    fn name(&self) -> &'static str {
        "character"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let pool = char_pool(args.get_str(0).as_deref());
        Ok(Value::String(random_chars(ctx, &pool, 1)))
    }
}

/// Named pools `lower`, `upper`, `number`, `symbol`, `alpha`; anything else is a literal pool.
fn char_pool(name: Option<&str>) -> String {
    match name {
        None | Some("") => format!("{LOWER}{UPPER}{DIGITS}"),
        Some("lower") => LOWER.to_string(),
        Some("upper") => UPPER.to_string(),
        Some("number") => DIGITS.to_string(),
        Some("symbol") => SYMBOLS.to_string(),
        Some("alpha") => format!("{LOWER}{UPPER}"),
        Some(pool) => pool.to_string(),
    }
}

struct StringPlaceholder;

impl Placeholder for StringPlaceholder {
    fn name(&self) -> &'static str {
        "string"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let pool = char_pool(args.texts().next());
        let bounds = args.integers();
        let len = match bounds.as_slice() {
            [] => random_between(ctx, DEFAULT_STRING_LEN.0, DEFAULT_STRING_LEN.1),
            [len] => *len,
            [min, max, ..] => random_between(ctx, *min, *max),
        };
        let len = usize::try_from(len.max(0)).unwrap_or(0);
        Ok(Value::String(random_chars(ctx, &pool, len)))
    }
}

struct RangePlaceholder;

impl Placeholder for RangePlaceholder {
    fn name(&self) -> &'static str {
        "range"
    }

    fn resolve(
        &self,
        _ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let (start, stop) = match (args.get_i64(0), args.get_i64(1)) {
            (Some(stop), None) => (0, stop),
            (Some(start), Some(stop)) => (start, stop),
            (None, _) => return Ok(Value::Array(Vec::new())),
        };
        let step = args.get_i64(2).unwrap_or(1);
        if step == 0 {
            return Err(GenerationError::handler("range step must not be zero"));
        }
        let mut values = Vec::new();
        let mut current = start;
        while (step > 0 && current < stop) || (step < 0 && current > stop) {
            values.push(Value::from(current));
            current = current.saturating_add(step);
        }
        Ok(Value::Array(values))
    }
}

struct PickPlaceholder;

impl Placeholder for PickPlaceholder {
    fn name(&self) -> &'static str {
        "pick"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let values = match args.values() {
            [Value::Array(items)] => items.as_slice(),
            values => values,
        };
        if values.is_empty() {
            return Ok(Value::String(String::new()));
        }
        let index = ctx.rng().random_range(0..values.len());
        Ok(values[index].clone())
    }
}

struct CasePlaceholder {
    name: &'static str,
    apply: fn(&str) -> String,
}

impl Placeholder for CasePlaceholder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn resolve(
        &self,
        _ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let text: Vec<String> = args.values().iter().map(value_text).collect();
        Ok(Value::String((self.apply)(&text.join(", "))))
    }
}

struct GuidPlaceholder {
    name: &'static str,
}

impl Placeholder for GuidPlaceholder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        _args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        Ok(Value::String(random_uuid(ctx).to_string()))
    }
}

/// Version 4 UUID drawn from the context RNG so seeded runs repeat.
pub(crate) fn random_uuid(ctx: &mut ResolutionContext<'_>) -> uuid::Uuid {
    let bytes: [u8; 16] = ctx.rng().random();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

struct IdPlaceholder;

impl Placeholder for IdPlaceholder {
    fn name(&self) -> &'static str {
        "id"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        _args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        Ok(Value::String(random_chars(
            ctx,
            &format!("{LOWER}{DIGITS}"),
            ID_LEN,
        )))
    }
}
