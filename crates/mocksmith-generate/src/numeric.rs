use rand::Rng;
use serde_json::{Number, Value};

/// Uniform float in `[min, max]` rounded to `digits` decimals.
pub fn float_in_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64, digits: u32) -> f64 {
    let (min, max) = mocksmith_core::rule::ordered(min, max);
    let raw = if min == max {
        min
    } else {
        rng.random_range(min..=max)
    };
    round_to(raw, digits).clamp(min, max)
}

/// `base` followed by exactly `digits` random decimals, the last one non-zero.
pub fn float_with_base<R: Rng + ?Sized>(rng: &mut R, base: i64, digits: u32) -> f64 {
    if digits == 0 {
        return base as f64;
    }
    let mut fraction: String = (1..digits)
        .map(|_| char::from(b'0' + rng.random_range(0..=9u8)))
        .collect();
    fraction.push(char::from(b'0' + rng.random_range(1..=9u8)));
    format!("{base}.{fraction}")
        .parse::<f64>()
        .unwrap_or(base as f64)
}

pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

pub fn float_value(value: f64) -> Value {
    Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
