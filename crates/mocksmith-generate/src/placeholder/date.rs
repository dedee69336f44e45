use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use rand::Rng;
use serde_json::Value;

use crate::context::ResolutionContext;
use crate::errors::GenerationError;
use crate::params::{Args, parse_date_value, parse_timestamp_value, translate_date_format};
use crate::placeholder::{Placeholder, PlaceholderRegistry};

pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd";
pub const DEFAULT_TIME_FORMAT: &str = "HH:mm:ss";
pub const DEFAULT_DATETIME_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

pub fn register(registry: &mut PlaceholderRegistry) {
    registry.register_placeholder(Box::new(DatePlaceholder {
        name: "date",
        default_format: DEFAULT_DATE_FORMAT,
    }));
    registry.register_placeholder(Box::new(DatePlaceholder {
        name: "time",
        default_format: DEFAULT_TIME_FORMAT,
    }));
    registry.register_placeholder(Box::new(DatePlaceholder {
        name: "datetime",
        default_format: DEFAULT_DATETIME_FORMAT,
    }));
    registry.register_placeholder(Box::new(NowPlaceholder));
}

/// Random instant between the epoch and now, formatted.
///
/// Optional second and third arguments bound the range with `yyyy-MM-dd` or
/// `yyyy-MM-dd HH:mm:ss` values.
struct DatePlaceholder {
    name: &'static str,
    default_format: &'static str,
}

impl Placeholder for DatePlaceholder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let format = args
            .get_str(0)
            .filter(|format| !format.is_empty())
            .unwrap_or_else(|| self.default_format.to_string());
        let now = Local::now().naive_local();
        let min = args
            .get_str(1)
            .and_then(|value| parse_bound(&value))
            .or_else(epoch)
            .unwrap_or(now);
        let max = args
            .get_str(2)
            .and_then(|value| parse_bound(&value))
            .unwrap_or(now);
        let (min, max) = mocksmith_core::rule::ordered(min, max);

        let span = (max - min).num_seconds().max(0);
        let offset = ctx.rng().random_range(0..=span);
        let value = min + chrono::Duration::seconds(offset);
        Ok(Value::String(format_naive(&value, &format)?))
    }
}

struct NowPlaceholder;

impl Placeholder for NowPlaceholder {
    fn name(&self) -> &'static str {
        "now"
    }

    fn resolve(
        &self,
        _ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let format = args
            .get_str(0)
            .filter(|format| !format.is_empty())
            .unwrap_or_else(|| DEFAULT_DATETIME_FORMAT.to_string());
        let now: DateTime<Local> = Local::now();
        Ok(Value::String(format_naive(&now.naive_local(), &format)?))
    }
}

fn epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.and_hms_opt(0, 0, 0)
}

fn parse_bound(value: &str) -> Option<NaiveDateTime> {
    parse_timestamp_value(value).or_else(|| {
        parse_date_value(value).and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}

/// Formats with a `yyyy-MM-dd` style pattern; an invalid pattern is an error.
pub fn format_naive(value: &NaiveDateTime, pattern: &str) -> Result<String, GenerationError> {
    use std::fmt::Write;

    let strftime = translate_date_format(pattern);
    let mut out = String::new();
    write!(out, "{}", value.format(&strftime))
        .map_err(|_| GenerationError::handler(format!("invalid date format '{pattern}'")))?;
    Ok(out)
}
