//! Rule grammar for template keys (`name|modifier`).
//!
//! Parsing is total: a modifier that does not match the grammar leaves the key
//! untouched and the value is passed through without a rule.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum number of decimal digits a precision rule may request.
pub const MAX_DECIMAL_DIGITS: u32 = 10;

/// Parsed modifier attached to one template key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Repeat a string literal exactly `n` times.
    StringRepeat(usize),
    /// Repeat a string literal a uniformly drawn number of times.
    StringRepeatRange(usize, usize),
    /// Uniform integer in `[min, max]`.
    NumberRange(i64, i64),
    /// Integer part in `[min, max]` plus `dmin..=dmax` decimal digits.
    NumberRangeWithDecimal {
        min: i64,
        max: i64,
        dmin: u32,
        dmax: u32,
    },
    /// Fixed integer part `base` plus `dmin..=dmax` decimal digits.
    DecimalOnly { base: i64, dmin: u32, dmax: u32 },
    /// Counter that advances by `step` across repetitions of the enclosing array.
    Increment(i64),
    /// Generic count, specialised against the literal value.
    Count(usize),
    /// Generic range, specialised against the literal value.
    Range(i64, i64),
}

impl Rule {
    /// Narrows a generic `Count`/`Range` against the literal the key is attached to.
    pub fn specialize(self, value: &Value) -> Rule {
        match (self, value) {
            (Rule::Count(count), Value::String(_)) => Rule::StringRepeat(count),
            (Rule::Range(min, max), Value::String(_)) => {
                let (min, max) = ordered(min, max);
                Rule::StringRepeatRange(min.max(0) as usize, max.max(0) as usize)
            }
            (Rule::Count(count), Value::Number(_)) => {
                let count = i64::try_from(count).unwrap_or(i64::MAX);
                Rule::NumberRange(count, count)
            }
            (Rule::Range(min, max), Value::Number(_)) => {
                let (min, max) = ordered(min, max);
                Rule::NumberRange(min, max)
            }
            (rule, _) => rule,
        }
    }

    pub fn is_increment(&self) -> bool {
        matches!(self, Rule::Increment(_))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Rule::StringRepeat(count) | Rule::Count(count) => write!(f, "{count}"),
            Rule::StringRepeatRange(min, max) => write!(f, "{min}-{max}"),
            Rule::NumberRange(min, max) | Rule::Range(min, max) => write!(f, "{min}-{max}"),
            Rule::NumberRangeWithDecimal {
                min,
                max,
                dmin,
                dmax,
            } => {
                write!(f, "{min}-{max}.")?;
                write_precision(f, dmin, dmax)
            }
            Rule::DecimalOnly { base, dmin, dmax } => {
                write!(f, "{base}.")?;
                write_precision(f, dmin, dmax)
            }
            Rule::Increment(step) if step < 0 => write!(f, "{step}"),
            Rule::Increment(step) => write!(f, "+{step}"),
        }
    }
}

fn write_precision(f: &mut fmt::Formatter<'_>, dmin: u32, dmax: u32) -> fmt::Result {
    if dmin == dmax {
        write!(f, "{dmin}")
    } else {
        write!(f, "{dmin}-{dmax}")
    }
}

/// Returns `(min, max)` regardless of the order the bounds were written in.
pub fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Result of splitting a template key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    pub name: String,
    pub rule: Option<Rule>,
}

impl ParsedKey {
    fn plain(key: &str) -> Self {
        Self {
            name: key.to_string(),
            rule: None,
        }
    }
}

/// Stateless parser for `name|modifier` keys.
pub struct RuleParser;

impl RuleParser {
    pub fn parse(key: &str) -> ParsedKey {
        let Some(caps) = key_pattern().and_then(|re| re.captures(key)) else {
            return ParsedKey::plain(key);
        };
        match parse_modifier(&caps[2]) {
            Some(rule) => ParsedKey {
                name: caps[1].to_string(),
                rule: Some(rule),
            },
            None => ParsedKey::plain(key),
        }
    }

    /// Builds the `name|modifier` key that encodes `rule`.
    pub fn encode(name: &str, rule: &Rule) -> String {
        format!("{name}|{rule}")
    }
}

/// Parses the text after `|`; `None` when it does not match the grammar.
pub fn parse_modifier(modifier: &str) -> Option<Rule> {
    let modifier = modifier.trim();
    if let Some(rule) = parse_decimal(modifier) {
        return Some(rule);
    }
    if let Some(caps) = range_pattern().and_then(|re| re.captures(modifier)) {
        let min = caps[1].parse::<i64>().ok()?;
        let max = caps[2].parse::<i64>().ok()?;
        return Some(Rule::Range(min, max));
    }
    if modifier.bytes().all(|b| b.is_ascii_digit()) && !modifier.is_empty() {
        return modifier.parse::<usize>().ok().map(Rule::Count);
    }
    if let Some(step) = modifier.strip_prefix('+') {
        return Some(Rule::Increment(step.trim().parse::<i64>().unwrap_or(1)));
    }
    if let Some(step) = modifier.strip_prefix('-')
        && !step.is_empty()
        && step.bytes().all(|b| b.is_ascii_digit())
    {
        return step.parse::<i64>().ok().map(|step| Rule::Increment(-step));
    }
    None
}

fn parse_decimal(modifier: &str) -> Option<Rule> {
    let caps = decimal_pattern()?.captures(modifier)?;
    let first = caps[1].parse::<i64>().ok()?;
    let dmin = caps[3].parse::<u32>().ok()?.min(MAX_DECIMAL_DIGITS);
    let dmax = match caps.get(4) {
        Some(value) => value.as_str().parse::<u32>().ok()?.min(MAX_DECIMAL_DIGITS),
        None => dmin,
    };
    let (dmin, dmax) = ordered(dmin, dmax);

    match caps.get(2) {
        Some(max) => Some(Rule::NumberRangeWithDecimal {
            min: first,
            max: max.as_str().parse::<i64>().ok()?,
            dmin,
            dmax,
        }),
        None => Some(Rule::DecimalOnly {
            base: first,
            dmin,
            dmax,
        }),
    }
}

fn key_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+?)\|(.+)$").ok()).as_ref()
}

fn range_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(-?\d+)-(-?\d+)$").ok())
        .as_ref()
}

fn decimal_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(-?\d+)(?:-(-?\d+))?\.(\d+)(?:-(\d+))?$").ok())
        .as_ref()
}

/// Per-property rule inputs, merged into a single [`Rule`] by priority:
/// step, then count, then range with decimals, then range, then decimals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RuleSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dmin: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dmax: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dcount: Option<u32>,
}

impl RuleSpec {
    pub fn is_empty(&self) -> bool {
        self.to_rule().is_none()
    }

    /// Highest-priority rule the inputs describe; lower-priority inputs are ignored.
    pub fn to_rule(&self) -> Option<Rule> {
        if let Some(step) = self.step {
            return Some(Rule::Increment(step));
        }
        if let Some(count) = self.count {
            return Some(match self.decimals() {
                Some((dmin, dmax)) => Rule::DecimalOnly {
                    base: i64::from(count),
                    dmin,
                    dmax,
                },
                None => Rule::Count(count as usize),
            });
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            return Some(match self.decimals() {
                Some((dmin, dmax)) => Rule::NumberRangeWithDecimal {
                    min,
                    max,
                    dmin,
                    dmax,
                },
                None => Rule::Range(min, max),
            });
        }
        self.decimals()
            .map(|(dmin, dmax)| Rule::DecimalOnly { base: 1, dmin, dmax })
    }

    fn decimals(&self) -> Option<(u32, u32)> {
        let clamp = |value: u32| value.min(MAX_DECIMAL_DIGITS);
        match (self.dmin, self.dmax, self.dcount) {
            (Some(dmin), Some(dmax), _) => Some(ordered(clamp(dmin), clamp(dmax))),
            (_, _, Some(dcount)) => Some((clamp(dcount), clamp(dcount))),
            (Some(single), None, None) | (None, Some(single), None) => {
                Some((clamp(single), clamp(single)))
            }
            (None, None, None) => None,
        }
    }
}
