//! Template evaluation: applies key rules, placeholders and regex literals.

use std::sync::Arc;

use mocksmith_core::rule::ordered;
use mocksmith_core::{GeneratedTree, Rule, RuleParser, Template};
use rand::Rng;
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::assets::{WordSource, default_word_source};
use crate::context::ResolutionContext;
use crate::extended::ExtendedRegistry;
use crate::locale::current_locale;
use crate::model::MockOptions;
use crate::numeric::{float_in_range, float_value, float_with_base};
use crate::params::value_text;
use crate::placeholder::{PlaceholderRegistry, PlaceholderResolver, builtin_registry};
use crate::regex_literal;

/// Upper bound on the items (or bytes of literal text) a single repeat rule may produce.
pub const MAX_REPEAT_LEN: usize = 100_000;

/// Repeat count clamped so `times * unit` stays within [`MAX_REPEAT_LEN`].
fn capped_repeat(times: usize, unit: usize) -> usize {
    let limit = (MAX_REPEAT_LEN / unit.max(1)).max(1);
    match times.checked_mul(unit) {
        Some(total) if total <= MAX_REPEAT_LEN => times,
        _ => {
            debug!(requested = times, limit, "repeat count clamped");
            limit.min(times)
        }
    }
}

/// Evaluates templates into generated trees.
///
/// Shareable across threads; each call builds its own `ResolutionContext`, so
/// counters and property references never leak between calls.
#[derive(Clone)]
pub struct TemplateEvaluator {
    builtins: &'static PlaceholderRegistry,
    extended: Arc<ExtendedRegistry>,
    words: Arc<dyn WordSource>,
}

impl Default for TemplateEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEvaluator {
    pub fn new() -> Self {
        Self {
            builtins: builtin_registry(),
            extended: Arc::new(ExtendedRegistry::new()),
            words: default_word_source(),
        }
    }

    pub fn with_extended(mut self, extended: Arc<ExtendedRegistry>) -> Self {
        self.extended = extended;
        self
    }

    pub fn with_word_source(mut self, words: Arc<dyn WordSource>) -> Self {
        self.words = words;
        self
    }

    pub fn extended(&self) -> &ExtendedRegistry {
        &self.extended
    }

    pub fn extended_handle(&self) -> Arc<ExtendedRegistry> {
        self.extended.clone()
    }

    pub fn word_source(&self) -> &dyn WordSource {
        self.words.as_ref()
    }

    pub fn builtins(&self) -> &'static PlaceholderRegistry {
        self.builtins
    }

    pub fn evaluate(&self, template: &Template, options: &MockOptions) -> GeneratedTree {
        let locale = options.locale.clone().unwrap_or_else(current_locale);
        debug!(locale = %locale, seed = ?options.seed, "evaluating template");
        let mut ctx = ResolutionContext::new(self.words.as_ref(), locale, options.seed);
        self.evaluate_in(template, &mut ctx)
    }

    /// Evaluates with a caller-owned context, e.g. to share counters across calls.
    pub fn evaluate_in(&self, template: &Template, ctx: &mut ResolutionContext<'_>) -> GeneratedTree {
        match template {
            Value::Object(map) => self.eval_object(map, None, ctx),
            other => self.eval_plain(other, ctx),
        }
    }

    /// Resolves one placeholder-bearing string outside of a template.
    pub fn resolve_str(&self, text: &str, options: &MockOptions) -> Value {
        let locale = options.locale.clone().unwrap_or_else(current_locale);
        let mut ctx = ResolutionContext::new(self.words.as_ref(), locale, options.seed);
        self.eval_string(text, &mut ctx)
    }

    fn resolver(&self) -> PlaceholderResolver<'_> {
        PlaceholderResolver::new(self.builtins, &self.extended)
    }

    fn eval_object(
        &self,
        map: &Map<String, Value>,
        scope: Option<&str>,
        ctx: &mut ResolutionContext<'_>,
    ) -> Value {
        ctx.enter_scope(scope);
        for (key, value) in map {
            let parsed = RuleParser::parse(key);
            ctx.push_path(&parsed.name);
            let generated = match parsed.rule {
                Some(rule) => self.apply_rule(&parsed.name, rule.specialize(value), value, ctx),
                None => self.eval_child(&parsed.name, value, ctx),
            };
            ctx.pop_path();
            ctx.record(parsed.name, generated);
        }
        Value::Object(ctx.exit_scope())
    }

    /// Value of a property without a rule.
    fn eval_child(&self, name: &str, value: &Value, ctx: &mut ResolutionContext<'_>) -> Value {
        match value {
            Value::Object(map) => self.eval_object(map, Some(name), ctx),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.eval_element(name, item, ctx))
                    .collect(),
            ),
            other => self.eval_plain(other, ctx),
        }
    }

    /// Array element of property `name`; mappings open a scope named after it.
    fn eval_element(&self, name: &str, item: &Value, ctx: &mut ResolutionContext<'_>) -> Value {
        match item {
            Value::Object(map) => self.eval_object(map, Some(name), ctx),
            other => self.eval_plain(other, ctx),
        }
    }

    fn eval_plain(&self, value: &Value, ctx: &mut ResolutionContext<'_>) -> Value {
        match value {
            Value::String(text) => self.eval_string(text, ctx),
            Value::Array(items) => Value::Array(
                items.iter().map(|item| self.eval_plain(item, ctx)).collect(),
            ),
            Value::Object(map) => self.eval_object(map, None, ctx),
            other => other.clone(),
        }
    }

    fn eval_string(&self, text: &str, ctx: &mut ResolutionContext<'_>) -> Value {
        if let Some(pattern) = regex_literal::pattern_of(text) {
            return match regex_literal::generate(pattern, ctx.rng()) {
                Some(value) => Value::String(value),
                None => Value::String(text.to_string()),
            };
        }
        if text.contains('@') {
            return self.resolver().resolve(text, ctx);
        }
        Value::String(text.to_string())
    }

    fn apply_rule(
        &self,
        name: &str,
        rule: Rule,
        value: &Value,
        ctx: &mut ResolutionContext<'_>,
    ) -> Value {
        match value {
            Value::String(text) => self.string_rule(text, rule, ctx),
            Value::Number(number) => number_rule(number, rule, ctx),
            Value::Bool(flag) => bool_rule(*flag, rule, ctx),
            Value::Array(items) => self.array_rule(name, items, rule, ctx),
            Value::Object(map) => self.object_rule(name, map, rule, ctx),
            Value::Null => Value::Null,
        }
    }

    fn string_rule(&self, text: &str, rule: Rule, ctx: &mut ResolutionContext<'_>) -> Value {
        let times = match rule {
            Rule::StringRepeat(count) => count,
            Rule::StringRepeatRange(min, max) => ctx.rng().random_range(min..=max),
            Rule::Increment(step) => return non_numeric_increment(step, ctx),
            _ => return self.eval_string(text, ctx),
        };
        if text.is_empty() {
            return Value::String(String::new());
        }
        let times = capped_repeat(times, text.len());
        let mut out = String::new();
        for _ in 0..times {
            out.push_str(&value_text(&self.eval_string(text, ctx)));
        }
        Value::String(out)
    }

    fn array_rule(
        &self,
        name: &str,
        items: &[Value],
        rule: Rule,
        ctx: &mut ResolutionContext<'_>,
    ) -> Value {
        let times = match rule {
            Rule::Count(1) => {
                if items.is_empty() {
                    return Value::String(String::new());
                }
                let index = ctx.rng().random_range(0..items.len());
                return self.eval_element(name, &items[index], ctx);
            }
            Rule::Increment(step) => {
                if items.is_empty() {
                    return Value::String(String::new());
                }
                let index = ctx.next_sequence_index(step);
                let index = index.rem_euclid(items.len() as i64) as usize;
                return self.eval_element(name, &items[index], ctx);
            }
            Rule::Count(count) => count,
            Rule::Range(min, max) => {
                let (min, max) = ordered(min.max(0), max.max(0));
                ctx.rng().random_range(min..=max) as usize
            }
            _ => return self.eval_child(name, &Value::Array(items.to_vec()), ctx),
        };
        if items.is_empty() {
            return Value::Array(Vec::new());
        }

        let times = capped_repeat(times, items.len());
        let mut out = Vec::new();
        for _ in 0..times {
            for item in items {
                out.push(self.eval_element(name, item, ctx));
            }
        }
        Value::Array(out)
    }

    fn object_rule(
        &self,
        name: &str,
        map: &Map<String, Value>,
        rule: Rule,
        ctx: &mut ResolutionContext<'_>,
    ) -> Value {
        let count = match rule {
            Rule::Count(count) => count,
            Rule::Range(min, max) => {
                let (min, max) = ordered(min.max(0), max.max(0));
                ctx.rng().random_range(min..=max) as usize
            }
            _ => return self.eval_object(map, Some(name), ctx),
        };
        let count = count.min(map.len());
        let mut picked = rand::seq::index::sample(ctx.rng(), map.len(), count).into_vec();
        picked.sort_unstable();

        let subset: Map<String, Value> = map
            .iter()
            .enumerate()
            .filter(|(index, _)| picked.binary_search(index).is_ok())
            .map(|(_, (key, value))| (key.clone(), value.clone()))
            .collect();
        self.eval_object(&subset, Some(name), ctx)
    }
}

fn number_rule(number: &Number, rule: Rule, ctx: &mut ResolutionContext<'_>) -> Value {
    match rule {
        Rule::NumberRange(min, max) => {
            let (min, max) = ordered(min, max);
            Value::from(ctx.rng().random_range(min..=max))
        }
        Rule::NumberRangeWithDecimal {
            min,
            max,
            dmin,
            dmax,
        } => {
            let digits = ctx.rng().random_range(dmin..=dmax);
            float_value(float_in_range(ctx.rng(), min as f64, max as f64, digits))
        }
        Rule::DecimalOnly { base, dmin, dmax } => {
            let digits = ctx.rng().random_range(dmin..=dmax);
            float_value(float_with_base(ctx.rng(), base, digits))
        }
        Rule::Increment(step) => match number.as_i64() {
            Some(start) => Value::from(ctx.next_increment(start, step)),
            None => float_value(ctx.next_float_increment(number.as_f64().unwrap_or(0.0), step)),
        },
        _ => Value::Number(number.clone()),
    }
}

/// `|N` is a fair coin; `|N-M` is true with probability `N / (N + M)`.
fn bool_rule(flag: bool, rule: Rule, ctx: &mut ResolutionContext<'_>) -> Value {
    let probability = match rule {
        Rule::Count(_) => 0.5,
        Rule::Range(yes, no) => {
            let (yes, no) = (yes.max(0) as f64, no.max(0) as f64);
            if yes + no > 0.0 { yes / (yes + no) } else { 0.5 }
        }
        Rule::Increment(step) => return non_numeric_increment(step, ctx),
        _ => return Value::Bool(flag),
    };
    Value::Bool(ctx.rng().random_bool(probability))
}

/// Non-numeric literals under `|+S` count `S, 2S, ...` and discard the literal.
fn non_numeric_increment(step: i64, ctx: &mut ResolutionContext<'_>) -> Value {
    Value::from(ctx.next_increment(step, step))
}
