use serde_json::Value;

use crate::context::ResolutionContext;
use crate::errors::GenerationError;
use crate::params::Args;
use crate::placeholder::{LOWER, Placeholder, PlaceholderRegistry, capitalize, random_between, random_chars};

const FALLBACK_WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "labore", "dolore", "magna", "aliqua", "veniam",
];

pub fn register(registry: &mut PlaceholderRegistry) {
    registry.register_placeholder(Box::new(WordPlaceholder));
    registry.register_placeholder(Box::new(SentencePlaceholder));
    registry.register_placeholder(Box::new(ParagraphPlaceholder));
    registry.register_placeholder(Box::new(TitlePlaceholder));
}

/// `(len)` or `(min, max)` bounds with defaults.
fn bounds(ctx: &mut ResolutionContext<'_>, args: &Args<'_>, default: (i64, i64)) -> usize {
    let count = match (args.get_i64(0), args.get_i64(1)) {
        (Some(exact), None) => exact,
        (Some(min), Some(max)) => random_between(ctx, min, max),
        _ => random_between(ctx, default.0, default.1),
    };
    usize::try_from(count.max(0)).unwrap_or(0)
}

/// A corpus word fitted to `len` characters by truncating or padding with letters.
fn word_of_length(ctx: &mut ResolutionContext<'_>, len: usize) -> String {
    let word = ctx.pick_vocabulary("words", FALLBACK_WORDS).to_lowercase();
    let current = word.chars().count();
    if current >= len {
        word.chars().take(len).collect()
    } else {
        let padding = random_chars(ctx, LOWER, len - current);
        format!("{word}{padding}")
    }
}

fn corpus_word(ctx: &mut ResolutionContext<'_>) -> String {
    ctx.pick_vocabulary("words", FALLBACK_WORDS).to_lowercase()
}

fn sentence(ctx: &mut ResolutionContext<'_>, words: usize) -> String {
    let words: Vec<String> = (0..words.max(1)).map(|_| corpus_word(ctx)).collect();
    let separator = if ctx.locale().language() == "zh" { "" } else { " " };
    let terminator = if ctx.locale().language() == "zh" { "。" } else { "." };
    format!("{}{terminator}", capitalize(&words.join(separator)))
}

struct WordPlaceholder;

impl Placeholder for WordPlaceholder {
    fn name(&self) -> &'static str {
        "word"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        if args.is_empty() {
            let word = corpus_word(ctx);
            let len = word.chars().count();
            if (3..=10).contains(&len) {
                return Ok(Value::String(word));
            }
        }
        let len = bounds(ctx, args, (3, 10));
        Ok(Value::String(word_of_length(ctx, len)))
    }
}

struct SentencePlaceholder;

impl Placeholder for SentencePlaceholder {
    fn name(&self) -> &'static str {
        "sentence"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let words = bounds(ctx, args, (12, 18));
        Ok(Value::String(sentence(ctx, words)))
    }
}

struct ParagraphPlaceholder;

impl Placeholder for ParagraphPlaceholder {
    fn name(&self) -> &'static str {
        "paragraph"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let count = bounds(ctx, args, (3, 7)).max(1);
        let sentences: Vec<String> = (0..count)
            .map(|_| {
                let words = random_between(ctx, 12, 18) as usize;
                sentence(ctx, words)
            })
            .collect();
        Ok(Value::String(sentences.join(" ")))
    }
}

struct TitlePlaceholder;

impl Placeholder for TitlePlaceholder {
    fn name(&self) -> &'static str {
        "title"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let count = bounds(ctx, args, (3, 7)).max(1);
        let words: Vec<String> = (0..count).map(|_| capitalize(&corpus_word(ctx))).collect();
        Ok(Value::String(words.join(" ")))
    }
}
