use std::collections::HashMap;

use mocksmith_core::Locale;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{Map, Value};

use crate::assets::WordSource;
use crate::faker_rs::{FakeRsAdapter, FakerLocale};

#[derive(Debug)]
struct Scope {
    key: Option<String>,
    values: Map<String, Value>,
}

/// Mutable state for one evaluation pass.
///
/// Holds the RNG, the locale snapshot, increment counters keyed by template
/// path, and the scopes of values generated so far for property references.
pub struct ResolutionContext<'a> {
    rng: ChaCha8Rng,
    locale: Locale,
    faker_locale: FakerLocale,
    words: &'a dyn WordSource,
    vocabulary: HashMap<&'static str, Vec<String>>,
    counters: HashMap<String, i64>,
    float_counters: HashMap<String, f64>,
    path: Vec<String>,
    scopes: Vec<Scope>,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(words: &'a dyn WordSource, locale: Locale, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random::<u64>);
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            faker_locale: FakerLocale::for_locale(&locale),
            locale,
            words,
            vocabulary: HashMap::new(),
            counters: HashMap::new(),
            float_counters: HashMap::new(),
            path: Vec::new(),
            scopes: Vec::new(),
        }
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Corpus entries for `category` under the active locale.
    pub fn vocabulary(&mut self, category: &'static str) -> &[String] {
        let words = self.words;
        let locale = &self.locale;
        self.vocabulary
            .entry(category)
            .or_insert_with(|| words.wordlist(locale, category))
    }

    /// One entry of `category`: corpus first, then `fake`, then `fallback`.
    pub fn pick_vocabulary(&mut self, category: &'static str, fallback: &[&str]) -> String {
        let len = self.vocabulary(category).len();
        if len > 0 {
            let index = self.rng.random_range(0..len);
            return self.vocabulary(category)[index].clone();
        }
        if FakeRsAdapter::supports(category)
            && let Some(value) = FakeRsAdapter::vocabulary(category, self.faker_locale, &mut self.rng)
        {
            return value;
        }
        if fallback.is_empty() {
            return String::new();
        }
        fallback[self.rng.random_range(0..fallback.len())].to_string()
    }

    pub fn push_path(&mut self, name: &str) {
        self.path.push(name.to_string());
    }

    pub fn pop_path(&mut self) {
        self.path.pop();
    }

    /// Dotted map-key path of the entry being evaluated.
    pub fn path_key(&self) -> String {
        self.path.join(".")
    }

    /// `start` on first use of the current path, then the previous value plus `step`.
    pub fn next_increment(&mut self, start: i64, step: i64) -> i64 {
        let key = self.path_key();
        match self.counters.get_mut(&key) {
            Some(current) => {
                *current = current.saturating_add(step);
                *current
            }
            None => {
                self.counters.insert(key, start);
                start
            }
        }
    }

    pub fn next_float_increment(&mut self, start: f64, step: i64) -> f64 {
        let key = self.path_key();
        match self.float_counters.get_mut(&key) {
            Some(current) => {
                *current += step as f64;
                *current
            }
            None => {
                self.float_counters.insert(key, start);
                start
            }
        }
    }

    /// Round-robin index for sequential array picks, starting at 0.
    pub fn next_sequence_index(&mut self, step: i64) -> i64 {
        let key = format!("{}#index", self.path_key());
        match self.counters.get_mut(&key) {
            Some(current) => {
                *current = current.saturating_add(step);
                *current
            }
            None => {
                self.counters.insert(key, 0);
                0
            }
        }
    }

    /// Opens a scope for a mapping; `key` is the property the mapping is generated for.
    pub fn enter_scope(&mut self, key: Option<&str>) {
        self.scopes.push(Scope {
            key: key.map(str::to_string),
            values: Map::new(),
        });
    }

    /// Closes the innermost scope and returns the values generated in it.
    pub fn exit_scope(&mut self) -> Map<String, Value> {
        self.scopes
            .pop()
            .map(|scope| scope.values)
            .unwrap_or_default()
    }

    /// Records a generated sibling so later strings can reference it; no-op outside a scope.
    pub fn record(&mut self, name: String, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.values.insert(name, value);
        }
    }

    /// Value for `name` or a dotted `a.b.c` path.
    ///
    /// The first segment is looked up in the current scope, then outward;
    /// failing that the path is walked from the generation root, stepping
    /// into scopes that are still being generated.
    pub fn lookup_reference(&self, name: &str) -> Option<&Value> {
        let segments: Vec<&str> = name.split('.').collect();
        let (first, rest) = segments.split_first()?;

        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.values.get(*first)
                && let Some(found) = walk(value, rest)
            {
                return Some(found);
            }
        }

        self.walk_scopes(0, &segments)
    }

    fn walk_scopes(&self, index: usize, segments: &[&str]) -> Option<&Value> {
        let scope = self.scopes.get(index)?;
        let (first, rest) = segments.split_first()?;
        if let Some(value) = scope.values.get(*first) {
            return walk(value, rest);
        }
        let next = self.scopes.get(index + 1)?;
        if next.key.as_deref() == Some(*first) {
            return self.walk_scopes(index + 1, rest);
        }
        None
    }
}

fn walk<'v>(value: &'v Value, segments: &[&str]) -> Option<&'v Value> {
    segments.iter().try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(*segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NoWords;

    impl WordSource for NoWords {
        fn wordlist(&self, _locale: &Locale, _category: &str) -> Vec<String> {
            Vec::new()
        }

        fn clear_cache(&self) {}
    }

    #[test]
    fn increments_are_keyed_by_path() {
        let words = NoWords;
        let mut ctx = ResolutionContext::new(&words, Locale::default(), Some(1));
        ctx.push_path("a");
        assert_eq!(ctx.next_increment(10, 2), 10);
        assert_eq!(ctx.next_increment(10, 2), 12);
        ctx.pop_path();
        ctx.push_path("b");
        assert_eq!(ctx.next_increment(1, 1), 1);
        assert_eq!(ctx.next_sequence_index(1), 0);
        assert_eq!(ctx.next_sequence_index(1), 1);
    }

    #[test]
    fn references_resolve_outward_and_by_absolute_path() {
        let words = NoWords;
        let mut ctx = ResolutionContext::new(&words, Locale::default(), Some(1));
        ctx.enter_scope(None);
        ctx.record("title".to_string(), json!("root"));
        ctx.enter_scope(Some("user"));
        ctx.record("first".to_string(), json!("Ada"));
        ctx.enter_scope(Some("address"));

        assert_eq!(ctx.lookup_reference("first"), Some(&json!("Ada")));
        assert_eq!(ctx.lookup_reference("title"), Some(&json!("root")));
        assert_eq!(ctx.lookup_reference("user.first"), Some(&json!("Ada")));
        assert_eq!(ctx.lookup_reference("user.missing"), None);

        ctx.exit_scope();
        let user = ctx.exit_scope();
        ctx.record("user".to_string(), Value::Object(user));
        assert_eq!(ctx.lookup_reference("user.first"), Some(&json!("Ada")));
    }
}
