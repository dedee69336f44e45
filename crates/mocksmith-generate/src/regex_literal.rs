//! `/pattern/` string literals rendered with `rand_regex`.

use rand::Rng;
use rand_regex::Regex as RandRegex;
use tracing::debug;

/// Upper bound for unbounded quantifiers such as `*` and `+`.
pub const MAX_REPEAT: u32 = 10;

/// Pattern body when `value` is a `/pattern/` literal.
pub fn pattern_of(value: &str) -> Option<&str> {
    if value.len() < 3 {
        return None;
    }
    value.strip_prefix('/')?.strip_suffix('/')
}

/// A string matching `pattern`, or `None` when the pattern cannot be compiled.
pub fn generate<R: Rng + ?Sized>(pattern: &str, rng: &mut R) -> Option<String> {
    let pattern = pattern.strip_prefix('^').unwrap_or(pattern);
    let pattern = match pattern.strip_suffix('$') {
        Some(stripped) if !stripped.ends_with('\\') => stripped,
        _ => pattern,
    };
    match RandRegex::compile(pattern, MAX_REPEAT) {
        Ok(regex) => Some(rng.sample::<String, _>(&regex)),
        Err(err) => {
            debug!(pattern, error = %err, "invalid regex literal kept verbatim");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use regex::Regex;

    #[test]
    fn recognises_literals() {
        assert_eq!(pattern_of("/\\d{3}/"), Some("\\d{3}"));
        assert_eq!(pattern_of("//"), None);
        assert_eq!(pattern_of("/abc"), None);
        assert_eq!(pattern_of("plain"), None);
    }

    #[test]
    fn generated_values_match_the_pattern() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let check = Regex::new(r"^[A-Z]{2}-\d{4}(x|y)$").expect("regex");
        for _ in 0..50 {
            let value = generate(r"^[A-Z]{2}-\d{4}(x|y)$", &mut rng).expect("compiles");
            assert!(check.is_match(&value), "{value}");
        }
    }

    #[test]
    fn invalid_patterns_yield_none() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(generate("[unclosed", &mut rng), None);
    }
}
