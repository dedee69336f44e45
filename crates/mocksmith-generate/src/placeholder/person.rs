use serde_json::Value;

use crate::context::ResolutionContext;
use crate::errors::GenerationError;
use crate::params::Args;
use crate::placeholder::{Placeholder, PlaceholderRegistry, VocabularyPlaceholder};

const FIRST_NAMES: &[&str] = &["John", "Jane", "Michael", "Sarah", "David", "Lisa"];
const LAST_NAMES: &[&str] = &["Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia"];

pub fn register(registry: &mut PlaceholderRegistry) {
    registry.register_placeholder(Box::new(VocabularyPlaceholder {
        name: "first",
        category: "firstNames",
        fallback: FIRST_NAMES,
    }));
    registry.register_placeholder(Box::new(VocabularyPlaceholder {
        name: "last",
        category: "lastNames",
        fallback: LAST_NAMES,
    }));
    registry.register_placeholder(Box::new(NamePlaceholder));
}

struct NamePlaceholder;

impl Placeholder for NamePlaceholder {
    fn name(&self) -> &'static str {
        "name"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        _args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let first = ctx.pick_vocabulary("firstNames", FIRST_NAMES);
        let last = ctx.pick_vocabulary("lastNames", LAST_NAMES);
        let name = match ctx.locale().language() {
            "zh" | "ja" | "ko" => format!("{last}{first}"),
            _ => format!("{first} {last}"),
        };
        Ok(Value::String(name))
    }
}
