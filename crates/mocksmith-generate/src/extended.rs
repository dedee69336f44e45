//! User-registered placeholder handlers.
//!
//! Names are case-insensitive. Handlers are consulted before builtins, so a
//! registration can override a builtin placeholder.

use std::collections::{BTreeSet, HashMap};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::warn;

use crate::errors::GenerationError;

pub type Handler = Arc<dyn Fn() -> Result<Value, GenerationError> + Send + Sync>;
pub type ParamHandler = Arc<dyn Fn(&[Value]) -> Result<Value, GenerationError> + Send + Sync>;

/// Result of looking up and invoking an extended handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtendedOutcome {
    NotFound,
    Resolved(Value),
    /// The handler returned an error or panicked.
    Failed,
}

#[derive(Default)]
pub struct ExtendedRegistry {
    simple: RwLock<HashMap<String, Handler>>,
    with_params: RwLock<HashMap<String, ParamHandler>>,
}

impl std::fmt::Debug for ExtendedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedRegistry")
            .field("names", &self.extended_names())
            .finish()
    }
}

impl ExtendedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a zero-argument handler, replacing any previous one with the same name.
    pub fn extend<F>(&self, name: &str, handler: F)
    where
        F: Fn() -> Result<Value, GenerationError> + Send + Sync + 'static,
    {
        let mut table = match self.simple.write() {
            Ok(table) => table,
            Err(poisoned) => poisoned.into_inner(),
        };
        table.insert(normalize(name), Arc::new(handler));
    }

    pub fn extend_with_params<F>(&self, name: &str, handler: F)
    where
        F: Fn(&[Value]) -> Result<Value, GenerationError> + Send + Sync + 'static,
    {
        let mut table = match self.with_params.write() {
            Ok(table) => table,
            Err(poisoned) => poisoned.into_inner(),
        };
        table.insert(normalize(name), Arc::new(handler));
    }

    /// Registers several zero-argument handlers at once.
    pub fn extend_all<I>(&self, handlers: I)
    where
        I: IntoIterator<Item = (String, Handler)>,
    {
        let mut table = match self.simple.write() {
            Ok(table) => table,
            Err(poisoned) => poisoned.into_inner(),
        };
        for (name, handler) in handlers {
            table.insert(normalize(&name), handler);
        }
    }

    pub fn has_extended(&self, name: &str) -> bool {
        let name = normalize(name);
        self.read_simple().contains_key(&name) || self.read_params().contains_key(&name)
    }

    /// Removes both handler kinds for `name`; returns whether anything was removed.
    pub fn remove_extended(&self, name: &str) -> bool {
        let name = normalize(name);
        let removed_simple = match self.simple.write() {
            Ok(mut table) => table.remove(&name).is_some(),
            Err(poisoned) => poisoned.into_inner().remove(&name).is_some(),
        };
        let removed_params = match self.with_params.write() {
            Ok(mut table) => table.remove(&name).is_some(),
            Err(poisoned) => poisoned.into_inner().remove(&name).is_some(),
        };
        removed_simple || removed_params
    }

    /// Registered names in lowercase, sorted.
    pub fn extended_names(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.read_simple().keys().cloned().collect();
        names.extend(self.read_params().keys().cloned());
        names.into_iter().collect()
    }

    pub fn clear_extended(&self) {
        match self.simple.write() {
            Ok(mut table) => table.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
        match self.with_params.write() {
            Ok(mut table) => table.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    /// Copies every handler of `other` into this registry.
    pub fn inherit(&self, other: &ExtendedRegistry) {
        let simple: Vec<(String, Handler)> = other
            .read_simple()
            .iter()
            .map(|(name, handler)| (name.clone(), handler.clone()))
            .collect();
        self.extend_all(simple);

        let params: Vec<(String, ParamHandler)> = other
            .read_params()
            .iter()
            .map(|(name, handler)| (name.clone(), handler.clone()))
            .collect();
        let mut table = match self.with_params.write() {
            Ok(table) => table,
            Err(poisoned) => poisoned.into_inner(),
        };
        table.extend(params);
    }

    /// Calls the handler for `name`.
    ///
    /// With an argument list only parameterised handlers apply; without one the
    /// zero-argument handler is preferred and a parameterised one gets no arguments.
    pub fn invoke(&self, name: &str, args: Option<&[Value]>) -> ExtendedOutcome {
        let name = normalize(name);
        let result = match args {
            Some(args) => {
                let Some(handler) = self.read_params().get(&name).cloned() else {
                    return ExtendedOutcome::NotFound;
                };
                catch_unwind(AssertUnwindSafe(|| handler(args)))
            }
            None => {
                let simple = self.read_simple().get(&name).cloned();
                let params = self.read_params().get(&name).cloned();
                match (simple, params) {
                    (Some(handler), _) => catch_unwind(AssertUnwindSafe(|| handler())),
                    (None, Some(handler)) => catch_unwind(AssertUnwindSafe(|| handler(&[]))),
                    (None, None) => return ExtendedOutcome::NotFound,
                }
            }
        };

        match result {
            Ok(Ok(value)) => ExtendedOutcome::Resolved(value),
            Ok(Err(err)) => {
                warn!(placeholder = %name, error = %err, "extended placeholder failed");
                ExtendedOutcome::Failed
            }
            Err(_) => {
                warn!(placeholder = %name, "extended placeholder panicked");
                ExtendedOutcome::Failed
            }
        }
    }

    fn read_simple(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Handler>> {
        match self.simple.read() {
            Ok(table) => table,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn read_params(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, ParamHandler>> {
        match self.with_params.read() {
            Ok(table) => table,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim().trim_start_matches('@').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_are_case_insensitive() {
        let registry = ExtendedRegistry::new();
        registry.extend("Mood", || Ok(json!("happy")));
        assert!(registry.has_extended("MOOD"));
        assert_eq!(
            registry.invoke("mood", None),
            ExtendedOutcome::Resolved(json!("happy"))
        );
        assert_eq!(registry.extended_names(), vec!["mood".to_string()]);
        assert!(registry.remove_extended("mOoD"));
        assert!(!registry.has_extended("mood"));
    }

    #[test]
    fn failures_are_contained() {
        let registry = ExtendedRegistry::new();
        registry.extend("broken", || Err(GenerationError::handler("boom")));
        registry.extend("panics", || panic!("handler panic"));
        assert_eq!(registry.invoke("broken", None), ExtendedOutcome::Failed);
        assert_eq!(registry.invoke("panics", None), ExtendedOutcome::Failed);
        assert_eq!(registry.invoke("absent", None), ExtendedOutcome::NotFound);
    }

    #[test]
    fn argument_lists_select_parameterised_handlers() {
        let registry = ExtendedRegistry::new();
        registry.extend("greet", || Ok(json!("hi")));
        registry.extend_with_params("greet", |args| {
            Ok(json!(format!("hi {}", args.len())))
        });
        assert_eq!(
            registry.invoke("greet", Some(&[json!(1), json!(2)])),
            ExtendedOutcome::Resolved(json!("hi 2"))
        );
        assert_eq!(
            registry.invoke("greet", None),
            ExtendedOutcome::Resolved(json!("hi"))
        );
        registry.clear_extended();
        assert!(registry.extended_names().is_empty());
    }
}
