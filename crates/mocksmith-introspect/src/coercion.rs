use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use mocksmith_core::Instance;
use serde_json::Value;

/// Converts a generated value into an instance of one host type; `None` rejects it.
pub type Coercion = Arc<dyn Fn(&Value) -> Option<Instance> + Send + Sync>;

/// User-registered coercions keyed by type name, consulted before the builtin ones.
#[derive(Default)]
pub struct CoercionRegistry {
    table: RwLock<HashMap<String, Coercion>>,
}

impl std::fmt::Debug for CoercionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoercionRegistry")
            .field("types", &self.names())
            .finish()
    }
}

impl CoercionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, type_name: &str, coercion: F)
    where
        F: Fn(&Value) -> Option<Instance> + Send + Sync + 'static,
    {
        let mut table = match self.table.write() {
            Ok(table) => table,
            Err(poisoned) => poisoned.into_inner(),
        };
        table.insert(type_name.to_string(), Arc::new(coercion));
    }

    pub fn get(&self, type_name: &str) -> Option<Coercion> {
        match self.table.read() {
            Ok(table) => table.get(type_name).cloned(),
            Err(poisoned) => poisoned.into_inner().get(type_name).cloned(),
        }
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.get(type_name).is_some()
    }

    pub fn remove(&self, type_name: &str) -> bool {
        match self.table.write() {
            Ok(mut table) => table.remove(type_name).is_some(),
            Err(poisoned) => poisoned.into_inner().remove(type_name).is_some(),
        }
    }

    pub fn names(&self) -> BTreeSet<String> {
        match self.table.read() {
            Ok(table) => table.keys().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().keys().cloned().collect(),
        }
    }

    pub fn inherit(&self, other: &CoercionRegistry) {
        let copied: Vec<(String, Coercion)> = match other.table.read() {
            Ok(table) => table.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Err(poisoned) => poisoned
                .into_inner()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };
        let mut table = match self.table.write() {
            Ok(table) => table,
            Err(poisoned) => poisoned.into_inner(),
        };
        table.extend(copied);
    }
}
