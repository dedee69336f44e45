//! Registry of wrapper types the introspector unwraps instead of expanding.
//!
//! Entries are keyed by type-name prefix. A name matches a prefix exactly or
//! in a nested form such as `Future.Inner` or `Either::Right`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, RwLock};

use mocksmith_core::{Instance, MockConfig, PropertyDescriptor, Result, Template, TypeRef};
use serde_json::Value;

/// How a wrapper type carries its inner value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerBehavior {
    /// Exactly one inner value of the first type argument.
    SingleValue,
    /// A bounded sequence of the first type argument.
    StreamValues,
    /// One value of the second type argument, the success branch.
    RightType,
}

impl ContainerBehavior {
    /// Type argument the behavior generates values for.
    pub fn inner_type(self, args: &[TypeRef]) -> TypeRef {
        let inner = match self {
            Self::SingleValue | Self::StreamValues => args.first(),
            Self::RightType => args.get(1).or_else(|| args.first()),
        };
        inner.cloned().unwrap_or(TypeRef::Any)
    }
}

impl fmt::Display for ContainerBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SingleValue => "single_value",
            Self::StreamValues => "stream_values",
            Self::RightType => "right_type",
        };
        f.write_str(name)
    }
}

/// Inputs handed to a custom container analyzer.
#[derive(Debug, Clone, Copy)]
pub struct ContainerAnalysis<'a> {
    /// Full name of the wrapper type being analyzed.
    pub container: &'a str,
    /// Inner type picked by the behavior, generics already substituted.
    pub inner: &'a TypeRef,
    pub property: Option<&'a PropertyDescriptor>,
    pub config: &'a MockConfig,
    pub depth: usize,
}

/// Generation and mapping strategy for one wrapper type.
///
/// `analyze` and `map` return `None` to fall back to the default handling of
/// [`ContainerStrategy::behavior`].
pub trait ContainerStrategy: Send + Sync {
    fn behavior(&self) -> ContainerBehavior;

    fn analyze(&self, _analysis: &ContainerAnalysis<'_>) -> Option<Result<Template>> {
        None
    }

    fn map(&self, _value: &Value, _target: &TypeRef, _config: &MockConfig) -> Option<Result<Instance>> {
        None
    }
}

pub type Analyzer = Arc<dyn Fn(&ContainerAnalysis<'_>) -> Result<Template> + Send + Sync>;
pub type Mapper = Arc<dyn Fn(&Value, &TypeRef, &MockConfig) -> Result<Instance> + Send + Sync>;

/// Strategy assembled from a behavior and optional hook closures.
#[derive(Clone)]
pub struct HookStrategy {
    behavior: ContainerBehavior,
    analyzer: Option<Analyzer>,
    mapper: Option<Mapper>,
}

impl HookStrategy {
    pub fn new(behavior: ContainerBehavior) -> Self {
        Self {
            behavior,
            analyzer: None,
            mapper: None,
        }
    }

    pub fn with_analyzer(mut self, analyzer: Analyzer) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn with_mapper(mut self, mapper: Mapper) -> Self {
        self.mapper = Some(mapper);
        self
    }
}

impl ContainerStrategy for HookStrategy {
    fn behavior(&self) -> ContainerBehavior {
        self.behavior
    }

    fn analyze(&self, analysis: &ContainerAnalysis<'_>) -> Option<Result<Template>> {
        self.analyzer.as_ref().map(|analyzer| analyzer(analysis))
    }

    fn map(&self, value: &Value, target: &TypeRef, config: &MockConfig) -> Option<Result<Instance>> {
        self.mapper.as_ref().map(|mapper| mapper(value, target, config))
    }
}

const SINGLE_VALUE_PREFIXES: &[&str] = &[
    "Option",
    "Box",
    "Rc",
    "Arc",
    "Cell",
    "RefCell",
    "Mutex",
    "RwLock",
    "Result",
    "Future",
    "Lazy",
    "LazyLock",
    "OnceCell",
    "OnceLock",
    "Callable",
    "Supplier",
];
const STREAM_PREFIXES: &[&str] = &["Stream", "Iterator", "Receiver", "Flux", "Observable"];
const RIGHT_TYPE_PREFIXES: &[&str] = &["Either", "Validation"];

/// Lookup table from type-name prefix to container strategy.
pub struct ContainerAdapter {
    entries: RwLock<BTreeMap<String, Arc<dyn ContainerStrategy>>>,
}

impl Default for ContainerAdapter {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for ContainerAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerAdapter")
            .field("prefixes", &self.registered_prefixes())
            .finish()
    }
}

impl ContainerAdapter {
    /// Adapter with no registrations.
    pub fn empty() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Adapter with the standard wrapper types registered.
    pub fn with_builtins() -> Self {
        let adapter = Self::empty();
        for (prefixes, behavior) in [
            (SINGLE_VALUE_PREFIXES, ContainerBehavior::SingleValue),
            (STREAM_PREFIXES, ContainerBehavior::StreamValues),
            (RIGHT_TYPE_PREFIXES, ContainerBehavior::RightType),
        ] {
            for prefix in prefixes {
                adapter.register(prefix, behavior, None, None);
            }
        }
        adapter
    }

    /// Registers `prefix`, replacing any earlier registration for it.
    pub fn register(
        &self,
        prefix: &str,
        behavior: ContainerBehavior,
        analyzer: Option<Analyzer>,
        mapper: Option<Mapper>,
    ) {
        let strategy = HookStrategy {
            behavior,
            analyzer,
            mapper,
        };
        self.register_strategy(prefix, Arc::new(strategy));
    }

    pub fn register_strategy(&self, prefix: &str, strategy: Arc<dyn ContainerStrategy>) {
        let mut entries = match self.entries.write() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(prefix.trim().to_string(), strategy);
    }

    pub fn unregister(&self, prefix: &str) -> bool {
        match self.entries.write() {
            Ok(mut entries) => entries.remove(prefix).is_some(),
            Err(poisoned) => poisoned.into_inner().remove(prefix).is_some(),
        }
    }

    pub fn registered_prefixes(&self) -> BTreeSet<String> {
        self.read().keys().cloned().collect()
    }

    /// Behavior registered under exactly `prefix`.
    pub fn get_container_behavior(&self, prefix: &str) -> Option<ContainerBehavior> {
        self.read().get(prefix).map(|strategy| strategy.behavior())
    }

    pub fn is_container_type(&self, type_name: &str) -> bool {
        self.lookup(type_name).is_some()
    }

    /// Strategy for `type_name`; the longest matching prefix wins.
    pub fn lookup(&self, type_name: &str) -> Option<Arc<dyn ContainerStrategy>> {
        let entries = self.read();
        if let Some(strategy) = entries.get(type_name) {
            return Some(strategy.clone());
        }
        entries
            .iter()
            .filter(|(prefix, _)| nested_under(type_name, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, strategy)| strategy.clone())
    }

    /// Copies every registration of `other` into this adapter.
    pub fn inherit(&self, other: &ContainerAdapter) {
        let copied: Vec<(String, Arc<dyn ContainerStrategy>)> = other
            .read()
            .iter()
            .map(|(prefix, strategy)| (prefix.clone(), strategy.clone()))
            .collect();
        let mut entries = match self.entries.write() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.extend(copied);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Arc<dyn ContainerStrategy>>> {
        match self.entries.read() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn nested_under(type_name: &str, prefix: &str) -> bool {
    type_name
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('.') || rest.starts_with("::") || rest.starts_with('$'))
}
