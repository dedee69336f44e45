//! Entry points tying evaluation, introspection and mapping together.

use std::sync::{Arc, OnceLock};

use mocksmith_core::{
    Error, GeneratedTree, Instance, MockConfig, Result, Template, TypeCatalog, TypeRef,
};
use mocksmith_generate::{ExtendedRegistry, MockOptions, TemplateEvaluator};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::coercion::CoercionRegistry;
use crate::container::ContainerAdapter;
use crate::introspector::TypeIntrospector;
use crate::mapper::BeanMapper;

/// Template evaluation plus the registries that type-driven mocking consults.
///
/// Clones share registries; use [`Mocker::scoped`] for an isolated copy.
#[derive(Clone, Default)]
pub struct Mocker {
    evaluator: TemplateEvaluator,
    containers: Arc<ContainerAdapter>,
    coercions: Arc<CoercionRegistry>,
}

impl std::fmt::Debug for Mocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mocker")
            .field("extended", &self.evaluator.extended().extended_names())
            .field("containers", &self.containers)
            .field("coercions", &self.coercions)
            .finish()
    }
}

impl Mocker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Independent instance starting from this one's registrations.
    ///
    /// Later registrations on either side are not visible to the other.
    pub fn scoped(&self) -> Mocker {
        let extended = Arc::new(ExtendedRegistry::new());
        extended.inherit(self.evaluator.extended());
        let containers = Arc::new(ContainerAdapter::empty());
        containers.inherit(&self.containers);
        let coercions = Arc::new(CoercionRegistry::new());
        coercions.inherit(&self.coercions);
        Mocker {
            evaluator: self.evaluator.clone().with_extended(extended),
            containers,
            coercions,
        }
    }

    pub fn extended(&self) -> &ExtendedRegistry {
        self.evaluator.extended()
    }

    pub fn containers(&self) -> &ContainerAdapter {
        &self.containers
    }

    pub fn coercions(&self) -> &CoercionRegistry {
        &self.coercions
    }

    pub fn evaluator(&self) -> &TemplateEvaluator {
        &self.evaluator
    }

    pub fn mock(&self, template: &Template) -> GeneratedTree {
        self.evaluator.evaluate(template, &MockOptions::default())
    }

    pub fn mock_with(&self, template: &Template, options: &MockOptions) -> GeneratedTree {
        self.evaluator.evaluate(template, options)
    }

    /// Parses `source` as a JSON template and evaluates it.
    pub fn mock_json(&self, source: &str) -> Result<GeneratedTree> {
        let template: Template = serde_json::from_str(source)?;
        Ok(self.mock(&template))
    }

    /// Template the introspector derives for `ty`.
    pub fn template_for(
        &self,
        catalog: &dyn TypeCatalog,
        ty: &TypeRef,
        config: &MockConfig,
    ) -> Result<Template> {
        TypeIntrospector::new(catalog, &self.containers).analyze(ty, config)
    }

    /// Generates an instance of `ty`: introspect, evaluate, then map.
    pub fn mock_type(
        &self,
        catalog: &dyn TypeCatalog,
        ty: &TypeRef,
        config: &MockConfig,
    ) -> Result<Instance> {
        info!(target_type = %ty, seed = ?config.seed, "mocking type");
        let template = self.template_for(catalog, ty, config)?;
        debug!(template = %template, "introspected template");
        let tree = self.evaluator.evaluate(&template, &MockOptions::from(config));
        let instance = BeanMapper::new(catalog, &self.containers, &self.coercions)
            .map(&tree, ty, config)?;
        info!(target_type = %ty, "mocked type");
        Ok(instance)
    }

    /// Like [`Mocker::mock_type`], then deserializes the instance into `T`.
    pub fn mock_as<T: DeserializeOwned>(
        &self,
        catalog: &dyn TypeCatalog,
        ty: &TypeRef,
        config: &MockConfig,
    ) -> Result<T> {
        let instance = self.mock_type(catalog, ty, config)?;
        serde_json::from_value(instance.to_json()).map_err(Error::from)
    }
}

/// Process-wide default instance.
pub fn global() -> &'static Mocker {
    static GLOBAL: OnceLock<Mocker> = OnceLock::new();
    GLOBAL.get_or_init(Mocker::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scoped_instances_do_not_leak_registrations() {
        let parent = Mocker::new();
        parent.extended().extend("tenant", || Ok(json!("acme")));
        let child = parent.scoped();
        child.extended().extend("region", || Ok(json!("eu")));

        assert!(child.extended().has_extended("tenant"));
        assert!(!parent.extended().has_extended("region"));
        assert!(child.containers().is_container_type("Option"));
    }

    #[test]
    fn global_is_a_single_instance() {
        assert!(std::ptr::eq(global(), global()));
    }

    #[test]
    fn mock_json_rejects_invalid_templates() {
        assert!(matches!(Mocker::new().mock_json("{not json"), Err(Error::Json(_))));
    }
}
