//! Type-driven mocking: templates from type descriptions, instances from trees.

pub mod coercion;
pub mod container;
pub mod introspector;
pub mod mapper;
pub mod mocker;

pub use coercion::{Coercion, CoercionRegistry};
pub use container::{
    Analyzer, ContainerAdapter, ContainerAnalysis, ContainerBehavior, ContainerStrategy,
    HookStrategy, Mapper,
};
pub use introspector::{ROOT_KEY, TypeIntrospector, is_included, struct_root};
pub use mapper::{BeanMapper, coerce_scalar};
pub use mocker::{Mocker, global};
