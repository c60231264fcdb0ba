//! Hand-written proxy classes and their lifecycle hooks

use std::sync::Arc;

use strata_core::{ProxyKind, ProxyType, StrataResult};
use strata_registry::FunctionRegistry;

/// Lifecycle hooks of a hand-written proxy class
///
/// The controller calls `initialize` on every class, in order, once the
/// catalog has loaded, and `reset` on teardown. The default hooks bind
/// (and strip) the catalog algorithms namespaced under the class name.
pub trait ProxyClass: Send + Sync {
    /// Capability tag of instances
    fn kind(&self) -> ProxyKind;

    /// Type name the class registers under
    fn name(&self) -> &'static str {
        self.kind().type_name()
    }

    fn initialize(
        &self,
        functions: &dyn FunctionRegistry,
        descriptor: &mut ProxyType,
    ) -> StrataResult<()> {
        functions.import_api(descriptor, self.name());
        Ok(())
    }

    fn reset(&self, functions: &dyn FunctionRegistry, descriptor: &mut ProxyType) {
        functions.clear_api(descriptor);
    }
}

/// A hand-written class with the default hooks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StandardClass(pub ProxyKind);

impl ProxyClass for StandardClass {
    fn kind(&self) -> ProxyKind {
        self.0
    }
}

/// Hand-written classes in hook order
pub fn standard_classes() -> Vec<Arc<dyn ProxyClass>> {
    [
        ProxyKind::Element,
        ProxyKind::Image,
        ProxyKind::Feature,
        ProxyKind::Collection,
        ProxyKind::ImageCollection,
        ProxyKind::FeatureCollection,
        ProxyKind::Filter,
        ProxyKind::Geometry,
        ProxyKind::List,
        ProxyKind::Number,
        ProxyKind::String,
        ProxyKind::Date,
        ProxyKind::Dictionary,
    ]
    .into_iter()
    .map(|kind| Arc::new(StandardClass(kind)) as Arc<dyn ProxyClass>)
    .collect()
}
