//! Keyed binding storage with lifecycle-aware instantiation.

use crate::service::{FactoryFn, ServiceInstanceAnyPtr, ServiceInstancePtr};
use derivative::Derivative;
use fxhash::FxHashMap;
use std::any::Any;

/// Determines how often a [Binding] runs its factory.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) enum Lifecycle {
    /// A fresh instance is produced on every resolution.
    Transient,
    /// The factory runs once and the instance is shared afterwards.
    Singleton,
}

/// A registered factory together with its [Lifecycle] and, for singletons,
/// the instance cached by the first resolution.
#[derive(Derivative)]
#[derivative(Debug)]
pub(crate) struct Binding {
    #[derivative(Debug = "ignore")]
    factory: FactoryFn,
    lifecycle: Lifecycle,
    #[derivative(Debug = "ignore")]
    instance: Option<ServiceInstanceAnyPtr>,
}

impl Binding {
    pub(crate) fn new(factory: FactoryFn, lifecycle: Lifecycle) -> Self {
        Self {
            factory,
            lifecycle,
            instance: None,
        }
    }

    pub(crate) fn transient(factory: FactoryFn) -> Self {
        Self::new(factory, Lifecycle::Transient)
    }

    pub(crate) fn singleton(factory: FactoryFn) -> Self {
        Self::new(factory, Lifecycle::Singleton)
    }

    #[inline]
    pub(crate) fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Produces an instance according to the lifecycle. Singletons run the
    /// factory on first use only.
    pub(crate) fn instantiate(&mut self) -> ServiceInstanceAnyPtr {
        match self.lifecycle {
            Lifecycle::Transient => (self.factory)(),
            Lifecycle::Singleton => self
                .instance
                .get_or_insert_with(|| (self.factory)())
                .clone(),
        }
    }
}

/// String-keyed [Binding] storage shared by the live registry, the fake
/// overlay, and module caches. Registration replaces entries wholesale, so
/// any cached singleton instance goes away with the old entry.
#[derive(Debug, Default)]
pub(crate) struct BindingMap {
    bindings: FxHashMap<String, Binding>,
}

impl BindingMap {
    pub(crate) fn register(&mut self, key: String, binding: Binding) {
        self.bindings.insert(key, binding);
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut Binding> {
        self.bindings.get_mut(key)
    }

    #[inline]
    pub(crate) fn lifecycle(&self, key: &str) -> Option<Lifecycle> {
        self.bindings.get(key).map(Binding::lifecycle)
    }

    #[inline]
    pub(crate) fn contains(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<Binding> {
        self.bindings.remove(key)
    }
}

/// Wraps a typed factory into a [FactoryFn] producing type-erased instances.
pub(crate) fn erase_factory<T, F>(factory: F) -> FactoryFn
where
    T: Any + Send + Sync,
    F: Fn() -> T + Send + Sync + 'static,
{
    Box::new(move || ServiceInstancePtr::new(factory()) as ServiceInstanceAnyPtr)
}
