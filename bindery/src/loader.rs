//! Module fallback bridge consulted when no fake, binding, or alias matches
//! a key (see [resolve](crate::container::Container::resolve)).

use crate::error::ModuleLoadError;
use crate::registry::{erase_factory, Binding, BindingMap};
use crate::service::ServiceInstanceAnyPtr;
#[cfg(test)]
use mockall::automock;
use std::any::Any;
use std::path::Path;
use tracing::debug;

/// Maps otherwise unresolvable keys to values, typically modules living
/// under the container's root path.
#[cfg_attr(test, automock)]
pub trait ModuleLoader {
    /// Produces the value for `key` relative to `root_path`, or
    /// [ModuleLoadError::NotFound] when no such module exists.
    fn load(
        &mut self,
        root_path: &Path,
        key: &str,
    ) -> Result<ServiceInstanceAnyPtr, ModuleLoadError>;
}

/// Boxed [ModuleLoader], as held by a container.
pub type ModuleLoaderPtr = Box<dyn ModuleLoader + Send + Sync>;

/// [ModuleLoader] backed by a fixed table of module factories populated up
/// front.
///
/// Keys are relative paths matched verbatim, so nested keys like
/// `"config/database"` work. Mirroring common module systems, each factory
/// runs at most once; later loads of the same key share the first value.
/// The root path is accepted and ignored, since the table is the sole
/// source.
#[derive(Debug, Default)]
pub struct StaticModuleLoader {
    modules: BindingMap,
}

impl StaticModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module factory under `key`, replacing any previous one.
    pub fn register_module<T, F>(&mut self, key: &str, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        debug!(key = %key, "Registering module.");
        self.modules
            .register(key.to_string(), Binding::singleton(erase_factory(factory)));
    }

    /// Chainable [register_module](Self::register_module).
    pub fn with_module<T, F>(mut self, key: &str, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register_module(key, factory);
        self
    }
}

impl ModuleLoader for StaticModuleLoader {
    fn load(
        &mut self,
        _root_path: &Path,
        key: &str,
    ) -> Result<ServiceInstanceAnyPtr, ModuleLoadError> {
        self.modules
            .get_mut(key)
            .map(Binding::instantiate)
            .ok_or_else(|| ModuleLoadError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ModuleLoadError;
    use crate::loader::{ModuleLoader, StaticModuleLoader};
    use crate::service::ServiceInstancePtr;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn should_load_module_registered_under_nested_key() {
        let mut loader =
            StaticModuleLoader::new().with_module("test/deeply/nested/file", || 1_i32);

        let value = loader
            .load(Path::new("/root"), "test/deeply/nested/file")
            .ok()
            .and_then(|instance| instance.downcast::<i32>().ok());

        assert_eq!(Some(1), value.as_deref().copied());
    }

    #[test]
    fn should_cache_module_value_per_key() {
        let counter = Arc::new(AtomicUsize::new(0));
        let factory_counter = counter.clone();
        let mut loader = StaticModuleLoader::new().with_module("module", move || {
            factory_counter.fetch_add(1, Ordering::SeqCst);
            0_i32
        });

        let first = loader.load(Path::new("/root"), "module").unwrap();
        let second = loader.load(Path::new("/root"), "module").unwrap();

        assert!(ServiceInstancePtr::ptr_eq(&first, &second));
        assert_eq!(1, counter.load(Ordering::SeqCst));
    }

    #[test]
    fn should_fail_for_unknown_module() {
        let mut loader = StaticModuleLoader::new();

        let result = loader.load(Path::new("/root"), "missing/module");

        assert!(matches!(
            result,
            Err(ModuleLoadError::NotFound(key)) if key == "missing/module"
        ));
    }

    #[test]
    fn should_replace_module_on_reregistration() {
        let mut loader = StaticModuleLoader::new().with_module("module", || 1_i32);
        loader.register_module("module", || 2_i32);

        let value = loader
            .load(Path::new("/root"), "module")
            .ok()
            .and_then(|instance| instance.downcast::<i32>().ok());

        assert_eq!(Some(2), value.as_deref().copied());
    }
}
