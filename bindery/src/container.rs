//! The service container and its builder.

use crate::error::{ModuleLoadError, ProviderError, ResolutionError};
use crate::injectable::{Arguments, Blueprint};
use crate::loader::{ModuleLoaderPtr, StaticModuleLoader};
use crate::registry::{erase_factory, Binding, BindingMap, Lifecycle};
use crate::service::{ServiceInstanceAnyPtr, ServiceInstancePtr};
use derivative::Derivative;
use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;
use std::any::{type_name, Any};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Target of a [make](Container::make) call: either a key resolved through
/// the usual chain first, or an already-resolved value.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub enum MakeTarget<'a> {
    /// Resolve this key, then instantiate the result.
    Key(&'a str),
    /// Instantiate this value directly.
    Value(#[derivative(Debug = "ignore")] ServiceInstanceAnyPtr),
}

impl<'a> From<&'a str> for MakeTarget<'a> {
    fn from(key: &'a str) -> Self {
        MakeTarget::Key(key)
    }
}

impl From<ServiceInstanceAnyPtr> for MakeTarget<'_> {
    fn from(value: ServiceInstanceAnyPtr) -> Self {
        MakeTarget::Value(value)
    }
}

/// Builder for [Container]s which need a non-default module loader.
pub struct ContainerBuilder {
    root_path: PathBuf,
    loader: ModuleLoaderPtr,
}

impl ContainerBuilder {
    /// Starts building a container rooted at `root_path`, with an empty
    /// [StaticModuleLoader] as the fallback bridge.
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            loader: Box::new(StaticModuleLoader::new()),
        }
    }

    /// Replaces the module fallback bridge.
    pub fn with_loader(mut self, loader: ModuleLoaderPtr) -> Self {
        self.loader = loader;
        self
    }

    pub fn build(self) -> Container {
        Container {
            root_path: self.root_path,
            bindings: BindingMap::default(),
            fakes: BindingMap::default(),
            aliases: FxHashMap::default(),
            loader: self.loader,
            keys_under_construction: FxHashSet::default(),
        }
    }
}

/// A dependency-resolution container for a single root path.
///
/// The container maps string keys to value factories with transient or
/// singleton lifecycle, layers test fakes over them, redirects keys through
/// aliases, and falls back to a [ModuleLoader](crate::loader::ModuleLoader)
/// for keys nothing else matches. Types implementing
/// [Injectable](crate::injectable::Injectable) can be constructed with
/// recursively resolved dependencies via [make](Self::make).
///
/// All state is local to the instance and every operation borrows the
/// container mutably, so sharing one across threads requires external
/// serialization. One container should exist per root path, passed
/// explicitly to whoever resolves from it.
pub struct Container {
    root_path: PathBuf,
    bindings: BindingMap,
    fakes: BindingMap,
    aliases: FxHashMap<String, String>,
    loader: ModuleLoaderPtr,
    keys_under_construction: FxHashSet<String>,
}

impl Container {
    /// Creates a container rooted at `root_path` with an empty
    /// [StaticModuleLoader].
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        ContainerBuilder::new(root_path).build()
    }

    /// Registers a transient factory under `key`: every resolution runs the
    /// factory and yields a fresh instance. Re-registration replaces the
    /// previous binding of the key, discarding any cached instance.
    pub fn bind<T, F>(&mut self, key: &str, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        debug!(key = %key, "Registering transient binding.");
        self.bindings
            .register(key.to_string(), Binding::transient(erase_factory(factory)));
    }

    /// Registers a singleton factory under `key`: the first resolution runs
    /// the factory once and all later resolutions share the instance.
    /// Re-registration replaces the previous binding of the key, discarding
    /// any cached instance.
    pub fn singleton<T, F>(&mut self, key: &str, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        debug!(key = %key, "Registering singleton binding.");
        self.bindings
            .register(key.to_string(), Binding::singleton(erase_factory(factory)));
    }

    /// Installs a fake for `key`, shadowing any binding until
    /// [restore](Self::restore).
    ///
    /// The fake takes over the lifecycle of the currently bound key
    /// (transient when the key is unbound) and keeps a cached instance of
    /// its own, independent of the shadowed binding's. The lifecycle is
    /// captured once at installation; re-binding the key later affects
    /// neither the fake nor its lifecycle.
    pub fn fake<T, F>(&mut self, key: &str, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let lifecycle = self
            .bindings
            .lifecycle(key)
            .unwrap_or(Lifecycle::Transient);
        debug!(key = %key, lifecycle = ?lifecycle, "Installing fake binding.");
        self.fakes
            .register(key.to_string(), Binding::new(erase_factory(factory), lifecycle));
    }

    /// Removes the fake for `key`, re-exposing whatever the normal
    /// resolution chain finds. Does nothing when no fake is installed.
    pub fn restore(&mut self, key: &str) {
        if self.fakes.remove(key).is_some() {
            debug!(key = %key, "Restored faked binding.");
        }
    }

    /// Points `key` at `target_key`, making resolution of `key` behave like
    /// resolution of `target_key` (fakes included). An alias applies only
    /// while `key` has no fake or binding of its own; the last alias
    /// registered for a key wins.
    pub fn alias(&mut self, key: &str, target_key: &str) {
        debug!(key = %key, target = %target_key, "Registering alias.");
        self.aliases.insert(key.to_string(), target_key.to_string());
    }

    /// Root path this container serves.
    #[inline]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Whether a binding (not a fake) exists for `key`.
    #[inline]
    pub fn is_bound(&self, key: &str) -> bool {
        self.bindings.contains(key)
    }

    /// Whether a fake is currently installed for `key`.
    #[inline]
    pub fn is_faked(&self, key: &str) -> bool {
        self.fakes.contains(key)
    }

    /// Resolves `key` to a service instance.
    ///
    /// Sources are consulted in order: installed fakes, live bindings,
    /// aliases (restarting the chain under the target key), and finally the
    /// module loader given the container root. Singleton entries cache the
    /// instance on first resolution; a fake caches independently of the
    /// binding it shadows. Fails with [ResolutionError::NotFound] when no
    /// source matches and with [ResolutionError::CircularAlias] when alias
    /// redirects loop.
    pub fn resolve(&mut self, key: &str) -> Result<ServiceInstanceAnyPtr, ResolutionError> {
        let mut current = key;
        let mut hops = 0;
        loop {
            if let Some(fake) = self.fakes.get_mut(current) {
                trace!(key = %current, "Resolved key to installed fake.");
                return Ok(fake.instantiate());
            }

            if let Some(binding) = self.bindings.get_mut(current) {
                trace!(key = %current, "Resolved key to binding.");
                return Ok(binding.instantiate());
            }

            if let Some(target) = self.aliases.get(current) {
                // each hop must reach a distinct alias, so a chain longer
                // than the table has looped
                hops += 1;
                if hops > self.aliases.len() {
                    return Err(ResolutionError::CircularAlias(key.to_string()));
                }

                trace!(key = %current, target = %target, "Following alias.");
                current = target.as_str();
                continue;
            }

            trace!(key = %current, "Delegating to module loader.");
            return match self.loader.load(&self.root_path, current) {
                Ok(instance) => Ok(instance),
                Err(ModuleLoadError::NotFound(_)) => {
                    Err(ResolutionError::NotFound(current.to_string()))
                }
                Err(ModuleLoadError::LoadFailed(source)) => {
                    Err(ResolutionError::ModuleLoad(current.to_string(), source))
                }
            };
        }
    }

    /// [resolve](Self::resolve) with a downcast to the concrete type.
    pub fn resolve_typed<T: Any + Send + Sync>(
        &mut self,
        key: &str,
    ) -> Result<ServiceInstancePtr<T>, ResolutionError> {
        self.resolve(key).and_then(|instance| {
            instance
                .downcast::<T>()
                .map_err(|_| ResolutionError::IncompatibleType(type_name::<T>()))
        })
    }

    /// Builds an instance from `target` without registering anything.
    ///
    /// Key targets are [resolve](Self::resolve)d first. When the resulting
    /// value is a [Blueprint], the described type is constructed, with each
    /// declared dependency key made recursively; any other value is
    /// returned unchanged. Dependency graphs referring back to a key under
    /// construction fail with [ResolutionError::CircularDependency].
    pub fn make<'a, M>(&mut self, target: M) -> Result<ServiceInstanceAnyPtr, ResolutionError>
    where
        M: Into<MakeTarget<'a>>,
    {
        self.make_with_args(target, Vec::new())
    }

    /// [make](Self::make) with extra arguments appended after the resolved
    /// dependencies, in call order. Extra arguments are dropped when the
    /// target turns out not to be constructible.
    pub fn make_with_args<'a, M>(
        &mut self,
        target: M,
        extra_args: Vec<ServiceInstanceAnyPtr>,
    ) -> Result<ServiceInstanceAnyPtr, ResolutionError>
    where
        M: Into<MakeTarget<'a>>,
    {
        match target.into() {
            MakeTarget::Key(key) => {
                if self.keys_under_construction.contains(key) {
                    return Err(ResolutionError::CircularDependency(key.to_string()));
                }

                let value = self.resolve(key)?;

                self.keys_under_construction.insert(key.to_string());
                let instance = self.instantiate_value(value, extra_args);
                self.keys_under_construction.remove(key);
                instance
            }
            MakeTarget::Value(value) => self.instantiate_value(value, extra_args),
        }
    }

    /// [make](Self::make) with a downcast to the concrete type.
    pub fn make_typed<'a, T, M>(
        &mut self,
        target: M,
    ) -> Result<ServiceInstancePtr<T>, ResolutionError>
    where
        T: Any + Send + Sync,
        M: Into<MakeTarget<'a>>,
    {
        self.make(target).and_then(|instance| {
            instance
                .downcast::<T>()
                .map_err(|_| ResolutionError::IncompatibleType(type_name::<T>()))
        })
    }

    /// Consumes a provider [Blueprint]: constructs the provider with no
    /// arguments and lets it register a group of services under `namespace`.
    ///
    /// Fails with [ProviderError::EmptyNamespace] on an empty namespace and
    /// with [ProviderError::MissingRegisterMethod] when the blueprint does
    /// not describe a provider (see [Blueprint::provider]); in both cases
    /// nothing is constructed or registered.
    pub fn consume(&mut self, namespace: &str, provider: &Blueprint) -> Result<(), ProviderError> {
        if namespace.is_empty() {
            return Err(ProviderError::EmptyNamespace);
        }

        let register = provider
            .register()
            .ok_or(ProviderError::MissingRegisterMethod)?;

        debug!(namespace = %namespace, "Consuming service provider.");
        register(self, namespace).map_err(ProviderError::Registration)
    }

    fn instantiate_value(
        &mut self,
        value: ServiceInstanceAnyPtr,
        extra_args: Vec<ServiceInstanceAnyPtr>,
    ) -> Result<ServiceInstanceAnyPtr, ResolutionError> {
        let blueprint = match value.downcast_ref::<Blueprint>() {
            Some(blueprint) => *blueprint,
            None => return Ok(value),
        };

        trace!(dependencies = ?blueprint.dependencies(), "Constructing service from blueprint.");

        let mut args: Vec<_> = blueprint
            .dependencies()
            .iter()
            .map(|dependency| self.make(*dependency))
            .try_collect()?;
        args.extend(extra_args);

        Ok(blueprint.construct(Arguments::new(args)))
    }
}
