//! Error types for container operations.

use crate::service::ErrorPtr;
use thiserror::Error;

/// Errors which can occur when resolving or constructing services.
#[derive(Error, Clone, Debug)]
pub enum ResolutionError {
    /// No fake, binding, alias, or module matched the requested key.
    #[error("Key '{0}' was not found in any binding, alias, or module under the container root")]
    NotFound(String),
    /// Alias redirects form a loop which can never reach a binding.
    #[error("Alias chain starting at '{0}' loops back on itself")]
    CircularAlias(String),
    /// A dependency graph refers back to a key already being constructed.
    #[error("Detected circular dependency while constructing '{0}'")]
    CircularDependency(String),
    /// The resolved instance is not of the requested concrete type.
    #[error("Service instance cannot be downcast to '{0}'")]
    IncompatibleType(&'static str),
    /// The module bridge matched the key but failed to produce a value.
    #[error("Module for key '{0}' failed to load: {1}")]
    ModuleLoad(String, ErrorPtr),
}

/// Errors which can occur when consuming a service provider.
#[derive(Error, Clone, Debug)]
pub enum ProviderError {
    /// Providers must be consumed under a non-empty namespace.
    #[error("Cannot consume a provider under an empty namespace")]
    EmptyNamespace,
    /// The given blueprint does not expose provider registration.
    #[error("Provider does not expose a register method")]
    MissingRegisterMethod,
    /// The provider's registration logic reported an error.
    #[error("Provider registration failed: {0}")]
    Registration(ErrorPtr),
}

/// Errors reported by a [ModuleLoader](crate::loader::ModuleLoader).
#[derive(Error, Clone, Debug)]
pub enum ModuleLoadError {
    /// No module is known under the given key.
    #[error("No module found under '{0}'")]
    NotFound(String),
    /// The module exists but could not produce a value.
    #[error("Module load failed: {0}")]
    LoadFailed(ErrorPtr),
}
