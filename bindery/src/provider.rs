//! Service providers: values which register groups of related services.

use crate::container::Container;
use crate::service::ErrorPtr;

/// Capability for registering a group of related services under a namespace.
///
/// Providers are consumed through [consume](Container::consume), which
/// constructs the provider with no arguments and hands it the container
/// together with the target namespace. Keys registered here should
/// incorporate the namespace by convention.
pub trait ServiceProvider {
    /// Performs this provider's registrations against `container`.
    fn register(&self, container: &mut Container, namespace: &str) -> Result<(), ErrorPtr>;
}
