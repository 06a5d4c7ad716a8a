//! Core types for passing service instances around in type-erased form.

use std::any::Any;
use std::error::Error;
use std::sync::Arc;

/// Pointer in which resolved service instances are wrapped and shared.
pub type ServiceInstancePtr<T> = Arc<T>;

/// Type-erased [ServiceInstancePtr], as stored inside a container.
pub type ServiceInstanceAnyPtr = ServiceInstancePtr<dyn Any + Send + Sync + 'static>;

/// Generic pointer for errors originating outside this crate.
pub type ErrorPtr = Arc<dyn Error + Send + Sync + 'static>;

/// Boxed factory producing a type-erased service instance per call.
pub type FactoryFn = Box<dyn Fn() -> ServiceInstanceAnyPtr + Send + Sync>;
