//! Functionality related to constructible services.
//!
//! Most values living in a [Container](crate::container::Container) are
//! opaque: the container stores what factories produce and hands it out
//! without looking inside. A type opts into construction *by* the container
//! through [Injectable], which declares an ordered list of dependency keys
//! and a constructor taking the resolved values. Registering a
//! [Blueprint] for the type under a key then lets
//! [make](crate::container::Container::make) build fresh instances,
//! resolving and constructing the declared dependencies recursively:
//!
//! ```
//! use bindery::container::Container;
//! use bindery::injectable::{Arguments, Blueprint, Injectable};
//! use bindery::service::ServiceInstancePtr;
//!
//! struct Mailer {
//!     transport: ServiceInstancePtr<String>,
//! }
//!
//! impl Injectable for Mailer {
//!     fn dependencies() -> &'static [&'static str] {
//!         &["Transport"]
//!     }
//!
//!     fn construct(mut args: Arguments) -> Self {
//!         Self {
//!             transport: args.take::<String>(),
//!         }
//!     }
//! }
//!
//! let mut container = Container::new("/app");
//! container.bind("Transport", || "smtp".to_string());
//! container.bind("Mailer", || Blueprint::of::<Mailer>());
//!
//! let mailer = container.make_typed::<Mailer, _>("Mailer").unwrap();
//! assert_eq!("smtp", mailer.transport.as_str());
//! ```
//!
//! Dependency keys go through the full resolution chain, so fakes, aliases,
//! and module fallback all apply to injected values as well.

use crate::container::Container;
use crate::provider::ServiceProvider;
use crate::service::{ErrorPtr, ServiceInstanceAnyPtr, ServiceInstancePtr};
use derivative::Derivative;
use std::any::{type_name, Any};
use std::collections::VecDeque;

type ConstructFn = fn(Arguments) -> ServiceInstanceAnyPtr;
type RegisterFn = fn(&mut Container, &str) -> Result<(), ErrorPtr>;

/// Positional arguments passed to [Injectable::construct]: the resolved
/// dependencies in declaration order, followed by any extra arguments given
/// to [make_with_args](crate::container::Container::make_with_args) in call
/// order.
#[derive(Derivative, Default)]
#[derivative(Debug)]
pub struct Arguments {
    #[derivative(Debug = "ignore")]
    values: VecDeque<ServiceInstanceAnyPtr>,
    taken: usize,
}

impl Arguments {
    pub(crate) fn new(values: Vec<ServiceInstanceAnyPtr>) -> Self {
        Self {
            values: values.into(),
            taken: 0,
        }
    }

    /// Removes and returns the next argument, downcast to `T`.
    ///
    /// # Panics
    ///
    /// Panics when no arguments remain or the next argument is not a `T`.
    /// Either means the [Injectable::dependencies] declaration disagrees
    /// with what [Injectable::construct] takes, which cannot be handled
    /// gracefully.
    pub fn take<T: Any + Send + Sync>(&mut self) -> ServiceInstancePtr<T> {
        let position = self.taken;
        let value = self
            .values
            .pop_front()
            .unwrap_or_else(|| panic!("Missing constructor argument at position {}", position));
        self.taken += 1;
        value.downcast::<T>().unwrap_or_else(|_| {
            panic!(
                "Constructor argument at position {} is not a '{}'",
                position,
                type_name::<T>()
            )
        })
    }

    /// Removes and returns all arguments not yet taken, preserving order.
    /// Useful for constructors accepting a variadic tail of extra arguments.
    pub fn remaining(&mut self) -> Vec<ServiceInstanceAnyPtr> {
        self.taken += self.values.len();
        self.values.drain(..).collect()
    }

    /// Number of arguments not yet taken.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A type the container knows how to construct from resolved dependencies.
///
/// Dependencies are declared as a static ordered list of container keys and
/// default to none. See the [module docs](self) for a complete example.
pub trait Injectable: Any + Send + Sync + Sized {
    /// Keys resolved and passed to [construct](Self::construct), in order.
    fn dependencies() -> &'static [&'static str] {
        &[]
    }

    /// Creates an instance from the given positional arguments.
    fn construct(args: Arguments) -> Self;
}

/// Type-erased construction descriptor for an [Injectable] type.
///
/// A `Blueprint` is an ordinary container value: register a factory
/// returning one and [make](crate::container::Container::make) will
/// recognize it and construct the described type instead of returning the
/// descriptor itself. Values which are not blueprints pass through `make`
/// unchanged.
#[derive(Derivative, Clone, Copy)]
#[derivative(Debug)]
pub struct Blueprint {
    dependencies: &'static [&'static str],
    #[derivative(Debug = "ignore")]
    construct: ConstructFn,
    #[derivative(Debug = "ignore")]
    register: Option<RegisterFn>,
}

impl Blueprint {
    /// Describes how to construct a `T`.
    pub fn of<T: Injectable>() -> Self {
        Self {
            dependencies: T::dependencies(),
            construct: |args| ServiceInstancePtr::new(T::construct(args)) as ServiceInstanceAnyPtr,
            register: None,
        }
    }

    /// Describes a service provider: constructible like [of](Self::of), and
    /// additionally exposing registration to
    /// [consume](crate::container::Container::consume). The provider is
    /// constructed with no arguments when consumed.
    pub fn provider<P: Injectable + ServiceProvider>() -> Self {
        Self {
            register: Some(|container, namespace| {
                P::construct(Arguments::default()).register(container, namespace)
            }),
            ..Self::of::<P>()
        }
    }

    #[inline]
    pub(crate) fn dependencies(&self) -> &'static [&'static str] {
        self.dependencies
    }

    #[inline]
    pub(crate) fn construct(&self, args: Arguments) -> ServiceInstanceAnyPtr {
        (self.construct)(args)
    }

    #[inline]
    pub(crate) fn register(&self) -> Option<RegisterFn> {
        self.register
    }
}
