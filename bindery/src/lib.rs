//! A string-keyed service container for explicit, runtime dependency
//! resolution.
//!
//! A [Container](container::Container) owns all resolution state for one
//! root path and is passed around explicitly. It offers:
//!
//! * factories registered under string keys, with transient or singleton
//!   lifecycle ([bind](container::Container::bind) /
//!   [singleton](container::Container::singleton));
//! * test fakes shadowing any key until restored
//!   ([fake](container::Container::fake) /
//!   [restore](container::Container::restore));
//! * alias redirection between keys ([alias](container::Container::alias));
//! * a pluggable fallback resolving unmatched keys as modules under the
//!   root path ([loader](crate::loader));
//! * recursive constructor injection for types declaring their dependency
//!   keys ([make](container::Container::make), [injectable](crate::injectable));
//! * providers registering whole groups of services under a namespace
//!   ([consume](container::Container::consume), [provider](crate::provider)).
//!
//! ```
//! use bindery::container::Container;
//! use bindery::service::ServiceInstancePtr;
//!
//! let mut container = Container::new("/app");
//! container.singleton("Counter", || 0_u64);
//!
//! let first = container.resolve("Counter").unwrap();
//! let second = container.resolve("Counter").unwrap();
//! assert!(ServiceInstancePtr::ptr_eq(&first, &second));
//!
//! container.fake("Counter", || 42_u64);
//! let faked = container.resolve_typed::<u64>("Counter").unwrap();
//! assert_eq!(42, *faked);
//!
//! container.restore("Counter");
//! assert!(ServiceInstancePtr::ptr_eq(&first, &container.resolve("Counter").unwrap()));
//! ```

pub mod container;
pub mod error;
pub mod injectable;
pub mod loader;
pub mod provider;
mod registry;
pub mod service;
