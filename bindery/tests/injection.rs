use bindery::container::{Container, ContainerBuilder};
use bindery::error::ResolutionError;
use bindery::injectable::{Arguments, Blueprint, Injectable};
use bindery::loader::StaticModuleLoader;
use bindery::provider::ServiceProvider;
use bindery::service::{ErrorPtr, ServiceInstanceAnyPtr, ServiceInstancePtr};

struct Engine {
    cylinders: u32,
}

impl Injectable for Engine {
    fn construct(_args: Arguments) -> Self {
        Self { cylinders: 4 }
    }
}

struct Car {
    engine: ServiceInstancePtr<Engine>,
}

impl Injectable for Car {
    fn dependencies() -> &'static [&'static str] {
        &["Engine"]
    }

    fn construct(mut args: Arguments) -> Self {
        Self {
            engine: args.take::<Engine>(),
        }
    }
}

struct Garage {
    car: ServiceInstancePtr<Car>,
}

impl Injectable for Garage {
    fn dependencies() -> &'static [&'static str] {
        &["Car"]
    }

    fn construct(mut args: Arguments) -> Self {
        Self {
            car: args.take::<Car>(),
        }
    }
}

struct Pair {
    first: ServiceInstancePtr<u32>,
    second: ServiceInstancePtr<String>,
}

impl Injectable for Pair {
    fn dependencies() -> &'static [&'static str] {
        &["First", "Second"]
    }

    fn construct(mut args: Arguments) -> Self {
        Self {
            first: args.take::<u32>(),
            second: args.take::<String>(),
        }
    }
}

struct Report {
    title: ServiceInstancePtr<String>,
    attachments: Vec<ServiceInstanceAnyPtr>,
}

impl Injectable for Report {
    fn dependencies() -> &'static [&'static str] {
        &["Title"]
    }

    fn construct(mut args: Arguments) -> Self {
        Self {
            title: args.take::<String>(),
            attachments: args.remaining(),
        }
    }
}

struct VehicleProvider;

impl Injectable for VehicleProvider {
    fn construct(_args: Arguments) -> Self {
        Self
    }
}

impl ServiceProvider for VehicleProvider {
    fn register(&self, container: &mut Container, namespace: &str) -> Result<(), ErrorPtr> {
        container.singleton(&format!("{}/Engine", namespace), || Blueprint::of::<Engine>());
        container.bind(&format!("{}/Car", namespace), || Blueprint::of::<Car>());
        container.alias("Engine", &format!("{}/Engine", namespace));
        Ok(())
    }
}

#[test]
fn should_make_instance_from_bound_blueprint() {
    let mut container = Container::new("/app");
    container.bind("Engine", || Blueprint::of::<Engine>());

    let engine = container.make_typed::<Engine, _>("Engine").unwrap();

    assert_eq!(4, engine.cylinders);
}

#[test]
fn should_return_non_constructible_value_unchanged() {
    let mut container = Container::new("/app");
    container.bind("Value", || 7_i32);

    let resolved = container.resolve("Value").unwrap();
    let made = container.make(resolved.clone()).unwrap();

    assert!(ServiceInstancePtr::ptr_eq(&resolved, &made));
}

#[test]
fn should_drop_extra_args_for_non_constructible_target() {
    let mut container = Container::new("/app");
    container.bind("Value", || 7_i32);

    let made = container
        .make_with_args(
            "Value",
            vec![ServiceInstancePtr::new(1_i32) as ServiceInstanceAnyPtr],
        )
        .unwrap();

    assert_eq!(Some(&7), made.downcast_ref::<i32>());
}

#[test]
fn should_inject_declared_dependencies_in_order() {
    let mut container = Container::new("/app");
    container.bind("First", || 7_u32);
    container.bind("Second", || "two".to_string());
    container.bind("Pair", || Blueprint::of::<Pair>());

    let pair = container.make_typed::<Pair, _>("Pair").unwrap();

    assert_eq!(7, *pair.first);
    assert_eq!("two", pair.second.as_str());
}

#[test]
fn should_append_extra_args_after_dependencies() {
    let mut container = Container::new("/app");
    container.bind("Title", || "Quarterly".to_string());
    container.bind("Report", || Blueprint::of::<Report>());

    let report = container
        .make_with_args(
            "Report",
            vec![
                ServiceInstancePtr::new(1_i32) as ServiceInstanceAnyPtr,
                ServiceInstancePtr::new("attachment".to_string()) as ServiceInstanceAnyPtr,
            ],
        )
        .unwrap()
        .downcast::<Report>()
        .unwrap();

    assert_eq!("Quarterly", report.title.as_str());
    assert_eq!(2, report.attachments.len());
    assert_eq!(Some(&1), report.attachments[0].downcast_ref::<i32>());
    assert_eq!(
        Some("attachment"),
        report.attachments[1]
            .downcast_ref::<String>()
            .map(String::as_str)
    );
}

#[test]
fn should_construct_recursively_through_three_levels() {
    let mut container = Container::new("/app");
    container.bind("Engine", || Blueprint::of::<Engine>());
    container.bind("Car", || Blueprint::of::<Car>());
    container.bind("Garage", || Blueprint::of::<Garage>());

    let garage = container.make_typed::<Garage, _>("Garage").unwrap();

    assert_eq!(4, garage.car.engine.cylinders);
}

#[test]
fn should_inject_plain_values_as_dependencies() {
    let mut container = Container::new("/app");
    container.bind("Engine", || Engine { cylinders: 8 });
    container.bind("Car", || Blueprint::of::<Car>());

    let car = container.make_typed::<Car, _>("Car").unwrap();

    assert_eq!(8, car.engine.cylinders);
}

#[test]
fn should_construct_dependencies_through_fakes() {
    let mut container = Container::new("/app");
    container.bind("Engine", || Blueprint::of::<Engine>());
    container.bind("Car", || Blueprint::of::<Car>());
    container.fake("Engine", || Engine { cylinders: 12 });

    let car = container.make_typed::<Car, _>("Car").unwrap();

    assert_eq!(12, car.engine.cylinders);
}

#[test]
fn should_make_blueprint_loaded_as_module() {
    let loader = StaticModuleLoader::new().with_module("vehicles/engine", || Blueprint::of::<Engine>());
    let mut container = ContainerBuilder::new("/app")
        .with_loader(Box::new(loader))
        .build();

    let engine = container.make_typed::<Engine, _>("vehicles/engine").unwrap();

    assert_eq!(4, engine.cylinders);
}

#[test]
fn should_make_fresh_instance_per_call() {
    let mut container = Container::new("/app");
    container.bind("Engine", || Blueprint::of::<Engine>());

    let first = container.make("Engine").unwrap();
    let second = container.make("Engine").unwrap();

    assert!(!ServiceInstancePtr::ptr_eq(&first, &second));
}

#[test]
fn should_fail_make_for_unknown_key() {
    let mut container = Container::new("/app");

    assert!(matches!(
        container.make("Nope"),
        Err(ResolutionError::NotFound(key)) if key == "Nope"
    ));
}

#[test]
fn should_report_incompatible_type_on_typed_make() {
    let mut container = Container::new("/app");
    container.bind("Engine", || Blueprint::of::<Engine>());

    assert!(matches!(
        container.make_typed::<Car, _>("Engine"),
        Err(ResolutionError::IncompatibleType(_))
    ));
}

#[test]
fn should_register_services_under_namespace_via_provider() {
    let mut container = Container::new("/app");

    container
        .consume("Vehicles", &Blueprint::provider::<VehicleProvider>())
        .unwrap();

    let car = container.make_typed::<Car, _>("Vehicles/Car").unwrap();
    assert_eq!(4, car.engine.cylinders);
}
