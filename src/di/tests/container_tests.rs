use std::rc::Rc;

use crate::di::{ArgMatcher, Behavior, Container, ContainerError, EntryKind};
use crate::test_utils::{
    Directory, FakeDirectory, FakeGreeter, FixedDirectory, Greeter, StaticGreeter, TeardownLog,
};

fn static_greeter(greeting: &str) -> Rc<dyn Greeter> {
    Rc::new(StaticGreeter {
        greeting: greeting.to_string(),
    })
}

#[test]
fn test_new_container_is_empty() {
    let container = Container::new();
    let stats = container.stats();
    assert_eq!(stats.entries, 0);
    assert_eq!(stats.synthesized, 0);
    assert!(container.registered().is_empty());
    assert!(!container.is_disposed());
}

#[test]
fn test_resolve_returns_same_instance() {
    let mut container = Container::new();

    let first = container.resolve::<dyn Directory>().unwrap();
    let second = container.resolve::<dyn Directory>().unwrap();

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(container.stats().synthesized, 1);
    assert_eq!(container.entry_kind::<dyn Directory>(), EntryKind::Synthetic);
}

#[test]
fn test_stub_then_provide_other_keeps_stub() {
    let mut container = Container::new();

    container.on(&FakeDirectory::SIZE).returns(7).unwrap();
    container.provide(static_greeter("Hello")).unwrap();

    let directory = container.resolve::<dyn Directory>().unwrap();
    assert_eq!(directory.size(), 7);
}

#[test]
fn test_provide_other_then_stub_keeps_stub() {
    let mut container = Container::new();

    container.provide(static_greeter("Hello")).unwrap();
    container.on(&FakeDirectory::SIZE).returns(7).unwrap();

    let directory = container.resolve::<dyn Directory>().unwrap();
    assert_eq!(directory.size(), 7);
}

#[test]
fn test_provide_never_regenerates_other_fakes() {
    let mut container = Container::new();

    container.on(&FakeDirectory::SIZE).returns(3).unwrap();
    let handle_before = container.handle::<dyn Directory>().unwrap();
    let synthesized_before = container.stats().synthesized;

    container.provide(static_greeter("Hi")).unwrap();
    container.provide(static_greeter("Hey")).unwrap();

    let handle_after = container.handle::<dyn Directory>().unwrap();
    assert!(handle_before.ptr_eq(&handle_after));
    assert_eq!(container.stats().synthesized, synthesized_before);
    assert_eq!(handle_after.rule_count(), 1);
}

#[test]
fn test_provide_overrides_prior_stubs() {
    let mut container = Container::new();
    container.on(&FakeGreeter::GREET).returns("stubbed".to_string()).unwrap();

    let instance = static_greeter("Hello");
    container.provide(Rc::clone(&instance)).unwrap();

    let resolved = container.resolve::<dyn Greeter>().unwrap();
    assert!(Rc::ptr_eq(&resolved, &instance));
    assert_eq!(resolved.greet("Ana"), "Hello, Ana");
    assert_eq!(container.entry_kind::<dyn Greeter>(), EntryKind::Concrete);
}

#[test]
fn test_last_stub_wins() {
    let mut container = Container::new();
    container.on(&FakeDirectory::SIZE).returns(1).unwrap();
    container.on(&FakeDirectory::SIZE).returns(2).unwrap();

    let directory = container.resolve::<dyn Directory>().unwrap();
    assert_eq!(directory.size(), 2);
}

#[test]
fn test_argument_matchers_select_rule() {
    let mut container = Container::new();
    container
        .on(&FakeGreeter::GREET)
        .returns("hello, stranger".to_string())
        .unwrap();
    container
        .on(&FakeGreeter::GREET)
        .with_args(("Ana".to_string(),))
        .returns("olá, Ana".to_string())
        .unwrap();

    let greeter = container.resolve::<dyn Greeter>().unwrap();
    assert_eq!(greeter.greet("Ana"), "olá, Ana");
    assert_eq!(greeter.greet("Bob"), "hello, stranger");
}

#[test]
fn test_invokes_callback_with_arguments() {
    let mut container = Container::new();
    container
        .on(&FakeGreeter::GREET)
        .when(|(name,): &(String,)| name.starts_with('A'))
        .invokes(|(name,): &(String,)| name.to_uppercase())
        .unwrap();

    let greeter = container.resolve::<dyn Greeter>().unwrap();
    assert_eq!(greeter.greet("Ana"), "ANA");
    assert_eq!(greeter.greet("Bob"), "");
}

#[test]
fn test_stub_with_explicit_matcher_and_behavior() {
    let mut container = Container::new();
    container
        .stub(
            &FakeDirectory::SIZE,
            ArgMatcher::any(),
            Behavior::returns(11),
        )
        .unwrap();

    assert_eq!(container.resolve::<dyn Directory>().unwrap().size(), 11);
}

#[test]
fn test_stub_after_resolve_is_visible() {
    let mut container = Container::new();
    let directory = container.resolve::<dyn Directory>().unwrap();
    assert_eq!(directory.size(), 0);

    container.on(&FakeDirectory::SIZE).returns(42).unwrap();
    assert_eq!(directory.size(), 42);
}

#[test]
fn test_call_count() {
    let mut container = Container::new();
    assert_eq!(container.call_count(&FakeDirectory::SIZE).unwrap(), 0);

    let directory = container.resolve::<dyn Directory>().unwrap();
    directory.size();
    directory.size();
    directory.lookup("Ana".to_string());

    assert_eq!(container.call_count(&FakeDirectory::SIZE).unwrap(), 2);
    assert_eq!(container.call_count(&FakeDirectory::LOOKUP).unwrap(), 1);
}

#[test]
fn test_handle_on_provided_capability_conflicts() {
    let mut container = Container::new();
    container.provide(static_greeter("Hi")).unwrap();

    let err = container.handle::<dyn Greeter>().unwrap_err();
    assert_eq!(err, ContainerError::conflict::<dyn Greeter>());
}

#[test]
fn test_registered_lists_entries_in_configuration_order() {
    let mut container = Container::new();
    container.provide(static_greeter("Hi")).unwrap();
    container.on(&FakeDirectory::SIZE).returns(1).unwrap();

    let registered = container.registered();
    assert_eq!(registered.len(), 2);
    assert_eq!(registered[0].1, EntryKind::Concrete);
    assert_eq!(registered[1].1, EntryKind::Synthetic);
    assert!(registered[1].0.name().contains("Directory"));

    let stats = container.stats();
    assert_eq!(stats.synthetic, 1);
    assert_eq!(stats.concrete, 1);
}

#[test]
fn test_dispose_rejects_further_use() {
    let mut container = Container::new();
    container.resolve::<dyn Directory>().unwrap();
    container.dispose();

    assert!(container.is_disposed());
    assert_eq!(
        container.resolve::<dyn Directory>().err(),
        Some(ContainerError::Disposed)
    );
    assert_eq!(
        container.on(&FakeDirectory::SIZE).returns(1),
        Err(ContainerError::Disposed)
    );
    assert_eq!(
        container.provide(static_greeter("Hi")),
        Err(ContainerError::Disposed)
    );
    assert_eq!(
        container.build::<crate::test_utils::Concierge>().err(),
        Some(ContainerError::Disposed)
    );
    assert_eq!(container.stats().entries, 0);
}

#[test]
fn test_dispose_releases_stub_tables() {
    let mut container = Container::new();
    container.on(&FakeDirectory::SIZE).returns(9).unwrap();
    let directory = container.resolve::<dyn Directory>().unwrap();
    let handle = container.handle::<dyn Directory>().unwrap();
    assert_eq!(directory.size(), 9);

    container.dispose();

    assert_eq!(handle.rule_count(), 0);
    assert_eq!(directory.size(), 0);
}

#[test]
fn test_dispose_is_idempotent() {
    let log = Rc::new(TeardownLog::default());
    let mut container = Container::new();
    let recorder = Rc::clone(&log);
    container
        .provide_owned(static_greeter("Hi"), move |_| recorder.record("greeter"))
        .unwrap();

    container.dispose();
    container.dispose();

    assert_eq!(log.entries(), vec!["greeter".to_string()]);
}

#[test]
fn test_borrowed_instances_are_not_torn_down() {
    let directory: Rc<dyn Directory> = Rc::new(FixedDirectory { entries: 4 });
    let mut container = Container::new();
    container.provide(Rc::clone(&directory)).unwrap();
    assert_eq!(Rc::strong_count(&directory), 2);

    container.dispose();

    assert_eq!(Rc::strong_count(&directory), 1);
    assert_eq!(directory.size(), 4);
}

#[test]
fn test_owned_instances_torn_down_on_drop() {
    let log = Rc::new(TeardownLog::default());
    {
        let mut container = Container::new();
        let recorder = Rc::clone(&log);
        container
            .provide_owned(
                Rc::new(FixedDirectory { entries: 2 }) as Rc<dyn Directory>,
                move |directory| recorder.record(format!("directory:{}", directory.size())),
            )
            .unwrap();
        assert!(log.entries().is_empty());
    }

    assert_eq!(log.entries(), vec!["directory:2".to_string()]);
}

#[test]
fn test_scoped_disposes_after_closure() {
    let log = Rc::new(TeardownLog::default());
    let recorder = Rc::clone(&log);

    let size = Container::scoped(Default::default(), move |container| {
        container
            .provide_owned(
                Rc::new(FixedDirectory { entries: 5 }) as Rc<dyn Directory>,
                move |_| recorder.record("scope"),
            )
            .unwrap();
        container.resolve::<dyn Directory>().unwrap().size()
    });

    assert_eq!(size, 5);
    assert_eq!(log.entries(), vec!["scope".to_string()]);
}
