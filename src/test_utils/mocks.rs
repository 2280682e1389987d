//! Capabilities and targets shared by the unit tests

use std::cell::RefCell;
use std::rc::Rc;

use crate::{
    fake_capability, Arguments, Capability, ContainerError, Injectable, Operation, Parameter,
    SyntheticHandle,
};

pub trait Greeter {
    fn greet(&self, name: &str) -> String;
}

/// Hand-written adapter: `greet` borrows its argument, so it is copied into
/// an owned tuple before dispatch
#[derive(Debug)]
pub struct FakeGreeter {
    handle: SyntheticHandle,
}

impl FakeGreeter {
    pub const GREET: Operation<dyn Greeter, (String,), String> = Operation::new("greet");
}

impl Greeter for FakeGreeter {
    fn greet(&self, name: &str) -> String {
        self.handle.invoke(&Self::GREET, (name.to_owned(),))
    }
}

impl Capability for dyn Greeter {
    fn synthesize(handle: SyntheticHandle) -> Rc<Self> {
        Rc::new(FakeGreeter { handle })
    }
}

pub struct StaticGreeter {
    pub greeting: String,
}

impl Greeter for StaticGreeter {
    fn greet(&self, name: &str) -> String {
        format!("{}, {}", self.greeting, name)
    }
}

pub trait Address {
    fn city(&self) -> String;
}

pub trait Directory {
    fn lookup(&self, name: String) -> Rc<dyn Address>;
    fn size(&self) -> usize;
}

fake_capability! {
    dyn Address as FakeAddress {
        fn city(&self) -> String => CITY;
    }
}

fake_capability! {
    dyn Directory as FakeDirectory {
        fn lookup(&self, name: String) -> Rc<dyn Address> => LOOKUP;
        fn size(&self) -> usize => SIZE;
    }
}

/// Operations returning tuples
pub trait Ledger {
    fn totals(&self) -> (u32, String);
    fn latest(&self, account: u64) -> (bool, Rc<dyn Address>);
}

fake_capability! {
    dyn Ledger as FakeLedger {
        fn totals(&self) -> (u32, String) => TOTALS;
        fn latest(&self, account: u64) -> (bool, Rc<dyn Address>) => LATEST;
    }
}

pub struct FixedDirectory {
    pub entries: usize,
}

impl Directory for FixedDirectory {
    fn lookup(&self, _name: String) -> Rc<dyn Address> {
        Rc::new(FixedAddress)
    }

    fn size(&self) -> usize {
        self.entries
    }
}

pub struct FixedAddress;

impl Address for FixedAddress {
    fn city(&self) -> String {
        "Lisbon".to_string()
    }
}

/// Concrete dependency with no fake; it has to be provided
#[derive(Debug)]
pub struct Clock {
    pub now: u64,
}

pub struct Reminder {
    pub clock: Rc<Clock>,
    pub greeter: Rc<dyn Greeter>,
}

impl Reminder {
    pub fn remind(&self, name: &str) -> String {
        format!("{} @ {}", self.greeter.greet(name), self.clock.now)
    }
}

impl Injectable for Reminder {
    fn parameters() -> Vec<Parameter> {
        vec![
            Parameter::provided::<Clock>(),
            Parameter::capability::<dyn Greeter>(),
        ]
    }

    fn construct(args: &mut Arguments) -> Result<Self, ContainerError> {
        Ok(Self {
            clock: args.next()?,
            greeter: args.next()?,
        })
    }
}

pub struct Concierge {
    pub greeter: Rc<dyn Greeter>,
    pub directory: Rc<dyn Directory>,
}

impl Concierge {
    pub fn welcome(&self, name: &str) -> String {
        let city = self.directory.lookup(name.to_string()).city();
        format!("{} from {}", self.greeter.greet(name), city)
    }
}

impl Injectable for Concierge {
    fn parameters() -> Vec<Parameter> {
        vec![
            Parameter::capability::<dyn Greeter>(),
            Parameter::capability::<dyn Directory>(),
        ]
    }

    fn construct(args: &mut Arguments) -> Result<Self, ContainerError> {
        Ok(Self {
            greeter: args.next()?,
            directory: args.next()?,
        })
    }
}

/// Depends on a concrete target that is built recursively
pub struct FrontDesk {
    pub concierge: Rc<Concierge>,
    pub directory: Rc<dyn Directory>,
}

impl Injectable for FrontDesk {
    fn parameters() -> Vec<Parameter> {
        vec![
            Parameter::injectable::<Concierge>(),
            Parameter::capability::<dyn Directory>(),
        ]
    }

    fn construct(args: &mut Arguments) -> Result<Self, ContainerError> {
        Ok(Self {
            concierge: args.next()?,
            directory: args.next()?,
        })
    }
}

/// Needs a fake directory before failing on the unprovided clock
#[allow(dead_code)]
pub struct Archive {
    pub directory: Rc<dyn Directory>,
    pub reminder: Rc<Reminder>,
}

impl Injectable for Archive {
    fn parameters() -> Vec<Parameter> {
        vec![
            Parameter::capability::<dyn Directory>(),
            Parameter::injectable::<Reminder>(),
        ]
    }

    fn construct(args: &mut Arguments) -> Result<Self, ContainerError> {
        Ok(Self {
            directory: args.next()?,
            reminder: args.next()?,
        })
    }
}

#[allow(dead_code)]
pub struct Chicken {
    pub egg: Rc<Egg>,
}

#[allow(dead_code)]
pub struct Egg {
    pub chicken: Rc<Chicken>,
}

impl Injectable for Chicken {
    fn parameters() -> Vec<Parameter> {
        vec![Parameter::injectable::<Egg>()]
    }

    fn construct(args: &mut Arguments) -> Result<Self, ContainerError> {
        Ok(Self { egg: args.next()? })
    }
}

impl Injectable for Egg {
    fn parameters() -> Vec<Parameter> {
        vec![Parameter::injectable::<Chicken>()]
    }

    fn construct(args: &mut Arguments) -> Result<Self, ContainerError> {
        Ok(Self {
            chicken: args.next()?,
        })
    }
}

/// Asks for its parameters in the wrong order
#[allow(dead_code)]
pub struct Confused {
    pub directory: Rc<dyn Directory>,
}

impl Injectable for Confused {
    fn parameters() -> Vec<Parameter> {
        vec![
            Parameter::capability::<dyn Greeter>(),
            Parameter::capability::<dyn Directory>(),
        ]
    }

    fn construct(args: &mut Arguments) -> Result<Self, ContainerError> {
        Ok(Self {
            directory: args.next()?,
        })
    }
}

/// Constructor that always fails
pub struct Broken;

impl Injectable for Broken {
    fn parameters() -> Vec<Parameter> {
        vec![Parameter::capability::<dyn Greeter>()]
    }

    fn construct(args: &mut Arguments) -> Result<Self, ContainerError> {
        let _greeter = args.next::<dyn Greeter>()?;
        Err(ContainerError::construction::<Self>("greeter rejected"))
    }
}

/// Records teardown calls for `provide_owned`
#[derive(Default)]
pub struct TeardownLog {
    pub entries: RefCell<Vec<String>>,
}

impl TeardownLog {
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }
}
