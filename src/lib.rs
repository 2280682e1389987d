//! Auto-faking dependency container.
//!
//! Build a type under test from its constructor dependencies; every
//! capability the test did not configure is replaced by a fake whose
//! operations can be stubbed individually. Stubbing one capability and
//! providing a concrete instance for another commute: neither call touches
//! the other's entry, in whichever order they happen.

pub mod config;
pub mod di;
mod macros;

#[cfg(test)]
mod test_utils;

pub use config::{ContainerOptions, FakeMode, LateProvidePolicy, StubConflictPolicy};
pub use di::{
    ArgMatcher, Arguments, Behavior, Capability, CapabilityId, Container, ContainerError,
    ContainerStats, EntryKind, FakeDefault, Injectable, Operation, Parameter, StubBuilder,
    SyntheticHandle,
};
