//! Auto-faking dependency injection.
//!
//! The pieces, leaves first: a [`TypeRegistry`] of capability entries, a
//! [`SyntheticFactory`] that mints fakes, the [`ResolutionCache`] that hands
//! out one instance per capability, the [`ConfigurationApplier`] for stub and
//! provide calls, the [`DependencyGraphBuilder`] for constructing targets, and
//! the [`Container`] façade tying them together.

pub mod builder;
pub mod cache;
pub mod capability;
pub mod configure;
pub mod container;
pub mod error;
pub mod registry;
pub mod synthetic;

pub use builder::{Arguments, DependencyGraphBuilder, Injectable, Parameter};
pub use cache::ResolutionCache;
pub use capability::{Capability, CapabilityId, Operation};
pub use configure::ConfigurationApplier;
pub use container::{Container, ContainerStats, StubBuilder};
pub use error::ContainerError;
pub use registry::{ConcreteEntry, EntryKind, RegistryEntry, TypeRegistry};
pub use synthetic::{
    ArgMatcher, Behavior, FakeDefault, StubRule, SyntheticEntry, SyntheticFactory,
    SyntheticHandle,
};

#[cfg(test)]
mod tests;
