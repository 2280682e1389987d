use std::rc::Rc;

use tracing::{debug, trace};

use super::builder::{DependencyGraphBuilder, Injectable};
use super::cache::ResolutionCache;
use super::capability::{Capability, CapabilityId, Operation};
use super::configure::ConfigurationApplier;
use super::error::ContainerError;
use super::registry::EntryKind;
use super::synthetic::{ArgMatcher, Behavior, SyntheticFactory, SyntheticHandle};
use crate::config::ContainerOptions;

/// Snapshot of what a container currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerStats {
    /// Entries in the registry
    pub entries: usize,
    /// Entries backed by a fake
    pub synthetic: usize,
    /// Entries backed by a provided instance
    pub concrete: usize,
    /// Fakes stored in the registry since creation
    pub synthesized: usize,
}

/// Auto-faking dependency container.
///
/// Capabilities that are not configured resolve to fakes. Configure them with
/// [`stub`](Container::stub) / [`on`](Container::on) or replace them with
/// [`provide`](Container::provide), in any order, then [`build`](Container::build)
/// the type under test.
///
/// The container is single-threaded and is torn down by [`dispose`](Container::dispose)
/// or when dropped.
pub struct Container {
    cache: ResolutionCache,
    options: ContainerOptions,
    disposed: bool,
}

impl Container {
    /// Create a container with default options
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    pub fn with_options(options: ContainerOptions) -> Self {
        debug!(container = options.label(), mode = ?options.fake_mode, "container created");
        Self {
            cache: ResolutionCache::new(options.fake_mode),
            options,
            disposed: false,
        }
    }

    /// Run `f` with a fresh container and dispose it afterwards
    ///
    /// ```rust
    /// use autofake::{Container, ContainerOptions};
    ///
    /// let entries = Container::scoped(ContainerOptions::default(), |container| {
    ///     container.provide::<String>(std::rc::Rc::new("config".to_string())).unwrap();
    ///     container.stats().entries
    /// });
    /// assert_eq!(entries, 1);
    /// ```
    pub fn scoped<R>(options: ContainerOptions, f: impl FnOnce(&mut Container) -> R) -> R {
        let mut container = Self::with_options(options);
        let result = f(&mut container);
        container.dispose();
        result
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    fn ensure_live(&self) -> Result<(), ContainerError> {
        if self.disposed {
            Err(ContainerError::Disposed)
        } else {
            Ok(())
        }
    }

    fn applier(&mut self) -> ConfigurationApplier<'_> {
        ConfigurationApplier::new(&mut self.cache, &self.options)
    }

    /// Add a stub rule to the fake of `C`
    pub fn stub<C, A, R>(
        &mut self,
        operation: &Operation<C, A, R>,
        matcher: ArgMatcher<A>,
        behavior: Behavior<A, R>,
    ) -> Result<(), ContainerError>
    where
        C: Capability + ?Sized,
        A: 'static,
        R: Clone + 'static,
    {
        self.ensure_live()?;
        self.applier().stub(operation, matcher, behavior)
    }

    /// Start a fluent stub for `operation`
    pub fn on<C, A, R>(&mut self, operation: &Operation<C, A, R>) -> StubBuilder<'_, C, A, R>
    where
        C: Capability + ?Sized,
        A: 'static,
        R: Clone + 'static,
    {
        StubBuilder {
            container: self,
            operation: *operation,
            matcher: ArgMatcher::Any,
        }
    }

    /// Use `instance` for `C` instead of a fake
    pub fn provide<C: ?Sized + 'static>(&mut self, instance: Rc<C>) -> Result<(), ContainerError> {
        self.ensure_live()?;
        self.applier().provide(instance)
    }

    /// Use `instance` for `C` and run `teardown` on it when the container releases it
    pub fn provide_owned<C: ?Sized + 'static>(
        &mut self,
        instance: Rc<C>,
        teardown: impl FnOnce(&C) + 'static,
    ) -> Result<(), ContainerError> {
        self.ensure_live()?;
        self.applier().provide_owned(instance, teardown)
    }

    /// The single instance every consumer of `C` receives
    pub fn resolve<C: Capability + ?Sized>(&mut self) -> Result<Rc<C>, ContainerError> {
        self.ensure_live()?;
        trace!(container = self.options.label(), capability = std::any::type_name::<C>(), "resolve");
        self.cache.resolve::<C>()
    }

    /// Construct `T`, resolving its parameters through the cache
    pub fn build<T: Injectable>(&mut self) -> Result<T, ContainerError> {
        self.ensure_live()?;
        DependencyGraphBuilder::new(&mut self.cache).build::<T>()
    }

    /// Handle of the fake of `C`, creating the fake if needed
    pub fn handle<C: Capability + ?Sized>(&mut self) -> Result<SyntheticHandle, ContainerError> {
        self.ensure_live()?;
        self.cache
            .synthetic_handle(CapabilityId::of::<C>(), SyntheticFactory::create::<C>)
            .ok_or_else(ContainerError::conflict::<C>)
    }

    /// Calls received by `operation` on the fake of `C`; zero if no fake exists
    pub fn call_count<C, A, R>(&self, operation: &Operation<C, A, R>) -> Result<usize, ContainerError>
    where
        C: Capability + ?Sized,
    {
        self.ensure_live()?;
        Ok(self
            .cache
            .existing_handle(&CapabilityId::of::<C>())
            .map_or(0, |handle| handle.call_count(operation)))
    }

    pub fn entry_kind<C: ?Sized + 'static>(&self) -> EntryKind {
        self.cache.kind(&CapabilityId::of::<C>())
    }

    /// Registered capabilities in the order they were first configured or resolved
    pub fn registered(&self) -> Vec<(CapabilityId, EntryKind)> {
        self.cache
            .registry()
            .iter()
            .map(|(id, entry)| (*id, entry.kind()))
            .collect()
    }

    pub fn stats(&self) -> ContainerStats {
        let registry = self.cache.registry();
        let synthetic = registry
            .iter()
            .filter(|(_, entry)| entry.kind() == EntryKind::Synthetic)
            .count();
        ContainerStats {
            entries: registry.len(),
            synthetic,
            concrete: registry.len() - synthetic,
            synthesized: self.cache.synthesized(),
        }
    }

    /// Release every fake and owned instance. Later operations fail with
    /// [`ContainerError::Disposed`]. Calling it again does nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        let (fakes, owned) = self.cache.clear();
        debug!(container = self.options.label(), fakes, owned, "container disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Fluent stub configuration returned by [`Container::on`]
pub struct StubBuilder<'c, C: ?Sized, A, R> {
    container: &'c mut Container,
    operation: Operation<C, A, R>,
    matcher: ArgMatcher<A>,
}

impl<C, A, R> StubBuilder<'_, C, A, R>
where
    C: Capability + ?Sized,
    A: 'static,
    R: Clone + 'static,
{
    /// Only apply to calls whose arguments satisfy `predicate`
    pub fn when(mut self, predicate: impl Fn(&A) -> bool + 'static) -> Self {
        self.matcher = ArgMatcher::when(predicate);
        self
    }

    /// Only apply to calls with exactly these arguments
    pub fn with_args(mut self, args: A) -> Self
    where
        A: PartialEq,
    {
        self.matcher = ArgMatcher::eq(args);
        self
    }

    pub fn returns(self, value: R) -> Result<(), ContainerError> {
        self.container
            .stub(&self.operation, self.matcher, Behavior::returns(value))
    }

    pub fn invokes(self, callback: impl Fn(&A) -> R + 'static) -> Result<(), ContainerError> {
        self.container
            .stub(&self.operation, self.matcher, Behavior::invokes(callback))
    }
}
