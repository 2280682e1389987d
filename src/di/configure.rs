use std::rc::Rc;

use tracing::{debug, warn};

use super::cache::ResolutionCache;
use super::capability::{Capability, CapabilityId, Operation};
use super::error::ContainerError;
use super::registry::ConcreteEntry;
use super::synthetic::{ArgMatcher, Behavior, SyntheticFactory};
use crate::config::{ContainerOptions, LateProvidePolicy, StubConflictPolicy};

/// Applies stub and provide calls to a [`ResolutionCache`].
///
/// Each call writes only the slot of the capability it addresses, so stub and
/// provide calls for different capabilities commute. Same-capability
/// sequencing follows [`StubConflictPolicy`] and [`LateProvidePolicy`].
pub struct ConfigurationApplier<'a> {
    cache: &'a mut ResolutionCache,
    options: &'a ContainerOptions,
}

impl<'a> ConfigurationApplier<'a> {
    pub fn new(cache: &'a mut ResolutionCache, options: &'a ContainerOptions) -> Self {
        Self { cache, options }
    }

    /// Attach a rule to the fake of `C`, creating the fake if needed
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
        let id = CapabilityId::of::<C>();
        match self.cache.synthetic_handle(id, SyntheticFactory::create::<C>) {
            Some(handle) => handle.stub(operation, matcher, behavior),
            None => match self.options.stub_conflict {
                StubConflictPolicy::Reject => Err(ContainerError::conflict::<C>()),
                StubConflictPolicy::ProvideWins => {
                    warn!(
                        container = self.options.label(),
                        capability = %id,
                        operation = operation.name(),
                        "ignoring stub on a provided instance"
                    );
                    Ok(())
                }
            },
        }
    }

    /// Fix `C` to `instance`. The container never tears it down.
    pub fn provide<C: ?Sized + 'static>(&mut self, instance: Rc<C>) -> Result<(), ContainerError> {
        let id = CapabilityId::of::<C>();
        self.replace(id, ConcreteEntry::borrowed(Rc::new(instance)))
    }

    /// Fix `C` to `instance` and run `teardown` on it when the container releases it
    pub fn provide_owned<C: ?Sized + 'static>(
        &mut self,
        instance: Rc<C>,
        teardown: impl FnOnce(&C) + 'static,
    ) -> Result<(), ContainerError> {
        let id = CapabilityId::of::<C>();
        let held = Rc::clone(&instance);
        let entry = ConcreteEntry::owned(Rc::new(instance), Box::new(move || teardown(&*held)));
        self.replace(id, entry)
    }

    fn replace(&mut self, id: CapabilityId, entry: ConcreteEntry) -> Result<(), ContainerError> {
        if self.cache.is_handed_out(&id) {
            match self.options.late_provide {
                LateProvidePolicy::Reject => {
                    return Err(ContainerError::AlreadyResolved {
                        capability: id.name(),
                    })
                }
                LateProvidePolicy::Replace => {
                    warn!(
                        container = self.options.label(),
                        capability = %id,
                        "replacing an instance that consumers already hold"
                    );
                }
            }
        }

        let previous = self.cache.provide(id, entry);
        debug!(
            container = self.options.label(),
            capability = %id,
            replaced = ?previous.as_ref().map(|entry| entry.kind()),
            "provided concrete instance"
        );
        Ok(())
    }
}
