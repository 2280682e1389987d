//! Synthetic implementations ("auto-fakes") of capabilities.
//!
//! A [`SyntheticHandle`] owns everything configurable about one fake: its
//! stub table, the defaults it already handed out, nested child fakes and the
//! received-call counters. The object exposed to consumers is a small adapter
//! that holds a clone of the handle and forwards every operation to
//! [`SyntheticHandle::invoke`], so consumers always see the current stub
//! table.

pub mod defaults;
pub mod stub;

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::capability::{Capability, CapabilityId, Operation};
use super::error::ContainerError;
use crate::config::FakeMode;

pub use defaults::FakeDefault;
pub use stub::{ArgMatcher, Behavior, StubRule};

/// A nested fake created as the default return value of an operation
#[derive(Clone)]
struct NestedFake {
    handle: SyntheticHandle,
    exposed: Rc<dyn Any>,
}

struct HandleState {
    capability: CapabilityId,
    mode: FakeMode,
    /// Rules per operation, oldest first. Each element is a `StubRule<A, R>`.
    stubs: RefCell<FxHashMap<&'static str, Vec<Rc<dyn Any>>>>,
    defaults: RefCell<FxHashMap<&'static str, Rc<dyn Any>>>,
    children: RefCell<FxHashMap<&'static str, NestedFake>>,
    calls: RefCell<FxHashMap<&'static str, usize>>,
}

/// Shared handle to the configurable state of one fake
#[derive(Clone)]
pub struct SyntheticHandle {
    inner: Rc<HandleState>,
}

impl SyntheticHandle {
    pub fn new(capability: CapabilityId, mode: FakeMode) -> Self {
        Self {
            inner: Rc::new(HandleState {
                capability,
                mode,
                stubs: RefCell::new(FxHashMap::default()),
                defaults: RefCell::new(FxHashMap::default()),
                children: RefCell::new(FxHashMap::default()),
                calls: RefCell::new(FxHashMap::default()),
            }),
        }
    }

    pub fn capability(&self) -> CapabilityId {
        self.inner.capability
    }

    pub fn mode(&self) -> FakeMode {
        self.inner.mode
    }

    /// Check whether two handles share the same state
    pub fn ptr_eq(&self, other: &SyntheticHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Append a stub rule for `operation`.
    ///
    /// Newer rules take precedence over older ones for the same operation.
    pub fn stub<C, A, R>(
        &self,
        operation: &Operation<C, A, R>,
        matcher: ArgMatcher<A>,
        behavior: Behavior<A, R>,
    ) -> Result<(), ContainerError>
    where
        C: ?Sized + 'static,
        A: 'static,
        R: Clone + 'static,
    {
        self.check_owner(operation)?;

        let rule: Rc<dyn Any> = Rc::new(StubRule::new(matcher, behavior));
        self.inner
            .stubs
            .borrow_mut()
            .entry(operation.name())
            .or_default()
            .push(rule);

        debug!(
            capability = %self.inner.capability,
            operation = operation.name(),
            "stub rule added"
        );
        Ok(())
    }

    /// Dispatch a call made on the exposed object.
    ///
    /// # Panics
    ///
    /// Panics when the fake is [`FakeMode::Strict`] and no rule matches.
    pub fn invoke<C, A, R>(&self, operation: &Operation<C, A, R>, args: A) -> R
    where
        C: ?Sized + 'static,
        A: 'static,
        R: FakeDefault,
    {
        let name = operation.name();
        *self.inner.calls.borrow_mut().entry(name).or_insert(0) += 1;

        // Clone the rule list out so a callback may reconfigure this handle
        let rules = self.inner.stubs.borrow().get(name).cloned();
        if let Some(rules) = rules {
            for rule in rules.iter().rev() {
                if let Some(rule) = rule.downcast_ref::<StubRule<A, R>>() {
                    if let Some(result) = rule.apply(&args) {
                        trace!(capability = %self.inner.capability, operation = name, "stub hit");
                        return result;
                    }
                }
            }
        }

        if self.inner.mode == FakeMode::Strict {
            panic!(
                "unconfigured call to {}::{} on a strict fake",
                self.inner.capability, name
            );
        }

        self.default_value::<R>(name)
    }

    /// Default result of `operation`, created on first use and reused afterwards
    fn default_value<R: FakeDefault>(&self, operation: &'static str) -> R {
        let cached = self.inner.defaults.borrow().get(operation).cloned();
        if let Some(value) = cached.as_ref().and_then(|v| v.downcast_ref::<R>()) {
            return value.clone();
        }

        let value = R::fake_default(self, operation);
        self.inner
            .defaults
            .borrow_mut()
            .insert(operation, Rc::new(value.clone()));
        value
    }

    /// Nested fake returned by `operation` when it has no matching stub
    pub(crate) fn child<C: Capability + ?Sized>(
        &self,
        operation: &'static str,
    ) -> (SyntheticHandle, Rc<C>) {
        let existing = self.inner.children.borrow().get(operation).cloned();
        if let Some(nested) = existing {
            if let Some(exposed) = nested.exposed.downcast_ref::<Rc<C>>() {
                return (nested.handle, Rc::clone(exposed));
            }
        }

        let handle = SyntheticHandle::new(CapabilityId::of::<C>(), self.inner.mode);
        let exposed = C::synthesize(handle.clone());
        debug!(
            capability = %handle.capability(),
            parent = %self.inner.capability,
            operation,
            "synthesized nested fake"
        );
        self.inner.children.borrow_mut().insert(
            operation,
            NestedFake {
                handle: handle.clone(),
                exposed: Rc::new(Rc::clone(&exposed)),
            },
        );
        (handle, exposed)
    }

    /// Handle of the nested fake `operation` returns by default, creating it if needed
    pub fn nested<P, A, C>(
        &self,
        operation: &Operation<P, A, Rc<C>>,
    ) -> Result<SyntheticHandle, ContainerError>
    where
        P: ?Sized + 'static,
        C: Capability + ?Sized,
    {
        self.check_owner(operation)?;
        Ok(self.child::<C>(operation.name()).0)
    }

    fn check_owner<C, A, R>(&self, operation: &Operation<C, A, R>) -> Result<(), ContainerError>
    where
        C: ?Sized + 'static,
    {
        let owner = CapabilityId::of::<C>();
        if owner != self.inner.capability {
            return Err(ContainerError::ForeignOperation {
                operation: operation.name(),
                owner: owner.name(),
                capability: self.inner.capability.name(),
            });
        }
        Ok(())
    }

    /// Number of calls received by `operation`, stubbed or not
    pub fn call_count<C: ?Sized, A, R>(&self, operation: &Operation<C, A, R>) -> usize {
        self.inner
            .calls
            .borrow()
            .get(operation.name())
            .copied()
            .unwrap_or(0)
    }

    /// Total number of stub rules on this handle
    pub fn rule_count(&self) -> usize {
        self.inner.stubs.borrow().values().map(Vec::len).sum()
    }

    /// Drop stub rules, cached defaults, nested fakes and call records
    pub fn release(&self) {
        let children: Vec<NestedFake> = self
            .inner
            .children
            .borrow_mut()
            .drain()
            .map(|(_, nested)| nested)
            .collect();
        for nested in children {
            nested.handle.release();
        }
        self.inner.stubs.borrow_mut().clear();
        self.inner.defaults.borrow_mut().clear();
        self.inner.calls.borrow_mut().clear();
    }
}

impl fmt::Debug for SyntheticHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntheticHandle")
            .field("capability", &self.inner.capability)
            .field("mode", &self.inner.mode)
            .field("rules", &self.rule_count())
            .finish()
    }
}

/// A synthesized registry value: the handle and the exposed `Rc<C>`, type-erased
#[derive(Clone)]
pub struct SyntheticEntry {
    pub handle: SyntheticHandle,
    pub exposed: Rc<dyn Any>,
}

impl fmt::Debug for SyntheticEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntheticEntry")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// Mints synthetic entries for capabilities
#[derive(Debug)]
pub struct SyntheticFactory {
    mode: FakeMode,
    created: usize,
}

impl SyntheticFactory {
    pub fn new(mode: FakeMode) -> Self {
        Self { mode, created: 0 }
    }

    pub fn create<C: Capability + ?Sized>(&mut self) -> SyntheticEntry {
        let handle = SyntheticHandle::new(CapabilityId::of::<C>(), self.mode);
        let exposed: Rc<C> = C::synthesize(handle.clone());
        self.created += 1;
        debug!(capability = %handle.capability(), mode = ?self.mode, "synthesized fake");
        SyntheticEntry {
            handle,
            exposed: Rc::new(exposed),
        }
    }

    /// Number of fakes minted, including ones discarded by a failed build
    pub fn created(&self) -> usize {
        self.created
    }
}
