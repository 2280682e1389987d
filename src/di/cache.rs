use std::any::Any;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::debug;

use super::capability::{Capability, CapabilityId};
use super::error::ContainerError;
use super::registry::{ConcreteEntry, EntryKind, RegistryEntry, TypeRegistry};
use super::synthetic::{SyntheticEntry, SyntheticFactory, SyntheticHandle};
use crate::config::FakeMode;

/// Creates a synthetic entry for one capability
pub type Synthesizer = fn(&mut SyntheticFactory) -> SyntheticEntry;

/// Recover the `Rc<T>` stored in a type-erased registry value
pub(crate) fn restore<T: ?Sized + 'static>(
    id: &CapabilityId,
    erased: &Rc<dyn Any>,
) -> Result<Rc<T>, ContainerError> {
    erased
        .downcast_ref::<Rc<T>>()
        .cloned()
        .ok_or(ContainerError::TypeMismatch {
            capability: id.name(),
        })
}

/// Per-capability memo of the one instance every consumer receives.
///
/// An unresolved capability is synthesized at most once. Writes only ever
/// touch the slot of the capability being configured; nothing here rebuilds
/// or invalidates other entries.
#[derive(Debug)]
pub struct ResolutionCache {
    registry: TypeRegistry,
    factory: SyntheticFactory,
    handed_out: FxHashSet<CapabilityId>,
    /// Replaced fakes that consumers still hold; released on `clear`
    retired: Vec<SyntheticHandle>,
    synthesized: usize,
}

impl ResolutionCache {
    pub fn new(mode: FakeMode) -> Self {
        Self {
            registry: TypeRegistry::new(),
            factory: SyntheticFactory::new(mode),
            handed_out: FxHashSet::default(),
            retired: Vec::new(),
            synthesized: 0,
        }
    }

    /// Return the cached instance for `C`, synthesizing it on first use
    pub fn resolve<C: Capability + ?Sized>(&mut self) -> Result<Rc<C>, ContainerError> {
        let id = CapabilityId::of::<C>();
        let erased = match self.lookup_erased(&id) {
            Some(erased) => erased,
            None => {
                let entry = self.factory.create::<C>();
                let erased = Rc::clone(&entry.exposed);
                self.store_synthetic(id, entry);
                erased
            }
        };

        let instance = restore::<C>(&id, &erased)?;
        self.handed_out.insert(id);
        Ok(instance)
    }

    pub(crate) fn lookup_erased(&self, id: &CapabilityId) -> Option<Rc<dyn Any>> {
        self.registry.get(id).map(|entry| Rc::clone(entry.exposed()))
    }

    /// Handle of the synthetic entry for `id`, creating the entry when unresolved.
    ///
    /// Returns `None` when `id` is fixed to a concrete instance.
    pub fn synthetic_handle(
        &mut self,
        id: CapabilityId,
        synthesize: Synthesizer,
    ) -> Option<SyntheticHandle> {
        match self.registry.get(&id) {
            Some(RegistryEntry::Synthetic(entry)) => Some(entry.handle.clone()),
            Some(RegistryEntry::Concrete(_)) => None,
            None => {
                let entry = synthesize(&mut self.factory);
                let handle = entry.handle.clone();
                self.store_synthetic(id, entry);
                Some(handle)
            }
        }
    }

    /// Handle of an existing synthetic entry, never creating one
    pub fn existing_handle(&self, id: &CapabilityId) -> Option<SyntheticHandle> {
        match self.registry.get(id) {
            Some(RegistryEntry::Synthetic(entry)) => Some(entry.handle.clone()),
            _ => None,
        }
    }

    /// Fix `id` to a concrete instance, returning the entry it replaced.
    ///
    /// A replaced fake nobody holds is released at once. One already handed
    /// out keeps answering its holders until the cache is cleared.
    pub fn provide(&mut self, id: CapabilityId, entry: ConcreteEntry) -> Option<RegistryEntry> {
        let mut previous = self.registry.set(id, RegistryEntry::Concrete(entry));
        let held = self.handed_out.remove(&id);

        match &mut previous {
            Some(RegistryEntry::Synthetic(old)) => {
                let rules = old.handle.rule_count();
                if held {
                    debug!(capability = %id, rules, "retired a fake still held by consumers");
                    self.retired.push(old.handle.clone());
                } else {
                    old.handle.release();
                    debug!(capability = %id, discarded = rules, "provide replaced a fake");
                }
            }
            Some(RegistryEntry::Concrete(old)) => {
                if old.release() {
                    debug!(capability = %id, "released owned instance on replacement");
                }
            }
            None => {}
        }
        previous
    }

    /// Mint a synthetic entry without storing it
    pub(crate) fn mint(&mut self, synthesize: Synthesizer) -> SyntheticEntry {
        synthesize(&mut self.factory)
    }

    /// Store entries staged by a successful build and mark `used` as handed out
    pub(crate) fn commit(
        &mut self,
        staged: IndexMap<CapabilityId, SyntheticEntry>,
        used: impl IntoIterator<Item = CapabilityId>,
    ) {
        for (id, entry) in staged {
            self.store_synthetic(id, entry);
        }
        self.handed_out.extend(used);
    }

    fn store_synthetic(&mut self, id: CapabilityId, entry: SyntheticEntry) {
        self.registry.set(id, RegistryEntry::Synthetic(entry));
        self.synthesized += 1;
    }

    pub fn kind(&self, id: &CapabilityId) -> EntryKind {
        self.registry.kind(id)
    }

    pub fn is_handed_out(&self, id: &CapabilityId) -> bool {
        self.handed_out.contains(id)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Number of synthetic entries stored since creation
    pub fn synthesized(&self) -> usize {
        self.synthesized
    }

    /// Empty the cache, releasing fakes and owned instances.
    ///
    /// Returns `(fakes released, owned instances torn down)`.
    pub fn clear(&mut self) -> (usize, usize) {
        let mut fakes = 0;
        let mut owned = 0;
        for (id, entry) in self.registry.drain() {
            match entry {
                RegistryEntry::Synthetic(entry) => {
                    entry.handle.release();
                    fakes += 1;
                }
                RegistryEntry::Concrete(mut entry) => {
                    if entry.release() {
                        debug!(capability = %id, "tore down owned instance");
                        owned += 1;
                    }
                }
            }
        }
        for handle in self.retired.drain(..) {
            handle.release();
            fakes += 1;
        }
        self.handed_out.clear();
        (fakes, owned)
    }
}
