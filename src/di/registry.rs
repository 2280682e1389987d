use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::capability::CapabilityId;
use super::synthetic::SyntheticEntry;

/// Teardown hook for a concrete instance the container owns
pub type Teardown = Box<dyn FnOnce()>;

/// A caller-supplied instance (`Rc<T>`, type-erased)
pub struct ConcreteEntry {
    pub instance: Rc<dyn Any>,
    teardown: Option<Teardown>,
}

impl ConcreteEntry {
    /// Instance the container never tears down
    pub fn borrowed(instance: Rc<dyn Any>) -> Self {
        Self {
            instance,
            teardown: None,
        }
    }

    /// Instance whose teardown hook runs when the container releases it
    pub fn owned(instance: Rc<dyn Any>, teardown: Teardown) -> Self {
        Self {
            instance,
            teardown: Some(teardown),
        }
    }

    pub fn is_owned(&self) -> bool {
        self.teardown.is_some()
    }

    /// Run the teardown hook, if any. Returns whether one ran.
    pub fn release(&mut self) -> bool {
        match self.teardown.take() {
            Some(teardown) => {
                teardown();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for ConcreteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcreteEntry")
            .field("owned", &self.is_owned())
            .finish_non_exhaustive()
    }
}

/// Value stored for a capability
#[derive(Debug)]
pub enum RegistryEntry {
    Synthetic(SyntheticEntry),
    Concrete(ConcreteEntry),
}

impl RegistryEntry {
    /// The object handed to consumers, holding an `Rc<C>`
    pub fn exposed(&self) -> &Rc<dyn Any> {
        match self {
            RegistryEntry::Synthetic(entry) => &entry.exposed,
            RegistryEntry::Concrete(entry) => &entry.instance,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            RegistryEntry::Synthetic(_) => EntryKind::Synthetic,
            RegistryEntry::Concrete(_) => EntryKind::Concrete,
        }
    }
}

/// Resolution state of a capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Unresolved,
    Synthetic,
    Concrete,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Unresolved => write!(f, "unresolved"),
            EntryKind::Synthetic => write!(f, "synthetic"),
            EntryKind::Concrete => write!(f, "concrete"),
        }
    }
}

/// Capability → entry map. A missing key is the `Unresolved` state.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    // Insertion order drives teardown order and `registered()` listings
    entries: IndexMap<CapabilityId, RegistryEntry>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &CapabilityId) -> Option<&RegistryEntry> {
        self.entries.get(id)
    }

    pub fn kind(&self, id: &CapabilityId) -> EntryKind {
        self.entries
            .get(id)
            .map_or(EntryKind::Unresolved, RegistryEntry::kind)
    }

    /// Store `entry` for `id`, returning the entry it replaced
    pub fn set(&mut self, id: CapabilityId, entry: RegistryEntry) -> Option<RegistryEntry> {
        self.entries.insert(id, entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CapabilityId, &RegistryEntry)> {
        self.entries.iter()
    }

    /// Remove every entry, in insertion order
    pub fn drain(&mut self) -> Vec<(CapabilityId, RegistryEntry)> {
        self.entries.drain(..).collect()
    }
}
