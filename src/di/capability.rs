use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::rc::Rc;

use super::synthetic::SyntheticHandle;

/// An interface a dependency must satisfy, implemented for trait object types.
///
/// `synthesize` wraps a fresh handle in the fake adapter for the trait. The
/// adapter is usually generated with [`fake_capability!`](crate::fake_capability).
///
/// ```rust
/// use autofake::{fake_capability, Container};
///
/// pub trait Clock {
///     fn now(&self) -> u64;
/// }
///
/// fake_capability! {
///     dyn Clock as FakeClock {
///         fn now(&self) -> u64 => NOW;
///     }
/// }
///
/// let mut container = Container::new();
/// container.on(&FakeClock::NOW).returns(1_700_000_000).unwrap();
/// let clock = container.resolve::<dyn Clock>().unwrap();
/// assert_eq!(clock.now(), 1_700_000_000);
/// ```
pub trait Capability: 'static {
    fn synthesize(handle: SyntheticHandle) -> Rc<Self>;
}

/// Nominal identity of a capability or provided type.
///
/// Equality and hashing only look at the `TypeId`; the name is kept for logs
/// and error messages.
#[derive(Clone, Copy)]
pub struct CapabilityId {
    type_id: TypeId,
    name: &'static str,
}

impl CapabilityId {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for CapabilityId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for CapabilityId {}

impl Hash for CapabilityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A named operation of capability `C` taking the argument tuple `A` and
/// returning `R`.
///
/// Operations are declared as associated constants on fake adapters and are
/// the address used for stubbing and call counting.
pub struct Operation<C: ?Sized, A, R> {
    name: &'static str,
    _marker: PhantomData<fn(&C, A) -> R>,
}

impl<C: ?Sized, A, R> Operation<C, A, R> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<C: ?Sized, A, R> Clone for Operation<C, A, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized, A, R> Copy for Operation<C, A, R> {}

impl<C: ?Sized + 'static, A, R> fmt::Debug for Operation<C, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", std::any::type_name::<C>(), self.name)
    }
}
