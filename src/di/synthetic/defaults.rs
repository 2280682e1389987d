use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use super::SyntheticHandle;
use crate::di::capability::Capability;

/// Value returned by a synthetic operation that has no matching stub.
///
/// Scalars and collections return their zero/empty value. Capability objects
/// (`Rc<dyn Trait>`) return a nested fake owned by the calling handle, so the
/// nested fake can be configured later through [`SyntheticHandle::nested`].
pub trait FakeDefault: Clone + 'static {
    fn fake_default(parent: &SyntheticHandle, operation: &'static str) -> Self;
}

macro_rules! impl_fake_default_via_default {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FakeDefault for $ty {
                fn fake_default(_: &SyntheticHandle, _: &'static str) -> Self {
                    <$ty>::default()
                }
            }
        )*
    };
}

impl_fake_default_via_default!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
);

impl<T: Clone + 'static> FakeDefault for Vec<T> {
    fn fake_default(_: &SyntheticHandle, _: &'static str) -> Self {
        Vec::new()
    }
}

impl<T: Clone + 'static> FakeDefault for Option<T> {
    fn fake_default(_: &SyntheticHandle, _: &'static str) -> Self {
        None
    }
}

impl<K: Clone + 'static, V: Clone + 'static> FakeDefault for HashMap<K, V> {
    fn fake_default(_: &SyntheticHandle, _: &'static str) -> Self {
        HashMap::new()
    }
}

impl<T: Clone + 'static> FakeDefault for HashSet<T> {
    fn fake_default(_: &SyntheticHandle, _: &'static str) -> Self {
        HashSet::new()
    }
}

impl<K: Clone + Ord + 'static, V: Clone + 'static> FakeDefault for BTreeMap<K, V> {
    fn fake_default(_: &SyntheticHandle, _: &'static str) -> Self {
        BTreeMap::new()
    }
}

macro_rules! impl_fake_default_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: FakeDefault),+> FakeDefault for ($($name,)+) {
            fn fake_default(parent: &SyntheticHandle, operation: &'static str) -> Self {
                ($($name::fake_default(parent, operation),)+)
            }
        }
    };
}

impl_fake_default_for_tuple!(A);
impl_fake_default_for_tuple!(A, B);
impl_fake_default_for_tuple!(A, B, C);
impl_fake_default_for_tuple!(A, B, C, D);

impl<C: Capability + ?Sized> FakeDefault for Rc<C> {
    fn fake_default(parent: &SyntheticHandle, operation: &'static str) -> Self {
        parent.child::<C>(operation).1
    }
}

/// Implement [`FakeDefault`] for domain types through their `Default` impl.
///
/// ```rust
/// #[derive(Clone, Default)]
/// struct Invoice {
///     total: u64,
/// }
///
/// autofake::fake_default_via_default!(Invoice);
/// ```
#[macro_export]
macro_rules! fake_default_via_default {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::FakeDefault for $ty {
                fn fake_default(_: &$crate::SyntheticHandle, _: &'static str) -> Self {
                    <$ty as ::std::default::Default>::default()
                }
            }
        )*
    };
}
