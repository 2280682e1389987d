/// Generate the fake adapter for a capability trait.
///
/// For each listed method the macro declares an [`Operation`](crate::Operation)
/// constant on the adapter and forwards the call to
/// [`SyntheticHandle::invoke`](crate::SyntheticHandle::invoke). It also
/// implements [`Capability`](crate::Capability) for `dyn Trait`.
///
/// Arguments must be owned `'static` types. Traits with borrowed parameters
/// need a hand-written adapter that converts them before calling `invoke`.
///
/// ```rust
/// use autofake::{fake_capability, Container};
///
/// pub trait Inventory {
///     fn stock(&self, sku: String) -> u32;
///     fn restock(&self, sku: String, amount: u32) -> bool;
/// }
///
/// fake_capability! {
///     dyn Inventory as FakeInventory {
///         fn stock(&self, sku: String) -> u32 => STOCK;
///         fn restock(&self, sku: String, amount: u32) -> bool => RESTOCK;
///     }
/// }
///
/// let mut container = Container::new();
/// container
///     .on(&FakeInventory::STOCK)
///     .with_args(("apple".to_string(),))
///     .returns(12)
///     .unwrap();
///
/// let inventory = container.resolve::<dyn Inventory>().unwrap();
/// assert_eq!(inventory.stock("apple".to_string()), 12);
/// assert_eq!(inventory.stock("pear".to_string()), 0);
/// assert!(!inventory.restock("pear".to_string(), 3));
/// ```
#[macro_export]
macro_rules! fake_capability {
    (
        $(#[$meta:meta])*
        dyn $capability:ident as $fake:ident {
            $(
                fn $method:ident(&self $(, $arg:ident : $arg_ty:ty)*) -> $ret:ty => $op:ident;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $fake {
            handle: $crate::SyntheticHandle,
        }

        #[allow(dead_code)]
        impl $fake {
            $(
                pub const $op: $crate::Operation<dyn $capability, ($($arg_ty,)*), $ret> =
                    $crate::Operation::new(stringify!($method));
            )*

            pub fn handle(&self) -> &$crate::SyntheticHandle {
                &self.handle
            }
        }

        impl $capability for $fake {
            $(
                fn $method(&self $(, $arg: $arg_ty)*) -> $ret {
                    self.handle.invoke(&Self::$op, ($($arg,)*))
                }
            )*
        }

        impl $crate::Capability for dyn $capability {
            fn synthesize(handle: $crate::SyntheticHandle) -> ::std::rc::Rc<Self> {
                ::std::rc::Rc::new($fake { handle })
            }
        }
    };
}
