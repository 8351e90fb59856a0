use std::{any::Any, fmt::Debug, sync::Arc};

use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

/// A runtime value that converters can serialise.
///
/// Implement with [`astro_object!`](crate::astro_object) unless the type key depends on the value.
pub trait AstroObject: Any + Debug + Send + Sync {
    /// A stable, fully-qualified identifier of the runtime type, e.g. `astropy.units.Quantity`.
    fn type_key(&self) -> &'static str;

    /// The identifiers of the types this type derives from, nearest first.
    ///
    /// The exact type is excluded.
    fn type_ancestors(&self) -> &'static [&'static str] {
        &[]
    }

    /// Upcast to [`Any`].
    fn as_any(&self) -> &dyn Any;

    /// Mutably upcast to [`Any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Domain equality with another value.
    fn eq_object(&self, other: &dyn AstroObject) -> bool;
}

/// Implement [`AstroObject`] for a type with a fixed type key and [`PartialEq`] equality.
///
/// ```
/// # use asdf_astro_plugin::astro_object;
/// #[derive(Debug, PartialEq)]
/// struct Meters(f64);
/// astro_object!(Meters, "example.Meters");
///
/// #[derive(Debug, PartialEq)]
/// struct Radius(f64);
/// astro_object!(Radius, "example.Radius", ["example.Meters"]);
/// ```
#[macro_export]
macro_rules! astro_object {
    ($ty:ty, $key:expr) => {
        $crate::astro_object!($ty, $key, []);
    };
    ($ty:ty, $key:expr, [$($ancestor:expr),* $(,)?]) => {
        impl $crate::AstroObject for $ty {
            fn type_key(&self) -> &'static str {
                $key
            }

            fn type_ancestors(&self) -> &'static [&'static str] {
                &[$($ancestor),*]
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn eq_object(&self, other: &dyn $crate::AstroObject) -> bool {
                other
                    .as_any()
                    .downcast_ref::<Self>()
                    .is_some_and(|other| self == other)
            }
        }
    };
}

/// A shared, mutable reference to a runtime value.
///
/// Values in a document tree are shared: the same value may appear more than once, and values may refer to each other (e.g. mutual inverses).
/// Identity is the identity of the allocation, see [`ObjectRef::ptr_eq`].
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<dyn AstroObject>>);

impl ObjectRef {
    /// Create a new object reference.
    pub fn new<T: AstroObject>(object: T) -> Self {
        Self(Arc::new(RwLock::new(object)))
    }

    /// Lock the value for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, dyn AstroObject> {
        self.0.read()
    }

    /// Lock the value for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, dyn AstroObject> {
        self.0.write()
    }

    /// Lock the value for reading as a `T`.
    ///
    /// Returns [`None`] if the value is not a `T`.
    pub fn downcast_ref<T: AstroObject>(&self) -> Option<MappedRwLockReadGuard<'_, T>> {
        RwLockReadGuard::try_map(self.0.read(), |object| {
            object.as_any().downcast_ref::<T>()
        })
        .ok()
    }

    /// Lock the value for writing as a `T`.
    ///
    /// Returns [`None`] if the value is not a `T`.
    pub fn downcast_mut<T: AstroObject>(&self) -> Option<MappedRwLockWriteGuard<'_, T>> {
        RwLockWriteGuard::try_map(self.0.write(), |object| {
            object.as_any_mut().downcast_mut::<T>()
        })
        .ok()
    }

    /// Returns true if the value is a `T`.
    #[must_use]
    pub fn is<T: AstroObject>(&self) -> bool {
        self.0.read().as_any().is::<T>()
    }

    /// Returns the type key of the value.
    #[must_use]
    pub fn type_key(&self) -> &'static str {
        self.0.read().type_key()
    }

    /// Returns the type key of the value, or [`None`] if it is locked for writing.
    #[must_use]
    pub fn try_type_key(&self) -> Option<&'static str> {
        self.0.try_read().map(|object| object.type_key())
    }

    /// Returns true if both references point to the same value.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns an identifier of the value that is unique while it is alive.
    #[must_use]
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl Debug for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only the type is printed, values may refer back to themselves
        match self.try_type_key() {
            Some(type_key) => write!(f, "ObjectRef({type_key} @ {:#x})", self.id()),
            None => write!(f, "ObjectRef(<locked> @ {:#x})", self.id()),
        }
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.read().eq_object(&*other.0.read())
    }
}
