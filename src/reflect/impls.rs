use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;
use std::time::SystemTime;

use indexmap::{IndexMap, IndexSet};

use super::{Reflect, Scalar, TypeInfo};

macro_rules! scalar {
    ($($ty:ty => $scalar:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::Scalar(Scalar::$scalar)
                }
            }
        )*
    };
}

scalar! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    char => Char,
    str => Str,
    String => Str,
}

// ------------------------------ Pointers --------------------------------- //

macro_rules! pointer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<T: Reflect + ?Sized> Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::Pointer(T::type_info)
                }
            }
        )*
    };
}

pointer!(Box<T>, Rc<T>, Arc<T>);

impl<T: Reflect> Reflect for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::Pointer(T::type_info)
    }
}

impl<T: Reflect + ?Sized> Reflect for &T {
    fn type_info() -> TypeInfo {
        TypeInfo::Pointer(T::type_info)
    }
}

impl<T: Reflect + ?Sized> Reflect for &mut T {
    fn type_info() -> TypeInfo {
        TypeInfo::Pointer(T::type_info)
    }
}

impl<T: Reflect + ToOwned + ?Sized> Reflect for Cow<'_, T> {
    fn type_info() -> TypeInfo {
        TypeInfo::Pointer(T::type_info)
    }
}

// ------------------------------ Sequences -------------------------------- //

impl<T: Reflect> Reflect for Vec<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::Sequence(T::type_info)
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::Sequence(T::type_info)
    }
}

impl<T: Reflect> Reflect for [T] {
    fn type_info() -> TypeInfo {
        TypeInfo::Sequence(T::type_info)
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn type_info() -> TypeInfo {
        TypeInfo::Sequence(T::type_info)
    }
}

impl<T: Reflect> Reflect for BTreeSet<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::Sequence(T::type_info)
    }
}

impl<T: Reflect, S> Reflect for HashSet<T, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::Sequence(T::type_info)
    }
}

impl<T: Reflect, S> Reflect for IndexSet<T, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::Sequence(T::type_info)
    }
}

// -------------------------------- Maps ----------------------------------- //

impl<K, V: Reflect> Reflect for BTreeMap<K, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::Map(V::type_info)
    }
}

impl<K, V: Reflect, S> Reflect for HashMap<K, V, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::Map(V::type_info)
    }
}

impl<K, V: Reflect, S> Reflect for IndexMap<K, V, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::Map(V::type_info)
    }
}

impl Reflect for serde_json::Map<String, serde_json::Value> {
    fn type_info() -> TypeInfo {
        TypeInfo::Map(serde_json::Value::type_info)
    }
}

// --------------------------- Open & timestamps --------------------------- //

impl Reflect for serde_json::Value {
    fn type_info() -> TypeInfo {
        TypeInfo::Open
    }
}

// Marker only; says nothing about `T`.
impl<T: ?Sized> Reflect for PhantomData<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::Open
    }
}

impl<Tz: chrono::TimeZone> Reflect for chrono::DateTime<Tz> {
    fn type_info() -> TypeInfo {
        TypeInfo::Timestamp
    }
}

impl Reflect for chrono::NaiveDateTime {
    fn type_info() -> TypeInfo {
        TypeInfo::Timestamp
    }
}

impl Reflect for SystemTime {
    fn type_info() -> TypeInfo {
        TypeInfo::Timestamp
    }
}
