//! Type descriptors.
//!
//! Rust has no runtime reflection, so every type that can be turned into a
//! schema describes itself through [`Reflect`]. Children are referenced by
//! [`TypeRef`] (a plain `fn` pointer) and only expanded when the walker
//! reaches them; a self-referential type can therefore be described, and the
//! walker is the one that notices the cycle.
pub mod impls;

use crate::annotation::Annotations;

/// Lazily expanded reference to a child type.
pub type TypeRef = fn() -> TypeInfo;

pub trait Reflect {
    fn type_info() -> TypeInfo;
}

#[derive(Debug, Clone)]
pub enum TypeInfo {
    Scalar(Scalar),
    /// Structured time value, rendered as a `date-time` string.
    Timestamp,
    /// Statically erased type; anything goes.
    Open,
    /// `Option`, `Box`, references and other transparent wrappers.
    Pointer(TypeRef),
    Sequence(TypeRef),
    /// Associative map; keys are always treated as strings, so only the value
    /// type is recorded.
    Map(TypeRef),
    Struct(StructInfo),
    /// Fieldless enum; the names are the allowed string values.
    Variants(Vec<&'static str>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Char,
    Str,
}

impl Scalar {
    pub fn is_integer(self) -> bool {
        !matches!(
            self,
            Scalar::Bool | Scalar::F32 | Scalar::F64 | Scalar::Char | Scalar::Str
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Scalar::F32 | Scalar::F64)
    }
}

impl TypeInfo {
    /// Follows pointers down to the first non-pointer type.
    pub fn resolve(self) -> TypeInfo {
        let mut info = self;
        while let TypeInfo::Pointer(inner) = info {
            info = inner();
        }
        info
    }

    pub fn is_open(&self) -> bool {
        matches!(self, TypeInfo::Open)
    }

    /// A sequence element that makes the sequence a byte string.
    pub fn is_byte(&self) -> bool {
        matches!(self, TypeInfo::Scalar(Scalar::U8))
    }
}

/// Open type as a [`TypeRef`], for descriptors that have nothing better.
pub fn open() -> TypeInfo {
    TypeInfo::Open
}

// ------------------------------- Structs --------------------------------- //

#[derive(Debug, Clone)]
pub struct StructInfo {
    /// Type identity, used to detect a struct nested inside itself.
    pub name: &'static str,
    /// Declaration order.
    pub fields: Vec<FieldInfo>,
}

#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub name: &'static str,
    pub ty: TypeRef,
    pub annotations: Annotations,
}

impl StructInfo {
    pub fn of<T: ?Sized>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            fields: Vec::new(),
        }
    }

    pub fn field<F: Reflect + ?Sized>(mut self, name: &'static str, annotations: Annotations) -> Self {
        self.fields.push(FieldInfo {
            name,
            ty: F::type_info,
            annotations,
        });
        self
    }
}

impl From<StructInfo> for TypeInfo {
    fn from(info: StructInfo) -> Self {
        TypeInfo::Struct(info)
    }
}
