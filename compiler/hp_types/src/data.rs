//! Type data and format classification.

use hp_ast::{DeclId, Name, TypeQualifiers};

use crate::Ty;

/// Structural data behind a type handle.
///
/// Immutable once registered. Builtins and pointers are interned; a
/// pointer whose pointee carries a qualifier gets a fresh entry per
/// request so qualifier state is never shared through the intern map.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeData {
    Void,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    /// Generic `int`.
    Int,
    Float32,
    Float64,
    /// Untyped null pointer.
    Null,

    /// Pointer to a pointee type.
    Pointer { pointee: Ty },

    /// Class type; exactly one canonical instance per class declaration.
    Class { decl: DeclId, name: Name },

    /// Qualified type wrapping an unqualified inner type.
    Qualified { quals: TypeQualifiers, inner: Ty },
}

/// Coarse classification of a type, driving conversion rules.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeFormat {
    Void,
    Boolean,
    SignedInt,
    UnsignedInt,
    /// The generic `int` literal type.
    GenericInt,
    Float,
    Pointer,
    Class,
}

impl TypeFormat {
    /// Check if this format is an integer category (signed, unsigned, or
    /// generic).
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TypeFormat::SignedInt | TypeFormat::UnsignedInt | TypeFormat::GenericInt
        )
    }

    /// Check if this format participates in arithmetic.
    pub fn is_numeric(self) -> bool {
        self.is_integer() || self == TypeFormat::Float
    }
}

impl TypeData {
    /// Format of this type. Qualified types classify as their inner type;
    /// the caller resolves that indirection via the registry.
    pub(crate) fn shallow_format(&self) -> Option<TypeFormat> {
        match self {
            TypeData::Void => Some(TypeFormat::Void),
            TypeData::Bool => Some(TypeFormat::Boolean),
            TypeData::Int8 | TypeData::Int16 | TypeData::Int32 | TypeData::Int64 => {
                Some(TypeFormat::SignedInt)
            }
            TypeData::UInt8 | TypeData::UInt16 | TypeData::UInt32 | TypeData::UInt64 => {
                Some(TypeFormat::UnsignedInt)
            }
            TypeData::Int => Some(TypeFormat::GenericInt),
            TypeData::Float32 | TypeData::Float64 => Some(TypeFormat::Float),
            TypeData::Null | TypeData::Pointer { .. } => Some(TypeFormat::Pointer),
            TypeData::Class { .. } => Some(TypeFormat::Class),
            TypeData::Qualified { .. } => None,
        }
    }
}
