//! Machine-level IR types.
//!
//! Lowering flattens the surface type system to these: qualifiers are
//! erased, class values become pointers to their storage, and the
//! generic `int` is committed to a concrete width.

use std::fmt;

/// A flat machine type carried by every IR value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum IrType {
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
    Float32,
    Float64,
    /// Untyped address. Pointee types are erased at this level.
    Ptr,
}

impl IrType {
    /// Check if values of this type occupy storage.
    pub fn is_value(self) -> bool {
        self != IrType::Void
    }

    pub fn is_float(self) -> bool {
        matches!(self, IrType::Float32 | IrType::Float64)
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            IrType::Int8
                | IrType::Int16
                | IrType::Int32
                | IrType::Int64
                | IrType::UInt8
                | IrType::UInt16
                | IrType::UInt32
                | IrType::UInt64
        )
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IrType::Void => "void",
            IrType::Bool => "bool",
            IrType::Int8 => "i8",
            IrType::Int16 => "i16",
            IrType::Int32 => "i32",
            IrType::Int64 => "i64",
            IrType::UInt8 => "u8",
            IrType::UInt16 => "u16",
            IrType::UInt32 => "u32",
            IrType::UInt64 => "u64",
            IrType::Float32 => "f32",
            IrType::Float64 => "f64",
            IrType::Ptr => "ptr",
        };
        f.write_str(text)
    }
}
