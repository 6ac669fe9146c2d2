//! Canonical type handle.
//!
//! `Ty` is THE canonical type representation: a 32-bit index into the
//! [`TypeCtx`](crate::TypeCtx) registry. For interned types, handle
//! equality is semantic equality — two types are equivalent iff they are
//! the same canonical instance.

use std::fmt;

/// A 32-bit index into the type registry.
///
/// Builtin types have fixed indices for O(1) access; they are pre-interned
/// at registry creation.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct Ty(u32);

impl Ty {
    // === Builtin types (fixed indices) ===

    /// The `void` type (no value).
    pub const VOID: Self = Self(0);
    /// The `bool` type.
    pub const BOOL: Self = Self(1);
    pub const INT8: Self = Self(2);
    pub const INT16: Self = Self(3);
    pub const INT32: Self = Self(4);
    pub const INT64: Self = Self(5);
    pub const UINT8: Self = Self(6);
    pub const UINT16: Self = Self(7);
    pub const UINT32: Self = Self(8);
    pub const UINT64: Self = Self(9);
    /// The generic `int` type (platform-width integer literal type).
    pub const INT: Self = Self(10);
    pub const FLOAT32: Self = Self(11);
    pub const FLOAT64: Self = Self(12);
    /// The untyped null pointer type.
    pub const NULL: Self = Self(13);

    /// Number of pre-interned builtin types.
    pub const BUILTIN_COUNT: u32 = 14;

    /// Sentinel value indicating no type / not yet evaluated.
    pub const NONE: Self = Self(u32::MAX);

    /// Create a handle from a raw registry index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw registry index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if this is a pre-interned builtin.
    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::BUILTIN_COUNT
    }

    /// Check if this is the NONE sentinel.
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// Check if this is the void type.
    #[inline]
    pub const fn is_void(self) -> bool {
        self.0 == Self::VOID.0
    }

    /// Builtin name for fixed-index types, `None` for registry-allocated
    /// types that need a [`TypeCtx`](crate::TypeCtx) to render.
    pub const fn builtin_name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("void"),
            1 => Some("bool"),
            2 => Some("int8"),
            3 => Some("int16"),
            4 => Some("int32"),
            5 => Some("int64"),
            6 => Some("uint8"),
            7 => Some("uint16"),
            8 => Some("uint32"),
            9 => Some("uint64"),
            10 => Some("int"),
            11 => Some("float32"),
            12 => Some("float64"),
            13 => Some("null"),
            _ => None,
        }
    }
}

impl fmt::Debug for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Ty::NONE")
        } else if let Some(name) = self.builtin_name() {
            write!(f, "Ty::{}", name.to_uppercase())
        } else {
            write!(f, "Ty({})", self.0)
        }
    }
}

// Handle must stay 4 bytes.
const _: () = assert!(std::mem::size_of::<Ty>() == 4);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_indices_are_fixed() {
        assert_eq!(Ty::VOID.raw(), 0);
        assert_eq!(Ty::BOOL.raw(), 1);
        assert_eq!(Ty::NULL.raw(), 13);
        assert!(Ty::NULL.is_builtin());
        assert!(!Ty::from_raw(Ty::BUILTIN_COUNT).is_builtin());
    }

    #[test]
    fn none_sentinel() {
        assert!(Ty::NONE.is_none());
        assert!(!Ty::VOID.is_none());
    }

    #[test]
    fn builtin_names() {
        assert_eq!(Ty::INT32.builtin_name(), Some("int32"));
        assert_eq!(Ty::from_raw(100).builtin_name(), None);
    }
}
