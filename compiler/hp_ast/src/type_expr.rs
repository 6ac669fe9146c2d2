//! Parsed type expressions.
//!
//! Type syntax as written in source (`*const Point`, `int32`). The
//! validator resolves these to canonical type handles; the AST keeps only
//! the surface form.

use bitflags::bitflags;

use crate::{Span, Symbol, TypeExprId};

/// Builtin type keyword.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BuiltinTy {
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
    /// Generic integer (`int`), platform-width.
    Int,
    Float32,
    Float64,
}

bitflags! {
    /// Type qualifiers as written in source.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeQualifiers: u8 {
        const CONST = 1 << 0;
        const VOLATILE = 1 << 1;
    }
}

/// Parsed type expression node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

impl TypeExpr {
    pub fn new(kind: TypeExprKind, span: Span) -> Self {
        TypeExpr { kind, span }
    }
}

/// Type expression kinds.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeExprKind {
    /// Builtin type keyword.
    Builtin(BuiltinTy),
    /// Reference to a named type (class, alias, enum).
    Named(Symbol),
    /// Pointer to a pointee type.
    Pointer { pointee: TypeExprId },
    /// Qualified type (`const T`, `volatile T`).
    Qualified {
        quals: TypeQualifiers,
        inner: TypeExprId,
    },
}
