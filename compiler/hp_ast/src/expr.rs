//! Expression nodes.
//!
//! Floats are stored as `u64` bit patterns so expression nodes keep `Eq`
//! and `Hash`.

use crate::{ExprId, Name, Span, Symbol, TypeExprId};

/// Expression node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Not,
    /// Address-of: produces a pointer to the operand's storage.
    AddrOf,
    /// Pointer dereference.
    Deref,
}

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    /// Check if this operator produces a boolean result.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    /// Check if this operator takes boolean operands.
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

/// Expression kinds.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// Integer literal.
    Int(i64),
    /// Float literal, stored as bits for `Eq`/`Hash`.
    Float(u64),
    /// Boolean literal.
    Bool(bool),
    /// String literal (interned).
    Str(Name),
    /// Untyped null pointer literal.
    Null,

    /// Reference to a declaration by qualified name; resolution is
    /// recorded by the validator, not stored in the node.
    NameRef(Symbol),

    Unary {
        op: UnaryOp,
        operand: ExprId,
    },

    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },

    /// Assignment; `target` must be a storage location.
    Assign {
        target: ExprId,
        value: ExprId,
    },

    /// Function call with positional arguments.
    Call {
        callee: ExprId,
        args: Vec<ExprId>,
    },

    /// Member (field) access on a class-typed base.
    Member {
        base: ExprId,
        field: Name,
        field_span: Span,
    },

    /// Implicit conversion inserted by the parser or validator; checked
    /// against the cast-compatibility rules.
    ImplicitCast {
        inner: ExprId,
        to: TypeExprId,
    },

    /// Boolean-context wrapper coercing a condition to boolean.
    BooleanContext {
        inner: ExprId,
    },
}

impl ExprKind {
    /// Check if this expression is a literal constant.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            ExprKind::Int(_)
                | ExprKind::Float(_)
                | ExprKind::Bool(_)
                | ExprKind::Str(_)
                | ExprKind::Null
        )
    }

    /// Check if this expression can appear as an assignment target.
    pub fn is_place(&self) -> bool {
        matches!(
            self,
            ExprKind::NameRef(_) | ExprKind::Member { .. } | ExprKind::Unary {
                op: UnaryOp::Deref,
                ..
            }
        )
    }
}
