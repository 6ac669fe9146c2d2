//! Node handles and validity state.
//!
//! Every AST node lives in the [`Ast`](crate::Ast) arena and is addressed
//! by a 32-bit typed handle. Validity is a tri-state flag kept in arena
//! side tables: nodes start `Unchecked`, the validator moves them to
//! `Valid` or `Invalid`, and `Invalid` is terminal ("resigned validation").

use std::fmt;

macro_rules! node_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create from a raw arena index.
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw arena index.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Get the index as usize for arena access.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

node_id! {
    /// Handle to a declaration node.
    DeclId
}
node_id! {
    /// Handle to a statement node.
    StmtId
}
node_id! {
    /// Handle to an expression node.
    ExprId
}
node_id! {
    /// Handle to a parsed type expression node.
    TypeExprId
}

/// Uniform reference to any AST node, for validity tracking and the
/// lowering value table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeRef {
    Decl(DeclId),
    Stmt(StmtId),
    Expr(ExprId),
    TypeExpr(TypeExprId),
}

impl From<DeclId> for NodeRef {
    fn from(id: DeclId) -> Self {
        NodeRef::Decl(id)
    }
}

impl From<StmtId> for NodeRef {
    fn from(id: StmtId) -> Self {
        NodeRef::Stmt(id)
    }
}

impl From<ExprId> for NodeRef {
    fn from(id: ExprId) -> Self {
        NodeRef::Expr(id)
    }
}

impl From<TypeExprId> for NodeRef {
    fn from(id: TypeExprId) -> Self {
        NodeRef::TypeExpr(id)
    }
}

/// Tri-state validation outcome for a node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Validity {
    /// Not yet visited by the validator.
    #[default]
    Unchecked,
    /// Visited, all checks passed.
    Valid,
    /// Visited, at least one check failed ("resigned validation").
    /// Terminal: a resigned node never becomes valid again.
    Invalid,
}

impl Validity {
    /// Check if this is the resigned state.
    #[inline]
    pub fn is_invalid(self) -> bool {
        matches!(self, Validity::Invalid)
    }

    /// Check if the node passed validation.
    #[inline]
    pub fn is_valid(self) -> bool {
        matches!(self, Validity::Valid)
    }
}
