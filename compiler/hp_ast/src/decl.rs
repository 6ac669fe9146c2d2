//! Declaration nodes.
//!
//! Named entities: namespaces, classes, fields, variables, parameters,
//! functions, enumerations, type aliases, and protocols. Every declaration
//! carries a non-owning back-reference to its enclosing container as a
//! `DeclId` handle; the container chain is fixed at construction and never
//! reparented, so a declaration's symbol path is stable.

use crate::{DeclId, ExprId, Name, Span, StmtId, TypeExprId};

/// Declaration node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Decl {
    pub kind: DeclKind,
    pub name: Name,
    /// Span of the whole declaration.
    pub span: Span,
    /// Span of the declared identifier.
    pub name_span: Span,
    /// Enclosing namespace/class, `None` only for the root namespace.
    pub container: Option<DeclId>,
}

/// Declaration kinds.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclKind {
    /// Namespace holding an ordered list of member declarations.
    Namespace { members: Vec<DeclId> },

    /// Class declaration.
    ///
    /// `fields` is the index-addressable subset of `members`, in
    /// declaration order: `fields[i]` is the field with index `i`.
    Class {
        members: Vec<DeclId>,
        fields: Vec<DeclId>,
    },

    /// Class field with its storage-layout index.
    Field { ty: TypeExprId, index: u32 },

    /// Variable declaration with optional initializer.
    Variable {
        ty: TypeExprId,
        init: Option<ExprId>,
    },

    /// Function parameter with its position.
    Param { ty: TypeExprId, index: u32 },

    /// Function declaration. `ret` is `None` for void functions; `body`
    /// is `None` for forward declarations.
    Function {
        params: Vec<DeclId>,
        ret: Option<TypeExprId>,
        body: Option<StmtId>,
    },

    /// Enumeration with named constants.
    Enum { variants: Vec<(Name, Span)> },

    /// Type alias.
    Alias { ty: TypeExprId },

    /// Protocol (method requirement set).
    Protocol { members: Vec<DeclId> },
}

impl Decl {
    /// Member declarations, for container kinds.
    pub fn members(&self) -> &[DeclId] {
        match &self.kind {
            DeclKind::Namespace { members }
            | DeclKind::Class { members, .. }
            | DeclKind::Protocol { members } => members,
            _ => &[],
        }
    }

    /// Check if this declaration opens a name-resolution scope.
    pub fn is_scope(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Namespace { .. } | DeclKind::Class { .. } | DeclKind::Protocol { .. }
        )
    }

    /// Check if this declaration names a type.
    pub fn is_type_decl(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Class { .. } | DeclKind::Enum { .. } | DeclKind::Alias { .. }
        )
    }
}
