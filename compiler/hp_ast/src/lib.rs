//! Human Plus AST node model.
//!
//! Core data structures for the Human Plus compiler front-end:
//! - Spans for source locations
//! - Interned identifier `Name`s
//! - Declarations, statements, expressions, and parsed type expressions
//! - Arena allocation with typed 32-bit handles
//! - Tri-state node validity ("resign validation")
//! - Symbol paths for qualified name resolution
//!
//! # Design
//!
//! - **Intern everything**: identifiers become `Name(u32)`
//! - **Flatten everything**: no `Box<Expr>`, nodes reference children by
//!   `ExprId`/`StmtId`/`DeclId` handles into the [`Ast`] arena
//! - **Fixed shape**: once built, a node's children never change; only
//!   its validity flag (arena side state) mutates after construction

mod arena;
mod decl;
mod expr;
mod name;
mod node;
mod span;
mod stmt;
mod symbol;
mod type_expr;
pub mod visit;

pub use arena::Ast;
pub use decl::{Decl, DeclKind};
pub use expr::{BinaryOp, Expr, ExprKind, UnaryOp};
pub use name::{Name, NameInterner};
pub use node::{DeclId, ExprId, NodeRef, StmtId, TypeExprId, Validity};
pub use span::Span;
pub use stmt::{LoopKind, Stmt, StmtKind, SwitchCase};
pub use symbol::{Symbol, SymbolComponent};
pub use type_expr::{BuiltinTy, TypeExpr, TypeExprKind, TypeQualifiers};
pub use visit::Visitor;
