//! AST visitor.
//!
//! Generic traversal over the arena-allocated tree. Dispatch is an
//! exhaustive match on each node's kind tag; the `walk_*` functions visit
//! children in source order. Override `visit_*` methods to act at
//! specific nodes, calling the matching `walk_*` to continue downward.
//!
//! The visitor may mutate its own state; the AST stays immutable (node
//! validity is arena side state and may change underneath a traversal).

use crate::{Ast, DeclId, DeclKind, ExprId, ExprKind, StmtId, StmtKind, TypeExprId, TypeExprKind};

/// AST visitor trait.
pub trait Visitor {
    fn visit_decl(&mut self, id: DeclId, ast: &Ast) {
        walk_decl(self, id, ast);
    }

    fn visit_stmt(&mut self, id: StmtId, ast: &Ast) {
        walk_stmt(self, id, ast);
    }

    fn visit_expr(&mut self, id: ExprId, ast: &Ast) {
        walk_expr(self, id, ast);
    }

    fn visit_type_expr(&mut self, id: TypeExprId, ast: &Ast) {
        walk_type_expr(self, id, ast);
    }
}

/// Visit a declaration's children in declaration order.
pub fn walk_decl<V: Visitor + ?Sized>(v: &mut V, id: DeclId, ast: &Ast) {
    match &ast.decl(id).kind {
        DeclKind::Namespace { members }
        | DeclKind::Class { members, .. }
        | DeclKind::Protocol { members } => {
            for &member in members {
                v.visit_decl(member, ast);
            }
        }
        DeclKind::Field { ty, .. } | DeclKind::Param { ty, .. } | DeclKind::Alias { ty } => {
            v.visit_type_expr(*ty, ast);
        }
        DeclKind::Variable { ty, init } => {
            v.visit_type_expr(*ty, ast);
            if let Some(init) = init {
                v.visit_expr(*init, ast);
            }
        }
        DeclKind::Function { params, ret, body } => {
            for &param in params {
                v.visit_decl(param, ast);
            }
            if let Some(ret) = ret {
                v.visit_type_expr(*ret, ast);
            }
            if let Some(body) = body {
                v.visit_stmt(*body, ast);
            }
        }
        DeclKind::Enum { .. } => {}
    }
}

/// Visit a statement's children in source order.
pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, id: StmtId, ast: &Ast) {
    match &ast.stmt(id).kind {
        StmtKind::Block(stmts) => {
            for &s in stmts {
                v.visit_stmt(s, ast);
            }
        }
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            v.visit_expr(*cond, ast);
            v.visit_stmt(*then_branch, ast);
            if let Some(els) = else_branch {
                v.visit_stmt(*els, ast);
            }
        }
        StmtKind::Loop { cond, body, .. } => {
            v.visit_expr(*cond, ast);
            v.visit_stmt(*body, ast);
        }
        StmtKind::For { var, limit, body } => {
            v.visit_decl(*var, ast);
            v.visit_expr(*limit, ast);
            v.visit_stmt(*body, ast);
        }
        StmtKind::Switch {
            scrutinee,
            cases,
            default,
        } => {
            v.visit_expr(*scrutinee, ast);
            for case in cases {
                v.visit_expr(case.value, ast);
                v.visit_stmt(case.body, ast);
            }
            if let Some(default) = default {
                v.visit_stmt(*default, ast);
            }
        }
        StmtKind::Return { value } => {
            if let Some(value) = value {
                v.visit_expr(*value, ast);
            }
        }
        StmtKind::Var(decl) => v.visit_decl(*decl, ast),
        StmtKind::Expr(expr) => v.visit_expr(*expr, ast),
        StmtKind::Break | StmtKind::Continue => {}
    }
}

/// Visit an expression's children in evaluation order.
pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, id: ExprId, ast: &Ast) {
    match &ast.expr(id).kind {
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Bool(_)
        | ExprKind::Str(_)
        | ExprKind::Null
        | ExprKind::NameRef(_) => {}
        ExprKind::Unary { operand, .. } => v.visit_expr(*operand, ast),
        ExprKind::Binary { lhs, rhs, .. } => {
            v.visit_expr(*lhs, ast);
            v.visit_expr(*rhs, ast);
        }
        ExprKind::Assign { target, value } => {
            v.visit_expr(*target, ast);
            v.visit_expr(*value, ast);
        }
        ExprKind::Call { callee, args } => {
            v.visit_expr(*callee, ast);
            for &arg in args {
                v.visit_expr(arg, ast);
            }
        }
        ExprKind::Member { base, .. } => v.visit_expr(*base, ast),
        ExprKind::ImplicitCast { inner, to } => {
            v.visit_expr(*inner, ast);
            v.visit_type_expr(*to, ast);
        }
        ExprKind::BooleanContext { inner } => v.visit_expr(*inner, ast),
    }
}

/// Visit a type expression's children.
pub fn walk_type_expr<V: Visitor + ?Sized>(v: &mut V, id: TypeExprId, ast: &Ast) {
    match &ast.type_expr(id).kind {
        TypeExprKind::Builtin(_) | TypeExprKind::Named(_) => {}
        TypeExprKind::Pointer { pointee } => v.visit_type_expr(*pointee, ast),
        TypeExprKind::Qualified { inner, .. } => v.visit_type_expr(*inner, ast),
    }
}
