//! AST arena.
//!
//! All nodes live in per-axis vectors inside [`Ast`] and reference each
//! other through typed 32-bit handles. The tree is a strict ownership
//! hierarchy rooted at the global namespace; the only back-edges are
//! non-owning container handles on declarations.
//!
//! Validity is kept in `Cell` side tables parallel to the node vectors,
//! so the validator can resign nodes through a shared `&Ast` without
//! touching node shape.

use std::cell::Cell;

use crate::{
    Decl, DeclId, DeclKind, Expr, ExprId, Name, NodeRef, Span, Stmt, StmtId, StmtKind, Symbol,
    TypeExpr, TypeExprId, Validity,
};

/// The AST for one compilation unit.
#[derive(Default)]
pub struct Ast {
    decls: Vec<Decl>,
    stmts: Vec<Stmt>,
    exprs: Vec<Expr>,
    type_exprs: Vec<TypeExpr>,

    decl_validity: Vec<Cell<Validity>>,
    stmt_validity: Vec<Cell<Validity>>,
    expr_validity: Vec<Cell<Validity>>,
    type_expr_validity: Vec<Cell<Validity>>,

    /// The global namespace declaration.
    root: Option<DeclId>,
}

impl Ast {
    pub fn new() -> Self {
        Ast::default()
    }

    // ── Allocation ──────────────────────────────────────────────────

    /// Allocate a declaration node.
    ///
    /// # Panics
    /// Panics if the arena exceeds `u32::MAX` declarations.
    pub fn alloc_decl(&mut self, decl: Decl) -> DeclId {
        let Ok(raw) = u32::try_from(self.decls.len()) else {
            panic!("AST arena exceeded u32::MAX declarations");
        };
        self.decls.push(decl);
        self.decl_validity.push(Cell::new(Validity::Unchecked));
        DeclId::from_raw(raw)
    }

    /// Allocate a statement node.
    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let Ok(raw) = u32::try_from(self.stmts.len()) else {
            panic!("AST arena exceeded u32::MAX statements");
        };
        self.stmts.push(stmt);
        self.stmt_validity.push(Cell::new(Validity::Unchecked));
        StmtId::from_raw(raw)
    }

    /// Allocate an expression node.
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let Ok(raw) = u32::try_from(self.exprs.len()) else {
            panic!("AST arena exceeded u32::MAX expressions");
        };
        self.exprs.push(expr);
        self.expr_validity.push(Cell::new(Validity::Unchecked));
        ExprId::from_raw(raw)
    }

    /// Allocate a type expression node.
    pub fn alloc_type_expr(&mut self, ty: TypeExpr) -> TypeExprId {
        let Ok(raw) = u32::try_from(self.type_exprs.len()) else {
            panic!("AST arena exceeded u32::MAX type expressions");
        };
        self.type_exprs.push(ty);
        self.type_expr_validity.push(Cell::new(Validity::Unchecked));
        TypeExprId::from_raw(raw)
    }

    // ── Access ──────────────────────────────────────────────────────

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn type_expr(&self, id: TypeExprId) -> &TypeExpr {
        &self.type_exprs[id.index()]
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// The root namespace, set once by the parser.
    pub fn root(&self) -> Option<DeclId> {
        self.root
    }

    /// Install the root namespace declaration.
    ///
    /// # Panics
    /// Panics if a root was already set.
    pub fn set_root(&mut self, root: DeclId) {
        assert!(self.root.is_none(), "AST root namespace set twice");
        self.root = Some(root);
    }

    // ── Construction helpers ────────────────────────────────────────

    /// Append a member declaration to a container (namespace, class, or
    /// protocol), keeping declaration order.
    ///
    /// # Panics
    /// Panics if `container` is not a container kind.
    pub fn add_member(&mut self, container: DeclId, member: DeclId) {
        match &mut self.decls[container.index()].kind {
            DeclKind::Namespace { members }
            | DeclKind::Class { members, .. }
            | DeclKind::Protocol { members } => members.push(member),
            other => panic!("add_member on non-container declaration {other:?}"),
        }
    }

    /// Add a field to a class, assigning the next contiguous field index.
    ///
    /// Field indices match storage layout order: the n-th call yields
    /// index `n - 1`.
    ///
    /// # Panics
    /// Panics if `class` is not a class declaration.
    pub fn add_field(
        &mut self,
        class: DeclId,
        name: Name,
        ty: TypeExprId,
        span: Span,
        name_span: Span,
    ) -> DeclId {
        let index = match &self.decls[class.index()].kind {
            DeclKind::Class { fields, .. } => fields.len(),
            other => panic!("add_field on non-class declaration {other:?}"),
        };
        let Ok(index) = u32::try_from(index) else {
            panic!("class exceeded u32::MAX fields");
        };

        let field = self.alloc_decl(Decl {
            kind: DeclKind::Field { ty, index },
            name,
            span,
            name_span,
            container: Some(class),
        });

        match &mut self.decls[class.index()].kind {
            DeclKind::Class { members, fields } => {
                members.push(field);
                fields.push(field);
            }
            _ => unreachable!("checked above"),
        }
        field
    }

    // ── Validity ────────────────────────────────────────────────────

    fn validity_cell(&self, node: NodeRef) -> &Cell<Validity> {
        match node {
            NodeRef::Decl(id) => &self.decl_validity[id.index()],
            NodeRef::Stmt(id) => &self.stmt_validity[id.index()],
            NodeRef::Expr(id) => &self.expr_validity[id.index()],
            NodeRef::TypeExpr(id) => &self.type_expr_validity[id.index()],
        }
    }

    /// Current validity of a node.
    pub fn validity(&self, node: impl Into<NodeRef>) -> Validity {
        self.validity_cell(node.into()).get()
    }

    /// Resign a node's validation. Monotonic: once resigned, a node stays
    /// resigned for the lifetime of the AST.
    pub fn resign(&self, node: impl Into<NodeRef>) {
        self.validity_cell(node.into()).set(Validity::Invalid);
    }

    /// Mark a node as having passed validation. A no-op if the node was
    /// already resigned — resignation is terminal.
    pub fn approve(&self, node: impl Into<NodeRef>) {
        let cell = self.validity_cell(node.into());
        if cell.get() != Validity::Invalid {
            cell.set(Validity::Valid);
        }
    }

    /// Check if a node has been resigned.
    pub fn is_invalid(&self, node: impl Into<NodeRef>) -> bool {
        self.validity(node).is_invalid()
    }

    // ── Derived queries ─────────────────────────────────────────────

    /// Symbol path of a declaration, derived by walking enclosing
    /// containers out to the root. The root namespace itself contributes
    /// no component.
    pub fn symbol_path(&self, id: DeclId) -> Symbol {
        let mut path = Symbol::new(self.decl(id).name, Some(self.decl(id).name_span));
        let mut cursor = self.decl(id).container;
        while let Some(container) = cursor {
            let decl = self.decl(container);
            if Some(container) == self.root {
                break;
            }
            path.prepend(decl.name, Some(decl.name_span));
            cursor = decl.container;
        }
        path
    }

    /// Check whether control definitely returns from this statement.
    ///
    /// Loops and switches are treated conservatively as not returning.
    pub fn returns(&self, id: StmtId) -> bool {
        match &self.stmt(id).kind {
            StmtKind::Return { .. } => true,
            StmtKind::Block(stmts) => stmts.iter().any(|&s| self.returns(s)),
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => match else_branch {
                Some(els) => self.returns(*then_branch) && self.returns(*els),
                None => false,
            },
            _ => false,
        }
    }

    /// Count the return statements reachable within this statement.
    pub fn contained_returns(&self, id: StmtId) -> u32 {
        match &self.stmt(id).kind {
            StmtKind::Return { .. } => 1,
            StmtKind::Block(stmts) => stmts.iter().map(|&s| self.contained_returns(s)).sum(),
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.contained_returns(*then_branch)
                    + else_branch.map_or(0, |e| self.contained_returns(e))
            }
            StmtKind::Loop { body, .. } | StmtKind::For { body, .. } => {
                self.contained_returns(*body)
            }
            StmtKind::Switch { cases, default, .. } => {
                cases
                    .iter()
                    .map(|c| self.contained_returns(c.body))
                    .sum::<u32>()
                    + default.map_or(0, |d| self.contained_returns(d))
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NameInterner, TypeExprKind};
    use pretty_assertions::assert_eq;

    fn int_ty(ast: &mut Ast) -> TypeExprId {
        ast.alloc_type_expr(TypeExpr::new(
            TypeExprKind::Builtin(crate::BuiltinTy::Int32),
            Span::DUMMY,
        ))
    }

    fn namespace(ast: &mut Ast, name: Name, container: Option<DeclId>) -> DeclId {
        ast.alloc_decl(Decl {
            kind: DeclKind::Namespace { members: vec![] },
            name,
            span: Span::DUMMY,
            name_span: Span::DUMMY,
            container,
        })
    }

    #[test]
    fn field_indices_are_contiguous_in_add_order() {
        let interner = NameInterner::new();
        let mut ast = Ast::new();
        let class = ast.alloc_decl(Decl {
            kind: DeclKind::Class {
                members: vec![],
                fields: vec![],
            },
            name: interner.intern("Point"),
            span: Span::DUMMY,
            name_span: Span::DUMMY,
            container: None,
        });

        let names = ["x", "y", "z"];
        let mut ids = Vec::new();
        for n in names {
            let ty = int_ty(&mut ast);
            ids.push(ast.add_field(class, interner.intern(n), ty, Span::DUMMY, Span::DUMMY));
        }

        for (expected, id) in ids.iter().enumerate() {
            let DeclKind::Field { index, .. } = ast.decl(*id).kind else {
                panic!("expected field declaration");
            };
            assert_eq!(index as usize, expected);
        }

        let DeclKind::Class { members, fields } = &ast.decl(class).kind else {
            panic!("expected class declaration");
        };
        assert_eq!(fields.len(), 3);
        assert_eq!(members.len(), 3, "fields are also members");
    }

    #[test]
    fn symbol_path_walks_containers() {
        let interner = NameInterner::new();
        let mut ast = Ast::new();
        let root = namespace(&mut ast, Name::EMPTY, None);
        ast.set_root(root);
        let app = namespace(&mut ast, interner.intern("app"), Some(root));
        ast.add_member(root, app);
        let ty = int_ty(&mut ast);
        let var = ast.alloc_decl(Decl {
            kind: DeclKind::Variable { ty, init: None },
            name: interner.intern("count"),
            span: Span::DUMMY,
            name_span: Span::DUMMY,
            container: Some(app),
        });
        ast.add_member(app, var);

        assert_eq!(ast.symbol_path(var).display(&interner), "app.count");
        assert_eq!(ast.symbol_path(app).display(&interner), "app");
    }

    #[test]
    fn resign_is_terminal() {
        let mut ast = Ast::new();
        let stmt = ast.alloc_stmt(Stmt::new(StmtKind::Break, Span::DUMMY));
        assert_eq!(ast.validity(stmt), Validity::Unchecked);

        ast.resign(stmt);
        assert!(ast.is_invalid(stmt));

        // approve must not undo a resignation
        ast.approve(stmt);
        assert!(ast.is_invalid(stmt));
    }

    #[test]
    fn returns_requires_both_branches() {
        let mut ast = Ast::new();
        let ret = ast.alloc_stmt(Stmt::new(StmtKind::Return { value: None }, Span::DUMMY));
        let empty = ast.alloc_stmt(Stmt::new(StmtKind::Block(vec![]), Span::DUMMY));
        let cond = ast.alloc_expr(Expr::new(crate::ExprKind::Bool(true), Span::DUMMY));

        let one_armed = ast.alloc_stmt(Stmt::new(
            StmtKind::If {
                cond,
                then_branch: ret,
                else_branch: None,
            },
            Span::DUMMY,
        ));
        assert!(!ast.returns(one_armed));

        let both = ast.alloc_stmt(Stmt::new(
            StmtKind::If {
                cond,
                then_branch: ret,
                else_branch: Some(ret),
            },
            Span::DUMMY,
        ));
        assert!(ast.returns(both));
        assert_eq!(ast.contained_returns(both), 2);

        let partial = ast.alloc_stmt(Stmt::new(
            StmtKind::If {
                cond,
                then_branch: ret,
                else_branch: Some(empty),
            },
            Span::DUMMY,
        ));
        assert!(!ast.returns(partial));
    }
}
