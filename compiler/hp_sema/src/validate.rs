//! The validator: a tree-walking semantic analyzer.
//!
//! One session per compilation unit: open a diagnostic report, walk the
//! tree from the root namespace, close the report, return pass/fail.
//! Failures never abort the walk — the offending node resigns its
//! validation and traversal continues, so one pass surfaces as many
//! independent errors as possible. Resignation is an explicit per-node
//! decision, never automatic bottom-up aggregation: a container may
//! resign (e.g. on redefinition) even when every child is individually
//! valid.
//!
//! Sibling declarations and statements are visited in source order and
//! diagnostics are emitted in that order.

use hp_ast::{
    Ast, BinaryOp, DeclId, DeclKind, ExprId, ExprKind, NameInterner, NodeRef, StmtId, StmtKind,
    Symbol, TypeExprId, TypeExprKind, UnaryOp, Validity, Visitor,
};
use hp_diagnostic::{DiagnosticEngine, ErrorCode};
use hp_types::{Ty, TypeCtx, TypeData, TypeOptions};

use crate::{FnSig, SemaOutput, SymbolResolver, ValidationResult};

/// Validate one compilation unit.
///
/// Opens a fresh report on `engine`, walks the whole tree, and closes
/// the report. `passed` is false iff any error was reported or any
/// reachable node resigned.
///
/// # Panics
/// Panics if the AST has no root namespace, or on internal consistency
/// failures (unbalanced resolver scopes) — those are compiler bugs, not
/// user errors.
pub fn validate_unit(
    ast: &Ast,
    types: &TypeCtx,
    interner: &NameInterner,
    options: &TypeOptions,
    engine: &mut DiagnosticEngine,
) -> ValidationResult {
    let Some(root) = ast.root() else {
        panic!("validate_unit on an AST without a root namespace");
    };

    engine.open_report();
    tracing::debug!(decls = ast.decl_count(), "validation session start");

    let mut validator = Validator {
        types,
        interner,
        options,
        engine,
        resolver: SymbolResolver::new(ast, root),
        output: SemaOutput::default(),
        fn_rets: Vec::new(),
        loop_depth: 0,
        break_depth: 0,
    };
    let depth = validator.resolver.depth();
    validator.visit_decl(root, ast);

    // Scope switches must pair even on error paths.
    assert_eq!(
        validator.resolver.depth(),
        depth,
        "resolver scope stack imbalance after validation"
    );
    assert_eq!(
        validator.resolver.local_depth(),
        0,
        "resolver local frame leak after validation"
    );

    let output = validator.output;
    let report = engine.close_report();
    let passed = !report.has_errors() && !ast.is_invalid(root);
    tracing::debug!(passed, errors = report.error_count(), "validation session end");

    ValidationResult {
        passed,
        report,
        output,
    }
}

struct Validator<'a, 'e> {
    types: &'a TypeCtx,
    interner: &'a NameInterner,
    options: &'a TypeOptions,
    engine: &'e mut DiagnosticEngine,
    resolver: SymbolResolver<'a>,
    output: SemaOutput,
    /// Return types of enclosing functions, innermost last.
    fn_rets: Vec<Ty>,
    /// Nesting depth of loops (continue targets).
    loop_depth: usize,
    /// Nesting depth of loops and switches (break targets).
    break_depth: usize,
}

impl Validator<'_, '_> {
    fn resign(&self, ast: &Ast, node: impl Into<NodeRef> + Copy + std::fmt::Debug) {
        tracing::trace!(node = ?node, "resign validation");
        ast.resign(node.into());
    }

    fn display(&self, ty: Ty) -> String {
        if ty.is_none() {
            "<error>".to_owned()
        } else {
            self.types.display(ty, self.interner)
        }
    }

    fn finish_expr(&mut self, ast: &Ast, id: ExprId, ty: Ty) {
        self.output.set_expr_type(id, ty);
        ast.approve(id);
    }

    /// Storage type of a value declaration, resolving its type
    /// expression on first demand (declaration order is not resolution
    /// order for forward references).
    fn ensure_value_type(&mut self, ast: &Ast, decl: DeclId) -> Ty {
        let known = self.output.decl_type(decl);
        if !known.is_none() {
            return known;
        }
        let ty_expr = match ast.decl(decl).kind {
            DeclKind::Variable { ty, .. }
            | DeclKind::Param { ty, .. }
            | DeclKind::Field { ty, .. } => ty,
            _ => return Ty::NONE,
        };
        self.visit_type_expr(ty_expr, ast);
        let ty = self.output.type_expr_type(ty_expr);
        if !ty.is_none() {
            self.output.set_decl_type(decl, ty);
        }
        ty
    }

    /// Resolve and record a function's signature without touching its
    /// body, so forward references and recursion validate.
    fn ensure_fn_sig(&mut self, ast: &Ast, decl: DeclId) {
        if self.output.has_fn_sig(decl) {
            return;
        }
        let (params, ret) = match &ast.decl(decl).kind {
            DeclKind::Function { params, ret, .. } => (params.clone(), *ret),
            other => panic!("ensure_fn_sig on non-function declaration {other:?}"),
        };

        let param_tys: Vec<Ty> = params
            .iter()
            .map(|&p| self.ensure_value_type(ast, p))
            .collect();
        let ret_ty = match ret {
            Some(ty_expr) => {
                self.visit_type_expr(ty_expr, ast);
                self.output.type_expr_type(ty_expr)
            }
            None => Ty::VOID,
        };
        self.output.set_fn_sig(
            decl,
            FnSig {
                params: param_tys,
                ret: ret_ty,
            },
        );
    }

    // ── Declaration checks ──────────────────────────────────────────

    fn check_namespace(&mut self, id: DeclId, members: &[DeclId], ast: &Ast) {
        self.resolver.switch_to(id);
        let mut any_invalid = false;
        for &member in members {
            self.visit_decl(member, ast);
            if ast.is_invalid(member) {
                any_invalid = true;
            }
        }
        self.resolver.switch_to_container();

        if any_invalid {
            self.resign(ast, id);
        } else {
            ast.approve(id);
        }
    }

    fn check_class(&mut self, id: DeclId, members: &[DeclId], ast: &Ast) {
        // Member pass in class scope: a failing member resigns the
        // class but never stops the remaining members.
        self.resolver.switch_to(id);
        let mut any_invalid = false;
        for &member in members {
            self.visit_decl(member, ast);
            if ast.is_invalid(member) {
                any_invalid = true;
            }
        }
        self.resolver.switch_to_container();
        if any_invalid {
            self.resign(ast, id);
        }

        // Redefinition check: re-resolve the class's own name in the
        // enclosing scope. First declaration wins resolution, so a
        // duplicate resolves to the earlier declaration.
        let decl = ast.decl(id);
        let own_name = Symbol::new(decl.name, Some(decl.name_span));
        if let Some(found) = self.resolver.resolve(&own_name) {
            if found != id && ast.decl(found).is_type_decl() {
                let name = self.interner.lookup(decl.name);
                self.engine.report_error(
                    ErrorCode::E2002,
                    decl.name_span,
                    format!("redefinition of type `{name}`"),
                );
                self.engine
                    .report_note(ast.decl(found).name_span, "previously defined here");
                self.resign(ast, id);
            }
        }

        ast.approve(id);
    }

    fn check_variable(&mut self, id: DeclId, ty: TypeExprId, init: Option<ExprId>, ast: &Ast) {
        self.visit_type_expr(ty, ast);
        let var_ty = self.output.type_expr_type(ty);
        if ast.is_invalid(ty) {
            self.resign(ast, id);
        } else {
            self.output.set_decl_type(id, var_ty);
        }

        if let Some(init) = init {
            // Namespace-level variables lower to global storage, which
            // has no code to run an initializer in.
            if self.fn_rets.is_empty() && !ast.expr(init).kind.is_literal() {
                self.engine.report_error(
                    ErrorCode::E2017,
                    ast.expr(init).span,
                    "global initializer must be a literal constant",
                );
                self.resign(ast, id);
            }
            self.visit_expr(init, ast);
            if ast.is_invalid(init) {
                self.resign(ast, id);
            } else {
                let init_ty = self.output.eval_type(init);
                if !var_ty.is_none()
                    && !init_ty.is_none()
                    && !self.types.can_assign_to(init_ty, var_ty, self.options)
                {
                    self.engine.report_error(
                        ErrorCode::E2005,
                        ast.expr(init).span,
                        format!(
                            "cannot assign `{}` to `{}`",
                            self.display(init_ty),
                            self.display(var_ty)
                        ),
                    );
                    self.resign(ast, id);
                }
            }
        }
        ast.approve(id);
    }

    fn check_function(&mut self, id: DeclId, ast: &Ast) {
        let DeclKind::Function { params, body, .. } = &ast.decl(id).kind else {
            unreachable!("check_function on non-function");
        };

        self.ensure_fn_sig(ast, id);
        for &param in params {
            self.visit_decl(param, ast);
            if ast.is_invalid(param) {
                self.resign(ast, id);
            }
        }

        let Some(sig) = self.output.fn_sig(id) else {
            unreachable!("signature recorded above");
        };
        let ret_ty = sig.ret;
        if ret_ty.is_none() {
            // Unresolvable return type was already reported.
            self.resign(ast, id);
        }

        if let Some(body) = *body {
            self.resolver.push_locals();
            for &param in params {
                self.resolver.declare_local(ast.decl(param).name, param);
            }
            self.fn_rets.push(ret_ty);
            self.visit_stmt(body, ast);
            self.fn_rets.pop();
            self.resolver.pop_locals();

            if ast.is_invalid(body) {
                self.resign(ast, id);
            }
            if !ret_ty.is_none() && !ret_ty.is_void() && !ast.returns(body) {
                let name = self.interner.lookup(ast.decl(id).name);
                self.engine.report_error(
                    ErrorCode::E2012,
                    ast.decl(id).name_span,
                    format!("function `{name}` must return a value on every path"),
                );
                self.resign(ast, id);
            }
        }

        // Redefinition check, mirroring the class rule: first
        // declaration wins resolution, so a duplicate resolves to the
        // earlier declaration.
        let own = ast.decl(id);
        let own_name = Symbol::new(own.name, Some(own.name_span));
        if let Some(found) = self.resolver.resolve(&own_name) {
            if found != id && matches!(ast.decl(found).kind, DeclKind::Function { .. }) {
                let name = self.interner.lookup(own.name);
                self.engine.report_error(
                    ErrorCode::E2002,
                    own.name_span,
                    format!("redefinition of function `{name}`"),
                );
                self.engine
                    .report_note(ast.decl(found).name_span, "previously defined here");
                self.resign(ast, id);
            }
        }

        ast.approve(id);
    }

    // ── Statement checks ────────────────────────────────────────────

    fn check_block(&mut self, id: StmtId, stmts: &[StmtId], ast: &Ast) {
        self.resolver.push_locals();
        let mut any_invalid = false;
        let mut returned = false;
        let mut warned_unreachable = false;

        for &stmt in stmts {
            if returned && !warned_unreachable {
                self.engine.report_warning(
                    ErrorCode::E2901,
                    ast.stmt(stmt).span,
                    "unreachable statement after a returning statement",
                );
                warned_unreachable = true;
            }
            self.visit_stmt(stmt, ast);
            if ast.is_invalid(stmt) {
                any_invalid = true;
            }
            if !returned && ast.returns(stmt) {
                returned = true;
            }
        }
        self.resolver.pop_locals();

        if any_invalid {
            self.resign(ast, id);
        } else {
            ast.approve(id);
        }
    }

    fn check_if(
        &mut self,
        id: StmtId,
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
        ast: &Ast,
    ) {
        self.visit_expr(cond, ast);
        // Branches are visited even when the condition already failed:
        // best-effort diagnostics for the whole statement.
        self.visit_stmt(then_branch, ast);
        if let Some(els) = else_branch {
            self.visit_stmt(els, ast);
        }

        let any_invalid = ast.is_invalid(cond)
            || ast.is_invalid(then_branch)
            || else_branch.is_some_and(|e| ast.is_invalid(e));
        if any_invalid {
            self.resign(ast, id);
        } else {
            ast.approve(id);
        }
    }

    fn check_return(&mut self, id: StmtId, value: Option<ExprId>, ast: &Ast) {
        let Some(&ret_ty) = self.fn_rets.last() else {
            panic!("return statement outside a function body");
        };

        match value {
            Some(value) => {
                self.visit_expr(value, ast);
                if ast.is_invalid(value) {
                    self.resign(ast, id);
                    return;
                }
                if ret_ty.is_void() {
                    self.engine.report_error(
                        ErrorCode::E2013,
                        ast.expr(value).span,
                        "void function cannot return a value",
                    );
                    self.resign(ast, id);
                    return;
                }
                let value_ty = self.output.eval_type(value);
                if !ret_ty.is_none()
                    && !value_ty.is_none()
                    && !self.types.can_assign_to(value_ty, ret_ty, self.options)
                {
                    self.engine.report_error(
                        ErrorCode::E2005,
                        ast.expr(value).span,
                        format!(
                            "cannot return `{}` from a function returning `{}`",
                            self.display(value_ty),
                            self.display(ret_ty)
                        ),
                    );
                    self.resign(ast, id);
                    return;
                }
            }
            None => {
                if !ret_ty.is_none() && !ret_ty.is_void() {
                    self.engine.report_error(
                        ErrorCode::E2012,
                        ast.stmt(id).span,
                        format!(
                            "return without a value in a function returning `{}`",
                            self.display(ret_ty)
                        ),
                    );
                    self.resign(ast, id);
                    return;
                }
            }
        }
        ast.approve(id);
    }

    fn check_var_stmt(&mut self, id: StmtId, decl: DeclId, ast: &Ast) {
        self.visit_decl(decl, ast);
        let name = ast.decl(decl).name;
        if let Some(prior) = self.resolver.declare_local(name, decl) {
            self.engine.report_error(
                ErrorCode::E2011,
                ast.decl(decl).name_span,
                format!("redefinition of variable `{}`", self.interner.lookup(name)),
            );
            self.engine
                .report_note(ast.decl(prior).name_span, "previously declared here");
            self.resign(ast, id);
            return;
        }
        if ast.is_invalid(decl) {
            self.resign(ast, id);
        } else {
            ast.approve(id);
        }
    }

    // ── Expression checks ───────────────────────────────────────────

    fn check_name_ref(&mut self, id: ExprId, symbol: &Symbol, ast: &Ast) {
        let Some(decl) = self.resolver.resolve(symbol) else {
            self.engine.report_error(
                ErrorCode::E2001,
                ast.expr(id).span,
                format!("unknown symbol `{}`", symbol.display(self.interner)),
            );
            self.resign(ast, id);
            return;
        };
        self.output.set_resolution(id, decl);

        match ast.decl(decl).kind {
            DeclKind::Variable { .. } | DeclKind::Param { .. } => {
                let ty = self.ensure_value_type(ast, decl);
                self.finish_expr(ast, id, ty);
            }
            // There is no receiver model: fields are only reachable
            // through a member access on an object value.
            DeclKind::Field { .. } => {
                self.engine.report_error(
                    ErrorCode::E2018,
                    ast.expr(id).span,
                    format!(
                        "field `{}` requires an object value",
                        symbol.display(self.interner)
                    ),
                );
                self.resign(ast, id);
            }
            // Call sites resolve their callee themselves; a function
            // name anywhere else is not a value.
            _ => {
                self.engine.report_error(
                    ErrorCode::E2016,
                    ast.expr(id).span,
                    format!(
                        "`{}` does not name a value",
                        symbol.display(self.interner)
                    ),
                );
                self.resign(ast, id);
            }
        }
    }

    fn check_unary(&mut self, id: ExprId, op: UnaryOp, operand: ExprId, ast: &Ast) {
        self.visit_expr(operand, ast);
        if ast.is_invalid(operand) {
            self.resign(ast, id);
            return;
        }
        let ty = self.output.eval_type(operand);
        if ty.is_none() {
            self.resign(ast, id);
            return;
        }

        match op {
            UnaryOp::Neg => {
                if self.types.format(ty).is_numeric() {
                    self.finish_expr(ast, id, ty);
                } else {
                    self.operand_error(id, ty, "-", ast);
                }
            }
            UnaryOp::Not => {
                if self.types.boolean_convertible(ty, self.options) {
                    self.finish_expr(ast, id, Ty::BOOL);
                } else {
                    self.operand_error(id, ty, "!", ast);
                }
            }
            UnaryOp::AddrOf => {
                if ast.expr(operand).kind.is_place() {
                    let ptr = self.types.pointer_to(ty);
                    self.finish_expr(ast, id, ptr);
                } else {
                    self.engine.report_error(
                        ErrorCode::E2010,
                        ast.expr(operand).span,
                        "cannot take the address of a non-storage expression",
                    );
                    self.resign(ast, id);
                }
            }
            UnaryOp::Deref => match self.types.pointee(ty) {
                Some(pointee) => self.finish_expr(ast, id, pointee),
                None => self.operand_error(id, ty, "*", ast),
            },
        }
    }

    fn operand_error(&mut self, id: ExprId, ty: Ty, op: &str, ast: &Ast) {
        self.engine.report_error(
            ErrorCode::E2015,
            ast.expr(id).span,
            format!("invalid operand of type `{}` for `{op}`", self.display(ty)),
        );
        self.resign(ast, id);
    }

    fn check_binary(&mut self, id: ExprId, op: BinaryOp, lhs: ExprId, rhs: ExprId, ast: &Ast) {
        self.visit_expr(lhs, ast);
        self.visit_expr(rhs, ast);
        if ast.is_invalid(lhs) || ast.is_invalid(rhs) {
            self.resign(ast, id);
            return;
        }
        let tl = self.output.eval_type(lhs);
        let tr = self.output.eval_type(rhs);
        if tl.is_none() || tr.is_none() {
            self.resign(ast, id);
            return;
        }

        if op.is_comparison() {
            let comparable = self.types.can_cast_to(tr, tl, false, self.options)
                || self.types.can_cast_to(tl, tr, false, self.options);
            if comparable {
                self.finish_expr(ast, id, Ty::BOOL);
            } else {
                self.binary_error(id, op, tl, tr, ast);
            }
        } else if op.is_logical() {
            let ok = self.types.boolean_convertible(tl, self.options)
                && self.types.boolean_convertible(tr, self.options);
            if ok {
                self.finish_expr(ast, id, Ty::BOOL);
            } else {
                self.binary_error(id, op, tl, tr, ast);
            }
        } else {
            // Arithmetic.
            if self.types.format(tl).is_numeric() && self.types.format(tr).is_numeric() {
                let result = self.unify_numeric(tl, tr);
                self.finish_expr(ast, id, result);
            } else {
                self.binary_error(id, op, tl, tr, ast);
            }
        }
    }

    fn binary_error(&mut self, id: ExprId, op: BinaryOp, tl: Ty, tr: Ty, ast: &Ast) {
        self.engine.report_error(
            ErrorCode::E2015,
            ast.expr(id).span,
            format!(
                "invalid operands `{}` and `{}` for `{op:?}`",
                self.display(tl),
                self.display(tr)
            ),
        );
        self.resign(ast, id);
    }

    /// Result type of an arithmetic operation. Floats dominate integers
    /// and the generic `int` adapts to a sized operand.
    fn unify_numeric(&self, tl: Ty, tr: Ty) -> Ty {
        use hp_types::TypeFormat;
        if tl == tr {
            tl
        } else if self.types.format(tl) == TypeFormat::Float {
            tl
        } else if self.types.format(tr) == TypeFormat::Float {
            tr
        } else if tl == Ty::INT {
            tr
        } else {
            tl
        }
    }

    fn check_assign(&mut self, id: ExprId, target: ExprId, value: ExprId, ast: &Ast) {
        self.visit_expr(target, ast);
        self.visit_expr(value, ast);

        if !ast.expr(target).kind.is_place() {
            self.engine.report_error(
                ErrorCode::E2010,
                ast.expr(target).span,
                "assignment target is not a storage location",
            );
            self.resign(ast, id);
            return;
        }
        if ast.is_invalid(target) || ast.is_invalid(value) {
            self.resign(ast, id);
            return;
        }

        let target_ty = self.output.eval_type(target);
        let value_ty = self.output.eval_type(value);
        if !target_ty.is_none()
            && !value_ty.is_none()
            && !self.types.can_assign_to(value_ty, target_ty, self.options)
        {
            self.engine.report_error(
                ErrorCode::E2005,
                ast.expr(value).span,
                format!(
                    "cannot assign `{}` to `{}`",
                    self.display(value_ty),
                    self.display(target_ty)
                ),
            );
            self.resign(ast, id);
            return;
        }
        self.finish_expr(ast, id, target_ty);
    }

    fn check_call(&mut self, id: ExprId, callee: ExprId, args: &[ExprId], ast: &Ast) {
        for &arg in args {
            self.visit_expr(arg, ast);
        }

        // The callee resolves here rather than through the generic
        // expression path: a function name is callable but is not a
        // value.
        let resolved = match &ast.expr(callee).kind {
            ExprKind::NameRef(symbol) => {
                let found = self.resolver.resolve(symbol);
                if found.is_none() {
                    self.engine.report_error(
                        ErrorCode::E2001,
                        ast.expr(callee).span,
                        format!("unknown symbol `{}`", symbol.display(self.interner)),
                    );
                }
                found
            }
            _ => {
                self.visit_expr(callee, ast);
                None
            }
        };

        if args.iter().any(|&a| ast.is_invalid(a)) {
            self.resign(ast, id);
            if resolved.is_none() {
                self.resign(ast, callee);
            }
            return;
        }

        let callee_decl =
            resolved.filter(|&d| matches!(ast.decl(d).kind, DeclKind::Function { .. }));
        let Some(func) = callee_decl else {
            if resolved.is_some() || !matches!(ast.expr(callee).kind, ExprKind::NameRef(_)) {
                self.engine.report_error(
                    ErrorCode::E2006,
                    ast.expr(callee).span,
                    "called expression is not a function",
                );
            }
            self.resign(ast, callee);
            self.resign(ast, id);
            return;
        };
        self.output.set_resolution(callee, func);
        ast.approve(callee);

        self.ensure_fn_sig(ast, func);
        let Some(sig) = self.output.fn_sig(func).cloned() else {
            unreachable!("signature recorded above");
        };

        if sig.params.len() != args.len() {
            self.engine.report_error(
                ErrorCode::E2007,
                ast.expr(id).span,
                format!(
                    "expected {} argument(s), found {}",
                    sig.params.len(),
                    args.len()
                ),
            );
            self.resign(ast, id);
            return;
        }

        let mut arg_failed = false;
        for (&arg, &param_ty) in args.iter().zip(&sig.params) {
            let arg_ty = self.output.eval_type(arg);
            if arg_ty.is_none() || param_ty.is_none() {
                continue;
            }
            if !self.types.can_assign_to(arg_ty, param_ty, self.options) {
                self.engine.report_error(
                    ErrorCode::E2005,
                    ast.expr(arg).span,
                    format!(
                        "cannot pass `{}` as `{}`",
                        self.display(arg_ty),
                        self.display(param_ty)
                    ),
                );
                arg_failed = true;
            }
        }
        if arg_failed {
            self.resign(ast, id);
            return;
        }

        self.output.set_resolution(id, func);
        self.finish_expr(ast, id, sig.ret);
    }

    fn check_member(&mut self, id: ExprId, base: ExprId, field: hp_ast::Name, ast: &Ast) {
        self.visit_expr(base, ast);
        if ast.is_invalid(base) {
            self.resign(ast, id);
            return;
        }
        let base_ty = self.output.eval_type(base);
        if base_ty.is_none() {
            self.resign(ast, id);
            return;
        }

        // Pointers to classes auto-dereference for member access.
        let subject = self.types.pointee(base_ty).unwrap_or(base_ty);
        let TypeData::Class { decl: class, .. } = self.types.lookup(self.types.unqualified(subject))
        else {
            self.engine.report_error(
                ErrorCode::E2009,
                ast.expr(base).span,
                format!(
                    "member access on non-class value of type `{}`",
                    self.display(base_ty)
                ),
            );
            self.resign(ast, id);
            return;
        };

        let Some(field_decl) = self.resolver.find_member(class, field) else {
            self.engine.report_error(
                ErrorCode::E2008,
                ast.expr(id).span,
                format!(
                    "no field `{}` on `{}`",
                    self.interner.lookup(field),
                    self.display(subject)
                ),
            );
            self.resign(ast, id);
            return;
        };

        self.output.set_resolution(id, field_decl);
        let field_ty = self.ensure_value_type(ast, field_decl);
        self.finish_expr(ast, id, field_ty);
    }

    fn check_implicit_cast(&mut self, id: ExprId, inner: ExprId, to: TypeExprId, ast: &Ast) {
        self.visit_expr(inner, ast);
        self.visit_type_expr(to, ast);
        if ast.is_invalid(inner) || ast.is_invalid(to) {
            self.resign(ast, id);
            return;
        }

        let src = self.output.eval_type(inner);
        let dest = self.output.type_expr_type(to);
        if src.is_none() || dest.is_none() {
            self.resign(ast, id);
            return;
        }
        if !self.types.can_cast_to(src, dest, false, self.options) {
            self.engine.report_error(
                ErrorCode::E2004,
                ast.expr(id).span,
                format!(
                    "cannot implicitly cast `{}` to `{}`",
                    self.display(src),
                    self.display(dest)
                ),
            );
            self.resign(ast, id);
            return;
        }
        self.finish_expr(ast, id, dest);
    }

    fn check_boolean_context(&mut self, id: ExprId, inner: ExprId, ast: &Ast) {
        // Validate the wrapped expression first; if it failed, resign
        // without piling a second diagnostic on top.
        self.visit_expr(inner, ast);
        if ast.is_invalid(inner) {
            self.resign(ast, id);
            return;
        }

        let ty = self.output.eval_type(inner);
        if ty.is_none() || !self.types.boolean_convertible(ty, self.options) {
            self.engine.report_error(
                ErrorCode::E2003,
                ast.expr(inner).span,
                format!(
                    "expression of type `{}` is not evaluable in a boolean context",
                    self.display(ty)
                ),
            );
            self.resign(ast, id);
            return;
        }
        self.finish_expr(ast, id, Ty::BOOL);
    }
}

impl Visitor for Validator<'_, '_> {
    fn visit_decl(&mut self, id: DeclId, ast: &Ast) {
        if ast.validity(id) != Validity::Unchecked {
            return;
        }
        match &ast.decl(id).kind {
            DeclKind::Namespace { members } | DeclKind::Protocol { members } => {
                let members = members.clone();
                self.check_namespace(id, &members, ast);
            }
            DeclKind::Class { members, .. } => {
                let members = members.clone();
                self.check_class(id, &members, ast);
            }
            DeclKind::Field { ty, .. } | DeclKind::Param { ty, .. } | DeclKind::Alias { ty } => {
                let ty = *ty;
                self.visit_type_expr(ty, ast);
                if ast.is_invalid(ty) {
                    self.resign(ast, id);
                } else {
                    let resolved = self.output.type_expr_type(ty);
                    self.output.set_decl_type(id, resolved);
                    ast.approve(id);
                }
            }
            DeclKind::Variable { ty, init } => {
                let (ty, init) = (*ty, *init);
                self.check_variable(id, ty, init, ast);
            }
            DeclKind::Function { .. } => self.check_function(id, ast),
            DeclKind::Enum { .. } => ast.approve(id),
        }
    }

    fn visit_stmt(&mut self, id: StmtId, ast: &Ast) {
        if ast.validity(id) != Validity::Unchecked {
            return;
        }
        match &ast.stmt(id).kind {
            StmtKind::Block(stmts) => {
                let stmts = stmts.clone();
                self.check_block(id, &stmts, ast);
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let (cond, then_branch, else_branch) = (*cond, *then_branch, *else_branch);
                self.check_if(id, cond, then_branch, else_branch, ast);
            }
            StmtKind::Loop { cond, body, .. } => {
                let (cond, body) = (*cond, *body);
                self.visit_expr(cond, ast);
                self.loop_depth += 1;
                self.break_depth += 1;
                self.visit_stmt(body, ast);
                self.loop_depth -= 1;
                self.break_depth -= 1;
                if ast.is_invalid(cond) || ast.is_invalid(body) {
                    self.resign(ast, id);
                } else {
                    ast.approve(id);
                }
            }
            StmtKind::For { var, limit, body } => {
                let (var, limit, body) = (*var, *limit, *body);
                self.resolver.push_locals();
                self.visit_decl(var, ast);
                self.resolver.declare_local(ast.decl(var).name, var);
                self.visit_expr(limit, ast);

                let var_ty = self.output.decl_type(var);
                let limit_ty = self.output.eval_type(limit);
                let mut bad_limit = false;
                if !var_ty.is_none()
                    && !limit_ty.is_none()
                    && !self.types.can_assign_to(limit_ty, var_ty, self.options)
                {
                    self.engine.report_error(
                        ErrorCode::E2005,
                        ast.expr(limit).span,
                        format!(
                            "loop limit of type `{}` does not fit counter `{}`",
                            self.display(limit_ty),
                            self.display(var_ty)
                        ),
                    );
                    bad_limit = true;
                }

                self.loop_depth += 1;
                self.break_depth += 1;
                self.visit_stmt(body, ast);
                self.loop_depth -= 1;
                self.break_depth -= 1;
                self.resolver.pop_locals();

                if bad_limit
                    || ast.is_invalid(var)
                    || ast.is_invalid(limit)
                    || ast.is_invalid(body)
                {
                    self.resign(ast, id);
                } else {
                    ast.approve(id);
                }
            }
            StmtKind::Switch {
                scrutinee,
                cases,
                default,
            } => {
                let scrutinee = *scrutinee;
                let cases = cases.clone();
                let default = *default;

                self.visit_expr(scrutinee, ast);
                let scrutinee_ty = self.output.eval_type(scrutinee);
                let mut any_invalid = ast.is_invalid(scrutinee);

                self.break_depth += 1;
                for case in &cases {
                    self.visit_expr(case.value, ast);
                    if !matches!(
                        ast.expr(case.value).kind,
                        ExprKind::Int(_) | ExprKind::Bool(_)
                    ) {
                        self.engine.report_error(
                            ErrorCode::E2017,
                            ast.expr(case.value).span,
                            "case label must be an integer literal",
                        );
                        any_invalid = true;
                    }
                    let value_ty = self.output.eval_type(case.value);
                    if !scrutinee_ty.is_none()
                        && !value_ty.is_none()
                        && !self
                            .types
                            .can_cast_to(value_ty, scrutinee_ty, false, self.options)
                    {
                        self.engine.report_error(
                            ErrorCode::E2005,
                            ast.expr(case.value).span,
                            format!(
                                "case value of type `{}` does not match `{}`",
                                self.display(value_ty),
                                self.display(scrutinee_ty)
                            ),
                        );
                        any_invalid = true;
                    }
                    self.visit_stmt(case.body, ast);
                    any_invalid |= ast.is_invalid(case.value) || ast.is_invalid(case.body);
                }
                if let Some(default) = default {
                    self.visit_stmt(default, ast);
                    any_invalid |= ast.is_invalid(default);
                }
                self.break_depth -= 1;

                if any_invalid {
                    self.resign(ast, id);
                } else {
                    ast.approve(id);
                }
            }
            StmtKind::Return { value } => {
                let value = *value;
                self.check_return(id, value, ast);
            }
            StmtKind::Break => {
                if self.break_depth == 0 {
                    self.engine.report_error(
                        ErrorCode::E2014,
                        ast.stmt(id).span,
                        "`break` outside a loop or switch",
                    );
                    self.resign(ast, id);
                } else {
                    ast.approve(id);
                }
            }
            StmtKind::Continue => {
                if self.loop_depth == 0 {
                    self.engine.report_error(
                        ErrorCode::E2014,
                        ast.stmt(id).span,
                        "`continue` outside a loop",
                    );
                    self.resign(ast, id);
                } else {
                    ast.approve(id);
                }
            }
            StmtKind::Var(decl) => {
                let decl = *decl;
                self.check_var_stmt(id, decl, ast);
            }
            StmtKind::Expr(expr) => {
                let expr = *expr;
                self.visit_expr(expr, ast);
                if ast.is_invalid(expr) {
                    self.resign(ast, id);
                } else {
                    ast.approve(id);
                }
            }
        }
    }

    fn visit_expr(&mut self, id: ExprId, ast: &Ast) {
        if ast.validity(id) != Validity::Unchecked {
            return;
        }
        match &ast.expr(id).kind {
            ExprKind::Int(_) => self.finish_expr(ast, id, Ty::INT),
            ExprKind::Float(_) => self.finish_expr(ast, id, Ty::FLOAT64),
            ExprKind::Bool(_) => self.finish_expr(ast, id, Ty::BOOL),
            ExprKind::Str(_) => {
                let ty = self.types.pointer_to(Ty::UINT8);
                self.finish_expr(ast, id, ty);
            }
            ExprKind::Null => self.finish_expr(ast, id, Ty::NULL),
            ExprKind::NameRef(symbol) => {
                let symbol = symbol.clone();
                self.check_name_ref(id, &symbol, ast);
            }
            ExprKind::Unary { op, operand } => {
                let (op, operand) = (*op, *operand);
                self.check_unary(id, op, operand, ast);
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let (op, lhs, rhs) = (*op, *lhs, *rhs);
                self.check_binary(id, op, lhs, rhs, ast);
            }
            ExprKind::Assign { target, value } => {
                let (target, value) = (*target, *value);
                self.check_assign(id, target, value, ast);
            }
            ExprKind::Call { callee, args } => {
                let (callee, args) = (*callee, args.clone());
                self.check_call(id, callee, &args, ast);
            }
            ExprKind::Member { base, field, .. } => {
                let (base, field) = (*base, *field);
                self.check_member(id, base, field, ast);
            }
            ExprKind::ImplicitCast { inner, to } => {
                let (inner, to) = (*inner, *to);
                self.check_implicit_cast(id, inner, to, ast);
            }
            ExprKind::BooleanContext { inner } => {
                let inner = *inner;
                self.check_boolean_context(id, inner, ast);
            }
        }
    }

    fn visit_type_expr(&mut self, id: TypeExprId, ast: &Ast) {
        if ast.validity(id) != Validity::Unchecked {
            return;
        }
        match &ast.type_expr(id).kind {
            TypeExprKind::Builtin(builtin) => {
                let ty = self.types.builtin(*builtin);
                self.output.set_type_expr_type(id, ty);
                ast.approve(id);
            }
            TypeExprKind::Named(symbol) => {
                let symbol = symbol.clone();
                let Some(decl) = self.resolver.resolve(&symbol) else {
                    self.engine.report_error(
                        ErrorCode::E2001,
                        ast.type_expr(id).span,
                        format!("unknown type `{}`", symbol.display(self.interner)),
                    );
                    self.resign(ast, id);
                    return;
                };
                match ast.decl(decl).kind {
                    DeclKind::Class { .. } => {
                        let ty = self.types.class_type(decl, ast.decl(decl).name);
                        self.output.set_type_expr_type(id, ty);
                        ast.approve(id);
                    }
                    DeclKind::Alias { ty: aliased } => {
                        self.visit_type_expr(aliased, ast);
                        let ty = self.output.type_expr_type(aliased);
                        if ty.is_none() {
                            self.resign(ast, id);
                        } else {
                            self.output.set_type_expr_type(id, ty);
                            ast.approve(id);
                        }
                    }
                    // Enumerations use their underlying integer type.
                    DeclKind::Enum { .. } => {
                        self.output.set_type_expr_type(id, Ty::INT);
                        ast.approve(id);
                    }
                    _ => {
                        self.engine.report_error(
                            ErrorCode::E2001,
                            ast.type_expr(id).span,
                            format!("`{}` is not a type", symbol.display(self.interner)),
                        );
                        self.resign(ast, id);
                    }
                }
            }
            TypeExprKind::Pointer { pointee } => {
                let pointee = *pointee;
                self.visit_type_expr(pointee, ast);
                if ast.is_invalid(pointee) {
                    self.resign(ast, id);
                    return;
                }
                let pointee_ty = self.output.type_expr_type(pointee);
                let ty = self.types.pointer_to(pointee_ty);
                self.output.set_type_expr_type(id, ty);
                ast.approve(id);
            }
            TypeExprKind::Qualified { quals, inner } => {
                let (quals, inner) = (*quals, *inner);
                self.visit_type_expr(inner, ast);
                if ast.is_invalid(inner) {
                    self.resign(ast, id);
                    return;
                }
                let inner_ty = self.output.type_expr_type(inner);
                let ty = self.types.qualified(quals, inner_ty);
                self.output.set_type_expr_type(id, ty);
                ast.approve(id);
            }
        }
    }
}
