use hp_ast::{
    Ast, BuiltinTy, Decl, DeclId, DeclKind, Expr, ExprId, ExprKind, LoopKind, Name, NameInterner,
    Span, Stmt, StmtId, StmtKind, Symbol, TypeExpr, TypeExprId, TypeExprKind,
};
use hp_diagnostic::DiagnosticEngine;
use hp_ir::{Const, InstKind, IrModule, IrType, Terminator};
use hp_sema::validate_unit;
use hp_types::{TypeCtx, TypeOptions};
use pretty_assertions::assert_eq;

struct UnitBuilder {
    ast: Ast,
    interner: NameInterner,
    root: DeclId,
}

impl UnitBuilder {
    fn new() -> Self {
        let interner = NameInterner::new();
        let mut ast = Ast::new();
        let root = ast.alloc_decl(Decl {
            kind: DeclKind::Namespace { members: vec![] },
            name: Name::EMPTY,
            span: Span::DUMMY,
            name_span: Span::DUMMY,
            container: None,
        });
        ast.set_root(root);
        UnitBuilder { ast, interner, root }
    }

    fn builtin_ty(&mut self, builtin: BuiltinTy) -> TypeExprId {
        self.ast
            .alloc_type_expr(TypeExpr::new(TypeExprKind::Builtin(builtin), Span::DUMMY))
    }

    fn expr(&mut self, kind: ExprKind) -> ExprId {
        self.ast.alloc_expr(Expr::new(kind, Span::DUMMY))
    }

    fn name_ref(&mut self, text: &str) -> ExprId {
        let symbol = Symbol::new(self.interner.intern(text), None);
        self.expr(ExprKind::NameRef(symbol))
    }

    fn cond(&mut self, inner: ExprId) -> ExprId {
        self.expr(ExprKind::BooleanContext { inner })
    }

    fn stmt(&mut self, kind: StmtKind) -> StmtId {
        self.ast.alloc_stmt(Stmt::new(kind, Span::DUMMY))
    }

    fn block(&mut self, stmts: Vec<StmtId>) -> StmtId {
        self.stmt(StmtKind::Block(stmts))
    }

    fn function(&mut self, text: &str, ret: Option<TypeExprId>, body: StmtId) -> DeclId {
        let decl = self.ast.alloc_decl(Decl {
            kind: DeclKind::Function {
                params: vec![],
                ret,
                body: Some(body),
            },
            name: self.interner.intern(text),
            span: Span::DUMMY,
            name_span: Span::DUMMY,
            container: Some(self.root),
        });
        self.ast.add_member(self.root, decl);
        decl
    }

    fn local_var(&mut self, text: &str, ty: TypeExprId, init: Option<ExprId>) -> StmtId {
        let decl = self.ast.alloc_decl(Decl {
            kind: DeclKind::Variable { ty, init },
            name: self.interner.intern(text),
            span: Span::DUMMY,
            name_span: Span::DUMMY,
            container: Some(self.root),
        });
        self.stmt(StmtKind::Var(decl))
    }

    fn global_var(&mut self, text: &str, ty: TypeExprId, init: Option<ExprId>) -> DeclId {
        let decl = self.ast.alloc_decl(Decl {
            kind: DeclKind::Variable { ty, init },
            name: self.interner.intern(text),
            span: Span::DUMMY,
            name_span: Span::DUMMY,
            container: Some(self.root),
        });
        self.ast.add_member(self.root, decl);
        decl
    }

    fn compile(&self) -> IrModule {
        let types = TypeCtx::new();
        let mut engine = DiagnosticEngine::new();
        let result = validate_unit(
            &self.ast,
            &types,
            &self.interner,
            &TypeOptions::default(),
            &mut engine,
        );
        assert!(
            result.passed,
            "validation failed: {:?}",
            result.report.diagnostics()
        );
        crate::lower_unit(&self.ast, &result.output, &types, &self.interner, "unit")
    }
}

#[test]
fn if_lowers_to_three_block_shape() {
    let mut b = UnitBuilder::new();
    let int32 = b.builtin_ty(BuiltinTy::Int32);
    let zero = b.expr(ExprKind::Int(0));
    let var_stmt = b.local_var("n", int32, Some(zero));
    let t = b.expr(ExprKind::Bool(true));
    let cond = b.cond(t);
    let target = b.name_ref("n");
    let one = b.expr(ExprKind::Int(1));
    let assign = b.expr(ExprKind::Assign { target, value: one });
    let assign_stmt = b.stmt(StmtKind::Expr(assign));
    let then_branch = b.block(vec![assign_stmt]);
    let if_stmt = b.stmt(StmtKind::If {
        cond,
        then_branch,
        else_branch: None,
    });
    let body = b.block(vec![var_stmt, if_stmt]);
    b.function("gate", None, body);

    let module = b.compile();
    let func = &module.funcs[0];
    assert_eq!(func.layout.len(), 3, "entry, then, merge");

    let entry = func.block(func.layout[0]);
    let then = func.block(func.layout[1]);
    let merge = func.block(func.layout[2]);

    let Some(Terminator::Branch {
        then_block,
        else_block,
        ..
    }) = entry.terminator
    else {
        panic!("entry must branch, found {:?}", entry.terminator);
    };
    assert_eq!(then_block, func.layout[1]);
    assert_eq!(else_block, func.layout[2], "no else: false edge hits merge");
    assert_eq!(
        then.terminator,
        Some(Terminator::Jump {
            target: func.layout[2]
        })
    );
    // Implicit void return on the open tail.
    assert_eq!(merge.terminator, Some(Terminator::Return { value: None }));
}

#[test]
fn returning_branch_keeps_its_return() {
    let mut b = UnitBuilder::new();
    let t = b.expr(ExprKind::Bool(true));
    let cond = b.cond(t);
    let ret = b.stmt(StmtKind::Return { value: None });
    let then_branch = b.block(vec![ret]);
    let if_stmt = b.stmt(StmtKind::If {
        cond,
        then_branch,
        else_branch: None,
    });
    let body = b.block(vec![if_stmt]);
    b.function("early", None, body);

    let module = b.compile();
    let func = &module.funcs[0];
    let then = func.block(func.layout[1]);
    // The branch body terminated itself; no jump to the merge follows.
    assert_eq!(then.terminator, Some(Terminator::Return { value: None }));
}

#[test]
fn empty_void_function_gets_implicit_return() {
    let mut b = UnitBuilder::new();
    let body = b.block(vec![]);
    b.function("noop", None, body);

    let module = b.compile();
    let func = &module.funcs[0];
    assert_eq!(func.layout.len(), 1);
    assert_eq!(
        func.block(func.layout[0]).terminator,
        Some(Terminator::Return { value: None })
    );
}

#[test]
fn callee_lowers_once_across_call_sites() {
    let mut b = UnitBuilder::new();
    let target_body = b.block(vec![]);
    b.function("target", None, target_body);

    let callee_a = b.name_ref("target");
    let call_a = b.expr(ExprKind::Call {
        callee: callee_a,
        args: vec![],
    });
    let callee_b = b.name_ref("target");
    let call_b = b.expr(ExprKind::Call {
        callee: callee_b,
        args: vec![],
    });
    let s1 = b.stmt(StmtKind::Expr(call_a));
    let s2 = b.stmt(StmtKind::Expr(call_b));
    let body = b.block(vec![s1, s2]);
    b.function("caller", None, body);

    let module = b.compile();
    // One definition for `target` regardless of the two call sites (and
    // the top-level walk reaching it first).
    assert_eq!(module.func_count(), 2);
}

#[test]
fn recursive_function_terminates_lowering() {
    let mut b = UnitBuilder::new();
    let callee = b.name_ref("again");
    let call = b.expr(ExprKind::Call {
        callee,
        args: vec![],
    });
    let call_stmt = b.stmt(StmtKind::Expr(call));
    let body = b.block(vec![call_stmt]);
    b.function("again", None, body);

    let module = b.compile();
    assert_eq!(module.func_count(), 1);
}

#[test]
fn pre_test_while_loop_shape() {
    let mut b = UnitBuilder::new();
    let f = b.expr(ExprKind::Bool(false));
    let cond = b.cond(f);
    let loop_body = b.block(vec![]);
    let loop_stmt = b.stmt(StmtKind::Loop {
        kind: LoopKind::PreWhile,
        cond,
        body: loop_body,
    });
    let body = b.block(vec![loop_stmt]);
    b.function("spin", None, body);

    let module = b.compile();
    let func = &module.funcs[0];
    // entry, cond, body, exit
    assert_eq!(func.layout.len(), 4);
    let [entry, cond_b, body_b, exit] = [
        func.layout[0],
        func.layout[1],
        func.layout[2],
        func.layout[3],
    ];
    assert_eq!(
        func.block(entry).terminator,
        Some(Terminator::Jump { target: cond_b })
    );
    let Some(Terminator::Branch {
        then_block,
        else_block,
        ..
    }) = func.block(cond_b).terminator
    else {
        panic!("condition block must branch");
    };
    assert_eq!(then_block, body_b);
    assert_eq!(else_block, exit);
    assert_eq!(
        func.block(body_b).terminator,
        Some(Terminator::Jump { target: cond_b })
    );
}

#[test]
fn until_loop_swaps_branch_edges() {
    let mut b = UnitBuilder::new();
    let f = b.expr(ExprKind::Bool(false));
    let cond = b.cond(f);
    let loop_body = b.block(vec![]);
    let loop_stmt = b.stmt(StmtKind::Loop {
        kind: LoopKind::PreUntil,
        cond,
        body: loop_body,
    });
    let body = b.block(vec![loop_stmt]);
    b.function("spin", None, body);

    let module = b.compile();
    let func = &module.funcs[0];
    let cond_b = func.layout[1];
    let Some(Terminator::Branch {
        then_block,
        else_block,
        ..
    }) = func.block(cond_b).terminator
    else {
        panic!("condition block must branch");
    };
    // Condition true means the until-loop stops.
    assert_eq!(then_block, func.layout[3]);
    assert_eq!(else_block, func.layout[2]);
}

#[test]
fn globals_are_collected_before_bodies() {
    let mut b = UnitBuilder::new();
    let int32 = b.builtin_ty(BuiltinTy::Int32);
    let init = b.expr(ExprKind::Int(42));
    b.global_var("counter", int32, Some(init));

    let target = b.name_ref("counter");
    let one = b.expr(ExprKind::Int(1));
    let assign = b.expr(ExprKind::Assign { target, value: one });
    let assign_stmt = b.stmt(StmtKind::Expr(assign));
    let body = b.block(vec![assign_stmt]);
    b.function("bump", None, body);

    let module = b.compile();
    assert_eq!(module.globals.len(), 1);
    assert_eq!(module.globals[0].ty, IrType::Int32);
    assert_eq!(
        module.globals[0].init,
        Some(hp_ir::Const::Int(42)),
        "literal initializers are carried on the global"
    );
}

#[test]
fn for_loop_has_header_body_latch_exit() {
    let mut b = UnitBuilder::new();
    let int32 = b.builtin_ty(BuiltinTy::Int32);
    let start = b.expr(ExprKind::Int(1));
    let counter = b.ast.alloc_decl(Decl {
        kind: DeclKind::Variable {
            ty: int32,
            init: Some(start),
        },
        name: b.interner.intern("i"),
        span: Span::DUMMY,
        name_span: Span::DUMMY,
        container: Some(b.root),
    });
    let limit = b.expr(ExprKind::Int(10));
    let loop_body = b.block(vec![]);
    let for_stmt = b.stmt(StmtKind::For {
        var: counter,
        limit,
        body: loop_body,
    });
    let body = b.block(vec![for_stmt]);
    b.function("count", None, body);

    let module = b.compile();
    let func = &module.funcs[0];
    // entry, header, body, latch, exit
    assert_eq!(func.layout.len(), 5);
    let header = func.layout[1];
    let latch = func.layout[3];
    assert!(matches!(
        func.block(header).terminator,
        Some(Terminator::Branch { .. })
    ));
    assert_eq!(
        func.block(latch).terminator,
        Some(Terminator::Jump { target: header })
    );
}

#[test]
fn float_counter_gets_float_constants() {
    let mut b = UnitBuilder::new();
    let float64 = b.builtin_ty(BuiltinTy::Float64);
    let counter = b.ast.alloc_decl(Decl {
        kind: DeclKind::Variable {
            ty: float64,
            init: None,
        },
        name: b.interner.intern("t"),
        span: Span::DUMMY,
        name_span: Span::DUMMY,
        container: Some(b.root),
    });
    let limit = b.expr(ExprKind::Float((4.0f64).to_bits()));
    let loop_body = b.block(vec![]);
    let for_stmt = b.stmt(StmtKind::For {
        var: counter,
        limit,
        body: loop_body,
    });
    let body = b.block(vec![for_stmt]);
    b.function("sweep", None, body);

    let module = b.compile();
    let func = &module.funcs[0];
    let consts: Vec<&Const> = func
        .values
        .iter()
        .filter_map(|inst| match &inst.kind {
            InstKind::Const(c) if inst.ty == IrType::Float64 => Some(c),
            _ => None,
        })
        .collect();
    // Start and step both take the counter's literal kind.
    assert!(consts.contains(&&Const::Float((0.0f64).to_bits())));
    assert!(consts.contains(&&Const::Float((1.0f64).to_bits())));
    assert!(!consts.iter().any(|c| matches!(**c, Const::Int(_))));
}
