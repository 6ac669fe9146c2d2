//! Lowering from the validated AST to basic-block IR.
//!
//! Lowering consumes the validator's side tables and refuses anything
//! less than a fully valid tree: semantic failures must be caught
//! before this pass, so every panic in here is a compiler bug, not a
//! user error.
//!
//! Functions lower on first use. A call site lowers its arguments left
//! to right, then asks for the callee; if the callee has not been
//! lowered yet, its body is lowered right there (with its own builder)
//! and memoized, so each function is declared and defined exactly once
//! no matter how many call sites reach it.

use hp_ast::{
    Ast, BinaryOp, DeclId, DeclKind, ExprId, ExprKind, Name, NameInterner, StmtId, StmtKind,
    UnaryOp, Validity,
};
use hp_ir::{
    BlockId, Const, FuncBuilder, FuncId, GlobalId, Inst, InstKind, IrModule, IrType, ModuleBuilder,
    PrimOp, SlotId, Terminator, ValueId,
};
use hp_sema::SemaOutput;
use hp_types::{Ty, TypeCtx, TypeData};
use rustc_hash::FxHashMap;

/// Lower a validated compilation unit into an IR module named `ident`.
///
/// # Panics
/// Panics if the unit's root did not pass validation, or on internal
/// consistency failures (missing side-table entries for valid nodes).
pub fn lower_unit(
    ast: &Ast,
    sema: &SemaOutput,
    types: &TypeCtx,
    interner: &NameInterner,
    ident: &str,
) -> IrModule {
    let Some(root) = ast.root() else {
        panic!("lower_unit on an AST without a root namespace");
    };
    assert!(
        ast.validity(root) == Validity::Valid,
        "lowering requires a fully validated compilation unit"
    );
    tracing::debug!(ident, "lowering session start");

    let mut lowerer = Lowerer {
        ast,
        sema,
        types,
        interner,
        module: ModuleBuilder::new(),
        funcs: FxHashMap::default(),
        globals: FxHashMap::default(),
        tmp_name: interner.intern("tmp"),
    };

    // Globals first, so any function body can reference them.
    lowerer.collect_globals(root);
    lowerer.lower_container(root);

    let module = lowerer.module.finalize(ident);
    tracing::debug!(funcs = module.func_count(), "lowering session end");
    module
}

struct Lowerer<'a> {
    ast: &'a Ast,
    sema: &'a SemaOutput,
    types: &'a TypeCtx,
    interner: &'a NameInterner,
    module: ModuleBuilder,
    funcs: FxHashMap<DeclId, FuncId>,
    globals: FxHashMap<DeclId, GlobalId>,
    tmp_name: Name,
}

/// Per-body lowering state. Each function body gets a fresh one, so
/// lowering a callee mid-body never disturbs the caller's builder.
struct BodyCtx {
    builder: FuncBuilder,
    slots: FxHashMap<DeclId, SlotId>,
    /// Innermost-last jump targets for `break` (loops and switches).
    break_targets: Vec<BlockId>,
    /// Innermost-last jump targets for `continue` (loops only).
    continue_targets: Vec<BlockId>,
}

impl Lowerer<'_> {
    // ── Type mapping ────────────────────────────────────────────────

    /// Flatten a surface type to its machine type. Qualifiers erase,
    /// class values and all pointers become untyped addresses, and the
    /// generic `int` commits to 32 bits.
    fn map_ty(&self, ty: Ty) -> IrType {
        assert!(!ty.is_none(), "lowering an unresolved type");
        match self.types.lookup(self.types.unqualified(ty)) {
            TypeData::Void => IrType::Void,
            TypeData::Bool => IrType::Bool,
            TypeData::Int8 => IrType::Int8,
            TypeData::Int16 => IrType::Int16,
            TypeData::Int32 | TypeData::Int => IrType::Int32,
            TypeData::Int64 => IrType::Int64,
            TypeData::UInt8 => IrType::UInt8,
            TypeData::UInt16 => IrType::UInt16,
            TypeData::UInt32 => IrType::UInt32,
            TypeData::UInt64 => IrType::UInt64,
            TypeData::Float32 => IrType::Float32,
            TypeData::Float64 => IrType::Float64,
            TypeData::Null | TypeData::Pointer { .. } | TypeData::Class { .. } => IrType::Ptr,
            TypeData::Qualified { .. } => unreachable!("unqualified above"),
        }
    }

    fn eval_ir_type(&self, expr: ExprId) -> IrType {
        self.map_ty(self.sema.eval_type(expr))
    }

    /// Linkage name: the dotted symbol path, interned.
    fn mangled_name(&self, decl: DeclId) -> Name {
        let path = self.ast.symbol_path(decl).display(self.interner);
        self.interner.intern(&path)
    }

    // ── Module-level walk ───────────────────────────────────────────

    fn collect_globals(&mut self, container: DeclId) {
        for &member in self.ast.decl(container).members() {
            match &self.ast.decl(member).kind {
                DeclKind::Namespace { .. } => self.collect_globals(member),
                DeclKind::Variable { init, .. } => {
                    let ty = self.map_ty(self.sema.decl_type(member));
                    let init = init.map(|e| self.const_init(e));
                    let name = self.mangled_name(member);
                    let id = self.module.declare_global(name, ty, init);
                    self.globals.insert(member, id);
                }
                _ => {}
            }
        }
    }

    /// Global initializers must be literal constants; anything else
    /// would need a synthesized module constructor.
    fn const_init(&self, expr: ExprId) -> Const {
        match self.ast.expr(expr).kind {
            ExprKind::Int(v) => Const::Int(v),
            ExprKind::Float(bits) => Const::Float(bits),
            ExprKind::Bool(v) => Const::Bool(v),
            ExprKind::Str(name) => Const::Str(name),
            ExprKind::Null => Const::Null,
            ref other => panic!("non-constant global initializer {other:?}"),
        }
    }

    fn lower_container(&mut self, container: DeclId) {
        for &member in self.ast.decl(container).members() {
            match &self.ast.decl(member).kind {
                DeclKind::Namespace { .. } | DeclKind::Class { .. } => {
                    self.lower_container(member);
                }
                DeclKind::Function { .. } => {
                    self.ensure_function(member);
                }
                _ => {}
            }
        }
    }

    // ── Functions ───────────────────────────────────────────────────

    /// FuncId for a function declaration, lowering the body on first
    /// use. The ID is memoized before the body lowers, so recursion
    /// terminates.
    fn ensure_function(&mut self, decl: DeclId) -> FuncId {
        if let Some(&id) = self.funcs.get(&decl) {
            return id;
        }
        let Some(sig) = self.sema.fn_sig(decl) else {
            panic!("lowering a function without a recorded signature");
        };
        let params: Vec<IrType> = sig.params.iter().map(|&t| self.map_ty(t)).collect();
        let ret = self.map_ty(sig.ret);
        let name = self.mangled_name(decl);
        let id = self.module.declare_func(name, params, ret);
        self.funcs.insert(decl, id);
        tracing::trace!(func = ?id, "lower function body");

        let body = self.lower_body(decl, id);
        self.module.define_func(id, body);
        id
    }

    fn lower_body(&mut self, decl: DeclId, id: FuncId) -> hp_ir::Function {
        let DeclKind::Function { params, body, .. } = &self.ast.decl(decl).kind else {
            unreachable!("ensure_function checks the kind");
        };
        let params = params.clone();
        let body = *body;

        let mut ctx = BodyCtx {
            builder: self.module.body_builder(id),
            slots: FxHashMap::default(),
            break_targets: Vec::new(),
            continue_targets: Vec::new(),
        };
        let entry = ctx.builder.new_block();
        ctx.builder.set_insertion_point(entry);

        // Parameters spill into slots so they are assignable storage.
        for (index, &param) in params.iter().enumerate() {
            let Ok(index) = u32::try_from(index) else {
                panic!("function exceeded u32::MAX parameters");
            };
            let ty = ctx.builder.param_type(index);
            let slot = ctx.builder.alloc_slot(self.ast.decl(param).name, ty);
            let value = ctx.builder.push(Inst {
                kind: InstKind::Param(index),
                ty,
            });
            let addr = ctx.builder.push(Inst {
                kind: InstKind::SlotAddr(slot),
                ty: IrType::Ptr,
            });
            ctx.builder.push(Inst {
                kind: InstKind::Store { addr, value },
                ty: IrType::Void,
            });
            ctx.slots.insert(param, slot);
        }

        match body {
            Some(body) => self.lower_stmt(&mut ctx, body),
            // Forward declaration with no body: the symbol resolves at
            // link time, the stub is never entered.
            None => ctx.builder.terminate(Terminator::Unreachable),
        }

        // Fall-through epilogue. Void functions return implicitly; for
        // value-returning functions the validator proved every path
        // returns, so an open tail is unreachable.
        if !ctx.builder.is_terminated(ctx.builder.insertion_point()) {
            if ctx.builder.ret_type() == IrType::Void {
                ctx.builder.terminate(Terminator::Return { value: None });
            } else {
                ctx.builder.terminate(Terminator::Unreachable);
            }
        }
        ctx.builder.finish()
    }

    // ── Statements ──────────────────────────────────────────────────

    fn lower_stmt(&mut self, ctx: &mut BodyCtx, id: StmtId) {
        match &self.ast.stmt(id).kind {
            StmtKind::Block(stmts) => {
                for &stmt in &stmts.clone() {
                    // Anything after a terminator is unreachable; the
                    // validator already warned about it.
                    if ctx.builder.is_terminated(ctx.builder.insertion_point()) {
                        break;
                    }
                    self.lower_stmt(ctx, stmt);
                }
            }

            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let (cond, then_branch, else_branch) = (*cond, *then_branch, *else_branch);
                self.lower_if(ctx, cond, then_branch, else_branch);
            }

            StmtKind::Loop { kind, cond, body } => {
                let (kind, cond, body) = (*kind, *cond, *body);
                self.lower_loop(ctx, kind, cond, body);
            }

            StmtKind::For { var, limit, body } => {
                let (var, limit, body) = (*var, *limit, *body);
                self.lower_for(ctx, var, limit, body);
            }

            StmtKind::Switch {
                scrutinee,
                cases,
                default,
            } => {
                let scrutinee = *scrutinee;
                let cases = cases.clone();
                let default = *default;
                self.lower_switch(ctx, scrutinee, &cases, default);
            }

            StmtKind::Return { value } => {
                let value = value.map(|v| {
                    let lowered = self.lower_value(ctx, v);
                    let ret = ctx.builder.ret_type();
                    self.cast_to(ctx, lowered, ret)
                });
                ctx.builder.terminate(Terminator::Return { value });
            }

            StmtKind::Break => {
                let Some(&target) = ctx.break_targets.last() else {
                    panic!("break outside a loop or switch survived validation");
                };
                ctx.builder.terminate(Terminator::Jump { target });
            }

            StmtKind::Continue => {
                let Some(&target) = ctx.continue_targets.last() else {
                    panic!("continue outside a loop survived validation");
                };
                ctx.builder.terminate(Terminator::Jump { target });
            }

            StmtKind::Var(decl) => {
                let decl = *decl;
                let DeclKind::Variable { init, .. } = self.ast.decl(decl).kind else {
                    panic!("var statement carries a non-variable declaration");
                };
                let ty = self.map_ty(self.sema.decl_type(decl));
                let slot = ctx.builder.alloc_slot(self.ast.decl(decl).name, ty);
                ctx.slots.insert(decl, slot);
                if let Some(init) = init {
                    let value = self.lower_value(ctx, init);
                    let value = self.cast_to(ctx, value, ty);
                    let addr = ctx.builder.push(Inst {
                        kind: InstKind::SlotAddr(slot),
                        ty: IrType::Ptr,
                    });
                    ctx.builder.push(Inst {
                        kind: InstKind::Store { addr, value },
                        ty: IrType::Void,
                    });
                }
            }

            StmtKind::Expr(expr) => {
                let expr = *expr;
                self.lower_expr(ctx, expr);
            }
        }
    }

    /// Three-block if shape: a true block, a false block only when an
    /// else branch exists, and always a merge block. Each branch falls
    /// through to the merge only if its body did not already terminate.
    fn lower_if(
        &mut self,
        ctx: &mut BodyCtx,
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    ) {
        let cond_value = self.lower_truthy(ctx, cond);
        let then_block = ctx.builder.create_block();
        let merge_block = ctx.builder.create_block();
        let else_block = else_branch.map(|_| ctx.builder.create_block());

        ctx.builder.terminate(Terminator::Branch {
            cond: cond_value,
            then_block,
            else_block: else_block.unwrap_or(merge_block),
        });

        ctx.builder.append_block(then_block);
        ctx.builder.set_insertion_point(then_block);
        self.lower_stmt(ctx, then_branch);
        self.jump_if_open(ctx, merge_block);

        if let (Some(else_block), Some(else_branch)) = (else_block, else_branch) {
            ctx.builder.append_block(else_block);
            ctx.builder.set_insertion_point(else_block);
            self.lower_stmt(ctx, else_branch);
            self.jump_if_open(ctx, merge_block);
        }

        ctx.builder.append_block(merge_block);
        ctx.builder.set_insertion_point(merge_block);
    }

    fn lower_loop(&mut self, ctx: &mut BodyCtx, kind: hp_ast::LoopKind, cond: ExprId, body: StmtId) {
        let cond_block = ctx.builder.create_block();
        let body_block = ctx.builder.create_block();
        let exit_block = ctx.builder.create_block();

        let enter = if kind.is_pre_test() {
            cond_block
        } else {
            body_block
        };
        ctx.builder.terminate(Terminator::Jump { target: enter });

        let lower_cond = |this: &mut Self, ctx: &mut BodyCtx| {
            let cond_value = this.lower_truthy(ctx, cond);
            // `until` loops run while the condition is false.
            let (then_block, else_block) = if kind.is_until() {
                (exit_block, body_block)
            } else {
                (body_block, exit_block)
            };
            ctx.builder.terminate(Terminator::Branch {
                cond: cond_value,
                then_block,
                else_block,
            });
        };

        if kind.is_pre_test() {
            ctx.builder.append_block(cond_block);
            ctx.builder.set_insertion_point(cond_block);
            lower_cond(self, ctx);

            ctx.builder.append_block(body_block);
            ctx.builder.set_insertion_point(body_block);
            self.lower_loop_body(ctx, body, exit_block, cond_block);
            self.jump_if_open(ctx, cond_block);
        } else {
            ctx.builder.append_block(body_block);
            ctx.builder.set_insertion_point(body_block);
            self.lower_loop_body(ctx, body, exit_block, cond_block);
            self.jump_if_open(ctx, cond_block);

            ctx.builder.append_block(cond_block);
            ctx.builder.set_insertion_point(cond_block);
            lower_cond(self, ctx);
        }

        ctx.builder.append_block(exit_block);
        ctx.builder.set_insertion_point(exit_block);
    }

    /// Counted loop: the counter slot initializes from the variable's
    /// initializer (zero when absent), the bound is inclusive and
    /// re-evaluated each iteration, and the latch adds one.
    fn lower_for(&mut self, ctx: &mut BodyCtx, var: DeclId, limit: ExprId, body: StmtId) {
        let DeclKind::Variable { init, .. } = self.ast.decl(var).kind else {
            panic!("for statement carries a non-variable counter");
        };
        let counter_ty = self.map_ty(self.sema.decl_type(var));
        let slot = ctx.builder.alloc_slot(self.ast.decl(var).name, counter_ty);
        ctx.slots.insert(var, slot);

        let start = match init {
            Some(init) => {
                let value = self.lower_value(ctx, init);
                self.cast_to(ctx, value, counter_ty)
            }
            None => ctx.builder.push(Inst {
                kind: InstKind::Const(counter_const(counter_ty, 0)),
                ty: counter_ty,
            }),
        };
        self.store_slot(ctx, slot, start);

        let header_block = ctx.builder.create_block();
        let body_block = ctx.builder.create_block();
        let latch_block = ctx.builder.create_block();
        let exit_block = ctx.builder.create_block();

        ctx.builder.terminate(Terminator::Jump {
            target: header_block,
        });
        ctx.builder.append_block(header_block);
        ctx.builder.set_insertion_point(header_block);
        let counter = self.load_slot(ctx, slot, counter_ty);
        let bound = self.lower_value(ctx, limit);
        let bound = self.cast_to(ctx, bound, counter_ty);
        let cmp = ctx.builder.push(Inst {
            kind: InstKind::Prim {
                op: PrimOp::Binary(BinaryOp::Le),
                args: vec![counter, bound],
            },
            ty: IrType::Bool,
        });
        ctx.builder.terminate(Terminator::Branch {
            cond: cmp,
            then_block: body_block,
            else_block: exit_block,
        });

        ctx.builder.append_block(body_block);
        ctx.builder.set_insertion_point(body_block);
        self.lower_loop_body(ctx, body, exit_block, latch_block);
        self.jump_if_open(ctx, latch_block);

        ctx.builder.append_block(latch_block);
        ctx.builder.set_insertion_point(latch_block);
        let counter = self.load_slot(ctx, slot, counter_ty);
        let one = ctx.builder.push(Inst {
            kind: InstKind::Const(counter_const(counter_ty, 1)),
            ty: counter_ty,
        });
        let next = ctx.builder.push(Inst {
            kind: InstKind::Prim {
                op: PrimOp::Binary(BinaryOp::Add),
                args: vec![counter, one],
            },
            ty: counter_ty,
        });
        self.store_slot(ctx, slot, next);
        ctx.builder.terminate(Terminator::Jump {
            target: header_block,
        });

        ctx.builder.append_block(exit_block);
        ctx.builder.set_insertion_point(exit_block);
    }

    fn lower_loop_body(
        &mut self,
        ctx: &mut BodyCtx,
        body: StmtId,
        break_to: BlockId,
        continue_to: BlockId,
    ) {
        ctx.break_targets.push(break_to);
        ctx.continue_targets.push(continue_to);
        self.lower_stmt(ctx, body);
        ctx.continue_targets.pop();
        ctx.break_targets.pop();
    }

    /// Switch lowers to a multi-way terminator. Case bodies fall
    /// through in declaration order (then into the default when one
    /// exists); `break` jumps to the exit.
    fn lower_switch(
        &mut self,
        ctx: &mut BodyCtx,
        scrutinee: ExprId,
        cases: &[hp_ast::SwitchCase],
        default: Option<StmtId>,
    ) {
        let value = self.lower_value(ctx, scrutinee);
        let exit_block = ctx.builder.create_block();

        let case_blocks: Vec<BlockId> = cases.iter().map(|_| ctx.builder.create_block()).collect();
        let default_block = default.map(|_| ctx.builder.create_block());

        let arms: Vec<(i64, BlockId)> = cases
            .iter()
            .zip(&case_blocks)
            .map(|(case, &block)| (self.case_value(case.value), block))
            .collect();
        ctx.builder.terminate(Terminator::Switch {
            scrutinee: value,
            cases: arms,
            default: default_block.unwrap_or(exit_block),
        });

        ctx.break_targets.push(exit_block);
        for (idx, (case, &block)) in cases.iter().zip(&case_blocks).enumerate() {
            ctx.builder.append_block(block);
            ctx.builder.set_insertion_point(block);
            self.lower_stmt(ctx, case.body);
            let next = case_blocks
                .get(idx + 1)
                .copied()
                .or(default_block)
                .unwrap_or(exit_block);
            self.jump_if_open(ctx, next);
        }
        if let (Some(block), Some(default)) = (default_block, default) {
            ctx.builder.append_block(block);
            ctx.builder.set_insertion_point(block);
            self.lower_stmt(ctx, default);
            self.jump_if_open(ctx, exit_block);
        }
        ctx.break_targets.pop();

        ctx.builder.append_block(exit_block);
        ctx.builder.set_insertion_point(exit_block);
    }

    /// Case labels must be integer literals; richer constant folding
    /// would live in a dedicated evaluator.
    fn case_value(&self, expr: ExprId) -> i64 {
        match self.ast.expr(expr).kind {
            ExprKind::Int(v) => v,
            ExprKind::Bool(v) => i64::from(v),
            ref other => panic!("non-constant switch case {other:?}"),
        }
    }

    fn jump_if_open(&mut self, ctx: &mut BodyCtx, target: BlockId) {
        if !ctx.builder.is_terminated(ctx.builder.insertion_point()) {
            ctx.builder.terminate(Terminator::Jump { target });
        }
    }

    // ── Expressions ─────────────────────────────────────────────────

    /// Lower an expression for its value. `None` only for void calls.
    fn lower_expr(&mut self, ctx: &mut BodyCtx, id: ExprId) -> Option<ValueId> {
        match &self.ast.expr(id).kind {
            ExprKind::Int(v) => Some(ctx.builder.push(Inst {
                kind: InstKind::Const(Const::Int(*v)),
                ty: self.eval_ir_type(id),
            })),
            ExprKind::Float(bits) => Some(ctx.builder.push(Inst {
                kind: InstKind::Const(Const::Float(*bits)),
                ty: self.eval_ir_type(id),
            })),
            ExprKind::Bool(v) => Some(ctx.builder.push(Inst {
                kind: InstKind::Const(Const::Bool(*v)),
                ty: IrType::Bool,
            })),
            ExprKind::Str(name) => Some(ctx.builder.push(Inst {
                kind: InstKind::Const(Const::Str(*name)),
                ty: IrType::Ptr,
            })),
            ExprKind::Null => Some(ctx.builder.push(Inst {
                kind: InstKind::Const(Const::Null),
                ty: IrType::Ptr,
            })),

            ExprKind::NameRef(_) | ExprKind::Member { .. } => {
                let ty = self.eval_ir_type(id);
                let addr = self.lower_place(ctx, id);
                Some(ctx.builder.push(Inst {
                    kind: InstKind::Load { addr },
                    ty,
                }))
            }

            ExprKind::Unary { op, operand } => {
                let (op, operand) = (*op, *operand);
                Some(self.lower_unary(ctx, id, op, operand))
            }

            ExprKind::Binary { op, lhs, rhs } => {
                let (op, lhs, rhs) = (*op, *lhs, *rhs);
                Some(self.lower_binary(ctx, id, op, lhs, rhs))
            }

            ExprKind::Assign { target, value } => {
                let (target, value) = (*target, *value);
                let addr = self.lower_place(ctx, target);
                let target_ty = self.eval_ir_type(target);
                let lowered = self.lower_value(ctx, value);
                let lowered = self.cast_to(ctx, lowered, target_ty);
                ctx.builder.push(Inst {
                    kind: InstKind::Store {
                        addr,
                        value: lowered,
                    },
                    ty: IrType::Void,
                });
                Some(lowered)
            }

            ExprKind::Call { args, .. } => {
                let args = args.clone();
                let Some(func_decl) = self.sema.resolution(id) else {
                    panic!("unresolved call survived validation");
                };
                let Some(sig) = self.sema.fn_sig(func_decl) else {
                    panic!("call resolved to a function without a signature");
                };
                let param_tys: Vec<IrType> = sig.params.iter().map(|&t| self.map_ty(t)).collect();
                let ret = self.map_ty(sig.ret);

                // Arguments first, left to right; the callee lowers on
                // first use only after its arguments.
                let mut lowered = Vec::with_capacity(args.len());
                for (&arg, &ty) in args.iter().zip(&param_tys) {
                    let value = self.lower_value(ctx, arg);
                    lowered.push(self.cast_to(ctx, value, ty));
                }
                let func = self.ensure_function(func_decl);
                let result = ctx.builder.push(Inst {
                    kind: InstKind::Call {
                        func,
                        args: lowered,
                    },
                    ty: ret,
                });
                if ret == IrType::Void {
                    None
                } else {
                    Some(result)
                }
            }

            ExprKind::ImplicitCast { inner, .. } => {
                let inner = *inner;
                let dest = self.eval_ir_type(id);
                let value = self.lower_value(ctx, inner);
                Some(self.cast_to(ctx, value, dest))
            }

            ExprKind::BooleanContext { inner } => {
                let inner = *inner;
                Some(self.truthy_value(ctx, inner))
            }
        }
    }

    /// Lower an expression that must produce a value.
    fn lower_value(&mut self, ctx: &mut BodyCtx, id: ExprId) -> ValueId {
        let Some(value) = self.lower_expr(ctx, id) else {
            panic!("void expression used as a value");
        };
        value
    }

    /// Condition value: lower and force to boolean.
    fn lower_truthy(&mut self, ctx: &mut BodyCtx, id: ExprId) -> ValueId {
        // Conditions normally arrive wrapped in a boolean context; the
        // wrapper and a bare expression lower identically.
        match self.ast.expr(id).kind {
            ExprKind::BooleanContext { inner } => self.truthy_value(ctx, inner),
            _ => self.truthy_value(ctx, id),
        }
    }

    fn truthy_value(&mut self, ctx: &mut BodyCtx, id: ExprId) -> ValueId {
        let value = self.lower_value(ctx, id);
        if ctx.builder.value_type(value) == IrType::Bool {
            value
        } else {
            ctx.builder.push(Inst {
                kind: InstKind::Truthy { value },
                ty: IrType::Bool,
            })
        }
    }

    fn lower_unary(&mut self, ctx: &mut BodyCtx, id: ExprId, op: UnaryOp, operand: ExprId) -> ValueId {
        match op {
            UnaryOp::Neg => {
                let value = self.lower_value(ctx, operand);
                ctx.builder.push(Inst {
                    kind: InstKind::Prim {
                        op: PrimOp::Unary(UnaryOp::Neg),
                        args: vec![value],
                    },
                    ty: self.eval_ir_type(id),
                })
            }
            UnaryOp::Not => {
                let value = self.truthy_value(ctx, operand);
                ctx.builder.push(Inst {
                    kind: InstKind::Prim {
                        op: PrimOp::Unary(UnaryOp::Not),
                        args: vec![value],
                    },
                    ty: IrType::Bool,
                })
            }
            UnaryOp::AddrOf => self.lower_place(ctx, operand),
            UnaryOp::Deref => {
                let addr = self.lower_value(ctx, operand);
                ctx.builder.push(Inst {
                    kind: InstKind::Load { addr },
                    ty: self.eval_ir_type(id),
                })
            }
        }
    }

    fn lower_binary(
        &mut self,
        ctx: &mut BodyCtx,
        id: ExprId,
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    ) -> ValueId {
        if op.is_logical() {
            return self.lower_short_circuit(ctx, op, lhs, rhs);
        }

        let result_ty = self.eval_ir_type(id);
        let left = self.lower_value(ctx, lhs);
        let right = self.lower_value(ctx, rhs);

        // Operands unify before the operation: comparisons widen the
        // right side to the left, arithmetic converges on the result.
        let (left, right) = if op.is_comparison() {
            let unified = ctx.builder.value_type(left);
            (left, self.cast_to(ctx, right, unified))
        } else {
            (
                self.cast_to(ctx, left, result_ty),
                self.cast_to(ctx, right, result_ty),
            )
        };

        ctx.builder.push(Inst {
            kind: InstKind::Prim {
                op: PrimOp::Binary(op),
                args: vec![left, right],
            },
            ty: result_ty,
        })
    }

    /// Short-circuit logic through a boolean temp slot: the right side
    /// evaluates only when the left side does not decide the result.
    fn lower_short_circuit(
        &mut self,
        ctx: &mut BodyCtx,
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    ) -> ValueId {
        let slot = ctx.builder.alloc_slot(self.tmp_name, IrType::Bool);

        let left = self.truthy_value(ctx, lhs);
        self.store_slot(ctx, slot, left);

        let rhs_block = ctx.builder.create_block();
        let merge_block = ctx.builder.create_block();
        let (then_block, else_block) = match op {
            BinaryOp::And => (rhs_block, merge_block),
            BinaryOp::Or => (merge_block, rhs_block),
            _ => unreachable!("caller checked is_logical"),
        };
        ctx.builder.terminate(Terminator::Branch {
            cond: left,
            then_block,
            else_block,
        });

        ctx.builder.append_block(rhs_block);
        ctx.builder.set_insertion_point(rhs_block);
        let right = self.truthy_value(ctx, rhs);
        self.store_slot(ctx, slot, right);
        self.jump_if_open(ctx, merge_block);

        ctx.builder.append_block(merge_block);
        ctx.builder.set_insertion_point(merge_block);
        self.load_slot(ctx, slot, IrType::Bool)
    }

    // ── Places ──────────────────────────────────────────────────────

    /// Lower a storage expression to its address.
    fn lower_place(&mut self, ctx: &mut BodyCtx, id: ExprId) -> ValueId {
        match &self.ast.expr(id).kind {
            ExprKind::NameRef(_) => {
                let Some(decl) = self.sema.resolution(id) else {
                    panic!("unresolved name survived validation");
                };
                if let Some(&slot) = ctx.slots.get(&decl) {
                    ctx.builder.push(Inst {
                        kind: InstKind::SlotAddr(slot),
                        ty: IrType::Ptr,
                    })
                } else if let Some(&global) = self.globals.get(&decl) {
                    ctx.builder.push(Inst {
                        kind: InstKind::GlobalAddr(global),
                        ty: IrType::Ptr,
                    })
                } else {
                    panic!("name resolves to storage unknown to lowering");
                }
            }

            ExprKind::Member { base, .. } => {
                let base = *base;
                let Some(field) = self.sema.resolution(id) else {
                    panic!("unresolved member access survived validation");
                };
                let DeclKind::Field { index, .. } = self.ast.decl(field).kind else {
                    panic!("member access resolved to a non-field");
                };
                // Class values are already addresses, so a value lower
                // of the base yields the object pointer whether the
                // base is a class value or a pointer to one.
                let base_ptr = self.lower_value(ctx, base);
                ctx.builder.push(Inst {
                    kind: InstKind::FieldAddr {
                        base: base_ptr,
                        index,
                    },
                    ty: IrType::Ptr,
                })
            }

            ExprKind::Unary {
                op: UnaryOp::Deref,
                operand,
            } => {
                let operand = *operand;
                self.lower_value(ctx, operand)
            }

            other => panic!("non-storage expression {other:?} lowered as a place"),
        }
    }

    // ── Slot helpers ────────────────────────────────────────────────

    fn store_slot(&mut self, ctx: &mut BodyCtx, slot: SlotId, value: ValueId) {
        let addr = ctx.builder.push(Inst {
            kind: InstKind::SlotAddr(slot),
            ty: IrType::Ptr,
        });
        ctx.builder.push(Inst {
            kind: InstKind::Store { addr, value },
            ty: IrType::Void,
        });
    }

    fn load_slot(&mut self, ctx: &mut BodyCtx, slot: SlotId, ty: IrType) -> ValueId {
        let addr = ctx.builder.push(Inst {
            kind: InstKind::SlotAddr(slot),
            ty: IrType::Ptr,
        });
        ctx.builder.push(Inst {
            kind: InstKind::Load { addr },
            ty,
        })
    }

    fn cast_to(&mut self, ctx: &mut BodyCtx, value: ValueId, to: IrType) -> ValueId {
        if ctx.builder.value_type(value) == to {
            value
        } else {
            ctx.builder.push(Inst {
                kind: InstKind::Cast { value },
                ty: to,
            })
        }
    }
}

/// Constant literal matching the counter's type, so a float counter
/// gets float-kind constants for its start and step.
fn counter_const(ty: IrType, value: i64) -> Const {
    if ty.is_float() {
        Const::Float((value as f64).to_bits())
    } else {
        Const::Int(value)
    }
}
