//! Validation output tables.
//!
//! The validator records everything downstream passes need here:
//! expression evaluation types, name resolutions, resolved type
//! expressions, declaration storage types, and function signatures.
//! Entries are added monotonically during one session and never removed,
//! which makes [`SemaOutput::eval_type`] referentially consistent: the
//! same expression always reports the same canonical type handle.

use hp_ast::{DeclId, ExprId, TypeExprId};
use hp_diagnostic::Report;
use hp_types::Ty;
use rustc_hash::FxHashMap;

/// A function's resolved signature. `ret` is `Ty::VOID` for void
/// functions.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FnSig {
    pub params: Vec<Ty>,
    pub ret: Ty,
}

/// Side tables produced by one validation session.
#[derive(Default, Debug)]
pub struct SemaOutput {
    expr_types: FxHashMap<ExprId, Ty>,
    resolutions: FxHashMap<ExprId, DeclId>,
    type_expr_types: FxHashMap<TypeExprId, Ty>,
    decl_types: FxHashMap<DeclId, Ty>,
    fn_sigs: FxHashMap<DeclId, FnSig>,
}

impl SemaOutput {
    /// Evaluation type of an expression. `Ty::NONE` if the expression
    /// never received a type (it or a child failed validation).
    pub fn eval_type(&self, expr: ExprId) -> Ty {
        self.expr_types.get(&expr).copied().unwrap_or(Ty::NONE)
    }

    /// The declaration a name reference / member access / call callee
    /// resolved to.
    pub fn resolution(&self, expr: ExprId) -> Option<DeclId> {
        self.resolutions.get(&expr).copied()
    }

    /// Canonical type of a resolved type expression.
    pub fn type_expr_type(&self, ty: TypeExprId) -> Ty {
        self.type_expr_types.get(&ty).copied().unwrap_or(Ty::NONE)
    }

    /// Storage type of a variable, parameter, or field declaration.
    pub fn decl_type(&self, decl: DeclId) -> Ty {
        self.decl_types.get(&decl).copied().unwrap_or(Ty::NONE)
    }

    /// Signature of a function declaration, once computed.
    pub fn fn_sig(&self, decl: DeclId) -> Option<&FnSig> {
        self.fn_sigs.get(&decl)
    }

    // Setters are crate-internal: only the validator writes these tables.

    pub(crate) fn set_expr_type(&mut self, expr: ExprId, ty: Ty) {
        self.expr_types.insert(expr, ty);
    }

    pub(crate) fn set_resolution(&mut self, expr: ExprId, decl: DeclId) {
        self.resolutions.insert(expr, decl);
    }

    pub(crate) fn set_type_expr_type(&mut self, id: TypeExprId, ty: Ty) {
        self.type_expr_types.insert(id, ty);
    }

    pub(crate) fn set_decl_type(&mut self, decl: DeclId, ty: Ty) {
        self.decl_types.insert(decl, ty);
    }

    pub(crate) fn set_fn_sig(&mut self, decl: DeclId, sig: FnSig) {
        self.fn_sigs.insert(decl, sig);
    }

    pub(crate) fn has_fn_sig(&self, decl: DeclId) -> bool {
        self.fn_sigs.contains_key(&decl)
    }
}

/// Result of validating one compilation unit.
#[derive(Debug)]
pub struct ValidationResult {
    /// True when no reachable node resigned and no error was reported.
    pub passed: bool,
    /// Diagnostics in visit order.
    pub report: Report,
    /// Side tables for the lowering pass.
    pub output: SemaOutput,
}
