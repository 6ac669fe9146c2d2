//! Statement nodes.

use crate::{DeclId, ExprId, Span, StmtId};

/// Statement node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

/// Loop flavor: pre-test loops evaluate the condition before the first
/// iteration, post-test loops run the body once first. `Until` flavors
/// iterate while the condition is false.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LoopKind {
    PreWhile,
    PreUntil,
    PostWhile,
    PostUntil,
}

impl LoopKind {
    /// Check if the condition is evaluated before the first iteration.
    pub fn is_pre_test(self) -> bool {
        matches!(self, LoopKind::PreWhile | LoopKind::PreUntil)
    }

    /// Check if the loop continues while the condition is false.
    pub fn is_until(self) -> bool {
        matches!(self, LoopKind::PreUntil | LoopKind::PostUntil)
    }
}

/// One arm of a switch statement.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SwitchCase {
    pub value: ExprId,
    pub body: StmtId,
}

/// Statement kinds.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    /// Compound block: ordered sequence of owned sub-statements.
    Block(Vec<StmtId>),

    /// If/else. Conditions arrive wrapped in a boolean-context expression.
    If {
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },

    /// While/until loop, pre- or post-test.
    Loop {
        kind: LoopKind,
        cond: ExprId,
        body: StmtId,
    },

    /// Counted for loop: iterates `var` from its initializer up to `limit`.
    For {
        var: DeclId,
        limit: ExprId,
        body: StmtId,
    },

    /// Switch over a scrutinee value.
    Switch {
        scrutinee: ExprId,
        cases: Vec<SwitchCase>,
        default: Option<StmtId>,
    },

    /// Return, with optional value.
    Return { value: Option<ExprId> },

    Break,
    Continue,

    /// Local variable declaration statement.
    Var(DeclId),

    /// Expression evaluated for effect.
    Expr(ExprId),
}
