//! Instructions and terminators.

use hp_ast::{BinaryOp, Name, UnaryOp};

use crate::{BlockId, FuncId, GlobalId, IrType, SlotId, ValueId};

/// Literal constant materialized as a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Const {
    Int(i64),
    Float(u64),
    Bool(bool),
    /// Interned string data; lowers to a pointer to static storage.
    Str(Name),
    Null,
}

/// Primitive operation. Wraps the surface operators rather than
/// duplicating them, so new operators stay in sync automatically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimOp {
    Binary(BinaryOp),
    Unary(UnaryOp),
}

/// A single instruction.
///
/// An instruction IS its result value: the `ValueId` returned when the
/// builder pushes an instruction indexes the function's value pool, and
/// operands reference earlier entries in that pool.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Inst {
    pub kind: InstKind,
    /// Result type. `Void` for pure effects such as stores.
    pub ty: IrType,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InstKind {
    /// Materialize a constant.
    Const(Const),

    /// The n-th incoming function argument.
    Param(u32),

    /// Address of a mutable stack slot.
    SlotAddr(SlotId),

    /// Address of a module-level global.
    GlobalAddr(GlobalId),

    /// Load from an address.
    Load { addr: ValueId },

    /// Store to an address. Produces no value.
    Store { addr: ValueId, value: ValueId },

    /// Address of a class field, by storage index.
    FieldAddr { base: ValueId, index: u32 },

    /// Primitive arithmetic, comparison, or logic.
    Prim { op: PrimOp, args: Vec<ValueId> },

    /// Direct call.
    Call { func: FuncId, args: Vec<ValueId> },

    /// Numeric conversion to the instruction's result type.
    Cast { value: ValueId },

    /// Boolean-context conversion: compare against the zero of the
    /// operand's type. Result type is always `Bool`.
    Truthy { value: ValueId },
}

impl Inst {
    /// Check if this instruction produces a usable value.
    pub fn has_result(&self) -> bool {
        self.ty.is_value()
    }

    /// Values read by this instruction, in operand order.
    pub fn operands(&self) -> Vec<ValueId> {
        match &self.kind {
            InstKind::Const(_)
            | InstKind::Param(_)
            | InstKind::SlotAddr(_)
            | InstKind::GlobalAddr(_) => vec![],
            InstKind::Load { addr } => vec![*addr],
            InstKind::Store { addr, value } => vec![*addr, *value],
            InstKind::FieldAddr { base, .. } => vec![*base],
            InstKind::Prim { args, .. } | InstKind::Call { args, .. } => args.clone(),
            InstKind::Cast { value } | InstKind::Truthy { value } => vec![*value],
        }
    }
}

/// Block terminator. Every laid-out block ends with exactly one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Terminator {
    /// Return from the function, with a value unless void.
    Return { value: Option<ValueId> },

    /// Unconditional jump.
    Jump { target: BlockId },

    /// Two-way branch on a boolean value.
    Branch {
        cond: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    },

    /// Multi-way branch on an integer discriminant.
    Switch {
        scrutinee: ValueId,
        cases: Vec<(i64, BlockId)>,
        default: BlockId,
    },

    /// Control never reaches the end of this block.
    Unreachable,
}

impl Terminator {
    /// Successor blocks, in branch order.
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Return { .. } | Terminator::Unreachable => vec![],
            Terminator::Jump { target } => vec![*target],
            Terminator::Branch {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
            Terminator::Switch { cases, default, .. } => {
                let mut out: Vec<BlockId> = cases.iter().map(|&(_, b)| b).collect();
                out.push(*default);
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn operands_follow_operand_order() {
        let store = Inst {
            kind: InstKind::Store {
                addr: ValueId::new(0),
                value: ValueId::new(1),
            },
            ty: IrType::Void,
        };
        assert_eq!(store.operands(), vec![ValueId::new(0), ValueId::new(1)]);
        assert!(!store.has_result());

        let call = Inst {
            kind: InstKind::Call {
                func: FuncId::new(0),
                args: vec![ValueId::new(2), ValueId::new(3)],
            },
            ty: IrType::Int32,
        };
        assert_eq!(call.operands(), vec![ValueId::new(2), ValueId::new(3)]);
        assert!(call.has_result());
    }

    #[test]
    fn switch_successors_end_with_default() {
        let term = Terminator::Switch {
            scrutinee: ValueId::new(0),
            cases: vec![(1, BlockId::new(1)), (2, BlockId::new(2))],
            default: BlockId::new(3),
        };
        assert_eq!(
            term.successors(),
            vec![BlockId::new(1), BlockId::new(2), BlockId::new(3)]
        );
    }
}
