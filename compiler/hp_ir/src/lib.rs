//! Basic-block intermediate representation for the Human Plus compiler.
//!
//! The IR follows the same basic-block structure as LLVM IR and Rust's
//! MIR:
//!
//! - **[`IrModule`]** — a compilation unit: identifier plus functions
//! - **[`Function`]** — parameters, stack slots, blocks, and a layout
//!   giving the block emission order
//! - **[`Inst`]** — one instruction; the instruction is its value
//! - **[`Terminator`]** — block exit (return, jump, branch, switch)
//!
//! Building happens through [`ModuleBuilder`] and [`FuncBuilder`], which
//! enforce the structural discipline: instructions go to a selected
//! insertion point, a block takes exactly one terminator, and
//! finalization rejects open blocks and bodiless functions.

mod display;
mod func;
mod ids;
mod inst;
mod module;
mod ty;

pub use func::{Block, FuncBuilder, Function, Slot};
pub use ids::{BlockId, FuncId, GlobalId, SlotId, ValueId};
pub use inst::{Const, Inst, InstKind, PrimOp, Terminator};
pub use module::{FuncDecl, Global, IrModule, ModuleBuilder};
pub use ty::IrType;
