//! Functions, basic blocks, and the function builder.
//!
//! Construction protocol: `create_block` allocates a block without
//! placing it; `append_block` adds it to the layout, the order blocks
//! are emitted; `set_insertion_point` selects where instructions land.
//! A block accepts instructions until it is terminated, and exactly one
//! terminator. Finalization refuses any laid-out block left open.

use hp_ast::Name;

use crate::{BlockId, Inst, IrType, SlotId, Terminator, ValueId};

/// A basic block: ordered instructions plus at most one terminator.
/// `terminator` is `None` only while the block is under construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub insts: Vec<ValueId>,
    pub terminator: Option<Terminator>,
}

/// A named mutable stack slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    pub name: Name,
    pub ty: IrType,
}

/// A finished IR function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub name: Name,
    pub params: Vec<IrType>,
    pub ret: IrType,
    /// Value pool: every instruction, indexed by `ValueId`.
    pub values: Vec<Inst>,
    /// All blocks, indexed by `BlockId`. Includes created-but-unplaced
    /// blocks only until finalization drops them from the layout walk.
    pub blocks: Vec<Block>,
    /// Emission order. Only laid-out blocks are part of the function
    /// body; the first entry is the entry block.
    pub layout: Vec<BlockId>,
    pub slots: Vec<Slot>,
}

impl Function {
    pub fn entry(&self) -> Option<BlockId> {
        self.layout.first().copied()
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    pub fn value(&self, id: ValueId) -> &Inst {
        &self.values[id.index()]
    }
}

/// Builder for one function body.
pub struct FuncBuilder {
    name: Name,
    params: Vec<IrType>,
    ret: IrType,
    values: Vec<Inst>,
    blocks: Vec<Block>,
    layout: Vec<BlockId>,
    slots: Vec<Slot>,
    cursor: Option<BlockId>,
}

impl FuncBuilder {
    pub fn new(name: Name, params: Vec<IrType>, ret: IrType) -> Self {
        FuncBuilder {
            name,
            params,
            ret,
            values: Vec::new(),
            blocks: Vec::new(),
            layout: Vec::new(),
            slots: Vec::new(),
            cursor: None,
        }
    }

    pub fn ret_type(&self) -> IrType {
        self.ret
    }

    pub fn param_type(&self, index: u32) -> IrType {
        self.params[index as usize]
    }

    // ── Blocks ──────────────────────────────────────────────────────

    /// Allocate a block without placing it in the layout. The block is
    /// a valid branch target immediately.
    pub fn create_block(&mut self) -> BlockId {
        let Ok(raw) = u32::try_from(self.blocks.len()) else {
            panic!("function exceeded u32::MAX basic blocks");
        };
        self.blocks.push(Block {
            insts: Vec::new(),
            terminator: None,
        });
        BlockId::new(raw)
    }

    /// Place a created block at the end of the layout.
    ///
    /// # Panics
    /// Panics if the block is already laid out.
    pub fn append_block(&mut self, block: BlockId) {
        assert!(
            !self.layout.contains(&block),
            "block {block:?} appended to the layout twice"
        );
        self.layout.push(block);
    }

    /// Allocate and immediately place a block.
    pub fn new_block(&mut self) -> BlockId {
        let block = self.create_block();
        self.append_block(block);
        block
    }

    /// Direct subsequent instructions into `block`.
    pub fn set_insertion_point(&mut self, block: BlockId) {
        self.cursor = Some(block);
    }

    /// The block instructions currently land in.
    ///
    /// # Panics
    /// Panics if no insertion point is set.
    pub fn insertion_point(&self) -> BlockId {
        let Some(cursor) = self.cursor else {
            panic!("no insertion point set");
        };
        cursor
    }

    /// Check if a block already has a terminator.
    pub fn is_terminated(&self, block: BlockId) -> bool {
        self.blocks[block.index()].terminator.is_some()
    }

    // ── Slots ───────────────────────────────────────────────────────

    /// Reserve a mutable stack slot.
    pub fn alloc_slot(&mut self, name: Name, ty: IrType) -> SlotId {
        let Ok(raw) = u32::try_from(self.slots.len()) else {
            panic!("function exceeded u32::MAX stack slots");
        };
        self.slots.push(Slot { name, ty });
        SlotId::new(raw)
    }

    pub fn slot_type(&self, slot: SlotId) -> IrType {
        self.slots[slot.index()].ty
    }

    // ── Instructions ────────────────────────────────────────────────

    /// Append an instruction at the insertion point, returning its
    /// value.
    ///
    /// # Panics
    /// Panics if no insertion point is set or the block is terminated.
    pub fn push(&mut self, inst: Inst) -> ValueId {
        let cursor = self.insertion_point();
        assert!(
            !self.is_terminated(cursor),
            "instruction pushed into terminated block {cursor:?}"
        );
        let Ok(raw) = u32::try_from(self.values.len()) else {
            panic!("function exceeded u32::MAX values");
        };
        let value = ValueId::new(raw);
        tracing::trace!(block = ?cursor, ?value, kind = ?inst.kind, "push inst");
        self.values.push(inst);
        self.blocks[cursor.index()].insts.push(value);
        value
    }

    pub fn value_type(&self, value: ValueId) -> IrType {
        self.values[value.index()].ty
    }

    /// Terminate the block at the insertion point.
    ///
    /// # Panics
    /// Panics if no insertion point is set or the block is already
    /// terminated.
    pub fn terminate(&mut self, terminator: Terminator) {
        let cursor = self.insertion_point();
        let slot = &mut self.blocks[cursor.index()].terminator;
        assert!(
            slot.is_none(),
            "block {cursor:?} terminated twice"
        );
        tracing::trace!(block = ?cursor, ?terminator, "terminate block");
        *slot = Some(terminator);
    }

    // ── Finalization ────────────────────────────────────────────────

    /// Seal the function.
    ///
    /// # Panics
    /// Panics if the layout is empty or any laid-out block lacks a
    /// terminator. Created-but-never-appended blocks are allowed only
    /// if they are empty (abandoned speculation); anything with content
    /// must be placed.
    pub fn finish(self) -> Function {
        assert!(!self.layout.is_empty(), "function body has no entry block");
        for &block in &self.layout {
            assert!(
                self.blocks[block.index()].terminator.is_some(),
                "laid-out block {block:?} has no terminator"
            );
        }
        for (idx, block) in self.blocks.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let id = BlockId::new(idx as u32);
            if !self.layout.contains(&id) {
                assert!(
                    block.insts.is_empty() && block.terminator.is_none(),
                    "non-empty block {id:?} was never appended to the layout"
                );
            }
        }

        Function {
            name: self.name,
            params: self.params,
            ret: self.ret,
            values: self.values,
            blocks: self.blocks,
            layout: self.layout,
            slots: self.slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Const, InstKind};
    use hp_ast::NameInterner;
    use pretty_assertions::assert_eq;

    fn builder() -> (NameInterner, FuncBuilder) {
        let interner = NameInterner::new();
        let name = interner.intern("f");
        (interner, FuncBuilder::new(name, vec![], IrType::Void))
    }

    fn const_int(b: &mut FuncBuilder, v: i64) -> ValueId {
        b.push(Inst {
            kind: InstKind::Const(Const::Int(v)),
            ty: IrType::Int32,
        })
    }

    #[test]
    fn created_blocks_are_targets_before_layout() {
        let (_i, mut b) = builder();
        let entry = b.new_block();
        let merge = b.create_block();

        b.set_insertion_point(entry);
        b.terminate(Terminator::Jump { target: merge });

        // Placed only after the entry is finished.
        b.append_block(merge);
        b.set_insertion_point(merge);
        b.terminate(Terminator::Return { value: None });

        let func = b.finish();
        assert_eq!(func.entry(), Some(entry));
        assert_eq!(func.layout, vec![entry, merge]);
    }

    #[test]
    #[should_panic(expected = "appended to the layout twice")]
    fn double_append_panics() {
        let (_i, mut b) = builder();
        let block = b.new_block();
        b.append_block(block);
    }

    #[test]
    #[should_panic(expected = "terminated twice")]
    fn double_terminator_panics() {
        let (_i, mut b) = builder();
        let entry = b.new_block();
        b.set_insertion_point(entry);
        b.terminate(Terminator::Return { value: None });
        b.terminate(Terminator::Return { value: None });
    }

    #[test]
    #[should_panic(expected = "pushed into terminated block")]
    fn push_after_terminator_panics() {
        let (_i, mut b) = builder();
        let entry = b.new_block();
        b.set_insertion_point(entry);
        b.terminate(Terminator::Return { value: None });
        const_int(&mut b, 1);
    }

    #[test]
    #[should_panic(expected = "has no terminator")]
    fn finish_rejects_open_blocks() {
        let (_i, mut b) = builder();
        let entry = b.new_block();
        b.set_insertion_point(entry);
        const_int(&mut b, 1);
        let _ = b.finish();
    }

    #[test]
    fn values_number_sequentially_across_blocks() {
        let (_i, mut b) = builder();
        let entry = b.new_block();
        let next = b.new_block();

        b.set_insertion_point(entry);
        let a = const_int(&mut b, 1);
        b.terminate(Terminator::Jump { target: next });

        b.set_insertion_point(next);
        let c = const_int(&mut b, 2);
        b.terminate(Terminator::Return { value: None });

        assert_eq!(a, ValueId::new(0));
        assert_eq!(c, ValueId::new(1));
        let func = b.finish();
        assert_eq!(func.block(entry).insts, vec![a]);
        assert_eq!(func.block(next).insts, vec![c]);
    }
}
