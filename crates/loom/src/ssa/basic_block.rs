//! `BasicBlock` — a straight-line instruction sequence ending in exactly
//! one terminator (spec §4.E).

use crate::ssa::instruction::Instruction;

/// Index into a `Function`'s block list. Renumbered into reverse
/// post-order by [`crate::ssa::cfg`] after construction, so this id is
/// only stable within one construction pass — callers that need a handle
/// surviving renumbering should hold the block's params/identity, not
/// this index, across a `build_cfg` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BasicBlockId(pub u32);

impl BasicBlockId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Default)]
pub struct BasicBlock {
    pub instructions: Vec<Instruction>,
    pub predecessors: Vec<BasicBlockId>,
    pub successors: Vec<BasicBlockId>,
}

impl BasicBlock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, inst: Instruction) {
        self.instructions.push(inst);
    }

    /// The block's terminator, if one has been appended yet. Per spec
    /// §4.E, a fully built non-entry block always has exactly one, as the
    /// last instruction.
    #[must_use]
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last().filter(|inst| inst.opcode.is_terminator())
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminator().is_some()
    }
}
