//! SSA instructions: an opcode, an operand list, and an optional result
//! virtual register (spec §4.E).

use smallvec::SmallVec;

use crate::ssa::basic_block::BasicBlockId;
use crate::ssa::comparison::Comparison;
use crate::ssa::opcode::Opcode;
use crate::ssa::primitive::Primitive;
use crate::support::string_arena::StringId;

/// A value produced by some prior instruction, referenced by result
/// register number. SSA form guarantees each `VReg` has exactly one
/// defining instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VReg(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Value(VReg),
    Block(BasicBlockId),
    Comparison(Comparison),
    IntImm(i64),
    FloatImm(f64),
    Symbol(StringId),
}

/// Most instructions take 0-3 operands (binary op, conditional branch
/// condition + two targets); `SmallVec` keeps the common case inline.
pub type OperandList = SmallVec<[Operand; 4]>;

#[derive(Debug, Clone)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: OperandList,
    pub result: Option<VReg>,
    pub result_type: Option<Primitive>,
}

impl Instruction {
    #[must_use]
    pub fn new(opcode: Opcode, operands: OperandList, result: Option<VReg>, result_type: Option<Primitive>) -> Self {
        Self {
            opcode,
            operands,
            result,
            result_type,
        }
    }

    /// `JMP`'s single target, per spec §4.E's terminator operand layout.
    #[must_use]
    pub fn jmp_target(&self) -> Option<BasicBlockId> {
        if self.opcode != Opcode::Jmp {
            return None;
        }
        self.operands.iter().find_map(|op| match op {
            Operand::Block(b) => Some(*b),
            _ => None,
        })
    }

    /// `CJMP`/`FCJMP`'s two targets, taken in operand order (spec §4.E:
    /// "2 targets in operands 3 and 4" — the third and fourth operand
    /// slots, after the comparison and its two compared values).
    #[must_use]
    pub fn branch_targets(&self) -> Option<(BasicBlockId, BasicBlockId)> {
        if !matches!(self.opcode, Opcode::CJmp | Opcode::FCJmp) {
            return None;
        }
        let mut blocks = self.operands.iter().filter_map(|op| match op {
            Operand::Block(b) => Some(*b),
            _ => None,
        });
        let first = blocks.next()?;
        let second = blocks.next()?;
        Some((first, second))
    }

    /// Every successor this instruction can transfer control to, in
    /// operand order. Empty for non-terminators and `RET`.
    #[must_use]
    pub fn successors(&self) -> SmallVec<[BasicBlockId; 2]> {
        match self.opcode {
            Opcode::Jmp => self.jmp_target().into_iter().collect(),
            Opcode::CJmp | Opcode::FCJmp => self
                .branch_targets()
                .map(|(a, b)| SmallVec::from_slice(&[a, b]))
                .unwrap_or_default(),
            _ => SmallVec::new(),
        }
    }

    #[must_use]
    pub fn operand_values(&self) -> impl Iterator<Item = VReg> + '_ {
        self.operands.iter().filter_map(|op| match op {
            Operand::Value(v) => Some(*v),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jmp_target_reads_the_single_block_operand() {
        let inst = Instruction::new(
            Opcode::Jmp,
            OperandList::from_slice(&[Operand::Block(BasicBlockId(3))]),
            None,
            None,
        );
        assert_eq!(inst.jmp_target(), Some(BasicBlockId(3)));
        assert_eq!(inst.successors().as_slice(), &[BasicBlockId(3)]);
    }

    #[test]
    fn branch_targets_reads_both_block_operands_in_order() {
        let inst = Instruction::new(
            Opcode::CJmp,
            OperandList::from_slice(&[
                Operand::Comparison(Comparison::Eq),
                Operand::Value(VReg(1)),
                Operand::Block(BasicBlockId(2)),
                Operand::Block(BasicBlockId(5)),
            ]),
            None,
            None,
        );
        assert_eq!(inst.branch_targets(), Some((BasicBlockId(2), BasicBlockId(5))));
    }
}
