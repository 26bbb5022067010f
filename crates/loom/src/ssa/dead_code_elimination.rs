//! Dead-code elimination over a built SSA function (spec §4.E): start from
//! used instructions, propagate liveness backward through operand uses,
//! and drop block parameters no branch target ever consumes.

use ahash::AHashSet;

use crate::ssa::function::Function;
use crate::ssa::instruction::{Instruction, Operand, VReg};

/// Runs one DCE pass, removing instructions that produce a value nothing
/// consumes and that have no side effect. Returns the number of
/// instructions removed.
pub fn eliminate_dead_code(function: &mut Function) -> usize {
    let live = compute_live_vregs(function);
    let mut removed = 0;

    for block in &mut function.blocks {
        let before = block.instructions.len();
        block.instructions.retain(|inst| should_keep(inst, &live));
        removed += before - block.instructions.len();
    }

    removed
}

fn should_keep(inst: &Instruction, live: &AHashSet<VReg>) -> bool {
    if inst.opcode.is_side_effecting() {
        return true;
    }
    match inst.result {
        Some(vreg) => live.contains(&vreg),
        None => false,
    }
}

/// Backward liveness propagation: every side-effecting instruction and
/// every `RET`/branch operand is a root; from there, an instruction's
/// operands are live if its own result is live or it has no result
/// (side effects already rooted it).
fn compute_live_vregs(function: &Function) -> AHashSet<VReg> {
    let mut live: AHashSet<VReg> = AHashSet::new();
    let mut changed = true;

    while changed {
        changed = false;
        for block in &function.blocks {
            for inst in block.instructions.iter().rev() {
                let keep = inst.opcode.is_side_effecting() || inst.result.is_some_and(|r| live.contains(&r));
                if !keep {
                    continue;
                }
                for operand in &inst.operands {
                    if let Operand::Value(v) = operand {
                        if live.insert(*v) {
                            changed = true;
                        }
                    }
                }
            }
        }
    }

    live
}

/// Removes block parameters (modeled here as `LOADARG` results at a
/// block's head acting as phi-like join parameters) that no successor
/// ever reads, chasing the source argument through every branch target
/// as spec §4.E requires ("chasing source params through branch targets").
/// `param_sources` maps a consumed `VReg` at a block entry back to the
/// originating `VReg`s supplied by each predecessor branch.
pub fn prune_unused_block_params(function: &mut Function, param_sources: &[(VReg, Vec<VReg>)]) -> AHashSet<VReg> {
    let live = compute_live_vregs(function);
    let mut dead_sources = AHashSet::new();
    for (param, sources) in param_sources {
        if !live.contains(param) {
            dead_sources.extend(sources.iter().copied());
        }
    }
    dead_sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssa::instruction::OperandList;
    use crate::ssa::opcode::Opcode;
    use crate::ssa::primitive::Primitive;

    #[test]
    fn unused_pure_instruction_is_removed() {
        let mut f = Function::new("f", vec![], Primitive::Void);
        let v0 = f.fresh_vreg();
        f.block_mut(f.entry_block).push(Instruction::new(
            Opcode::Add,
            OperandList::from_slice(&[Operand::IntImm(1), Operand::IntImm(2)]),
            Some(v0),
            Some(Primitive::I64),
        ));
        f.block_mut(f.entry_block).push(Instruction::new(Opcode::Ret, OperandList::new(), None, None));

        let removed = eliminate_dead_code(&mut f);
        assert_eq!(removed, 1);
        assert_eq!(f.block(f.entry_block).instructions.len(), 1);
    }

    #[test]
    fn instruction_feeding_return_value_is_kept() {
        let mut f = Function::new("f", vec![], Primitive::I64);
        let v0 = f.fresh_vreg();
        f.block_mut(f.entry_block).push(Instruction::new(
            Opcode::Add,
            OperandList::from_slice(&[Operand::IntImm(1), Operand::IntImm(2)]),
            Some(v0),
            Some(Primitive::I64),
        ));
        f.block_mut(f.entry_block).push(Instruction::new(
            Opcode::Ret,
            OperandList::from_slice(&[Operand::Value(v0)]),
            None,
            None,
        ));

        let removed = eliminate_dead_code(&mut f);
        assert_eq!(removed, 0);
        assert_eq!(f.block(f.entry_block).instructions.len(), 2);
    }
}
