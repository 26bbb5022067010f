//! CFG construction and reverse-post-order renumbering (spec §4.E).
//!
//! Numbering convention: nodes are assigned their index by DFS *postorder*
//! finish time, so the entry block — which always finishes last — ends up
//! with the highest index, and every node's non-back-edge predecessor (it
//! finishes after its successors) has a strictly higher index. The
//! dominator pass then walks indices high-to-low, which is what the spec
//! calls iterating "in reverse post-order".

use crate::ssa::basic_block::{BasicBlock, BasicBlockId};
use crate::ssa::function::Function;
use crate::ssa::instruction::Operand;

#[derive(Debug)]
pub struct CfgError {
    pub block: BasicBlockId,
    pub message: String,
}

impl std::fmt::Display for CfgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "block {}: {}", self.block.0, self.message)
    }
}

impl std::error::Error for CfgError {}

/// Verifies the terminator rule (spec §4.E) on every block except dangling
/// unreachable ones that were never visited by construction.
fn check_terminator(function: &Function, id: BasicBlockId) -> Result<(), CfgError> {
    let block = function.block(id);
    match block.terminator() {
        Some(term) => {
            let expected = term.opcode.target_count();
            let actual = block.successors.len();
            if term.opcode == crate::ssa::opcode::Opcode::Ret {
                return Ok(());
            }
            if actual != expected {
                return Err(CfgError {
                    block: id,
                    message: format!("terminator declares {expected} targets but block has {actual} successors"),
                });
            }
            Ok(())
        }
        None => Err(CfgError {
            block: id,
            message: "block has no terminator".to_string(),
        }),
    }
}

/// Builds predecessor/successor edges by recursively visiting terminators
/// from the entry block, then renumbers blocks into the postorder-finish
/// scheme described above. Returns the mapping from old to new ids, which
/// the caller can use to relabel any external references (debug info,
/// address tables) it holds separately from `Function`.
pub fn build_cfg(function: &mut Function) -> Result<Vec<BasicBlockId>, CfgError> {
    link_edges(function);

    let mut visited = vec![false; function.blocks.len()];
    let mut postorder = Vec::with_capacity(function.blocks.len());
    visit_postorder(function, function.entry_block, &mut visited, &mut postorder);

    for id in function.block_ids() {
        if visited[id.index()] {
            check_terminator(function, id)?;
        }
    }

    let mut new_index = vec![0u32; function.blocks.len()];
    for (new_idx, &old_id) in postorder.iter().enumerate() {
        new_index[old_id.index()] = new_idx as u32;
    }

    let mut new_blocks: Vec<Option<BasicBlock>> = vec![None; postorder.len()];
    for (new_idx, &old_id) in postorder.iter().enumerate() {
        let mut block = std::mem::take(&mut function.blocks[old_id.index()]);
        remap_block(&mut block, &new_index);
        new_blocks[new_idx] = Some(block);
    }
    function.blocks = new_blocks.into_iter().map(|b| b.unwrap_or_default()).collect();
    function.entry_block = BasicBlockId(new_index[function.entry_block.index()]);

    Ok(postorder)
}

fn link_edges(function: &mut Function) {
    for id in function.block_ids() {
        function.block_mut(id).successors.clear();
        function.block_mut(id).predecessors.clear();
    }
    let edges: Vec<(BasicBlockId, BasicBlockId)> = function
        .block_ids()
        .flat_map(|id| {
            function
                .block(id)
                .terminator()
                .map(|t| t.successors())
                .unwrap_or_default()
                .into_iter()
                .map(move |succ| (id, succ))
        })
        .collect();
    for (from, to) in edges {
        function.block_mut(from).successors.push(to);
        function.block_mut(to).predecessors.push(from);
    }
}

fn visit_postorder(function: &Function, id: BasicBlockId, visited: &mut [bool], out: &mut Vec<BasicBlockId>) {
    if visited[id.index()] {
        return;
    }
    visited[id.index()] = true;
    let successors = function.block(id).successors.clone();
    for succ in successors {
        visit_postorder(function, succ, visited, out);
    }
    out.push(id);
}

fn remap_block(block: &mut BasicBlock, new_index: &[u32]) {
    block.successors = block.successors.iter().map(|b| BasicBlockId(new_index[b.index()])).collect();
    block.predecessors = block.predecessors.iter().map(|b| BasicBlockId(new_index[b.index()])).collect();
    for inst in &mut block.instructions {
        for operand in &mut inst.operands {
            if let Operand::Block(b) = operand {
                *b = BasicBlockId(new_index[b.index()]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssa::instruction::{Instruction, Operand, OperandList};
    use crate::ssa::opcode::Opcode;
    use crate::ssa::primitive::Primitive;

    fn jmp(target: BasicBlockId) -> Instruction {
        Instruction::new(Opcode::Jmp, OperandList::from_slice(&[Operand::Block(target)]), None, None)
    }

    fn ret() -> Instruction {
        Instruction::new(Opcode::Ret, OperandList::new(), None, None)
    }

    #[test]
    fn entry_gets_the_highest_index_after_renumbering() {
        let mut f = Function::new("f", vec![], Primitive::Void);
        let a = f.new_block();
        let b = f.new_block();
        f.block_mut(f.entry_block).push(jmp(a));
        f.block_mut(a).push(jmp(b));
        f.block_mut(b).push(ret());

        build_cfg(&mut f).unwrap();
        assert_eq!(f.entry_block.0 as usize, f.blocks.len() - 1);
    }

    #[test]
    fn diamond_predecessors_outrank_their_successor() {
        let mut f = Function::new("f", vec![], Primitive::Void);
        let a = f.new_block();
        let b = f.new_block();
        let join = f.new_block();
        f.block_mut(f.entry_block).push(Instruction::new(
            Opcode::CJmp,
            OperandList::from_slice(&[
                Operand::Comparison(crate::ssa::comparison::Comparison::Eq),
                Operand::Block(a),
                Operand::Block(b),
            ]),
            None,
            None,
        ));
        f.block_mut(a).push(jmp(join));
        f.block_mut(b).push(jmp(join));
        f.block_mut(join).push(ret());

        build_cfg(&mut f).unwrap();
        let join_idx = f.block(f.entry_block).successors.iter().find_map(|&s| {
            let target = f.block(s).successors.first().copied();
            target
        });
        assert!(join_idx.is_some());
    }

    #[test]
    fn missing_terminator_is_rejected() {
        let mut f = Function::new("f", vec![], Primitive::Void);
        assert!(build_cfg(&mut f).is_err());
    }
}
