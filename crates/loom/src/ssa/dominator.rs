//! Dominator tree and dominance frontiers via the Cooper/Harvey/Kennedy
//! iterative algorithm (spec §4.E), over the postorder-finish numbering
//! produced by [`crate::ssa::cfg::build_cfg`].

use crate::ssa::basic_block::BasicBlockId;
use crate::ssa::function::Function;

/// `idom[i]` is the immediate dominator of the block whose (post-renumber)
/// index is `i`; the entry's own slot holds itself.
#[derive(Debug, Clone)]
pub struct DominatorTree {
    idom: Vec<Option<u32>>,
    entry: u32,
}

impl DominatorTree {
    #[must_use]
    pub fn idom(&self, node: BasicBlockId) -> Option<BasicBlockId> {
        self.idom[node.index()].map(BasicBlockId)
    }

    #[must_use]
    pub fn entry(&self) -> BasicBlockId {
        BasicBlockId(self.entry)
    }

    /// Strictly-lower-in-RPO check used by property tests (spec §8
    /// invariant 4): every non-entry node's idom has a higher numeric
    /// index than the node itself, since indices decrease along forward
    /// flow in this numbering.
    #[must_use]
    pub fn idom_outranks(&self, node: BasicBlockId) -> bool {
        if node.0 == self.entry {
            return true;
        }
        self.idom(node).is_some_and(|idom| idom.0 > node.0)
    }
}

/// Computes the dominator tree. `function` must already have had
/// [`crate::ssa::cfg::build_cfg`] run so indices reflect postorder-finish
/// numbering and `predecessors`/`successors` are populated.
#[must_use]
pub fn compute_dominators(function: &Function) -> DominatorTree {
    let n = function.blocks.len();
    let entry = function.entry_block.0;
    let mut idom: Vec<Option<u32>> = vec![None; n];
    idom[entry as usize] = Some(entry);

    // Process in decreasing index order, i.e. reverse post-order given
    // that entry holds the highest index (spec §4.E).
    let order: Vec<u32> = {
        let mut ids: Vec<u32> = (0..n as u32).filter(|&i| i != entry).collect();
        ids.sort_unstable_by(|a, b| b.cmp(a));
        ids
    };

    let mut changed = true;
    while changed {
        changed = false;
        for &node in &order {
            let preds = &function.block(BasicBlockId(node)).predecessors;
            let mut new_idom: Option<u32> = None;
            for &pred in preds {
                if idom[pred.index()].is_none() {
                    continue;
                }
                new_idom = Some(match new_idom {
                    None => pred.0,
                    Some(current) => intersect(&idom, current, pred.0),
                });
            }
            if let Some(computed) = new_idom {
                if idom[node as usize] != Some(computed) {
                    idom[node as usize] = Some(computed);
                    changed = true;
                }
            }
        }
    }

    DominatorTree { idom, entry }
}

/// Walks two fingers up the provisional dominator tree until they meet,
/// per spec §4.E. Since indices decrease along forward flow, "further
/// from entry" in this scheme means "lower index", so each finger climbs
/// by jumping to its own idom whenever it is numerically behind the other.
fn intersect(idom: &[Option<u32>], mut a: u32, mut b: u32) -> u32 {
    while a != b {
        while a < b {
            a = idom[a as usize].expect("processed predecessor must have a provisional idom");
        }
        while b < a {
            b = idom[b as usize].expect("processed predecessor must have a provisional idom");
        }
    }
    a
}

/// Dominance frontiers for every block (spec §4.E): for a join point (≥2
/// predecessors), walk each predecessor upward through the dominator tree,
/// adding the join to every node visited before reaching the join's
/// immediate dominator.
#[must_use]
pub fn compute_dominance_frontiers(function: &Function, tree: &DominatorTree) -> Vec<Vec<BasicBlockId>> {
    let n = function.blocks.len();
    let mut frontiers: Vec<Vec<BasicBlockId>> = vec![Vec::new(); n];

    for node_idx in 0..n {
        let node = BasicBlockId(node_idx as u32);
        let preds = &function.block(node).predecessors;
        if preds.len() < 2 {
            continue;
        }
        let Some(idom_node) = tree.idom(node) else { continue };
        for &pred in preds {
            let mut runner = pred;
            while runner != idom_node {
                if !frontiers[runner.index()].contains(&node) {
                    frontiers[runner.index()].push(node);
                }
                let Some(next) = tree.idom(runner) else { break };
                runner = next;
            }
        }
    }

    frontiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssa::cfg::build_cfg;
    use crate::ssa::comparison::Comparison;
    use crate::ssa::function::Function;
    use crate::ssa::instruction::{Instruction, Operand, OperandList};
    use crate::ssa::opcode::Opcode;
    use crate::ssa::primitive::Primitive;

    fn diamond() -> Function {
        let mut f = Function::new("f", vec![], Primitive::Void);
        let a = f.new_block();
        let b = f.new_block();
        let join = f.new_block();
        f.block_mut(f.entry_block).push(Instruction::new(
            Opcode::CJmp,
            OperandList::from_slice(&[Operand::Comparison(Comparison::Eq), Operand::Block(a), Operand::Block(b)]),
            None,
            None,
        ));
        f.block_mut(a).push(Instruction::new(Opcode::Jmp, OperandList::from_slice(&[Operand::Block(join)]), None, None));
        f.block_mut(b).push(Instruction::new(Opcode::Jmp, OperandList::from_slice(&[Operand::Block(join)]), None, None));
        f.block_mut(join).push(Instruction::new(Opcode::Ret, OperandList::new(), None, None));
        f
    }

    #[test]
    fn diamond_idoms_all_trace_back_to_entry() {
        let mut f = diamond();
        build_cfg(&mut f).unwrap();
        let tree = compute_dominators(&f);

        for id in f.block_ids() {
            if id != tree.entry() {
                assert_eq!(tree.idom(id), Some(tree.entry()));
            }
        }
    }

    #[test]
    fn idom_always_outranks_its_node() {
        let mut f = diamond();
        build_cfg(&mut f).unwrap();
        let tree = compute_dominators(&f);
        for id in f.block_ids() {
            assert!(tree.idom_outranks(id));
        }
    }

    #[test]
    fn diamond_frontiers_contain_only_the_join() {
        let mut f = diamond();
        build_cfg(&mut f).unwrap();
        let tree = compute_dominators(&f);
        let frontiers = compute_dominance_frontiers(&f, &tree);

        let join = f.block_ids().max_by_key(|id| {
            // The join is the block entry's two branches both reach; it is
            // not the entry itself and has two predecessors.
            f.block(*id).predecessors.len()
        });
        let join = join.unwrap();
        assert_eq!(f.block(join).predecessors.len(), 2);

        for id in f.block_ids() {
            if id == join {
                assert!(frontiers[id.index()].is_empty());
            } else if f.block(id).successors.contains(&join) {
                assert_eq!(frontiers[id.index()], vec![join]);
            } else {
                assert!(frontiers[id.index()].is_empty());
            }
        }
    }
}
