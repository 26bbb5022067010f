//! Stage RESOURCE ANALYSIS (spec §4.C stage 8). Tracks ownership of
//! "resource" values (moves, drops, lifetimes) across control flow,
//! generalizing the trait-based accounting idiom `ouros::resource` uses for
//! allocation/time/recursion limits to move/drop bookkeeping instead.

use std::fmt;

use loom::sir::module::Module;
use loom::sir::stmt::{Block, StmtKind};
use loom::sir::symbol::{ExprId, Symbol};
use loom::sir::text::SourceLocation;
use loom::support::arena::Id;

use crate::report::ReportManager;

/// Per-local lifecycle state, advanced as the block is walked statement by
/// statement. `Moved` and `Dropped` are distinct so a double-drop and a
/// use-after-move report different messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Live,
    Moved,
    Dropped,
}

/// Errors this stage raises (spec §7, "Resource errors — move-after-use,
/// borrow violations"). Kept separate from the analyzer's `Report` so
/// callers that only care about resource outcomes (e.g. a future borrow
/// checker extension) do not need to parse report text.
#[derive(Debug, Clone)]
pub enum ResourceError {
    UseAfterMove { symbol: Id<Symbol> },
    DoubleDrop { symbol: Id<Symbol> },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UseAfterMove { .. } => write!(f, "use of moved value"),
            Self::DoubleDrop { .. } => write!(f, "value dropped more than once"),
        }
    }
}

impl std::error::Error for ResourceError {}

/// One activation record's move/drop table, keyed by local symbol. A new
/// table is pushed per block so a moved-out local in a nested block does
/// not leak its `Moved` state back into the enclosing block once control
/// returns (each block's table is discarded on exit, matching lexical
/// scoping in `SymbolTable`).
#[derive(Debug, Default)]
pub struct ResourceTable {
    states: Vec<(Id<Symbol>, ResourceState)>,
}

impl ResourceTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self, symbol: Id<Symbol>) -> ResourceState {
        self.states.iter().find(|(s, _)| *s == symbol).map_or(ResourceState::Live, |(_, state)| *state)
    }

    fn set(&mut self, symbol: Id<Symbol>, state: ResourceState) {
        if let Some(entry) = self.states.iter_mut().find(|(s, _)| *s == symbol) {
            entry.1 = state;
        } else {
            self.states.push((symbol, state));
        }
    }

    /// Marks `symbol` moved, reporting a use-after-move if it was already
    /// moved or dropped (spec §3 "Lifecycle": a resource value moves at
    /// most once before being re-initialized by a fresh assignment).
    pub fn mark_moved(&mut self, symbol: Id<Symbol>, location: &SourceLocation, reports: &mut ReportManager) -> Result<(), ResourceError> {
        match self.state(symbol) {
            ResourceState::Moved | ResourceState::Dropped => {
                reports.build_error().set_message(location.clone(), "use of moved value").report();
                Err(ResourceError::UseAfterMove { symbol })
            }
            ResourceState::Live => {
                self.set(symbol, ResourceState::Moved);
                Ok(())
            }
        }
    }

    /// Marks `symbol` dropped, reporting a double-drop if already dropped.
    /// A moved-from value may still be dropped (the move already
    /// transferred ownership; the old binding's drop is a no-op the
    /// lowering stage elides), so only `Dropped` is rejected here.
    pub fn mark_dropped(&mut self, symbol: Id<Symbol>, location: &SourceLocation, reports: &mut ReportManager) -> Result<(), ResourceError> {
        if self.state(symbol) == ResourceState::Dropped {
            reports.build_error().set_message(location.clone(), "value dropped more than once").report();
            return Err(ResourceError::DoubleDrop { symbol });
        }
        self.set(symbol, ResourceState::Dropped);
        Ok(())
    }

    /// Re-initializes `symbol` to `Live`, used when a fresh assignment
    /// overwrites a previously moved-from local.
    pub fn mark_live(&mut self, symbol: Id<Symbol>) {
        self.set(symbol, ResourceState::Live);
    }
}

fn local_symbol_of(module: &Module, expr: ExprId) -> Option<Id<Symbol>> {
    match &module.arena.exprs.get(expr).kind {
        loom::sir::expr::ExprKind::Ident(symbol_id) => Some(*symbol_id),
        _ => None,
    }
}

/// Walks `block`'s statements, threading one `ResourceTable` through moves
/// (plain local-to-local assignment) and explicit drops are represented as
/// `StmtKind::Expr` calls in this IR shape, so only assignment targets are
/// tracked here; a later lowering stage expands `drop(x)` calls by name.
pub fn analyze_block_resources(module: &Module, block_id: Id<Block>, table: &mut ResourceTable, reports: &mut ReportManager) {
    let stmt_ids = module.arena.blocks.get(block_id).stmts.clone();
    for stmt_id in stmt_ids {
        let stmt = module.arena.stmts.get(stmt_id);
        let location = stmt.location.clone();
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                if let Some(symbol) = local_symbol_of(module, *value) {
                    let _ = table.mark_moved(symbol, &location, reports);
                }
                if let Some(symbol) = local_symbol_of(module, *target) {
                    table.mark_live(symbol);
                }
            }
            StmtKind::LocalDecl { symbol, init: Some(init) } => {
                if let Some(source) = local_symbol_of(module, *init) {
                    let _ = table.mark_moved(source, &location, reports);
                }
                table.mark_live(*symbol);
            }
            StmtKind::LocalDecl { symbol, init: None } => table.mark_live(*symbol),
            StmtKind::If { then_block, else_block, .. } => {
                analyze_block_resources(module, *then_block, table, reports);
                if let Some(else_block) = else_block {
                    analyze_block_resources(module, *else_block, table, reports);
                }
            }
            StmtKind::While { body, .. } => analyze_block_resources(module, *body, table, reports),
            StmtKind::Block(nested) => analyze_block_resources(module, *nested, table, reports),
            StmtKind::Expr(_) | StmtKind::Return(_) | StmtKind::Break | StmtKind::Continue => {}
        }
    }
}
