//! `Stmt` and `Block` (spec §3). A `Block` owns a `SymbolTable` and a
//! sequence of `Stmt`; entering one pushes a `Scope` (spec §4.C).

use crate::sir::symbol::ExprId;
use crate::sir::symbol_table::SymbolTableId;
use crate::sir::text::SourceLocation;
use crate::support::arena::Id;

pub type StmtId = Id<Stmt>;

#[derive(Debug, Clone)]
pub enum StmtKind {
    Expr(ExprId),
    /// A block-scoped local declaration; the `Symbol::Local` itself lives in
    /// the enclosing `Block`'s symbol table.
    LocalDecl { symbol: Id<crate::sir::symbol::Symbol>, init: Option<ExprId> },
    Assign { target: ExprId, value: ExprId },
    If { cond: ExprId, then_block: Id<Block>, else_block: Option<Id<Block>> },
    While { cond: ExprId, body: Id<Block> },
    Return(Option<ExprId>),
    Break,
    Continue,
    Block(Id<Block>),
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: SourceLocation,
}

impl Stmt {
    #[must_use]
    pub fn new(kind: StmtKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}

/// Owns a `SymbolTable` (for locals declared within) and an ordered
/// statement sequence. `table` is the scope pushed while this block is
/// being analyzed (spec §4.C's "Scope stack").
#[derive(Debug, Clone)]
pub struct Block {
    pub table: SymbolTableId,
    pub stmts: Vec<StmtId>,
    pub location: SourceLocation,
}

impl Block {
    #[must_use]
    pub fn new(table: SymbolTableId, location: SourceLocation) -> Self {
        Self {
            table,
            stmts: Vec::new(),
            location,
        }
    }
}
