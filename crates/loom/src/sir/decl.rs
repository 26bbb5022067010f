//! `Decl` and `DeclBlock` (spec §3). A `DeclBlock` owns a `SymbolTable` and
//! a sequence of `Decl`; it backs module roots, struct/union/enum bodies,
//! and `meta`-block expansion targets.

use crate::sir::symbol::ExprId;
use crate::sir::symbol_table::SymbolTableId;
use crate::sir::text::SourceLocation;
use crate::support::arena::Id;

pub type DeclId = Id<Decl>;

#[derive(Debug, Clone)]
pub enum DeclKind {
    /// Every declaration kind eventually gets a `Symbol` during stage NAME;
    /// the `Decl` node itself just threads AST-adjacent shape (e.g. an
    /// attached `meta` block or doc comment) that `Symbol` doesn't carry.
    Func { symbol: Id<crate::sir::symbol::Symbol>, body: Option<Id<crate::sir::stmt::Block>> },
    Struct { symbol: Id<crate::sir::symbol::Symbol> },
    Union { symbol: Id<crate::sir::symbol::Symbol> },
    Enum { symbol: Id<crate::sir::symbol::Symbol> },
    Const { symbol: Id<crate::sir::symbol::Symbol> },
    VarDecl { symbol: Id<crate::sir::symbol::Symbol> },
    TypeAlias { symbol: Id<crate::sir::symbol::Symbol> },
    Use { symbol: Id<crate::sir::symbol::Symbol> },
    /// A compile-time `meta` block; its expansion (spec §4.C stage 3) emits
    /// further `Decl`s into the enclosing block and is re-run to a
    /// fixed point.
    Meta { body: ExprId, expanded: bool },
}

#[derive(Debug, Clone)]
pub struct Decl {
    pub kind: DeclKind,
    pub location: SourceLocation,
}

impl Decl {
    #[must_use]
    pub fn new(kind: DeclKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}

/// Owns a `SymbolTable` plus an ordered declaration sequence. Module roots,
/// struct/union/enum/proto bodies, and function bodies containing local
/// `meta` expansion all use this shape (spec §3).
#[derive(Debug, Clone)]
pub struct DeclBlock {
    pub table: SymbolTableId,
    pub decls: Vec<DeclId>,
}

impl DeclBlock {
    #[must_use]
    pub fn new(table: SymbolTableId) -> Self {
        Self {
            table,
            decls: Vec::new(),
        }
    }

    pub fn push(&mut self, decl: DeclId) {
        self.decls.push(decl);
    }
}
