//! `SymbolTable` — name-to-symbol mapping with an upward parent chain.
//!
//! The parent pointer is a back-edge, not ownership (spec §9): tables
//! themselves are owned by the module's arena via [`SymbolTableArena`], and
//! `parent` merely lets [`SymbolTable::look_up`] climb to the enclosing
//! scope without a separate traversal structure. This mirrors
//! `ouros::namespace::Namespaces`' index-based design, generalized from a
//! flat value stack to a tree of scopes.

use ahash::AHashMap;

use crate::sir::symbol::Symbol;
use crate::support::arena::{Arena, Id};
use crate::support::string_arena::StringId;

pub type SymbolTableId = Id<SymbolTable>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redefinition {
    None,
    /// The name was already bound in this table's locals; carries the id of
    /// the pre-existing symbol so the caller can report both locations.
    Duplicate(Id<Symbol>),
}

/// A single lexical scope: module root, declaration block, or statement
/// block.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    names: AHashMap<StringId, Id<Symbol>>,
    parent: Option<SymbolTableId>,
}

impl SymbolTable {
    #[must_use]
    pub fn new(parent: Option<SymbolTableId>) -> Self {
        Self {
            names: AHashMap::new(),
            parent,
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<SymbolTableId> {
        self.parent
    }

    /// Inserts `symbol` under `name`. Returns `Redefinition::Duplicate` with
    /// the pre-existing symbol id if `name` was already bound locally,
    /// matching spec §4.C stage NAME's duplicate-detection contract.
    pub fn insert(&mut self, name: StringId, symbol: Id<Symbol>) -> Redefinition {
        if let Some(existing) = self.names.get(&name) {
            return Redefinition::Duplicate(*existing);
        }
        self.names.insert(name, symbol);
        Redefinition::None
    }

    /// Consults only this table, per spec §4.B.
    #[must_use]
    pub fn look_up_local(&self, name: StringId) -> Option<Id<Symbol>> {
        self.names.get(&name).copied()
    }

    pub fn iter_local(&self) -> impl Iterator<Item = (StringId, Id<Symbol>)> + '_ {
        self.names.iter().map(|(name, id)| (*name, *id))
    }
}

/// Storage for every `SymbolTable` in a module, plus the recursive
/// `look_up` walk that climbs parent links.
#[derive(Debug, Default)]
pub struct SymbolTableArena {
    tables: Arena<SymbolTable>,
}

impl SymbolTableArena {
    #[must_use]
    pub fn new() -> Self {
        Self { tables: Arena::new() }
    }

    pub fn create(&mut self, parent: Option<SymbolTableId>) -> SymbolTableId {
        self.tables.alloc(SymbolTable::new(parent))
    }

    #[must_use]
    pub fn get(&self, id: SymbolTableId) -> &SymbolTable {
        self.tables.get(id)
    }

    pub fn get_mut(&mut self, id: SymbolTableId) -> &mut SymbolTable {
        self.tables.get_mut(id)
    }

    /// Recursive lookup: consults `id`, then climbs `parent` links until the
    /// module root. Preamble symbols are consulted separately by the
    /// analyzer's scope stack (spec §4.C), not here.
    #[must_use]
    pub fn look_up(&self, id: SymbolTableId, name: StringId) -> Option<Id<Symbol>> {
        let mut current = Some(id);
        while let Some(table_id) = current {
            let table = self.get(table_id);
            if let Some(symbol) = table.look_up_local(name) {
                return Some(symbol);
            }
            current = table.parent();
        }
        None
    }
}
