//! Preamble injection (spec §4.C stage 2). If stdlib is enabled, these
//! names are visible in every module without an explicit `use`.

pub const PREAMBLE_NAMES: &[&str] = &[
    "print",
    "println",
    "assert",
    "Optional",
    "Result",
    "Array",
    "Slice",
    "String",
    "StringSlice",
    "Map",
    "Set",
    "Closure",
];

use ahash::AHashMap;
use loom::sir::module::Module;
use loom::sir::symbol::{FuncDeclSymbol, SemaStage, StructDefSymbol, Symbol, SymbolKind};
use loom::sir::symbol_table::SymbolTableId;
use loom::sir::text::{empty_range, SourceLocation};
use loom::support::arena::Id;
use loom::support::string_arena::StringId;

/// Resolved preamble symbols, cached once per `Unit` and consulted by
/// every module's scope stack as the final fallback after the local
/// symbol-table chain is exhausted (spec §4.C "Scope stack").
#[derive(Debug, Default)]
pub struct Preamble {
    by_name: AHashMap<StringId, Id<Symbol>>,
}

impl Preamble {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: StringId, symbol: Id<Symbol>) {
        self.by_name.insert(name, symbol);
    }

    #[must_use]
    pub fn look_up(&self, name: StringId) -> Option<Id<Symbol>> {
        self.by_name.get(&name).copied()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.by_name.len() == PREAMBLE_NAMES.len()
    }
}

/// Performs PREAMBLE INJECTION (spec §4.C stage 2): synthesizes one
/// builtin symbol per name in [`PREAMBLE_NAMES`] directly into `module`'s
/// own arena (a `Symbol` id is only meaningful within the arena that
/// allocated it, so builtins are materialized fresh per module rather
/// than shared across a `Unit`) and returns the resulting lookup table.
pub fn inject(module: &mut Module) -> Preamble {
    let mut preamble = Preamble::new();
    for &name in PREAMBLE_NAMES {
        let string_id = module.arena.create_string(name);
        let location = SourceLocation::new(module.path.clone(), empty_range());
        let kind = match name {
            "print" | "println" | "assert" => SymbolKind::NativeFuncDecl(FuncDeclSymbol {
                params: Vec::new(),
                return_type: None,
                stage: SemaStage::Interface,
            }),
            _ => {
                let table = module.arena.create_symbol_table(None);
                SymbolKind::StructDef(StructDefSymbol {
                    fields: Vec::new(),
                    table,
                    generic_params: Vec::new(),
                    specializations: Vec::new(),
                    size: Some(0),
                    stage: SemaStage::Interface,
                })
            }
        };
        let symbol_id = module.arena.symbols.alloc(Symbol::new(string_id, location, kind));
        preamble.bind(string_id, symbol_id);
    }
    preamble
}

/// Recursive lookup that climbs a module's symbol-table chain and then
/// falls back to the preamble, exactly the order spec §4.C's scope stack
/// describes.
#[must_use]
pub fn look_up_with_preamble(
    tables: &loom::sir::symbol_table::SymbolTableArena,
    scope: SymbolTableId,
    preamble: &Preamble,
    name: StringId,
) -> Option<Id<Symbol>> {
    tables.look_up(scope, name).or_else(|| preamble.look_up(name))
}
