//! `Index` — go-to-definition and find-references, backed by the
//! `SymbolDef`/`SymbolUse` records `loom_sema::AnalysisMode::Indexing`
//! produces (spec §6: "`textDocument/definition`, `textDocument/references`
//! — consume the `Index` built during INDEXING"). Supplemented from
//! `completion_handler.cpp`'s sibling definition/reference handlers in
//! `original_source/src/banjo-lsp`, which serve both from one lookup table
//! keyed by symbol identity rather than two separate passes.

use loom::sir::symbol::Symbol;
use loom::sir::text::{SourceLocation, TextSize};
use loom::support::arena::Id;
use loom_sema::{SymbolDef, SymbolUse};

/// One module's worth of definition/use records, keyed for lookup by
/// position (definition-at-cursor) and by symbol identity
/// (find-references). Rebuilt wholesale on every `Workspace::update`
/// (spec §4.F step 1: "the `Index` is rebuilt from `ExtraAnalysis`
/// reports").
#[derive(Debug, Default)]
pub struct Index {
    defs: Vec<SymbolDef>,
    uses: Vec<SymbolUse>,
}

impl Index {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild(&mut self, extra: loom_sema::ExtraAnalysis) {
        self.defs = extra.defs;
        self.uses = extra.uses;
    }

    /// Replaces only the def/use records belonging to `module`, leaving
    /// every other module's entries untouched (spec example (e): editing
    /// one function body must not disturb the `Index` for unaffected
    /// modules).
    pub fn rebuild_module(&mut self, module: &loom::sir::module_path::ModulePath, extra: loom_sema::ExtraAnalysis) {
        self.defs.retain(|def| &def.location.module != module);
        self.uses.retain(|use_| &use_.location.module != module);
        self.defs.extend(extra.defs);
        self.uses.extend(extra.uses);
    }

    /// Finds the declaration `position` (inside `module`) refers to: either
    /// a use site at that position resolving to a definition, or the
    /// definition itself if the cursor sits directly on it.
    #[must_use]
    pub fn definition_at(&self, module: &loom::sir::module_path::ModulePath, offset: TextSize) -> Option<&SourceLocation> {
        if let Some(use_) = self.uses.iter().find(|u| &u.location.module == module && u.location.range.contains(offset)) {
            return self.definition_of(use_.symbol).map(|def| &def.location);
        }
        self.defs
            .iter()
            .find(|def| &def.location.module == module && def.location.range.contains(offset))
            .map(|def| &def.location)
    }

    #[must_use]
    pub fn definition_of(&self, symbol: Id<Symbol>) -> Option<&SymbolDef> {
        self.defs.iter().find(|def| def.symbol == symbol)
    }

    /// Every use site (and, per LSP convention, the definition itself) for
    /// `symbol`, in source order.
    #[must_use]
    pub fn references_of(&self, symbol: Id<Symbol>, include_declaration: bool) -> Vec<&SourceLocation> {
        let mut locations: Vec<&SourceLocation> = self.uses.iter().filter(|u| u.symbol == symbol).map(|u| &u.location).collect();
        if include_declaration {
            locations.extend(self.definition_of(symbol).map(|def| &def.location));
        }
        locations
    }

    #[must_use]
    pub fn top_level_defs(&self) -> &[SymbolDef] {
        &self.defs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom::sir::module_path::ModulePath;
    use loom::sir::text::TextRange;
    use loom::support::arena::Arena;

    fn symbol_id(arena: &mut Arena<Symbol>, strings: &mut loom::support::string_arena::StringArena) -> Id<Symbol> {
        let name = strings.create_string("x");
        arena.alloc(Symbol::new(
            name,
            SourceLocation::new(ModulePath::parse("main"), loom::sir::text::empty_range()),
            loom::sir::symbol::SymbolKind::Local(loom::sir::symbol::LocalSymbol {
                type_expr: None,
                declared_at: SourceLocation::new(ModulePath::parse("main"), loom::sir::text::empty_range()),
            }),
        ))
    }

    #[test]
    fn definition_at_resolves_through_a_use_site() {
        let mut arena = Arena::new();
        let mut strings = loom::support::string_arena::StringArena::new();
        let symbol = symbol_id(&mut arena, &mut strings);
        let module = ModulePath::parse("main");

        let mut index = Index::new();
        index.defs.push(SymbolDef {
            symbol,
            location: SourceLocation::new(module.clone(), TextRange::new(TextSize::from(0), TextSize::from(3))),
        });
        index.uses.push(SymbolUse {
            symbol,
            location: SourceLocation::new(module.clone(), TextRange::new(TextSize::from(10), TextSize::from(13))),
        });

        let found = index.definition_at(&module, TextSize::from(11)).unwrap();
        assert_eq!(found.range, TextRange::new(TextSize::from(0), TextSize::from(3)));
    }

    #[test]
    fn rebuild_module_leaves_other_modules_untouched() {
        let mut arena = Arena::new();
        let mut strings = loom::support::string_arena::StringArena::new();
        let symbol_a = symbol_id(&mut arena, &mut strings);
        let symbol_b = symbol_id(&mut arena, &mut strings);

        let mut index = Index::new();
        index.defs.push(SymbolDef {
            symbol: symbol_a,
            location: SourceLocation::new(ModulePath::parse("a"), loom::sir::text::empty_range()),
        });
        index.defs.push(SymbolDef {
            symbol: symbol_b,
            location: SourceLocation::new(ModulePath::parse("b"), loom::sir::text::empty_range()),
        });

        let mut fresh = loom_sema::ExtraAnalysis::new();
        fresh.defs.push(SymbolDef {
            symbol: symbol_a,
            location: SourceLocation::new(ModulePath::parse("a"), TextRange::new(TextSize::from(1), TextSize::from(2))),
        });
        index.rebuild_module(&ModulePath::parse("a"), fresh);

        assert_eq!(index.top_level_defs().len(), 2);
        assert!(index
            .top_level_defs()
            .iter()
            .any(|d| d.location.module == ModulePath::parse("b")));
    }
}
