//! The semantic analyzer (spec §4.C): an eight-stage pipeline over a
//! [`loom::sir::module::Unit`], driven through one of three modes, plus
//! generic specialization, literal finalization, and resource (move/drop)
//! tracking.

pub mod finalize;
pub mod report;
pub mod specialize;
pub mod stage;

use ahash::AHashMap;

use loom::sir::decl::DeclKind;
use loom::sir::module::{Module, Unit};
use loom::sir::module_path::ModulePath;
use loom::sir::symbol::{ExprId, Symbol, SymbolKind};
use loom::sir::text::SourceLocation;
use loom::support::arena::Id;

use report::ReportManager;
use stage::preamble::Preamble;

/// The three ways the pipeline can be driven (spec §4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    /// Full pipeline, errors reported, ready for SSA generation.
    Compilation,
    /// Records every `SymbolDef`/`SymbolUse` into `ExtraAnalysis` for the
    /// LSP's go-to-definition and find-references.
    Indexing,
    /// Short-circuits at the sentinel completion point; stashes a
    /// `CompletionContext` rather than finishing the pipeline. `loom-lsp`
    /// owns the context type itself, since it is purely a syntactic/cursor
    /// concept this crate does not otherwise need.
    Completion,
}

/// A resolved declaration or name-use site, keyed by source range, for
/// `AnalysisMode::Indexing` consumers (spec §4.C, §4.F).
#[derive(Debug, Clone)]
pub struct SymbolDef {
    pub symbol: Id<Symbol>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone)]
pub struct SymbolUse {
    pub symbol: Id<Symbol>,
    pub location: SourceLocation,
}

/// Accumulated `INDEXING`-mode output for one module. Empty in
/// `COMPILATION`/`COMPLETION` mode; the analyzer only pays for this
/// bookkeeping when asked.
#[derive(Debug, Default)]
pub struct ExtraAnalysis {
    pub defs: Vec<SymbolDef>,
    pub uses: Vec<SymbolUse>,
}

impl ExtraAnalysis {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record_def(&mut self, symbol: Id<Symbol>, location: SourceLocation) {
        self.defs.push(SymbolDef { symbol, location });
    }
}

fn decl_symbol(kind: &DeclKind) -> Option<Id<Symbol>> {
    match kind {
        DeclKind::Func { symbol, .. }
        | DeclKind::Struct { symbol }
        | DeclKind::Union { symbol }
        | DeclKind::Enum { symbol }
        | DeclKind::Const { symbol }
        | DeclKind::VarDecl { symbol }
        | DeclKind::TypeAlias { symbol }
        | DeclKind::Use { symbol } => Some(*symbol),
        DeclKind::Meta { .. } => None,
    }
}

fn stage_symbol_ids(module: &Module) -> Vec<Id<Symbol>> {
    let decl_ids = module.arena.decl_blocks.get(module.root).decls.clone();
    decl_ids.into_iter().filter_map(|decl_id| decl_symbol(&module.arena.decls.get(decl_id).kind)).collect()
}

/// Runs every stage of the pipeline over `unit`'s modules in lockstep,
/// stage by stage, so no module enters INTERFACE until every module has
/// finished NAME (spec §5, "every stage is a barrier").
///
/// `meta_evaluator` supplies the compile-time evaluation the META stage
/// needs; a caller with no meta blocks to expand can pass a no-op
/// evaluator. `mode` only affects whether `ExtraAnalysis` is populated —
/// `Completion` mode is handled by `loom-lsp`, which calls the individual
/// stage functions directly against a throwaway module instead of this
/// whole-`Unit` driver.
pub fn analyze_unit(unit: &mut Unit, mode: AnalysisMode, meta_evaluator: &mut impl stage::meta::MetaEvaluator, reports: &mut ReportManager) -> ExtraAnalysis {
    let mut extra = ExtraAnalysis::new();
    let paths: Vec<_> = unit.paths().cloned().collect();

    for path in &paths {
        if let Some(module) = unit.get_mut(path) {
            stage::name::collect_names(module, reports);
        }
    }

    // PREAMBLE INJECTION (spec §4.C stage 2): one `Preamble` per module,
    // since a builtin's `Symbol` id is only meaningful within the arena
    // that allocated it.
    let mut preambles: AHashMap<ModulePath, Preamble> = AHashMap::default();
    for path in &paths {
        if let Some(module) = unit.get_mut(path) {
            preambles.insert(path.clone(), stage::preamble::inject(module));
        }
    }

    for path in &paths {
        if let Some(module) = unit.get_mut(path) {
            let root = module.root;
            stage::meta::expand_meta(module, &[root], meta_evaluator, reports);
        }
    }

    for path in &paths {
        let use_symbols = unit.get(path).map(collect_use_symbols).unwrap_or_default();
        for symbol_id in use_symbols {
            stage::use_resolution::resolve_use(unit, path, symbol_id, reports);
        }
    }

    for path in &paths {
        let symbols = unit.get(path).map(stage_symbol_ids).unwrap_or_default();
        for symbol_id in symbols {
            if let Some(module) = unit.get_mut(path) {
                if is_type_alias(module, symbol_id) {
                    let mut stack = Vec::new();
                    stage::type_alias::resolve_type_alias(module, symbol_id, &mut stack, reports);
                }
            }
        }
    }

    let empty_preamble = Preamble::new();
    for path in &paths {
        let symbols = unit.get(path).map(stage_symbol_ids).unwrap_or_default();
        let preamble = preambles.get(path).unwrap_or(&empty_preamble);
        for symbol_id in symbols {
            if let Some(module) = unit.get_mut(path) {
                stage::interface::analyze_interface(module, symbol_id, preamble, reports);
            }
        }
    }

    for path in &paths {
        let preamble = preambles.get(path).unwrap_or(&empty_preamble);
        if let Some(module) = unit.get_mut(path) {
            let root = module.root;
            stage::body::analyze_bodies(module, root, preamble, reports);
        }
    }

    if mode == AnalysisMode::Indexing {
        for path in &paths {
            if let Some(module) = unit.get(path) {
                let root = module.root;
                let table = module.arena.decl_blocks.get(root).table;
                for (_, symbol_id) in module.arena.tables.get(table).iter_local() {
                    let location = module.arena.symbols.get(symbol_id).location.clone();
                    extra.record_def(symbol_id, location);
                }
            }
        }
    }

    if mode == AnalysisMode::Compilation {
        for path in &paths {
            let bodies = unit.get(path).map(function_bodies).unwrap_or_default();
            if let Some(module) = unit.get(path) {
                for block in bodies {
                    let mut table = stage::resources::ResourceTable::new();
                    stage::resources::analyze_block_resources(module, block, &mut table, reports);
                }
            }
        }
    }

    extra
}

fn is_type_alias(module: &Module, symbol_id: Id<Symbol>) -> bool {
    matches!(module.arena.symbols.get(symbol_id).kind, SymbolKind::TypeAlias(_))
}

/// Every function body declared at module top level, in declaration order.
fn function_bodies(module: &Module) -> Vec<Id<loom::sir::stmt::Block>> {
    let decl_ids = module.arena.decl_blocks.get(module.root).decls.clone();
    decl_ids
        .into_iter()
        .filter_map(|decl_id| match &module.arena.decls.get(decl_id).kind {
            DeclKind::Func { body: Some(block), .. } => Some(*block),
            _ => None,
        })
        .collect()
}

fn collect_use_symbols(module: &Module) -> Vec<Id<Symbol>> {
    stage_symbol_ids(module)
        .into_iter()
        .filter(|&id| matches!(module.arena.symbols.get(id).kind, SymbolKind::UseIdent(_) | SymbolKind::UseRebind(_)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom::sir::decl::Decl;
    use loom::sir::module_path::ModulePath;
    use loom::sir::symbol::{ConstDefSymbol, SemaStage};
    use loom::sir::text::empty_range;

    struct NoMeta;
    impl stage::meta::MetaEvaluator for NoMeta {
        fn evaluate(&mut self, _module: &mut Module, _body: ExprId) -> Vec<DeclKind> {
            Vec::new()
        }
    }

    #[test]
    fn analyzing_an_empty_unit_produces_no_reports() {
        let mut unit = Unit::new();
        unit.replace(Module::new(ModulePath::parse("main")));

        let mut reports = ReportManager::new();
        let extra = analyze_unit(&mut unit, AnalysisMode::Compilation, &mut NoMeta, &mut reports);

        assert!(reports.is_valid());
        assert!(extra.defs.is_empty());
    }

    #[test]
    fn indexing_mode_records_top_level_defs() {
        let mut unit = Unit::new();
        let mut module = Module::new(ModulePath::parse("main"));
        let location = SourceLocation::new(ModulePath::parse("main"), empty_range());
        let name = module.arena.create_string("PI");
        let symbol = module.arena.symbols.alloc(Symbol::new(
            name,
            location.clone(),
            SymbolKind::ConstDef(ConstDefSymbol {
                type_expr: None,
                value: None,
                stage: SemaStage::None,
            }),
        ));
        let decl = module.arena.decls.alloc(Decl::new(DeclKind::Const { symbol }, location));
        module.arena.decl_blocks.get_mut(module.root).push(decl);
        unit.replace(module);

        let mut reports = ReportManager::new();
        let extra = analyze_unit(&mut unit, AnalysisMode::Indexing, &mut NoMeta, &mut reports);

        assert_eq!(extra.defs.len(), 1);
        assert_eq!(extra.defs[0].symbol, symbol);
    }
}
