//! Stage USE RESOLUTION (spec §4.C stage 4). Replaces every `UseIdent` /
//! `UseRebind` with a direct symbol reference. Unresolved uses produce
//! `module not found` or `symbol not found`.

use loom::sir::module::Unit;
use loom::sir::module_path::ModulePath;
use loom::sir::symbol::{Symbol, SymbolKind};
use loom::support::arena::Id;

use crate::report::ReportManager;

/// Resolves one `UseIdent`/`UseRebind` symbol in place against `unit`.
/// `module_path` is the importing module (for error locations);
/// `target_path` is read off the symbol itself.
pub fn resolve_use(unit: &mut Unit, module_path: &ModulePath, symbol_id: Id<Symbol>, reports: &mut ReportManager) {
    let Some(module) = unit.get_mut(module_path) else { return };

    let (target_path, local_name, location) = {
        let symbol = module.arena.symbols.get(symbol_id);
        let location = symbol.location.clone();
        match &symbol.kind {
            SymbolKind::UseIdent(u) => (u.target_path.clone(), None, location),
            SymbolKind::UseRebind(u) => (u.target_path.clone(), Some(u.local_name), location),
            _ => return,
        }
    };

    let Some(target_module_path) = parent_module(&target_path) else {
        return;
    };
    let member_name = target_path.segments().last().cloned();

    if !unit.contains(&target_module_path) {
        let module = unit.get_mut(module_path).expect("module still present");
        let ident_text = local_name
            .map(|id| module.arena.strings.get(id).to_string())
            .unwrap_or_else(|| target_module_path.to_string());
        reports
            .build_error()
            .set_message(location, format!("cannot find module '{ident_text}'"))
            .report();
        return;
    }

    let resolved = member_name.clone().and_then(|segment| {
        let target_module = unit.get(&target_module_path)?;
        let name_id = lookup_name_in_module(target_module, &segment)?;
        target_module.arena.tables.look_up(target_module.root_table(), name_id)
    });

    let module = unit.get_mut(module_path).expect("module still present");
    match resolved {
        Some(resolved_symbol) => {
            let symbol = module.arena.symbols.get_mut(symbol_id);
            match &mut symbol.kind {
                SymbolKind::UseIdent(u) => u.resolved = Some(resolved_symbol),
                SymbolKind::UseRebind(u) => u.resolved = Some(resolved_symbol),
                _ => {}
            }
        }
        None => {
            let base_name = target_module_path.to_string();
            let member = member_name.unwrap_or_default();
            reports
                .build_error()
                .set_message(location, format!("cannot find '{member}' in '{base_name}'"))
                .report();
        }
    }
}

fn parent_module(target: &ModulePath) -> Option<ModulePath> {
    let segments = target.segments();
    if segments.len() <= 1 {
        return Some(target.clone());
    }
    Some(ModulePath::from_segments(segments[..segments.len() - 1].iter().map(|s| s.to_string())))
}

fn lookup_name_in_module(module: &loom::sir::module::Module, name: &str) -> Option<loom::support::string_arena::StringId> {
    // Each module owns a separate `StringArena`, so a name carried across a
    // module boundary must be re-resolved by text rather than by a
    // borrowed `StringId`.
    module.arena.strings.find(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom::sir::module::Module;
    use loom::sir::symbol::{ConstDefSymbol, SemaStage, Symbol, SymbolKind, UseIdentSymbol};
    use loom::sir::text::{empty_range, SourceLocation};

    #[test]
    fn unresolved_module_reports_module_not_found() {
        let mut unit = Unit::new();
        let main_path = ModulePath::parse("main");
        unit.replace(Module::new(main_path.clone()));

        let module = unit.get_mut(&main_path).unwrap();
        let location = SourceLocation::new(main_path.clone(), empty_range());
        let use_symbol = module.arena.symbols.alloc(Symbol::new(
            module.arena.create_string("b"),
            location,
            SymbolKind::UseIdent(UseIdentSymbol {
                target_path: ModulePath::parse("a.b"),
                resolved: None,
            }),
        ));

        let mut reports = ReportManager::new();
        resolve_use(&mut unit, &main_path, use_symbol, &mut reports);
        assert!(!reports.is_valid());
    }

    #[test]
    fn resolved_symbol_is_stashed_on_the_use_node() {
        let mut unit = Unit::new();
        let main_path = ModulePath::parse("main");
        let a_path = ModulePath::parse("a");
        unit.replace(Module::new(a_path.clone()));

        let target_symbol = {
            let a_module = unit.get_mut(&a_path).unwrap();
            let location = SourceLocation::new(a_path.clone(), empty_range());
            let b_name = a_module.arena.create_string("b");
            let symbol = a_module.arena.symbols.alloc(Symbol::new(
                b_name,
                location,
                SymbolKind::ConstDef(ConstDefSymbol {
                    type_expr: None,
                    value: None,
                    stage: SemaStage::None,
                }),
            ));
            let table = a_module.root_table();
            a_module.arena.tables.get_mut(table).insert(b_name, symbol);
            symbol
        };

        unit.replace(Module::new(main_path.clone()));
        let module = unit.get_mut(&main_path).unwrap();
        let location = SourceLocation::new(main_path.clone(), empty_range());
        let use_symbol = module.arena.symbols.alloc(Symbol::new(
            module.arena.create_string("b"),
            location,
            SymbolKind::UseIdent(UseIdentSymbol {
                target_path: ModulePath::parse("a.b"),
                resolved: None,
            }),
        ));

        let mut reports = ReportManager::new();
        resolve_use(&mut unit, &main_path, use_symbol, &mut reports);
        assert!(reports.is_valid());

        let module = unit.get(&main_path).unwrap();
        match &module.arena.symbols.get(use_symbol).kind {
            SymbolKind::UseIdent(u) => assert_eq!(u.resolved, Some(target_symbol)),
            _ => panic!("expected UseIdent"),
        }
    }
}
