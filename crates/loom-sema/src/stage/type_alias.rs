//! Stage TYPE ALIAS RESOLUTION (spec §4.C stage 5). Recursively resolves
//! `TypeAlias` right-hand sides; a declaration stack catches cycles.

use loom::sir::expr::{Expr, ExprKind};
use loom::sir::module::Module;
use loom::sir::symbol::{Symbol, SymbolKind};
use loom::support::arena::Id;

use crate::report::ReportManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveResult {
    Success,
    Error,
    DefCycle,
}

/// Resolves `alias`'s target expression, following a chain of
/// `TypeAlias -> TypeAlias -> ... -> concrete type`. `stack` holds every
/// alias currently being resolved on this call chain; finding `alias`
/// already on it is a cycle (spec §4.C stage 5).
pub fn resolve_type_alias(module: &mut Module, alias: Id<Symbol>, stack: &mut Vec<Id<Symbol>>, reports: &mut ReportManager) -> ResolveResult {
    if stack.contains(&alias) {
        let location = module.arena.symbols.get(alias).location.clone();
        let name = module.arena.symbols.get(alias).get_name(&module.arena.strings).to_string();
        reports
            .build_error()
            .set_message(location, format!("cycle while resolving type alias '{name}'"))
            .report();
        return ResolveResult::DefCycle;
    }

    let (already_resolving, already_done, target) = match &module.arena.symbols.get(alias).kind {
        SymbolKind::TypeAlias(t) => (t.resolving, t.stage >= loom::sir::symbol::SemaStage::Interface, t.target),
        _ => return ResolveResult::Error,
    };
    if already_done {
        return ResolveResult::Success;
    }
    let _ = already_resolving;

    stack.push(alias);
    if let SymbolKind::TypeAlias(t) = &mut module.arena.symbols.get_mut(alias).kind {
        t.resolving = true;
    }

    let result = match target {
        Some(target_expr) => resolve_target_expr(module, target_expr, stack, reports),
        None => ResolveResult::Error,
    };

    stack.pop();
    if let SymbolKind::TypeAlias(t) = &mut module.arena.symbols.get_mut(alias).kind {
        t.resolving = false;
        if result == ResolveResult::Success {
            t.stage = loom::sir::symbol::SemaStage::Interface;
        }
    }

    result
}

fn resolve_target_expr(module: &mut Module, expr_id: loom::sir::symbol::ExprId, stack: &mut Vec<Id<Symbol>>, reports: &mut ReportManager) -> ResolveResult {
    let kind = module.arena.exprs.get(expr_id).kind.clone();
    match kind {
        ExprKind::Ident(symbol_id) => {
            let is_alias = matches!(module.arena.symbols.get(symbol_id).kind, SymbolKind::TypeAlias(_));
            if is_alias {
                resolve_type_alias(module, symbol_id, stack, reports)
            } else {
                ResolveResult::Success
            }
        }
        ExprKind::PointerType(inner) | ExprKind::OptionalType(inner) => resolve_target_expr(module, inner, stack, reports),
        _ => ResolveResult::Success,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom::sir::module_path::ModulePath;
    use loom::sir::symbol::{SemaStage, Symbol, TypeAliasSymbol};
    use loom::sir::text::{empty_range, SourceLocation};

    fn loc() -> SourceLocation {
        SourceLocation::new(ModulePath::parse("main"), empty_range())
    }

    #[test]
    fn self_referential_alias_is_a_cycle() {
        let mut module = Module::new(ModulePath::parse("main"));
        let name = module.arena.create_string("Self");
        let alias_symbol = module.arena.symbols.alloc(Symbol::new(
            name,
            loc(),
            SymbolKind::TypeAlias(TypeAliasSymbol {
                target: None,
                stage: SemaStage::Name,
                resolving: false,
            }),
        ));
        let self_ref = module.arena.exprs.alloc(Expr::new(ExprKind::Ident(alias_symbol), loc()));
        if let SymbolKind::TypeAlias(t) = &mut module.arena.symbols.get_mut(alias_symbol).kind {
            t.target = Some(self_ref);
        }

        let mut reports = ReportManager::new();
        let mut stack = Vec::new();
        let result = resolve_type_alias(&mut module, alias_symbol, &mut stack, &mut reports);
        assert_eq!(result, ResolveResult::DefCycle);
        assert!(!reports.is_valid());
    }

    #[test]
    fn alias_to_a_concrete_type_succeeds() {
        let mut module = Module::new(ModulePath::parse("main"));
        let name = module.arena.create_string("MyInt");
        let concrete = module.arena.exprs.alloc(Expr::new(ExprKind::BoolLiteral(true), loc()));
        let alias_symbol = module.arena.symbols.alloc(Symbol::new(
            name,
            loc(),
            SymbolKind::TypeAlias(TypeAliasSymbol {
                target: Some(concrete),
                stage: SemaStage::Name,
                resolving: false,
            }),
        ));

        let mut reports = ReportManager::new();
        let mut stack = Vec::new();
        let result = resolve_type_alias(&mut module, alias_symbol, &mut stack, &mut reports);
        assert_eq!(result, ResolveResult::Success);
        assert!(reports.is_valid());
    }
}
