//! Stage META EXPANSION (spec §4.C stage 3). Evaluates compile-time `meta`
//! blocks, which may emit additional declarations into the enclosing
//! `DeclBlock`. Expansion is fixed-point: re-run on newly emitted blocks
//! until quiescent.

use loom::sir::decl::{DeclBlock, DeclKind};
use loom::sir::module::Module;
use loom::support::arena::Id;

use crate::report::ReportManager;

/// Evaluates a single `meta` declaration's body, returning the `Decl`s it
/// emits. The actual compile-time evaluator lives above this crate (it
/// needs the full expression-evaluation machinery of stage BODY); this
/// function's signature is the seam the analyzer drives through.
pub trait MetaEvaluator {
    fn evaluate(&mut self, module: &mut Module, body: loom::sir::symbol::ExprId) -> Vec<loom::sir::decl::DeclKind>;
}

/// Runs meta expansion to a fixed point: every pass collects not-yet-
/// expanded `Meta` decls in every reachable `DeclBlock`, evaluates them,
/// and appends their emitted decls to the same block. Stops when a pass
/// expands nothing.
pub fn expand_meta(module: &mut Module, blocks: &[Id<DeclBlock>], evaluator: &mut impl MetaEvaluator, reports: &mut ReportManager) {
    let _ = reports;
    loop {
        let mut expanded_any = false;
        for &block_id in blocks {
            let decl_ids = module.arena.decl_blocks.get(block_id).decls.clone();
            for decl_id in decl_ids {
                let (body, already_expanded) = match &module.arena.decls.get(decl_id).kind {
                    DeclKind::Meta { body, expanded } => (*body, *expanded),
                    _ => continue,
                };
                if already_expanded {
                    continue;
                }

                let emitted = evaluator.evaluate(module, body);
                let location = module.arena.decls.get(decl_id).location.clone();
                for kind in emitted {
                    let new_decl = module.arena.decls.alloc(loom::sir::decl::Decl::new(kind, location.clone()));
                    module.arena.decl_blocks.get_mut(block_id).push(new_decl);
                }

                if let DeclKind::Meta { expanded, .. } = &mut module.arena.decls.get_mut(decl_id).kind {
                    *expanded = true;
                }
                expanded_any = true;
            }
        }
        if !expanded_any {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom::sir::decl::Decl;
    use loom::sir::expr::{Expr, ExprKind};
    use loom::sir::module_path::ModulePath;
    use loom::sir::symbol::{ConstDefSymbol, SemaStage, Symbol, SymbolKind};
    use loom::sir::text::{empty_range, SourceLocation};

    struct EmitOneConst;

    impl MetaEvaluator for EmitOneConst {
        fn evaluate(&mut self, module: &mut Module, _body: loom::sir::symbol::ExprId) -> Vec<DeclKind> {
            let location = SourceLocation::new(ModulePath::parse("main"), empty_range());
            let name = module.arena.create_string("GENERATED");
            let symbol = module.arena.symbols.alloc(Symbol::new(
                name,
                location,
                SymbolKind::ConstDef(ConstDefSymbol {
                    type_expr: None,
                    value: None,
                    stage: SemaStage::None,
                }),
            ));
            vec![DeclKind::Const { symbol }]
        }
    }

    #[test]
    fn expansion_runs_once_per_meta_block_and_then_quiesces() {
        let mut module = Module::new(ModulePath::parse("main"));
        let location = SourceLocation::new(ModulePath::parse("main"), empty_range());
        let body = module.arena.exprs.alloc(Expr::new(ExprKind::NullLiteral, location.clone()));
        let meta_decl = module.arena.decls.alloc(Decl::new(DeclKind::Meta { body, expanded: false }, location));
        module.arena.decl_blocks.get_mut(module.root).push(meta_decl);

        let mut reports = ReportManager::new();
        let root = module.root;
        expand_meta(&mut module, &[root], &mut EmitOneConst, &mut reports);

        assert_eq!(module.arena.decl_blocks.get(module.root).decls.len(), 2);

        // Re-running must not emit a second const, since the meta decl is
        // now marked expanded.
        expand_meta(&mut module, &[root], &mut EmitOneConst, &mut reports);
        assert_eq!(module.arena.decl_blocks.get(module.root).decls.len(), 2);
    }
}
