//! Stage DECL BODY (spec §4.C stage 7). Type-checks function bodies,
//! block-scoped locals, and constant initializers, lazily specializing
//! generics as call sites reveal argument types.

use loom::sir::decl::DeclKind;
use loom::sir::module::Module;
use loom::sir::stmt::{Block, StmtKind};
use loom::sir::symbol::{ExprId, Symbol, SymbolKind};
use loom::support::arena::Id;

use crate::finalize::finalize_expr;
use crate::report::ReportManager;
use crate::stage::preamble::Preamble;

/// `Scope { decl, block?, generic_args, closure_ctx? }` (spec §4.C). A
/// growable stack of these is logically a chain of activation records
/// (spec §9); entering a block pushes, exiting pops.
#[derive(Debug, Clone)]
pub struct Scope {
    pub decl: Id<Symbol>,
    pub block: Option<Id<Block>>,
    pub generic_args: crate::specialize::GenericBindings,
    pub closure_ctx: Option<Id<Symbol>>,
}

impl Scope {
    #[must_use]
    pub fn new(decl: Id<Symbol>) -> Self {
        Self {
            decl,
            block: None,
            generic_args: crate::specialize::GenericBindings::default(),
            closure_ctx: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Scope>,
}

impl ScopeStack {
    pub fn push(&mut self, scope: Scope) {
        self.frames.push(scope);
    }

    pub fn pop(&mut self) -> Option<Scope> {
        self.frames.pop()
    }

    #[must_use]
    pub fn current(&self) -> Option<&Scope> {
        self.frames.last()
    }

    /// A queue of function bodies discovered during interface analysis but
    /// not yet type-checked; drained synchronously after interface
    /// analysis completes for the whole module (spec §5 "the 'lazy body
    /// analysis' list is a queue drained synchronously").
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Type-checks every statement of `block`, threading `scopes` so nested
/// blocks and locals resolve through the right chain. `preamble` is
/// consulted as the final fallback when an identifier isn't found in
/// `block`'s own table or any ancestor (spec §4.C "Scope stack").
pub fn analyze_block(module: &mut Module, block_id: Id<Block>, scopes: &mut ScopeStack, preamble: &Preamble, reports: &mut ReportManager) {
    let table = module.arena.blocks.get(block_id).table;
    let stmt_ids = module.arena.blocks.get(block_id).stmts.clone();
    for stmt_id in stmt_ids {
        analyze_stmt(module, stmt_id, table, scopes, preamble, reports);
    }
}

fn analyze_stmt(module: &mut Module, stmt_id: Id<loom::sir::stmt::Stmt>, table: loom::sir::symbol_table::SymbolTableId, scopes: &mut ScopeStack, preamble: &Preamble, reports: &mut ReportManager) {
    let kind = module.arena.stmts.get(stmt_id).kind.clone();
    match kind {
        StmtKind::Expr(expr) => {
            finalize_expr(module, expr, None, table, preamble, reports);
        }
        StmtKind::LocalDecl { init: Some(init), .. } => {
            finalize_expr(module, init, None, table, preamble, reports);
        }
        StmtKind::LocalDecl { init: None, .. } => {}
        StmtKind::Assign { target, value } => {
            let target_type = finalize_expr(module, target, None, table, preamble, reports);
            finalize_expr(module, value, target_type, table, preamble, reports);
        }
        StmtKind::If { cond, then_block, else_block } => {
            finalize_expr(module, cond, None, table, preamble, reports);
            analyze_block(module, then_block, scopes, preamble, reports);
            if let Some(else_block) = else_block {
                analyze_block(module, else_block, scopes, preamble, reports);
            }
        }
        StmtKind::While { cond, body } => {
            finalize_expr(module, cond, None, table, preamble, reports);
            analyze_block(module, body, scopes, preamble, reports);
        }
        StmtKind::Return(Some(value)) => {
            let expected = scopes.current().and_then(|scope| return_type_of(module, scope.decl));
            finalize_expr(module, value, expected, table, preamble, reports);
        }
        StmtKind::Return(None) | StmtKind::Break | StmtKind::Continue => {}
        StmtKind::Block(nested) => analyze_block(module, nested, scopes, preamble, reports),
    }
}

fn return_type_of(module: &Module, decl: Id<Symbol>) -> Option<ExprId> {
    match &module.arena.symbols.get(decl).kind {
        SymbolKind::FuncDef(f) => f.return_type,
        SymbolKind::FuncDecl(f) | SymbolKind::NativeFuncDecl(f) => f.return_type,
        _ => None,
    }
}

/// Analyzes every function body reachable from `root`'s declarations,
/// pushing one `Scope` per function. Constant initializers are analyzed
/// with no enclosing function scope (`decl` is the constant itself).
pub fn analyze_bodies(module: &mut Module, root: Id<loom::sir::decl::DeclBlock>, preamble: &Preamble, reports: &mut ReportManager) {
    let mut scopes = ScopeStack::default();
    let module_table = module.root_table();
    let decl_ids = module.arena.decl_blocks.get(root).decls.clone();
    for decl_id in decl_ids {
        let kind = module.arena.decls.get(decl_id).kind.clone();
        match kind {
            DeclKind::Func { symbol, body: Some(block) } => {
                scopes.push(Scope::new(symbol));
                analyze_block(module, block, &mut scopes, preamble, reports);
                scopes.pop();
            }
            DeclKind::Const { symbol } => {
                if let SymbolKind::ConstDef(c) = &module.arena.symbols.get(symbol).kind {
                    if let Some(value) = c.value {
                        let expected = c.type_expr;
                        finalize_expr(module, value, expected, module_table, preamble, reports);
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom::sir::decl::Decl;
    use loom::sir::expr::{Expr, ExprKind, IntLiteralKind};
    use loom::sir::module_path::ModulePath;
    use loom::sir::stmt::Stmt;
    use loom::sir::symbol::{ConstDefSymbol, SemaStage};
    use loom::sir::text::{empty_range, SourceLocation};

    #[test]
    fn const_initializer_is_finalized_to_default_int() {
        let mut module = Module::new(ModulePath::parse("main"));
        let location = SourceLocation::new(ModulePath::parse("main"), empty_range());
        let literal = module.arena.exprs.alloc(Expr::new(
            ExprKind::IntLiteral { value: 5, kind: IntLiteralKind::Pseudo },
            location.clone(),
        ));
        let name = module.arena.create_string("FIVE");
        let const_symbol = module.arena.symbols.alloc(Symbol::new(
            name,
            location.clone(),
            SymbolKind::ConstDef(ConstDefSymbol {
                type_expr: None,
                value: Some(literal),
                stage: SemaStage::None,
            }),
        ));
        let decl = module.arena.decls.alloc(Decl::new(DeclKind::Const { symbol: const_symbol }, location));
        module.arena.decl_blocks.get_mut(module.root).push(decl);

        let mut reports = ReportManager::new();
        let root = module.root;
        let preamble = Preamble::new();
        analyze_bodies(&mut module, root, &preamble, &mut reports);

        assert!(module.arena.exprs.get(literal).is_typed());
    }
}
