//! Generic specialization (spec §4.C "Specialization algorithm", §4.D).
//! Lazy and memoized: given a generic `StructDef`/`FuncDef` and a type
//! argument list, reuse an existing specialization by structural equality
//! or clone the declaration and re-run stages INTERFACE and BODY on it.

use loom::sir::module::Module;
use loom::sir::specialization::{Specialization, SpecializationArena, SpecializationId};
use loom::sir::symbol::{ExprId, Symbol, SymbolKind};
use loom::support::arena::Id;

use crate::report::ReportManager;

/// Binding map a specialization clone carries from `GenericParam` to its
/// bound `GenericArg`; re-exported under this crate's namespace since the
/// analyzer's `Scope` carries one per activation record.
pub type GenericBindings = loom::sir::specialization::SpecializationBindings;

fn specialization_list(symbol: &Symbol) -> Option<&[SpecializationId]> {
    match &symbol.kind {
        SymbolKind::FuncDef(f) => Some(&f.specializations),
        SymbolKind::StructDef(s) | SymbolKind::ProtoDef(s) => Some(&s.specializations),
        _ => None,
    }
}

fn push_specialization(symbol: &mut Symbol, id: SpecializationId) {
    match &mut symbol.kind {
        SymbolKind::FuncDef(f) => f.specializations.push(id),
        SymbolKind::StructDef(s) | SymbolKind::ProtoDef(s) => s.specializations.push(id),
        _ => {}
    }
}

fn generic_params(symbol: &Symbol) -> Vec<Id<Symbol>> {
    match &symbol.kind {
        SymbolKind::FuncDef(f) => f.generic_params.clone(),
        SymbolKind::StructDef(s) | SymbolKind::ProtoDef(s) => s.generic_params.clone(),
        _ => Vec::new(),
    }
}

/// Finds or creates the specialization of `generic_def` for `args`.
/// Structural argument equality (spec §4.C) governs dedup; a fresh clone
/// is cheap here because the clone itself is just a new `Symbol` sharing
/// the generic's shape — re-running INTERFACE/BODY on it is the caller's
/// job (`specialize_and_reanalyze`), since that needs the full stage
/// pipeline this crate's `stage` module provides.
pub fn specialize(
    module: &mut Module,
    specializations: &mut SpecializationArena,
    generic_def: Id<Symbol>,
    args: &[ExprId],
) -> SpecializationId {
    let candidates = specialization_list(module.arena.symbols.get(generic_def)).unwrap_or(&[]).to_vec();

    if let Some(existing) = specializations.find(&module.arena.exprs, &module.arena.strings, &candidates, args) {
        return existing;
    }

    let instance = clone_declaration(module, generic_def);
    let spec_id = specializations.insert(Specialization {
        args: args.to_vec(),
        def: generic_def,
        instance,
    });
    push_specialization(module.arena.symbols.get_mut(generic_def), spec_id);
    spec_id
}

/// Clones a generic declaration's `Symbol` to seed a new specialization.
/// The clone starts at `SemaStage::None` so the pipeline re-runs INTERFACE
/// and BODY on it with its own `GenericBindings` in scope.
fn clone_declaration(module: &mut Module, generic_def: Id<Symbol>) -> Id<Symbol> {
    let mut cloned = module.arena.symbols.get(generic_def).clone();
    reset_stage(&mut cloned);
    module.arena.symbols.alloc(cloned)
}

fn reset_stage(symbol: &mut Symbol) {
    match &mut symbol.kind {
        SymbolKind::FuncDef(f) => f.stage = loom::sir::symbol::SemaStage::None,
        SymbolKind::StructDef(s) | SymbolKind::ProtoDef(s) => s.stage = loom::sir::symbol::SemaStage::None,
        _ => {}
    }
}

/// Builds the binding map from a generic's `GenericParam`s to `args`, by
/// position (spec §4.C: "bind each `GenericParam` to its `GenericArg` in a
/// per-specialization map").
#[must_use]
pub fn bind_generic_args(module: &Module, generic_def: Id<Symbol>, args: &[ExprId]) -> GenericBindings {
    let mut bindings = GenericBindings::new();
    let params = generic_params(module.arena.symbols.get(generic_def));
    for (param, &arg) in params.iter().zip(args.iter()) {
        let name = module.arena.symbols.get(*param).get_ident();
        bindings.bind(name, arg);
    }
    bindings
}

/// Re-runs INTERFACE on a specialization's cloned declaration. BODY
/// analysis for the clone rides the normal `analyze_bodies` pass over
/// whichever `DeclBlock` the caller threads the clone into; this seam
/// only needs to bring the clone's signature up to date so call sites
/// elsewhere in the same pass can already see it.
pub fn specialize_and_reanalyze(
    module: &mut Module,
    specializations: &SpecializationArena,
    spec_id: SpecializationId,
    preamble: &crate::stage::preamble::Preamble,
    reports: &mut ReportManager,
) {
    let instance = specializations.get(spec_id).instance;
    crate::stage::interface::analyze_interface(module, instance, preamble, reports);
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom::sir::module_path::ModulePath;
    use loom::sir::symbol::{SemaStage, StructDefSymbol};
    use loom::sir::text::{empty_range, SourceLocation};

    #[test]
    fn calling_the_same_specialization_twice_memoizes() {
        let mut module = Module::new(ModulePath::parse("main"));
        let location = SourceLocation::new(ModulePath::parse("main"), empty_range());
        let table = module.arena.create_symbol_table(None);
        let name = module.arena.create_string("Optional");
        let generic = module.arena.symbols.alloc(Symbol::new(
            name,
            location.clone(),
            SymbolKind::StructDef(StructDefSymbol {
                fields: Vec::new(),
                table,
                generic_params: Vec::new(),
                specializations: Vec::new(),
                size: None,
                stage: SemaStage::None,
            }),
        ));
        let arg = module.arena.exprs.alloc(loom::sir::expr::Expr::new(
            loom::sir::expr::ExprKind::PrimitiveType(loom::ssa::primitive::Primitive::I32),
            location,
        ));

        let mut specializations = SpecializationArena::new();
        let first = specialize(&mut module, &mut specializations, generic, &[arg]);
        let second = specialize(&mut module, &mut specializations, generic, &[arg]);

        assert_eq!(first, second);
        match &module.arena.symbols.get(generic).kind {
            SymbolKind::StructDef(s) => assert_eq!(s.specializations.len(), 1),
            _ => panic!("expected StructDef"),
        }
    }
}
