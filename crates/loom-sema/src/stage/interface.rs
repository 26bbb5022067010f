//! Stage DECL INTERFACE (spec §4.C stage 6). Computes function signatures,
//! struct field types, and constant types — everything another
//! declaration may depend on without entering bodies.

use loom::sir::expr::ExprKind;
use loom::sir::module::Module;
use loom::sir::symbol::{ExprId, Symbol, SymbolKind};
use loom::support::arena::Id;
use loom::ssa::primitive::Primitive;

use crate::report::ReportManager;
use crate::stage::preamble::{look_up_with_preamble, Preamble};

/// Advances `symbol` to `SemaStage::Interface`, guarding against
/// re-entrant cycles the same way type-alias resolution does (spec §3
/// "Lifecycle": a symbol becomes `GuardedSymbol` while its containing
/// declaration is being analyzed). `preamble` lets a declared type that
/// names a builtin (e.g. a field typed `Optional`) resolve past the
/// module's own scope (spec §4.C "Scope stack").
pub fn analyze_interface(module: &mut Module, symbol_id: Id<Symbol>, preamble: &Preamble, reports: &mut ReportManager) {
    if module.arena.symbols.get(symbol_id).is_guarded() {
        let location = module.arena.symbols.get(symbol_id).location.clone();
        reports.build_error().set_message(location, "definition cycle detected").report();
        return;
    }

    let stage = current_stage(module.arena.symbols.get(symbol_id));
    if stage >= loom::sir::symbol::SemaStage::Interface {
        return;
    }

    module.arena.symbols.get_mut(symbol_id).guard();
    resolve_interface(module, symbol_id, preamble, reports);
    set_stage(module, symbol_id, loom::sir::symbol::SemaStage::Interface);
    module.arena.symbols.get_mut(symbol_id).unguard();
}

/// Computes what stage INTERFACE promises for `symbol_id`: function
/// signatures (param/return types), struct field types and the struct's
/// total size, and constant/variable declared types — everything else in
/// the module may assume this is done once the symbol reaches
/// `SemaStage::Interface` (spec §4.C stage 6).
fn resolve_interface(module: &mut Module, symbol_id: Id<Symbol>, preamble: &Preamble, reports: &mut ReportManager) {
    match module.arena.symbols.get(symbol_id).kind.clone() {
        SymbolKind::FuncDef(f) => resolve_signature(module, &f.params, f.return_type, preamble, reports),
        SymbolKind::FuncDecl(f) | SymbolKind::NativeFuncDecl(f) => resolve_signature(module, &f.params, f.return_type, preamble, reports),
        SymbolKind::StructDef(s) | SymbolKind::ProtoDef(s) => resolve_struct(module, symbol_id, &s.fields, preamble, reports),
        SymbolKind::ConstDef(c) => {
            if let Some(type_expr) = c.type_expr {
                resolve_type_expr(module, type_expr, preamble, reports);
            }
        }
        SymbolKind::VarDecl(v) | SymbolKind::NativeVarDecl(v) => {
            if let Some(type_expr) = v.type_expr {
                resolve_type_expr(module, type_expr, preamble, reports);
            }
        }
        _ => {}
    }
}

fn resolve_signature(module: &mut Module, params: &[Id<Symbol>], return_type: Option<ExprId>, preamble: &Preamble, reports: &mut ReportManager) {
    for &param in params {
        let SymbolKind::Param(p) = module.arena.symbols.get(param).kind.clone() else { continue };
        resolve_type_expr(module, p.type_expr, preamble, reports);
    }
    if let Some(return_type) = return_type {
        resolve_type_expr(module, return_type, preamble, reports);
    }
}

/// Resolves every field's declared type, then sums their sizes into
/// `struct_def.size` and each field's `offset`, honoring spec §3's
/// invariant: "sum of declared struct field sizes (after padding) equals
/// `compute_size(struct_def)`".
fn resolve_struct(module: &mut Module, struct_symbol: Id<Symbol>, fields: &[Id<Symbol>], preamble: &Preamble, reports: &mut ReportManager) {
    let mut sizes = Vec::with_capacity(fields.len());
    for &field in fields {
        let SymbolKind::StructField(f) = module.arena.symbols.get(field).kind.clone() else { continue };
        resolve_type_expr(module, f.type_expr, preamble, reports);
        sizes.push(type_expr_size(module, f.type_expr));
    }

    let mut offset = 0u64;
    for (&field, &size) in fields.iter().zip(&sizes) {
        offset += padding(offset, size);
        if let SymbolKind::StructField(f) = &mut module.arena.symbols.get_mut(field).kind {
            f.offset = Some(offset);
        }
        offset += size;
    }

    if let SymbolKind::StructDef(s) | SymbolKind::ProtoDef(s) = &mut module.arena.symbols.get_mut(struct_symbol).kind {
        s.size = Some(compute_size(&sizes));
    }
}

/// Bytes of alignment padding needed before a field of `size` starting at
/// `offset`, shared by `compute_size` and per-field offset assignment so
/// the two can never drift apart.
fn padding(offset: u64, size: u64) -> u64 {
    if size == 0 {
        return 0;
    }
    let align = size.min(8);
    (align - (offset % align)) % align
}

/// Ensures `type_expr`'s referenced declaration (if any) has reached
/// `SemaStage::Interface`, so a field/param/return type naming a struct
/// defined later in the module still sees its fields and size computed.
/// An `UnresolvedIdent` is resolved against the module's own top-level
/// scope first, then `preamble` (spec §4.C "Scope stack").
fn resolve_type_expr(module: &mut Module, type_expr: ExprId, preamble: &Preamble, reports: &mut ReportManager) {
    match module.arena.exprs.get(type_expr).kind.clone() {
        ExprKind::Ident(symbol_id) => analyze_interface(module, symbol_id, preamble, reports),
        ExprKind::UnresolvedIdent(name) => {
            let root = module.root_table();
            if let Some(symbol_id) = look_up_with_preamble(&module.arena.tables, root, preamble, name) {
                module.arena.exprs.get_mut(type_expr).kind = ExprKind::Ident(symbol_id);
                analyze_interface(module, symbol_id, preamble, reports);
            } else {
                let location = module.arena.exprs.get(type_expr).location.clone();
                reports.build_error().set_message(location, "use of unresolved name").report();
            }
        }
        ExprKind::PointerType(inner) | ExprKind::OptionalType(inner) => resolve_type_expr(module, inner, preamble, reports),
        _ => {}
    }
}

/// Reads the byte size `type_expr` contributes to a struct's layout, per
/// spec §3's `compute_size` invariant. Pointers and optionals are fixed
/// machine-word size regardless of what they reference; struct fields
/// whose type does not resolve to a sized declaration contribute zero
/// (skipped by `compute_size`'s padding loop, same as an unresolved type).
fn type_expr_size(module: &Module, type_expr: ExprId) -> u64 {
    match &module.arena.exprs.get(type_expr).kind {
        ExprKind::PrimitiveType(primitive) => primitive.size_bytes(),
        ExprKind::PointerType(_) | ExprKind::OptionalType(_) => Primitive::Addr.size_bytes(),
        ExprKind::Ident(symbol_id) => match &module.arena.symbols.get(*symbol_id).kind {
            SymbolKind::StructDef(s) | SymbolKind::ProtoDef(s) => s.size.unwrap_or(0),
            _ => 0,
        },
        _ => 0,
    }
}

fn current_stage(symbol: &Symbol) -> loom::sir::symbol::SemaStage {
    match &symbol.kind {
        SymbolKind::FuncDef(f) => f.stage,
        SymbolKind::FuncDecl(f) | SymbolKind::NativeFuncDecl(f) => f.stage,
        SymbolKind::StructDef(s) | SymbolKind::ProtoDef(s) => s.stage,
        SymbolKind::UnionDef(u) => u.stage,
        SymbolKind::EnumDef(e) => e.stage,
        SymbolKind::ConstDef(c) => c.stage,
        SymbolKind::VarDecl(v) | SymbolKind::NativeVarDecl(v) => v.stage,
        SymbolKind::TypeAlias(t) => t.stage,
        _ => loom::sir::symbol::SemaStage::None,
    }
}

fn set_stage(module: &mut Module, symbol_id: Id<Symbol>, stage: loom::sir::symbol::SemaStage) {
    match &mut module.arena.symbols.get_mut(symbol_id).kind {
        SymbolKind::FuncDef(f) => f.stage = stage,
        SymbolKind::FuncDecl(f) | SymbolKind::NativeFuncDecl(f) => f.stage = stage,
        SymbolKind::StructDef(s) | SymbolKind::ProtoDef(s) => s.stage = stage,
        SymbolKind::UnionDef(u) => u.stage = stage,
        SymbolKind::EnumDef(e) => e.stage = stage,
        SymbolKind::ConstDef(c) => c.stage = stage,
        SymbolKind::VarDecl(v) | SymbolKind::NativeVarDecl(v) => v.stage = stage,
        SymbolKind::TypeAlias(t) => t.stage = stage,
        _ => {}
    }
}

/// Computes a struct's total size from its declared fields, honoring the
/// spec §3 invariant: "sum of declared struct field sizes (after padding)
/// equals `compute_size(struct_def)`". Padding aligns each field to its
/// own size, the common systems-language default in the absence of an
/// explicit `#[repr]`-style annotation (out of scope per spec §1).
#[must_use]
pub fn compute_size(field_sizes: &[u64]) -> u64 {
    let mut offset = 0u64;
    for &size in field_sizes {
        if size == 0 {
            continue;
        }
        let align = size.min(8);
        let padding = (align - (offset % align)) % align;
        offset += padding + size;
    }
    offset
}
