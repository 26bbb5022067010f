//! `Symbol` — a tagged variant over every declaration kind the analyzer can
//! produce (spec §3).

use crate::sir::module_path::ModulePath;
use crate::sir::symbol_table::SymbolTableId;
use crate::sir::text::SourceLocation;
use crate::support::arena::Id;
use crate::support::string_arena::StringId;

/// Monotonic progress of a declaration through the analyzer pipeline (spec
/// §4.C). Stages never regress; `SemaStage` derives `Ord` so `analyzed_at
/// least(NAME)` reads naturally as a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum SemaStage {
    #[default]
    None,
    Name,
    Interface,
    Body,
    Resources,
}

/// Opaque handle to a declaration expression/type node, defined by the SIR
/// expression arena. Kept generic here so `symbol.rs` does not need to know
/// about `Expr`'s full shape.
pub type ExprId = Id<crate::sir::expr::Expr>;

#[derive(Debug, Clone)]
pub struct ModuleSymbol {
    pub path: ModulePath,
    pub table: SymbolTableId,
}

#[derive(Debug, Clone)]
pub struct FuncDefSymbol {
    pub params: Vec<Id<Symbol>>,
    pub return_type: Option<ExprId>,
    pub body_table: Option<SymbolTableId>,
    pub is_method: bool,
    pub generic_params: Vec<Id<Symbol>>,
    pub specializations: Vec<crate::sir::specialization::SpecializationId>,
    pub stage: SemaStage,
}

#[derive(Debug, Clone)]
pub struct FuncDeclSymbol {
    pub params: Vec<Id<Symbol>>,
    pub return_type: Option<ExprId>,
    pub stage: SemaStage,
}

#[derive(Debug, Clone)]
pub struct StructDefSymbol {
    pub fields: Vec<Id<Symbol>>,
    pub table: SymbolTableId,
    pub generic_params: Vec<Id<Symbol>>,
    pub specializations: Vec<crate::sir::specialization::SpecializationId>,
    pub size: Option<u64>,
    pub stage: SemaStage,
}

#[derive(Debug, Clone)]
pub struct FieldSymbol {
    pub type_expr: ExprId,
    pub default: Option<ExprId>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct UnionDefSymbol {
    pub cases: Vec<Id<Symbol>>,
    pub table: SymbolTableId,
    pub stage: SemaStage,
}

#[derive(Debug, Clone)]
pub struct EnumDefSymbol {
    pub variants: Vec<Id<Symbol>>,
    pub table: SymbolTableId,
    pub stage: SemaStage,
}

#[derive(Debug, Clone)]
pub struct ConstDefSymbol {
    pub type_expr: Option<ExprId>,
    pub value: Option<ExprId>,
    pub stage: SemaStage,
}

#[derive(Debug, Clone)]
pub struct TypeAliasSymbol {
    pub target: Option<ExprId>,
    pub stage: SemaStage,
    /// `true` while this alias is on the resolution stack, so a cycle can be
    /// detected by re-entrancy (spec §4.C stage 5).
    pub resolving: bool,
}

#[derive(Debug, Clone)]
pub struct VarDeclSymbol {
    pub type_expr: Option<ExprId>,
    pub value: Option<ExprId>,
    pub stage: SemaStage,
}

#[derive(Debug, Clone)]
pub struct LocalSymbol {
    pub type_expr: Option<ExprId>,
    pub declared_at: SourceLocation,
}

#[derive(Debug, Clone)]
pub struct ParamSymbol {
    pub type_expr: ExprId,
    pub default: Option<ExprId>,
    pub index: u32,
}

#[derive(Debug, Clone)]
pub struct UseIdentSymbol {
    pub target_path: ModulePath,
    pub resolved: Option<Id<Symbol>>,
}

#[derive(Debug, Clone)]
pub struct UseRebindSymbol {
    pub target_path: ModulePath,
    pub local_name: StringId,
    pub resolved: Option<Id<Symbol>>,
}

#[derive(Debug, Clone)]
pub struct OverloadSetSymbol {
    /// At least two `FuncDef`s with the same name but non-equal parameter
    /// signatures, per spec §3's invariant on `OverloadSet`.
    pub candidates: Vec<Id<Symbol>>,
}

#[derive(Debug, Clone)]
pub struct GenericParamSymbol {
    pub index: u32,
    pub bound: Option<ExprId>,
}

#[derive(Debug, Clone)]
pub struct GenericArgSymbol {
    pub value: ExprId,
}

/// The payload for each declaration kind `Symbol` can carry.
#[derive(Debug, Clone)]
pub enum SymbolKind {
    Module(ModuleSymbol),
    FuncDef(FuncDefSymbol),
    FuncDecl(FuncDeclSymbol),
    NativeFuncDecl(FuncDeclSymbol),
    StructDef(StructDefSymbol),
    StructField(FieldSymbol),
    UnionDef(UnionDefSymbol),
    UnionCase(FieldSymbol),
    ProtoDef(StructDefSymbol),
    EnumDef(EnumDefSymbol),
    EnumVariant(FieldSymbol),
    ConstDef(ConstDefSymbol),
    TypeAlias(TypeAliasSymbol),
    VarDecl(VarDeclSymbol),
    NativeVarDecl(VarDeclSymbol),
    Local(LocalSymbol),
    Param(ParamSymbol),
    UseIdent(UseIdentSymbol),
    UseRebind(UseRebindSymbol),
    OverloadSet(OverloadSetSymbol),
    GenericArg(GenericArgSymbol),
    GenericParam(GenericParamSymbol),
    /// Marker placed on a symbol currently being analyzed, to detect
    /// definition cycles (spec §3, "Lifecycle").
    GuardedSymbol,
}

/// A single named (or, for `GuardedSymbol`, temporarily anonymous)
/// declaration.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: StringId,
    pub location: SourceLocation,
    pub kind: SymbolKind,
    /// Set only while a cycle-detecting guard is active; the previous kind
    /// is stashed here so `unguard` can restore it.
    guarded_kind: Option<Box<SymbolKind>>,
}

impl Symbol {
    #[must_use]
    pub fn new(name: StringId, location: SourceLocation, kind: SymbolKind) -> Self {
        Self {
            name,
            location,
            kind,
            guarded_kind: None,
        }
    }

    /// Every symbol exposes its interned name id (spec §3 invariant).
    #[must_use]
    pub fn get_ident(&self) -> StringId {
        self.name
    }

    /// Resolves the interned name back to text.
    #[must_use]
    pub fn get_name<'a>(&self, strings: &'a crate::support::string_arena::StringArena) -> &'a str {
        strings.get(self.name)
    }

    /// Some declaration kinds own a nested scope; this is `None` otherwise.
    #[must_use]
    pub fn get_symbol_table(&self) -> Option<SymbolTableId> {
        match &self.kind {
            SymbolKind::Module(m) => Some(m.table),
            SymbolKind::StructDef(s) | SymbolKind::ProtoDef(s) => Some(s.table),
            SymbolKind::UnionDef(u) => Some(u.table),
            SymbolKind::EnumDef(e) => Some(e.table),
            SymbolKind::FuncDef(f) => f.body_table,
            _ => None,
        }
    }

    /// Marks this symbol as currently under analysis, stashing its real kind
    /// so a recursive lookup sees `GuardedSymbol` and can report a cycle.
    pub fn guard(&mut self) {
        if self.guarded_kind.is_none() {
            let previous = std::mem::replace(&mut self.kind, SymbolKind::GuardedSymbol);
            self.guarded_kind = Some(Box::new(previous));
        }
    }

    /// Restores the kind stashed by [`Symbol::guard`].
    pub fn unguard(&mut self) {
        if let Some(previous) = self.guarded_kind.take() {
            self.kind = *previous;
        }
    }

    #[must_use]
    pub fn is_guarded(&self) -> bool {
        matches!(self.kind, SymbolKind::GuardedSymbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_location() -> SourceLocation {
        SourceLocation::new(ModulePath::parse("main"), crate::sir::text::empty_range())
    }

    #[test]
    fn guard_and_unguard_round_trip() {
        let mut strings = crate::support::string_arena::StringArena::new();
        let mut symbol = Symbol::new(
            strings.create_string("x"),
            dummy_location(),
            SymbolKind::ConstDef(ConstDefSymbol {
                type_expr: None,
                value: None,
                stage: SemaStage::None,
            }),
        );
        symbol.guard();
        assert!(symbol.is_guarded());
        symbol.unguard();
        assert!(!symbol.is_guarded());
    }
}
