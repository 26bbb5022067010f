//! Generic specialization records (spec §3, §4.D). A specialization is a
//! monomorphic clone of a generic `StructDef`/`FuncDef`, keyed by structural
//! equality of its type arguments and memoized on the generic definition.

use crate::sir::symbol::ExprId;
use crate::support::arena::{Arena, Id};
use crate::support::string_arena::StringId;

pub type SpecializationId = Id<Specialization>;

/// `args` is compared structurally, not by `ExprId` identity: two call
/// sites that spell the same type argument differently (e.g. via a type
/// alias) must still land on one specialization.
#[derive(Debug, Clone)]
pub struct Specialization {
    pub args: Vec<ExprId>,
    pub def: Id<crate::sir::symbol::Symbol>,
    /// The cloned, specialized declaration this specialization produced.
    pub instance: Id<crate::sir::symbol::Symbol>,
}

/// Structural equality over type-argument expressions, used for dedup.
/// Only the expression shapes the analyzer can actually place in a generic
/// argument list are compared; anything else is never equal.
#[must_use]
pub fn args_structurally_equal(
    exprs: &Arena<crate::sir::expr::Expr>,
    strings: &crate::support::string_arena::StringArena,
    a: &[ExprId],
    b: &[ExprId],
) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).all(|(&x, &y)| expr_structurally_equal(exprs, strings, x, y))
}

fn expr_structurally_equal(
    exprs: &Arena<crate::sir::expr::Expr>,
    strings: &crate::support::string_arena::StringArena,
    a: ExprId,
    b: ExprId,
) -> bool {
    use crate::sir::expr::ExprKind;
    let ea = exprs.get(a);
    let eb = exprs.get(b);
    match (&ea.kind, &eb.kind) {
        (ExprKind::Ident(sa), ExprKind::Ident(sb)) => sa == sb,
        (ExprKind::UnresolvedIdent(sa), ExprKind::UnresolvedIdent(sb)) => strings.get(*sa) == strings.get(*sb),
        (ExprKind::PointerType(ia), ExprKind::PointerType(ib)) => expr_structurally_equal(exprs, strings, *ia, *ib),
        (ExprKind::OptionalType(ia), ExprKind::OptionalType(ib)) => expr_structurally_equal(exprs, strings, *ia, *ib),
        (ExprKind::IntLiteral { value: va, .. }, ExprKind::IntLiteral { value: vb, .. }) => va == vb,
        _ => false,
    }
}

/// Per-generic-definition memo table: `(def) -> Vec<Specialization>`.
/// Stored separately from `Symbol` so `Symbol::get_symbol_table` stays a
/// cheap field read; the analyzer consults this table when it needs the
/// specialization list named in the symbol's own `specializations` field,
/// which holds `SpecializationId`s into this arena.
#[derive(Debug, Default)]
pub struct SpecializationArena {
    entries: Arena<Specialization>,
}

impl SpecializationArena {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Arena::new() }
    }

    #[must_use]
    pub fn get(&self, id: SpecializationId) -> &Specialization {
        self.entries.get(id)
    }

    /// Looks up an existing specialization among `candidates` by structural
    /// argument equality, per spec §4.C's "Specialization algorithm".
    #[must_use]
    pub fn find(
        &self,
        exprs: &Arena<crate::sir::expr::Expr>,
        strings: &crate::support::string_arena::StringArena,
        candidates: &[SpecializationId],
        args: &[ExprId],
    ) -> Option<SpecializationId> {
        candidates
            .iter()
            .copied()
            .find(|&id| args_structurally_equal(exprs, strings, &self.get(id).args, args))
    }

    pub fn insert(&mut self, spec: Specialization) -> SpecializationId {
        self.entries.alloc(spec)
    }
}

/// The binding map a specialization clone carries from `GenericParam` to
/// its bound `GenericArg`, consulted while re-running stages INTERFACE and
/// BODY on the clone (spec §4.C).
#[derive(Debug, Clone, Default)]
pub struct SpecializationBindings {
    by_param_name: Vec<(StringId, ExprId)>,
}

impl SpecializationBindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, param_name: StringId, arg: ExprId) {
        self.by_param_name.push((param_name, arg));
    }

    #[must_use]
    pub fn resolve(&self, param_name: StringId) -> Option<ExprId> {
        self.by_param_name
            .iter()
            .find(|(name, _)| *name == param_name)
            .map(|(_, arg)| *arg)
    }
}
