//! `Expr` — tagged expression variant. Every `Expr` carries an optional
//! `type` field, itself an `Expr` (spec §3): a type expression is typed by
//! evaluating it as a compile-time value, so the recursive shape is
//! intentional rather than a separate `Type` enum.

use crate::sir::symbol::ExprId;
use crate::sir::text::SourceLocation;
use crate::support::arena::Id;
use crate::support::string_arena::StringId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntLiteralKind {
    /// Not yet coerced to a concrete integer primitive (spec §4.D).
    Pseudo,
    Concrete(crate::ssa::primitive::Primitive),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatLiteralKind {
    Pseudo,
    Concrete(crate::ssa::primitive::Primitive),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringLiteralKind {
    /// Not yet coerced; stage BODY decides `StringSlice` vs `String` from
    /// the expected type (spec §4.C, expression typing).
    Pseudo,
    StringSlice,
    String,
}

#[derive(Debug, Clone)]
pub struct StructLiteralEntry {
    pub field_name: StringId,
    pub value: ExprId,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLiteral { value: i128, kind: IntLiteralKind },
    FloatLiteral { value: f64, kind: FloatLiteralKind },
    StringLiteral { value: StringId, kind: StringLiteralKind },
    BoolLiteral(bool),
    NullLiteral,
    Ident(Id<crate::sir::symbol::Symbol>),
    /// Unresolved name reference awaiting use resolution (spec §4.C stage 4).
    UnresolvedIdent(StringId),
    Dot { lhs: ExprId, field: StringId },
    Call { callee: ExprId, args: Vec<ExprId> },
    StructLiteral { type_expr: Option<ExprId>, entries: Vec<StructLiteralEntry> },
    Binary { op: BinaryOp, lhs: ExprId, rhs: ExprId },
    Unary { op: UnaryOp, operand: ExprId },
    /// A resolved pointer/reference type expression, e.g. `*Point`.
    PointerType(ExprId),
    /// A resolved optional type expression.
    OptionalType(ExprId),
    /// A concrete primitive type, produced once a pseudo-typed literal is
    /// finalized (spec §4.D) or a declared type expression resolves to a
    /// built-in scalar.
    PrimitiveType(crate::ssa::primitive::Primitive),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    AddressOf,
    Deref,
}

/// A single expression node. `type_of` is `None` until type-checking fills
/// it in; spec §8 invariant 1 requires it to be `Some` for every surviving
/// node after stage BODY.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: SourceLocation,
    pub type_of: Option<ExprId>,
}

impl Expr {
    #[must_use]
    pub fn new(kind: ExprKind, location: SourceLocation) -> Self {
        Self {
            kind,
            location,
            type_of: None,
        }
    }

    #[must_use]
    pub fn is_typed(&self) -> bool {
        self.type_of.is_some()
    }
}
