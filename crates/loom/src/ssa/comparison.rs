//! Comparison kinds used by `SELECT`/`CJMP` predicates (spec §6).

use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Comparison {
    #[strum(serialize = "EQ")]
    Eq,
    #[strum(serialize = "NE")]
    Ne,
    #[strum(serialize = "UGT")]
    Ugt,
    #[strum(serialize = "UGE")]
    Uge,
    #[strum(serialize = "ULT")]
    Ult,
    #[strum(serialize = "ULE")]
    Ule,
    #[strum(serialize = "SGT")]
    Sgt,
    #[strum(serialize = "SGE")]
    Sge,
    #[strum(serialize = "SLT")]
    Slt,
    #[strum(serialize = "SLE")]
    Sle,
    #[strum(serialize = "FEQ")]
    Feq,
    #[strum(serialize = "FNE")]
    Fne,
    #[strum(serialize = "FGT")]
    Fgt,
    #[strum(serialize = "FGE")]
    Fge,
    #[strum(serialize = "FLT")]
    Flt,
    #[strum(serialize = "FLE")]
    Fle,
}

impl Comparison {
    /// Maps each comparison to its logical negation (spec §6, §8 invariant
    /// 6: `invert(invert(c)) == c`).
    #[must_use]
    pub fn invert(self) -> Comparison {
        match self {
            Comparison::Eq => Comparison::Ne,
            Comparison::Ne => Comparison::Eq,
            Comparison::Ugt => Comparison::Ule,
            Comparison::Ule => Comparison::Ugt,
            Comparison::Uge => Comparison::Ult,
            Comparison::Ult => Comparison::Uge,
            Comparison::Sgt => Comparison::Sle,
            Comparison::Sle => Comparison::Sgt,
            Comparison::Sge => Comparison::Slt,
            Comparison::Slt => Comparison::Sge,
            Comparison::Feq => Comparison::Fne,
            Comparison::Fne => Comparison::Feq,
            Comparison::Fgt => Comparison::Fle,
            Comparison::Fle => Comparison::Fgt,
            Comparison::Fge => Comparison::Flt,
            Comparison::Flt => Comparison::Fge,
        }
    }
}
