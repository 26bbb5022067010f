//! SSA opcodes. The variant order is the wire enum (spec §6) and must not
//! be reordered — `CALLINTR`, not `CALL_INTR`, to match it exactly.

use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Opcode {
    #[strum(serialize = "INVALID")]
    Invalid,
    #[strum(serialize = "ALLOCA")]
    Alloca,
    #[strum(serialize = "LOAD")]
    Load,
    #[strum(serialize = "STORE")]
    Store,
    #[strum(serialize = "LOADARG")]
    LoadArg,
    #[strum(serialize = "ADD")]
    Add,
    #[strum(serialize = "SUB")]
    Sub,
    #[strum(serialize = "MUL")]
    Mul,
    #[strum(serialize = "SDIV")]
    SDiv,
    #[strum(serialize = "SREM")]
    SRem,
    #[strum(serialize = "UDIV")]
    UDiv,
    #[strum(serialize = "UREM")]
    URem,
    #[strum(serialize = "FADD")]
    FAdd,
    #[strum(serialize = "FSUB")]
    FSub,
    #[strum(serialize = "FMUL")]
    FMul,
    #[strum(serialize = "FDIV")]
    FDiv,
    #[strum(serialize = "AND")]
    And,
    #[strum(serialize = "OR")]
    Or,
    #[strum(serialize = "XOR")]
    Xor,
    #[strum(serialize = "SHL")]
    Shl,
    #[strum(serialize = "SHR")]
    Shr,
    #[strum(serialize = "JMP")]
    Jmp,
    #[strum(serialize = "CJMP")]
    CJmp,
    #[strum(serialize = "FCJMP")]
    FCJmp,
    #[strum(serialize = "SELECT")]
    Select,
    #[strum(serialize = "CALL")]
    Call,
    #[strum(serialize = "CALLINTR")]
    CallIntr,
    #[strum(serialize = "RET")]
    Ret,
    #[strum(serialize = "UEXTEND")]
    UExtend,
    #[strum(serialize = "SEXTEND")]
    SExtend,
    #[strum(serialize = "FPROMOTE")]
    FPromote,
    #[strum(serialize = "TRUNCATE")]
    Truncate,
    #[strum(serialize = "FDEMOTE")]
    FDemote,
    #[strum(serialize = "UTOF")]
    UToF,
    #[strum(serialize = "STOF")]
    SToF,
    #[strum(serialize = "FTOU")]
    FToU,
    #[strum(serialize = "FTOS")]
    FToS,
    #[strum(serialize = "MEMBERPTR")]
    MemberPtr,
    #[strum(serialize = "OFFSETPTR")]
    OffsetPtr,
    #[strum(serialize = "COPY")]
    Copy,
    #[strum(serialize = "SQRT")]
    Sqrt,
    #[strum(serialize = "ASM")]
    Asm,
}

impl Opcode {
    /// Terminator rule (spec §4.E): every non-entry block ends in exactly
    /// one of `JMP` (1 target), `CJMP`/`FCJMP` (2 targets), or `RET`.
    #[must_use]
    pub fn is_terminator(self) -> bool {
        matches!(self, Opcode::Jmp | Opcode::CJmp | Opcode::FCJmp | Opcode::Ret)
    }

    /// Number of successor block targets a terminator opcode carries.
    #[must_use]
    pub fn target_count(self) -> usize {
        match self {
            Opcode::Jmp => 1,
            Opcode::CJmp | Opcode::FCJmp => 2,
            Opcode::Ret => 0,
            _ => 0,
        }
    }

    /// Whether this instruction has observable effects beyond producing a
    /// result value, so dead-code elimination must keep it even with no
    /// consumers (spec §4.E).
    #[must_use]
    pub fn is_side_effecting(self) -> bool {
        matches!(
            self,
            Opcode::Store | Opcode::Call | Opcode::CallIntr | Opcode::Asm | Opcode::Ret | Opcode::Jmp | Opcode::CJmp | Opcode::FCJmp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminators_match_spec_target_counts() {
        assert_eq!(Opcode::Jmp.target_count(), 1);
        assert_eq!(Opcode::CJmp.target_count(), 2);
        assert_eq!(Opcode::FCJmp.target_count(), 2);
        assert!(Opcode::Ret.is_terminator());
        assert!(!Opcode::Add.is_terminator());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        use std::str::FromStr;
        assert_eq!(Opcode::from_str("CALLINTR").unwrap(), Opcode::CallIntr);
        assert_eq!(Opcode::Sqrt.to_string(), "SQRT");
    }
}
