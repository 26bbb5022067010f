//! SSA primitive types (spec §6, exact wire list).

use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Primitive {
    #[strum(serialize = "VOID")]
    Void,
    #[strum(serialize = "I8")]
    I8,
    #[strum(serialize = "I16")]
    I16,
    #[strum(serialize = "I32")]
    I32,
    #[strum(serialize = "I64")]
    I64,
    #[strum(serialize = "U8")]
    U8,
    #[strum(serialize = "U16")]
    U16,
    #[strum(serialize = "U32")]
    U32,
    #[strum(serialize = "U64")]
    U64,
    #[strum(serialize = "F32")]
    F32,
    #[strum(serialize = "F64")]
    F64,
    #[strum(serialize = "ADDR")]
    Addr,
}

impl Primitive {
    /// The platform's default integer primitive, used when a pseudo-typed
    /// integer literal finalizes with no contextual expected type
    /// (spec §4.D).
    #[must_use]
    pub fn default_int() -> Self {
        Primitive::I64
    }

    /// The platform's default float primitive, used the same way.
    #[must_use]
    pub fn default_float() -> Self {
        Primitive::F64
    }

    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Primitive::I8
                | Primitive::I16
                | Primitive::I32
                | Primitive::I64
                | Primitive::U8
                | Primitive::U16
                | Primitive::U32
                | Primitive::U64
        )
    }

    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(self, Primitive::F32 | Primitive::F64)
    }

    #[must_use]
    pub fn is_signed(self) -> bool {
        matches!(self, Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64)
    }

    /// Size in bytes, used by struct field offset computation
    /// (spec §3 invariant on `compute_size`).
    #[must_use]
    pub fn size_bytes(self) -> u64 {
        match self {
            Primitive::Void => 0,
            Primitive::I8 | Primitive::U8 => 1,
            Primitive::I16 | Primitive::U16 => 2,
            Primitive::I32 | Primitive::U32 | Primitive::F32 => 4,
            Primitive::I64 | Primitive::U64 | Primitive::F64 | Primitive::Addr => 8,
        }
    }
}
