//! Infrastructure shared by the SIR and SSA layers (spec §4.G).

pub mod arena;
pub mod bit_set;
pub mod parallel_runner;
pub mod string_arena;
pub mod trace;
