//! Source positions.
//!
//! `TextRange` is re-exported from the teacher's own `ruff_text_size`
//! dependency rather than hand-rolled: the crate's type of that name is
//! already the `(start, end)` compact byte-offset pair spec §3 asks for
//! (internally stored as a start plus a length, the same bit pattern the
//! spec describes as `(offset, length)`).

pub use ruff_text_size::{TextLen, TextRange, TextSize};

use crate::sir::module_path::ModulePath;

/// `(ModulePath, TextRange)` — a fully qualified position in the program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub module: ModulePath,
    pub range: TextRange,
}

impl SourceLocation {
    #[must_use]
    pub fn new(module: ModulePath, range: TextRange) -> Self {
        Self { module, range }
    }
}

/// A zero-length range at offset zero, useful for synthesized symbols
/// (preamble injection, generated specializations) that have no source text
/// of their own.
#[must_use]
pub fn empty_range() -> TextRange {
    TextRange::new(TextSize::from(0), TextSize::from(0))
}
