//! `ModulePath` — an ordered sequence of identifier segments (e.g.
//! `std.optional`). Paths compare structurally and hash by segment, per
//! spec §3.

use smallvec::SmallVec;
use std::fmt;

/// Most module paths are shallow (`std.optional`, `app.net.http`), so the
/// segment list lives inline up to four entries before spilling to the heap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ModulePath {
    segments: SmallVec<[Box<str>; 4]>,
}

impl ModulePath {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Box<str>>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn parse(dotted: &str) -> Self {
        Self::from_segments(dotted.split('.'))
    }

    #[must_use]
    pub fn segments(&self) -> &[Box<str>] {
        &self.segments
    }

    #[must_use]
    pub fn joined(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_dots() {
        let path = ModulePath::parse("std.optional");
        assert_eq!(path.segments(), &[Box::from("std"), Box::from("optional")]);
        assert_eq!(path.to_string(), "std.optional");
    }

    #[test]
    fn equal_segment_sequences_compare_equal() {
        let a = ModulePath::from_segments(["std", "optional"]);
        let b = ModulePath::parse("std.optional");
        assert_eq!(a, b);
    }
}
