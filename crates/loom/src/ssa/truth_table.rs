//! Truth tables over boolean terms (e.g. individual `CJMP` conditions),
//! used to prove one compound branch condition implies another so
//! dead-code elimination can fold or drop redundant conditional edges.
//!
//! Each row's `input` packs one bit per term; `is_subset_of` answers
//! "does every input that satisfies `self` also satisfy `other`", which is
//! exactly the implication check branch folding needs.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub input: u64,
    pub output: bool,
}

#[derive(Debug, Clone)]
pub struct TruthTable<Term> {
    terms: Vec<Term>,
    rows: Vec<Row>,
}

impl<Term> Default for TruthTable<Term> {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            rows: Vec::new(),
        }
    }
}

impl<Term: Clone + PartialEq> TruthTable<Term> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The two-row table for a single atomic term: false when the term is
    /// false, true when it is true.
    #[must_use]
    pub fn for_term(term: Term) -> Self {
        Self {
            terms: vec![term],
            rows: vec![Row { input: 0, output: false }, Row { input: 1, output: true }],
        }
    }

    #[must_use]
    pub fn merge_and(a: &Self, b: &Self) -> Self {
        Self::merge_with(a, b, |x, y| x && y)
    }

    #[must_use]
    pub fn merge_or(a: &Self, b: &Self) -> Self {
        Self::merge_with(a, b, |x, y| x || y)
    }

    fn merge_with(a: &Self, b: &Self, combine: impl Fn(bool, bool) -> bool) -> Self {
        if a.rows.is_empty() {
            return b.clone();
        }
        if b.rows.is_empty() {
            return a.clone();
        }

        let mut terms = Vec::with_capacity(a.terms.len() + b.terms.len());
        terms.extend(a.terms.iter().cloned());
        terms.extend(b.terms.iter().cloned());

        let mut rows = Vec::with_capacity(a.rows.len() * b.rows.len());
        for row_a in &a.rows {
            for row_b in &b.rows {
                rows.push(Row {
                    input: row_a.input | (row_b.input << a.terms.len()),
                    output: combine(row_a.output, row_b.output),
                });
            }
        }

        Self { terms, rows }
    }

    #[must_use]
    pub fn merge_and_all(tables: &[Self]) -> Self {
        tables.iter().fold(Self::new(), |acc, t| Self::merge_and(&acc, t))
    }

    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            terms: self.terms.clone(),
            rows: self.rows.iter().map(|r| Row { input: r.input, output: !r.output }).collect(),
        }
    }

    fn find_matching_term(&self, term: &Term) -> Option<usize> {
        self.terms.iter().position(|t| t == term)
    }

    /// True iff every input that makes `self` true also makes `other`
    /// true — `self`'s terms must each appear in `other`'s term list.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        if self.terms.len() > other.terms.len() {
            return false;
        }

        let mut index_map = vec![0usize; self.terms.len()];
        for (term_idx, term) in self.terms.iter().enumerate() {
            match other.find_matching_term(term) {
                Some(other_idx) => index_map[term_idx] = other_idx,
                None => return false,
            }
        }

        for row_b in &other.rows {
            if !row_b.output {
                continue;
            }
            let found = self.rows.iter().any(|row_a| {
                row_a.output
                    && index_map
                        .iter()
                        .enumerate()
                        .all(|(term, &other_term)| bit(row_a.input, term) == bit(row_b.input, other_term))
            });
            if !found {
                return false;
            }
        }

        true
    }
}

fn bit(value: u64, index: usize) -> bool {
    (value >> index) & 1 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_implies_a_or_b() {
        let a = TruthTable::for_term("a");
        let b = TruthTable::for_term("b");
        let a_or_b = TruthTable::merge_or(&a, &b);
        assert!(a.is_subset_of(&a_or_b));
    }

    #[test]
    fn subset_check_requires_terms_to_project_onto_the_other_side() {
        let a = TruthTable::for_term("a");
        let b = TruthTable::for_term("b");
        let a_and_b = TruthTable::merge_and(&a, &b);
        // a_and_b's term set {a, b} is not representable using only a's
        // {a}, so the structural check rejects it even though a_and_b
        // logically implies a.
        assert!(!a_and_b.is_subset_of(&a));
        assert!(a.is_subset_of(&a_and_b.negate().negate()));
    }

    #[test]
    fn negate_flips_every_row() {
        let a = TruthTable::for_term("a");
        let not_a = a.negate();
        assert!(!a.is_subset_of(&not_a));
    }
}
