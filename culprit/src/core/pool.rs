//! Ordered candidate pool and the bisection split rule.

use std::collections::BTreeSet;

use crate::core::types::Candidate;

/// Ordered sequence of candidates with no duplicates.
///
/// Order is discovery order and drives both scan order and the left/right
/// split during bisection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
}

impl CandidatePool {
    /// Build a pool, keeping the first occurrence of any repeated identifier.
    pub fn new(candidates: impl IntoIterator<Item = Candidate>) -> Self {
        let mut seen = BTreeSet::new();
        let candidates = candidates
            .into_iter()
            .filter(|candidate| seen.insert(candidate.id().to_string()))
            .collect();
        Self { candidates }
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }
}

impl FromIterator<Candidate> for CandidatePool {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Split a pool into `(probe, held)` halves.
///
/// The probe group is `pool[..len / 2]`: always taken from the front, and the
/// smaller half when the length is odd.
pub fn bisect_split(pool: &[Candidate]) -> (&[Candidate], &[Candidate]) {
    pool.split_at(pool.len() / 2)
}

/// Worst-case number of "is it fixed" questions for a pool of `len` units.
pub fn max_probe_questions(len: usize) -> u32 {
    if len <= 1 {
        0
    } else {
        usize::BITS - (len - 1).leading_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(Candidate::id).collect()
    }

    #[test]
    fn new_drops_repeated_ids_and_keeps_first_position() {
        let pool = CandidatePool::new(["b", "a", "b", "c", "a"].into_iter().map(Candidate::new));
        assert_eq!(ids(pool.as_slice()), vec!["b", "a", "c"]);
    }

    #[test]
    fn split_odd_pool_takes_smaller_front_half() {
        let pool: CandidatePool = ["a", "b", "c", "d", "e"]
            .into_iter()
            .map(Candidate::new)
            .collect();
        let (probe, held) = bisect_split(pool.as_slice());
        assert_eq!(ids(probe), vec!["a", "b"]);
        assert_eq!(ids(held), vec!["c", "d", "e"]);
    }

    #[test]
    fn split_even_pool_is_balanced() {
        let pool: CandidatePool = ["a", "b", "c", "d"]
            .into_iter()
            .map(Candidate::new)
            .collect();
        let (probe, held) = bisect_split(pool.as_slice());
        assert_eq!(ids(probe), vec!["a", "b"]);
        assert_eq!(ids(held), vec!["c", "d"]);
    }

    #[test]
    fn max_probe_questions_is_ceil_log2() {
        let expected = [
            (1, 0),
            (2, 1),
            (3, 2),
            (4, 2),
            (5, 3),
            (8, 3),
            (9, 4),
            (1024, 10),
        ];
        for (len, questions) in expected {
            assert_eq!(max_probe_questions(len), questions, "len={len}");
        }
    }
}
