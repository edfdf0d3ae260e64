//! Exhaustive search over all the permutations of the universe.

use log::debug;

use crate::config::Criterion;
use crate::distance::{hamming_distance, rank_distance};
use crate::expert::ExpertRecord;
use crate::pairwise::Representation;

/// Two criterion values closer than this (relative to their magnitude) are a tie.
/// The sums of weighted distances are not always exact in floating point.
const TIE_TOLERANCE: f64 = 1e-9;

/// The number of permutations of n items, if it fits in 64 bits.
pub fn factorial(n: usize) -> Option<u64> {
    (1..=n as u64).try_fold(1u64, |acc, x| acc.checked_mul(x))
}

/// Rearranges the slice into the next permutation in lexicographic order.
/// Returns false (and leaves the slice untouched) if it was the last one.
pub(crate) fn next_permutation(v: &mut [usize]) -> bool {
    if v.len() < 2 {
        return false;
    }
    let mut i = v.len() - 1;
    while i > 0 && v[i - 1] >= v[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = v.len() - 1;
    while v[j] <= v[i - 1] {
        j -= 1;
    }
    v.swap(i - 1, j);
    v[i..].reverse();
    true
}

/// The best value found so far for one criterion, and all the permutations reaching it.
#[derive(PartialEq, Debug, Clone)]
pub struct CriterionTracker {
    pub criterion: Criterion,
    pub best: Option<f64>,
    /// In enumeration order.
    pub solutions: Vec<Vec<usize>>,
    pub tie_count: u64,
    max_solutions: usize,
}

impl CriterionTracker {
    pub fn new(criterion: Criterion, max_ties: Option<usize>) -> CriterionTracker {
        CriterionTracker {
            criterion,
            best: None,
            solutions: Vec::new(),
            tie_count: 0,
            // At least one solution is needed to report a reference.
            max_solutions: max_ties.unwrap_or(usize::MAX).max(1),
        }
    }

    /// Records the value of a permutation.
    pub fn offer(&mut self, value: f64, perm: &[usize]) {
        match self.best {
            Some(best) if value > best + TIE_TOLERANCE * best.abs().max(1.0) => {}
            Some(best) if value >= best - TIE_TOLERANCE * best.abs().max(1.0) => {
                self.tie_count += 1;
                if self.solutions.len() < self.max_solutions {
                    self.solutions.push(perm.to_vec());
                }
            }
            _ => {
                self.best = Some(value);
                self.solutions.clear();
                self.solutions.push(perm.to_vec());
                self.tie_count = 1;
            }
        }
    }
}

/// The distances of every expert to a candidate ranking.
pub(crate) fn expert_distances(
    candidate: &Representation,
    records: &[ExpertRecord],
) -> (Vec<u64>, Vec<u64>) {
    records
        .iter()
        .map(|r| {
            (
                rank_distance(&candidate.rank_map, &r.representation.rank_map),
                hamming_distance(&candidate.precedence, &r.representation.precedence),
            )
        })
        .unzip()
}

/// The state of the enumeration between two steps.
///
/// A fresh state is built for every run: nothing is shared between runs.
pub struct SearchState {
    perm: Vec<usize>,
    candidate: Representation,
    visited: u64,
    total: u64,
    exhausted: bool,
    trackers: Vec<CriterionTracker>,
}

impl SearchState {
    /// `total` must be the factorial of `n`.
    pub fn new(n: usize, total: u64, max_ties: Option<usize>) -> SearchState {
        let perm: Vec<usize> = (0..n).collect();
        SearchState {
            candidate: Representation::from_order(&perm, n),
            perm,
            visited: 0,
            total,
            exhausted: n == 0,
            trackers: Criterion::ALL
                .iter()
                .map(|c| CriterionTracker::new(*c, max_ties))
                .collect(),
        }
    }

    /// Evaluates the current permutation and moves to the next one.
    /// Returns false once all the permutations have been visited.
    pub fn step(&mut self, records: &[ExpertRecord]) -> bool {
        if self.exhausted {
            return false;
        }
        self.candidate.fill_from_order(&self.perm);

        let mut sum_rank = 0.0;
        let mut max_rank: u64 = 0;
        let mut sum_hamming = 0.0;
        let mut max_hamming: u64 = 0;
        for r in records.iter() {
            let d_rank = rank_distance(&self.candidate.rank_map, &r.representation.rank_map);
            let d_hamming =
                hamming_distance(&self.candidate.precedence, &r.representation.precedence);
            sum_rank += r.weight * d_rank as f64;
            sum_hamming += r.weight * d_hamming as f64;
            // The max criteria do not use the weights.
            max_rank = max_rank.max(d_rank);
            max_hamming = max_hamming.max(d_hamming);
        }

        for tracker in self.trackers.iter_mut() {
            let value = match tracker.criterion {
                Criterion::SumRank => sum_rank,
                Criterion::MaxRank => max_rank as f64,
                Criterion::SumHamming => sum_hamming,
                Criterion::MaxHamming => max_hamming as f64,
            };
            tracker.offer(value, &self.perm);
        }

        self.visited += 1;
        if !next_permutation(&mut self.perm) {
            debug!("SearchState: visited {} permutations", self.visited);
            self.exhausted = true;
        }
        true
    }

    pub fn current(&self) -> &[usize] {
        &self.perm
    }

    pub fn visited(&self) -> u64 {
        self.visited
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_finished(&self) -> bool {
        self.exhausted
    }

    pub fn trackers(&self) -> &[CriterionTracker] {
        &self.trackers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Expert, Item, ItemId};
    use crate::expert::prepare;
    use crate::pairwise::Universe;
    use std::collections::HashSet;

    fn universe(n: u64) -> Universe {
        let items: Vec<Item> = (1..=n)
            .map(|i| Item::new(i, &((b'A' + i as u8 - 1) as char).to_string()))
            .collect();
        Universe::new(&items, None).unwrap()
    }

    fn record(u: &Universe, name: &str, ranking: &[ItemId], weight: f64) -> ExpertRecord {
        let e = Expert {
            id: name.to_string(),
            name: name.to_string(),
            rankings: vec![ranking.to_vec()],
        };
        prepare(&e, weight, u).unwrap()
    }

    fn run(n: usize, records: &[ExpertRecord], max_ties: Option<usize>) -> SearchState {
        let mut state = SearchState::new(n, factorial(n).unwrap(), max_ties);
        while state.step(records) {}
        state
    }

    fn tracker(state: &SearchState, c: Criterion) -> &CriterionTracker {
        state.trackers().iter().find(|t| t.criterion == c).unwrap()
    }

    #[test]
    fn factorials() {
        assert_eq!(factorial(0), Some(1));
        assert_eq!(factorial(3), Some(6));
        assert_eq!(factorial(9), Some(362880));
        assert_eq!(factorial(20), Some(2432902008176640000));
        assert_eq!(factorial(21), None);
    }

    #[test]
    fn lexicographic_order() {
        let mut v = vec![0, 1, 2];
        let mut seen = vec![v.clone()];
        while next_permutation(&mut v) {
            seen.push(v.clone());
        }
        assert_eq!(
            seen,
            vec![
                vec![0, 1, 2],
                vec![0, 2, 1],
                vec![1, 0, 2],
                vec![1, 2, 0],
                vec![2, 0, 1],
                vec![2, 1, 0]
            ]
        );
        assert_eq!(v, vec![2, 1, 0]);
    }

    #[test]
    fn visits_every_permutation_once() {
        let u = universe(5);
        let records = vec![record(&u, "e1", &[1, 2, 3, 4, 5], 1.0)];
        let mut state = SearchState::new(5, 120, None);
        let mut seen: HashSet<Vec<usize>> = HashSet::new();
        loop {
            let current = state.current().to_vec();
            if !state.step(&records) {
                break;
            }
            assert!(seen.insert(current));
        }
        assert_eq!(seen.len(), 120);
        assert_eq!(state.visited(), 120);
        assert!(state.is_finished());
        assert!(!state.step(&records));
    }

    #[test]
    fn single_expert_is_the_consensus() {
        let u = universe(4);
        let records = vec![record(&u, "e1", &[3, 1, 4, 2], 1.0)];
        let state = run(4, &records, None);
        for t in state.trackers() {
            assert_eq!(t.best, Some(0.0));
            assert_eq!(t.solutions, vec![vec![2, 0, 3, 1]]);
            assert_eq!(t.tie_count, 1);
        }
    }

    #[test]
    fn opposite_experts_keep_all_ties() {
        let u = universe(3);
        let records = vec![
            record(&u, "e1", &[1, 2, 3], 1.0),
            record(&u, "e2", &[3, 2, 1], 1.0),
        ];
        let state = run(3, &records, None);

        let sum_rank = tracker(&state, Criterion::SumRank);
        assert_eq!(sum_rank.best, Some(4.0));
        assert_eq!(sum_rank.solutions, vec![vec![0, 1, 2], vec![2, 1, 0]]);

        let max_rank = tracker(&state, Criterion::MaxRank);
        assert_eq!(max_rank.best, Some(4.0));
        assert_eq!(max_rank.solutions.len(), 6);
        assert!(max_rank.best <= sum_rank.best);

        let sum_hamming = tracker(&state, Criterion::SumHamming);
        assert_eq!(sum_hamming.best, Some(6.0));
        assert_eq!(sum_hamming.solutions.len(), 6);

        let max_hamming = tracker(&state, Criterion::MaxHamming);
        assert_eq!(max_hamming.best, Some(4.0));
        assert_eq!(
            max_hamming.solutions,
            vec![vec![0, 2, 1], vec![1, 0, 2], vec![1, 2, 0], vec![2, 0, 1]]
        );
    }

    #[test]
    fn weights_only_apply_to_sums() {
        let u = universe(3);
        let records = vec![
            record(&u, "e1", &[1, 2, 3], 2.0),
            record(&u, "e2", &[3, 2, 1], 1.0),
        ];
        let state = run(3, &records, None);
        let sum_rank = tracker(&state, Criterion::SumRank);
        assert_eq!(sum_rank.best, Some(4.0));
        assert_eq!(sum_rank.solutions, vec![vec![0, 1, 2]]);
        let max_rank = tracker(&state, Criterion::MaxRank);
        assert_eq!(max_rank.best, Some(4.0));
        assert_eq!(max_rank.solutions.len(), 6);
    }

    #[test]
    fn fractional_weights_still_tie() {
        let u = universe(3);
        let records = vec![
            record(&u, "e1", &[1, 2, 3], 0.1),
            record(&u, "e2", &[3, 2, 1], 0.1),
        ];
        let state = run(3, &records, None);
        let sum_rank = tracker(&state, Criterion::SumRank);
        assert_eq!(sum_rank.solutions.len(), 2);
        assert_eq!(tracker(&state, Criterion::SumHamming).solutions.len(), 6);
    }

    #[test]
    fn capped_ties_are_counted() {
        let u = universe(3);
        let records = vec![
            record(&u, "e1", &[1, 2, 3], 1.0),
            record(&u, "e2", &[3, 2, 1], 1.0),
        ];
        let state = run(3, &records, Some(2));
        let max_rank = tracker(&state, Criterion::MaxRank);
        assert_eq!(max_rank.solutions, vec![vec![0, 1, 2], vec![0, 2, 1]]);
        assert_eq!(max_rank.tie_count, 6);
    }

    #[test]
    fn runs_are_independent() {
        let u = universe(4);
        let records = vec![
            record(&u, "e1", &[1, 2, 3, 4], 1.0),
            record(&u, "e2", &[2, 1, 4, 3], 1.5),
            record(&u, "e3", &[4, 3], 1.0),
        ];
        let first = run(4, &records, None);
        let second = run(4, &records, None);
        assert_eq!(first.trackers(), second.trackers());
    }

    #[test]
    fn tracker_replaces_on_improvement() {
        let mut t = CriterionTracker::new(Criterion::SumRank, None);
        t.offer(3.0, &[0, 1]);
        t.offer(3.0, &[1, 0]);
        assert_eq!(t.tie_count, 2);
        t.offer(5.0, &[1, 1]);
        assert_eq!(t.solutions.len(), 2);
        t.offer(1.0, &[0, 0]);
        assert_eq!(t.best, Some(1.0));
        assert_eq!(t.solutions, vec![vec![0, 0]]);
        assert_eq!(t.tie_count, 1);
    }

    #[test]
    fn distances_of_a_candidate() {
        let u = universe(3);
        let records = vec![
            record(&u, "e1", &[1, 2, 3], 1.0),
            record(&u, "e2", &[3, 2, 1], 1.0),
        ];
        let candidate = Representation::from_order(&[0, 2, 1], 3);
        let (d_rank, d_hamming) = expert_distances(&candidate, &records);
        assert_eq!(d_rank, vec![2, 4]);
        assert_eq!(d_hamming, vec![2, 4]);
    }
}
