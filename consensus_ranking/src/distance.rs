use crate::pairwise::{PrecedenceSet, RankMap};

/// Sum over the universe of the absolute rank differences.
///
/// # Panics
///
/// If the two rank maps do not cover universes of the same size.
pub fn rank_distance(a: &RankMap, b: &RankMap) -> u64 {
    assert_eq!(a.len(), b.len(), "rank maps over different universes");
    a.ranks()
        .iter()
        .zip(b.ranks().iter())
        .map(|(ra, rb)| ra.abs_diff(*rb))
        .sum()
}

/// Number of ordered pairs present in exactly one of the two sets.
///
/// A pair ranked in opposite orders counts twice, so the distance is at most n(n-1).
///
/// # Panics
///
/// If the two sets do not cover universes of the same size.
pub fn hamming_distance(a: &PrecedenceSet, b: &PrecedenceSet) -> u64 {
    a.symmetric_difference_len(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Item;
    use crate::pairwise::{represent, Universe};
    use proptest::prelude::*;

    fn universe(n: u64) -> Universe {
        let items: Vec<Item> = (1..=n).map(|i| Item::new(i, &format!("I{}", i))).collect();
        Universe::new(&items, None).unwrap()
    }

    #[test]
    fn reversal() {
        let u = universe(3);
        let a = represent(&[1, 2, 3], &u);
        let b = represent(&[3, 2, 1], &u);
        assert_eq!(rank_distance(&a.rank_map, &b.rank_map), 4);
        // Every pair is reversed: each one counts in both directions.
        assert_eq!(hamming_distance(&a.precedence, &b.precedence), 6);
    }

    #[test]
    fn single_swap() {
        let u = universe(4);
        let a = represent(&[1, 2, 3, 4], &u);
        let b = represent(&[1, 3, 2, 4], &u);
        assert_eq!(rank_distance(&a.rank_map, &b.rank_map), 2);
        assert_eq!(hamming_distance(&a.precedence, &b.precedence), 2);
    }

    #[test]
    fn missing_items_use_penalty_rank() {
        let u = universe(3);
        let a = represent(&[1, 2, 3], &u);
        let b = represent(&[1], &u);
        // B and C are both at rank 4 in b.
        assert_eq!(rank_distance(&a.rank_map, &b.rank_map), 2 + 1);
        // a has 3 pairs, b has none.
        assert_eq!(hamming_distance(&a.precedence, &b.precedence), 3);
    }

    #[test]
    fn full_reversal_reaches_the_bound() {
        let u = universe(6);
        let a = represent(&[1, 2, 3, 4, 5, 6], &u);
        let b = represent(&[6, 5, 4, 3, 2, 1], &u);
        assert_eq!(hamming_distance(&a.precedence, &b.precedence), 6 * 5);
        assert_eq!(rank_distance(&a.rank_map, &b.rank_map), 5 + 3 + 1 + 1 + 3 + 5);
    }

    #[test]
    #[should_panic(expected = "rank maps over different universes")]
    fn rank_distance_over_different_universes() {
        let a = represent(&[1, 2], &universe(2));
        let b = represent(&[1, 2, 3], &universe(3));
        rank_distance(&a.rank_map, &b.rank_map);
    }

    #[test]
    #[should_panic(expected = "precedence sets over different universes")]
    fn hamming_distance_over_different_universes() {
        let a = represent(&[1, 2], &universe(2));
        let b = represent(&[1, 2, 3], &universe(3));
        hamming_distance(&a.precedence, &b.precedence);
    }

    fn ranking_strategy() -> impl Strategy<Value = Vec<u64>> {
        // Ids 7 and 8 are outside of the universe. Duplicates are allowed.
        prop::collection::vec(1u64..9, 0..8)
    }

    proptest! {
        #[test]
        fn rank_distance_is_symmetric(r1 in ranking_strategy(), r2 in ranking_strategy()) {
            let u = universe(6);
            let a = represent(&r1, &u);
            let b = represent(&r2, &u);
            let d = rank_distance(&a.rank_map, &b.rank_map);
            prop_assert_eq!(d, rank_distance(&b.rank_map, &a.rank_map));
            prop_assert_eq!(d == 0, a.rank_map == b.rank_map);
        }

        #[test]
        fn hamming_distance_is_symmetric(r1 in ranking_strategy(), r2 in ranking_strategy()) {
            let u = universe(6);
            let a = represent(&r1, &u);
            let b = represent(&r2, &u);
            let d = hamming_distance(&a.precedence, &b.precedence);
            prop_assert_eq!(d, hamming_distance(&b.precedence, &a.precedence));
            prop_assert_eq!(d == 0, a.precedence == b.precedence);
            // n(n-1) for n = 6.
            prop_assert!(d <= 6 * 5);
        }

        #[test]
        fn distance_to_self_is_zero(r in ranking_strategy()) {
            let u = universe(6);
            let a = represent(&r, &u);
            prop_assert_eq!(rank_distance(&a.rank_map, &a.rank_map), 0);
            prop_assert_eq!(hamming_distance(&a.precedence, &a.precedence), 0);
        }
    }
}
