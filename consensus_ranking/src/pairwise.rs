//! Pairwise representation of a ranking: rank map, precedence set and comparison matrix.

use log::{debug, warn};
use std::collections::{HashMap, HashSet};

use crate::config::*;

/// The items of one consensus run, in the order of the item store.
///
/// All the derived structures refer to items by their position in the universe.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Universe {
    items: Vec<Item>,
    positions: HashMap<ItemId, usize>,
}

impl Universe {
    /// Builds the universe from the item store, keeping only the first `max_items` items
    /// if a cap is given.
    pub fn new(items: &[Item], max_items: Option<usize>) -> Result<Universe, ConsensusErrors> {
        let kept = match max_items {
            Some(k) if k < items.len() => &items[..k],
            _ => items,
        };
        if kept.is_empty() {
            return Err(ConsensusErrors::EmptyUniverse);
        }
        let mut positions: HashMap<ItemId, usize> = HashMap::new();
        for (idx, item) in kept.iter().enumerate() {
            if positions.insert(item.id, idx).is_some() {
                return Err(ConsensusErrors::DuplicateItem { id: item.id });
            }
        }
        if kept.len() < items.len() {
            debug!(
                "Universe: keeping {} items out of {}",
                kept.len(),
                items.len()
            );
        }
        Ok(Universe {
            items: kept.to_vec(),
            positions,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, pos: usize) -> &Item {
        &self.items[pos]
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.positions.get(&id).cloned()
    }

    /// The items at the given positions.
    pub fn order_items(&self, order: &[usize]) -> Vec<Item> {
        order.iter().map(|pos| self.items[*pos].clone()).collect()
    }
}

/// Item position -> 1-based rank.
///
/// Items missing from the ranking get the penalty rank `n + 1`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankMap {
    ranks: Vec<u64>,
}

impl RankMap {
    pub fn rank(&self, pos: usize) -> u64 {
        self.ranks[pos]
    }

    pub fn ranks(&self) -> &[u64] {
        &self.ranks
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

/// The set of ordered pairs (a, b) such that a is ranked strictly before b.
///
/// Stored as a dense n x n table since the universe is small.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PrecedenceSet {
    n: usize,
    before: Vec<bool>,
    count: usize,
}

impl PrecedenceSet {
    fn empty(n: usize) -> PrecedenceSet {
        PrecedenceSet {
            n,
            before: vec![false; n * n],
            count: 0,
        }
    }

    pub fn contains(&self, a: usize, b: usize) -> bool {
        self.before[a * self.n + b]
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// All the pairs, in row order.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let mut res: Vec<(usize, usize)> = Vec::with_capacity(self.count);
        for a in 0..self.n {
            for b in 0..self.n {
                if self.contains(a, b) {
                    res.push((a, b));
                }
            }
        }
        res
    }

    pub(crate) fn symmetric_difference_len(&self, other: &PrecedenceSet) -> u64 {
        assert_eq!(self.n, other.n, "precedence sets over different universes");
        self.before
            .iter()
            .zip(other.before.iter())
            .filter(|(x, y)| x != y)
            .count() as u64
    }
}

/// The rank map and precedence set of one ranking.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Representation {
    pub rank_map: RankMap,
    pub precedence: PrecedenceSet,
}

impl Representation {
    /// Representation of a ranking given as item positions, most preferred first.
    /// Positions must be distinct and smaller than `n`.
    pub(crate) fn from_order(order: &[usize], n: usize) -> Representation {
        let mut res = Representation {
            rank_map: RankMap {
                ranks: vec![n as u64 + 1; n],
            },
            precedence: PrecedenceSet::empty(n),
        };
        res.fill_from_order(order);
        res
    }

    /// Overwrites this representation in place, without allocating.
    pub(crate) fn fill_from_order(&mut self, order: &[usize]) {
        let n = self.rank_map.ranks.len();
        let penalty = n as u64 + 1;
        for r in self.rank_map.ranks.iter_mut() {
            *r = penalty;
        }
        for b in self.precedence.before.iter_mut() {
            *b = false;
        }
        for (idx, pos) in order.iter().enumerate() {
            self.rank_map.ranks[*pos] = idx as u64 + 1;
            for later in order[idx + 1..].iter() {
                self.precedence.before[pos * n + later] = true;
            }
        }
        let k = order.len();
        self.precedence.count = k * k.saturating_sub(1) / 2;
    }
}

/// Resolves a ranking of item ids into universe positions.
///
/// Ids outside of the universe are dropped. If an item appears multiple times,
/// only its first occurrence is kept.
pub(crate) fn ranked_positions(ranking: &[ItemId], universe: &Universe) -> Vec<usize> {
    let mut seen: HashSet<usize> = HashSet::new();
    let mut res: Vec<usize> = Vec::with_capacity(ranking.len());
    for id in ranking.iter() {
        match universe.position(*id) {
            Some(pos) if seen.contains(&pos) => {
                warn!("ranked_positions: item {} ranked twice, skipping", id);
            }
            Some(pos) => {
                seen.insert(pos);
                res.push(pos);
            }
            None => {
                debug!("ranked_positions: item {} is not in the universe", id);
            }
        }
    }
    res
}

/// Builds the rank map and the precedence set of a ranking over the universe.
///
/// Items of the universe that the ranking does not mention get the penalty rank and
/// take part in no pair.
pub fn represent(ranking: &[ItemId], universe: &Universe) -> Representation {
    let order = ranked_positions(ranking, universe);
    Representation::from_order(&order, universe.len())
}

/// The signed comparison matrix of a rank map, with rows and columns in universe order.
///
/// Entry (r, c) is 1 if item r is ranked before item c, -1 if after, and 0 on the
/// diagonal or if both items share the same rank.
pub fn comparison_matrix(rank_map: &RankMap) -> Vec<Vec<i8>> {
    let ranks = rank_map.ranks();
    ranks
        .iter()
        .map(|rr| {
            ranks
                .iter()
                .map(|rc| match rr.cmp(rc) {
                    std::cmp::Ordering::Less => 1,
                    std::cmp::Ordering::Greater => -1,
                    std::cmp::Ordering::Equal => 0,
                })
                .collect()
        })
        .collect()
}
