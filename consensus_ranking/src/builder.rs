pub use crate::config::*;
use std::collections::HashMap;

use crate::{run_consensus, ConsensusStream};

/// A builder for assembling the inputs of a consensus run.
///
/// Experts are referred to by name. The same name always refers to the same expert.
///
/// ```
/// pub use consensus_ranking::builder::Builder;
/// pub use consensus_ranking::{ConsensusRules, Criterion};
/// # use consensus_ranking::ConsensusErrors;
///
/// let mut builder = Builder::new(&ConsensusRules::DEFAULT_RULES)?
///     .items(&["Mercedes".to_string(), "Ferrari".to_string(), "McLaren".to_string()])?;
///
/// builder.add_ranking("Anna", &["Ferrari".to_string(), "Mercedes".to_string()])?;
/// builder.add_ranking("Bob", &["Ferrari".to_string(), "McLaren".to_string()])?;
/// builder.set_weight("Bob", 2.0)?;
///
/// let result = builder.run()?;
/// let best = result.reference().unwrap();
/// assert_eq!(best.order[0].name, "Ferrari");
///
/// # Ok::<(), ConsensusErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: ConsensusRules,
    pub(crate) _items: Vec<Item>,
    pub(crate) _experts: Vec<Expert>,
    pub(crate) _weights: HashMap<String, f64>,
}

impl Builder {
    pub fn new(rules: &ConsensusRules) -> Result<Builder, ConsensusErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _items: Vec::new(),
            _experts: Vec::new(),
            _weights: HashMap::new(),
        })
    }

    /// Sets the items to rank. Their identifiers follow the order of the names, starting at 1.
    pub fn items(self, names: &[String]) -> Result<Builder, ConsensusErrors> {
        let items: Vec<Item> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| Item::new(idx as ItemId + 1, name))
            .collect();
        self.items_with_ids(&items)
    }

    /// Sets the items to rank, with explicit identifiers.
    pub fn items_with_ids(self, items: &[Item]) -> Result<Builder, ConsensusErrors> {
        for (idx, item) in items.iter().enumerate() {
            if items[..idx].iter().any(|other| other.id == item.id) {
                return Err(ConsensusErrors::DuplicateItem { id: item.id });
            }
        }
        Ok(Builder {
            _rules: self._rules,
            _items: items.to_vec(),
            _experts: Vec::new(),
            _weights: HashMap::new(),
        })
    }

    /// Saves a ranking for an expert, given as item names, most preferred first.
    ///
    /// A new ranking of the same expert replaces the previous one for the run.
    /// Names that are not items are ignored.
    pub fn add_ranking(&mut self, expert: &str, names: &[String]) -> Result<(), ConsensusErrors> {
        let ids: Vec<ItemId> = names
            .iter()
            .filter_map(|n| self._items.iter().find(|i| i.name == *n).map(|i| i.id))
            .collect();
        self.add_ranking_ids(expert, &ids)
    }

    /// Saves a ranking for an expert, given as item identifiers.
    pub fn add_ranking_ids(&mut self, expert: &str, ids: &[ItemId]) -> Result<(), ConsensusErrors> {
        if let Some(e) = self._experts.iter_mut().find(|e| e.name == expert) {
            e.rankings.push(ids.to_vec());
        } else {
            self._experts.push(Expert {
                id: expert.to_string(),
                name: expert.to_string(),
                rankings: vec![ids.to_vec()],
            });
        }
        Ok(())
    }

    /// Overrides the weight of an expert for this run.
    pub fn set_weight(&mut self, expert: &str, weight: f64) -> Result<(), ConsensusErrors> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConsensusErrors::InvalidWeight {
                expert: expert.to_string(),
                weight,
            });
        }
        self._weights.insert(expert.to_string(), weight);
        Ok(())
    }

    /// Starts the run and returns the stream of its events.
    pub fn stream(&self) -> Result<ConsensusStream, ConsensusErrors> {
        run_consensus(&self._items, &self._experts, &self._weights, &self._rules)
    }

    /// Runs the search to the end.
    pub fn run(&self) -> Result<ConsensusResult, ConsensusErrors> {
        crate::run_consensus_stats(&self._items, &self._experts, &self._weights, &self._rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn latest_ranking_wins() {
        let mut b = Builder::new(&ConsensusRules::DEFAULT_RULES)
            .unwrap()
            .items(&names(&["A", "B", "C"]))
            .unwrap();
        b.add_ranking("e", &names(&["A", "B", "C"])).unwrap();
        b.add_ranking("e", &names(&["C", "A", "B"])).unwrap();
        let res = b.run().unwrap();
        assert_eq!(res.inputs.len(), 1);
        let order: Vec<String> = res.inputs[0].order.iter().map(|i| i.name.clone()).collect();
        assert_eq!(order, names(&["C", "A", "B"]));
    }

    #[test]
    fn unknown_names_are_ignored() {
        let mut b = Builder::new(&ConsensusRules::DEFAULT_RULES)
            .unwrap()
            .items(&names(&["A", "B"]))
            .unwrap();
        b.add_ranking("e", &names(&["Z", "B"])).unwrap();
        let res = b.run().unwrap();
        assert_eq!(res.inputs[0].order.len(), 1);
        assert_eq!(res.inputs[0].order[0].id, 2);
    }

    #[test]
    fn invalid_weight() {
        let mut b = Builder::new(&ConsensusRules::DEFAULT_RULES).unwrap();
        assert!(b.set_weight("e", f64::NAN).is_err());
        assert!(b.set_weight("e", 0.0).is_ok());
    }

    #[test]
    fn no_rankings() {
        let b = Builder::new(&ConsensusRules::DEFAULT_RULES)
            .unwrap()
            .items(&names(&["A", "B"]))
            .unwrap();
        assert_eq!(b.run().err(), Some(ConsensusErrors::NoExpertData));
    }

    #[test]
    fn duplicate_ids() {
        let b = Builder::new(&ConsensusRules::DEFAULT_RULES).unwrap();
        let items = vec![Item::new(4, "A"), Item::new(4, "B")];
        assert_eq!(
            b.items_with_ids(&items).err().map(|e| e.to_string()),
            Some("Item 4 appears more than once".to_string())
        );
    }
}
