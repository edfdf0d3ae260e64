use log::{debug, info, warn};
use std::collections::HashMap;

use crate::config::*;
use crate::pairwise::{ranked_positions, Representation, Universe};

/// The weight of an expert when no override is given.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// An expert ranking, ready to be compared against candidate rankings.
#[derive(PartialEq, Debug, Clone)]
pub struct ExpertRecord {
    pub expert_id: String,
    pub name: String,
    pub weight: f64,
    /// The ranked item positions, most preferred first.
    pub order: Vec<usize>,
    pub representation: Representation,
}

/// The experts that can take part in a run.
#[derive(PartialEq, Debug, Clone)]
pub struct PreparedExperts {
    pub records: Vec<ExpertRecord>,
    /// Names of the experts without any stored ranking.
    pub skipped: Vec<String>,
}

/// Builds the record of an expert from its latest ranking.
///
/// Returns None if the expert never saved a ranking.
pub fn prepare(expert: &Expert, weight: f64, universe: &Universe) -> Option<ExpertRecord> {
    let ranking = expert.latest_ranking()?;
    let order = ranked_positions(ranking, universe);
    if order.len() < universe.len() {
        debug!(
            "prepare: expert {:?} ranks {} items out of {}",
            expert.name,
            order.len(),
            universe.len()
        );
    }
    let representation = Representation::from_order(&order, universe.len());
    Some(ExpertRecord {
        expert_id: expert.id.clone(),
        name: expert.name.clone(),
        weight,
        order,
        representation,
    })
}

/// Prepares all the experts, applying the weight overrides keyed by expert id.
///
/// Experts without a ranking are skipped. It is an error if no expert is left.
pub fn prepare_all(
    experts: &[Expert],
    weights: &HashMap<String, f64>,
    universe: &Universe,
) -> Result<PreparedExperts, ConsensusErrors> {
    let mut records: Vec<ExpertRecord> = Vec::new();
    let mut skipped: Vec<String> = Vec::new();
    for expert in experts.iter() {
        let weight = weights.get(&expert.id).cloned().unwrap_or(DEFAULT_WEIGHT);
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConsensusErrors::InvalidWeight {
                expert: expert.id.clone(),
                weight,
            });
        }
        match prepare(expert, weight, universe) {
            Some(record) => records.push(record),
            None => {
                warn!("prepare_all: expert {:?} has no ranking, skipping", expert.name);
                skipped.push(expert.name.clone());
            }
        }
    }
    for id in weights.keys() {
        if !experts.iter().any(|e| e.id == *id) {
            warn!("prepare_all: weight given for unknown expert {:?}", id);
        }
    }
    if records.is_empty() {
        return Err(ConsensusErrors::NoExpertData);
    }
    info!(
        "prepare_all: {} experts prepared, {} skipped",
        records.len(),
        skipped.len()
    );
    Ok(PreparedExperts { records, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe() -> Universe {
        Universe::new(
            &[Item::new(1, "A"), Item::new(2, "B"), Item::new(3, "C")],
            None,
        )
        .unwrap()
    }

    fn expert(id: &str, rankings: Vec<Vec<ItemId>>) -> Expert {
        Expert {
            id: id.to_string(),
            name: format!("Expert {}", id),
            rankings,
        }
    }

    #[test]
    fn uses_latest_ranking() {
        let u = universe();
        let e = expert("1", vec![vec![1, 2, 3], vec![3, 1, 2]]);
        let r = prepare(&e, 2.0, &u).unwrap();
        assert_eq!(r.order, vec![2, 0, 1]);
        assert_eq!(r.representation.rank_map.ranks(), &[2, 3, 1]);
        assert_eq!(r.weight, 2.0);
        assert_eq!(r.name, "Expert 1");
    }

    #[test]
    fn no_ranking() {
        let u = universe();
        assert_eq!(prepare(&expert("1", vec![]), 1.0, &u), None);
    }

    #[test]
    fn skips_experts_without_ranking() {
        let u = universe();
        let experts = vec![expert("1", vec![]), expert("2", vec![vec![2, 1]])];
        let mut weights = HashMap::new();
        weights.insert("2".to_string(), 0.5);
        let p = prepare_all(&experts, &weights, &u).unwrap();
        assert_eq!(p.records.len(), 1);
        assert_eq!(p.records[0].expert_id, "2");
        assert_eq!(p.records[0].weight, 0.5);
        assert_eq!(p.skipped, vec!["Expert 1".to_string()]);
    }

    #[test]
    fn default_weight() {
        let u = universe();
        let p = prepare_all(&[expert("1", vec![vec![1]])], &HashMap::new(), &u).unwrap();
        assert_eq!(p.records[0].weight, DEFAULT_WEIGHT);
    }

    #[test]
    fn no_expert_data() {
        let u = universe();
        assert_eq!(
            prepare_all(&[expert("1", vec![])], &HashMap::new(), &u),
            Err(ConsensusErrors::NoExpertData)
        );
        assert_eq!(
            prepare_all(&[], &HashMap::new(), &u),
            Err(ConsensusErrors::NoExpertData)
        );
    }

    #[test]
    fn negative_weight() {
        let u = universe();
        let mut weights = HashMap::new();
        weights.insert("1".to_string(), -1.0);
        assert_eq!(
            prepare_all(&[expert("1", vec![vec![1]])], &weights, &u),
            Err(ConsensusErrors::InvalidWeight {
                expert: "1".to_string(),
                weight: -1.0
            })
        );
    }
}
