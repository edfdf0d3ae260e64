use crate::config::ExpertStats;
use crate::distance::rank_distance;
use crate::expert::ExpertRecord;
use crate::pairwise::RankMap;

fn round4(x: f64) -> f64 {
    (x * 10000.0).round() / 10000.0
}

/// Normalized competence of experts, given their rank distances to a reference ranking.
///
/// The raw competence 1 / (1 + d) is divided by the total over all experts, so that the
/// scores sum to 1. If the total is zero, all the scores are zero.
pub fn competence_scores(rank_distances: &[u64]) -> Vec<f64> {
    let raw: Vec<f64> = rank_distances
        .iter()
        .map(|d| 1.0 / (1.0 + *d as f64))
        .collect();
    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return vec![0.0; raw.len()];
    }
    raw.iter().map(|r| r / total).collect()
}

/// Distance and competence of every expert with respect to the reference rank map.
pub fn expert_stats(reference: &RankMap, records: &[ExpertRecord]) -> Vec<ExpertStats> {
    let distances: Vec<u64> = records
        .iter()
        .map(|r| rank_distance(reference, &r.representation.rank_map))
        .collect();
    let scores = competence_scores(&distances);
    records
        .iter()
        .zip(distances.iter().zip(scores.iter()))
        .map(|(r, (d, score))| ExpertStats {
            expert_id: r.expert_id.clone(),
            expert_name: r.name.clone(),
            d_rank: *d,
            input_weight: r.weight,
            calculated_competence: round4(*score),
        })
        .collect()
}
