mod competence;
mod config;
mod distance;
mod expert;
mod pairwise;
mod search;

pub mod builder;
pub mod manual;

use log::{debug, info};

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

pub use crate::competence::{competence_scores, expert_stats};
pub use crate::config::*;
pub use crate::distance::{hamming_distance, rank_distance};
pub use crate::expert::{prepare, prepare_all, ExpertRecord, PreparedExperts, DEFAULT_WEIGHT};
pub use crate::pairwise::{
    comparison_matrix, represent, PrecedenceSet, RankMap, Representation, Universe,
};
pub use crate::search::{factorial, CriterionTracker, SearchState};

// Where the stream is in the protocol.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum Phase {
    Start,
    Begin,
    Experts,
    Searching,
    Result,
    Finished,
}

/// A consensus run, seen as the sequence of events it produces.
///
/// The search only advances when the next event is requested. Between two progress
/// events, the enumeration runs without interruption. Dropping the stream abandons the run.
pub struct ConsensusStream {
    universe: Universe,
    records: Vec<ExpertRecord>,
    skipped: Vec<String>,
    progress_every: u64,
    progress_min_interval: Duration,
    state: SearchState,
    phase: Phase,
    started: Instant,
    last_progress: Instant,
}

/// Starts a consensus run.
///
/// Arguments:
/// * `items` the item store, in order. It is truncated if the rules cap the number of items.
/// * `experts` the experts and their saved rankings. Only the latest ranking of each expert
/// is used, and experts without any ranking are skipped.
/// * `weights` weight overrides, keyed by expert id. The default weight is 1.
/// * `rules` the rules of this run
///
/// All the input errors are reported here, before any event is produced.
pub fn run_consensus(
    items: &[Item],
    experts: &[Expert],
    weights: &HashMap<String, f64>,
    rules: &ConsensusRules,
) -> Result<ConsensusStream, ConsensusErrors> {
    let started = Instant::now();
    info!(
        "Processing {:?} items, {:?} experts, rules: {:?}",
        items.len(),
        experts.len(),
        rules
    );
    let universe = Universe::new(items, rules.max_items)?;
    let total = factorial(universe.len()).ok_or(ConsensusErrors::UniverseTooLarge {
        size: universe.len(),
    })?;
    let prepared = prepare_all(experts, weights, &universe)?;
    for (idx, item) in universe.items().iter().enumerate() {
        info!("Item: {}: {} ({})", idx + 1, item.name, item.id);
    }
    for r in prepared.records.iter() {
        info!("Expert: {} weight: {}", r.name, r.weight);
    }

    Ok(ConsensusStream {
        state: SearchState::new(universe.len(), total, rules.max_ties_per_criterion),
        universe,
        records: prepared.records,
        skipped: prepared.skipped,
        progress_every: rules.progress_every.max(1),
        progress_min_interval: rules.progress_min_interval,
        phase: Phase::Start,
        started,
        last_progress: started,
    })
}

/// Runs the consensus search to the end and returns its result.
pub fn run_consensus_stats(
    items: &[Item],
    experts: &[Expert],
    weights: &HashMap<String, f64>,
    rules: &ConsensusRules,
) -> Result<ConsensusResult, ConsensusErrors> {
    let stream = run_consensus(items, experts, weights, rules)?;
    for event in stream {
        if let ConsensusEvent::Result(res) = event {
            return Ok(res);
        }
    }
    unreachable!("run_consensus_stats: the stream ended without a result");
}

impl ConsensusStream {
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn records(&self) -> &[ExpertRecord] {
        &self.records
    }

    /// The number of permutations to visit.
    pub fn total(&self) -> u64 {
        self.state.total()
    }

    fn throttled_progress(&mut self) -> Option<ConsensusEvent> {
        let current = self.state.visited();
        if current % self.progress_every != 0 {
            return None;
        }
        if self.last_progress.elapsed() < self.progress_min_interval {
            return None;
        }
        self.last_progress = Instant::now();
        let total = self.state.total();
        let percent = ((current as f64) * 100.0 / (total as f64) * 100.0).round() / 100.0;
        debug!("progress: {}/{} ({}%)", current, total, percent);
        Some(ConsensusEvent::Progress {
            current,
            total,
            percent,
        })
    }

    fn solution(&self, order: &[usize], criterion: Criterion) -> Solution {
        let candidate = Representation::from_order(order, self.universe.len());
        let (d_rank, d_hamming) = search::expert_distances(&candidate, &self.records);
        Solution {
            order: self.universe.order_items(order),
            distances: if criterion.uses_rank_distance() {
                d_rank
            } else {
                d_hamming
            },
            expert_stats: expert_stats(&candidate.rank_map, &self.records),
        }
    }

    fn build_result(&self) -> ConsensusResult {
        let outcomes: Vec<CriterionOutcome> = self
            .state
            .trackers()
            .iter()
            .map(|t| CriterionOutcome {
                criterion: t.criterion,
                value: t.best.unwrap_or(0.0),
                solutions: t
                    .solutions
                    .iter()
                    .map(|order| self.solution(order, t.criterion))
                    .collect(),
                tie_count: t.tie_count,
            })
            .collect();

        // The first optimal ranking under enumeration order is the reference.
        let reference_stats: Vec<ExpertStats> = outcomes
            .iter()
            .find(|o| o.criterion == Criterion::SumRank)
            .and_then(|o| o.solutions.first())
            .map(|s| s.expert_stats.clone())
            .unwrap_or_default();

        let inputs: Vec<ExpertInput> = self
            .records
            .iter()
            .map(|r| ExpertInput {
                expert_id: r.expert_id.clone(),
                expert_name: r.name.clone(),
                weight: r.weight,
                order: self.universe.order_items(&r.order),
            })
            .collect();

        for o in outcomes.iter() {
            info!(
                "{}: value {} with {} optimal rankings",
                o.criterion.key(),
                o.value,
                o.tie_count
            );
        }

        ConsensusResult {
            inputs,
            outcomes,
            expert_stats: reference_stats,
            permutations: self.state.visited(),
            execution_time: self.started.elapsed().as_secs_f64(),
        }
    }
}

impl Iterator for ConsensusStream {
    type Item = ConsensusEvent;

    fn next(&mut self) -> Option<ConsensusEvent> {
        match self.phase {
            Phase::Start => {
                self.phase = Phase::Begin;
                Some(ConsensusEvent::Start {
                    total: self.state.total(),
                })
            }
            Phase::Begin => {
                self.phase = Phase::Experts;
                Some(ConsensusEvent::Log {
                    message: format!(
                        "Starting exhaustive search over {} items ({} permutations)",
                        self.universe.len(),
                        self.state.total()
                    ),
                })
            }
            Phase::Experts => {
                self.phase = Phase::Searching;
                let mut message = format!("Experts contributing: {}", self.records.len());
                if !self.skipped.is_empty() {
                    message.push_str(&format!(
                        " (skipped without ranking: {})",
                        self.skipped.join(", ")
                    ));
                }
                Some(ConsensusEvent::Log { message })
            }
            Phase::Searching => {
                while self.state.step(&self.records) {
                    if let Some(event) = self.throttled_progress() {
                        return Some(event);
                    }
                }
                self.phase = Phase::Result;
                Some(ConsensusEvent::Log {
                    message: format!(
                        "Search finished in {:.3}s",
                        self.started.elapsed().as_secs_f64()
                    ),
                })
            }
            Phase::Result => {
                self.phase = Phase::Finished;
                Some(ConsensusEvent::Result(self.build_result()))
            }
            Phase::Finished => None,
        }
    }
}
