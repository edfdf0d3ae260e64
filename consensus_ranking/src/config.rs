// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::time::Duration;

/// The identifier of an item, as given by the item store.
pub type ItemId = u64;

/// An item that experts rank.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
}

impl Item {
    pub fn new(id: ItemId, name: &str) -> Item {
        Item {
            id,
            name: name.to_string(),
        }
    }
}

/// An expert and the history of the rankings this expert saved.
///
/// Rankings are stored oldest first: only the last one is used for a consensus run.
/// Each ranking lists item identifiers, most preferred first.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Expert {
    pub id: String,
    pub name: String,
    pub rankings: Vec<Vec<ItemId>>,
}

impl Expert {
    /// The most recently saved ranking, if this expert ever saved one.
    pub fn latest_ranking(&self) -> Option<&[ItemId]> {
        self.rankings.last().map(|r| r.as_slice())
    }
}

// ******** Output data structures *********

/// The four optimality criteria of the consensus search.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Criterion {
    /// Weighted sum of the rank distances (Cook median).
    SumRank,
    /// Largest rank distance to a single expert.
    MaxRank,
    /// Weighted sum of the Hamming distances (Kemeny median).
    SumHamming,
    /// Largest Hamming distance to a single expert (minimax).
    MaxHamming,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Criterion::SumRank,
        Criterion::MaxRank,
        Criterion::SumHamming,
        Criterion::MaxHamming,
    ];

    /// The key used in the serialized output.
    pub fn key(&self) -> &'static str {
        match self {
            Criterion::SumRank => "k1_rank",
            Criterion::MaxRank => "k2_rank",
            Criterion::SumHamming => "k1_hamming",
            Criterion::MaxHamming => "k2_hamming",
        }
    }

    /// True if the criterion aggregates rank distances, false for Hamming distances.
    pub fn uses_rank_distance(&self) -> bool {
        matches!(self, Criterion::SumRank | Criterion::MaxRank)
    }
}

/// How far one expert is from a given ranking, and the competence derived from it.
#[derive(PartialEq, Debug, Clone)]
pub struct ExpertStats {
    pub expert_id: String,
    pub expert_name: String,
    pub d_rank: u64,
    pub input_weight: f64,
    /// Normalized over all the experts, rounded to 4 decimal places.
    pub calculated_competence: f64,
}

/// One optimal ranking for a criterion.
#[derive(PartialEq, Debug, Clone)]
pub struct Solution {
    pub order: Vec<Item>,
    /// The distance of each expert to this ranking, in expert order.
    /// Rank distances for the rank criteria, Hamming distances otherwise.
    pub distances: Vec<u64>,
    /// The competence of each expert, computed against this ranking.
    pub expert_stats: Vec<ExpertStats>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct CriterionOutcome {
    pub criterion: Criterion,
    pub value: f64,
    /// All the retained optimal rankings, in enumeration order.
    pub solutions: Vec<Solution>,
    /// The number of optimal rankings found. It may exceed the number of
    /// solutions when the ties are capped.
    pub tie_count: u64,
}

/// The ranking of an expert as it entered the search.
#[derive(PartialEq, Debug, Clone)]
pub struct ExpertInput {
    pub expert_id: String,
    pub expert_name: String,
    pub weight: f64,
    pub order: Vec<Item>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ConsensusResult {
    pub inputs: Vec<ExpertInput>,
    /// One entry per criterion, in the order of `Criterion::ALL`.
    pub outcomes: Vec<CriterionOutcome>,
    /// Competence of the experts against the reference ranking: the first
    /// optimal ranking for the sum of rank distances.
    pub expert_stats: Vec<ExpertStats>,
    pub permutations: u64,
    /// Wall clock duration of the run, in seconds.
    pub execution_time: f64,
}

impl ConsensusResult {
    pub fn outcome(&self, criterion: Criterion) -> Option<&CriterionOutcome> {
        self.outcomes.iter().find(|o| o.criterion == criterion)
    }

    /// The ranking used as a reference for the competence of the experts.
    pub fn reference(&self) -> Option<&Solution> {
        self.outcome(Criterion::SumRank)
            .and_then(|o| o.solutions.first())
    }
}

/// The events produced by a consensus run, in order:
/// one `Start`, some `Log` and `Progress` events, then exactly one `Result`.
#[derive(PartialEq, Debug, Clone)]
pub enum ConsensusEvent {
    Start { total: u64 },
    Log { message: String },
    Progress { current: u64, total: u64, percent: f64 },
    Result(ConsensusResult),
}

/// Errors that prevent a consensus run from starting.
#[derive(PartialEq, Debug, Clone)]
pub enum ConsensusErrors {
    /// No expert has a stored ranking.
    NoExpertData,
    EmptyUniverse,
    DuplicateItem { id: ItemId },
    InvalidWeight { expert: String, weight: f64 },
    /// The number of permutations would not fit in 64 bits.
    UniverseTooLarge { size: usize },
}

impl Error for ConsensusErrors {}

impl Display for ConsensusErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsensusErrors::NoExpertData => write!(f, "No expert data available."),
            ConsensusErrors::EmptyUniverse => write!(f, "No items to rank."),
            ConsensusErrors::DuplicateItem { id } => {
                write!(f, "Item {} appears more than once", id)
            }
            ConsensusErrors::InvalidWeight { expert, weight } => {
                write!(f, "Invalid weight {} for expert {}", weight, expert)
            }
            ConsensusErrors::UniverseTooLarge { size } => {
                write!(f, "Cannot enumerate the permutations of {} items", size)
            }
        }
    }
}

// ********* Configuration **********

#[derive(PartialEq, Debug, Clone)]
pub struct ConsensusRules {
    /// If set, only the first items of the universe are ranked.
    pub max_items: Option<usize>,
    /// Progress is reported at most once every this many permutations.
    pub progress_every: u64,
    /// Minimum wall clock time between two progress reports.
    pub progress_min_interval: Duration,
    /// If set, the number of tied rankings kept for each criterion.
    /// Ties beyond this count are still counted.
    pub max_ties_per_criterion: Option<usize>,
}

impl ConsensusRules {
    pub const DEFAULT_RULES: ConsensusRules = ConsensusRules {
        max_items: None,
        progress_every: 2000,
        progress_min_interval: Duration::from_millis(200),
        max_ties_per_criterion: None,
    };
}

impl Default for ConsensusRules {
    fn default() -> Self {
        ConsensusRules::DEFAULT_RULES
    }
}
