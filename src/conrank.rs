use log::{debug, info, warn};

use consensus_ranking::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;
use std::io::Write;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod config_reader;
mod matrix;

use crate::conrank::config_reader::*;

#[derive(Debug, Snafu)]
pub enum ConrankError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Cannot understand weight {spec:?}: expected expert_id=weight"))]
    InvalidWeightOverride { spec: String },
    #[snafu(display("Consensus error: {source}"))]
    Consensus { source: ConsensusErrors },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ConResult<T> = Result<T, ConrankError>;

/// Settings given on the command line, that take precedence over the configuration file.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Overrides {
    pub out: Option<String>,
    pub limit: Option<usize>,
    /// As expert_id=weight
    pub weights: Vec<String>,
    pub matrices: Option<String>,
}

fn item_to_json(item: &Item) -> JSValue {
    json!({"id": item.id, "name": item.name})
}

fn expert_stats_to_json(stats: &[ExpertStats]) -> Vec<JSValue> {
    stats
        .iter()
        .map(|es| {
            json!({
                "expert_id": es.expert_id,
                "expert_name": es.expert_name,
                "d_rank": es.d_rank,
                "input_weight": es.input_weight,
                "calculated_competence": es.calculated_competence,
            })
        })
        .collect()
}

fn solution_to_json(s: &Solution) -> JSValue {
    let order: Vec<JSValue> = s.order.iter().map(item_to_json).collect();
    json!({
        "order": order,
        "distances": s.distances,
        "expert_stats": expert_stats_to_json(&s.expert_stats),
    })
}

/// Everything in the result that does not depend on the machine.
fn summary_to_json(rs: &ConsensusResult) -> JSValue {
    let inputs: Vec<JSValue> = rs
        .inputs
        .iter()
        .map(|ei| {
            let order: Vec<JSValue> = ei.order.iter().map(item_to_json).collect();
            json!({
                "expert_id": ei.expert_id,
                "expert_name": ei.expert_name,
                "weight": ei.weight,
                "order": order,
            })
        })
        .collect();

    let mut rankings: JSMap<String, JSValue> = JSMap::new();
    let mut criteria: JSMap<String, JSValue> = JSMap::new();
    let mut tie_counts: JSMap<String, JSValue> = JSMap::new();
    for outcome in rs.outcomes.iter() {
        let key = outcome.criterion.key().to_string();
        let solutions: Vec<JSValue> = outcome.solutions.iter().map(solution_to_json).collect();
        rankings.insert(key.clone(), JSValue::Array(solutions));
        criteria.insert(key.clone(), json!(outcome.value));
        tie_counts.insert(key, json!(outcome.tie_count));
    }

    json!({
        "inputs": inputs,
        "rankings": rankings,
        "criteria": criteria,
        "tie_counts": tie_counts,
        "expert_stats": expert_stats_to_json(&rs.expert_stats),
        "permutations": rs.permutations,
    })
}

pub fn event_to_json(event: &ConsensusEvent) -> JSValue {
    match event {
        ConsensusEvent::Start { total } => json!({"type": "start", "total": total}),
        ConsensusEvent::Log { message } => json!({"type": "log", "message": message}),
        ConsensusEvent::Progress {
            current,
            total,
            percent,
        } => json!({"type": "progress", "current": current, "total": total, "percent": percent}),
        ConsensusEvent::Result(rs) => {
            let mut js = summary_to_json(rs);
            js["type"] = json!("result");
            js["execution_time"] = json!(rs.execution_time);
            js
        }
    }
}

fn parse_weight_overrides(specs: &[String]) -> ConResult<HashMap<String, f64>> {
    let mut res: HashMap<String, f64> = HashMap::new();
    for spec in specs.iter() {
        let (id, value) = spec
            .split_once('=')
            .context(InvalidWeightOverrideSnafu { spec: spec.clone() })?;
        let weight = value
            .trim()
            .parse::<f64>()
            .ok()
            .context(InvalidWeightOverrideSnafu { spec: spec.clone() })?;
        res.insert(id.trim().to_string(), weight);
    }
    Ok(res)
}

fn open_output(path: &str) -> ConResult<Box<dyn Write>> {
    match path {
        "" | "stdout" => Ok(Box::new(std::io::stdout())),
        p => {
            let f = fs::File::create(p).context(WritingOutputSnafu { path: p })?;
            Ok(Box::new(std::io::BufWriter::new(f)))
        }
    }
}

fn check_reference(summary_path: String, summary: &JSValue) -> ConResult<()> {
    let summary_ref = read_summary(summary_path)?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    let pretty_js_summary = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_summary {
        warn!("Found differences with the reference summary");
        print_diff(
            pretty_js_summary_ref.as_str(),
            pretty_js_summary.as_ref(),
            "\n",
        );
        return ReferenceMismatchSnafu {}.fail();
    }
    Ok(())
}

pub fn run_consensus_file(
    config_path: String,
    check_summary_path: Option<String>,
    overrides: &Overrides,
) -> ConResult<()> {
    let config = read_config(&config_path)?;
    info!("Run: {}", config.output_settings.run_name);

    let rules = validate_rules(&config.rules, overrides.limit)?;
    let items = config.items();
    let experts = config.experts()?;
    let mut weights = config.weights.clone();
    weights.extend(parse_weight_overrides(&overrides.weights)?);

    let stream = run_consensus(&items, &experts, &weights, &rules).context(ConsensusSnafu {})?;

    if let Some(matrices_path) = overrides.matrices.as_deref() {
        matrix::write_matrices(matrices_path, stream.universe(), stream.records())?;
    }

    let out_path = overrides
        .out
        .clone()
        .or_else(|| config.output_settings.output_path.clone())
        .unwrap_or_else(|| "stdout".to_string());
    let mut out = open_output(&out_path)?;

    let mut summary: Option<JSValue> = None;
    for event in stream {
        match &event {
            ConsensusEvent::Log { message } => info!("{}", message),
            ConsensusEvent::Progress {
                current, percent, ..
            } => debug!("progress: {} ({}%)", current, percent),
            ConsensusEvent::Result(rs) => summary = Some(summary_to_json(rs)),
            ConsensusEvent::Start { .. } => {}
        }
        let line = serde_json::to_string(&event_to_json(&event)).context(ParsingJsonSnafu {})?;
        writeln!(out, "{}", line).context(WritingOutputSnafu {
            path: out_path.clone(),
        })?;
        out.flush().context(WritingOutputSnafu {
            path: out_path.clone(),
        })?;
    }

    let summary = match summary {
        Some(x) => x,
        None => whatever!("The run ended without a result"),
    };

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        check_reference(summary_p, &summary)?;
    }

    Ok(())
}

#[cfg(test)]
fn run_consensus_test(test_name: &str, config_lpath: &str, summary_lpath: &str) -> ConResult<()> {
    let test_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data");
    info!("Running test {}", test_name);
    run_consensus_file(
        format!("{}/{}/{}", test_dir, test_name, config_lpath),
        Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
        &Overrides::default(),
    )
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    let res = run_consensus_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    );
    if let Err(e) = res {
        panic!("An error occurred in test {}: {}", test_name, e);
    }
}
