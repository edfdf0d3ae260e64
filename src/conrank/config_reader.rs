use crate::conrank::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::time::Duration;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "runName")]
    pub run_name: String,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ItemEntry {
    pub id: u64,
    pub name: String,
    pub details: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ExpertEntry {
    // Either a number or a string
    #[serde(rename = "id")]
    _id: JSValue,
    pub name: String,
    #[serde(default)]
    pub rankings: Vec<Vec<u64>>,
}

impl ExpertEntry {
    pub fn id(&self) -> ConResult<String> {
        read_js_string(&self._id)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesEntry {
    #[serde(rename = "limitObjects")]
    pub limit_objects: Option<usize>,
    #[serde(rename = "progressEvery")]
    pub progress_every: Option<u64>,
    #[serde(rename = "progressIntervalMs")]
    pub progress_interval_ms: Option<u64>,
    #[serde(rename = "maxTiesPerCriterion")]
    pub max_ties_per_criterion: Option<usize>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub items: Vec<ItemEntry>,
    pub experts: Vec<ExpertEntry>,
    #[serde(default)]
    pub weights: HashMap<String, f64>,
    #[serde(default)]
    pub rules: RulesEntry,
}

impl ConsensusConfig {
    pub fn items(&self) -> Vec<Item> {
        self.items
            .iter()
            .map(|ie| Item::new(ie.id, &ie.name))
            .collect()
    }

    pub fn experts(&self) -> ConResult<Vec<Expert>> {
        let mut res: Vec<Expert> = Vec::new();
        for ee in self.experts.iter() {
            res.push(Expert {
                id: ee.id()?,
                name: ee.name.clone(),
                rankings: ee.rankings.clone(),
            });
        }
        Ok(res)
    }
}

pub fn read_config(path: &str) -> ConResult<ConsensusConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ConsensusConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: String) -> ConResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Builds the rules of the run. The limit given on the command line takes precedence.
pub fn validate_rules(rules: &RulesEntry, limit: Option<usize>) -> ConResult<ConsensusRules> {
    let defaults = ConsensusRules::DEFAULT_RULES;
    let res = ConsensusRules {
        max_items: match limit.or(rules.limit_objects) {
            Some(0) => whatever!("limitObjects must be at least 1"),
            x => x,
        },
        progress_every: match rules.progress_every {
            Some(0) => whatever!("progressEvery must be at least 1"),
            Some(x) => x,
            None => defaults.progress_every,
        },
        progress_min_interval: rules
            .progress_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.progress_min_interval),
        max_ties_per_criterion: match rules.max_ties_per_criterion {
            Some(0) => whatever!("maxTiesPerCriterion must be at least 1"),
            x => x,
        },
    };
    Ok(res)
}

fn read_js_string(x: &JSValue) -> ConResult<String> {
    match x {
        JSValue::String(s) => Ok(s.clone()),
        JSValue::Number(n) if n.is_u64() || n.is_i64() => Ok(n.to_string()),
        _ => whatever!("Cannot use {} as an expert id", x),
    }
}
