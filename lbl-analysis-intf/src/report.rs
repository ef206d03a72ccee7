// Copyright (c) Facebook, Inc. and its affiliates.
use serde::{Deserialize, Serialize};

use super::{ConfigRecord, FailureRecord, RunParams};
use lbl_util::*;

const REPORT_DOC: &str = "\
//
// Labeling line robot count analysis result
//
// records: Configurations in the order they were analyzed
// cost_eff: Cost-effectiveness index per record, avg_eff / nr_robots
//           normalized so that the best configuration scores 100
// gains: Efficiency gained by each record over the previous one, the first
//        record is compared against zero robots
// optimal: Index of the most cost-effective record
// target, full: First record reaching the threshold, the last record if
//               none does (reached is false then)
// recommended: Robot count range worth considering, absent if the optimum
//              is already the last record
// inconsistent: Records whose min/avg/max efficiencies are out of order
//               or outside [0, 100]
// failures: Failure injection study, absent if there was no data
//
";

/// First record whose average efficiency meets `threshold`. When no record
/// does, the last record is reported with `reached` cleared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Crossing {
    pub threshold: f64,
    pub idx: usize,
    pub nr_robots: i32,
    pub eff: f64,
    pub reached: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisReport {
    pub analyzed_at: u64,
    pub source: String,
    pub params: RunParams,
    pub records: Vec<ConfigRecord>,
    pub cost_eff: Vec<f64>,
    pub gains: Vec<f64>,
    pub optimal: usize,
    pub target: Crossing,
    pub full: Crossing,
    pub recommended: Option<(i32, i32)>,
    pub inconsistent: Vec<usize>,
    pub failures: Option<Vec<FailureRecord>>,
}

impl AnalysisReport {
    pub fn optimal_record(&self) -> &ConfigRecord {
        &self.records[self.optimal]
    }

    /// How many robots on top of the optimum are needed to actually reach
    /// full efficiency. `None` if no configuration reached it.
    pub fn extra_robots_for_full(&self) -> Option<i32> {
        if self.full.reached {
            Some(self.full.nr_robots - self.optimal_record().nr_robots)
        } else {
            None
        }
    }

    pub fn robot_range(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().map(|r| r.nr_robots).min()?;
        let max = self.records.iter().map(|r| r.nr_robots).max()?;
        Some((min, max))
    }
}

impl JsonLoad for AnalysisReport {}

impl JsonSave for AnalysisReport {
    fn preamble() -> Option<String> {
        Some(REPORT_DOC.to_string())
    }
}
