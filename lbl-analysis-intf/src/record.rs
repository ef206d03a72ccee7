// Copyright (c) Facebook, Inc. and its affiliates.
use serde::{Deserialize, Serialize};

/// One simulated configuration, i.e. the results of running the labeling
/// line with a fixed number of robots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub nr_robots: i32,
    pub avg_eff: f64,
    pub min_eff: f64,
    pub max_eff: f64,
    /// Average number of mangoes left unlabeled per box.
    pub avg_missed: f64,
}

impl ConfigRecord {
    /// Efficiencies are percents and min <= avg <= max should hold. The
    /// loader doesn't enforce it, the result is only used for reporting.
    pub fn is_consistent(&self) -> bool {
        let in_range = |v: f64| v >= 0.0 && v <= 100.0;
        in_range(self.min_eff)
            && in_range(self.avg_eff)
            && in_range(self.max_eff)
            && self.min_eff <= self.avg_eff
            && self.avg_eff <= self.max_eff
            && self.avg_missed >= 0.0
    }
}

/// Simulation parameters recovered from the comment header. Every field is
/// optional and `None` means unknown.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParams {
    /// Belt speed in cm/s ("X").
    pub belt_speed: Option<f64>,
    /// Box size in cm ("Z").
    pub box_size: Option<f64>,
    /// Belt length in cm ("W").
    pub belt_length: Option<f64>,
    /// Mangoes per box as (min, max) ("N").
    pub items_per_box: Option<(u32, u32)>,
    /// Number of simulated boxes ("Cajas").
    pub nr_boxes: Option<u32>,
}

impl RunParams {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One line of the failure injection study. For each failure probability,
/// the best robot count found without and with backup robots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub prob_failure: f64,
    pub nr_robots_no_backup: i32,
    pub eff_no_backup: f64,
    pub nr_robots_with_backup: i32,
    pub nr_backups: i32,
    pub eff_with_backup: f64,
}
