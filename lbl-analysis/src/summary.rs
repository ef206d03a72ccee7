// Copyright (c) Facebook, Inc. and its affiliates.
use std::fmt::Write;

use lbl_analysis_intf::{AnalysisReport, FailureRecord, RunParams};
use lbl_util::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainClass {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for GainClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Presentation settings for the console summary. Built once and handed to
/// the formatting functions.
#[derive(Debug, Clone)]
pub struct SummaryStyle {
    /// Gains above this many efficiency points are high.
    pub high_gain: f64,
    /// Gains above this many efficiency points are medium.
    pub medium_gain: f64,
    pub optimal_mark: char,
    pub full_mark: char,
    pub missed_precision: usize,
}

impl Default for SummaryStyle {
    fn default() -> Self {
        Self {
            high_gain: 5.0,
            medium_gain: 2.0,
            optimal_mark: '>',
            full_mark: '*',
            missed_precision: 2,
        }
    }
}

impl SummaryStyle {
    pub fn classify_gain(&self, gain: f64) -> GainClass {
        if gain > self.high_gain {
            GainClass::High
        } else if gain > self.medium_gain {
            GainClass::Medium
        } else {
            GainClass::Low
        }
    }
}

/// Known run parameters as "key=value" strings, unknown ones are left out.
pub fn describe_params(params: &RunParams) -> Vec<String> {
    let mut parts = vec![];
    if let Some((min, max)) = params.items_per_box {
        parts.push(format!("mangoes/box={}-{}", min, max));
    }
    if let Some(v) = params.nr_boxes {
        parts.push(format!("boxes={}", v));
    }
    if let Some(v) = params.belt_speed {
        parts.push(format!("belt_speed={:.0}cm/s", v));
    }
    if let Some(v) = params.box_size {
        parts.push(format!("box_size={:.0}cm", v));
    }
    if let Some(v) = params.belt_length {
        parts.push(format!("belt_length={:.0}cm", v));
    }
    parts
}

fn format_records(out: &mut String, rep: &AnalysisReport, style: &SummaryStyle) {
    write!(
        out,
        "{}",
        underline(&format!(
            "  {:>6}  {:>6}  {:>6}  {:>6}  {:>10}  {:>6}  {:>6}  {}",
            "Robots", "Avg%", "Min%", "Max%", "Missed/box", "CE%", "Gain", "Class"
        ))
    )
    .unwrap();

    for (idx, rec) in rep.records.iter().enumerate() {
        let mark = if idx == rep.optimal {
            style.optimal_mark
        } else if rec.avg_eff >= rep.full.threshold {
            style.full_mark
        } else {
            ' '
        };
        let gain = rep.gains.get(idx).cloned().unwrap_or(0.0);
        writeln!(
            out,
            "{} {:>6}  {:>6.1}  {:>6.1}  {:>6.1}  {:>10.prec$}  {:>6.1}  {:>+6.1}  {}",
            mark,
            rec.nr_robots,
            rec.avg_eff,
            rec.min_eff,
            rec.max_eff,
            rec.avg_missed,
            rep.cost_eff.get(idx).cloned().unwrap_or(0.0),
            gain,
            style.classify_gain(gain),
            prec = style.missed_precision,
        )
        .unwrap();
    }
}

fn format_failures(out: &mut String, failures: &[FailureRecord]) {
    write!(
        out,
        "{}",
        underline(&format!(
            "  {:>7}  {:>9}  {:>6}  {:>11}  {:>7}  {:>6}",
            "P(fail)", "No-backup", "Eff%", "With-backup", "Backups", "Eff%"
        ))
    )
    .unwrap();

    for f in failures.iter() {
        writeln!(
            out,
            "  {:>7.2}  {:>9}  {:>6.1}  {:>11}  {:>7}  {:>6.1}",
            f.prob_failure,
            f.nr_robots_no_backup,
            f.eff_no_backup,
            f.nr_robots_with_backup,
            f.nr_backups,
            f.eff_with_backup
        )
        .unwrap();
    }
}

pub fn format_summary(rep: &AnalysisReport, style: &SummaryStyle) -> String {
    let mut out = String::new();

    writeln!(
        out,
        "[robot count analysis] {} - {}\n",
        &rep.source,
        format_unix_time(rep.analyzed_at)
    )
    .unwrap();

    if rep.params.is_empty() {
        writeln!(out, "Run parameters: unknown").unwrap();
    } else {
        writeln!(out, "Run parameters: {}", describe_params(&rep.params).join(" ")).unwrap();
    }
    match rep.robot_range() {
        Some((min, max)) => writeln!(
            out,
            "Configurations: {} ({}-{} robots)\n",
            rep.records.len(),
            min,
            max
        )
        .unwrap(),
        None => {
            writeln!(out, "Configurations: none").unwrap();
            return out;
        }
    }

    format_records(&mut out, rep, style);

    let opt = rep.optimal_record();
    write!(
        out,
        "\n{}",
        double_underline(&format!("Cost-effective optimum: {} robots", opt.nr_robots))
    )
    .unwrap();
    writeln!(out, "  Efficiency: {}", format_pct_val(opt.avg_eff)).unwrap();
    writeln!(
        out,
        "  Missed per box: {:.prec$}",
        opt.avg_missed,
        prec = style.missed_precision
    )
    .unwrap();
    writeln!(
        out,
        "  Cost-effectiveness index: {}",
        format_pct_val(rep.cost_eff.get(rep.optimal).cloned().unwrap_or(0.0))
    )
    .unwrap();

    for (name, c) in [("Efficiency target", &rep.target), ("Full efficiency", &rep.full)].iter() {
        if c.reached {
            writeln!(
                out,
                "{} {}: {} robots ({})",
                name,
                format_pct_val(c.threshold),
                c.nr_robots,
                format_pct_val(c.eff)
            )
            .unwrap();
        } else {
            writeln!(
                out,
                "{} {}: not reached, best is {} robots ({})",
                name,
                format_pct_val(c.threshold),
                c.nr_robots,
                format_pct_val(c.eff)
            )
            .unwrap();
        }
    }

    if let Some(extra) = rep.extra_robots_for_full() {
        writeln!(out, "  Robots on top of the optimum for full efficiency: {}", extra).unwrap();
    }
    if let Some((from, to)) = rep.recommended {
        writeln!(out, "Recommended zone: {}-{} robots", from, to).unwrap();
    }
    if rep.inconsistent.len() > 0 {
        writeln!(
            out,
            "Inconsistent efficiencies in records: {}",
            rep.inconsistent
                .iter()
                .map(|idx| format!("{} ({} robots)", idx, rep.records[*idx].nr_robots))
                .collect::<Vec<String>>()
                .join(", ")
        )
        .unwrap();
    }

    if let Some(failures) = rep.failures.as_ref() {
        writeln!(out, "\nFailure injection ({} probabilities)\n", failures.len()).unwrap();
        format_failures(&mut out, failures);
    }

    out
}
