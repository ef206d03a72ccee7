// Copyright (c) Facebook, Inc. and its affiliates.
//
// Pick the operating point from the per robot count records. All the
// functions take the records as loaded and return freshly computed values.
//
use log::{debug, warn};
use std::collections::BTreeMap;

use super::error::{AnalysisError, Result};
use lbl_analysis_intf::{AnalysisReport, ConfigRecord, Crossing, RunParams};
use lbl_util::*;

/// Records after the optimum included in the recommended zone.
const RECOMMENDED_SPAN: usize = 2;

fn check_robot_counts(records: &[ConfigRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    for (idx, rec) in records.iter().enumerate() {
        if rec.nr_robots <= 0 {
            return Err(AnalysisError::Domain {
                idx,
                nr_robots: rec.nr_robots,
            });
        }
    }
    Ok(())
}

/// Average efficiency per robot, normalized so that the best record scores
/// 100. If no record has positive efficiency per robot, all indices are 0.
pub fn cost_effectiveness(records: &[ConfigRecord]) -> Result<Vec<f64>> {
    check_robot_counts(records)?;

    let raw: Vec<f64> = records
        .iter()
        .map(|rec| rec.avg_eff / rec.nr_robots as f64)
        .collect();
    let max = raw.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    if !max.is_finite() || max <= 0.0 {
        warn!(
            "optimize: max efficiency per robot is {}, can't normalize cost-effectiveness",
            max
        );
        return Ok(vec![0.0; raw.len()]);
    }

    Ok(raw.into_iter().map(|v| v / max * TO_PCT).collect())
}

/// The first record, in the given order, whose average efficiency is at
/// least `threshold`. If none qualifies, the last record is returned with
/// `reached` cleared so that callers can still report the closest
/// configuration.
pub fn find_threshold_crossing(records: &[ConfigRecord], threshold: f64) -> Result<Crossing> {
    let last = records.len().checked_sub(1).ok_or(AnalysisError::EmptyInput)?;
    let (idx, reached) = match records.iter().position(|r| r.avg_eff >= threshold) {
        Some(idx) => (idx, true),
        None => (last, false),
    };

    Ok(Crossing {
        threshold,
        idx,
        nr_robots: records[idx].nr_robots,
        eff: records[idx].avg_eff,
        reached,
    })
}

/// Index of the most cost-effective record. On ties the earliest record
/// wins.
pub fn find_optimal(records: &[ConfigRecord]) -> Result<usize> {
    let ce = cost_effectiveness(records)?;
    Ok(optimal_of(&ce))
}

fn optimal_of(ce: &[f64]) -> usize {
    let mut best = 0;
    for idx in 1..ce.len() {
        let (cur, top) = (ce[idx], ce[best]);
        if cur.is_nan() {
            continue;
        }
        if top.is_nan() || cur > top {
            best = idx;
        }
    }
    best
}

/// Efficiency added by each record over the previous one. The first record
/// is measured against a zero robot baseline.
pub fn incremental_gain(records: &[ConfigRecord]) -> Vec<f64> {
    let mut prev = 0.0;
    records
        .iter()
        .map(|rec| {
            let gain = rec.avg_eff - prev;
            prev = rec.avg_eff;
            gain
        })
        .collect()
}

/// Robot count range from the optimum to a couple records past it. `None`
/// if the optimum is the last record.
pub fn recommended_zone(records: &[ConfigRecord], optimal: usize) -> Option<(i32, i32)> {
    if optimal + 1 >= records.len() {
        return None;
    }
    let end = (optimal + RECOMMENDED_SPAN).min(records.len() - 1);
    Some((records[optimal].nr_robots, records[end].nr_robots))
}

pub fn inconsistent_records(records: &[ConfigRecord]) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, rec)| !rec.is_consistent())
        .map(|(idx, _)| idx)
        .collect()
}

/// Robot counts which appear more than once.
pub fn duplicate_robot_counts(records: &[ConfigRecord]) -> Vec<i32> {
    let mut counts = BTreeMap::<i32, usize>::new();
    for rec in records.iter() {
        *counts.entry(rec.nr_robots).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|(_, cnt)| *cnt > 1)
        .map(|(nr, _)| nr)
        .collect()
}

/// Run the whole analysis. `target` and `full` are the efficiency
/// thresholds in percents, e.g. 95.0 and 99.9.
pub fn analyze(
    records: Vec<ConfigRecord>,
    params: RunParams,
    target: f64,
    full: f64,
) -> Result<AnalysisReport> {
    let cost_eff = cost_effectiveness(&records)?;
    let optimal = optimal_of(&cost_eff);
    let target = find_threshold_crossing(&records, target)?;
    let full = find_threshold_crossing(&records, full)?;

    let dups = duplicate_robot_counts(&records);
    if dups.len() > 0 {
        warn!(
            "optimize: robot counts {:?} appear more than once, analyzing them as separate records",
            &dups
        );
    }

    let inconsistent = inconsistent_records(&records);
    for &idx in inconsistent.iter() {
        warn!(
            "optimize: record {} ({} robots) has inconsistent efficiencies avg={} min={} max={}",
            idx,
            records[idx].nr_robots,
            records[idx].avg_eff,
            records[idx].min_eff,
            records[idx].max_eff
        );
    }

    debug!(
        "optimize: optimal={} target={:?} full={:?}",
        optimal, &target, &full
    );

    Ok(AnalysisReport {
        gains: incremental_gain(&records),
        recommended: recommended_zone(&records, optimal),
        params,
        cost_eff,
        optimal,
        target,
        full,
        inconsistent,
        records,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::super::error::AnalysisError;
    use lbl_analysis_intf::{ConfigRecord, RunParams};

    fn rec(nr_robots: i32, avg: f64, min: f64, max: f64, missed: f64) -> ConfigRecord {
        ConfigRecord {
            nr_robots,
            avg_eff: avg,
            min_eff: min,
            max_eff: max,
            avg_missed: missed,
        }
    }

    fn sample() -> Vec<ConfigRecord> {
        vec![
            rec(1, 40.0, 35.0, 45.0, 10.0),
            rec(2, 70.0, 65.0, 75.0, 4.0),
            rec(3, 90.0, 85.0, 95.0, 1.0),
            rec(4, 98.0, 96.0, 99.0, 0.2),
            rec(5, 100.0, 100.0, 100.0, 0.0),
        ]
    }

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-9, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_sample_scenario() {
        let _ = ::env_logger::try_init();
        let records = sample();

        assert_close(
            &super::cost_effectiveness(&records).unwrap(),
            &[100.0, 87.5, 75.0, 61.25, 50.0],
        );
        assert_eq!(super::find_optimal(&records).unwrap(), 0);

        let c95 = super::find_threshold_crossing(&records, 95.0).unwrap();
        assert_eq!((c95.idx, c95.nr_robots, c95.eff, c95.reached), (3, 4, 98.0, true));

        let c100 = super::find_threshold_crossing(&records, 99.9).unwrap();
        assert_eq!((c100.idx, c100.nr_robots, c100.eff, c100.reached), (4, 5, 100.0, true));
    }

    #[test]
    fn test_normalization_peak() {
        let _ = ::env_logger::try_init();
        for records in &[
            sample(),
            vec![rec(3, 91.3, 90.0, 92.0, 1.0)],
            vec![rec(7, 12.5, 10.0, 15.0, 8.0), rec(2, 33.3, 30.0, 35.0, 3.0)],
        ] {
            let ce = super::cost_effectiveness(records).unwrap();
            let max = ce.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            assert!((max - 100.0).abs() < 1e-9);
            assert!(ce.iter().all(|v| *v <= 100.0));
        }
    }

    #[test]
    fn test_zero_efficiency() {
        let _ = ::env_logger::try_init();
        let records = vec![rec(1, 0.0, 0.0, 0.0, 10.0), rec(2, 0.0, 0.0, 0.0, 10.0)];
        assert_eq!(super::cost_effectiveness(&records).unwrap(), vec![0.0, 0.0]);
        assert_eq!(super::find_optimal(&records).unwrap(), 0);

        let rep = super::analyze(records, RunParams::default(), 95.0, 99.9).unwrap();
        assert_eq!((rep.optimal, rep.cost_eff.clone()), (0, vec![0.0, 0.0]));
    }

    #[test]
    fn test_threshold_not_reached() {
        let _ = ::env_logger::try_init();
        let records = &sample()[..3];
        let c = super::find_threshold_crossing(records, 95.0).unwrap();
        assert_eq!((c.idx, c.nr_robots, c.eff, c.reached), (2, 3, 90.0, false));
    }

    #[test]
    fn test_threshold_first_match_wins() {
        let _ = ::env_logger::try_init();
        let records = vec![
            rec(2, 95.0, 90.0, 97.0, 0.5),
            rec(1, 95.0, 90.0, 97.0, 0.5),
            rec(3, 99.0, 98.0, 100.0, 0.1),
        ];
        let c = super::find_threshold_crossing(&records, 95.0).unwrap();
        assert_eq!((c.idx, c.nr_robots), (0, 2));
    }

    #[test]
    fn test_threshold_monotonic() {
        let _ = ::env_logger::try_init();
        let records = vec![
            rec(1, 30.0, 25.0, 35.0, 12.0),
            rec(2, 60.0, 55.0, 65.0, 6.0),
            rec(3, 85.0, 80.0, 90.0, 2.0),
            rec(4, 95.0, 94.0, 96.0, 0.7),
            rec(5, 99.2, 98.0, 100.0, 0.1),
            rec(6, 99.95, 99.9, 100.0, 0.0),
        ];
        let mut last = 0;
        for threshold in &[20.0, 50.0, 95.0, 99.0, 99.9, 100.0] {
            let c = super::find_threshold_crossing(&records, *threshold).unwrap();
            assert!(c.idx >= last, "threshold {} went backwards", threshold);
            last = c.idx;
        }
        let c95 = super::find_threshold_crossing(&records, 95.0).unwrap();
        let c999 = super::find_threshold_crossing(&records, 99.9).unwrap();
        assert!(c95.idx <= c999.idx);
    }

    #[test]
    fn test_optimal_tie_break() {
        let _ = ::env_logger::try_init();
        // 2 robots at 50% and 4 robots at 100% are equally cost-effective.
        let records = vec![rec(2, 50.0, 45.0, 55.0, 5.0), rec(4, 100.0, 100.0, 100.0, 0.0)];
        assert_eq!(super::find_optimal(&records).unwrap(), 0);

        // File order decides, not the robot count.
        let records = vec![rec(4, 100.0, 100.0, 100.0, 0.0), rec(2, 50.0, 45.0, 55.0, 5.0)];
        assert_eq!(super::find_optimal(&records).unwrap(), 0);

        let rep = super::analyze(records, RunParams::default(), 95.0, 99.9).unwrap();
        assert_eq!(rep.optimal, 0);
        assert_eq!(rep.cost_eff, vec![100.0, 100.0]);
    }

    #[test]
    fn test_domain_error() {
        let _ = ::env_logger::try_init();
        let mut records = sample();
        records[2].nr_robots = 0;
        match super::cost_effectiveness(&records) {
            Err(AnalysisError::Domain { idx, nr_robots }) => assert_eq!((idx, nr_robots), (2, 0)),
            v => panic!("unexpected {:?}", v),
        }
        records[2].nr_robots = -3;
        assert!(matches!(
            super::find_optimal(&records),
            Err(AnalysisError::Domain { idx: 2, nr_robots: -3 })
        ));
    }

    #[test]
    fn test_empty_input() {
        let _ = ::env_logger::try_init();
        assert!(matches!(super::cost_effectiveness(&[]), Err(AnalysisError::EmptyInput)));
        assert!(matches!(super::find_optimal(&[]), Err(AnalysisError::EmptyInput)));
        assert!(matches!(
            super::find_threshold_crossing(&[], 95.0),
            Err(AnalysisError::EmptyInput)
        ));
        assert!(super::incremental_gain(&[]).is_empty());
        assert!(matches!(
            super::analyze(vec![], RunParams::default(), 95.0, 99.9),
            Err(AnalysisError::EmptyInput)
        ));
    }

    #[test]
    fn test_incremental_gain() {
        let _ = ::env_logger::try_init();
        assert_close(
            &super::incremental_gain(&sample()),
            &[40.0, 30.0, 20.0, 8.0, 2.0],
        );
    }

    #[test]
    fn test_recommended_zone() {
        let _ = ::env_logger::try_init();
        let records = sample();
        assert_eq!(super::recommended_zone(&records, 0), Some((1, 3)));
        assert_eq!(super::recommended_zone(&records, 3), Some((4, 5)));
        assert_eq!(super::recommended_zone(&records, 4), None);
    }

    #[test]
    fn test_inconsistent_records_dont_abort() {
        let _ = ::env_logger::try_init();
        let records = vec![
            rec(1, 40.0, 45.0, 35.0, 10.0),
            rec(2, 70.0, 65.0, 75.0, 4.0),
            rec(3, 105.0, 85.0, 110.0, 1.0),
            rec(2, 72.0, 65.0, 75.0, 4.0),
        ];
        assert_eq!(super::inconsistent_records(&records), vec![0, 2]);
        assert_eq!(super::duplicate_robot_counts(&records), vec![2]);

        let rep = super::analyze(records, RunParams::default(), 95.0, 99.9).unwrap();
        assert_eq!(rep.inconsistent, vec![0, 2]);
        assert_eq!(rep.records.len(), 4);
        assert_eq!(rep.optimal, 0);
        assert_eq!(rep.target.idx, 2);
    }

    #[test]
    fn test_analyze() {
        let _ = ::env_logger::try_init();
        let params = RunParams {
            belt_speed: Some(50.0),
            ..Default::default()
        };
        let rep = super::analyze(sample(), params.clone(), 95.0, 99.9).unwrap();

        assert_eq!(rep.records, sample());
        assert_eq!(rep.params, params);
        assert_eq!(rep.optimal, 0);
        assert_eq!(rep.target.nr_robots, 4);
        assert_eq!(rep.full.nr_robots, 5);
        assert_eq!(rep.recommended, Some((1, 3)));
        assert_eq!(rep.extra_robots_for_full(), Some(4));
        assert!(rep.inconsistent.is_empty());
        assert_close(&rep.gains, &[40.0, 30.0, 20.0, 8.0, 2.0]);
        assert!(rep.failures.is_none());
    }
}
