// Copyright (c) Facebook, Inc. and its affiliates.
use log::{debug, warn};
use regex::{Captures, Regex};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use super::error::{AnalysisError, Result};
use lbl_analysis_intf::{ConfigRecord, FailureRecord, RunParams};

const COMMENT_MARKER: char = '#';
const CONFIG_NR_FIELDS: usize = 5;
const FAILURE_NR_FIELDS: usize = 6;

/// Recognizes one `KEY=value` header token. Extractors are independent of
/// each other and a comment line without the token is simply ignored.
struct ParamExtractor {
    key: &'static str,
    re: Regex,
    apply: fn(&mut RunParams, &Captures) -> bool,
}

impl ParamExtractor {
    fn new(key: &'static str, pattern: &str, apply: fn(&mut RunParams, &Captures) -> bool) -> Self {
        Self {
            key,
            re: Regex::new(pattern).unwrap(),
            apply,
        }
    }
}

fn cap_pos_f64(caps: &Captures, idx: usize) -> Option<f64> {
    caps.get(idx)?
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn cap_pos_u32(caps: &Captures, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse::<u32>().ok().filter(|v| *v > 0)
}

fn update<T>(field: &mut Option<T>, val: Option<T>) -> bool {
    match val {
        Some(v) => {
            *field = Some(v);
            true
        }
        None => false,
    }
}

fn apply_belt_speed(p: &mut RunParams, c: &Captures) -> bool {
    update(&mut p.belt_speed, cap_pos_f64(c, 1))
}

fn apply_box_size(p: &mut RunParams, c: &Captures) -> bool {
    update(&mut p.box_size, cap_pos_f64(c, 1))
}

fn apply_belt_length(p: &mut RunParams, c: &Captures) -> bool {
    update(&mut p.belt_length, cap_pos_f64(c, 1))
}

fn apply_items_per_box(p: &mut RunParams, c: &Captures) -> bool {
    let range = match (cap_pos_u32(c, 1), cap_pos_u32(c, 2)) {
        (Some(min), Some(max)) if min <= max => Some((min, max)),
        _ => None,
    };
    update(&mut p.items_per_box, range)
}

fn apply_nr_boxes(p: &mut RunParams, c: &Captures) -> bool {
    update(&mut p.nr_boxes, cap_pos_u32(c, 1))
}

lazy_static::lazy_static! {
    static ref PARAM_EXTRACTORS: Vec<ParamExtractor> = vec![
        ParamExtractor::new("X", r"\bX=(\d+\.?\d*)", apply_belt_speed),
        ParamExtractor::new("Z", r"\bZ=(\d+\.?\d*)", apply_box_size),
        ParamExtractor::new("W", r"\bW=(\d+\.?\d*)", apply_belt_length),
        ParamExtractor::new("N", r"\bN=(\d+)-(\d+)", apply_items_per_box),
        ParamExtractor::new("Cajas", r"\bCajas=(\d+)", apply_nr_boxes),
    ];
}

fn parse_header(line: &str, params: &mut RunParams) {
    for ext in PARAM_EXTRACTORS.iter() {
        if let Some(caps) = ext.re.captures(line) {
            if (ext.apply)(params, &caps) {
                debug!("loader: header parameter {}", &caps[0]);
            } else {
                warn!(
                    "loader: ignoring invalid header parameter {} ({:?})",
                    ext.key, &caps[0]
                );
            }
        }
    }
}

enum Line<'a> {
    Blank,
    Comment(&'a str),
    Short(usize),
    Fields(Vec<&'a str>),
}

fn classify_line(line: &str, min_fields: usize) -> Line<'_> {
    let line = line.trim();
    if line.starts_with(COMMENT_MARKER) {
        return Line::Comment(line);
    }
    if line.is_empty() {
        return Line::Blank;
    }
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < min_fields {
        Line::Short(fields.len())
    } else {
        Line::Fields(fields)
    }
}

/// Short lines are tolerated but a field which can't be converted in a
/// line long enough to be a record fails the whole load.
fn parse_field<T: FromStr>(path: &Path, line: usize, field: &'static str, value: &str) -> Result<T> {
    value
        .parse::<T>()
        .map_err(|_| AnalysisError::MalformedRecord {
            path: path.to_owned(),
            line,
            field,
            value: value.to_string(),
        })
}

fn read_data_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| AnalysisError::from_io(path.to_owned(), e))
}

/// Parse robot analysis data. `path` is only used for error reporting.
pub fn parse_records(buf: &str, path: &Path) -> Result<(Vec<ConfigRecord>, RunParams)> {
    let mut records = vec![];
    let mut params = RunParams::default();

    for (idx, line) in buf.trim_start_matches('\u{feff}').lines().enumerate() {
        let lineno = idx + 1;
        match classify_line(line, CONFIG_NR_FIELDS) {
            Line::Blank => {}
            Line::Comment(line) => parse_header(line, &mut params),
            Line::Short(nr) => debug!("loader: {:?}:{}: skipping line with {} fields", path, lineno, nr),
            Line::Fields(f) => records.push(ConfigRecord {
                nr_robots: parse_field(path, lineno, "robot count", f[0])?,
                avg_eff: parse_field(path, lineno, "average efficiency", f[1])?,
                min_eff: parse_field(path, lineno, "minimum efficiency", f[2])?,
                max_eff: parse_field(path, lineno, "maximum efficiency", f[3])?,
                avg_missed: parse_field(path, lineno, "missed per box", f[4])?,
            }),
        }
    }

    Ok((records, params))
}

/// Load the robot analysis file produced by the simulator. The whole file
/// is read before parsing.
pub fn load<P: AsRef<Path>>(path_in: P) -> Result<(Vec<ConfigRecord>, RunParams)> {
    let path = path_in.as_ref();
    let buf = read_data_file(path)?;
    let (records, params) = parse_records(&buf, path)?;
    debug!(
        "loader: {:?}: {} records, params={:?}",
        path,
        records.len(),
        &params
    );
    Ok((records, params))
}

pub fn parse_failures(buf: &str, path: &Path) -> Result<Vec<FailureRecord>> {
    let mut records = vec![];

    for (idx, line) in buf.trim_start_matches('\u{feff}').lines().enumerate() {
        let lineno = idx + 1;
        if let Line::Fields(f) = classify_line(line, FAILURE_NR_FIELDS) {
            records.push(FailureRecord {
                prob_failure: parse_field(path, lineno, "failure probability", f[0])?,
                nr_robots_no_backup: parse_field(path, lineno, "robot count", f[1])?,
                eff_no_backup: parse_field(path, lineno, "efficiency", f[2])?,
                nr_robots_with_backup: parse_field(path, lineno, "robot count", f[3])?,
                nr_backups: parse_field(path, lineno, "backup count", f[4])?,
                eff_with_backup: parse_field(path, lineno, "efficiency", f[5])?,
            });
        }
    }

    Ok(records)
}

/// Load the failure injection study. A missing file isn't an error, the
/// study is optional.
pub fn load_failures<P: AsRef<Path>>(path_in: P) -> Result<Option<Vec<FailureRecord>>> {
    let path = path_in.as_ref();
    let buf = match read_data_file(path) {
        Ok(v) => v,
        Err(AnalysisError::FileNotFound(_)) => {
            debug!("loader: {:?} not found, no failure data", path);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    Ok(Some(parse_failures(&buf, path)?))
}
