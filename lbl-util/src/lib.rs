// Copyright (c) Facebook, Inc. and its affiliates.
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use simplelog as sl;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

pub mod json_file;

pub use json_file::{JsonArgs, JsonArgsHelper, JsonConfigFile, JsonLoad, JsonReportFile, JsonSave};

pub const TO_PCT: f64 = 100.0;

pub fn full_version(semver: &str) -> String {
    let mut ver = semver.to_string();
    match option_env!("VERGEN_GIT_SHA") {
        Some(sha) if sha.len() >= 7 && !sha.starts_with("VERGEN") => {
            ver += "-";
            ver += &sha[0..7];
        }
        _ => {}
    }
    if option_env!("VERGEN_GIT_DIRTY") == Some("true") {
        ver += "-dirty";
    }
    if let Some(triple) = option_env!("VERGEN_CARGO_TARGET_TRIPLE") {
        ver += " ";
        ver += triple;
    }
    ver
}

pub fn custom_underline(content: &str, line_char: &str) -> String {
    let nr_spaces = content.chars().take_while(|c| *c == ' ').count();
    let len = content.chars().count() - nr_spaces;
    format!(
        "{}\n{}{}\n",
        content,
        " ".repeat(nr_spaces),
        line_char.repeat(len)
    )
}

pub fn underline(content: &str) -> String {
    custom_underline(content, "-")
}

pub fn double_underline(content: &str) -> String {
    custom_underline(content, "=")
}

/// Format a value which is already in percents, e.g. an efficiency.
pub fn format_pct_val(pct: f64) -> String {
    if pct.is_nan() {
        "NaN".into()
    } else if pct < 0.0 {
        "NEG".into()
    } else if pct < 99.95 {
        format!("{:.1}%", pct)
    } else if pct < 9999.5 {
        format!("{:.0}%", pct)
    } else {
        "INF".into()
    }
}

/// Parse a percentage. "95", "95.0" and "95%" all yield 95.0.
pub fn parse_pct(input: &str) -> Result<f64> {
    let mut input = input.trim();
    if input.ends_with('%') {
        input = input[0..input.len() - 1].trim_end();
    }
    let v = input
        .parse::<f64>()
        .with_context(|| format!("failed to parse percentage \"{}\"", input))?;
    if !v.is_finite() {
        bail!("percentage {} is not finite", v);
    }
    if v < 0.0 {
        bail!("percentage {} is negative", v);
    }
    Ok(v)
}

/// If `path` doesn't exist, try the same path with the alternate
/// extension. The original path is returned if neither exists.
pub fn resolve_alt_ext<P: AsRef<Path>>(path_in: P, alts: &[(&str, &str)]) -> PathBuf {
    let path = path_in.as_ref();
    if path.exists() {
        return path.to_owned();
    }

    if let Some(ext) = path.extension().and_then(|x| x.to_str()) {
        for (from, to) in alts.iter() {
            if ext == *from {
                let alt = path.with_extension(to);
                if alt.exists() {
                    return alt;
                }
            }
        }
    }
    path.to_owned()
}

pub fn unix_now() -> u64 {
    UNIX_EPOCH.elapsed().map(|x| x.as_secs()).unwrap_or(0)
}

pub fn format_unix_time(time: u64) -> String {
    DateTime::<Local>::from(UNIX_EPOCH + Duration::from_secs(time))
        .format("%x %T")
        .to_string()
}

pub fn init_logging(verbosity: u32) {
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
    } else {
        let sl_level = match verbosity {
            0 | 1 => sl::LevelFilter::Info,
            2 => sl::LevelFilter::Debug,
            _ => sl::LevelFilter::Trace,
        };
        let mut lcfg = sl::ConfigBuilder::new();
        lcfg.set_time_level(sl::LevelFilter::Off)
            .set_location_level(sl::LevelFilter::Off)
            .set_target_level(sl::LevelFilter::Off)
            .set_thread_level(sl::LevelFilter::Off);
        if !console::user_attended_stderr()
            || sl::TermLogger::init(
                sl_level,
                lcfg.build(),
                sl::TerminalMode::Stderr,
                sl::ColorChoice::Auto,
            )
            .is_err()
        {
            // Another logger may already be installed, nothing to do then.
            let _ = sl::SimpleLogger::init(sl_level, lcfg.build());
        }
    }
}
