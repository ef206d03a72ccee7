// Copyright (c) Facebook, Inc. and its affiliates.
use anyhow::{bail, Context, Result};
use log::{error, info, warn};
use std::process::exit;

use lbl_analysis_intf::Args;
use lbl_util::*;

mod error;
mod loader;
mod optimize;
mod summary;

use error::AnalysisError;
use summary::SummaryStyle;

fn run(args: &Args) -> Result<()> {
    let robot_path = args.robot_path();
    info!("Reading robot analysis data from {:?}", &robot_path);

    let (mut records, params) = match loader::load(&robot_path) {
        Ok(v) => v,
        Err(AnalysisError::FileNotFound(path)) => bail!(
            "{:?} not found, run the simulator's robot analysis first or point --input at the data",
            &path
        ),
        Err(e) => return Err(e.into()),
    };
    if records.is_empty() {
        return Err(AnalysisError::EmptyInput)
            .with_context(|| format!("{:?} has no configuration records", &robot_path));
    }
    info!("Loaded {} configurations", records.len());

    if args.sort {
        records.sort_by_key(|rec| rec.nr_robots);
    }

    let failures = match args.failure_path() {
        Some(path) => match loader::load_failures(&path) {
            Ok(v) => v,
            Err(e) => {
                warn!("Ignoring failure analysis data ({})", &e);
                None
            }
        },
        None => None,
    };

    let mut report = optimize::analyze(records, params, args.target, args.full)
        .with_context(|| format!("failed to analyze {:?}", &robot_path))?;
    report.analyzed_at = unix_now();
    report.source = robot_path.display().to_string();
    report.failures = failures;

    print!("{}", summary::format_summary(&report, &SummaryStyle::default()));

    if let Some(path) = args.result.as_ref() {
        JsonReportFile::new(path, report)
            .commit()
            .with_context(|| format!("failed to save the result to {:?}", path))?;
        info!("Result saved to {:?}", path);
    }
    Ok(())
}

fn main() {
    let args_file = Args::init_args_and_logging().unwrap_or_else(|e| {
        error!("Failed to process args ({:#})", &e);
        exit(1);
    });

    if let Err(e) = run(&args_file.data) {
        error!("{:#}", &e);
        exit(1);
    }
}
