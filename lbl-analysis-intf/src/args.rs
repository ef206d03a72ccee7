// Copyright (c) Facebook, Inc. and its affiliates.
use anyhow::{Context, Result};
use clap::{App, AppSettings, ArgMatches};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use lbl_util::*;

lazy_static::lazy_static! {
    static ref ARGS_STR: String = {
        let dfl_args = Args::default();
        format!(
            "-d, --dir=[DIR]           'Directory holding the simulator output (dfl: {dfl_dir})'
             -i, --input=[FILE]        'Robot analysis data (dfl: DIR/{robot_file}.dat or .csv)'
             -f, --failure=[FILE]      'Failure analysis data (dfl: DIR/{failure_file}.dat or .csv)'
             -r, --result=[FILE]       'Save the analysis result as json to FILE'
             -t, --target=[PCT]        'Efficiency target (dfl: {dfl_target}%)'
             -F, --full=[PCT]          'Full efficiency threshold (dfl: {dfl_full}%)'
             -a, --args=[FILE]         'Load base command line arguments from FILE'
                 --sort                'Sort configurations by robot count before analysis'
                 --no-failure          'Skip the failure analysis data'
             -v...                     'Sets the level of verbosity'",
            dfl_dir = dfl_args.dir,
            robot_file = Args::ROBOT_FILE_STEM,
            failure_file = Args::FAILURE_FILE_STEM,
            dfl_target = dfl_args.target,
            dfl_full = dfl_args.full,
        )
    };
}

const ARGS_DOC: &str = "\
//
// lbl-analysis command line arguments
//
// This file provides the base values for a subset of command line arguments.
// They can be overridden from command line.
//
";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Args {
    pub dir: String,
    pub input: Option<String>,
    pub failure: Option<String>,
    pub target: f64,
    pub full: f64,
    pub sort: bool,

    #[serde(skip)]
    pub result: Option<String>,
    #[serde(skip)]
    pub no_failure: bool,
    #[serde(skip)]
    pub verbosity: u32,
}

impl Args {
    pub const ROBOT_FILE_STEM: &'static str = "robot_analysis";
    pub const FAILURE_FILE_STEM: &'static str = "failure_analysis";
    pub const DATA_EXT_ALTS: &'static [(&'static str, &'static str)] =
        &[("dat", "csv"), ("csv", "dat")];

    fn data_path(&self, explicit: Option<&str>, stem: &str) -> PathBuf {
        let path = match explicit {
            Some(v) => PathBuf::from(v),
            None => PathBuf::from(&self.dir).join(format!("{}.dat", stem)),
        };
        resolve_alt_ext(path, Self::DATA_EXT_ALTS)
    }

    pub fn robot_path(&self) -> PathBuf {
        self.data_path(self.input.as_deref(), Self::ROBOT_FILE_STEM)
    }

    pub fn failure_path(&self) -> Option<PathBuf> {
        if self.no_failure {
            None
        } else {
            Some(self.data_path(self.failure.as_deref(), Self::FAILURE_FILE_STEM))
        }
    }
}

impl Default for Args {
    fn default() -> Self {
        Self {
            dir: ".".into(),
            input: None,
            failure: None,
            target: 95.0,
            full: 99.9,
            sort: false,
            result: None,
            no_failure: false,
            verbosity: 0,
        }
    }
}

impl JsonLoad for Args {}

impl JsonSave for Args {
    fn preamble() -> Option<String> {
        Some(ARGS_DOC.to_string())
    }
}

fn opt_string(v: &str) -> Option<String> {
    if v.len() > 0 {
        Some(v.to_string())
    } else {
        None
    }
}

impl JsonArgs for Args {
    fn match_cmdline() -> ArgMatches<'static> {
        App::new("lbl-analysis")
            .version((*super::FULL_VERSION).as_str())
            .about("Find the cost-effective robot count for the labeling line")
            .args_from_usage(&ARGS_STR)
            .setting(AppSettings::UnifiedHelpMessage)
            .setting(AppSettings::DeriveDisplayOrder)
            .get_matches()
    }

    fn verbosity(matches: &ArgMatches) -> u32 {
        matches.occurrences_of("v") as u32
    }

    fn process_cmdline(&mut self, matches: &ArgMatches) -> Result<bool> {
        let dfl: Args = Default::default();
        let mut updated_base = false;

        if let Some(v) = matches.value_of("dir") {
            self.dir = if v.len() > 0 { v.to_string() } else { dfl.dir.clone() };
            updated_base = true;
        }
        if let Some(v) = matches.value_of("input") {
            self.input = opt_string(v);
            updated_base = true;
        }
        if let Some(v) = matches.value_of("failure") {
            self.failure = opt_string(v);
            updated_base = true;
        }
        if let Some(v) = matches.value_of("target") {
            self.target = if v.len() > 0 {
                parse_pct(v).context("--target")?
            } else {
                dfl.target
            };
            updated_base = true;
        }
        if let Some(v) = matches.value_of("full") {
            self.full = if v.len() > 0 {
                parse_pct(v).context("--full")?
            } else {
                dfl.full
            };
            updated_base = true;
        }
        if matches.is_present("sort") && !self.sort {
            self.sort = true;
            updated_base = true;
        }

        self.result = matches.value_of("result").and_then(opt_string);
        self.no_failure = matches.is_present("no-failure");
        self.verbosity = Self::verbosity(matches);

        Ok(updated_base)
    }
}
