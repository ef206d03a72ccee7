// Copyright (c) Facebook, Inc. and its affiliates.
use lbl_util::*;

pub mod args;
pub mod record;
pub mod report;

pub use args::Args;
pub use record::{ConfigRecord, FailureRecord, RunParams};
pub use report::{AnalysisReport, Crossing};

lazy_static::lazy_static! {
    pub static ref VERSION: &'static str = env!("CARGO_PKG_VERSION");
    pub static ref FULL_VERSION: String = full_version(*VERSION);
}
