// Copyright (c) Facebook, Inc. and its affiliates.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors which abort the analysis of the current input file.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{0:?} not found")]
    FileNotFound(PathBuf),

    #[error("failed to read {path:?} ({err})")]
    Io {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    #[error("{path:?}:{line}: malformed {field} {value:?}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("record {idx} has invalid robot count {nr_robots}")]
    Domain { idx: usize, nr_robots: i32 },

    #[error("no configuration records to analyze")]
    EmptyInput,
}

impl AnalysisError {
    pub fn from_io(path: PathBuf, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound(path),
            _ => Self::Io { path, err },
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
