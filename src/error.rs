// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::path::PathBuf;

use thiserror::Error;

/// Every way that loading a results table or rendering a chart can fail.
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("{}: missing column '{column}'", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("{}: no records", .path.display())]
    Empty { path: PathBuf },
    #[error(
        "{}: row {row}: speedup {value} is not a positive number",
        .path.display()
    )]
    BadSpeedup { path: PathBuf, row: usize, value: f64 },
    #[error("{paths} input files but {labels} labels")]
    LengthMismatch { paths: usize, labels: usize },
    #[error("no input files")]
    NoInputs,
    #[error(
        "{}: thread counts {found:?} do not match {expected:?}",
        .path.display()
    )]
    ThreadMismatch {
        path: PathBuf,
        expected: Vec<u32>,
        found: Vec<u32>,
    },
    #[error("render failed: {0}")]
    Render(String),
    #[error("{}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: png::EncodingError,
    },
    #[error("embedded font could not be loaded")]
    Font,
    #[error("bad config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PlotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_cause() {
        let err = PlotError::Io {
            path: PathBuf::from("missing.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "missing.txt: not found");
    }

    #[test]
    fn display_thread_mismatch() {
        let err = PlotError::ThreadMismatch {
            path: PathBuf::from("b.txt"),
            expected: vec![1, 2, 4],
            found: vec![1, 2],
        };
        assert_eq!(
            err.to_string(),
            "b.txt: thread counts [1, 2] do not match [1, 2, 4]"
        );
    }
}
