// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::chart::Chart;
use crate::config::Config;
use crate::error::Result;
use crate::plot::{combine_inputs, plot_speedups};

use std::path::{Path, PathBuf};

/// Outcome of a run: the charts that were written and the outputs that
/// could not be produced, with the reason.
#[derive(Clone, Debug, Default)]
pub struct Report {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl Report {
    fn record(&mut self, output: &Path, result: Result<Chart>) {
        match result {
            Ok(_) => self.written.push(output.to_owned()),
            Err(e) => {
                error!("Error: Could not generate plots due to {}", e);
                self.failed.push((output.to_owned(), e.to_string()));
            }
        }
    }
}

/// Produce every chart named by the config. A failing chart is logged and
/// the remaining charts are still attempted.
pub fn run(config: &Config) -> Report {
    let options = config.options();
    let mut report = Report::default();

    for comparison in config.comparisons() {
        debug!("plotting comparison: {}", comparison.title);
        let result = combine_inputs(
            &comparison.inputs,
            &comparison.title,
            &comparison.output,
            &options,
        );
        report.record(&comparison.output, result);
    }

    for single in config.singles() {
        let output = single.output();
        debug!("plotting {}", single.path().display());
        let result = plot_speedups(single.path(), &single.title(), &output, &options);
        report.record(&output, result);
    }

    info!(
        "Charts: Written: {} Failed: {}",
        report.written.len(),
        report.failed.len()
    );

    report
}
