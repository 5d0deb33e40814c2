// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::chart::{Chart, Series, DEFAULT_SIZE};
use crate::error::{PlotError, Result};
use crate::table::Table;

use serde_derive::Deserialize;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

/// How a combined chart chooses its x-axis ticks when the input files were
/// measured at different thread counts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickPolicy {
    /// Every file must contain the same set of thread counts as the first.
    Strict,
    /// Use every thread count seen in any file.
    Merge,
}

impl Default for TickPolicy {
    fn default() -> Self {
        TickPolicy::Strict
    }
}

/// Rendering options shared by every plot.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotOptions {
    pub size: (u32, u32),
    pub ticks: TickPolicy,
    /// Command used to display single-file charts after they are written.
    pub viewer: Option<String>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            ticks: TickPolicy::default(),
            viewer: None,
        }
    }
}

/// One results file together with the method label used for its series.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Input {
    pub path: PathBuf,
    pub label: String,
}

impl Input {
    pub fn new(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
        }
    }
}

/// Plot one line per dataset of a single results file and write it to
/// `output`. When a viewer is configured, it is launched on the image.
pub fn plot_speedups(
    path: impl AsRef<Path>,
    title: &str,
    output: impl AsRef<Path>,
    options: &PlotOptions,
) -> Result<Chart> {
    let table = Table::load(path)?;

    let mut chart = Chart::new(format!("Speedup vs. Number of Threads for {}", title));
    chart.size(options.size).ticks(table.threads());
    for group in table.groups() {
        chart.add_series(Series::new(group.dataset, group.points));
    }

    let output = output.as_ref();
    chart.save(output)?;
    info!("saved {}", output.display());

    if let Some(viewer) = &options.viewer {
        show(viewer, output);
    }

    Ok(chart)
}

/// Overlay the datasets of several results files on one chart. Each series
/// is labeled `"{label} - {dataset}"`.
pub fn combine_plot<P: AsRef<Path>, L: AsRef<str>>(
    paths: &[P],
    labels: &[L],
    title: &str,
    output: impl AsRef<Path>,
    options: &PlotOptions,
) -> Result<Chart> {
    if paths.len() != labels.len() {
        return Err(PlotError::LengthMismatch {
            paths: paths.len(),
            labels: labels.len(),
        });
    }
    if paths.is_empty() {
        return Err(PlotError::NoInputs);
    }

    // load everything before drawing so a bad file leaves no image behind
    let tables = paths
        .iter()
        .map(|path| Table::load(path))
        .collect::<Result<Vec<Table>>>()?;

    let mut chart = Chart::new(format!("Speedup Graph for {}", title));
    chart.size(options.size).ticks(ticks(&tables, options.ticks)?);
    for (table, label) in tables.iter().zip(labels) {
        for group in table.groups() {
            let name = format!("{} - {}", label.as_ref(), group.dataset);
            chart.add_series(Series::new(name, group.points));
        }
    }

    let output = output.as_ref();
    chart.save(output)?;
    info!("saved {}", output.display());

    Ok(chart)
}

/// Same as `combine_plot`, taking paired inputs.
pub fn combine_inputs(
    inputs: &[Input],
    title: &str,
    output: impl AsRef<Path>,
    options: &PlotOptions,
) -> Result<Chart> {
    let paths: Vec<&Path> = inputs.iter().map(|input| input.path.as_path()).collect();
    let labels: Vec<&str> = inputs.iter().map(|input| input.label.as_str()).collect();
    combine_plot(&paths, &labels, title, output, options)
}

fn ticks(tables: &[Table], policy: TickPolicy) -> Result<Vec<u32>> {
    let first = match tables.first() {
        Some(table) => table.threads(),
        None => return Ok(Vec::new()),
    };

    match policy {
        TickPolicy::Strict => {
            let expected: HashSet<u32> = first.iter().copied().collect();
            for table in &tables[1..] {
                let found = table.threads();
                let set: HashSet<u32> = found.iter().copied().collect();
                if set != expected {
                    return Err(PlotError::ThreadMismatch {
                        path: table.path().to_owned(),
                        expected: first,
                        found,
                    });
                }
            }
            Ok(first)
        }
        TickPolicy::Merge => {
            let mut seen = HashSet::new();
            Ok(tables
                .iter()
                .flat_map(|table| table.threads())
                .filter(|thread| seen.insert(*thread))
                .collect())
        }
    }
}

fn show(viewer: &str, image: &Path) {
    let mut parts = viewer.split_whitespace();
    let program = match parts.next() {
        Some(program) => program,
        None => return,
    };

    match Command::new(program).args(parts).arg(image).spawn() {
        // not waited on, the viewer is left running after we exit
        Ok(_child) => debug!("launched {} for {}", program, image.display()),
        Err(e) => warn!("could not display {}: {}", image.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, content: &'static str) -> Table {
        Table::from_reader(name, content.as_bytes()).unwrap()
    }

    #[test]
    fn strict_ticks_accept_reordered_threads() {
        let tables = vec![
            table("a", "Dataset,Thread,SpeedUp\nX,1,1.0\nX,2,1.9\nX,4,3.2\n"),
            table("b", "Dataset,Thread,SpeedUp\nX,4,3.0\nX,1,1.0\nX,2,1.7\n"),
        ];
        assert_eq!(ticks(&tables, TickPolicy::Strict).unwrap(), vec![1, 2, 4]);
    }

    #[test]
    fn strict_ticks_reject_mismatch() {
        let tables = vec![
            table("a", "Dataset,Thread,SpeedUp\nX,1,1.0\nX,2,1.9\n"),
            table("b", "Dataset,Thread,SpeedUp\nX,1,1.0\nX,8,4.0\n"),
        ];
        match ticks(&tables, TickPolicy::Strict) {
            Err(PlotError::ThreadMismatch {
                path,
                expected,
                found,
            }) => {
                assert_eq!(path, PathBuf::from("b"));
                assert_eq!(expected, vec![1, 2]);
                assert_eq!(found, vec![1, 8]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn merged_ticks_union_in_order() {
        let tables = vec![
            table("a", "Dataset,Thread,SpeedUp\nX,1,1.0\nX,2,1.9\n"),
            table("b", "Dataset,Thread,SpeedUp\nX,1,1.0\nX,8,4.0\nX,2,1.8\n"),
        ];
        assert_eq!(ticks(&tables, TickPolicy::Merge).unwrap(), vec![1, 2, 8]);
    }

    #[test]
    fn length_mismatch() {
        let result = combine_plot(
            &["a.txt", "b.txt"],
            &["A"],
            "test",
            "unused.png",
            &PlotOptions::default(),
        );
        assert!(matches!(
            result,
            Err(PlotError::LengthMismatch { paths: 2, labels: 1 })
        ));
    }

    #[test]
    fn no_inputs() {
        let paths: [&str; 0] = [];
        let labels: [&str; 0] = [];
        let result = combine_plot(&paths, &labels, "test", "unused.png", &PlotOptions::default());
        assert!(matches!(result, Err(PlotError::NoInputs)));
    }

    #[test]
    fn tick_policy_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            ticks: TickPolicy,
        }
        let wrapper: Wrapper = toml::from_str("ticks = \"merge\"").unwrap();
        assert_eq!(wrapper.ticks, TickPolicy::Merge);
    }
}
