// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{PlotError, Result};

use csv::{ReaderBuilder, Trim};
use serde_derive::Deserialize;

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const DATASET: &str = "Dataset";
pub const THREAD: &str = "Thread";
pub const SPEEDUP: &str = "SpeedUp";

const REQUIRED_COLUMNS: [&str; 3] = [DATASET, THREAD, SPEEDUP];

/// One row of a speedup summary: the speedup measured for a dataset when
/// run with a given number of threads.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SpeedupRecord {
    #[serde(rename = "Dataset")]
    dataset: String,
    #[serde(rename = "Thread")]
    thread: u32,
    #[serde(rename = "SpeedUp")]
    speedup: f64,
}

impl SpeedupRecord {
    pub fn new(dataset: impl Into<String>, thread: u32, speedup: f64) -> Self {
        Self {
            dataset: dataset.into(),
            thread,
            speedup,
        }
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn thread(&self) -> u32 {
        self.thread
    }

    pub fn speedup(&self) -> f64 {
        self.speedup
    }
}

/// The rows of a single dataset, kept in file order.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub dataset: String,
    pub points: Vec<(u32, f64)>,
}

/// The records of one results file, in the order they appear in the file.
#[derive(Clone, Debug)]
pub struct Table {
    path: PathBuf,
    records: Vec<SpeedupRecord>,
}

impl Table {
    /// Read and parse a comma separated results file with a header row.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PlotError::Io {
            path: path.to_owned(),
            source,
        })?;
        let table = Self::from_reader(path, file)?;
        debug!(
            "loaded {}: {} records {} datasets",
            path.display(),
            table.len(),
            table.datasets().len()
        );
        Ok(table)
    }

    /// Parse a table from any reader. `path` only names the source in errors.
    pub fn from_reader<R: Read>(path: impl Into<PathBuf>, reader: R) -> Result<Self> {
        let path = path.into();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = reader.headers().map_err(|source| PlotError::Csv {
            path: path.clone(),
            source,
        })?;
        for column in REQUIRED_COLUMNS.iter() {
            if !headers.iter().any(|header| header == *column) {
                return Err(PlotError::MissingColumn {
                    path,
                    column: *column,
                });
            }
        }

        let mut records = Vec::new();
        for (row, result) in reader.deserialize().enumerate() {
            let record: SpeedupRecord = result.map_err(|source| PlotError::Csv {
                path: path.clone(),
                source,
            })?;
            // rows are numbered from 1, not counting the header
            if !(record.speedup.is_finite() && record.speedup > 0.0) {
                return Err(PlotError::BadSpeedup {
                    path,
                    row: row + 1,
                    value: record.speedup,
                });
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(PlotError::Empty { path });
        }

        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[SpeedupRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct dataset names in order of first appearance.
    pub fn datasets(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|record| record.dataset())
            .filter(|dataset| seen.insert(*dataset))
            .collect()
    }

    /// Distinct thread counts in order of first appearance.
    pub fn threads(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|record| record.thread())
            .filter(|thread| seen.insert(*thread))
            .collect()
    }

    /// Split the records by dataset. Groups are ordered by first appearance
    /// and points within a group keep their row order.
    pub fn groups(&self) -> Vec<Group> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<Group> = Vec::new();

        for record in &self.records {
            let position = *index.entry(record.dataset()).or_insert_with(|| {
                groups.push(Group {
                    dataset: record.dataset().to_owned(),
                    points: Vec::new(),
                });
                groups.len() - 1
            });
            groups[position]
                .points
                .push((record.thread(), record.speedup()));
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &'static str) -> Result<Table> {
        Table::from_reader("test.csv", content.as_bytes())
    }

    #[test]
    fn groups_by_first_appearance() {
        let table = parse("Dataset,Thread,SpeedUp\nA,1,1.0\nA,2,1.8\nB,1,1.0\n").unwrap();
        let groups = table.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].dataset, "A");
        assert_eq!(groups[0].points, vec![(1, 1.0), (2, 1.8)]);
        assert_eq!(groups[1].dataset, "B");
        assert_eq!(groups[1].points, vec![(1, 1.0)]);
    }

    #[test]
    fn keeps_row_order() {
        let table = parse("Dataset,Thread,SpeedUp\nbig,8,5.1\nsmall,2,1.9\nbig,2,1.7\n").unwrap();
        assert_eq!(table.datasets(), vec!["big", "small"]);
        assert_eq!(table.threads(), vec![8, 2]);
        assert_eq!(table.groups()[0].points, vec![(8, 5.1), (2, 1.7)]);
    }

    #[test]
    fn ignores_extra_columns_and_whitespace() {
        let table = parse("Thread, Dataset, SpeedUp, Runtime\n 4 , X , 3.5 , 12.0\n").unwrap();
        assert_eq!(table.records(), &[SpeedupRecord::new("X", 4, 3.5)]);
    }

    #[test]
    fn missing_column() {
        match parse("Dataset,Thread\nA,1\n") {
            Err(PlotError::MissingColumn { column, .. }) => assert_eq!(column, SPEEDUP),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn bad_number() {
        match parse("Dataset,Thread,SpeedUp\nA,one,1.0\n") {
            Err(PlotError::Csv { path, .. }) => assert_eq!(path, PathBuf::from("test.csv")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_non_finite_speedup() {
        for value in &["inf", "-inf", "NaN"] {
            let content = format!("Dataset,Thread,SpeedUp\nA,1,1.0\nA,2,{}\n", value);
            match Table::from_reader("test.csv", content.as_bytes()) {
                Err(PlotError::BadSpeedup { path, row, .. }) => {
                    assert_eq!(path, PathBuf::from("test.csv"));
                    assert_eq!(row, 2);
                }
                other => panic!("unexpected result for {}: {:?}", value, other),
            }
        }
    }

    #[test]
    fn rejects_non_positive_speedup() {
        assert!(matches!(
            parse("Dataset,Thread,SpeedUp\nA,1,0.0\n"),
            Err(PlotError::BadSpeedup { row: 1, .. })
        ));
        assert!(matches!(
            parse("Dataset,Thread,SpeedUp\nA,1,1.0\nA,2,-1.5\n"),
            Err(PlotError::BadSpeedup { row: 2, .. })
        ));
    }

    #[test]
    fn no_records() {
        assert!(matches!(
            parse("Dataset,Thread,SpeedUp\n"),
            Err(PlotError::Empty { .. })
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            Table::load("/nonexistent/speed_summary.txt"),
            Err(PlotError::Io { .. })
        ));
    }
}
