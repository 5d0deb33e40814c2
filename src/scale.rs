// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};

use std::ops::Range;

// fraction of the span left empty on either side of the outermost ticks
const PADDING: f64 = 0.03;

/// A linear thread-count axis whose key points are exactly the thread
/// counts present in the data, rather than evenly spaced values.
#[derive(Clone, Debug)]
pub struct ThreadAxis {
    ticks: Vec<u32>,
    range: Range<u32>,
}

impl ThreadAxis {
    pub fn new(ticks: &[u32]) -> Self {
        let min = ticks.iter().copied().min().unwrap_or(1);
        let max = ticks.iter().copied().max().unwrap_or(1);

        let range = if min == max {
            min.saturating_sub(1)..max.saturating_add(1)
        } else {
            min..max
        };

        Self {
            ticks: ticks.to_vec(),
            range,
        }
    }

    fn bounds(&self) -> (f64, f64) {
        let start = self.range.start as f64;
        let end = self.range.end as f64;
        let pad = (end - start) * PADDING;
        (start - pad, end + pad)
    }
}

impl Ranged for ThreadAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = u32;

    fn map(&self, value: &u32, limit: (i32, i32)) -> i32 {
        let (lo, hi) = self.bounds();
        let fraction = (*value as f64 - lo) / (hi - lo);
        limit.0 + (fraction * (limit.1 - limit.0) as f64).round() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<u32> {
        if hint.max_num_points() == 0 {
            return Vec::new();
        }
        self.ticks.clone()
    }

    fn range(&self) -> Range<u32> {
        self.range.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_linearly() {
        let axis = ThreadAxis::new(&[1, 2, 4, 8]);
        let first = axis.map(&1, (0, 1000));
        let last = axis.map(&8, (0, 1000));
        let middle = axis.map(&4, (0, 1000));
        assert!(first > 0 && first < 50);
        assert!(last < 1000 && last > 950);
        assert!(middle > first && middle < last);
    }

    #[test]
    fn key_points_are_ticks() {
        let axis = ThreadAxis::new(&[4, 1, 2]);
        assert_eq!(axis.key_points(10), vec![4, 1, 2]);
        assert_eq!(axis.range(), 1..4);
    }

    #[test]
    fn single_tick_gets_a_span() {
        let axis = ThreadAxis::new(&[1]);
        assert_eq!(axis.range(), 0..2);
        assert_eq!(axis.map(&1, (0, 100)), 50);
    }
}
