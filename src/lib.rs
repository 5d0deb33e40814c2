// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Line charts of parallel speedup measurements.
//!
//! Results files are comma separated tables with `Dataset`, `Thread` and
//! `SpeedUp` columns. Each dataset becomes one line of speedup against thread
//! count, and several files can be overlaid on one chart to compare methods.

#[macro_use]
extern crate log;

mod chart;
mod config;
mod driver;
mod error;
mod logger;
mod plot;
mod scale;
mod table;

pub use crate::chart::{Chart, Series, DEFAULT_SIZE, MAX_DIMENSION};
pub use crate::config::{Comparison, Config, Single, NAME, VERSION};
pub use crate::driver::{run, Report};
pub use crate::error::{PlotError, Result};
pub use crate::logger::{Level, Logger};
pub use crate::plot::{combine_inputs, combine_plot, plot_speedups, Input, PlotOptions, TickPolicy};
pub use crate::scale::ThreadAxis;
pub use crate::table::{Group, SpeedupRecord, Table};
