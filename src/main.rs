// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#[macro_use]
extern crate log;

use speedplot::{Config, Logger, NAME, VERSION};

fn main() {
    let config = Config::new();

    Logger::new()
        .label(NAME)
        .level(config.logging())
        .init()
        .expect("Failed to initialize logger");

    info!("{} {} initializing...", NAME, VERSION);
    config.print();

    // plotting failures are reported by the run and never change the exit status
    let report = speedplot::run(&config);
    for (output, reason) in &report.failed {
        debug!("{} not written: {}", output.display(), reason);
    }
}
