// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::chart::{DEFAULT_SIZE, MAX_DIMENSION};
use crate::error::{PlotError, Result};
use crate::logger::Level;
use crate::plot::{Input, PlotOptions, TickPolicy};

use clap::{App, Arg, ArgMatches};
use serde_derive::Deserialize;

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use std::process;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

const METHODS: [(&str, &str); 3] = [
    ("parslices", "Parslices Method"),
    ("parslicesBSP", "BSPStealing Method"),
    ("parslicesBSPOptimized", "BSPStealingOptimized Method"),
];
const WORKLOADS: [&str; 2] = ["small", "whitespace"];
const BUILTIN_TITLE: &str = "Comparison of Methods x2 tasks";

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    general: General,
    #[serde(default)]
    comparison: Vec<Comparison>,
    #[serde(default)]
    single: Vec<Single>,
}

impl Default for Config {
    /// The method comparison charts for the `small` and `whitespace` workloads.
    fn default() -> Config {
        let comparison = WORKLOADS
            .iter()
            .map(|workload| Comparison {
                title: BUILTIN_TITLE.to_owned(),
                output: PathBuf::from(format!("{}.png", workload)),
                inputs: METHODS
                    .iter()
                    .map(|(method, label)| {
                        Input::new(
                            format!("./{}/{}/speed_summary.txt", method, workload),
                            *label,
                        )
                    })
                    .collect(),
            })
            .collect();

        Config {
            general: Default::default(),
            comparison,
            single: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct General {
    #[serde(with = "LevelDef")]
    #[serde(default = "default_logging_level")]
    logging: Level,
    #[serde(default = "default_width")]
    width: u32,
    #[serde(default = "default_height")]
    height: u32,
    #[serde(default)]
    ticks: TickPolicy,
    viewer: Option<String>,
}

impl Default for General {
    fn default() -> General {
        General {
            logging: default_logging_level(),
            width: default_width(),
            height: default_height(),
            ticks: Default::default(),
            viewer: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
#[serde(remote = "Level")]
enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn default_logging_level() -> Level {
    Level::Info
}

fn default_width() -> u32 {
    DEFAULT_SIZE.0
}

fn default_height() -> u32 {
    DEFAULT_SIZE.1
}

/// Several results files overlaid on one chart.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Comparison {
    pub title: String,
    pub output: PathBuf,
    pub inputs: Vec<Input>,
}

/// One results file on its own chart. Title and output default to values
/// derived from the input path.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Single {
    path: PathBuf,
    title: Option<String>,
    output: Option<PathBuf>,
}

impl Single {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            title: None,
            output: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The configured title, or the leading directory of the path, which is
    /// the method name in `./<method>/<workload>/speed_summary.txt`.
    pub fn title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }

        let mut names = self.path.components().filter_map(|c| match c {
            Component::Normal(name) => Some(name),
            _ => None,
        });
        match (names.next(), names.next()) {
            (Some(first), Some(_)) => first.to_string_lossy().into_owned(),
            _ => self
                .path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// The configured output, or the input path with a `png` extension.
    pub fn output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.path.with_extension("png"))
    }
}

fn app<'a, 'b>() -> App<'a, 'b> {
    App::new(NAME)
        .version(VERSION)
        .about("Speedup charts for parallel benchmark results")
        .arg(
            Arg::with_name("config")
                .long("config")
                .value_name("FILE")
                .help("TOML config file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("single")
                .long("single")
                .value_name("FILE")
                .help("Plot the datasets of one results file on their own chart")
                .multiple(true)
                .number_of_values(1)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("ticks")
                .long("ticks")
                .value_name("POLICY")
                .help("How combined charts handle differing thread counts")
                .possible_value("strict")
                .possible_value("merge")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("width")
                .long("width")
                .value_name("Pixels")
                .help("Chart width")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("height")
                .long("height")
                .value_name("Pixels")
                .help("Chart height")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("viewer")
                .long("viewer")
                .value_name("COMMAND")
                .help("Command used to display single-file charts once written")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Increase verbosity by one level. Can be used more than once")
                .multiple(true),
        )
}

impl Config {
    /// parse command line options and return `Config`
    pub fn new() -> Config {
        let matches = app().get_matches();
        Config::from_matches(&matches).unwrap_or_else(|e| {
            println!("ERROR: {}", e);
            process::exit(1);
        })
    }

    /// parse the given arguments, the first being the program name
    pub fn from_args<I, T>(args: I) -> Result<Config>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = app()
            .get_matches_from_safe(args)
            .map_err(|e| PlotError::Config(e.message))?;
        Config::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> Result<Config> {
        let mut config = if let Some(file) = matches.value_of("config") {
            Config::load_from_file(file)?
        } else {
            Default::default()
        };

        if let Some(singles) = matches.values_of("single") {
            config.single.extend(singles.map(|path| Single::from_path(path)));
        }

        if let Some(ticks) = matches.value_of("ticks") {
            config.general.ticks = match ticks {
                "merge" => TickPolicy::Merge,
                _ => TickPolicy::Strict,
            };
        }

        if let Some(width) = parse_numeric_arg(matches, "width")? {
            config.general.width = width;
        }

        if let Some(height) = parse_numeric_arg(matches, "height")? {
            config.general.height = height;
        }

        if let Some(viewer) = matches.value_of("viewer") {
            config.general.viewer = Some(viewer.to_owned());
        }

        match matches.occurrences_of("verbose") {
            0 => {}
            1 => config.general.logging = Level::Debug,
            _ => config.general.logging = Level::Trace,
        }

        let size = 1..=MAX_DIMENSION;
        if !size.contains(&config.general.width) || !size.contains(&config.general.height) {
            return Err(PlotError::Config(format!(
                "chart size {}x{} must be between 1 and {} pixels per side",
                config.general.width, config.general.height, MAX_DIMENSION
            )));
        }

        Ok(config)
    }

    pub fn load_from_file(file: impl AsRef<Path>) -> Result<Config> {
        let file = file.as_ref();
        let content = std::fs::read_to_string(file).map_err(|source| PlotError::Io {
            path: file.to_owned(),
            source,
        })?;
        content
            .parse::<Config>()
            .map_err(|e| PlotError::Config(format!("{}: {}", file.display(), e)))
    }

    /// get logging level
    pub fn logging(&self) -> Level {
        self.general.logging
    }

    pub fn comparisons(&self) -> &[Comparison] {
        &self.comparison
    }

    pub fn singles(&self) -> &[Single] {
        &self.single
    }

    pub fn options(&self) -> PlotOptions {
        PlotOptions {
            size: (self.general.width, self.general.height),
            ticks: self.general.ticks,
            viewer: self.general.viewer.clone(),
        }
    }

    pub fn print(&self) {
        info!("-----");
        info!(
            "Config: Size: {}x{} Ticks: {:?} Viewer: {}",
            self.general.width,
            self.general.height,
            self.general.ticks,
            self.general.viewer.as_deref().unwrap_or("None"),
        );
        for comparison in &self.comparison {
            info!(
                "Config: Comparison: {} Inputs: {} Output: {}",
                comparison.title,
                comparison.inputs.len(),
                comparison.output.display(),
            );
        }
        for single in &self.single {
            info!(
                "Config: Single: {} Output: {}",
                single.path().display(),
                single.output().display(),
            );
        }
    }
}

impl std::str::FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

/// a helper function to parse a numeric argument by name from `ArgMatches`
fn parse_numeric_arg(matches: &ArgMatches, key: &str) -> Result<Option<u32>> {
    matches
        .value_of(key)
        .map(|v| {
            v.parse()
                .map_err(|_| PlotError::Config(format!("could not parse {}: {}", key, v)))
        })
        .transpose()
}
