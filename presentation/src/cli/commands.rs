//! CLI command definitions

use avp_sweep_domain::SearchStrategy;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the sweep report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table of boundaries plus a text chart
    Table,
    /// JSON output
    Json,
    /// CSV output (`q,m_max`)
    Csv,
}

impl From<OutputFormat> for avp_sweep_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Table => Self::Table,
            OutputFormat::Json => Self::Json,
            OutputFormat::Csv => Self::Csv,
        }
    }
}

/// How each round waits for its parties
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SettleMode {
    /// Sleep a fixed window, then tally
    Fixed,
    /// Wait for every party process to exit
    Barrier,
    /// Poll for every party's vote artifact
    Poll,
}

impl SettleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Barrier => "barrier",
            Self::Poll => "poll",
        }
    }
}

/// How the party-count range is walked
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Stop at the first failure
    Linear,
    /// Run every party count and check monotonicity
    Exhaustive,
}

impl From<StrategyArg> for SearchStrategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Linear => Self::Linear,
            StrategyArg::Exhaustive => Self::Exhaustive,
        }
    }
}

/// CLI arguments for avp-sweep
#[derive(Parser, Debug)]
#[command(name = "avp-sweep")]
#[command(author, version, about = "Find the largest safe party count of an AVP protocol")]
#[command(long_about = r#"
avp-sweep drives the external AVP programs (reset, initialize, vote, tally)
and finds, for each modulus q, the largest number of parties m for which
every party still votes yes.

For every m = 1, 2, ... a round is run:
1. Reset and initialize the protocol state
2. Launch parties 0..m-1
3. Wait for the parties to settle
4. Tally and look for the success marker

Configuration files are loaded from (in priority order):
1. AVP_SWEEP_<SECTION>__<KEY>   Environment overrides
2. --config <path>              Explicit config file
3. ./avp-sweep.toml             Project-level config
4. ~/.config/avp-sweep/config.toml   Global config

Exit codes:
  0  boundary found      3  no boundary within range
  1  usage/config error  4  external tooling failed
  5  non-monotonic outcomes

Example:
  avp-sweep -q 19457 -q 100609 -q 708481
  avp-sweep -q 315521 --max-parties 40 --settle fixed --settle-secs 30
  avp-sweep -q 19457 --predict
"#)]
pub struct Cli {
    /// Modulus q to sweep (can be specified multiple times)
    #[arg(short = 'q', long = "modulus", value_name = "Q")]
    pub moduli: Vec<u64>,

    /// Largest party count to try
    #[arg(short = 'm', long, value_name = "N")]
    pub max_parties: Option<usize>,

    /// Search strategy
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Settlement policy
    #[arg(long, value_enum)]
    pub settle: Option<SettleMode>,

    /// Fixed settlement delay in seconds
    #[arg(long, value_name = "SECS")]
    pub settle_secs: Option<u64>,

    /// Barrier / polling timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Substring of the tally report that means unanimous yes
    #[arg(long, value_name = "TEXT")]
    pub marker: Option<String>,

    /// Working directory of the external programs
    #[arg(long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Also kill stray vote processes by name before each round
    #[arg(long)]
    pub reap_by_name: bool,

    /// Print the analytical estimate for each modulus and exit
    #[arg(long)]
    pub predict: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Export the (q, m_max) sequence (.json => JSON, otherwise CSV)
    #[arg(long, value_name = "PATH")]
    pub results: Option<PathBuf>,

    /// Append every executed round to a JSONL log
    #[arg(long, value_name = "PATH")]
    pub round_log: Option<PathBuf>,

    /// Also write diagnostic logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
