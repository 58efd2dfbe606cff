//! Configuration file loading for avp-sweep
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables prefixed `AVP_SWEEP_`
//! 2. `--config <path>` specified file
//! 3. Project root: `./avp-sweep.toml` or `./.avp-sweep.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/avp-sweep/config.toml`
//! 5. Fallback: `~/.config/avp-sweep/config.toml`
//! 6. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileOutputConfig, FileOutputFormat, FileProtocolConfig,
    FileSettlementConfig, FileSettlementPolicy, FileSweepConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
