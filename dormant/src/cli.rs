//! Command-line interface.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use dormant_common::DisableMode;

use crate::config::RunOverrides;

/// Find Rally users idle beyond a threshold and optionally disable them.
///
/// Without -R/--reallydoit nothing is changed: eligible users are only listed.
#[derive(Debug, Parser)]
#[command(name = "dormant", version, about, long_about = None)]
pub struct Cli {
    /// Total number of days that the users did not access the system
    #[arg(short, long, value_name = "TOTAL_DAYS")]
    pub days: Option<i64>,

    /// Type of request: general, No-Access or Blank-Last-Login
    #[arg(short = 't', long = "type", value_name = "TYPE_OF_REQUEST", value_parser = DisableMode::from_str)]
    pub mode: Option<DisableMode>,

    /// Disable the eligible users instead of only listing them
    #[arg(short = 'R', long = "reallydoit")]
    pub apply: bool,

    /// Touch at most N users in this run
    #[arg(long, value_name = "N")]
    pub failsafe: Option<usize>,

    /// Keep going after a failed disable instead of halting
    #[arg(long)]
    pub continue_on_error: bool,

    /// Configuration file (default: dormant.toml, if present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> RunOverrides {
        RunOverrides {
            days: self.days,
            mode: self.mode,
            failsafe_limit: self.failsafe,
            continue_on_error: self.continue_on_error,
            apply: self.apply,
        }
    }
}
