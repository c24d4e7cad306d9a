//! Dormant - finds Rally users idle beyond a threshold and disables them.

pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod run;
pub mod test_util;

pub use config::{Config, ConfigError, RunOverrides};
pub use directory::{DirectoryError, DisableConfirmation, RallyDirectory, UserDirectory};
pub use error::{Error, Result};
pub use run::{run, RunOptions, RunSummary};
