//! Tracing setup: console output plus a per-run log file.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDateTime;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Log file name for a run started at `started_at`.
///
/// Dry runs and applied runs get different prefixes so their logs are easy
/// to tell apart afterwards.
pub fn log_file_name(apply: bool, started_at: NaiveDateTime) -> String {
    let prefix = if apply { "dormant-disable" } else { "dormant-list" };
    format!("{}_{}.log", prefix, started_at.format("%Y_%m_%d_%H_%M_%S"))
}

/// Install the global subscriber.
///
/// The filter comes from `RUST_LOG` when set, else `logging.level`. Returns
/// the path of the log file, if file output is enabled.
pub fn init(config: &LoggingConfig, apply: bool) -> std::io::Result<Option<PathBuf>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, path) = if config.file {
        let path = config
            .directory
            .join(log_file_name(apply, chrono::Local::now().naive_local()));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let layer = fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file));
        (Some(layer), Some(path))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    Ok(path)
}
