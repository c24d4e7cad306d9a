//! Dormant - lists or disables Rally users idle beyond a threshold.

use std::process::ExitCode;

use clap::Parser;
use dormant::cli::Cli;
use dormant::{logging, report, Config, Error, RallyDirectory};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_deref()).map_err(|e| {
        format!(
            "{}. Make sure the config file exists or set DORMANT__SECTION__KEY environment variables.",
            e
        )
    })?;
    config.apply_overrides(cli.overrides());

    // Initialize tracing
    let log_path = logging::init(&config.logging, config.run.apply)?;
    if let Some(path) = log_path {
        tracing::info!("Log file is: '{}'", path.display());
    }

    let options = config.run_options(chrono::Local::now().date_naive())?;
    let directory = RallyDirectory::new(&config.rally)?;
    directory.log_connection();

    tracing::info!("display_only mode - {}", !options.apply);
    if !options.apply {
        for line in report::criteria_lines(options.mode, options.threshold_days) {
            tracing::info!("{}", line);
        }
    }

    match dormant::run(&directory, &options).await {
        Ok(summary) => {
            report::log_report(&summary, None);
            if summary.has_failures() {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Err(Error::UpdateHalted {
            user,
            detail,
            summary,
        }) => {
            report::log_report(&summary, Some(user.as_ref()));
            report::log_halt(&user, &detail, &summary);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            tracing::error!("Error:\t{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
