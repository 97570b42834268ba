use std::io;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use tracing::debug;

use fiscal_cli::Cli;
use fiscal_cli::logging::{self, LogConfig};

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level: cli.log_level.clone(),
        file: cli.log_file.clone(),
    };
    if let Err(e) = logging::init_logging(&log_config) {
        eprintln!("fiscal: {e:#}");
        return ExitCode::FAILURE;
    }

    debug!(command = ?cli.command, "starting");

    let today = Local::now().date_naive();
    let mut stdout = io::stdout().lock();

    match fiscal_cli::run(&cli, today, &mut stdout) {
        Ok(code) => code,
        Err(e) => {
            debug!(error = ?e, "command failed");
            eprintln!("fiscal: {e:#}");
            ExitCode::FAILURE
        }
    }
}
