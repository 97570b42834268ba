//! Subcommand implementations.
//!
//! Every command builds a serializable report from the reference data and
//! its inputs; [`emit`] prints it either as text or as JSON.

pub mod calendar;
pub mod costs;
pub mod oib;
pub mod payment;
pub mod posd;
pub mod statement;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use fiscal_core::FiscalRegistry;
use serde::Serialize;

use crate::app;
use crate::cli::{Cli, Command};

/// Plain-text rendering of a report.
pub trait Render {
    fn render(
        &self,
        out: &mut dyn Write,
    ) -> io::Result<()>;
}

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub registry: FiscalRegistry,
    /// Injected so results do not depend on the wall clock.
    pub today: NaiveDate,
}

pub fn emit<T: Serialize + Render>(
    report: &T,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
    } else {
        report.render(out)?;
    }
    Ok(())
}

/// Runs the parsed command line and writes its report to `out`.
///
/// Returns a failure exit code when the command completed but its answer is
/// negative (an invalid OIB).
pub fn run(
    cli: &Cli,
    today: NaiveDate,
    out: &mut dyn Write,
) -> Result<ExitCode> {
    let ctx = Context {
        registry: app::build_registry(cli.data_dir.as_deref())?,
        today,
    };

    match &cli.command {
        Command::Oib(args) => {
            let report = oib::run(args);
            emit(&report, cli.json, out)?;
            return Ok(if report.all_valid() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
        Command::Statement(args) => emit(&statement::run(args)?, cli.json, out)?,
        Command::Posd(args) => emit(&posd::run(args, &ctx)?, cli.json, out)?,
        Command::Pausal(args) => emit(&costs::run_pausal(args, &ctx)?, cli.json, out)?,
        Command::Jdoo(args) => emit(&costs::run_jdoo(args, &ctx)?, cli.json, out)?,
        Command::Payment(args) => emit(&payment::run(args, &ctx)?, cli.json, out)?,
        Command::Deadlines(args) => emit(&calendar::run_deadlines(args, &ctx)?, cli.json, out)?,
        Command::Years => emit(&calendar::run_years(&ctx), cli.json, out)?,
    }

    Ok(ExitCode::SUCCESS)
}
