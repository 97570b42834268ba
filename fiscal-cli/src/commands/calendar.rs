use std::io::{self, Write};

use anyhow::Result;
use chrono::NaiveDate;
use fiscal_core::Deadline;
use fiscal_core::calculations::common::format_eur;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Context, Render};
use crate::app;
use crate::cli::DeadlinesArgs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlinesReport {
    pub from: NaiveDate,
    pub deadlines: Vec<Deadline>,
}

/// Deadlines on or after `--from`.
///
/// With an explicit `--year` only that year's table is used; otherwise every
/// loaded year is searched so the list continues across New Year.
pub fn run_deadlines(
    args: &DeadlinesArgs,
    ctx: &Context,
) -> Result<DeadlinesReport> {
    let from = args.from.unwrap_or(ctx.today);

    let mut deadlines: Vec<Deadline> = match args.year {
        Some(year) => app::select_year(&ctx.registry, Some(year))?
            .deadlines
            .upcoming(from)
            .into_iter()
            .cloned()
            .collect(),
        None => ctx
            .registry
            .years()
            .into_iter()
            .filter_map(|year| ctx.registry.get(year).ok())
            .flat_map(|data| data.deadlines.upcoming(from))
            .cloned()
            .collect(),
    };
    deadlines.sort_by_key(|d| d.date);
    deadlines.truncate(args.limit);

    Ok(DeadlinesReport { from, deadlines })
}

impl Render for DeadlinesReport {
    fn render(
        &self,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        if self.deadlines.is_empty() {
            return writeln!(
                out,
                "No deadlines after {} in the reference data.",
                self.from.format("%d.%m.%Y.")
            );
        }
        for d in &self.deadlines {
            let days = (d.date - self.from).num_days();
            writeln!(
                out,
                "{}  in {:>3} day(s)  {}",
                d.date.format("%d.%m.%Y."),
                days,
                d.description
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub last_verified: NaiveDate,
    pub brackets: usize,
    pub pausal_limit: Decimal,
    pub pdv_threshold: Decimal,
    pub contribution_base: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearsReport {
    pub years: Vec<YearSummary>,
}

pub fn run_years(ctx: &Context) -> YearsReport {
    let years = ctx
        .registry
        .years()
        .into_iter()
        .filter_map(|year| ctx.registry.get(year).ok())
        .map(|data| YearSummary {
            year: data.year,
            last_verified: data.last_verified,
            brackets: data.brackets().len(),
            pausal_limit: data.thresholds.pausal_limit,
            pdv_threshold: data.thresholds.pdv_threshold,
            contribution_base: data.contributions.base,
        })
        .collect();

    YearsReport { years }
}

impl Render for YearsReport {
    fn render(
        &self,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        for y in &self.years {
            writeln!(
                out,
                "{}  verified {}  {} brackets  limit {}  contribution base {}",
                y.year,
                y.last_verified.format("%d.%m.%Y."),
                y.brackets,
                format_eur(y.pausal_limit),
                format_eur(y.contribution_base)
            )?;
        }
        Ok(())
    }
}
