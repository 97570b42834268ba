use std::io::{self, Write};

use anyhow::{Context as _, Result};
use fiscal_core::TaxBracket;
use fiscal_core::calculations::common::format_eur;
use fiscal_core::calculations::{
    ContributionBreakdown, JdooCosts, PausalAnnualCosts, PausalMonthlyCosts,
    calculate_contributions, calculate_jdoo_costs, calculate_pausal_annual_costs,
    calculate_pausal_monthly_costs, get_pausal_tax_bracket,
};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Context, Render};
use crate::app;
use crate::cli::{JdooArgs, PausalArgs};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PausalReport {
    pub year: i32,
    pub revenue: Decimal,
    pub bracket: TaxBracket,
    pub contributions: ContributionBreakdown,
    pub monthly: PausalMonthlyCosts,
    pub annual: PausalAnnualCosts,
}

pub fn run_pausal(
    args: &PausalArgs,
    ctx: &Context,
) -> Result<PausalReport> {
    let data = app::select_year(&ctx.registry, args.year)?;

    let bracket = get_pausal_tax_bracket(data.brackets(), args.revenue)
        .with_context(|| format!("revenue {} cannot be taxed as paušal", args.revenue))?
        .clone();
    let monthly = calculate_pausal_monthly_costs(data, args.revenue)?;
    let annual = calculate_pausal_annual_costs(data, args.revenue, args.tz_group)?;

    Ok(PausalReport {
        year: data.year,
        revenue: args.revenue,
        bracket,
        contributions: calculate_contributions(data),
        monthly,
        annual,
    })
}

impl Render for PausalReport {
    fn render(
        &self,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        writeln!(
            out,
            "Paušalni obrt, {} revenue, {} rates",
            format_eur(self.revenue),
            self.year
        )?;
        writeln!(
            out,
            "Bracket {} – {}, tax base {}",
            format_eur(self.bracket.min_revenue),
            format_eur(self.bracket.max_revenue),
            format_eur(self.bracket.tax_base)
        )?;
        writeln!(out)?;
        writeln!(out, "{:<24} {:>14} {:>14}", "", "monthly", "annual")?;
        let rows = [
            ("Contributions", self.monthly.contributions, self.annual.contributions),
            ("HOK", self.monthly.hok, self.annual.hok),
            ("Income tax", self.monthly.tax, self.annual.tax),
        ];
        for (label, monthly, annual) in rows {
            writeln!(
                out,
                "{label:<24} {:>14} {:>14}",
                format_eur(monthly),
                format_eur(annual)
            )?;
        }
        if let Some(tz) = self.annual.tz {
            writeln!(out, "{:<24} {:>14} {:>14}", "TZ contribution", "", format_eur(tz))?;
        }
        writeln!(
            out,
            "{:<24} {:>14} {:>14}",
            "Total",
            format_eur(self.monthly.total),
            format_eur(self.annual.total)
        )?;
        writeln!(out)?;
        writeln!(
            out,
            "Contributions: MIO I {}, MIO II {}, HZZO {} on a base of {}",
            format_eur(self.contributions.mio_i),
            format_eur(self.contributions.mio_ii),
            format_eur(self.contributions.hzzo),
            format_eur(self.contributions.base)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JdooReport {
    pub year: i32,
    pub revenue: Decimal,
    pub costs: JdooCosts,
    /// Annual paušal costs at the same revenue, when it fits the regime.
    pub pausal_annual_total: Option<Decimal>,
}

pub fn run_jdoo(
    args: &JdooArgs,
    ctx: &Context,
) -> Result<JdooReport> {
    let data = app::select_year(&ctx.registry, args.year)?;

    let costs = calculate_jdoo_costs(data, args.revenue, args.other_employment);
    let pausal_annual_total = calculate_pausal_annual_costs(data, args.revenue, None)
        .ok()
        .map(|c| c.total);

    Ok(JdooReport {
        year: data.year,
        revenue: args.revenue,
        costs,
        pausal_annual_total,
    })
}

impl Render for JdooReport {
    fn render(
        &self,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        let c = &self.costs;
        writeln!(
            out,
            "j.d.o.o., {} revenue, {} rates",
            format_eur(self.revenue),
            self.year
        )?;
        writeln!(out)?;
        writeln!(out, "{:<28} {:>14}", "Director salary (monthly)", format_eur(c.monthly_director_salary))?;
        writeln!(out, "{:<28} {:>14}", "Contributions (yearly)", format_eur(c.yearly_contributions))?;
        writeln!(out, "{:<28} {:>14}", "Taxable profit", format_eur(c.taxable_profit))?;
        writeln!(out, "{:<28} {:>14}", "Profit tax (yearly)", format_eur(c.yearly_tax))?;
        writeln!(out, "{:<28} {:>13}%", "Effective tax rate", c.effective_tax_rate.normalize())?;

        if let Some(total) = self.pausal_annual_total {
            writeln!(out)?;
            writeln!(out, "As a paušalni obrt the same revenue costs {} a year.", format_eur(total))?;
        }
        Ok(())
    }
}
