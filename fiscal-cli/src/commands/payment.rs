use std::io::{self, Write};

use anyhow::{Result, anyhow, bail};
use fiscal_core::PaymentKind;
use fiscal_core::calculations::common::format_eur;
use fiscal_core::calculations::{calculate_contributions, get_pausal_tax_bracket, validate_oib};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Context, Render};
use crate::app;
use crate::cli::PaymentArgs;

/// Everything needed to fill in a payment order (uplatnica).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentReport {
    pub year: i32,
    pub kind: PaymentKind,
    pub recipient: String,
    pub iban: String,
    pub model: String,
    /// Model followed by the reference number, as written on the order.
    pub reference: String,
    /// Amount per payment, when it can be derived.
    pub amount: Option<Decimal>,
    pub frequency: &'static str,
}

pub fn run(
    args: &PaymentArgs,
    ctx: &Context,
) -> Result<PaymentReport> {
    let oib = args.oib.trim();
    if !validate_oib(oib) {
        bail!("'{oib}' is not a valid OIB");
    }

    let data = app::select_year(&ctx.registry, args.year)?;
    let kind = PaymentKind::from(args.kind);
    let account = data
        .payment_accounts
        .get(kind)
        .ok_or_else(|| anyhow!("no payment account for {kind:?} in {}", data.year))?;
    let reference = data
        .payment_accounts
        .reference_number(kind, oib)
        .ok_or_else(|| anyhow!("no payment account for {kind:?} in {}", data.year))?;

    let contributions = calculate_contributions(data);
    let (amount, frequency) = match kind {
        PaymentKind::PausalTax => {
            let amount = match args.revenue {
                Some(revenue) => Some(get_pausal_tax_bracket(data.brackets(), revenue)?.quarterly_tax),
                None => None,
            };
            (amount, "quarterly")
        }
        PaymentKind::MioI => (Some(contributions.mio_i), "monthly"),
        PaymentKind::MioII => (Some(contributions.mio_ii), "monthly"),
        PaymentKind::Hzzo => (Some(contributions.hzzo), "monthly"),
        PaymentKind::Hok => (Some(data.chamber_fees.hok_quarterly), "quarterly"),
    };

    Ok(PaymentReport {
        year: data.year,
        kind,
        recipient: account.recipient.clone(),
        iban: account.iban.clone(),
        model: data.payment_accounts.model.clone(),
        reference,
        amount,
        frequency,
    })
}

impl Render for PaymentReport {
    fn render(
        &self,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        writeln!(out, "Recipient: {}", self.recipient)?;
        writeln!(out, "IBAN:      {}", self.iban)?;
        writeln!(out, "Model:     {}", self.model)?;
        writeln!(out, "Reference: {}", self.reference)?;
        match self.amount {
            Some(amount) => writeln!(out, "Amount:    {} ({})", format_eur(amount), self.frequency),
            None => writeln!(out, "Amount:    pass --revenue to compute ({})", self.frequency),
        }
    }
}
