//! Built-in fiscal reference data.
//!
//! Figures are in EUR. Rates are fractions (`0.15` for 15%).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{
    BracketTable, ChamberFees, ContributionRates, CorporateRates, Deadline, DeadlineKind,
    DeadlineTable, FiscalYearData, PaymentAccount, PaymentAccounts, PaymentKind, SurtaxEntry,
    SurtaxTable, TaxBracket, Thresholds, TzRates,
};

const YEAR_2025: i32 = 2025;

fn ymd(
    year: i32,
    month: u32,
    day: u32,
) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("reference dates are valid calendar dates")
}

fn bracket(
    min_revenue: Decimal,
    max_revenue: Decimal,
    tax_base: Decimal,
    annual_tax: Decimal,
    quarterly_tax: Decimal,
) -> TaxBracket {
    TaxBracket {
        min_revenue,
        max_revenue,
        tax_base,
        annual_tax,
        quarterly_tax,
    }
}

/// Paušal brackets for 2025. Tax is 12% of the bracket's tax base.
pub fn pausal_brackets_2025() -> Vec<TaxBracket> {
    vec![
        bracket(dec!(0.00), dec!(11300.00), dec!(1695.00), dec!(203.40), dec!(50.85)),
        bracket(dec!(11300.01), dec!(15300.00), dec!(2295.00), dec!(275.40), dec!(68.85)),
        bracket(dec!(15300.01), dec!(19900.00), dec!(2985.00), dec!(358.20), dec!(89.55)),
        bracket(dec!(19900.01), dec!(30600.00), dec!(4590.00), dec!(550.80), dec!(137.70)),
        bracket(dec!(30600.01), dec!(40000.00), dec!(6000.00), dec!(720.00), dec!(180.00)),
        bracket(dec!(40000.01), dec!(50000.00), dec!(7500.00), dec!(900.00), dec!(225.00)),
        bracket(dec!(50000.01), dec!(60000.00), dec!(9000.00), dec!(1080.00), dec!(270.00)),
    ]
}

fn surtax_entries_2025() -> Vec<SurtaxEntry> {
    [
        ("10000", "Zagreb", dec!(0.18)),
        ("21000", "Split", dec!(0.15)),
        ("51000", "Rijeka", dec!(0.14)),
        ("31000", "Osijek", dec!(0.13)),
        ("23000", "Zadar", dec!(0.12)),
        ("52100", "Pula", dec!(0.12)),
        ("42000", "Varaždin", dec!(0.10)),
        ("20000", "Dubrovnik", dec!(0.10)),
        ("22000", "Šibenik", dec!(0.10)),
        ("47000", "Karlovac", dec!(0.12)),
        ("35000", "Slavonski Brod", dec!(0.12)),
        ("40000", "Čakovec", dec!(0.10)),
    ]
    .into_iter()
    .map(|(postal_code, municipality, rate)| SurtaxEntry {
        postal_code: postal_code.to_string(),
        municipality: municipality.to_string(),
        rate,
    })
    .collect()
}

fn deadlines_2025() -> Vec<Deadline> {
    let mut deadlines = vec![Deadline {
        date: ymd(YEAR_2025, 1, 15),
        kind: DeadlineKind::Posd,
        description: "Predaja PO-SD obrasca za 2024.".to_string(),
    }];

    for month in 1..=12 {
        deadlines.push(Deadline {
            date: ymd(YEAR_2025, month, 15),
            kind: DeadlineKind::Contributions,
            description: "Doprinosi MIO i HZZO za prethodni mjesec".to_string(),
        });
    }

    for (quarter, (month, day)) in [(3, 31), (6, 30), (9, 30), (12, 31)].into_iter().enumerate() {
        deadlines.push(Deadline {
            date: ymd(YEAR_2025, month, day),
            kind: DeadlineKind::PausalTax,
            description: format!("Paušalni porez za {}. tromjesečje", quarter + 1),
        });
        deadlines.push(Deadline {
            date: ymd(YEAR_2025, month, day),
            kind: DeadlineKind::ChamberFee,
            description: format!("Članarina HOK za {}. tromjesečje", quarter + 1),
        });
    }

    deadlines.push(Deadline {
        date: ymd(YEAR_2025, 10, 31),
        kind: DeadlineKind::TzContribution,
        description: "Članarina turističkoj zajednici".to_string(),
    });

    deadlines.sort_by_key(|d| d.date);
    deadlines
}

fn payment_accounts_2025() -> Vec<PaymentAccount> {
    let budget = "Državni proračun Republike Hrvatske";
    [
        (PaymentKind::PausalTax, budget, "HR1210010051863000160", "1449"),
        (PaymentKind::MioI, budget, "HR1210010051863000160", "8168"),
        (PaymentKind::MioII, "Doprinos za mirovinsko osiguranje II. stup", "HR7610010051700036001", "2003"),
        (PaymentKind::Hzzo, "Doprinos za zdravstveno osiguranje", "HR6510010051550100001", "8486"),
        (PaymentKind::Hok, "Hrvatska obrtnička komora", "HR1210010051863000160", "7668"),
    ]
    .into_iter()
    .map(|(kind, recipient, iban, reference_prefix)| PaymentAccount {
        kind,
        recipient: recipient.to_string(),
        iban: iban.to_string(),
        reference_prefix: reference_prefix.to_string(),
    })
    .collect()
}

/// The complete 2025 dataset.
pub fn fiscal_year_2025() -> FiscalYearData {
    let year = YEAR_2025;
    let last_verified = ymd(2025, 1, 15);

    FiscalYearData {
        year,
        last_verified,
        contributions: ContributionRates {
            year,
            last_verified,
            base: dec!(719.20),
            mio_i_rate: dec!(0.15),
            mio_ii_rate: dec!(0.05),
            hzzo_rate: dec!(0.165),
        },
        tax_brackets: BracketTable {
            year,
            last_verified,
            brackets: pausal_brackets_2025(),
        },
        thresholds: Thresholds {
            year,
            last_verified,
            pdv_threshold: dec!(60000.00),
            pausal_limit: dec!(60000.00),
            vat_warning_percentage: dec!(90),
            pausal_income_tax_rate: dec!(0.12),
        },
        chamber_fees: ChamberFees {
            year,
            last_verified,
            hok_monthly: dec!(11.40),
            hok_quarterly: dec!(34.20),
        },
        tz_rates: TzRates {
            year,
            last_verified,
            group_1: dec!(0.0014212),
            group_2: dec!(0.0011367),
            group_3: dec!(0.0008527),
            group_4: dec!(0.0002842),
            group_5: dec!(0.0001705),
        },
        surtax: SurtaxTable {
            year,
            last_verified,
            entries: surtax_entries_2025(),
        },
        deadlines: DeadlineTable {
            year,
            last_verified,
            deadlines: deadlines_2025(),
        },
        payment_accounts: PaymentAccounts {
            year,
            last_verified,
            model: "HR68".to_string(),
            accounts: payment_accounts_2025(),
        },
        corporate: CorporateRates {
            year,
            last_verified,
            director_min_monthly_salary: dec!(700.00),
            director_contribution_rate: dec!(0.365),
            assumed_cost_ratio: dec!(0.20),
            lower_profit_tax_rate: dec!(0.10),
            upper_profit_tax_rate: dec!(0.18),
            lower_rate_limit: dec!(1000000.00),
        },
    }
}
