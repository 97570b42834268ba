mod bank_statement;
mod business_type;
mod fiscal_year_data;
mod posd;
mod tax_bracket;

pub use bank_statement::{BankTransaction, MAX_TRANSACTION_AMOUNT, ParsedBankStatement};
pub use business_type::{BusinessType, ExpenseBracket, ExpenseBracketError, TzGroup};
pub use fiscal_year_data::{
    BracketTable, ChamberFees, ContributionRates, CorporateRates, Deadline, DeadlineKind,
    DeadlineTable, FiscalDataError, FiscalYearData, MAX_VERIFICATION_SPREAD_DAYS, PaymentAccount,
    PaymentAccounts, PaymentKind, SurtaxEntry, SurtaxTable, Thresholds, TzRates, validate_brackets,
};
pub use posd::{PosdInput, PosdResult, PosdWarning, QuarterlyIncome};
pub use tax_bracket::TaxBracket;
