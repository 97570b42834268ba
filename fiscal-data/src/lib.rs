//! Input loaders for the fiscal engine: camt.053 bank statements, fiscal-year
//! TOML files and municipal surtax CSV tables.

pub mod bank_statement;
pub mod loader;

pub use bank_statement::{
    ParseError, UNKNOWN_BANK, bank_name_for, filter_income_transactions, parse_bank_file,
    parse_bank_xml,
};
pub use loader::{FiscalYearLoader, LoaderError, SurtaxLoader};
