//! camt.053 bank statement parser for Croatian bank exports.
//!
//! ## Supported layout
//!
//! The parser reads the ISO 20022 account statement (`BkToCstmrStmt/Stmt`)
//! and, because some banks export it instead, the account report
//! (`BkToCstmrAcctRpt/Rpt`). Only the elements below are used; everything
//! else in the document is ignored.
//!
//! | Element | Required | Notes |
//! |-------------------------------------|----------|--------------------------------------------|
//! | `Acct/Id/IBAN` | yes | `Acct/Id/Othr/Id` accepted as fallback |
//! | `FrToDt/FrDtTm` or `FrToDt/FrDt` | yes | time part ignored |
//! | `FrToDt/ToDtTm` or `FrToDt/ToDt` | yes | |
//! | `Ntry` | yes | at least one |
//! | `Ntry/Amt` | yes | decimal comma tolerated |
//! | `Ntry/CdtDbtInd` | yes | `CRDT` is income, `DBIT` is not |
//! | `Ntry/BookgDt` or `Ntry/ValDt` | yes | `Dt` or `DtTm` |
//! | `Acct/Svcr/FinInstnId/Nm` | no | bank name; otherwise derived from BIC/IBAN |
//! | `Ntry/NtryDtls/TxDtls/RltdPties` | no | debtor for credits, creditor for debits |
//! | `Ntry/NtryDtls/TxDtls/RmtInf/Ustrd` | no | falls back to `AddtlNtryInf` |
//!
//! Entries with status `PDNG` (pending) are skipped.
//!
//! Parsing is all-or-nothing: any structural problem yields a [`ParseError`]
//! and no partial statement is returned.

use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDate;
use fiscal_core::{BankTransaction, MAX_TRANSACTION_AMOUNT, ParsedBankStatement};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Used when neither the statement nor the BIC/IBAN identify the bank.
pub const UNKNOWN_BANK: &str = "Nepoznata banka";

static IBAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Z0-9]{11,30}$").expect("IBAN pattern is a valid regex")
});

/// Croatian banks by BIC prefix and by the bank code embedded in an HR IBAN.
static KNOWN_BANKS: [(&str, &str, &str); 6] = [
    ("ESBC", "2402006", "Erste&Steiermärkische Bank"),
    ("PBZG", "2340009", "Privredna banka Zagreb"),
    ("ZABA", "2360000", "Zagrebačka banka"),
    ("RZBH", "2484008", "Raiffeisenbank Austria"),
    ("OTPV", "2407000", "OTP banka"),
    ("HAAB", "2500009", "Addiko Bank"),
];

/// Errors that can occur while parsing a bank statement.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("bank statement is not well-formed XML: {0}")]
    MalformedXml(String),

    /// Well-formed XML that is not an ISO 20022 account statement.
    #[error("document is not a camt.053 bank statement (root element '{0}')")]
    UnexpectedSchema(String),

    #[error("missing required element {0}")]
    MissingElement(&'static str),

    #[error("entry {entry}: missing required element {element}")]
    MissingEntryElement { entry: usize, element: &'static str },

    #[error("invalid date '{value}' in {element}")]
    InvalidDate { element: &'static str, value: String },

    #[error("entry {entry}: invalid amount '{value}'")]
    InvalidAmount { entry: usize, value: String },

    #[error("entry {entry}: unknown credit/debit indicator '{value}'")]
    InvalidIndicator { entry: usize, value: String },

    #[error("statement period starts on {start}, after it ends on {end}")]
    InvertedPeriod { start: NaiveDate, end: NaiveDate },

    #[error("statement contains no entries")]
    NoEntries,

    #[error("document mixes statements for {first} and {other}")]
    MixedAccounts { first: String, other: String },

    #[error("unsupported file type '{0}', expected an .xml bank export")]
    UnsupportedFileType(String),

    #[error("cannot read bank statement: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Intermediate representation mirroring the XML layout. Every element is
// optional here; required elements are checked when converting.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct XmlDocument {
    #[serde(rename = "BkToCstmrStmt", alias = "BkToCstmrAcctRpt")]
    message: Option<XmlMessage>,
}

#[derive(Debug, Deserialize)]
struct XmlMessage {
    #[serde(rename = "Stmt", alias = "Rpt", default)]
    statements: Vec<XmlStatement>,
}

#[derive(Debug, Deserialize)]
struct XmlStatement {
    #[serde(rename = "FrToDt")]
    period: Option<XmlPeriod>,
    #[serde(rename = "Acct")]
    account: Option<XmlAccount>,
    #[serde(rename = "Ntry", default)]
    entries: Vec<XmlEntry>,
}

#[derive(Debug, Deserialize)]
struct XmlPeriod {
    #[serde(rename = "FrDtTm", alias = "FrDt")]
    from: Option<String>,
    #[serde(rename = "ToDtTm", alias = "ToDt")]
    to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlAccount {
    #[serde(rename = "Id")]
    id: Option<XmlAccountId>,
    #[serde(rename = "Ccy")]
    currency: Option<String>,
    #[serde(rename = "Svcr")]
    servicer: Option<XmlServicer>,
}

#[derive(Debug, Deserialize)]
struct XmlAccountId {
    #[serde(rename = "IBAN")]
    iban: Option<String>,
    #[serde(rename = "Othr")]
    other: Option<XmlOtherId>,
}

#[derive(Debug, Deserialize)]
struct XmlOtherId {
    #[serde(rename = "Id")]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlServicer {
    #[serde(rename = "FinInstnId")]
    institution: Option<XmlInstitution>,
}

#[derive(Debug, Deserialize)]
struct XmlInstitution {
    #[serde(rename = "BIC", alias = "BICFI")]
    bic: Option<String>,
    #[serde(rename = "Nm")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlEntry {
    #[serde(rename = "NtryRef")]
    reference: Option<String>,
    #[serde(rename = "Amt")]
    amount: Option<XmlAmount>,
    #[serde(rename = "CdtDbtInd")]
    indicator: Option<String>,
    #[serde(rename = "Sts")]
    status: Option<XmlStatus>,
    #[serde(rename = "BookgDt")]
    booking_date: Option<XmlDate>,
    #[serde(rename = "ValDt")]
    value_date: Option<XmlDate>,
    #[serde(rename = "AcctSvcrRef")]
    servicer_reference: Option<String>,
    #[serde(rename = "NtryDtls")]
    details: Option<XmlEntryDetails>,
    #[serde(rename = "AddtlNtryInf")]
    additional_info: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlAmount {
    #[serde(rename = "@Ccy")]
    currency: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

/// `<Sts>BOOK</Sts>` in older schema versions, `<Sts><Cd>BOOK</Cd></Sts>` in newer.
#[derive(Debug, Deserialize)]
struct XmlStatus {
    #[serde(rename = "$text")]
    text: Option<String>,
    #[serde(rename = "Cd")]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlDate {
    #[serde(rename = "Dt")]
    date: Option<String>,
    #[serde(rename = "DtTm")]
    date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlEntryDetails {
    #[serde(rename = "TxDtls", default)]
    transactions: Vec<XmlTransactionDetails>,
}

#[derive(Debug, Deserialize)]
struct XmlTransactionDetails {
    #[serde(rename = "Refs")]
    refs: Option<XmlRefs>,
    #[serde(rename = "RltdPties")]
    parties: Option<XmlParties>,
    #[serde(rename = "RmtInf")]
    remittance: Option<XmlRemittance>,
    #[serde(rename = "AddtlTxInf")]
    additional_info: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlRefs {
    #[serde(rename = "EndToEndId")]
    end_to_end_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlParties {
    #[serde(rename = "Dbtr")]
    debtor: Option<XmlParty>,
    #[serde(rename = "Cdtr")]
    creditor: Option<XmlParty>,
}

/// Party name sits directly under the party or, in newer versions, under `Pty`.
#[derive(Debug, Deserialize)]
struct XmlParty {
    #[serde(rename = "Nm")]
    name: Option<String>,
    #[serde(rename = "Pty")]
    party: Option<Box<XmlParty>>,
}

impl XmlParty {
    fn name(&self) -> Option<&str> {
        non_empty(self.name.as_deref()).or_else(|| self.party.as_ref().and_then(|p| p.name()))
    }
}

#[derive(Debug, Deserialize)]
struct XmlRemittance {
    #[serde(rename = "Ustrd", default)]
    unstructured: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parses a camt.053 XML export into a [`ParsedBankStatement`].
///
/// # Errors
///
/// * [`ParseError::MalformedXml`] – the text is not well-formed XML.
/// * [`ParseError::UnexpectedSchema`] – well-formed XML without a statement.
/// * [`ParseError::MissingElement`] / [`ParseError::MissingEntryElement`] –
///   the IBAN, period, amount, indicator or date is absent.
/// * [`ParseError::InvalidDate`], [`ParseError::InvalidAmount`],
///   [`ParseError::InvalidIndicator`] – a value cannot be interpreted.
/// * [`ParseError::InvertedPeriod`], [`ParseError::NoEntries`],
///   [`ParseError::MixedAccounts`] – the statement is structurally unusable.
pub fn parse_bank_xml(xml: &str) -> Result<ParsedBankStatement, ParseError> {
    let root = check_well_formed(xml)?;

    let document: XmlDocument =
        quick_xml::de::from_str(xml).map_err(|e| ParseError::MalformedXml(e.to_string()))?;

    let message = document
        .message
        .ok_or_else(|| ParseError::UnexpectedSchema(root.clone()))?;
    if message.statements.is_empty() {
        return Err(ParseError::UnexpectedSchema(root));
    }

    let mut merged: Option<ParsedBankStatement> = None;
    let mut entry_offset = 0;

    for xml_statement in message.statements {
        let entry_count = xml_statement.entries.len();
        let statement = convert_statement(xml_statement, entry_offset)?;
        entry_offset += entry_count;

        merged = Some(match merged {
            None => statement,
            Some(existing) => merge(existing, statement)?,
        });
    }

    // Pending entries are dropped during conversion.
    let statement = merged.ok_or(ParseError::NoEntries)?;
    if statement.transactions.is_empty() {
        return Err(ParseError::NoEntries);
    }

    let outside = statement.out_of_period().count();
    if outside > 0 {
        warn!(
            count = outside,
            start = %statement.period_start,
            end = %statement.period_end,
            "transactions dated outside the statement period"
        );
    }

    debug!(
        bank = %statement.bank_name,
        iban = %statement.iban,
        transactions = statement.transactions.len(),
        "parsed bank statement"
    );

    Ok(statement)
}

/// Reads and parses a bank export from disk. Only `.xml` files are accepted.
pub fn parse_bank_file(path: &Path) -> Result<ParsedBankStatement, ParseError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if extension != "xml" {
        return Err(ParseError::UnsupportedFileType(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        ));
    }

    let contents = std::fs::read_to_string(path)?;
    parse_bank_xml(&contents)
}

/// Keeps only the transactions classified as income.
pub fn filter_income_transactions(transactions: &[BankTransaction]) -> Vec<BankTransaction> {
    transactions.iter().filter(|t| t.is_income).cloned().collect()
}

/// Human-readable bank name for a BIC or a Croatian IBAN.
pub fn bank_name_for(
    bic: Option<&str>,
    iban: &str,
) -> Option<&'static str> {
    if let Some(bic) = bic {
        let prefix = bic.trim().to_uppercase();
        if let Some((_, _, name)) = KNOWN_BANKS.iter().find(|(p, _, _)| prefix.starts_with(p)) {
            return Some(*name);
        }
    }

    let bank_code = iban.strip_prefix("HR").and_then(|rest| rest.get(2..9))?;
    KNOWN_BANKS
        .iter()
        .find(|(_, code, _)| *code == bank_code)
        .map(|(_, _, name)| *name)
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// First pass over the raw events: rejects malformed documents and returns
/// the local name of the root element.
fn check_well_formed(xml: &str) -> Result<String, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut root: Option<String> = None;
    let mut depth: usize = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if root.is_none() {
                    root = Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) => {
                if root.is_none() {
                    root = Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Text(t)) if depth == 0 => {
                let text = t.unescape().map_err(|e| ParseError::MalformedXml(e.to_string()))?;
                if !text.trim().is_empty() {
                    return Err(ParseError::MalformedXml(
                        "text outside the root element".to_string(),
                    ));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ParseError::MalformedXml(format!(
                    "at byte {}: {e}",
                    reader.error_position()
                )));
            }
        }
    }

    if depth != 0 {
        return Err(ParseError::MalformedXml("unexpected end of document".to_string()));
    }

    root.ok_or_else(|| ParseError::MalformedXml("document has no root element".to_string()))
}

fn convert_statement(
    statement: XmlStatement,
    entry_offset: usize,
) -> Result<ParsedBankStatement, ParseError> {
    let account = statement
        .account
        .ok_or(ParseError::MissingElement("Stmt/Acct"))?;

    let iban = account
        .id
        .as_ref()
        .and_then(|id| {
            non_empty(id.iban.as_deref())
                .or_else(|| id.other.as_ref().and_then(|o| non_empty(o.id.as_deref())))
        })
        .map(normalize_iban)
        .ok_or(ParseError::MissingElement("Stmt/Acct/Id/IBAN"))?;
    if !IBAN_PATTERN.is_match(&iban) {
        warn!(%iban, "account identifier does not look like an IBAN");
    }

    let institution = account.servicer.as_ref().and_then(|s| s.institution.as_ref());
    let bank_name = institution
        .and_then(|i| non_empty(i.name.as_deref()))
        .map(str::to_string)
        .or_else(|| {
            bank_name_for(institution.and_then(|i| i.bic.as_deref()), &iban).map(str::to_string)
        })
        .unwrap_or_else(|| UNKNOWN_BANK.to_string());

    let period = statement
        .period
        .ok_or(ParseError::MissingElement("Stmt/FrToDt"))?;
    let period_start = parse_date(
        "FrToDt/FrDtTm",
        non_empty(period.from.as_deref()).ok_or(ParseError::MissingElement("Stmt/FrToDt/FrDtTm"))?,
    )?;
    let period_end = parse_date(
        "FrToDt/ToDtTm",
        non_empty(period.to.as_deref()).ok_or(ParseError::MissingElement("Stmt/FrToDt/ToDtTm"))?,
    )?;
    if period_start > period_end {
        return Err(ParseError::InvertedPeriod {
            start: period_start,
            end: period_end,
        });
    }

    let mut currency = non_empty(account.currency.as_deref()).map(str::to_string);
    let mut transactions = Vec::with_capacity(statement.entries.len());

    for (index, entry) in statement.entries.into_iter().enumerate() {
        let number = entry_offset + index + 1;
        if is_pending(&entry) {
            debug!(entry = number, "skipping pending entry");
            continue;
        }
        if currency.is_none() {
            currency = entry
                .amount
                .as_ref()
                .and_then(|a| non_empty(a.currency.as_deref()))
                .map(str::to_string);
        }
        transactions.push(convert_entry(entry, number)?);
    }

    Ok(ParsedBankStatement {
        bank_name,
        iban,
        currency,
        period_start,
        period_end,
        transactions,
    })
}

fn convert_entry(
    entry: XmlEntry,
    number: usize,
) -> Result<BankTransaction, ParseError> {
    let raw_amount = entry
        .amount
        .as_ref()
        .and_then(|a| non_empty(a.value.as_deref()))
        .ok_or(ParseError::MissingEntryElement {
            entry: number,
            element: "Amt",
        })?;
    let amount = parse_amount(raw_amount)
        .filter(|a| a.abs() <= MAX_TRANSACTION_AMOUNT)
        .ok_or_else(|| ParseError::InvalidAmount {
            entry: number,
            value: raw_amount.to_string(),
        })?;

    let indicator = non_empty(entry.indicator.as_deref()).ok_or(
        ParseError::MissingEntryElement {
            entry: number,
            element: "CdtDbtInd",
        },
    )?;
    let is_income = match indicator.to_uppercase().as_str() {
        "CRDT" => true,
        "DBIT" => false,
        other => {
            return Err(ParseError::InvalidIndicator {
                entry: number,
                value: other.to_string(),
            });
        }
    };
    let amount = if is_income { amount.abs() } else { -amount.abs() };

    let raw_date = [&entry.booking_date, &entry.value_date]
        .into_iter()
        .flatten()
        .find_map(|d| non_empty(d.date.as_deref()).or_else(|| non_empty(d.date_time.as_deref())))
        .ok_or(ParseError::MissingEntryElement {
            entry: number,
            element: "BookgDt",
        })?;
    let date = parse_date("Ntry/BookgDt", raw_date)?;

    let details = entry
        .details
        .as_ref()
        .and_then(|d| d.transactions.first());

    let id = non_empty(entry.reference.as_deref())
        .or_else(|| non_empty(entry.servicer_reference.as_deref()))
        .or_else(|| {
            details
                .and_then(|d| d.refs.as_ref())
                .and_then(|r| non_empty(r.end_to_end_id.as_deref()))
                .filter(|id| *id != "NOTPROVIDED")
        })
        .map(str::to_string)
        .unwrap_or_else(|| format!("ntry-{number}"));

    let counterparty = details
        .and_then(|d| d.parties.as_ref())
        .and_then(|p| {
            let (primary, secondary) = if is_income {
                (&p.debtor, &p.creditor)
            } else {
                (&p.creditor, &p.debtor)
            };
            primary
                .as_ref()
                .and_then(XmlParty::name)
                .or_else(|| secondary.as_ref().and_then(XmlParty::name))
        })
        .unwrap_or_default()
        .to_string();

    let remittance = details
        .and_then(|d| d.remittance.as_ref())
        .map(|r| {
            r.unstructured
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|s| !s.is_empty());
    let description = remittance
        .or_else(|| details.and_then(|d| non_empty(d.additional_info.as_deref())).map(str::to_string))
        .or_else(|| non_empty(entry.additional_info.as_deref()).map(str::to_string))
        .unwrap_or_default();

    Ok(BankTransaction {
        id,
        date,
        amount,
        counterparty,
        description,
        is_income,
    })
}

fn merge(
    mut first: ParsedBankStatement,
    other: ParsedBankStatement,
) -> Result<ParsedBankStatement, ParseError> {
    if first.iban != other.iban {
        return Err(ParseError::MixedAccounts {
            first: first.iban,
            other: other.iban,
        });
    }
    first.period_start = first.period_start.min(other.period_start);
    first.period_end = first.period_end.max(other.period_end);
    if first.currency.is_none() {
        first.currency = other.currency;
    }
    first.transactions.extend(other.transactions);
    Ok(first)
}

fn is_pending(entry: &XmlEntry) -> bool {
    entry
        .status
        .as_ref()
        .and_then(|s| non_empty(s.code.as_deref()).or_else(|| non_empty(s.text.as_deref())))
        .is_some_and(|code| code.eq_ignore_ascii_case("PDNG"))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn normalize_iban(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Accepts `2025-03-31`, `2025-03-31T23:59:59` (any suffix) and `31.03.2025`.
fn parse_date(
    element: &'static str,
    value: &str,
) -> Result<NaiveDate, ParseError> {
    let trimmed = value.trim();
    let iso = trimmed
        .get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

    iso.or_else(|| NaiveDate::parse_from_str(trimmed.trim_end_matches('.'), "%d.%m.%Y").ok())
        .ok_or_else(|| ParseError::InvalidDate {
            element,
            value: value.to_string(),
        })
}

/// Parses `1250.00`, `1250,00` and `1.250,00`.
fn parse_amount(value: &str) -> Option<Decimal> {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    let normalized = if compact.contains(',') {
        compact.replace('.', "").replace(',', ".")
    } else {
        compact
    };
    normalized.parse().ok()
}
