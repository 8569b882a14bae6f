//! CSV import and export of transactions
//!
//! Import accepts any CSV with a header row containing `Date`, `Description`
//! and `Amount` columns (matched case-insensitively, in any order, other
//! columns ignored). The sign of the amount decides the type: negative
//! amounts are expenses, everything else is income. Amounts are stored as
//! absolute values.
//!
//! Export writes `Date,Description,Type,Amount,Category,Account` with the
//! description always quoted.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::transaction::{Transaction, TransactionType};

pub const DEFAULT_IMPORT_DESCRIPTION: &str = "Imported Transaction";

pub const EXPORT_HEADER: &str = "Date,Description,Type,Amount,Category,Account";

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("No transactions found")]
    Empty,

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Invalid amount on line {line}: {value:?}")]
    InvalidAmount { line: u64, value: String },

    #[error("Invalid date on line {line}: {value:?}")]
    InvalidDate { line: u64, value: String },

    #[error("Malformed CSV: {0}")]
    Malformed(#[from] csv::Error),
}

/// One parsed import row, ready to be attached to an account
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedRow {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub transaction_type: TransactionType,
}

struct Columns {
    date: Option<usize>,
    description: Option<usize>,
    amount: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, CsvError> {
        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));

        Ok(Self {
            date: find("date"),
            description: find("description"),
            amount: find("amount").ok_or(CsvError::MissingColumn("Amount"))?,
        })
    }
}

/// Parses an uploaded CSV document
///
/// Rows without a date are dated `today`. Blank rows are skipped. Any row
/// with a zero or unparsable amount fails the whole import.
pub fn parse_import(input: &str, today: NaiveDate) -> Result<Vec<ImportedRow>, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::Empty);
    }
    let columns = Columns::locate(&headers)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        rows.push(parse_row(&record, &columns, line, today)?);
    }

    if rows.is_empty() {
        return Err(CsvError::Empty);
    }

    Ok(rows)
}

fn parse_row(
    record: &csv::StringRecord,
    columns: &Columns,
    line: u64,
    today: NaiveDate,
) -> Result<ImportedRow, CsvError> {
    let field = |index: Option<usize>| index.and_then(|i| record.get(i)).filter(|v| !v.is_empty());

    let raw_amount = field(Some(columns.amount)).unwrap_or_default();
    let amount: f64 = raw_amount
        .parse()
        .ok()
        .filter(|a: &f64| a.is_finite() && *a != 0.0)
        .ok_or_else(|| CsvError::InvalidAmount {
            line,
            value: raw_amount.to_string(),
        })?;

    let date = match field(columns.date) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| CsvError::InvalidDate {
            line,
            value: raw.to_string(),
        })?,
        None => today,
    };

    let transaction_type = if amount < 0.0 {
        TransactionType::Expense
    } else {
        TransactionType::Income
    };

    Ok(ImportedRow {
        date,
        description: field(columns.description)
            .unwrap_or(DEFAULT_IMPORT_DESCRIPTION)
            .to_string(),
        amount: amount.abs(),
        transaction_type,
    })
}

/// Renders transactions as a CSV document, in the order given
pub fn write_export(transactions: &[Transaction]) -> Result<String, CsvError> {
    let mut out = String::from(EXPORT_HEADER);
    out.push('\n');

    for t in transactions {
        let amount = format!("{:.2}", t.amount);
        let tail = record(&[
            t.transaction_type.as_str(),
            amount.as_str(),
            t.category_name.as_deref().unwrap_or_default(),
            t.account_name.as_str(),
        ])?;

        out.push_str(&format!(
            "{},\"{}\",{}",
            t.transaction_date.format("%Y-%m-%d"),
            t.description.as_deref().unwrap_or_default().replace('"', "\"\""),
            tail
        ));
    }

    Ok(out)
}

/// One newline-terminated record, quoting only the fields that need it
fn record(fields: &[&str]) -> Result<String, CsvError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(fields)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::Malformed(e.into_error().into()))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
