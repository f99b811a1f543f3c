//! Maps raw CSV rows with human-readable headers onto [NewTransaction].

use serde::Deserialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::Error;

use super::{NewTransaction, Transaction};

const ISO_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");
const US_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[month padding:none]/[day padding:none]/[year]");

/// The column headers every source CSV must have, in no particular order.
pub const REQUIRED_HEADERS: [&str; 5] =
    ["Transaction Date", "Description", "Amount", "Category", "Bank"];

/// One row of the source CSV, keyed by the source column headers.
///
/// Values are kept as the raw strings the CSV reader produced. Columns that
/// are not listed here, such as the leading index column written by
/// spreadsheet exports, are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTransactionRow {
    /// The `Transaction Date` column.
    #[serde(rename = "Transaction Date")]
    pub transaction_date: String,
    /// The `Description` column.
    #[serde(rename = "Description")]
    pub description: String,
    /// The `Amount` column, empty when the amount is unknown.
    #[serde(rename = "Amount")]
    pub amount: String,
    /// The `Category` column, empty when uncategorised.
    #[serde(rename = "Category")]
    pub category: String,
    /// The `Bank` column.
    #[serde(rename = "Bank")]
    pub bank: String,
}

impl RawTransactionRow {
    /// Coerce the raw row into a transaction ready to be stored.
    ///
    /// `row` is the 1-based data row number used in error messages.
    ///
    /// String fields are kept byte-for-byte. An empty `Amount` or `Category`
    /// becomes `None`.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the date or amount cannot be parsed, or
    /// if a required field is empty.
    pub fn coerce(self, row: usize) -> Result<NewTransaction, Error> {
        let transaction_date = parse_date(&self.transaction_date, row)?;
        require_non_empty(&self.description, "description", row)?;
        require_non_empty(&self.bank, "bank", row)?;
        let amount = parse_amount(&self.amount, row)?;
        let category = if self.category.is_empty() {
            None
        } else {
            Some(self.category)
        };

        Ok(
            Transaction::build(transaction_date, &self.description, &self.bank)
                .amount(amount)
                .category(category),
        )
    }
}

fn require_non_empty(value: &str, field: &'static str, row: usize) -> Result<(), Error> {
    if value.is_empty() {
        return Err(Error::Validation {
            row,
            field,
            reason: "a value is required".to_owned(),
        });
    }

    Ok(())
}

/// Parse an ISO 8601 (`2023-01-31`) or US style (`1/31/2023`) date.
fn parse_date(text: &str, row: usize) -> Result<Date, Error> {
    let trimmed = text.trim();

    Date::parse(trimmed, ISO_DATE_FORMAT)
        .or_else(|_| Date::parse(trimmed, US_DATE_FORMAT))
        .map_err(|error| Error::Validation {
            row,
            field: "transaction_date",
            reason: format!("\"{text}\" is not a date: {error}"),
        })
}

fn parse_amount(text: &str, row: usize) -> Result<Option<f64>, Error> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Ok(None);
    }

    let invalid = |reason: String| Error::Validation {
        row,
        field: "amount",
        reason,
    };

    let amount: f64 = trimmed
        .parse()
        .map_err(|error| invalid(format!("\"{text}\" is not a number: {error}")))?;

    if !amount.is_finite() {
        return Err(invalid(format!("\"{text}\" is not a finite number")));
    }

    Ok(Some(amount))
}
