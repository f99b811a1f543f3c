//! Defines the core data model and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// A ledger entry, i.e. one movement of money on a bank account.
///
/// Transactions are created once by the ingestor and never change afterwards.
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction, assigned by the database on insert.
    pub id: TransactionId,
    /// When the transaction happened.
    pub transaction_date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned in this transaction.
    ///
    /// Positive values are credits, negative values are debits.
    pub amount: Option<f64>,
    /// A free-text category, e.g. "Food" or "Housing".
    pub category: Option<String>,
    /// The bank or account the transaction came from.
    pub bank: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(transaction_date: Date, description: &str, bank: &str) -> NewTransaction {
        NewTransaction {
            id: None,
            transaction_date,
            description: description.to_owned(),
            amount: None,
            category: None,
            bank: bank.to_owned(),
        }
    }
}

/// A transaction that has not been written to the database yet.
///
/// The optional fields default to `None`. Leave `id` unset to have the
/// database assign the next ID.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// use crate::transaction::Transaction;
///
/// let coffee = Transaction::build(date!(2023 - 01 - 01), "Coffee", "Chase")
///     .amount(Some(-4.5))
///     .category(Some("Food".to_owned()));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct NewTransaction {
    /// An explicit ID for the transaction.
    ///
    /// The ingestor never sets this. Inserting an ID that already exists
    /// fails with [Error::ConstraintViolation].
    pub id: Option<TransactionId>,
    /// The date when the transaction occurred.
    pub transaction_date: Date,
    /// A human-readable description of the transaction, stored verbatim.
    pub description: String,
    /// The signed amount of the transaction, if known.
    pub amount: Option<f64>,
    /// The category of the transaction, if any.
    pub category: Option<String>,
    /// The bank or account the transaction came from.
    pub bank: String,
}

impl NewTransaction {
    /// Set an explicit ID for the transaction.
    pub fn id(mut self, id: Option<TransactionId>) -> Self {
        self.id = id;
        self
    }

    /// Set the amount for the transaction.
    pub fn amount(mut self, amount: Option<f64>) -> Self {
        self.amount = amount;
        self
    }

    /// Set the category for the transaction.
    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Insert `transactions` into the database in file order as a single SQL transaction.
///
/// Each transaction without an explicit ID is given the next ID after the
/// current largest ID, starting from zero for an empty table. If any insert
/// fails, nothing is committed.
///
/// # Errors
/// This function will return a:
/// - [Error::ConstraintViolation] if an explicit ID already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn append_transactions(
    transactions: Vec<NewTransaction>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let sql_transaction = connection.unchecked_transaction()?;
    let mut inserted = Vec::with_capacity(transactions.len());

    {
        let mut next_id_statement = sql_transaction
            .prepare_cached("SELECT COALESCE(MAX(id) + 1, 0) FROM \"transaction\"")?;
        let mut insert_statement = sql_transaction.prepare_cached(
            "INSERT INTO \"transaction\" (id, transaction_date, description, amount, category, bank)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, transaction_date, description, amount, category, bank",
        )?;

        for transaction in transactions {
            let id: TransactionId = match transaction.id {
                Some(id) => id,
                None => next_id_statement.query_row([], |row| row.get(0))?,
            };

            let row = insert_statement.query_row(
                (
                    id,
                    transaction.transaction_date,
                    transaction.description,
                    transaction.amount,
                    transaction.category,
                    transaction.bank,
                ),
                map_transaction_row,
            )?;

            inserted.push(row);
        }
    }

    // Dropping `sql_transaction` on an early return above rolls back the batch.
    sql_transaction.commit()?;

    Ok(inserted)
}

/// Retrieve every transaction in the database in ascending ID order.
///
/// Each call runs a fresh query, so calls never share cursor state.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn list_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, transaction_date, description, amount, category, bank
             FROM \"transaction\" ORDER BY id ASC",
        )?
        .query_map([], map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

/// Retrieve at most `limit` transactions in ascending ID order, skipping the first `offset`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidArgument] if `offset` or `limit` do not fit in an SQLite integer,
/// - or [Error::SqlError] if there is some SQL error.
pub fn get_transactions_slice(
    offset: u64,
    limit: u64,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let offset = i64::try_from(offset)
        .map_err(|_| Error::InvalidArgument(format!("offset {offset} is too large")))?;
    let limit = i64::try_from(limit)
        .map_err(|_| Error::InvalidArgument(format!("limit {limit} is too large")))?;

    connection
        .prepare(
            "SELECT id, transaction_date, description, amount, category, bank
             FROM \"transaction\" ORDER BY id ASC LIMIT ?1 OFFSET ?2",
        )?
        .query_map((limit, offset), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u64, Error> {
    let count: i64 =
        connection.query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })?;

    Ok(count.unsigned_abs())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY NOT NULL,
                transaction_date TEXT NOT NULL,
                description TEXT NOT NULL,
                amount REAL,
                category TEXT,
                bank TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let transaction_date = row.get(1)?;
    let description = row.get(2)?;
    let amount = row.get(3)?;
    let category = row.get(4)?;
    let bank = row.get(5)?;

    Ok(Transaction {
        id,
        transaction_date,
        description,
        amount,
        category,
        bank,
    })
}

// ============================================================================
// TESTS
// ============================================================================
