//! Transaction records for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` builder
//! - The mapping from raw CSV rows to transactions
//! - Database functions for storing and listing transactions

mod core;
mod schema;

pub use core::{
    NewTransaction, Transaction, append_transactions, count_transactions,
    create_transaction_table, get_transactions_slice, list_all_transactions,
};
pub use schema::{REQUIRED_HEADERS, RawTransactionRow};
