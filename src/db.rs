//! Sets up the application's SQLite database.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{Error, transaction::create_transaction_table};

/// Create all of the application's tables.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an [Error::SqlError] if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).expect("first initialize failed");
        initialize(&conn).expect("second initialize failed");
    }
}
