//! One-shot loading of a transactions CSV file into the database.
//!
//! The whole file is parsed before anything is written, and the rows are
//! inserted in a single SQL transaction, so a bad row leaves the database
//! untouched.

use std::{fs::File, io::Read, path::Path};

use rusqlite::Connection;

use crate::{
    Error,
    transaction::{
        NewTransaction, REQUIRED_HEADERS, RawTransactionRow, append_transactions,
        count_transactions,
    },
};

/// Load every row of the CSV file at `source_path` into the database.
///
/// Returns the number of rows inserted.
///
/// # Errors
/// This function will return a:
/// - [Error::SourceUnavailable] if the file cannot be opened or read,
/// - [Error::Validation] if any row cannot be coerced into a transaction,
/// - or [Error::ConstraintViolation]/[Error::SqlError] if the insert fails.
pub fn ingest(source_path: &Path, connection: &Connection) -> Result<usize, Error> {
    let source_name = source_path.display().to_string();
    let file = File::open(source_path).map_err(|error| Error::SourceUnavailable {
        path: source_name.clone(),
        reason: error.to_string(),
    })?;

    tracing::info!("Ingesting transactions from {source_name}");
    let count = ingest_reader(file, &source_name, connection)?;
    tracing::info!("Ingested {count} transactions from {source_name}");

    Ok(count)
}

/// Ingest the CSV file at `source_path` only if the database has no transactions yet.
///
/// Returns `None` when ingestion was skipped, which keeps restarts from
/// loading the same file twice.
///
/// # Errors
/// Returns the same errors as [ingest].
pub fn ingest_on_first_run(
    source_path: &Path,
    connection: &Connection,
) -> Result<Option<usize>, Error> {
    let existing = count_transactions(connection)?;

    if existing > 0 {
        tracing::info!(
            "Skipping ingestion of {}: the database already holds {existing} transactions",
            source_path.display()
        );
        return Ok(None);
    }

    ingest(source_path, connection).map(Some)
}

/// Parse CSV text from `reader` and insert the rows into the database.
///
/// `source_name` identifies the reader in error messages.
pub fn ingest_reader<R: Read>(
    reader: R,
    source_name: &str,
    connection: &Connection,
) -> Result<usize, Error> {
    let transactions = read_transactions(reader, source_name)?;
    let inserted = append_transactions(transactions, connection)?;

    Ok(inserted.len())
}

/// Parse and coerce every row of the CSV text in `reader`, preserving file order.
///
/// # Errors
/// Returns an [Error::Validation] for row 0 if the header row is missing or
/// lacks a required column. Otherwise stops at the first row that fails and
/// returns its [Error::Validation], or [Error::SourceUnavailable] if reading
/// fails part way through.
pub fn read_transactions<R: Read>(
    reader: R,
    source_name: &str,
) -> Result<Vec<NewTransaction>, Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|error| map_csv_error(error, 0, source_name))?;
    check_headers(headers)?;

    csv_reader
        .deserialize::<RawTransactionRow>()
        .enumerate()
        .map(|(index, result)| {
            let row = index + 1;
            let raw_row = result.map_err(|error| map_csv_error(error, row, source_name))?;
            raw_row.coerce(row)
        })
        .collect()
}

/// Check that the header row names every required column.
///
/// An empty file yields an empty header row and is rejected here too.
fn check_headers(headers: &csv::StringRecord) -> Result<(), Error> {
    if headers.iter().all(str::is_empty) {
        return Err(Error::Validation {
            row: 0,
            field: "header",
            reason: "the file has no header row".to_owned(),
        });
    }

    let missing: Vec<_> = REQUIRED_HEADERS
        .into_iter()
        .filter(|required| !headers.iter().any(|header| header == *required))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation {
            row: 0,
            field: "header",
            reason: format!("missing required columns: {}", missing.join(", ")),
        })
    }
}

fn map_csv_error(error: csv::Error, row: usize, source_name: &str) -> Error {
    match error.kind() {
        csv::ErrorKind::Io(io_error) => Error::SourceUnavailable {
            path: source_name.to_owned(),
            reason: io_error.to_string(),
        },
        _ => Error::Validation {
            row,
            field: "record",
            reason: error.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Write, path::Path};

    use rusqlite::Connection;
    use tempfile::NamedTempFile;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        transaction::{Transaction, count_transactions, list_all_transactions},
    };

    use super::{ingest, ingest_on_first_run, ingest_reader, read_transactions};

    const SCENARIO_CSV: &str = "\
,Transaction Date,Description,Amount,Category,Bank
0,2023-01-01,Coffee,-4.50,Food,Chase
1,2023-01-02,Paycheck,2000.00,,Chase
2,2023-01-03,Rent,-1200.00,Housing,Ally
";

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn write_temp_csv(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Could not create temp file");
        file.write_all(text.as_bytes())
            .expect("Could not write temp file");
        file
    }

    #[test]
    fn ingests_every_row_in_file_order() {
        let conn = get_test_connection();
        let file = write_temp_csv(SCENARIO_CSV);

        let count = ingest(file.path(), &conn).expect("Could not ingest CSV");

        assert_eq!(count, 3);
        let want = vec![
            Transaction {
                id: 0,
                transaction_date: date!(2023 - 01 - 01),
                description: "Coffee".to_owned(),
                amount: Some(-4.5),
                category: Some("Food".to_owned()),
                bank: "Chase".to_owned(),
            },
            Transaction {
                id: 1,
                transaction_date: date!(2023 - 01 - 02),
                description: "Paycheck".to_owned(),
                amount: Some(2000.0),
                category: None,
                bank: "Chase".to_owned(),
            },
            Transaction {
                id: 2,
                transaction_date: date!(2023 - 01 - 03),
                description: "Rent".to_owned(),
                amount: Some(-1200.0),
                category: Some("Housing".to_owned()),
                bank: "Ally".to_owned(),
            },
        ];
        assert_eq!(list_all_transactions(&conn).unwrap(), want);
    }

    #[test]
    fn ignores_the_index_column_when_assigning_ids() {
        let conn = get_test_connection();
        let csv = "\
,Transaction Date,Description,Amount,Category,Bank
7,2023-01-01,Coffee,-4.50,Food,Chase
3,2023-01-02,Tea,-3.00,Food,Chase
";

        ingest_reader(csv.as_bytes(), "test", &conn).unwrap();

        let ids: Vec<_> = list_all_transactions(&conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.id)
            .collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn accepts_files_without_an_index_column() {
        let csv = "\
Transaction Date,Description,Amount,Category,Bank
2023-01-01,Coffee,-4.50,Food,Chase
";

        let got = read_transactions(csv.as_bytes(), "test").unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].description, "Coffee");
    }

    #[test]
    fn quoted_fields_round_trip() {
        let conn = get_test_connection();
        let csv = "\
Transaction Date,Description,Amount,Category,Bank
2023-01-01,\"AMAZON, INC \"\"Prime\"\"\",-14.99,Shopping,Chase
";

        ingest_reader(csv.as_bytes(), "test", &conn).unwrap();

        let stored = list_all_transactions(&conn).unwrap();
        assert_eq!(stored[0].description, "AMAZON, INC \"Prime\"");
        assert_eq!(stored[0].amount, Some(-14.99));
    }

    #[test]
    fn invalid_date_aborts_whole_load() {
        let conn = get_test_connection();
        let csv = "\
,Transaction Date,Description,Amount,Category,Bank
0,2023-01-01,Coffee,-4.50,Food,Chase
1,not-a-date,Paycheck,2000.00,,Chase
2,2023-01-03,Rent,-1200.00,Housing,Ally
";

        let result = ingest_reader(csv.as_bytes(), "test", &conn);

        assert!(
            matches!(
                result,
                Err(Error::Validation {
                    row: 2,
                    field: "transaction_date",
                    ..
                })
            ),
            "want validation error on row 2, got {result:?}"
        );
        assert_eq!(count_transactions(&conn).unwrap(), 0);
    }

    #[test]
    fn missing_column_is_a_header_error() {
        let csv = "\
Transaction Date,Description,Amount,Category
2023-01-01,Coffee,-4.50,Food
";

        let result = read_transactions(csv.as_bytes(), "test");

        match result {
            Err(Error::Validation {
                row: 0,
                field: "header",
                reason,
            }) => assert!(reason.contains("Bank"), "reason should name Bank: {reason}"),
            other => panic!("want header validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_amount_column_is_a_header_error() {
        let csv = "\
Transaction Date,Description,Category,Bank
2023-01-01,Coffee,Food,Chase
";

        let result = read_transactions(csv.as_bytes(), "test");

        match result {
            Err(Error::Validation {
                row: 0,
                field: "header",
                reason,
            }) => assert!(reason.contains("Amount"), "reason should name Amount: {reason}"),
            other => panic!("want header validation error, got {other:?}"),
        }
    }

    #[test]
    fn unrecognised_headers_without_rows_are_rejected() {
        let result = read_transactions("Date,Memo,Value\n".as_bytes(), "test");

        assert!(
            matches!(
                result,
                Err(Error::Validation {
                    row: 0,
                    field: "header",
                    ..
                })
            ),
            "want header validation error, got {result:?}"
        );
    }

    #[test]
    fn empty_file_is_rejected_and_loads_nothing() {
        let conn = get_test_connection();
        let file = write_temp_csv("");

        let result = ingest(file.path(), &conn);

        assert!(
            matches!(
                result,
                Err(Error::Validation {
                    row: 0,
                    field: "header",
                    ..
                })
            ),
            "want header validation error, got {result:?}"
        );
        assert_eq!(count_transactions(&conn).unwrap(), 0);
    }

    #[test]
    fn header_row_without_data_rows_loads_nothing() {
        let conn = get_test_connection();
        let csv = ",Transaction Date,Description,Amount,Category,Bank\n";

        let count = ingest_reader(csv.as_bytes(), "test", &conn).unwrap();

        assert_eq!(count, 0);
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let conn = get_test_connection();

        let result = ingest(Path::new("/does/not/exist.csv"), &conn);

        assert!(
            matches!(result, Err(Error::SourceUnavailable { .. })),
            "want source unavailable, got {result:?}"
        );
    }

    #[test]
    fn first_run_ingests_into_empty_database() {
        let conn = get_test_connection();
        let file = write_temp_csv(SCENARIO_CSV);

        let got = ingest_on_first_run(file.path(), &conn).unwrap();

        assert_eq!(got, Some(3));
    }

    #[test]
    fn later_runs_skip_ingestion() {
        let conn = get_test_connection();
        let file = write_temp_csv(SCENARIO_CSV);
        ingest_on_first_run(file.path(), &conn).unwrap();

        let got = ingest_on_first_run(file.path(), &conn).unwrap();

        assert_eq!(got, None);
        assert_eq!(count_transactions(&conn).unwrap(), 3);
    }
}
