use std::error::Error;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use ledger_rs::{count_transactions, ingest, initialize_db};

/// A utility for loading a transactions CSV into the database of ledger_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_URI")]
    db_path: String,

    /// File path to the transactions CSV.
    #[arg(long, short)]
    csv_path: PathBuf,

    /// Load the file even if the database already holds transactions.
    #[arg(long)]
    append: bool,
}

/// Load a transactions CSV into the database in one go.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if !args.csv_path.is_file() {
        eprintln!("No CSV file found at {:#?}!", args.csv_path);
        exit(1);
    }

    println!("Opening database at {:#?}", args.db_path);
    let conn = Connection::open(&args.db_path)?;

    initialize_db(&conn)?;

    let existing = count_transactions(&conn)?;
    if existing > 0 && !args.append {
        eprintln!(
            "The database already holds {existing} transactions. \
            Pass --append to load the file anyway."
        );
        exit(1);
    }

    println!("Loading transactions from {:#?}...", args.csv_path);
    let count = ingest(&args.csv_path, &conn)?;

    println!("Loaded {count} transactions.");

    Ok(())
}
