//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Config, Error, db::initialize, ingest::ingest_on_first_run, pagination::PaginationConfig,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The config that controls how pages of transactions are served.
    pub pagination_config: PaginationConfig,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            pagination_config,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }

    /// Open the database named by `config` and load the configured CSV into it
    /// if the database has no transactions yet.
    ///
    /// The server must not start with a partially loaded or accidentally
    /// empty database, so any ingestion failure is returned and nothing is
    /// kept from the failed load.
    ///
    /// # Errors
    /// Returns an error if the config is invalid, the database cannot be
    /// opened or initialized, or ingestion fails.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let pagination_config = config.pagination_config()?;
        let connection = config.open_database()?;
        initialize(&connection)?;

        if let Some(csv_path) = &config.csv_path {
            ingest_on_first_run(csv_path, &connection).inspect_err(|error| {
                tracing::error!("Ingestion failed, not starting the server: {error}")
            })?;
        }

        Ok(Self {
            pagination_config,
            db_connection: Arc::new(Mutex::new(connection)),
        })
    }
}
