//! Command line and environment configuration for the server.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use clap::Parser;
use rusqlite::Connection;

use crate::{Error, pagination::PaginationConfig};

/// The REST API server for ledger_rs.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// File path to the application SQLite database, or ":memory:".
    ///
    /// A SQLAlchemy style URL such as "sqlite:///ledger.db" is also accepted
    /// and resolves to the file path after the third slash.
    #[arg(long, env = "DB_URI")]
    pub db_path: String,

    /// File path to a transactions CSV to load when the database is empty.
    #[arg(long, env = "SOURCE_CSV")]
    pub csv_path: Option<PathBuf>,

    /// The number of transactions per page when a request does not say.
    #[arg(long, env = "DEFAULT_PAGE_SIZE", default_value_t = 50)]
    pub default_page_size: u64,

    /// The largest page size a request may ask for.
    #[arg(long, env = "MAX_PAGE_SIZE", default_value_t = 100)]
    pub max_page_size: u64,

    /// The address to serve the API from.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    pub port: u16,

    /// File path for the debug log.
    #[arg(long, default_value = "debug.log")]
    pub log_path: PathBuf,
}

impl Config {
    /// The pagination settings described by this config.
    ///
    /// # Errors
    /// Returns [Error::InvalidArgument] if the default page size is zero or
    /// larger than the max page size.
    pub fn pagination_config(&self) -> Result<PaginationConfig, Error> {
        PaginationConfig::new(self.default_page_size, self.max_page_size)
    }

    /// The socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The file path of the database, with any `sqlite://` URL scheme removed.
    ///
    /// `sqlite:///x.db` is the relative path `x.db`, `sqlite:////x.db` is the
    /// absolute path `/x.db` and a bare `sqlite://` is an in-memory database.
    pub fn database_path(&self) -> &str {
        match self.db_path.strip_prefix("sqlite://") {
            Some("") => ":memory:",
            Some(path) => path.strip_prefix('/').unwrap_or(path),
            None => &self.db_path,
        }
    }

    /// Open the SQLite database at [Config::database_path].
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the database cannot be opened.
    pub fn open_database(&self) -> Result<Connection, Error> {
        Connection::open(self.database_path()).map_err(Error::from)
    }
}
