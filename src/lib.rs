//! A read-only REST API over a ledger of bank transactions.
//!
//! Transactions are loaded once from a CSV export into a SQLite table and
//! served as JSON, one page at a time.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod config;
mod database_id;
mod db;
mod endpoints;
mod error;
mod ingest;
mod logging;
mod not_found;
mod pagination;
mod routing;
mod transaction;
mod transactions_endpoint;

pub use app_state::AppState;
pub use config::Config;
pub use database_id::TransactionId;
pub use db::initialize as initialize_db;
pub use error::Error;
pub use ingest::{ingest, ingest_on_first_run, ingest_reader};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::{Page, PageQuery, PageRequest, PaginationConfig, get_transaction_page};
pub use routing::build_router;
pub use transaction::{
    NewTransaction, Transaction, append_transactions, count_transactions, list_all_transactions,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
