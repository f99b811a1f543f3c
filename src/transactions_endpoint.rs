//! Defines the route handler that serves pages of transactions as JSON.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    pagination::{Page, PageQuery, PageRequest, PaginationConfig, get_transaction_page},
    transaction::Transaction,
};

/// The state needed for the transactions endpoints.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for reading transactions.
    db_connection: Arc<Mutex<Connection>>,
    /// The default and maximum page sizes.
    pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Get one page of transactions in ascending ID order.
///
/// Accepts either `page` and `size` or `offset` and `limit` query parameters.
pub async fn get_transactions(
    State(state): State<TransactionsState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Page<Transaction>>, Error> {
    let Query(query) = query.map_err(|rejection| Error::InvalidArgument(rejection.body_text()))?;
    let request = PageRequest::from_query(query, &state.pagination_config)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let page = get_transaction_page(request, &connection)?;

    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        AppState,
        pagination::{PageQuery, PaginationConfig},
        transaction::{Transaction, append_transactions},
    };

    use super::{TransactionsState, get_transactions};

    fn get_test_state() -> TransactionsState {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, PaginationConfig::new(2, 5).unwrap()).unwrap();
        append_transactions(
            vec![
                Transaction::build(date!(2023 - 01 - 01), "Coffee", "Chase"),
                Transaction::build(date!(2023 - 01 - 02), "Paycheck", "Chase"),
                Transaction::build(date!(2023 - 01 - 03), "Rent", "Ally"),
            ],
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        axum::extract::FromRef::from_ref(&state)
    }

    #[tokio::test]
    async fn uses_default_page_size() {
        let state = get_test_state();

        let page = get_transactions(State(state), Ok(Query(PageQuery::default())))
            .await
            .unwrap()
            .0;

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.size, 2);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn rejects_size_over_max() {
        let state = get_test_state();
        let query = PageQuery {
            size: Some(6),
            ..Default::default()
        };

        let response = get_transactions(State(state), Ok(Query(query)))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
