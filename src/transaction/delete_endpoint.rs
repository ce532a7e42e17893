use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::Category,
    endpoints,
    transaction::{
        LedgerQuery, TransactionId, delete_transaction, ledger_page::get_transaction_in_category,
    },
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction, redirects to the ledger on success
/// and responds with an alert otherwise.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path((category, transaction_id)): Path<(String, TransactionId)>,
    Query(query): Query<LedgerQuery>,
) -> Response {
    let category: Category = match category.parse() {
        Ok(category) => category,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = get_transaction_in_category(category, transaction_id, &connection)
        .and_then(|_| delete_transaction(transaction_id, &connection));

    if let Err(error) = result {
        tracing::error!("could not delete transaction {transaction_id}: {error}");
        return error.into_alert_response();
    }
    tracing::info!("deleted {category} transaction {transaction_id}");

    // The form may still be editing the deleted transaction.
    let query = match query.edit {
        Some(id) if id == transaction_id => query.without_edit(),
        _ => query,
    };

    (
        HxRedirect(query.url_for(&endpoints::ledger_view(category))),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        category::Category,
        db::initialize,
        test_utils::assert_hx_redirect,
        transaction::{LedgerQuery, Transaction, create_transaction, get_transaction},
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    fn get_test_state() -> DeleteTransactionState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn add(state: &DeleteTransactionState, category: Category) -> Transaction {
        let connection = state.db_connection.lock().unwrap();
        create_transaction(
            Transaction::build(category, "Acme", date!(2025 - 10 - 05)).amounts(100.0, 15.0, 115.0),
            &connection,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn deletes_transaction() {
        let state = get_test_state();
        let transaction = add(&state, Category::Purchases);

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Path(("purchases".to_owned(), transaction.id)),
            Query(LedgerQuery {
                search: Some("acme".to_owned()),
                edit: Some(transaction.id),
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/ledger/purchases?search=acme");

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_transaction(transaction.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn keeps_edit_of_other_transaction() {
        let state = get_test_state();
        let first = add(&state, Category::Purchases);
        let second = add(&state, Category::Purchases);

        let response = delete_transaction_endpoint(
            State(state),
            Path(("purchases".to_owned(), first.id)),
            Query(LedgerQuery {
                edit: Some(second.id),
                ..Default::default()
            }),
        )
        .await;

        assert_hx_redirect(&response, &format!("/ledger/purchases?edit={}", second.id));
    }

    #[tokio::test]
    async fn delete_in_wrong_category_keeps_transaction() {
        let state = get_test_state();
        let transaction = add(&state, Category::Purchases);

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Path(("sales".to_owned(), transaction.id)),
            Query(LedgerQuery::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_transaction(transaction.id, &connection).is_ok());
    }

    #[tokio::test]
    async fn delete_missing_transaction_is_not_found() {
        let response = delete_transaction_endpoint(
            State(get_test_state()),
            Path(("sales".to_owned(), 99)),
            Query(LedgerQuery::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
