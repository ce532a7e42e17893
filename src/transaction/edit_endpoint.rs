//! Defines the endpoints for changing a transaction from the ledger page:
//! saving the edit form and flipping the done flag.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::Category,
    endpoints,
    transaction::{
        LedgerQuery, TransactionId, form::LedgerForm, ledger_page::get_transaction_in_category,
        toggle_done, update_transaction,
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for saving the edit form, redirects to the ledger on success.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Path((category, transaction_id)): Path<(String, TransactionId)>,
    Query(query): Query<LedgerQuery>,
    Form(form): Form<LedgerForm>,
) -> Response {
    let category: Category = match category.parse() {
        Ok(category) => category,
        Err(error) => return error.into_alert_response(),
    };

    let builder = match form.into_builder(category) {
        Ok(builder) => builder,
        Err(error) => {
            tracing::debug!("rejected {category} form: {error}");
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = get_transaction_in_category(category, transaction_id, &connection)
        .and_then(|_| update_transaction(transaction_id, builder, &connection));

    if let Err(error) = result {
        tracing::error!("could not update transaction {transaction_id}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(query.without_edit().url_for(&endpoints::ledger_view(category))),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// A route handler for flipping the done flag, redirects to the ledger on success.
pub async fn toggle_done_endpoint(
    State(state): State<EditTransactionState>,
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
        .and_then(|_| toggle_done(transaction_id, &connection));

    match result {
        Ok(done) => tracing::debug!("transaction {transaction_id} done: {done}"),
        Err(error) => {
            tracing::error!("could not toggle transaction {transaction_id}: {error}");
            return error.into_alert_response();
        }
    }

    (
        HxRedirect(query.url_for(&endpoints::ledger_view(category))),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
