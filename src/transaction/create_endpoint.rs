//! Defines the endpoint for creating a transaction from the ledger form.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses repeated fields into a Vec and
// an empty string as None instead of rejecting the form like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::Category,
    endpoints,
    transaction::{LedgerQuery, create_transaction, form::LedgerForm},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new transaction, redirects to the ledger on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Path(category): Path<String>,
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

    match create_transaction(builder, &connection) {
        Ok(transaction) => {
            tracing::info!("created {category} transaction {}", transaction.id);
        }
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            return error.into_alert_response();
        }
    }

    (
        HxRedirect(query.without_edit().url_for(&endpoints::ledger_view(category))),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
