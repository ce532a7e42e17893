//! The JSON API for reading and changing transactions.
//!
//! Records are addressed either by their position in a category's list or by
//! their ID. Errors are sent as `{"detail": "..."}` with the status codes
//! documented on [Error::into_json_response].

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::Category,
    transaction::{
        Transaction, TransactionId, TransactionPatch, TransactionPayload, TransactionRecord,
        create_transaction, delete_transaction, get_transaction, get_transactions,
        transaction_id_at, update_transaction,
    },
};

/// The state needed by the JSON API.
#[derive(Debug, Clone)]
pub struct TransactionApiState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn lock(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}

fn into_json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::debug!("rejected JSON body: {rejection}");
            Err(Error::InvalidPayload(rejection.body_text()))
        }
    }
}

fn record_response(status: StatusCode, transaction: &Transaction) -> Response {
    (status, Json(TransactionRecord::from(transaction))).into_response()
}

/// Resolve a position from the path. A position that is not a number can
/// never match a record.
fn parse_position(category: &str, index: &str) -> Result<(Category, usize), Error> {
    let category: Category = category.parse()?;
    let index = index.trim().parse().map_err(|_| Error::NotFound)?;

    Ok((category, index))
}

fn parse_id(transaction_id: &str) -> Result<TransactionId, Error> {
    transaction_id.trim().parse().map_err(|_| Error::NotFound)
}

/// A route handler that lists a category as JSON, in the order the
/// transactions were entered.
pub async fn get_transactions_api(
    State(state): State<TransactionApiState>,
    Path(category): Path<String>,
) -> Response {
    let result = category.parse::<Category>().and_then(|category| {
        let connection = lock(&state.db_connection)?;
        get_transactions(category, &connection)
    });

    match result {
        Ok(transactions) => Json(
            transactions
                .iter()
                .map(TransactionRecord::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(error) => error.into_json_response(),
    }
}

/// A route handler that creates a transaction from a JSON payload and responds
/// with the stored record.
pub async fn create_transaction_api(
    State(state): State<TransactionApiState>,
    body: Result<Json<TransactionPayload>, JsonRejection>,
) -> Response {
    let result = into_json_body(body)
        .and_then(TransactionPayload::into_builder)
        .and_then(|builder| {
            let connection = lock(&state.db_connection)?;
            create_transaction(builder, &connection)
        });

    match result {
        Ok(transaction) => {
            tracing::info!(
                "created {} transaction {} via API",
                transaction.category,
                transaction.id
            );
            record_response(StatusCode::CREATED, &transaction)
        }
        Err(error) => error.into_json_response(),
    }
}

/// A route handler that updates the transaction at a position in a category's
/// list and responds with the updated record.
pub async fn update_transaction_at_api(
    State(state): State<TransactionApiState>,
    Path((category, index)): Path<(String, String)>,
    body: Result<Json<TransactionPatch>, JsonRejection>,
) -> Response {
    let result = parse_position(&category, &index).and_then(|(category, index)| {
        let patch = into_json_body(body)?;
        // The lock is held from resolving the position until the update is
        // written so the position cannot shift in between.
        let connection = lock(&state.db_connection)?;
        let id = transaction_id_at(category, index, &connection)?;
        patch_transaction(id, patch, &connection)
    });

    match result {
        Ok(transaction) => record_response(StatusCode::OK, &transaction),
        Err(error) => error.into_json_response(),
    }
}

/// A route handler that deletes the transaction at a position in a category's
/// list and responds with the removed record.
pub async fn delete_transaction_at_api(
    State(state): State<TransactionApiState>,
    Path((category, index)): Path<(String, String)>,
) -> Response {
    let result = parse_position(&category, &index).and_then(|(category, index)| {
        let connection = lock(&state.db_connection)?;
        let id = transaction_id_at(category, index, &connection)?;
        remove_transaction(id, &connection)
    });

    match result {
        Ok(transaction) => record_response(StatusCode::OK, &transaction),
        Err(error) => error.into_json_response(),
    }
}

/// A route handler that updates a transaction by its ID.
pub async fn update_transaction_api(
    State(state): State<TransactionApiState>,
    Path(transaction_id): Path<String>,
    body: Result<Json<TransactionPatch>, JsonRejection>,
) -> Response {
    let result = parse_id(&transaction_id).and_then(|id| {
        let patch = into_json_body(body)?;
        let connection = lock(&state.db_connection)?;
        patch_transaction(id, patch, &connection)
    });

    match result {
        Ok(transaction) => record_response(StatusCode::OK, &transaction),
        Err(error) => error.into_json_response(),
    }
}

/// A route handler that deletes a transaction by its ID.
pub async fn delete_transaction_api(
    State(state): State<TransactionApiState>,
    Path(transaction_id): Path<String>,
) -> Response {
    let result = parse_id(&transaction_id).and_then(|id| {
        let connection = lock(&state.db_connection)?;
        remove_transaction(id, &connection)
    });

    match result {
        Ok(transaction) => record_response(StatusCode::OK, &transaction),
        Err(error) => error.into_json_response(),
    }
}

fn patch_transaction(
    id: TransactionId,
    patch: TransactionPatch,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let current = get_transaction(id, connection)?;
    let builder = patch.apply(&current)?;
    let updated = update_transaction(id, builder, connection)?;
    tracing::info!("updated {} transaction {id} via API", updated.category);

    Ok(updated)
}

fn remove_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let removed = get_transaction(id, connection)?;
    delete_transaction(id, connection)?;
    tracing::info!("deleted {} transaction {id} via API", removed.category);

    Ok(removed)
}
