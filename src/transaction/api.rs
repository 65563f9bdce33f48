//! The JSON endpoints for listing and creating transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    transaction::{
        core::{create_transaction, create_transactions, get_transactions},
        validation::{TransactionPayload, validate_batch},
    },
};

/// The state needed to get or create transactions.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that returns every transaction as JSON, newest first.
pub async fn get_transactions_endpoint(State(state): State<TransactionState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response();
        }
    };

    match get_transactions(&connection) {
        Ok(transactions) => Json(transactions).into_response(),
        Err(error) => {
            tracing::error!("could not get transactions: {error}");
            error.into_json_response()
        }
    }
}

/// A route handler for creating a single transaction.
///
/// Responds with the stored record, or with `400 Bad Request` and an
/// `{"errors": {...}}` body if a required field is missing.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    payload: Result<Json<TransactionPayload>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            tracing::warn!("rejected transaction body: {rejection}");
            return Error::InvalidRequestBody(rejection.body_text()).into_json_response();
        }
    };

    let transaction = match payload.validate() {
        Ok(transaction) => transaction,
        Err(errors) => return Error::InvalidTransaction(errors).into_json_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response();
        }
    };

    match create_transaction(transaction, &connection) {
        Ok(transaction) => Json(transaction).into_response(),
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_json_response()
        }
    }
}

/// A route handler for creating many transactions in one request.
///
/// The batch is stored all-or-nothing: if any record is invalid, nothing is
/// stored and the errors are keyed by the record's index.
pub async fn create_transactions_endpoint(
    State(state): State<TransactionState>,
    payload: Result<Json<Vec<TransactionPayload>>, JsonRejection>,
) -> Response {
    let payloads = match payload {
        Ok(Json(payloads)) => payloads,
        Err(rejection) => {
            tracing::warn!("rejected bulk transaction body: {rejection}");
            return Error::InvalidRequestBody(rejection.body_text()).into_json_response();
        }
    };

    let transactions = match validate_batch(payloads) {
        Ok(transactions) => transactions,
        Err(errors) => return Error::InvalidTransaction(errors).into_json_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response();
        }
    };

    let count = transactions.len();

    match create_transactions(transactions, &connection) {
        Ok(transactions) => {
            tracing::info!("stored {count} transactions from bulk request");
            Json(transactions).into_response()
        }
        Err(error) => {
            tracing::error!("could not create transactions: {error}");
            error.into_json_response()
        }
    }
}
