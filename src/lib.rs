//! Budget Tracker is a web app for recording credits and debits and watching
//! the running balance.
//!
//! This library provides:
//! - a REST API and a server rendered dashboard backed by SQLite,
//! - a client with a durable offline queue that re-syncs with the server once
//!   connectivity returns.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod app_state;
pub mod client;
mod dashboard;
mod db;
mod endpoints;
mod error_pages;
mod html;
mod logging;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{
    Direction, ErrorPayload, Transaction, TransactionForm, TransactionPayload, ValidationErrors,
};

use crate::error_pages::get_internal_server_error_response;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
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

/// The errors that may occur in the server side of the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The submitted transaction is missing a required field.
    ///
    /// The contained errors are sent back to the client as JSON so that it
    /// can show them next to the offending inputs.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(ValidationErrors),

    /// The request body could not be parsed as JSON of the expected shape.
    #[error("could not parse request body: {0}")]
    InvalidRequestBody(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", error);
        Error::SqlError(error)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::DatabaseLockError => get_internal_server_error_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                get_internal_server_error_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into a JSON response for the REST API.
    ///
    /// Validation errors keep the `{"errors": {...}}` shape clients rely on to
    /// tell a rejected record apart from a server failure.
    fn into_json_response(self) -> Response {
        match self {
            Error::InvalidTransaction(errors) => {
                (StatusCode::BAD_REQUEST, Json(errors.into_payload())).into_response()
            }
            Error::InvalidRequestBody(message) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrors::single("body", &message).into_payload()),
            )
                .into_response(),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "message": "An unexpected error occurred, check the server logs for more details."
                    })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{Error, ValidationErrors};

    #[test]
    fn missing_rows_are_sql_errors() {
        let error = Error::from(rusqlite::Error::QueryReturnedNoRows);

        assert_eq!(error, Error::SqlError(rusqlite::Error::QueryReturnedNoRows));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        let error = Error::InvalidTransaction(ValidationErrors::single("name", "missing"));

        assert_eq!(error.into_json_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn lock_errors_are_json_server_errors() {
        assert_eq!(
            Error::DatabaseLockError.into_json_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
