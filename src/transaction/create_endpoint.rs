//! Defines the endpoint for creating a transaction from the dashboard form.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;

use crate::{
    Error,
    dashboard::dashboard_view,
    endpoints,
    transaction::{
        api::TransactionState,
        core::{create_transaction, get_transactions},
        form::{Direction, TransactionForm},
    },
};

/// The form data sent by the dashboard's add and subtract buttons.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionForm {
    /// The name input.
    #[serde(default)]
    pub name: String,
    /// The amount input, as typed.
    #[serde(default)]
    pub amount: String,
    /// Which button was pressed.
    pub direction: Direction,
}

/// A route handler for creating a new transaction, redirects to the dashboard on success.
///
/// Invalid input re-renders the dashboard with the error shown under the form
/// and the inputs kept as typed.
pub async fn create_transaction_form_endpoint(
    State(state): State<TransactionState>,
    Form(form): Form<CreateTransactionForm>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let inputs = TransactionForm::new(&form.name, &form.amount);

    let transaction = match inputs.to_transaction(form.direction) {
        Ok(transaction) => transaction,
        Err(message) => {
            let transactions = get_transactions(&connection)
                .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

            return Ok((
                StatusCode::BAD_REQUEST,
                dashboard_view(&transactions, &inputs, Some(message)),
            )
                .into_response());
        }
    };

    create_transaction(transaction, &connection)
        .inspect_err(|error| tracing::error!("could not create transaction: {error}"))?;

    Ok(Redirect::to(endpoints::ROOT).into_response())
}
