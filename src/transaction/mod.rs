//! Transaction records for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` record shared by the server and the client
//! - Database functions for storing and listing transactions
//! - Validation of submitted records and of the entry form
//! - The JSON API and form route handlers

mod api;
mod core;
mod create_endpoint;
mod form;
mod validation;

pub use api::{
    create_transaction_endpoint, create_transactions_endpoint, get_transactions_endpoint,
};
pub use core::{Transaction, create_transaction_table};
pub use create_endpoint::create_transaction_form_endpoint;
pub use form::{Direction, INVALID_AMOUNT_MESSAGE, MISSING_INPUT_MESSAGE, TransactionForm};
pub use validation::{ErrorPayload, TransactionPayload, ValidationErrors};

pub(crate) use api::TransactionState;
pub(crate) use core::get_transactions;

#[cfg(test)]
pub(crate) use core::{create_transaction, create_transactions};
