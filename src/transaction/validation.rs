//! Checks that submitted transactions have every required field.

use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::transaction::Transaction;

/// The message shown when a transaction has no name.
pub const MISSING_NAME_MESSAGE: &str = "Enter a name for transaction";
/// The message shown when a transaction has no amount.
pub const MISSING_VALUE_MESSAGE: &str = "Enter an amount";

/// A transaction as submitted by a client, where any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPayload {
    /// A label for the transaction. Must not be empty after trimming.
    #[serde(default)]
    pub name: Option<String>,
    /// The signed amount.
    #[serde(default)]
    pub value: Option<f64>,
    /// When the client created the record. Defaults to now.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
}

impl TransactionPayload {
    /// Convert the payload into a [Transaction].
    ///
    /// # Errors
    /// Returns the field errors if the name is missing or blank, or if the
    /// value is missing.
    pub fn validate(self) -> Result<Transaction, ValidationErrors> {
        self.validate_with_prefix("")
    }

    fn validate_with_prefix(self, prefix: &str) -> Result<Transaction, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = self
            .name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());

        if name.is_none() {
            errors.insert(&format!("{prefix}name"), MISSING_NAME_MESSAGE);
        }

        if self.value.is_none() {
            errors.insert(&format!("{prefix}value"), MISSING_VALUE_MESSAGE);
        }

        match (name, self.value) {
            (Some(name), Some(value)) => Ok(Transaction {
                name,
                value,
                date: self.date.unwrap_or_else(OffsetDateTime::now_utc),
            }),
            _ => Err(errors),
        }
    }
}

/// Validate every payload in a batch.
///
/// The batch is rejected as a whole if any payload is invalid. Field names in
/// the errors are prefixed with the index of the offending payload, e.g.
/// `"1.name"`.
pub fn validate_batch(
    payloads: Vec<TransactionPayload>,
) -> Result<Vec<Transaction>, ValidationErrors> {
    let mut transactions = Vec::with_capacity(payloads.len());
    let mut errors = ValidationErrors::default();

    for (index, payload) in payloads.into_iter().enumerate() {
        match payload.validate_with_prefix(&format!("{index}.")) {
            Ok(transaction) => transactions.push(transaction),
            Err(payload_errors) => errors.extend(payload_errors),
        }
    }

    if errors.is_empty() {
        Ok(transactions)
    } else {
        Err(errors)
    }
}

/// Error messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// Create a set of errors with a single entry.
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }

    /// Record an error for `field`, replacing any previous message.
    pub fn insert(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_owned(), message.to_owned());
    }

    /// Get the error message for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether there are no errors.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    /// Wrap the errors in the `{"errors": {...}}` payload sent to clients.
    pub fn into_payload(self) -> ErrorPayload {
        ErrorPayload { errors: self }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages = self
            .0
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "{messages}")
    }
}

/// The JSON body of a rejected request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// The field errors.
    pub errors: ValidationErrors,
}
