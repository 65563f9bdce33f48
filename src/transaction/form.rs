//! The name and amount inputs used to enter a new transaction.

use serde::Deserialize;

use crate::transaction::Transaction;

/// The message shown when either input is left empty.
pub const MISSING_INPUT_MESSAGE: &str =
    "Name of Transaction and Transaction Amount must both be entered.";
/// The message shown when the amount is not a number.
pub const INVALID_AMOUNT_MESSAGE: &str = "Transaction Amount must be a number.";

/// Whether the entered amount is added to or subtracted from the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// A credit, the amount is stored as entered.
    Add,
    /// A debit, the amount is negated before it is stored.
    Subtract,
}

/// The raw text of the transaction inputs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionForm {
    /// The name input.
    #[serde(default)]
    pub name: String,
    /// The amount input, as typed.
    #[serde(default)]
    pub amount: String,
}

impl TransactionForm {
    /// Create a form with the given input text.
    pub fn new(name: &str, amount: &str) -> Self {
        Self {
            name: name.to_owned(),
            amount: amount.to_owned(),
        }
    }

    /// Build a transaction dated now from the inputs.
    ///
    /// # Errors
    /// Returns the message to show next to the form if either input is empty
    /// or if the amount is not a number.
    pub fn to_transaction(&self, direction: Direction) -> Result<Transaction, &'static str> {
        let name = self.name.trim();
        let amount = self.amount.trim();

        if name.is_empty() || amount.is_empty() {
            return Err(MISSING_INPUT_MESSAGE);
        }

        let amount: f64 = amount.parse().map_err(|_| INVALID_AMOUNT_MESSAGE)?;

        if !amount.is_finite() {
            return Err(INVALID_AMOUNT_MESSAGE);
        }

        let value = match direction {
            Direction::Add => amount,
            Direction::Subtract => -amount,
        };

        Ok(Transaction::new(name, value))
    }

    /// Empty both inputs.
    pub fn clear(&mut self) {
        self.name.clear();
        self.amount.clear();
    }

    /// Whether both inputs are empty.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.amount.is_empty()
    }
}
