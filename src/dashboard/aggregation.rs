//! Totals and running balances for the dashboard.

use time::OffsetDateTime;

use crate::transaction::Transaction;

/// The sum of every transaction's value.
pub(crate) fn calculate_total(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .map(|transaction| transaction.value)
        .sum()
}

/// The cumulative balance after each transaction, oldest first.
///
/// `transactions` is expected to be ordered newest first, as returned by the
/// transaction store. Each point pairs a `M/D/YYYY` date label with the
/// balance after that transaction was applied.
pub(crate) fn calculate_running_balances(transactions: &[Transaction]) -> (Vec<String>, Vec<f64>) {
    let mut balance = 0.0;

    transactions
        .iter()
        .rev()
        .map(|transaction| {
            balance += transaction.value;
            (format_date_label(transaction.date), balance)
        })
        .unzip()
}

fn format_date_label(date: OffsetDateTime) -> String {
    format!(
        "{}/{}/{}",
        u8::from(date.month()),
        date.day(),
        date.year()
    )
}
