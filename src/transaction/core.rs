//! Defines the transaction record and the database queries for storing it.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::Error;

// ============================================================================
// MODELS
// ============================================================================

/// A credit or debit, i.e. an event where money was either earned or spent.
///
/// The record carries no ID. The server keeps a row key internally and the
/// client's offline queue keeps its own local key, but neither is ever
/// serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// A human-readable label, e.g. "Coffee".
    pub name: String,

    /// The signed amount of money.
    ///
    /// Positive values are credits (money coming in), negative values are
    /// debits (money going out).
    ///
    /// # Examples
    /// - `2000.00` - Paycheck
    /// - `-5.00` - Coffee
    /// - `-1200.00` - Rent
    pub value: f64,

    /// When the record was created, serialized as an RFC 3339 string.
    ///
    /// This is generated by the client at submission time, not by the server.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction record dated now.
    pub fn new(name: &str, value: f64) -> Self {
        Self::with_date(name, value, OffsetDateTime::now_utc())
    }

    /// Create a new transaction record with an explicit creation time.
    pub fn with_date(name: &str, value: f64, date: OffsetDateTime) -> Self {
        Self {
            name: name.to_owned(),
            value,
            date,
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Store a new transaction in the database and return the stored record.
///
/// The date is normalized to UTC so that dates sort chronologically.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    transaction: Transaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (name, value, date)
             VALUES (?1, ?2, ?3)
             RETURNING name, value, date",
        )?
        .query_row(
            (
                transaction.name,
                transaction.value,
                transaction.date.to_offset(UtcOffset::UTC),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Store many transactions in a single SQL transaction.
///
/// Either every record is stored or none of them are. The stored records are
/// returned in the same order as `transactions`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error, in
/// which case no records are stored.
pub fn create_transactions(
    transactions: Vec<Transaction>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let sql_transaction = connection.unchecked_transaction()?;
    let mut created = Vec::with_capacity(transactions.len());

    {
        let mut statement = sql_transaction.prepare(
            "INSERT INTO \"transaction\" (name, value, date)
             VALUES (?1, ?2, ?3)
             RETURNING name, value, date",
        )?;

        for transaction in transactions {
            let transaction = statement.query_row(
                (
                    transaction.name,
                    transaction.value,
                    transaction.date.to_offset(UtcOffset::UTC),
                ),
                map_transaction_row,
            )?;

            created.push(transaction);
        }
    }

    sql_transaction.commit()?;

    Ok(created)
}

/// Retrieve every transaction, newest first.
///
/// Transactions with the same date are ordered by when they were stored,
/// most recent first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare("SELECT name, value, date FROM \"transaction\" ORDER BY date DESC, id DESC")?
        .query_map([], map_transaction_row)?
        .map(|result| result.map_err(Error::from))
        .collect()
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                value REAL NOT NULL,
                date TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let name = row.get(0)?;
    let value = row.get(1)?;
    let date = row.get(2)?;

    Ok(Transaction { name, value, date })
}

// ============================================================================
// TESTS
// ============================================================================
