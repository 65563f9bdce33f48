//! The durable queue of transactions that could not be sent to the server.
//!
//! Records are kept in the `pending` table of a SQLite file, so they survive
//! restarts of the client. Each row has an auto-incrementing local key that
//! fixes insertion order and is never sent to the server.

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::Connection;

use crate::{client::ClientError, transaction::Transaction};

/// The name of the table that holds queued records.
pub const PENDING_COLLECTION: &str = "pending";

/// A disk-backed, append-only list of transactions awaiting submission.
///
/// Clones share the same underlying connection.
#[derive(Debug, Clone)]
pub struct PendingQueue {
    connection: Arc<Mutex<Connection>>,
}

/// The records in the queue at one point in time.
///
/// Returned by [PendingQueue::snapshot] and passed back to
/// [PendingQueue::clear_batch] once the records have been delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingBatch {
    records: Vec<Transaction>,
    last_key: Option<i64>,
}

impl PendingBatch {
    /// The queued records in insertion order.
    pub fn records(&self) -> &[Transaction] {
        &self.records
    }

    /// Whether the queue was empty when the snapshot was taken.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The number of records in the batch.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

impl PendingQueue {
    /// Open the queue stored at `path`, creating the file and table if needed.
    ///
    /// # Errors
    /// Returns [ClientError::Storage] if the file cannot be opened or the
    /// table cannot be created. Callers should carry on without offline
    /// support rather than treat this as fatal.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let connection = Connection::open(path)?;

        Self::from_connection(connection)
    }

    /// Open a queue that only lives as long as the process.
    ///
    /// # Errors
    /// Returns [ClientError::Storage] if the table cannot be created.
    pub fn open_in_memory() -> Result<Self, ClientError> {
        let connection = Connection::open_in_memory()?;

        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self, ClientError> {
        create_pending_table(&connection)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Add `record` to the end of the queue.
    ///
    /// There is no uniqueness check and no size bound.
    ///
    /// # Errors
    /// Returns an error if the record cannot be serialized or written.
    pub fn append(&self, record: &Transaction) -> Result<(), ClientError> {
        let json = serde_json::to_string(record)?;

        self.lock()?.execute(
            &format!("INSERT INTO {PENDING_COLLECTION} (record) VALUES (?1)"),
            (json,),
        )?;

        Ok(())
    }

    /// Every queued record in insertion order.
    ///
    /// # Errors
    /// Returns an error if the queue cannot be read or a record cannot be parsed.
    pub fn read_all(&self) -> Result<Vec<Transaction>, ClientError> {
        Ok(self.snapshot()?.records)
    }

    /// Every queued record in insertion order, along with the position of
    /// the last one so that exactly these records can be removed later.
    ///
    /// # Errors
    /// Returns an error if the queue cannot be read or a record cannot be parsed.
    pub fn snapshot(&self) -> Result<PendingBatch, ClientError> {
        let connection = self.lock()?;
        let rows = connection
            .prepare(&format!(
                "SELECT key, record FROM {PENDING_COLLECTION} ORDER BY key ASC"
            ))?
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let last_key = rows.last().map(|(key, _)| *key);
        let records = rows
            .iter()
            .map(|(_, json)| serde_json::from_str(json))
            .collect::<Result<Vec<Transaction>, _>>()?;

        Ok(PendingBatch { records, last_key })
    }

    /// Remove every queued record.
    ///
    /// # Errors
    /// Returns an error if the queue cannot be written.
    pub fn clear(&self) -> Result<(), ClientError> {
        self.lock()?
            .execute(&format!("DELETE FROM {PENDING_COLLECTION}"), ())?;

        Ok(())
    }

    /// Remove the records captured by `batch`.
    ///
    /// Records appended after the snapshot was taken stay in the queue.
    /// Returns the number of records removed.
    ///
    /// # Errors
    /// Returns an error if the queue cannot be written.
    pub fn clear_batch(&self, batch: &PendingBatch) -> Result<usize, ClientError> {
        let Some(last_key) = batch.last_key else {
            return Ok(0);
        };

        let removed = self.lock()?.execute(
            &format!("DELETE FROM {PENDING_COLLECTION} WHERE key <= ?1"),
            (last_key,),
        )?;

        Ok(removed)
    }

    /// The number of queued records.
    ///
    /// # Errors
    /// Returns an error if the queue cannot be read.
    pub fn len(&self) -> Result<usize, ClientError> {
        let count: i64 = self.lock()?.query_row(
            &format!("SELECT COUNT(key) FROM {PENDING_COLLECTION}"),
            [],
            |row| row.get(0),
        )?;

        Ok(count as usize)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, ClientError> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire queue lock: {error}");
            ClientError::LockError
        })
    }
}

fn create_pending_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {PENDING_COLLECTION} (
                key INTEGER PRIMARY KEY AUTOINCREMENT,
                record TEXT NOT NULL
            )"
        ),
        (),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{client::test_utils::sample_records, transaction::Transaction};

    use super::PendingQueue;

    fn get_test_queue() -> PendingQueue {
        PendingQueue::open_in_memory().expect("Could not open queue")
    }

    #[test]
    fn read_all_returns_append_order() {
        let queue = get_test_queue();
        let records = sample_records();

        for record in &records {
            queue.append(record).expect("Could not append record");
        }

        assert_eq!(queue.read_all().unwrap(), records);
    }

    #[test]
    fn duplicates_are_kept() {
        let queue = get_test_queue();
        let record = Transaction::with_date("Coffee", -5.0, datetime!(2025-10-01 08:00 UTC));

        queue.append(&record).unwrap();
        queue.append(&record).unwrap();

        assert_eq!(queue.read_all().unwrap(), vec![record.clone(), record]);
    }

    #[test]
    fn read_all_does_not_consume_records() {
        let queue = get_test_queue();
        for record in &sample_records() {
            queue.append(record).unwrap();
        }

        let first = queue.read_all().unwrap();
        let second = queue.read_all().unwrap();

        assert_eq!(first, second);
        assert_eq!(queue.len().unwrap(), 2);
    }

    #[test]
    fn clear_empties_queue() {
        let queue = get_test_queue();
        for record in &sample_records() {
            queue.append(record).unwrap();
        }

        queue.clear().expect("Could not clear queue");

        assert!(queue.read_all().unwrap().is_empty());
        assert_eq!(queue.len().unwrap(), 0);
    }

    #[test]
    fn clear_on_empty_queue_succeeds() {
        let queue = get_test_queue();

        queue.clear().expect("Could not clear queue");

        assert!(queue.read_all().unwrap().is_empty());
    }

    #[test]
    fn clear_batch_keeps_records_appended_after_snapshot() {
        let queue = get_test_queue();
        let records = sample_records();
        queue.append(&records[0]).unwrap();
        let batch = queue.snapshot().unwrap();
        queue.append(&records[1]).unwrap();

        let removed = queue.clear_batch(&batch).unwrap();

        assert_eq!(removed, 1);
        assert_eq!(queue.read_all().unwrap(), vec![records[1].clone()]);
    }

    #[test]
    fn clear_batch_of_empty_snapshot_removes_nothing() {
        let queue = get_test_queue();
        let batch = queue.snapshot().unwrap();
        queue.append(&sample_records()[0]).unwrap();

        let removed = queue.clear_batch(&batch).unwrap();

        assert_eq!(removed, 0);
        assert_eq!(queue.len().unwrap(), 1);
    }

    #[test]
    fn keys_keep_increasing_after_clear() {
        let queue = get_test_queue();
        let records = sample_records();
        queue.append(&records[0]).unwrap();
        let stale_batch = queue.snapshot().unwrap();
        queue.clear().unwrap();
        queue.append(&records[1]).unwrap();

        // The new record must not be mistaken for part of the old snapshot.
        let removed = queue.clear_batch(&stale_batch).unwrap();

        assert_eq!(removed, 0);
        assert_eq!(queue.read_all().unwrap(), vec![records[1].clone()]);
    }

    #[test]
    fn records_survive_reopening() {
        let dir = tempfile::tempdir().expect("Could not create temp dir");
        let path = dir.path().join("pending.db");
        let records = sample_records();

        {
            let queue = PendingQueue::open(&path).expect("Could not open queue");
            for record in &records {
                queue.append(record).unwrap();
            }
        }

        let reopened = PendingQueue::open(&path).expect("Could not reopen queue");

        assert_eq!(reopened.read_all().unwrap(), records);
    }

    #[test]
    fn open_fails_when_directory_is_missing() {
        let dir = tempfile::tempdir().expect("Could not create temp dir");
        let path = dir.path().join("missing").join("pending.db");

        let result = PendingQueue::open(&path);

        assert!(result.is_err());
    }
}
