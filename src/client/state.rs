//! The client's view of the budget and the submission path for new entries.

use crate::{
    client::{PendingQueue, SubmitError, TransactionApi},
    dashboard::calculate_total,
    transaction::{Direction, MISSING_INPUT_MESSAGE, Transaction, TransactionForm},
};

/// What happened to a submitted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The form was incomplete or invalid. Nothing was sent or queued.
    Invalid,
    /// The server stored the record.
    Saved,
    /// The server could not be reached and the record was queued locally.
    Queued,
    /// The server refused the record.
    Rejected,
    /// The server could not be reached and there is no working local queue,
    /// so the record only exists in memory.
    NotQueued,
}

/// Everything the client shows: confirmed records, records awaiting sync,
/// the form inputs and the last error message.
#[derive(Debug)]
pub struct ClientState<A> {
    api: A,
    queue: Option<PendingQueue>,
    /// Records the server has (or that could not be queued), newest first.
    transactions: Vec<Transaction>,
    /// Records in the local queue, newest first.
    pending: Vec<Transaction>,
    /// The text in the entry inputs.
    pub form: TransactionForm,
    error_message: Option<String>,
}

impl<A: TransactionApi> ClientState<A> {
    /// Create an empty state.
    ///
    /// `queue` is `None` when the local queue could not be opened, in which
    /// case the client works online only.
    pub fn new(api: A, queue: Option<PendingQueue>) -> Self {
        Self {
            api,
            queue,
            transactions: Vec::new(),
            pending: Vec::new(),
            form: TransactionForm::default(),
            error_message: None,
        }
    }

    /// Reload the queued records and the server's history.
    ///
    /// The queued records are reloaded even when the server cannot be reached.
    ///
    /// # Errors
    /// Returns the error from fetching the server's history. The previously
    /// loaded history is kept in that case.
    pub async fn load(&mut self) -> Result<(), SubmitError> {
        self.pending = self.read_queue();

        self.transactions = self.api.fetch_transactions().await?;

        Ok(())
    }

    /// Records the server has, newest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Records waiting in the local queue, newest first.
    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    /// The balance across confirmed and pending records.
    pub fn total(&self) -> f64 {
        calculate_total(&self.transactions) + calculate_total(&self.pending)
    }

    /// The message to show next to the form, if the last submission failed.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Create a transaction from the form and send it to the server.
    ///
    /// The record is shown straight away. If the server cannot be reached it
    /// is added to the local queue and the form is cleared as if it had been
    /// saved. If the server rejects it, it is removed again and the form is
    /// kept so the user can fix it.
    pub async fn submit(&mut self, direction: Direction) -> SubmitOutcome {
        let transaction = match self.form.to_transaction(direction) {
            Ok(transaction) => transaction,
            Err(message) => {
                self.error_message = Some(message.to_owned());
                return SubmitOutcome::Invalid;
            }
        };

        self.error_message = None;
        self.transactions.insert(0, transaction.clone());

        match self.api.submit(&transaction).await {
            Ok(stored) => {
                self.transactions[0] = stored;
                self.form.clear();
                SubmitOutcome::Saved
            }
            Err(SubmitError::Rejected(errors)) => {
                tracing::warn!("server rejected transaction: {errors}");
                self.transactions.remove(0);
                self.error_message = Some(MISSING_INPUT_MESSAGE.to_owned());
                SubmitOutcome::Rejected
            }
            Err(error) => {
                tracing::warn!("could not send transaction, queueing it: {error}");
                self.form.clear();
                self.enqueue(transaction)
            }
        }
    }

    fn enqueue(&mut self, transaction: Transaction) -> SubmitOutcome {
        let Some(queue) = &self.queue else {
            tracing::warn!("no local queue, the transaction will be lost on exit");
            return SubmitOutcome::NotQueued;
        };

        if let Err(error) = queue.append(&transaction) {
            tracing::error!("could not queue transaction: {error}");
            return SubmitOutcome::NotQueued;
        }

        self.transactions.remove(0);
        self.pending.insert(0, transaction);

        SubmitOutcome::Queued
    }

    fn read_queue(&self) -> Vec<Transaction> {
        let Some(queue) = &self.queue else {
            return Vec::new();
        };

        match queue.read_all() {
            Ok(mut records) => {
                records.reverse();
                records
            }
            Err(error) => {
                tracing::error!("could not read pending queue: {error}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        client::{
            PendingQueue,
            test_utils::{FakeApi, sample_records},
        },
        transaction::{
            Direction, INVALID_AMOUNT_MESSAGE, MISSING_INPUT_MESSAGE, TransactionForm,
            ValidationErrors,
        },
    };

    use super::{ClientState, SubmitOutcome};

    fn get_test_state(api: &FakeApi) -> (ClientState<FakeApi>, PendingQueue) {
        let queue = PendingQueue::open_in_memory().expect("Could not open queue");
        let state = ClientState::new(api.clone(), Some(queue.clone()));

        (state, queue)
    }

    #[tokio::test]
    async fn empty_name_creates_nothing() {
        let api = FakeApi::offline();
        let (mut state, queue) = get_test_state(&api);
        state.form = TransactionForm::new("", "12");

        let outcome = state.submit(Direction::Add).await;

        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert_eq!(state.error_message(), Some(MISSING_INPUT_MESSAGE));
        assert_eq!(state.form, TransactionForm::new("", "12"));
        assert!(state.transactions().is_empty());
        assert_eq!(api.submit_attempts(), 0);
        assert_eq!(queue.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_amount_creates_nothing() {
        let api = FakeApi::offline();
        let (mut state, queue) = get_test_state(&api);
        state.form = TransactionForm::new("Coffee", "");

        let outcome = state.submit(Direction::Subtract).await;

        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert!(state.transactions().is_empty());
        assert_eq!(api.submit_attempts(), 0);
        assert_eq!(queue.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn non_numeric_amount_creates_nothing() {
        let api = FakeApi::default();
        let (mut state, _) = get_test_state(&api);
        state.form = TransactionForm::new("Coffee", "five");

        let outcome = state.submit(Direction::Subtract).await;

        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert_eq!(state.error_message(), Some(INVALID_AMOUNT_MESSAGE));
        assert_eq!(api.submit_attempts(), 0);
    }

    #[tokio::test]
    async fn saved_transaction_is_shown_and_form_cleared() {
        let api = FakeApi::default();
        let (mut state, queue) = get_test_state(&api);
        state.form = TransactionForm::new("Paycheck", "2000");

        let outcome = state.submit(Direction::Add).await;

        assert_eq!(outcome, SubmitOutcome::Saved);
        assert!(state.form.is_empty());
        assert_eq!(state.error_message(), None);
        assert_eq!(state.transactions().len(), 1);
        assert_eq!(state.transactions()[0].name, "Paycheck");
        assert_eq!(state.total(), 2000.0);
        assert_eq!(api.stored(), state.transactions());
        assert_eq!(queue.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn network_failure_queues_transaction_and_clears_form() {
        let api = FakeApi::offline();
        let (mut state, queue) = get_test_state(&api);
        state.form = TransactionForm::new("Rent", "1200");

        let outcome = state.submit(Direction::Subtract).await;

        assert_eq!(outcome, SubmitOutcome::Queued);
        assert!(state.form.is_empty());

        let queued = queue.read_all().unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].name, "Rent");
        assert_eq!(queued[0].value, -1200.0);

        assert_eq!(state.pending(), queued.as_slice());
        assert!(state.transactions().is_empty());
        assert_eq!(state.total(), -1200.0);
    }

    #[tokio::test]
    async fn repeated_failures_queue_in_submission_order() {
        let api = FakeApi::offline();
        let (mut state, queue) = get_test_state(&api);

        state.form = TransactionForm::new("Rent", "1200");
        state.submit(Direction::Subtract).await;
        state.form = TransactionForm::new("Paycheck", "2000");
        state.submit(Direction::Add).await;

        let names = queue
            .read_all()
            .unwrap()
            .into_iter()
            .map(|record| record.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Rent", "Paycheck"]);
        assert_eq!(state.pending()[0].name, "Paycheck");
    }

    #[tokio::test]
    async fn rejected_transaction_keeps_form() {
        let api = FakeApi::default();
        api.reject_with(ValidationErrors::single("name", "Enter a name for transaction"));
        let (mut state, queue) = get_test_state(&api);
        state.form = TransactionForm::new("Coffee", "5");

        let outcome = state.submit(Direction::Subtract).await;

        assert_eq!(outcome, SubmitOutcome::Rejected);
        assert_eq!(state.form, TransactionForm::new("Coffee", "5"));
        assert_eq!(state.error_message(), Some(MISSING_INPUT_MESSAGE));
        assert!(state.transactions().is_empty());
        assert_eq!(queue.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn network_failure_without_queue_keeps_record_in_memory() {
        let api = FakeApi::offline();
        let mut state = ClientState::new(api.clone(), None);
        state.form = TransactionForm::new("Coffee", "5");

        let outcome = state.submit(Direction::Subtract).await;

        assert_eq!(outcome, SubmitOutcome::NotQueued);
        assert!(state.form.is_empty());
        assert_eq!(state.transactions().len(), 1);
        assert!(state.pending().is_empty());
    }

    #[tokio::test]
    async fn load_reads_server_and_queue() {
        let records = sample_records();
        let api = FakeApi::default();
        api.store(&records[..1]);
        let (mut state, queue) = get_test_state(&api);
        queue.append(&records[1]).unwrap();

        state.load().await.expect("Could not load state");

        assert_eq!(state.transactions(), &records[..1]);
        assert_eq!(state.pending(), &records[1..]);
        assert_eq!(state.total(), 1995.0);
    }

    #[tokio::test]
    async fn load_keeps_queue_when_server_is_unreachable() {
        let records = sample_records();
        let api = FakeApi::offline();
        let (mut state, queue) = get_test_state(&api);
        for record in &records {
            queue.append(record).unwrap();
        }

        let result = state.load().await;

        assert!(result.is_err());
        let names = state
            .pending()
            .iter()
            .map(|record| record.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Paycheck", "Coffee"]);
    }
}
