//! A scripted stand-in for the server and sample records for client tests.

use std::{cell::RefCell, rc::Rc};

use time::macros::datetime;

use crate::{
    client::{PendingQueue, SubmitError, TransactionApi},
    transaction::{Transaction, ValidationErrors},
};

/// Two records in the order they were entered.
pub(crate) fn sample_records() -> Vec<Transaction> {
    vec![
        Transaction::with_date("Coffee", -5.0, datetime!(2025-10-01 08:00 UTC)),
        Transaction::with_date("Paycheck", 2000.0, datetime!(2025-10-02 09:30 UTC)),
    ]
}

#[derive(Debug)]
struct FakeApiState {
    online: bool,
    rejection: Option<ValidationErrors>,
    stored: Vec<Transaction>,
    submit_attempts: usize,
    batch_attempts: Vec<Vec<Transaction>>,
    append_during_batch: Option<(PendingQueue, Transaction)>,
}

/// An in-memory stand-in for the server.
///
/// Clones share state, so a test can keep a handle to inspect the requests
/// made through another clone.
#[derive(Debug, Clone)]
pub(crate) struct FakeApi {
    state: Rc<RefCell<FakeApiState>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            state: Rc::new(RefCell::new(FakeApiState {
                online: true,
                rejection: None,
                stored: Vec::new(),
                submit_attempts: 0,
                batch_attempts: Vec::new(),
                append_during_batch: None,
            })),
        }
    }
}

impl FakeApi {
    pub(crate) fn offline() -> Self {
        let api = Self::default();
        api.go_offline();
        api
    }

    pub(crate) fn go_offline(&self) {
        self.state.borrow_mut().online = false;
    }

    pub(crate) fn go_online(&self) {
        self.state.borrow_mut().online = true;
    }

    /// Make every following submission fail validation with `errors`.
    pub(crate) fn reject_with(&self, errors: ValidationErrors) {
        self.state.borrow_mut().rejection = Some(errors);
    }

    /// Append `record` to `queue` while the next bulk request is in flight.
    pub(crate) fn append_during_batch(&self, queue: PendingQueue, record: Transaction) {
        self.state.borrow_mut().append_during_batch = Some((queue, record));
    }

    pub(crate) fn store(&self, transactions: &[Transaction]) {
        self.state
            .borrow_mut()
            .stored
            .extend_from_slice(transactions);
    }

    /// Records the server accepted, in the order they arrived.
    pub(crate) fn stored(&self) -> Vec<Transaction> {
        self.state.borrow().stored.clone()
    }

    pub(crate) fn submit_attempts(&self) -> usize {
        self.state.borrow().submit_attempts
    }

    /// The body of every bulk request, including failed ones.
    pub(crate) fn batch_attempts(&self) -> Vec<Vec<Transaction>> {
        self.state.borrow().batch_attempts.clone()
    }

    fn check_request(&self) -> Result<(), SubmitError> {
        let state = self.state.borrow();

        if !state.online {
            return Err(SubmitError::Network("connection refused".to_owned()));
        }

        match &state.rejection {
            Some(errors) => Err(SubmitError::Rejected(errors.clone())),
            None => Ok(()),
        }
    }
}

impl TransactionApi for FakeApi {
    async fn fetch_transactions(&self) -> Result<Vec<Transaction>, SubmitError> {
        if !self.state.borrow().online {
            return Err(SubmitError::Network("connection refused".to_owned()));
        }

        let mut transactions = self.stored();
        transactions.reverse();

        Ok(transactions)
    }

    async fn submit(&self, transaction: &Transaction) -> Result<Transaction, SubmitError> {
        self.state.borrow_mut().submit_attempts += 1;
        self.check_request()?;
        self.store(std::slice::from_ref(transaction));

        Ok(transaction.clone())
    }

    async fn submit_batch(&self, transactions: &[Transaction]) -> Result<(), SubmitError> {
        self.state
            .borrow_mut()
            .batch_attempts
            .push(transactions.to_vec());

        let late_append = self.state.borrow_mut().append_during_batch.take();
        if let Some((queue, record)) = late_append {
            queue.append(&record).expect("Could not append record");
        }

        self.check_request()?;
        self.store(transactions);

        Ok(())
    }

    async fn is_reachable(&self) -> bool {
        self.state.borrow().online
    }
}
