//! The client side of the application.
//!
//! Submissions are made eagerly against the REST API. When the server cannot
//! be reached the record is kept in a [PendingQueue] on disk, and the
//! [SyncCoordinator] sends the whole queue to the bulk endpoint at start up
//! and whenever connectivity comes back.

mod api;
mod connectivity;
mod error;
mod queue;
mod state;
mod sync;

pub use api::{HttpTransactionApi, SubmitError, TransactionApi};
pub use connectivity::{Connectivity, ConnectivityMonitor};
pub use error::ClientError;
pub use queue::{PENDING_COLLECTION, PendingBatch, PendingQueue};
pub use state::{ClientState, SubmitOutcome};
pub use sync::{FlushOutcome, SyncCoordinator};

#[cfg(test)]
mod test_utils;
