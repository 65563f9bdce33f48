//! The online/offline signal the sync coordinator listens to.

use std::time::Duration;

use tokio::{
    sync::watch,
    time::{MissedTickBehavior, interval},
};

use crate::client::TransactionApi;

/// Whether the server can currently be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// The server answered the last probe.
    Online,
    /// The server did not answer the last probe.
    Offline,
}

impl Connectivity {
    /// Whether this is [Connectivity::Online].
    pub fn is_online(self) -> bool {
        self == Connectivity::Online
    }
}

/// Publishes [Connectivity] changes on a watch channel.
///
/// Subscribers are only woken when the value actually changes, so every
/// notification is an edge (offline to online or online to offline).
#[derive(Debug)]
pub struct ConnectivityMonitor {
    sender: watch::Sender<Connectivity>,
    probe_interval: Duration,
}

impl ConnectivityMonitor {
    /// Create a monitor starting at `initial` that probes every `probe_interval`
    /// when [ConnectivityMonitor::run] is used.
    pub fn new(initial: Connectivity, probe_interval: Duration) -> Self {
        let (sender, _) = watch::channel(initial);

        Self {
            sender,
            probe_interval,
        }
    }

    /// Get a receiver for connectivity changes.
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.sender.subscribe()
    }

    /// The last published connectivity.
    pub fn current(&self) -> Connectivity {
        *self.sender.borrow()
    }

    /// Publish `connectivity`, returning whether it differs from the previous value.
    pub fn set(&self, connectivity: Connectivity) -> bool {
        let changed = self.sender.send_if_modified(|current| {
            if *current == connectivity {
                false
            } else {
                *current = connectivity;
                true
            }
        });

        if changed {
            tracing::info!("connectivity changed to {connectivity:?}");
        }

        changed
    }

    /// Check whether the server is reachable and publish the result.
    pub async fn probe<A: TransactionApi>(&self, api: &A) -> Connectivity {
        let connectivity = if api.is_reachable().await {
            Connectivity::Online
        } else {
            Connectivity::Offline
        };

        self.set(connectivity);

        connectivity
    }

    /// Probe the server on an interval until every subscriber has gone away.
    pub async fn run<A: TransactionApi>(&self, api: &A) {
        let mut ticker = interval(self.probe_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !self.sender.is_closed() {
            ticker.tick().await;
            self.probe(api).await;
        }

        tracing::debug!("no connectivity subscribers left, stopping probes");
    }
}
