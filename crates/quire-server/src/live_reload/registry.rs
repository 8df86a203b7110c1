//! Registry of connected live reload clients.
//!
//! Each client owns a bounded outbound queue drained by its connection task.
//! The registry only ever `try_send`s onto those queues, so a slow or dead
//! client never blocks registration or broadcast for the others. A full or
//! closed queue counts as a failed send and removes the client.
//!
//! All mutations go through one mutex. The handshake is enqueued before a
//! client is inserted and broadcasts enqueue while holding the lock, so every
//! client sees `info` first and broadcasts in the order they were issued.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use uuid::Uuid;

use super::message::LiveReloadMessage;

/// Connection handle for a live reload client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Generate a fresh random ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle of a client connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientState {
    /// Accepted, handshake not yet sent.
    Connecting,
    /// Handshake sent; receives reload broadcasts.
    Active,
    /// Closed by either side or dropped after a failed send. Terminal.
    Closed,
}

/// Snapshot of a registered client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewClient {
    /// Connection handle.
    pub id: ClientId,
    /// URL the client watches.
    pub url: String,
    /// Current state.
    pub state: ClientState,
}

/// Rejected registration.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    /// A client with the same handle is already registered.
    #[error("client {0} is already registered")]
    Duplicate(ClientId),
    /// The handshake could not be queued.
    #[error("handshake with client {0} failed")]
    HandshakeFailed(ClientId),
}

/// Outcome of a broadcast.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Clients the message was queued for.
    pub delivered: usize,
    /// Clients removed because their queue rejected the message.
    pub dropped: Vec<ClientId>,
}

struct ClientEntry {
    client: PreviewClient,
    outbound: mpsc::Sender<LiveReloadMessage>,
}

/// Set of connected live reload clients.
#[derive(Default)]
pub struct ClientRegistry {
    clients: Mutex<HashMap<ClientId, ClientEntry>>,
}

impl ClientRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn clients(&self) -> MutexGuard<'_, HashMap<ClientId, ClientEntry>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a client and send its `info` handshake.
    ///
    /// `outbound` is the client's message queue. The client is only inserted
    /// once the handshake is queued.
    ///
    /// # Errors
    ///
    /// Returns [`RegisterError::Duplicate`] if `id` is already registered and
    /// [`RegisterError::HandshakeFailed`] if the queue rejects the handshake;
    /// in both cases the registry is unchanged.
    pub fn register(
        &self,
        id: ClientId,
        url: String,
        outbound: mpsc::Sender<LiveReloadMessage>,
    ) -> Result<PreviewClient, RegisterError> {
        let mut clients = self.clients();
        if clients.contains_key(&id) {
            return Err(RegisterError::Duplicate(id));
        }

        let mut client = PreviewClient {
            id,
            url,
            state: ClientState::Connecting,
        };

        let handshake = LiveReloadMessage::Info {
            url: client.url.clone(),
        };
        if let Err(err) = outbound.try_send(handshake) {
            tracing::debug!(client = %id, error = %err, "Live reload handshake failed");
            return Err(RegisterError::HandshakeFailed(id));
        }

        client.state = ClientState::Active;
        clients.insert(
            id,
            ClientEntry {
                client: client.clone(),
                outbound,
            },
        );
        tracing::debug!(
            client = %id,
            url = %client.url,
            clients = clients.len(),
            "Live reload client registered"
        );

        Ok(client)
    }

    /// Queue a `reload` for every active client.
    ///
    /// Clients whose queue rejects the message are closed and removed before
    /// this returns; the others are unaffected.
    pub fn notify_changed(&self, affected_path: &Path) -> BroadcastReport {
        let mut clients = self.clients();
        let mut report = BroadcastReport::default();

        for (id, entry) in clients.iter_mut() {
            if entry.client.state != ClientState::Active {
                continue;
            }
            match entry.outbound.try_send(LiveReloadMessage::Reload) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    entry.client.state = ClientState::Closed;
                    tracing::warn!(client = %id, error = %err, "Dropping live reload client");
                    report.dropped.push(*id);
                }
            }
        }

        for id in &report.dropped {
            clients.remove(id);
        }

        tracing::debug!(
            path = %affected_path.display(),
            delivered = report.delivered,
            dropped = report.dropped.len(),
            "Reload broadcast"
        );

        report
    }

    /// Remove a client. Returns `false` if it was not registered.
    pub fn unregister(&self, id: ClientId) -> bool {
        let removed = self.clients().remove(&id).is_some();
        if removed {
            tracing::debug!(client = %id, "Live reload client unregistered");
        }
        removed
    }

    /// Current state of a client; unknown clients are `Closed`.
    #[must_use]
    pub fn state(&self, id: ClientId) -> ClientState {
        self.clients()
            .get(&id)
            .map_or(ClientState::Closed, |entry| entry.client.state)
    }

    /// Snapshot of a registered client.
    #[must_use]
    pub fn get(&self, id: ClientId) -> Option<PreviewClient> {
        self.clients().get(&id).map(|entry| entry.client.clone())
    }

    /// Number of registered clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients().len()
    }

    /// Whether no clients are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients().is_empty()
    }
}
