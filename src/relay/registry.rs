//! Client Registry
//!
//! Maps announced client ids to live connections. Owned by an explicit
//! instance on the application state so multiple relays can coexist and be
//! tested in isolation.

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A registered client's outbound channel.
struct ClientHandle {
    connection_id: Uuid,
    sender: mpsc::UnboundedSender<String>,
}

/// Registry of identified clients.
///
/// Keys are unique and last-writer-wins: a client re-announcing its id
/// replaces the previous channel for that id. Entries are removed when the
/// owning connection closes.
#[derive(Default)]
pub struct ClientRegistry {
    clients: DashMap<String, ClientHandle>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-register) a client id for a connection.
    pub fn register(
        &self,
        client_id: &str,
        connection_id: Uuid,
        sender: mpsc::UnboundedSender<String>,
    ) {
        let prior = self.clients.insert(
            client_id.to_string(),
            ClientHandle {
                connection_id,
                sender,
            },
        );

        match prior {
            Some(old) => tracing::debug!(
                client_id,
                old_connection = %old.connection_id,
                new_connection = %connection_id,
                "Client re-registered, replacing previous channel"
            ),
            None => tracing::info!(client_id, connection = %connection_id, "Client registered"),
        }
    }

    /// Forward a frame verbatim to the client registered under
    /// `receiver_id`.
    ///
    /// Fire-and-forget: returns `false` (and delivers nothing) when the id
    /// is unknown or its channel has closed. A closed channel also evicts
    /// the stale entry.
    pub fn forward(&self, receiver_id: &str, frame: &str) -> bool {
        let send_failed = match self.clients.get(receiver_id) {
            None => {
                tracing::trace!(receiver_id, "No registered receiver, dropping frame");
                return false;
            }
            Some(handle) => handle.sender.send(frame.to_owned()).is_err(),
        };

        if send_failed {
            self.clients.remove(receiver_id);
            tracing::debug!(receiver_id, "Receiver channel closed, dropping frame");
            return false;
        }

        true
    }

    /// Remove every registration owned by a closed connection.
    pub fn remove_connection(&self, connection_id: Uuid) {
        self.clients
            .retain(|_, handle| handle.connection_id != connection_id);
    }

    /// Connection id currently registered for a client, if any.
    pub fn resolve(&self, client_id: &str) -> Option<Uuid> {
        self.clients.get(client_id).map(|h| h.connection_id)
    }

    /// Number of registered clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
