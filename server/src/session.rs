//! Session coordinator owning the game store and the connection registry
//!
//! All connection tasks share one `Session`. Every command is applied inside a
//! single critical section: the line is parsed, the guessed game's
//! participants are snapshotted, the interpreter runs and the recipients of
//! every resulting line are resolved before the lock is released. Delivery happens after the
//! lock is dropped, so a slow connection never holds up other clients.
//!
//! Broadcast recipients come from the snapshot taken *before* the command was
//! applied. A finishing guess removes the game from the store, so the
//! post-mutation state no longer knows who was playing.

use crate::commands::{self, CommandOutput};
use crate::store::{ConnectionId, GameStore};
use log::{debug, info, warn};
use shared::Request;
use std::collections::{HashMap, HashSet};
use tokio::sync::{mpsc, Mutex};

/// Output sink of one connection. Each line is written to the transport by
/// the connection's writer task.
pub type LineSender = mpsc::UnboundedSender<String>;

/// A line bound for one connection, resolved under the session lock
#[derive(Debug)]
struct Delivery {
    connection_id: ConnectionId,
    sink: LineSender,
    line: String,
}

struct SessionState {
    store: GameStore,
    clients: HashMap<ConnectionId, LineSender>,
}

impl SessionState {
    /// Resolves the reply and broadcasts of one command into concrete deliveries
    fn route(
        &self,
        issuer: ConnectionId,
        output: CommandOutput,
        snapshot: &HashMap<String, HashSet<ConnectionId>>,
    ) -> Vec<Delivery> {
        let mut deliveries = Vec::new();

        if let Some(reply) = output.reply {
            self.push_delivery(&mut deliveries, issuer, reply);
        }

        for (game_name, message) in output.broadcasts {
            let Some(participants) = snapshot.get(&game_name) else {
                warn!("No participants recorded for game {}", game_name);
                continue;
            };

            for &connection_id in participants {
                self.push_delivery(&mut deliveries, connection_id, message.clone());
            }
        }

        deliveries
    }

    fn push_delivery(&self, deliveries: &mut Vec<Delivery>, connection_id: ConnectionId, line: String) {
        match self.clients.get(&connection_id) {
            Some(sink) => deliveries.push(Delivery {
                connection_id,
                sink: sink.clone(),
                line,
            }),
            None => warn!("Dropping line for unknown client {}", connection_id),
        }
    }
}

/// Participants of the game a command can broadcast to, copied before it runs
///
/// Only `guess` broadcasts, and only to the game named by its first argument.
fn recipient_snapshot(store: &GameStore, request: &Request) -> HashMap<String, HashSet<ConnectionId>> {
    if request.command != "guess" {
        return HashMap::new();
    }

    request
        .args
        .first()
        .and_then(|name| store.participants(name).map(|participants| (name.clone(), participants)))
        .into_iter()
        .collect()
}

/// Single owner of the game store and the connection registry
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState {
                store: GameStore::new(),
                clients: HashMap::new(),
            }),
        }
    }

    /// Registers a new connection and returns its id
    pub async fn on_connect(&self, sink: LineSender) -> ConnectionId {
        let mut state = self.state.lock().await;
        let connection_id = state.store.allocate_connection_id();
        state.clients.insert(connection_id, sink);
        info!("Client {} connected", connection_id);
        connection_id
    }

    /// Applies one request line and delivers its reply and broadcasts
    pub async fn on_line(&self, connection_id: ConnectionId, line: &str) {
        let request = Request::parse(line);

        let deliveries = {
            let mut state = self.state.lock().await;
            let snapshot = recipient_snapshot(&state.store, &request);
            let output = commands::apply(
                &mut state.store,
                &request.command,
                &request.args(),
                connection_id,
            );
            state.route(connection_id, output, &snapshot)
        };

        debug!(
            "Client {} {}: {} line(s) to deliver",
            connection_id,
            request.command,
            deliveries.len()
        );

        for delivery in deliveries {
            if delivery.sink.send(delivery.line).is_err() {
                debug!("Client {} is no longer receiving", delivery.connection_id);
            }
        }
    }

    /// Removes a connection from the registry and from every active game
    pub async fn on_disconnect(&self, connection_id: ConnectionId) {
        let mut state = self.state.lock().await;
        state.clients.remove(&connection_id);
        state.store.remove_participant(connection_id);
        info!("Client {} disconnected", connection_id);
    }

    /// Number of currently registered connections
    pub async fn client_count(&self) -> usize {
        self.state.lock().await.clients.len()
    }

    /// Runs a read-only closure against the store
    pub async fn inspect<T>(&self, f: impl FnOnce(&GameStore) -> T) -> T {
        let state = self.state.lock().await;
        f(&state.store)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
