use crate::game::Snapshot;
use serde::{Deserialize, Serialize};

/// Intents a client may send over the socket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClientFrame {
    Move { index: usize },
    Reset,
}

/// Events the server pushes to a client. Only ever delivered to the
/// connection that owns the originating match.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerFrame {
    State(Snapshot),
}
