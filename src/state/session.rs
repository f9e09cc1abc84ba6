use crate::game::strategy::Strategy;
use crate::game::Game;
use std::sync::Arc;
use tokio::task::AbortHandle;
use uuid::Uuid;

/// Connection identity. One per accepted socket, minted at upgrade time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Per-connection state: exactly one match, owned exclusively by this
/// connection for its whole lifetime.
#[derive(Debug)]
pub struct Session {
    // When is the session started/created
    pub session_started: std::time::Instant,

    /// The match this connection owns
    game: Game,

    /// Abort handle for the delayed opponent-state broadcast, if one is
    /// in flight. At most one pending broadcast per session.
    pending_reply: Option<AbortHandle>,
}

impl Session {
    pub fn new(strategy: Arc<dyn Strategy>) -> Self {
        Self {
            session_started: std::time::Instant::now(),
            game: Game::new(strategy),
            pending_reply: None,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    /// Track a newly scheduled delayed broadcast, cancelling any previous
    /// one so the client only ever receives the freshest state.
    pub fn set_pending_reply(&mut self, handle: AbortHandle) {
        if let Some(prev) = self.pending_reply.replace(handle) {
            prev.abort();
        }
    }

    pub fn cancel_pending_reply(&mut self) {
        if let Some(handle) = self.pending_reply.take() {
            handle.abort();
        }
    }
}

impl Drop for Session {
    // A dropped session must never leave a timer referencing it.
    fn drop(&mut self) {
        self.cancel_pending_reply();
    }
}
