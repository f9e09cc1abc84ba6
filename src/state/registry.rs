use crate::config::Config;
use crate::error::{GameError, RegistryError};
use crate::game::strategy::{FirstEmpty, Strategy};
use crate::game::{MoveOutcome, Snapshot};
use crate::state::session::{Session, SessionId};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::task::AbortHandle;

/// Owns every live session. Sessions are created the moment a connection is
/// accepted and destroyed the moment it goes away; no session is ever shared
/// between connections, so there is no cross-session locking.
pub struct Registry {
    pub config: Arc<Config>,
    strategy: Arc<dyn Strategy>,
    sessions: DashMap<SessionId, Session>,
}

impl Registry {
    pub fn new(config: Arc<Config>) -> Self {
        Self::with_strategy(config, Arc::new(FirstEmpty))
    }

    pub fn with_strategy(config: Arc<Config>, strategy: Arc<dyn Strategy>) -> Self {
        Self {
            config,
            strategy,
            sessions: DashMap::new(),
        }
    }

    /// Fresh session for a new connection. The returned snapshot is the
    /// initial state event for that connection only.
    pub fn connect(&self) -> (SessionId, Snapshot) {
        let id = SessionId::new();
        let session = Session::new(self.strategy.clone());
        let snapshot = session.game().snapshot();
        self.sessions.insert(id, session);
        tracing::debug!(%id, sessions = self.sessions.len(), "session created");
        (id, snapshot)
    }

    /// Remove and discard the session. Idempotent: unknown ids are a no-op.
    /// Dropping the session cancels any pending delayed broadcast.
    pub fn disconnect(&self, id: SessionId) {
        if self.sessions.remove(&id).is_some() {
            tracing::debug!(%id, sessions = self.sessions.len(), "session destroyed");
        }
    }

    /// Route a move intent to the owned match.
    pub fn apply_move(&self, id: SessionId, idx: usize) -> Result<MoveOutcome, RegistryError> {
        let mut session = self
            .sessions
            .get_mut(&id)
            .ok_or(RegistryError::UnknownSession(id))?;
        let outcome = session.game_mut().apply_move(idx)?;
        Ok(outcome)
    }

    /// Route a reset intent; always succeeds for a live session.
    pub fn reset(&self, id: SessionId) -> Result<Snapshot, RegistryError> {
        let mut session = self
            .sessions
            .get_mut(&id)
            .ok_or(RegistryError::UnknownSession(id))?;
        session.game_mut().reset();
        Ok(session.game().snapshot())
    }

    /// Pure read, used by the delayed broadcast at fire time. `None` means
    /// the connection is already gone and the broadcast must be dropped.
    pub fn snapshot(&self, id: SessionId) -> Option<Snapshot> {
        self.sessions.get(&id).map(|s| s.game().snapshot())
    }

    pub fn set_pending_reply(&self, id: SessionId, handle: AbortHandle) {
        if let Some(mut session) = self.sessions.get_mut(&id) {
            session.set_pending_reply(handle);
        } else {
            // Disconnect raced the schedule; the task must not fire.
            handle.abort();
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// True for the rejections the transport silently swallows.
pub fn is_silent_rejection(err: &RegistryError) -> bool {
    matches!(
        err,
        RegistryError::UnknownSession(_)
            | RegistryError::Game(
                GameError::InvalidIndex(_) | GameError::CellOccupied(_) | GameError::GameAlreadyOver
            )
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Player;

    fn registry() -> Registry {
        Registry::new(Arc::new(Config::default()))
    }

    #[test]
    fn t_connect_returns_fresh_snapshot() {
        let reg = registry();
        let (_, snap) = reg.connect();
        assert_eq!(snap.board, [None; 9]);
        assert_eq!(snap.current_player, Player::X);
        assert!(!snap.is_over);
        assert_eq!(reg.session_count(), 1);
    }

    #[test]
    fn t_sessions_are_isolated() {
        let reg = registry();
        let (a, _) = reg.connect();
        let (b, _) = reg.connect();

        reg.apply_move(a, 4).unwrap();

        let snap_b = reg.snapshot(b).unwrap();
        assert_eq!(snap_b.board, [None; 9]);
        let snap_a = reg.snapshot(a).unwrap();
        assert_eq!(snap_a.board[4], Some(Player::X));
    }

    #[test]
    fn t_disconnect_then_move_is_rejected() {
        let reg = registry();
        let (id, _) = reg.connect();
        reg.disconnect(id);
        assert_eq!(reg.session_count(), 0);

        let err = reg.apply_move(id, 0).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownSession(_)));
        assert!(is_silent_rejection(&err));
    }

    #[test]
    fn t_disconnect_is_idempotent() {
        let reg = registry();
        let (id, _) = reg.connect();
        reg.disconnect(id);
        reg.disconnect(id);
        reg.disconnect(SessionId::new());
    }

    #[test]
    fn t_reset_reinitializes_in_place() {
        let reg = registry();
        let (id, _) = reg.connect();
        reg.apply_move(id, 4).unwrap();

        let snap = reg.reset(id).unwrap();
        assert_eq!(snap.board, [None; 9]);
        assert_eq!(snap.current_player, Player::X);
        assert_eq!(reg.session_count(), 1);
    }

    #[test]
    fn t_rejected_move_is_silent_and_mutation_free() {
        let reg = registry();
        let (id, _) = reg.connect();
        reg.apply_move(id, 0).unwrap();
        let before = reg.snapshot(id).unwrap();

        let err = reg.apply_move(id, 0).unwrap_err();
        assert!(is_silent_rejection(&err));
        assert_eq!(reg.snapshot(id).unwrap(), before);
    }

    #[tokio::test]
    async fn t_disconnect_aborts_pending_reply() {
        let reg = Arc::new(registry());
        let (id, _) = reg.connect();

        let fired = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let fired_in_task = fired.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            fired_in_task.store(true, std::sync::atomic::Ordering::SeqCst);
        });
        reg.set_pending_reply(id, task.abort_handle());

        reg.disconnect(id);
        let _ = task.await;
        assert!(!fired.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn t_pending_reply_for_unknown_session_is_aborted() {
        let reg = registry();
        let task = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        });
        reg.set_pending_reply(SessionId::new(), task.abort_handle());
        assert!(task.await.unwrap_err().is_cancelled());
    }
}
