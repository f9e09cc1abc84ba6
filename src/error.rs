use crate::state::session::SessionId;
use thiserror::Error;

pub type AppResult<T> = Result<T, InfraError>;

/// Rejections from match logic. All of these are silently dropped at the
/// transport boundary: no state change, no outbound snapshot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// Cell index outside 0..8
    #[error("cell index {0} is out of range")]
    InvalidIndex(usize),

    /// Cell already carries a mark
    #[error("cell {0} is already occupied")]
    CellOccupied(usize),

    /// Match reached a terminal state; only reset leaves it
    #[error("game is already over")]
    GameAlreadyOver,
}

/// Rejections from intent routing.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Intent for a connection that has no session (never connected, or
    /// already disconnected)
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Process-level failures: these end the server, not a single match.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid environment variable {0}: {1}")]
    InvalidEnv(&'static str, String),
}
