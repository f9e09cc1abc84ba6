pub mod config;
pub mod error;
pub mod game;
pub mod net;
pub mod state;

// Convenient re-exports (so call sites can do `oxo::Registry`, etc.)
pub use game::{Game, Player, Snapshot, Status};
pub use state::{
    registry::Registry,
    session::{Session, SessionId},
};
