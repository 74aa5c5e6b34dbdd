//! Network Layer
//!
//! UDP datagram server for the two-player session. This layer is
//! **non-deterministic** - all game logic runs through `game/`.

pub mod protocol;
pub mod server;
pub mod session;

pub use protocol::{ClientMessage, IncorrectMove, ServerMessage, MAX_DATAGRAM};
pub use server::{handle_datagram, GameServer, GameServerError, Outbound, ServerConfig, ServerState};
pub use session::{JoinedPlayer, LeaveOutcome, SessionError, SessionManager};
