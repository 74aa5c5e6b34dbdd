//! # Sudoku Duel Server
//!
//! Authoritative session engine for a two-player networked Sudoku duel.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   SUDOKU DUEL SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  └── rng.rs      - Xorshift128+ PRNG, seed derivation        │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── grid.rs     - Puzzle generation                         │
//! │  ├── state.rs    - Match state: board, turn, scores          │
//! │  └── turn.rs     - Move validation and turn rotation         │
//! │                                                              │
//! │  network/        - Networking (non-deterministic)            │
//! │  ├── server.rs   - UDP event loop and datagram handler       │
//! │  ├── protocol.rs - Message types                             │
//! │  └── session.rs  - Player registration and liveness          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Authority Model
//!
//! The server is the single source of truth: the solved grid, the turn
//! owner, and the scores exist only here. Clients hold disposable
//! copies of the last broadcast and are replaced wholesale on every
//! update. The transport is a lossy datagram channel; the design
//! accepts silent loss rather than preventing it, and every inbound
//! datagram is independently decoded, validated, and either applied or
//! dropped.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use crate::core::rng::DeterministicRng;
pub use crate::game::grid::{Board, Puzzle};
pub use crate::game::state::{MatchState, PlayerNumber};
pub use crate::network::protocol::{ClientMessage, ServerMessage};
pub use crate::network::server::{GameServer, GameServerError, ServerConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
