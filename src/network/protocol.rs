//! Protocol Messages
//!
//! Wire format for client-server communication. Every message is one
//! self-contained JSON datagram; nothing spans datagrams and nothing
//! depends on transport ordering. A datagram whose tag is unrecognized
//! fails decoding and is dropped by the handler.

use serde::{Deserialize, Serialize};

use crate::game::grid::Board;
use crate::game::state::PLAYER_COUNT;

/// Largest datagram the server will receive. A full update message is a
/// few hundred bytes of JSON; this leaves generous headroom.
pub const MAX_DATAGRAM: usize = 4096;

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Register this endpoint as a player.
    Join,

    /// Attempt to fill a cell.
    Move {
        /// Column, `0..=8`.
        x: u8,
        /// Row, `0..=8`.
        y: u8,
        /// Guessed value.
        value: u8,
    },

    /// Voluntarily leave the match.
    Disconnect,
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Response to a successful join.
    Init {
        /// Current board.
        board: Board,
        /// The number assigned to the joining player.
        player_number: u8,
        /// Whose turn it is.
        current_turn: u8,
        /// Scores indexed by player number.
        scores: [i64; PLAYER_COUNT],
        /// Cells filled correctly so far, as `(x, y)`.
        correct_cells: Vec<(u8, u8)>,
    },

    /// State changed. Addressed per-recipient: `incorrect_move` is set
    /// only on the copy sent to the player whose guess was wrong.
    Update {
        /// Current board.
        board: Board,
        /// Whose turn it is now.
        current_turn: u8,
        /// Scores indexed by player number.
        scores: [i64; PLAYER_COUNT],
        /// Cells filled correctly so far, as `(x, y)`.
        correct_cells: Vec<(u8, u8)>,
        /// The rejected guess, echoed back so the frontend can flag it.
        #[serde(skip_serializing_if = "Option::is_none")]
        incorrect_move: Option<IncorrectMove>,
    },

    /// Match finished. A new match starts immediately on the server;
    /// clients rejoin to enter it.
    GameEnd {
        /// Final board.
        board: Board,
        /// Final scores indexed by player number.
        scores: [i64; PLAYER_COUNT],
        /// Cells filled correctly during the match.
        correct_cells: Vec<(u8, u8)>,
    },

    /// Liveness probe sent to registered players when a join arrives
    /// while the match is full.
    Ping,

    /// Server is shutting down.
    Disconnect,
}

/// A wrong guess, echoed to its sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncorrectMove {
    /// Column of the guess.
    pub x: u8,
    /// Row of the guess.
    pub y: u8,
    /// The value that did not match the solution.
    pub value: u8,
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to a JSON datagram payload.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a received datagram payload.
    pub fn from_slice(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}

impl ServerMessage {
    /// Serialize to a JSON datagram payload.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a received datagram payload.
    pub fn from_slice(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}
