//! Error types for the game core.
//!
//! Every rejected move carries the reason. The server only reports
//! "invalid move" on the wire, but the reason goes to the logs.

use thiserror::Error;

use crate::coords::Position;

/// Why the board refused a move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    /// One of the coordinates is off the 11×11 grid.
    #[error("coordinates out of bounds")]
    OutOfBounds,

    /// Source and target are the same cell.
    #[error("piece must actually move")]
    Stationary,

    /// Diagonal (or otherwise non-straight) move.
    #[error("move is not horizontal or vertical")]
    NotOrthogonal,

    /// The source cell holds nothing the side on turn may move.
    #[error("no piece of the side on turn at {0}")]
    NotYourPiece(Position),

    /// Some cell along the way (or the target) is occupied.
    #[error("path blocked at {0}")]
    PathBlocked(Position),

    /// Target cell is terrain this piece may not stand on.
    #[error("piece may not land on {0}")]
    ForbiddenTarget(Position),

    /// The player asking is not the one on turn.
    #[error("not this player's turn")]
    NotYourTurn,

    /// The player is not seated in this room.
    #[error("player is not in this room")]
    NotInRoom,

    /// The game already has a winner.
    #[error("game is already over")]
    GameOver,
}
