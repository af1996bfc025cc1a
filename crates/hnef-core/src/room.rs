//! A game room: two named players around one board.
//!
//! Players are held by name, never by reference to a session record,
//! so the server may move a player to a new connection (reconnection)
//! without touching the room.

use crate::board::{Board, MoveReport};
use crate::coords::Move;
use crate::error::MoveError;
use crate::side::Side;

/// Room identifier. Never reused within a process lifetime.
pub type RoomId = u32;

/// Whether the game in a room is still running.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Over { winner: Side },
}

/// One running game.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    black: String,
    white: String,
    on_turn: Side,
    board: Board,
    status: GameStatus,
}

impl Room {
    /// Open a room. Black moves first.
    pub fn new(id: RoomId, black: impl Into<String>, white: impl Into<String>) -> Self {
        Room {
            id,
            black: black.into(),
            white: white.into(),
            on_turn: Side::Black,
            board: Board::new(),
            status: GameStatus::Playing,
        }
    }

    /// Open a room on a prepared board, with `on_turn` to move.
    pub fn with_board(
        id: RoomId,
        black: impl Into<String>,
        white: impl Into<String>,
        board: Board,
        on_turn: Side,
    ) -> Self {
        Room {
            on_turn,
            board,
            ..Room::new(id, black, white)
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn on_turn(&self) -> Side {
        self.on_turn
    }

    /// Name of the player playing `side`.
    pub fn player(&self, side: Side) -> &str {
        match side {
            Side::Black => &self.black,
            Side::White => &self.white,
        }
    }

    pub fn player_on_turn(&self) -> &str {
        self.player(self.on_turn)
    }

    pub fn player_on_stand(&self) -> &str {
        self.player(self.on_turn.opponent())
    }

    /// Which side `name` plays, if seated here.
    pub fn side_of(&self, name: &str) -> Option<Side> {
        if name == self.black {
            Some(Side::Black)
        } else if name == self.white {
            Some(Side::White)
        } else {
            None
        }
    }

    /// The other player's name.
    pub fn opponent_of(&self, name: &str) -> Option<&str> {
        self.side_of(name).map(|side| self.player(side.opponent()))
    }

    /// Wire playfield for this room's board.
    pub fn playfield_string(&self) -> String {
        self.board.playfield_string()
    }

    /// Play a move for `name`.
    ///
    /// Captures and the win check are resolved before the turn passes
    /// to the other player. A winning move closes the game; the turn
    /// does not pass.
    pub fn play(&mut self, name: &str, mv: Move) -> Result<MoveReport, MoveError> {
        if let GameStatus::Over { .. } = self.status {
            return Err(MoveError::GameOver);
        }
        let side = self.side_of(name).ok_or(MoveError::NotInRoom)?;
        if side != self.on_turn {
            return Err(MoveError::NotYourTurn);
        }

        let report = self.board.play(side, mv)?;

        match report.winner {
            Some(winner) => self.status = GameStatus::Over { winner },
            None => self.on_turn = side.opponent(),
        }

        Ok(report)
    }
}
