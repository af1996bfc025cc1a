//! hnef-core
//!
//! Pure Hnefatafl game logic:
//! - sides and field kinds
//! - board coordinates and moves
//! - the 11×11 board with move legality, capture and win detection
//! - a game room pairing two named players around one board

pub mod side;
pub mod field;
pub mod coords;
pub mod board;
pub mod room;
pub mod error;

pub use side::Side;
pub use field::Field;
pub use coords::{Move, ParseMoveError, Position};
pub use board::{Board, MoveReport, BOARD_SIZE};
pub use room::{GameStatus, Room, RoomId};
pub use error::MoveError;
