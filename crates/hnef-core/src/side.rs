//! Side (Black / White) of a Hnefatafl game.

use crate::field::Field;

/// The two sides of the game.
///
/// Black attacks from the edges and always moves first; White defends
/// the King at the center.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    Black,
    White,
}

impl Side {
    /// The other side.
    pub fn opponent(self) -> Self {
        match self {
            Side::Black => Side::White,
            Side::White => Side::Black,
        }
    }

    /// Whether `field` holds a piece this side may move.
    ///
    /// The King moves for White.
    pub fn owns(self, field: Field) -> bool {
        match self {
            Side::Black => field == Field::Black,
            Side::White => field == Field::White || field == Field::King,
        }
    }
}
