//! Cell contents of the playfield.

/// What occupies a single board cell.
///
/// The discriminants are the digits used on the wire when the
/// playfield is sent to clients (one digit per cell).
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Empty = 0,
    /// Center cell, after the King has left it.
    Throne = 1,
    /// One of the four corners.
    Escape = 2,
    Black = 3,
    White = 4,
    King = 5,
}

impl Field {
    /// Wire digit for this field (`'0'..='5'`).
    pub fn as_digit(self) -> char {
        char::from(b'0' + self as u8)
    }

    /// Parse a wire digit back into a field.
    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            '0' => Some(Field::Empty),
            '1' => Some(Field::Throne),
            '2' => Some(Field::Escape),
            '3' => Some(Field::Black),
            '4' => Some(Field::White),
            '5' => Some(Field::King),
            _ => None,
        }
    }

    /// Cells a piece may pass over on its way to the target.
    pub fn is_passable(self) -> bool {
        matches!(self, Field::Empty | Field::Throne)
    }

    /// Terrain that never moves and is never captured.
    pub fn is_terrain(self) -> bool {
        matches!(self, Field::Throne | Field::Escape)
    }
}
