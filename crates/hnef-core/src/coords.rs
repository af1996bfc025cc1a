//! Board coordinates and moves.
//!
//! A move travels on the wire as eight ASCII digits, two per
//! coordinate, in the order `x_from y_from x_to y_to`
//! (e.g. `03000301` moves the piece at column 3, row 0 to column 3, row 1).
//!
//! Parsing only checks the shape; whether the coordinates fall on the
//! board is the [`Board`](crate::board::Board)'s call.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A cell address: `x` is the column, `y` the row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

impl Position {
    pub const fn new(x: u8, y: u8) -> Self {
        Position { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A single move request: pick up the piece at `from`, put it on `to`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    pub const fn new(from: Position, to: Position) -> Self {
        Move { from, to }
    }

    /// Wire encoding (`xxyyxxyy`).
    pub fn encode(&self) -> String {
        format!(
            "{:02}{:02}{:02}{:02}",
            self.from.x, self.from.y, self.to.x, self.to.y
        )
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Why a move string could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMoveError {
    #[error("move must be exactly 8 digits, got {0} characters")]
    Length(usize),

    #[error("move contains a non-digit character")]
    NotDigit,
}

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 8 {
            return Err(ParseMoveError::Length(s.chars().count()));
        }
        if !bytes.iter().all(u8::is_ascii_digit) {
            return Err(ParseMoveError::NotDigit);
        }

        let pair = |i: usize| (bytes[i] - b'0') * 10 + (bytes[i + 1] - b'0');

        Ok(Move {
            from: Position::new(pair(0), pair(2)),
            to: Position::new(pair(4), pair(6)),
        })
    }
}
