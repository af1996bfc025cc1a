//! The 11×11 Hnefatafl board and its rules.
//!
//! Layout at game start:
//! - Escape cells on the four corners.
//! - 24 Black warriors in T-shaped arms at each edge midpoint.
//! - 12 White warriors in a diamond around the King.
//! - The King on the center cell (the Throne).
//!
//! Rules enforced here:
//! - Pieces move any distance horizontally or vertically, never
//!   diagonally, and never over or onto another piece.
//! - Only the King may land on the Throne or an Escape; anyone may
//!   pass over the empty Throne.
//! - Custodian capture: a warrior sandwiched between the moving piece
//!   and a hostile cell on the far side is removed. Hostile means an
//!   allied piece of the mover, the Throne or an Escape, for both
//!   sides alike (even once the King has left the Throne).
//! - The King is captured (Black wins) only when all four orthogonal
//!   neighbors are Black pieces, the Throne or an Escape. This is only
//!   checked after a Black move.
//! - White wins when the King reaches an Escape.

use crate::coords::{Move, Position};
use crate::error::MoveError;
use crate::field::Field;
use crate::side::Side;

/// Edge length of the board.
pub const BOARD_SIZE: usize = 11;

/// The Throne, where the King starts.
pub const CENTER: Position = Position::new(5, 5);

const DIRECTIONS: [(i8, i8); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Starting layout, one string per row, using wire digits.
const START_ROWS: [&str; BOARD_SIZE] = [
    "20033333002",
    "00000300000",
    "00000000000",
    "30000400003",
    "30004440003",
    "33044544033",
    "30004440003",
    "30000400003",
    "00000000000",
    "00000300000",
    "20033333002",
];

/// Result of a move the board accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    /// The move as played.
    pub mv: Move,
    /// Cells whose pieces were removed by this move (the King included).
    pub captured: Vec<Position>,
    /// Set when this move ended the game.
    pub winner: Option<Side>,
}

/// Board state: a grid of fields indexed `[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Field; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// A board in the starting position.
    pub fn new() -> Self {
        let mut board = Board::empty();
        for (y, row) in START_ROWS.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if let Some(field) = Field::from_digit(c) {
                    board.cells[y][x] = field;
                }
            }
        }
        board
    }

    /// A board with terrain only: Escapes on the corners and the Throne
    /// in the center, no pieces. Handy for setting up positions.
    pub fn empty() -> Self {
        let mut cells = [[Field::Empty; BOARD_SIZE]; BOARD_SIZE];
        let last = BOARD_SIZE - 1;
        cells[0][0] = Field::Escape;
        cells[0][last] = Field::Escape;
        cells[last][0] = Field::Escape;
        cells[last][last] = Field::Escape;
        cells[CENTER.y as usize][CENTER.x as usize] = Field::Throne;
        Board { cells }
    }

    /// Rebuild a board from a playfield string (121 wire digits,
    /// row-major). Returns `None` on any other input.
    pub fn from_digits(digits: &str) -> Option<Self> {
        if digits.chars().count() != BOARD_SIZE * BOARD_SIZE {
            return None;
        }
        let mut cells = [[Field::Empty; BOARD_SIZE]; BOARD_SIZE];
        for (i, c) in digits.chars().enumerate() {
            cells[i / BOARD_SIZE][i % BOARD_SIZE] = Field::from_digit(c)?;
        }
        Some(Board { cells })
    }

    /// Field at `pos`, or `None` if off the board.
    pub fn get(&self, pos: Position) -> Option<Field> {
        if in_bounds(pos) {
            Some(self.cells[pos.y as usize][pos.x as usize])
        } else {
            None
        }
    }

    /// Overwrite a cell. Positions off the board are ignored.
    pub fn set(&mut self, pos: Position, field: Field) {
        if in_bounds(pos) {
            self.cells[pos.y as usize][pos.x as usize] = field;
        }
    }

    /// Number of cells holding `field`.
    pub fn count(&self, field: Field) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|f| **f == field)
            .count()
    }

    /// Where the King stands, if still on the board.
    pub fn king_position(&self) -> Option<Position> {
        all_positions().find(|p| self.get(*p) == Some(Field::King))
    }

    /// One digit per cell, row-major (the wire playfield).
    pub fn playfield_string(&self) -> String {
        self.cells.iter().flatten().map(|f| f.as_digit()).collect()
    }

    /// Validate, apply, resolve captures and check for a winner.
    pub fn play(&mut self, side: Side, mv: Move) -> Result<MoveReport, MoveError> {
        self.validate_move(side, mv)?;
        let moved = self.apply_move(mv);

        let kings = self.count(Field::King);
        let captured = self.check_captures(side, mv.to);

        let winner = if moved == Field::King && is_escape(mv.to) {
            Some(Side::White)
        } else if self.count(Field::King) < kings {
            Some(Side::Black)
        } else {
            None
        };

        Ok(MoveReport {
            mv,
            captured,
            winner,
        })
    }

    /// Check whether `side` may play `mv` on the current board.
    pub fn validate_move(&self, side: Side, mv: Move) -> Result<(), MoveError> {
        let (Some(from), Some(to)) = (self.get(mv.from), self.get(mv.to)) else {
            return Err(MoveError::OutOfBounds);
        };
        if mv.from == mv.to {
            return Err(MoveError::Stationary);
        }
        if mv.from.x != mv.to.x && mv.from.y != mv.to.y {
            return Err(MoveError::NotOrthogonal);
        }
        if !side.owns(from) {
            return Err(MoveError::NotYourPiece(mv.from));
        }

        let may_land = match from {
            Field::King => matches!(to, Field::Empty | Field::Throne | Field::Escape),
            _ => to == Field::Empty,
        };
        if !may_land {
            return Err(if to.is_terrain() {
                MoveError::ForbiddenTarget(mv.to)
            } else {
                MoveError::PathBlocked(mv.to)
            });
        }

        match path_between(mv.from, mv.to)
            .into_iter()
            .find(|p| !self.get(*p).is_some_and(Field::is_passable))
        {
            Some(blocked) => Err(MoveError::PathBlocked(blocked)),
            None => Ok(()),
        }
    }

    /// Relocate the piece. The vacated cell becomes the Throne if it was
    /// the center, Empty otherwise. Returns the piece that moved.
    ///
    /// Does not validate; call [`Board::validate_move`] first.
    pub fn apply_move(&mut self, mv: Move) -> Field {
        let piece = self.get(mv.from).unwrap_or(Field::Empty);
        self.set(mv.to, piece);
        self.set(mv.from, vacated(mv.from));
        piece
    }

    /// Resolve captures caused by a piece of `attacker` arriving at `at`.
    ///
    /// Returns every cell that was cleared. If the King is among them,
    /// Black has won.
    pub fn check_captures(&mut self, attacker: Side, at: Position) -> Vec<Position> {
        let mut captured = Vec::new();

        for (dx, dy) in DIRECTIONS {
            let (Some(victim), Some(far)) = (step(at, dx, dy, 1), step(at, dx, dy, 2)) else {
                continue;
            };
            let (Some(victim_field), Some(far_field)) = (self.get(victim), self.get(far)) else {
                continue;
            };
            if is_enemy_warrior(attacker, victim_field) && is_flanking(attacker, far_field) {
                self.set(victim, vacated(victim));
                captured.push(victim);
            }
        }

        if attacker == Side::Black {
            for (dx, dy) in DIRECTIONS {
                let Some(pos) = step(at, dx, dy, 1) else {
                    continue;
                };
                if self.get(pos) == Some(Field::King) && self.is_king_surrounded(pos) {
                    self.set(pos, vacated(pos));
                    captured.push(pos);
                }
            }
        }

        captured
    }

    /// All four sides of `king` are Black, Throne or Escape. A side off
    /// the board never counts, so a King on the edge is safe.
    fn is_king_surrounded(&self, king: Position) -> bool {
        DIRECTIONS.iter().all(|&(dx, dy)| {
            step(king, dx, dy, 1)
                .and_then(|p| self.get(p))
                .is_some_and(|f| matches!(f, Field::Black | Field::Throne | Field::Escape))
        })
    }
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn all_positions() -> impl Iterator<Item = Position> {
    (0..BOARD_SIZE as u8).flat_map(|y| (0..BOARD_SIZE as u8).map(move |x| Position::new(x, y)))
}

fn in_bounds(pos: Position) -> bool {
    (pos.x as usize) < BOARD_SIZE && (pos.y as usize) < BOARD_SIZE
}

fn is_escape(pos: Position) -> bool {
    let last = (BOARD_SIZE - 1) as u8;
    (pos.x == 0 || pos.x == last) && (pos.y == 0 || pos.y == last)
}

fn vacated(pos: Position) -> Field {
    if pos == CENTER {
        Field::Throne
    } else {
        Field::Empty
    }
}

/// `pos` moved `n` cells along `(dx, dy)`, if that stays on the board.
fn step(pos: Position, dx: i8, dy: i8, n: i8) -> Option<Position> {
    let x = i16::from(pos.x) + i16::from(dx * n);
    let y = i16::from(pos.y) + i16::from(dy * n);
    let size = BOARD_SIZE as i16;
    if (0..size).contains(&x) && (0..size).contains(&y) {
        Some(Position::new(x as u8, y as u8))
    } else {
        None
    }
}

/// Cells strictly between `from` and `to` on a straight line.
fn path_between(from: Position, to: Position) -> Vec<Position> {
    if from.y == to.y {
        let (lo, hi) = (from.x.min(to.x), from.x.max(to.x));
        (lo + 1..hi).map(|x| Position::new(x, from.y)).collect()
    } else {
        let (lo, hi) = (from.y.min(to.y), from.y.max(to.y));
        (lo + 1..hi).map(|y| Position::new(from.x, y)).collect()
    }
}

fn is_enemy_warrior(attacker: Side, field: Field) -> bool {
    match attacker {
        Side::Black => field == Field::White,
        Side::White => field == Field::Black,
    }
}

/// Far-side cell that completes a custodian capture for `attacker`.
fn is_flanking(attacker: Side, field: Field) -> bool {
    field.is_terrain() || attacker.owns(field)
}
