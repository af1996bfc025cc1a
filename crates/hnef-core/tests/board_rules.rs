// crates/hnef-core/tests/board_rules.rs
use hnef_core::board::CENTER;
use hnef_core::{Board, Field, Move, MoveError, Position, Side, BOARD_SIZE};

fn p(x: u8, y: u8) -> Position {
    Position::new(x, y)
}

fn mv(fx: u8, fy: u8, tx: u8, ty: u8) -> Move {
    Move::new(p(fx, fy), p(tx, ty))
}

#[test]
fn starting_position() {
    let board = Board::new();

    assert_eq!(board.count(Field::Black), 24);
    assert_eq!(board.count(Field::White), 12);
    assert_eq!(board.count(Field::King), 1);
    assert_eq!(board.count(Field::Escape), 4);
    assert_eq!(board.king_position(), Some(CENTER));

    for corner in [p(0, 0), p(10, 0), p(0, 10), p(10, 10)] {
        assert_eq!(board.get(corner), Some(Field::Escape));
    }
}

#[test]
fn playfield_string_round_trips() {
    let board = Board::new();
    let digits = board.playfield_string();

    assert_eq!(digits.len(), BOARD_SIZE * BOARD_SIZE);
    assert!(digits.starts_with("20033333002"));
    assert_eq!(Board::from_digits(&digits), Some(board));
    assert_eq!(Board::from_digits("123"), None);
}

#[test]
fn move_strings_are_two_digits_per_coordinate() {
    assert_eq!("03000301".parse::<Move>(), Ok(mv(3, 0, 3, 1)));
    assert_eq!(mv(10, 5, 7, 5).encode(), "10050705");
    assert!("0300030".parse::<Move>().is_err());
    assert!("0300030x".parse::<Move>().is_err());
}

#[test]
fn out_of_bounds_is_rejected() {
    let board = Board::new();
    assert_eq!(
        board.validate_move(Side::Black, mv(3, 0, 3, 11)),
        Err(MoveError::OutOfBounds)
    );
    assert_eq!(
        board.validate_move(Side::Black, mv(99, 0, 3, 1)),
        Err(MoveError::OutOfBounds)
    );
}

#[test]
fn diagonal_moves_are_rejected() {
    let board = Board::new();
    assert_eq!(
        board.validate_move(Side::Black, mv(3, 0, 4, 1)),
        Err(MoveError::NotOrthogonal)
    );
}

#[test]
fn staying_put_is_rejected() {
    let board = Board::new();
    assert_eq!(
        board.validate_move(Side::Black, mv(3, 0, 3, 0)),
        Err(MoveError::Stationary)
    );
}

#[test]
fn pieces_only_move_for_their_own_side() {
    let board = Board::new();

    assert_eq!(
        board.validate_move(Side::White, mv(3, 0, 3, 1)),
        Err(MoveError::NotYourPiece(p(3, 0)))
    );
    assert_eq!(
        board.validate_move(Side::Black, mv(5, 3, 2, 3)),
        Err(MoveError::NotYourPiece(p(5, 3)))
    );
    assert_eq!(
        board.validate_move(Side::Black, mv(2, 2, 2, 3)),
        Err(MoveError::NotYourPiece(p(2, 2)))
    );
    assert!(board.validate_move(Side::White, mv(5, 3, 2, 3)).is_ok());
}

#[test]
fn pieces_cannot_jump_or_land_on_pieces() {
    let board = Board::new();

    // (5,1) blocks the column below (5,0).
    assert_eq!(
        board.validate_move(Side::Black, mv(5, 0, 5, 2)),
        Err(MoveError::PathBlocked(p(5, 1)))
    );
    // (4,0) is occupied.
    assert_eq!(
        board.validate_move(Side::Black, mv(3, 0, 4, 0)),
        Err(MoveError::PathBlocked(p(4, 0)))
    );
}

#[test]
fn only_the_king_may_stand_on_an_escape() {
    let mut board = Board::empty();
    board.set(p(1, 0), Field::White);
    board.set(p(10, 1), Field::King);

    assert_eq!(
        board.validate_move(Side::White, mv(1, 0, 0, 0)),
        Err(MoveError::ForbiddenTarget(p(0, 0)))
    );
    assert!(board.validate_move(Side::White, mv(10, 1, 10, 0)).is_ok());
}

#[test]
fn warriors_may_cross_but_not_occupy_the_empty_throne() {
    let mut board = Board::empty();
    board.set(p(5, 3), Field::Black);
    board.set(p(3, 5), Field::White);

    assert_eq!(
        board.validate_move(Side::Black, mv(5, 3, 5, 5)),
        Err(MoveError::ForbiddenTarget(CENTER))
    );
    assert!(board.validate_move(Side::Black, mv(5, 3, 5, 8)).is_ok());
    assert!(board.validate_move(Side::White, mv(3, 5, 8, 5)).is_ok());
}

#[test]
fn king_leaving_the_center_leaves_the_throne_behind() {
    let mut board = Board::empty();
    board.set(CENTER, Field::King);

    let report = board.play(Side::White, mv(5, 5, 5, 2)).unwrap();

    assert_eq!(report.winner, None);
    assert_eq!(board.get(CENTER), Some(Field::Throne));
    assert_eq!(board.get(p(5, 2)), Some(Field::King));

    // and may come back to it
    assert!(board.validate_move(Side::White, mv(5, 2, 5, 5)).is_ok());
}

#[test]
fn ordinary_moves_leave_an_empty_cell() {
    let mut board = Board::new();
    let moved = board.apply_move(mv(3, 0, 3, 2));

    assert_eq!(moved, Field::Black);
    assert_eq!(board.get(p(3, 0)), Some(Field::Empty));
    assert_eq!(board.get(p(3, 2)), Some(Field::Black));
}
