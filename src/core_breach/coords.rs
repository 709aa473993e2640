use crate::utils::prelude::*;

use super::consts::BOARD_SIZE;

/// Signed on-board test over the row*10+col encoding. Off-board deltas
/// land on a negative value or push a digit outside 0..=4.
pub fn on_board(pos: i8) -> bool {
    let col = pos % 10;
    let row = pos / 10;
    !(col < 0 || col > 4 || row < 0 || row > 4)
}

/// A board square, stored in the row*10+col byte encoding the wire format
/// and the program delta tables both use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    /// Constructs a square from row and column.
    pub fn new(row: u8, col: u8) -> Square {
        debug_assert!((row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE);
        Square(row * 10 + col)
    }

    /// Reinterprets a raw byte, if it encodes an on-board square.
    pub fn from_raw(raw: u8) -> Option<Square> {
        if raw <= i8::MAX as u8 && on_board(raw as i8) {
            Some(Square(raw))
        } else {
            None
        }
    }

    /// All squares in board-scan (row-major) order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE as u8).flat_map(|row| (0..BOARD_SIZE as u8).map(move |col| Square::new(row, col)))
    }

    pub fn row(&self) -> usize {
        (self.0 / 10) as usize
    }

    pub fn col(&self) -> usize {
        (self.0 % 10) as usize
    }

    /// The square's linear index in board-scan order, 0..25.
    pub fn scan_index(&self) -> usize {
        self.row() * BOARD_SIZE + self.col()
    }

    /// Applies a program delta under the given movement sign; None when the
    /// target leaves the board.
    pub fn offset(&self, delta: i8, sign: i8) -> Option<Square> {
        let target = self.0 as i8 + delta * sign;
        on_board(target).then(|| Square(target as u8))
    }

    /// The canonical notation of the square is its two-digit encoding.
    pub fn notate(&self) -> String {
        format!("{}{}", self.row(), self.col())
    }

    /// The raw row*10+col byte.
    pub fn raw(&self) -> u8 {
        self.0
    }
}

impl std::str::FromStr for Square {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.len() != 2 {
            return Err(anyhow!("expected 2 digit number for Square; received {s}"));
        }
        let [row, col] = [0, 1]
            .map(|i| s.chars().nth(i).unwrap())
            .map(|x| x.to_string().parse::<u8>());
        let [row, col] = [row?, col?];
        if row as usize >= BOARD_SIZE || col as usize >= BOARD_SIZE {
            return Err(anyhow!("square {s} is off the board"));
        }
        Ok(Square::new(row, col))
    }
}
