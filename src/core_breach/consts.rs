use std::ops::Neg;

use super::coords::Square;
use crate::utils::prelude::*;

pub const BOARD_SIZE: usize = 5;
pub const NUM_PROGRAMS: usize = 5;

/// The units digit that marks a player's king piece.
pub const KING_UNIT: u8 = 3;

// A side in the duel.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Player {
    One = 1,
    Two = 2,
}

impl Player {
    /// Gets both sides in turn order.
    pub fn all() -> [Player; 2] {
        [Player::One, Player::Two]
    }

    /// The square this player's king must reach to win.
    /// Player 1 storms row 0, player 2 storms row 4, both on the center file.
    pub fn goal(&self) -> Square {
        match self {
            Player::One => Square::new(0, 2),
            Player::Two => Square::new(4, 2),
        }
    }

    /// Notates the player.
    pub fn notate(&self) -> String {
        format!("{}", self.uid())
    }

    /// Parses into a player.
    pub fn parse(s: &str) -> Result<Player> {
        match s {
            "1" => Ok(Player::One),
            "2" => Ok(Player::Two),
            _   => Err(anyhow!("invalid notation {s} for player"))
        }
    }

    /// Movement multiplier applied to program deltas, which are written
    /// from player 1's perspective. Evaluates to `3 - 2 * uid`.
    pub fn sign(&self) -> i8 {
        match self {
            Player::One => 1,
            Player::Two => -1,
        }
    }

    /// The player's wire identifier.
    pub fn uid(&self) -> u8 {
        *self as u8
    }

    /// Reads a wire identifier back into a player.
    pub fn from_uid(uid: u8) -> Option<Player> {
        match uid {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }
}

impl Neg for Player {
    type Output = Player;
    fn neg(self) -> Self::Output {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

// A movement pattern. Each player holds two active programs; the fifth
// sits decked (face down) and rotates in whenever a program is used.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Program {
    #[default]
    Dagger = 0,
    Harpoon = 1,
    Jackhammer = 2,
    Onion = 3,
    Shuriken = 4,
}

impl Program {
    /// Gets the programs in pid order.
    pub fn all() -> [Program; NUM_PROGRAMS] {
        [Program::Dagger, Program::Harpoon, Program::Jackhammer, Program::Onion, Program::Shuriken]
    }

    /// Relative square deltas in the row*10+col encoding, from player 1's
    /// perspective. Player 2 applies these under a negated sign.
    pub fn deltas(&self) -> &'static [i8] {
        match self {
            Program::Dagger     => &[-10, -1, 1],
            Program::Harpoon    => &[-20, 10],
            Program::Jackhammer => &[-11, -9, -1, 1],
            Program::Onion      => &[-1, 1, 9, 11],
            Program::Shuriken   => &[-11, -9, 9, 11],
        }
    }

    /// Reads a wire pid back into a program.
    pub fn from_pid(pid: u8) -> Option<Program> {
        match pid {
            0 => Some(Program::Dagger),
            1 => Some(Program::Harpoon),
            2 => Some(Program::Jackhammer),
            3 => Some(Program::Onion),
            4 => Some(Program::Shuriken),
            _ => None,
        }
    }

    /// The single-letter notation used in move strings.
    pub fn letter(&self) -> char {
        match self {
            Program::Dagger     => 'd',
            Program::Harpoon    => 'h',
            Program::Jackhammer => 'j',
            Program::Onion      => 'o',
            Program::Shuriken   => 's',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Program::Dagger     => "dagger",
            Program::Harpoon    => "harpoon",
            Program::Jackhammer => "jackhammer",
            Program::Onion      => "onion",
            Program::Shuriken   => "shuriken",
        }
    }

    /// The program's wire identifier.
    pub fn pid(&self) -> u8 {
        *self as u8
    }
}

impl std::str::FromStr for Program {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "d" | "D" => Ok(Program::Dagger),
            "h" | "H" => Ok(Program::Harpoon),
            "j" | "J" => Ok(Program::Jackhammer),
            "o" | "O" => Ok(Program::Onion),
            "s" | "S" => Ok(Program::Shuriken),
            _         => Err(anyhow!("invalid notation {s} for program"))
        }
    }
}
