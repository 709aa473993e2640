use regex::Regex;

use crate::core_breach::prelude::*;

impl GameState {
    /// The full state string: `<player>/<50 board chars>/<5 program digits>`.
    /// Board cells are two characters each in board-scan order, `..` for an
    /// empty cell and the two-digit piece encoding otherwise.
    pub fn notate(&self) -> String {
        let board = Square::all()
            .map(|sq| {
                let piece = self.get_piece(sq);
                if piece.is_empty() {
                    "..".into()
                } else {
                    format!("{:02}", piece.raw())
                }
            })
            .collect::<String>();
        let progs = self.progs.iter().map(|p| char::from(b'0' + p.pid())).collect::<String>();
        format!("{}/{}/{}", self.to_move.notate(), board, progs)
    }
}

/// A parsed state string. The embedded flags are recomputed: a state handed
/// over in notation is terminal exactly when its board says so.
#[derive(Clone, Debug)]
pub struct StateString {
    pub repr: String,
    pub state: GameState,
}

impl std::str::FromStr for StateString {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts = s.split('/').collect::<Vec<&str>>();
        let [player, board, progs]: [&str; 3] = parts
            .try_into()
            .map_err(|_| anyhow!("expected <player>/<board>/<programs>; received {s}"))?;

        let to_move = Player::parse(player)?;

        if board.len() != 2 * BOARD_SIZE * BOARD_SIZE {
            return Err(anyhow!("expected {} board characters; received {}", 2 * BOARD_SIZE * BOARD_SIZE, board.len()));
        }
        let mut state = GameState {
            to_move,
            board: [[Cell::EMPTY; BOARD_SIZE]; BOARD_SIZE],
            progs: Program::all(),
            ended: false,
            win: false,
        };
        for (sq, chunk) in Square::all().zip(board.as_bytes().chunks(2)) {
            let chunk = std::str::from_utf8(chunk)?;
            if chunk == ".." {
                continue;
            }
            let raw = chunk.parse::<u8>().context(format!("bad cell {chunk}"))?;
            if Player::from_uid(raw / 10).is_none() {
                return Err(anyhow!("cell {chunk} is owned by no player"));
            }
            state.set_piece(sq, Cell::from_raw(raw));
        }

        if progs.len() != NUM_PROGRAMS {
            return Err(anyhow!("expected {NUM_PROGRAMS} program digits; received {progs}"));
        }
        for (slot, ch) in progs.chars().enumerate() {
            let pid = ch.to_digit(10).ok_or(anyhow!("bad program digit {ch}"))?;
            state.progs[slot] = Program::from_pid(pid as u8).ok_or(anyhow!("no program with pid {pid}"))?;
        }

        state.ended = state.is_terminal();
        Ok(StateString { repr: s.to_owned(), state })
    }
}

/// Notates an engine action: the move string, or `pass` when the engine had
/// nothing to play.
pub fn notate_move(action: Option<Move>) -> String {
    match action {
        Some(mv) => format!("{}:{}-{}", mv.prog.letter(), mv.from.notate(), mv.to.notate()),
        None => "pass".into(),
    }
}

/// A parsed move string of the form `<program letter>:<from>-<to>`
/// (for example `j:32-22`), or `pass` carrying no move.
#[derive(Clone, Debug)]
pub struct MoveString {
    pub repr: String,
    pub action: Option<Move>,
}

impl std::str::FromStr for MoveString {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s == "pass" {
            return Ok(MoveString { repr: s.to_owned(), action: None });
        }

        let pattern = Regex::new("^(?<prog>[dhjosDHJOS]):(?<from>[0-9]{2})-(?<to>[0-9]{2})$")?;
        let Some(matches) = pattern.captures(s) else {
            return Err(anyhow!("could not parse movestring {s}"));
        };

        let prog = matches.name("prog").unwrap().as_str().parse::<Program>()?;
        let from = matches.name("from").unwrap().as_str().parse::<Square>()?;
        let to = matches.name("to").unwrap().as_str().parse::<Square>()?;

        Ok(MoveString { repr: s.to_owned(), action: Some(Move { from, to, prog }) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips() {
        let state = GameState::initial();
        let parsed = state.notate().parse::<StateString>().unwrap();
        assert_eq!(parsed.state, state);
    }

    #[test]
    fn terminal_flag_is_recomputed() {
        let mut state = GameState::initial();
        state.set_piece(Square::new(0, 2), Cell::king_of(Player::One));
        let parsed = state.notate().parse::<StateString>().unwrap();
        assert!(parsed.state.ended);
    }

    #[test]
    fn bad_states_are_rejected() {
        assert!("3/..../01234".parse::<StateString>().is_err());
        assert!("1/..../01234".parse::<StateString>().is_err());
        let blank = "..".repeat(25);
        assert!(format!("1/{blank}/01239").parse::<StateString>().is_err());
    }

    #[test]
    fn move_round_trips() {
        let mv = Move {
            from: Square::new(3, 2),
            to: Square::new(2, 2),
            prog: Program::Jackhammer,
        };
        let repr = notate_move(Some(mv));
        assert_eq!(repr, "j:32-22");
        assert_eq!(repr.parse::<MoveString>().unwrap().action, Some(mv));

        assert_eq!("pass".parse::<MoveString>().unwrap().action, None);
        assert!("x:00-11".parse::<MoveString>().is_err());
        assert!("d:55-44".parse::<MoveString>().is_err());
    }
}
