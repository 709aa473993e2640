use crate::core_breach::prelude::*;

/// A cell on the grid: 0 is empty, otherwise a two-digit byte whose tens
/// digit is the owning player and whose units digit identifies the piece
/// within that player's set. Units digit 3 is the king.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell(u8);

impl Cell {
    pub const EMPTY: Cell = Cell(0);

    /// Wraps a raw wire byte.
    pub fn from_raw(raw: u8) -> Cell {
        Cell(raw)
    }

    /// The king piece of the given player.
    pub fn king_of(player: Player) -> Cell {
        Cell(player.uid() * 10 + KING_UNIT)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_king(&self) -> bool {
        !self.is_empty() && self.0 % 10 == KING_UNIT
    }

    pub fn is_king_of(&self, player: Player) -> bool {
        self.0 == player.uid() * 10 + KING_UNIT
    }

    pub fn is_owned_by(&self, player: Player) -> bool {
        self.0 / 10 == player.uid()
    }

    /// The owning player, if any.
    pub fn owner(&self) -> Option<Player> {
        Player::from_uid(self.0 / 10)
    }

    pub fn raw(&self) -> u8 {
        self.0
    }
}

/// Full game state. A plain value type; transitions produce new values.
///
/// Program slots: index 0 is the decked (inactive) program, 1..=2 are
/// player 1's active pair, 3..=4 are player 2's.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameState {
    pub to_move: Player,
    pub board: [[Cell; BOARD_SIZE]; BOARD_SIZE],
    pub progs: [Program; NUM_PROGRAMS],
    pub ended: bool,
    pub win: bool,
}

impl GameState {
    /// The standard fresh deal: both sides on their home rows with kings on
    /// the center file, dagger decked, player 1 holding harpoon and
    /// jackhammer, player 2 holding onion and shuriken.
    pub fn initial() -> GameState {
        let mut state = GameState {
            to_move: Player::One,
            board: [[Cell::EMPTY; BOARD_SIZE]; BOARD_SIZE],
            progs: Program::all(),
            ended: false,
            win: false,
        };
        for col in 0..BOARD_SIZE as u8 {
            state.set_piece(Square::new(4, col), Cell::from_raw(10 + col + 1));
            state.set_piece(Square::new(0, col), Cell::from_raw(20 + col + 1));
        }
        state
    }

    pub fn get_piece(&self, at: Square) -> Cell {
        self.board[at.row()][at.col()]
    }

    pub fn set_piece(&mut self, at: Square, piece: Cell) {
        self.board[at.row()][at.col()] = piece;
    }

    /// The inactive program slot.
    pub fn decked_program(&self) -> Program {
        self.progs[0]
    }

    /// The two programs the given player may currently move with, in slot order.
    pub fn active_programs(&self, player: Player) -> [Program; 2] {
        match player {
            Player::One => [self.progs[1], self.progs[2]],
            Player::Two => [self.progs[3], self.progs[4]],
        }
    }

    /// True when either king stands on its goal square or has left the board.
    pub fn is_terminal(&self) -> bool {
        let mut king1 = false;
        let mut king2 = false;
        for sq in Square::all() {
            let piece = self.get_piece(sq);
            if piece.is_king_of(Player::One) {
                if sq == Player::One.goal() {
                    return true;
                }
                king1 = true;
            } else if piece.is_king_of(Player::Two) {
                if sq == Player::Two.goal() {
                    return true;
                }
                king2 = true;
            }
        }
        !(king1 && king2)
    }

    /// Pure transition. Ended states are absorbing. The caller guarantees
    /// `mv` is legal for the side to move; legality is not re-checked here.
    ///
    /// A transition into a terminal state keeps the mover as the current
    /// player and raises the win flag; otherwise the used program rotates
    /// through the deck.
    pub fn next(&self, mv: Move) -> GameState {
        if self.ended {
            return *self;
        }
        let mover = self.to_move;
        let mut next = *self;
        next.to_move = -mover;
        let piece = self.get_piece(mv.from);
        debug_assert!(piece.is_owned_by(mover), "moving a piece the mover does not own");
        next.set_piece(mv.from, Cell::EMPTY);
        next.set_piece(mv.to, piece);
        next.ended = next.is_terminal();
        if next.ended {
            next.to_move = mover;
            next.win = true;
        } else {
            next.rotate_deck(mover, mv.prog);
        }
        next
    }

    /// Single-step deck rotation: the mover's slot that held `used` takes
    /// the decked program, and the deck takes `used`.
    fn rotate_deck(&mut self, player: Player, used: Program) {
        let base = match player {
            Player::One => 1,
            Player::Two => 3,
        };
        for slot in base..base + 2 {
            if self.progs[slot] == used {
                self.progs[slot] = self.progs[0];
                self.progs[0] = used;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_state() -> GameState {
        GameState {
            to_move: Player::One,
            board: [[Cell::EMPTY; BOARD_SIZE]; BOARD_SIZE],
            progs: Program::all(),
            ended: false,
            win: false,
        }
    }

    #[test]
    fn initial_deal_is_not_terminal() {
        let state = GameState::initial();
        assert!(!state.is_terminal());
        assert_eq!(state.get_piece(Square::new(4, 2)), Cell::king_of(Player::One));
        assert_eq!(state.get_piece(Square::new(0, 2)), Cell::king_of(Player::Two));
    }

    #[test]
    fn king_on_goal_is_terminal() {
        let mut state = empty_state();
        state.set_piece(Player::One.goal(), Cell::king_of(Player::One));
        state.set_piece(Square::new(3, 3), Cell::king_of(Player::Two));
        assert!(state.is_terminal());
    }

    #[test]
    fn missing_king_is_terminal() {
        let mut state = empty_state();
        state.set_piece(Square::new(2, 2), Cell::king_of(Player::One));
        assert!(state.is_terminal());
    }

    #[test]
    fn winning_transition_keeps_the_mover() {
        let mut state = empty_state();
        state.set_piece(Square::new(1, 2), Cell::king_of(Player::One));
        state.set_piece(Square::new(4, 0), Cell::king_of(Player::Two));
        state.progs = [Program::Onion, Program::Dagger, Program::Harpoon, Program::Jackhammer, Program::Shuriken];

        let mv = Move {
            from: Square::new(1, 2),
            to: Square::new(0, 2),
            prog: Program::Dagger,
        };
        let next = state.next(mv);
        assert!(next.ended);
        assert!(next.win);
        assert_eq!(next.to_move, Player::One);
        // the deck does not rotate on a terminal transition
        assert_eq!(next.progs, state.progs);
    }

    #[test]
    fn ended_states_are_absorbing() {
        let mut state = empty_state();
        state.set_piece(Square::new(2, 2), Cell::king_of(Player::One));
        state.set_piece(Square::new(3, 3), Cell::king_of(Player::Two));
        state.ended = true;

        let mv = Move {
            from: Square::new(2, 2),
            to: Square::new(2, 3),
            prog: Program::Harpoon,
        };
        assert_eq!(state.next(mv), state);
    }

    #[test]
    fn deck_rotation_preserves_the_multiset() {
        let state = GameState::initial();
        let mv = state.valid_moves(Player::One)[0];
        let next = state.next(mv);

        assert_eq!(next.decked_program(), mv.prog);
        let mut before: Vec<Program> = state.progs.to_vec();
        let mut after: Vec<Program> = next.progs.to_vec();
        before.sort();
        after.sort();
        assert_eq!(before, after);

        // the mover's new pair is the old pair with the used slot replaced
        // by the previously decked program
        let pair = next.active_programs(Player::One);
        assert!(pair.contains(&state.decked_program()));
    }
}
