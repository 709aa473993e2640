use crate::core_breach::prelude::*;

// Bit layout of the canonical fingerprint, low to high:
//   [0..4)    reserved
//   [4..12)   four 2-bit program ids, sorted within each player's pair
//   [12]      program disambiguation bit (pid 4 aliases pid 0 in two bits)
//   [13]      player to move (0 for player 1)
//   [14..39)  player 1: king position, then four non-king positions in
//             board-scan order, 5 bits each
//   [39..64)  player 2, same shape
const PROGS_SHIFT: u32 = 4;
const FIX_SHIFT: u32 = 12;
const PLAYER_SHIFT: u32 = 13;
const PIECES_SHIFT: u32 = 14;
const PIECES_SPAN: u32 = 25;

impl GameState {
    /// Canonical 64-bit fingerprint of the state, used as the node table key
    /// and for cycle detection.
    ///
    /// Two states collide exactly when they are interchangeable for search:
    /// a side's non-king pieces carry no identity (they are packed in
    /// board-scan order), and each player's program pair is unordered (the
    /// pids are sorted before packing).
    pub fn fingerprint(&self) -> u64 {
        let mut packed = ((self.to_move.uid() - 1) as u64) << PLAYER_SHIFT;

        let mut filled = [0u32; 2];
        for sq in Square::all() {
            let piece = self.get_piece(sq);
            let Some(owner) = piece.owner() else { continue };
            let side = (owner.uid() - 1) as usize;
            let base = PIECES_SHIFT + PIECES_SPAN * side as u32;
            let offset = if piece.is_king() {
                0
            } else {
                debug_assert!(filled[side] < 4, "more than five pieces on one side");
                filled[side] += 1;
                5 * filled[side]
            };
            packed |= (sq.scan_index() as u64) << (base + offset);
        }

        let mut pair1 = [self.progs[1].pid(), self.progs[2].pid()];
        let mut pair2 = [self.progs[3].pid(), self.progs[4].pid()];
        if pair1[0] > pair1[1] {
            pair1.swap(0, 1);
        }
        if pair2[0] > pair2[1] {
            pair2.swap(0, 1);
        }

        // pid 4 truncates to 0 in two bits; the fix bit separates the two
        // when a 4 follows a 0 anywhere in the scan. A 0 and a 4 split the
        // other way across the pairs still collide; that rule is kept as-is.
        let mut fix = false;
        let mut seen_zero = false;
        for (i, &pid) in pair1.iter().chain(pair2.iter()).enumerate() {
            packed |= ((pid & 0b11) as u64) << (PROGS_SHIFT + 2 * i as u32);
            if pid == 0 {
                seen_zero = true;
            } else if pid == 4 && seen_zero {
                fix = true;
            }
        }
        if fix {
            packed |= 1 << FIX_SHIFT;
        }

        packed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kings_only() -> GameState {
        let mut state = GameState {
            to_move: Player::One,
            board: [[Cell::EMPTY; BOARD_SIZE]; BOARD_SIZE],
            progs: Program::all(),
            ended: false,
            win: false,
        };
        state.set_piece(Square::new(3, 2), Cell::king_of(Player::One));
        state.set_piece(Square::new(1, 2), Cell::king_of(Player::Two));
        state
    }

    #[test]
    fn deterministic() {
        let state = GameState::initial();
        assert_eq!(state.fingerprint(), state.fingerprint());
    }

    #[test]
    fn non_king_pieces_are_interchangeable() {
        // same squares occupied, different piece identities in each spot
        let mut a = kings_only();
        a.set_piece(Square::new(3, 0), Cell::from_raw(11));
        a.set_piece(Square::new(3, 4), Cell::from_raw(12));

        let mut b = kings_only();
        b.set_piece(Square::new(3, 0), Cell::from_raw(12));
        b.set_piece(Square::new(3, 4), Cell::from_raw(11));

        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn player_to_move_is_encoded() {
        let a = kings_only();
        let mut b = a;
        b.to_move = Player::Two;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn piece_positions_are_encoded() {
        let a = kings_only();
        let mut b = kings_only();
        b.set_piece(Square::new(3, 2), Cell::EMPTY);
        b.set_piece(Square::new(3, 1), Cell::king_of(Player::One));
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn program_pairs_are_unordered() {
        let mut a = kings_only();
        a.progs = [Program::Dagger, Program::Harpoon, Program::Jackhammer, Program::Onion, Program::Shuriken];
        let mut b = kings_only();
        b.progs = [Program::Dagger, Program::Jackhammer, Program::Harpoon, Program::Shuriken, Program::Onion];
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn swapping_programs_across_players_is_visible() {
        let mut a = kings_only();
        a.progs = [Program::Dagger, Program::Harpoon, Program::Jackhammer, Program::Onion, Program::Shuriken];
        let mut b = kings_only();
        b.progs = [Program::Dagger, Program::Onion, Program::Shuriken, Program::Harpoon, Program::Jackhammer];
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fix_bit_separates_dagger_from_shuriken() {
        // {0, 4} in one pair truncates to {0, 0}; the fix bit tells it apart
        // from an actual {0, 0}-shaped encoding such as {4, x} alone
        let mut a = kings_only();
        a.progs = [Program::Harpoon, Program::Dagger, Program::Shuriken, Program::Jackhammer, Program::Onion];
        let mut b = kings_only();
        b.progs = [Program::Harpoon, Program::Dagger, Program::Dagger, Program::Jackhammer, Program::Onion];
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
