use crate::core_breach::prelude::*;

/// A single displacement of one piece under one program.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub prog: Program,
}

impl GameState {
    /// Enumerates the legal moves for `player` into any extendable sink.
    ///
    /// The order is deterministic: row-major by origin square, then the
    /// player's active program slots in slot order, then delta order. A move
    /// is legal when the origin holds an own piece and the target is on the
    /// board and not own-occupied.
    pub fn compute_valid_moves<T: Extend<Move>>(&self, player: Player, moves: &mut T) {
        let sign = player.sign();
        for from in Square::all() {
            if !self.get_piece(from).is_owned_by(player) {
                continue;
            }
            for prog in self.active_programs(player) {
                for &delta in prog.deltas() {
                    let Some(to) = from.offset(delta, sign) else { continue };
                    if self.get_piece(to).is_owned_by(player) {
                        continue;
                    }
                    moves.extend(Some(Move { from, to, prog }));
                }
            }
        }
    }

    /// Convenience collector over `compute_valid_moves`.
    pub fn valid_moves(&self, player: Player) -> Vec<Move> {
        let mut moves = vec![];
        self.compute_valid_moves(player, &mut moves);
        moves
    }
}
