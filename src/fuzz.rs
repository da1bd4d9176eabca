use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use chess::{BoardStatus, ChessMove, MoveGen};
use log::debug;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rustc_hash::FxHashSet;

use crate::{board::Board, color::Color, coord::Coord, piece::PieceKind};

const MAX_PLIES: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mismatch {
    /// Accepted here, illegal for the reference.
    Accepted(Coord, Coord),
    /// Legal for the reference, rejected here.
    Missing(Coord, Coord),
    Check { color: Color, expected: bool },
    Checkmate { color: Color, expected: bool },
}
impl Display for Mismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Accepted(origin, destination) => {
                write!(f, "{origin}{destination} was accepted but is illegal")?;
            }
            Mismatch::Missing(origin, destination) => {
                write!(f, "{origin}{destination} is legal but was rejected")?;
            }
            Mismatch::Check { color, expected } => {
                write!(f, "{color} in check should be {expected}")?;
            }
            Mismatch::Checkmate { color, expected } => {
                write!(f, "{color} checkmated should be {expected}")?;
            }
        }
        Ok(())
    }
}
/// The first disagreement with the `chess` crate, with the position it
/// happened in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Divergence {
    pub game: u32,
    pub ply: u32,
    pub mismatch: Mismatch,
    pub board: Box<Board>,
}
impl Display for Divergence {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "game {} ply {}: {}", self.game, self.ply, self.mismatch)?;
        write!(f, "{}", self.board)?;
        Ok(())
    }
}
impl Error for Divergence {}

/// Plays `games` random games in lockstep with the `chess` crate and compares
/// the accepted moves, check, and checkmate at every ply. Returns the number
/// of plies played. A game stops at mate, stalemate, a promotion, or after
/// a fixed number of plies.
pub fn fuzz(games: u32, seed: u64) -> Result<u32, Divergence> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut total = 0;
    for game in 0..games {
        let mut board = Board::starting_position();
        let mut reference = chess::Board::default();
        for ply in 0..MAX_PLIES {
            let diverge = |mismatch, board: &Board| Divergence {
                game,
                ply,
                mismatch,
                board: Box::new(board.clone()),
            };
            let turn = Color::from(reference.side_to_move());
            let moves: FxHashSet<(Coord, Coord)> = board
                .pieces(turn)
                .flat_map(|(origin, _)| {
                    board
                        .legal_destinations(origin)
                        .map(move |destination| (origin, destination))
                })
                .collect();
            // promotions collapse into one (origin, destination) pair
            let expected: FxHashSet<(Coord, Coord)> = MoveGen::new_legal(&reference)
                .map(|movement| (movement.get_source().into(), movement.get_dest().into()))
                .collect();
            if let Some((origin, destination)) = moves.difference(&expected).next() {
                return Err(diverge(Mismatch::Accepted(*origin, *destination), &board));
            }
            if let Some((origin, destination)) = expected.difference(&moves).next() {
                return Err(diverge(Mismatch::Missing(*origin, *destination), &board));
            }
            let check = reference.checkers().popcnt() > 0;
            if board.is_in_check(turn) != check {
                return Err(diverge(
                    Mismatch::Check {
                        color: turn,
                        expected: check,
                    },
                    &board,
                ));
            }
            // the checkmate search never tries en passant
            if board.en_passant_target().is_none() {
                let checkmate = reference.status() == BoardStatus::Checkmate;
                if board.is_checkmate(turn) != checkmate {
                    return Err(diverge(
                        Mismatch::Checkmate {
                            color: turn,
                            expected: checkmate,
                        },
                        &board,
                    ));
                }
            }
            if moves.is_empty() {
                break;
            }
            let moves: Box<[_]> = moves.into_iter().collect();
            let (origin, destination) = moves[rng.random_range(0..moves.len())];
            let promotes = board
                .piece_at(origin)
                .is_some_and(|piece| piece.kind == PieceKind::Pawn)
                && (destination.y() == 0 || destination.y() == 7);
            if promotes {
                break;
            }
            if !board.apply(origin, destination) {
                return Err(diverge(Mismatch::Missing(origin, destination), &board));
            }
            reference =
                reference.make_move_new(ChessMove::new(origin.into(), destination.into(), None));
            total += 1;
        }
        debug!("game {game} done, {total} plies so far");
    }
    Ok(total)
}
#[cfg(test)]
mod test {
    use crate::fuzz::fuzz;

    #[test]
    fn agrees_with_reference() {
        for seed in 0..3 {
            if let Err(divergence) = fuzz(2, seed) {
                panic!("{divergence}");
            }
        }
    }
}
