use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use crate::{
    board::{Board, MoveError, MoveKind},
    color::Color,
    coord::Coord,
    end_state::EndState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayError {
    GameOver(EndState),
    NotYourTurn,
    NotYourPiece,
    Illegal(MoveError),
}
impl From<MoveError> for PlayError {
    fn from(value: MoveError) -> Self {
        PlayError::Illegal(value)
    }
}
impl Display for PlayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::GameOver(end_state) => write!(f, "the game is over, {end_state}")?,
            PlayError::NotYourTurn => write!(f, "it is not your turn")?,
            PlayError::NotYourPiece => write!(f, "the piece belongs to the opponent")?,
            PlayError::Illegal(err) => write!(f, "illegal move: {err}")?,
        }
        Ok(())
    }
}
impl Error for PlayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PlayError::Illegal(err) => Some(err),
            _ => None,
        }
    }
}

/// The result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Played {
    pub kind: MoveKind,
    /// The side now to move is in check.
    pub check: bool,
    pub outcome: Option<EndState>,
}

/// One board plus whose turn it is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Game {
    board: Board,
    turn: Color,
    outcome: Option<EndState>,
}
impl Game {
    pub fn new() -> Self {
        Game {
            board: Board::starting_position(),
            turn: Color::White,
            outcome: None,
        }
    }
    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn turn(&self) -> Color {
        self.turn
    }
    pub fn outcome(&self) -> Option<EndState> {
        self.outcome
    }
    pub fn restart(&mut self) {
        *self = Game::new();
    }
    pub fn play(
        &mut self,
        color: Color,
        origin: Coord,
        destination: Coord,
    ) -> Result<Played, PlayError> {
        if let Some(end_state) = self.outcome {
            return Err(PlayError::GameOver(end_state));
        }
        if color != self.turn {
            return Err(PlayError::NotYourTurn);
        }
        // the engine itself does not know about turns
        if self
            .board
            .piece_at(origin)
            .is_some_and(|piece| piece.color != color)
        {
            return Err(PlayError::NotYourPiece);
        }
        let kind = self.board.try_apply(origin, destination)?;
        self.turn = !color;
        let check = self.board.is_in_check(self.turn);
        if check && self.board.is_checkmate(self.turn) {
            self.outcome = Some(EndState::Win(color));
        }
        Ok(Played {
            kind,
            check,
            outcome: self.outcome,
        })
    }
}
impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}
