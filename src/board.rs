use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    mem::replace,
};

use crate::{
    castling_right::{CastlingRight, CastlingSide},
    color::Color,
    coord::{Coord, Vector, home_rank},
    grid::Grid,
    piece::{Piece, PieceKind},
};

mod check;

const KING_HOME_X: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastlingError {
    InCheck,
    KingMoved,
    RookMissing,
    RookMoved,
    PathBlocked,
    ThroughCheck,
    IntoCheck,
}
impl Display for CastlingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CastlingError::InCheck => write!(f, "the king is in check")?,
            CastlingError::KingMoved => write!(f, "the king has already moved")?,
            CastlingError::RookMissing => write!(f, "there is no rook on the corner")?,
            CastlingError::RookMoved => write!(f, "the rook has already moved")?,
            CastlingError::PathBlocked => {
                write!(f, "pieces stand between the king and the rook")?;
            }
            CastlingError::ThroughCheck => {
                write!(f, "the king would pass through an attacked square")?;
            }
            CastlingError::IntoCheck => write!(f, "the king would land on an attacked square")?,
        }
        Ok(())
    }
}
impl Error for CastlingError {}

/// Why [`Board::try_apply`] refused a move. The board is untouched whenever
/// one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveError {
    EmptyOrigin,
    SameSquare,
    IllegalShape(PieceKind),
    PawnBlocked,
    NothingToCapture,
    OwnPieceCapture,
    PathBlocked,
    LeavesKingInCheck,
    Castling(CastlingError),
}
impl From<CastlingError> for MoveError {
    fn from(value: CastlingError) -> Self {
        MoveError::Castling(value)
    }
}
impl Display for MoveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::EmptyOrigin => write!(f, "there is no piece on the origin square")?,
            MoveError::SameSquare => write!(f, "origin and destination are the same square")?,
            MoveError::IllegalShape(kind) => write!(f, "a {kind} cannot move like that")?,
            MoveError::PawnBlocked => write!(f, "pawns cannot advance into an occupied square")?,
            MoveError::NothingToCapture => write!(f, "pawns only move diagonally to capture")?,
            MoveError::OwnPieceCapture => write!(f, "cannot capture a piece of the same color")?,
            MoveError::PathBlocked => write!(f, "the path is blocked")?,
            MoveError::LeavesKingInCheck => write!(f, "the move would leave the king in check")?,
            MoveError::Castling(err) => write!(f, "cannot castle: {err}")?,
        }
        Ok(())
    }
}
impl Error for MoveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MoveError::Castling(err) => Some(err),
            _ => None,
        }
    }
}

/// What an accepted move did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Quiet,
    Capture(Piece),
    /// Holds the square of the pawn taken en passant.
    EnPassant(Coord),
    Castle(CastlingSide),
}
impl Display for MoveKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MoveKind::Quiet => write!(f, "move")?,
            MoveKind::Capture(piece) => write!(f, "captures {piece}")?,
            MoveKind::EnPassant(position) => write!(f, "captures en passant on {position}")?,
            MoveKind::Castle(side) => write!(f, "castles {side}")?,
        }
        Ok(())
    }
}

/// Everything a single relocation can disturb, restored verbatim by
/// [`Board::revert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Undo {
    origin: Coord,
    destination: Coord,
    captured: Option<Piece>,
    en_passant_victim: Option<(Coord, Piece)>,
    en_passant_target: Option<Coord>,
    castling: CastlingRight,
}

/// The authoritative game state: an 8×8 grid where each square owns at most
/// one piece, the castling flags, and the en passant target left by the last
/// pawn double step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Board {
    squares: Grid<Option<Piece>>,
    castling: CastlingRight,
    en_passant_target: Option<Coord>,
}
impl Board {
    /// A board with no pieces and fresh flags.
    pub fn empty() -> Self {
        Board::default()
    }
    pub fn starting_position() -> Self {
        let mut board = Board::empty();
        board.initialize();
        board
    }
    /// Resets to the standard starting position.
    pub fn initialize(&mut self) {
        let configuration = PieceKind::STARTING_CONFIGURATION;
        let piece = |color, kind| Some(Piece::new(color, kind));
        *self = Board {
            squares: Grid([
                configuration.map(|kind| piece(Color::Black, kind)),
                [piece(Color::Black, PieceKind::Pawn); 8],
                [None; 8],
                [None; 8],
                [None; 8],
                [None; 8],
                [piece(Color::White, PieceKind::Pawn); 8],
                configuration.map(|kind| piece(Color::White, kind)),
            ]),
            castling: CastlingRight::new(),
            en_passant_target: None,
        };
    }
    pub fn piece_at(&self, position: Coord) -> Option<Piece> {
        self.squares[position]
    }
    /// Places or clears a square and returns what stood there. Flags are left
    /// alone.
    #[allow(dead_code, reason = "only positions built by hand need this")]
    pub fn set(&mut self, position: Coord, piece: Option<Piece>) -> Option<Piece> {
        replace(&mut self.squares[position], piece)
    }
    pub fn castling(&self) -> CastlingRight {
        self.castling
    }
    pub fn en_passant_target(&self) -> Option<Coord> {
        self.en_passant_target
    }
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Coord, Piece)> + '_ {
        self.squares
            .occupied()
            .filter(move |(_, piece)| piece.color == color)
    }
    /// Applies the move if it is legal and reports whether it was.
    pub fn apply(&mut self, origin: Coord, destination: Coord) -> bool {
        self.try_apply(origin, destination).is_ok()
    }
    /// Applies the move if it is legal. On `Err` the grid, castling flags,
    /// and en passant target are exactly as they were before the call; an
    /// empty origin or `origin == destination` is an ordinary rejection.
    pub fn try_apply(&mut self, origin: Coord, destination: Coord) -> Result<MoveKind, MoveError> {
        let piece = self.squares[origin].ok_or(MoveError::EmptyOrigin)?;
        if origin == destination {
            return Err(MoveError::SameSquare);
        }
        if let Some(side) = castling_intent(piece, origin, destination) {
            return Ok(self.castle(piece.color, origin, destination, side)?);
        }
        let en_passant = self.validate(piece, origin, destination)?;
        let undo = self.commit(origin, destination, en_passant);
        if self.is_in_check(piece.color) {
            self.revert(undo);
            return Err(MoveError::LeavesKingInCheck);
        }
        self.finalize(piece, undo);
        let kind = match (undo.en_passant_victim, undo.captured) {
            (Some((position, _)), _) => MoveKind::EnPassant(position),
            (None, Some(captured)) => MoveKind::Capture(captured),
            (None, None) => MoveKind::Quiet,
        };
        Ok(kind)
    }
    /// Destinations `apply` would accept for the piece on `origin`.
    pub fn legal_destinations(&self, origin: Coord) -> impl Iterator<Item = Coord> + '_ {
        Coord::all().filter(move |&destination| self.clone().apply(origin, destination))
    }
    fn path_clear(&self, origin: Coord, destination: Coord) -> bool {
        origin
            .between(destination)
            .is_some_and(|mut line| line.all(|position| self.squares[position].is_none()))
    }
    /// The gates every non-castling move passes: shape, pawn occupancy, own
    /// piece capture, and path clearance. Returns the square of the pawn an en
    /// passant capture would remove.
    fn validate(
        &self,
        piece: Piece,
        origin: Coord,
        destination: Coord,
    ) -> Result<Option<Coord>, MoveError> {
        if !piece.can_reach(origin, destination) {
            return Err(MoveError::IllegalShape(piece.kind));
        }
        let target = self.squares[destination];
        let mut en_passant = None;
        if piece.kind == PieceKind::Pawn {
            if destination.x() == origin.x() {
                if target.is_some() || !self.path_clear(origin, destination) {
                    return Err(MoveError::PawnBlocked);
                }
            } else if target.is_none() {
                // the double-stepped pawn sits beside the capturer
                let victim = Coord::new(destination.x(), origin.y());
                if self.en_passant_target == Some(destination)
                    && self.squares[victim] == Some(Piece::new(!piece.color, PieceKind::Pawn))
                {
                    en_passant = Some(victim);
                } else {
                    return Err(MoveError::NothingToCapture);
                }
            }
        }
        if target.is_some_and(|target| target.color == piece.color) {
            return Err(MoveError::OwnPieceCapture);
        }
        if piece.kind.is_sliding() && !self.path_clear(origin, destination) {
            return Err(MoveError::PathBlocked);
        }
        Ok(en_passant)
    }
    fn commit(&mut self, origin: Coord, destination: Coord, en_passant: Option<Coord>) -> Undo {
        let undo = Undo {
            origin,
            destination,
            captured: self.squares[destination],
            en_passant_victim: en_passant
                .and_then(|position| self.squares[position].map(|victim| (position, victim))),
            en_passant_target: self.en_passant_target,
            castling: self.castling,
        };
        if let Some((position, _)) = undo.en_passant_victim {
            self.squares[position] = None;
        }
        self.squares[destination] = self.squares[origin].take();
        undo
    }
    fn revert(&mut self, undo: Undo) {
        self.squares[undo.origin] = self.squares[undo.destination].take();
        self.squares[undo.destination] = undo.captured;
        if let Some((position, victim)) = undo.en_passant_victim {
            self.squares[position] = Some(victim);
        }
        self.en_passant_target = undo.en_passant_target;
        self.castling = undo.castling;
    }
    fn finalize(&mut self, piece: Piece, undo: Undo) {
        match piece.kind {
            PieceKind::King => self.castling.set_king_moved(piece.color),
            PieceKind::Rook => self.castling.touch_corner(piece.color, undo.origin),
            _ => (),
        }
        if let Some(captured) = undo.captured
            && captured.kind == PieceKind::Rook
        {
            self.castling.touch_corner(captured.color, undo.destination);
        }
        let double_step =
            piece.kind == PieceKind::Pawn && (undo.destination - undo.origin).y.abs() == 2;
        self.en_passant_target = if double_step {
            undo.origin.move_by(Vector::pawn_single_move(piece.color))
        } else {
            None
        };
    }
    fn castle(
        &mut self,
        color: Color,
        origin: Coord,
        destination: Coord,
        side: CastlingSide,
    ) -> Result<MoveKind, CastlingError> {
        if self.is_in_check(color) {
            return Err(CastlingError::InCheck);
        }
        if self.castling.king_moved(color) {
            return Err(CastlingError::KingMoved);
        }
        let rook_origin = side.rook_origin(color);
        if self.squares[rook_origin] != Some(Piece::new(color, PieceKind::Rook)) {
            return Err(CastlingError::RookMissing);
        }
        if self.castling.rook_moved(color, side) {
            return Err(CastlingError::RookMoved);
        }
        if !self.path_clear(origin, rook_origin) {
            return Err(CastlingError::PathBlocked);
        }
        let passing = Coord::new(
            origin.x().saturating_add_signed(side.direction()),
            origin.y(),
        );
        let probe = self.commit(origin, passing, None);
        let passes_attacked = self.is_in_check(color);
        self.revert(probe);
        if passes_attacked {
            return Err(CastlingError::ThroughCheck);
        }
        let king = self.commit(origin, destination, None);
        let rook = self.commit(rook_origin, passing, None);
        if self.is_in_check(color) {
            self.revert(rook);
            self.revert(king);
            return Err(CastlingError::IntoCheck);
        }
        self.castling.set_king_moved(color);
        self.castling.set_rook_moved(color, side);
        self.en_passant_target = None;
        Ok(MoveKind::Castle(side))
    }
}
/// A king on its home square stepping two columns along its rank asks to
/// castle.
fn castling_intent(piece: Piece, origin: Coord, destination: Coord) -> Option<CastlingSide> {
    let movement = destination - origin;
    if piece.kind == PieceKind::King
        && movement.y == 0
        && origin == Coord::new(KING_HOME_X, home_rank(piece.color))
    {
        CastlingSide::from_king_step(movement.x)
    } else {
        None
    }
}
