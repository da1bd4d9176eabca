use crate::{
    board::Board,
    color::Color,
    coord::Coord,
    piece::{Piece, PieceKind},
};

impl Board {
    pub fn king(&self, color: Color) -> Option<Coord> {
        let king = Piece::new(color, PieceKind::King);
        self.squares
            .occupied()
            .find(|(_, piece)| *piece == king)
            .map(|(position, _)| position)
    }
    /// Whether any opposing piece attacks `color`'s king. A side without a
    /// king is never in check.
    pub fn is_in_check(&self, color: Color) -> bool {
        let Some(king) = self.king(color) else {
            return false;
        };
        self.is_attacked_by(king, !color)
    }
    pub fn is_attacked_by(&self, target: Coord, color: Color) -> bool {
        self.pieces(color)
            .any(|(origin, piece)| self.attacks(piece, origin, target))
    }
    fn attacks(&self, piece: Piece, origin: Coord, target: Coord) -> bool {
        match piece.kind {
            PieceKind::Pawn => (target - origin).is_pawn_attack(piece.color),
            kind if kind.is_sliding() => {
                piece.can_reach(origin, target) && self.path_clear(origin, target)
            }
            _ => piece.can_reach(origin, target),
        }
    }
    /// Whether `color` is in check with no relocation of its own pieces that
    /// resolves it. Candidates go through the same gates as an ordinary move,
    /// except castling and en passant which are never considered.
    pub fn is_checkmate(&self, color: Color) -> bool {
        if !self.is_in_check(color) {
            return false;
        }
        let mut scratch = self.clone();
        !self.pieces(color).any(|(origin, piece)| {
            Coord::all().any(|destination| scratch.escapes_check(piece, origin, destination))
        })
    }
    fn escapes_check(&mut self, piece: Piece, origin: Coord, destination: Coord) -> bool {
        if origin == destination {
            return false;
        }
        match self.validate(piece, origin, destination) {
            Ok(None) => {
                let undo = self.commit(origin, destination, None);
                let escaped = !self.is_in_check(piece.color);
                self.revert(undo);
                escaped
            }
            Ok(Some(_)) | Err(_) => false,
        }
    }
}
#[cfg(test)]
mod test {
    use crate::{
        board::{
            Board,
            test::{board, play},
        },
        color::Color,
        coord,
        piece::PieceKind,
    };

    #[test]
    fn starting_position_is_quiet() {
        let board = Board::starting_position();
        for color in Color::ALL {
            assert!(!board.is_in_check(color));
            assert!(!board.is_checkmate(color));
        }
    }
    #[test]
    fn fools_mate() {
        let mut board = Board::starting_position();
        play(&mut board, &["F2F3", "E7E5", "G2G4", "D8H4"]);
        assert!(board.is_in_check(Color::White));
        assert!(board.is_checkmate(Color::White));
        assert!(!board.is_checkmate(Color::Black));
    }
    #[test]
    fn blockable_check_is_not_mate() {
        let mut board = Board::starting_position();
        play(&mut board, &["E2E4", "F7F6", "D1H5"]);
        assert!(board.is_in_check(Color::Black));
        assert!(!board.is_checkmate(Color::Black));
        assert!(board.apply(coord!("G7"), coord!("G6")));
        assert!(!board.is_in_check(Color::Black));
    }
    #[test]
    fn back_rank_mate() {
        let board = board(&[
            ("G8", Color::Black, PieceKind::King),
            ("F7", Color::Black, PieceKind::Pawn),
            ("G7", Color::Black, PieceKind::Pawn),
            ("H7", Color::Black, PieceKind::Pawn),
            ("A8", Color::White, PieceKind::Rook),
            ("G1", Color::White, PieceKind::King),
        ]);
        assert!(board.is_checkmate(Color::Black));
    }
    #[test]
    fn capturing_the_checker_escapes() {
        let board = board(&[
            ("G8", Color::Black, PieceKind::King),
            ("F7", Color::Black, PieceKind::Pawn),
            ("G7", Color::Black, PieceKind::Pawn),
            ("H7", Color::Black, PieceKind::Pawn),
            ("D5", Color::Black, PieceKind::Bishop),
            ("A8", Color::White, PieceKind::Rook),
            ("G1", Color::White, PieceKind::King),
        ]);
        assert!(board.is_in_check(Color::Black));
        assert!(!board.is_checkmate(Color::Black));
    }
    #[test]
    fn stalemate_is_not_mate() {
        let board = board(&[
            ("A8", Color::Black, PieceKind::King),
            ("B6", Color::White, PieceKind::Queen),
            ("C1", Color::White, PieceKind::King),
        ]);
        for (origin, _) in board.pieces(Color::Black) {
            assert_eq!(board.legal_destinations(origin).next(), None);
        }
        assert!(!board.is_in_check(Color::Black));
        assert!(!board.is_checkmate(Color::Black));
    }
    #[test]
    fn search_leaves_the_board_alone() {
        let mut board = Board::starting_position();
        play(&mut board, &["F2F3", "E7E5", "G2G4", "D8H4"]);
        let before = board.clone();
        assert!(board.is_checkmate(Color::White));
        assert_eq!(board, before);
    }
    #[test]
    fn missing_king_is_never_in_check() {
        let board = board(&[("D4", Color::White, PieceKind::Queen)]);
        assert_eq!(board.king(Color::Black), None);
        assert!(!board.is_in_check(Color::Black));
        assert!(!board.is_checkmate(Color::Black));
    }
    #[test]
    fn pawns_attack_diagonally_forward_only() {
        let board = board(&[
            ("E5", Color::Black, PieceKind::King),
            ("E4", Color::White, PieceKind::Pawn),
        ]);
        assert!(!board.is_in_check(Color::Black));
        assert!(board.is_attacked_by(coord!("D5"), Color::White));
        assert!(board.is_attacked_by(coord!("F5"), Color::White));
        assert!(!board.is_attacked_by(coord!("D3"), Color::White));
        assert!(board.is_attacked_by(coord!("E4"), Color::Black));
    }
    #[test]
    fn sliders_are_blocked() {
        let board = board(&[
            ("E8", Color::Black, PieceKind::King),
            ("E6", Color::Black, PieceKind::Knight),
            ("C6", Color::Black, PieceKind::Pawn),
            ("E1", Color::White, PieceKind::Rook),
            ("A4", Color::White, PieceKind::Bishop),
        ]);
        assert!(!board.is_in_check(Color::Black));
        assert!(board.is_attacked_by(coord!("E6"), Color::White));
        assert!(!board.is_attacked_by(coord!("E7"), Color::White));
        assert!(board.is_attacked_by(coord!("B5"), Color::White));
        assert!(!board.is_attacked_by(coord!("D7"), Color::White));
    }
    #[test]
    fn en_passant_escape_is_not_searched() {
        let mut board = board(&[
            ("E4", Color::White, PieceKind::King),
            ("E5", Color::White, PieceKind::Pawn),
            ("D7", Color::Black, PieceKind::Pawn),
            ("C6", Color::Black, PieceKind::Pawn),
            ("A3", Color::Black, PieceKind::Rook),
            ("F8", Color::Black, PieceKind::Rook),
            ("B6", Color::Black, PieceKind::Bishop),
            ("H6", Color::Black, PieceKind::Bishop),
            ("H8", Color::Black, PieceKind::King),
        ]);
        play(&mut board, &["D7D5"]);
        assert!(board.is_in_check(Color::White));
        assert!(board.is_checkmate(Color::White));
        assert!(board.clone().apply(coord!("E5"), coord!("D6")));
    }
}
