use std::fmt::{self, Display, Formatter};

use crate::{
    color::Color,
    coord::{Coord, home_rank},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastlingSide {
    Queenside,
    Kingside,
}
impl CastlingSide {
    /// Distinguishes the side from the two-column king step, `None` for
    /// anything else.
    pub fn from_king_step(dx: i8) -> Option<Self> {
        match dx {
            -2 => Some(CastlingSide::Queenside),
            2 => Some(CastlingSide::Kingside),
            _ => None,
        }
    }
    pub fn from_rook_origin(x: u8) -> Option<Self> {
        match x {
            0 => Some(CastlingSide::Queenside),
            7 => Some(CastlingSide::Kingside),
            _ => None,
        }
    }
    pub fn rook_origin(self, color: Color) -> Coord {
        let x = match self {
            CastlingSide::Queenside => 0,
            CastlingSide::Kingside => 7,
        };
        Coord::new(x, home_rank(color))
    }
    pub fn direction(self) -> i8 {
        match self {
            CastlingSide::Queenside => -1,
            CastlingSide::Kingside => 1,
        }
    }
    fn bit(self) -> u8 {
        match self {
            CastlingSide::Queenside => ROOK_A_MOVED,
            CastlingSide::Kingside => ROOK_H_MOVED,
        }
    }
}
impl Display for CastlingSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CastlingSide::Queenside => write!(f, "queenside")?,
            CastlingSide::Kingside => write!(f, "kingside")?,
        }
        Ok(())
    }
}

const KING_MOVED: u8 = 0b_001;
const ROOK_A_MOVED: u8 = 0b_010;
const ROOK_H_MOVED: u8 = 0b_100;

/// The six "has moved" flags: one king and two corner rooks per color. A rook
/// flag belongs to its corner and stays set whatever later stands there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRight {
    white: u8,
    black: u8,
}
impl CastlingRight {
    pub fn new() -> Self {
        CastlingRight::default()
    }
    fn byte(self, color: Color) -> u8 {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }
    fn byte_mut(&mut self, color: Color) -> &mut u8 {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }
    pub fn king_moved(self, color: Color) -> bool {
        self.byte(color) & KING_MOVED != 0
    }
    pub fn rook_moved(self, color: Color, side: CastlingSide) -> bool {
        self.byte(color) & side.bit() != 0
    }
    pub fn set_king_moved(&mut self, color: Color) {
        *self.byte_mut(color) |= KING_MOVED;
    }
    pub fn set_rook_moved(&mut self, color: Color, side: CastlingSide) {
        *self.byte_mut(color) |= side.bit();
    }
    /// Marks the corner when `position` is one of `color`'s rook corners.
    pub fn touch_corner(&mut self, color: Color, position: Coord) {
        if position.y() == home_rank(color)
            && let Some(side) = CastlingSide::from_rook_origin(position.x())
        {
            self.set_rook_moved(color, side);
        }
    }
    /// Whether the flags alone still allow castling on `side`.
    pub fn can_castle(self, color: Color, side: CastlingSide) -> bool {
        !self.king_moved(color) && !self.rook_moved(color, side)
    }
}
impl Display for CastlingRight {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut written = false;
        for color in Color::ALL {
            for side in [CastlingSide::Kingside, CastlingSide::Queenside] {
                if self.can_castle(color, side) {
                    let c = match side {
                        CastlingSide::Kingside => 'K',
                        CastlingSide::Queenside => 'Q',
                    };
                    let c = match color {
                        Color::White => c,
                        Color::Black => c.to_ascii_lowercase(),
                    };
                    written = true;
                    write!(f, "{c}")?;
                }
            }
        }
        if !written {
            write!(f, "-")?;
        }
        Ok(())
    }
}
#[cfg(test)]
mod test {
    use crate::{
        castling_right::{CastlingRight, CastlingSide},
        color::Color,
        coord,
    };

    #[test]
    fn fresh_flags_allow_everything() {
        assert_eq!(CastlingRight::new().to_string(), "KQkq");
    }
    #[test]
    fn flags_are_independent() {
        let mut castling = CastlingRight::new();
        castling.set_rook_moved(Color::White, CastlingSide::Kingside);
        assert!(castling.rook_moved(Color::White, CastlingSide::Kingside));
        assert!(!castling.rook_moved(Color::White, CastlingSide::Queenside));
        assert!(!castling.rook_moved(Color::Black, CastlingSide::Kingside));
        assert!(!castling.king_moved(Color::White));
        assert_eq!(castling.to_string(), "Qkq");

        castling.set_king_moved(Color::Black);
        assert_eq!(castling.to_string(), "Q");
    }
    #[test]
    fn only_corners_are_touched() {
        let mut castling = CastlingRight::new();
        castling.touch_corner(Color::Black, coord!("A1"));
        castling.touch_corner(Color::White, coord!("B1"));
        assert_eq!(castling, CastlingRight::new());
        castling.touch_corner(Color::Black, coord!("H8"));
        assert!(castling.rook_moved(Color::Black, CastlingSide::Kingside));
    }
}
