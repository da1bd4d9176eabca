use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    num::NonZero,
    ops::{Mul, Sub},
    str::FromStr,
};

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseCoordError {
    InvalidFile(char),
    InvalidRank(char),
    NotEnoughCharacter(u8),
    Unexpected(char),
}
impl Display for ParseCoordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseCoordError::InvalidFile(x) => write!(
                f,
                "found `{x}`, characters from `A` to `H` were expected instead"
            )?,
            ParseCoordError::InvalidRank(y) => write!(
                f,
                "found `{y}`, characters from `1` to `8` were expected instead"
            )?,
            ParseCoordError::NotEnoughCharacter(len) => write!(
                f,
                "provided string have length of {len} characters, 2 were expected"
            )?,
            ParseCoordError::Unexpected(c) => write!(f, "unexpected `{c}`")?,
        }
        Ok(())
    }
}
impl Error for ParseCoordError {}

/// A square of the board. `x` is the column (0 is the A file) and `y` is the
/// row, counted from the top: row 0 is rank 8 and row 7 is rank 1.
// Bit structure: 10XXXYYY
// first two bits is always `10` for `NonZero` size optimizations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord(NonZero<u8>);

const TAG: NonZero<u8> = NonZero::new(0b1000_0000).unwrap();

impl Coord {
    pub fn new(x: u8, y: u8) -> Self {
        debug_assert!(x < 8);
        debug_assert!(y < 8);
        Coord(TAG | ((x & 0b_111) << 3) | (y & 0b_111))
    }
    pub fn new_checked(x: u8, y: u8) -> Option<Self> {
        if x >= 8 || y >= 8 {
            None
        } else {
            Some(Self::new(x, y))
        }
    }
    pub fn from_chars(file: char, rank: char) -> Result<Self, ParseCoordError> {
        let x = match file.to_ascii_uppercase() {
            upper @ 'A'..='H' => upper as u8 - b'A',
            _ => return Err(ParseCoordError::InvalidFile(file)),
        };
        let y = match rank {
            '1'..='8' => 8 - (rank as u8 - b'0'),
            _ => return Err(ParseCoordError::InvalidRank(rank)),
        };
        Ok(Coord::new(x, y))
    }
    pub fn x(self) -> u8 {
        (self.0.get() >> 3) & 0b_111
    }
    pub fn y(self) -> u8 {
        self.0.get() & 0b_111
    }
    /// Rank digit as printed on the board, 8 for row 0.
    pub fn rank(self) -> u8 {
        8 - self.y()
    }
    pub fn file(self) -> char {
        (b'A' + self.x()) as char
    }
    /// Every square, row by row from rank 8 down to rank 1.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..8).flat_map(|y| (0..8).map(move |x| Coord::new(x, y)))
    }
    pub fn move_by(self, movement: Vector) -> Option<Self> {
        Self::new_checked(
            self.x().checked_add_signed(movement.x)?,
            self.y().checked_add_signed(movement.y)?,
        )
    }
    /// Squares strictly between `self` and `other` when both lie on a common
    /// row, column, or diagonal. Adjacent squares give an empty line.
    pub fn between(self, other: Self) -> Option<impl Iterator<Item = Self>> {
        let difference = other - self;
        difference.is_straight_or_diagonal().then(|| {
            let direction = difference.as_unit();
            (1..)
                .map_while(move |step| self.move_by(direction * step))
                .take_while(move |position| *position != other)
        })
    }
}
pub fn home_rank(color: Color) -> u8 {
    match color {
        Color::White => 7,
        Color::Black => 0,
    }
}
pub fn pawn_home_rank(color: Color) -> u8 {
    match color {
        Color::White => 6,
        Color::Black => 1,
    }
}
pub fn pawn_direction(color: Color) -> i8 {
    match color {
        Color::White => -1,
        Color::Black => 1,
    }
}
impl Display for Coord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())?;
        Ok(())
    }
}
impl FromStr for Coord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let Some(file) = chars.next() else {
            return Err(ParseCoordError::NotEnoughCharacter(0));
        };
        let Some(rank) = chars.next() else {
            return Err(ParseCoordError::NotEnoughCharacter(1));
        };
        if let Some(c) = chars.next() {
            return Err(ParseCoordError::Unexpected(c));
        }
        Coord::from_chars(file, rank)
    }
}
impl From<chess::Square> for Coord {
    fn from(value: chess::Square) -> Self {
        Coord::new(
            value.get_file().to_index().try_into().unwrap(),
            (7 - value.get_rank().to_index()).try_into().unwrap(),
        )
    }
}
impl From<Coord> for chess::Square {
    fn from(value: Coord) -> Self {
        chess::Square::make_square(
            chess::Rank::from_index(7 - value.y() as usize),
            chess::File::from_index(value.x() as usize),
        )
    }
}
impl Sub<Self> for Coord {
    type Output = Vector;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector {
            x: <i8>::try_from(self.x()).unwrap() - <i8>::try_from(rhs.x()).unwrap(),
            y: <i8>::try_from(self.y()).unwrap() - <i8>::try_from(rhs.y()).unwrap(),
        }
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vector {
    pub x: i8,
    pub y: i8,
}
impl Vector {
    pub const ZERO: Self = Vector { x: 0, y: 0 };

    pub fn pawn_single_move(color: Color) -> Self {
        Vector {
            x: 0,
            y: pawn_direction(color),
        }
    }
    pub fn is_straight(self) -> bool {
        self != Vector::ZERO && (self.x == 0 || self.y == 0)
    }
    pub fn is_diagonal(self) -> bool {
        self != Vector::ZERO && self.x.unsigned_abs() == self.y.unsigned_abs()
    }
    pub fn is_straight_or_diagonal(self) -> bool {
        self.is_straight() || self.is_diagonal()
    }
    pub fn is_king_move(self) -> bool {
        self != Vector::ZERO && self.x.unsigned_abs() <= 1 && self.y.unsigned_abs() <= 1
    }
    pub fn is_knight_move(self) -> bool {
        let x = self.x.unsigned_abs();
        let y = self.y.unsigned_abs();
        (x == 1 && y == 2) || (x == 2 && y == 1)
    }
    pub fn is_pawn_attack(self, color: Color) -> bool {
        self.x.unsigned_abs() == 1 && self.y == pawn_direction(color)
    }
    pub fn as_unit(self) -> Self {
        Vector {
            x: self.x.signum(),
            y: self.y.signum(),
        }
    }
}
impl Mul<i8> for Vector {
    type Output = Vector;

    fn mul(self, rhs: i8) -> Self::Output {
        Vector {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// Parses a square literal, panicking on malformed input. Test helper.
#[cfg(test)]
#[macro_export]
macro_rules! coord {
    ($square:literal) => {
        $square.parse::<$crate::coord::Coord>().unwrap()
    };
}
