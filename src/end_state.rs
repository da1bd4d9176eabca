use std::fmt::{self, Display, Formatter};

use crate::color::Color;

/// How a finished game ended. Checkmate is the only ending recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndState {
    Win(Color),
}
impl EndState {
    pub fn winner(self) -> Color {
        match self {
            EndState::Win(color) => color,
        }
    }
}
impl Display for EndState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EndState::Win(color) => write!(f, "{} wins", color.name())?,
        }
        Ok(())
    }
}
