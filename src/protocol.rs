use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use crate::{
    coord::{Coord, ParseCoordError},
    misc::{extract_prefix_token, strip_prefix_token},
};

pub const USAGE: &str = "Invalid command. Use: MOVE A2 A4";

/// One line sent by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Move(Coord, Coord),
    Board,
    Help,
    Quit,
}
impl Command {
    pub const HELP: &str = "\
MOVE <from> <to> - play a move, e.g. MOVE E2 E4
BOARD            - show the board
HELP             - show this list
QUIT             - leave the game";
}
impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move(origin, destination) => write!(f, "MOVE {origin} {destination}")?,
            Command::Board => write!(f, "BOARD")?,
            Command::Help => write!(f, "HELP")?,
            Command::Quit => write!(f, "QUIT")?,
        }
        Ok(())
    }
}
impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_uppercase();
        match s.as_str() {
            "" => Err(ParseCommandError::Empty),
            "BOARD" => Ok(Command::Board),
            "HELP" => Ok(Command::Help),
            "QUIT" => Ok(Command::Quit),
            s => {
                let Some(rest) = strip_prefix_token(s, "MOVE") else {
                    let token = extract_prefix_token(s).to_owned();
                    return Err(ParseCommandError::Unknown(token));
                };
                let mut squares = rest.split_whitespace();
                let origin = squares.next().ok_or(ParseCommandError::MissingSquare)?;
                let origin = origin.parse()?;
                let destination = squares.next().ok_or(ParseCommandError::MissingSquare)?;
                let destination = destination.parse()?;
                if let Some(token) = squares.next() {
                    return Err(ParseCommandError::Unexpected(token.to_owned()));
                }
                Ok(Command::Move(origin, destination))
            }
        }
    }
}
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParseCommandError {
    Empty,
    Unknown(String),
    MissingSquare,
    Coord(ParseCoordError),
    Unexpected(String),
}
impl From<ParseCoordError> for ParseCommandError {
    fn from(value: ParseCoordError) -> Self {
        ParseCommandError::Coord(value)
    }
}
impl Display for ParseCommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseCommandError::Empty => write!(f, "empty command")?,
            ParseCommandError::Unknown(word) => write!(f, "unknown command `{word}`")?,
            ParseCommandError::MissingSquare => write!(f, "two squares were expected")?,
            ParseCommandError::Coord(err) => write!(f, "{err}")?,
            ParseCommandError::Unexpected(token) => write!(f, "unexpected `{token}`")?,
        }
        Ok(())
    }
}
impl Error for ParseCommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseCommandError::Coord(err) => Some(err),
            _ => None,
        }
    }
}
