use std::{
    error::Error,
    fmt::{self, Display, Formatter, Write as _},
    io::{self, BufRead, Write, stderr, stdin, stdout},
    str::FromStr,
};

use crate::{
    board_display::BoardDisplay,
    color::Color,
    coord::{Coord, ParseCoordError},
    game::Game,
    misc::strip_prefix_token,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Input {
    Help,
    Flip,
    Restart,
    Quit,
    Coord(Coord),
    Move(Coord, Coord),
}
impl Display for Input {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Input::Help => write!(f, "help")?,
            Input::Flip => write!(f, "flip")?,
            Input::Restart => write!(f, "restart")?,
            Input::Quit => write!(f, "quit")?,
            Input::Coord(position) => write!(f, "{position}")?,
            Input::Move(origin, destination) => write!(f, "{origin}{destination}")?,
        }
        Ok(())
    }
}
impl FromStr for Input {
    type Err = ParseInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "help" => Ok(Input::Help),
            "flip" => Ok(Input::Flip),
            "restart" => Ok(Input::Restart),
            "quit" => Ok(Input::Quit),
            s => {
                if let Some(s) = strip_prefix_token(s, "move") {
                    let mut squares = s.split_whitespace();
                    let origin = squares.next().ok_or(ParseInputError::MissingSquare)?;
                    let destination = squares.next().ok_or(ParseInputError::MissingSquare)?;
                    if squares.next().is_some() {
                        return Err(ParseInputError::MissingSquare);
                    }
                    Ok(Input::Move(origin.parse()?, destination.parse()?))
                } else if let Ok(position) = s.parse() {
                    Ok(Input::Coord(position))
                } else if s.len() == 4 && s.is_char_boundary(2) {
                    let (origin, destination) = s.split_at(2);
                    Ok(Input::Move(origin.parse()?, destination.parse()?))
                } else {
                    Err(ParseInputError::Unknown)
                }
            }
        }
    }
}
#[allow(
    clippy::too_many_lines,
    reason = "further decomposition could potentially hurt readability"
)]
pub fn repl() -> io::Result<()> {
    let input = stdin().lock();
    let mut output = stdout().lock();
    let mut error = stderr().lock();

    let mut lines = input.lines();

    let mut game = Game::new();
    let mut info = String::new();
    let mut highlighted = Vec::new();
    let mut update = true;
    let mut view = Color::White;
    let mut first_time = true;
    loop {
        if update {
            info.clear();
            if let Some(end_state) = game.outcome() {
                writeln!(&mut info, "checkmate, {end_state}").unwrap();
            } else {
                writeln!(&mut info, "{} plays", game.turn()).unwrap();
                if game.board().is_in_check(game.turn()) {
                    writeln!(&mut info, "check").unwrap();
                }
                writeln!(&mut info, "castling {}", game.board().castling()).unwrap();
            }
        }
        if first_time {
            writeln!(&mut info, "type `help` for instructions").unwrap();
            first_time = false;
        }
        update = false;
        writeln!(
            output,
            "{}",
            BoardDisplay {
                board: game.board(),
                view,
                highlighted: &highlighted,
                info: &info,
            },
        )?;
        loop {
            write!(output, "> ")?;
            output.flush()?;
            let Some(text) = lines.next() else {
                return Ok(());
            };
            let input = match text?.trim().to_ascii_lowercase().parse() {
                Ok(input) => input,
                Err(err) => {
                    writeln!(error, "Error: {err}")?;
                    writeln!(error, "for available command, enter `help`")?;
                    continue;
                }
            };
            match input {
                Input::Help => {
                    writeln!(output, "flip           - flip the board")?;
                    writeln!(output, "restart        - reset to starting position")?;
                    writeln!(output, "quit           - quit the game")?;
                    writeln!(output, "e2             - view valid moves")?;
                    writeln!(output, "e2e4           - play the move")?;
                    writeln!(output, "move e2 e4     - play the move")?;
                    writeln!(output, "e1g1           - perform castling")?;
                }
                Input::Flip => {
                    view = !view;
                }
                Input::Restart => {
                    game.restart();
                    update = true;
                    highlighted.clear();
                }
                Input::Quit => return Ok(()),
                Input::Coord(position) => {
                    let Some(piece) = game.board().piece_at(position) else {
                        writeln!(error, "Error: No piece found on {position}")?;
                        continue;
                    };
                    if piece.color != game.turn() {
                        writeln!(error, "Error: It is {}'s turn", game.turn())?;
                        continue;
                    }
                    highlighted.clear();
                    highlighted.extend(game.board().legal_destinations(position));
                }
                Input::Move(origin, destination) => {
                    if let Err(err) = game.play(game.turn(), origin, destination) {
                        writeln!(error, "Error: {origin}{destination}: {err}")?;
                        continue;
                    }
                    highlighted.clear();
                    highlighted.push(origin);
                    highlighted.push(destination);
                    update = true;
                }
            }
            break;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseInputError {
    Coord(ParseCoordError),
    MissingSquare,
    Unknown,
}
impl From<ParseCoordError> for ParseInputError {
    fn from(value: ParseCoordError) -> Self {
        ParseInputError::Coord(value)
    }
}
impl Display for ParseInputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseInputError::Coord(err) => write!(f, "{err}")?,
            ParseInputError::MissingSquare => write!(f, "exactly two squares were expected")?,
            ParseInputError::Unknown => write!(f, "unknown command")?,
        }
        Ok(())
    }
}
impl Error for ParseInputError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseInputError::Coord(err) => Some(err),
            _ => None,
        }
    }
}
