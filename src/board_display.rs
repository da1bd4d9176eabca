use std::fmt::{self, Display, Formatter};

use crate::{board::Board, color::Color, coord::Coord, piece::Piece};

const WHITE: &str = "\x1b[30;107m";
const BLACK: &str = "\x1b[30;47m";
const HIGHLIGHTED: &str = "\x1b[30;103m";
const RESET: &str = "\x1b[0m";

/// The plain text board sent over the wire.
impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for y in 0..8 {
            write!(f, "{}  ", 8 - y)?;
            for x in 0..8 {
                if x > 0 {
                    write!(f, " ")?;
                }
                let symbol = self.piece_at(Coord::new(x, y)).map_or('_', Piece::symbol);
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   A B C D E F G H")?;
        Ok(())
    }
}
impl Board {
    pub fn render(&self) -> String {
        self.to_string()
    }
}
pub struct BoardDisplay<'a, 'b> {
    pub board: &'a Board,
    pub view: Color,
    pub highlighted: &'a [Coord],
    pub info: &'b str,
}
impl Display for BoardDisplay<'_, '_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut lines = self.info.lines().fuse();
        for y in 0..8 {
            let y = match self.view {
                Color::White => y,
                Color::Black => 7 - y,
            };
            for x in 0..8 {
                let x = match self.view {
                    Color::White => x,
                    Color::Black => 7 - x,
                };
                let position = Coord::new(x, y);
                let color = if self.highlighted.contains(&position) {
                    HIGHLIGHTED
                } else if (x + y) % 2 == 0 {
                    WHITE
                } else {
                    BLACK
                };
                let figurine = self.board.piece_at(position).map_or(' ', Piece::figurine);
                write!(f, "{color}{figurine} {RESET}")?;
            }
            write!(f, "{}", 8 - y)?;
            if let Some(line) = lines.next() {
                write!(f, " {line}")?;
            }
            writeln!(f)?;
        }
        match self.view {
            Color::White => write!(f, "a b c d e f g h")?,
            Color::Black => write!(f, "h g f e d c b a")?,
        }
        if let Some(line) = lines.next() {
            write!(f, "   {line}")?;
        }
        writeln!(f)?;
        for line in lines {
            writeln!(f, "                  {line}")?;
        }
        Ok(())
    }
}
#[cfg(test)]
mod test {
    use crate::{
        board::Board,
        board_display::BoardDisplay,
        color::Color,
        coord,
    };

    #[test]
    fn starting_position_text() {
        let expected = "\
8  r n b q k b n r
7  p p p p p p p p
6  _ _ _ _ _ _ _ _
5  _ _ _ _ _ _ _ _
4  _ _ _ _ _ _ _ _
3  _ _ _ _ _ _ _ _
2  P P P P P P P P
1  R N B Q K B N R
   A B C D E F G H
";
        assert_eq!(Board::starting_position().render(), expected);
    }
    #[test]
    fn text_follows_moves() {
        let mut board = Board::starting_position();
        assert!(board.apply(coord!("E2"), coord!("E4")));
        let text = board.render();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[4], "4  _ _ _ _ P _ _ _");
        assert_eq!(lines[6], "2  P P P P _ P P P");
        assert!(text.ends_with('\n'));
    }
    #[test]
    fn empty_board_text() {
        let text = Board::empty().render();
        assert_eq!(text.lines().count(), 9);
        for line in text.lines().take(8) {
            assert!(line.ends_with("_ _ _ _ _ _ _ _"));
        }
    }
    #[test]
    fn flipped_view_starts_from_rank_one() {
        let board = Board::starting_position();
        let display = BoardDisplay {
            board: &board,
            view: Color::Black,
            highlighted: &[],
            info: "",
        }
        .to_string();
        let first = display.lines().next().unwrap();
        assert!(first.ends_with('1'));
        assert!(first.contains('♔'));
        assert!(display.contains("h g f e d c b a"));
    }
}
