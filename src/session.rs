use log::{debug, info, warn};
use tokio::sync::mpsc::{Sender, error::TrySendError};

use crate::{
    color::Color,
    coord::Coord,
    game::{Game, PlayError},
    protocol::{Command, ParseCommandError, USAGE},
};

pub const FULL: &str = "Server full. Only 2 players allowed.\n";

/// Messages queued for one connection before further ones are dropped.
pub const OUTBOX_CAPACITY: usize = 64;

/// Outbound half of a connection. Each message is sent whole and already
/// ends in a newline.
pub type Outbox = Sender<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    Continue,
    Quit,
}

/// One shared game with two seats, White first.
#[derive(Debug, Default)]
pub struct Session {
    game: Game,
    seats: [Option<Outbox>; 2],
}
impl Session {
    pub fn new() -> Self {
        Session::default()
    }
    pub fn is_full(&self) -> bool {
        self.seats.iter().all(Option::is_some)
    }
    /// Seats a new player on the first free color, or tells them the server
    /// is full and returns `None`.
    pub fn join(&mut self, outbox: Outbox) -> Option<Color> {
        let Some(color) = Color::ALL
            .into_iter()
            .find(|color| self.seats[color.index()].is_none())
        else {
            send(&outbox, FULL.to_owned());
            return None;
        };
        send(
            &outbox,
            format!("Welcome! You are {}\n\n{}", color.name(), self.game.board()),
        );
        self.seats[color.index()] = Some(outbox);
        info!("{color} seat taken");
        if self.is_full() {
            info!("game started");
            self.broadcast(&format!(
                "Game started!\n{} to move.\n\n{}",
                self.game.turn().name(),
                self.game.board(),
            ));
        }
        Some(color)
    }
    /// Frees the seat. The other player is told, and the game starts over
    /// once somebody new sits down.
    pub fn leave(&mut self, color: Color) {
        if self.seats[color.index()].take().is_none() {
            return;
        }
        info!("{color} left");
        if let Some(opponent) = &self.seats[(!color).index()] {
            send(opponent, "Opponent disconnected.\n".to_owned());
        }
        self.game.restart();
    }
    pub fn handle_line(&mut self, color: Color, line: &str) -> Flow {
        let command = match line.parse() {
            Ok(command) => command,
            Err(ParseCommandError::Coord(err)) => {
                debug!("{color} sent bad coordinates: {err}");
                self.send_to(color, "Invalid coordinates.\n".to_owned());
                return Flow::Continue;
            }
            Err(err) => {
                debug!("{color} sent an invalid command: {err}");
                self.send_to(color, format!("{USAGE}\n"));
                return Flow::Continue;
            }
        };
        match command {
            Command::Move(origin, destination) => self.play(color, origin, destination),
            Command::Board => self.send_to(color, self.game.board().render()),
            Command::Help => self.send_to(color, format!("{}\n", Command::HELP)),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }
    fn play(&mut self, color: Color, origin: Coord, destination: Coord) {
        if !self.is_full() {
            self.send_to(color, "Waiting for an opponent.\n".to_owned());
            return;
        }
        match self.game.play(color, origin, destination) {
            Ok(played) => {
                info!("{color} {origin}{destination}: {}", played.kind);
                let board = self.game.board();
                let message = if let Some(end_state) = played.outcome {
                    info!("checkmate, {end_state}");
                    format!("Checkmate! {} wins.\n\n{board}", end_state.winner().name())
                } else {
                    let check = if played.check { "Check!\n" } else { "" };
                    format!(
                        "Move successful!\n{check}{} to move.\n\n{board}",
                        self.game.turn().name(),
                    )
                };
                self.broadcast(&message);
            }
            Err(PlayError::GameOver(_)) => self.send_to(color, "Game over.\n".to_owned()),
            Err(PlayError::NotYourTurn) => self.send_to(color, "Not your turn!\n".to_owned()),
            Err(err @ (PlayError::NotYourPiece | PlayError::Illegal(_))) => {
                info!("rejected {color} {origin}{destination}: {err}");
                self.send_to(
                    color,
                    format!("Invalid move! Try again.\n\n{}", self.game.board()),
                );
            }
        }
    }
    fn send_to(&self, color: Color, message: String) {
        if let Some(outbox) = &self.seats[color.index()] {
            send(outbox, message);
        }
    }
    fn broadcast(&self, message: &str) {
        for outbox in self.seats.iter().flatten() {
            send(outbox, message.to_owned());
        }
    }
}
fn send(outbox: &Outbox, message: String) {
    match outbox.try_send(message) {
        Ok(()) => (),
        // the connection is already going away
        Err(TrySendError::Closed(_)) => debug!("dropped a message for a closed connection"),
        Err(TrySendError::Full(_)) => warn!("dropped a message for a client that stopped reading"),
    }
}
#[cfg(test)]
mod test {
    use tokio::sync::mpsc::{Receiver, channel};

    use crate::{
        board::Board,
        color::Color,
        session::{FULL, Flow, OUTBOX_CAPACITY, Outbox, Session},
    };

    fn outbox() -> (Outbox, Receiver<String>) {
        channel(OUTBOX_CAPACITY)
    }
    fn drain(receiver: &mut Receiver<String>) -> Vec<String> {
        let mut messages = Vec::new();
        while let Ok(message) = receiver.try_recv() {
            messages.push(message);
        }
        messages
    }
    fn seated() -> (Session, Receiver<String>, Receiver<String>) {
        let mut session = Session::new();
        let (white, mut white_inbox) = outbox();
        let (black, mut black_inbox) = outbox();
        assert_eq!(session.join(white), Some(Color::White));
        assert_eq!(session.join(black), Some(Color::Black));
        drain(&mut white_inbox);
        drain(&mut black_inbox);
        (session, white_inbox, black_inbox)
    }

    #[test]
    fn seats_are_given_in_order() {
        let mut session = Session::new();
        let board = Board::starting_position().render();

        let (white, mut white_inbox) = outbox();
        assert_eq!(session.join(white), Some(Color::White));
        assert_eq!(
            drain(&mut white_inbox),
            [format!("Welcome! You are White\n\n{board}")]
        );

        let (black, mut black_inbox) = outbox();
        assert_eq!(session.join(black), Some(Color::Black));
        let started = format!("Game started!\nWhite to move.\n\n{board}");
        assert_eq!(
            drain(&mut black_inbox),
            [format!("Welcome! You are Black\n\n{board}"), started.clone()]
        );
        assert_eq!(drain(&mut white_inbox), [started]);

        let (third, mut third_inbox) = outbox();
        assert_eq!(session.join(third), None);
        assert_eq!(drain(&mut third_inbox), [FULL]);
    }
    #[test]
    fn moving_alone_waits() {
        let mut session = Session::new();
        let (white, mut white_inbox) = outbox();
        session.join(white);
        drain(&mut white_inbox);
        let flow = session.handle_line(Color::White, "MOVE E2 E4");
        assert_eq!(flow, Flow::Continue);
        assert_eq!(drain(&mut white_inbox), ["Waiting for an opponent.\n"]);
        assert_eq!(session.game.board(), &Board::starting_position());
    }
    #[test]
    fn accepted_move_is_broadcast() {
        let (mut session, mut white_inbox, mut black_inbox) = seated();
        session.handle_line(Color::White, "move e2 e4");
        let mut board = Board::starting_position();
        assert!(board.apply("E2".parse().unwrap(), "E4".parse().unwrap()));
        let expected = format!("Move successful!\nBlack to move.\n\n{board}");
        assert_eq!(drain(&mut white_inbox), [expected.clone()]);
        assert_eq!(drain(&mut black_inbox), [expected]);
    }
    #[test]
    fn wrong_turn_and_bad_input() {
        let (mut session, mut white_inbox, mut black_inbox) = seated();
        session.handle_line(Color::Black, "MOVE E7 E5");
        assert_eq!(drain(&mut black_inbox), ["Not your turn!\n"]);
        session.handle_line(Color::White, "JUMP");
        session.handle_line(Color::White, "MOVE E2");
        session.handle_line(Color::White, "MOVE E9 E4");
        assert_eq!(
            drain(&mut white_inbox),
            [
                "Invalid command. Use: MOVE A2 A4\n",
                "Invalid command. Use: MOVE A2 A4\n",
                "Invalid coordinates.\n",
            ]
        );
        assert!(drain(&mut black_inbox).is_empty());
    }
    #[test]
    fn rejected_move_goes_to_the_mover_only() {
        let (mut session, mut white_inbox, mut black_inbox) = seated();
        session.handle_line(Color::White, "MOVE A1 A5");
        let board = Board::starting_position();
        assert_eq!(
            drain(&mut white_inbox),
            [format!("Invalid move! Try again.\n\n{board}")]
        );
        assert!(drain(&mut black_inbox).is_empty());
        session.handle_line(Color::White, "MOVE E7 E5");
        assert_eq!(
            drain(&mut white_inbox),
            [format!("Invalid move! Try again.\n\n{board}")]
        );
    }
    #[test]
    fn check_and_checkmate_messages() {
        let (mut session, mut white_inbox, mut black_inbox) = seated();
        session.handle_line(Color::White, "MOVE F2 F3");
        session.handle_line(Color::Black, "MOVE E7 E5");
        session.handle_line(Color::White, "MOVE G2 G4");
        drain(&mut white_inbox);
        drain(&mut black_inbox);
        session.handle_line(Color::Black, "MOVE D8 H4");
        let board = session.game.board().render();
        let mate = format!("Checkmate! Black wins.\n\n{board}");
        assert_eq!(drain(&mut white_inbox), [mate.clone()]);
        assert_eq!(drain(&mut black_inbox), [mate]);
        session.handle_line(Color::White, "MOVE E1 F2");
        assert_eq!(drain(&mut white_inbox), ["Game over.\n"]);
    }
    #[test]
    fn check_is_announced() {
        let (mut session, mut white_inbox, _black_inbox) = seated();
        session.handle_line(Color::White, "MOVE E2 E4");
        session.handle_line(Color::Black, "MOVE F7 F6");
        drain(&mut white_inbox);
        session.handle_line(Color::White, "MOVE D1 H5");
        let messages = drain(&mut white_inbox);
        let announced = "Move successful!\nCheck!\nBlack to move.\n\n";
        assert!(messages[0].starts_with(announced));
    }
    #[test]
    fn board_help_and_quit() {
        let (mut session, _white_inbox, mut black_inbox) = seated();
        assert_eq!(session.handle_line(Color::Black, "BOARD"), Flow::Continue);
        assert_eq!(
            drain(&mut black_inbox),
            [Board::starting_position().render()]
        );
        session.handle_line(Color::Black, "help");
        assert!(drain(&mut black_inbox)[0].starts_with("MOVE <from> <to>"));
        assert_eq!(session.handle_line(Color::Black, "QUIT"), Flow::Quit);
    }
    #[test]
    fn disconnect_frees_the_seat() {
        let (mut session, mut white_inbox, black_inbox) = seated();
        session.handle_line(Color::White, "MOVE E2 E4");
        drain(&mut white_inbox);
        drop(black_inbox);
        session.leave(Color::Black);
        assert_eq!(drain(&mut white_inbox), ["Opponent disconnected.\n"]);
        assert!(!session.is_full());
        assert_eq!(session.game.board(), &Board::starting_position());

        let (black, mut black_inbox) = outbox();
        assert_eq!(session.join(black), Some(Color::Black));
        assert_eq!(drain(&mut black_inbox).len(), 2);
        let started = drain(&mut white_inbox);
        assert!(started[0].starts_with("Game started!\nWhite to move."));
    }
    #[test]
    fn stalled_client_loses_messages_only() {
        let mut session = Session::new();
        let (white, mut white_inbox) = channel(1);
        assert_eq!(session.join(white), Some(Color::White));
        let (black, mut black_inbox) = outbox();
        assert_eq!(session.join(black), Some(Color::Black));
        assert_eq!(drain(&mut white_inbox).len(), 1);
        assert_eq!(drain(&mut black_inbox).len(), 2);

        session.handle_line(Color::White, "MOVE E2 E4");
        assert_eq!(drain(&mut white_inbox).len(), 1);
        assert_eq!(drain(&mut black_inbox).len(), 1);
        assert_eq!(session.game.turn(), Color::Black);
    }
}
