use std::{io, net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::{Mutex, mpsc::channel},
};

use crate::session::{Flow, OUTBOX_CAPACITY, Session};

/// Longest line read from a client, newline included.
const MAX_LINE: usize = 1024;

pub async fn serve(addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on {}", listener.local_addr()?);
    run(listener).await
}
/// Accepts connections forever, each handled on its own task against one
/// shared session.
pub async fn run(listener: TcpListener) -> Result<()> {
    let session = Arc::new(Mutex::new(Session::new()));
    loop {
        let (stream, peer) = listener.accept().await?;
        info!("accepted {peer}");
        let session = Arc::clone(&session);
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, peer, session).await {
                warn!("{peer}: {err:#}");
            }
        });
    }
}
async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    session: Arc<Mutex<Session>>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let (outbox, mut inbox) = channel::<String>(OUTBOX_CAPACITY);
    // ends once every sender is dropped, that is when the seat is freed
    let writer_task = tokio::spawn(async move {
        while let Some(message) = inbox.recv().await {
            writer.write_all(message.as_bytes()).await?;
        }
        writer.shutdown().await
    });
    let color = session.lock().await.join(outbox);
    let Some(color) = color else {
        info!("{peer} refused, server full");
        writer_task.await??;
        return Ok(());
    };
    info!("{peer} plays {color}");
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let result = async {
        while let Some(line) = next_line(&mut reader, &mut buf).await? {
            if session.lock().await.handle_line(color, &line) == Flow::Quit {
                break;
            }
        }
        anyhow::Ok(())
    }
    .await;
    session.lock().await.leave(color);
    info!("{peer} disconnected");
    writer_task.await??;
    result
}
/// Reads the next line without its line ending, or `None` at end of stream.
/// A line longer than [`MAX_LINE`] or not in UTF-8 comes back empty, so it is
/// answered like any other invalid command.
async fn next_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let limit = MAX_LINE as u64;
    let read = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
    if read == 0 {
        return Ok(None);
    }
    if read == MAX_LINE && buf.last() != Some(&b'\n') {
        debug!("discarding a line over {MAX_LINE} bytes");
        skip_line(reader).await?;
        return Ok(Some(String::new()));
    }
    let line = buf.strip_suffix(b"\n").unwrap_or(buf.as_slice());
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    match String::from_utf8(line.to_vec()) {
        Ok(line) => Ok(Some(line)),
        Err(err) => {
            debug!("discarding a line: {err}");
            Ok(Some(String::new()))
        }
    }
}
/// Consumes input up to and including the next newline.
async fn skip_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        let newline = available.iter().position(|&byte| byte == b'\n');
        let used = newline.map_or(available.len(), |end| end + 1);
        reader.consume(used);
        if newline.is_some() {
            return Ok(());
        }
    }
}
#[cfg(test)]
mod test {
    use std::net::SocketAddr;

    use tokio::{
        io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, Lines},
        net::{
            TcpListener, TcpStream,
            tcp::{OwnedReadHalf, OwnedWriteHalf},
        },
    };

    use crate::{
        server::{MAX_LINE, run},
        session::FULL,
    };

    struct Peer {
        lines: Lines<BufReader<OwnedReadHalf>>,
        writer: OwnedWriteHalf,
    }
    impl Peer {
        async fn connect(addr: SocketAddr) -> Self {
            let (reader, writer) = TcpStream::connect(addr).await.unwrap().into_split();
            Peer {
                lines: BufReader::new(reader).lines(),
                writer,
            }
        }
        async fn expect(&mut self, expected: &str) {
            let line = self.lines.next_line().await.unwrap().unwrap();
            assert_eq!(line, expected);
        }
        async fn expect_board(&mut self) -> Vec<String> {
            let mut board = Vec::new();
            for _ in 0..9 {
                board.push(self.lines.next_line().await.unwrap().unwrap());
            }
            assert_eq!(board[8], "   A B C D E F G H");
            board
        }
        async fn send(&mut self, line: &str) {
            self.send_bytes(format!("{line}\n").as_bytes()).await;
        }
        async fn send_bytes(&mut self, bytes: &[u8]) {
            self.writer.write_all(bytes).await.unwrap();
        }
    }
    async fn start() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(run(listener));
        addr
    }
    async fn seat_two(addr: SocketAddr) -> (Peer, Peer) {
        let mut white = Peer::connect(addr).await;
        white.expect("Welcome! You are White").await;
        white.expect("").await;
        white.expect_board().await;

        let mut black = Peer::connect(addr).await;
        black.expect("Welcome! You are Black").await;
        black.expect("").await;
        black.expect_board().await;
        for peer in [&mut white, &mut black] {
            peer.expect("Game started!").await;
            peer.expect("White to move.").await;
            peer.expect("").await;
            peer.expect_board().await;
        }
        (white, black)
    }

    #[tokio::test]
    async fn two_players_play_over_tcp() {
        let addr = start().await;
        let (mut white, mut black) = seat_two(addr).await;

        let mut third = TcpStream::connect(addr).await.unwrap();
        let mut refusal = String::new();
        third.read_to_string(&mut refusal).await.unwrap();
        assert_eq!(refusal, FULL);

        black.send("MOVE E7 E5").await;
        black.expect("Not your turn!").await;

        white.send("move e2 e4").await;
        for peer in [&mut white, &mut black] {
            peer.expect("Move successful!").await;
            peer.expect("Black to move.").await;
            peer.expect("").await;
            let board = peer.expect_board().await;
            assert_eq!(board[4], "4  _ _ _ _ P _ _ _");
        }

        drop(black);
        white.expect("Opponent disconnected.").await;
    }
    #[tokio::test]
    async fn quit_closes_the_connection() {
        let addr = start().await;

        let mut white = Peer::connect(addr).await;
        white.expect("Welcome! You are White").await;
        white.expect("").await;
        white.expect_board().await;
        white.send("QUIT").await;
        assert_eq!(white.lines.next_line().await.unwrap(), None);

        let mut again = Peer::connect(addr).await;
        again.expect("Welcome! You are White").await;
    }
    #[tokio::test]
    async fn unreadable_lines_keep_the_seat() {
        let addr = start().await;
        let (mut white, mut black) = seat_two(addr).await;
        white.send("MOVE E2 E4").await;
        for peer in [&mut white, &mut black] {
            peer.expect("Move successful!").await;
            peer.expect("Black to move.").await;
            peer.expect("").await;
            peer.expect_board().await;
        }

        black.send_bytes(b"MOVE E7 E5\xff\n").await;
        black.expect("Invalid command. Use: MOVE A2 A4").await;
        black.send(&"A".repeat(3 * MAX_LINE)).await;
        black.expect("Invalid command. Use: MOVE A2 A4").await;

        black.send("MOVE E7 E5").await;
        for peer in [&mut white, &mut black] {
            peer.expect("Move successful!").await;
            peer.expect("White to move.").await;
            peer.expect("").await;
            let board = peer.expect_board().await;
            assert_eq!(board[3], "5  _ _ _ _ p _ _ _");
        }
    }
}
