use anyhow::{Context, Result};
use log::debug;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, stdin},
    net::TcpStream,
};

/// Relays stdin to the server and prints whatever comes back until either
/// side closes or the user types `QUIT`.
pub async fn connect(addr: &str) -> Result<()> {
    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("connection to {addr} failed"))?;
    println!("Connected to server.\n");
    let (reader, mut writer) = stream.into_split();
    let mut server = BufReader::new(reader).lines();
    let mut input = BufReader::new(stdin()).lines();
    loop {
        tokio::select! {
            line = server.next_line() => {
                let Some(line) = line? else {
                    eprintln!("Disconnected from server.");
                    break;
                };
                println!("{line}");
            }
            line = input.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                writer.write_all(format!("{line}\n").as_bytes()).await?;
                if line.trim().eq_ignore_ascii_case("quit") {
                    break;
                }
            }
        }
    }
    writer.shutdown().await?;
    Ok(())
}
