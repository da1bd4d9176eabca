#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

use std::process::ExitCode;

use anyhow::Result;
use log::{error, info};

use crate::config::{Config, Mode, usage};

mod board;
mod board_display;
mod castling_right;
mod client;
mod color;
mod config;
mod coord;
mod end_state;
mod fuzz;
mod game;
mod grid;
mod misc;
mod piece;
mod protocol;
mod repl;
mod server;
mod session;

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            eprintln!("for available commands, run with `help`");
            return ExitCode::FAILURE;
        }
    };
    let level = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
fn run(config: Config) -> Result<()> {
    match config.mode {
        Mode::Serve { addr } => runtime()?.block_on(server::serve(&addr)),
        Mode::Connect { addr } => runtime()?.block_on(client::connect(&addr)),
        Mode::Play => Ok(repl::repl()?),
        Mode::Fuzz { games, seed } => {
            let seed = seed.unwrap_or_else(rand::random);
            info!("fuzzing {games} games with seed {seed}");
            let plies = fuzz::fuzz(games, seed)?;
            info!("no divergence in {plies} plies");
            Ok(())
        }
        Mode::Help => {
            println!("{}", usage());
            Ok(())
        }
    }
}
fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
