use std::{
    env,
    error::Error,
    fmt::{self, Display, Formatter},
    num::ParseIntError,
};

pub const DEFAULT_SERVE_ADDR: &str = "0.0.0.0:12345";
pub const DEFAULT_CONNECT_ADDR: &str = "127.0.0.1:12345";
pub const DEFAULT_FUZZ_GAMES: u32 = 100;
/// Overrides the default address of `serve` and `connect`.
pub const ADDR_VAR: &str = "DUELBOARD_ADDR";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mode {
    Serve { addr: String },
    Connect { addr: String },
    Play,
    Fuzz { games: u32, seed: Option<u64> },
    Help,
}
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Config {
    pub mode: Mode,
    pub verbose: bool,
}
impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::from_args(env::args().skip(1), env::var(ADDR_VAR).ok())
    }
    /// Parses arguments without the program name. `env_addr` stands in for
    /// an `--addr` that was not given.
    pub fn from_args<I>(args: I, env_addr: Option<String>) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut verbose = false;
        let mut words = Vec::new();
        for arg in args {
            if arg == "--verbose" || arg == "-v" {
                verbose = true;
            } else {
                words.push(arg);
            }
        }
        let mut words = words.into_iter();
        let mode = match words.next().as_deref() {
            None | Some("play") => Mode::Play,
            Some("serve") => Mode::Serve {
                addr: parse_addr(words.by_ref(), env_addr, DEFAULT_SERVE_ADDR)?,
            },
            Some("connect") => Mode::Connect {
                addr: parse_addr(words.by_ref(), env_addr, DEFAULT_CONNECT_ADDR)?,
            },
            Some("fuzz") => parse_fuzz(words.by_ref())?,
            Some("help" | "--help" | "-h") => Mode::Help,
            Some(mode) => return Err(ConfigError::UnknownMode(mode.to_owned())),
        };
        if let Some(word) = words.next() {
            return Err(unexpected(word));
        }
        Ok(Config { mode, verbose })
    }
}
fn parse_addr(
    words: &mut impl Iterator<Item = String>,
    env_addr: Option<String>,
    default: &str,
) -> Result<String, ConfigError> {
    let mut addr = None;
    while let Some(word) = words.next() {
        match word.as_str() {
            "--addr" => addr = Some(words.next().ok_or(ConfigError::MissingValue("--addr"))?),
            _ => return Err(unexpected(word)),
        }
    }
    Ok(addr.or(env_addr).unwrap_or_else(|| default.to_owned()))
}
fn parse_fuzz(words: &mut impl Iterator<Item = String>) -> Result<Mode, ConfigError> {
    let mut games = DEFAULT_FUZZ_GAMES;
    let mut seed = None;
    while let Some(word) = words.next() {
        match word.as_str() {
            "--games" => {
                let value = words.next().ok_or(ConfigError::MissingValue("--games"))?;
                games = value
                    .parse()
                    .map_err(|err| ConfigError::Int("--games", err))?;
            }
            "--seed" => {
                let value = words.next().ok_or(ConfigError::MissingValue("--seed"))?;
                let value = value
                    .parse()
                    .map_err(|err| ConfigError::Int("--seed", err))?;
                seed = Some(value);
            }
            _ => return Err(unexpected(word)),
        }
    }
    Ok(Mode::Fuzz { games, seed })
}
fn unexpected(word: String) -> ConfigError {
    if word.starts_with('-') {
        ConfigError::UnknownFlag(word)
    } else {
        ConfigError::Unexpected(word)
    }
}
pub fn usage() -> String {
    format!(
        "\
{name} {version}

usage: {name} [COMMAND] [--verbose]

commands:
  play                      hot-seat game in the terminal (default)
  serve [--addr ADDR]       host a two player game, default {DEFAULT_SERVE_ADDR}
  connect [--addr ADDR]     join a hosted game, default {DEFAULT_CONNECT_ADDR}
  fuzz [--games N] [--seed N]
                            compare move legality against the `chess` crate
  help                      show this message

{ADDR_VAR} sets the address when --addr is absent.
RUST_LOG overrides the log filter.",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownMode(String),
    UnknownFlag(String),
    MissingValue(&'static str),
    Int(&'static str, ParseIntError),
    Unexpected(String),
}
impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownMode(mode) => write!(f, "unknown command `{mode}`")?,
            ConfigError::UnknownFlag(flag) => write!(f, "unknown flag `{flag}`")?,
            ConfigError::MissingValue(flag) => write!(f, "`{flag}` needs a value")?,
            ConfigError::Int(flag, err) => write!(f, "invalid value for `{flag}`: {err}")?,
            ConfigError::Unexpected(word) => write!(f, "unexpected `{word}`")?,
        }
        Ok(())
    }
}
impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Int(_, err) => Some(err),
            _ => None,
        }
    }
}
