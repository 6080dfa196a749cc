/// ----- CONSOLE MODULE -----
/// Reads commands from stdin on its own thread and hands each parsed line to
/// the main loop over a channel.

use std::io::{self, BufRead};
use std::thread;

use crossbeam_channel::{unbounded, Receiver};
use shared_resources::call::CarId;
use shared_resources::direction::Direction;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  hall <floor> <u|d>   press a hall-call button
  car <car> <floor>    press a button inside a car
  board <car>          one passenger boards (doors must be open)
  alight <car>         one passenger leaves (doors must be open)
  step                 run one tick by hand
  status               print the status table
  json                 print the status as JSON
  watch                redraw the status table on every change (toggle)
  help                 show this text
  quit                 stop the simulation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    HallCall { floor: u8, direction: Direction },
    CarCall { car: CarId, floor: u8 },
    Board(CarId),
    Alight(CarId),
    Step,
    Status,
    Json,
    Watch,
    Help,
    Quit,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("unknown command '{0}', type 'help' for a list")]
    UnknownCommand(String),

    #[error("'{command}' needs a {argument}")]
    MissingArgument { command: &'static str, argument: &'static str },

    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error("'{0}' is not a direction, use u or d")]
    InvalidDirection(String),
}

impl Command {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Command>, UsageError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let command = match name.to_ascii_lowercase().as_str() {
            "hall" => {
                let floor = number(words.next(), "hall", "floor")?;
                let direction = direction(words.next())?;
                Command::HallCall { floor, direction }
            }
            "car" => {
                let car = number(words.next(), "car", "car id")?;
                let floor = number(words.next(), "car", "floor")?;
                Command::CarCall { car, floor }
            }
            "board" => Command::Board(number(words.next(), "board", "car id")?),
            "alight" => Command::Alight(number(words.next(), "alight", "car id")?),
            "step" => Command::Step,
            "status" => Command::Status,
            "json" => Command::Json,
            "watch" => Command::Watch,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(UsageError::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn number<T: std::str::FromStr>(word: Option<&str>, command: &'static str, argument: &'static str) -> Result<T, UsageError> {
    let word = word.ok_or(UsageError::MissingArgument { command, argument })?;
    word.parse().map_err(|_| UsageError::InvalidNumber(word.to_string()))
}

fn direction(word: Option<&str>) -> Result<Direction, UsageError> {
    let word = word.ok_or(UsageError::MissingArgument { command: "hall", argument: "direction" })?;
    let mut chars = word.chars();
    match (chars.next().and_then(Direction::from_char), chars.next()) {
        (Some(direction), None) => Ok(direction),
        _ => match word.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(UsageError::InvalidDirection(word.to_string())),
        },
    }
}

/// Spawns the stdin reader. The channel disconnects when stdin closes.
pub fn spawn_reader() -> io::Result<Receiver<String>> {
    let (line_tx, line_rx) = unbounded();
    thread::Builder::new().name("console".to_string()).spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    })?;
    Ok(line_rx)
}
