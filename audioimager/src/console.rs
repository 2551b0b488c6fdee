//! Console commands read from stdin while playing
//!
//! `m <n>` / `mono <n>` and `c <n>` / `cancel <n>` retune a strength,
//! `?` / `help` lists the commands, and any other line (an empty one
//! included) quits.

use crate::config::parse_strength;
use crate::error::Result;

pub const HELP: &str = "commands: m <n> (mono strength), c <n> (cancel strength), ? (help), anything else quits";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    SetMono(i32),
    SetCancel(i32),
    Help,
    Quit,
}

/// Parse one console line.
///
/// # Errors
/// [`Error::Usage`](crate::Error::Usage) if a strength command has a missing
/// or non-numeric value.
pub fn parse_command(line: &str) -> Result<ConsoleCommand> {
    let mut words = line.split_whitespace();

    let command = match words.next() {
        Some("m") | Some("mono") => {
            ConsoleCommand::SetMono(parse_strength("mono strength", words.next().unwrap_or(""))?)
        }
        Some("c") | Some("cancel") => {
            ConsoleCommand::SetCancel(parse_strength("cancel strength", words.next().unwrap_or(""))?)
        }
        Some("?") | Some("help") => ConsoleCommand::Help,
        _ => ConsoleCommand::Quit,
    };

    Ok(command)
}
