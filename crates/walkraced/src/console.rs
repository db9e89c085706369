//! Line-oriented control commands

use std::str::FromStr;

/// A command typed on the service console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start,
    Stop,
    /// Start when idle, stop when walking
    Toggle,
    Status,
    ResetDaily,
    Quit,
}

impl ConsoleCommand {
    pub const HELP: &'static str = "commands: start, stop, toggle, status, reset-daily, quit";
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        match line.trim().to_ascii_lowercase().as_str() {
            "start" | "go" => Ok(ConsoleCommand::Start),
            "stop" => Ok(ConsoleCommand::Stop),
            "toggle" | "t" => Ok(ConsoleCommand::Toggle),
            "status" | "s" => Ok(ConsoleCommand::Status),
            "reset-daily" => Ok(ConsoleCommand::ResetDaily),
            "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
            other => Err(format!("unknown command: {other:?}")),
        }
    }
}
