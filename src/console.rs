//! Line-based control surface on stdin

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::session::{AppCommand, CommandOutcome, CommandSender};
use crate::storage::SaveOutcome;

/// One parsed console line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleInput {
    Command(AppCommand),
    Status,
    Help,
    Quit,
}

impl ConsoleInput {
    pub fn parse(line: &str) -> Option<Self> {
        let input = match line.trim().to_ascii_lowercase().as_str() {
            "toggle" | "t" => Self::Command(AppCommand::ToggleArea),
            "start" | "s" => Self::Command(AppCommand::StartRecording),
            "stop" | "save" => Self::Command(AppCommand::StopAndSave),
            "open" | "o" => Self::Command(AppCommand::OpenVideo),
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => return None,
        };
        Some(input)
    }
}

const HELP: &str = "commands: toggle, start, stop, open, status, help, quit";

/// Read commands from `input` until `quit` or end of input
pub async fn run<R>(input: R, commands: CommandSender) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    println!("{}", HELP);

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let Some(input) = ConsoleInput::parse(&line) else {
            println!("unknown command: {} ({})", line.trim(), HELP);
            continue;
        };

        match input {
            ConsoleInput::Command(command) => match commands.send(command).await {
                Ok(outcome) => println!("{}", describe(&outcome)),
                Err(e) if e.is_rejection() => println!("{}", e),
                Err(e) => {
                    warn!("{:?} failed: {:#}", command, e);
                    println!("error: {:#}", e);
                }
            },
            ConsoleInput::Status => {
                let snapshot = commands.status().await;
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            ConsoleInput::Help => println!("{}", HELP),
            ConsoleInput::Quit => break,
        }
    }

    info!("Console closed");
    Ok(())
}

fn describe(outcome: &CommandOutcome) -> String {
    match outcome {
        CommandOutcome::Mounted { area, toggle_label } => {
            format!("{} area loaded [{}]", area, toggle_label)
        }
        CommandOutcome::Started => "Started Record!".to_string(),
        CommandOutcome::Saved { save } => match save {
            SaveOutcome::Saved { path, bytes } => {
                format!("Saved {} bytes to {}", bytes, path.display())
            }
            SaveOutcome::Cancelled => "Save cancelled".to_string(),
        },
        CommandOutcome::Opened { file } => match file {
            Some(file) => format!("Playing {}", file.path.display()),
            None => "No video selected".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ConsoleInput::parse(" Toggle "),
            Some(ConsoleInput::Command(AppCommand::ToggleArea))
        );
        assert_eq!(
            ConsoleInput::parse("stop"),
            Some(ConsoleInput::Command(AppCommand::StopAndSave))
        );
        assert_eq!(ConsoleInput::parse("q"), Some(ConsoleInput::Quit));
        assert_eq!(ConsoleInput::parse("record"), None);
    }
}
