//! Structured command parsing.
//!
//! Commands arrive as `/verb arg ...` text; the `@botname` suffix on the
//! verb is tolerated so commands work in group chats.

use std::fmt;

/// Supported bot commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    Rates,
    Convert,
    Favorite,
    Calc,
    /// `/alert` with no args prompts for the condition; with args the
    /// condition is parsed inline (`/alert EUR > 0.8`).
    Alert { args: Vec<String> },
    Alerts,
    Unalert { id: i64 },
    History,
    Favorites,
    SetFav { codes: Vec<String> },
    Lang,
}

/// Parse error for command messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    NotACommand,
    UnknownCommand(String),
    MissingArgument(&'static str),
    InvalidArgument { name: &'static str, value: String },
}

impl fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotACommand => write!(f, "message is not a command"),
            Self::UnknownCommand(cmd) => write!(f, "unknown command `{cmd}`"),
            Self::MissingArgument(name) => write!(f, "missing argument `{name}`"),
            Self::InvalidArgument { name, value } => {
                write!(f, "invalid {name} `{value}`")
            }
        }
    }
}

impl std::error::Error for CommandParseError {}

/// Parse a message into a bot command.
pub fn parse_command(text: &str) -> Result<Command, CommandParseError> {
    let mut parts = text.split_whitespace();
    let Some(raw_command) = parts.next() else {
        return Err(CommandParseError::NotACommand);
    };
    if !raw_command.starts_with('/') {
        return Err(CommandParseError::NotACommand);
    }

    let command = raw_command
        .split_once('@')
        .map_or(raw_command, |(head, _)| head);

    match command {
        "/start" => Ok(Command::Start),
        "/help" => Ok(Command::Help),
        "/rates" => Ok(Command::Rates),
        "/convert" => Ok(Command::Convert),
        "/favorite" => Ok(Command::Favorite),
        "/calc" => Ok(Command::Calc),
        "/alert" => Ok(Command::Alert {
            args: parts.map(str::to_string).collect(),
        }),
        "/alerts" => Ok(Command::Alerts),
        "/unalert" => {
            let raw_id = parts.next().ok_or(CommandParseError::MissingArgument("id"))?;
            let id: i64 = raw_id.trim_start_matches('#').parse().map_err(|_| {
                CommandParseError::InvalidArgument {
                    name: "id",
                    value: raw_id.to_string(),
                }
            })?;
            Ok(Command::Unalert { id })
        }
        "/history" => Ok(Command::History),
        "/favorites" => Ok(Command::Favorites),
        "/setfav" => {
            let codes: Vec<String> = parts.map(str::to_string).collect();
            if codes.is_empty() {
                return Err(CommandParseError::MissingArgument("currencies"));
            }
            Ok(Command::SetFav { codes })
        }
        "/lang" => Ok(Command::Lang),
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

/// Command list registered with the chat platform's "/" menu.
#[must_use]
pub fn bot_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("start", "Main menu"),
        ("convert", "Convert an amount"),
        ("favorite", "Convert using favorites"),
        ("calc", "Convert an arithmetic expression"),
        ("rates", "Show exchange rates"),
        ("alert", "Create a rate alert"),
        ("alerts", "List my alerts"),
        ("history", "Recent conversions"),
        ("favorites", "Show favorite currencies"),
        ("lang", "Switch language"),
        ("help", "How to use the bot"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_commands() {
        assert_eq!(parse_command("/start"), Ok(Command::Start));
        assert_eq!(parse_command("/rates"), Ok(Command::Rates));
        assert_eq!(parse_command("/lang"), Ok(Command::Lang));
    }

    #[test]
    fn strips_bot_mention() {
        assert_eq!(parse_command("/help@currency_bot"), Ok(Command::Help));
    }

    #[test]
    fn alert_keeps_raw_args() {
        assert_eq!(parse_command("/alert"), Ok(Command::Alert { args: vec![] }));
        assert_eq!(
            parse_command("/alert EUR > 0.8"),
            Ok(Command::Alert {
                args: vec!["EUR".into(), ">".into(), "0.8".into()],
            })
        );
    }

    #[test]
    fn unalert_parses_id() {
        assert_eq!(parse_command("/unalert 7"), Ok(Command::Unalert { id: 7 }));
        assert_eq!(parse_command("/unalert #7"), Ok(Command::Unalert { id: 7 }));
        assert_eq!(
            parse_command("/unalert"),
            Err(CommandParseError::MissingArgument("id"))
        );
        assert!(matches!(
            parse_command("/unalert seven"),
            Err(CommandParseError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn rejects_non_commands_and_unknowns() {
        assert_eq!(parse_command("hello"), Err(CommandParseError::NotACommand));
        assert_eq!(parse_command(""), Err(CommandParseError::NotACommand));
        assert_eq!(
            parse_command("/frobnicate"),
            Err(CommandParseError::UnknownCommand("/frobnicate".into()))
        );
    }
}
