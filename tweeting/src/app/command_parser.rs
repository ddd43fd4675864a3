//! Command parser for the terminal feed session
//!
//! Parses lines like "like 2", "name alice", "post hello world".
//! Feed positions are 1-based on input and 0-based once parsed.

use super::screen_state::Theme;
use crate::error::ParseError;

/// Commands the terminal session understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set the author field
    Name { author: String },

    /// Set the message field
    Say { text: String },

    /// Submit the current fields, optionally setting the message first
    Post { text: Option<String> },

    /// Toggle the like on the post at a feed position
    Like { index: usize },

    /// Delete the post at a feed position
    Delete { index: usize },

    /// Switch to the given theme, or flip it when none is named
    Theme { mode: Option<Theme> },

    Help,

    Quit,
}

/// Parse a command from one line of input
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ParseError::UnknownCommand("empty input".to_string()));
    }

    // Free text arguments keep their inner spacing
    let (command, rest) = match input.split_once(char::is_whitespace) {
        Some((command, rest)) => (command.to_lowercase(), rest.trim()),
        None => (input.to_lowercase(), ""),
    };

    match command.as_str() {
        "name" | "author" | "as" => {
            if rest.is_empty() {
                return Err(ParseError::MissingArgument("name".to_string()));
            }
            Ok(Command::Name {
                author: rest.to_string(),
            })
        }

        "say" | "write" => Ok(Command::Say {
            text: rest.to_string(),
        }),

        "post" | "tweet" | "send" => Ok(Command::Post {
            text: (!rest.is_empty()).then(|| rest.to_string()),
        }),

        "like" | "unlike" | "l" => Ok(Command::Like {
            index: parse_index("like", rest)?,
        }),

        "delete" | "del" | "rm" => Ok(Command::Delete {
            index: parse_index("delete", rest)?,
        }),

        "theme" => match rest.to_lowercase().as_str() {
            "" => Ok(Command::Theme { mode: None }),
            "light" => Ok(Command::Theme {
                mode: Some(Theme::Light),
            }),
            "dark" => Ok(Command::Theme {
                mode: Some(Theme::Dark),
            }),
            other => Err(ParseError::InvalidArgument(format!(
                "'{}' is not a theme (valid: light, dark)",
                other
            ))),
        },

        "light" => Ok(Command::Theme {
            mode: Some(Theme::Light),
        }),

        "dark" => Ok(Command::Theme {
            mode: Some(Theme::Dark),
        }),

        "help" | "?" | "commands" => Ok(Command::Help),

        "quit" | "exit" | "q" => Ok(Command::Quit),

        _ => Err(ParseError::UnknownCommand(command)),
    }
}

/// Parse a 1-based feed position into a 0-based index
fn parse_index(command: &str, arg: &str) -> Result<usize, ParseError> {
    let Some(raw) = arg.split_whitespace().next() else {
        return Err(ParseError::MissingArgument(command.to_string()));
    };

    let index: usize = raw
        .trim_start_matches('#')
        .parse()
        .map_err(|_| ParseError::InvalidArgument(format!("'{}' is not a valid number", raw)))?;

    if index == 0 {
        return Err(ParseError::InvalidArgument(
            "index must be 1 or greater".to_string(),
        ));
    }

    Ok(index - 1)
}

/// Help text listing every command
pub fn help_text() -> &'static str {
    "\
Commands:
  name <author>   Set your name
  say <text>      Write a message
  post [text]     Post the message (optionally writing it first)
  like N          Like or unlike post N
  delete N        Delete post N
  theme [mode]    Switch between light and dark, or pick one
  light / dark    Use the light or dark theme
  help            Show this help
  quit            Leave"
}
