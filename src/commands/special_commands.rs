//! Special commands parser for interactive chat
//!
//! Special commands manage conversations instead of being sent as messages:
//! starting, listing, opening, and deleting chats, moving between screens,
//! and leaving the session.
//!
//! Commands are prefixed with `/`. The command word is case-insensitive;
//! arguments keep their case.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an argument it does not take
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a new conversation, optionally sending a first message
    New(Option<String>),

    /// Show the conversation list
    List,

    /// Open a conversation by id, id prefix, or `#N`
    Open(String),

    /// Delete a conversation by id, id prefix, or `#N`
    Delete(String),

    /// Reprint the active conversation
    History,

    /// Return to the start screen
    Back,

    /// Display help information
    Help,

    /// Exit the session
    Exit,

    /// Not a special command; send the input as a message
    None,
}

/// Parse user input into a special command
///
/// # Errors
///
/// Returns a [`CommandError`] for unknown commands and for commands with a
/// missing or unexpected argument.
///
/// # Examples
///
/// ```
/// use parley::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/list").unwrap(), SpecialCommand::List);
/// assert_eq!(
///     parse_special_command("/open #2").unwrap(),
///     SpecialCommand::Open("#2".to_string())
/// );
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // Plain input is a message, except for the bare exit words
    if !trimmed.starts_with('/') {
        return Ok(match lower.as_str() {
            "exit" | "quit" => SpecialCommand::Exit,
            _ => SpecialCommand::None,
        });
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match word.as_str() {
        "/new" => Ok(SpecialCommand::New(
            (!rest.is_empty()).then(|| rest.to_string()),
        )),
        "/list" | "/chats" => no_argument(&word, rest, SpecialCommand::List),
        "/open" | "/resume" => required_argument(&word, rest, "/open <ID|#N>")
            .map(SpecialCommand::Open),
        "/delete" | "/rm" => required_argument(&word, rest, "/delete <ID|#N>")
            .map(SpecialCommand::Delete),
        "/history" => no_argument(&word, rest, SpecialCommand::History),
        "/back" => no_argument(&word, rest, SpecialCommand::Back),
        "/help" | "/?" => no_argument(&word, rest, SpecialCommand::Help),
        "/quit" | "/exit" => no_argument(&word, rest, SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

fn no_argument(
    command: &str,
    rest: &str,
    parsed: SpecialCommand,
) -> Result<SpecialCommand, CommandError> {
    if rest.is_empty() {
        Ok(parsed)
    } else {
        Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: rest.to_string(),
        })
    }
}

fn required_argument(command: &str, rest: &str, usage: &str) -> Result<String, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        })
    } else {
        Ok(rest.to_string())
    }
}

/// Print the special command reference
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
=====================================

CONVERSATIONS:
  /new [text]       - Start a new conversation, optionally sending text
  /list             - List conversations, newest first
  /open <ID|#N>     - Open a conversation by id, id prefix, or list position
  /delete <ID|#N>   - Delete a conversation
  /history          - Show the active conversation again

NAVIGATION:
  /back             - Return to the start screen
  /help             - Show this help message
  /?                - Same as /help

SESSION CONTROL:
  exit              - Exit interactive mode
  quit              - Same as exit
  /quit             - Same as exit

Anything else is sent as a message to the active conversation.
"#
    );
}
