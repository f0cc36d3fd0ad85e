//! Conversation listing and transcript rendering
//!
//! Used by `parley history` and by the interactive chat for `/list` and
//! `/history`.

use crate::cli::HistoryCommand;
use crate::conversation::{Conversation, ConversationStore, Message, MessageKind};
use crate::error::Result;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub fn handle_history(
    command: HistoryCommand,
    store: &mut ConversationStore,
    show_timestamps: bool,
) -> Result<()> {
    match command {
        HistoryCommand::List => {
            print_conversation_table(store);
            if !store.is_empty() {
                println!(
                    "Use {} to resume a conversation.",
                    "parley chat --resume <ID>".cyan()
                );
                println!();
            }
        }
        HistoryCommand::Show { id } => {
            let id = store.resolve(&id)?;
            store.select_conversation(&id)?;
            if let Some(conversation) = store.get(&id) {
                print_transcript(conversation, show_timestamps);
            }
        }
        HistoryCommand::Delete { id } => {
            let id = store.resolve(&id)?;
            store.delete_conversation(&id)?;
            println!("{}", format!("Deleted conversation {}", id).green());
        }
    }

    Ok(())
}

/// Print the conversation list as a table, newest first
pub fn print_conversation_table(store: &ConversationStore) {
    if store.is_empty() {
        println!("{}", "No conversation history found.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "#".bold(),
        "ID".bold(),
        "Label".bold(),
        "Messages".bold(),
        "Last Message".bold()
    ]);

    let active = store.active_id();
    for (position, conversation) in store.conversations().iter().enumerate() {
        let marker = if active == Some(conversation.id.as_str()) {
            format!("{}*", position + 1).green()
        } else {
            (position + 1).to_string().normal()
        };
        let last = conversation
            .messages
            .last()
            .map(|m| m.timestamp.clone())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(prettytable::row![
            marker,
            conversation.short_id().cyan(),
            conversation.display_label,
            conversation.messages.len(),
            last
        ]);
    }

    println!("\nConversations:");
    table.printstd();
    println!();
}

/// Print every message of `conversation`
pub fn print_transcript(conversation: &Conversation, show_timestamps: bool) {
    println!(
        "\n{} {}",
        conversation.display_label.bold(),
        format!("({})", conversation.short_id()).dimmed()
    );

    if conversation.messages.is_empty() {
        println!("{}\n", "No messages yet.".dimmed());
        return;
    }

    for message in &conversation.messages {
        println!("{}", format_message(message, show_timestamps));
    }
    println!();
}

/// Render one message as `[timestamp] You: text` or `[timestamp] Assistant: text`
pub fn format_message(message: &Message, show_timestamps: bool) -> String {
    let speaker = match message.kind {
        MessageKind::Prompt => "You:".blue().bold(),
        MessageKind::Response => "Assistant:".green().bold(),
    };

    if show_timestamps {
        format!(
            "{} {} {}",
            format!("[{}]", message.timestamp).dimmed(),
            speaker,
            message.text
        )
    } else {
        format!("{} {}", speaker, message.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParleyError;
    use crate::test_utils::{assert_parley_error, memory_conversation_store};

    #[test]
    fn test_format_message_with_and_without_timestamp() {
        colored::control::set_override(false);
        let message = Message::new(MessageKind::Response, "Hi there", "2026-01-01 10:00:02");

        assert_eq!(
            format_message(&message, true),
            "[2026-01-01 10:00:02] Assistant: Hi there"
        );
        assert_eq!(format_message(&message, false), "Assistant: Hi there");

        let prompt = Message::new(MessageKind::Prompt, "Hello", "2026-01-01 10:00:00");
        assert_eq!(format_message(&prompt, false), "You: Hello");
    }

    #[test]
    fn test_history_delete_by_position() {
        let mut store = memory_conversation_store();
        let older = store.create_conversation(Some("a")).unwrap();
        let newer = store.create_conversation(Some("b")).unwrap();

        handle_history(
            HistoryCommand::Delete {
                id: "#1".to_string(),
            },
            &mut store,
            true,
        )
        .unwrap();

        assert!(!store.contains(&newer.id));
        assert!(store.contains(&older.id));
    }

    #[test]
    fn test_history_show_unknown_is_not_found() {
        let mut store = memory_conversation_store();
        let err = handle_history(
            HistoryCommand::Show {
                id: "nope".to_string(),
            },
            &mut store,
            true,
        )
        .unwrap_err();
        assert_parley_error(&err, |e| matches!(e, ParleyError::NotFound(_)));
    }

    #[test]
    fn test_history_list_on_empty_store() {
        let mut store = memory_conversation_store();
        assert!(handle_history(HistoryCommand::List, &mut store, true).is_ok());
    }
}
