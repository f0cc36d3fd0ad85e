/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`: Interactive chat session
- `ask`: Send one prompt and print the reply
- `auth`: Store or remove the API key

`history` renders listings and transcripts for both the REPL and the
`parley history` subcommands.
*/

use crate::config::{Config, StorageConfig};
use crate::conversation::ConversationStore;
use crate::credentials::{resolve_api_key, CredentialStore};
use crate::error::{ParleyError, Result};
use crate::providers::{create_gateway, CompletionGateway};
use crate::storage::{KeyValueStore, MemoryStore, SledStore};
use std::sync::Arc;

pub mod history;

// Special commands parser for the interactive session
pub mod special_commands;

/// Open the conversation store described by `config`
///
/// # Errors
///
/// Returns `ParleyError::Storage` if the database cannot be opened
pub fn open_store(config: &StorageConfig) -> Result<ConversationStore> {
    let kv: Box<dyn KeyValueStore> = if config.ephemeral {
        tracing::debug!("Using in-memory conversation store");
        Box::new(MemoryStore::new())
    } else {
        match &config.path {
            Some(path) => Box::new(SledStore::open(path)?),
            None => Box::new(SledStore::open_default()?),
        }
    };

    Ok(ConversationStore::open(kv))
}

/// Build the completion gateway, looking up the API key if needed
pub fn build_gateway(config: &Config) -> Result<Arc<dyn CompletionGateway>> {
    let mut gateway_config = config.gateway.clone();
    resolve_api_key(&mut gateway_config, &CredentialStore::default());
    Ok(Arc::from(create_gateway(&gateway_config)?))
}

/// One-line, user-facing rendering of an error
pub fn describe_error(error: &anyhow::Error) -> String {
    match crate::error::kind_of(error) {
        Some(ParleyError::Configuration(msg)) => format!("Configuration error: {}", msg),
        Some(ParleyError::Network(msg)) => {
            format!("Could not reach the completion endpoint: {}", msg)
        }
        Some(ParleyError::Upstream(msg)) => {
            format!("The completion endpoint returned an error: {}", msg)
        }
        _ => error.to_string(),
    }
}

pub mod chat {
    //! Interactive chat handler.
    //!
    //! Opens the conversation store, builds the gateway, and runs a
    //! readline-based loop over a [`ChatApp`].

    use super::history::{format_message, print_conversation_table, print_transcript};
    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use crate::app::{ChatApp, PendingReply, SendOutcome};
    use crate::screen::Screen;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::io::Write;

    /// Start an interactive chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `new` - Open with a fresh conversation
    /// * `resume` - Open the conversation with this id, id prefix, or `#N`
    pub async fn run_chat(config: Config, new: bool, resume: Option<String>) -> Result<()> {
        tracing::debug!("Starting interactive chat session");

        let store = open_store(&config.storage)?;
        let gateway = build_gateway(&config)?;
        let mut app = ChatApp::new(store, gateway);

        if new {
            app.new_chat(None)?;
        } else if let Some(reference) = resume {
            let id = app.resolve(&reference)?;
            app.select_chat(&id)?;
        }

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&app);
        if app.screen() == Screen::Chat {
            show_active(&app, config.chat.show_timestamps);
        }

        loop {
            let label = app.active().map(|c| c.display_label.clone());
            let prompt = app.screen().prompt(label.as_deref());

            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        rl.add_history_entry(trimmed)?;
                    }

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    if command == SpecialCommand::Exit {
                        break;
                    }

                    if let Err(e) = handle_input(&mut app, command, trimmed, &config).await {
                        eprintln!("{}\n", describe_error(&e).red());
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn handle_input(
        app: &mut ChatApp,
        command: SpecialCommand,
        input: &str,
        config: &Config,
    ) -> Result<()> {
        let show_timestamps = config.chat.show_timestamps;

        match command {
            SpecialCommand::New(seed) => match seed {
                Some(text) => {
                    let pending = app.begin_new_chat(&text)?;
                    show_active(app, show_timestamps);
                    if let Some(pending) = pending {
                        wait_for_reply(app, pending, config).await?;
                    }
                }
                None => {
                    app.new_chat(None)?;
                    show_active(app, show_timestamps);
                }
            },
            SpecialCommand::List => print_conversation_table(app.store()),
            SpecialCommand::Open(reference) => {
                let id = app.resolve(&reference)?;
                app.select_chat(&id)?;
                show_active(app, show_timestamps);
            }
            SpecialCommand::Delete(reference) => {
                let id = app.resolve(&reference)?;
                app.delete_chat(&id)?;
                println!("{}\n", format!("Deleted conversation {}", id).green());
            }
            SpecialCommand::History => show_active(app, show_timestamps),
            SpecialCommand::Back => {
                app.go_back();
                println!("{}\n", app.screen().hint().dimmed());
            }
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit => {}
            SpecialCommand::None => match app.screen() {
                Screen::Start => {
                    app.start_chat()?;
                    show_active(app, show_timestamps);
                    if !input.is_empty() {
                        send_message(app, input, config).await?;
                    }
                }
                Screen::Chat => {
                    if !input.is_empty() {
                        send_message(app, input, config).await?;
                    }
                }
            },
        }

        Ok(())
    }

    /// Record `text` in the active conversation, wait for the reply, and print it
    async fn send_message(app: &mut ChatApp, text: &str, config: &Config) -> Result<()> {
        match app.begin_send(text)? {
            Some(pending) => wait_for_reply(app, pending, config).await,
            None => Ok(()),
        }
    }

    async fn wait_for_reply(
        app: &mut ChatApp,
        pending: PendingReply,
        config: &Config,
    ) -> Result<()> {
        if config.chat.typing_indicator {
            print!("{}", "typing...".dimmed().italic());
            std::io::stdout().flush()?;
        }

        let gateway = app.gateway();
        let reply = gateway.complete(&pending.prompt).await;

        if config.chat.typing_indicator {
            print!("\r\x1b[K");
            std::io::stdout().flush()?;
        }

        match app.finish_send(pending, reply)? {
            SendOutcome::Delivered { reply, .. } => {
                println!("{}\n", format_message(&reply, config.chat.show_timestamps));
            }
            SendOutcome::Discarded { conversation_id } => {
                println!(
                    "{}\n",
                    format!("Reply dropped: conversation {} was deleted", conversation_id)
                        .yellow()
                );
            }
        }

        Ok(())
    }

    fn show_active(app: &ChatApp, show_timestamps: bool) {
        match app.active() {
            Some(conversation) => print_transcript(conversation, show_timestamps),
            None => println!("{}\n", "No conversation selected. Type to start one.".dimmed()),
        }
    }

    fn print_welcome_banner(app: &ChatApp) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                 Parley Interactive Chat                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Conversations: {}", app.store().len());
        println!("{}\n", app.screen().hint());
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }
}

/// One-shot prompt command
pub mod ask {
    use super::*;
    use crate::app::{ChatApp, SendOutcome};

    /// Send `prompt` and print the reply
    ///
    /// Continues `conversation` (id, id prefix, or `#N`) when given, otherwise
    /// starts a new conversation seeded with the prompt.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the request fails; the prompt is still
    /// saved in that case.
    pub async fn run_ask(config: Config, prompt: String, conversation: Option<String>) -> Result<()> {
        if prompt.trim().is_empty() {
            return Err(ParleyError::InvalidMessage("prompt is empty".to_string()).into());
        }

        let store = open_store(&config.storage)?;
        let gateway = build_gateway(&config)?;
        let mut app = ChatApp::new(store, gateway);

        let outcome = match conversation {
            Some(reference) => {
                let id = app.resolve(&reference)?;
                app.select_chat(&id)?;
                app.send(&prompt).await?
            }
            None => app.send_new(&prompt).await?,
        };

        match outcome {
            Some(SendOutcome::Delivered { reply, .. }) => println!("{}", reply.text),
            Some(SendOutcome::Discarded { conversation_id }) => {
                tracing::warn!("Reply for {} was discarded", conversation_id);
            }
            None => {}
        }

        Ok(())
    }
}

/// Auth command(s)
///
/// Reads an API key from the terminal and stores it in the system keyring.
pub mod auth {
    use super::*;
    use rustyline::DefaultEditor;

    /// Prompt for an API key and store it, or remove it with `logout`
    pub async fn authenticate(logout: bool) -> Result<()> {
        let store = CredentialStore::default();

        if logout {
            store.delete_api_key()?;
            println!("Removed stored API key.");
            return Ok(());
        }

        let mut rl = DefaultEditor::new()?;
        let key = rl.readline("API key: ")?;
        store.save_api_key(&key)?;
        println!("API key stored in the system keyring.");
        Ok(())
    }
}
