//! Command-line interface definition for Parley
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot questions, history
//! management, and authentication.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parley - chat with a completion endpoint from the terminal
///
/// Conversations are saved locally and can be resumed, listed, and deleted.
#[derive(Parser, Debug, Clone)]
#[command(name = "parley")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory of the conversation database
    #[arg(long, global = true, env = "PARLEY_STORAGE_PATH")]
    pub storage_path: Option<PathBuf>,

    /// Keep conversations in memory only for this run
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Parley
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Open a fresh conversation instead of the most recent one
        #[arg(short, long, conflicts_with = "resume")]
        new: bool,

        /// Resume a conversation by id, id prefix, or #N
        #[arg(short, long)]
        resume: Option<String>,
    },

    /// Send a single prompt and print the reply
    Ask {
        /// Prompt text
        prompt: String,

        /// Continue an existing conversation (id, id prefix, or #N)
        #[arg(long)]
        conversation: Option<String>,
    },

    /// Manage saved conversations
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Store an API key in the system keyring
    Auth {
        /// Remove the stored key instead
        #[arg(long)]
        logout: bool,
    },
}

/// Conversation history subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List saved conversations, newest first
    List,

    /// Print a conversation transcript
    Show {
        /// Conversation id, id prefix, or #N
        id: String,
    },

    /// Delete a conversation
    Delete {
        /// Conversation id, id prefix, or #N
        id: String,
    },
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            storage_path: None,
            ephemeral: false,
            command: Commands::Chat {
                new: false,
                resume: None,
            },
        }
    }
}
