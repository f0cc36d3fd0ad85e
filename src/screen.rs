//! Screen types for the interactive chat
//!
//! The REPL shows one of two screens:
//! - Start: the welcome view, waiting for the user to begin
//! - Chat: the active conversation and its messages

use colored::Colorize;
use std::fmt;

/// Which view the interactive session is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Welcome view; Enter starts chatting
    #[default]
    Start,

    /// Conversation view; plain input is sent as a message
    Chat,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "START"),
            Self::Chat => write!(f, "CHAT"),
        }
    }
}

impl Screen {
    /// Get a colored tag representation of this screen
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use parley::screen::Screen;
    ///
    /// println!("{}", Screen::Chat.colored_tag()); // "[CHAT]" in green
    /// ```
    pub fn colored_tag(&self) -> String {
        match self {
            Self::Start => format!("[{}]", "START".cyan()),
            Self::Chat => format!("[{}]", "CHAT".green()),
        }
    }

    /// Readline prompt for this screen
    ///
    /// On the chat screen the prompt names the active conversation, if any.
    pub fn prompt(&self, conversation_label: Option<&str>) -> String {
        match (self, conversation_label) {
            (Self::Chat, Some(label)) => format!("{} {} >> ", self.colored_tag(), label.dimmed()),
            _ => format!("{} >> ", self.colored_tag()),
        }
    }

    /// One-line usage hint shown when the screen is entered
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Start => "Press Enter to start chatting, /quit to exit",
            Self::Chat => "Type a message and press Enter. /help lists commands",
        }
    }
}
