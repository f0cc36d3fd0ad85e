//! Identifier, label, and timestamp generation for conversations

use chrono::{DateTime, Local};
use uuid::Uuid;

/// Timestamp layout for messages
///
/// Local wall-clock time without an offset. Stamps sort lexicographically in
/// time order except when the clock steps back, as at the end of daylight
/// saving time; the store then reuses the previous message's stamp.
pub const MESSAGE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Label layout for new conversations, day first
pub const DISPLAY_LABEL_FORMAT: &str = "Chat %d/%m/%Y %H:%M:%S";

/// Generate a new conversation identifier
///
/// Random (version 4) UUIDs carry 122 bits of randomness, so collisions are
/// not a practical concern and ids are never reused after deletion.
///
/// # Examples
///
/// ```
/// use parley::conversation::new_conversation_id;
///
/// let id = new_conversation_id();
/// assert_eq!(id.len(), 36);
/// ```
pub fn new_conversation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current local time
pub fn now_local() -> DateTime<Local> {
    Local::now()
}

/// Label shown in the chat list for a conversation created at `at`
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use parley::conversation::display_label;
///
/// let at = Local.with_ymd_and_hms(2026, 3, 9, 14, 5, 7).unwrap();
/// assert_eq!(display_label(&at), "Chat 09/03/2026 14:05:07");
/// ```
pub fn display_label(at: &DateTime<Local>) -> String {
    at.format(DISPLAY_LABEL_FORMAT).to_string()
}

/// Timestamp stored on a message created at `at`
pub fn message_timestamp(at: &DateTime<Local>) -> String {
    at.format(MESSAGE_TIMESTAMP_FORMAT).to_string()
}
