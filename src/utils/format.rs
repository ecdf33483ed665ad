use crate::core::models::Message;

/// Number of characters of message text shown in a preview line.
pub const PREVIEW_CHARS: usize = 80;

/// Render `<date> <text preview>` on a single line.
#[must_use]
pub fn preview_line(message: &Message) -> String {
    let flattened = message.text().replace(['\r', '\n'], " ");
    let preview: String = flattened.chars().take(PREVIEW_CHARS).collect();
    format!("{} {}", message.date(), preview)
}
