use crate::core::models::Message;

/// Drops messages whose text is empty or whitespace, such as media-only posts.
#[must_use]
pub fn drop_empty_text(messages: Vec<Message>) -> Vec<Message> {
    messages
        .into_iter()
        .filter(|msg| !msg.text().trim().is_empty())
        .collect()
}
