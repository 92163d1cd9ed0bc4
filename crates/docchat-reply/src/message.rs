//! Wire-shape chat message model.
//!
//! Field names and casing match the REST API (`role`, `content`, `createdAt`,
//! `contentType`).  The backend is loose about two things this module has to
//! absorb: assistant turns arrive with role `"ai"` or `"model"` (the upstream
//! inference role is passed through verbatim), and the reply object returned
//! by the chat endpoints leaves `contentType` empty.  Neither may abort a
//! history fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    /// Any non-user speaker; `"ai"` and `"model"` on the wire both land here.
    #[serde(alias = "ai", alias = "model")]
    Assistant,
}

/// Whether the entry is real text or a file-attachment placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    File,
}

/// One entry of a chat session, as stored and replayed by the server.
///
/// Immutable once constructed; decoding derives new values instead of
/// rewriting `content` in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_content_type")]
    pub content_type: ContentType,
}

impl ChatMessage {
    /// Build an outgoing user message stamped with the current time.
    pub fn user(content: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            created_at: Utc::now(),
            content_type,
        }
    }
}

/// `"file"` means file; everything else (including `""` and absent) is text.
fn lenient_content_type<'de, D>(deserializer: D) -> Result<ContentType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref() {
        Some("file") => ContentType::File,
        _ => ContentType::Text,
    })
}
