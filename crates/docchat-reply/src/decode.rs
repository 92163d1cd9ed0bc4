//! Structured-payload extraction from assistant replies.
//!
//! Strategy (single, deterministic): sentinel-first.  When the `&&json`
//! sentinel is present the payload *must* follow it — a missing or broken
//! object there is a decode failure and the caller suppresses the message.
//! Only when no sentinel exists at all is the same object scan applied to the
//! whole content as a secondary heuristic, and that path fails open: text
//! that merely happens to contain braces is returned as prose untouched.
//!
//! Decoding never mutates the caller's message; `prose` is a freshly built
//! string with the sentinel and payload excised and any trailing prose kept.

use thiserror::Error;

use crate::artifact::{ReplyPayload, SlideSpec, SpreadsheetSpec};
use crate::message::{ChatMessage, Role};
use crate::scanner::{scan_object, ObjectScan};

/// Marker token separating prose from the embedded JSON payload.
pub const SENTINEL: &str = "&&json";

/// Artifacts derived from one reply; owned by the render path for the
/// lifetime of that message's display, never persisted.
#[derive(Debug, Clone, Default)]
pub struct DecodedReply {
    /// Content with the sentinel and payload stripped.
    pub prose: String,
    /// Empty means no slide-deck artifact (and no export action).
    pub slides: Vec<SlideSpec>,
    pub spreadsheet: Option<SpreadsheetSpec>,
}

impl DecodedReply {
    fn prose_only(content: &str) -> Self {
        Self {
            prose: content.to_owned(),
            ..Self::default()
        }
    }

    pub fn has_slides(&self) -> bool {
        !self.slides.is_empty()
    }
}

/// Why a sentinel-carrying reply could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Sentinel present but nothing brace-like follows it.
    #[error("payload sentinel present but no JSON object follows")]
    MissingObject,

    /// The payload's opening brace is never closed.
    #[error("unterminated JSON object after payload sentinel")]
    Unterminated,

    /// The spanned text is not valid JSON for a reply payload.
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode one message.  User messages are never scanned; their content is
/// prose verbatim.
pub fn decode_message(message: &ChatMessage) -> Result<DecodedReply, DecodeError> {
    match message.role {
        Role::User => Ok(DecodedReply::prose_only(&message.content)),
        Role::Assistant => decode(&message.content),
    }
}

/// Decode raw assistant content into prose plus artifacts.
pub fn decode(content: &str) -> Result<DecodedReply, DecodeError> {
    let Some(sentinel_at) = content.find(SENTINEL) else {
        return Ok(decode_unmarked(content));
    };

    let before = &content[..sentinel_at];
    let remainder = &content[sentinel_at + SENTINEL.len()..];

    let range = match scan_object(remainder) {
        ObjectScan::Absent => return Err(DecodeError::MissingObject),
        ObjectScan::Unterminated => return Err(DecodeError::Unterminated),
        ObjectScan::Found(range) => range,
    };

    let payload: ReplyPayload = serde_json::from_str(&remainder[range.clone()])?;

    Ok(DecodedReply {
        prose: format!("{before}{}", &remainder[range.end..]),
        slides: payload.slides,
        spreadsheet: payload.excel,
    })
}

/// Brace-scan heuristic for sentinel-less content.  Fail-open: anything that
/// is not unambiguously a reply payload stays prose.
fn decode_unmarked(content: &str) -> DecodedReply {
    let ObjectScan::Found(range) = scan_object(content) else {
        return DecodedReply::prose_only(content);
    };

    match serde_json::from_str::<ReplyPayload>(&content[range.clone()]) {
        Ok(payload) if payload.has_artifacts() => DecodedReply {
            prose: format!("{}{}", &content[..range.start], &content[range.end..]),
            slides: payload.slides,
            spreadsheet: payload.excel,
        },
        _ => DecodedReply::prose_only(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::message::ContentType;

    const SLIDE_REPLY: &str = concat!(
        "Here it is &&json ",
        r#"{"slides":[{"data":[{"type":"Text","value":"Hi"}]}]}"#,
        " Thanks"
    );

    #[test]
    fn plain_prose_passes_through() {
        let reply = decode("just an ordinary answer").unwrap();
        assert_eq!(reply.prose, "just an ordinary answer");
        assert!(reply.slides.is_empty());
        assert!(reply.spreadsheet.is_none());
    }

    #[test]
    fn sentinel_payload_is_excised_with_trailing_prose_kept() {
        let reply = decode(SLIDE_REPLY).unwrap();
        assert_eq!(reply.prose, "Here it is  Thanks");
        assert_eq!(reply.slides.len(), 1);
        assert!(reply.spreadsheet.is_none());
    }

    #[test]
    fn sentinel_without_braces_is_a_decode_failure() {
        let err = decode("&&json not-json-at-all").unwrap_err();
        assert!(matches!(err, DecodeError::MissingObject));
    }

    #[test]
    fn sentinel_with_unterminated_object_is_a_decode_failure() {
        let err = decode(r#"report &&json {"slides": [{"data""#).unwrap_err();
        assert!(matches!(err, DecodeError::Unterminated));
    }

    #[test]
    fn sentinel_with_invalid_json_is_a_decode_failure() {
        let err = decode(r#"&&json {"slides": nope}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn empty_slides_list_is_valid_and_yields_no_artifact() {
        let reply = decode(r#"done &&json {"slides":[]}"#).unwrap();
        assert_eq!(reply.prose, "done ");
        assert!(!reply.has_slides());
    }

    #[test]
    fn excel_payload_is_extracted() {
        let reply = decode(concat!(
            "Sheet below &&json ",
            r#"{"excel":{"columnLabels":["A","B"],"data":[[{"value":1},{"value":2}]]}}"#,
        ))
        .unwrap();
        let sheet = reply.spreadsheet.expect("spreadsheet");
        assert_eq!(sheet.column_labels, vec!["A", "B"]);
        assert_eq!(sheet.data[0][1].as_number(), Some(2.0));
    }

    #[test]
    fn braces_in_prose_without_payload_shape_stay_prose() {
        let content = r#"set the field like {"enabled": true} in the config"#;
        let reply = decode(content).unwrap();
        assert_eq!(reply.prose, content);
        assert!(reply.slides.is_empty());
    }

    #[test]
    fn unmarked_payload_with_artifacts_is_picked_up() {
        let content = r#"Deck: {"slides":[{"data":[{"type":"Text","value":"x"}]}]} end"#;
        let reply = decode(content).unwrap();
        assert_eq!(reply.prose, "Deck:  end");
        assert_eq!(reply.slides.len(), 1);
    }

    #[test]
    fn unmarked_broken_json_fails_open() {
        let content = r#"some { not json"#;
        let reply = decode(content).unwrap();
        assert_eq!(reply.prose, content);
    }

    #[test]
    fn decoding_is_idempotent_and_leaves_the_input_alone() {
        let content = SLIDE_REPLY.to_owned();
        let first = decode(&content).unwrap();
        let second = decode(&content).unwrap();
        assert_eq!(first.prose, second.prose);
        assert_eq!(first.slides.len(), second.slides.len());
        assert_eq!(content, SLIDE_REPLY);
    }

    #[test]
    fn user_messages_are_never_scanned() {
        let message = ChatMessage {
            role: Role::User,
            content: format!("what does {SENTINEL} {{}} mean?"),
            created_at: Utc::now(),
            content_type: ContentType::Text,
        };
        let reply = decode_message(&message).unwrap();
        assert_eq!(reply.prose, message.content);
    }

    #[test]
    fn payload_with_braces_inside_strings_survives() {
        let reply = decode(concat!(
            "&&json ",
            r#"{"slides":[{"data":[{"type":"Text","value":"use {curly} braces"}]}]}"#,
            " tail"
        ))
        .unwrap();
        assert_eq!(reply.prose, " tail");
        assert_eq!(reply.slides.len(), 1);
    }
}
