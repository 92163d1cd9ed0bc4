//! Session controller with optimistic sends.
//!
//! The message list is updated before the network round trip: the outgoing
//! user message (preceded by a file-typed placeholder when a document rides
//! along) is appended immediately, and removed again if the backend call
//! fails.  A failed send is parked as a [`PendingSend`] so the caller can
//! offer a retry without retyping.

use std::path::Path;

use docchat_reply::{ChatMessage, ContentType};
use tracing::{debug, warn};

use crate::api::ChatBackend;
use crate::error::ClientError;

/// A document going out alongside a message.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Load an attachment from disk, named after the file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_owned());
        let bytes = std::fs::read(path)?;
        Ok(Self { file_name, bytes })
    }
}

/// A send that failed and is waiting for [`ChatSession::retry`].
#[derive(Debug)]
pub struct PendingSend {
    pub text: String,
    pub attachment: Option<Attachment>,
}

/// Ordered message list for one chat session, backed by a [`ChatBackend`].
pub struct ChatSession<B: ChatBackend> {
    backend: B,
    session_id: String,
    messages: Vec<ChatMessage>,
    pending: Option<PendingSend>,
}

impl<B: ChatBackend> ChatSession<B> {
    pub fn new(backend: B, session_id: impl Into<String>) -> Self {
        Self {
            backend,
            session_id: session_id.into(),
            messages: Vec::new(),
            pending: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace the local list with the server's history.  On error the local
    /// list is left as it was.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        let history = self.backend.history(&self.session_id).await?;
        debug!(session_id = %self.session_id, count = history.len(), "history loaded");
        self.messages = history;
        Ok(())
    }

    /// Send a message, optimistically appending it to the local list.  On
    /// failure the optimistic entries are removed and the send is parked;
    /// a previously parked send is discarded in favor of this one.
    pub async fn send(
        &mut self,
        text: impl Into<String>,
        attachment: Option<Attachment>,
    ) -> Result<ChatMessage, ClientError> {
        self.pending = None;
        self.submit(PendingSend {
            text: text.into(),
            attachment,
        })
        .await
    }

    /// Resubmit the parked send, if any.  `Ok(None)` when nothing is parked.
    pub async fn retry(&mut self) -> Result<Option<ChatMessage>, ClientError> {
        match self.pending.take() {
            Some(parked) => self.submit(parked).await.map(Some),
            None => Ok(None),
        }
    }

    /// Delete the session server-side, then empty the local list.  On failure
    /// the list is kept so nothing silently disappears.
    pub async fn clear(&mut self) -> Result<(), ClientError> {
        self.backend.clear(&self.session_id).await?;
        self.messages.clear();
        self.pending = None;
        Ok(())
    }

    async fn submit(&mut self, outgoing: PendingSend) -> Result<ChatMessage, ClientError> {
        let mut appended = 1;
        if let Some(attachment) = &outgoing.attachment {
            self.messages.push(ChatMessage::user(
                attachment.file_name.clone(),
                ContentType::File,
            ));
            appended += 1;
        }
        self.messages
            .push(ChatMessage::user(outgoing.text.clone(), ContentType::Text));

        match self
            .backend
            .send(
                &self.session_id,
                &outgoing.text,
                outgoing.attachment.as_ref(),
            )
            .await
        {
            Ok(reply) => {
                self.messages.push(reply.clone());
                Ok(reply)
            }
            Err(e) => {
                self.messages.truncate(self.messages.len() - appended);
                warn!(session_id = %self.session_id, error = %e, "send failed; parked for retry");
                self.pending = Some(outgoing);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use docchat_reply::Role;

    use super::*;

    struct ScriptedBackend {
        history: Vec<ChatMessage>,
        send_results: Mutex<VecDeque<Result<ChatMessage, ClientError>>>,
        sent: Mutex<Vec<(String, Option<String>)>>,
        clear_ok: bool,
    }

    impl ScriptedBackend {
        fn new(send_results: Vec<Result<ChatMessage, ClientError>>) -> Self {
            Self {
                history: Vec::new(),
                send_results: Mutex::new(send_results.into()),
                sent: Mutex::new(Vec::new()),
                clear_ok: true,
            }
        }
    }

    impl ChatBackend for ScriptedBackend {
        async fn history(&self, _session_id: &str) -> Result<Vec<ChatMessage>, ClientError> {
            Ok(self.history.clone())
        }

        async fn send(
            &self,
            _session_id: &str,
            text: &str,
            attachment: Option<&Attachment>,
        ) -> Result<ChatMessage, ClientError> {
            self.sent
                .lock()
                .unwrap()
                .push((text.to_owned(), attachment.map(|a| a.file_name.clone())));
            self.send_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(server_error()))
        }

        async fn clear(&self, _session_id: &str) -> Result<(), ClientError> {
            if self.clear_ok {
                Ok(())
            } else {
                Err(server_error())
            }
        }
    }

    fn server_error() -> ClientError {
        ClientError::Api {
            status: 500,
            message: "boom".to_owned(),
        }
    }

    fn reply(content: &str) -> ChatMessage {
        serde_json::from_str(&format!(
            r#"{{"role":"model","content":"{content}","createdAt":"2025-03-01T12:00:00Z","contentType":""}}"#
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn load_replaces_the_local_list() {
        let mut backend = ScriptedBackend::new(vec![]);
        backend.history = vec![reply("earlier")];
        let mut session = ChatSession::new(backend, "s1");
        session.load().await.unwrap();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].content, "earlier");
    }

    #[tokio::test]
    async fn successful_send_appends_user_then_reply() {
        let backend = ScriptedBackend::new(vec![Ok(reply("hello back"))]);
        let mut session = ChatSession::new(backend, "s1");

        let got = session.send("hello", None).await.unwrap();
        assert_eq!(got.content, "hello back");

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(!session.has_pending());
    }

    #[tokio::test]
    async fn attachment_adds_a_file_placeholder_before_the_text() {
        let backend = ScriptedBackend::new(vec![Ok(reply("summarized"))]);
        let mut session = ChatSession::new(backend, "s1");

        let attachment = Attachment::new("report.pdf", b"%PDF".to_vec());
        session.send("summarize this", Some(attachment)).await.unwrap();

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content_type, ContentType::File);
        assert_eq!(messages[0].content, "report.pdf");
        assert_eq!(messages[1].content_type, ContentType::Text);
        assert_eq!(messages[1].content, "summarize this");
    }

    #[tokio::test]
    async fn failed_send_rolls_back_and_parks() {
        let backend = ScriptedBackend::new(vec![Err(server_error())]);
        let mut session = ChatSession::new(backend, "s1");

        let attachment = Attachment::new("notes.txt", b"hi".to_vec());
        let err = session.send("try me", Some(attachment)).await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 500, .. }));

        // Both optimistic entries are gone, nothing else is touched.
        assert!(session.messages().is_empty());
        assert!(session.has_pending());
    }

    #[tokio::test]
    async fn retry_resubmits_the_parked_send() {
        let backend =
            ScriptedBackend::new(vec![Err(server_error()), Ok(reply("second time lucky"))]);
        let mut session = ChatSession::new(backend, "s1");

        session.send("persist", None).await.unwrap_err();
        let got = session.retry().await.unwrap();
        assert_eq!(got.unwrap().content, "second time lucky");

        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].content, "persist");
        assert!(!session.has_pending());
    }

    #[tokio::test]
    async fn retry_without_parked_send_is_a_no_op() {
        let backend = ScriptedBackend::new(vec![]);
        let mut session = ChatSession::new(backend, "s1");
        assert!(session.retry().await.unwrap().is_none());
        assert!(session.messages().is_empty());
    }

    #[tokio::test]
    async fn a_new_send_discards_the_stale_parked_one() {
        let backend = ScriptedBackend::new(vec![Err(server_error()), Ok(reply("ok"))]);
        let mut session = ChatSession::new(backend, "s1");

        session.send("first", None).await.unwrap_err();
        session.send("second", None).await.unwrap();

        assert!(!session.has_pending());
        assert_eq!(session.messages()[0].content, "second");
    }

    #[tokio::test]
    async fn clear_failure_keeps_the_local_list() {
        let mut backend = ScriptedBackend::new(vec![Ok(reply("kept"))]);
        backend.clear_ok = false;
        let mut session = ChatSession::new(backend, "s1");

        session.send("hello", None).await.unwrap();
        session.clear().await.unwrap_err();
        assert_eq!(session.messages().len(), 2);
    }

    #[tokio::test]
    async fn clear_success_empties_the_local_list() {
        let backend = ScriptedBackend::new(vec![Ok(reply("gone soon"))]);
        let mut session = ChatSession::new(backend, "s1");

        session.send("hello", None).await.unwrap();
        session.clear().await.unwrap();
        assert!(session.messages().is_empty());
    }
}
