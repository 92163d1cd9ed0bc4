//! REST client for the docchat backend.
//!
//! The backend's surface is four operations: list a session's history, send a
//! message (two endpoints, one for document-referenced sessions and one for
//! free-standing chat), and clear a session.  [`ChatBackend`] is the trait
//! seam over those operations so the session controller can be exercised
//! against an in-memory stand-in.

use std::future::Future;
use std::time::Duration;

use docchat_reply::ChatMessage;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use crate::error::ClientError;
use crate::session::Attachment;

/// Backend operations the session controller depends on.
pub trait ChatBackend: Send + Sync {
    fn history(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, ClientError>> + Send;
    fn send(
        &self,
        session_id: &str,
        text: &str,
        attachment: Option<&Attachment>,
    ) -> impl Future<Output = Result<ChatMessage, ClientError>> + Send;
    fn clear(&self, session_id: &str) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// HTTP implementation of [`ChatBackend`].
pub struct ApiClient {
    base_url: String,
    chat_path: &'static str,
    client: Client,
}

impl ApiClient {
    /// Client for free-standing (unreferenced) chat sessions.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_chat_path(base_url, timeout, "/ai-chat")
    }

    /// Client for sessions keyed on an uploaded document.
    pub fn for_documents(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_chat_path(base_url, timeout, "/ai-chat-docs")
    }

    fn with_chat_path(
        base_url: impl Into<String>,
        timeout: Duration,
        chat_path: &'static str,
    ) -> Self {
        let client = Client::builder()
            .user_agent(concat!("docchat/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            chat_path,
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Error body the backend sends on failure; `message` per the current
/// server, `error` tolerated for older builds.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: String,
}

/// Pass 2xx responses through; turn everything else into [`ClientError::Api`]
/// carrying the server's message when one was sent.
async fn checked(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or(body);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

impl ChatBackend for ApiClient {
    async fn history(&self, session_id: &str) -> Result<Vec<ChatMessage>, ClientError> {
        debug!(session_id, "fetching session history");
        let response = self
            .client
            .get(self.url(&format!("/messages/sessions/{session_id}")))
            .send()
            .await?;
        let messages = checked(response).await?.json().await?;
        Ok(messages)
    }

    async fn send(
        &self,
        session_id: &str,
        text: &str,
        attachment: Option<&Attachment>,
    ) -> Result<ChatMessage, ClientError> {
        let mut form = Form::new()
            .text("text", text.to_owned())
            .text("sessionId", session_id.to_owned());
        if let Some(attachment) = attachment {
            debug!(file = %attachment.file_name, "attaching document");
            let part = Part::bytes(attachment.bytes.clone())
                .file_name(attachment.file_name.clone());
            form = form.part("file", part);
        }

        let response = self
            .client
            .post(self.url(self.chat_path))
            .multipart(form)
            .send()
            .await?;
        let reply = checked(response).await?.json().await?;
        Ok(reply)
    }

    async fn clear(&self, session_id: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/messages/sessions/{session_id}")))
            .send()
            .await?;
        checked(response).await?;
        Ok(())
    }
}
