//! HTTP client and session controller for the docchat backend.
//!
//! [`ApiClient`] speaks the backend's small REST surface; [`ChatSession`]
//! layers the optimistic-send message list on top of any [`ChatBackend`],
//! and [`SessionIdStore`] persists the anonymous session identity between
//! runs.

pub mod api;
pub mod error;
pub mod session;
pub mod store;

pub use api::{ApiClient, ChatBackend};
pub use error::ClientError;
pub use session::{Attachment, ChatSession, PendingSend};
pub use store::SessionIdStore;
