//! Mail client seam and raw provider records
//!
//! The [`MailClient`] trait is the only way the mailbox layer reaches the
//! provider. Implementations own authentication and transport; they hand back
//! the raw records defined here with transfer encodings already removed.

use std::future::Future;

use crate::errors::AppResult;

/// Single message header as supplied by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Header name, case preserved (e.g. `Subject`)
    pub name: String,
    /// Header value
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One node of a message's body tree
///
/// A node with non-empty `parts` is a container and its own `body` is
/// ignored during extraction. `parts == None` and an empty vector both mean
/// leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePart {
    /// Declared content type, exactly as the provider reports it
    pub mime_type: Option<String>,
    /// Inline body bytes, already transfer-decoded
    pub body: Option<Vec<u8>>,
    /// Child parts in provider order
    pub parts: Option<Vec<MessagePart>>,
}

impl MessagePart {
    /// Child parts, empty for leaves
    pub fn children(&self) -> &[MessagePart] {
        self.parts.as_deref().unwrap_or_default()
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }
}

/// Full message as fetched from the provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMessage {
    pub id: String,
    pub thread_id: String,
    /// Provider-generated preview text
    pub snippet: Option<String>,
    pub label_ids: Option<Vec<String>>,
    /// Top-level headers in provider order
    pub headers: Vec<Header>,
    /// Root of the body tree
    pub payload: MessagePart,
}

/// Raw label record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLabel {
    pub id: String,
    pub name: String,
    /// `system` or `user`
    pub label_type: Option<String>,
}

/// Message reference returned by the provider's list call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub id: String,
}

/// Provider list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageQuery {
    /// Provider search expression, omitted when `None`
    pub q: Option<String>,
    /// Maximum references to return
    pub max_results: u32,
}

/// Reserved label whose total is the unread count
pub const UNREAD_LABEL_ID: &str = "UNREAD";

/// Authenticated access to a mail provider
///
/// Errors are returned as-is to callers of the mailbox layer; implementations
/// decide how provider failures map onto [`crate::errors::AppError`].
pub trait MailClient: Send + Sync {
    /// List message references matching `query`, newest first
    fn list_message_refs(
        &self,
        query: &MessageQuery,
    ) -> impl Future<Output = AppResult<Vec<MessageRef>>> + Send;

    /// Fetch one full message by provider id
    fn get_message(&self, id: &str) -> impl Future<Output = AppResult<RawMessage>> + Send;

    /// Fetch every label visible to the account
    fn list_labels(&self) -> impl Future<Output = AppResult<Vec<RawLabel>>> + Send;

    /// Total message count carried by a label, if the provider reports one
    fn label_messages_total(
        &self,
        label_id: &str,
    ) -> impl Future<Output = AppResult<Option<u64>>> + Send;
}
