//! Input/output DTOs and schema-bearing types
//!
//! Defines all data structures used in MCP tool contracts. Each type is
//! annotated with `JsonSchema` for automatic schema generation. Nothing in
//! this module is Gmail-specific; provider records are converted before they
//! reach these types.

use chrono::{SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metadata included in all tool responses
///
/// Provides timing information and current UTC timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Meta {
    /// Current UTC timestamp in RFC 3339 format with milliseconds
    pub now_utc: String,
    /// Tool execution duration in milliseconds
    pub duration_ms: u64,
}

impl Meta {
    /// Create metadata populated with current time and elapsed duration
    pub fn now(duration_ms: u64) -> Self {
        Self {
            now_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            duration_ms,
        }
    }
}

/// Standard response envelope for all tools
///
/// Wraps tool-specific data with human-readable summary and execution metadata.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolEnvelope<T>
where
    T: JsonSchema,
{
    /// Human-readable summary of the operation outcome
    pub summary: String,
    /// Tool-specific data payload
    pub data: T,
    /// Execution metadata (timestamp, duration)
    pub meta: Meta,
}

/// Normalized email message
///
/// Every field is always present. Missing headers are replaced with
/// `"(No Subject)"` or `"Unknown"`; missing snippet and labels are empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NormalizedMessage {
    /// Provider message identifier
    pub id: String,
    /// Provider thread identifier
    pub thread_id: String,
    /// Subject header
    pub subject: String,
    /// From header
    pub from: String,
    /// To header
    pub to: String,
    /// Date header, unparsed
    pub date: String,
    /// Provider preview text
    pub snippet: String,
    /// Extracted body text (plain text preferred, HTML otherwise)
    pub body: String,
    /// Label identifiers attached to the message
    pub labels: Vec<String>,
}

/// Mailbox label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Label {
    /// Label identifier (e.g. `INBOX`, `Label_12`)
    pub id: String,
    /// Display name
    pub name: String,
    /// `system` or `user`, as reported by the provider
    #[serde(rename = "type")]
    pub label_type: Option<String>,
}

/// Data for `list_emails` and `search_emails`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EmailListData {
    /// Number of emails returned
    pub total: usize,
    /// Emails in provider order (newest first)
    pub emails: Vec<NormalizedMessage>,
}

/// Data for `get_labels`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LabelListData {
    pub labels: Vec<Label>,
}

/// Data for `get_unread_count`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UnreadCountData {
    /// Total messages carrying the `UNREAD` label
    pub unread_count: u64,
}

/// Input: list recent emails
///
/// Used by `list_emails`. Date bounds and offset are optional and combine
/// with `query`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListEmailsInput {
    /// Maximum emails to return (1..50, default 10)
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Gmail search query (e.g. `is:unread`, `from:user@example.com`)
    pub query: Option<String>,
    /// Only emails received on or after this date (YYYY-MM-DD)
    pub after_date: Option<String>,
    /// Only emails received before this date (YYYY-MM-DD)
    pub before_date: Option<String>,
    /// Number of matching emails to skip (0..450, default 0)
    #[serde(default)]
    pub offset: u32,
}

/// Input: get one email
///
/// Used by `get_email`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetEmailInput {
    /// Gmail message ID (e.g. `18d3f1a2b3c4d5e6`)
    pub message_id: String,
}

/// Input: search emails
///
/// Used by `search_emails`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchEmailsInput {
    /// Gmail search query (e.g. `subject:invoice`, `is:unread after:2024/01/01`)
    pub query: String,
    /// Maximum emails to return (1..100, default 10)
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

/// Default value for `max_results`
///
/// Small enough that one page of fully fetched messages stays readable.
fn default_max_results() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::{ListEmailsInput, SearchEmailsInput};

    #[test]
    fn list_input_applies_defaults() {
        let input: ListEmailsInput =
            serde_json::from_value(serde_json::json!({})).expect("empty input must parse");
        assert_eq!(input.max_results, 10);
        assert_eq!(input.offset, 0);
        assert!(input.query.is_none());
        assert!(input.after_date.is_none());
    }

    #[test]
    fn search_input_requires_query() {
        let missing = serde_json::from_value::<SearchEmailsInput>(serde_json::json!({}));
        assert!(missing.is_err());

        let input: SearchEmailsInput =
            serde_json::from_value(serde_json::json!({ "query": "is:unread", "max_results": 25 }))
                .expect("input must parse");
        assert_eq!(input.query, "is:unread");
        assert_eq!(input.max_results, 25);
    }
}
