//! Provider record normalization
//!
//! Converts raw provider records into the fixed-shape records returned to
//! tool callers. Absent fields are replaced with their defaults here so the
//! output never carries nulls.

use crate::mail_client::{RawLabel, RawMessage};
use crate::mime::{extract_body, header_or};
use crate::models::{Label, NormalizedMessage};

pub const DEFAULT_SUBJECT: &str = "(No Subject)";
pub const DEFAULT_PARTY: &str = "Unknown";
pub const DEFAULT_DATE: &str = "Unknown";

/// Build the caller-facing record for one raw message
pub fn normalize_message(raw: &RawMessage) -> NormalizedMessage {
    NormalizedMessage {
        id: raw.id.clone(),
        thread_id: raw.thread_id.clone(),
        subject: header_or(&raw.headers, "Subject", DEFAULT_SUBJECT),
        from: header_or(&raw.headers, "From", DEFAULT_PARTY),
        to: header_or(&raw.headers, "To", DEFAULT_PARTY),
        date: header_or(&raw.headers, "Date", DEFAULT_DATE),
        snippet: raw.snippet.clone().unwrap_or_default(),
        body: extract_body(&raw.payload),
        labels: raw.label_ids.clone().unwrap_or_default(),
    }
}

pub fn normalize_label(raw: RawLabel) -> Label {
    Label {
        id: raw.id,
        name: raw.name,
        label_type: raw.label_type,
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_label, normalize_message};
    use crate::mail_client::{Header, MessagePart, RawLabel, RawMessage};

    fn sample_message() -> RawMessage {
        RawMessage {
            id: "msg_123".to_owned(),
            thread_id: "thread_msg_123".to_owned(),
            snippet: Some("Test Subject - snippet".to_owned()),
            label_ids: Some(vec!["INBOX".to_owned()]),
            headers: vec![
                Header::new("Subject", "Test Subject"),
                Header::new("From", "sender@example.com"),
                Header::new("To", "recipient@example.com"),
                Header::new("Date", "Mon, 20 Feb 2026 10:00:00 +0000"),
            ],
            payload: MessagePart {
                mime_type: Some("text/plain".to_owned()),
                body: Some(b"Hello world".to_vec()),
                parts: None,
            },
        }
    }

    #[test]
    fn maps_headers_body_and_metadata() {
        let msg = normalize_message(&sample_message());
        assert_eq!(msg.id, "msg_123");
        assert_eq!(msg.thread_id, "thread_msg_123");
        assert_eq!(msg.subject, "Test Subject");
        assert_eq!(msg.from, "sender@example.com");
        assert_eq!(msg.to, "recipient@example.com");
        assert_eq!(msg.date, "Mon, 20 Feb 2026 10:00:00 +0000");
        assert_eq!(msg.snippet, "Test Subject - snippet");
        assert_eq!(msg.body, "Hello world");
        assert_eq!(msg.labels, vec!["INBOX".to_owned()]);
    }

    #[test]
    fn missing_headers_fall_back_to_defaults() {
        let mut raw = sample_message();
        raw.headers.clear();

        let msg = normalize_message(&raw);
        assert_eq!(msg.subject, "(No Subject)");
        assert_eq!(msg.from, "Unknown");
        assert_eq!(msg.to, "Unknown");
        assert_eq!(msg.date, "Unknown");
        assert_eq!(msg.id, "msg_123");
        assert_eq!(msg.thread_id, "thread_msg_123");
        assert_eq!(msg.snippet, "Test Subject - snippet");
        assert_eq!(msg.body, "Hello world");
        assert_eq!(msg.labels, vec!["INBOX".to_owned()]);
    }

    #[test]
    fn absent_snippet_and_labels_become_empty() {
        let mut raw = sample_message();
        raw.snippet = None;
        raw.label_ids = None;

        let msg = normalize_message(&raw);
        assert_eq!(msg.snippet, "");
        assert!(msg.labels.is_empty());
    }

    #[test]
    fn normalization_is_deterministic() {
        let raw = sample_message();
        assert_eq!(normalize_message(&raw), normalize_message(&raw));
    }

    #[test]
    fn serializes_with_snake_case_keys() {
        let value = serde_json::to_value(normalize_message(&sample_message()))
            .expect("message must serialize");
        for key in [
            "id", "thread_id", "subject", "from", "to", "date", "snippet", "body", "labels",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn label_type_is_passed_through() {
        let label = normalize_label(RawLabel {
            id: "Label_1".to_owned(),
            name: "Receipts".to_owned(),
            label_type: Some("user".to_owned()),
        });
        assert_eq!(label.id, "Label_1");
        assert_eq!(label.name, "Receipts");
        let value = serde_json::to_value(&label).expect("label must serialize");
        assert_eq!(value["type"], "user");
    }
}
