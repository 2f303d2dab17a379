//! Gmail REST transport
//!
//! Implements [`MailClient`] against the Gmail API v1 with `reqwest`. Every
//! request is bounded by the configured timeout. Response bodies are decoded
//! from base64url here so the extraction layer only ever sees raw bytes.

use std::time::Duration;

use base64::Engine;
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio::time::timeout;

use crate::config::ServerConfig;
use crate::errors::{AppError, AppResult};
use crate::mail_client::{MailClient, MessageQuery, MessageRef, RawLabel, RawMessage};

/// base64url decoder that accepts data with or without `=` padding
const BODY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Gmail API client for one mailbox
#[derive(Debug, Clone)]
pub struct GmailClient {
    http: reqwest::Client,
    base_url: String,
    user_id: String,
    access_token: SecretString,
    request_timeout: Duration,
}

impl GmailClient {
    /// Build a client from server config
    ///
    /// # Errors
    ///
    /// - `Internal` if the HTTP client cannot be constructed
    pub fn new(config: &ServerConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_owned(),
            user_id: config.user_id.clone(),
            access_token: config.access_token.clone(),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
        })
    }

    /// URL for a path below `users/{user_id}/`
    fn user_url(&self, path: &str) -> String {
        format!(
            "{}/users/{}/{}",
            self.base_url,
            urlencoding::encode(&self.user_id),
            path
        )
    }

    /// Send an authenticated GET and decode the JSON response
    ///
    /// # Errors
    ///
    /// - `Timeout` if the request exceeds `request_timeout`
    /// - `AuthFailed`, `NotFound`, `RateLimited`, or `Provider` per HTTP status
    /// - `Provider` for transport failures and unreadable bodies
    async fn get_json<T: DeserializeOwned>(
        &self,
        what: &str,
        url: String,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        tracing::debug!(%url, "gmail request: {what}");
        let request = self
            .http
            .get(&url)
            .bearer_auth(self.access_token.expose_secret())
            .query(query)
            .send();

        let response = timeout(self.request_timeout, request)
            .await
            .map_err(|_| AppError::Timeout(format!("{what} timed out")))
            .and_then(|r| r.map_err(|e| transport_error(what, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = timeout(self.request_timeout, response.text())
                .await
                .ok()
                .and_then(Result::ok)
                .unwrap_or_default();
            return Err(status_error(what, status, &body));
        }

        timeout(self.request_timeout, response.json::<T>())
            .await
            .map_err(|_| AppError::Timeout(format!("{what} response timed out")))
            .and_then(|r| {
                r.map_err(|e| AppError::Provider(format!("{what} returned unreadable JSON: {e}")))
            })
    }
}

impl MailClient for GmailClient {
    async fn list_message_refs(&self, query: &MessageQuery) -> AppResult<Vec<MessageRef>> {
        let mut params = vec![("maxResults", query.max_results.to_string())];
        if let Some(q) = &query.q {
            params.push(("q", q.clone()));
        }

        let list: api::ListMessagesResponse = self
            .get_json("list messages", self.user_url("messages"), &params)
            .await?;
        Ok(list
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|m| MessageRef { id: m.id })
            .collect())
    }

    async fn get_message(&self, id: &str) -> AppResult<RawMessage> {
        let url = self.user_url(&format!("messages/{}", urlencoding::encode(id)));
        let message: api::GmailMessage = self
            .get_json("get message", url, &[("format", "full".to_owned())])
            .await?;
        Ok(message.into_raw())
    }

    async fn list_labels(&self) -> AppResult<Vec<RawLabel>> {
        let list: api::ListLabelsResponse = self
            .get_json("list labels", self.user_url("labels"), &[])
            .await?;
        Ok(list
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(|l| RawLabel {
                id: l.id,
                name: l.name,
                label_type: l.label_type,
            })
            .collect())
    }

    async fn label_messages_total(&self, label_id: &str) -> AppResult<Option<u64>> {
        let url = self.user_url(&format!("labels/{}", urlencoding::encode(label_id)));
        let label: api::LabelDetail = self.get_json("get label", url, &[]).await?;
        Ok(label.messages_total)
    }
}

/// Map a reqwest failure that happened before any status was received
fn transport_error(what: &str, err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout(format!("{what} timed out: {err}"))
    } else {
        AppError::Provider(format!("{what} failed: {err}"))
    }
}

/// Map a non-success HTTP status to an application error
///
/// Uses the message from Google's error envelope when the body carries one.
fn status_error(what: &str, status: StatusCode, body: &str) -> AppError {
    let detail = serde_json::from_str::<api::ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.to_string());
    let msg = format!("{what}: {detail}");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::AuthFailed(msg),
        StatusCode::NOT_FOUND => AppError::NotFound(msg),
        StatusCode::TOO_MANY_REQUESTS => AppError::RateLimited(msg),
        _ => AppError::Provider(msg),
    }
}

/// Decode a base64url body, absorbing malformed data
fn decode_part_data(data: Option<String>) -> Option<Vec<u8>> {
    let data = data?;
    match BODY_ENGINE.decode(data.as_bytes()) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!("discarding undecodable body data: {e}");
            None
        }
    }
}

/// Gmail API response types
mod api {
    use serde::Deserialize;

    use super::decode_part_data;
    use crate::mail_client::{Header, MessagePart, RawMessage};

    /// Response from listing messages
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListMessagesResponse {
        pub messages: Option<Vec<MessageRef>>,
    }

    /// Reference to a message
    #[derive(Debug, Deserialize)]
    pub struct MessageRef {
        pub id: String,
    }

    /// Full message from Gmail API
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GmailMessage {
        pub id: String,
        #[serde(default)]
        pub thread_id: String,
        pub label_ids: Option<Vec<String>>,
        pub snippet: Option<String>,
        pub payload: Option<Part>,
    }

    impl GmailMessage {
        /// Lift payload headers to the message and decode every body
        pub fn into_raw(self) -> RawMessage {
            let mut payload = self.payload.unwrap_or_default();
            let headers = payload
                .headers
                .take()
                .unwrap_or_default()
                .into_iter()
                .map(|h| Header::new(h.name, h.value))
                .collect();

            RawMessage {
                id: self.id,
                thread_id: self.thread_id,
                snippet: self.snippet,
                label_ids: self.label_ids,
                headers,
                payload: payload.into_part(),
            }
        }
    }

    /// Message part (the payload is the root part)
    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Part {
        pub mime_type: Option<String>,
        pub headers: Option<Vec<ApiHeader>>,
        pub body: Option<PartBody>,
        pub parts: Option<Vec<Part>>,
    }

    impl Part {
        pub fn into_part(self) -> MessagePart {
            MessagePart {
                mime_type: self.mime_type,
                body: decode_part_data(self.body.and_then(|b| b.data)),
                parts: self
                    .parts
                    .map(|parts| parts.into_iter().map(Part::into_part).collect()),
            }
        }
    }

    /// Email header (name-value pair)
    #[derive(Debug, Deserialize)]
    pub struct ApiHeader {
        pub name: String,
        #[serde(default)]
        pub value: String,
    }

    /// Part body; `data` is base64url encoded
    #[derive(Debug, Deserialize)]
    pub struct PartBody {
        pub data: Option<String>,
    }

    /// Response from listing labels
    #[derive(Debug, Deserialize)]
    pub struct ListLabelsResponse {
        pub labels: Option<Vec<LabelSummary>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct LabelSummary {
        pub id: String,
        #[serde(default)]
        pub name: String,
        #[serde(rename = "type")]
        pub label_type: Option<String>,
    }

    /// Single label with counters
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LabelDetail {
        pub messages_total: Option<u64>,
    }

    /// Google API error body
    #[derive(Debug, Deserialize)]
    pub struct ErrorEnvelope {
        pub error: ErrorDetail,
    }

    #[derive(Debug, Deserialize)]
    pub struct ErrorDetail {
        pub message: Option<String>,
    }
}
