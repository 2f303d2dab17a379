//! Mailbox query operations
//!
//! Thin orchestration over an injected [`MailClient`]: each operation issues
//! provider calls and maps the raw results through the normalizer. Provider
//! errors propagate unchanged.

use chrono::NaiveDate;
use futures::{StreamExt, TryStreamExt};

use crate::errors::AppResult;
use crate::mail_client::{MailClient, MessageQuery, UNREAD_LABEL_ID};
use crate::models::{Label, NormalizedMessage};
use crate::normalize::{normalize_label, normalize_message};

/// Largest page the provider's list call accepts
pub const MAX_PROVIDER_PAGE: u32 = 500;

/// Filters for [`Mailbox::list`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub max_results: u32,
    pub query: Option<String>,
    /// Inclusive lower bound on receive date
    pub after_date: Option<NaiveDate>,
    /// Exclusive upper bound on receive date
    pub before_date: Option<NaiveDate>,
    /// Matching messages to skip before the returned page
    pub offset: u32,
}

/// Query facade over a mail client
#[derive(Debug)]
pub struct Mailbox<C> {
    client: C,
    fetch_concurrency: usize,
}

impl<C: MailClient> Mailbox<C> {
    /// Wrap `client`; `fetch_concurrency` bounds parallel detail fetches
    /// during listing (1 means sequential).
    pub fn new(client: C, fetch_concurrency: usize) -> Self {
        Self {
            client,
            fetch_concurrency: fetch_concurrency.max(1),
        }
    }

    /// List messages, newest first, each fully fetched and normalized
    ///
    /// The provider's list call only yields references, so every message
    /// costs one extra fetch. Output order matches the provider's order.
    pub async fn list(&self, options: &ListOptions) -> AppResult<Vec<NormalizedMessage>> {
        let request = MessageQuery {
            q: compose_query(options),
            max_results: options
                .max_results
                .saturating_add(options.offset)
                .min(MAX_PROVIDER_PAGE),
        };
        let refs = self.client.list_message_refs(&request).await?;
        let page = refs
            .into_iter()
            .skip(options.offset as usize)
            .take(options.max_results as usize)
            .collect::<Vec<_>>();
        tracing::debug!(count = page.len(), "fetching listed messages");

        futures::stream::iter(page)
            .map(|r| async move { self.client.get_message(&r.id).await })
            .buffered(self.fetch_concurrency)
            .map_ok(|raw| normalize_message(&raw))
            .try_collect()
            .await
    }

    /// Fetch and normalize one message
    pub async fn get(&self, id: &str) -> AppResult<NormalizedMessage> {
        let raw = self.client.get_message(id).await?;
        Ok(normalize_message(&raw))
    }

    /// Same as [`Mailbox::list`] with only a query
    pub async fn search(&self, query: &str, max_results: u32) -> AppResult<Vec<NormalizedMessage>> {
        self.list(&ListOptions {
            max_results,
            query: Some(query.to_owned()),
            ..ListOptions::default()
        })
        .await
    }

    /// All labels in provider order
    pub async fn labels(&self) -> AppResult<Vec<Label>> {
        let raw = self.client.list_labels().await?;
        Ok(raw.into_iter().map(normalize_label).collect())
    }

    /// Total messages carrying the `UNREAD` label, zero when unreported
    pub async fn unread_count(&self) -> AppResult<u64> {
        let total = self.client.label_messages_total(UNREAD_LABEL_ID).await?;
        Ok(total.unwrap_or(0))
    }
}

/// Build the provider search expression from the caller query and date bounds
fn compose_query(options: &ListOptions) -> Option<String> {
    let mut terms = Vec::new();
    if let Some(q) = options.query.as_deref()
        && !q.trim().is_empty()
    {
        terms.push(q.to_owned());
    }
    if let Some(after) = options.after_date {
        terms.push(format!("after:{}", provider_date(after)));
    }
    if let Some(before) = options.before_date {
        terms.push(format!("before:{}", provider_date(before)));
    }

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

/// Format a date for Gmail search operators (e.g. `2025/01/31`)
fn provider_date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}
