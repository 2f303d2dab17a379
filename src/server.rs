//! MCP server implementation with tool handlers
//!
//! Implements the `ServerHandler` trait and registers 5 read-only MCP tools.
//! Handles input validation and response formatting; mailbox access goes
//! through the injected [`Mailbox`].

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{ErrorData, ServerCapabilities, ServerInfo};
use rmcp::{Json, ServerHandler, tool, tool_handler, tool_router};

use crate::errors::{AppError, AppResult};
use crate::gmail::GmailClient;
use crate::mailbox::{ListOptions, MAX_PROVIDER_PAGE, Mailbox};
use crate::models::{
    EmailListData, GetEmailInput, LabelListData, ListEmailsInput, Meta, NormalizedMessage,
    SearchEmailsInput, ToolEnvelope, UnreadCountData,
};

/// Maximum emails per `list_emails` call
const MAX_LIST_RESULTS: u32 = 50;
/// Maximum emails per `search_emails` call
const MAX_SEARCH_RESULTS: u32 = 100;
/// Maximum accepted query length
const MAX_QUERY_CHARS: usize = 1_024;
/// Maximum accepted message id length
const MAX_MESSAGE_ID_CHARS: usize = 256;

/// Gmail MCP server
///
/// Holds the shared mailbox. Implements MCP tool handlers via `#[tool]`
/// attribute macro and `ServerHandler` trait.
#[derive(Clone)]
pub struct GmailMcpServer {
    /// Mailbox facade over the Gmail client
    mailbox: Arc<Mailbox<GmailClient>>,
    /// Tool router for dispatching MCP tool calls
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl GmailMcpServer {
    /// Create a new MCP server instance around a ready mailbox
    pub fn new(mailbox: Mailbox<GmailClient>) -> Self {
        Self {
            mailbox: Arc::new(mailbox),
            tool_router: Self::tool_router(),
        }
    }

    /// Tool: List recent emails
    ///
    /// Fetches up to `max_results` emails, optionally filtered by query and
    /// date range, skipping the first `offset` matches.
    #[tool(
        name = "list_emails",
        description = "List recent emails from the Gmail inbox, optionally filtered by Gmail query and date range"
    )]
    async fn list_emails(
        &self,
        Parameters(input): Parameters<ListEmailsInput>,
    ) -> Result<Json<ToolEnvelope<EmailListData>>, ErrorData> {
        let started = Instant::now();
        finalize_tool(
            started,
            self.list_emails_impl(input).await.map(email_list),
        )
    }

    /// Tool: Get one email by id
    #[tool(
        name = "get_email",
        description = "Get the full content of a specific email by its Gmail message ID"
    )]
    async fn get_email(
        &self,
        Parameters(input): Parameters<GetEmailInput>,
    ) -> Result<Json<ToolEnvelope<NormalizedMessage>>, ErrorData> {
        let started = Instant::now();
        finalize_tool(
            started,
            self.get_email_impl(input)
                .await
                .map(|msg| (format!("Email '{}' retrieved", msg.subject), msg)),
        )
    }

    /// Tool: Search emails with a Gmail query
    #[tool(
        name = "search_emails",
        description = "Search Gmail using a query string and return matching emails"
    )]
    async fn search_emails(
        &self,
        Parameters(input): Parameters<SearchEmailsInput>,
    ) -> Result<Json<ToolEnvelope<EmailListData>>, ErrorData> {
        let started = Instant::now();
        finalize_tool(
            started,
            self.search_emails_impl(input).await.map(email_list),
        )
    }

    /// Tool: List labels
    #[tool(
        name = "get_labels",
        description = "List all Gmail labels including system labels (INBOX, SENT, TRASH) and user-created labels"
    )]
    async fn get_labels(&self) -> Result<Json<ToolEnvelope<LabelListData>>, ErrorData> {
        let started = Instant::now();
        let result = self.mailbox.labels().await.map(|labels| {
            (
                format!("{} label(s)", labels.len()),
                LabelListData { labels },
            )
        });
        finalize_tool(started, result)
    }

    /// Tool: Count unread emails
    #[tool(
        name = "get_unread_count",
        description = "Get the total number of unread emails in the Gmail mailbox"
    )]
    async fn get_unread_count(&self) -> Result<Json<ToolEnvelope<UnreadCountData>>, ErrorData> {
        let started = Instant::now();
        let result = self.mailbox.unread_count().await.map(|unread_count| {
            (
                format!("{unread_count} unread email(s)"),
                UnreadCountData { unread_count },
            )
        });
        finalize_tool(started, result)
    }
}

/// MCP server handler implementation
///
/// Provides server info and capabilities to MCP client.
#[tool_handler(router = self.tool_router)]
impl ServerHandler for GmailMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build()).with_instructions(
            "Read-only Gmail MCP server. Emails are returned with plain-text bodies when available, HTML otherwise; missing headers read as \"(No Subject)\" or \"Unknown\".",
        )
    }
}

/// Tool implementation methods
///
/// Validation runs before any provider call; provider errors pass through
/// unchanged to `finalize_tool`.
impl GmailMcpServer {
    async fn list_emails_impl(&self, input: ListEmailsInput) -> AppResult<Vec<NormalizedMessage>> {
        let options = list_options(input)?;
        self.mailbox.list(&options).await
    }

    async fn get_email_impl(&self, input: GetEmailInput) -> AppResult<NormalizedMessage> {
        validate_message_id(&input.message_id)?;
        self.mailbox.get(&input.message_id).await
    }

    async fn search_emails_impl(
        &self,
        input: SearchEmailsInput,
    ) -> AppResult<Vec<NormalizedMessage>> {
        validate_search_input(&input)?;
        self.mailbox
            .search(&input.query, input.max_results)
            .await
    }
}

/// Calculate elapsed milliseconds
fn duration_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}

/// Build a standardized MCP tool response envelope from business logic output
fn finalize_tool<T>(
    started: Instant,
    result: AppResult<(String, T)>,
) -> Result<Json<ToolEnvelope<T>>, ErrorData>
where
    T: schemars::JsonSchema,
{
    match result {
        Ok((summary, data)) => Ok(Json(ToolEnvelope {
            summary,
            data,
            meta: Meta::now(duration_ms(started)),
        })),
        Err(e) => {
            tracing::debug!("tool failed: {e}");
            Err(e.to_error_data())
        }
    }
}

/// Wrap listed emails with a count summary
fn email_list(emails: Vec<NormalizedMessage>) -> (String, EmailListData) {
    (
        format!("{} email(s) returned", emails.len()),
        EmailListData {
            total: emails.len(),
            emails,
        },
    )
}

/// Validate `list_emails` input and convert it to mailbox options
fn list_options(input: ListEmailsInput) -> AppResult<ListOptions> {
    validate_range(input.max_results, 1, MAX_LIST_RESULTS, "max_results")?;
    validate_range(
        input.offset,
        0,
        MAX_PROVIDER_PAGE - MAX_LIST_RESULTS,
        "offset",
    )?;
    if let Some(q) = &input.query {
        validate_query(q)?;
    }

    let after_date = input.after_date.as_deref().map(parse_ymd).transpose()?;
    let before_date = input.before_date.as_deref().map(parse_ymd).transpose()?;
    if let (Some(after), Some(before)) = (after_date, before_date)
        && after > before
    {
        return Err(AppError::invalid("after_date must be <= before_date"));
    }

    Ok(ListOptions {
        max_results: input.max_results,
        query: input.query,
        after_date,
        before_date,
        offset: input.offset,
    })
}

/// Validate `search_emails` input
fn validate_search_input(input: &SearchEmailsInput) -> AppResult<()> {
    validate_range(input.max_results, 1, MAX_SEARCH_RESULTS, "max_results")?;
    if input.query.trim().is_empty() {
        return Err(AppError::invalid("query must not be empty"));
    }
    validate_query(&input.query)
}

/// Validate query length and characters
fn validate_query(query: &str) -> AppResult<()> {
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(AppError::InvalidInput(format!(
            "query must be at most {MAX_QUERY_CHARS} characters"
        )));
    }
    validate_no_controls(query, "query")
}

/// Validate Gmail message id format
fn validate_message_id(message_id: &str) -> AppResult<()> {
    if message_id.is_empty() || message_id.chars().count() > MAX_MESSAGE_ID_CHARS {
        return Err(AppError::InvalidInput(format!(
            "message_id must be 1..{MAX_MESSAGE_ID_CHARS} characters"
        )));
    }
    if message_id.contains('/') {
        return Err(AppError::invalid("message_id must not contain '/'"));
    }
    validate_no_controls(message_id, "message_id")
}

/// Reject control characters in user-provided values
fn validate_no_controls(value: &str, field: &str) -> AppResult<()> {
    if value.chars().any(char::is_control) {
        return Err(AppError::InvalidInput(format!(
            "{field} must not contain control characters"
        )));
    }
    Ok(())
}

/// Validate numeric value in range
fn validate_range(value: u32, min: u32, max: u32, field: &str) -> AppResult<()> {
    if value < min || value > max {
        return Err(AppError::InvalidInput(format!(
            "{field} must be in range {min}..{max}"
        )));
    }
    Ok(())
}

/// Parse YYYY-MM-DD date string
fn parse_ymd(input: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput(format!("invalid date '{input}', expected YYYY-MM-DD")))
}
