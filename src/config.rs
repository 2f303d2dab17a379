//! Configuration module for the Gmail connection and server settings
//!
//! All configuration is loaded from environment variables prefixed with
//! `GMAIL_MCP_`. The access token is obtained outside this server (any OAuth
//! tool that can mint a `gmail.readonly` token) and supplied either directly
//! or through a token file.

use std::env;
use std::env::VarError;
use std::fs;

use secrecy::SecretString;

use crate::errors::{AppError, AppResult};

/// Gmail REST API root used when `GMAIL_MCP_API_BASE_URL` is unset
pub const DEFAULT_API_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

/// Server-wide configuration
///
/// Consumed once at startup to build the Gmail client and mailbox.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bearer token stored in a type that prevents accidental logging
    pub access_token: SecretString,
    /// Gmail user id path segment (`me` for the token owner)
    pub user_id: String,
    /// API root without trailing slash
    pub api_base_url: String,
    /// TCP/TLS connect timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum concurrent message fetches while listing
    pub fetch_concurrency: usize,
}

impl ServerConfig {
    /// Load all configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if no access token is configured or a variable
    /// is malformed.
    ///
    /// # Example Environment
    ///
    /// ```text
    /// GMAIL_MCP_ACCESS_TOKEN=ya29.a0Af...
    /// GMAIL_MCP_USER_ID=me
    /// GMAIL_MCP_REQUEST_TIMEOUT_MS=30000
    /// GMAIL_MCP_FETCH_CONCURRENCY=4
    /// ```
    pub fn load_from_env() -> AppResult<Self> {
        Self::load_with(|key| env::var(key))
    }

    /// Load configuration through an arbitrary variable lookup
    fn load_with<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let api_base_url = optional_env(&lookup, "GMAIL_MCP_API_BASE_URL")?
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        if !api_base_url.starts_with("https://") && !api_base_url.starts_with("http://") {
            return Err(AppError::InvalidInput(format!(
                "GMAIL_MCP_API_BASE_URL must be an http(s) URL: '{api_base_url}'"
            )));
        }

        let fetch_concurrency = parse_env(&lookup, "GMAIL_MCP_FETCH_CONCURRENCY", 4usize)?;
        if !(1..=32).contains(&fetch_concurrency) {
            return Err(AppError::InvalidInput(
                "GMAIL_MCP_FETCH_CONCURRENCY must be in range 1..32".to_owned(),
            ));
        }

        Ok(Self {
            access_token: load_access_token(&lookup)?,
            user_id: optional_env(&lookup, "GMAIL_MCP_USER_ID")?.unwrap_or_else(|| "me".to_owned()),
            api_base_url,
            connect_timeout_ms: parse_env(&lookup, "GMAIL_MCP_CONNECT_TIMEOUT_MS", 10_000u64)?,
            request_timeout_ms: parse_env(&lookup, "GMAIL_MCP_REQUEST_TIMEOUT_MS", 30_000u64)?,
            fetch_concurrency,
        })
    }
}

/// Resolve the bearer token from `GMAIL_MCP_ACCESS_TOKEN` or `GMAIL_MCP_TOKEN_PATH`
///
/// The direct variable wins when both are set.
fn load_access_token<F>(lookup: &F) -> AppResult<SecretString>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    if let Some(token) = optional_env(lookup, "GMAIL_MCP_ACCESS_TOKEN")? {
        return Ok(SecretString::new(token.trim().into()));
    }

    let Some(path) = optional_env(lookup, "GMAIL_MCP_TOKEN_PATH")? else {
        return Err(AppError::InvalidInput(
            "missing required environment variable GMAIL_MCP_ACCESS_TOKEN or GMAIL_MCP_TOKEN_PATH"
                .to_owned(),
        ));
    };
    let contents = fs::read_to_string(&path)
        .map_err(|e| AppError::InvalidInput(format!("cannot read token file '{path}': {e}")))?;
    let token = parse_token_file(&contents).ok_or_else(|| {
        AppError::InvalidInput(format!("token file '{path}' does not contain an access token"))
    })?;
    Ok(SecretString::new(token.into()))
}

/// Extract a token from file contents
///
/// Accepts a JSON object with `access_token` or `token`, or the bare token.
fn parse_token_file(contents: &str) -> Option<String> {
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('{') {
        let value: serde_json::Value = serde_json::from_str(trimmed).ok()?;
        return ["access_token", "token"]
            .iter()
            .find_map(|key| value.get(key).and_then(|v| v.as_str()))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned);
    }

    Some(trimmed.to_owned())
}

/// Read an environment variable, treating blank values as unset
fn optional_env<F>(lookup: &F, key: &str) -> AppResult<Option<String>>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    match lookup(key) {
        Ok(v) if v.trim().is_empty() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(AppError::InvalidInput(format!(
            "environment variable {key} contains non-unicode data"
        ))),
    }
}

/// Parse a numeric environment variable with default fallback
///
/// Returns `default` if unset.
///
/// # Errors
///
/// Returns `InvalidInput` if the variable is set but does not parse.
fn parse_env<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Result<String, VarError>,
    T: std::str::FromStr,
{
    match optional_env(lookup, key)? {
        Some(v) => v.trim().parse::<T>().map_err(|_| {
            AppError::InvalidInput(format!("invalid numeric environment variable {key}: '{v}'"))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use secrecy::ExposeSecret;

    use super::{DEFAULT_API_BASE_URL, ServerConfig, parse_token_file};

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, crate::errors::AppError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::load_with(|key| map.get(key).cloned().ok_or(VarError::NotPresent))
    }

    #[test]
    fn applies_defaults_with_token_only() {
        let config = load(&[("GMAIL_MCP_ACCESS_TOKEN", " ya29.token ")]).expect("config must load");
        assert_eq!(config.access_token.expose_secret(), "ya29.token");
        assert_eq!(config.user_id, "me");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.connect_timeout_ms, 10_000);
        assert_eq!(config.request_timeout_ms, 30_000);
        assert_eq!(config.fetch_concurrency, 4);
    }

    #[test]
    fn requires_a_token_source() {
        let err = load(&[]).expect_err("must fail");
        assert!(err.to_string().contains("GMAIL_MCP_ACCESS_TOKEN"));

        let err = load(&[("GMAIL_MCP_ACCESS_TOKEN", "   ")]).expect_err("blank must fail");
        assert!(err.to_string().contains("GMAIL_MCP_TOKEN_PATH"));
    }

    #[test]
    fn rejects_malformed_numbers_and_ranges() {
        let err = load(&[
            ("GMAIL_MCP_ACCESS_TOKEN", "t"),
            ("GMAIL_MCP_REQUEST_TIMEOUT_MS", "soon"),
        ])
        .expect_err("must fail");
        assert!(err.to_string().contains("GMAIL_MCP_REQUEST_TIMEOUT_MS"));

        let err = load(&[
            ("GMAIL_MCP_ACCESS_TOKEN", "t"),
            ("GMAIL_MCP_FETCH_CONCURRENCY", "0"),
        ])
        .expect_err("must fail");
        assert!(err.to_string().contains("1..32"));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = load(&[
            ("GMAIL_MCP_ACCESS_TOKEN", "t"),
            ("GMAIL_MCP_API_BASE_URL", "ftp://example.com"),
        ])
        .expect_err("must fail");
        assert!(err.to_string().contains("http(s)"));
    }

    #[test]
    fn reads_token_from_missing_file_as_error() {
        let err = load(&[("GMAIL_MCP_TOKEN_PATH", "/nonexistent/gmail-token.json")])
            .expect_err("must fail");
        assert!(err.to_string().contains("cannot read token file"));
    }

    #[test]
    fn token_file_accepts_json_and_bare_tokens() {
        assert_eq!(
            parse_token_file(r#"{"access_token": "abc", "refresh_token": "r"}"#).as_deref(),
            Some("abc")
        );
        assert_eq!(parse_token_file(r#"{"token": "def"}"#).as_deref(), Some("def"));
        assert_eq!(parse_token_file("  ghi\n").as_deref(), Some("ghi"));
        assert_eq!(parse_token_file(r#"{"refresh_token": "r"}"#), None);
        assert_eq!(parse_token_file("\n"), None);
    }
}
