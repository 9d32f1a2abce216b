//! Per-action HTTP transport
//!
//! The executor only needs "send this action, tell me the status". Keeping that behind
//! [`ActionTransport`] lets the admission logic be exercised without sockets.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Response};

use super::errors::ActionError;
use super::types::Action;
use crate::config::DispatcherConfig;
use crate::utils::error::{DisperserError, Result};
use crate::utils::net::http::{HttpClientPoolConfig, create_dispatch_client};

/// Characters of response body kept for a status mismatch
pub const DIAGNOSTIC_BODY_CHARS: usize = 200;

/// Worst case UTF-8 width of the diagnostic snippet
const DIAGNOSTIC_BODY_BYTES: usize = DIAGNOSTIC_BODY_CHARS * 4;

/// What came back for one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub status: u16,
    /// Leading body text, read only when `status` misses the action's contract
    pub body_snippet: Option<String>,
}

/// Sends one action and reports the response status
///
/// Implementations must not retry; the executor owns the deadline.
#[async_trait]
pub trait ActionTransport: Send + Sync {
    async fn send(&self, action: &Action) -> std::result::Result<ActionResponse, ActionError>;
}

/// reqwest-backed transport shared by all actions of all batches
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    user_agent: HeaderValue,
}

impl HttpTransport {
    pub fn new(config: &DispatcherConfig) -> Result<Self> {
        let client = create_dispatch_client(&HttpClientPoolConfig::from(config))?;
        Self::with_client(client, &config.user_agent)
    }

    pub fn with_client(client: Client, user_agent: &str) -> Result<Self> {
        let user_agent = HeaderValue::from_str(user_agent)
            .map_err(|e| DisperserError::config(format!("invalid user agent: {}", e)))?;
        Ok(Self { client, user_agent })
    }

    fn build_headers(&self, action: &Action) -> std::result::Result<HeaderMap, ActionError> {
        let mut headers = HeaderMap::with_capacity(action.headers().len() + 2);

        for (name, value) in action.headers() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ActionError::Transport(format!("invalid header name: {}", e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ActionError::Transport(format!("invalid header value: {}", e)))?;
            headers.insert(name, value);
        }

        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, self.user_agent.clone());
        }

        if action.body().is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Ok(headers)
    }
}

#[async_trait]
impl ActionTransport for HttpTransport {
    async fn send(&self, action: &Action) -> std::result::Result<ActionResponse, ActionError> {
        let headers = self.build_headers(action)?;

        let mut request = self
            .client
            .request(action.method().into(), action.url().clone())
            .headers(headers);

        if let Some(body) = action.body() {
            let bytes = body.to_bytes().map_err(|e| {
                ActionError::Transport(format!("failed to serialize body: {}", e))
            })?;
            request = request.body(bytes);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();

        let body_snippet = if action.expects(status) {
            None
        } else {
            Some(read_snippet(response).await)
        };

        Ok(ActionResponse {
            status,
            body_snippet,
        })
    }
}

/// Read at most [`DIAGNOSTIC_BODY_CHARS`] characters of body text
///
/// Stops pulling chunks once enough bytes are buffered. Read errors end the snippet early;
/// the status is already known and is what matters.
async fn read_snippet(mut response: Response) -> String {
    let mut buffer: Vec<u8> = Vec::new();

    while buffer.len() < DIAGNOSTIC_BODY_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => buffer.extend_from_slice(&chunk),
            Ok(None) | Err(_) => break,
        }
    }

    truncate_chars(&String::from_utf8_lossy(&buffer), DIAGNOSTIC_BODY_CHARS)
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
