//! Dispatch data model
//!
//! `Batch` and `Action` are only ever built by [`BatchValidator`](super::BatchValidator), so
//! every instance already carries its defaulted timeout and status contract. Both serialize
//! back to the camelCase payload shape they were parsed from.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use super::errors::ActionError;

/// HTTP methods an action may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Every accepted method, in display order
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unsupported method '{}'", s))
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Request body of an action
///
/// Strings are sent verbatim; anything else is a JSON document serialized at send time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionBody {
    Raw(String),
    Structured(serde_json::Value),
}

impl ActionBody {
    /// Bytes put on the wire
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            ActionBody::Raw(text) => Ok(text.as_bytes().to_vec()),
            ActionBody::Structured(document) => serde_json::to_vec(document),
        }
    }
}

/// One outbound HTTP call descriptor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    id: String,
    url: Url,
    method: HttpMethod,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<ActionBody>,
    timeout_ms: u64,
    expect_status: BTreeSet<u16>,
}

impl Action {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: String,
        url: Url,
        method: HttpMethod,
        headers: BTreeMap<String, String>,
        body: Option<ActionBody>,
        timeout_ms: u64,
        expect_status: BTreeSet<u16>,
    ) -> Self {
        Self {
            id,
            url,
            method,
            headers,
            body,
            timeout_ms,
            expect_status,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Case-insensitive header presence check
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|key| key.eq_ignore_ascii_case(name))
    }

    pub fn body(&self) -> Option<&ActionBody> {
        self.body.as_ref()
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn expect_status(&self) -> &BTreeSet<u16> {
        &self.expect_status
    }

    /// Whether `status` satisfies this action's success contract
    pub fn expects(&self, status: u16) -> bool {
        self.expect_status.contains(&status)
    }
}

/// Validated group of actions sharing one correlation id
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    requested_for: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<serde_json::Value>,
    actions: Vec<Action>,
}

impl Batch {
    pub(crate) fn new(
        correlation_id: String,
        trace_id: Option<String>,
        requested_for: Option<DateTime<FixedOffset>>,
        metadata: Option<serde_json::Value>,
        actions: Vec<Action>,
    ) -> Self {
        debug_assert!(!actions.is_empty());
        Self {
            correlation_id,
            trace_id,
            requested_for,
            metadata,
            actions,
        }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn requested_for(&self) -> Option<DateTime<FixedOffset>> {
        self.requested_for
    }

    pub fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Number of actions; never zero
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Splits the batch for execution
    pub(crate) fn into_parts(self) -> (String, Option<String>, Vec<Action>) {
        (self.correlation_id, self.trace_id, self.actions)
    }
}

/// Outcome record for one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Id of the originating action
    pub id: String,
    pub ok: bool,
    /// Present only when a response was received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn success(id: impl Into<String>, status: u16) -> Self {
        Self {
            id: id.into(),
            ok: true,
            status: Some(status),
            error: None,
        }
    }

    pub fn failure(id: impl Into<String>, error: &ActionError) -> Self {
        Self {
            id: id.into(),
            ok: false,
            status: error.status(),
            error: Some(error.to_string()),
        }
    }
}
