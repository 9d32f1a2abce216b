//! Batch schema validation and normalization
//!
//! Turns an untyped JSON payload into a fully defaulted [`Batch`], or reports every offending
//! field at once. Nothing here touches the network.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use reqwest::header::{HeaderName, HeaderValue};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use url::Url;
use uuid::Uuid;

use super::errors::{FieldError, ValidationError};
use super::types::{Action, ActionBody, Batch, HttpMethod};
use crate::config::validation::check_public_target;
use crate::config::{DispatcherConfig, MAX_TIMEOUT_MS};

/// Parses raw payloads into [`Batch`] values using configured defaults
#[derive(Debug, Clone)]
pub struct BatchValidator {
    default_timeout_ms: u64,
    default_expect_status: BTreeSet<u16>,
    block_private_targets: bool,
}

impl Default for BatchValidator {
    fn default() -> Self {
        Self::new(&DispatcherConfig::default())
    }
}

impl BatchValidator {
    pub fn new(config: &DispatcherConfig) -> Self {
        Self {
            default_timeout_ms: config.default_timeout_ms,
            default_expect_status: config.expect_status_set(),
            block_private_targets: config.block_private_targets,
        }
    }

    /// Parse and validate a JSON byte payload
    pub fn validate_slice(&self, payload: &[u8]) -> Result<Batch, ValidationError> {
        let raw: Value = serde_json::from_slice(payload)
            .map_err(|e| ValidationError::single("$", format!("invalid JSON: {}", e)))?;
        self.validate(&raw)
    }

    /// Validate an untyped payload
    ///
    /// All-or-nothing: either every field is valid and defaulted, or the error lists every
    /// offending field.
    pub fn validate(&self, raw: &Value) -> Result<Batch, ValidationError> {
        let Some(object) = raw.as_object() else {
            return Err(ValidationError::single("$", "batch must be a JSON object"));
        };

        let mut errors = Vec::new();

        let correlation_id = match object.get("correlationId") {
            None | Some(Value::Null) => Uuid::new_v4().to_string(),
            Some(Value::String(id)) if id.trim().is_empty() => Uuid::new_v4().to_string(),
            Some(Value::String(id)) => id.clone(),
            Some(_) => {
                errors.push(FieldError::new("correlationId", "must be a string"));
                String::new()
            }
        };

        let trace_id = optional_string(object, "traceId", "traceId", &mut errors);

        let requested_for = match object.get("requestedFor") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => match parse_timestamp(text) {
                Some(timestamp) => Some(timestamp),
                None => {
                    errors.push(FieldError::new(
                        "requestedFor",
                        "must be an ISO-8601 timestamp",
                    ));
                    None
                }
            },
            Some(_) => {
                errors.push(FieldError::new(
                    "requestedFor",
                    "must be an ISO-8601 timestamp string",
                ));
                None
            }
        };

        let metadata = object.get("metadata").filter(|value| !value.is_null()).cloned();

        let actions = match object.get("actions") {
            None | Some(Value::Null) => {
                errors.push(FieldError::new("actions", "is required"));
                Vec::new()
            }
            Some(Value::Array(items)) if items.is_empty() => {
                errors.push(FieldError::new(
                    "actions",
                    "must contain at least one action",
                ));
                Vec::new()
            }
            Some(Value::Array(items)) => self.validate_actions(items, &mut errors),
            Some(_) => {
                errors.push(FieldError::new("actions", "must be an array"));
                Vec::new()
            }
        };

        if !errors.is_empty() {
            return Err(ValidationError::new(errors));
        }

        Ok(Batch::new(
            correlation_id,
            trace_id,
            requested_for,
            metadata,
            actions,
        ))
    }

    fn validate_actions(&self, items: &[Value], errors: &mut Vec<FieldError>) -> Vec<Action> {
        let mut seen = HashSet::new();
        let mut actions = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let prefix = format!("actions[{}]", index);
            if let Some(action) = self.validate_action(&prefix, item, errors) {
                if !seen.insert(action.id().to_string()) {
                    errors.push(FieldError::new(
                        format!("{}.id", prefix),
                        format!("duplicate action id '{}'", action.id()),
                    ));
                }
                actions.push(action);
            }
        }

        actions
    }

    fn validate_action(
        &self,
        prefix: &str,
        raw: &Value,
        errors: &mut Vec<FieldError>,
    ) -> Option<Action> {
        let Some(object) = raw.as_object() else {
            errors.push(FieldError::new(prefix, "must be a JSON object"));
            return None;
        };

        let field = |name: &str| format!("{}.{}", prefix, name);
        let before = errors.len();

        let id = match object.get("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => Some(id.clone()),
            Some(Value::String(_)) => {
                errors.push(FieldError::new(field("id"), "cannot be empty"));
                None
            }
            None | Some(Value::Null) => {
                errors.push(FieldError::new(field("id"), "is required"));
                None
            }
            Some(_) => {
                errors.push(FieldError::new(field("id"), "must be a string"));
                None
            }
        };

        let (url_key, url_value) = match (object.get("url"), object.get("targetUrl")) {
            (Some(value), _) if !value.is_null() => ("url", Some(value)),
            (_, Some(value)) if !value.is_null() => ("targetUrl", Some(value)),
            _ => ("url", None),
        };
        let url = match url_value {
            None => {
                errors.push(FieldError::new(field(url_key), "is required"));
                None
            }
            Some(Value::String(text)) => match self.parse_target(text) {
                Ok(url) => Some(url),
                Err(message) => {
                    errors.push(FieldError::new(field(url_key), message));
                    None
                }
            },
            Some(_) => {
                errors.push(FieldError::new(field(url_key), "must be a string"));
                None
            }
        };

        let method = match object.get("method") {
            None | Some(Value::Null) => HttpMethod::default(),
            Some(Value::String(text)) => text.parse::<HttpMethod>().unwrap_or_else(|_| {
                errors.push(FieldError::new(
                    field("method"),
                    format!(
                        "must be one of {}",
                        HttpMethod::ALL.map(|m| m.as_str()).join(", ")
                    ),
                ));
                HttpMethod::default()
            }),
            Some(_) => {
                errors.push(FieldError::new(field("method"), "must be a string"));
                HttpMethod::default()
            }
        };

        let headers = match object.get("headers") {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(Value::Object(entries)) => validate_headers(&field("headers"), entries, errors),
            Some(_) => {
                errors.push(FieldError::new(
                    field("headers"),
                    "must be an object of string values",
                ));
                BTreeMap::new()
            }
        };

        let body = match object.get("body") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(ActionBody::Raw(text.clone())),
            Some(document) => Some(ActionBody::Structured(document.clone())),
        };

        let timeout_ms = match object.get("timeoutMs") {
            None | Some(Value::Null) => self.default_timeout_ms,
            Some(value) => match value.as_u64() {
                Some(ms) if (1..=MAX_TIMEOUT_MS).contains(&ms) => ms,
                _ => {
                    errors.push(FieldError::new(
                        field("timeoutMs"),
                        format!("must be an integer between 1 and {}", MAX_TIMEOUT_MS),
                    ));
                    self.default_timeout_ms
                }
            },
        };

        let expect_status = match object.get("expectStatus") {
            None | Some(Value::Null) => self.default_expect_status.clone(),
            Some(Value::Array(items)) if items.is_empty() => {
                errors.push(FieldError::new(field("expectStatus"), "cannot be empty"));
                BTreeSet::new()
            }
            Some(Value::Array(items)) => {
                let mut statuses = BTreeSet::new();
                for (i, item) in items.iter().enumerate() {
                    match item.as_u64().filter(|status| (100..=599).contains(status)) {
                        Some(status) => {
                            statuses.insert(status as u16);
                        }
                        None => errors.push(FieldError::new(
                            format!("{}[{}]", field("expectStatus"), i),
                            "must be an HTTP status between 100 and 599",
                        )),
                    }
                }
                statuses
            }
            Some(_) => {
                errors.push(FieldError::new(
                    field("expectStatus"),
                    "must be an array of HTTP statuses",
                ));
                BTreeSet::new()
            }
        };

        if errors.len() > before {
            return None;
        }

        Some(Action::new(
            id?,
            url?,
            method,
            headers,
            body,
            timeout_ms,
            expect_status,
        ))
    }

    fn parse_target(&self, text: &str) -> Result<Url, String> {
        let url = Url::parse(text.trim()).map_err(|e| format!("invalid absolute URL: {}", e))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(format!("must use http or https, got '{}'", scheme)),
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err("must include a host".to_string());
        }

        if self.block_private_targets {
            check_public_target(&url)?;
        }

        Ok(url)
    }
}

fn optional_string(
    object: &Map<String, Value>,
    key: &str,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match object.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            errors.push(FieldError::new(field, "must be a string"));
            None
        }
    }
}

fn validate_headers(
    field: &str,
    entries: &Map<String, Value>,
    errors: &mut Vec<FieldError>,
) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    let mut seen = HashSet::new();

    for (name, value) in entries {
        let path = format!("{}.{}", field, name);

        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(FieldError::new(path, "is not a valid header name"));
            continue;
        }
        // Header names are case-insensitive on the wire
        if !seen.insert(name.to_ascii_lowercase()) {
            errors.push(FieldError::new(
                path,
                "duplicates another header name (names are case-insensitive)",
            ));
            continue;
        }

        match value {
            Value::String(text) if HeaderValue::from_str(text).is_ok() => {
                headers.insert(name.clone(), text.clone());
            }
            Value::String(_) => errors.push(FieldError::new(path, "is not a valid header value")),
            _ => errors.push(FieldError::new(path, "must be a string")),
        }
    }

    headers
}

/// RFC 3339, or a naive ISO-8601 date-time or bare date read as UTC
fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed);
    }

    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}
