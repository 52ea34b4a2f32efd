//! MCP tool implementations for rt-mcp.
//!
//! This module contains the input types and the tool functions that expose
//! Request Tracker operations. Each tool function takes an [`RtClient`] plus
//! typed arguments and returns a [`ToolResponse`]: the normalized record on
//! success, or an [`ErrorRecord`] describing the failure. Tool functions never
//! return `Err`; every failure is reported as data.

mod attachments;
mod directory;
mod inputs;
mod tickets;

pub use attachments::*;
pub use directory::*;
pub use inputs::*;
pub use tickets::*;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::RtError;
use crate::rt_client::RtClient;

/// Outcome of a tool function.
///
/// Serializes as either the record itself or the error record, without a
/// wrapping tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResponse<T> {
    /// The normalized record.
    Ok(T),
    /// A failure reported as data.
    Err(ErrorRecord),
}

impl<T> ToolResponse<T> {
    /// Returns `true` for an error record.
    pub fn is_error(&self) -> bool {
        matches!(self, ToolResponse::Err(_))
    }

    /// Converts into a `Result`, mostly for callers that want `?`.
    pub fn into_result(self) -> Result<T, ErrorRecord> {
        match self {
            ToolResponse::Ok(value) => Ok(value),
            ToolResponse::Err(record) => Err(record),
        }
    }
}

/// `{error, data?, ...identifying fields}` returned when a tool fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    /// Redacted failure message.
    pub error: String,

    /// Raw RT payload, only for unexpected response shapes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Identifying fields of the failed call (`ticket_id`, `query`, ...).
    #[serde(flatten)]
    pub context: Map<String, Value>,
}

impl ErrorRecord {
    /// Builds an error record from a client error, redacting the token.
    pub fn from_error(client: &RtClient, error: &RtError) -> Self {
        let data = match error {
            RtError::UnexpectedFormat { data } => Some(data.clone()),
            _ => None,
        };

        Self {
            error: client.sanitize(error),
            data,
            context: Map::new(),
        }
    }

    /// Adds an identifying field.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }
}

/// Converts a tool body's result into a response, logging failures.
///
/// Unexpected-format errors are reported without identifying fields so the
/// record is exactly `{error, data}`.
fn respond<T>(
    client: &RtClient,
    tool: &str,
    result: Result<T, RtError>,
    context: &[(&str, Value)],
) -> ToolResponse<T> {
    match result {
        Ok(value) => ToolResponse::Ok(value),
        Err(e) => {
            let mut record = ErrorRecord::from_error(client, &e);
            tracing::warn!(tool, error = %record.error, "Tool call failed");
            if record.data.is_none() {
                for (key, value) in context {
                    record = record.with(key, value.clone());
                }
            }
            ToolResponse::Err(record)
        }
    }
}

/// Requires RT's answer to be a JSON object.
fn expect_object(data: Value) -> Result<Map<String, Value>, RtError> {
    match data {
        Value::Object(map) => Ok(map),
        other => Err(RtError::unexpected_format(other)),
    }
}

/// Decodes a JSON object into a wire type.
fn decode<W: DeserializeOwned>(data: Value) -> Result<W, RtError> {
    let map = expect_object(data)?;
    serde_json::from_value(Value::Object(map)).map_err(RtError::from)
}

/// Collects the per-field messages RT answers writes with.
///
/// RT replies with an array of strings; an object or empty body means no
/// messages. Any other shape is unexpected.
fn change_messages(data: Value) -> Result<Vec<String>, RtError> {
    match data {
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect()),
        Value::Object(_) | Value::Null => Ok(Vec::new()),
        other => Err(RtError::unexpected_format(other)),
    }
}
