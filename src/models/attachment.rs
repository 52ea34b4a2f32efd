//! Attachment models for the RT API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{deserialize_optional_u64, ref_id, RtRef};

/// Attachment metadata as RT returns it.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireAttachment {
    #[serde(default, deserialize_with = "deserialize_optional_u64")]
    pub id: Option<u64>,
    #[serde(rename = "Filename", default)]
    pub filename: Option<String>,
    #[serde(rename = "ContentType", default)]
    pub content_type: Option<String>,
    #[serde(rename = "ContentLength", default, deserialize_with = "deserialize_optional_u64")]
    pub content_length: Option<u64>,
    #[serde(rename = "Created", default)]
    pub created: Option<String>,
    #[serde(rename = "Creator", default)]
    pub creator: Option<RtRef>,
    #[serde(rename = "TransactionId", default)]
    pub transaction_id: Option<RtRef>,
    #[serde(rename = "Headers", default)]
    pub headers: Option<Value>,
    #[serde(rename = "Content", default)]
    pub content: Option<String>,
}

/// Metadata for one attachment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentSummary {
    /// Attachment id.
    pub id: Option<u64>,
    /// Original file name, if any.
    pub filename: Option<String>,
    /// MIME type.
    pub content_type: Option<String>,
    /// Size in bytes as reported by RT.
    pub size: Option<u64>,
    /// Upload timestamp.
    pub created: Option<String>,
    /// User who uploaded it.
    pub creator: Option<String>,
    /// Transaction that recorded it.
    pub transaction_id: Option<String>,
}

impl From<&WireAttachment> for AttachmentSummary {
    fn from(wire: &WireAttachment) -> Self {
        Self {
            id: wire.id,
            filename: wire.filename.clone(),
            content_type: wire.content_type.clone(),
            size: wire.content_length,
            created: wire.created.clone(),
            creator: ref_id(&wire.creator),
            transaction_id: ref_id(&wire.transaction_id),
        }
    }
}

/// Attachment listing output for one ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentList {
    /// Ticket the attachments belong to.
    pub ticket_id: u64,
    /// Attachments RT reports overall.
    pub total: u64,
    /// Attachments in this page.
    pub count: u64,
    /// Attachment metadata.
    pub attachments: Vec<AttachmentSummary>,
}

/// Full metadata plus headers and inline content for one attachment.
///
/// `content` is passed through as RT provides it and is not decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentDetails {
    /// Common attachment metadata.
    #[serde(flatten)]
    pub summary: AttachmentSummary,
    /// Ticket the attachment belongs to.
    pub ticket_id: u64,
    /// MIME headers, `null` when RT sends none.
    pub headers: Value,
    /// Inline content exactly as RT sent it.
    pub content: Option<String>,
}

impl AttachmentDetails {
    /// Builds the detail record for an attachment of `ticket_id`.
    pub(crate) fn from_wire(ticket_id: u64, wire: WireAttachment) -> Self {
        Self {
            summary: AttachmentSummary::from(&wire),
            ticket_id,
            headers: wire.headers.unwrap_or(Value::Null),
            content: wire.content,
        }
    }
}

/// Binary attachment content re-expressed as base64.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentDownload {
    /// Ticket the attachment belongs to.
    pub ticket_id: u64,
    /// Attachment id.
    pub attachment_id: u64,
    /// Original file name; `null` when metadata was unavailable.
    pub filename: Option<String>,
    /// MIME type; `null` when metadata was unavailable.
    pub content_type: Option<String>,
    /// Number of bytes in the decoded content.
    pub size: usize,
    /// Content, standard base64 with padding.
    pub content_base64: String,
}
