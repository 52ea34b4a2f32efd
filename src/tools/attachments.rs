//! Attachment tools: listing, metadata and content download.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;

use super::{decode, respond, ToolResponse};
use crate::error::RtError;
use crate::models::{
    AttachmentDetails, AttachmentDownload, AttachmentList, AttachmentSummary, RtCollection,
    WireAttachment,
};
use crate::rt_client::RtClient;

const ATTACHMENT_FIELDS: &str = "Filename,ContentType,ContentLength,Created,Creator,TransactionId";

fn attachment_path(ticket_id: u64, attachment_id: u64) -> String {
    format!("/ticket/{}/attachments/{}", ticket_id, attachment_id)
}

/// Lists attachment metadata for a ticket.
pub async fn get_ticket_attachments(client: &RtClient, ticket_id: u64) -> ToolResponse<AttachmentList> {
    let result = fetch_attachments(client, ticket_id).await;
    respond(client, "get_ticket_attachments", result, &[("ticket_id", json!(ticket_id))])
}

async fn fetch_attachments(client: &RtClient, ticket_id: u64) -> Result<AttachmentList, RtError> {
    let endpoint = format!("/ticket/{}/attachments?fields={}", ticket_id, ATTACHMENT_FIELDS);
    let data = client.get(&endpoint).await?;
    let page: RtCollection<WireAttachment> = decode(data)?;

    Ok(AttachmentList {
        ticket_id,
        total: page.total(),
        count: page.count(),
        attachments: page.items.iter().map(AttachmentSummary::from).collect(),
    })
}

/// Fetches metadata, headers and inline content of one attachment.
pub async fn get_attachment_details(
    client: &RtClient,
    ticket_id: u64,
    attachment_id: u64,
) -> ToolResponse<AttachmentDetails> {
    let result = fetch_details(client, ticket_id, attachment_id).await;
    respond(
        client,
        "get_attachment_details",
        result,
        &[("ticket_id", json!(ticket_id)), ("attachment_id", json!(attachment_id))],
    )
}

async fn fetch_details(
    client: &RtClient,
    ticket_id: u64,
    attachment_id: u64,
) -> Result<AttachmentDetails, RtError> {
    let data = client.get(&attachment_path(ticket_id, attachment_id)).await?;
    let wire: WireAttachment = decode(data)?;
    Ok(AttachmentDetails::from_wire(ticket_id, wire))
}

/// Downloads attachment content as base64.
///
/// Makes two calls: the raw content, then the metadata for filename and
/// content type. A metadata failure leaves both as `null` instead of failing
/// the download.
pub async fn download_attachment(
    client: &RtClient,
    ticket_id: u64,
    attachment_id: u64,
) -> ToolResponse<AttachmentDownload> {
    let result = fetch_content(client, ticket_id, attachment_id).await;
    respond(
        client,
        "download_attachment",
        result,
        &[("ticket_id", json!(ticket_id)), ("attachment_id", json!(attachment_id))],
    )
}

async fn fetch_content(
    client: &RtClient,
    ticket_id: u64,
    attachment_id: u64,
) -> Result<AttachmentDownload, RtError> {
    let path = attachment_path(ticket_id, attachment_id);
    let bytes = client.get_bytes(&format!("{}/content", path)).await?;

    let meta = match client.get(&path).await.and_then(decode::<WireAttachment>) {
        Ok(wire) => Some(wire),
        Err(e) => {
            tracing::warn!(
                ticket_id,
                attachment_id,
                error = %client.sanitize(&e),
                "Attachment metadata unavailable"
            );
            None
        }
    };

    tracing::debug!(ticket_id, attachment_id, size = bytes.len(), "Attachment downloaded");

    Ok(AttachmentDownload {
        ticket_id,
        attachment_id,
        filename: meta.as_ref().and_then(|m| m.filename.clone()),
        content_type: meta.and_then(|m| m.content_type),
        size: bytes.len(),
        content_base64: STANDARD.encode(&bytes),
    })
}
