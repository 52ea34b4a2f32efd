//! Ticket tools: search, read, history, links and the write operations.

use serde_json::{json, Map, Value};

use super::{
    change_messages, decode, respond, AddCommentInput, CommentType, CreateTicketInput,
    ToolResponse, UpdateTicketInput, MAX_SEARCH_LIMIT, MIN_SEARCH_LIMIT,
};
use crate::error::RtError;
use crate::models::{
    deserialize_optional_u64, RtCollection, TicketDetail, TicketHistory, TicketLinks,
    TicketSearch, WireLinks, WireTicket, WireTicketSummary, WireTransaction, WriteResult,
};
use crate::rt_client::RtClient;

/// Fields requested for each search result row.
const SEARCH_FIELDS: &str = "Subject,Status,Queue,Owner,Priority,Created";

/// Fields requested for each history entry.
const HISTORY_FIELDS: &str = "Type,Creator,Created,Description,Data,Field,OldValue,NewValue";

/// History page size.
const HISTORY_PER_PAGE: u32 = 100;

/// Plain text content type for message bodies.
const TEXT_PLAIN: &str = "text/plain";

/// Clamps a requested search limit into the accepted range.
pub fn clamp_limit(limit: i64) -> u32 {
    limit.clamp(MIN_SEARCH_LIMIT, MAX_SEARCH_LIMIT) as u32
}

fn search_endpoint(query: &str, limit: u32) -> String {
    format!(
        "/tickets?simple=1;query={};per_page={};fields={}",
        urlencoding::encode(query),
        limit,
        SEARCH_FIELDS
    )
}

/// Searches tickets with RT simple search.
pub async fn search_tickets(client: &RtClient, query: &str, limit: i64) -> ToolResponse<TicketSearch> {
    let result = fetch_search(client, query, clamp_limit(limit)).await;
    respond(client, "search_tickets", result, &[("query", json!(query))])
}

async fn fetch_search(client: &RtClient, query: &str, limit: u32) -> Result<TicketSearch, RtError> {
    let data = client.get(&search_endpoint(query, limit)).await?;
    let page: RtCollection<WireTicketSummary> = decode(data)?;

    Ok(TicketSearch {
        total: page.total(),
        count: page.count(),
        limit,
        tickets: page.items.into_iter().map(Into::into).collect(),
    })
}

/// Fetches the full record of one ticket.
pub async fn get_ticket(client: &RtClient, ticket_id: u64) -> ToolResponse<TicketDetail> {
    let result = fetch_ticket(client, ticket_id).await;
    respond(client, "get_ticket", result, &[("ticket_id", json!(ticket_id))])
}

async fn fetch_ticket(client: &RtClient, ticket_id: u64) -> Result<TicketDetail, RtError> {
    let data = client.get(&format!("/ticket/{}", ticket_id)).await?;
    let wire: WireTicket = decode(data)?;
    Ok(TicketDetail::from(wire))
}

/// Fetches the transaction history of one ticket, in RT's order.
pub async fn get_ticket_history(client: &RtClient, ticket_id: u64) -> ToolResponse<TicketHistory> {
    let result = fetch_history(client, ticket_id).await;
    respond(client, "get_ticket_history", result, &[("ticket_id", json!(ticket_id))])
}

async fn fetch_history(client: &RtClient, ticket_id: u64) -> Result<TicketHistory, RtError> {
    let endpoint = format!(
        "/ticket/{}/history?per_page={};fields={}",
        ticket_id, HISTORY_PER_PAGE, HISTORY_FIELDS
    );
    let data = client.get(&endpoint).await?;
    let page: RtCollection<WireTransaction> = decode(data)?;

    Ok(TicketHistory {
        ticket_id,
        total: page.total(),
        count: page.count(),
        history: page.items.into_iter().map(Into::into).collect(),
    })
}

/// Fetches the relationships of one ticket.
pub async fn get_ticket_links(client: &RtClient, ticket_id: u64) -> ToolResponse<TicketLinks> {
    let result = fetch_links(client, ticket_id).await;
    respond(client, "get_ticket_links", result, &[("ticket_id", json!(ticket_id))])
}

async fn fetch_links(client: &RtClient, ticket_id: u64) -> Result<TicketLinks, RtError> {
    let data = client.get(&format!("/ticket/{}/links", ticket_id)).await?;
    let wire: WireLinks = decode(data)?;
    Ok(TicketLinks::from_wire(ticket_id, &wire))
}

/// Inserts a string field unless it is empty.
fn put_str(payload: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        payload.insert(key.to_string(), json!(v));
    }
}

/// Inserts a priority unless it is zero.
fn put_priority(payload: &mut Map<String, Value>, value: Option<u32>) {
    if let Some(p) = value.filter(|p| *p != 0) {
        payload.insert("Priority".to_string(), json!(p));
    }
}

/// Builds the RT body for a new ticket.
///
/// Absent optional fields are omitted, never sent as null. Empty strings and
/// priority 0 count as absent.
pub fn create_payload(input: &CreateTicketInput) -> Value {
    let mut payload = Map::new();
    payload.insert("Subject".to_string(), json!(input.subject));
    payload.insert("Queue".to_string(), json!(input.queue));

    put_str(&mut payload, "Requestor", input.requestor.as_deref());
    if let Some(cc) = &input.cc {
        payload.insert("Cc".to_string(), json!(cc));
    }
    put_str(&mut payload, "Content", input.content.as_deref());
    if payload.contains_key("Content") {
        payload.insert("ContentType".to_string(), json!(TEXT_PLAIN));
    }
    put_priority(&mut payload, input.priority);
    put_str(&mut payload, "Status", input.status.as_deref());

    Value::Object(payload)
}

/// Builds the RT body for a ticket update.
///
/// Same omission rule as [`create_payload`]: a field cannot be cleared to an
/// empty string and priority cannot be set to 0.
pub fn update_payload(input: &UpdateTicketInput) -> Value {
    let mut payload = Map::new();
    put_str(&mut payload, "Subject", input.subject.as_deref());
    put_str(&mut payload, "Status", input.status.as_deref());
    put_priority(&mut payload, input.priority);
    put_str(&mut payload, "Owner", input.owner.as_deref());
    put_str(&mut payload, "Queue", input.queue.as_deref());
    Value::Object(payload)
}

#[derive(serde::Deserialize)]
struct CreatedTicket {
    #[serde(default, deserialize_with = "deserialize_optional_u64")]
    id: Option<u64>,
}

/// Creates a ticket.
pub async fn create_ticket(client: &RtClient, input: &CreateTicketInput) -> ToolResponse<WriteResult> {
    let result = post_ticket(client, input).await;
    respond(
        client,
        "create_ticket",
        result,
        &[("subject", json!(input.subject)), ("queue", json!(input.queue))],
    )
}

async fn post_ticket(client: &RtClient, input: &CreateTicketInput) -> Result<WriteResult, RtError> {
    let data = client.post("/ticket", &create_payload(input)).await?;
    let created: CreatedTicket = decode(data.clone())?;
    let id = created.id.ok_or_else(|| RtError::unexpected_format(data))?;

    tracing::info!(ticket_id = id, "Ticket created");

    Ok(WriteResult {
        success: true,
        ticket_id: Some(id),
        message: format!("Ticket {} created successfully", id),
        changes: None,
    })
}

/// Updates fields of a ticket.
pub async fn update_ticket(client: &RtClient, input: &UpdateTicketInput) -> ToolResponse<WriteResult> {
    let result = put_ticket(client, input).await;
    respond(client, "update_ticket", result, &[("ticket_id", json!(input.ticket_id))])
}

async fn put_ticket(client: &RtClient, input: &UpdateTicketInput) -> Result<WriteResult, RtError> {
    let ticket_id = input.ticket_id;
    let data = client
        .put(&format!("/ticket/{}", ticket_id), &update_payload(input))
        .await?;
    let changes = change_messages(data)?;

    tracing::info!(ticket_id, changes = changes.len(), "Ticket updated");

    Ok(WriteResult {
        success: true,
        ticket_id: Some(ticket_id),
        message: format!("Ticket {} updated successfully", ticket_id),
        changes: Some(changes),
    })
}

/// Adds a comment or correspondence to a ticket.
pub async fn add_comment(client: &RtClient, input: &AddCommentInput) -> ToolResponse<WriteResult> {
    let result = post_comment(client, input).await;
    respond(
        client,
        "add_comment",
        result,
        &[
            ("ticket_id", json!(input.ticket_id)),
            ("type", json!(input.comment_type.endpoint())),
        ],
    )
}

async fn post_comment(client: &RtClient, input: &AddCommentInput) -> Result<WriteResult, RtError> {
    let kind: CommentType = input.comment_type;
    let body = json!({
        "Content": input.content,
        "ContentType": TEXT_PLAIN,
    });
    let data = client
        .post(&format!("/ticket/{}/{}", input.ticket_id, kind.endpoint()), &body)
        .await?;
    let changes = change_messages(data)?;

    Ok(WriteResult {
        success: true,
        ticket_id: Some(input.ticket_id),
        message: kind.success_message().to_string(),
        changes: Some(changes),
    })
}
