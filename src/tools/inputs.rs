//! Tool input parameter structs for MCP tools.
//!
//! This module defines the input types for each MCP tool, with
//! JSON Schema derivation for MCP tool discovery.
//!
//! # Validation
//!
//! The schema constraints (ranges, minimum lengths) are published to
//! clients and enforced by [`ValidateInput::validate`], which the server
//! calls before any tool function runs.

use rmcp::schemars::{self, JsonSchema};
use serde::Deserialize;

use crate::error::RtError;

/// Default number of search results.
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;

/// Smallest accepted search limit.
pub const MIN_SEARCH_LIMIT: i64 = 1;

/// Largest accepted search limit.
pub const MAX_SEARCH_LIMIT: i64 = 100;

/// Minimum length of a search query.
pub const MIN_QUERY_LEN: usize = 5;

/// Highest priority RT accepts from tools.
pub const MAX_PRIORITY: u32 = 100;

fn default_search_limit() -> i64 {
    DEFAULT_SEARCH_LIMIT
}

/// Input constraints checked before a tool executes.
pub trait ValidateInput {
    /// Returns a validation error describing the first violated constraint.
    fn validate(&self) -> Result<(), RtError>;
}

fn require_positive(value: u64, field: &str) -> Result<(), RtError> {
    if value == 0 {
        return Err(RtError::validation(format!("{} must be a positive integer", field)));
    }
    Ok(())
}

fn require_min_len(value: &str, min: usize, field: &str) -> Result<(), RtError> {
    if value.chars().count() < min {
        return Err(RtError::validation(format!(
            "{} must be at least {} character(s) long",
            field, min
        )));
    }
    Ok(())
}

fn require_priority(priority: Option<u32>) -> Result<(), RtError> {
    match priority {
        Some(p) if p > MAX_PRIORITY => Err(RtError::validation(format!(
            "priority must be between 0 and {}, got {}",
            MAX_PRIORITY, p
        ))),
        _ => Ok(()),
    }
}

/// Input parameters for the search_tickets tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchTicketsInput {
    /// Simple search text (RT "simple search" syntax), at least 5 characters.
    #[schemars(length(min = 5))]
    pub query: String,

    /// Maximum number of tickets to return (default: 20, max: 100).
    #[serde(default = "default_search_limit")]
    #[schemars(range(min = 1, max = 100))]
    pub limit: i64,
}

impl ValidateInput for SearchTicketsInput {
    fn validate(&self) -> Result<(), RtError> {
        require_min_len(&self.query, MIN_QUERY_LEN, "query")?;
        if !(MIN_SEARCH_LIMIT..=MAX_SEARCH_LIMIT).contains(&self.limit) {
            return Err(RtError::validation(format!(
                "limit must be between {} and {}, got {}",
                MIN_SEARCH_LIMIT, MAX_SEARCH_LIMIT, self.limit
            )));
        }
        Ok(())
    }
}

/// Input for tools that address a single ticket.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TicketIdInput {
    /// The numeric ID of the ticket.
    #[schemars(range(min = 1))]
    pub ticket_id: u64,
}

impl ValidateInput for TicketIdInput {
    fn validate(&self) -> Result<(), RtError> {
        require_positive(self.ticket_id, "ticket_id")
    }
}

/// Input for tools that address one attachment of a ticket.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AttachmentInput {
    /// The numeric ID of the ticket.
    #[schemars(range(min = 1))]
    pub ticket_id: u64,

    /// The numeric ID of the attachment (see get_ticket_attachments).
    #[schemars(range(min = 1))]
    pub attachment_id: u64,
}

impl ValidateInput for AttachmentInput {
    fn validate(&self) -> Result<(), RtError> {
        require_positive(self.ticket_id, "ticket_id")?;
        require_positive(self.attachment_id, "attachment_id")
    }
}

/// Input parameters for the create_ticket tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateTicketInput {
    /// Ticket subject (required, non-empty).
    #[schemars(length(min = 1))]
    pub subject: String,

    /// Queue name or ID to create the ticket in.
    pub queue: String,

    /// Email address or username of the requestor.
    #[serde(default)]
    pub requestor: Option<String>,

    /// Email addresses to add as Cc watchers.
    #[serde(default)]
    pub cc: Option<Vec<String>>,

    /// Initial message body (plain text).
    #[serde(default)]
    pub content: Option<String>,

    /// Priority from 0 to 100.
    #[serde(default)]
    #[schemars(range(min = 0, max = 100))]
    pub priority: Option<u32>,

    /// Initial status (e.g., 'new', 'open').
    #[serde(default)]
    pub status: Option<String>,
}

impl ValidateInput for CreateTicketInput {
    fn validate(&self) -> Result<(), RtError> {
        require_min_len(&self.subject, 1, "subject")?;
        require_priority(self.priority)
    }
}

/// Input parameters for the update_ticket tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateTicketInput {
    /// The numeric ID of the ticket to update.
    #[schemars(range(min = 1))]
    pub ticket_id: u64,

    /// New subject.
    #[serde(default)]
    pub subject: Option<String>,

    /// New status (e.g., 'open', 'stalled', 'resolved').
    #[serde(default)]
    pub status: Option<String>,

    /// New priority from 0 to 100.
    #[serde(default)]
    #[schemars(range(min = 0, max = 100))]
    pub priority: Option<u32>,

    /// Username of the new owner.
    #[serde(default)]
    pub owner: Option<String>,

    /// Queue name or ID to move the ticket to.
    #[serde(default)]
    pub queue: Option<String>,
}

impl ValidateInput for UpdateTicketInput {
    fn validate(&self) -> Result<(), RtError> {
        require_positive(self.ticket_id, "ticket_id")?;
        require_priority(self.priority)
    }
}

/// Which kind of message add_comment records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CommentType {
    /// Internal comment, not sent to requestors.
    #[default]
    Comment,
    /// Correspondence, sent to requestors.
    Correspond,
}

impl CommentType {
    /// The RT sub-endpoint for this kind of message.
    pub fn endpoint(self) -> &'static str {
        match self {
            CommentType::Comment => "comment",
            CommentType::Correspond => "correspond",
        }
    }

    /// Confirmation message reported on success.
    pub fn success_message(self) -> &'static str {
        match self {
            CommentType::Comment => "Comment added successfully",
            CommentType::Correspond => "Correspondence added successfully",
        }
    }
}

/// Input parameters for the add_comment tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddCommentInput {
    /// The numeric ID of the ticket.
    #[schemars(range(min = 1))]
    pub ticket_id: u64,

    /// Message body (plain text, non-empty).
    #[schemars(length(min = 1))]
    pub content: String,

    /// 'comment' for an internal note (default) or 'correspond' to reply to requestors.
    #[serde(default, rename = "type")]
    pub comment_type: CommentType,
}

impl ValidateInput for AddCommentInput {
    fn validate(&self) -> Result<(), RtError> {
        require_positive(self.ticket_id, "ticket_id")?;
        require_min_len(&self.content, 1, "content")
    }
}

/// Input parameters for the get_users tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GetUsersInput {
    /// Optional free-text filter passed to RT.
    #[serde(default)]
    pub query: Option<String>,
}

impl ValidateInput for GetUsersInput {
    fn validate(&self) -> Result<(), RtError> {
        Ok(())
    }
}
