//! MCP server implementation for rt-mcp.
//!
//! This module defines the `RtServer` struct that implements the MCP
//! `ServerHandler` trait, exposing Request Tracker operations as tools.
//!
//! Every tool validates its input first; a violation is answered with a
//! JSON-RPC `invalid_params` error and the tool function never runs. Tool
//! results, including error records, are returned as a single text block of
//! pretty-printed JSON.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::Serialize;

use crate::rt_client::RtClient;
use crate::tools::{
    self, AddCommentInput, AttachmentInput, CreateTicketInput, GetUsersInput,
    SearchTicketsInput, TicketIdInput, ToolResponse, UpdateTicketInput, ValidateInput,
};

/// The rt-mcp server.
///
/// This server exposes Request Tracker operations as MCP tools. It is cheap
/// to clone; the HTTP transport builds one per session.
#[derive(Clone)]
pub struct RtServer {
    /// RT client for API operations.
    rt_client: RtClient,
    /// Tool router for MCP tool dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl RtServer {
    /// Creates a new server instance.
    ///
    /// # Arguments
    ///
    /// * `rt_client` - The RT client for API operations
    pub fn new(rt_client: RtClient) -> Self {
        Self {
            rt_client,
            tool_router: Self::tool_router(),
        }
    }

    // ========================================================================
    // Ticket tools
    // ========================================================================

    #[tool(
        description = "Search RT tickets using simple search text. Returns total, count, the effective limit and a summary (id, subject, status, queue, owner, priority, created) for each match.",
        annotations(title = "Search Tickets", read_only_hint = true)
    )]
    async fn search_tickets(
        &self,
        Parameters(input): Parameters<SearchTicketsInput>,
    ) -> Result<CallToolResult, McpError> {
        check(&input)?;
        tracing::debug!(query = %input.query, limit = input.limit, "search_tickets tool called");

        render(&tools::search_tickets(&self.rt_client, &input.query, input.limit).await)
    }

    #[tool(
        description = "Get full details of a single RT ticket: status, priorities, queue, owner, requestors, watchers, dates, time tracking and custom fields.",
        annotations(title = "Get Ticket", read_only_hint = true)
    )]
    async fn get_ticket(
        &self,
        Parameters(input): Parameters<TicketIdInput>,
    ) -> Result<CallToolResult, McpError> {
        check(&input)?;
        tracing::debug!(ticket_id = input.ticket_id, "get_ticket tool called");

        render(&tools::get_ticket(&self.rt_client, input.ticket_id).await)
    }

    #[tool(
        description = "Get the history (transactions) of an RT ticket in chronological order: comments, correspondence, status and field changes.",
        annotations(title = "Get Ticket History", read_only_hint = true)
    )]
    async fn get_ticket_history(
        &self,
        Parameters(input): Parameters<TicketIdInput>,
    ) -> Result<CallToolResult, McpError> {
        check(&input)?;
        tracing::debug!(ticket_id = input.ticket_id, "get_ticket_history tool called");

        render(&tools::get_ticket_history(&self.rt_client, input.ticket_id).await)
    }

    #[tool(
        description = "Create a new RT ticket. Subject and queue are required. Returns the new ticket ID.",
        annotations(title = "Create Ticket", read_only_hint = false)
    )]
    async fn create_ticket(
        &self,
        Parameters(input): Parameters<CreateTicketInput>,
    ) -> Result<CallToolResult, McpError> {
        check(&input)?;
        tracing::debug!(subject = %input.subject, queue = %input.queue, "create_ticket tool called");

        render(&tools::create_ticket(&self.rt_client, &input).await)
    }

    #[tool(
        description = "Update an RT ticket's subject, status, priority, owner or queue. Only the fields provided are changed; empty strings and priority 0 are ignored.",
        annotations(title = "Update Ticket", read_only_hint = false)
    )]
    async fn update_ticket(
        &self,
        Parameters(input): Parameters<UpdateTicketInput>,
    ) -> Result<CallToolResult, McpError> {
        check(&input)?;
        tracing::debug!(ticket_id = input.ticket_id, "update_ticket tool called");

        render(&tools::update_ticket(&self.rt_client, &input).await)
    }

    #[tool(
        description = "Add a message to an RT ticket. type 'comment' (default) records an internal note; 'correspond' sends a reply to the requestors.",
        annotations(title = "Add Comment", read_only_hint = false)
    )]
    async fn add_comment(
        &self,
        Parameters(input): Parameters<AddCommentInput>,
    ) -> Result<CallToolResult, McpError> {
        check(&input)?;
        tracing::debug!(
            ticket_id = input.ticket_id,
            kind = input.comment_type.endpoint(),
            "add_comment tool called"
        );

        render(&tools::add_comment(&self.rt_client, &input).await)
    }

    #[tool(
        description = "Get the relationships of an RT ticket: depends on, depended on by, refers to, referred to by, members and member of.",
        annotations(title = "Get Ticket Links", read_only_hint = true)
    )]
    async fn get_ticket_links(
        &self,
        Parameters(input): Parameters<TicketIdInput>,
    ) -> Result<CallToolResult, McpError> {
        check(&input)?;
        tracing::debug!(ticket_id = input.ticket_id, "get_ticket_links tool called");

        render(&tools::get_ticket_links(&self.rt_client, input.ticket_id).await)
    }

    // ========================================================================
    // Directory tools
    // ========================================================================

    #[tool(
        description = "List all RT queues with their IDs, names and descriptions.",
        annotations(title = "Get Queues", read_only_hint = true)
    )]
    async fn get_queues(&self) -> Result<CallToolResult, McpError> {
        tracing::debug!("get_queues tool called");

        render(&tools::get_queues(&self.rt_client).await)
    }

    #[tool(
        description = "List RT users (id, name, email, real name), optionally filtered by a free-text query.",
        annotations(title = "Get Users", read_only_hint = true)
    )]
    async fn get_users(
        &self,
        Parameters(input): Parameters<GetUsersInput>,
    ) -> Result<CallToolResult, McpError> {
        check(&input)?;
        tracing::debug!(query = ?input.query, "get_users tool called");

        render(&tools::get_users(&self.rt_client, input.query.as_deref()).await)
    }

    // ========================================================================
    // Attachment tools
    // ========================================================================

    #[tool(
        description = "List the attachments of an RT ticket with filename, content type, size, creator and transaction.",
        annotations(title = "Get Ticket Attachments", read_only_hint = true)
    )]
    async fn get_ticket_attachments(
        &self,
        Parameters(input): Parameters<TicketIdInput>,
    ) -> Result<CallToolResult, McpError> {
        check(&input)?;
        tracing::debug!(ticket_id = input.ticket_id, "get_ticket_attachments tool called");

        render(&tools::get_ticket_attachments(&self.rt_client, input.ticket_id).await)
    }

    #[tool(
        description = "Get metadata, headers and inline content of one attachment of an RT ticket.",
        annotations(title = "Get Attachment Details", read_only_hint = true)
    )]
    async fn get_attachment_details(
        &self,
        Parameters(input): Parameters<AttachmentInput>,
    ) -> Result<CallToolResult, McpError> {
        check(&input)?;
        tracing::debug!(
            ticket_id = input.ticket_id,
            attachment_id = input.attachment_id,
            "get_attachment_details tool called"
        );

        render(
            &tools::get_attachment_details(&self.rt_client, input.ticket_id, input.attachment_id)
                .await,
        )
    }

    #[tool(
        description = "Download the content of an RT ticket attachment. Returns filename, content type, size in bytes and the content encoded as base64.",
        annotations(title = "Download Attachment", read_only_hint = true)
    )]
    async fn download_attachment(
        &self,
        Parameters(input): Parameters<AttachmentInput>,
    ) -> Result<CallToolResult, McpError> {
        check(&input)?;
        tracing::debug!(
            ticket_id = input.ticket_id,
            attachment_id = input.attachment_id,
            "download_attachment tool called"
        );

        render(
            &tools::download_attachment(&self.rt_client, input.ticket_id, input.attachment_id)
                .await,
        )
    }
}

#[tool_handler]
impl ServerHandler for RtServer {
    /// Returns server information for the MCP initialize handshake.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "rt-mcp provides access to Request Tracker tickets. \
                 Use search_tickets to find tickets, get_ticket for details, \
                 get_ticket_history for the timeline and get_ticket_links for relationships. \
                 Create tickets with create_ticket, change them with update_ticket and \
                 reply or comment with add_comment. get_queues and get_users list valid \
                 queues and owners. Inspect files with get_ticket_attachments, \
                 get_attachment_details and download_attachment. \
                 Failed calls return a JSON object with an 'error' field."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Rejects input that violates its published constraints.
fn check<I: ValidateInput>(input: &I) -> Result<(), McpError> {
    input.validate().map_err(|e| {
        tracing::debug!(error = %e, "Rejected tool input");
        McpError::invalid_params(e.to_string(), None)
    })
}

/// Wraps a tool response, success or error record, in one pretty JSON text block.
fn render<T: Serialize>(response: &ToolResponse<T>) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(response)
        .map_err(|e| McpError::internal_error(format!("failed to encode tool result: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}
