//! Ticket models for the RT API.
//!
//! `Wire*` types mirror RT's field casing and are only ever deserialized.
//! The record types are what tools return.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    deserialize_optional_string_or_int, deserialize_optional_u64, null_as_default, ref_id, ref_ids,
    RtRef,
};

/// A search result row as RT returns it.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireTicketSummary {
    #[serde(default, deserialize_with = "deserialize_optional_u64")]
    pub id: Option<u64>,
    #[serde(rename = "Subject", default)]
    pub subject: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "Queue", default)]
    pub queue: Option<RtRef>,
    #[serde(rename = "Owner", default)]
    pub owner: Option<RtRef>,
    #[serde(rename = "Priority", default, deserialize_with = "deserialize_optional_string_or_int")]
    pub priority: Option<String>,
    #[serde(rename = "Created", default)]
    pub created: Option<String>,
}

/// One ticket in a search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketSummary {
    /// Ticket number.
    pub id: Option<u64>,
    /// Ticket subject.
    pub subject: Option<String>,
    /// Lifecycle status, e.g. `open` or `resolved`.
    pub status: Option<String>,
    /// Queue the ticket lives in.
    pub queue: Option<String>,
    /// Owning user, `Nobody` when unassigned.
    pub owner: Option<String>,
    /// Current priority as RT reports it.
    pub priority: Option<String>,
    /// Creation timestamp.
    pub created: Option<String>,
}

impl From<WireTicketSummary> for TicketSummary {
    fn from(wire: WireTicketSummary) -> Self {
        Self {
            queue: ref_id(&wire.queue),
            owner: ref_id(&wire.owner),
            id: wire.id,
            subject: wire.subject,
            status: wire.status,
            priority: wire.priority,
            created: wire.created,
        }
    }
}

/// Search output: totals plus the normalized rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketSearch {
    /// Matches RT reports overall.
    pub total: u64,
    /// Rows in this page.
    pub count: u64,
    /// Page size that was requested, after clamping.
    pub limit: u32,
    /// The matching tickets.
    pub tickets: Vec<TicketSummary>,
}

/// A custom field value block on a ticket.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireCustomField {
    #[serde(default, deserialize_with = "deserialize_optional_string_or_int")]
    pub id: Option<String>,
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<Value>,
}

/// A full ticket record as RT returns it.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireTicket {
    #[serde(default, deserialize_with = "deserialize_optional_u64")]
    pub id: Option<u64>,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    #[serde(rename = "Subject", default)]
    pub subject: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "Priority", default, deserialize_with = "deserialize_optional_string_or_int")]
    pub priority: Option<String>,
    #[serde(rename = "InitialPriority", default, deserialize_with = "deserialize_optional_string_or_int")]
    pub initial_priority: Option<String>,
    #[serde(rename = "FinalPriority", default, deserialize_with = "deserialize_optional_string_or_int")]
    pub final_priority: Option<String>,
    #[serde(rename = "Queue", default)]
    pub queue: Option<RtRef>,
    #[serde(rename = "Owner", default)]
    pub owner: Option<RtRef>,
    #[serde(rename = "Creator", default)]
    pub creator: Option<RtRef>,
    #[serde(rename = "Requestor", default, deserialize_with = "null_as_default")]
    pub requestors: Vec<RtRef>,
    #[serde(rename = "Cc", default, deserialize_with = "null_as_default")]
    pub cc: Vec<RtRef>,
    #[serde(rename = "AdminCc", default, deserialize_with = "null_as_default")]
    pub admin_cc: Vec<RtRef>,
    #[serde(rename = "Created", default)]
    pub created: Option<String>,
    #[serde(rename = "Starts", default)]
    pub starts: Option<String>,
    #[serde(rename = "Started", default)]
    pub started: Option<String>,
    #[serde(rename = "Due", default)]
    pub due: Option<String>,
    #[serde(rename = "Resolved", default)]
    pub resolved: Option<String>,
    #[serde(rename = "LastUpdated", default)]
    pub last_updated: Option<String>,
    #[serde(rename = "TimeEstimated", default, deserialize_with = "deserialize_optional_string_or_int")]
    pub time_estimated: Option<String>,
    #[serde(rename = "TimeWorked", default, deserialize_with = "deserialize_optional_string_or_int")]
    pub time_worked: Option<String>,
    #[serde(rename = "TimeLeft", default, deserialize_with = "deserialize_optional_string_or_int")]
    pub time_left: Option<String>,
    #[serde(rename = "CustomFields", default, deserialize_with = "null_as_default")]
    pub custom_fields: Vec<WireCustomField>,
}

/// Full details of one ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketDetail {
    /// Ticket number.
    pub id: Option<u64>,
    /// RT object type, normally `ticket`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Ticket subject.
    pub subject: Option<String>,
    /// Lifecycle status.
    pub status: Option<String>,
    /// Current priority.
    pub priority: Option<String>,
    /// Priority at creation.
    pub initial_priority: Option<String>,
    /// Priority the ticket escalates towards.
    pub final_priority: Option<String>,
    /// Queue the ticket lives in.
    pub queue: Option<String>,
    /// Owning user.
    pub owner: Option<String>,
    /// User who created the ticket.
    pub creator: Option<String>,
    /// Requestor addresses or user names.
    pub requestors: Vec<String>,
    /// Cc watchers.
    pub cc: Vec<String>,
    /// AdminCc watchers.
    pub admin_cc: Vec<String>,
    /// Creation timestamp.
    pub created: Option<String>,
    /// Scheduled start.
    pub starts: Option<String>,
    /// When work started.
    pub started: Option<String>,
    /// Due date.
    pub due: Option<String>,
    /// When the ticket was resolved.
    pub resolved: Option<String>,
    /// Last modification timestamp.
    pub last_updated: Option<String>,
    /// Estimated effort in minutes.
    pub time_estimated: Option<String>,
    /// Effort recorded so far in minutes.
    pub time_worked: Option<String>,
    /// Remaining effort in minutes.
    pub time_left: Option<String>,
    /// Custom field values keyed by field name (or id when unnamed).
    pub custom_fields: BTreeMap<String, Vec<Value>>,
}

impl From<WireTicket> for TicketDetail {
    fn from(wire: WireTicket) -> Self {
        let custom_fields = wire
            .custom_fields
            .into_iter()
            .filter_map(|cf| {
                let key = cf.name.or(cf.id)?;
                Some((key, cf.values))
            })
            .collect();

        Self {
            queue: ref_id(&wire.queue),
            owner: ref_id(&wire.owner),
            creator: ref_id(&wire.creator),
            requestors: ref_ids(&wire.requestors),
            cc: ref_ids(&wire.cc),
            admin_cc: ref_ids(&wire.admin_cc),
            id: wire.id,
            kind: wire.kind,
            subject: wire.subject,
            status: wire.status,
            priority: wire.priority,
            initial_priority: wire.initial_priority,
            final_priority: wire.final_priority,
            created: wire.created,
            starts: wire.starts,
            started: wire.started,
            due: wire.due,
            resolved: wire.resolved,
            last_updated: wire.last_updated,
            time_estimated: wire.time_estimated,
            time_worked: wire.time_worked,
            time_left: wire.time_left,
            custom_fields,
        }
    }
}

/// Result of a ticket write (create, update or comment).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteResult {
    /// `true` when RT accepted the write.
    pub success: bool,
    /// Ticket that was written, when known.
    pub ticket_id: Option<u64>,
    /// Summary of what happened.
    pub message: String,
    /// Per-field messages RT reported, when it reports any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<Vec<String>>,
}
