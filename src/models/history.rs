//! Ticket history (transaction) models for the RT API.

use serde::{Deserialize, Serialize};

use super::{
    deserialize_optional_string_or_int, deserialize_optional_u64, null_as_default, ref_id,
    Hyperlink, RtRef,
};

/// A transaction as RT returns it from `/ticket/{id}/history`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireTransaction {
    #[serde(default, deserialize_with = "deserialize_optional_u64")]
    pub id: Option<u64>,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    #[serde(rename = "Creator", default)]
    pub creator: Option<RtRef>,
    #[serde(rename = "Created", default)]
    pub created: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Data", default, deserialize_with = "deserialize_optional_string_or_int")]
    pub data: Option<String>,
    #[serde(rename = "Field", default)]
    pub field: Option<String>,
    #[serde(rename = "OldValue", default, deserialize_with = "deserialize_optional_string_or_int")]
    pub old_value: Option<String>,
    #[serde(rename = "NewValue", default, deserialize_with = "deserialize_optional_string_or_int")]
    pub new_value: Option<String>,
    #[serde(rename = "_hyperlinks", default, deserialize_with = "null_as_default")]
    pub hyperlinks: Vec<Hyperlink>,
}

/// One event in a ticket's timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Transaction id.
    pub id: Option<u64>,
    /// Transaction type, e.g. `Create`, `Correspond` or `Set`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// User who made the change.
    pub creator: Option<String>,
    /// When the change happened.
    pub created: Option<String>,
    /// Human-readable description of the transaction.
    pub content: Option<String>,
    /// Field changed by a `Set` transaction.
    pub field: Option<String>,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change.
    pub new_value: Option<String>,
    /// Ids of attachments recorded by this transaction.
    pub attachments: Vec<String>,
}

impl From<WireTransaction> for HistoryEntry {
    fn from(wire: WireTransaction) -> Self {
        let attachments = wire
            .hyperlinks
            .iter()
            .filter(|link| link.relation.as_deref() == Some("attachment"))
            .filter_map(|link| link.id.clone())
            .collect();

        Self {
            creator: ref_id(&wire.creator),
            content: wire.description.or(wire.data),
            id: wire.id,
            kind: wire.kind,
            created: wire.created,
            field: wire.field,
            old_value: wire.old_value,
            new_value: wire.new_value,
            attachments,
        }
    }
}

/// History output for one ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketHistory {
    /// Ticket the history belongs to.
    pub ticket_id: u64,
    /// Transactions RT reports overall.
    pub total: u64,
    /// Transactions in this page.
    pub count: u64,
    /// Transactions, oldest first.
    pub history: Vec<HistoryEntry>,
}
