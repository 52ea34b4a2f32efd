//! Queue and user models for the RT API.

use serde::{Deserialize, Serialize};

use super::deserialize_optional_u64;

/// A queue as RT returns it.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireQueue {
    #[serde(default, deserialize_with = "deserialize_optional_u64")]
    pub id: Option<u64>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}

/// A ticket queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Queue {
    /// Queue id.
    pub id: Option<u64>,
    /// Queue name, used when creating tickets.
    pub name: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

impl From<WireQueue> for Queue {
    fn from(wire: WireQueue) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            description: wire.description,
        }
    }
}

/// Queue listing output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueList {
    /// Queues RT reports overall.
    pub total: u64,
    /// Queues in this page.
    pub count: u64,
    /// The queues.
    pub queues: Vec<Queue>,
}

/// A user as RT returns it.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireUser {
    #[serde(default, deserialize_with = "deserialize_optional_u64")]
    pub id: Option<u64>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "EmailAddress", default)]
    pub email: Option<String>,
    #[serde(rename = "RealName", default)]
    pub real_name: Option<String>,
}

/// An RT account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// User id.
    pub id: Option<u64>,
    /// Login name.
    pub name: Option<String>,
    /// Primary email address.
    pub email: Option<String>,
    /// Display name.
    pub real_name: Option<String>,
}

impl From<WireUser> for User {
    fn from(wire: WireUser) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            email: wire.email,
            real_name: wire.real_name,
        }
    }
}

/// User listing output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserList {
    /// Users RT reports overall.
    pub total: u64,
    /// Users in this page.
    pub count: u64,
    /// The users.
    pub users: Vec<User>,
}
