//! Directory tools: queues and users.

use serde_json::{json, Value};

use super::{decode, respond, ToolResponse};
use crate::error::RtError;
use crate::models::{QueueList, RtCollection, UserList, WireQueue, WireUser};
use crate::rt_client::RtClient;

const QUEUE_FIELDS: &str = "Name,Description";
const USER_FIELDS: &str = "Name,EmailAddress,RealName";

/// Lists every queue.
pub async fn get_queues(client: &RtClient) -> ToolResponse<QueueList> {
    let result = fetch_queues(client).await;
    respond(client, "get_queues", result, &[])
}

async fn fetch_queues(client: &RtClient) -> Result<QueueList, RtError> {
    let data = client
        .get(&format!("/queues/all?fields={}", QUEUE_FIELDS))
        .await?;
    let page: RtCollection<WireQueue> = decode(data)?;

    Ok(QueueList {
        total: page.total(),
        count: page.count(),
        queues: page.items.into_iter().map(Into::into).collect(),
    })
}

fn users_endpoint(query: Option<&str>) -> String {
    match query.filter(|q| !q.is_empty()) {
        Some(q) => format!(
            "/users?fields={};query={}",
            USER_FIELDS,
            urlencoding::encode(q)
        ),
        None => format!("/users?fields={}", USER_FIELDS),
    }
}

/// Lists users, optionally filtered by free text.
pub async fn get_users(client: &RtClient, query: Option<&str>) -> ToolResponse<UserList> {
    let result = fetch_users(client, query).await;
    let context = match query {
        Some(q) => vec![("query", json!(q))],
        None => Vec::<(&str, Value)>::new(),
    };
    respond(client, "get_users", result, &context)
}

async fn fetch_users(client: &RtClient, query: Option<&str>) -> Result<UserList, RtError> {
    let data = client.get(&users_endpoint(query)).await?;
    let page: RtCollection<WireUser> = decode(data)?;

    Ok(UserList {
        total: page.total(),
        count: page.count(),
        users: page.items.into_iter().map(Into::into).collect(),
    })
}
