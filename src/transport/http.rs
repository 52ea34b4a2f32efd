//! HTTP transport: `POST /mcp` with session semantics.
//!
//! A client opens a session by posting an `initialize` request without a
//! session header. The response carries the new id in `mcp-session-id`, and
//! every later message must send it back. Unknown ids are rejected; a new
//! session is never created for them.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use super::session::{
    is_initialize_request, is_valid_message, SessionError, SessionHandle, SessionStore,
};
use crate::rt_client::RtClient;

/// Header carrying the session identifier.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// JSON-RPC code for unparseable bodies.
pub const PARSE_ERROR: i64 = -32700;

/// JSON-RPC code for malformed messages and empty batches.
pub const INVALID_REQUEST: i64 = -32600;

/// JSON-RPC code for internal failures.
pub const INTERNAL_ERROR: i64 = -32603;

/// Server-defined JSON-RPC code for requests without a usable session.
pub const NO_SESSION: i64 = -32000;

/// Shared state for the HTTP transport.
#[derive(Clone)]
pub struct HttpState {
    rt_client: RtClient,
    sessions: SessionStore,
}

/// Builds the `/mcp` router with a fresh session store.
pub fn router(rt_client: RtClient) -> Router {
    router_with_sessions(rt_client, SessionStore::new())
}

/// Builds the `/mcp` router around an existing session store.
pub fn router_with_sessions(rt_client: RtClient, sessions: SessionStore) -> Router {
    let state = HttpState { rt_client, sessions };

    Router::new()
        .route("/mcp", post(handle_post).get(handle_get))
        .with_state(state)
}

/// Binds `addr` and serves until `shutdown` resolves.
pub async fn serve<F>(rt_client: RtClient, addr: SocketAddr, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("MCP HTTP server listening on http://{}/mcp", listener.local_addr()?);

    axum::serve(listener, router(rt_client))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn handle_get() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        "Method Not Allowed",
    )
        .into_response()
}

async fn handle_post(State(state): State<HttpState>, headers: HeaderMap, body: Bytes) -> Response {
    let message: Value = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected unparseable MCP body");
            return rpc_error(StatusCode::BAD_REQUEST, PARSE_ERROR, "Parse error");
        }
    };

    if !is_well_formed(&message) {
        tracing::debug!("Rejected malformed JSON-RPC message");
        return rpc_error(StatusCode::BAD_REQUEST, INVALID_REQUEST, "Invalid Request");
    }

    let session_id = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok());

    let session = match session_id {
        Some(id) => state.sessions.get(id).await,
        None if is_initialize_request(&message) => return initialize(&state, &message).await,
        None => None,
    };

    match session {
        Some(session) => deliver(&state, &session, message).await,
        None => {
            tracing::debug!(session = ?session_id, "Request without a valid session");
            rpc_error(
                StatusCode::BAD_REQUEST,
                NO_SESSION,
                "Bad Request: No valid session ID provided",
            )
        }
    }
}

/// Opens a session and runs the handshake through it.
///
/// The session is registered only when the handshake succeeds.
async fn initialize(state: &HttpState, message: &Value) -> Response {
    let id = Uuid::new_v4().to_string();
    let handle = Arc::new(SessionHandle::spawn(id.clone(), state.rt_client.clone()));

    match handle.deliver(message).await {
        Ok(Some(reply)) if reply.get("result").is_some() => {
            state.sessions.insert(handle).await;
            tracing::info!("Session initialized with ID: {}", id);
            with_session(Json(reply).into_response(), &id)
        }
        Ok(Some(reply)) => {
            tracing::warn!("Session initialization rejected");
            Json(reply).into_response()
        }
        Ok(None) => internal_error(),
        Err(e) => {
            tracing::error!(error = %e, "Session initialization failed");
            internal_error()
        }
    }
}

/// A single message or a non-empty batch of well-formed messages.
fn is_well_formed(message: &Value) -> bool {
    match message {
        Value::Array(batch) => !batch.is_empty() && batch.iter().all(is_valid_message),
        single => is_valid_message(single),
    }
}

/// Delivers a message or batch through an established session.
async fn deliver(state: &HttpState, session: &SessionHandle, message: Value) -> Response {
    let replies = match message {
        Value::Array(batch) => {
            let mut replies = Vec::new();
            for item in &batch {
                match session.deliver(item).await {
                    Ok(Some(reply)) => replies.push(reply),
                    Ok(None) => {}
                    Err(e) => return delivery_failed(state, session, &e).await,
                }
            }
            if replies.is_empty() {
                None
            } else {
                Some(Value::Array(replies))
            }
        }
        single => match session.deliver(&single).await {
            Ok(reply) => reply,
            Err(e) => return delivery_failed(state, session, &e).await,
        },
    };

    let response = match replies {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    };
    with_session(response, session.id())
}

/// Reports a failed delivery; a dead session is dropped from the store.
async fn delivery_failed(state: &HttpState, session: &SessionHandle, error: &SessionError) -> Response {
    tracing::error!(session = %session.id(), error = %error, "Failed to deliver MCP message");
    if error.is_fatal() {
        state.sessions.remove(session.id()).await;
        tracing::warn!(session = %session.id(), "Session removed after its service stopped");
    }
    internal_error()
}

fn with_session(mut response: Response, id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}

fn internal_error() -> Response {
    rpc_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR, "Internal server error")
}

fn rpc_error(status: StatusCode, code: i64, message: &str) -> Response {
    (
        status,
        Json(json!({
            "jsonrpc": "2.0",
            "error": {"code": code, "message": message},
            "id": null,
        })),
    )
        .into_response()
}
