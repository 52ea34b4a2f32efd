//! Per-session MCP services for the HTTP transport.
//!
//! Each session owns its own [`RtServer`] running as an rmcp service on a
//! spawned task. The service speaks newline-delimited JSON-RPC over one end
//! of an in-process duplex pipe; the [`SessionHandle`] holds the other end
//! and turns one HTTP POST into one write plus, for requests, one reply read.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rmcp::ServiceExt;
use serde_json::Value;
use thiserror::Error;
use tokio::io::{
    AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf,
};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::rt_client::RtClient;
use crate::server::RtServer;

/// Capacity of the in-process pipe between a session and its service.
const PIPE_CAPACITY: usize = 64 * 1024;

/// Slack added on top of the RT calls a single tool may make.
const REPLY_GRACE: Duration = Duration::from_secs(1);

/// Failure delivering a message through a session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Reading or writing the session pipe failed.
    #[error("session pipe error: {0}")]
    Io(#[from] std::io::Error),

    /// The service wrote something that is not JSON.
    #[error("invalid message from session service: {0}")]
    Json(#[from] serde_json::Error),

    /// The service stopped before replying.
    #[error("session service closed")]
    Closed,

    /// The service did not answer in time.
    #[error("no reply from session service within {0:?}")]
    Timeout(Duration),
}

impl SessionError {
    /// Returns `true` when the session can no longer be used.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::Io(_) | SessionError::Closed)
    }
}

/// How long a session may take to answer one request.
///
/// The slowest tool makes two sequential RT calls.
pub fn reply_timeout(rt_timeout: Duration) -> Duration {
    rt_timeout * 2 + REPLY_GRACE
}

struct SessionIo {
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
}

impl SessionIo {
    /// Writes one line and, when `id` is set, reads until its reply.
    async fn exchange(
        &mut self,
        session: &str,
        line: &str,
        id: Option<&Value>,
    ) -> Result<Option<Value>, SessionError> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;

        let Some(id) = id else {
            return Ok(None);
        };

        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Err(SessionError::Closed);
            };
            if line.trim().is_empty() {
                continue;
            }

            let reply: Value = serde_json::from_str(&line)?;
            if is_reply_to(&reply, id) {
                return Ok(Some(reply));
            }
            tracing::debug!(session = %session, "Skipping unsolicited message from session service");
        }
    }
}

/// Client side of one session.
///
/// Deliveries are serialized by an async mutex, so a reply is always matched
/// to the request that produced it. Dropping the handle stops the service.
pub struct SessionHandle {
    id: String,
    io: Arc<Mutex<SessionIo>>,
    task: JoinHandle<()>,
    reply_timeout: Duration,
}

impl SessionHandle {
    /// Starts a fresh tool server for a new session.
    pub fn spawn(id: String, rt_client: RtClient) -> Self {
        let (client_end, server_end) = tokio::io::duplex(PIPE_CAPACITY);
        let (server_read, server_write) = tokio::io::split(server_end);
        let wait = reply_timeout(rt_client.timeout());

        let session = id.clone();
        let task = tokio::spawn(async move {
            let server = RtServer::new(rt_client);
            match server.serve((server_read, server_write)).await {
                Ok(service) => {
                    if let Err(e) = service.waiting().await {
                        tracing::warn!(session = %session, error = %e, "Session service stopped with error");
                    }
                }
                Err(e) => {
                    tracing::warn!(session = %session, error = %e, "Session handshake failed");
                }
            }
            tracing::debug!(session = %session, "Session service finished");
        });

        Self::with_pipe(id, client_end, task, wait)
    }

    /// Wraps the client end of a pipe whose other end `task` serves.
    pub(crate) fn with_pipe(
        id: String,
        client_end: DuplexStream,
        task: JoinHandle<()>,
        reply_timeout: Duration,
    ) -> Self {
        let (client_read, client_write) = tokio::io::split(client_end);
        Self {
            id,
            io: Arc::new(Mutex::new(SessionIo {
                lines: BufReader::new(client_read).lines(),
                writer: client_write,
            })),
            task,
            reply_timeout,
        }
    }

    /// The session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Delivers one JSON-RPC message to the session's service.
    ///
    /// Returns the matching reply for requests, `None` for notifications and
    /// responses. Messages the service emits that do not answer the pending
    /// request (log notifications, server-initiated requests) are skipped.
    ///
    /// The exchange runs on its own task, so a caller that goes away midway
    /// never leaves a partial line in the pipe.
    pub async fn deliver(&self, message: &Value) -> Result<Option<Value>, SessionError> {
        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        let id = request_id(message).cloned();

        let io = Arc::clone(&self.io);
        let session = self.id.clone();
        let wait = self.reply_timeout;

        let exchange = tokio::spawn(async move {
            let mut io = io.lock_owned().await;
            match tokio::time::timeout(wait, io.exchange(&session, &line, id.as_ref())).await {
                Ok(result) => result,
                Err(_) => Err(SessionError::Timeout(wait)),
            }
        });

        match exchange.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(session = %self.id, error = %e, "Session exchange task failed");
                Err(SessionError::Closed)
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Returns `true` for a well-formed JSON-RPC 2.0 request, notification or
/// response.
///
/// Requests and notifications need a string `method`, object `params` when
/// present and a string, number or null `id` when present. Responses need an `id`
/// and exactly one of `result` or `error`.
pub fn is_valid_message(message: &Value) -> bool {
    let Some(object) = message.as_object() else {
        return false;
    };
    if object.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return false;
    }

    match object.get("method") {
        Some(method) => {
            method.is_string()
                && object.get("params").is_none_or(Value::is_object)
                && object
                    .get("id")
                    .is_none_or(|id| id.is_string() || id.is_number() || id.is_null())
        }
        None => {
            object.contains_key("id")
                && (object.contains_key("result") != object.contains_key("error"))
        }
    }
}

/// Returns the id of a JSON-RPC request, `None` for anything else.
pub fn request_id(message: &Value) -> Option<&Value> {
    message.get("method")?;
    message.get("id").filter(|id| !id.is_null())
}

/// Returns `true` for an `initialize` request.
pub fn is_initialize_request(message: &Value) -> bool {
    message.get("method").and_then(Value::as_str) == Some("initialize")
        && request_id(message).is_some()
}

fn is_reply_to(reply: &Value, id: &Value) -> bool {
    reply.get("method").is_none()
        && reply.get("id") == Some(id)
        && (reply.get("result").is_some() || reply.get("error").is_some())
}

/// Sessions keyed by their identifier.
///
/// Entries live until the process exits or their service dies; nothing
/// expires them.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Arc<SessionHandle>>>>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a session.
    pub async fn get(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.inner.read().await.get(id).cloned()
    }

    /// Registers a session under its own id.
    pub async fn insert(&self, handle: Arc<SessionHandle>) {
        let id = handle.id().to_string();
        self.inner.write().await.insert(id, handle);
    }

    /// Forgets a session; its service stops once the last handle drops.
    pub async fn remove(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.inner.write().await.remove(id)
    }

    /// Number of registered sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Returns `true` when no session is registered.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
