//! Tool functions against a mocked RT REST 2.0 API.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use rt_mcp::config::Config;
use rt_mcp::rt_client::RtClient;
use rt_mcp::tools::{self, AddCommentInput, CommentType, CreateTicketInput, UpdateTicketInput};

const TOKEN: &str = "1-56-integration-token";

fn test_client(server: &MockServer) -> RtClient {
    let config = Config {
        base_url: server.uri(),
        token: TOKEN.to_string(),
        timeout: Duration::from_secs(5),
    };
    RtClient::new(&config).expect("Failed to create test client")
}

fn query_contains(fragment: &'static str) -> impl Fn(&Request) -> bool + Send + Sync {
    move |req: &Request| req.url.query().is_some_and(|q| q.contains(fragment))
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_clamps_limit_and_normalizes_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/tickets"))
        .and(header("Authorization", format!("token {}", TOKEN).as_str()))
        .and(query_contains("simple=1;query=login%20bug;per_page=100;"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "count": 1,
            "page": 1,
            "items": [{
                "id": 42,
                "type": "ticket",
                "Subject": "Cannot log in",
                "Status": "open",
                "Queue": {"type": "queue", "id": "1", "_url": "https://rt/REST/2.0/queue/1"},
                "Owner": {"type": "user", "id": "alice"},
                "Priority": "10",
                "Created": "2024-01-05T10:00:00Z"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = tools::search_tickets(&client, "login bug", 200).await;

    assert_eq!(
        to_json(&result),
        json!({
            "total": 1,
            "count": 1,
            "limit": 100,
            "tickets": [{
                "id": 42,
                "subject": "Cannot log in",
                "status": "open",
                "queue": "1",
                "owner": "alice",
                "priority": "10",
                "created": "2024-01-05T10:00:00Z"
            }]
        })
    );
}

#[tokio::test]
async fn test_search_requests_fixed_field_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/tickets"))
        .and(query_contains("fields=Subject,Status,Queue,Owner,Priority,Created"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = tools::search_tickets(&client, "printer", 0).await;

    assert_eq!(
        to_json(&result),
        json!({"total": 0, "count": 0, "limit": 1, "tickets": []})
    );
}

#[tokio::test]
async fn test_search_unexpected_shape_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/tickets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["not", "an", "object"])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = tools::search_tickets(&client, "login bug", 20).await;

    assert!(result.is_error());
    assert_eq!(
        to_json(&result),
        json!({"error": "Unexpected response format", "data": ["not", "an", "object"]})
    );
}

#[tokio::test]
async fn test_search_http_error_keeps_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/tickets"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let out = to_json(&tools::search_tickets(&client, "login bug", 20).await);

    assert_eq!(out["query"], json!("login bug"));
    assert_eq!(
        out["error"],
        json!("HTTP error! status 500 Internal Server Error : database unavailable")
    );
}

// ============================================================================
// Read tools
// ============================================================================

#[tokio::test]
async fn test_get_ticket_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/ticket/999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let out = to_json(&tools::get_ticket(&client, 999).await);

    assert_eq!(
        out,
        json!({"error": "HTTP error! status 404 Not Found : Not Found", "ticket_id": 999})
    );
}

#[tokio::test]
async fn test_get_ticket_defaults_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/ticket/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "Type": "ticket",
            "Subject": "VPN down",
            "Status": "new",
            "Queue": "General",
            "Owner": {"type": "user", "id": "Nobody"}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let out = to_json(&tools::get_ticket(&client, 7).await);

    assert_eq!(out["id"], json!(7));
    assert_eq!(out["queue"], json!("General"));
    assert_eq!(out["owner"], json!("Nobody"));
    assert_eq!(out["requestors"], json!([]));
    assert_eq!(out["cc"], json!([]));
    assert_eq!(out["custom_fields"], json!({}));
}

#[tokio::test]
async fn test_get_ticket_history_keeps_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/ticket/7/history"))
        .and(query_contains("per_page=100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "count": 2,
            "items": [
                {"id": 10, "Type": "Create", "Creator": "alice", "Description": "Ticket created"},
                {"id": 11, "Type": "Status", "Field": "Status", "OldValue": "new", "NewValue": "open"}
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let out = to_json(&tools::get_ticket_history(&client, 7).await);

    assert_eq!(out["ticket_id"], json!(7));
    assert_eq!(out["total"], json!(2));
    assert_eq!(out["history"][0]["id"], json!(10));
    assert_eq!(out["history"][0]["content"], json!("Ticket created"));
    assert_eq!(out["history"][1]["old_value"], json!("new"));
    assert_eq!(out["history"][1]["new_value"], json!("open"));
}

#[tokio::test]
async fn test_get_ticket_links_without_links() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/ticket/42/links"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "_hyperlinks": [{"ref": "self", "type": "ticket", "id": 42}]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = tools::get_ticket_links(&client, 42).await;

    assert_eq!(
        to_json(&result),
        json!({
            "ticket_id": 42,
            "depends_on": [],
            "depended_on_by": [],
            "refers_to": [],
            "referred_to_by": [],
            "members": [],
            "member_of": []
        })
    );
}

// ============================================================================
// Write tools
// ============================================================================

#[tokio::test]
async fn test_create_ticket_omits_absent_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/REST/2.0/ticket"))
        .and(body_json(json!({"Subject": "VPN down", "Queue": "General"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 123,
            "type": "ticket",
            "_url": "https://rt/REST/2.0/ticket/123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let input = CreateTicketInput {
        subject: "VPN down".to_string(),
        queue: "General".to_string(),
        requestor: None,
        cc: None,
        content: None,
        priority: None,
        status: None,
    };
    let result = tools::create_ticket(&client, &input).await;

    assert_eq!(
        to_json(&result),
        json!({"success": true, "ticket_id": 123, "message": "Ticket 123 created successfully"})
    );
}

#[tokio::test]
async fn test_create_ticket_sends_plain_text_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/REST/2.0/ticket"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "124"})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let input = CreateTicketInput {
        subject: "Printer jam".to_string(),
        queue: "Facilities".to_string(),
        requestor: Some("bob@example.com".to_string()),
        cc: None,
        content: Some("Paper stuck in tray 2".to_string()),
        priority: Some(30),
        status: None,
    };
    let result = tools::create_ticket(&client, &input).await;
    tokio_test::assert_ok!(result.into_result());

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(
        body,
        json!({
            "Subject": "Printer jam",
            "Queue": "Facilities",
            "Requestor": "bob@example.com",
            "Content": "Paper stuck in tray 2",
            "ContentType": "text/plain",
            "Priority": 30
        })
    );
}

#[tokio::test]
async fn test_update_ticket_reports_changes() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/REST/2.0/ticket/9"))
        .and(body_json(json!({"Status": "resolved", "Owner": "alice"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            "Ticket 9: Status changed from 'open' to 'resolved'",
            "Ticket 9: Owner changed from Nobody to alice"
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let input = UpdateTicketInput {
        ticket_id: 9,
        subject: Some(String::new()),
        status: Some("resolved".to_string()),
        priority: Some(0),
        owner: Some("alice".to_string()),
        queue: None,
    };
    let out = to_json(&tools::update_ticket(&client, &input).await);

    assert_eq!(out["success"], json!(true));
    assert_eq!(out["ticket_id"], json!(9));
    assert_eq!(out["message"], json!("Ticket 9 updated successfully"));
    assert_eq!(out["changes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_add_comment_correspond_uses_correspond_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/REST/2.0/ticket/7/correspond"))
        .and(body_json(json!({"Content": "fixed", "ContentType": "text/plain"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!(["Correspondence added"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/REST/2.0/ticket/7/comment"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let input = AddCommentInput {
        ticket_id: 7,
        content: "fixed".to_string(),
        comment_type: CommentType::Correspond,
    };
    let out = to_json(&tools::add_comment(&client, &input).await);

    assert!(out["message"]
        .as_str()
        .unwrap()
        .contains("Correspondence added successfully"));
}

#[tokio::test]
async fn test_add_comment_default_uses_comment_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/REST/2.0/ticket/7/comment"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!(["Comments added"])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let input = AddCommentInput {
        ticket_id: 7,
        content: "checked logs".to_string(),
        comment_type: CommentType::default(),
    };
    let out = to_json(&tools::add_comment(&client, &input).await);

    assert_eq!(out["message"], json!("Comment added successfully"));
}

// ============================================================================
// Directory tools
// ============================================================================

#[tokio::test]
async fn test_get_queues() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/queues/all"))
        .and(query_contains("fields=Name,Description"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "count": 2,
            "items": [
                {"id": 1, "Name": "General", "Description": "The default queue"},
                {"id": 3, "Name": "Facilities"}
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = tools::get_queues(&client).await;

    assert_eq!(
        to_json(&result),
        json!({
            "total": 2,
            "count": 2,
            "queues": [
                {"id": 1, "name": "General", "description": "The default queue"},
                {"id": 3, "name": "Facilities", "description": null}
            ]
        })
    );
}

#[tokio::test]
async fn test_get_users_passes_query_only_when_present() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0, "count": 0, "items": []})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    tokio_test::assert_ok!(tools::get_users(&client, None).await.into_result());
    tokio_test::assert_ok!(tools::get_users(&client, Some("alice")).await.into_result());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(!requests[0].url.query().unwrap().contains("query="));
    assert!(requests[1].url.query().unwrap().contains(";query=alice"));
}

// ============================================================================
// Attachment tools
// ============================================================================

#[tokio::test]
async fn test_get_ticket_attachments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/ticket/42/attachments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "count": 1,
            "items": [{
                "id": 77,
                "Filename": "screenshot.png",
                "ContentType": "image/png",
                "ContentLength": "2048",
                "Creator": {"type": "user", "id": "bob"},
                "TransactionId": {"type": "transaction", "id": "901"}
            }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let out = to_json(&tools::get_ticket_attachments(&client, 42).await);

    assert_eq!(out["ticket_id"], json!(42));
    assert_eq!(out["attachments"][0]["filename"], json!("screenshot.png"));
    assert_eq!(out["attachments"][0]["size"], json!(2048));
    assert_eq!(out["attachments"][0]["transaction_id"], json!("901"));
}

#[tokio::test]
async fn test_download_attachment_encodes_content() {
    let server = MockServer::start().await;
    let content = b"hello attachment".to_vec();
    Mock::given(method("GET"))
        .and(path("/REST/2.0/ticket/42/attachments/77/content"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/ticket/42/attachments/77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 77,
            "Filename": "notes.txt",
            "ContentType": "text/plain"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let out = to_json(&tools::download_attachment(&client, 42, 77).await);

    assert_eq!(
        out,
        json!({
            "ticket_id": 42,
            "attachment_id": 77,
            "filename": "notes.txt",
            "content_type": "text/plain",
            "size": content.len(),
            "content_base64": "aGVsbG8gYXR0YWNobWVudA=="
        })
    );
}

#[tokio::test]
async fn test_download_attachment_survives_missing_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/ticket/42/attachments/78/content"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8, 1, 2]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/ticket/42/attachments/78"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let out = to_json(&tools::download_attachment(&client, 42, 78).await);

    assert_eq!(out["filename"], Value::Null);
    assert_eq!(out["content_type"], Value::Null);
    assert_eq!(out["size"], json!(3));
    assert_eq!(out["content_base64"], json!("AAEC"));
}

#[tokio::test]
async fn test_download_attachment_content_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/ticket/42/attachments/79/content"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Resource does not exist"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let out = to_json(&tools::download_attachment(&client, 42, 79).await);

    assert_eq!(out["ticket_id"], json!(42));
    assert_eq!(out["attachment_id"], json!(79));
    assert!(out["error"].as_str().unwrap().contains("404"));
}

// ============================================================================
// Failure handling
// ============================================================================

#[tokio::test]
async fn test_timeout_becomes_error_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/ticket/5"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 5}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = Config {
        base_url: server.uri(),
        token: TOKEN.to_string(),
        timeout: Duration::from_secs(1),
    };
    let client = RtClient::new(&config).unwrap();
    let out = to_json(&tools::get_ticket(&client, 5).await);

    assert!(out["error"].as_str().unwrap().contains("timed out"));
    assert_eq!(out["ticket_id"], json!(5));
}

#[tokio::test]
async fn test_error_record_never_contains_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/REST/2.0/ticket/6"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(format!("Invalid token {}", TOKEN)),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let text = serde_json::to_string(&tools::get_ticket(&client, 6).await).unwrap();

    assert!(!text.contains(TOKEN));
    assert!(text.contains("[REDACTED]"));
}
