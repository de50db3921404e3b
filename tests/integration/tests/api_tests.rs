//! API Integration Tests
//!
//! Each test starts the full application against an in-memory SQLite store
//! with recording platform fakes, so no external services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use gate_core::NotificationKind;
use integration_tests::{
    assert_json, assert_status, fixtures::*, TestServer,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn submit(server: &TestServer, body: &SubmissionBody) -> Value {
    let response = server.post_auth("/api/v1/submissions", body).await.unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

async fn confirm(server: &TestServer, membership_id: &str, duration_secs: i64) -> Value {
    let response = server
        .post_as(
            &format!("/api/v1/members/{membership_id}/confirm"),
            ROOT_ADMIN,
            &json!({ "duration_secs": duration_secs }),
        )
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"], "healthy");
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_api_requires_token() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/api/v1/admins").await.unwrap();
    let body: Value = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body["error"]["code"], "MISSING_AUTHORIZATION");

    let response = server
        .client
        .get(format!("{}/api/v1/admins", server.base_url()))
        .header("Authorization", "Bearer wrong-token")
        .send()
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_transitions_require_admin_actor() {
    let server = TestServer::start().await.unwrap();
    let body = SubmissionBody::unique();
    submit(&server, &body).await;

    // Token but no acting principal
    let response = server
        .post_auth(
            &format!("/api/v1/members/{}/decline", body.membership_id),
            &json!({}),
        )
        .await
        .unwrap();
    let err: Value = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(err["error"]["code"], "MISSING_ACTOR");

    // Acting principal without the admin role
    let response = server
        .post_as(
            &format!("/api/v1/members/{}/decline", body.membership_id),
            body.principal_id,
            &json!({}),
        )
        .await
        .unwrap();
    let err: Value = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(err["error"]["code"], "NOT_ADMIN");
}

// ============================================================================
// Submission & Approval Tests
// ============================================================================

#[tokio::test]
async fn test_submission_waits_for_approval() {
    let server = TestServer::start().await.unwrap();
    let body = SubmissionBody::unique();

    let response = submit(&server, &body).await;
    assert_eq!(response["outcome"], "pending_approval");
    assert_eq!(response["known"], false);
    assert_eq!(response["member"]["status"], "none");
    assert_eq!(
        server.notifier.kinds_for(ROOT_ADMIN),
        vec![NotificationKind::ApprovalRequested]
    );

    let response = server
        .post_auth(
            "/api/v1/join-requests",
            &json!({ "principal_id": body.principal_id }),
        )
        .await
        .unwrap();
    let decision: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(decision["approved"], false);
}

#[tokio::test]
async fn test_confirmed_member_is_granted() {
    let server = TestServer::start().await.unwrap();
    let body = SubmissionBody::unique();
    submit(&server, &body).await;

    let outcome = confirm(&server, &body.membership_id, 3600).await;
    assert_eq!(outcome["member"]["status"], "active");
    assert_eq!(outcome["notification"]["status"], "delivered");
    assert_eq!(
        server.notifier.kinds_for(body.principal_id),
        vec![NotificationKind::AccessGranted]
    );

    let response = submit(&server, &body).await;
    assert_eq!(response["outcome"], "granted");
    assert_eq!(response["links"].as_array().map(Vec::len), Some(ENDPOINTS.len()));

    let response = server
        .post_auth(
            "/api/v1/join-requests",
            &json!({ "principal_id": body.principal_id }),
        )
        .await
        .unwrap();
    let decision: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(decision["approved"], true);
}

#[tokio::test]
async fn test_confirm_rejects_negative_duration() {
    let server = TestServer::start().await.unwrap();
    let body = SubmissionBody::unique();
    submit(&server, &body).await;

    let response = server
        .post_as(
            &format!("/api/v1/members/{}/confirm", body.membership_id),
            ROOT_ADMIN,
            &json!({ "duration_secs": -5 }),
        )
        .await
        .unwrap();
    let err: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_confirm_rejects_out_of_range_duration() {
    let server = TestServer::start().await.unwrap();
    let body = SubmissionBody::unique();
    submit(&server, &body).await;

    let response = server
        .post_as(
            &format!("/api/v1/members/{}/confirm", body.membership_id),
            ROOT_ADMIN,
            &json!({ "duration_secs": i64::MAX }),
        )
        .await
        .unwrap();
    let err: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err["error"]["code"], "INVALID_DURATION");

    // The server keeps serving and the member is untouched
    let card = server
        .get_auth(&format!("/api/v1/members/{}", body.membership_id))
        .await
        .unwrap();
    let card: Value = assert_json(card, StatusCode::OK).await.unwrap();
    assert_eq!(card["status"], "none");
}

#[tokio::test]
async fn test_unlimited_grant_is_lifetime() {
    let server = TestServer::start().await.unwrap();
    let body = SubmissionBody::unique();
    submit(&server, &body).await;

    let outcome = confirm(&server, &body.membership_id, 0).await;
    assert_eq!(outcome["member"]["status"], "lifetime");
    assert!(outcome["member"]["expires_at"].is_null());
}

// ============================================================================
// Enforcement Tests
// ============================================================================

#[tokio::test]
async fn test_ban_reports_partial_enforcement() {
    let server = TestServer::start().await.unwrap();
    let body = SubmissionBody::unique();
    submit(&server, &body).await;
    confirm(&server, &body.membership_id, 3600).await;
    server.endpoints.fail(ENDPOINTS[1]);

    let response = server
        .post_as(
            &format!("/api/v1/members/{}/ban", body.membership_id),
            ROOT_ADMIN,
            &json!({}),
        )
        .await
        .unwrap();
    let outcome: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(outcome["member"]["is_banned"], true);
    assert_eq!(outcome["member"]["status"], "banned");
    assert_eq!(outcome["enforcement"]["ok"], 1);
    assert_eq!(outcome["enforcement"]["total"], 2);
    assert_eq!(outcome["enforcement"]["failures"][0]["endpoint_id"], ENDPOINTS[1]);
    assert_eq!(server.endpoints.bans().len(), 2);

    let response = submit(&server, &body).await;
    assert_eq!(response["outcome"], "banned");

    let response = server.get_auth("/api/v1/members/export?scope=banned").await.unwrap();
    let export: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(export["scope"], "banned");
    assert_eq!(export["count"], 1);
    assert_eq!(export["members"][0]["membership_id"], body.membership_id.as_str());

    let response = server
        .get_auth(&format!("/api/v1/members/{}", body.membership_id))
        .await
        .unwrap();
    let card: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(card["in_endpoints"], false);
}

#[tokio::test]
async fn test_kick_bans_then_unbans() {
    let server = TestServer::start().await.unwrap();
    let body = SubmissionBody::unique();
    submit(&server, &body).await;
    confirm(&server, &body.membership_id, 3600).await;

    let response = server
        .post_as(
            &format!("/api/v1/members/{}/kick", body.membership_id),
            ROOT_ADMIN,
            &json!({}),
        )
        .await
        .unwrap();
    let outcome: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(outcome["member"]["is_banned"], false);
    assert_eq!(outcome["member"]["is_confirmed"], false);
    assert_eq!(server.endpoints.bans().len(), 2);
    assert_eq!(server.endpoints.unbans().len(), 2);
}

#[tokio::test]
async fn test_remove_deletes_member() {
    let server = TestServer::start().await.unwrap();
    let body = SubmissionBody::unique();
    submit(&server, &body).await;

    let response = server
        .delete_as(&format!("/api/v1/members/{}", body.membership_id), ROOT_ADMIN)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .get_auth(&format!("/api/v1/members/{}", body.membership_id))
        .await
        .unwrap();
    let err: Value = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(err["error"]["code"], "UNKNOWN_MEMBER");
}

// ============================================================================
// Lookup & Export Tests
// ============================================================================

#[tokio::test]
async fn test_member_lookup_by_handle_and_principal() {
    let server = TestServer::start().await.unwrap();
    let body = SubmissionBody::unique();
    submit(&server, &body).await;
    let handle = body.handle.clone().unwrap_or_default();

    let response = server
        .get_auth(&format!("/api/v1/members/@{handle}"))
        .await
        .unwrap();
    let card: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(card["membership_id"], body.membership_id.as_str());

    let response = server
        .get_auth(&format!("/api/v1/members/{}", body.principal_id))
        .await
        .unwrap();
    let card: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(card["principal_id"], body.principal_id);
    assert_eq!(card["in_endpoints"], true);
}

#[tokio::test]
async fn test_export_rejects_unknown_scope() {
    let server = TestServer::start().await.unwrap();
    let response = server.get_auth("/api/v1/members/export?scope=weird").await.unwrap();
    let err: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err["error"]["code"], "INVALID_SCOPE");
}

#[tokio::test]
async fn test_export_defaults_to_all() {
    let server = TestServer::start().await.unwrap();
    submit(&server, &SubmissionBody::unique()).await;
    submit(&server, &SubmissionBody::unique()).await;

    let response = server.get_auth("/api/v1/members/export").await.unwrap();
    let export: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(export["scope"], "all");
    assert_eq!(export["count"], 2);
}

#[tokio::test]
async fn test_export_as_csv_attachment() {
    let server = TestServer::start().await.unwrap();
    let body = SubmissionBody::unique();
    submit(&server, &body).await;
    confirm(&server, &body.membership_id, 3600).await;
    submit(&server, &SubmissionBody::unique()).await;

    let response = server
        .get_auth("/api/v1/members/export?scope=active&format=csv")
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    assert!(header("content-type").starts_with("text/csv"));
    assert_eq!(
        header("content-disposition"),
        "attachment; filename=\"members_active.csv\""
    );

    let text = response.text().await.unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "membership_id,principal_id,handle,is_confirmed,is_banned,expires_at,remaining_secs,status"
    );
    assert!(lines[1].starts_with(&format!("{},{},", body.membership_id, body.principal_id)));
    assert!(lines[1].ends_with(",active"));
}

#[tokio::test]
async fn test_export_rejects_unknown_format() {
    let server = TestServer::start().await.unwrap();
    let response = server.get_auth("/api/v1/members/export?format=xml").await.unwrap();
    let err: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err["error"]["code"], "INVALID_QUERY_PARAMETER");
}

// ============================================================================
// Admin, Locale & Config Tests
// ============================================================================

#[tokio::test]
async fn test_admin_management() {
    let server = TestServer::start().await.unwrap();
    let helper = unique_suffix();

    let response = server
        .put_as(&format!("/api/v1/admins/{helper}"), ROOT_ADMIN, &json!({}))
        .await
        .unwrap();
    let admin: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(admin["is_top_level"], false);

    let response = server.get_auth("/api/v1/admins").await.unwrap();
    let admins: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(admins[0]["principal_id"], ROOT_ADMIN);
    assert_eq!(admins[0]["is_root"], true);
    assert_eq!(admins.as_array().map(Vec::len), Some(2));

    // A regular admin may decide members but not manage admins
    let body = SubmissionBody::unique();
    submit(&server, &body).await;
    let response = server
        .post_as(
            &format!("/api/v1/members/{}/decline", body.membership_id),
            helper,
            &json!({}),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .put_as(&format!("/api/v1/admins/{}", unique_suffix()), helper, &json!({}))
        .await
        .unwrap();
    let err: Value = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(err["error"]["code"], "NOT_TOP_LEVEL_ADMIN");

    let response = server
        .delete_as(&format!("/api/v1/admins/{helper}"), ROOT_ADMIN)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
}

#[tokio::test]
async fn test_admin_path_must_be_numeric() {
    let server = TestServer::start().await.unwrap();
    let response = server
        .put_as("/api/v1/admins/alice", ROOT_ADMIN, &json!({}))
        .await
        .unwrap();
    let err: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err["error"]["code"], "INVALID_PATH_PARAMETER");
}

#[tokio::test]
async fn test_locale_round_trip() {
    let server = TestServer::start().await.unwrap();
    let body = SubmissionBody::unique();
    submit(&server, &body).await;

    let path = format!("/api/v1/principals/{}/locale", body.principal_id);
    let response = server.put_auth(&path, &json!({ "locale": "de" })).await.unwrap();
    let locale: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(locale["locale"], "de");

    let response = server.get_auth(&path).await.unwrap();
    let locale: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(locale["locale"], "de");
}

#[tokio::test]
async fn test_grant_durations() {
    let server = TestServer::start().await.unwrap();
    let response = server.get_auth("/api/v1/config/grant-durations").await.unwrap();
    let durations: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(durations[0]["secs"], 2_592_000);
    assert_eq!(durations[0]["unlimited"], false);
    assert_eq!(durations[1]["secs"], 0);
    assert_eq!(durations[1]["unlimited"], true);
}
