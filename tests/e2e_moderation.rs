//! E2E tests for the capability-token moderation flow

mod common;

use common::{TestServer, SIGNING_SECRET};
use slotcast::data::AssetKind;
use slotcast::token::TokenCodec;

#[tokio::test]
async fn test_review_with_valid_token() {
    let server = TestServer::new().await;
    let user = server.create_user("alice").await;
    let asset = server.create_asset(&user, AssetKind::Image).await;

    let token = server.moderation_token(asset.id);
    let response = server
        .client
        .get(server.url(&format!("/moderate/{}", token)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], asset.id);
    assert_eq!(body["status"], 0);
    assert_eq!(body["type"], "image");
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let server = TestServer::new().await;
    let user = server.create_user("alice").await;
    let asset = server.create_asset(&user, AssetKind::Image).await;

    let token = server.moderation_token(asset.id);
    // Flip the last signature character.
    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let response = server
        .client
        .get(server.url(&format!("/moderate/{}", tampered)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_cross_scope_token_is_rejected() {
    let server = TestServer::new().await;
    let user = server.create_user("alice").await;
    let asset = server.create_asset(&user, AssetKind::Image).await;

    let foreign = TokenCodec::new(SIGNING_SECRET, "export")
        .encode(&asset.id.to_string())
        .unwrap();

    let response = server
        .client
        .get(server.url(&format!("/moderate/{}", foreign)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_valid_token_for_missing_asset_is_404() {
    let server = TestServer::new().await;

    let token = server.moderation_token(424242);
    let response = server
        .client
        .get(server.url(&format!("/moderate/{}", token)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_approve_then_reject_then_revive_fails() {
    let server = TestServer::new().await;
    let user = server.create_user("alice").await;
    let asset = server.create_asset(&user, AssetKind::Video).await;
    let token = server.moderation_token(asset.id);

    // Approve.
    let response = server
        .client
        .get(server.url(&format!("/moderate/{}/save?status=1", token)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], 1);

    // Approved -> Rejected is allowed.
    let response = server
        .client
        .get(server.url(&format!("/moderate/{}/save?status=2", token)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], 2);

    // Rejected is terminal; re-approval must fail.
    let response = server
        .client
        .get(server.url(&format!("/moderate/{}/save?status=1", token)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // And the stored status is untouched.
    let stored = server.state.db.get_asset(asset.id).await.unwrap().unwrap();
    assert_eq!(stored.status, 2);
}

#[tokio::test]
async fn test_reapproval_is_idempotent() {
    let server = TestServer::new().await;
    let user = server.create_user("alice").await;
    let asset = server.create_asset(&user, AssetKind::Image).await;
    let token = server.moderation_token(asset.id);

    for _ in 0..2 {
        let response = server
            .client
            .get(server.url(&format!("/moderate/{}/save?status=1", token)))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    let stored = server.state.db.get_asset(asset.id).await.unwrap().unwrap();
    assert_eq!(stored.status, 1);
}

#[tokio::test]
async fn test_out_of_range_status_is_rejected() {
    let server = TestServer::new().await;
    let user = server.create_user("alice").await;
    let asset = server.create_asset(&user, AssetKind::Image).await;
    let token = server.moderation_token(asset.id);

    for status in ["0", "3", "-1", "abc", "1x", ""] {
        let response = server
            .client
            .get(server.url(&format!("/moderate/{}/save?status={}", token, status)))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 401, "status={} must be rejected", status);
    }

    // Missing status parameter is rejected the same way.
    let response = server
        .client
        .get(server.url(&format!("/moderate/{}/save", token)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let stored = server.state.db.get_asset(asset.id).await.unwrap().unwrap();
    assert_eq!(stored.status, 0);
}
