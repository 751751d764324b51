// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use actix_web::{http::StatusCode, test};
use common::{FRONTEND_URL, TestHarness, signed_interaction};
use rolesync::discord::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use serde_json::{Value, json};

async fn send(harness: &TestHarness, req: test::TestRequest) -> (StatusCode, Value) {
    let app = test::init_service(common::build_test_app(harness.app_state.clone())).await;
    let resp = test::call_service(&app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn command(name: &str, options: Value, resolved: Value) -> Value {
    json!({
        "id": "1",
        "type": 2,
        "token": "interaction-token",
        "guild_id": "2000",
        "member": { "user": { "id": "4242", "username": "alice" } },
        "data": { "id": "9", "name": name, "options": options, "resolved": resolved }
    })
}

fn embed_command(channel_type: u8, extra: &[(&str, &str)]) -> Value {
    let mut options = vec![json!({ "name": "channel", "type": 7, "value": "555" })];
    for (name, value) in extra {
        options.push(json!({ "name": name, "type": 3, "value": value }));
    }
    command(
        "createverifyembed",
        Value::Array(options),
        json!({ "channels": { "555": { "id": "555", "type": channel_type, "name": "welcome" } } }),
    )
}

#[actix_web::test]
async fn ping_is_answered_with_pong() {
    let harness = TestHarness::new();
    let (status, json) = send(&harness, signed_interaction(&json!({ "type": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "type": 1 }));
}

#[actix_web::test]
async fn unsigned_or_tampered_requests_are_rejected() {
    let harness = TestHarness::new();

    let (status, _) = send(
        &harness,
        test::TestRequest::post()
            .uri("/interactions")
            .set_json(json!({ "type": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &harness,
        signed_interaction(&json!({ "type": 1 })).set_payload(r#"{"type":2}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &harness,
        test::TestRequest::post()
            .uri("/interactions")
            .insert_header((SIGNATURE_HEADER, "00".repeat(64)))
            .insert_header((TIMESTAMP_HEADER, common::TIMESTAMP))
            .set_payload(r#"{"type":1}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn interactions_are_disabled_without_public_key() {
    let harness = TestHarness::without_interactions();
    let (status, _) = send(&harness, signed_interaction(&json!({ "type": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn verify_replies_with_personal_link() {
    let harness = TestHarness::new();
    let (status, json) = send(
        &harness,
        signed_interaction(&command("verify", json!([]), Value::Null)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["type"], 4);
    assert_eq!(json["data"]["flags"], 64);
    let embed = &json["data"]["embeds"][0];
    assert_eq!(embed["title"], "Verify Your Wallet");
    assert_eq!(embed["color"], 0x00ff99);
    assert_eq!(
        embed["description"],
        format!(
            "[Click here to verify your wallet]({}/verify?discordId=4242)",
            FRONTEND_URL
        )
    );
    assert_eq!(embed["footer"]["text"], "You only need to verify once.");
}

#[actix_web::test]
async fn create_verify_embed_posts_call_to_action() {
    let harness = TestHarness::new();
    let (status, json) = send(
        &harness,
        signed_interaction(&embed_command(
            0,
            &[("title", "Get your roles"), ("color", "#ff0000"), ("footer_text", "Thanks")],
        )),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["content"], "Verification embed created in <#555>");
    assert_eq!(json["data"]["flags"], 64);

    let posts = harness.messenger.posts();
    assert_eq!(posts.len(), 1);
    let (channel_id, message) = &posts[0];
    assert_eq!(channel_id, "555");
    let embed = &message.embeds[0];
    assert_eq!(embed.title.as_deref(), Some("Get your roles"));
    assert_eq!(embed.color, Some(0xff0000));
    assert_eq!(embed.footer.as_ref().map(|f| f.text.as_str()), Some("Thanks"));
    let button = &message.components[0].components[0];
    assert_eq!(button.label, "Verify Wallet");
    assert_eq!(
        button.url,
        format!("{}/verify?discordId=__USERID__", FRONTEND_URL)
    );
    assert!(message.flags.is_none());
}

#[actix_web::test]
async fn create_verify_embed_requires_text_channel() {
    let harness = TestHarness::new();
    // 2 is a guild voice channel.
    let (status, json) = send(&harness, signed_interaction(&embed_command(2, &[]))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["content"], "Please select a text channel.");
    assert!(harness.messenger.posts().is_empty());
}

#[actix_web::test]
async fn create_verify_embed_rejects_bad_color() {
    let harness = TestHarness::new();
    let (_, json) = send(
        &harness,
        signed_interaction(&embed_command(0, &[("color", "teal")])),
    )
    .await;

    assert!(
        json["data"]["content"]
            .as_str()
            .expect("content")
            .starts_with("Invalid color 'teal'")
    );
    assert!(harness.messenger.posts().is_empty());
}

#[actix_web::test]
async fn create_verify_embed_reports_post_failure() {
    let harness = TestHarness::new();
    harness.messenger.fail_posts();
    let (status, json) = send(&harness, signed_interaction(&embed_command(0, &[]))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["content"], "Failed to post the verification embed.");
    assert_eq!(json["data"]["flags"], 64);
}

#[actix_web::test]
async fn unknown_command_gets_ephemeral_reply() {
    let harness = TestHarness::new();
    let (status, json) = send(
        &harness,
        signed_interaction(&command("dance", json!([]), Value::Null)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["content"], "Unknown command.");
}
