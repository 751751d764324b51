// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use rolesync::app_state::AppState;
use rolesync::config::{Config, ValidatedConfig};
use rolesync::discord::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use rolesync::discord::{ChannelMessenger, DiscordError, MessagePayload};
use rolesync::dispatch;
use rolesync::membership::InMemoryMembership;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const FRONTEND_URL: &str = "https://verify.example.com";
pub const ROLE_ANY: &str = "100";
pub const ROLE_1K: &str = "101";
pub const ROLE_10K: &str = "102";
pub const ROLE_100K: &str = "103";
pub const TIMESTAMP: &str = "1700000000";

/// Records channel posts instead of sending them.
#[derive(Clone, Default)]
pub struct RecordingMessenger {
    posts: Arc<Mutex<Vec<(String, MessagePayload)>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingMessenger {
    pub fn posts(&self) -> Vec<(String, MessagePayload)> {
        self.posts.lock().expect("posts lock").clone()
    }

    pub fn fail_posts(&self) {
        *self.fail.lock().expect("fail lock") = true;
    }
}

#[async_trait]
impl ChannelMessenger for RecordingMessenger {
    async fn post_message(
        &self,
        channel_id: &str,
        message: &MessagePayload,
    ) -> Result<(), DiscordError> {
        if *self.fail.lock().expect("fail lock") {
            return Err(DiscordError::Api {
                status: 403,
                code: Some(50001),
                message: "Missing Access".to_string(),
            });
        }
        self.posts
            .lock()
            .expect("posts lock")
            .push((channel_id.to_string(), message.clone()));
        Ok(())
    }
}

pub fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&[7u8; 32])
}

pub fn test_config(with_public_key: bool) -> ValidatedConfig {
    let mut env = HashMap::from([
        ("DISCORD_TOKEN", "test-token".to_string()),
        ("CLIENT_ID", "1000".to_string()),
        ("GUILD_ID", "2000".to_string()),
        ("FRONTEND_URL", format!("{}/", FRONTEND_URL)),
        ("ROLE_ANY_ID", ROLE_ANY.to_string()),
        ("ROLE_1K_ID", ROLE_1K.to_string()),
        ("ROLE_10K_ID", ROLE_10K.to_string()),
        ("ROLE_100K_ID", ROLE_100K.to_string()),
        ("RECONCILE_TIMEOUT_SECONDS", "5".to_string()),
    ]);
    if with_public_key {
        env.insert(
            "DISCORD_PUBLIC_KEY",
            hex::encode(signing_key().verifying_key().to_bytes()),
        );
    }

    let mut config = Config::default();
    config
        .apply_env(|name| env.get(name).cloned())
        .expect("apply env");
    config.validate().expect("valid test config")
}

pub struct TestHarness {
    pub config: Arc<ValidatedConfig>,
    pub membership: InMemoryMembership,
    pub messenger: RecordingMessenger,
    pub app_state: Arc<AppState>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_membership(InMemoryMembership::new())
    }

    pub fn with_membership(membership: InMemoryMembership) -> Self {
        Self::build(membership, true)
    }

    pub fn without_interactions() -> Self {
        Self::build(InMemoryMembership::new(), false)
    }

    fn build(membership: InMemoryMembership, with_public_key: bool) -> Self {
        let config = Arc::new(test_config(with_public_key));
        let messenger = RecordingMessenger::default();
        let app_state = AppState::new(
            config.clone(),
            Arc::new(membership.clone()),
            Arc::new(messenger.clone()),
        )
        .expect("app state");
        Self {
            config,
            membership,
            messenger,
            app_state: Arc::new(app_state),
        }
    }
}

pub fn build_test_app(
    app_state: Arc<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::from(app_state))
        .configure(dispatch::configure)
}

/// Signs `body` the way Discord signs interaction requests.
pub fn signed_interaction(body: &serde_json::Value) -> actix_web::test::TestRequest {
    let payload = serde_json::to_vec(body).expect("interaction json");
    let message = [TIMESTAMP.as_bytes(), payload.as_slice()].concat();
    let signature = hex::encode(signing_key().sign(&message).to_bytes());
    actix_web::test::TestRequest::post()
        .uri("/interactions")
        .insert_header((SIGNATURE_HEADER, signature))
        .insert_header((TIMESTAMP_HEADER, TIMESTAMP))
        .insert_header(("content-type", "application/json"))
        .set_payload(payload)
}
