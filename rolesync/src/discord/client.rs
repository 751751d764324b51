// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use async_trait::async_trait;
use log::debug;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;

use super::commands::CommandDefinition;
use super::embeds::MessagePayload;
use super::{ChannelMessenger, DiscordError, UNKNOWN_MEMBER, UNKNOWN_ROLE};
use crate::config::ValidatedDiscordConfig;
use crate::membership::{MembershipStore, OperationError, SnapshotError};
use crate::roles::{RoleId, UserId};

const USER_AGENT: &str = concat!("DiscordBot (rolesync, ", env!("CARGO_PKG_VERSION"), ")");
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Deserialize)]
struct GuildMember {
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    code: Option<u64>,
    message: Option<String>,
}

/// REST client scoped to one application and one guild.
#[derive(Clone)]
pub struct DiscordClient {
    http: Client,
    api_base: String,
    token: String,
    application_id: String,
    guild_id: String,
}

impl DiscordClient {
    pub fn new(config: &ValidatedDiscordConfig) -> Result<Self, DiscordError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            token: config.token.clone(),
            application_id: config.application_id.clone(),
            guild_id: config.guild_id.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn member_role_path(&self, user_id: &UserId, role: &RoleId) -> String {
        format!(
            "/guilds/{}/members/{}/roles/{}",
            self.guild_id,
            urlencoding::encode(user_id.as_str()),
            urlencoding::encode(role.as_str())
        )
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DiscordError> {
        let response = request
            .header(AUTHORIZATION, format!("Bot {}", self.token))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(body) => (body.code, body.message.unwrap_or_default()),
            Err(_) => (None, text),
        };
        Err(DiscordError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    pub async fn fetch_member_roles(&self, user_id: &UserId) -> Result<Vec<String>, DiscordError> {
        let path = format!(
            "/guilds/{}/members/{}",
            self.guild_id,
            urlencoding::encode(user_id.as_str())
        );
        let response = self.send(self.http.get(self.url(&path))).await?;
        let member: GuildMember = response.json().await?;
        Ok(member.roles)
    }

    pub async fn add_member_role(&self, user_id: &UserId, role: &RoleId) -> Result<(), DiscordError> {
        let path = self.member_role_path(user_id, role);
        self.send(self.http.put(self.url(&path))).await?;
        Ok(())
    }

    pub async fn remove_member_role(
        &self,
        user_id: &UserId,
        role: &RoleId,
    ) -> Result<(), DiscordError> {
        let path = self.member_role_path(user_id, role);
        self.send(self.http.delete(self.url(&path))).await?;
        Ok(())
    }

    /// Replaces the guild's command set with `commands`.
    pub async fn register_guild_commands(
        &self,
        commands: &[CommandDefinition],
    ) -> Result<(), DiscordError> {
        let path = format!(
            "/applications/{}/guilds/{}/commands",
            self.application_id, self.guild_id
        );
        self.send(self.http.put(self.url(&path)).json(commands))
            .await?;
        Ok(())
    }

    pub async fn create_message(
        &self,
        channel_id: &str,
        message: &MessagePayload,
    ) -> Result<(), DiscordError> {
        let path = format!("/channels/{}/messages", urlencoding::encode(channel_id));
        self.send(self.http.post(self.url(&path)).json(message))
            .await?;
        Ok(())
    }
}

fn snapshot_error(err: DiscordError, user_id: &UserId) -> SnapshotError {
    match (err.status(), err.code()) {
        (Some(404), Some(UNKNOWN_MEMBER)) => SnapshotError::MemberNotFound(user_id.clone()),
        _ => SnapshotError::Platform(err.to_string()),
    }
}

fn operation_error(err: DiscordError, role: &RoleId) -> OperationError {
    match (err.status(), err.code()) {
        (Some(403), _) => OperationError::PermissionDenied(err.to_string()),
        (Some(404), Some(UNKNOWN_ROLE)) => OperationError::RoleNotFound(role.clone()),
        _ => OperationError::Platform(err.to_string()),
    }
}

#[async_trait]
impl MembershipStore for DiscordClient {
    async fn member_roles(&self, user_id: &UserId) -> Result<BTreeSet<RoleId>, SnapshotError> {
        let roles = self
            .fetch_member_roles(user_id)
            .await
            .map_err(|err| snapshot_error(err, user_id))?;
        debug!("Member {} holds {} roles", user_id, roles.len());
        Ok(roles.into_iter().map(RoleId::new).collect())
    }

    async fn grant_role(&self, user_id: &UserId, role: &RoleId) -> Result<(), OperationError> {
        self.add_member_role(user_id, role)
            .await
            .map_err(|err| operation_error(err, role))
    }

    async fn revoke_role(&self, user_id: &UserId, role: &RoleId) -> Result<(), OperationError> {
        self.remove_member_role(user_id, role)
            .await
            .map_err(|err| operation_error(err, role))
    }
}

#[async_trait]
impl ChannelMessenger for DiscordClient {
    async fn post_message(
        &self,
        channel_id: &str,
        message: &MessagePayload,
    ) -> Result<(), DiscordError> {
        self.create_message(channel_id, message).await
    }
}
