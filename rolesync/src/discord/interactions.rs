// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! The subset of Discord's interaction payloads the bot reads and writes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::embeds::{Embed, MessagePayload};

pub const INTERACTION_PING: u8 = 1;
pub const INTERACTION_APPLICATION_COMMAND: u8 = 2;

pub const RESPONSE_PONG: u8 = 1;
pub const RESPONSE_CHANNEL_MESSAGE: u8 = 4;

pub const FLAG_EPHEMERAL: u64 = 1 << 6;

pub const CHANNEL_GUILD_TEXT: u8 = 0;

#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub data: Option<CommandData>,
    #[serde(default)]
    pub member: Option<InteractionMember>,
    #[serde(default)]
    pub user: Option<InteractionUser>,
}

impl Interaction {
    /// Guild interactions carry the invoker under `member`, DMs under `user`.
    pub fn user_id(&self) -> Option<&str> {
        self.member
            .as_ref()
            .map(|member| member.user.id.as_str())
            .or_else(|| self.user.as_ref().map(|user| user.id.as_str()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionMember {
    pub user: InteractionUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionUser {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
    #[serde(default)]
    pub resolved: Option<ResolvedData>,
}

impl CommandData {
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options
            .iter()
            .find(|option| option.name == name)
            .and_then(|option| option.value.as_ref())
    }

    pub fn string_option(&self, name: &str) -> Option<String> {
        self.option(name)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn resolved_channel(&self, id: &str) -> Option<&ResolvedChannel> {
        self.resolved
            .as_ref()
            .and_then(|resolved| resolved.channels.get(id))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolvedData {
    #[serde(default)]
    pub channels: HashMap<String, ResolvedChannel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolvedChannel {
    #[serde(rename = "type")]
    pub kind: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MessagePayload>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self {
            kind: RESPONSE_PONG,
            data: None,
        }
    }

    pub fn ephemeral_text(content: impl Into<String>) -> Self {
        Self {
            kind: RESPONSE_CHANNEL_MESSAGE,
            data: Some(MessagePayload {
                content: Some(content.into()),
                flags: Some(FLAG_EPHEMERAL),
                ..MessagePayload::default()
            }),
        }
    }

    pub fn ephemeral_embed(embed: Embed) -> Self {
        Self {
            kind: RESPONSE_CHANNEL_MESSAGE,
            data: Some(MessagePayload {
                embeds: vec![embed],
                flags: Some(FLAG_EPHEMERAL),
                ..MessagePayload::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_guild_command_with_resolved_channel() {
        let interaction: Interaction = serde_json::from_value(serde_json::json!({
            "id": "1",
            "type": 2,
            "token": "tok",
            "guild_id": "2000",
            "member": { "user": { "id": "42", "username": "alice" }, "roles": [] },
            "data": {
                "id": "3",
                "name": "createverifyembed",
                "options": [
                    { "name": "channel", "type": 7, "value": "555" },
                    { "name": "title", "type": 3, "value": "Hello" }
                ],
                "resolved": { "channels": { "555": { "id": "555", "type": 0, "name": "general" } } }
            }
        }))
        .expect("interaction");

        assert_eq!(interaction.user_id(), Some("42"));
        let data = interaction.data.expect("data");
        assert_eq!(data.string_option("title").as_deref(), Some("Hello"));
        assert_eq!(data.string_option("missing"), None);
        assert_eq!(
            data.resolved_channel("555").map(|channel| channel.kind),
            Some(CHANNEL_GUILD_TEXT)
        );
    }

    #[test]
    fn dm_interactions_use_top_level_user() {
        let interaction: Interaction =
            serde_json::from_value(serde_json::json!({ "type": 2, "user": { "id": "7" } }))
                .expect("interaction");
        assert_eq!(interaction.user_id(), Some("7"));
    }

    #[test]
    fn ephemeral_reply_sets_flag() {
        let json = serde_json::to_value(InteractionResponse::ephemeral_text("hi")).expect("json");
        assert_eq!(
            json,
            serde_json::json!({ "type": 4, "data": { "content": "hi", "flags": 64 } })
        );
    }
}
