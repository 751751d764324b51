// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::Serialize;

pub const VERIFY_COMMAND: &str = "verify";
pub const CREATE_VERIFY_EMBED_COMMAND: &str = "createverifyembed";

const OPTION_STRING: u8 = 3;
const OPTION_CHANNEL: u8 = 7;
/// MANAGE_GUILD permission bit.
const MANAGE_GUILD: &str = "32";

#[derive(Debug, Clone, Serialize)]
pub struct CommandOptionDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: u8,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOptionDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_member_permissions: Option<&'static str>,
}

fn string_option(name: &'static str, description: &'static str) -> CommandOptionDefinition {
    CommandOptionDefinition {
        name,
        description,
        kind: OPTION_STRING,
        required: false,
    }
}

pub fn guild_commands() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition {
            name: VERIFY_COMMAND,
            description: "Get your wallet verification link",
            options: Vec::new(),
            default_member_permissions: None,
        },
        CommandDefinition {
            name: CREATE_VERIFY_EMBED_COMMAND,
            description: "Create a verification embed with a button",
            options: vec![
                CommandOptionDefinition {
                    name: "channel",
                    description: "Channel to send the embed to",
                    kind: OPTION_CHANNEL,
                    required: true,
                },
                string_option("title", "Embed title"),
                string_option("description", "Embed description"),
                string_option("color", "Embed color (hex, e.g. #00ff99)"),
                string_option("footer_text", "Footer text"),
                string_option("footer_url", "Footer icon URL"),
                string_option("thumbnail", "Thumbnail URL"),
                string_option("image", "Large image URL"),
            ],
            default_member_permissions: Some(MANAGE_GUILD),
        },
    ]
}
