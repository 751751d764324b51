// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod client;
pub mod commands;
pub mod embeds;
pub mod interactions;
pub mod signature;

pub use client::DiscordClient;
pub use embeds::MessagePayload;
pub use signature::InteractionVerifier;

use async_trait::async_trait;
use std::fmt;

/// JSON error code Discord returns with a 404 for a user who is not in the guild.
pub const UNKNOWN_MEMBER: u64 = 10007;
/// JSON error code Discord returns with a 404 for a role that no longer exists.
pub const UNKNOWN_ROLE: u64 = 10011;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscordError {
    Transport(String),
    Api {
        status: u16,
        code: Option<u64>,
        message: String,
    },
    Decode(String),
}

impl DiscordError {
    pub fn status(&self) -> Option<u16> {
        match self {
            DiscordError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<u64> {
        match self {
            DiscordError::Api { code, .. } => *code,
            _ => None,
        }
    }
}

impl fmt::Display for DiscordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscordError::Transport(msg) => write!(f, "Discord request failed: {}", msg),
            DiscordError::Api {
                status,
                code: Some(code),
                message,
            } => write!(f, "Discord API error {} (code {}): {}", status, code, message),
            DiscordError::Api {
                status,
                code: None,
                message,
            } => write!(f, "Discord API error {}: {}", status, message),
            DiscordError::Decode(msg) => write!(f, "Unexpected Discord response: {}", msg),
        }
    }
}

impl std::error::Error for DiscordError {}

impl From<reqwest::Error> for DiscordError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DiscordError::Decode(err.to_string())
        } else {
            DiscordError::Transport(err.to_string())
        }
    }
}

/// Posts messages into guild channels.
#[async_trait]
pub trait ChannelMessenger: Send + Sync {
    async fn post_message(
        &self,
        channel_id: &str,
        message: &MessagePayload,
    ) -> Result<(), DiscordError>;
}
