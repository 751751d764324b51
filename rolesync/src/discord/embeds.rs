// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};

pub const VERIFY_COLOR: u32 = 0x00ff99;
pub const DEFAULT_EMBED_TITLE: &str = "Verify Your Wallet";
pub const DEFAULT_EMBED_DESCRIPTION: &str =
    "Click the button below to verify your wallet and get your roles!";
pub const DEFAULT_EMBED_COLOR: &str = "#00ff99";
pub const VERIFY_BUTTON_LABEL: &str = "Verify Wallet";

const COMPONENT_ACTION_ROW: u8 = 1;
const COMPONENT_BUTTON: u8 = 2;
const BUTTON_STYLE_LINK: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedMedia {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedMedia>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkButton {
    #[serde(rename = "type")]
    pub kind: u8,
    pub style: u8,
    pub label: String,
    pub url: String,
}

impl LinkButton {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: COMPONENT_BUTTON,
            style: BUTTON_STYLE_LINK,
            label: label.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    pub kind: u8,
    pub components: Vec<LinkButton>,
}

impl ActionRow {
    pub fn new(components: Vec<LinkButton>) -> Self {
        Self {
            kind: COMPONENT_ACTION_ROW,
            components,
        }
    }
}

/// Body of a channel message or an interaction reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ActionRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

/// Free-text options of the call-to-action embed. Empty strings count as unset.
#[derive(Debug, Clone, Default)]
pub struct CallToActionOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub footer_text: Option<String>,
    pub footer_url: Option<String>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidColor(pub String);

/// Parses `#rrggbb` or `rrggbb` into an embed colour.
pub fn parse_color(value: &str) -> Result<u32, InvalidColor> {
    let hex = value.trim().trim_start_matches('#');
    if hex.is_empty() || hex.len() > 6 {
        return Err(InvalidColor(value.to_string()));
    }
    u32::from_str_radix(hex, 16).map_err(|_| InvalidColor(value.to_string()))
}

pub fn verify_link_embed(link: &str) -> Embed {
    Embed {
        title: Some(DEFAULT_EMBED_TITLE.to_string()),
        description: Some(format!("[Click here to verify your wallet]({})", link)),
        color: Some(VERIFY_COLOR),
        footer: Some(EmbedFooter {
            text: "You only need to verify once.".to_string(),
            icon_url: None,
        }),
        ..Embed::default()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn call_to_action_message(
    options: &CallToActionOptions,
    link: &str,
) -> Result<MessagePayload, InvalidColor> {
    let color = parse_color(
        non_empty(&options.color)
            .as_deref()
            .unwrap_or(DEFAULT_EMBED_COLOR),
    )?;

    let embed = Embed {
        title: Some(non_empty(&options.title).unwrap_or_else(|| DEFAULT_EMBED_TITLE.to_string())),
        description: Some(
            non_empty(&options.description)
                .unwrap_or_else(|| DEFAULT_EMBED_DESCRIPTION.to_string()),
        ),
        color: Some(color),
        footer: non_empty(&options.footer_text).map(|text| EmbedFooter {
            text,
            icon_url: non_empty(&options.footer_url),
        }),
        thumbnail: non_empty(&options.thumbnail).map(|url| EmbedMedia { url }),
        image: non_empty(&options.image).map(|url| EmbedMedia { url }),
    };

    Ok(MessagePayload {
        embeds: vec![embed],
        components: vec![ActionRow::new(vec![LinkButton::new(
            VERIFY_BUTTON_LABEL,
            link,
        )])],
        ..MessagePayload::default()
    })
}
