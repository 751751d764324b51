// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{HttpRequest, HttpResponse, web};
use log::{debug, error, info, warn};

use super::error_body;
use crate::app_state::AppState;
use crate::discord::commands::{CREATE_VERIFY_EMBED_COMMAND, VERIFY_COMMAND};
use crate::discord::embeds::{CallToActionOptions, call_to_action_message, verify_link_embed};
use crate::discord::interactions::{
    CHANNEL_GUILD_TEXT, CommandData, INTERACTION_APPLICATION_COMMAND, INTERACTION_PING,
    Interaction, InteractionResponse,
};
use crate::discord::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::link;
use crate::roles::UserId;

pub const UNKNOWN_COMMAND_REPLY: &str = "Unknown command.";
pub const TEXT_CHANNEL_REQUIRED_REPLY: &str = "Please select a text channel.";
pub const POST_FAILED_REPLY: &str = "Failed to post the verification embed.";

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|value| value.to_str().ok())
}

pub async fn handle_interaction(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> HttpResponse {
    let Some(verifier) = state.verifier.as_ref() else {
        return HttpResponse::NotFound().finish();
    };

    let (Some(signature), Some(timestamp)) =
        (header(&req, SIGNATURE_HEADER), header(&req, TIMESTAMP_HEADER))
    else {
        return HttpResponse::Unauthorized().json(error_body("Missing request signature"));
    };
    if let Err(err) = verifier.verify(signature, timestamp, &body) {
        warn!("Rejected interaction: {}", err);
        return HttpResponse::Unauthorized().json(error_body("Invalid request signature"));
    }

    let interaction: Interaction = match serde_json::from_slice(&body) {
        Ok(interaction) => interaction,
        Err(err) => {
            warn!("Malformed interaction payload: {}", err);
            return HttpResponse::BadRequest().json(error_body("Malformed interaction"));
        }
    };

    match dispatch_interaction(&state, interaction).await {
        Some(response) => HttpResponse::Ok().json(response),
        None => HttpResponse::BadRequest().json(error_body("Unsupported interaction type")),
    }
}

/// Answers a verified interaction. `None` for interaction types the bot does not handle.
pub async fn dispatch_interaction(
    state: &AppState,
    interaction: Interaction,
) -> Option<InteractionResponse> {
    match interaction.kind {
        INTERACTION_PING => Some(InteractionResponse::pong()),
        INTERACTION_APPLICATION_COMMAND => Some(run_command(state, &interaction).await),
        other => {
            debug!("Ignoring interaction of type {}", other);
            None
        }
    }
}

async fn run_command(state: &AppState, interaction: &Interaction) -> InteractionResponse {
    let Some(data) = interaction.data.as_ref() else {
        return InteractionResponse::ephemeral_text(UNKNOWN_COMMAND_REPLY);
    };
    match data.name.as_str() {
        VERIFY_COMMAND => verify(state, interaction),
        CREATE_VERIFY_EMBED_COMMAND => create_verify_embed(state, data).await,
        other => {
            warn!("Unknown command '{}'", other);
            InteractionResponse::ephemeral_text(UNKNOWN_COMMAND_REPLY)
        }
    }
}

fn verify(state: &AppState, interaction: &Interaction) -> InteractionResponse {
    let Some(user_id) = interaction.user_id() else {
        return InteractionResponse::ephemeral_text("Could not determine who ran this command.");
    };
    let url = link::issue(&UserId::from(user_id), &state.config.frontend_url);
    info!("Issued verification link to {}", user_id);
    InteractionResponse::ephemeral_embed(verify_link_embed(&url))
}

async fn create_verify_embed(state: &AppState, data: &CommandData) -> InteractionResponse {
    let channel_id = match data.string_option("channel") {
        Some(id) if data.resolved_channel(&id).map(|c| c.kind) == Some(CHANNEL_GUILD_TEXT) => id,
        _ => return InteractionResponse::ephemeral_text(TEXT_CHANNEL_REQUIRED_REPLY),
    };

    let options = CallToActionOptions {
        title: data.string_option("title"),
        description: data.string_option("description"),
        color: data.string_option("color"),
        footer_text: data.string_option("footer_text"),
        footer_url: data.string_option("footer_url"),
        thumbnail: data.string_option("thumbnail"),
        image: data.string_option("image"),
    };
    let message =
        match call_to_action_message(&options, &link::placeholder_link(&state.config.frontend_url))
        {
            Ok(message) => message,
            Err(invalid) => {
                return InteractionResponse::ephemeral_text(format!(
                    "Invalid color '{}'. Use a hex value such as #00ff99.",
                    invalid.0
                ));
            }
        };

    if let Err(err) = state.messenger.post_message(&channel_id, &message).await {
        error!("Failed to post verification embed in {}: {}", channel_id, err);
        return InteractionResponse::ephemeral_text(POST_FAILED_REPLY);
    }
    info!("Verification embed created in channel {}", channel_id);
    InteractionResponse::ephemeral_text(format!("Verification embed created in <#{}>", channel_id))
}
