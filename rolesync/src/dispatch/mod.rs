// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Inbound HTTP surface: the verification webhook and Discord interactions.

use actix_web::{HttpResponse, web};
use serde_json::json;

pub mod interactions;
pub mod webhook;

pub use interactions::{dispatch_interaction, handle_interaction};
pub use webhook::{ValidationError, handle_webhook, parse_desired_state};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/webhook", web::post().to(handle_webhook))
        .route("/interactions", web::post().to(handle_interaction))
        .route("/health", web::get().to(health));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub(crate) fn error_body(message: impl std::fmt::Display) -> serde_json::Value {
    json!({ "error": message.to_string() })
}
