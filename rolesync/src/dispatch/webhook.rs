// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{HttpResponse, web};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error_body;
use crate::app_state::AppState;
use crate::reconcile::{DesiredState, ReconcileError, ReconciliationReport};
use crate::roles::{RoleId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid payload: {}", self.0)
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload {
    discord_id: String,
    roles: Vec<String>,
}

#[derive(Serialize)]
struct WebhookResponse<'a> {
    message: &'static str,
    summary: String,
    report: &'a ReconciliationReport,
}

/// Turns a raw webhook body into a typed desired state, or explains why not.
///
/// Only the shape is checked. Ids are passed through untouched; one the guild
/// does not know fails at the snapshot or on its own operation.
pub fn parse_desired_state(body: &[u8]) -> Result<DesiredState, ValidationError> {
    let payload: WebhookPayload =
        serde_json::from_slice(body).map_err(|e| ValidationError::new(e.to_string()))?;
    if payload.discord_id.is_empty() {
        return Err(ValidationError::new("discordId is required"));
    }
    let roles = payload.roles.into_iter().map(RoleId::new);
    Ok(DesiredState::new(UserId::new(payload.discord_id), roles))
}

pub async fn handle_webhook(body: web::Bytes, state: web::Data<AppState>) -> HttpResponse {
    let desired = match parse_desired_state(&body) {
        Ok(desired) => desired,
        Err(err) => {
            warn!("Rejected webhook payload: {}", err);
            return HttpResponse::BadRequest().json(error_body(err));
        }
    };
    info!(
        "Incoming webhook for {} with {} desired roles",
        desired.user_id,
        desired.desired_roles.len()
    );

    match state.reconciler.reconcile(&desired).await {
        Ok(report) => {
            if !report.is_clean() {
                warn!(
                    "Reconciliation for {} finished with {} failed operations",
                    desired.user_id,
                    report.failed()
                );
            }
            HttpResponse::Ok().json(WebhookResponse {
                message: "Roles reconciled",
                summary: report.summary(),
                report: &report,
            })
        }
        Err(ReconcileError::Snapshot(err)) => {
            error!("Error assigning roles to {}: {}", desired.user_id, err);
            HttpResponse::InternalServerError().json(error_body("Error assigning roles"))
        }
        Err(err @ ReconcileError::TimedOut(_)) => {
            error!("Error assigning roles to {}: {}", desired.user_id, err);
            HttpResponse::GatewayTimeout().json(error_body(err))
        }
    }
}
