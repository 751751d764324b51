// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::{error, info};
use serde::Serialize;

use super::plan::{Operation, OperationKind, ReconciliationPlan};
use crate::membership::MembershipStore;
use crate::roles::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    #[serde(flatten)]
    pub operation: Operation,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl OperationOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// One outcome per planned operation, in plan order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReconciliationReport {
    outcomes: Vec<OperationOutcome>,
}

impl ReconciliationReport {
    pub fn outcomes(&self) -> &[OperationOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    pub fn summary(&self) -> String {
        if self.outcomes.is_empty() {
            return "Roles already up to date".to_string();
        }
        format!(
            "{} of {} role changes applied, {} failed",
            self.succeeded(),
            self.outcomes.len(),
            self.failed()
        )
    }
}

/// Applies every operation in order, one attempt each.
///
/// A failed operation is recorded and the rest still run. Nothing is rolled
/// back.
pub async fn execute(
    store: &dyn MembershipStore,
    user_id: &UserId,
    plan: ReconciliationPlan,
) -> ReconciliationReport {
    let mut outcomes = Vec::with_capacity(plan.len());

    for operation in plan {
        let result = match operation.kind {
            OperationKind::Grant => store.grant_role(user_id, &operation.role).await,
            OperationKind::Revoke => store.revoke_role(user_id, &operation.role).await,
        };

        let outcome = match result {
            Ok(()) => {
                info!("Applied {} for {}", operation, user_id);
                OperationOutcome {
                    operation,
                    status: OutcomeStatus::Success,
                    detail: None,
                }
            }
            Err(err) => {
                error!("Failed to {} for {}: {}", operation, user_id, err);
                OperationOutcome {
                    operation,
                    status: OutcomeStatus::Failure,
                    detail: Some(err.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }

    ReconciliationReport { outcomes }
}
