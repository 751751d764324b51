// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Role reconciliation: snapshot the member, diff against the desired roles,
//! apply the difference.

pub mod executor;
pub mod locks;
pub mod managed;
pub mod plan;
pub mod snapshot;

pub use executor::{OperationOutcome, OutcomeStatus, ReconciliationReport, execute};
pub use locks::UserLocks;
pub use managed::ManagedRoleSet;
pub use plan::{Operation, OperationKind, ReconciliationPlan, plan};
pub use snapshot::{DesiredState, MembershipSnapshot};

use log::{debug, info, warn};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::membership::{MembershipStore, SnapshotError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    Snapshot(SnapshotError),
    TimedOut(Duration),
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::Snapshot(err) => write!(f, "{}", err),
            ReconcileError::TimedOut(limit) => {
                write!(f, "Reconciliation timed out after {}s", limit.as_secs())
            }
        }
    }
}

impl std::error::Error for ReconcileError {}

impl From<SnapshotError> for ReconcileError {
    fn from(err: SnapshotError) -> Self {
        ReconcileError::Snapshot(err)
    }
}

pub struct Reconciler {
    store: Arc<dyn MembershipStore>,
    managed: Arc<ManagedRoleSet>,
    locks: UserLocks,
    timeout: Duration,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn MembershipStore>,
        managed: Arc<ManagedRoleSet>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            managed,
            locks: UserLocks::new(),
            timeout,
        }
    }

    pub fn managed(&self) -> &ManagedRoleSet {
        &self.managed
    }

    /// Brings one member's roles in line with `desired`.
    ///
    /// Requests for the same member run one at a time. The timeout covers
    /// waiting for the lock as well as the platform calls; operations that
    /// completed before it fired stay applied.
    pub async fn reconcile(
        &self,
        desired: &DesiredState,
    ) -> Result<ReconciliationReport, ReconcileError> {
        match tokio::time::timeout(self.timeout, self.reconcile_locked(desired)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Reconciliation for {} exceeded {}s",
                    desired.user_id,
                    self.timeout.as_secs()
                );
                Err(ReconcileError::TimedOut(self.timeout))
            }
        }
    }

    async fn reconcile_locked(
        &self,
        desired: &DesiredState,
    ) -> Result<ReconciliationReport, ReconcileError> {
        let _guard = self.locks.acquire(&desired.user_id).await;

        let snapshot = MembershipSnapshot::capture(self.store.as_ref(), &desired.user_id).await?;
        let plan = plan(&snapshot, desired, &self.managed);
        debug!(
            "Planned {} operations for {} (holds {})",
            plan.len(),
            desired.user_id,
            snapshot.current_roles.len()
        );

        let report = execute(self.store.as_ref(), &desired.user_id, plan).await;
        info!("Reconciled {}: {}", desired.user_id, report.summary());
        Ok(report)
    }
}
