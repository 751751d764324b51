// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use async_trait::async_trait;
use log::warn;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use super::{MembershipStore, OperationError, SnapshotError};
use crate::roles::{RoleId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipCall {
    Grant(UserId, RoleId),
    Revoke(UserId, RoleId),
}

#[derive(Default)]
struct MemoryState {
    members: HashMap<UserId, BTreeSet<RoleId>>,
    failing_roles: HashMap<RoleId, OperationError>,
    unreadable: HashSet<UserId>,
    calls: Vec<MembershipCall>,
}

/// Guild membership held in process memory.
///
/// Failures can be injected per role to exercise partial-failure paths.
#[derive(Clone, Default)]
pub struct InMemoryMembership {
    inner: Arc<RwLock<MemoryState>>,
}

impl InMemoryMembership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member<I, R>(self, user_id: impl Into<UserId>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleId>,
    {
        self.insert_member(user_id.into(), roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn insert_member(&self, user_id: UserId, roles: BTreeSet<RoleId>) {
        match self.inner.write() {
            Ok(mut guard) => {
                guard.members.insert(user_id, roles);
            }
            Err(_) => warn!("membership store lock poisoned; insert skipped"),
        }
    }

    /// Every grant or revoke touching `role` fails with `error`.
    pub fn fail_role(&self, role: impl Into<RoleId>, error: OperationError) {
        match self.inner.write() {
            Ok(mut guard) => {
                guard.failing_roles.insert(role.into(), error);
            }
            Err(_) => warn!("membership store lock poisoned; failure injection skipped"),
        }
    }

    /// Snapshot reads for `user_id` fail with a platform error.
    pub fn fail_reads_for(&self, user_id: impl Into<UserId>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.unreadable.insert(user_id.into());
        }
    }

    pub fn roles_of(&self, user_id: &UserId) -> Option<BTreeSet<RoleId>> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.members.get(user_id).cloned())
    }

    pub fn calls(&self) -> Vec<MembershipCall> {
        self.inner
            .read()
            .map(|guard| guard.calls.clone())
            .unwrap_or_default()
    }

    fn apply(&self, call: MembershipCall) -> Result<(), OperationError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| OperationError::Platform("membership store lock poisoned".to_string()))?;
        guard.calls.push(call.clone());

        let (user_id, role, grant) = match call {
            MembershipCall::Grant(user_id, role) => (user_id, role, true),
            MembershipCall::Revoke(user_id, role) => (user_id, role, false),
        };

        if let Some(error) = guard.failing_roles.get(&role) {
            return Err(error.clone());
        }

        let roles = guard
            .members
            .get_mut(&user_id)
            .ok_or_else(|| OperationError::Platform(format!("Unknown member {}", user_id)))?;
        if grant {
            roles.insert(role);
        } else {
            roles.remove(&role);
        }
        Ok(())
    }
}

#[async_trait]
impl MembershipStore for InMemoryMembership {
    async fn member_roles(&self, user_id: &UserId) -> Result<BTreeSet<RoleId>, SnapshotError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| SnapshotError::Platform("membership store lock poisoned".to_string()))?;
        if guard.unreadable.contains(user_id) {
            return Err(SnapshotError::Platform(format!(
                "Membership read failed for {}",
                user_id
            )));
        }
        guard
            .members
            .get(user_id)
            .cloned()
            .ok_or_else(|| SnapshotError::MemberNotFound(user_id.clone()))
    }

    async fn grant_role(&self, user_id: &UserId, role: &RoleId) -> Result<(), OperationError> {
        self.apply(MembershipCall::Grant(user_id.clone(), role.clone()))
    }

    async fn revoke_role(&self, user_id: &UserId, role: &RoleId) -> Result<(), OperationError> {
        self.apply(MembershipCall::Revoke(user_id.clone(), role.clone()))
    }
}
