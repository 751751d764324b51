// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::collections::BTreeSet;

use crate::membership::{MembershipStore, SnapshotError};
use crate::roles::{RoleId, UserId};

/// Roles one member held at the moment they were read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipSnapshot {
    pub user_id: UserId,
    pub current_roles: BTreeSet<RoleId>,
}

impl MembershipSnapshot {
    pub fn new<I>(user_id: UserId, current_roles: I) -> Self
    where
        I: IntoIterator<Item = RoleId>,
    {
        Self {
            user_id,
            current_roles: current_roles.into_iter().collect(),
        }
    }

    pub async fn capture(
        store: &dyn MembershipStore,
        user_id: &UserId,
    ) -> Result<Self, SnapshotError> {
        let current_roles = store.member_roles(user_id).await?;
        Ok(Self {
            user_id: user_id.clone(),
            current_roles,
        })
    }

    pub fn holds(&self, role: &RoleId) -> bool {
        self.current_roles.contains(role)
    }
}

/// Roles an external authority says the member should hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredState {
    pub user_id: UserId,
    pub desired_roles: BTreeSet<RoleId>,
}

impl DesiredState {
    pub fn new<I>(user_id: UserId, desired_roles: I) -> Self
    where
        I: IntoIterator<Item = RoleId>,
    {
        Self {
            user_id,
            desired_roles: desired_roles.into_iter().collect(),
        }
    }

    pub fn wants(&self, role: &RoleId) -> bool {
        self.desired_roles.contains(role)
    }
}
