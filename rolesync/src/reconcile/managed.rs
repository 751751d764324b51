// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::collections::BTreeSet;

use crate::roles::RoleId;

/// Roles this process is allowed to revoke. Built once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagedRoleSet {
    roles: BTreeSet<RoleId>,
}

impl ManagedRoleSet {
    pub fn new<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = RoleId>,
    {
        Self {
            roles: roles.into_iter().collect(),
        }
    }

    pub fn contains(&self, role: &RoleId) -> bool {
        self.roles.contains(role)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoleId> {
        self.roles.iter()
    }
}
