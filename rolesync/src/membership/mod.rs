// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Access to the live guild membership.
//!
//! Reconciliation never talks to the platform directly; it goes through a
//! [`MembershipStore`] handed to it by the caller. The Discord REST client is
//! the production implementation and [`InMemoryMembership`] backs tests.

mod memory;

pub use memory::{InMemoryMembership, MembershipCall};

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt;

use crate::roles::{RoleId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    MemberNotFound(UserId),
    Platform(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::MemberNotFound(user_id) => {
                write!(f, "Member {} not found in guild", user_id)
            }
            SnapshotError::Platform(msg) => write!(f, "Failed to read membership: {}", msg),
        }
    }
}

impl std::error::Error for SnapshotError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    PermissionDenied(String),
    RoleNotFound(RoleId),
    Platform(String),
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            OperationError::RoleNotFound(role) => write!(f, "Role {} does not exist", role),
            OperationError::Platform(msg) => write!(f, "Platform error: {}", msg),
        }
    }
}

impl std::error::Error for OperationError {}

#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Reads the roles the member currently holds in the guild.
    async fn member_roles(&self, user_id: &UserId) -> Result<BTreeSet<RoleId>, SnapshotError>;

    async fn grant_role(&self, user_id: &UserId, role: &RoleId) -> Result<(), OperationError>;

    async fn revoke_role(&self, user_id: &UserId, role: &RoleId) -> Result<(), OperationError>;
}
