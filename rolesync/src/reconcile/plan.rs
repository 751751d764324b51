// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::Serialize;
use std::fmt;

use super::managed::ManagedRoleSet;
use super::snapshot::{DesiredState, MembershipSnapshot};
use crate::roles::RoleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Revoke,
    Grant,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Revoke => f.write_str("revoke"),
            OperationKind::Grant => f.write_str("grant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub role: RoleId,
}

impl Operation {
    pub fn grant(role: impl Into<RoleId>) -> Self {
        Self {
            kind: OperationKind::Grant,
            role: role.into(),
        }
    }

    pub fn revoke(role: impl Into<RoleId>) -> Self {
        Self {
            kind: OperationKind::Revoke,
            role: role.into(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.role)
    }
}

/// Ordered operations that move a member from a snapshot to a desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    operations: Vec<Operation>,
}

impl ReconciliationPlan {
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }
}

impl IntoIterator for ReconciliationPlan {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

/// Computes the revokes and grants needed to reach `desired`.
///
/// Only managed roles are ever revoked; any desired role the member lacks is
/// granted, managed or not. Revokes come first so exclusive tiers are never
/// held together. Both groups are sorted by role id, so the same inputs
/// always yield the same plan.
pub fn plan(
    snapshot: &MembershipSnapshot,
    desired: &DesiredState,
    managed: &ManagedRoleSet,
) -> ReconciliationPlan {
    // BTreeSet iteration is already ordered by role id.
    let revokes = snapshot
        .current_roles
        .iter()
        .filter(|role| managed.contains(role) && !desired.wants(role))
        .cloned()
        .map(Operation::revoke);

    let grants = desired
        .desired_roles
        .iter()
        .filter(|role| !snapshot.holds(role))
        .cloned()
        .map(Operation::grant);

    ReconciliationPlan {
        operations: revokes.chain(grants).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::UserId;

    fn ids(values: &[&str]) -> Vec<RoleId> {
        values.iter().map(|value| RoleId::from(*value)).collect()
    }

    fn plan_for(managed: &[&str], current: &[&str], desired: &[&str]) -> ReconciliationPlan {
        let user = UserId::from("1");
        plan(
            &MembershipSnapshot::new(user.clone(), ids(current)),
            &DesiredState::new(user, ids(desired)),
            &ManagedRoleSet::new(ids(managed)),
        )
    }

    #[test]
    fn revokes_stale_managed_role_and_grants_missing_one() {
        let plan = plan_for(&["A", "B", "C"], &["A", "B"], &["B", "C"]);
        assert_eq!(
            plan.operations(),
            &[Operation::revoke("A"), Operation::grant("C")]
        );
    }

    #[test]
    fn empty_everything_yields_empty_plan() {
        assert!(plan_for(&["A", "B", "C"], &[], &[]).is_empty());
    }

    #[test]
    fn unmanaged_roles_are_never_revoked() {
        let plan = plan_for(&["A"], &["A", "X"], &[]);
        assert_eq!(plan.operations(), &[Operation::revoke("A")]);
    }

    #[test]
    fn unmanaged_desired_role_is_still_granted() {
        let plan = plan_for(&["A"], &[], &["Z"]);
        assert_eq!(plan.operations(), &[Operation::grant("Z")]);
    }

    #[test]
    fn held_and_desired_role_is_a_no_op() {
        assert!(plan_for(&["A"], &["A"], &["A"]).is_empty());
    }

    #[test]
    fn operations_are_sorted_within_each_group() {
        let plan = plan_for(&["c", "a", "b"], &["c", "a", "b"], &["z", "y"]);
        assert_eq!(
            plan.operations(),
            &[
                Operation::revoke("a"),
                Operation::revoke("b"),
                Operation::revoke("c"),
                Operation::grant("y"),
                Operation::grant("z"),
            ]
        );
    }

    /// All subsets of a small universe, used to check plan properties exhaustively.
    fn subsets(universe: &[&'static str]) -> Vec<Vec<&'static str>> {
        (0..(1u32 << universe.len()))
            .map(|mask| {
                universe
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, value)| *value)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn plan_properties_hold_for_all_small_inputs() {
        let universe = ["A", "B", "C", "X"];
        let all = subsets(&universe);
        for managed in &all {
            for current in &all {
                for desired in &all {
                    let first = plan_for(managed, current, desired);
                    let second = plan_for(managed, current, desired);
                    assert_eq!(first, second, "plan must be deterministic");

                    let mut seen_grant = false;
                    for op in first.iter() {
                        let role = op.role.as_str();
                        match op.kind {
                            OperationKind::Revoke => {
                                assert!(!seen_grant, "revoke after grant in {:?}", first);
                                assert!(managed.contains(&role));
                                assert!(current.contains(&role));
                                assert!(!desired.contains(&role));
                            }
                            OperationKind::Grant => {
                                seen_grant = true;
                                assert!(desired.contains(&role));
                                assert!(!current.contains(&role));
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn applying_a_plan_converges() {
        let universe = ["A", "B", "C", "X"];
        let all = subsets(&universe);
        for managed in &all {
            for current in &all {
                for desired in &all {
                    let plan = plan_for(managed, current, desired);
                    let mut after: Vec<&str> = current.clone();
                    for op in plan.iter() {
                        match op.kind {
                            OperationKind::Revoke => after.retain(|role| *role != op.role.as_str()),
                            OperationKind::Grant => after.push(op.role.as_str()),
                        }
                    }
                    assert!(
                        plan_for(managed, &after, desired).is_empty(),
                        "re-planning after {:?} was not empty",
                        plan
                    );
                }
            }
        }
    }
}
