// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::warn;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::roles::UserId;

type LockTable = Arc<Mutex<HashMap<UserId, LockEntry>>>;

struct LockEntry {
    mutex: Arc<AsyncMutex<()>>,
    /// Holders plus waiters. The entry is dropped when this reaches zero.
    users: usize,
}

/// Serialises reconciliation per member. Different members never contend.
#[derive(Clone, Default)]
pub struct UserLocks {
    table: LockTable,
}

/// Counts one holder or waiter against a table entry until dropped, so a
/// waiter cancelled mid-acquire still releases its share.
struct Registration {
    user_id: UserId,
    table: LockTable,
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Ok(mut table) = self.table.lock() {
            let idle = match table.get_mut(&self.user_id) {
                Some(entry) => {
                    entry.users = entry.users.saturating_sub(1);
                    entry.users == 0
                }
                None => false,
            };
            if idle {
                table.remove(&self.user_id);
            }
        }
    }
}

pub struct UserLockGuard {
    _guard: OwnedMutexGuard<()>,
    _registration: Registration,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, user_id: &UserId) -> UserLockGuard {
        let mutex = match self.table.lock() {
            Ok(mut guard) => {
                let entry = guard.entry(user_id.clone()).or_insert_with(|| LockEntry {
                    mutex: Arc::new(AsyncMutex::new(())),
                    users: 0,
                });
                entry.users += 1;
                entry.mutex.clone()
            }
            Err(_) => {
                warn!("user lock table poisoned; reconciling {} unlocked", user_id);
                Arc::new(AsyncMutex::new(()))
            }
        };
        let registration = Registration {
            user_id: user_id.clone(),
            table: self.table.clone(),
        };

        UserLockGuard {
            _guard: mutex.lock_owned().await,
            _registration: registration,
        }
    }

    pub fn active(&self) -> usize {
        self.table.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}
