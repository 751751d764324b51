// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::sync::Arc;

use crate::config::ValidatedConfig;
use crate::discord::signature::SignatureError;
use crate::discord::{ChannelMessenger, InteractionVerifier};
use crate::membership::MembershipStore;
use crate::reconcile::Reconciler;

pub struct AppState {
    pub config: Arc<ValidatedConfig>,
    pub reconciler: Reconciler,
    pub messenger: Arc<dyn ChannelMessenger>,
    /// Present only when an application public key is configured.
    pub verifier: Option<InteractionVerifier>,
}

impl AppState {
    pub fn new(
        config: Arc<ValidatedConfig>,
        membership: Arc<dyn MembershipStore>,
        messenger: Arc<dyn ChannelMessenger>,
    ) -> Result<Self, SignatureError> {
        let verifier = config
            .discord
            .public_key
            .as_deref()
            .map(InteractionVerifier::from_hex)
            .transpose()?;
        let reconciler = Reconciler::new(
            membership,
            Arc::new(config.managed_roles.clone()),
            config.reconcile_timeout,
        );
        Ok(Self {
            config,
            reconciler,
            messenger,
            verifier,
        })
    }
}
