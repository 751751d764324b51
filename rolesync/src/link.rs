// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::fmt;

use crate::roles::UserId;

pub const VERIFY_PATH: &str = "/verify";
pub const USER_ID_PARAM: &str = "discordId";
/// Stand-in user id for links shared in a channel, where every viewer gets the same URL.
pub const USER_ID_PLACEHOLDER: &str = "__USERID__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrlError(String);

impl fmt::Display for BaseUrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BaseUrlError {}

/// Absolute http(s) URL of the verification front end, without trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    pub fn parse(value: &str) -> Result<Self, BaseUrlError> {
        let trimmed = value.trim().trim_end_matches('/');
        let rest = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .ok_or_else(|| {
                BaseUrlError(format!("'{}' must start with http:// or https://", value))
            })?;
        let host = rest.split('/').next().unwrap_or_default();
        if host.is_empty() {
            return Err(BaseUrlError(format!("'{}' has no host", value)));
        }
        if rest.contains(['?', '#']) || rest.chars().any(char::is_whitespace) {
            return Err(BaseUrlError(format!(
                "'{}' must not contain a query, fragment or whitespace",
                value
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Link a member follows to verify. Stateless: the same user always gets the same URL.
pub fn issue(user_id: &UserId, base_url: &BaseUrl) -> String {
    format!(
        "{}{}?{}={}",
        base_url,
        VERIFY_PATH,
        USER_ID_PARAM,
        urlencoding::encode(user_id.as_str())
    )
}

pub fn placeholder_link(base_url: &BaseUrl) -> String {
    format!(
        "{}{}?{}={}",
        base_url, VERIFY_PATH, USER_ID_PARAM, USER_ID_PLACEHOLDER
    )
}
