// This file is part of the product RoleSync.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::link::BaseUrl;
use crate::reconcile::ManagedRoleSet;
use crate::roles::{RoleId, normalize_managed_role};

pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DiscordConfig {
    pub token: Option<String>,
    pub application_id: Option<String>,
    pub guild_id: Option<String>,
    pub public_key: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_register_commands")]
    pub register_commands: bool,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: None,
            application_id: None,
            guild_id: None,
            public_key: None,
            api_base: default_api_base(),
            register_commands: default_register_commands(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_register_commands() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: Option<u16>,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
            workers: default_workers(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_workers() -> usize {
    4
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Tier roles plus any extra roles the bot may revoke.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RolesConfig {
    pub any: Option<String>,
    pub tier_1k: Option<String>,
    pub tier_10k: Option<String>,
    pub tier_100k: Option<String>,
    #[serde(default)]
    pub extra: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReconcileConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub discord: DiscordConfig,
    pub frontend_url: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub roles: RolesConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    /// Recoverable problems found while loading, logged once logging is up.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ValidatedDiscordConfig {
    pub token: String,
    pub application_id: String,
    pub guild_id: String,
    pub public_key: Option<String>,
    pub api_base: String,
    pub register_commands: bool,
}

#[derive(Debug, Clone)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ListenConfig {
    pub fn address_tuple(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub discord: ValidatedDiscordConfig,
    pub frontend_url: BaseUrl,
    pub server: ListenConfig,
    pub logging: LoggingConfig,
    pub managed_roles: ManagedRoleSet,
    pub reconcile_timeout: Duration,
    pub warnings: Vec<String>,
}

impl Config {
    /// Reads `config.yaml` from `root`. A missing file yields an empty config so
    /// the environment alone can drive the process.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Self::from_yaml(&config_content).map_err(|e| match e {
            ConfigError::LoadError(msg) => ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// Overlays environment variables; set variables win over file values.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(value) = get("DISCORD_TOKEN") {
            self.discord.token = Some(value);
        }
        if let Some(value) = get("CLIENT_ID") {
            self.discord.application_id = Some(value);
        }
        if let Some(value) = get("GUILD_ID") {
            self.discord.guild_id = Some(value);
        }
        if let Some(value) = get("DISCORD_PUBLIC_KEY") {
            self.discord.public_key = Some(value);
        }
        if let Some(value) = get("DISCORD_API_BASE") {
            self.discord.api_base = value;
        }
        if let Some(value) = get("REGISTER_COMMANDS") {
            self.discord.register_commands = parse_bool("REGISTER_COMMANDS", &value)?;
        }
        if let Some(value) = get("FRONTEND_URL") {
            self.frontend_url = Some(value);
        }
        if let Some(value) = get("HOST") {
            self.server.host = value;
        }
        if let Some(value) = get("PORT") {
            let port = match value.trim().parse::<u16>() {
                Ok(port) if port != 0 => port,
                _ => {
                    self.warnings.push(format!(
                        "PORT '{}' is not a port number, using {}",
                        value, DEFAULT_PORT
                    ));
                    DEFAULT_PORT
                }
            };
            self.server.port = Some(port);
        }
        if let Some(value) = get("LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = get("ROLE_ANY_ID") {
            self.roles.any = Some(value);
        }
        if let Some(value) = get("ROLE_1K_ID") {
            self.roles.tier_1k = Some(value);
        }
        if let Some(value) = get("ROLE_10K_ID") {
            self.roles.tier_10k = Some(value);
        }
        if let Some(value) = get("ROLE_100K_ID") {
            self.roles.tier_100k = Some(value);
        }
        if let Some(value) = get("RECONCILE_TIMEOUT_SECONDS") {
            self.reconcile.timeout_seconds = value.trim().parse::<u64>().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "RECONCILE_TIMEOUT_SECONDS must be a number, got: {}",
                    value
                ))
            })?;
        }
        Ok(())
    }

    /// Loads and validates configuration at startup. If validation fails, the application should not start.
    pub fn load_and_validate(root: &Path) -> Result<ValidatedConfig, ConfigError> {
        let mut config = Self::load(root)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let token = required(self.discord.token, "DISCORD_TOKEN")?;
        let application_id = required_snowflake(self.discord.application_id, "CLIENT_ID")?;
        let guild_id = required_snowflake(self.discord.guild_id, "GUILD_ID")?;
        let frontend_url = required(self.frontend_url, "FRONTEND_URL")?;
        let frontend_url = BaseUrl::parse(&frontend_url)
            .map_err(|e| ConfigError::ValidationError(format!("FRONTEND_URL: {}", e)))?;

        let public_key = self
            .discord
            .public_key
            .as_deref()
            .map(validate_public_key)
            .transpose()?;

        let api_base = self.discord.api_base.trim().trim_end_matches('/').to_string();
        if !api_base.starts_with("https://") && !api_base.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "discord.api_base must be an http(s) URL, got: {}",
                api_base
            )));
        }

        Self::validate_logging(&self.logging)?;

        if self.server.workers == 0 {
            return Err(ConfigError::ValidationError(
                "server.workers must be at least 1".to_string(),
            ));
        }

        let timeout_seconds = self.reconcile.timeout_seconds;
        if !(1..=600).contains(&timeout_seconds) {
            return Err(ConfigError::ValidationError(format!(
                "reconcile.timeout_seconds must be between 1 and 600, got: {}",
                timeout_seconds
            )));
        }

        let managed_roles = Self::build_managed_roles(&self.roles)?;

        Ok(ValidatedConfig {
            discord: ValidatedDiscordConfig {
                token,
                application_id,
                guild_id,
                public_key,
                api_base,
                register_commands: self.discord.register_commands,
            },
            frontend_url,
            server: ListenConfig {
                host: self.server.host,
                port: self.server.port.unwrap_or(DEFAULT_PORT),
                workers: self.server.workers,
            },
            logging: self.logging,
            managed_roles,
            reconcile_timeout: Duration::from_secs(timeout_seconds),
            warnings: self.warnings,
        })
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        match logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::ValidationError(format!(
                "logging.level must be one of trace, debug, info, warn, error; got: {}",
                other
            ))),
        }
    }

    fn build_managed_roles(roles: &RolesConfig) -> Result<ManagedRoleSet, ConfigError> {
        let tiers = [
            roles.any.as_deref(),
            roles.tier_1k.as_deref(),
            roles.tier_10k.as_deref(),
            roles.tier_100k.as_deref(),
        ];
        let mut managed: Vec<RoleId> = Vec::new();
        // Absent or blank tier slots are simply not managed.
        for role in tiers
            .into_iter()
            .flatten()
            .chain(roles.extra.iter().map(String::as_str))
            .filter(|role| !role.trim().is_empty())
        {
            let normalized = normalize_managed_role(role).map_err(|e| {
                ConfigError::ValidationError(format!("managed role '{}': {}", role, e))
            })?;
            managed.push(normalized);
        }
        Ok(ManagedRoleSet::new(managed))
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::ValidationError(format!("{} is required", name)))
}

fn required_snowflake(value: Option<String>, name: &str) -> Result<String, ConfigError> {
    let value = required(value, name)?;
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::ValidationError(format!(
            "{} must be a numeric Discord id, got: {}",
            name, value
        )));
    }
    Ok(value)
}

fn validate_public_key(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    match hex::decode(trimmed) {
        Ok(bytes) if bytes.len() == 32 => Ok(trimmed.to_lowercase()),
        _ => Err(ConfigError::ValidationError(
            "DISCORD_PUBLIC_KEY must be 64 hex characters".to_string(),
        )),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::ValidationError(format!(
            "{} must be true or false, got: {}",
            name, value
        ))),
    }
}

#[cfg(test)]
pub fn test_config() -> ValidatedConfig {
    let mut config = Config::default();
    config
        .apply_env(|name| {
            let value = match name {
                "DISCORD_TOKEN" => "test-token",
                "CLIENT_ID" => "1000",
                "GUILD_ID" => "2000",
                "FRONTEND_URL" => "https://verify.example.com",
                "ROLE_ANY_ID" => "10",
                "ROLE_1K_ID" => "11",
                _ => return None,
            };
            Some(value.to_string())
        })
        .expect("test env");
    config.validate().expect("test config")
}
