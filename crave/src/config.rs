// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MIN_JWT_SECRET_CHARS: usize = 32;

#[derive(Debug)]
pub enum ConfigError {
    FileError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileError(msg) => write!(f, "File error: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::ValidationError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppSection {
    #[serde(default = "default_app_name")]
    pub name: String,
}

impl Default for AppSection {
    fn default() -> Self {
        AppSection {
            name: default_app_name(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_server_bind")]
    pub bind: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: default_server_bind(),
            port: default_server_port(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_accounts_file")]
    pub accounts_file: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            accounts_file: default_accounts_file(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_jwt_issuer")]
    pub issuer: String,
    #[serde(default = "default_jwt_audience")]
    pub audience: String,
    #[serde(default = "default_access_token_hours")]
    pub access_token_hours: u64,
    #[serde(default = "default_refresh_token_days")]
    pub refresh_token_days: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SmtpConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub from_email: String,
    #[serde(default = "default_smtp_from_name")]
    pub from_name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoginLimiterConfig {
    #[serde(default = "default_limiter_max_failures")]
    pub max_failures: u32,
    #[serde(default = "default_limiter_window_seconds")]
    pub window_seconds: u64,
    #[serde(default = "default_limiter_lockout_seconds")]
    pub lockout_seconds: u64,
}

impl Default for LoginLimiterConfig {
    fn default() -> Self {
        LoginLimiterConfig {
            max_failures: default_limiter_max_failures(),
            window_seconds: default_limiter_window_seconds(),
            lockout_seconds: default_limiter_lockout_seconds(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    #[serde(default)]
    pub login_limiter: LoginLimiterConfig,
    #[serde(default = "default_otp_expiry_minutes")]
    pub otp_expiry_minutes: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        SecurityConfig {
            login_limiter: LoginLimiterConfig::default(),
            otp_expiry_minutes: default_otp_expiry_minutes(),
        }
    }
}

/// Raw configuration as parsed from config.yaml
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

/// Configuration that has passed the validation pass. Handlers only ever
/// see this type.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub app: AppSection,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub jwt: JwtConfig,
    pub smtp: SmtpConfig,
    pub security: SecurityConfig,
    pub public_base_url: String,
}

impl AppConfig {
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "jwt.secret is required".to_string(),
            ));
        }
        if self.jwt.secret.chars().count() < MIN_JWT_SECRET_CHARS {
            return Err(ConfigError::ValidationError(format!(
                "jwt.secret must be at least {} characters",
                MIN_JWT_SECRET_CHARS
            )));
        }
        if self.jwt.access_token_hours == 0 {
            return Err(ConfigError::ValidationError(
                "jwt.access_token_hours must be greater than zero".to_string(),
            ));
        }
        if self.jwt.refresh_token_days == 0 {
            return Err(ConfigError::ValidationError(
                "jwt.refresh_token_days must be greater than zero".to_string(),
            ));
        }
        if self.security.otp_expiry_minutes == 0 {
            return Err(ConfigError::ValidationError(
                "security.otp_expiry_minutes must be greater than zero".to_string(),
            ));
        }
        if self.smtp.enabled {
            if self.smtp.host.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "smtp.host is required when smtp is enabled".to_string(),
                ));
            }
            if self.smtp.from_email.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "smtp.from_email is required when smtp is enabled".to_string(),
                ));
            }
        }
        if self.store.accounts_file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "store.accounts_file must not be empty".to_string(),
            ));
        }
        if self.public_base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "public_base_url must not be empty".to_string(),
            ));
        }

        Ok(ValidatedConfig {
            app: self.app,
            server: self.server,
            store: self.store,
            jwt: self.jwt,
            smtp: self.smtp,
            security: self.security,
            public_base_url: self.public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl ValidatedConfig {
    /// Whether the service is bound to a loopback address only. Controls
    /// the Secure flag on session cookies.
    pub fn is_localhost(&self) -> bool {
        matches!(self.server.bind.as_str(), "127.0.0.1" | "::1" | "localhost")
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::FileError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_yaml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("Failed to parse {}: {}", path.display(), e)))
}

fn default_app_name() -> String {
    "crave".to_string()
}

fn default_server_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_accounts_file() -> PathBuf {
    PathBuf::from("accounts.yaml")
}

fn default_jwt_issuer() -> String {
    "crave".to_string()
}

fn default_jwt_audience() -> String {
    "crave-clients".to_string()
}

fn default_access_token_hours() -> u64 {
    8
}

fn default_refresh_token_days() -> u64 {
    7
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_from_name() -> String {
    "Crave".to_string()
}

fn default_limiter_max_failures() -> u32 {
    10
}

fn default_limiter_window_seconds() -> u64 {
    600
}

fn default_limiter_lockout_seconds() -> u64 {
    300
}

fn default_otp_expiry_minutes() -> u64 {
    10
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}
