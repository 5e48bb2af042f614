// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl AccountStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Account {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            name,
            password_hash,
            email_verified: false,
            status: AccountStatus::Active,
            refresh_token: None,
            otp: None,
            otp_expires_at: None,
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    /// An OTP counts as live while one is stored and its expiry is still in
    /// the future. `otp` and `otp_expires_at` are always set and cleared
    /// together.
    pub fn otp_is_live(&self, now: DateTime<Utc>) -> bool {
        match (&self.otp, &self.otp_expires_at) {
            (Some(_), Some(expires_at)) => now < *expires_at,
            _ => false,
        }
    }
}

// The accounts.yaml file structure: email -> account record
pub type AccountsData = HashMap<String, Account>;

#[derive(Debug, Clone)]
pub enum AccountError {
    AccountNotFound(String),
    DuplicateEmail(String),
    ServiceNotInitialized,
    FileError(String),
    ParseError(String),
}

impl std::fmt::Display for AccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountError::AccountNotFound(key) => write!(f, "Account not found: {}", key),
            AccountError::DuplicateEmail(email) => {
                write!(f, "Account already exists: {}", email)
            }
            AccountError::ServiceNotInitialized => write!(f, "Account service not initialized"),
            AccountError::FileError(msg) => write!(f, "File error: {}", msg),
            AccountError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for AccountError {}

// Mutation commands for the background task
#[derive(Debug)]
pub enum AccountMutation {
    Create {
        account: Account,
    },
    MarkEmailVerified {
        id: String,
    },
    SetRefreshToken {
        email: String,
        refresh_token: Option<String>,
    },
    SetOtp {
        email: String,
        otp: String,
        expires_at: DateTime<Utc>,
    },
    /// Replaces the password hash and clears any outstanding OTP.
    ReplacePassword {
        email: String,
        password_hash: String,
    },
}

#[derive(Debug)]
pub enum AccountMutationResult {
    Created(Account),
    Updated,
}
