// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::accounts::jwt::JwtError;
use crate::accounts::{AccountError, PasswordError};
use actix_web::http::StatusCode;

/// Domain errors surfaced by the auth operations. Everything a caller can
/// see goes through `status()` and `message()`; internals stay in the logs.
#[derive(Debug)]
pub enum AuthError {
    Validation(String),
    DuplicateAccount,
    NotFound,
    InvalidCredentials,
    Forbidden,
    Unauthenticated,
    InvalidToken,
    OtpExpired,
    OtpInvalid,
    TooManyAttempts,
    Internal(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::DuplicateAccount => StatusCode::CONFLICT,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::OtpExpired => StatusCode::BAD_REQUEST,
            AuthError::OtpInvalid => StatusCode::BAD_REQUEST,
            AuthError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AuthError::Validation(message) => message.clone(),
            AuthError::DuplicateAccount => {
                "An account with this email already exists".to_string()
            }
            AuthError::NotFound => "Account not found".to_string(),
            AuthError::InvalidCredentials => "Invalid email or password".to_string(),
            AuthError::Forbidden => "Account is not active".to_string(),
            AuthError::Unauthenticated => "Authentication required".to_string(),
            AuthError::InvalidToken => "Invalid or expired token".to_string(),
            AuthError::OtpExpired => "The code has expired. Request a new one".to_string(),
            AuthError::OtpInvalid => "The code is not valid".to_string(),
            AuthError::TooManyAttempts => {
                "Too many failed attempts. Please try again later".to_string()
            }
            // Never echo internal detail to the caller
            AuthError::Internal(_) => "Server error".to_string(),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Internal(detail) => write!(f, "Internal error: {}", detail),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AccountError> for AuthError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::DuplicateEmail(_) => AuthError::DuplicateAccount,
            AccountError::AccountNotFound(_) => AuthError::NotFound,
            other => AuthError::Internal(other.to_string()),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenCreationError(detail) => AuthError::Internal(detail),
            JwtError::TokenVerificationError(_) | JwtError::WrongTokenKind => {
                AuthError::InvalidToken
            }
        }
    }
}
