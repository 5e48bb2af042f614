// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::error::AuthError;
use crate::accounts::jwt::JwtService;
use crate::accounts::{
    dummy_password_hash, generate_otp, hash_password, verify_password, Account, AccountService,
};
use crate::config::ValidatedConfig;
use crate::mailer::{templates, Mail, Mailer};
use crate::security::{sanitize_display_name, validate_email_field, validate_password_field};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Tokens and account handed back by a successful login.
#[derive(Debug)]
pub struct LoginTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub account: Account,
}

/// The auth lifecycle orchestrator. Every collaborator is an explicit
/// dependency so tests can swap in fakes.
pub struct AuthService {
    accounts: Arc<AccountService>,
    jwt: Arc<JwtService>,
    mailer: Arc<dyn Mailer>,
    otp_expiry_minutes: u64,
    public_base_url: String,
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        accounts: Arc<AccountService>,
        jwt: Arc<JwtService>,
        mailer: Arc<dyn Mailer>,
        config: &ValidatedConfig,
    ) -> Result<Self, AuthError> {
        let dummy_hash = dummy_password_hash()?;
        Ok(AuthService {
            accounts,
            jwt,
            mailer,
            otp_expiry_minutes: config.security.otp_expiry_minutes,
            public_base_url: config.public_base_url.clone(),
            dummy_hash,
        })
    }

    /// Queue a mail off the request path. The primary operation has already
    /// committed by the time this runs; failures are logged and swallowed.
    fn dispatch_mail(&self, mail: Mail) {
        let mailer = self.mailer.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(err) = mailer.send(&mail) {
                log::warn!("Mail delivery to {} failed: {}", mail.to, err);
            }
        });
    }

    /// Create an account and queue the verification mail.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Account, AuthError> {
        let email = email.trim();
        validate_email_field(email).map_err(AuthError::Validation)?;
        validate_password_field(password).map_err(AuthError::Validation)?;
        let name = sanitize_display_name(name).map_err(AuthError::Validation)?;

        // Convenience check only; the store insert is the authority and
        // still rejects a racing duplicate.
        if self.accounts.get_by_email(email)?.is_some() {
            return Err(AuthError::DuplicateAccount);
        }

        let password_hash = hash_password(password)?;
        let account = Account::new(name, email.to_string(), password_hash);
        let account = self.accounts.create(account).await?;
        log::info!("Registered account {} ({})", account.id, account.email);

        let link = format!(
            "{}/auth/verify-email?code={}",
            self.public_base_url, account.id
        );
        self.dispatch_mail(templates::verification_mail(
            &account.email,
            &account.name,
            &link,
        ));

        Ok(account)
    }

    /// Flip the verified flag for the account the mailed code points at.
    /// Verifying twice is harmless.
    pub async fn verify_email(&self, code: &str) -> Result<(), AuthError> {
        if code.trim().is_empty() {
            return Err(AuthError::Validation("Code is required".to_string()));
        }
        self.accounts.mark_email_verified(code.trim()).await?;
        Ok(())
    }

    /// Check credentials and issue the token pair. The refresh token is
    /// persisted on the account, displacing any previous session.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginTokens, AuthError> {
        let email = email.trim();
        let account = match self.accounts.get_by_email(email)? {
            Some(account) => account,
            None => {
                // Burn a verification anyway so unknown emails cost the same
                let _ = verify_password(password, &self.dummy_hash);
                log::warn!("Login rejected: no account for {}", email);
                return Err(AuthError::NotFound);
            }
        };

        if !account.status.is_active() {
            log::warn!("Login rejected for {}: account not active", email);
            return Err(AuthError::Forbidden);
        }

        if !verify_password(password, &account.password_hash)? {
            log::warn!("Login rejected for {}: bad password", email);
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.jwt.create_access_token(&account)?;
        let refresh_token = self.jwt.create_refresh_token(&account)?;
        self.accounts
            .set_refresh_token(&account.email, Some(refresh_token.clone()))
            .await?;
        log::info!("Login for account {}", account.id);

        Ok(LoginTokens {
            access_token,
            refresh_token,
            account,
        })
    }

    /// Drop the stored refresh token. The session's access token stays
    /// cryptographically valid until it expires on its own.
    pub async fn logout(&self, account_id: &str) -> Result<(), AuthError> {
        let account = self
            .accounts
            .get_by_id(account_id)?
            .ok_or(AuthError::NotFound)?;
        self.accounts.set_refresh_token(&account.email, None).await?;
        log::info!("Logout for account {}", account.id);
        Ok(())
    }

    /// Mint a fresh access token from a refresh token. The presented token
    /// must still be the one stored on the account: a logged-out or
    /// displaced refresh token verifies cryptographically but is refused
    /// here.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<String, AuthError> {
        let refresh_token = refresh_token.ok_or(AuthError::Unauthenticated)?;
        let claims = self.jwt.verify_refresh_token(refresh_token)?;

        let account = self
            .accounts
            .get_by_id(&claims.sub)?
            .ok_or(AuthError::NotFound)?;

        if account.refresh_token.as_deref() != Some(refresh_token) {
            log::debug!(
                "Refresh rejected for account {}: presented token {} is not current",
                account.id,
                token_fingerprint(refresh_token)
            );
            return Err(AuthError::InvalidToken);
        }

        let access_token = self.jwt.create_access_token(&account)?;
        Ok(access_token)
    }

    /// Store a fresh OTP on the account and queue the reset mail.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim();
        validate_email_field(email).map_err(AuthError::Validation)?;

        let account = self
            .accounts
            .get_by_email(email)?
            .ok_or(AuthError::NotFound)?;

        let otp = generate_otp();
        let expires_at = Utc::now() + Duration::minutes(self.otp_expiry_minutes as i64);
        self.accounts.set_otp(&account.email, &otp, expires_at).await?;
        log::info!("Password reset requested for account {}", account.id);

        self.dispatch_mail(templates::password_reset_mail(
            &account.email,
            &account.name,
            &otp,
            self.otp_expiry_minutes,
        ));

        Ok(())
    }

    /// Compare a submitted code against the stored OTP. The code stays
    /// stored until reset succeeds or the expiry passes, so verification
    /// is repeatable.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() || otp.trim().is_empty() {
            return Err(AuthError::Validation(
                "Email and code are required".to_string(),
            ));
        }

        let account = self
            .accounts
            .get_by_email(email)?
            .ok_or(AuthError::NotFound)?;

        if !account.otp_is_live(Utc::now()) {
            log::warn!("OTP check for {}: code expired or absent", email);
            return Err(AuthError::OtpExpired);
        }
        if account.otp.as_deref() != Some(otp.trim()) {
            log::warn!("OTP check for {}: code mismatch", email);
            return Err(AuthError::OtpInvalid);
        }

        Ok(())
    }

    /// Replace the password. Requires an unexpired OTP to still be
    /// outstanding on the account, and clears it on success.
    pub async fn reset_password(
        &self,
        email: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        let email = email.trim();
        validate_email_field(email).map_err(AuthError::Validation)?;
        if new_password.is_empty() || confirm_password.is_empty() {
            return Err(AuthError::Validation(
                "Both password fields are required".to_string(),
            ));
        }
        if new_password != confirm_password {
            return Err(AuthError::Validation("Passwords do not match".to_string()));
        }
        validate_password_field(new_password).map_err(AuthError::Validation)?;

        let account = self
            .accounts
            .get_by_email(email)?
            .ok_or(AuthError::NotFound)?;

        if !account.otp_is_live(Utc::now()) {
            log::warn!("Password reset for {}: no live OTP", email);
            return Err(AuthError::OtpExpired);
        }

        let password_hash = hash_password(new_password)?;
        self.accounts
            .replace_password(&account.email, &password_hash)
            .await?;
        log::info!("Password reset for account {}", account.id);

        Ok(())
    }

    /// Load the account behind an authenticated session.
    pub fn profile(&self, account_id: &str) -> Result<Account, AuthError> {
        self.accounts
            .get_by_id(account_id)?
            .ok_or(AuthError::NotFound)
    }
}

/// Short digest for logging tokens without logging tokens.
fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..8])
}
