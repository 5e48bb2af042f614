// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{Claims, JwtError, TokenKind, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};
use crate::accounts::types::Account;
use crate::config::ValidatedConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

pub struct JwtService {
    secret: String,
    issuer: String,
    audience: String,
    access_token_hours: u64,
    refresh_token_days: u64,
    is_localhost: bool,
}

impl JwtService {
    /// Create a new JwtService from configuration
    pub fn new(config: &ValidatedConfig) -> Self {
        JwtService {
            secret: config.jwt.secret.clone(),
            issuer: config.jwt.issuer.clone(),
            audience: config.jwt.audience.clone(),
            access_token_hours: config.jwt.access_token_hours,
            refresh_token_days: config.jwt.refresh_token_days,
            is_localhost: config.is_localhost(),
        }
    }

    fn create_token(
        &self,
        account: &Account,
        kind: TokenKind,
        lifetime: Duration,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + lifetime;

        let claims = Claims {
            sub: account.id.clone(),
            email: account.email.clone(),
            name: account.name.clone(),
            role: account.role,
            kind,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| JwtError::TokenCreationError(e.to_string()))
    }

    /// Create a short-lived access token for an account
    pub fn create_access_token(&self, account: &Account) -> Result<String, JwtError> {
        self.create_token(
            account,
            TokenKind::Access,
            Duration::hours(self.access_token_hours as i64),
        )
    }

    /// Create a long-lived refresh token for an account. The caller is
    /// responsible for persisting it on the account record; the store copy
    /// is the revocation authority, not the signature.
    pub fn create_refresh_token(&self, account: &Account) -> Result<String, JwtError> {
        self.create_token(
            account,
            TokenKind::Refresh,
            Duration::days(self.refresh_token_days as i64),
        )
    }

    /// Verify a token's signature, expiry, issuer, and audience
    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map_err(|e| JwtError::TokenVerificationError(e.to_string()))?;

        Ok(token_data.claims)
    }

    /// Verify a token and require it to be an access token
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.verify_token(token)?;
        if claims.kind != TokenKind::Access {
            return Err(JwtError::WrongTokenKind);
        }
        Ok(claims)
    }

    /// Verify a token and require it to be a refresh token
    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.verify_token(token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(JwtError::WrongTokenKind);
        }
        Ok(claims)
    }

    fn build_cookie<'a>(
        &self,
        name: &'a str,
        value: String,
        lifetime: Duration,
    ) -> actix_web::cookie::Cookie<'a> {
        let expiration = Utc::now() + lifetime;

        let expires = match actix_web::cookie::time::OffsetDateTime::from_unix_timestamp(
            expiration.timestamp(),
        ) {
            Ok(val) => val,
            Err(e) => {
                log::error!("Failed to convert expiration timestamp for cookie: {}", e);
                actix_web::cookie::time::OffsetDateTime::UNIX_EPOCH
            }
        };

        actix_web::cookie::Cookie::build(name, value)
            .path("/")
            .secure(!self.is_localhost)
            .http_only(true)
            .same_site(actix_web::cookie::SameSite::Lax)
            .expires(expires)
            .finish()
    }

    fn build_clearing_cookie<'a>(&self, name: &'a str) -> actix_web::cookie::Cookie<'a> {
        actix_web::cookie::Cookie::build(name, "")
            .path("/")
            .secure(!self.is_localhost)
            .http_only(true)
            .same_site(actix_web::cookie::SameSite::Lax)
            .max_age(actix_web::cookie::time::Duration::seconds(0))
            .expires(actix_web::cookie::time::OffsetDateTime::UNIX_EPOCH)
            .finish()
    }

    /// Create the http-only cookie carrying the access token
    pub fn access_cookie<'a>(&self, token: &str) -> actix_web::cookie::Cookie<'a> {
        self.build_cookie(
            ACCESS_COOKIE_NAME,
            token.to_string(),
            Duration::hours(self.access_token_hours as i64),
        )
    }

    /// Create the http-only cookie carrying the refresh token
    pub fn refresh_cookie<'a>(&self, token: &str) -> actix_web::cookie::Cookie<'a> {
        self.build_cookie(
            REFRESH_COOKIE_NAME,
            token.to_string(),
            Duration::days(self.refresh_token_days as i64),
        )
    }

    /// Cookies that remove both tokens (logout)
    pub fn clear_access_cookie<'a>(&self) -> actix_web::cookie::Cookie<'a> {
        self.build_clearing_cookie(ACCESS_COOKIE_NAME)
    }

    pub fn clear_refresh_cookie<'a>(&self) -> actix_web::cookie::Cookie<'a> {
        self.build_clearing_cookie(REFRESH_COOKIE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::types::{Account, Role};

    fn test_service() -> JwtService {
        JwtService {
            secret: "test-secret-key-test-secret-key!".to_string(),
            issuer: "test-issuer".to_string(),
            audience: "test-audience".to_string(),
            access_token_hours: 8,
            refresh_token_days: 7,
            is_localhost: true,
        }
    }

    fn test_account() -> Account {
        Account::new(
            "Test User".to_string(),
            "test@example.com".to_string(),
            "$argon2id$stub".to_string(),
        )
    }

    #[test]
    fn access_token_round_trip() {
        let service = test_service();
        let account = test_account();

        let token = service.create_access_token(&account).expect("token");
        let claims = service.verify_access_token(&token).expect("claims");

        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.email, account.email);
        assert_eq!(claims.name, account.name);
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-audience");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let service = test_service();
        let account = test_account();

        let refresh = service.create_refresh_token(&account).expect("token");
        let err = service.verify_access_token(&refresh).expect_err("kind");
        assert!(matches!(err, JwtError::WrongTokenKind));

        let claims = service.verify_refresh_token(&refresh).expect("claims");
        assert_eq!(claims.kind, TokenKind::Refresh);
    }

    #[test]
    fn tokens_get_unique_jti() {
        let service = test_service();
        let account = test_account();

        let first = service.create_access_token(&account).expect("first");
        let second = service.create_access_token(&account).expect("second");
        let first_claims = service.verify_token(&first).expect("first claims");
        let second_claims = service.verify_token(&second).expect("second claims");
        assert_ne!(first_claims.jti, second_claims.jti);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let service = test_service();
        let account = test_account();
        let token = service.create_access_token(&account).expect("token");

        let other = JwtService {
            secret: "another-secret-key-another-key!!".to_string(),
            ..test_service()
        };
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let service = test_service();
        let account = test_account();

        // Craft a token whose exp is well past the default leeway
        let now = Utc::now();
        let claims = Claims {
            sub: account.id.clone(),
            email: account.email.clone(),
            name: account.name.clone(),
            role: account.role,
            kind: TokenKind::Access,
            iat: (now - Duration::hours(10)).timestamp(),
            exp: (now - Duration::hours(2)).timestamp(),
            iss: "test-issuer".to_string(),
            aud: "test-audience".to_string(),
            jti: "expired-jti".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test-secret-key-test-secret-key!".as_ref()),
        )
        .expect("encode");

        assert!(service.verify_token(&token).is_err());
    }

    #[test]
    fn cookies_are_http_only_and_scoped() {
        let service = test_service();
        let account = test_account();
        let token = service.create_access_token(&account).expect("token");

        let cookie = service.access_cookie(&token);
        assert_eq!(cookie.name(), ACCESS_COOKIE_NAME);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        // Localhost keeps Secure off so plain HTTP works in development
        assert_eq!(cookie.secure(), Some(false));

        let clearing = service.clear_refresh_cookie();
        assert_eq!(clearing.name(), REFRESH_COOKIE_NAME);
        assert_eq!(clearing.value(), "");
    }
}
