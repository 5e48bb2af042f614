// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::error::AuthError;
use super::helpers::{bearer_token, error_response, require_client_ip};
use super::service::AuthService;
use super::types::{ApiResponse, LoginData, LoginRequest, RefreshData, RefreshTokenRequest};
use crate::accounts::jwt::{JwtService, REFRESH_COOKIE_NAME};
use crate::accounts::AuthRequest;
use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use actix_web::{web, HttpRequest, HttpResponse, Result};

pub(super) async fn login(
    req: HttpRequest,
    payload: web::Json<LoginRequest>,
    auth: web::Data<AuthService>,
    jwt: web::Data<JwtService>,
    app_state: web::Data<AppState>,
    config: web::Data<ValidatedConfig>,
) -> Result<HttpResponse> {
    let ip = match require_client_ip(&req, "Login") {
        Ok(ip) => ip,
        Err(response) => return Ok(response),
    };
    let limits = &config.security.login_limiter;
    if app_state.login_limiter.check(ip, limits).await.is_err() {
        log::warn!("Login rate limited for IP {}", ip);
        return Ok(error_response(&AuthError::TooManyAttempts));
    }

    let email = payload.email.as_deref().unwrap_or_default();
    let password = payload.password.as_deref().unwrap_or_default();

    match auth.login(email, password).await {
        Ok(tokens) => {
            app_state.login_limiter.clear(ip);
            let access_cookie = jwt.access_cookie(&tokens.access_token);
            let refresh_cookie = jwt.refresh_cookie(&tokens.refresh_token);
            Ok(HttpResponse::Ok()
                .cookie(access_cookie)
                .cookie(refresh_cookie)
                .json(ApiResponse::ok(
                    "Login successful",
                    LoginData {
                        access_token: tokens.access_token,
                        refresh_token: tokens.refresh_token,
                        user: (&tokens.account).into(),
                    },
                )))
        }
        Err(err) => {
            if matches!(err, AuthError::InvalidCredentials | AuthError::NotFound) {
                app_state.login_limiter.record_failure(ip, limits);
            }
            Ok(error_response(&err))
        }
    }
}

/// Handle logout. Only reachable through the session guard.
pub(super) async fn logout(
    req: HttpRequest,
    auth: web::Data<AuthService>,
    jwt: web::Data<JwtService>,
) -> Result<HttpResponse> {
    let account_id = match req.account_id() {
        Some(id) => id,
        None => return Ok(error_response(&AuthError::Unauthenticated)),
    };

    match auth.logout(&account_id).await {
        Ok(()) => Ok(HttpResponse::Ok()
            .cookie(jwt.clear_access_cookie())
            .cookie(jwt.clear_refresh_cookie())
            .json(ApiResponse::<serde_json::Value>::ok_empty(
                "Logged out successfully",
            ))),
        Err(err) => {
            log::warn!("Logout rejected: {}", err);
            Ok(error_response(&err))
        }
    }
}

pub(super) async fn refresh_token(
    req: HttpRequest,
    payload: Option<web::Json<RefreshTokenRequest>>,
    auth: web::Data<AuthService>,
    jwt: web::Data<JwtService>,
) -> Result<HttpResponse> {
    // Cookie first, then request body, then bearer header
    let token = req
        .cookie(REFRESH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| payload.and_then(|body| body.refresh_token.clone()))
        .or_else(|| bearer_token(&req));

    match auth.refresh(token.as_deref()).await {
        Ok(access_token) => Ok(HttpResponse::Ok()
            .cookie(jwt.access_cookie(&access_token))
            .json(ApiResponse::ok(
                "Token refreshed",
                RefreshData { access_token },
            ))),
        Err(err) => {
            log::warn!("Token refresh rejected: {}", err);
            Ok(error_response(&err))
        }
    }
}
