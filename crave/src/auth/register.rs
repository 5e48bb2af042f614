// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::helpers::error_response;
use super::service::AuthService;
use super::types::{AccountPublic, ApiResponse, RegisterRequest, VerifyEmailRequest};
use actix_web::{web, HttpResponse, Result};

pub(super) async fn register(
    payload: web::Json<RegisterRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse> {
    let name = payload.name.as_deref().unwrap_or_default();
    let email = payload.email.as_deref().unwrap_or_default();
    let password = payload.password.as_deref().unwrap_or_default();

    match auth.register(name, email, password).await {
        Ok(account) => Ok(HttpResponse::Created().json(ApiResponse::ok(
            "Account created. Check your email to verify your address",
            AccountPublic::from(&account),
        ))),
        Err(err) => {
            log::warn!("Registration rejected: {}", err);
            Ok(error_response(&err))
        }
    }
}

pub(super) async fn verify_email(
    payload: web::Json<VerifyEmailRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse> {
    let code = payload.code.as_deref().unwrap_or_default();

    match auth.verify_email(code).await {
        Ok(()) => Ok(HttpResponse::Ok()
            .json(ApiResponse::<serde_json::Value>::ok_empty("Email verified"))),
        Err(err) => {
            log::warn!("Email verification rejected: {}", err);
            Ok(error_response(&err))
        }
    }
}
