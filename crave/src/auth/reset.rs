// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::helpers::error_response;
use super::service::AuthService;
use super::types::{
    ApiResponse, ForgotPasswordRequest, ResetPasswordRequest, VerifyOtpRequest,
};
use actix_web::{web, HttpResponse, Result};

pub(super) async fn forgot_password(
    payload: web::Json<ForgotPasswordRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse> {
    let email = payload.email.as_deref().unwrap_or_default();

    match auth.forgot_password(email).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::<serde_json::Value>::ok_empty(
            "A reset code has been sent to your email",
        ))),
        Err(err) => {
            log::warn!("Forgot-password rejected: {}", err);
            Ok(error_response(&err))
        }
    }
}

pub(super) async fn verify_otp(
    payload: web::Json<VerifyOtpRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse> {
    let email = payload.email.as_deref().unwrap_or_default();
    let otp = payload.otp.as_deref().unwrap_or_default();

    match auth.verify_otp(email, otp).await {
        Ok(()) => Ok(HttpResponse::Ok()
            .json(ApiResponse::<serde_json::Value>::ok_empty("Code verified"))),
        Err(err) => {
            log::warn!("OTP verification rejected: {}", err);
            Ok(error_response(&err))
        }
    }
}

pub(super) async fn reset_password(
    payload: web::Json<ResetPasswordRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse> {
    let email = payload.email.as_deref().unwrap_or_default();
    let new_password = payload.new_password.as_deref().unwrap_or_default();
    let confirm_password = payload.confirm_password.as_deref().unwrap_or_default();

    match auth.reset_password(email, new_password, confirm_password).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::<serde_json::Value>::ok_empty(
            "Password has been reset",
        ))),
        Err(err) => {
            log::warn!("Password reset rejected: {}", err);
            Ok(error_response(&err))
        }
    }
}
