// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::error::AuthError;
use super::helpers::error_response;
use super::service::AuthService;
use super::types::{AccountPublic, ApiResponse};
use crate::accounts::AuthRequest;
use actix_web::{web, HttpRequest, HttpResponse, Result};

/// Return the public fields of the authenticated account.
pub(super) async fn profile(
    req: HttpRequest,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse> {
    let account_id = match req.account_id() {
        Some(id) => id,
        None => return Ok(error_response(&AuthError::Unauthenticated)),
    };

    match auth.profile(&account_id) {
        Ok(account) => Ok(HttpResponse::Ok().json(ApiResponse::ok(
            "Profile",
            AccountPublic::from(&account),
        ))),
        Err(err) => {
            log::warn!("Profile lookup failed: {}", err);
            Ok(error_response(&err))
        }
    }
}
