// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::error::AuthError;
use super::types::ApiResponse;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use std::net::IpAddr;

pub(super) fn error_response(err: &AuthError) -> HttpResponse {
    HttpResponse::build(err.status())
        .json(ApiResponse::<serde_json::Value>::fail(&err.message()))
}

pub(super) fn require_client_ip(req: &HttpRequest, context: &str) -> Result<IpAddr, HttpResponse> {
    match req.peer_addr().map(|addr| addr.ip()) {
        Some(ip) => Ok(ip),
        None => {
            log::warn!("{} rejected: client IP unavailable", context);
            Err(error_response(&AuthError::Validation(
                "Invalid request".to_string(),
            )))
        }
    }
}

/// Pull the bearer token out of an Authorization header, if present
pub(super) fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header_value = req.headers().get(header::AUTHORIZATION)?;
    let value = header_value.to_str().ok()?;
    value.strip_prefix("Bearer ").map(|token| token.to_string())
}
