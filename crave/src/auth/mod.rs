// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::web;

pub mod error;
mod helpers;
pub mod limiter;
mod profile;
mod register;
mod reset;
mod service;
mod session;
pub mod types;

pub use error::AuthError;
pub use limiter::LoginLimiter;
pub use service::{AuthService, LoginTokens};

/// Routes open to anyone, mounted under /auth
pub fn configure_auth(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register::register))
        .route("/verify-email", web::post().to(register::verify_email))
        .route("/login", web::post().to(session::login));
}

/// Routes under /user that authenticate by other means than the session
/// guard (refresh token, emailed code)
pub fn configure_user_public(cfg: &mut web::ServiceConfig) {
    cfg.route("/refresh-token", web::post().to(session::refresh_token))
        .route("/forgot-password", web::post().to(reset::forgot_password))
        .route("/verify-otp", web::post().to(reset::verify_otp))
        .route("/reset-password", web::post().to(reset::reset_password));
}

/// Routes under /user that require a verified access token
pub fn configure_user_protected(cfg: &mut web::ServiceConfig) {
    cfg.route("/logout", web::post().to(session::logout))
        .route("/logout", web::get().to(session::logout))
        .route("/profile", web::get().to(profile::profile));
}
