// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::auth::LoginLimiter;

pub struct AppState {
    pub app_name: String,
    pub login_limiter: LoginLimiter,
}

impl AppState {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            login_limiter: LoginLimiter::new(),
        }
    }
}
