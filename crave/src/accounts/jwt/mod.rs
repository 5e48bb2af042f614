// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod service;
mod types;

pub use service::JwtService;
pub use types::{Claims, JwtError, TokenKind, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};
