// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use argon2::password_hash::rand_core::{OsRng, RngCore};

pub const OTP_DIGITS: usize = 6;

const OTP_SPACE: u32 = 1_000_000;
// Largest multiple of OTP_SPACE that fits in u32; draws at or above it are
// re-rolled to keep the modulo uniform.
const REJECTION_BOUND: u32 = u32::MAX - (u32::MAX % OTP_SPACE);

/// Generate a zero-padded numeric one-time code from OS randomness.
pub fn generate_otp() -> String {
    loop {
        let draw = OsRng.next_u32();
        if draw < REJECTION_BOUND {
            return format!("{:06}", draw % OTP_SPACE);
        }
    }
}
