// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::Mail;

/// Email sent right after registration, carrying the verification link.
pub fn verification_mail(to: &str, name: &str, verification_link: &str) -> Mail {
    let body = format!(
        "Hi {},\n\
        \n\
        Welcome to Crave! Please verify your email address by opening the\n\
        link below:\n\
        \n\
        {}\n\
        \n\
        If you did not create this account, you can ignore this email.\n\
        \n\
        Bon appétit,\n\
        The Crave Team",
        name, verification_link
    );

    Mail {
        to: to.to_string(),
        subject: "Welcome to Crave - Verify your email".to_string(),
        body,
    }
}

/// Email carrying the password-reset one-time code.
pub fn password_reset_mail(to: &str, name: &str, otp: &str, expiry_minutes: u64) -> Mail {
    let body = format!(
        "Hi {},\n\
        \n\
        A password reset was requested for your Crave account.\n\
        \n\
        Your one-time code is:\n\
        \n\
        {}\n\
        \n\
        The code expires in {} minutes.\n\
        \n\
        If you did not request this reset, please ignore this email and\n\
        make sure your account is secure.\n\
        \n\
        Bon appétit,\n\
        The Crave Team",
        name, otp, expiry_minutes
    );

    Mail {
        to: to.to_string(),
        subject: "Crave password reset code".to_string(),
        body,
    }
}
