// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use validator::ValidateEmail;

pub const MAX_EMAIL_CHARS: usize = 128;
pub const MAX_NAME_CHARS: usize = 256;
pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MAX_PASSWORD_CHARS: usize = 128;

/// Validate user email input
pub fn validate_email_field(email: &str) -> Result<(), String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err("Email is required".to_string());
    }
    if trimmed.chars().count() > MAX_EMAIL_CHARS {
        return Err(format!(
            "Email must be at most {} characters",
            MAX_EMAIL_CHARS
        ));
    }
    if !trimmed.validate_email() {
        return Err("Email format is invalid".to_string());
    }
    Ok(())
}

/// Validate password input. Only the length is policed here; the hash
/// never leaves the password module.
pub fn validate_password_field(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    let len = password.chars().count();
    if len < MIN_PASSWORD_CHARS {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_CHARS
        ));
    }
    if len > MAX_PASSWORD_CHARS {
        return Err(format!(
            "Password must be at most {} characters",
            MAX_PASSWORD_CHARS
        ));
    }
    Ok(())
}

/// Validate and sanitize display names for safety
/// Allows letters, numbers, spaces, apostrophes, hyphens, and periods
/// Replaces invalid characters with spaces and collapses multiple spaces
/// Trims leading/trailing spaces and enforces length limits
pub fn sanitize_display_name(name: &str) -> Result<String, String> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    // Replace invalid characters with spaces
    let sanitized = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '\'' || c == '-' || c == '.' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>();

    // Collapse multiple consecutive spaces into single space
    let sanitized = sanitized
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ");

    let sanitized_len = sanitized.chars().count();
    if !(2..=MAX_NAME_CHARS).contains(&sanitized_len) {
        return Err(format!(
            "Name must be between 2 and {} characters",
            MAX_NAME_CHARS
        ));
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_field() {
        assert!(validate_email_field("user@example.com").is_ok());
        assert!(validate_email_field("").is_err());
        assert!(validate_email_field("not-an-email").is_err());
        let long_email = format!("{}@example.com", "a".repeat(MAX_EMAIL_CHARS));
        assert!(validate_email_field(&long_email).is_err());
    }

    #[test]
    fn test_validate_password_field() {
        assert!(validate_password_field("longenough1").is_ok());
        assert!(validate_password_field("").is_err());
        assert!(validate_password_field("short").is_err());
        assert!(validate_password_field(&"a".repeat(MAX_PASSWORD_CHARS + 1)).is_err());
    }

    #[test]
    fn test_sanitize_display_name() {
        // Valid names
        assert_eq!(sanitize_display_name("John Doe").unwrap(), "John Doe");
        assert_eq!(
            sanitize_display_name("Mary O'Connor").unwrap(),
            "Mary O'Connor"
        );
        assert_eq!(sanitize_display_name("Jean-Pierre").unwrap(), "Jean-Pierre");
        assert_eq!(sanitize_display_name("  Alice  ").unwrap(), "Alice");
        assert_eq!(
            sanitize_display_name("Renée Élodie").unwrap(),
            "Renée Élodie"
        );

        // Sanitization
        assert_eq!(sanitize_display_name("John@Doe").unwrap(), "John Doe");
        assert_eq!(
            sanitize_display_name("Test<script>").unwrap(),
            "Test script"
        );
        assert_eq!(
            sanitize_display_name("John   Multiple   Spaces").unwrap(),
            "John Multiple Spaces"
        );

        // Edge cases
        assert!(sanitize_display_name("").is_err());
        assert!(sanitize_display_name("   ").is_err());
        assert!(sanitize_display_name("A").is_err()); // Too short after trim
        assert!(sanitize_display_name(&"A".repeat(257)).is_err()); // Too long
    }
}
