// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod memory;
mod smtp;
pub mod templates;

pub use memory::MemoryMailer;
pub use smtp::SmtpMailer;

/// A message ready for delivery. Bodies are plain text.
#[derive(Debug, Clone)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug)]
pub enum MailerError {
    InvalidAddress(String),
    Transport(String),
}

impl std::fmt::Display for MailerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MailerError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            MailerError::Transport(msg) => write!(f, "Transport error: {}", msg),
        }
    }
}

impl std::error::Error for MailerError {}

/// Outbound mail delivery. Implementations block; callers dispatch sends
/// off the request path (see AuthService). Delivery is best effort: the
/// operation that queued the mail has already committed.
pub trait Mailer: Send + Sync {
    fn send(&self, mail: &Mail) -> Result<(), MailerError>;
}

/// Used when SMTP is disabled: records nothing, logs the would-be send.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, mail: &Mail) -> Result<(), MailerError> {
        log::info!(
            "SMTP disabled; skipping mail to {} ({})",
            mail.to,
            mail.subject
        );
        Ok(())
    }
}
