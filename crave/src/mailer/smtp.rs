// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{Mail, Mailer, MailerError};
use crate::config::SmtpConfig;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::transport::smtp::PoolConfig;
use lettre::{Message, SmtpTransport, Transport};

const SMTP_SEND_TIMEOUT_SECS: u64 = 10;

pub struct SmtpMailer {
    transport: SmtpTransport,
    from_header: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailerError> {
        let tls_parameters = TlsParameters::builder(config.host.clone())
            .build()
            .map_err(|e| MailerError::Transport(format!("Failed to build TLS parameters: {}", e)))?;

        let transport = SmtpTransport::relay(&config.host)
            .map_err(|e| MailerError::Transport(format!("Failed to create SMTP transport: {}", e)))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .port(config.port)
            .tls(Tls::Required(tls_parameters))
            .pool_config(PoolConfig::new().max_size(1))
            .timeout(Some(std::time::Duration::from_secs(SMTP_SEND_TIMEOUT_SECS)))
            .build();

        Ok(Self {
            transport,
            from_header: format!("{} <{}>", config.from_name, config.from_email),
        })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, mail: &Mail) -> Result<(), MailerError> {
        let email = Message::builder()
            .from(
                self.from_header
                    .parse()
                    .map_err(|e| MailerError::InvalidAddress(format!("from address: {}", e)))?,
            )
            .to(mail
                .to
                .parse()
                .map_err(|e| MailerError::InvalidAddress(format!("to address: {}", e)))?)
            .subject(mail.subject.clone())
            .header(lettre::message::header::ContentType::TEXT_PLAIN)
            .body(mail.body.clone())
            .map_err(|e| MailerError::Transport(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(&email)
            .map(|_| ())
            .map_err(|e| MailerError::Transport(format!("Failed to send email: {}", e)))
    }
}
