// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::rt::System;
use actix_web::web::Data;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use crave::accounts::jwt::JwtService;
use crave::accounts::{AccountService, FileAccountStore, SessionGuardFactory};
use crave::app_state::AppState;
use crave::auth::AuthService;
use crave::config::{load_config, ValidatedConfig};
use crave::mailer::{LogMailer, Mailer, SmtpMailer};

const CONFIG_ENV_VAR: &str = "CRAVE_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let config_path = std::env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("❌ Failed to load {}: {}", config_path.display(), error);
            return 1;
        }
    };

    let config = match config.validate() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("❌ Invalid configuration: {}", error);
            eprintln!("❌ Application cannot start with invalid configuration.");
            return 1;
        }
    };

    System::new().block_on(async move {
        match serve(config).await {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("❌ Server error: {}", error);
                1
            }
        }
    })
}

async fn serve(config: ValidatedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let accounts_file = config.store.accounts_file.clone();
    if !accounts_file.exists() {
        std::fs::write(&accounts_file, "")?;
        info!("Created empty accounts file at {}", accounts_file.display());
    }

    let store = Arc::new(FileAccountStore::new(accounts_file)?);
    let accounts = Arc::new(AccountService::new(store)?);
    info!("✅ Account service initialized");

    let jwt = Arc::new(JwtService::new(&config));

    let mailer: Arc<dyn Mailer> = if config.smtp.enabled {
        let smtp = SmtpMailer::new(&config.smtp)?;
        info!("✅ SMTP mailer initialized for {}", config.smtp.host);
        Arc::new(smtp)
    } else {
        info!("SMTP disabled; outbound mail will be logged only");
        Arc::new(LogMailer)
    };

    let auth_service = Arc::new(AuthService::new(
        accounts.clone(),
        jwt.clone(),
        mailer,
        &config,
    )?);
    let app_state = Arc::new(AppState::new(&config.app.name));

    let bind = config.server.bind.clone();
    let port = config.server.port;
    let config = Arc::new(config);
    info!("✅ {} listening on {}:{}", config.app.name, bind, port);

    HttpServer::new(move || {
        App::new()
            .app_data(Data::from(config.clone()))
            .app_data(Data::from(accounts.clone()))
            .app_data(Data::from(jwt.clone()))
            .app_data(Data::from(auth_service.clone()))
            .app_data(Data::from(app_state.clone()))
            .wrap(Logger::default())
            .service(web::scope("/auth").configure(crave::auth::configure_auth))
            .service(
                web::scope("/user")
                    .configure(crave::auth::configure_user_public)
                    .service(
                        web::scope("")
                            .wrap(SessionGuardFactory)
                            .configure(crave::auth::configure_user_protected),
                    ),
            )
    })
    .bind((bind.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
