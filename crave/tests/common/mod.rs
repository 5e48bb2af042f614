// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::web::Data;
use actix_web::{test, web, App, Error};
use crave::accounts::jwt::JwtService;
use crave::accounts::{
    hash_password, Account, AccountService, AccountStore, FileAccountStore, SessionGuardFactory,
};
use crave::app_state::AppState;
use crave::auth::AuthService;
use crave::config::{
    AppSection, JwtConfig, LoginLimiterConfig, SecurityConfig, ServerConfig, SmtpConfig,
    StoreConfig, ValidatedConfig,
};
use crave::mailer::{Mail, MemoryMailer};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

pub const TEST_PEER_ADDR: &str = "127.0.0.1:1234";
pub const TEST_JWT_SECRET: &str = "integration-test-secret-key-32ch";
pub const ALICE_EMAIL: &str = "a@x.com";
pub const ALICE_NAME: &str = "Alice";
pub const ALICE_PASSWORD: &str = "Secret1-pass";

pub struct TestHarness {
    fixture: tempfile::TempDir,
    pub accounts_file: PathBuf,
    pub config: Arc<ValidatedConfig>,
    pub accounts: Arc<AccountService>,
    pub jwt: Arc<JwtService>,
    pub mailer: Arc<MemoryMailer>,
    pub auth: Arc<AuthService>,
    pub app_state: Arc<AppState>,
}

pub fn build_config(accounts_file: PathBuf) -> ValidatedConfig {
    ValidatedConfig {
        app: AppSection {
            name: "crave-test".to_string(),
        },
        server: ServerConfig {
            bind: "127.0.0.1".to_string(),
            port: 0,
        },
        store: StoreConfig { accounts_file },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            issuer: "crave".to_string(),
            audience: "crave-clients".to_string(),
            access_token_hours: 8,
            refresh_token_days: 7,
        },
        smtp: SmtpConfig::default(),
        security: SecurityConfig {
            login_limiter: LoginLimiterConfig {
                max_failures: 3,
                window_seconds: 600,
                lockout_seconds: 600,
            },
            otp_expiry_minutes: 10,
        },
        public_base_url: "http://127.0.0.1:8080".to_string(),
    }
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::build(Vec::new(), |_| {}).await
    }

    pub async fn with_seeded(seed: Vec<Account>) -> Self {
        Self::build(seed, |_| {}).await
    }

    pub async fn with_config(mutate: impl FnOnce(&mut ValidatedConfig)) -> Self {
        Self::build(Vec::new(), mutate).await
    }

    async fn build(seed: Vec<Account>, mutate: impl FnOnce(&mut ValidatedConfig)) -> Self {
        let fixture = tempfile::tempdir().expect("fixture root");
        let accounts_file = fixture.path().join("accounts.yaml");
        std::fs::write(&accounts_file, "").expect("seed accounts file");

        let store = FileAccountStore::new(accounts_file.clone()).expect("store");
        if !seed.is_empty() {
            let data: HashMap<String, Account> = seed
                .into_iter()
                .map(|account| (account.email.clone(), account))
                .collect();
            store.save(&data).expect("seed accounts");
        }

        let mut config = build_config(accounts_file.clone());
        mutate(&mut config);
        let config = Arc::new(config);

        let accounts = Arc::new(AccountService::new(Arc::new(store)).expect("account service"));
        let jwt = Arc::new(JwtService::new(&config));
        let mailer = Arc::new(MemoryMailer::new());
        let auth = Arc::new(
            AuthService::new(accounts.clone(), jwt.clone(), mailer.clone(), &config)
                .expect("auth service"),
        );
        let app_state = Arc::new(AppState::new(&config.app.name));

        Self {
            fixture,
            accounts_file,
            config,
            accounts,
            jwt,
            mailer,
            auth,
            app_state,
        }
    }

    /// An account seeded straight into the store, bypassing registration.
    pub fn seeded_account(
        name: &str,
        email: &str,
        password: &str,
        status: crave::accounts::AccountStatus,
    ) -> Account {
        let mut account = Account::new(
            name.to_string(),
            email.to_string(),
            hash_password(password).expect("hash"),
        );
        account.status = status;
        account
    }
}

pub fn build_test_app(
    harness: &TestHarness,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(Data::from(harness.config.clone()))
        .app_data(Data::from(harness.accounts.clone()))
        .app_data(Data::from(harness.jwt.clone()))
        .app_data(Data::from(harness.auth.clone()))
        .app_data(Data::from(harness.app_state.clone()))
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
}

pub async fn post_json<S>(app: &S, uri: &str, body: Value) -> ServiceResponse<BoxBody>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    let req = test::TestRequest::post()
        .uri(uri)
        .set_json(&body)
        .peer_addr(TEST_PEER_ADDR.parse().expect("peer addr"))
        .to_request();
    test::call_service(app, req).await
}

pub async fn register<S>(
    app: &S,
    name: &str,
    email: &str,
    password: &str,
) -> ServiceResponse<BoxBody>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    post_json(
        app,
        "/auth/register",
        json!({"name": name, "email": email, "password": password}),
    )
    .await
}

pub async fn login<S>(app: &S, email: &str, password: &str) -> ServiceResponse<BoxBody>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    post_json(
        app,
        "/auth/login",
        json!({"email": email, "password": password}),
    )
    .await
}

pub async fn body_json(resp: ServiceResponse<BoxBody>) -> Value {
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body).expect("response json")
}

/// Pull a named cookie out of the response's Set-Cookie headers
pub fn response_cookie(resp: &ServiceResponse<BoxBody>, name: &str) -> Option<String> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

/// Mail dispatch runs off the request path; poll the outbox briefly
pub async fn wait_for_mail(mailer: &MemoryMailer, to: &str) -> Mail {
    for _ in 0..100 {
        if let Some(mail) = mailer.last_to(to) {
            return mail;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!("mail to {} never delivered", to);
}
