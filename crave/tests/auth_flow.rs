// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use actix_web::{http::StatusCode, test};
use common::{ALICE_EMAIL, ALICE_NAME, ALICE_PASSWORD};
use crave::accounts::AccountStatus;

#[actix_web::test]
async fn register_verify_login_round_trip() {
    let harness = common::TestHarness::new().await;
    let app = test::init_service(common::build_test_app(&harness)).await;

    let resp = common::register(&app, ALICE_NAME, ALICE_EMAIL, ALICE_PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = common::body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["error"], false);
    let account_id = body["data"]["_id"].as_str().expect("account id").to_string();
    assert_eq!(body["data"]["email"], ALICE_EMAIL);
    assert_eq!(body["data"]["role"], "user");
    assert!(body["data"].get("password_hash").is_none());

    // The verification mail carries the account id as the code
    let mail = common::wait_for_mail(&harness.mailer, ALICE_EMAIL).await;
    assert!(mail.body.contains(&account_id));

    let resp = common::post_json(
        &app,
        "/auth/verify-email",
        serde_json::json!({"code": account_id}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_json(resp).await;
    assert_eq!(body["success"], true);

    let stored = harness
        .accounts
        .get_by_email(ALICE_EMAIL)
        .expect("get")
        .expect("account");
    assert!(stored.email_verified);

    let resp = common::login(&app, ALICE_EMAIL, ALICE_PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(common::response_cookie(&resp, "accessToken").is_some());
    assert!(common::response_cookie(&resp, "refreshToken").is_some());
    let body = common::body_json(resp).await;
    assert_eq!(body["success"], true);
    assert!(!body["data"]["accessToken"].as_str().expect("token").is_empty());
    assert!(!body["data"]["refreshToken"].as_str().expect("token").is_empty());
    assert_eq!(body["data"]["user"]["email"], ALICE_EMAIL);

    // Wrong password
    let resp = common::login(&app, ALICE_EMAIL, "wrong-password").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], true);
}

#[actix_web::test]
async fn duplicate_registration_conflicts() {
    let harness = common::TestHarness::new().await;
    let app = test::init_service(common::build_test_app(&harness)).await;

    let resp = common::register(&app, ALICE_NAME, ALICE_EMAIL, ALICE_PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = common::register(&app, "Alice Again", ALICE_EMAIL, ALICE_PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = common::body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn registration_rejects_missing_fields() {
    let harness = common::TestHarness::new().await;
    let app = test::init_service(common::build_test_app(&harness)).await;

    let resp = common::post_json(
        &app,
        "/auth/register",
        serde_json::json!({"email": ALICE_EMAIL}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = common::post_json(
        &app,
        "/auth/register",
        serde_json::json!({"name": ALICE_NAME, "email": "not-an-email", "password": ALICE_PASSWORD}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn plaintext_password_never_reaches_the_store() {
    let harness = common::TestHarness::new().await;
    let app = test::init_service(common::build_test_app(&harness)).await;

    let resp = common::register(&app, ALICE_NAME, ALICE_EMAIL, ALICE_PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let on_disk = std::fs::read_to_string(&harness.accounts_file).expect("accounts file");
    assert!(!on_disk.contains(ALICE_PASSWORD));
    assert!(on_disk.contains("$argon2id$"));
}

#[actix_web::test]
async fn suspended_and_inactive_accounts_cannot_login() {
    let harness = common::TestHarness::with_seeded(vec![
        common::TestHarness::seeded_account(
            "Suspended User",
            "suspended@x.com",
            ALICE_PASSWORD,
            AccountStatus::Suspended,
        ),
        common::TestHarness::seeded_account(
            "Inactive User",
            "inactive@x.com",
            ALICE_PASSWORD,
            AccountStatus::Inactive,
        ),
    ])
    .await;
    let app = test::init_service(common::build_test_app(&harness)).await;

    // Correct password, still forbidden
    let resp = common::login(&app, "suspended@x.com", ALICE_PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = common::login(&app, "inactive@x.com", ALICE_PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Wrong password answers the same way
    let resp = common::login(&app, "suspended@x.com", "wrong-password").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn unknown_email_is_not_found() {
    let harness = common::TestHarness::new().await;
    let app = test::init_service(common::build_test_app(&harness)).await;

    let resp = common::login(&app, "nobody@x.com", ALICE_PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn repeated_login_failures_hit_the_limiter() {
    // Harness limiter allows 3 failures
    let harness = common::TestHarness::new().await;
    let app = test::init_service(common::build_test_app(&harness)).await;

    common::register(&app, ALICE_NAME, ALICE_EMAIL, ALICE_PASSWORD).await;

    for _ in 0..3 {
        let resp = common::login(&app, ALICE_EMAIL, "wrong-password").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // Fourth attempt is answered before credentials are checked
    let resp = common::login(&app, ALICE_EMAIL, ALICE_PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[actix_web::test]
async fn registration_survives_failing_mailer() {
    let harness = common::TestHarness::new().await;
    harness.mailer.set_failing(true);
    let app = test::init_service(common::build_test_app(&harness)).await;

    let resp = common::register(&app, ALICE_NAME, ALICE_EMAIL, ALICE_PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let stored = harness
        .accounts
        .get_by_email(ALICE_EMAIL)
        .expect("get")
        .expect("account");
    assert!(!stored.email_verified);
}
