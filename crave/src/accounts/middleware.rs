// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{Error, HttpMessage, HttpRequest, HttpResponse};
use std::future::{ready, Ready};
use std::pin::Pin;
use std::rc::Rc; // services are per-thread

use super::jwt::{Claims, JwtService, ACCESS_COOKIE_NAME};
use crate::auth::types::ApiResponse;

/// Trait to add authentication methods to HttpRequest
pub trait AuthRequest {
    fn session_claims(&self) -> Option<Claims>;
    fn account_id(&self) -> Option<String>;
    fn is_authenticated(&self) -> bool;
}

impl AuthRequest for HttpRequest {
    fn session_claims(&self) -> Option<Claims> {
        self.extensions().get::<Claims>().cloned()
    }

    fn account_id(&self) -> Option<String> {
        self.session_claims().map(|claims| claims.sub)
    }

    fn is_authenticated(&self) -> bool {
        self.session_claims().is_some()
    }
}

/// Pull the bearer token out of an Authorization header, if present
fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let header_value = req.headers().get(header::AUTHORIZATION)?;
    let value = header_value.to_str().ok()?;
    value.strip_prefix("Bearer ").map(|token| token.to_string())
}

fn unauthenticated_response(message: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::<serde_json::Value>::fail(message))
}

// Session guard middleware. Routes behind it never run without a verified
// access token; the decoded claims land in request extensions. The cookie
// transport wins over the Authorization header when both are present.
pub struct SessionGuardFactory;

impl<S, B> Transform<S, ServiceRequest> for SessionGuardFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionGuard<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionGuard {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionGuard<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionGuard<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let jwt_service = req.app_data::<Data<JwtService>>().cloned();
        let service = self.service.clone();

        Box::pin(async move {
            let jwt_service = match jwt_service {
                Some(service) => service,
                None => {
                    log::error!("JWT service missing from app data; rejecting request");
                    let response = HttpResponse::InternalServerError()
                        .json(ApiResponse::<serde_json::Value>::fail("Server error"));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            let token = req
                .cookie(ACCESS_COOKIE_NAME)
                .map(|cookie| cookie.value().to_string())
                .or_else(|| bearer_token(&req));

            let token = match token {
                Some(token) => token,
                None => {
                    log::debug!("Unauthenticated request to {}", req.path());
                    let response = unauthenticated_response("Authentication required");
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            match jwt_service.verify_access_token(&token) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    log::debug!("Access token rejected for {}: {}", req.path(), err);
                    let response = unauthenticated_response("Invalid or expired token");
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}
