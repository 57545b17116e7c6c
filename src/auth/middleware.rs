use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;
use std::rc::Rc;

use crate::auth::extractors::CurrentUser;
use crate::auth::token::TokenService;
use crate::db;

/// Access-control gate. Resolves a bearer token into a [`CurrentUser`]
/// and attaches it to the request; on any failure the request simply
/// proceeds unauthenticated. Rejecting it is the job of the endpoint's
/// `CurrentUser` extractor and role checks, which keeps "no credentials"
/// (401) separate from "insufficient role" (403).
pub struct AuthGate;

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            // Registration and login are pre-authentication routes.
            if !is_pre_auth(req.path()) {
                resolve_identity(&req).await;
            }
            service.call(req).await
        })
    }
}

fn is_pre_auth(path: &str) -> bool {
    path.starts_with("/api/v1/auth") || path == "/health"
}

/// Best effort only; never fails the request. The token must parse and
/// carry a valid signature, its subject must load as an ACTIVE user, and
/// the full validation (expiry, subject match) must pass before an
/// identity is attached.
async fn resolve_identity(req: &ServiceRequest) {
    // Idempotent within one request.
    if req.extensions().get::<CurrentUser>().is_some() {
        return;
    }
    let Some(token) = bearer_token(req) else {
        return;
    };
    let Some(tokens) = req.app_data::<web::Data<TokenService>>() else {
        return;
    };
    let Some(pool) = req.app_data::<web::Data<PgPool>>() else {
        return;
    };

    let Some(subject) = tokens.extract_subject(&token) else {
        log::debug!("rejected unparseable or forged bearer token");
        return;
    };

    let user = match db::users::find_active_by_id(pool.get_ref(), subject).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            log::debug!("token subject {} is not an active user", subject);
            return;
        }
        Err(err) => {
            log::warn!("identity lookup failed: {}", err);
            return;
        }
    };

    if tokens.validate(&token, &user) {
        req.extensions_mut().insert(CurrentUser {
            id: user.id,
            role: user.role,
        });
    } else {
        log::debug!("token for user {} failed validation", user.id);
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}
