use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Role;

/// Identity resolved by the access-control gate for the current request.
///
/// Extracting it on a route is what turns "unauthenticated" into a hard
/// failure: the gate itself never rejects a request, it only leaves this
/// unset. A missing identity yields `Unauthorized` (401); an identity
/// with the wrong role yields `AccessDenied` (403) via
/// [`CurrentUser::require_role`]. The two must not be conflated.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

impl CurrentUser {
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::AccessDenied("Access denied".into()))
        }
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<CurrentUser>().copied() {
            Some(user) => ready(Ok(user)),
            None => ready(Err(AppError::Unauthorized("Unauthorized access".into()).into())),
        }
    }
}
