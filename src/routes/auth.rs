use actix_web::{post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    auth::{
        hash_password, normalize_email, verify_password, AuthResponse, LoginRequest,
        RegisterRequest, TokenService,
    },
    db,
    error::AppError,
    models::{User, UserResponse},
};

/// Registers a new user.
///
/// The email is normalized before the uniqueness check and storage. A
/// collision fails with `DuplicateEmail`; the unique index backs the
/// check up under concurrent registration. New users start as ACTIVE
/// members.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    payload: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let email = normalize_email(&payload.email);
    if db::users::email_taken(pool.get_ref(), &email).await? {
        return Err(AppError::DuplicateEmail("Email already exists".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User::new(payload.name.trim().to_string(), email, password_hash);
    let user = db::users::insert(pool.get_ref(), &user).await?;

    log::info!("registered user {}", user.id);
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Authenticates a user and issues a bearer token.
///
/// An unknown (or deleted) email fails with `NotFound`; a wrong password
/// fails with `InvalidCredentials` and reveals nothing further. Tokens
/// are stateless, so login mutates no stored state.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let email = normalize_email(&payload.email);
    let user = db::users::find_active_by_email(pool.get_ref(), &email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(AppError::InvalidCredentials("Password incorrect".into()));
    }

    let token = tokens.issue(user.id)?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}
