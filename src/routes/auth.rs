use crate::{
    auth::{RefreshRequest, RegisterRequest, TokenRequest},
    error::AppError,
    services::AuthService,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns it without credentials.
///
/// ## Responses:
/// - `201 Created`: the new `User`.
/// - `409 Conflict`: username or email already registered.
/// - `422 Unprocessable Entity`: invalid username, email or password.
#[post("/register")]
pub async fn register(
    auth: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = auth.register(register_data.into_inner()).await?;

    Ok(HttpResponse::Created().json(user))
}

/// Log in
///
/// Exchanges a username and password for an access and a refresh token.
///
/// ## Responses:
/// - `200 OK`: a `TokenPair`.
/// - `401 Unauthorized`: unknown user or wrong password.
#[post("/token")]
pub async fn token(
    auth: web::Data<AuthService>,
    login_data: web::Json<TokenRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let tokens = auth
        .authenticate(&login_data.username, &login_data.password)
        .await?;

    Ok(HttpResponse::Ok().json(tokens))
}

/// Refresh tokens
///
/// Trades a refresh token for a new pair. The presented token is spent.
///
/// ## Responses:
/// - `200 OK`: a new `TokenPair`.
/// - `401 Unauthorized`: invalid, expired, already used or not a refresh token.
#[post("/refresh")]
pub async fn refresh(
    auth: web::Data<AuthService>,
    refresh_data: web::Json<RefreshRequest>,
) -> Result<impl Responder, AppError> {
    refresh_data.validate()?;

    let tokens = auth.refresh(&refresh_data.refresh_token).await?;

    Ok(HttpResponse::Ok().json(tokens))
}
