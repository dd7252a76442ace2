use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{
    password::{hash_password_blocking, verify_password_blocking},
    AuthenticatedUser, RegisterRequest, TokenPair, TokenService, TokenType,
};
use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::{NewUser, User};

/// Registration, login and token refresh.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    /// Creates an account. The password is stored only as a bcrypt hash.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AppError> {
        let hashed_password = hash_password_blocking(request.password).await?;
        let record = self
            .users
            .create(NewUser {
                username: request.username,
                email: request.email,
                hashed_password,
            })
            .await?;

        log::info!("Registered user {} (id {})", record.username, record.id);
        Ok(record.into())
    }

    /// Checks credentials and starts a new session.
    ///
    /// Any refresh token issued earlier to the same user stops being accepted.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<TokenPair, AppError> {
        let invalid = || AppError::Unauthorized("Incorrect username or password".into());

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(invalid)?;
        if !user.is_active {
            return Err(invalid());
        }
        if !verify_password_blocking(password.to_string(), user.hashed_password.clone()).await? {
            return Err(invalid());
        }

        let token_id = Uuid::new_v4();
        let pair = self.issue_pair(user.id, token_id)?;
        self.users.set_refresh_token_id(user.id, token_id).await?;

        log::info!("User {} logged in", user.username);
        Ok(pair)
    }

    /// Trades a refresh token for a new token pair. Each refresh token works once.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self.tokens.verify(refresh_token, TokenType::Refresh)?;

        let next_id = Uuid::new_v4();
        let rotated = self
            .users
            .rotate_refresh_token_id(claims.sub, claims.jti, next_id)
            .await?;
        if !rotated {
            log::warn!(
                "Refresh token {} for user {} is no longer valid",
                claims.jti,
                claims.sub
            );
            return Err(AppError::Unauthorized("Invalid refresh token".into()));
        }

        log::info!("Refreshed tokens for user {}", claims.sub);
        self.issue_pair(claims.sub, next_id)
    }

    /// Resolves a bearer access token to an existing, active user.
    pub async fn current_user(&self, access_token: &str) -> Result<AuthenticatedUser, AppError> {
        let claims = self.tokens.verify(access_token, TokenType::Access)?;

        match self.users.find_by_id(claims.sub).await? {
            Some(user) if user.is_active => Ok(AuthenticatedUser { id: user.id }),
            Some(_) => Err(AppError::Unauthorized("Inactive user".into())),
            None => Err(AppError::Unauthorized("User not found".into())),
        }
    }

    fn issue_pair(&self, user_id: i32, refresh_token_id: Uuid) -> Result<TokenPair, AppError> {
        let access_token = self.tokens.issue_access_token(user_id)?;
        let refresh_token = self.tokens.issue_refresh_token(user_id, refresh_token_id)?;
        Ok(TokenPair::bearer(access_token, refresh_token))
    }
}
