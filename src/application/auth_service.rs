use crate::domain::error::DomainError;
use crate::domain::repository::{TokenRepository, UserRepository};
use crate::domain::token::{AuthenticatedUser, NewAccessToken};
use crate::domain::user::{CreateUser, LoginRequest, User};
use crate::infrastructure::security::{
    generate_token_secret, hash_password, hash_token, split_token, token_matches,
    verify_password,
};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

/// Name recorded on every token issued through the login endpoint.
pub const LOGIN_TOKEN_NAME: &str = "token";

pub struct AuthService<U: UserRepository, T: TokenRepository> {
    user_repository: Arc<U>,
    token_repository: Arc<T>,
}

impl<U: UserRepository, T: TokenRepository> AuthService<U, T> {
    pub fn new(user_repository: Arc<U>, token_repository: Arc<T>) -> Self {
        Self {
            user_repository,
            token_repository,
        }
    }

    /// Creates a user out-of-band. There is no HTTP route for this.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register_user(&self, req: CreateUser) -> Result<User> {
        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: req.email,
            password_hash,
        };
        self.user_repository.save_user(user.clone()).await?;

        info!(user_id = %user.id, email = %user.email, "User registered");
        Ok(user)
    }

    /// Verifies the credentials and persists a new token. Every call issues a
    /// fresh token; earlier tokens of the same user stay valid.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn issue_token(&self, req: LoginRequest) -> Result<NewAccessToken> {
        trace!("Starting login");
        validate_login(&req)?;
        let email = req.email.trim();

        let user = self
            .user_repository
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| {
                warn!(email = email, "User not found during login");
                DomainError::InvalidCredentials
            })?;

        let is_valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
            error!(error = %e, "Failed to verify password");
            DomainError::Internal(format!("Failed to verify password: {}", e))
        })?;
        if !is_valid {
            warn!(user_id = %user.id, "Invalid password during login");
            return Err(DomainError::InvalidCredentials.into());
        }

        let secret = generate_token_secret();
        let token = self
            .token_repository
            .create(&user.id, LOGIN_TOKEN_NAME, hash_token(&secret))
            .await?;
        let plain_text = format!("{}|{}", token.id, secret);

        info!(user_id = %user.id, token_id = token.id, "Token issued");
        Ok(NewAccessToken { token, plain_text })
    }

    /// Maps a plaintext bearer token to the identity it was issued for.
    #[instrument(skip(self, token))]
    pub async fn resolve(&self, token: &str) -> Result<AuthenticatedUser> {
        let Some((token_id, secret)) = split_token(token) else {
            debug!("Malformed bearer token");
            return Err(DomainError::Unauthenticated.into());
        };

        let record = self
            .token_repository
            .find_by_id(token_id)
            .await?
            .filter(|record| token_matches(secret, &record.token_hash))
            .ok_or_else(|| {
                debug!(token_id = token_id, "Unknown or revoked token");
                DomainError::Unauthenticated
            })?;

        let user = self
            .user_repository
            .find_user_by_id(&record.user_id)
            .await?
            .ok_or_else(|| {
                warn!(
                    token_id = token_id,
                    user_id = %record.user_id,
                    "Token owner no longer exists"
                );
                DomainError::Unauthenticated
            })?;

        self.token_repository.touch(record.id, Utc::now()).await?;
        trace!(user_id = %user.id, token_id = token_id, "Token resolved");

        Ok(AuthenticatedUser {
            id: user.id,
            email: user.email,
            token_id: record.id,
        })
    }

    /// Deletes the token record the caller was authenticated with. Only one
    /// of several concurrent revocations of the same token can succeed.
    #[instrument(skip(self))]
    pub async fn revoke_token(&self, token_id: u64) -> Result<()> {
        if !self.token_repository.delete(token_id).await? {
            debug!(token_id = token_id, "Token already revoked");
            return Err(DomainError::Unauthenticated.into());
        }
        info!(token_id = token_id, "Token revoked");
        Ok(())
    }
}

fn validate_login(req: &LoginRequest) -> Result<(), DomainError> {
    let email = req.email.trim();
    if email.is_empty() {
        return Err(DomainError::validation("email", "The email field is required."));
    }
    if !looks_like_email(email) {
        return Err(DomainError::validation(
            "email",
            "The email field must be a valid email address.",
        ));
    }
    if req.password.is_empty() {
        return Err(DomainError::validation(
            "password",
            "The password field is required.",
        ));
    }
    Ok(())
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
