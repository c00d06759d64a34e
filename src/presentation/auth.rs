use crate::domain::token::AuthenticatedUser;
use crate::domain::user::LoginRequest;
use crate::presentation::handlers::{ApiError, AppState};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: String,
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    let issued = state
        .auth_service
        .issue_token(req.into_inner())
        .await
        .map_err(|e| {
            warn!(error = %e, "Login failed");
            e
        })?;

    info!(token_id = issued.token.id, "Login successful");
    Ok(HttpResponse::Ok().json(LoginResponse {
        token: issued.plain_text,
    }))
}

/// Revokes the token the request was authenticated with. Other tokens of the
/// same user are untouched.
#[instrument(skip(state, user), fields(user_id = %user.id, token_id = user.token_id))]
pub async fn logout(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    state.auth_service.revoke_token(user.token_id).await?;

    info!("Logout successful");
    Ok(HttpResponse::Ok().json(LogoutResponse {
        success: "logout".to_string(),
    }))
}

#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn current_user(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(user)
}
