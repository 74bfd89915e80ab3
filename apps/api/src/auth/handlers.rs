use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::service::{send_magic_link, verify_login_token, MagicLinkIssued};
use crate::auth::session::{delete_session, removal_cookie, session_cookie, CurrentUser};
use crate::errors::{AppError, AppJson};
use crate::models::user::{User, UserRole};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MagicLinkRequest {
    pub email: String,
    /// Only applied when the email signs up for the first time.
    #[serde(default)]
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub user: User,
    pub session_expires_at: DateTime<Utc>,
}

/// POST /api/v1/auth/magic-link
pub async fn handle_magic_link(
    State(state): State<AppState>,
    AppJson(req): AppJson<MagicLinkRequest>,
) -> Result<(StatusCode, Json<MagicLinkIssued>), AppError> {
    let issued = send_magic_link(
        &state.db,
        state.mailer.as_ref(),
        &state.config,
        &req.email,
        req.role.unwrap_or(UserRole::Candidate),
    )
    .await?;
    Ok((StatusCode::ACCEPTED, Json(issued)))
}

/// POST /api/v1/auth/verify
pub async fn handle_verify(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(req): AppJson<VerifyRequest>,
) -> Result<(CookieJar, Json<VerifyResponse>), AppError> {
    let token = req
        .token
        .trim()
        .parse::<Uuid>()
        .map_err(|_| AppError::Unauthorized)?;

    let (user, session) = verify_login_token(&state.db, &state.config, token).await?;
    let jar = jar.add(session_cookie(session.token, state.config.cookie_secure));

    Ok((
        jar,
        Json(VerifyResponse {
            user,
            session_expires_at: session.expires_at,
        }),
    ))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    current: CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), AppError> {
    delete_session(&state.db, current.session_token).await?;
    tracing::info!("User {} logged out", current.user.id);
    Ok((jar.remove(removal_cookie()), StatusCode::NO_CONTENT))
}
