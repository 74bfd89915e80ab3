use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::service::{send_magic_link, MagicLinkIssued};
use crate::auth::session::CurrentUser;
use crate::errors::{AppError, AppJson};
use crate::models::profile::{Profile, PublicProfile};
use crate::models::user::{User, UserRole};
use crate::profile::service::{
    get_profile_by_published_link, get_profile_by_user_id, publish_profile, update_profile,
};
use crate::profile::slug::parse_handle;
use crate::profile::validation::{validate_update, UpdateProfileRequest};
use crate::state::AppState;

#[derive(Serialize)]
pub struct MeResponse {
    pub user: User,
    pub profile: Option<Profile>,
}

#[derive(Deserialize)]
pub struct RecruiterAuthRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct RecruiterAuthResponse {
    pub candidate_name: String,
    #[serde(flatten)]
    pub issued: MagicLinkIssued,
}

/// Resolves an `@link` path segment to a published profile.
pub async fn load_published(state: &AppState, handle: &str) -> Result<Profile, AppError> {
    let link = parse_handle(handle)
        .ok_or_else(|| AppError::NotFound(format!("No profile at '{handle}'")))?;
    get_profile_by_published_link(&state.db, link)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No profile at '{handle}'")))
}

/// GET /api/v1/me
pub async fn handle_get_me(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<MeResponse>, AppError> {
    let profile = get_profile_by_user_id(&state.db, current.user.id).await?;
    Ok(Json(MeResponse {
        user: current.user,
        profile,
    }))
}

/// PUT /api/v1/me/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    let update = validate_update(&req)?;
    let profile = update_profile(&state.db, current.user.id, &update).await?;
    Ok(Json(profile))
}

/// POST /api/v1/me/profile/publish
pub async fn handle_publish_profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Profile>, AppError> {
    let profile = publish_profile(&state.db, current.user.id).await?;
    Ok(Json(profile))
}

/// GET /api/v1/profiles/:handle
pub async fn handle_get_public_profile(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<PublicProfile>, AppError> {
    let profile = load_published(&state, &handle).await?;
    Ok(Json(profile.into()))
}

/// POST /api/v1/profiles/:handle/recruiter-auth
pub async fn handle_recruiter_auth(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    AppJson(req): AppJson<RecruiterAuthRequest>,
) -> Result<(StatusCode, Json<RecruiterAuthResponse>), AppError> {
    let profile = load_published(&state, &handle).await?;
    let issued = send_magic_link(
        &state.db,
        state.mailer.as_ref(),
        &state.config,
        &req.email,
        UserRole::Recruiter,
    )
    .await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(RecruiterAuthResponse {
            candidate_name: profile.name,
            issued,
        }),
    ))
}
