use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::session::CurrentUser;
use crate::errors::AppError;
use crate::interview::service::list_candidate_interviews;
use crate::models::interview::CandidateInterview;
use crate::models::profile::Profile;
use crate::profile::completeness::{completion_report, CompletionReport};
use crate::profile::service::get_profile_by_user_id;
use crate::state::AppState;
use crate::wallet::service::total_released;

const RECENT_INTERVIEWS: i64 = 5;

#[derive(Serialize)]
pub struct DashboardResponse {
    pub profile: Option<Profile>,
    pub recent_interviews: Vec<CandidateInterview>,
    pub total_earnings: i64,
    pub completion: CompletionReport,
}

/// GET /api/v1/me/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<DashboardResponse>, AppError> {
    let user_id = current.user.id;
    let (profile, recent_interviews, total_earnings) = tokio::try_join!(
        get_profile_by_user_id(&state.db, user_id),
        list_candidate_interviews(&state.db, user_id, None, Some(RECENT_INTERVIEWS)),
        total_released(&state.db, user_id),
    )?;

    let completion = completion_report(profile.as_ref());
    Ok(Json(DashboardResponse {
        profile,
        recent_interviews,
        total_earnings,
        completion,
    }))
}
