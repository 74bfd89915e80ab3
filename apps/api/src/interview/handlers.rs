use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::session::CurrentUser;
use crate::errors::AppError;
use crate::interview::service::{
    book_interview, complete_interview, get_interview_by_id, list_candidate_interviews, Booking,
    Completion,
};
use crate::models::interview::{CandidateInterview, InterviewStatus, InterviewWithParties};
use crate::profile::handlers::load_published;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn as_status(self) -> Option<InterviewStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some(InterviewStatus::Pending),
            StatusFilter::Completed => Some(InterviewStatus::Completed),
        }
    }
}

#[derive(Deserialize)]
pub struct InterviewListQuery {
    pub status: Option<StatusFilter>,
}

#[derive(Serialize)]
pub struct InterviewListResponse {
    pub total: usize,
    pub interviews: Vec<CandidateInterview>,
}

/// POST /api/v1/profiles/:handle/interviews
pub async fn handle_book_interview(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    current: CurrentUser,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let profile = load_published(&state, &handle).await?;
    let booking = book_interview(&state.db, &current.user, &profile).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/v1/me/interviews
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<InterviewListQuery>,
) -> Result<Json<InterviewListResponse>, AppError> {
    let status = params.status.and_then(StatusFilter::as_status);
    let interviews = list_candidate_interviews(&state.db, current.user.id, status, None).await?;
    Ok(Json(InterviewListResponse {
        total: interviews.len(),
        interviews,
    }))
}

/// POST /api/v1/me/interviews/:id/complete
pub async fn handle_complete_interview(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Completion>, AppError> {
    let completion = complete_interview(&state.db, current.user.id, id).await?;
    Ok(Json(completion))
}

/// GET /api/v1/interviews/:id
/// Visible to the two participants only; everyone else gets a 404.
pub async fn handle_get_interview(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewWithParties>, AppError> {
    let caller = current.user.id;
    get_interview_by_id(&state.db, id)
        .await?
        .filter(|found| {
            found.interview.candidate_id == caller || found.interview.recruiter_id == caller
        })
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter_parses_lowercase() {
        let q: InterviewListQuery = serde_json::from_str(r#"{"status": "pending"}"#).unwrap();
        assert_eq!(q.status, Some(StatusFilter::Pending));
        assert_eq!(
            StatusFilter::Completed.as_status(),
            Some(InterviewStatus::Completed)
        );
        assert_eq!(StatusFilter::All.as_status(), None);
    }

    #[test]
    fn test_unknown_status_filter_rejected() {
        assert!(serde_json::from_str::<InterviewListQuery>(r#"{"status": "cancelled"}"#).is_err());
    }
}
