pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::auth::handlers as auth;
use crate::dashboard::handlers as dashboard;
use crate::interview::handlers as interview;
use crate::profile::handlers as profile;
use crate::state::AppState;
use crate::wallet::handlers as wallet;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/magic-link", post(auth::handle_magic_link))
        .route("/api/v1/auth/verify", post(auth::handle_verify))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        // Candidate area
        .route("/api/v1/me", get(profile::handle_get_me))
        .route("/api/v1/me/profile", put(profile::handle_update_profile))
        .route(
            "/api/v1/me/profile/publish",
            post(profile::handle_publish_profile),
        )
        .route("/api/v1/me/dashboard", get(dashboard::handle_dashboard))
        .route("/api/v1/me/interviews", get(interview::handle_list_interviews))
        .route(
            "/api/v1/me/interviews/:id/complete",
            post(interview::handle_complete_interview),
        )
        .route("/api/v1/me/wallet", get(wallet::handle_get_wallet))
        .route("/api/v1/me/wallet/withdraw", post(wallet::handle_withdraw))
        // Public profiles and booking
        .route(
            "/api/v1/profiles/:handle",
            get(profile::handle_get_public_profile),
        )
        .route(
            "/api/v1/profiles/:handle/recruiter-auth",
            post(profile::handle_recruiter_auth),
        )
        .route(
            "/api/v1/profiles/:handle/interviews",
            post(interview::handle_book_interview),
        )
        .route("/api/v1/interviews/:id", get(interview::handle_get_interview))
        .with_state(state)
}
