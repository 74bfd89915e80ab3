use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::session::CurrentUser;
use crate::errors::AppError;
use crate::models::payment::WalletEntry;
use crate::state::AppState;
use crate::wallet::service::list_candidate_payments;
use crate::wallet::stats::{compute_wallet_stats, WalletStats};

#[derive(Serialize)]
pub struct WalletResponse {
    pub payments: Vec<WalletEntry>,
    pub stats: WalletStats,
}

/// GET /api/v1/me/wallet
pub async fn handle_get_wallet(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<WalletResponse>, AppError> {
    let payments = list_candidate_payments(&state.db, current.user.id).await?;
    let stats = compute_wallet_stats(payments.iter().map(|entry| &entry.payment));
    Ok(Json(WalletResponse { payments, stats }))
}

/// POST /api/v1/me/wallet/withdraw
// TODO: wire up a payout provider once one is chosen; until then withdrawals are refused.
pub async fn handle_withdraw(current: CurrentUser) -> Result<Json<WalletStats>, AppError> {
    tracing::info!("Withdrawal requested by user {}", current.user.id);
    Err(AppError::NotImplemented)
}
