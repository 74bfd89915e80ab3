use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::payment::{WalletEntry, WalletEntryRow};

/// Payments for the candidate's interviews, newest first, each with its recruiter.
pub async fn list_candidate_payments(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Vec<WalletEntry>, AppError> {
    let rows = sqlx::query_as::<_, WalletEntryRow>(
        r#"
        SELECT p.id, p.interview_id, p.amount, p.currency, p.status, p.created_at, p.updated_at,
               i.status AS interview_status,
               i.created_at AS interview_created_at,
               r.id AS recruiter_id,
               r.email AS recruiter_email,
               r.role AS recruiter_role,
               r.created_at AS recruiter_created_at
        FROM payments p
        JOIN interviews i ON i.id = p.interview_id
        JOIN users r ON r.id = i.recruiter_id
        WHERE i.candidate_id = $1
        ORDER BY p.created_at DESC
        "#,
    )
    .bind(candidate_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(WalletEntry::from).collect())
}

/// Sum of released payments across the candidate's interviews.
pub async fn total_released(pool: &PgPool, candidate_id: Uuid) -> Result<i64, AppError> {
    Ok(sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(p.amount), 0)::BIGINT
        FROM payments p
        JOIN interviews i ON i.id = p.interview_id
        WHERE i.candidate_id = $1 AND p.status = 'RELEASED'
        "#,
    )
    .bind(candidate_id)
    .fetch_one(pool)
    .await?)
}
