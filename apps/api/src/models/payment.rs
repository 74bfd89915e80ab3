use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::interview::InterviewStatus;
use crate::models::user::{User, UserRole};

/// `ESCROW` while the interview is pending, `RELEASED` once the candidate completes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Escrow,
    Released,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub amount: i32,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat row for a payment joined with its interview and recruiter.
#[derive(Debug, Clone, FromRow)]
pub struct WalletEntryRow {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub amount: i32,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub interview_status: InterviewStatus,
    pub interview_created_at: DateTime<Utc>,
    pub recruiter_id: Uuid,
    pub recruiter_email: String,
    pub recruiter_role: UserRole,
    pub recruiter_created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletEntry {
    #[serde(flatten)]
    pub payment: Payment,
    pub interview_status: InterviewStatus,
    pub interview_created_at: DateTime<Utc>,
    pub recruiter: User,
}

impl From<WalletEntryRow> for WalletEntry {
    fn from(row: WalletEntryRow) -> Self {
        WalletEntry {
            payment: Payment {
                id: row.id,
                interview_id: row.interview_id,
                amount: row.amount,
                currency: row.currency,
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            interview_status: row.interview_status,
            interview_created_at: row.interview_created_at,
            recruiter: User {
                id: row.recruiter_id,
                email: row.recruiter_email,
                role: row.recruiter_role,
                created_at: row.recruiter_created_at,
            },
        }
    }
}
