use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::payment::{Payment, PaymentStatus};
use crate::models::user::{User, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interview_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterviewStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interview {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub recruiter_id: Uuid,
    pub status: InterviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An interview with both participants loaded.
#[derive(Debug, Clone, Serialize)]
pub struct InterviewWithParties {
    #[serde(flatten)]
    pub interview: Interview,
    pub candidate: User,
    pub recruiter: User,
}

/// Flat row for the candidate's interview list: interview + recruiter + optional payment.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateInterviewRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub recruiter_id: Uuid,
    pub status: InterviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub recruiter_email: String,
    pub recruiter_role: UserRole,
    pub recruiter_created_at: DateTime<Utc>,
    pub payment_id: Option<Uuid>,
    pub payment_amount: Option<i32>,
    pub payment_currency: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_created_at: Option<DateTime<Utc>>,
    pub payment_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateInterview {
    #[serde(flatten)]
    pub interview: Interview,
    pub recruiter: User,
    pub payment: Option<Payment>,
}

impl From<CandidateInterviewRow> for CandidateInterview {
    fn from(row: CandidateInterviewRow) -> Self {
        let payment = match (
            row.payment_id,
            row.payment_amount,
            row.payment_currency,
            row.payment_status,
            row.payment_created_at,
            row.payment_updated_at,
        ) {
            (Some(id), Some(amount), Some(currency), Some(status), Some(created_at), Some(updated_at)) => {
                Some(Payment {
                    id,
                    interview_id: row.id,
                    amount,
                    currency,
                    status,
                    created_at,
                    updated_at,
                })
            }
            _ => None,
        };

        CandidateInterview {
            interview: Interview {
                id: row.id,
                candidate_id: row.candidate_id,
                recruiter_id: row.recruiter_id,
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            recruiter: User {
                id: row.recruiter_id,
                email: row.recruiter_email,
                role: row.recruiter_role,
                created_at: row.recruiter_created_at,
            },
            payment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(with_payment: bool) -> CandidateInterviewRow {
        let now = Utc::now();
        CandidateInterviewRow {
            id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            recruiter_id: Uuid::new_v4(),
            status: InterviewStatus::Pending,
            created_at: now,
            updated_at: now,
            recruiter_email: "hiring@acme.io".to_string(),
            recruiter_role: UserRole::Recruiter,
            recruiter_created_at: now,
            payment_id: with_payment.then(Uuid::new_v4),
            payment_amount: with_payment.then_some(120),
            payment_currency: with_payment.then(|| "USD".to_string()),
            payment_status: with_payment.then_some(PaymentStatus::Escrow),
            payment_created_at: with_payment.then_some(now),
            payment_updated_at: with_payment.then_some(now),
        }
    }

    #[test]
    fn test_row_without_payment_maps_to_none() {
        let item = CandidateInterview::from(row(false));
        assert!(item.payment.is_none());
        assert_eq!(item.recruiter.email, "hiring@acme.io");
    }

    #[test]
    fn test_row_with_payment_links_interview_id() {
        let r = row(true);
        let interview_id = r.id;
        let item = CandidateInterview::from(r);
        let payment = item.payment.expect("payment present");
        assert_eq!(payment.interview_id, interview_id);
        assert_eq!(payment.amount, 120);
        assert_eq!(payment.status, PaymentStatus::Escrow);
    }

    #[test]
    fn test_status_serializes_screaming_case() {
        let json = serde_json::to_string(&InterviewStatus::Completed).unwrap();
        assert_eq!(json, "\"COMPLETED\"");
    }
}
