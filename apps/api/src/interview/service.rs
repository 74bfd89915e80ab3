use serde::Serialize;
use sqlx::{PgConnection, PgExecutor, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::auth::service::get_user_by_id;
use crate::errors::AppError;
use crate::models::interview::{
    CandidateInterview, CandidateInterviewRow, Interview, InterviewStatus, InterviewWithParties,
};
use crate::models::payment::{Payment, PaymentStatus};
use crate::models::profile::{Currency, Profile};
use crate::models::user::{User, UserRole};

/// A freshly booked interview and the escrowed payment backing it.
#[derive(Debug, Serialize)]
pub struct Booking {
    pub interview: Interview,
    pub payment: Payment,
}

/// Result of a candidate confirming an interview took place.
#[derive(Debug, Serialize)]
pub struct Completion {
    pub interview: Interview,
    pub payment: Option<Payment>,
}

async fn insert_interview<'e, E: PgExecutor<'e>>(
    executor: E,
    candidate_id: Uuid,
    recruiter_id: Uuid,
) -> Result<Interview, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO interviews (id, candidate_id, recruiter_id, status)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(candidate_id)
    .bind(recruiter_id)
    .bind(InterviewStatus::Pending)
    .fetch_one(executor)
    .await
}

/// Creates a pending interview between two existing users.
pub async fn create_interview(
    conn: &mut PgConnection,
    candidate_id: Uuid,
    recruiter_id: Uuid,
) -> Result<InterviewWithParties, AppError> {
    let candidate = fetch_user(&mut *conn, candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate with ID {candidate_id} not found")))?;
    let recruiter = fetch_user(&mut *conn, recruiter_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Recruiter with ID {recruiter_id} not found")))?;

    let interview = insert_interview(&mut *conn, candidate.id, recruiter.id).await?;
    info!(
        "Created interview {} between candidate {} and recruiter {}",
        interview.id, candidate.id, recruiter.id
    );

    Ok(InterviewWithParties {
        interview,
        candidate,
        recruiter,
    })
}

async fn fetch_user<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn get_interview_by_id(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<InterviewWithParties>, AppError> {
    let interview: Option<Interview> = sqlx::query_as("SELECT * FROM interviews WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let Some(interview) = interview else {
        return Ok(None);
    };

    let (candidate, recruiter) = tokio::try_join!(
        get_user_by_id(pool, interview.candidate_id),
        get_user_by_id(pool, interview.recruiter_id)
    )?;
    match (candidate, recruiter) {
        (Some(candidate), Some(recruiter)) => Ok(Some(InterviewWithParties {
            interview,
            candidate,
            recruiter,
        })),
        _ => Err(AppError::Internal(anyhow::anyhow!(
            "interview {id} references a missing user"
        ))),
    }
}

/// Checks that `recruiter` may book the candidate behind `profile`, returning
/// the price of one interview.
pub fn booking_price(recruiter: &User, profile: &Profile) -> Result<(i32, Currency), AppError> {
    if recruiter.role != UserRole::Recruiter {
        return Err(AppError::Forbidden(
            "Only recruiters can book interviews".to_string(),
        ));
    }
    if profile.user_id == recruiter.id {
        return Err(AppError::UnprocessableEntity(
            "You cannot book an interview with yourself".to_string(),
        ));
    }
    match Currency::parse(&profile.interview_rate_currency) {
        Some(currency) if profile.interview_rate > 0 => Ok((profile.interview_rate, currency)),
        _ => Err(AppError::UnprocessableEntity(format!(
            "{} has not set an interview rate yet",
            if profile.name.is_empty() { "This candidate" } else { profile.name.as_str() }
        ))),
    }
}

/// Books an interview with the candidate behind `profile` and puts the
/// candidate's rate into escrow. Both rows are written in one transaction.
pub async fn book_interview(
    pool: &PgPool,
    recruiter: &User,
    profile: &Profile,
) -> Result<Booking, AppError> {
    let (amount, currency) = booking_price(recruiter, profile)?;

    let mut tx = pool.begin().await?;

    let InterviewWithParties { interview, .. } =
        create_interview(&mut *tx, profile.user_id, recruiter.id).await?;

    let payment: Payment = sqlx::query_as(
        r#"
        INSERT INTO payments (id, interview_id, amount, currency, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(interview.id)
    .bind(amount)
    .bind(currency.as_str())
    .bind(PaymentStatus::Escrow)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Recruiter {} booked interview {} with candidate {} ({} {} in escrow)",
        recruiter.id,
        interview.id,
        profile.user_id,
        amount,
        currency.as_str()
    );
    Ok(Booking { interview, payment })
}

/// Candidate's interviews, newest first, with recruiter and payment.
/// `limit = None` returns all of them.
pub async fn list_candidate_interviews(
    pool: &PgPool,
    candidate_id: Uuid,
    status: Option<InterviewStatus>,
    limit: Option<i64>,
) -> Result<Vec<CandidateInterview>, AppError> {
    let rows = sqlx::query_as::<_, CandidateInterviewRow>(
        r#"
        SELECT i.id, i.candidate_id, i.recruiter_id, i.status, i.created_at, i.updated_at,
               r.email AS recruiter_email,
               r.role AS recruiter_role,
               r.created_at AS recruiter_created_at,
               p.id AS payment_id,
               p.amount AS payment_amount,
               p.currency AS payment_currency,
               p.status AS payment_status,
               p.created_at AS payment_created_at,
               p.updated_at AS payment_updated_at
        FROM interviews i
        JOIN users r ON r.id = i.recruiter_id
        LEFT JOIN payments p ON p.interview_id = i.id
        WHERE i.candidate_id = $1
          AND ($2::interview_status IS NULL OR i.status = $2)
        ORDER BY i.created_at DESC
        LIMIT $3
        "#,
    )
    .bind(candidate_id)
    .bind(status)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(CandidateInterview::from).collect())
}

/// The caller's interview must exist and still be pending.
pub fn check_completable(existing: Option<&Interview>, interview_id: Uuid) -> Result<(), AppError> {
    match existing {
        None => Err(AppError::NotFound(format!("Interview {interview_id} not found"))),
        Some(interview) if interview.status == InterviewStatus::Completed => Err(
            AppError::Conflict(format!("Interview {interview_id} is already completed")),
        ),
        Some(_) => Ok(()),
    }
}

/// Marks a pending interview completed and releases its escrowed payment.
///
/// Only the interview's candidate may do this. The row is locked for the
/// duration of the transaction, so concurrent completions release once.
pub async fn complete_interview(
    pool: &PgPool,
    candidate_id: Uuid,
    interview_id: Uuid,
) -> Result<Completion, AppError> {
    let mut tx = pool.begin().await?;

    let existing: Option<Interview> = sqlx::query_as(
        "SELECT * FROM interviews WHERE id = $1 AND candidate_id = $2 FOR UPDATE",
    )
    .bind(interview_id)
    .bind(candidate_id)
    .fetch_optional(&mut *tx)
    .await?;

    check_completable(existing.as_ref(), interview_id)?;

    let interview: Interview = sqlx::query_as(
        r#"
        UPDATE interviews
        SET status = $2, updated_at = NOW()
        WHERE id = $1 AND status = $3
        RETURNING *
        "#,
    )
    .bind(interview_id)
    .bind(InterviewStatus::Completed)
    .bind(InterviewStatus::Pending)
    .fetch_one(&mut *tx)
    .await?;

    let payment: Option<Payment> = sqlx::query_as(
        r#"
        UPDATE payments
        SET status = $2, updated_at = NOW()
        WHERE interview_id = $1
        RETURNING *
        "#,
    )
    .bind(interview_id)
    .bind(PaymentStatus::Released)
    .fetch_optional(&mut *tx)
    .await?;

    tx.commit().await?;

    match &payment {
        Some(p) => info!(
            "Interview {interview_id} completed, released {} {}",
            p.amount, p.currency
        ),
        None => info!("Interview {interview_id} completed without a payment"),
    }
    Ok(Completion { interview, payment })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::service::find_or_create_user;
    use crate::db::test_pool;
    use chrono::Utc;

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    fn profile_for(owner: &User, rate: i32, currency: &str) -> Profile {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            user_id: owner.id,
            name: "Ada Lovelace".to_string(),
            role: "Staff Engineer".to_string(),
            years_of_experience: 12,
            location: "London".to_string(),
            interview_rate: rate,
            interview_rate_currency: currency.to_string(),
            is_published: true,
            published_at: Some(now),
            published_link: Some("ada-lovelace-a1b2c3".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_recruiter_pays_candidate_rate() {
        let candidate = user(UserRole::Candidate);
        let recruiter = user(UserRole::Recruiter);
        let profile = profile_for(&candidate, 150, "GBP");
        let (amount, currency) = booking_price(&recruiter, &profile).unwrap();
        assert_eq!(amount, 150);
        assert_eq!(currency, Currency::Gbp);
    }

    #[test]
    fn test_candidate_cannot_book() {
        let candidate = user(UserRole::Candidate);
        let other = user(UserRole::Candidate);
        let profile = profile_for(&candidate, 150, "GBP");
        assert!(matches!(
            booking_price(&other, &profile),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_recruiter_cannot_book_self() {
        let recruiter = user(UserRole::Recruiter);
        let profile = profile_for(&recruiter, 150, "GBP");
        assert!(matches!(
            booking_price(&recruiter, &profile),
            Err(AppError::UnprocessableEntity(_))
        ));
    }

    #[test]
    fn test_unpriced_profile_cannot_be_booked() {
        let candidate = user(UserRole::Candidate);
        let recruiter = user(UserRole::Recruiter);
        for (rate, currency) in [(0, "USD"), (100, ""), (100, "JPY")] {
            let profile = profile_for(&candidate, rate, currency);
            assert!(
                matches!(
                    booking_price(&recruiter, &profile),
                    Err(AppError::UnprocessableEntity(_))
                ),
                "rate {rate} {currency:?} should be rejected"
            );
        }
    }

    fn interview_with(status: InterviewStatus) -> Interview {
        let now = Utc::now();
        Interview {
            id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            recruiter_id: Uuid::new_v4(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_pending_interview_is_completable() {
        let interview = interview_with(InterviewStatus::Pending);
        assert!(check_completable(Some(&interview), interview.id).is_ok());
    }

    #[test]
    fn test_completed_interview_is_conflict() {
        let interview = interview_with(InterviewStatus::Completed);
        assert!(matches!(
            check_completable(Some(&interview), interview.id),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_missing_interview_is_not_found() {
        assert!(matches!(
            check_completable(None, Uuid::new_v4()),
            Err(AppError::NotFound(_))
        ));
    }

    // Tests below need a Postgres instance at DATABASE_URL.

    async fn seeded_user(pool: &PgPool, role: UserRole) -> User {
        let email = format!("{}@example.com", Uuid::new_v4());
        find_or_create_user(pool, &email, role).await.unwrap()
    }

    async fn priced_profile(pool: &PgPool, candidate: &User) -> Profile {
        sqlx::query_as(
            r#"
            UPDATE profiles
            SET name = 'Ada Lovelace', interview_rate = 120, interview_rate_currency = 'EUR'
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(candidate.id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn payment_for(pool: &PgPool, interview_id: Uuid) -> Option<Payment> {
        sqlx::query_as("SELECT * FROM payments WHERE interview_id = $1")
            .bind(interview_id)
            .fetch_optional(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_booking_escrows_candidate_rate() {
        let pool = test_pool().await;
        let candidate = seeded_user(&pool, UserRole::Candidate).await;
        let recruiter = seeded_user(&pool, UserRole::Recruiter).await;
        let profile = priced_profile(&pool, &candidate).await;

        let booking = book_interview(&pool, &recruiter, &profile).await.unwrap();
        assert_eq!(booking.interview.status, InterviewStatus::Pending);
        assert_eq!(booking.interview.candidate_id, candidate.id);
        assert_eq!(booking.interview.recruiter_id, recruiter.id);
        assert_eq!(booking.payment.amount, 120);
        assert_eq!(booking.payment.currency, "EUR");
        assert_eq!(booking.payment.status, PaymentStatus::Escrow);

        let listed = list_candidate_interviews(&pool, candidate.id, None, None)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].recruiter.id, recruiter.id);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_completion_releases_payment_once() {
        let pool = test_pool().await;
        let candidate = seeded_user(&pool, UserRole::Candidate).await;
        let recruiter = seeded_user(&pool, UserRole::Recruiter).await;
        let profile = priced_profile(&pool, &candidate).await;
        let booking = book_interview(&pool, &recruiter, &profile).await.unwrap();

        let completion = complete_interview(&pool, candidate.id, booking.interview.id)
            .await
            .unwrap();
        assert_eq!(completion.interview.status, InterviewStatus::Completed);
        let payment = completion.payment.unwrap();
        assert_eq!(payment.status, PaymentStatus::Released);

        assert!(matches!(
            complete_interview(&pool, candidate.id, booking.interview.id).await,
            Err(AppError::Conflict(_))
        ));
        let stored = payment_for(&pool, booking.interview.id).await.unwrap();
        assert_eq!(stored.status, PaymentStatus::Released);
        assert_eq!(stored.updated_at, payment.updated_at);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_only_candidate_can_complete() {
        let pool = test_pool().await;
        let candidate = seeded_user(&pool, UserRole::Candidate).await;
        let recruiter = seeded_user(&pool, UserRole::Recruiter).await;
        let profile = priced_profile(&pool, &candidate).await;
        let booking = book_interview(&pool, &recruiter, &profile).await.unwrap();

        assert!(matches!(
            complete_interview(&pool, recruiter.id, booking.interview.id).await,
            Err(AppError::NotFound(_))
        ));
        let stored = payment_for(&pool, booking.interview.id).await.unwrap();
        assert_eq!(stored.status, PaymentStatus::Escrow);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_interview_without_payment_completes() {
        let pool = test_pool().await;
        let candidate = seeded_user(&pool, UserRole::Candidate).await;
        let recruiter = seeded_user(&pool, UserRole::Recruiter).await;

        let mut conn = pool.acquire().await.unwrap();
        let created = create_interview(&mut *conn, candidate.id, recruiter.id)
            .await
            .unwrap();
        drop(conn);

        let completion = complete_interview(&pool, candidate.id, created.interview.id)
            .await
            .unwrap();
        assert_eq!(completion.interview.status, InterviewStatus::Completed);
        assert!(completion.payment.is_none());
    }
}
