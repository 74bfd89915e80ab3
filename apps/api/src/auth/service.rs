use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::mailer::MagicLinkSender;
use crate::auth::session::Session;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::user::{User, UserRole};

#[derive(Debug, Serialize)]
pub struct MagicLinkIssued {
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LoginToken {
    pub token: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Rows removed by [`purge_expired`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub login_tokens: u64,
    pub sessions: u64,
}

/// Trims and lower-cases an email address, rejecting anything without a
/// local part and a domain.
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(AppError::Validation(format!(
            "'{}' is not a valid email address",
            raw.trim()
        ))),
    }
}

pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?)
}

pub async fn get_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
    Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

/// Returns the user for `email`, creating it together with an empty profile
/// when it does not exist yet. An existing user's role is left untouched.
pub async fn find_or_create_user(
    pool: &PgPool,
    email: &str,
    role: UserRole,
) -> Result<User, AppError> {
    if let Some(user) = get_user_by_email(pool, email).await? {
        return Ok(user);
    }

    let mut tx = pool.begin().await?;

    let created: Option<User> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(role)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(user) = created else {
        // Lost a race with a concurrent sign-up for the same address.
        tx.rollback().await?;
        return get_user_by_email(pool, email)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("user {email} vanished after conflict")));
    };

    sqlx::query("INSERT INTO profiles (id, user_id) VALUES ($1, $2)")
        .bind(Uuid::new_v4())
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("Created {:?} user {} with empty profile", user.role, user.id);
    Ok(user)
}

/// Signs a user up if needed, issues a single-use login token and hands the
/// resulting link to the mailer.
pub async fn send_magic_link(
    pool: &PgPool,
    mailer: &dyn MagicLinkSender,
    config: &Config,
    raw_email: &str,
    role: UserRole,
) -> Result<MagicLinkIssued, AppError> {
    let email = normalize_email(raw_email)?;
    let user = find_or_create_user(pool, &email, role).await?;

    let token = Uuid::new_v4();
    let expires_at = Utc::now() + Duration::minutes(config.magic_link_ttl_minutes);

    // The token only becomes usable once the mailer accepted the link.
    let mut tx = pool.begin().await?;
    sqlx::query("INSERT INTO login_tokens (token, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(token)
        .bind(user.id)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

    let link = magic_link_url(&config.public_base_url, token);
    mailer.send(&user.email, &link).await?;
    tx.commit().await?;

    info!("Issued magic link for user {}", user.id);
    Ok(MagicLinkIssued {
        email: user.email,
        expires_at,
    })
}

pub fn magic_link_url(base_url: &str, token: Uuid) -> String {
    format!("{}/auth/verify?token={}", base_url.trim_end_matches('/'), token)
}

/// Returns the token's user when it exists, is unused and has not expired.
pub fn check_login_token(token: Option<&LoginToken>, now: DateTime<Utc>) -> Result<Uuid, AppError> {
    match token {
        Some(t) if t.consumed_at.is_none() && t.expires_at > now => Ok(t.user_id),
        Some(t) => {
            debug!("login token {} is consumed or expired", t.token);
            Err(AppError::Unauthorized)
        }
        None => Err(AppError::Unauthorized),
    }
}

/// Consumes a login token and opens a session for its user.
/// Unknown, expired and already-used tokens are all `Unauthorized`.
pub async fn verify_login_token(
    pool: &PgPool,
    config: &Config,
    token: Uuid,
) -> Result<(User, Session), AppError> {
    let mut tx = pool.begin().await?;

    let login_token: Option<LoginToken> =
        sqlx::query_as("SELECT * FROM login_tokens WHERE token = $1 FOR UPDATE")
            .bind(token)
            .fetch_optional(&mut *tx)
            .await?;
    let user_id = check_login_token(login_token.as_ref(), Utc::now())?;

    sqlx::query("UPDATE login_tokens SET consumed_at = NOW() WHERE token = $1")
        .bind(token)
        .execute(&mut *tx)
        .await?;

    let session: Session = sqlx::query_as(
        "INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(Utc::now() + Duration::hours(config.session_ttl_hours))
    .fetch_one(&mut *tx)
    .await?;

    let user: User = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("Opened session for user {}", user.id);
    Ok((user, session))
}

/// Deletes login tokens that are expired or already used, and expired sessions.
pub async fn purge_expired(pool: &PgPool) -> Result<PurgeReport, sqlx::Error> {
    let login_tokens =
        sqlx::query("DELETE FROM login_tokens WHERE expires_at <= NOW() OR consumed_at IS NOT NULL")
            .execute(pool)
            .await?
            .rows_affected();
    let sessions = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
        .execute(pool)
        .await?
        .rows_affected();
    Ok(PurgeReport {
        login_tokens,
        sessions,
    })
}

/// Runs [`purge_expired`] every `every`, forever. Failures are logged and retried
/// on the next tick.
pub async fn purge_expired_periodically(pool: PgPool, every: std::time::Duration) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        match purge_expired(&pool).await {
            Ok(report) if report != PurgeReport::default() => info!(
                "Purged {} login tokens and {} sessions",
                report.login_tokens, report.sessions
            ),
            Ok(_) => {}
            Err(e) => warn!("Failed to purge expired auth rows: {e}"),
        }
    }
}
