use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Session {
    pub token: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// The authenticated caller, resolved from the `session` cookie.
/// Rejects with `401` when the cookie is missing, malformed or expired.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session_token: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = session_token(&jar).ok_or_else(|| {
            tracing::debug!("session cookie missing or malformed");
            AppError::Unauthorized
        })?;

        let user = resolve_session(&state.db, token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser {
            user,
            session_token: token,
        })
    }
}

pub fn session_token(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse::<Uuid>().ok())
}

pub fn session_cookie(token: Uuid, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

pub async fn resolve_session(pool: &PgPool, token: Uuid) -> Result<Option<User>, AppError> {
    Ok(sqlx::query_as::<_, User>(
        r#"
        SELECT u.*
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = $1 AND s.expires_at > NOW()
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?)
}

pub async fn delete_session(pool: &PgPool, token: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderMap, HeaderValue};

    fn jar_with(cookie: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn test_session_token_parses_uuid_cookie() {
        let token = Uuid::new_v4();
        let jar = jar_with(&format!("theme=dark; session={token}"));
        assert_eq!(session_token(&jar), Some(token));
    }

    #[test]
    fn test_session_token_rejects_garbage() {
        assert_eq!(session_token(&jar_with("session=not-a-uuid")), None);
        assert_eq!(session_token(&CookieJar::new()), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(Uuid::nil(), true);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }
}
