use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::with_unique_retry;
use crate::errors::AppError;
use crate::models::profile::Profile;
use crate::profile::slug::{published_link, random_suffix};
use crate::profile::validation::UpdateProfile;

const PUBLISH_ATTEMPTS: usize = 3;

pub async fn get_profile_by_user_id(pool: &PgPool, user_id: Uuid) -> Result<Option<Profile>, AppError> {
    Ok(sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?)
}

/// Looks up a profile by its public link. Unpublished profiles never match.
pub async fn get_profile_by_published_link(
    pool: &PgPool,
    link: &str,
) -> Result<Option<Profile>, AppError> {
    Ok(sqlx::query_as::<_, Profile>(
        "SELECT * FROM profiles WHERE published_link = $1 AND is_published",
    )
    .bind(link)
    .fetch_optional(pool)
    .await?)
}

pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    update: &UpdateProfile,
) -> Result<Profile, AppError> {
    let profile: Option<Profile> = sqlx::query_as(
        r#"
        UPDATE profiles
        SET name = $2,
            role = $3,
            years_of_experience = $4,
            location = $5,
            interview_rate = $6,
            interview_rate_currency = $7,
            updated_at = NOW()
        WHERE user_id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&update.name)
    .bind(&update.role)
    .bind(update.years_of_experience)
    .bind(&update.location)
    .bind(update.interview_rate)
    .bind(update.interview_rate_currency.as_str())
    .fetch_optional(pool)
    .await?;

    let profile =
        profile.ok_or_else(|| AppError::NotFound(format!("Profile not found for user {user_id}")))?;
    info!("Updated profile for user {user_id}");
    Ok(profile)
}

/// Publishes the profile under a fresh `{name-slug}-{suffix}` link.
/// Republishing replaces the previous link.
pub async fn publish_profile(pool: &PgPool, user_id: Uuid) -> Result<Profile, AppError> {
    let profile = get_profile_by_user_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile not found for user {user_id}")))?;

    let published = with_unique_retry(PUBLISH_ATTEMPTS, |attempt| {
        let link = published_link(&profile.name, &random_suffix());
        if attempt > 1 {
            warn!("Retrying publish for user {user_id} with link {link}");
        }
        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET is_published = TRUE,
                published_at = NOW(),
                published_link = $2,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(link)
        .fetch_one(pool)
    })
    .await?;

    let published = published.ok_or_else(|| {
        AppError::Conflict("Could not allocate a unique published link, please retry".to_string())
    })?;
    info!(
        "Published profile for user {user_id} at @{}",
        published.published_link.as_deref().unwrap_or_default()
    );
    Ok(published)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::service::find_or_create_user;
    use crate::db::test_pool;
    use crate::models::profile::Currency;
    use crate::models::user::UserRole;
    use crate::profile::slug::SUFFIX_LEN;

    // These tests need a Postgres instance at DATABASE_URL.

    async fn candidate_named(pool: &PgPool, name: &str) -> Uuid {
        let email = format!("{}@example.com", Uuid::new_v4());
        let user = find_or_create_user(pool, &email, UserRole::Candidate)
            .await
            .unwrap();
        let update = UpdateProfile {
            name: name.to_string(),
            role: "Engineer".to_string(),
            years_of_experience: 5,
            location: "Berlin".to_string(),
            interview_rate: 80,
            interview_rate_currency: Currency::Eur,
        };
        update_profile(pool, user.id, &update).await.unwrap();
        user.id
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_publish_assigns_slugged_link() {
        let pool = test_pool().await;
        let user_id = candidate_named(&pool, "Grace Hopper").await;

        let published = publish_profile(&pool, user_id).await.unwrap();
        assert!(published.is_published);
        assert!(published.published_at.is_some());
        let link = published.published_link.unwrap();
        assert!(link.starts_with("grace-hopper-"));
        assert_eq!(link.len(), "grace-hopper-".len() + SUFFIX_LEN);

        let found = get_profile_by_published_link(&pool, &link).await.unwrap();
        assert_eq!(found.map(|p| p.user_id), Some(user_id));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_republish_replaces_link() {
        let pool = test_pool().await;
        let user_id = candidate_named(&pool, "Grace Hopper").await;

        let first = publish_profile(&pool, user_id).await.unwrap().published_link.unwrap();
        let second = publish_profile(&pool, user_id).await.unwrap().published_link.unwrap();
        assert_ne!(first, second);
        assert!(get_profile_by_published_link(&pool, &first).await.unwrap().is_none());
        assert!(get_profile_by_published_link(&pool, &second).await.unwrap().is_some());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_unpublished_profile_is_not_public() {
        let pool = test_pool().await;
        let user_id = candidate_named(&pool, "Ada Lovelace").await;
        let profile = get_profile_by_user_id(&pool, user_id).await.unwrap().unwrap();
        assert!(!profile.is_published);
        assert!(profile.published_link.is_none());
    }
}
