use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use crate::models::profile::UserRow;
use crate::models::{UserProfile, UserSettings};
use crate::store::keywords::get_keywords;

const USER_COLUMNS: &str =
    "user_id, username, min_salary, notification_time, notifications_enabled";

/// Creates the user, or refreshes the username of an existing one.
pub async fn register_user(
    pool: &PgPool,
    user_id: i64,
    username: Option<&str>,
) -> Result<UserRow> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        INSERT INTO users (user_id, username)
        VALUES ($1, $2)
        ON CONFLICT (user_id)
            DO UPDATE SET username = COALESCE(EXCLUDED.username, users.username)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(username)
    .fetch_one(pool)
    .await?;

    info!("Registered user {user_id}");
    Ok(row)
}

pub async fn get_user(pool: &PgPool, user_id: i64) -> Result<Option<UserRow>> {
    Ok(sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?)
}

/// User row plus all keyword entries. `None` for unknown users.
pub async fn load_profile(pool: &PgPool, user_id: i64) -> Result<Option<UserProfile>> {
    let Some(user) = get_user(pool, user_id).await? else {
        return Ok(None);
    };
    let keywords = get_keywords(pool, user_id).await?;
    Ok(Some(user.into_profile(keywords)))
}

/// Returns false when the user does not exist.
pub async fn update_settings(
    pool: &PgPool,
    user_id: i64,
    settings: &UserSettings,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET min_salary = $2, notification_time = $3, notifications_enabled = $4
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(settings.min_salary)
    .bind(settings.notification_time)
    .bind(settings.notifications_enabled)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
