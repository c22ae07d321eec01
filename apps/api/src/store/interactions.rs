use std::collections::HashSet;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgConnection, PgPool};

use crate::models::interaction::InteractionRow;
use crate::models::{Action, Feedback, KeywordEntry};
use crate::store::keywords::write_keywords;

async fn insert_interaction(
    conn: &mut PgConnection,
    user_id: i64,
    job_id: &str,
    action: Action,
) -> Result<()> {
    sqlx::query("INSERT INTO interactions (user_id, job_id, action) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(job_id)
        .bind(action.as_str())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Logs a `shown` row for every job in one transaction.
pub async fn log_shown(pool: &PgPool, user_id: i64, job_ids: &[String]) -> Result<()> {
    let mut tx = pool.begin().await?;
    for job_id in job_ids {
        insert_interaction(&mut *tx, user_id, job_id, Action::Shown).await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Logs a like/dislike together with the keyword set it produced.
/// Neither is written unless both are.
pub async fn commit_feedback(
    pool: &PgPool,
    user_id: i64,
    job_id: &str,
    feedback: Feedback,
    keywords: &[KeywordEntry],
) -> Result<()> {
    let mut tx = pool.begin().await?;
    insert_interaction(&mut *tx, user_id, job_id, Action::from(feedback)).await?;
    write_keywords(&mut *tx, user_id, keywords).await?;
    tx.commit().await?;
    Ok(())
}

/// Start of the recency window ending at `now`.
pub fn window_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days.max(0))
}

/// Job ids with any interaction (shown, liked or disliked) inside the window.
pub async fn recently_seen(pool: &PgPool, user_id: i64, days: i64) -> Result<HashSet<String>> {
    let ids: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT job_id FROM interactions WHERE user_id = $1 AND created_at >= $2",
    )
    .bind(user_id)
    .bind(window_start(Utc::now(), days))
    .fetch_all(pool)
    .await?;
    Ok(ids.into_iter().collect())
}

pub async fn history(pool: &PgPool, user_id: i64, limit: i64) -> Result<Vec<InteractionRow>> {
    Ok(sqlx::query_as::<_, InteractionRow>(
        r#"
        SELECT id, user_id, job_id, action, created_at
        FROM interactions
        WHERE user_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?)
}

pub async fn clear_interactions(pool: &PgPool, user_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM interactions WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
