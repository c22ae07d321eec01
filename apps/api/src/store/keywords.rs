use anyhow::Result;
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use crate::models::keyword::KeywordRow;
use crate::models::KeywordEntry;

pub async fn get_keywords(pool: &PgPool, user_id: i64) -> Result<Vec<KeywordEntry>> {
    let rows = sqlx::query_as::<_, KeywordRow>(
        r#"
        SELECT keyword, weight, polarity, origin, is_hard, rationale
        FROM user_keywords
        WHERE user_id = $1
        ORDER BY weight DESC, keyword
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(KeywordEntry::from).collect())
}

/// Replaces the user's whole keyword set atomically.
pub async fn replace_keywords(
    pool: &PgPool,
    user_id: i64,
    keywords: &[KeywordEntry],
) -> Result<()> {
    let mut tx = pool.begin().await?;
    write_keywords(&mut *tx, user_id, keywords).await?;
    tx.commit().await?;
    debug!("Saved {} keywords for user {user_id}", keywords.len());
    Ok(())
}

/// Replaces the keyword set inside the caller's transaction.
pub async fn write_keywords(
    conn: &mut PgConnection,
    user_id: i64,
    keywords: &[KeywordEntry],
) -> Result<()> {
    sqlx::query("DELETE FROM user_keywords WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    for entry in keywords {
        sqlx::query(
            r#"
            INSERT INTO user_keywords
                (user_id, keyword, weight, polarity, origin, is_hard, rationale)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user_id)
        .bind(&entry.text)
        .bind(entry.weight)
        .bind(entry.polarity.as_str())
        .bind(entry.origin.as_str())
        .bind(entry.hard)
        .bind(entry.rationale.as_deref())
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
