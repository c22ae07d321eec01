use anyhow::Result;
use sqlx::PgPool;

use crate::models::JobRecord;

/// Inserts jobs not yet cached. Existing rows are left untouched.
/// Returns the number of newly cached jobs.
pub async fn cache_jobs(pool: &PgPool, jobs: &[JobRecord]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for job in jobs {
        let result = sqlx::query(
            r#"
            INSERT INTO jobs
                (job_id, title, company, location, description, posted_at, url, salary)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (job_id) DO NOTHING
            "#,
        )
        .bind(&job.job_id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(&job.description)
        .bind(job.posted_at)
        .bind(&job.url)
        .bind(job.salary)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}

pub async fn get_job(pool: &PgPool, job_id: &str) -> Result<Option<JobRecord>> {
    Ok(sqlx::query_as::<_, JobRecord>(
        r#"
        SELECT job_id, title, company, location, description, posted_at, url, salary
        FROM jobs
        WHERE job_id = $1
        "#,
    )
    .bind(job_id)
    .fetch_optional(pool)
    .await?)
}
