pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::feed::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Users and profile editing
        .route("/api/v1/users", post(handlers::handle_register))
        .route(
            "/api/v1/users/:id/keywords",
            get(handlers::handle_get_keywords).post(handlers::handle_add_keyword),
        )
        .route(
            "/api/v1/users/:id/keywords/:keyword",
            delete(handlers::handle_remove_keyword),
        )
        .route(
            "/api/v1/users/:id/settings",
            patch(handlers::handle_update_settings),
        )
        .route("/api/v1/users/:id/reset", post(handlers::handle_reset))
        .route(
            "/api/v1/users/:id/interactions",
            get(handlers::handle_history),
        )
        // Feed
        .route(
            "/api/v1/users/:id/recommendations",
            post(handlers::handle_recommend),
        )
        .route("/api/v1/users/:id/search", post(handlers::handle_search))
        .route("/api/v1/users/:id/feedback", post(handlers::handle_feedback))
        .route("/api/v1/rank", post(handlers::handle_rank))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{Config, LearningConfig};
    use crate::feed::locks::UserLocks;
    use crate::job_source::{JobQuery, JobSource, JobSourceError};
    use crate::matching::scorer::KeywordScorer;
    use crate::models::JobRecord;
    use crate::suggestions::DisabledSuggester;

    struct NoJobs;

    #[async_trait::async_trait]
    impl JobSource for NoJobs {
        async fn search(&self, _query: &JobQuery) -> Result<Vec<JobRecord>, JobSourceError> {
            Ok(vec![])
        }
    }

    fn test_state() -> AppState {
        let learning = LearningConfig::default();
        let config = Config {
            database_url: "postgres://localhost/jobfeed_test".to_string(),
            redis_url: "redis://127.0.0.1/".to_string(),
            adzuna_app_id: String::new(),
            adzuna_app_key: String::new(),
            anthropic_api_key: None,
            job_country: "sg".to_string(),
            job_location: "Singapore".to_string(),
            port: 0,
            rust_log: "info".to_string(),
            learning: learning.clone(),
        };
        AppState {
            db: PgPoolOptions::new()
                .connect_lazy(&config.database_url)
                .unwrap(),
            config,
            job_source: Arc::new(NoJobs),
            suggester: Arc::new(DisabledSuggester),
            scorer: Arc::new(KeywordScorer::new(&learning)),
            user_locks: Arc::new(UserLocks::default()),
        }
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["service"], "jobfeed");
    }

    #[tokio::test]
    async fn test_rank_orders_and_filters() {
        let app = build_router(test_state());
        let (status, body) = post_json(
            app,
            "/api/v1/rank",
            json!({
                "keywords": [
                    {"text": "rust", "weight": 2.0, "polarity": "positive", "origin": "manual"},
                    {"text": "sales", "weight": -1.0, "polarity": "negative", "origin": "auto", "hard": true}
                ],
                "jobs": [
                    {"job_id": "a", "title": "Rust Engineer"},
                    {"job_id": "b", "title": "Sales Executive", "description": "rust belt territory"},
                    {"job_id": "c", "title": "Backend Developer", "description": "We use rust."},
                    {"job_id": "d", "title": "Rust Intern"}
                ],
                "recently_shown": ["d"],
                "limit": 5
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body["jobs"]
            .as_array()
            .unwrap()
            .iter()
            .map(|j| j["job"]["job_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(body["diagnostics"]["excluded_recent"], 1);
        assert_eq!(body["diagnostics"]["hard_rejected"], 1);
        assert!(body["empty_reason"].is_null());
    }

    #[tokio::test]
    async fn test_rank_matches_mixed_case_keywords() {
        let app = build_router(test_state());
        let (status, body) = post_json(
            app,
            "/api/v1/rank",
            json!({
                "keywords": [
                    {"text": "Python", "weight": 2.0, "polarity": "positive", "origin": "auto"},
                    {"text": "Unpaid", "weight": -1.0, "polarity": "negative", "origin": "manual", "hard": true}
                ],
                "jobs": [
                    {"job_id": "a", "title": "Python Developer", "description": "unpaid role"},
                    {"job_id": "b", "title": "Python Developer", "description": "paid role"}
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let jobs = body["jobs"].as_array().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0]["job"]["job_id"], "b");
        assert_eq!(jobs[0]["score"], 2.5);
        assert_eq!(body["diagnostics"]["hard_rejected"], 1);
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let app = build_router(test_state());
        let (status, body) =
            post_json(app, "/api/v1/users/7/search", json!({"query": "   "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_rank_empty_batch_reports_reason() {
        let app = build_router(test_state());
        let (status, body) = post_json(app, "/api/v1/rank", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["empty_reason"], "no_candidates");
        assert_eq!(body["jobs"], json!([]));
    }
}
