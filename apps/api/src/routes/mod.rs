pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers::handle_analyze_job;
use crate::matching::handlers::handle_match_jobs;
use crate::profile::handlers::handle_parse_profile;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route("/api/v1/jobs/match", post(handle_match_jobs))
        .route("/api/v1/jobs/analyze", post(handle_analyze_job))
        // Profile API
        .route("/api/v1/profile/parse", post(handle_parse_profile))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;

    const BOUNDARY: &str = "jobscout-test-boundary";

    fn app() -> Router {
        build_router(AppState::new(Config::default()).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_multipart(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "jobscout");
    }

    #[tokio::test]
    async fn test_match_requires_skills() {
        let response = app()
            .oneshot(post_json(
                "/api/v1/jobs/match",
                json!({"profile": {"headline": "Backend Engineer", "skills": ["  "]}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_enhanced_strategy_without_key_is_rejected_before_fetching() {
        let response = app()
            .oneshot(post_json(
                "/api/v1/jobs/match",
                json!({
                    "profile": {"skills": ["rust"]},
                    "apiKeys": {"OPENAI_API_KEY": ""},
                    "strategy": "enhanced"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "MISSING_CREDENTIAL");
        assert_eq!(
            body["error"]["message"],
            "OPENAI_API_KEY is required for this operation"
        );
    }

    #[tokio::test]
    async fn test_unknown_strategy_is_rejected() {
        let response = app()
            .oneshot(post_json(
                "/api/v1/jobs/match",
                json!({"profile": {"skills": ["rust"]}, "strategy": "fancy"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_analyze_without_any_llm_key() {
        let response = app()
            .oneshot(post_json(
                "/api/v1/jobs/analyze",
                json!({
                    "job": {"title": "Backend Engineer", "company": "Acme"},
                    "profile": {"skills": ["rust"]}
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "MISSING_CREDENTIAL");
    }

    #[tokio::test]
    async fn test_profile_parse_requires_file() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"apiKey\"\r\n\r\nsk-test\r\n--{BOUNDARY}--\r\n"
        );
        let response = app()
            .oneshot(post_multipart("/api/v1/profile/parse", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_profile_parse_requires_openrouter_key() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cv.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n%PDF-1.4 not really\r\n--{BOUNDARY}--\r\n"
        );
        let response = app()
            .oneshot(post_multipart("/api/v1/profile/parse", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "MISSING_CREDENTIAL");
    }
}
