//! HTTP router: public key management and validation routes plus the
//! key-protected summarizer routes.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{api_keys, health, summarize, validate},
    middleware,
    state::AppState,
};

pub fn router(state: AppState) -> Router {
    // Routes that require a valid API key
    let protected_routes = Router::new()
        .route(
            "/api/github-summarizer",
            post(summarize::summarize).get(summarize::summarize_query),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_api_key,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        // Key management
        .route("/api/keys", get(api_keys::list_keys).post(api_keys::create_key))
        .route(
            "/api/keys/{id}",
            patch(api_keys::rename_key).delete(api_keys::delete_key),
        )
        // Key validation
        .route(
            "/api/validate-key",
            post(validate::validate_key).get(validate::validate_key_query),
        )
        .route("/api/summarizer/status", get(summarize::status))
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::github::{GithubRepo, RepoSummary};
    use crate::services::summarizer::Summarizer;
    use crate::store::InMemoryKeyStore;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct StubSummarizer;

    #[async_trait]
    impl Summarizer for StubSummarizer {
        async fn summarize(&self, repo: &GithubRepo) -> Result<RepoSummary, AppError> {
            Ok(RepoSummary {
                summary: Some(format!("{} by {}", repo.repo, repo.owner)),
                readme_preview: "# widgets".to_string(),
            })
        }
    }

    struct DownSummarizer;

    #[async_trait]
    impl Summarizer for DownSummarizer {
        async fn summarize(&self, _: &GithubRepo) -> Result<RepoSummary, AppError> {
            Err(AppError::SummarizerUnavailable("README.md not found".to_string()))
        }
    }

    fn app() -> Router {
        router(AppState::new(
            Arc::new(InMemoryKeyStore::new()),
            Arc::new(StubSummarizer),
        ))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn create(app: &Router, name: &str, limit: Option<i64>) -> Value {
        let (status, body) = send(
            app,
            json_request("POST", "/api/keys", json!({ "name": name, "monthly_limit": limit })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    const REPO_URL: &str = "https://github.com/octo/widgets";

    #[tokio::test]
    async fn health_reports_connected_store() {
        let (status, body) = send(&app(), empty_request("GET", "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["store"], "connected");
    }

    #[tokio::test]
    async fn key_lifecycle_over_http() {
        let app = app();

        let created = create(&app, "prod", Some(100)).await;
        let id = created["id"].as_str().unwrap().to_string();
        let secret = created["key"].as_str().unwrap().to_string();
        assert_eq!(created["masked"], false);
        assert!(secret.starts_with("key_"));

        let (status, body) = send(
            &app,
            json_request("POST", "/api/validate-key", json!({ "key": secret })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "prod");
        assert_eq!(body["data"]["current_usage"], 0);
        assert_eq!(body["data"]["monthly_limit"], 100);

        let (status, body) = send(
            &app,
            json_request("PATCH", &format!("/api/keys/{id}"), json!({ "name": "production" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "production");
        assert_eq!(body["masked"], true);

        let (status, body) = send(
            &app,
            empty_request("GET", &format!("/api/validate-key?key={secret}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "production");
        assert_eq!(body["data"]["key"], secret.as_str());
        assert_eq!(body["data"]["monthly_limit"], 100);

        let (status, _) = send(&app, empty_request("DELETE", &format!("/api/keys/{id}"))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(
            &app,
            json_request("POST", "/api/validate-key", json!({ "key": secret })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "key_not_found");

        let (status, body) = send(&app, empty_request("DELETE", &format!("/api/keys/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "api_key_not_found");
    }

    #[tokio::test]
    async fn duplicate_names_conflict() {
        let app = app();
        create(&app, "Foo", None).await;

        let (status, body) = send(
            &app,
            json_request("POST", "/api/keys", json!({ "name": "foo" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "duplicate_name");
    }

    #[tokio::test]
    async fn rename_onto_existing_name_conflicts() {
        let app = app();
        let a = create(&app, "alpha", None).await;
        create(&app, "beta", None).await;

        let uri = format!("/api/keys/{}", a["id"].as_str().unwrap());
        let (status, _) = send(&app, json_request("PATCH", &uri, json!({ "name": "BETA" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(&app, json_request("PATCH", &uri, json!({ "name": "alpha" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "alpha");
    }

    #[tokio::test]
    async fn rename_of_unknown_id_is_not_found() {
        let uri = format!("/api/keys/{}", uuid::Uuid::new_v4());
        let (status, _) = send(&app(), json_request("PATCH", &uri, json!({ "name": "x" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_uuid_ids_get_the_error_envelope() {
        let app = app();

        let (status, body) = send(&app, empty_request("DELETE", "/api/keys/not-a-uuid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "invalid_request");

        let (status, body) = send(
            &app,
            json_request("PATCH", "/api/keys/not-a-uuid", json!({ "name": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn unparsable_query_strings_get_the_error_envelope() {
        let app = app();
        let created = create(&app, "prod", None).await;
        let secret = created["key"].as_str().unwrap();

        let uri = format!(
            "/api/github-summarizer?key={secret}&githubUrl={REPO_URL}&githubUrl={REPO_URL}"
        );
        let (status, body) = send(&app, empty_request("GET", &uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");

        let (status, body) = send(&app, empty_request("GET", "/api/validate-key?key=a&key=b")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "malformed_key");
    }

    #[tokio::test]
    async fn malformed_create_requests_are_rejected() {
        let app = app();

        for body in [
            json!({ "name": "   " }),
            json!({ "name": "prod", "monthly_limit": -5 }),
            json!({ "name": "prod", "key": "key_chosen_by_caller" }),
            json!({ "monthly_limit": 10 }),
        ] {
            let (status, response) = send(&app, json_request("POST", "/api/keys", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{response}");
            assert_eq!(response["error"]["code"], "invalid_request");
        }

        let (_, listed) = send(&app, empty_request("GET", "/api/keys")).await;
        assert_eq!(listed.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn list_masks_unless_revealed() {
        let app = app();
        let first = create(&app, "first", None).await;
        let second = create(&app, "second", Some(10)).await;
        let second_secret = second["key"].as_str().unwrap();

        let (status, listed) = send(&app, empty_request("GET", "/api/keys")).await;
        assert_eq!(status, StatusCode::OK);
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["name"], "second");
        assert_eq!(listed[1]["name"], "first");

        let masked = listed[0]["key"].as_str().unwrap();
        assert!(masked.ends_with("*****"));
        assert_eq!(masked.len(), second_secret.len());
        assert_eq!(masked[..masked.len() - 5], second_secret[..second_secret.len() - 5]);

        let uri = format!("/api/keys?reveal={}", second["id"].as_str().unwrap());
        let (_, listed) = send(&app, empty_request("GET", &uri)).await;
        assert_eq!(listed[0]["key"], second_secret);
        assert_eq!(listed[0]["masked"], false);
        assert_ne!(listed[1]["key"], first["key"]);
        assert_eq!(listed[1]["masked"], true);

        let (status, _) = send(&app, empty_request("GET", "/api/keys?reveal=nope")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn validate_requires_a_key() {
        let app = app();

        let (status, body) = send(
            &app,
            json_request("POST", "/api/validate-key", json!({ "key": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "malformed_key");

        let (status, _) = send(&app, json_request("POST", "/api/validate-key", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, empty_request("POST", "/api/validate-key")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, empty_request("GET", "/api/validate-key")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            empty_request("GET", "/api/validate-key?key=nonexistent-token"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn summarizer_requires_a_key() {
        let app = app();

        let (status, body) = send(
            &app,
            json_request("POST", "/api/github-summarizer", json!({ "githubUrl": REPO_URL })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "missing_api_key");

        let request = Request::builder()
            .method("POST")
            .uri("/api/github-summarizer")
            .header("content-type", "application/json")
            .header("x-api-key", "   ")
            .body(Body::from(json!({ "githubUrl": REPO_URL }).to_string()))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            empty_request("GET", "/api/github-summarizer?githubUrl=x"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn summarizer_rejects_unknown_key_before_checking_url() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/github-summarizer")
            .header("content-type", "application/json")
            .header("x-api-key", "key_unknown")
            .body(Body::from(json!({ "githubUrl": "not a url" }).to_string()))
            .unwrap();

        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "key_not_found");
    }

    #[tokio::test]
    async fn summarizer_validates_github_url() {
        let app = app();
        let created = create(&app, "prod", None).await;
        let secret = created["key"].as_str().unwrap();

        for body in [
            json!({ "githubUrl": "https://gitlab.com/octo/widgets" }),
            json!({ "githubUrl": "https://github.com/octo" }),
            json!({}),
        ] {
            let request = Request::builder()
                .method("POST")
                .uri("/api/github-summarizer")
                .header("content-type", "application/json")
                .header("x-api-key", secret)
                .body(Body::from(body.to_string()))
                .unwrap();
            let (status, response) = send(&app, request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{response}");
        }
    }

    #[tokio::test]
    async fn summarizer_accepts_key_from_header_body_bearer_and_query() {
        let app = app();
        let created = create(&app, "prod", Some(500)).await;
        let secret = created["key"].as_str().unwrap().to_string();

        let via_header = Request::builder()
            .method("POST")
            .uri("/api/github-summarizer")
            .header("content-type", "application/json")
            .header("x-api-key", &secret)
            .body(Body::from(json!({ "githubUrl": REPO_URL }).to_string()))
            .unwrap();
        let via_bearer = Request::builder()
            .method("POST")
            .uri("/api/github-summarizer")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {secret}"))
            .body(Body::from(json!({ "githubUrl": REPO_URL }).to_string()))
            .unwrap();
        let via_body = json_request(
            "POST",
            "/api/github-summarizer",
            json!({ "githubUrl": REPO_URL, "key": secret }),
        );
        let via_query = empty_request(
            "GET",
            &format!(
                "/api/github-summarizer?key={secret}&githubUrl=https%3A%2F%2Fgithub.com%2Focto%2Fwidgets"
            ),
        );

        for request in [via_header, via_bearer, via_body, via_query] {
            let (status, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::OK, "{body}");
            assert_eq!(body["success"], true);
            assert_eq!(body["data"]["githubUrl"], REPO_URL);
            assert_eq!(body["data"]["summary"], "widgets by octo");
            assert_eq!(body["data"]["readmePreview"], "# widgets");
            assert_eq!(body["data"]["apiKeyInfo"]["name"], "prod");
            assert_eq!(body["data"]["apiKeyInfo"]["monthly_limit"], 500);
            assert_eq!(body["data"]["apiKeyInfo"]["current_usage"], 0);
        }
    }

    #[tokio::test]
    async fn summarizer_failure_leaves_keys_untouched() {
        let app = router(AppState::new(
            Arc::new(InMemoryKeyStore::new()),
            Arc::new(DownSummarizer),
        ));
        let created = create(&app, "prod", Some(5)).await;
        let secret = created["key"].as_str().unwrap();

        let request = Request::builder()
            .method("POST")
            .uri("/api/github-summarizer")
            .header("content-type", "application/json")
            .header("x-api-key", secret)
            .body(Body::from(json!({ "githubUrl": REPO_URL }).to_string()))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "summarizer_unavailable");

        let (status, body) = send(
            &app,
            json_request("POST", "/api/validate-key", json!({ "key": secret })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["monthly_limit"], 5);
        assert_eq!(body["data"]["current_usage"], 0);
    }

    #[tokio::test]
    async fn status_reveals_only_a_credential_prefix() {
        let credential = "sk-proj-AbCdEfGhIjKlMnOpQrStUvWxYz0123456789abcdefghij";
        let state = AppState::new(Arc::new(InMemoryKeyStore::new()), Arc::new(StubSummarizer))
            .with_llm_credential(Some(credential));

        let (status, body) = send(&router(state), empty_request("GET", "/api/summarizer/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["llm_configured"], true);
        assert_eq!(body["llm_key_length"], credential.len());
        assert_eq!(body["llm_key_preview"], "sk-p*****");
        assert!(!body.to_string().contains(&credential[4..12]));

        let (_, body) = send(&app(), empty_request("GET", "/api/summarizer/status")).await;
        assert_eq!(body["llm_configured"], false);
        assert_eq!(body["llm_key_preview"], Value::Null);
    }
}
