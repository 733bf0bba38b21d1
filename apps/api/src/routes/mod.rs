pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::resume::handlers;
use crate::state::AppState;

/// Room for the largest accepted upload plus multipart framing, so oversized
/// files reach the upload validator instead of a bare 413.
pub(crate) const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/resumes", post(handlers::handle_create))
        .route("/api/resumes/parse", post(handlers::handle_parse))
        .route("/api/resumes/sample", get(handlers::handle_sample))
        .route("/api/resumes/:id", get(handlers::handle_get))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::db::memory_pool;
    use crate::llm_client::testing::client;
    use crate::llm_client::transport::testing::{anthropic_ok, status, ScriptedTransport};
    use crate::resume::extract::testing::PlainTextSource;
    use crate::resume::pipeline::ResumePipeline;

    const BOUNDARY: &str = "folio-test-boundary";
    const RESUME_TEXT: &str = "Jane Doe\nBackend Engineer\nEight years building payment systems in Rust and Go.";
    const MINIMAL_REPLY: &str = r#"{"basics":{"name":"A","title":"B","summary":"C"},"experience":[],"education":[],"skills":["X"]}"#;

    async fn app(transport: Arc<ScriptedTransport>) -> Router {
        let state = AppState {
            db: memory_pool().await,
            pipeline: ResumePipeline::new(Arc::new(PlainTextSource), client(transport)),
        };
        build_router(state)
    }

    fn multipart_request(uri: &str, file_name: &str, contents: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let transport = ScriptedTransport::always(anthropic_ok(MINIMAL_REPLY));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(transport).await, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_parse_success() {
        let transport = ScriptedTransport::always(anthropic_ok(MINIMAL_REPLY));
        let request = multipart_request("/api/resumes/parse", "resume.docx", RESUME_TEXT.as_bytes());
        let (status, body) = send(app(transport).await, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "parsed");
        assert_eq!(body["resume"]["basics"]["name"], "A");
        assert_eq!(body["resume"]["skills"], json!(["X"]));
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_parse_failure_is_classified() {
        let transport = ScriptedTransport::always(status(401, "invalid x-api-key"));
        let request = multipart_request("/api/resumes/parse", "resume.docx", RESUME_TEXT.as_bytes());
        let (status, body) = send(app(transport).await, request).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "AUTH_ERROR");
    }

    #[tokio::test]
    async fn test_parse_failure_with_fallback_serves_sample() {
        let transport = ScriptedTransport::always(status(401, "invalid x-api-key"));
        let request = multipart_request(
            "/api/resumes/parse?fallback=true",
            "resume.docx",
            RESUME_TEXT.as_bytes(),
        );
        let (status, body) = send(app(transport).await, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "fallback");
        assert_eq!(body["resume"]["basics"]["name"], "Alex Thompson");
        assert_eq!(body["error"]["code"], "AUTH_ERROR");
        assert_eq!(body["attempts"][0]["kind"], "AUTH_ERROR");
    }

    #[tokio::test]
    async fn test_parse_rejects_wrong_extension() {
        let transport = ScriptedTransport::always(anthropic_ok(MINIMAL_REPLY));
        let request = multipart_request("/api/resumes/parse", "resume.pdf", RESUME_TEXT.as_bytes());
        let (status, body) = send(app(transport.clone()).await, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_FORMAT");
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_parse_rejects_oversized_upload() {
        let transport = ScriptedTransport::always(anthropic_ok(MINIMAL_REPLY));
        let contents = vec![b'a'; 6 * 1024 * 1024];
        let request = multipart_request("/api/resumes/parse", "resume.docx", &contents);
        let (status, body) = send(app(transport).await, request).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "FILE_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_parse_body_over_request_limit_is_file_too_large() {
        let transport = ScriptedTransport::always(anthropic_ok(MINIMAL_REPLY));
        let contents = vec![b'a'; MAX_BODY_BYTES + 1024];
        let request = multipart_request("/api/resumes/parse", "resume.docx", &contents);
        let length = request.headers()[header::CONTENT_LENGTH].to_str().unwrap().to_string();
        let (status, body) = send(app(transport.clone()).await, request).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "FILE_TOO_LARGE");
        assert!(body["error"]["message"].as_str().unwrap().contains(&length));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_parse_requires_file_field() {
        let transport = ScriptedTransport::always(anthropic_ok(MINIMAL_REPLY));
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/resumes/parse")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let (status, body) = send(app(transport).await, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_sample() {
        let transport = ScriptedTransport::always(anthropic_ok(MINIMAL_REPLY));
        let request = Request::builder()
            .uri("/api/resumes/sample")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(transport).await, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["experience"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let transport = ScriptedTransport::always(anthropic_ok(MINIMAL_REPLY));
        let router = app(transport).await;
        let data = json!({"basics": {"name": "A"}, "custom": true});

        let (status, created) = send(
            router.clone(),
            json_request("POST", "/api/resumes", json!({ "data": data })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let request = Request::builder()
            .uri(format!("/api/resumes/{id}"))
            .body(Body::empty())
            .unwrap();
        let (status, fetched) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["id"], id.as_str());
        assert_eq!(fetched["data"], data);
        assert!(fetched["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_create_without_data() {
        let transport = ScriptedTransport::always(anthropic_ok(MINIMAL_REPLY));
        let router = app(transport).await;
        for payload in [json!({}), json!({"data": null})] {
            let (status, body) =
                send(router.clone(), json_request("POST", "/api/resumes", payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["message"], "No resume data provided");
        }
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let transport = ScriptedTransport::always(anthropic_ok(MINIMAL_REPLY));
        let request = Request::builder()
            .uri("/api/resumes/0d9f7c1e-0000-0000-0000-000000000000")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(transport).await, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Resume not found");
    }
}
