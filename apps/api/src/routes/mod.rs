pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::proposal::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/providers", get(handlers::handle_catalog))
        .route(
            "/api/v1/announcements/extract",
            post(handlers::handle_extract),
        )
        .route("/api/v1/proposals", post(handlers::handle_generate_proposal))
        .route("/api/v1/proposals/export", post(handlers::handle_export))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::Config;
    use crate::extraction::tests::pdf_with_pages;

    const BOUNDARY: &str = "proposal-test-boundary";

    fn test_router(server: &MockServer) -> Router {
        router_with_upload_limit(server, Config::default().max_upload_bytes)
    }

    fn router_with_upload_limit(server: &MockServer, max_upload_bytes: usize) -> Router {
        let config = Config {
            anthropic_api_url: format!("{}/v1/messages", server.uri()),
            groq_api_url: format!("{}/openai/v1/chat/completions", server.uri()),
            max_upload_bytes,
            ..Config::default()
        };
        build_router(AppState {
            http: reqwest::Client::new(),
            config,
        })
    }

    /// Hand-built multipart body: text fields plus an optional PDF part.
    fn multipart_body(fields: &[(&str, &str)], pdf: Option<&[u8]>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(pdf) = pdf {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"announcement\"; filename=\"notice.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(pdf);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
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

    fn profile_fields() -> Vec<(&'static str, &'static str)> {
        vec![
            ("company_name", "테크스타"),
            ("business_number", "123-45-67890"),
            ("ceo_name", "김대표"),
            ("establishment_date", "2019-03-14"),
            ("employee_count", "12"),
            ("annual_revenue", "850"),
            ("main_business", "AI 품질 검사"),
            ("company_address", "서울"),
        ]
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = MockServer::start().await;
        let response = test_router(&server)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_catalog_lists_both_providers() {
        let server = MockServer::start().await;
        let response = test_router(&server)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/providers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["providers"][0]["id"], "claude");
        assert_eq!(body["providers"][0]["models"][1]["id"], "claude-3.5-sonnet");
        assert_eq!(body["providers"][1]["id"], "groq");
        assert_eq!(body["max_tokens"]["min"], 1000);
        assert_eq!(body["analysis"]["max_tokens"], 2000);
        assert_eq!(body["proposal_sections"].as_array().unwrap().len(), 8);
        assert_eq!(body["analysis"]["categories"][0], "지원자격 요건");
    }

    #[tokio::test]
    async fn test_missing_credential_halts_before_any_provider_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut fields = profile_fields();
        fields.push(("provider", "claude"));
        let pdf = pdf_with_pages(&["Grant call"]);
        let response = test_router(&server)
            .oneshot(multipart_request(
                "/api/v1/proposals",
                multipart_body(&fields, Some(pdf.as_slice())),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"]["code"], "CREDENTIAL_ERROR");
        server.verify().await;
    }

    #[tokio::test]
    async fn test_out_of_range_temperature_halts_without_dispatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut fields = profile_fields();
        fields.extend([("provider", "groq"), ("api_key", "gsk"), ("temperature", "1.5")]);
        let pdf = pdf_with_pages(&["Grant call"]);
        let response = test_router(&server)
            .oneshot(multipart_request(
                "/api/v1/proposals",
                multipart_body(&fields, Some(pdf.as_slice())),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
        server.verify().await;
    }

    #[tokio::test]
    async fn test_malformed_pdf_is_422() {
        let server = MockServer::start().await;
        let mut fields = profile_fields();
        fields.push(("api_key", "sk-ant"));
        let response = test_router(&server)
            .oneshot(multipart_request(
                "/api/v1/proposals",
                multipart_body(&fields, Some(b"garbage bytes".as_slice())),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_oversized_proposal_upload_is_413() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut fields = profile_fields();
        fields.push(("api_key", "sk-ant"));
        let oversized = vec![b'x'; 8 * 1024];
        let response = router_with_upload_limit(&server, 1024)
            .oneshot(multipart_request(
                "/api/v1/proposals",
                multipart_body(&fields, Some(oversized.as_slice())),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(response).await["error"]["code"], "PAYLOAD_TOO_LARGE");
        server.verify().await;
    }

    #[tokio::test]
    async fn test_oversized_extract_upload_is_413() {
        let server = MockServer::start().await;
        let oversized = vec![b'x'; 8 * 1024];
        let response = router_with_upload_limit(&server, 1024)
            .oneshot(multipart_request(
                "/api/v1/announcements/extract",
                multipart_body(&[], Some(oversized.as_slice())),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_generates_proposal_and_analysis_through_claude() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "# 테크스타 사업계획서"}]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let mut fields = profile_fields();
        fields.extend([
            ("provider", "claude"),
            ("model", "claude-3.5-sonnet"),
            ("api_key", "sk-ant"),
            ("max_tokens", "3000"),
        ]);
        let pdf = pdf_with_pages(&["Grant call 2024"]);
        let response = test_router(&server)
            .oneshot(multipart_request(
                "/api/v1/proposals",
                multipart_body(&fields, Some(pdf.as_slice())),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["proposal"], "# 테크스타 사업계획서");
        assert_eq!(body["analysis"]["status"], "ok");
        assert_eq!(body["config"]["model"], "claude-3.5-sonnet");
        assert_eq!(body["config"]["max_tokens"], 3000);
        assert_eq!(body["artifacts"][0]["file_name"], "테크스타_사업계획서.txt");
        assert_eq!(body["artifacts"][1]["file_name"], "테크스타_사업계획서.md");
        assert_eq!(body["artifacts"][0]["content"], body["artifacts"][1]["content"]);

        let requests = server.received_requests().await.unwrap();
        let sent: Vec<Value> = requests
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect();
        assert!(sent.iter().any(|b| b["max_tokens"] == 3000));
        assert!(sent.iter().any(|b| b["max_tokens"] == 2000));
        let proposal_prompt = sent
            .iter()
            .find(|b| b["max_tokens"] == 3000)
            .and_then(|b| b["messages"][0]["content"].as_str())
            .unwrap();
        assert!(proposal_prompt.contains("Grant call 2024"));
        assert!(proposal_prompt.contains("테크스타"));
    }

    #[tokio::test]
    async fn test_model_not_found_surfaces_hint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {
                    "message": "The model `qwan-2.5-coder-32b` does not exist",
                    "type": "invalid_request_error",
                    "code": "model_not_found"
                }
            })))
            .mount(&server)
            .await;

        let mut fields = profile_fields();
        fields.extend([
            ("provider", "groq"),
            ("model", "qwan-2.5-coder-32b"),
            ("api_key", "gsk"),
        ]);
        let pdf = pdf_with_pages(&["Grant call"]);
        let response = test_router(&server)
            .oneshot(multipart_request(
                "/api/v1/proposals",
                multipart_body(&fields, Some(pdf.as_slice())),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "PROVIDER_MODEL_UNAVAILABLE");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("does not exist"));
        assert!(body["error"]["hint"].is_string());
    }

    #[tokio::test]
    async fn test_extract_endpoint_previews_text() {
        let server = MockServer::start().await;
        let pdf = pdf_with_pages(&["First page", "Second page"]);
        let response = test_router(&server)
            .oneshot(multipart_request(
                "/api/v1/announcements/extract",
                multipart_body(&[], Some(pdf.as_slice())),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["pages"], 2);
        assert!(body["text"].as_str().unwrap().contains("Second"));
    }

    #[tokio::test]
    async fn test_export_returns_attachment() {
        let server = MockServer::start().await;
        let response = test_router(&server)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/proposals/export")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "company_name": "테크스타",
                            "content": "# 본문",
                            "format": "md"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/markdown; charset=utf-8"
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment;"));
        assert!(disposition.ends_with(".md"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], "# 본문".as_bytes());
    }
}
