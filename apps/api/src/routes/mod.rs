pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ats::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // ATS API
        .route("/api/v1/ats/extract", post(handlers::handle_extract))
        .route("/api/v1/ats/score", post(handlers::handle_score))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::extraction::ExtractionOptions;
    use crate::scoring::KeywordAtsScorer;

    const BOUNDARY: &str = "ats-test-boundary";

    const RESUME: &str = "Jane Doe jane@example.com Experience Senior Software Engineer at Globex \
        building python services with docker and git. Education Bachelor of Science, State \
        University. Skills sql agile testing";

    fn app(config: Config) -> Router {
        build_router(AppState {
            config,
            scorer: Arc::new(KeywordAtsScorer),
            options: ExtractionOptions::server(),
        })
    }

    enum Part<'a> {
        File {
            name: &'a str,
            content_type: &'a str,
            data: &'a [u8],
        },
        Text(&'a str, &'a str),
    }

    fn multipart(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::File {
                    name,
                    content_type,
                    data,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
                             Content-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
                Part::Text(field, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}")
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

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

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn resume_file(data: &[u8]) -> Part<'_> {
        Part::File {
            name: "resume.txt",
            content_type: "text/plain",
            data,
        }
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app(Config::default()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "ats_api");
    }

    #[tokio::test]
    async fn test_extract_plain_text_resume() {
        let request = multipart("/api/v1/ats/extract", &[resume_file(RESUME.as_bytes())]);
        let (status, json) = send(app(Config::default()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["file_name"], "resume.txt");
        assert_eq!(json["extraction"]["kind"], "plain_text");
        assert_eq!(json["extraction"]["strategy"], "plain_text");
        let text = json["extraction"]["text"].as_str().unwrap();
        assert!(text.contains("jane@example.com"));
        assert!(json["extraction"]["indicator_count"].as_u64().unwrap() >= 3);
    }

    #[tokio::test]
    async fn test_score_returns_extraction_and_report() {
        let request = multipart(
            "/api/v1/ats/score",
            &[
                Part::Text("job_role", "Software Engineer"),
                resume_file(RESUME.as_bytes()),
            ],
        );
        let (status, json) = send(app(Config::default()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["report"]["scorer_backend"], "keyword");
        assert!(json["report"]["overall_score"].as_u64().unwrap() > 0);
        assert!(json["report"]["matched_keywords"]
            .as_array()
            .unwrap()
            .iter()
            .any(|k| k == "python"));
    }

    #[tokio::test]
    async fn test_missing_file_field_is_bad_request() {
        let request = multipart(
            "/api/v1/ats/score",
            &[Part::Text("job_role", "Software Engineer")],
        );
        let (status, json) = send(app(Config::default()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "NO_FILE_PROVIDED");
        assert!(json["error"]["hint"].is_string());
    }

    #[tokio::test]
    async fn test_unsupported_file_type() {
        let request = multipart(
            "/api/v1/ats/extract",
            &[Part::File {
                name: "photo.png",
                content_type: "image/png",
                data: RESUME.as_bytes(),
            }],
        );
        let (status, json) = send(app(Config::default()), request).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(json["error"]["code"], "UNSUPPORTED_FILE_TYPE");
    }

    #[tokio::test]
    async fn test_tiny_file_is_truncated_buffer() {
        let request = multipart("/api/v1/ats/extract", &[resume_file(b"Jane Doe")]);
        let (status, json) = send(app(Config::default()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "EMPTY_OR_TRUNCATED_BUFFER");
    }

    #[tokio::test]
    async fn test_unreadable_file_is_unprocessable() {
        let noise = "x ".repeat(40);
        let request = multipart("/api/v1/ats/extract", &[resume_file(noise.as_bytes())]);
        let (status, json) = send(app(Config::default()), request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "INSUFFICIENT_EXTRACTED_TEXT");
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_rejected() {
        let config = Config {
            max_upload_bytes: 64,
            ..Config::default()
        };
        let request = multipart("/api/v1/ats/extract", &[resume_file(RESUME.as_bytes())]);
        let (status, _) = send(app(config), request).await;

        assert!(status.is_client_error(), "got {status}");
    }
}
