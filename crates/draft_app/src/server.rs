//! HTTP transport: routes, header handling and the pipeline entry point.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use draft_core::{Credentials, DraftRequest, PlatformCredentials, PublishOutcome};
use draft_engine::Pipeline;
use draft_logging::{draft_info, draft_warn};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::response::{ApiError, ApiResponse, MSG_INVALID_BODY};

pub const APP_ID_HEADER: &str = "Wechat-Appid";
pub const APP_SECRET_HEADER: &str = "Wechat-App-Secret";
pub const RENDER_KEY_HEADER: &str = "Md2wechat-API-Key";

#[derive(Clone)]
pub struct AppState {
    pipeline: Pipeline,
    /// Fallback for requests without a rendering key header.
    render_api_key: Option<String>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, render_api_key: Option<String>) -> Self {
        Self {
            pipeline,
            render_api_key,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/convert-and-draft", post(convert_and_draft))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "time": chrono::Utc::now().timestamp(),
    }))
}

async fn convert_and_draft(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<DraftRequest>, JsonRejection>,
) -> Result<ApiResponse<PublishOutcome>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        draft_warn!("Rejected request body: {}", rejection.body_text());
        ApiError::bad_request(MSG_INVALID_BODY, rejection.body_text())
    })?;

    let credentials = credentials_from(&headers, state.render_api_key.as_deref());
    draft_info!(
        "convert-and-draft app_id={} theme={} font_size={}",
        credentials.platform.app_id,
        request.theme,
        request.font_size
    );

    let outcome = state.pipeline.run(request, credentials).await?;
    Ok(ApiResponse::success(outcome))
}

/// Missing headers become empty values; the pipeline rejects them during
/// validation.
fn credentials_from(headers: &HeaderMap, fallback_key: Option<&str>) -> Credentials {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    let render_api_key = header(RENDER_KEY_HEADER).or_else(|| fallback_key.map(str::to_string));
    Credentials::new(
        PlatformCredentials::new(
            header(APP_ID_HEADER).unwrap_or_default(),
            header(APP_SECRET_HEADER).unwrap_or_default(),
        ),
        render_api_key,
    )
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{HeaderName, HeaderValue, Request, StatusCode};
    use draft_core::{
        Article, ConversionRequest, ConversionResult, DraftResult, PlatformCredentials,
        UploadedAsset,
    };
    use draft_engine::{
        ConversionError, ConversionFailure, DraftPublisher, MediaUploader, PublishError, Renderer,
        UploadError,
    };
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    #[derive(Default)]
    struct StubRenderer {
        fail: bool,
        calls: AtomicUsize,
        seen_key: Mutex<Option<String>>,
    }

    #[async_trait::async_trait]
    impl Renderer for StubRenderer {
        async fn convert(
            &self,
            request: &ConversionRequest,
            api_key: Option<&str>,
        ) -> Result<ConversionResult, ConversionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_key.lock().unwrap() = api_key.map(str::to_string);
            if self.fail {
                return Err(ConversionError {
                    kind: ConversionFailure::UpstreamStatus(503),
                    message: "unavailable".to_string(),
                });
            }
            Ok(ConversionResult {
                html: "<section><h1>标题</h1><p>正文</p></section>".to_string(),
                theme: request.theme.clone(),
                font_size: request.font_size.clone(),
                word_count: 156,
                estimated_read_time: 1,
            })
        }
    }

    struct StubUploader;

    #[async_trait::async_trait]
    impl MediaUploader for StubUploader {
        async fn upload_cover_image(
            &self,
            _credentials: &PlatformCredentials,
            _image_url: &str,
        ) -> Result<UploadedAsset, UploadError> {
            Ok(UploadedAsset {
                asset_id: "thumb_789".to_string(),
                remote_url: "http://mmbiz.example/thumb_789.jpg".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct StubPublisher {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl DraftPublisher for StubPublisher {
        async fn create_draft(
            &self,
            _credentials: &PlatformCredentials,
            _articles: Vec<Article>,
            _cover_asset_id: Option<String>,
        ) -> Result<DraftResult, PublishError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(DraftResult {
                media_id: "media_123456".to_string(),
            })
        }
    }

    struct Harness {
        renderer: Arc<StubRenderer>,
        publisher: Arc<StubPublisher>,
        app: Router,
    }

    fn harness(renderer: StubRenderer, fallback_key: Option<&str>) -> Harness {
        draft_logging::initialize_for_tests();
        let renderer = Arc::new(renderer);
        let publisher = Arc::new(StubPublisher::default());
        let pipeline = Pipeline::new(renderer.clone(), Arc::new(StubUploader), publisher.clone());
        let app = router(AppState::new(pipeline, fallback_key.map(str::to_string)));
        Harness {
            renderer,
            publisher,
            app,
        }
    }

    fn draft_request(body: &str, credentials: bool, render_key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/convert-and-draft")
            .header("content-type", "application/json");
        if credentials {
            builder = builder
                .header(APP_ID_HEADER, "wx123")
                .header(APP_SECRET_HEADER, "secret123");
        }
        if let Some(key) = render_key {
            builder = builder.header(RENDER_KEY_HEADER, key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    const VALID_BODY: &str = r##"{"markdown":"# 标题\n\n这是一个**加粗**文本的例子。","theme":"default","fontSize":"medium"}"##;

    #[tokio::test]
    async fn successful_run_returns_success_envelope() {
        let h = harness(StubRenderer::default(), None);
        let response = h
            .app
            .oneshot(draft_request(VALID_BODY, true, Some("test_api_key")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["code"], 0);
        assert_eq!(body["message"], "success");
        assert_eq!(body["data"]["media_id"], "media_123456");
        assert_eq!(body["data"]["wordCount"], 156);
        assert_eq!(body["data"]["estimatedReadTime"], 1);
        assert_eq!(body["data"]["fontSize"], "medium");
        assert!(body["timestamp"].is_i64());
        assert_eq!(
            h.renderer.seen_key.lock().unwrap().as_deref(),
            Some("test_api_key")
        );
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_credential_headers_fail_authentication() {
        let h = harness(StubRenderer::default(), None);
        let response = h
            .app
            .oneshot(draft_request(VALID_BODY, false, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["code"], 400);
        assert_eq!(body["message"], "authentication failed");
        assert_eq!(h.renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_fields_fail_validation() {
        let h = harness(StubRenderer::default(), None);
        let response = h
            .app
            .oneshot(draft_request(r##"{"markdown":"# 标题"}"##, true, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["message"], "validation failed");
        assert_eq!(h.renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unparseable_body_is_invalid_request() {
        let h = harness(StubRenderer::default(), None);
        let response = h
            .app
            .oneshot(draft_request("{not json", true, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["code"], 400);
        assert_eq!(body["message"], "invalid request body");
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn configured_key_is_used_when_header_is_absent() {
        let h = harness(StubRenderer::default(), Some("configured-key"));
        let response = h
            .app
            .oneshot(draft_request(VALID_BODY, true, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            h.renderer.seen_key.lock().unwrap().as_deref(),
            Some("configured-key")
        );
    }

    #[tokio::test]
    async fn conversion_failure_is_server_error() {
        let h = harness(
            StubRenderer {
                fail: true,
                ..StubRenderer::default()
            },
            None,
        );
        let response = h
            .app
            .oneshot(draft_request(VALID_BODY, true, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_json(response).await;
        assert_eq!(body["code"], 500);
        assert_eq!(body["message"], "markdown conversion failed");
        assert!(body["details"].as_str().unwrap().contains("503"));
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn health_reports_ok_with_cors() {
        let h = harness(StubRenderer::default(), None);
        let response = h
            .app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "http://editor.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
        let body = read_json(response).await;
        assert_eq!(body["status"], "OK");
        assert!(body["time"].is_i64());
    }

    #[test]
    fn credentials_trim_headers_and_prefer_request_key() {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (APP_ID_HEADER, " wx123 "),
            (APP_SECRET_HEADER, "secret"),
            (RENDER_KEY_HEADER, "request-key"),
        ] {
            headers.insert(
                HeaderName::try_from(name).unwrap(),
                HeaderValue::from_static(value),
            );
        }

        let credentials = credentials_from(&headers, Some("configured-key"));
        assert_eq!(credentials.platform.app_id, "wx123");
        assert_eq!(credentials.render_api_key.as_deref(), Some("request-key"));

        let credentials = credentials_from(&HeaderMap::new(), None);
        assert_eq!(credentials.platform.app_id, "");
        assert_eq!(credentials.render_api_key, None);
    }
}
