//! HTTP API server implementation

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::core::config::AppConfig;
use crate::core::errors::PipelineError;
use crate::core::languages::LanguageCode;
use crate::core::models::{Action, PipelineOutput, PipelineRequest};
use crate::core::pipeline::Pipeline;
use crate::server::pages;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
}

/// Supported languages
#[derive(Serialize, Deserialize, ToSchema)]
pub struct LanguagesResponse {
    pub languages: Vec<LanguageInfo>,
}

/// Summarize request
#[derive(Deserialize, ToSchema)]
pub struct SummarizeRequest {
    pub text: String,
    pub api_key: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SummarizeResponse {
    pub summary: String,
    pub segments: usize,
    pub tokens_used: usize,
}

/// Translate request; languages are display names
#[derive(Deserialize, ToSchema)]
pub struct TranslateRequest {
    pub text: String,
    pub api_key: String,
    pub source_language: Option<String>,
    pub target_language: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TranslateResponse {
    pub translation: String,
    pub chunks: usize,
}

/// Error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorDetail {
    pub message: String,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            PipelineError::ExternalService { .. } => (StatusCode::BAD_GATEWAY, "api_error"),
            PipelineError::Config { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "server_error"),
            _ => (StatusCode::BAD_REQUEST, "invalid_request_error"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                message: self.to_string(),
                code: self.code().to_string(),
                kind: kind.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Health check handler
#[utoipa::path(get, path = "/health", responses((status = 200, description = "Service is up", body = HealthResponse)))]
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: crate::NAME.to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// List supported languages
#[utoipa::path(get, path = "/api/languages", responses((status = 200, description = "Supported languages", body = LanguagesResponse)))]
async fn list_languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: LanguageCode::ALL
            .iter()
            .map(|lang| LanguageInfo {
                code: lang.code().to_string(),
                name: lang.name().to_string(),
            })
            .collect(),
    })
}

/// Summarize text
#[utoipa::path(
    post,
    path = "/api/summarize",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "Summary", body = SummarizeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 502, description = "External service failure", body = ErrorResponse)
    )
)]
async fn summarize(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, PipelineError> {
    let Json(payload) = payload.map_err(body_error)?;
    let request = PipelineRequest::new(payload.text, payload.api_key, Action::Summarize);
    let output = state.pipeline.run(request).await.map_err(log_failure)?;

    Ok(Json(SummarizeResponse {
        summary: output.summary.unwrap_or_default(),
        segments: output.segments,
        tokens_used: output.tokens_used,
    }))
}

/// Translate text
#[utoipa::path(
    post,
    path = "/api/translate",
    request_body = TranslateRequest,
    responses(
        (status = 200, description = "Translation", body = TranslateResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 502, description = "External service failure", body = ErrorResponse)
    )
)]
async fn translate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, PipelineError> {
    let Json(payload) = payload.map_err(body_error)?;
    let mut request = PipelineRequest::new(payload.text, payload.api_key, Action::Translate)
        .with_target_language(payload.target_language);
    request.source_language = payload.source_language;

    let output = state.pipeline.run(request).await.map_err(log_failure)?;

    Ok(Json(TranslateResponse {
        translation: output.translation.unwrap_or_default(),
        chunks: output.translation_chunks,
    }))
}

/// Run any action
#[utoipa::path(
    post,
    path = "/api/process",
    request_body = PipelineRequest,
    responses(
        (status = 200, description = "Pipeline result", body = PipelineOutput),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 502, description = "External service failure", body = ErrorResponse)
    )
)]
async fn process(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PipelineRequest>, JsonRejection>,
) -> Result<Json<PipelineOutput>, PipelineError> {
    let Json(payload) = payload.map_err(body_error)?;
    let output = state.pipeline.run(payload).await.map_err(log_failure)?;
    Ok(Json(output))
}

/// Turn an unreadable JSON body into a pipeline error so every failure
/// shares the same response shape
fn body_error(rejection: JsonRejection) -> PipelineError {
    let message = rejection.body_text();
    warn!("Rejected request body: {}", message);

    match missing_field_name(&message) {
        Some(field) => PipelineError::MissingField {
            field: field.to_string(),
        },
        None => PipelineError::MalformedBody { message },
    }
}

/// serde reports absent fields as "missing field `name`"
fn missing_field_name(message: &str) -> Option<&str> {
    let rest = message.split("missing field `").nth(1)?;
    rest.split('`').next().filter(|name| !name.is_empty())
}

fn log_failure(e: PipelineError) -> PipelineError {
    warn!("Request failed: {}", e);
    e
}

#[derive(OpenApi)]
#[openapi(
    paths(health_check, list_languages, summarize, translate, process),
    components(schemas(
        HealthResponse,
        LanguageInfo,
        LanguagesResponse,
        SummarizeRequest,
        SummarizeResponse,
        TranslateRequest,
        TranslateResponse,
        ErrorResponse,
        ErrorDetail,
        PipelineRequest,
        PipelineOutput,
        Action,
        LanguageCode
    ))
)]
struct ApiDoc;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home_page))
        .route("/app", get(pages::app_page).post(pages::submit_form))
        .route("/health", get(health_check))
        .route("/api/languages", get(list_languages))
        .route("/api/summarize", post(summarize))
        .route("/api/translate", post(translate))
        .route("/api/process", post(process))
        .route("/api-docs/openapi.json", get(openapi))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until Ctrl-C
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(&config)?;
    let app = router(AppState::new(pipeline));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::tests::stub_pipeline;
    use crate::core::test_support::spawn_stub;
    use assert_json_diff::assert_json_include;
    use serde_json::{json, Value};

    async fn serve(reply: &str) -> String {
        let (pipeline, _) = stub_pipeline(reply);
        spawn_stub(router(AppState::new(pipeline))).await
    }

    #[tokio::test]
    async fn test_health_check() {
        let base = serve("x").await;
        let body: Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_json_include!(actual: body, expected: json!({ "status": "ok", "service": crate::NAME }));
    }

    #[test]
    fn test_pipeline_error_status_codes() {
        let invalid = PipelineError::InvalidInput.into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let external =
            PipelineError::summarization(crate::core::errors::ServiceError::Timeout).into_response();
        assert_eq!(external.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_missing_field_name() {
        assert_eq!(
            missing_field_name(
                "Failed to deserialize the JSON body into the target type: missing field `api_key` at line 1 column 16"
            ),
            Some("api_key")
        );
        assert_eq!(missing_field_name("expected value at line 1 column 1"), None);
    }

    async fn post_raw(base: &str, path: &str, body: &'static str) -> (StatusCode, Value) {
        let response = reqwest::Client::new()
            .post(format!("{}{}", base, path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_bad_bodies_use_error_shape() {
        let base = serve("x").await;

        let (status, body) = post_raw(&base, "/api/summarize", r#"{"text":"hello"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_json_include!(
            actual: body,
            expected: json!({
                "error": {
                    "code": "missing_field",
                    "type": "invalid_request_error",
                    "message": "Missing required field: api_key"
                }
            })
        );

        let (status, body) = post_raw(&base, "/api/translate", r#"{"api_key":"sk-x","target_language":"Dutch"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Missing required field: text");

        let (status, body) = post_raw(&base, "/api/process", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "malformed_body");
    }

    #[tokio::test]
    async fn test_openapi_lists_paths() {
        let base = serve("x").await;
        let body: Value = reqwest::get(format!("{}/api-docs/openapi.json", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        for path in ["/health", "/api/languages", "/api/summarize", "/api/translate", "/api/process"] {
            assert!(body["paths"].get(path).is_some(), "missing {}", path);
        }
    }
}
