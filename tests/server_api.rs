//! End-to-end tests for the web surface

use assert_json_diff::assert_json_include;
use async_trait::async_trait;
use axum::extract::Query;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_test::assert_ok;

use summarize_translate::core::config::{AppConfig, SummaryApi};
use summarize_translate::core::models::Completion;
use summarize_translate::server::{router, AppState};
use summarize_translate::{
    ApiKey, CompletionModel, LanguageCode, MapReduceSummarizer, Pipeline, ServiceError,
    TextSplitter, TranslationProvider, WindowedTranslator,
};

#[derive(Debug)]
struct FixedModel(&'static str);

#[async_trait]
impl CompletionModel for FixedModel {
    async fn complete(&self, _prompt: &str, _api_key: &ApiKey) -> Result<Completion, ServiceError> {
        Ok(Completion {
            text: self.0.to_string(),
            tokens_used: 3,
        })
    }
}

#[derive(Debug)]
struct BrokenModel;

#[async_trait]
impl CompletionModel for BrokenModel {
    async fn complete(&self, _prompt: &str, _api_key: &ApiKey) -> Result<Completion, ServiceError> {
        Err(ServiceError::QuotaExceeded)
    }
}

/// Reverses each window so window boundaries stay visible
#[derive(Debug)]
struct ReverseProvider;

#[async_trait]
impl TranslationProvider for ReverseProvider {
    async fn translate_window(
        &self,
        text: &str,
        _source: LanguageCode,
        _target: LanguageCode,
    ) -> Result<String, ServiceError> {
        Ok(text.chars().rev().collect())
    }
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn serve_with(model: impl CompletionModel + 'static) -> String {
    let pipeline = Pipeline::new(
        TextSplitter::default(),
        Arc::new(MapReduceSummarizer::new(model, 10_000)),
        WindowedTranslator::new(Arc::new(ReverseProvider), 500),
        "sk-",
    );
    spawn(router(AppState::new(pipeline))).await
}

async fn post_json(url: String, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn summarize_echoes_stub_summary() {
    let base = serve_with(FixedModel("Stubbed summary.")).await;

    let (status, body) = post_json(
        format!("{}/api/summarize", base),
        json!({ "text": "Something worth summarizing.", "api_key": "sk-test" }),
    )
    .await;

    assert_eq!(status, 200);
    assert_json_include!(
        actual: body,
        expected: json!({ "summary": "Stubbed summary.", "segments": 1, "tokens_used": 6 })
    );
}

#[tokio::test]
async fn empty_text_is_rejected() {
    let base = serve_with(FixedModel("unused")).await;

    let (status, body) = post_json(
        format!("{}/api/summarize", base),
        json!({ "text": "", "api_key": "sk-test" }),
    )
    .await;

    assert_eq!(status, 400);
    assert_json_include!(
        actual: body,
        expected: json!({ "error": { "code": "invalid_input", "type": "invalid_request_error" } })
    );
}

#[tokio::test]
async fn malformed_key_is_rejected() {
    let base = serve_with(FixedModel("unused")).await;

    let (status, body) = post_json(
        format!("{}/api/summarize", base),
        json!({ "text": "hello", "api_key": "not-a-key" }),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "invalid_credential");
}

#[tokio::test]
async fn translate_slices_into_500_char_windows() {
    let base = serve_with(FixedModel("unused")).await;
    let text = format!("{}{}{}", "a".repeat(500), "b".repeat(500), "c".repeat(200));

    let (status, body) = post_json(
        format!("{}/api/translate", base),
        json!({ "text": text, "api_key": "sk-test", "target_language": "Spanish" }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["chunks"], 3);
    let expected = format!("{} {} {}", "a".repeat(500), "b".repeat(500), "c".repeat(200));
    assert_eq!(body["translation"], expected);
}

#[tokio::test]
async fn unknown_language_is_rejected() {
    let base = serve_with(FixedModel("unused")).await;

    let (status, body) = post_json(
        format!("{}/api/translate", base),
        json!({ "text": "hello", "api_key": "sk-test", "target_language": "Klingon" }),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "language_not_found");
    assert_eq!(body["error"]["message"], "Language not found: Klingon");
}

#[tokio::test]
async fn external_failure_is_bad_gateway() {
    let base = serve_with(BrokenModel).await;

    let (status, body) = post_json(
        format!("{}/api/process", base),
        json!({ "text": "hello", "api_key": "sk-test", "action": "summarize" }),
    )
    .await;

    assert_eq!(status, 502);
    assert_eq!(body["error"]["code"], "external_service_error");
}

#[tokio::test]
async fn process_summarizes_then_translates() {
    let base = serve_with(FixedModel("abc")).await;

    let (status, body) = post_json(
        format!("{}/api/process", base),
        json!({
            "text": "long input",
            "api_key": "sk-test",
            "action": "summarize_and_translate",
            "source_language": "English",
            "target_language": "Italian"
        }),
    )
    .await;

    assert_eq!(status, 200);
    assert_json_include!(
        actual: body,
        expected: json!({
            "action": "summarize_and_translate",
            "summary": "abc",
            "translation": "cba",
            "translation_chunks": 1
        })
    );
}

#[tokio::test]
async fn languages_endpoint_lists_enumeration() {
    let base = serve_with(FixedModel("unused")).await;

    let body: Value = reqwest::get(format!("{}/api/languages", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let languages = body["languages"].as_array().unwrap();
    assert_eq!(languages.len(), 9);
    assert!(languages.contains(&json!({ "code": "es", "name": "Spanish" })));
}

#[tokio::test]
async fn form_page_round_trip() {
    let base = serve_with(FixedModel("Summary <from> stub")).await;
    let client = reqwest::Client::new();

    let page = client.get(format!("{}/app", base)).send().await.unwrap();
    assert_eq!(page.status().as_u16(), 200);
    let html = page.text().await.unwrap();
    assert!(html.contains(r#"name="api_key" type="password""#));
    assert!(html.contains(r#"<option value="Arabic">Arabic</option>"#));

    let response = client
        .post(format!("{}/app", base))
        .form(&[
            ("text", "Some pasted text."),
            ("api_key", "sk-test"),
            ("action", "summarize"),
            ("source_language", "English"),
            ("target_language", "Spanish"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("Summary &lt;from&gt; stub"));
    assert!(!html.contains("sk-test"));

    let response = client
        .post(format!("{}/app", base))
        .form(&[("text", "text"), ("api_key", "oops"), ("action", "summarize")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    assert!(response.text().await.unwrap().contains(r#"class="error""#));
}

#[tokio::test]
async fn about_page_links_to_app() {
    let base = serve_with(FixedModel("unused")).await;
    let html = reqwest::get(format!("{}/", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains(r#"href="/app""#));
}

async fn openai_stub(Json(body): Json<Value>) -> Json<Value> {
    let content = body["messages"][0]["content"].as_str().unwrap_or_default();
    let reply = if content.contains("partial") { "final" } else { "partial" };
    Json(json!({
        "choices": [{ "message": { "content": reply } }],
        "usage": { "total_tokens": 1 }
    }))
}

async fn mymemory_stub(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({
        "responseData": {
            "translatedText": format!("<{}>{}", params["langpair"], params["q"])
        },
        "responseStatus": 200
    }))
}

#[tokio::test]
async fn configured_pipeline_talks_to_upstreams() {
    let upstream = spawn(
        Router::new()
            .route("/v1/chat/completions", post(openai_stub))
            .route("/get", get(mymemory_stub)),
    )
    .await;

    let mut config = AppConfig::default();
    config.summarizer.api = SummaryApi::Chat;
    config.summarizer.api_base = format!("{}/v1", upstream);
    config.translator.endpoint = format!("{}/get", upstream);

    let pipeline = assert_ok!(Pipeline::from_config(&config));
    let base = spawn(router(AppState::new(pipeline))).await;

    let (status, body) = post_json(
        format!("{}/api/process", base),
        json!({
            "text": "one\n\ntwo",
            "api_key": "sk-test",
            "action": "summarize_and_translate",
            "target_language": "French"
        }),
    )
    .await;

    assert_eq!(status, 200);
    assert_json_include!(
        actual: body,
        expected: json!({ "summary": "final", "translation": "<en|fr>final", "segments": 1 })
    );
}
