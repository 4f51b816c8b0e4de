//! Server-rendered HTML pages: the About page and the summarize/translate form

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::Html,
};
use serde::Deserialize;
use std::fmt::Write;
use tracing::warn;

use crate::core::languages::LanguageCode;
use crate::core::models::{Action, PipelineOutput, PipelineRequest};
use crate::server::api::AppState;

const TITLE: &str = "Text summarizer and translator";

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; display: flex; min-height: 100vh; }
nav { width: 14rem; padding: 1.5rem; background: #f3f4f6; }
nav a { display: block; margin: .5rem 0; color: #1f2937; }
main { flex: 1; padding: 1.5rem 2.5rem; max-width: 52rem; }
textarea { width: 100%; height: 10rem; }
label { display: block; margin-top: 1rem; font-weight: 600; }
.hint { color: #6b7280; font-size: .85rem; }
.error { background: #fee2e2; color: #991b1b; padding: .75rem 1rem; border-radius: .4rem; margin-top: 1rem; }
.result { background: #ecfdf5; padding: .75rem 1rem; border-radius: .4rem; white-space: pre-wrap; }
footer { margin-top: 3rem; color: #6b7280; font-size: .8rem; }
"#;

/// Values posted by the form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormInput {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub action: Action,
    #[serde(default)]
    pub source_language: Option<String>,
    #[serde(default)]
    pub target_language: Option<String>,
}

impl From<FormInput> for PipelineRequest {
    fn from(form: FormInput) -> Self {
        PipelineRequest {
            text: form.text,
            api_key: form.api_key,
            action: form.action,
            source_language: form.source_language.filter(|s| !s.is_empty()),
            target_language: form.target_language.filter(|s| !s.is_empty()),
        }
    }
}

/// What to show under the form
enum Outcome {
    None,
    Done(PipelineOutput),
    Failed(String),
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<nav>
<h3>Navigation</h3>
<a href="/">About</a>
<a href="/app">Summarizer and translator</a>
</nav>
<main>
{body}
<footer><hr>{name} v{version}</footer>
</main>
</body>
</html>"#,
        title = TITLE,
        style = STYLE,
        body = body,
        name = crate::NAME,
        version = crate::VERSION,
    )
}

/// About page
pub async fn home_page() -> Html<String> {
    let body = format!(
        r#"<h1>Welcome to the {title} app!</h1>
<p>This app lets you summarize and translate text.</p>
<ul>
<li><strong>Summarize</strong>: rewrite your text into a shorter version.</li>
<li><strong>Translate</strong>: translate your text into various languages.</li>
</ul>
<p>To use the app you need an OpenAI API key. You can get one <a href="https://platform.openai.com/api-keys">here</a>.
The key is used for your request only and is never stored.</p>
<p>Long texts are split into segments, each segment is summarized, and the partial summaries are combined.
Translations are made 500 characters at a time.</p>
<p>Open the <a href="/app">Summarizer and translator</a> page to get started.</p>"#,
        title = TITLE.to_lowercase(),
    );
    Html(layout(&body))
}

/// Empty form
pub async fn app_page(State(state): State<AppState>) -> Html<String> {
    Html(render_app(&FormInput::default(), &Outcome::None, state.pipeline.credential_prefix()))
}

/// Form submission
pub async fn submit_form(
    State(state): State<AppState>,
    Form(form): Form<FormInput>,
) -> (StatusCode, Html<String>) {
    let prefix = state.pipeline.credential_prefix().to_string();

    match state.pipeline.run(PipelineRequest::from(form.clone())).await {
        Ok(output) => (
            StatusCode::OK,
            Html(render_app(&form, &Outcome::Done(output), &prefix)),
        ),
        Err(e) => {
            warn!("Form request failed: {}", e);
            let status = if e.is_request_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::BAD_GATEWAY
            };
            (
                status,
                Html(render_app(&form, &Outcome::Failed(e.to_string()), &prefix)),
            )
        }
    }
}

fn language_options(selected: Option<&str>, fallback: LanguageCode) -> String {
    let selected = selected.unwrap_or(fallback.name());
    let mut options = String::new();
    for lang in LanguageCode::ALL {
        let _ = write!(
            options,
            r#"<option value="{name}"{sel}>{name}</option>"#,
            name = lang.name(),
            sel = if lang.name() == selected { " selected" } else { "" },
        );
    }
    options
}

fn action_radios(selected: Action) -> String {
    let mut radios = String::new();
    for action in Action::ALL {
        let _ = write!(
            radios,
            r#"<label style="display:inline;font-weight:normal;margin-right:1rem"><input type="radio" name="action" value="{value}"{checked}> {label}</label>"#,
            value = action,
            label = action.label(),
            checked = if action == selected { " checked" } else { "" },
        );
    }
    radios
}

fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::None => String::new(),
        Outcome::Failed(message) => {
            format!(r#"<div class="error">{}</div>"#, escape_html(message))
        }
        Outcome::Done(output) => {
            let mut html = String::new();
            if let Some(summary) = &output.summary {
                let _ = write!(
                    html,
                    r#"<h3>Summarized text:</h3><div class="result" id="summary">{}</div>"#,
                    escape_html(summary)
                );
            }
            if let Some(translation) = &output.translation {
                let _ = write!(
                    html,
                    r#"<h3>Translated text:</h3><div class="result" id="translation">{}</div>"#,
                    escape_html(translation)
                );
            }
            html
        }
    }
}

fn render_app(form: &FormInput, outcome: &Outcome, credential_prefix: &str) -> String {
    let body = format!(
        r#"<h2>{title}</h2>
<form method="post" action="/app">
<label for="text">Paste the text you want to summarize and translate:</label>
<textarea id="text" name="text">{text}</textarea>
<label for="api_key">Enter your OpenAI API key</label>
<input id="api_key" name="api_key" type="password" autocomplete="off">
<div class="hint">Your API key should start with "{prefix}"</div>
<label>Choose an action:</label>
{radios}
<label for="source_language">Translate from:</label>
<select id="source_language" name="source_language">{sources}</select>
<label for="target_language">Translate to:</label>
<select id="target_language" name="target_language">{targets}</select>
<p><button type="submit">Run</button></p>
</form>
{outcome}"#,
        title = TITLE,
        text = escape_html(&form.text),
        prefix = escape_html(credential_prefix),
        radios = action_radios(form.action),
        sources = language_options(form.source_language.as_deref(), LanguageCode::English),
        targets = language_options(form.target_language.as_deref(), LanguageCode::Spanish),
        outcome = render_outcome(outcome),
    );
    layout(&body)
}
