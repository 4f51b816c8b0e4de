//! CLI command definitions and handlers

use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tracing::info;

use crate::core::config::AppConfig;
use crate::core::languages::LanguageCode;
use crate::core::models::{Action, PipelineRequest};
use crate::core::pipeline::Pipeline;

/// Commands for the summarize/translate tool
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web app
    Serve {
        /// Bind address (default from config: 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (default from config: 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Summarize text read from a file or stdin
    Summarize {
        /// Input file (reads stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// OpenAI API key
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Translate text read from a file or stdin
    Translate {
        /// Input file (reads stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Source language name (default: English)
        #[arg(long)]
        from: Option<String>,

        /// Target language name, e.g. Spanish
        #[arg(short, long)]
        to: String,

        /// Summarize first and translate the summary
        #[arg(short, long)]
        summarize: bool,

        /// OpenAI API key
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// List supported languages
    Languages,
}

/// Read the whole input from `file`, or stdin when no file is given
async fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => {
            info!("Reading input from {}", path.display());
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))
        }
        None => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            Ok(text)
        }
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Handle serve command
pub async fn handle_serve(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    println!(
        "🚀 Server starting on http://{}:{}",
        config.server.host, config.server.port
    );
    println!(
        "📄 API description: http://{}:{}/api-docs/openapi.json",
        config.server.host, config.server.port
    );

    run_server(config).await
}

/// Handle summarize command
pub async fn handle_summarize(
    config: AppConfig,
    file: Option<PathBuf>,
    api_key: Option<String>,
) -> anyhow::Result<()> {
    let text = read_input(file.as_deref()).await?;
    let pipeline = Pipeline::from_config(&config)?;
    let start_time = Instant::now();

    let pb = spinner("Summarizing...");
    let result = pipeline
        .run(PipelineRequest::new(
            text,
            api_key.unwrap_or_default(),
            Action::Summarize,
        ))
        .await;
    pb.finish_and_clear();
    let output = result?;

    info!(
        "Summarized {} segments in {:?} ({} tokens)",
        output.segments,
        start_time.elapsed(),
        output.tokens_used
    );

    println!("{}", output.summary.unwrap_or_default());
    Ok(())
}

/// Handle translate command
pub async fn handle_translate(
    config: AppConfig,
    file: Option<PathBuf>,
    from: Option<String>,
    to: String,
    summarize: bool,
    api_key: Option<String>,
) -> anyhow::Result<()> {
    let text = read_input(file.as_deref()).await?;
    let pipeline = Pipeline::from_config(&config)?;
    let start_time = Instant::now();

    let action = if summarize {
        Action::SummarizeAndTranslate
    } else {
        Action::Translate
    };
    let mut request =
        PipelineRequest::new(text, api_key.unwrap_or_default(), action).with_target_language(to);
    request.source_language = from;

    let pb = spinner(if summarize {
        "Summarizing and translating..."
    } else {
        "Translating..."
    });
    let result = pipeline.run(request).await;
    pb.finish_and_clear();
    let output = result?;

    info!(
        "Translated {} windows in {:?}",
        output.translation_chunks,
        start_time.elapsed()
    );

    if let Some(summary) = &output.summary {
        eprintln!("Summary:\n{}\n", summary);
    }
    println!("{}", output.translation.unwrap_or_default());
    Ok(())
}

/// Handle languages command
pub fn handle_languages() {
    for lang in LanguageCode::ALL {
        println!("{}  {}", lang.code(), lang.name());
    }
}
