//! Main entry point for the summarize/translate CLI and web app

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use summarize_translate::cli::commands::{self, Commands};
use summarize_translate::AppConfig;

/// Summarize text with a hosted LLM and translate it into other languages
#[derive(Parser, Debug)]
#[command(name = "summarize-translate", version, about, long_about = None)]
struct Args {
    /// Config file (default: ./summarize-translate.{toml,json,yaml} if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}={},tower_http={}",
                    env!("CARGO_CRATE_NAME"),
                    log_level,
                    log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load_from(args.config.as_deref())?;

    match args.command {
        Some(Commands::Serve { host, port }) => {
            commands::handle_serve(config, host, port).await?;
        }
        Some(Commands::Summarize { file, api_key }) => {
            commands::handle_summarize(config, file, api_key).await?;
        }
        Some(Commands::Translate {
            file,
            from,
            to,
            summarize,
            api_key,
        }) => {
            commands::handle_translate(config, file, from, to, summarize, api_key).await?;
        }
        Some(Commands::Languages) => {
            commands::handle_languages();
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
