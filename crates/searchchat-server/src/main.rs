//! SearchChat Server

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use searchchat_core::{FallbackPolicy, SystemPrompt, DEFAULT_HISTORY_LIMIT};
use searchchat_server::{http, AppState, Config, ConfigError};

/// SearchChat HTTP server.
#[derive(Parser, Debug)]
#[command(name = "searchchat-server", about = "Chat front door for a web-search-enabled model")]
struct Args {
    /// HTTP server address
    #[arg(long, env = "SEARCHCHAT_HTTP_ADDR", default_value = "127.0.0.1:3000")]
    http_addr: String,

    /// Provider API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model identifier
    #[arg(long, env = "SEARCHCHAT_MODEL", default_value = "gpt-4o")]
    model: String,

    /// Provider API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    api_base_url: String,

    /// Maximum number of transcript messages kept between turns
    #[arg(long, env = "SEARCHCHAT_HISTORY_LIMIT", default_value_t = DEFAULT_HISTORY_LIMIT)]
    history_limit: usize,

    /// Timeout for a single provider call in seconds
    #[arg(long, env = "SEARCHCHAT_REQUEST_TIMEOUT_SECS", default_value = "120")]
    request_timeout_secs: u64,

    /// Leave turns answered with the fallback text out of the transcript
    #[arg(long, env = "SEARCHCHAT_SKIP_FALLBACK_TURNS")]
    skip_fallback_turns: bool,

    /// Replace the base system instruction
    #[arg(long, env = "SEARCHCHAT_SYSTEM_PROMPT")]
    system_prompt: Option<String>,

    /// File holding the time-context template
    #[arg(long, env = "SEARCHCHAT_TIME_CONTEXT_TEMPLATE")]
    time_context_template: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<Config, ConfigError> {
        let mut prompt = match self.system_prompt {
            Some(base) => SystemPrompt::new(base),
            None => SystemPrompt::default(),
        };

        if let Some(path) = self.time_context_template {
            let template =
                std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFile {
                    path: path.display().to_string(),
                    source,
                })?;
            prompt = prompt.with_time_context_template(template.trim_end());
        }

        let fallback_policy = if self.skip_fallback_turns {
            FallbackPolicy::Skip
        } else {
            FallbackPolicy::Record
        };

        Ok(Config {
            http_bind_addr: self.http_addr,
            api_key: self.api_key,
            model: self.model,
            api_base_url: self.api_base_url,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            history_limit: self.history_limit,
            fallback_policy,
            prompt,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("searchchat_server=info,searchchat_core=info,tower_http=info")
            }),
        )
        .with_target(true)
        .init();

    // Load config
    let config = Args::parse().into_config()?;
    config.validate()?;
    let http_addr: SocketAddr = config.http_bind_addr.parse()?;

    info!(
        http_addr = %http_addr,
        model = %config.model,
        history_limit = config.history_limit,
        fallback_policy = ?config.fallback_policy,
        "Starting SearchChat server"
    );

    // Create shared state and router
    let state = AppState::from_config(&config);
    let router = http::create_router(state);

    // Start HTTP server
    let listener = TcpListener::bind(http_addr).await?;
    info!("HTTP server listening on {}", http_addr);

    axum::serve(listener, router).await?;

    Ok(())
}
