//! SearchChat terminal client.

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use searchchat_client::{ChatSession, HttpClient};

/// Terminal chat client for a SearchChat server.
#[derive(Parser, Debug)]
#[command(name = "searchchat", about = "Chat with a web-search-enabled assistant")]
struct Args {
    /// SearchChat server URL
    #[arg(short, long, env = "SEARCHCHAT_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Timezone name sent with each message (defaults to the UTC offset)
    #[arg(short, long, env = "TZ")]
    timezone: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays the chat view
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("searchchat_client=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = HttpClient::new(&args.server);
    match client.health().await {
        Ok(true) => info!(server = %args.server, "Server is healthy"),
        Ok(false) => warn!(server = %args.server, "Server health check failed"),
        Err(e) => warn!(server = %args.server, error = %e, "Server unreachable"),
    }

    let mut session = match args.timezone {
        Some(tz) => ChatSession::new().with_timezone(tz),
        None => ChatSession::new(),
    };

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(b"Start a conversation. /new starts over, /quit exits.\n")
        .await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/new" => {
                session.reset();
                stdout.write_all(b"-- new conversation --\n").await?;
                continue;
            }
            _ => {}
        }

        let Some(request) = session.outgoing(&line, &chrono::Local::now()) else {
            continue;
        };

        let shown = match client.send_chat(&request).await {
            Ok(response) => session.apply_response(response).to_string(),
            Err(e) => session.apply_error(e).to_string(),
        };

        stdout.write_all(format!("{}\n\n", shown).as_bytes()).await?;
    }

    Ok(())
}
