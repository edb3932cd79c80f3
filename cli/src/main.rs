//! gridboard-cli: talk to the dashboard endpoints from a terminal, or run
//! the layout engine offline over a manifest and a stored snapshot.

mod client;
mod render;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use crate::client::{Client, LATEST_ARTICLES_POLL_MS};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing session token; pass --session-token or set GRIDBOARD_SESSION_TOKEN")]
    MissingSessionToken,
    #[error("missing CSRF token; pass --csrf-token or set GRIDBOARD_CSRF_TOKEN")]
    MissingCsrfToken,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("server returned HTTP {status} for {path}: {message}")]
    ServerStatus {
        status: u16,
        path: &'static str,
        message: String,
    },
    #[error("layout error: {0}")]
    Layout(#[from] layout::error::LayoutError),
}

#[derive(Parser, Debug)]
#[command(name = "gridboard-cli", about = "Dashboard layout API client and offline renderer")]
struct Cli {
    #[arg(long, env = "GRIDBOARD_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[arg(long, env = "GRIDBOARD_SESSION_TOKEN")]
    session_token: Option<String>,

    #[arg(long, env = "GRIDBOARD_CSRF_TOKEN")]
    csrf_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ping,
    Layout(LayoutCommand),
    /// Ask the server to regenerate recommendations.
    Refresh,
    /// Print the latest articles.
    Articles {
        /// Keep polling on the dashboard's refresh interval.
        #[arg(long, default_value_t = false)]
        watch: bool,
    },
    /// Resolve placements offline and print them.
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct LayoutCommand {
    #[command(subcommand)]
    command: LayoutSubcommand,
}

#[derive(Subcommand, Debug)]
enum LayoutSubcommand {
    /// Upload a snapshot file as the stored layout.
    Save { file: PathBuf },
    /// Print the stored layout.
    Load,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// JSON array of module descriptions.
    #[arg(long)]
    manifest: PathBuf,

    /// Stored layout document; defaults apply when omitted.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    #[arg(long, default_value_t = 1000.0)]
    stats_width: f64,

    #[arg(long, default_value_t = 1000.0)]
    insights_width: f64,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let client = Client::new(cli.base_url, cli.session_token, cli.csrf_token);

    match cli.command {
        Command::Ping => {
            client.ping().await?;
            println!("ok");
            Ok(())
        }
        Command::Layout(layout) => run_layout(&client, layout).await,
        Command::Refresh => {
            client.refresh_recommendations().await?;
            println!("recommendations refreshed");
            Ok(())
        }
        Command::Articles { watch } => run_articles(&client, watch).await,
        Command::Render(args) => run_render(&args),
    }
}

async fn run_layout(client: &Client, layout: LayoutCommand) -> Result<(), CliError> {
    match layout.command {
        LayoutSubcommand::Save { file } => {
            let body = serde_json::from_str::<Value>(&read_file(&file)?)?;
            client.save_layout(&body).await?;
            println!("layout saved");
            Ok(())
        }
        LayoutSubcommand::Load => {
            match client.load_layout().await? {
                Some(snapshot) => print_json(&snapshot)?,
                None => println!("no stored layout"),
            }
            Ok(())
        }
    }
}

async fn run_articles(client: &Client, watch: bool) -> Result<(), CliError> {
    if !watch {
        let articles = client.latest_articles().await?;
        print!("{}", client::format_articles(&articles));
        return Ok(());
    }

    let mut interval = tokio::time::interval(Duration::from_millis(LATEST_ARTICLES_POLL_MS));
    loop {
        interval.tick().await;
        match client.latest_articles().await {
            Ok(articles) => print!("{}", client::format_articles(&articles)),
            Err(e) => tracing::warn!(error = %e, "latest articles poll failed"),
        }
    }
}

fn run_render(args: &RenderArgs) -> Result<(), CliError> {
    let manifest = serde_json::from_str(&read_file(&args.manifest)?)?;
    let snapshot = args.snapshot.as_deref().map(read_file).transpose()?;
    let widths = render::GridWidths { stats: args.stats_width, insights: args.insights_width };
    let rendered = render::render(manifest, snapshot, widths)?;
    print!("{rendered}");
    Ok(())
}

fn read_file(path: &std::path::Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io { path: path.to_owned(), source })
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
