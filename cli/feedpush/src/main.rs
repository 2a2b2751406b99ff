use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pusher::{Conf, History, Scheduler};

/// Browser-like User-Agent; some feed hosts reject unknown clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/111.0.0.0 Safari/537.36";

/// History record file, kept beside the executable.
const RECORD_FILE: &str = ".feedpush";

#[derive(Parser)]
#[command(name = "feedpush")]
#[command(about = "Push new feed entries to chat webhooks", version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long)]
    conf: PathBuf,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Don't send messages at the first round
    #[arg(short, long)]
    silent: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let conf = Conf::load(&cli.conf)
        .with_context(|| format!("config file `{}`", cli.conf.display()))?;

    let history = History::load(record_path()?).context("history record")?;

    // Feeds often sit on misconfigured or self-signed hosts; certificate
    // validation is deliberately disabled.
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .danger_accept_invalid_certs(true)
        .build()?;

    tracing::info!("feedpush started with {} project(s)", conf.projects.len());
    Scheduler::new(conf, client, history, cli.silent).run().await?;
    Ok(())
}

fn record_path() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("locating the executable")?;
    let dir = exe.parent().unwrap_or_else(|| std::path::Path::new("."));
    Ok(dir.join(RECORD_FILE))
}
