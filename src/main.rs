//! nested-router
//!
//! Command-line front end for a router built from a TOML route tree.
//!
//! ```text
//! nested-router resolve --config routes.toml /users/42 /users/new
//!     → navigates each path in order, prints one JSON snapshot per path
//!
//! nested-router watch --config routes.toml < paths.txt
//!     → reads paths from stdin, prints snapshots as they are emitted
//!
//! nested-router watch --config routes.toml --location-file location
//!     → polls the file every `router.poll_interval_ms`, routes its contents
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use nested_router::config::load_config;
use nested_router::observability::logging::init_logging;
use nested_router::router::{ChannelSource, PollingSource, RouterSubscription, ViewResult};
use nested_router::routing::Resolved;
use nested_router::{Path, RouteSnapshot, Router, RouterConfig, UrlHelper};

#[derive(Parser)]
#[command(name = "nested-router")]
#[command(about = "Resolve nested routes from a TOML route tree", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Navigate the given paths in order and print each snapshot
    Resolve {
        #[arg(short, long)]
        config: PathBuf,

        /// Absolute paths, including the configured base path
        paths: Vec<String>,
    },
    /// Read paths from stdin, one per line, and print snapshots
    Watch {
        #[arg(short, long)]
        config: PathBuf,

        /// Poll this file for the current path instead of reading stdin
        #[arg(long)]
        location_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        Commands::Resolve { config, .. } | Commands::Watch { config, .. } => config.clone(),
    };
    let config = load_config(&config_path)?;
    init_logging(&config.observability);

    tracing::info!(
        config = %config_path.display(),
        routes = config.routes.len(),
        base = %config.router.base_path,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Resolve { paths, .. } => resolve(&config, paths).await,
        Commands::Watch { location_file, .. } => watch(&config, location_file).await,
    }
}

/// Executor used by the CLI: views carry no resources.
fn activate(resolved: &Resolved<String>, url: &UrlHelper) -> ViewResult {
    tracing::debug!(view = ?resolved.view, url = %url, "Activating view");
    Ok(Box::new(()))
}

fn print(snapshot: &RouteSnapshot<String>) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(snapshot)?);
    Ok(())
}

async fn resolve(config: &RouterConfig, paths: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let router = Router::from_config(config)?.with_distinct(false);
    let base = Path::parse(&config.router.base_path);
    let navigator = router.navigator();
    let mut subscription = router.start(activate);

    for raw in paths {
        let path = Path::parse(&raw);
        if path.strip_prefix(&base).is_none() {
            tracing::warn!(path = %path, base = %base, "Path outside base, skipping");
            continue;
        }
        navigator.execute_str(&raw);
        match subscription.next().await {
            Some(snapshot) => print(&snapshot)?,
            None => break,
        }
    }

    subscription.unsubscribe().await;
    Ok(())
}

async fn watch(
    config: &RouterConfig,
    location_file: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let router = Router::from_config(config)?;
    match location_file {
        Some(file) => {
            let read = move || match std::fs::read_to_string(&file) {
                Ok(contents) => contents.trim().to_string(),
                Err(e) => {
                    tracing::warn!(file = %file.display(), error = %e, "Failed to read location");
                    String::new()
                }
            };
            let source = PollingSource::new(read, config.router.poll_interval());
            let subscription = router.with_source(source).start(activate);
            follow(subscription, None, config.router.poll_interval()).await
        }
        None => {
            let (tx, source) = ChannelSource::new();
            let subscription = router.with_source(source).start(activate);
            let reader = tokio::spawn(async move {
                let mut lines = BufReader::new(tokio::io::stdin()).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if tx.send(Path::parse(line)).is_err() {
                        break;
                    }
                }
            });
            follow(subscription, Some(reader), config.router.poll_interval()).await
        }
    }
}

/// Print snapshots until interrupted, or until `input` finishes and
/// in-flight navigations have settled.
async fn follow(
    mut subscription: RouterSubscription<String>,
    input: Option<JoinHandle<()>>,
    poll_interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let input_done = async move {
        match input {
            Some(handle) => {
                let _ = handle.await;
            }
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(input_done);

    loop {
        tokio::select! {
            snapshot = subscription.next() => match snapshot {
                Some(snapshot) => print(&snapshot)?,
                None => break,
            },
            _ = &mut input_done => {
                let settle = poll_interval * 4;
                while let Ok(Some(snapshot)) = tokio::time::timeout(settle, subscription.next()).await {
                    print(&snapshot)?;
                }
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    subscription.unsubscribe().await;
    Ok(())
}
