use clap::Parser;
use oxo::{Registry, config::Config, net::http};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "oxo", about = "Authoritative tic-tac-toe server")]
struct Args {
    /// Load settings from a TOML file instead of the environment
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listen address, e.g. 0.0.0.0:3001
    #[arg(long)]
    http_addr: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };
    if let Some(addr) = args.http_addr {
        cfg.http_addr = addr;
    }
    let cfg = Arc::new(cfg);

    let registry = Arc::new(Registry::new(cfg.clone()));

    let addr: SocketAddr = cfg.http_addr.parse()?;
    tracing::info!(%addr, "oxo server WS (http) listening");
    // A failed bind (port already taken, say) surfaces here with a clean
    // error and a nonzero exit; per-connection faults never reach this point.
    http::serve(addr, registry).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, prelude::*};

    color_eyre::install().unwrap();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::uptime()),
        )
        .with(tracing_error::ErrorLayer::default())
        .init();
}
