//! catalog-announcer — binary entrypoint.
//! Loads configuration, wires the catalog client and the Discord notifier into
//! the pipeline, and runs it until Ctrl-C.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use catalog_announcer::catalog::roblox::RobloxCatalog;
use catalog_announcer::metrics::Metrics;
use catalog_announcer::{AnnouncerConfig, DiscordNotifier, Pipeline, Scheduler};

/// `RUST_LOG` filters (default `catalog_announcer=info,warn`);
/// `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("catalog_announcer=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AnnouncerConfig::load_default()?;
    cfg.validate().context("invalid configuration")?;
    tracing::info!(
        data_dir = %cfg.data_dir.display(),
        cooldown_secs = cfg.cooldown_secs,
        message_delay_secs = cfg.message_delay_secs,
        ledger_cap = cfg.ledger_cap,
        "announcer starting"
    );

    if let Some(addr) = &cfg.metrics_addr {
        let metrics = Metrics::install()?;
        metrics.serve(addr).await?;
    }

    let source = RobloxCatalog::from_config(&cfg).context("building catalog client")?;
    let notifier = DiscordNotifier::from_config(&cfg);
    let pipeline = Pipeline::new(&cfg, Box::new(source), Box::new(notifier));

    Scheduler::new(pipeline, cfg.cooldown())
        .run_until(shutdown_signal())
        .await;
    Ok(())
}
