use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Call once per process.
    pub fn install() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        Ok(Self { handle })
    }

    /// Wrap an existing handle (tests build one without installing it globally).
    pub fn from_handle(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// `/metrics` in the Prometheus exposition format, `/health` as a liveness probe.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new()
            .route("/health", get(|| async { "OK" }))
            .route(
                "/metrics",
                get(move || {
                    let h = handle.clone();
                    async move { h.render() }
                }),
            )
    }

    /// Bind `addr` and serve the router in a background task.
    pub async fn serve(&self, addr: &str) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding metrics listener on {addr}"))?;
        let local = listener.local_addr()?;
        let app = self.router();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "metrics server stopped");
            }
        });
        tracing::info!(addr = %local, "serving /health and /metrics");
        Ok(())
    }
}
