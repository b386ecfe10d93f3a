use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use usage_server::*;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let usage_repo = Arc::new(usage_repo::UsageRepo::new(&app_config.upstream));
    let cache: Arc<dyn cache::CacheStore> = Arc::new(cache::MemoryCache::new());
    let catalog: Arc<dyn catalog::GroupCatalog> =
        Arc::new(catalog::StaticCatalog::new(&app_config.catalog));

    let app = routes::app(
        usage_repo,
        cache,
        catalog,
        app_config.cache.ttl_seconds,
    );
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    let in_container = std::path::Path::new("/.dockerenv").exists()
        || std::env::var("CONTAINER").as_deref() == Ok("1");

    if in_container {
        // In Docker: run server until error or SIGTERM (no signal handler; avoids immediate exit)
        axum::serve(listener, app).await?;
    } else {
        tokio::select! {
            result = axum::serve(listener, app) => {
                result?;
            }
            _ = async {
                #[cfg(unix)]
                {
                    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                        Ok(s) => s,
                        Err(_) => {
                            let _ = tokio::signal::ctrl_c().await;
                            return;
                        }
                    };
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = sigterm.recv() => {}
                    }
                }
                #[cfg(not(unix))]
                {
                    tokio::signal::ctrl_c().await
                }
            } => {
                tracing::info!("Received shutdown signal");
            }
        }
    }

    Ok(())
}
