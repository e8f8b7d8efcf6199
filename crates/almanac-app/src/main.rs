use std::sync::Arc;

use salvo::conn::TcpListener;
use salvo::conn::rustls::{Keycert, RustlsConfig};
use salvo::{Listener, Server};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use almanac_app::app::api::service_router;
use almanac_core::config::{TlsConfig, load_config};
use almanac_service::dav::Collaborators;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    // casbin logs through the `log` facade
    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::warn!(error = %e, "Failed to bridge log records into tracing");
    }

    tracing::info!("Starting Almanac CalDAV server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let collaborators = Collaborators::from_settings(&config).await?;

    tracing::info!(
        auth = ?config.auth.method,
        storage = %config.storage.folder.display(),
        "Collaborators initialized"
    );

    let bind_addr = config.server.bind_addr();
    let tls = config.server.tls.clone();
    let router = service_router(Arc::new(config), collaborators);

    match tls {
        Some(tls) => {
            let rustls = rustls_config(&tls).await?;
            let acceptor = TcpListener::new(bind_addr.clone()).rustls(rustls).bind().await;
            tracing::info!("Server listening on https://{bind_addr}");
            Server::new(acceptor).serve(router).await;
        }
        None => {
            let acceptor = TcpListener::new(bind_addr.clone()).bind().await;
            tracing::info!("Server listening on http://{bind_addr}");
            Server::new(acceptor).serve(router).await;
        }
    }

    Ok(())
}

async fn rustls_config(tls: &TlsConfig) -> anyhow::Result<RustlsConfig> {
    let cert = tokio::fs::read(&tls.certificate).await.map_err(|e| {
        anyhow::anyhow!("reading certificate {}: {e}", tls.certificate.display())
    })?;
    let key = tokio::fs::read(&tls.key)
        .await
        .map_err(|e| anyhow::anyhow!("reading key {}: {e}", tls.key.display()))?;

    Ok(RustlsConfig::new(Keycert::new().cert(cert).key(key)))
}
