pub mod api;
pub mod error;

use crate::config::RelayConfig;
use crate::relay::Relay;
use api::AppState;

use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use log::{ info, error };
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    config: Arc<RelayConfig>,
    relay: Relay,
}

impl Server {
    pub fn new(config: Arc<RelayConfig>, relay: Relay) -> Self {
        Self { config, relay }
    }

    /// Serves until ctrl-c.
    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let app = api::router(AppState {
            relay: self.relay.clone(),
            config: self.config.clone(),
        });
        let addr = self.config.bind_addr;

        if let Some(tls) = &self.config.tls {
            info!(
                "TLS enabled. Loading certificate from '{}' and key from '{}'",
                tls.cert.display(),
                tls.key.display()
            );
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;

            let handle = Handle::new();
            let shutdown = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown.graceful_shutdown(Some(Duration::from_secs(10)));
            });

            info!("HTTPS server listening on: https://{}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        } else {
            let listener = tokio::net::TcpListener::bind(addr).await
                .map_err(|e| format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e))?;
            info!("HTTP server listening on: http://{}", addr);
            axum::serve(listener, app.into_make_service())
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
