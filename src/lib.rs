pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod relay;
pub mod server;
pub mod session;
pub mod upstream;

use cli::{ Args, Cli, Command };
use config::RelayConfig;
use log::info;
use relay::Relay;
use server::Server;
use std::error::Error;
use std::sync::Arc;
use upstream::ChatPdfClient;

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error + Send + Sync>> {
    match cli.into_command() {
        Command::Serve(args) => serve(args).await,
        Command::Chat(args) => client::terminal::run_chat(args).await,
    }
}

pub async fn serve(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("CHATPDF_API_KEY: {}", if args.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()) { "Set" } else { "Not set" });
    info!("Upstream API URL: {}", args.api_url);
    info!("Upstream Timeout: {}s", args.upstream_timeout_secs);
    info!("Server Address: {}:{}", args.host, args.port);
    info!("Max Upload Bytes: {}", args.max_upload_bytes);
    info!("Static Dir: {}", args.static_dir.display());
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let config = Arc::new(RelayConfig::from_args(&args)?);
    let upstream = Arc::new(ChatPdfClient::new(&config)?);
    let relay = Relay::new(upstream);

    let server = Server::new(config, relay);
    server.run().await?;

    Ok(())
}
