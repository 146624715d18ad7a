use clap::{ Parser, Subcommand };
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Relay server options, used when no subcommand is given.
    #[command(flatten)]
    pub serve: Args,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the relay server (default).
    Serve(Args),
    /// Upload a document to a running relay and chat with it from the terminal.
    Chat(ChatArgs),
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct Args {
    // --- Upstream Args ---
    /// API key for the document QA service. Sent as `x-api-key`, never exposed to clients.
    #[arg(long, env = "CHATPDF_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the document QA service API.
    #[arg(long, env = "CHATPDF_API_URL", default_value = "https://api.chatpdf.com/v1")]
    pub api_url: String,

    /// Seconds to wait for the upstream before giving up with a timeout error.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value = "30")]
    pub upstream_timeout_secs: u64,

    // --- HTTP Server Args ---
    /// Interface the HTTP server binds to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port the HTTP server listens on.
    #[arg(long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Largest accepted request body in bytes (uploads included).
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value = "33554432")]
    pub max_upload_bytes: usize,

    /// Directory holding the built single page app. Unknown paths fall back to its index.html.
    #[arg(long, env = "STATIC_DIR", default_value = "client/build")]
    pub static_dir: PathBuf,

    // --- TLS Args ---
    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<PathBuf>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ChatArgs {
    /// Base URL of a running relay server.
    #[arg(long, env = "PAPER_WHISPER_URL", default_value = "http://127.0.0.1:5000")]
    pub server_url: String,

    /// Document to upload before the conversation starts.
    #[arg(short, long)]
    pub file: PathBuf,

    /// Seconds to wait for the relay on each request.
    #[arg(long, env = "CLIENT_TIMEOUT_SECS", default_value = "60")]
    pub timeout_secs: u64,
}
