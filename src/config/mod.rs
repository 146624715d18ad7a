use crate::cli::Args;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CHATPDF_API_KEY is not set. Please check your .env file.")]
    MissingApiKey,
    #[error("Invalid upstream API URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },
    #[error("Invalid bind address '{0}'")]
    InvalidBindAddr(String),
    #[error("Upstream timeout must be at least one second")]
    ZeroTimeout,
    #[error("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.")]
    IncompleteTls,
}

/// Static credential for the upstream. Debug output never shows the value.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        ApiKey(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Validated server configuration. Built once at startup, then shared read-only.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub api_key: ApiKey,
    pub api_url: Url,
    pub upstream_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
    pub static_dir: PathBuf,
    pub tls: Option<TlsPaths>,
}

impl RelayConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let api_key = args.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(ApiKey::new)
            .ok_or(ConfigError::MissingApiKey)?;

        let api_url = parse_api_url(&args.api_url)?;

        if args.upstream_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let bind = format!("{}:{}", args.host, args.port);
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr(bind.clone()))?;

        let tls = if args.enable_tls {
            match (&args.tls_cert_path, &args.tls_key_path) {
                (Some(cert), Some(key)) => Some(TlsPaths { cert: cert.clone(), key: key.clone() }),
                _ => return Err(ConfigError::IncompleteTls),
            }
        } else {
            None
        };

        Ok(RelayConfig {
            api_key,
            api_url,
            upstream_timeout: Duration::from_secs(args.upstream_timeout_secs),
            bind_addr,
            max_upload_bytes: args.max_upload_bytes,
            static_dir: args.static_dir.clone(),
            tls,
        })
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidApiUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidApiUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Joins an endpoint path onto the base URL, keeping any path the base already has.
pub fn endpoint(base: &Url, path: &str) -> String {
    format!("{}/{}", base.as_str().trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use crate::cli::Cli;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["paper-whisper"];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv).unwrap().serve
    }

    #[test]
    fn missing_key_is_fatal() {
        let mut a = args(&[]);
        a.api_key = None;
        assert!(matches!(RelayConfig::from_args(&a), Err(ConfigError::MissingApiKey)));

        a.api_key = Some("   ".into());
        assert!(matches!(RelayConfig::from_args(&a), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn valid_args_build_config() {
        let a = args(&["--api-key", "sec_123", "--host", "127.0.0.1", "--port", "5001"]);
        let cfg = RelayConfig::from_args(&a).unwrap();
        assert_eq!(cfg.api_key.expose(), "sec_123");
        assert_eq!(cfg.bind_addr.port(), 5001);
        assert!(cfg.tls.is_none());
        assert!(!format!("{:?}", cfg).contains("sec_123"));
    }

    #[test]
    fn rejects_bad_url_and_zero_timeout() {
        let a = args(&["--api-key", "k", "--api-url", "ftp://example.com"]);
        assert!(matches!(RelayConfig::from_args(&a), Err(ConfigError::InvalidApiUrl { .. })));

        let a = args(&["--api-key", "k", "--upstream-timeout-secs", "0"]);
        assert!(matches!(RelayConfig::from_args(&a), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn tls_needs_both_paths() {
        let a = args(&["--api-key", "k", "--enable-tls", "--tls-cert-path", "cert.pem"]);
        assert!(matches!(RelayConfig::from_args(&a), Err(ConfigError::IncompleteTls)));
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let base = Url::parse("https://api.chatpdf.com/v1").unwrap();
        assert_eq!(endpoint(&base, "sources/add-file"), "https://api.chatpdf.com/v1/sources/add-file");
        let base = Url::parse("http://localhost:9000/").unwrap();
        assert_eq!(endpoint(&base, "/chats/message"), "http://localhost:9000/chats/message");
    }
}
