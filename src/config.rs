use dotenvy::dotenv;
use eyre::Result;
use std::{env, time::Duration};
use tracing::{info, warn};

pub const DEFAULT_API_BASE_URL: &str = "https://api.clashofclans.com";

#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,    // bearer token for the upstream API
    pub api_base_url: String,
    pub host: String,
    pub port: u16,
    pub upstream_timeout: Duration,
}

// Hand-written so the credential never ends up in a log line.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}

pub fn load() -> Result<Config> {
    dotenv().ok(); // load from .env file

    // Upstream credential (optional at startup, required per request)
    let api_key = env::var("COC_API_KEY")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    if api_key.is_none() {
        warn!("COC_API_KEY is not set; every clan request will fail with 500");
    }

    let api_base_url = env::var("COC_API_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
        .trim_end_matches('/')
        .to_string();

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    // API port (default: 8080)
    let port = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let timeout_secs: u64 = env::var("UPSTREAM_TIMEOUT_SECS")
        .unwrap_or_else(|_| "10".to_string())
        .parse()
        .unwrap_or(10);

    let cfg = Config {
        api_key,
        api_base_url,
        host,
        port,
        upstream_timeout: Duration::from_secs(timeout_secs),
    };

    info!("Loaded config: {:?}", cfg);

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_api_key() {
        let cfg = Config {
            api_key: Some("super-secret".to_string()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            upstream_timeout: Duration::from_secs(10),
        };

        let printed = format!("{:?}", cfg);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
