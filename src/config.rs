use dotenvy::dotenv;
use eyre::Result;
use serde::Deserialize;
use std::env;
use tracing::info;

/// First item of a page window when the caller gives none
pub const DEFAULT_PAGINATION_OFFSET: usize = 0;
/// Page size when the caller gives none
pub const DEFAULT_PAGINATION_LIMIT: usize = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub explorer_url: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub max_pages_per_request: usize,
    pub max_transfer_pages: usize,
    pub abort_on_invalid_transaction: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            explorer_url: "https://blockscout.lisk.com".to_string(),
            port: 8080,
            request_timeout_secs: 15,
            max_retries: 3,
            retry_base_delay_ms: 500,
            max_pages_per_request: 10,
            max_transfer_pages: 5,
            abort_on_invalid_transaction: false,
        }
    }
}

impl Config {
    /// Build a config from a variable lookup, keeping defaults for anything unset or unparsable
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();

        fn parsed<T: std::str::FromStr>(value: Option<String>, fallback: T) -> T {
            value.and_then(|v| v.trim().parse().ok()).unwrap_or(fallback)
        }

        let explorer_url = get("EXPLORER_URL")
            .or_else(|| get("BLOCKSCOUT_URL")) // alias support
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.explorer_url);

        Config {
            explorer_url,
            port: parsed(get("PORT"), defaults.port),
            request_timeout_secs: parsed(get("REQUEST_TIMEOUT_SECS"), defaults.request_timeout_secs),
            max_retries: parsed(get("MAX_RETRIES"), defaults.max_retries),
            retry_base_delay_ms: parsed(get("RETRY_BASE_DELAY_MS"), defaults.retry_base_delay_ms),
            max_pages_per_request: parsed(get("MAX_PAGES_PER_REQUEST"), defaults.max_pages_per_request)
                .max(1),
            max_transfer_pages: parsed(get("MAX_TRANSFER_PAGES"), defaults.max_transfer_pages),
            abort_on_invalid_transaction: parsed(
                get("ABORT_ON_INVALID_TRANSACTION"),
                defaults.abort_on_invalid_transaction,
            ),
        }
    }
}

pub fn load() -> Result<Config> {
    dotenv().ok(); // .env is optional

    let cfg = Config::from_lookup(|key| env::var(key).ok());

    info!("Loaded config: {:?}", cfg);

    Ok(cfg)
}
