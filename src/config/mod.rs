//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `NOTEWORTHY_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BACKOFF_FACTOR, DEFAULT_BASE_DELAY_MS, DEFAULT_HISTORY_PAGE_SIZE,
    DEFAULT_LEAD_CACHE_CAPACITY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS, DEFAULT_MAX_HISTORY_PAGES,
    DEFAULT_MODEL, DEFAULT_TEST_SPLIT_PROBABILITY, DEFAULT_WIKI_API_URL, MAX_ATTEMPTS_LIMIT,
    MAX_REVISIONS_PER_PAGE,
};
use crate::model::RetryPolicy;
use crate::wiki::HistoryPolicy;

/// Default `User-Agent` sent to the MediaWiki API (the API rejects anonymous agents).
pub const DEFAULT_USER_AGENT: &str = concat!(
    "NoteworthyDifferences/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/noteworthy-differences) reqwest"
);

/// Server and pipeline configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `NOTEWORTHY_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// MediaWiki action API endpoint.
    pub wiki_api_url: String,

    /// `User-Agent` header for MediaWiki requests.
    pub user_agent: String,

    /// Model identifier used for classifier and arbiter calls.
    pub model: String,

    /// Directory holding one JSON file per feedback record.
    pub feedback_dir: PathBuf,

    /// Directory holding `alignment_{round}.txt` files.
    pub alignment_dir: PathBuf,

    /// Maximum attempts per model call (first call included). Default: `5`.
    pub max_attempts: u32,

    /// Delay before the first retry. Default: 2s.
    pub base_delay: Duration,

    /// Longest single wait between retries. Default: 60s.
    pub max_delay: Duration,

    /// Growth factor for the retry delay. Default: `2.0`.
    pub backoff_factor: f64,

    /// Probability of assigning a new feedback record to the test split. Default: `0.4`.
    pub test_split_probability: f64,

    /// Revisions per page when measuring distance. Default: `500`.
    pub history_page_size: u32,

    /// Pages scanned before distance is reported as "at least". Default: `10`.
    pub max_history_pages: u32,

    /// Clamp count lookups to the oldest revision instead of failing. Default: `false`.
    pub clamp_history: bool,

    /// Entries kept in the lead-section cache. Default: `1024`.
    pub lead_cache_capacity: u64,

    /// Serve canned wiki/model responses instead of calling upstream services.
    pub mock_provider: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            wiki_api_url: DEFAULT_WIKI_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            feedback_dir: PathBuf::from("./.data/feedback"),
            alignment_dir: PathBuf::from("./production"),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            test_split_probability: DEFAULT_TEST_SPLIT_PROBABILITY,
            history_page_size: DEFAULT_HISTORY_PAGE_SIZE,
            max_history_pages: DEFAULT_MAX_HISTORY_PAGES,
            clamp_history: false,
            lead_cache_capacity: DEFAULT_LEAD_CACHE_CAPACITY,
            mock_provider: false,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "NOTEWORTHY_PORT";
    const ENV_BIND_ADDR: &'static str = "NOTEWORTHY_BIND_ADDR";
    const ENV_WIKI_API_URL: &'static str = "NOTEWORTHY_WIKI_API_URL";
    const ENV_USER_AGENT: &'static str = "NOTEWORTHY_USER_AGENT";
    const ENV_MODEL: &'static str = "NOTEWORTHY_MODEL";
    const ENV_FEEDBACK_DIR: &'static str = "NOTEWORTHY_FEEDBACK_DIR";
    const ENV_ALIGNMENT_DIR: &'static str = "NOTEWORTHY_ALIGNMENT_DIR";
    const ENV_MAX_ATTEMPTS: &'static str = "NOTEWORTHY_MAX_ATTEMPTS";
    const ENV_BASE_DELAY_MS: &'static str = "NOTEWORTHY_BASE_DELAY_MS";
    const ENV_MAX_DELAY_MS: &'static str = "NOTEWORTHY_MAX_DELAY_MS";
    const ENV_BACKOFF_FACTOR: &'static str = "NOTEWORTHY_BACKOFF_FACTOR";
    const ENV_TEST_SPLIT: &'static str = "NOTEWORTHY_TEST_SPLIT";
    const ENV_HISTORY_PAGE_SIZE: &'static str = "NOTEWORTHY_HISTORY_PAGE_SIZE";
    const ENV_MAX_HISTORY_PAGES: &'static str = "NOTEWORTHY_MAX_HISTORY_PAGES";
    const ENV_CLAMP_HISTORY: &'static str = "NOTEWORTHY_CLAMP_HISTORY";
    const ENV_LEAD_CACHE_CAPACITY: &'static str = "NOTEWORTHY_LEAD_CACHE_CAPACITY";
    const ENV_MOCK_PROVIDER: &'static str = "NOTEWORTHY_MOCK_PROVIDER";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let wiki_api_url = Self::parse_string_from_env(Self::ENV_WIKI_API_URL, defaults.wiki_api_url);
        let user_agent = Self::parse_string_from_env(Self::ENV_USER_AGENT, defaults.user_agent);
        let model = Self::parse_string_from_env(Self::ENV_MODEL, defaults.model);
        let feedback_dir = Self::parse_path_from_env(Self::ENV_FEEDBACK_DIR, defaults.feedback_dir);
        let alignment_dir =
            Self::parse_path_from_env(Self::ENV_ALIGNMENT_DIR, defaults.alignment_dir);
        let max_attempts = u32::try_from(Self::parse_u64_from_env(
            Self::ENV_MAX_ATTEMPTS,
            u64::from(defaults.max_attempts),
        ))
        .unwrap_or(u32::MAX);
        let base_delay = Duration::from_millis(Self::parse_u64_from_env(
            Self::ENV_BASE_DELAY_MS,
            defaults.base_delay.as_millis() as u64,
        ));
        let max_delay = Duration::from_millis(Self::parse_u64_from_env(
            Self::ENV_MAX_DELAY_MS,
            defaults.max_delay.as_millis() as u64,
        ));
        let backoff_factor =
            Self::parse_f64_from_env(Self::ENV_BACKOFF_FACTOR, defaults.backoff_factor);
        let test_split_probability =
            Self::parse_f64_from_env(Self::ENV_TEST_SPLIT, defaults.test_split_probability);
        let history_page_size = Self::parse_u64_from_env(
            Self::ENV_HISTORY_PAGE_SIZE,
            defaults.history_page_size as u64,
        ) as u32;
        let max_history_pages = Self::parse_u64_from_env(
            Self::ENV_MAX_HISTORY_PAGES,
            defaults.max_history_pages as u64,
        ) as u32;
        let clamp_history = Self::parse_bool_from_env(Self::ENV_CLAMP_HISTORY, defaults.clamp_history);
        let lead_cache_capacity =
            Self::parse_u64_from_env(Self::ENV_LEAD_CACHE_CAPACITY, defaults.lead_cache_capacity);
        let mock_provider =
            env::var_os(Self::ENV_MOCK_PROVIDER).is_some_and(|v| !v.is_empty());

        Ok(Self {
            port,
            bind_addr,
            wiki_api_url,
            user_agent,
            model,
            feedback_dir,
            alignment_dir,
            max_attempts,
            base_delay,
            max_delay,
            backoff_factor,
            test_split_probability,
            history_page_size,
            max_history_pages,
            clamp_history,
            lead_cache_capacity,
            mock_provider,
        })
    }

    /// Validates paths and numeric invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [&self.feedback_dir, &self.alignment_dir] {
            if path.exists() && !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if self.max_attempts == 0 || self.max_attempts > MAX_ATTEMPTS_LIMIT {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_MAX_ATTEMPTS,
                reason: format!("must be between 1 and {MAX_ATTEMPTS_LIMIT}"),
            });
        }

        if self.max_delay < self.base_delay {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_MAX_DELAY_MS,
                reason: "must not be shorter than the base delay".to_string(),
            });
        }

        if !self.backoff_factor.is_finite() || self.backoff_factor < 1.0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_BACKOFF_FACTOR,
                reason: format!("{} would shrink the delay between retries", self.backoff_factor),
            });
        }

        if !(0.0..=1.0).contains(&self.test_split_probability) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_TEST_SPLIT,
                reason: format!("{} is not a probability", self.test_split_probability),
            });
        }

        if self.history_page_size == 0 || self.history_page_size > MAX_REVISIONS_PER_PAGE {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_HISTORY_PAGE_SIZE,
                reason: format!("must be between 1 and {MAX_REVISIONS_PER_PAGE}"),
            });
        }

        if self.max_history_pages == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_MAX_HISTORY_PAGES,
                reason: "at least one page must be scanned".to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Retry policy for model calls.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: self.base_delay,
            max_delay: self.max_delay,
            backoff_factor: self.backoff_factor,
            jitter: RetryPolicy::DEFAULT_JITTER,
        }
    }

    /// What a count lookup does when the article is younger than requested.
    pub fn history_policy(&self) -> HistoryPolicy {
        if self.clamp_history {
            HistoryPolicy::Clamp
        } else {
            HistoryPolicy::Strict
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn parse_f64_from_env(var_name: &str, default: f64) -> f64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        env::var(var_name)
            .map(|s| s != "false" && s != "0")
            .unwrap_or(default)
    }
}
