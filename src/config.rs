// src/config.rs

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::SecretString;
use url::Url;

use crate::blockchain::NetworkConfig;

// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings (HTTP mode)
    pub port: u16,

    /// Selected Metis network, after RPC_URL / EXPLORER_URL overrides
    pub network: NetworkConfig,
    pub rpc_timeout: Duration,
    /// Upper bound on fractional digits shown for a balance
    pub display_decimals: u8,

    // Assistant settings
    pub llm_api_key: Option<SecretString>,
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    pub memory_window: usize,
    pub knowledge_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            network: NetworkConfig::default(),
            rpc_timeout: Duration::from_secs(15),
            display_decimals: 6,
            llm_api_key: None,
            llm_api_url: "https://api.openai.com/v1".to_string(),
            llm_model: "gpt-4".to_string(),
            llm_timeout: Duration::from_secs(60),
            memory_window: 10,
            knowledge_file: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

fn check_url(name: &str, value: &str) -> Result<()> {
    Url::parse(value).with_context(|| format!("{} is not a valid URL: '{}'", name, value))?;
    Ok(())
}

impl Config {
    /// Loads configuration from `.env` and the environment, with
    /// `network_override` (from `--network`) taking precedence over
    /// `METIS_NETWORK`.
    pub fn load(network_override: Option<&str>) -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();
        let defaults = Config::default();

        let network_name = match network_override {
            Some(name) => name.to_string(),
            None => env::var("METIS_NETWORK").unwrap_or_else(|_| "sepolia".to_string()),
        };
        let mut network = NetworkConfig::resolve(&network_name)?;
        if let Ok(rpc_url) = env::var("RPC_URL") {
            network.rpc_url = rpc_url;
        }
        if let Ok(explorer_url) = env::var("EXPLORER_URL") {
            network.explorer_url = explorer_url;
        }
        check_url("RPC_URL", &network.rpc_url)?;
        check_url("EXPLORER_URL", &network.explorer_url)?;

        let llm_api_key = env::var("LLM_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::new);
        let llm_api_url = env::var("LLM_API_URL").unwrap_or(defaults.llm_api_url);
        check_url("LLM_API_URL", &llm_api_url)?;

        Ok(Config {
            port: parse_var("PORT", defaults.port)?,
            network,
            rpc_timeout: Duration::from_secs(parse_var("RPC_TIMEOUT_SECS", 15u64)?),
            display_decimals: parse_var("DISPLAY_DECIMALS", defaults.display_decimals)?,
            llm_api_key,
            llm_api_url,
            llm_model: env::var("LLM_MODEL").unwrap_or(defaults.llm_model),
            llm_timeout: Duration::from_secs(parse_var("LLM_TIMEOUT_SECS", 60u64)?),
            memory_window: parse_var("MEMORY_WINDOW", defaults.memory_window)?,
            knowledge_file: env::var("KNOWLEDGE_FILE").ok().map(PathBuf::from),
        })
    }
}
